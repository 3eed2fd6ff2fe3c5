use crate::expression::domain::expression::ExpressionScores;
use crate::shared::face_box::FaceBox;
use crate::shared::frame::Frame;

/// Domain interface for expression classification.
///
/// Takes the full frame plus the face's bounding box; implementations do
/// their own cropping and preprocessing. `&mut self` because sessions may
/// keep internal scratch state.
pub trait ExpressionClassifier: Send {
    fn classify(
        &mut self,
        frame: &Frame,
        face: &FaceBox,
    ) -> Result<ExpressionScores, Box<dyn std::error::Error>>;
}
