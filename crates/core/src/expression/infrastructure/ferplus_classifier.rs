/// FER+ expression classifier using ONNX Runtime via `ort`.
///
/// Emotion FER+ is trained on 64×64 grayscale crops and scores eight
/// emotion classes. The eighth (contempt) has no counterpart in the
/// published expression set and is folded into neutral.
use std::path::Path;

use crate::expression::domain::expression::{Expression, ExpressionScores};
use crate::expression::domain::expression_classifier::ExpressionClassifier;
use crate::shared::face_box::FaceBox;
use crate::shared::frame::Frame;

/// FER+ model input resolution.
const INPUT_SIZE: u32 = 64;

/// Context added around the detector box before cropping, as a fraction
/// of the longer side. FER+ crops include some background.
const CROP_MARGIN: f64 = 0.2;

/// Number of FER+ output classes.
const NUM_CLASSES: usize = 8;

pub struct FerPlusClassifier {
    session: ort::session::Session,
}

impl FerPlusClassifier {
    /// Load the FER+ ONNX model.
    pub fn new(model_path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let session = ort::session::Session::builder()?.commit_from_file(model_path)?;
        Ok(Self { session })
    }
}

impl ExpressionClassifier for FerPlusClassifier {
    fn classify(
        &mut self,
        frame: &Frame,
        face: &FaceBox,
    ) -> Result<ExpressionScores, Box<dyn std::error::Error>> {
        let crop = frame
            .crop(&face.square_expanded(CROP_MARGIN))
            .ok_or("face box does not intersect the frame")?;

        let input_tensor = preprocess(&crop, INPUT_SIZE);
        let input_value = ort::value::Tensor::from_array(input_tensor)?;
        let outputs = self.session.run(ort::inputs![input_value])?;

        let logits = outputs[0].try_extract_array::<f32>()?;
        let logit_data = logits.as_slice().ok_or("Cannot get logits slice")?;
        if logit_data.len() < NUM_CLASSES {
            return Err(format!(
                "FER+ model expected {NUM_CLASSES} outputs, got {}",
                logit_data.len()
            )
            .into());
        }

        Ok(scores_from_logits(logit_data))
    }
}

// ---------------------------------------------------------------------------
// Preprocessing
// ---------------------------------------------------------------------------

/// Resize to `size × size` and convert to grayscale NCHW float32.
///
/// FER+ takes raw 8-bit intensities; no normalization.
fn preprocess(crop: &Frame, size: u32) -> ndarray::Array4<f32> {
    let src = crop.as_ndarray();
    let src_h = crop.height() as usize;
    let src_w = crop.width() as usize;
    let s = size as usize;

    let mut tensor = ndarray::Array4::<f32>::zeros((1, 1, s, s));

    for y in 0..s {
        let src_y = (((y as f64 + 0.5) * src_h as f64 / s as f64) as usize).min(src_h - 1);
        for x in 0..s {
            let src_x = (((x as f64 + 0.5) * src_w as f64 / s as f64) as usize).min(src_w - 1);
            let r = src[[src_y, src_x, 0]] as f32;
            let g = src[[src_y, src_x, 1]] as f32;
            let b = src[[src_y, src_x, 2]] as f32;
            tensor[[0, 0, y, x]] = 0.299 * r + 0.587 * g + 0.114 * b;
        }
    }

    tensor
}

// ---------------------------------------------------------------------------
// Score mapping
// ---------------------------------------------------------------------------

/// FER+ class order: neutral, happiness, surprise, sadness, anger,
/// disgust, fear, contempt.
fn scores_from_logits(logits: &[f32]) -> ExpressionScores {
    let probs = softmax(&logits[..NUM_CLASSES]);

    let mut scores = [0.0f32; 7];
    scores[Expression::Neutral as usize] = probs[0] + probs[7];
    scores[Expression::Happy as usize] = probs[1];
    scores[Expression::Surprised as usize] = probs[2];
    scores[Expression::Sad as usize] = probs[3];
    scores[Expression::Angry as usize] = probs[4];
    scores[Expression::Disgusted as usize] = probs[5];
    scores[Expression::Fearful as usize] = probs[6];
    ExpressionScores::new(scores)
}

fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|&v| (v - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.into_iter().map(|v| v / sum).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_preprocess_shape() {
        let crop = Frame::new(vec![128u8; 100 * 80 * 3], 100, 80);
        let tensor = preprocess(&crop, 64);
        assert_eq!(tensor.shape(), &[1, 1, 64, 64]);
    }

    #[test]
    fn test_preprocess_keeps_raw_intensity_range() {
        let crop = Frame::new(vec![255u8; 10 * 10 * 3], 10, 10);
        let tensor = preprocess(&crop, 64);
        // Pure white stays at 255, not scaled to [0,1]
        assert!((tensor[[0, 0, 0, 0]] - 255.0).abs() < 0.5);
    }

    #[test]
    fn test_preprocess_grayscale_weights() {
        // Pure green: luma = 0.587 * 200
        let mut data = Vec::with_capacity(4 * 4 * 3);
        for _ in 0..16 {
            data.extend_from_slice(&[0, 200, 0]);
        }
        let crop = Frame::new(data, 4, 4);
        let tensor = preprocess(&crop, 8);
        assert_relative_eq!(tensor[[0, 0, 0, 0]], 0.587 * 200.0, epsilon = 1e-3);
    }

    #[test]
    fn test_softmax_sums_to_one() {
        let probs = softmax(&[1.0, 2.0, 3.0]);
        let sum: f32 = probs.iter().sum();
        assert_relative_eq!(sum, 1.0, epsilon = 1e-6);
        assert!(probs[2] > probs[1] && probs[1] > probs[0]);
    }

    #[test]
    fn test_softmax_handles_large_logits() {
        let probs = softmax(&[1000.0, 0.0]);
        assert!(probs[0].is_finite());
        assert_relative_eq!(probs[0], 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_scores_from_logits_maps_happiness() {
        // Index 1 is FER+ happiness
        let mut logits = [0.0f32; 8];
        logits[1] = 10.0;
        let scores = scores_from_logits(&logits);
        assert_eq!(scores.dominant(), Expression::Happy);
    }

    #[test]
    fn test_scores_from_logits_folds_contempt_into_neutral() {
        // Contempt (index 7) dominates; published set has no contempt
        let mut logits = [0.0f32; 8];
        logits[7] = 10.0;
        let scores = scores_from_logits(&logits);
        assert_eq!(scores.dominant(), Expression::Neutral);
    }

    #[test]
    fn test_scores_from_logits_sum_to_one() {
        let logits = [0.3f32, 1.2, -0.5, 0.0, 2.0, -1.0, 0.7, 0.1];
        let scores = scores_from_logits(&logits);
        let sum: f32 = scores.iter().map(|(_, v)| v).sum();
        assert_relative_eq!(sum, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_scores_from_logits_fer_order_differs_from_declaration_order() {
        // FER+ index 2 is surprise, which sits last in the published order
        let mut logits = [0.0f32; 8];
        logits[2] = 10.0;
        let scores = scores_from_logits(&logits);
        assert_eq!(scores.dominant(), Expression::Surprised);
    }
}
