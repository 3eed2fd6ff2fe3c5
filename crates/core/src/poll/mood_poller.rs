use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use crate::capture::domain::frame_source::FrameSource;
use crate::detection::domain::face_detector::FaceDetector;
use crate::expression::domain::expression::Mood;
use crate::expression::domain::expression_classifier::ExpressionClassifier;
use crate::shared::face_box::FaceBox;
use crate::shared::frame::Frame;

/// Everything one successful tick produces.
///
/// `faces` and `frame` are carried so a consumer can draw detection
/// overlays; only `mood` is correctness-bearing.
pub struct TickOutcome {
    pub mood: Mood,
    pub faces: Vec<FaceBox>,
    pub frame: Frame,
}

/// Fixed-period detection loop over a frame source.
///
/// Each tick grabs one frame, detects faces, and publishes the dominant
/// expression of the largest face — or the no-face sentinel, in which
/// case the classifier is never invoked. A failed tick is logged and
/// skipped; the loop continues on the next period.
pub struct MoodPoller {
    source: Box<dyn FrameSource>,
    detector: Box<dyn FaceDetector>,
    classifier: Box<dyn ExpressionClassifier>,
}

impl MoodPoller {
    /// Takes an already-opened source and already-loaded models, so a
    /// constructed poller is always ready to tick.
    pub fn new(
        source: Box<dyn FrameSource>,
        detector: Box<dyn FaceDetector>,
        classifier: Box<dyn ExpressionClassifier>,
    ) -> Self {
        Self {
            source,
            detector,
            classifier,
        }
    }

    /// Runs one tick: grab, detect, classify, select.
    pub fn tick(&mut self) -> Result<TickOutcome, Box<dyn std::error::Error>> {
        let frame = self.source.grab()?;
        let faces = self.detector.detect(&frame)?;

        let mood = match largest_face(&faces) {
            None => Mood::NoFace,
            Some(face) => {
                let scores = self.classifier.classify(&frame, face)?;
                Mood::Detected(scores.dominant())
            }
        };

        Ok(TickOutcome { mood, faces, frame })
    }

    /// Runs ticks on a fixed period until cancelled.
    ///
    /// `on_tick` receives exactly one outcome per successful tick and
    /// returns whether to keep going. Failed ticks emit nothing. The
    /// `cancelled` token stops the loop between ticks; an in-flight tick
    /// is allowed to finish but its outcome is not emitted.
    pub fn run(
        &mut self,
        interval: Duration,
        cancelled: &AtomicBool,
        on_tick: &mut dyn FnMut(TickOutcome) -> bool,
    ) {
        while !cancelled.load(Ordering::Relaxed) {
            let started = Instant::now();

            match self.tick() {
                Ok(outcome) => {
                    if cancelled.load(Ordering::Relaxed) || !on_tick(outcome) {
                        break;
                    }
                }
                Err(e) => log::warn!("Detection tick failed, skipping: {e}"),
            }

            let elapsed = started.elapsed();
            if elapsed < interval {
                thread::sleep(interval - elapsed);
            }
        }
        self.source.close();
    }
}

/// The face the original picks is its runtime's first detection; choosing
/// the largest by area is the deterministic equivalent.
fn largest_face(faces: &[FaceBox]) -> Option<&FaceBox> {
    faces.iter().max_by_key(|f| f.area())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;

    use crate::expression::domain::expression::{Expression, ExpressionScores};

    // --- Stubs ---

    struct StubSource {
        fail: bool,
    }

    impl FrameSource for StubSource {
        fn open(&mut self) -> Result<(u32, u32), Box<dyn std::error::Error>> {
            Ok((64, 48))
        }

        fn grab(&mut self) -> Result<Frame, Box<dyn std::error::Error>> {
            if self.fail {
                return Err("capture failed".into());
            }
            Ok(Frame::new(vec![0u8; 64 * 48 * 3], 64, 48))
        }

        fn close(&mut self) {}
    }

    struct StubDetector {
        // One result per tick, cycled
        results: Vec<Result<Vec<FaceBox>, String>>,
        calls: usize,
    }

    impl StubDetector {
        fn returning(results: Vec<Result<Vec<FaceBox>, String>>) -> Self {
            Self { results, calls: 0 }
        }
    }

    impl FaceDetector for StubDetector {
        fn detect(&mut self, _frame: &Frame) -> Result<Vec<FaceBox>, Box<dyn std::error::Error>> {
            let result = self.results[self.calls % self.results.len()].clone();
            self.calls += 1;
            result.map_err(|e| e.into())
        }
    }

    struct StubClassifier {
        scores: ExpressionScores,
        fail: bool,
        calls: Arc<AtomicUsize>,
    }

    impl StubClassifier {
        fn returning(scores: ExpressionScores) -> (Self, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            (
                Self {
                    scores,
                    fail: false,
                    calls: calls.clone(),
                },
                calls,
            )
        }
    }

    impl ExpressionClassifier for StubClassifier {
        fn classify(
            &mut self,
            _frame: &Frame,
            _face: &FaceBox,
        ) -> Result<ExpressionScores, Box<dyn std::error::Error>> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            if self.fail {
                return Err("inference failed".into());
            }
            Ok(self.scores.clone())
        }
    }

    // --- Helpers ---

    fn face(x: i32, w: i32, h: i32) -> FaceBox {
        FaceBox {
            x,
            y: 0,
            width: w,
            height: h,
            confidence: 0.9,
        }
    }

    fn happy_scores() -> ExpressionScores {
        ExpressionScores::new([0.1, 0.9, 0.0, 0.0, 0.0, 0.0, 0.0])
    }

    fn poller(
        detector: StubDetector,
        classifier: StubClassifier,
    ) -> MoodPoller {
        MoodPoller::new(
            Box::new(StubSource { fail: false }),
            Box::new(detector),
            Box::new(classifier),
        )
    }

    // --- tick ---

    #[test]
    fn test_tick_publishes_dominant_expression() {
        let (classifier, _) = StubClassifier::returning(happy_scores());
        let detector = StubDetector::returning(vec![Ok(vec![face(0, 20, 20)])]);
        let mut p = poller(detector, classifier);

        let outcome = p.tick().unwrap();
        assert_eq!(outcome.mood, Mood::Detected(Expression::Happy));
        assert_eq!(outcome.faces.len(), 1);
    }

    #[test]
    fn test_tick_no_face_emits_sentinel_without_classifying() {
        let (classifier, calls) = StubClassifier::returning(happy_scores());
        let detector = StubDetector::returning(vec![Ok(vec![])]);
        let mut p = poller(detector, classifier);

        let outcome = p.tick().unwrap();
        assert_eq!(outcome.mood, Mood::NoFace);
        assert_eq!(calls.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_tick_classifies_largest_face() {
        // Two faces; the larger one should drive classification. The stub
        // classifier ignores the box, so assert via the selection helper.
        let faces = vec![face(0, 10, 10), face(50, 30, 30)];
        assert_eq!(largest_face(&faces).unwrap().x, 50);
    }

    #[test]
    fn test_tick_detector_error_propagates() {
        let (classifier, calls) = StubClassifier::returning(happy_scores());
        let detector = StubDetector::returning(vec![Err("model exploded".into())]);
        let mut p = poller(detector, classifier);

        assert!(p.tick().is_err());
        assert_eq!(calls.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_tick_classifier_error_propagates() {
        let (mut classifier, _) = StubClassifier::returning(happy_scores());
        classifier.fail = true;
        let detector = StubDetector::returning(vec![Ok(vec![face(0, 20, 20)])]);
        let mut p = poller(detector, classifier);

        assert!(p.tick().is_err());
    }

    #[test]
    fn test_tick_capture_error_skips_detection() {
        let (classifier, _) = StubClassifier::returning(happy_scores());
        let detector = StubDetector::returning(vec![Ok(vec![])]);
        let mut p = MoodPoller::new(
            Box::new(StubSource { fail: true }),
            Box::new(detector),
            Box::new(classifier),
        );

        assert!(p.tick().is_err());
    }

    // --- run ---

    #[test]
    fn test_run_emits_once_per_successful_tick() {
        let (classifier, _) = StubClassifier::returning(happy_scores());
        let detector = StubDetector::returning(vec![Ok(vec![face(0, 20, 20)])]);
        let mut p = poller(detector, classifier);

        let cancelled = AtomicBool::new(false);
        let mut moods = Vec::new();
        p.run(Duration::ZERO, &cancelled, &mut |outcome| {
            moods.push(outcome.mood);
            moods.len() < 3
        });

        assert_eq!(moods.len(), 3);
        assert!(moods
            .iter()
            .all(|&m| m == Mood::Detected(Expression::Happy)));
    }

    #[test]
    fn test_run_failed_tick_emits_nothing_and_continues() {
        let (classifier, _) = StubClassifier::returning(happy_scores());
        // Tick 1 fails, tick 2 finds no face, tick 3 finds a face
        let detector = StubDetector::returning(vec![
            Err("transient".into()),
            Ok(vec![]),
            Ok(vec![face(0, 20, 20)]),
        ]);
        let mut p = poller(detector, classifier);

        let cancelled = AtomicBool::new(false);
        let mut moods = Vec::new();
        p.run(Duration::ZERO, &cancelled, &mut |outcome| {
            moods.push(outcome.mood);
            moods.len() < 2
        });

        assert_eq!(
            moods,
            vec![Mood::NoFace, Mood::Detected(Expression::Happy)]
        );
    }

    #[test]
    fn test_run_stops_when_cancelled_before_start() {
        let (classifier, calls) = StubClassifier::returning(happy_scores());
        let detector = StubDetector::returning(vec![Ok(vec![face(0, 20, 20)])]);
        let mut p = poller(detector, classifier);

        let cancelled = AtomicBool::new(true);
        let mut emitted = 0;
        p.run(Duration::ZERO, &cancelled, &mut |_| {
            emitted += 1;
            true
        });

        assert_eq!(emitted, 0);
        assert_eq!(calls.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_run_token_cancel_stops_after_current_emission() {
        let (classifier, _) = StubClassifier::returning(happy_scores());
        let detector = StubDetector::returning(vec![Ok(vec![face(0, 20, 20)])]);
        let mut p = poller(detector, classifier);

        let cancelled = AtomicBool::new(false);
        let mut emitted = 0;
        p.run(Duration::ZERO, &cancelled, &mut |_| {
            emitted += 1;
            // Flip the token but keep returning true; the loop must
            // still stop and never emit again
            cancelled.store(true, Ordering::Relaxed);
            true
        });

        assert_eq!(emitted, 1);
    }

    #[test]
    fn test_run_callback_false_stops_loop() {
        let (classifier, _) = StubClassifier::returning(happy_scores());
        let detector = StubDetector::returning(vec![Ok(vec![face(0, 20, 20)])]);
        let mut p = poller(detector, classifier);

        let cancelled = AtomicBool::new(false);
        let mut emitted = 0;
        p.run(Duration::ZERO, &cancelled, &mut |_| {
            emitted += 1;
            false
        });

        assert_eq!(emitted, 1);
    }

    // --- largest_face ---

    #[test]
    fn test_largest_face_empty() {
        assert!(largest_face(&[]).is_none());
    }

    #[test]
    fn test_largest_face_picks_by_area_not_confidence() {
        let mut small_confident = face(0, 10, 10);
        small_confident.confidence = 0.99;
        let big = face(100, 40, 40);
        let faces = vec![small_confident, big];
        assert_eq!(largest_face(&faces).unwrap().x, 100);
    }
}
