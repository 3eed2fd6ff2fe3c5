use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender};

use moodcam_core::capture::domain::frame_source::FrameSource;
use moodcam_core::capture::infrastructure::camera_source::CameraSource;
use moodcam_core::detection::infrastructure::ultraface_detector::UltrafaceDetector;
use moodcam_core::expression::domain::expression::Mood;
use moodcam_core::expression::infrastructure::ferplus_classifier::FerPlusClassifier;
use moodcam_core::poll::mood_poller::MoodPoller;
use moodcam_core::shared::face_box::FaceBox;
use moodcam_core::shared::frame::Frame;

use super::model_cache::ModelCache;

/// Messages sent from the detection thread to the UI.
pub enum DetectorMessage {
    DownloadProgress(u64, u64),
    /// Models loaded and camera opened; polling is about to start.
    Ready {
        width: u32,
        height: u32,
    },
    /// One successful poll tick.
    Tick {
        mood: Mood,
        faces: Vec<FaceBox>,
        frame: Frame,
    },
    Error(String),
    Cancelled,
}

pub struct DetectorParams {
    pub camera_index: u32,
    pub interval_ms: u64,
    pub confidence: u32,
    pub model_cache: Arc<ModelCache>,
}

/// Spawn the background detection worker. Returns the channel receiver
/// and cancellation token.
pub fn spawn(params: DetectorParams) -> (Receiver<DetectorMessage>, Arc<AtomicBool>) {
    let (tx, rx) = crossbeam_channel::unbounded::<DetectorMessage>();
    let cancelled = Arc::new(AtomicBool::new(false));
    let cancelled_clone = cancelled.clone();

    thread::spawn(move || {
        if let Err(e) = run_detection(&tx, &cancelled_clone, &params) {
            if cancelled_clone.load(Ordering::Relaxed) {
                let _ = tx.send(DetectorMessage::Cancelled);
            } else {
                log::error!("Detector worker failed: {e}");
                let _ = tx.send(DetectorMessage::Error(e.to_string()));
            }
        }
    });

    (rx, cancelled)
}

fn run_detection(
    tx: &Sender<DetectorMessage>,
    cancelled: &Arc<AtomicBool>,
    params: &DetectorParams,
) -> Result<(), Box<dyn std::error::Error>> {
    let confidence = params.confidence as f64 / 100.0;

    // Wait for models (pre-resolved at startup or download in progress)
    let tx_dl = tx.clone();
    let detector_path = params
        .model_cache
        .wait_for_detector(
            &|dl, total| {
                let _ = tx_dl.send(DetectorMessage::DownloadProgress(dl, total));
            },
            cancelled,
        )
        .map_err(|e| -> Box<dyn std::error::Error> { e.into() })?;

    let tx_dl = tx.clone();
    let expression_path = params
        .model_cache
        .wait_for_expression(
            &|dl, total| {
                let _ = tx_dl.send(DetectorMessage::DownloadProgress(dl, total));
            },
            cancelled,
        )
        .map_err(|e| -> Box<dyn std::error::Error> { e.into() })?;

    if cancelled.load(Ordering::Relaxed) {
        return Err("Cancelled".into());
    }

    let detector = UltrafaceDetector::new(&detector_path, confidence)?;
    let classifier = FerPlusClassifier::new(&expression_path)?;

    let mut source = CameraSource::new(params.camera_index);
    let (width, height) = source.open()?;
    let _ = tx.send(DetectorMessage::Ready { width, height });

    let mut poller = MoodPoller::new(
        Box::new(source),
        Box::new(detector),
        Box::new(classifier),
    );

    let tx_tick = tx.clone();
    let cancelled_tick = cancelled.clone();
    poller.run(
        Duration::from_millis(params.interval_ms),
        cancelled,
        &mut |outcome| {
            let _ = tx_tick.send(DetectorMessage::Tick {
                mood: outcome.mood,
                faces: outcome.faces,
                frame: outcome.frame,
            });
            !cancelled_tick.load(Ordering::Relaxed)
        },
    );

    Ok(())
}
