use std::path::PathBuf;
use std::process;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use clap::Parser;

use moodcam_core::capture::domain::frame_source::FrameSource;
use moodcam_core::capture::infrastructure::camera_source::{self, CameraSource};
use moodcam_core::capture::infrastructure::image_file_source::ImageFileSource;
use moodcam_core::detection::domain::face_detector::FaceDetector;
use moodcam_core::detection::infrastructure::ultraface_detector::UltrafaceDetector;
use moodcam_core::expression::domain::expression_classifier::ExpressionClassifier;
use moodcam_core::expression::domain::mood_display;
use moodcam_core::expression::infrastructure::ferplus_classifier::FerPlusClassifier;
use moodcam_core::poll::mood_poller::MoodPoller;
use moodcam_core::shared::constants::{
    DEFAULT_CONFIDENCE, DEFAULT_INTERVAL_MS, DETECTOR_MODEL_NAME, DETECTOR_MODEL_URL,
    EXPRESSION_MODEL_NAME, EXPRESSION_MODEL_URL,
};
use moodcam_core::shared::model_resolver;

/// Webcam mood detection on the terminal.
#[derive(Parser)]
#[command(name = "moodcam")]
struct Cli {
    /// Image file to analyze once instead of polling the camera.
    image: Option<PathBuf>,

    /// Camera index to open.
    #[arg(long, default_value = "0")]
    camera: u32,

    /// Polling interval in milliseconds.
    #[arg(long, default_value_t = DEFAULT_INTERVAL_MS)]
    interval_ms: u64,

    /// Face detection confidence threshold (0.0-1.0).
    #[arg(long, default_value_t = DEFAULT_CONFIDENCE)]
    confidence: f64,

    /// Stop after this many emissions (0 = run until interrupted).
    #[arg(long, default_value = "0")]
    ticks: usize,

    /// Directory holding pre-downloaded model files.
    #[arg(long, env = "MOODCAM_MODEL_DIR")]
    model_dir: Option<PathBuf>,

    /// List attached cameras and exit.
    #[arg(long)]
    list_cameras: bool,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    if cli.list_cameras {
        for line in camera_source::list_cameras()? {
            println!("{line}");
        }
        return Ok(());
    }

    let detector = build_detector(&cli)?;
    let classifier = build_classifier(&cli)?;

    let mut source: Box<dyn FrameSource> = match &cli.image {
        Some(path) => Box::new(ImageFileSource::new(path)),
        None => Box::new(CameraSource::new(cli.camera)),
    };
    let (width, height) = source.open()?;
    log::info!("Capture ready at {width}x{height}");

    let mut poller = MoodPoller::new(source, detector, classifier);

    if cli.image.is_some() {
        let outcome = poller.tick()?;
        println!("{}", mood_display::label(outcome.mood));
        return Ok(());
    }

    let limit = cli.ticks;
    let mut emitted = 0usize;
    let cancelled = AtomicBool::new(false);
    poller.run(
        Duration::from_millis(cli.interval_ms),
        &cancelled,
        &mut |outcome| {
            emitted += 1;
            println!("{}", mood_display::label(outcome.mood));
            limit == 0 || emitted < limit
        },
    );

    Ok(())
}

fn build_detector(cli: &Cli) -> Result<Box<dyn FaceDetector>, Box<dyn std::error::Error>> {
    log::info!("Resolving model: {DETECTOR_MODEL_NAME}");
    let model_path = model_resolver::resolve(
        DETECTOR_MODEL_NAME,
        DETECTOR_MODEL_URL,
        cli.model_dir.as_deref(),
        Some(Box::new(|dl, total| {
            download_progress("face detection", dl, total)
        })),
    )?;
    eprintln!();

    Ok(Box::new(UltrafaceDetector::new(
        &model_path,
        cli.confidence,
    )?))
}

fn build_classifier(
    cli: &Cli,
) -> Result<Box<dyn ExpressionClassifier>, Box<dyn std::error::Error>> {
    log::info!("Resolving model: {EXPRESSION_MODEL_NAME}");
    let model_path = model_resolver::resolve(
        EXPRESSION_MODEL_NAME,
        EXPRESSION_MODEL_URL,
        cli.model_dir.as_deref(),
        Some(Box::new(|dl, total| {
            download_progress("expression", dl, total)
        })),
    )?;
    eprintln!();

    Ok(Box::new(FerPlusClassifier::new(&model_path)?))
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(ref image) = cli.image {
        if !image.exists() {
            return Err(format!("Image file not found: {}", image.display()).into());
        }
    }
    if cli.interval_ms == 0 {
        return Err("Interval must be at least 1 millisecond".into());
    }
    if !(0.0..=1.0).contains(&cli.confidence) {
        return Err(format!(
            "Confidence must be between 0.0 and 1.0, got {}",
            cli.confidence
        )
        .into());
    }
    Ok(())
}

fn download_progress(what: &str, downloaded: u64, total: u64) {
    if total > 0 {
        let pct = (downloaded as f64 / total as f64 * 100.0) as u32;
        eprint!("\rDownloading {what} model... {pct}%");
    } else {
        eprint!("\rDownloading {what} model... {downloaded} bytes");
    }
}
