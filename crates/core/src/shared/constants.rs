pub const DETECTOR_MODEL_NAME: &str = "version-RFB-320.onnx";
pub const DETECTOR_MODEL_URL: &str =
    "https://github.com/onnx/models/raw/main/validated/vision/body_analysis/ultraface/models/version-RFB-320.onnx";

pub const EXPRESSION_MODEL_NAME: &str = "emotion-ferplus-8.onnx";
pub const EXPRESSION_MODEL_URL: &str =
    "https://github.com/onnx/models/raw/main/validated/vision/body_analysis/emotion_ferplus/model/emotion-ferplus-8.onnx";

/// Capture resolution requested from the camera.
pub const VIDEO_WIDTH: u32 = 640;
pub const VIDEO_HEIGHT: u32 = 480;

/// Period of the detection polling loop.
pub const DEFAULT_INTERVAL_MS: u64 = 500;

/// Face detection confidence threshold.
pub const DEFAULT_CONFIDENCE: f64 = 0.7;
