/// UltraFace face detector using ONNX Runtime via `ort`.
///
/// The RFB-320 variant is a lightweight detector that emits corner boxes
/// directly, with no anchor decoding and no landmarks. Well suited to
/// webcam-rate polling on CPU.
use std::path::Path;

use crate::detection::domain::face_detector::FaceDetector;
use crate::shared::face_box::FaceBox;
use crate::shared::frame::Frame;

/// UltraFace RFB-320 input resolution (width × height).
const INPUT_WIDTH: u32 = 320;
const INPUT_HEIGHT: u32 = 240;

/// NMS IoU threshold.
const NMS_IOU_THRESH: f64 = 0.3;

/// UltraFace detector backed by an ONNX Runtime session.
pub struct UltrafaceDetector {
    session: ort::session::Session,
    confidence: f64,
}

impl UltrafaceDetector {
    /// Load an UltraFace ONNX model.
    pub fn new(model_path: &Path, confidence: f64) -> Result<Self, Box<dyn std::error::Error>> {
        let session = ort::session::Session::builder()?.commit_from_file(model_path)?;
        Ok(Self {
            session,
            confidence,
        })
    }
}

impl FaceDetector for UltrafaceDetector {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<FaceBox>, Box<dyn std::error::Error>> {
        // 1. Preprocess: resize to 320x240, normalize to (x-127)/128, NCHW
        let input_tensor = preprocess(frame, INPUT_WIDTH, INPUT_HEIGHT);

        // 2. Inference
        let input_value = ort::value::Tensor::from_array(input_tensor)?;
        let outputs = self.session.run(ort::inputs![input_value])?;

        // UltraFace outputs two tensors:
        // - scores: [1, N, 2] (background, face)
        // - boxes:  [1, N, 4] (x1, y1, x2, y2 in [0,1])
        if outputs.len() < 2 {
            return Err(
                format!("UltraFace model expected 2 outputs, got {}", outputs.len()).into(),
            );
        }

        let scores = outputs[0].try_extract_array::<f32>()?;
        let boxes = outputs[1].try_extract_array::<f32>()?;
        let score_data = scores.as_slice().ok_or("Cannot get score slice")?;
        let box_data = boxes.as_slice().ok_or("Cannot get box slice")?;

        // 3. Decode + confidence filter + NMS
        let mut raw = decode(
            score_data,
            box_data,
            self.confidence as f32,
            frame.width(),
            frame.height(),
        );
        Ok(nms(&mut raw, NMS_IOU_THRESH))
    }
}

// ---------------------------------------------------------------------------
// Preprocessing
// ---------------------------------------------------------------------------

/// Resize frame to `width × height` and normalize to (x-127)/128 NCHW float32.
fn preprocess(frame: &Frame, width: u32, height: u32) -> ndarray::Array4<f32> {
    let src = frame.as_ndarray();
    let src_h = frame.height() as usize;
    let src_w = frame.width() as usize;
    let (w, h) = (width as usize, height as usize);

    let mut tensor = ndarray::Array4::<f32>::zeros((1, 3, h, w));

    for y in 0..h {
        let src_y = (((y as f64 + 0.5) * src_h as f64 / h as f64) as usize).min(src_h - 1);
        for x in 0..w {
            let src_x = (((x as f64 + 0.5) * src_w as f64 / w as f64) as usize).min(src_w - 1);
            for c in 0..3 {
                tensor[[0, c, y, x]] = (src[[src_y, src_x, c]] as f32 - 127.0) / 128.0;
            }
        }
    }

    tensor
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Turn raw score/box tensors into frame-coordinate boxes above the
/// confidence threshold. `score_data` is `[bg, face]` pairs; `box_data`
/// is normalized corner coordinates.
fn decode(
    score_data: &[f32],
    box_data: &[f32],
    confidence: f32,
    frame_width: u32,
    frame_height: u32,
) -> Vec<FaceBox> {
    let count = (score_data.len() / 2).min(box_data.len() / 4);
    let fw = frame_width as f32;
    let fh = frame_height as f32;

    let mut detections = Vec::new();
    for i in 0..count {
        let score = score_data[i * 2 + 1];
        if score < confidence {
            continue;
        }

        let x1 = (box_data[i * 4] * fw).max(0.0);
        let y1 = (box_data[i * 4 + 1] * fh).max(0.0);
        let x2 = (box_data[i * 4 + 2] * fw).min(fw);
        let y2 = (box_data[i * 4 + 3] * fh).min(fh);
        if x2 <= x1 || y2 <= y1 {
            continue;
        }

        detections.push(FaceBox {
            x: x1 as i32,
            y: y1 as i32,
            width: (x2 - x1) as i32,
            height: (y2 - y1) as i32,
            confidence: score,
        });
    }
    detections
}

// ---------------------------------------------------------------------------
// NMS
// ---------------------------------------------------------------------------

fn nms(detections: &mut [FaceBox], iou_thresh: f64) -> Vec<FaceBox> {
    detections.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut keep = Vec::new();
    let mut suppressed = vec![false; detections.len()];

    for i in 0..detections.len() {
        if suppressed[i] {
            continue;
        }
        keep.push(detections[i].clone());
        for j in (i + 1)..detections.len() {
            if suppressed[j] {
                continue;
            }
            if detections[i].iou(&detections[j]) > iou_thresh {
                suppressed[j] = true;
            }
        }
    }
    keep
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
