use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{
    ApiBackend, CameraFormat, CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType,
    Resolution,
};
use nokhwa::Camera;

use crate::capture::domain::frame_source::FrameSource;
use crate::shared::constants::{VIDEO_HEIGHT, VIDEO_WIDTH};
use crate::shared::frame::Frame;

/// Live webcam source via `nokhwa`.
///
/// Requests 640×480 and falls back to the closest format the device
/// supports; the actual resolution is reported by [`FrameSource::open`].
pub struct CameraSource {
    index: u32,
    camera: Option<Camera>,
}

// Safety: the camera handle is owned by the polling thread and never
// shared; raw device handles inside nokhwa backends are not aliased.
unsafe impl Send for CameraSource {}

impl CameraSource {
    pub fn new(index: u32) -> Self {
        Self {
            index,
            camera: None,
        }
    }
}

impl FrameSource for CameraSource {
    fn open(&mut self) -> Result<(u32, u32), Box<dyn std::error::Error>> {
        let requested = RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(
            CameraFormat::new(
                Resolution::new(VIDEO_WIDTH, VIDEO_HEIGHT),
                FrameFormat::MJPEG,
                30,
            ),
        ));

        let mut camera = Camera::new(CameraIndex::Index(self.index), requested)?;
        camera.open_stream()?;

        let resolution = camera.resolution();
        log::info!(
            "Opened camera {} ({}) at {}x{}",
            self.index,
            camera.info().human_name(),
            resolution.width(),
            resolution.height()
        );

        self.camera = Some(camera);
        Ok((resolution.width(), resolution.height()))
    }

    fn grab(&mut self) -> Result<Frame, Box<dyn std::error::Error>> {
        let camera = self
            .camera
            .as_mut()
            .ok_or("CameraSource: not opened")?;

        let buffer = camera.frame()?;
        let decoded = buffer.decode_image::<RgbFormat>()?;
        let (width, height) = decoded.dimensions();
        Ok(Frame::new(decoded.into_raw(), width, height))
    }

    fn close(&mut self) {
        if let Some(mut camera) = self.camera.take() {
            if let Err(e) = camera.stop_stream() {
                log::warn!("Failed to stop camera stream: {e}");
            }
        }
    }
}

/// Enumerate attached cameras as `(index, human name)` lines.
pub fn list_cameras() -> Result<Vec<String>, Box<dyn std::error::Error>> {
    let cameras = nokhwa::query(ApiBackend::Auto)?;
    Ok(cameras
        .iter()
        .map(|info| format!("{}: {}", info.index(), info.human_name()))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grab_without_open_returns_error() {
        let mut source = CameraSource::new(0);
        assert!(source.grab().is_err());
    }

    #[test]
    fn test_close_without_open_is_noop() {
        let mut source = CameraSource::new(0);
        source.close();
        source.close();
    }
}
