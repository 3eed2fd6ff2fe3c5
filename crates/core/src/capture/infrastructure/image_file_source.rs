use std::path::{Path, PathBuf};

use crate::capture::domain::frame_source::FrameSource;
use crate::shared::frame::Frame;

/// Adapts a single image file to the [`FrameSource`] interface.
///
/// Every `grab` returns the same decoded frame, so the polling loop can
/// run against a still photo the same way it runs against a camera.
/// Used by the CLI's single-image mode and by tests.
pub struct ImageFileSource {
    path: PathBuf,
    frame: Option<Frame>,
}

impl ImageFileSource {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            frame: None,
        }
    }
}

impl FrameSource for ImageFileSource {
    fn open(&mut self) -> Result<(u32, u32), Box<dyn std::error::Error>> {
        let img = image::open(&self.path)?.to_rgb8();
        let (width, height) = img.dimensions();
        self.frame = Some(Frame::new(img.into_raw(), width, height));
        Ok((width, height))
    }

    fn grab(&mut self) -> Result<Frame, Box<dyn std::error::Error>> {
        self.frame
            .clone()
            .ok_or_else(|| "ImageFileSource: not opened".into())
    }

    fn close(&mut self) {
        self.frame = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_test_image(dir: &Path, width: u32, height: u32) -> PathBuf {
        let path = dir.join("test.png");
        let mut img = image::RgbImage::new(width, height);
        for pixel in img.pixels_mut() {
            *pixel = image::Rgb([50, 100, 200]);
        }
        img.save(&path).unwrap();
        path
    }

    #[test]
    fn test_open_returns_dimensions() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_test_image(dir.path(), 100, 80);
        let mut source = ImageFileSource::new(&path);
        assert_eq!(source.open().unwrap(), (100, 80));
    }

    #[test]
    fn test_open_nonexistent_errors() {
        let mut source = ImageFileSource::new(Path::new("/nonexistent/test.png"));
        assert!(source.open().is_err());
    }

    #[test]
    fn test_grab_yields_rgb_pixels() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_test_image(dir.path(), 100, 80);
        let mut source = ImageFileSource::new(&path);
        source.open().unwrap();

        let frame = source.grab().unwrap();
        assert_eq!(frame.width(), 100);
        assert_eq!(frame.height(), 80);
        assert_eq!(&frame.data()[..3], &[50, 100, 200]);
    }

    #[test]
    fn test_grab_is_repeatable() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_test_image(dir.path(), 10, 10);
        let mut source = ImageFileSource::new(&path);
        source.open().unwrap();

        let a = source.grab().unwrap();
        let b = source.grab().unwrap();
        assert_eq!(a.data(), b.data());
    }

    #[test]
    fn test_grab_without_open_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_test_image(dir.path(), 10, 10);
        let mut source = ImageFileSource::new(&path);
        assert!(source.grab().is_err());
    }

    #[test]
    fn test_close_releases_frame() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_test_image(dir.path(), 10, 10);
        let mut source = ImageFileSource::new(&path);
        source.open().unwrap();
        source.close();
        assert!(source.grab().is_err());
    }
}
