use ndarray::ArrayView3;

use crate::shared::face_box::FaceBox;

/// A single camera frame: contiguous RGB bytes in row-major order.
///
/// Pixel format conversion happens at capture boundaries only; detection
/// and classification treat the data as an opaque RGB plane.
#[derive(Clone, Debug)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * 3,
            "data length must equal width * height * 3"
        );
        Self {
            data,
            width,
            height,
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// View as `(height, width, 3)` for tensor preprocessing.
    pub fn as_ndarray(&self) -> ArrayView3<'_, u8> {
        ArrayView3::from_shape(
            (self.height as usize, self.width as usize, 3),
            &self.data,
        )
        .expect("Frame data length must match dimensions")
    }

    /// Copies out the pixels under `region`, clamped to the frame bounds.
    ///
    /// Returns `None` when the clamped region is empty.
    pub fn crop(&self, region: &FaceBox) -> Option<Frame> {
        let r = region.clamped(self.width, self.height);
        if r.width <= 0 || r.height <= 0 {
            return None;
        }

        let (x1, y1) = (r.x as usize, r.y as usize);
        let (w, h) = (r.width as usize, r.height as usize);
        let stride = self.width as usize * 3;

        let mut data = Vec::with_capacity(w * h * 3);
        for row in y1..y1 + h {
            let start = row * stride + x1 * 3;
            data.extend_from_slice(&self.data[start..start + w * 3]);
        }

        Some(Frame::new(data, w as u32, h as u32))
    }

    /// Expands to RGBA with full alpha, for display surfaces that want
    /// four channels.
    pub fn to_rgba(&self) -> Vec<u8> {
        let mut rgba = Vec::with_capacity(self.data.len() / 3 * 4);
        for px in self.data.chunks_exact(3) {
            rgba.extend_from_slice(px);
            rgba.push(0xff);
        }
        rgba
    }
}
