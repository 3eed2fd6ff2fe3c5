/// A detected face's bounding box in frame coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct FaceBox {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub confidence: f32,
}

impl FaceBox {
    pub fn area(&self) -> i64 {
        self.width.max(0) as i64 * self.height.max(0) as i64
    }

    pub fn iou(&self, other: &FaceBox) -> f64 {
        let ix1 = self.x.max(other.x);
        let iy1 = self.y.max(other.y);
        let ix2 = (self.x + self.width).min(other.x + other.width);
        let iy2 = (self.y + self.height).min(other.y + other.height);

        let inter = (ix2 - ix1).max(0) as f64 * (iy2 - iy1).max(0) as f64;
        if inter == 0.0 {
            return 0.0;
        }

        let area_a = self.area() as f64;
        let area_b = other.area() as f64;
        inter / (area_a + area_b - inter)
    }

    /// Clamps the box to `width × height`, shrinking it as needed.
    pub fn clamped(&self, width: u32, height: u32) -> FaceBox {
        let x = self.x.clamp(0, width as i32);
        let y = self.y.clamp(0, height as i32);
        FaceBox {
            x,
            y,
            width: (self.x + self.width).clamp(0, width as i32) - x,
            height: (self.y + self.height).clamp(0, height as i32) - y,
            confidence: self.confidence,
        }
    }

    /// Grows the box to a square with `margin` (fraction of the longer
    /// side) of context on each side, centered on the original box.
    ///
    /// Classifier inputs are square; cropping with a little surrounding
    /// context matches how the expression model was trained.
    pub fn square_expanded(&self, margin: f64) -> FaceBox {
        let cx = self.x as f64 + self.width as f64 / 2.0;
        let cy = self.y as f64 + self.height as f64 / 2.0;
        let side = self.width.max(self.height) as f64 * (1.0 + 2.0 * margin);
        let half = side / 2.0;
        FaceBox {
            x: (cx - half).round() as i32,
            y: (cy - half).round() as i32,
            width: side.round() as i32,
            height: side.round() as i32,
            confidence: self.confidence,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    fn face_box(x: i32, y: i32, w: i32, h: i32) -> FaceBox {
        FaceBox {
            x,
            y,
            width: w,
            height: h,
            confidence: 0.9,
        }
    }

    // ── IoU ──────────────────────────────────────────────────────────

    #[test]
    fn test_iou_identical_boxes() {
        let a = face_box(10, 10, 100, 100);
        assert_relative_eq!(a.iou(&a), 1.0);
    }

    #[test]
    fn test_iou_no_overlap() {
        let a = face_box(0, 0, 50, 50);
        let b = face_box(100, 100, 50, 50);
        assert_relative_eq!(a.iou(&b), 0.0);
    }

    #[test]
    fn test_iou_partial_overlap() {
        // intersection: 50*100 = 5000, union: 15000
        let a = face_box(0, 0, 100, 100);
        let b = face_box(50, 0, 100, 100);
        assert_relative_eq!(a.iou(&b), 5000.0 / 15000.0);
    }

    #[rstest]
    #[case::zero_width(face_box(0, 0, 0, 100), face_box(0, 0, 50, 50))]
    #[case::zero_height(face_box(0, 0, 100, 0), face_box(0, 0, 50, 50))]
    fn test_iou_degenerate(#[case] a: FaceBox, #[case] b: FaceBox) {
        assert_relative_eq!(a.iou(&b), 0.0);
    }

    // ── Clamping ─────────────────────────────────────────────────────

    #[test]
    fn test_clamped_inside_is_unchanged() {
        let b = face_box(10, 20, 30, 40);
        assert_eq!(b.clamped(640, 480), b);
    }

    #[test]
    fn test_clamped_shrinks_at_edges() {
        let b = face_box(-10, -5, 50, 50).clamped(640, 480);
        assert_eq!(b.x, 0);
        assert_eq!(b.y, 0);
        assert_eq!(b.width, 40);
        assert_eq!(b.height, 45);
    }

    #[test]
    fn test_clamped_beyond_far_edge() {
        let b = face_box(600, 450, 100, 100).clamped(640, 480);
        assert_eq!(b.width, 40);
        assert_eq!(b.height, 30);
    }

    #[test]
    fn test_clamped_fully_outside_is_empty() {
        let b = face_box(700, 500, 50, 50).clamped(640, 480);
        assert_eq!(b.area(), 0);
    }

    // ── Square expansion ─────────────────────────────────────────────

    #[test]
    fn test_square_expanded_no_margin_uses_max_dim() {
        let b = face_box(40, 35, 10, 30).square_expanded(0.0);
        assert_eq!(b.width, 30);
        assert_eq!(b.height, 30);
        // Centered on (45, 50)
        assert_eq!(b.x, 30);
        assert_eq!(b.y, 35);
    }

    #[test]
    fn test_square_expanded_margin_grows_side() {
        let b = face_box(0, 0, 100, 100).square_expanded(0.2);
        assert_eq!(b.width, 140);
        assert_eq!(b.height, 140);
        assert_eq!(b.x, -20);
        assert_eq!(b.y, -20);
    }

    #[test]
    fn test_area_negative_dims_is_zero() {
        let b = FaceBox {
            x: 0,
            y: 0,
            width: -3,
            height: 10,
            confidence: 0.5,
        };
        assert_eq!(b.area(), 0);
    }
}
