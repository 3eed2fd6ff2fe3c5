use moodcam_core::shared::face_box::FaceBox;

const BOX_COLOR: [u8; 3] = [0x34, 0xc7, 0x59];
const BOX_THICKNESS: i32 = 2;

/// Draws detection rectangles into an RGBA buffer, in place.
///
/// Boxes partially outside the buffer are clipped pixel-by-pixel.
pub fn draw_face_boxes(rgba: &mut [u8], width: u32, height: u32, faces: &[FaceBox]) {
    for face in faces {
        let x2 = face.x + face.width;
        let y2 = face.y + face.height;
        for t in 0..BOX_THICKNESS {
            for x in face.x..x2 {
                put_pixel(rgba, width, height, x, face.y + t);
                put_pixel(rgba, width, height, x, y2 - 1 - t);
            }
            for y in face.y..y2 {
                put_pixel(rgba, width, height, face.x + t, y);
                put_pixel(rgba, width, height, x2 - 1 - t, y);
            }
        }
    }
}

/// Mirrors an RGBA buffer left-to-right, in place. Webcam views are
/// conventionally shown mirrored so the feed moves like a reflection.
pub fn mirror_horizontal(rgba: &mut [u8], width: u32, height: u32) {
    let w = width as usize;
    for row in 0..height as usize {
        let start = row * w * 4;
        for col in 0..w / 2 {
            let a = start + col * 4;
            let b = start + (w - 1 - col) * 4;
            for c in 0..4 {
                rgba.swap(a + c, b + c);
            }
        }
    }
}

fn put_pixel(rgba: &mut [u8], width: u32, height: u32, x: i32, y: i32) {
    if x < 0 || y < 0 || x >= width as i32 || y >= height as i32 {
        return;
    }
    let idx = (y as usize * width as usize + x as usize) * 4;
    rgba[idx] = BOX_COLOR[0];
    rgba[idx + 1] = BOX_COLOR[1];
    rgba[idx + 2] = BOX_COLOR[2];
}
