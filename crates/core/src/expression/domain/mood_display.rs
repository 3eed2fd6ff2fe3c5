use crate::expression::domain::expression::{Expression, Mood};

/// Backdrop color shown when no expression is available.
pub const DEFAULT_COLOR: [u8; 3] = [0xf0, 0xf0, 0xf0];

pub const DEFAULT_LABEL: &str = "No face detected";

/// Background color for a published mood.
///
/// Pure lookup; the sentinel and anything without a table entry fall back
/// to the neutral gray default.
pub fn color(mood: Mood) -> [u8; 3] {
    match mood {
        Mood::Detected(Expression::Neutral) => [0xf0, 0xf0, 0xf0],
        Mood::Detected(Expression::Happy) => [0xe6, 0xff, 0xcc],
        Mood::Detected(Expression::Sad) => [0xcc, 0xe6, 0xff],
        Mood::Detected(Expression::Angry) => [0xff, 0xcc, 0xcc],
        Mood::Detected(Expression::Fearful) => [0xff, 0xf0, 0xb3],
        Mood::Detected(Expression::Disgusted) => [0xd9, 0xb3, 0x8c],
        Mood::Detected(Expression::Surprised) => [0xe6, 0xcc, 0xff],
        Mood::NoFace => DEFAULT_COLOR,
    }
}

/// Human-readable label for a published mood.
pub fn label(mood: Mood) -> &'static str {
    match mood {
        Mood::Detected(Expression::Neutral) => "Neutral",
        Mood::Detected(Expression::Happy) => "Happy \u{1F60A}",
        Mood::Detected(Expression::Sad) => "Sad \u{1F622}",
        Mood::Detected(Expression::Angry) => "Angry \u{1F620}",
        Mood::Detected(Expression::Fearful) => "Fearful \u{1F628}",
        Mood::Detected(Expression::Disgusted) => "Disgusted \u{1F922}",
        Mood::Detected(Expression::Surprised) => "Surprised \u{1F62E}",
        Mood::NoFace => DEFAULT_LABEL,
    }
}
