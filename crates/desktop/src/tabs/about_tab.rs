use iced::widget::{button, column, text, Space};
use iced::Element;

use crate::app::Message;

pub fn view() -> Element<'static, Message> {
    let version = env!("CARGO_PKG_VERSION");

    column![
        text("Moodcam").size(22),
        Space::new().height(4),
        text(format!("Version {version}")).size(13),
        Space::new().height(12),
        text(
            "Watches your webcam and tints the window with the mood it \
             sees. Face detection and expression classification run \
             locally with pretrained UltraFace and FER+ models; no frames \
             ever leave this machine."
        )
        .size(13),
        Space::new().height(16),
        button(text("Browse the ONNX model zoo").size(13))
            .on_press(Message::OpenModelZoo)
            .padding([8, 16]),
    ]
    .spacing(0)
    .into()
}
