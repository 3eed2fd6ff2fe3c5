use iced::widget::{button, checkbox, column, pick_list, row, slider, text};
use iced::Element;

use crate::app::Message;
use crate::settings::{Appearance, Settings};

const CAMERA_INDICES: [u32; 4] = [0, 1, 2, 3];

pub fn view(settings: &Settings) -> Element<'_, Message> {
    let camera = row![
        text("Camera").size(13).width(140),
        pick_list(
            CAMERA_INDICES,
            Some(settings.camera_index),
            Message::CameraChanged,
        ),
    ]
    .spacing(10)
    .align_y(iced::Alignment::Center);

    let interval = row![
        text("Polling interval").size(13).width(140),
        slider(
            100..=2000u32,
            settings.interval_ms as u32,
            Message::IntervalChanged,
        )
        .step(50u32)
        .on_release(Message::ApplyDetectorSettings),
        text(format!("{} ms", settings.interval_ms)).size(13),
    ]
    .spacing(10)
    .align_y(iced::Alignment::Center);

    let confidence = row![
        text("Detection confidence").size(13).width(140),
        slider(
            10..=100u32,
            settings.confidence,
            Message::ConfidenceChanged,
        )
        .on_release(Message::ApplyDetectorSettings),
        text(format!("{}%", settings.confidence)).size(13),
    ]
    .spacing(10)
    .align_y(iced::Alignment::Center);

    let overlay = checkbox(settings.show_overlay)
        .label("Draw face boxes on the preview")
        .on_toggle(Message::OverlayToggled);

    let mirror = checkbox(settings.mirror)
        .label("Mirror the preview")
        .on_toggle(Message::MirrorToggled);

    let appearance = row![
        text("Appearance").size(13).width(140),
        pick_list(
            Appearance::ALL,
            Some(settings.appearance),
            Message::AppearanceChanged,
        ),
    ]
    .spacing(10)
    .align_y(iced::Alignment::Center);

    column![
        text("Settings").size(16),
        camera,
        interval,
        confidence,
        overlay,
        mirror,
        appearance,
        button(text("Restore Defaults").size(13))
            .on_press(Message::RestoreDefaults)
            .padding([8, 16]),
    ]
    .spacing(12)
    .into()
}
