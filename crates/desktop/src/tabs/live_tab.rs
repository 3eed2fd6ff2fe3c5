use iced::widget::{column, container, progress_bar, text, Space};
use iced::{Color, Element, Length};

use moodcam_core::expression::domain::expression::Mood;
use moodcam_core::expression::domain::mood_display;

use crate::app::{DetectorState, Message};
use crate::theme;

pub fn view<'a>(
    detector: &'a DetectorState,
    mood: Mood,
    feed: Option<&'a iced::widget::image::Handle>,
) -> Element<'a, Message> {
    let content: Element<'_, Message> = match detector {
        DetectorState::Loading { downloaded, total } => loading_view(*downloaded, *total),
        DetectorState::Failed(error) => failed_view(error),
        DetectorState::Active => active_view(mood, feed),
    };

    // The whole tab is washed with the mood color, like the original
    // page background.
    let backdrop = theme::mood_backdrop(mood);
    container(content)
        .width(Length::Fill)
        .height(Length::Fill)
        .center_x(Length::Fill)
        .center_y(Length::Fill)
        .style(move |_theme| container::Style {
            background: Some(iced::Background::Color(backdrop)),
            ..container::Style::default()
        })
        .into()
}

fn loading_view(downloaded: u64, total: u64) -> Element<'static, Message> {
    let mut col = column![text("Loading detection models, please wait\u{2026}").size(16)]
        .spacing(12)
        .align_x(iced::Alignment::Center);

    if total > 0 {
        let pct = downloaded as f32 / total as f32 * 100.0;
        col = col.push(progress_bar(0.0..=100.0, pct));
    }

    col.into()
}

fn failed_view(error: &str) -> Element<'static, Message> {
    column![
        text("Detection is unavailable").size(18),
        Space::new().height(6),
        text(format!("Model loading failed: {error}"))
            .size(13)
            .color(Color::from_rgb8(0xd7, 0x00, 0x15)),
        Space::new().height(6),
        text("Check your network connection and restart the app.").size(13),
    ]
    .align_x(iced::Alignment::Center)
    .into()
}

fn active_view<'a>(
    mood: Mood,
    feed: Option<&'a iced::widget::image::Handle>,
) -> Element<'a, Message> {
    let video: Element<'_, Message> = match feed {
        Some(handle) => iced::widget::image(handle.clone())
            .width(Length::Fixed(640.0))
            .into(),
        None => text("Waiting for the first camera frame\u{2026}")
            .size(14)
            .into(),
    };

    column![
        video,
        Space::new().height(14),
        text(mood_display::label(mood))
            .size(26)
            .color(Color::from_rgb8(0x1d, 0x1d, 0x1f)),
    ]
    .align_x(iced::Alignment::Center)
    .into()
}
