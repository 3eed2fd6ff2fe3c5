use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::Receiver;
use iced::widget::{button, column, container, row, scrollable, text};
use iced::{Element, Length, Subscription, Task, Theme};

use moodcam_core::expression::domain::expression::Mood;

use crate::overlay;
use crate::settings::{Appearance, Settings};
use crate::tabs;
use crate::theme;
use crate::workers::detector_worker::{self, DetectorMessage, DetectorParams};
use crate::workers::model_cache::ModelCache;

const MODEL_ZOO_URL: &str = "https://github.com/onnx/models";

/// How often the UI drains the detector channel.
const POLL_MS: u64 = 100;

// ---------------------------------------------------------------------------
// Tab enum
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Live,
    Settings,
    About,
}

impl Tab {
    const ALL: &[Tab] = &[Tab::Live, Tab::Settings, Tab::About];

    fn label(self) -> &'static str {
        match self {
            Tab::Live => "Live",
            Tab::Settings => "Settings",
            Tab::About => "About",
        }
    }
}

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub enum Message {
    TabSelected(Tab),
    PollDetector,
    OpenModelZoo,
    CameraChanged(u32),
    IntervalChanged(u32),
    ConfidenceChanged(u32),
    /// Restart the worker with the current camera settings (slider release).
    ApplyDetectorSettings,
    OverlayToggled(bool),
    MirrorToggled(bool),
    AppearanceChanged(Appearance),
    RestoreDefaults,
}

/// Detection feature state, as shown on the live tab.
pub enum DetectorState {
    Loading { downloaded: u64, total: u64 },
    Active,
    Failed(String),
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

pub struct App {
    active_tab: Tab,
    pub settings: Settings,
    detector: DetectorState,
    mood: Mood,
    feed: Option<iced::widget::image::Handle>,
    rx: Option<Receiver<DetectorMessage>>,
    cancel: Option<Arc<AtomicBool>>,
    model_cache: Arc<ModelCache>,
}

impl App {
    pub fn new() -> (Self, Task<Message>) {
        let mut app = Self {
            active_tab: Tab::Live,
            settings: Settings::load(),
            detector: DetectorState::Loading {
                downloaded: 0,
                total: 0,
            },
            mood: Mood::NoFace,
            feed: None,
            rx: None,
            cancel: None,
            model_cache: ModelCache::new(),
        };
        app.start_detector();
        (app, Task::none())
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::TabSelected(tab) => {
                self.active_tab = tab;
            }
            Message::PollDetector => {
                self.drain_detector();
            }
            Message::OpenModelZoo => {
                let _ = open::that(MODEL_ZOO_URL);
            }
            Message::CameraChanged(index) => {
                self.settings.camera_index = index;
                self.settings.save();
                self.start_detector();
            }
            Message::IntervalChanged(ms) => {
                self.settings.interval_ms = ms as u64;
                self.settings.save();
            }
            Message::ConfidenceChanged(pct) => {
                self.settings.confidence = pct;
                self.settings.save();
            }
            Message::ApplyDetectorSettings => {
                self.start_detector();
            }
            Message::OverlayToggled(enabled) => {
                self.settings.show_overlay = enabled;
                self.settings.save();
            }
            Message::MirrorToggled(enabled) => {
                self.settings.mirror = enabled;
                self.settings.save();
            }
            Message::AppearanceChanged(appearance) => {
                self.settings.appearance = appearance;
                self.settings.save();
            }
            Message::RestoreDefaults => {
                self.settings = Settings::default();
                self.settings.save();
                self.start_detector();
            }
        }
        Task::none()
    }

    pub fn view(&self) -> Element<'_, Message> {
        // Tab bar
        let tab_bar = row(Tab::ALL
            .iter()
            .map(|&tab| {
                let label = text(tab.label()).size(13);
                let btn = button(label)
                    .on_press(Message::TabSelected(tab))
                    .padding([6, 14]);
                if tab == self.active_tab {
                    btn.style(button::primary).into()
                } else {
                    btn.style(button::text).into()
                }
            })
            .collect::<Vec<_>>())
        .spacing(2);

        // Tab content
        let content: Element<'_, Message> = match self.active_tab {
            Tab::Live => tabs::live_tab::view(&self.detector, self.mood, self.feed.as_ref()),
            Tab::Settings => container(scrollable(tabs::settings_tab::view(&self.settings)))
                .padding(16)
                .into(),
            Tab::About => container(scrollable(tabs::about_tab::view()))
                .padding(16)
                .into(),
        };

        let tab_content = container(content).height(Length::Fill);

        column![tab_bar, tab_content]
            .spacing(0)
            .height(Length::Fill)
            .into()
    }

    pub fn theme(&self) -> Theme {
        theme::resolve_theme(self.settings.appearance)
    }

    pub fn subscription(&self) -> Subscription<Message> {
        if self.rx.is_some() {
            iced::time::every(Duration::from_millis(POLL_MS)).map(|_| Message::PollDetector)
        } else {
            Subscription::none()
        }
    }

    /// (Re)starts the detector worker with the current settings.
    fn start_detector(&mut self) {
        self.stop_detector();
        self.detector = DetectorState::Loading {
            downloaded: 0,
            total: 0,
        };
        self.feed = None;
        self.mood = Mood::NoFace;

        let (rx, cancel) = detector_worker::spawn(DetectorParams {
            camera_index: self.settings.camera_index,
            interval_ms: self.settings.interval_ms,
            confidence: self.settings.confidence,
            model_cache: self.model_cache.clone(),
        });
        self.rx = Some(rx);
        self.cancel = Some(cancel);
    }

    fn stop_detector(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel.store(true, Ordering::Relaxed);
        }
        self.rx = None;
    }

    fn drain_detector(&mut self) {
        let Some(rx) = self.rx.as_ref() else {
            return;
        };

        let messages: Vec<DetectorMessage> = rx.try_iter().collect();
        for message in messages {
            match message {
                DetectorMessage::DownloadProgress(downloaded, total) => {
                    self.detector = DetectorState::Loading { downloaded, total };
                }
                DetectorMessage::Ready { width, height } => {
                    log::info!("Detection active at {width}x{height}");
                    self.detector = DetectorState::Active;
                }
                DetectorMessage::Tick { mood, faces, frame } => {
                    self.mood = mood;
                    let (w, h) = (frame.width(), frame.height());
                    let mut rgba = frame.to_rgba();
                    if self.settings.show_overlay {
                        overlay::draw_face_boxes(&mut rgba, w, h, &faces);
                    }
                    if self.settings.mirror {
                        overlay::mirror_horizontal(&mut rgba, w, h);
                    }
                    self.feed = Some(iced::widget::image::Handle::from_rgba(w, h, rgba));
                }
                DetectorMessage::Error(error) => {
                    self.detector = DetectorState::Failed(error);
                    self.rx = None;
                }
                DetectorMessage::Cancelled => {}
            }
        }
    }
}

impl Drop for App {
    fn drop(&mut self) {
        // The worker must never keep polling after the view is gone.
        self.stop_detector();
    }
}
