// Submodules
mod message;
mod message_handlers;

// Re-exports
pub use message::Message;

use std::path::PathBuf;

#[allow(unused_imports)]
use log::{debug, error, info, warn};

use iced::widget::image::Handle;
use iced::{Element, Size, Task, Theme};

use crate::build_info::BuildInfo;
use crate::config::{Config, DEFAULT_WINDOW_HEIGHT, DEFAULT_WINDOW_WIDTH};
use crate::detection::client::{DetectionClient, DetectionError};
use crate::logging::LogBuffer;
use crate::overlay::OverlayStyle;
use crate::session::DetectionSession;
use crate::ui;
use crate::viewer::{ScanDecoder, Viewer};

pub struct ScanLens {
    pub config: Config,
    pub viewer: Viewer,
    pub session: DetectionSession,
    pub client: Result<DetectionClient, DetectionError>,
    pub image_handle: Option<Handle>,   // GPU-side copy of the viewer's raster
    pub log_buffer: LogBuffer,
}

impl ScanLens {
    pub fn new(config: Config, log_buffer: LogBuffer) -> Self {
        let viewer = Viewer::new(
            Box::new(ScanDecoder),
            config.viewport_width.round() as u32,
            config.viewport_height.round() as u32,
        );

        let client = DetectionClient::new(&config.detection_endpoint, &config.api_key);
        if let Err(e) = &client {
            error!("Failed to create detection client: {}", e);
        }

        Self {
            config,
            viewer,
            session: DetectionSession::new(),
            client,
            image_handle: None,
            log_buffer,
        }
    }

    pub fn title(&self) -> String {
        match self.session.file_name() {
            Some(name) => format!("{} - ScanLens", name),
            None => format!("ScanLens {}", BuildInfo::display_version()),
        }
    }

    pub fn overlay_style(&self) -> OverlayStyle {
        OverlayStyle {
            label_font_size: self.config.label_font_size,
        }
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        message_handlers::handle_message(self, message)
    }

    pub fn view(&self) -> Element<'_, Message> {
        ui::build_ui(self)
    }
}

pub fn run(config: Config, log_buffer: LogBuffer, initial_file: Option<PathBuf>) -> iced::Result {
    info!("Starting GUI, detection endpoint {}", config.detection_endpoint);

    iced::application(ScanLens::title, ScanLens::update, ScanLens::view)
        .window_size(Size::new(DEFAULT_WINDOW_WIDTH, DEFAULT_WINDOW_HEIGHT))
        .theme(|_| Theme::Dark)
        .run_with(move || {
            let app = ScanLens::new(config, log_buffer);
            let startup = match initial_file {
                Some(path) => message_handlers::read_file_task(path),
                None => Task::none(),
            };
            (app, startup)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_tracks_loaded_file() {
        let mut app = ScanLens::new(Config::default(), LogBuffer::default());
        assert!(app.title().starts_with("ScanLens "));

        app.session.file_loaded("chest.png");
        assert_eq!(app.title(), "chest.png - ScanLens");
    }

    #[test]
    fn test_viewer_uses_configured_viewport() {
        let mut config = Config::default();
        config.viewport_width = 400.0;
        config.viewport_height = 300.0;
        let app = ScanLens::new(config, LogBuffer::default());
        assert_eq!(app.viewer.viewport_size(), (400, 300));
    }
}
