use crate::settings::UserSettings;

/// Directory name for logs under the platform data dir
pub const APP_NAME: &str = "scanlens";

// Default values for configuration
// These serve as fallback values and can be used for "reset to defaults" functionality
pub const DEFAULT_MODEL_INPUT_SIZE: u32 = 640;
pub const DEFAULT_DISPLAY_SIZE: f32 = 512.0;
pub const DEFAULT_DETECTION_ENDPOINT: &str = "https://detect.roboflow.com/adr/6";
pub const DEFAULT_LABEL_FONT_SIZE: f32 = 14.0;
pub const DEFAULT_WINDOW_WIDTH: f32 = 720.0;
pub const DEFAULT_WINDOW_HEIGHT: f32 = 900.0;
pub const DEFAULT_FILE_EXTENSIONS: &[&str] = &["dcm", "png", "jpg", "jpeg", "bmp", "tif", "tiff", "webp"];

/// Runtime configuration snapshot built from user settings and CLI overrides.
/// Passed into the components that need it instead of living in a global.
#[derive(Debug, Clone)]
pub struct Config {
    pub detection_endpoint: String,
    pub api_key: String,
    pub model_input_size: u32,      // Square input resolution of the detection model
    pub viewport_width: f32,        // Rendered viewer width in pixels
    pub viewport_height: f32,       // Rendered viewer height in pixels
    pub label_font_size: f32,
    pub file_extensions: Vec<String>,
}

impl Config {
    pub fn from_settings(settings: &UserSettings) -> Self {
        Self {
            detection_endpoint: settings.detection_endpoint.clone(),
            api_key: settings.api_key.clone(),
            model_input_size: settings.model_input_size,
            viewport_width: settings.viewport_width as f32,
            viewport_height: settings.viewport_height as f32,
            label_font_size: settings.label_font_size,
            file_extensions: settings.file_extensions.clone(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_settings(&UserSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_settings_converts_viewport() {
        let mut settings = UserSettings::default();
        settings.viewport_width = 800;
        settings.viewport_height = 600;
        settings.api_key = "k".to_string();

        let config = Config::from_settings(&settings);
        assert_eq!(config.viewport_width, 800.0);
        assert_eq!(config.viewport_height, 600.0);
        assert_eq!(config.api_key, "k");
        assert_eq!(config.model_input_size, DEFAULT_MODEL_INPUT_SIZE);
        assert_eq!(config.detection_endpoint, DEFAULT_DETECTION_ENDPOINT);
    }
}
