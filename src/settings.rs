use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use log::{debug, info, warn, error};

use crate::config::{
    DEFAULT_DETECTION_ENDPOINT, DEFAULT_DISPLAY_SIZE, DEFAULT_FILE_EXTENSIONS,
    DEFAULT_LABEL_FONT_SIZE, DEFAULT_MODEL_INPUT_SIZE,
};

/// User-specific settings that persist across app sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSettings {
    /// URL of the remote detection model
    #[serde(default = "default_detection_endpoint")]
    pub detection_endpoint: String,

    /// API key sent as the `api_key` query parameter
    #[serde(default)]
    pub api_key: String,

    /// Square input resolution the detection model reports coordinates in
    #[serde(default = "default_model_input_size")]
    pub model_input_size: u32,

    /// Viewer width in pixels
    #[serde(default = "default_viewport_size")]
    pub viewport_width: u32,

    /// Viewer height in pixels
    #[serde(default = "default_viewport_size")]
    pub viewport_height: u32,

    /// Font size of the overlay label badges
    #[serde(default = "default_label_font_size")]
    pub label_font_size: f32,

    /// Extensions offered by the file picker
    #[serde(default = "default_file_extensions")]
    pub file_extensions: Vec<String>,
}

fn default_detection_endpoint() -> String {
    DEFAULT_DETECTION_ENDPOINT.to_string()
}

fn default_model_input_size() -> u32 {
    DEFAULT_MODEL_INPUT_SIZE
}

fn default_viewport_size() -> u32 {
    DEFAULT_DISPLAY_SIZE as u32
}

fn default_label_font_size() -> f32 {
    DEFAULT_LABEL_FONT_SIZE
}

fn default_file_extensions() -> Vec<String> {
    DEFAULT_FILE_EXTENSIONS.iter().map(|s| s.to_string()).collect()
}

/// Double-quoted scalar with `"`, `\` and control characters escaped.
/// JSON string syntax is a valid YAML double-quoted scalar and stays on one line.
fn yaml_quoted(value: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| format!("\"{}\"", value))
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            detection_endpoint: default_detection_endpoint(),
            api_key: String::new(),
            model_input_size: default_model_input_size(),
            viewport_width: default_viewport_size(),
            viewport_height: default_viewport_size(),
            label_font_size: default_label_font_size(),
            file_extensions: default_file_extensions(),
        }
    }
}

impl UserSettings {
    /// Get the path to the settings file
    /// On macOS: ~/Library/Application Support/ScanLens/settings.yaml
    /// On Linux: ~/.config/ScanLens/settings.yaml
    /// On Windows: C:\Users\<user>\AppData\Roaming\ScanLens\settings.yaml
    pub fn settings_path() -> PathBuf {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."));

        config_dir.join("ScanLens").join("settings.yaml")
    }

    /// Load settings from the YAML file
    /// If custom_path is provided, uses that path; otherwise uses the default settings path
    pub fn load(custom_path: Option<&Path>) -> Self {
        let path = match custom_path {
            Some(p) => {
                info!("Using custom settings path: {}", p.display());
                p.to_path_buf()
            }
            None => Self::settings_path(),
        };

        if !path.exists() {
            info!("Settings file not found at {:?}, using defaults", path);
            return Self::default();
        }

        match fs::read_to_string(&path) {
            Ok(contents) => {
                match serde_yaml::from_str::<UserSettings>(&contents) {
                    Ok(settings) => {
                        info!("Loaded settings from {:?}", path);
                        debug!("Settings: endpoint={}, model_input_size={}, viewport={}x{}",
                            settings.detection_endpoint, settings.model_input_size,
                            settings.viewport_width, settings.viewport_height);
                        settings.sanitized()
                    }
                    Err(e) => {
                        error!("Failed to parse settings file at {:?}: {}", path, e);
                        warn!("Using default settings");
                        Self::default()
                    }
                }
            }
            Err(e) => {
                error!("Failed to read settings file at {:?}: {}", path, e);
                warn!("Using default settings");
                Self::default()
            }
        }
    }

    /// Replace values the overlay math cannot work with
    fn sanitized(mut self) -> Self {
        if self.model_input_size == 0 {
            warn!("model_input_size must be positive, using {}", DEFAULT_MODEL_INPUT_SIZE);
            self.model_input_size = DEFAULT_MODEL_INPUT_SIZE;
        }
        if self.viewport_width == 0 || self.viewport_height == 0 {
            warn!("Viewport size must be positive, using {}", DEFAULT_DISPLAY_SIZE);
            self.viewport_width = default_viewport_size();
            self.viewport_height = default_viewport_size();
        }
        if !(self.label_font_size > 0.0) {
            self.label_font_size = DEFAULT_LABEL_FONT_SIZE;
        }
        if self.file_extensions.is_empty() {
            self.file_extensions = default_file_extensions();
        }
        self
    }

    /// Save settings to the YAML file while preserving comments
    pub fn save(&self, custom_path: Option<&Path>) -> Result<PathBuf, String> {
        let path = custom_path
            .map(Path::to_path_buf)
            .unwrap_or_else(Self::settings_path);

        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)
                    .map_err(|e| format!("Failed to create settings directory: {}", e))?;
            }
        }

        // If file exists, try to preserve comments by doing in-place value updates
        if path.exists() {
            match fs::read_to_string(&path) {
                Ok(contents) => {
                    let updated = self.update_yaml_values(&contents);
                    fs::write(&path, updated)
                        .map_err(|e| format!("Failed to write settings file: {}", e))?;
                    info!("Saved settings to {:?} (comments preserved)", path);
                    return Ok(path);
                }
                Err(e) => {
                    warn!("Failed to read existing settings file for comment preservation: {}", e);
                    // Fall through to create new file
                }
            }
        }

        let yaml = self.to_yaml_with_comments();
        fs::write(&path, yaml)
            .map_err(|e| format!("Failed to write settings file: {}", e))?;

        info!("Saved settings to {:?}", path);
        Ok(path)
    }

    /// Update YAML values while preserving existing comments and structure
    fn update_yaml_values(&self, yaml_content: &str) -> String {
        let mut result = yaml_content.to_string();

        result = Self::replace_yaml_value(&result, "detection_endpoint", &yaml_quoted(&self.detection_endpoint));
        result = Self::replace_yaml_value(&result, "api_key", &yaml_quoted(&self.api_key));
        result = Self::replace_yaml_value(&result, "model_input_size", &self.model_input_size.to_string());
        result = Self::replace_yaml_value(&result, "viewport_width", &self.viewport_width.to_string());
        result = Self::replace_yaml_value(&result, "viewport_height", &self.viewport_height.to_string());
        result = Self::replace_yaml_value(&result, "label_font_size", &format!("{:.1}", self.label_font_size));
        result = Self::replace_yaml_value(&result, "file_extensions", &self.extensions_inline());

        result
    }

    /// Replace a YAML key's value while preserving the rest of the line
    fn replace_yaml_value(yaml: &str, key: &str, new_value: &str) -> String {
        let pattern = format!(r"(?m)^(\s*{}\s*:\s*).*$", regex::escape(key));
        let replacement = format!("${{1}}{}", new_value.replace('$', "$$"));

        match regex::Regex::new(&pattern) {
            Ok(re) => re.replace_all(yaml, replacement.as_str()).to_string(),
            Err(e) => {
                warn!("Failed to create regex for key '{}': {}", key, e);
                yaml.to_string()
            }
        }
    }

    fn extensions_inline(&self) -> String {
        let quoted: Vec<String> = self.file_extensions.iter().map(|e| yaml_quoted(e)).collect();
        format!("[{}]", quoted.join(", "))
    }

    /// Generate YAML content with comments for new files
    fn to_yaml_with_comments(&self) -> String {
        format!(
            r#"# ScanLens User Settings
# This file is loaded automatically when the application starts.
# Settings specified here will override the default values.

# Detection model endpoint (receives a multipart PNG upload)
detection_endpoint: {}

# API key appended as the api_key query parameter
api_key: {}

# Input resolution of the detection model; returned boxes use this square space
model_input_size: {}

# Size of the image viewer in pixels
viewport_width: {}
viewport_height: {}

# Font size of the label drawn above each box
label_font_size: {:.1}

# File extensions shown in the file picker
file_extensions: {}
"#,
            yaml_quoted(&self.detection_endpoint),
            yaml_quoted(&self.api_key),
            self.model_input_size,
            self.viewport_width,
            self.viewport_height,
            self.label_font_size,
            self.extensions_inline()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_use_defaults() {
        let settings: UserSettings = serde_yaml::from_str("api_key: \"abc\"\n").unwrap();
        assert_eq!(settings.api_key, "abc");
        assert_eq!(settings.model_input_size, DEFAULT_MODEL_INPUT_SIZE);
        assert_eq!(settings.detection_endpoint, DEFAULT_DETECTION_ENDPOINT);
        assert!(settings.file_extensions.iter().any(|e| e == "png"));
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.yaml");

        let mut settings = UserSettings::default();
        settings.api_key = "secret".to_string();
        settings.viewport_width = 640;
        settings.save(Some(&path)).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("# ScanLens User Settings"));

        let loaded = UserSettings::load(Some(&path));
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_save_preserves_comments() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.yaml");
        fs::write(&path, "# my own note\nmodel_input_size: 640\napi_key: \"old\"\n").unwrap();

        let mut settings = UserSettings::load(Some(&path));
        settings.model_input_size = 416;
        settings.save(Some(&path)).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.contains("# my own note"));
        assert!(contents.contains("model_input_size: 416"));
        assert_eq!(UserSettings::load(Some(&path)).model_input_size, 416);
    }

    #[test]
    fn test_invalid_values_are_sanitized() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.yaml");
        fs::write(&path, "model_input_size: 0\nviewport_width: 0\nfile_extensions: []\n").unwrap();

        let settings = UserSettings::load(Some(&path));
        assert_eq!(settings.model_input_size, DEFAULT_MODEL_INPUT_SIZE);
        assert_eq!(settings.viewport_width, DEFAULT_DISPLAY_SIZE as u32);
        assert!(!settings.file_extensions.is_empty());
    }

    #[test]
    fn test_special_characters_survive_save() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.yaml");

        let mut settings = UserSettings::default();
        settings.api_key = r#"k"e\y'#:$1"#.to_string();
        settings.detection_endpoint = r#"https://example.test/m?q="a\b""#.to_string();
        settings.save(Some(&path)).unwrap();
        assert_eq!(UserSettings::load(Some(&path)), settings);

        // in-place update path
        settings.api_key = "tab\tand \"quote\"".to_string();
        settings.save(Some(&path)).unwrap();
        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("# ScanLens User Settings"));
        assert_eq!(UserSettings::load(Some(&path)), settings);
    }

    #[test]
    fn test_unparseable_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.yaml");
        fs::write(&path, "model_input_size: [not, a, number]\n").unwrap();

        assert_eq!(UserSettings::load(Some(&path)), UserSettings::default());
    }
}
