//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Global application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Editing defaults applied to newly created clips.
    pub editor: EditorDefaults,

    /// Export and preview defaults.
    pub export: ExportDefaults,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Defaults used when a clip is created or its metadata is incomplete.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorDefaults {
    /// Framerate assumed when the source does not report one.
    pub framerate: f64,

    /// Keyframe selection/removal window, in frames on either side.
    pub frame_tolerance: i64,

    /// Target aspect ratio for new projects (e.g. "9:16").
    pub target_aspect: String,

    /// Highlight ellipse radius as a fraction of the source height.
    pub highlight_radius_ratio: f64,

    /// Highlight fill color as hex string.
    pub highlight_color: String,

    /// Highlight opacity in `[0.0, 1.0]`.
    pub highlight_opacity: f64,
}

/// Export-side defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportDefaults {
    /// Output frame rate used when sampling frame plans.
    pub output_fps: f64,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "reframe=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for EditorDefaults {
    fn default() -> Self {
        Self {
            framerate: 30.0,
            frame_tolerance: 1,
            target_aspect: "9:16".to_string(),
            highlight_radius_ratio: 0.08,
            highlight_color: "#FFFF00".to_string(),
            highlight_opacity: 0.15,
        }
    }
}

impl Default for ExportDefaults {
    fn default() -> Self {
        Self { output_fps: 30.0 }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        Self::load_from(&config_file_path())
    }

    /// Load config from an explicit path, falling back to defaults.
    pub fn load_from(config_path: &Path) -> Self {
        if config_path.exists() {
            match std::fs::read_to_string(config_path) {
                Ok(content) => match serde_json::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        tracing::warn!("Failed to parse config at {:?}: {}", config_path, e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("reframe").join("config.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let path = std::env::temp_dir().join("reframe_test_config_missing.json");
        let _ = std::fs::remove_file(&path);
        let config = AppConfig::load_from(&path);
        assert_eq!(config.editor.frame_tolerance, 1);
        assert_eq!(config.editor.target_aspect, "9:16");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let path = std::env::temp_dir().join("reframe_test_config_partial.json");
        std::fs::write(&path, r#"{"editor": {"framerate": 24.0}}"#).unwrap();

        let config = AppConfig::load_from(&path);
        assert!((config.editor.framerate - 24.0).abs() < 1e-9);
        assert_eq!(config.editor.frame_tolerance, 1);
        assert!((config.export.output_fps - 30.0).abs() < 1e-9);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_invalid_file_gives_defaults() {
        let path = std::env::temp_dir().join("reframe_test_config_invalid.json");
        std::fs::write(&path, "not json").unwrap();

        let config = AppConfig::load_from(&path);
        assert!((config.editor.framerate - 30.0).abs() < 1e-9);

        std::fs::remove_file(&path).ok();
    }
}
