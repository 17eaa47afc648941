//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ScrolliError, ScrolliResult};

/// Global application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Section editor defaults.
    #[serde(default)]
    pub editor: EditorDefaults,

    /// Presentation export defaults.
    #[serde(default)]
    pub export: ExportDefaults,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Defaults applied to newly created sections and the blur control.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorDefaults {
    /// Blur strength of a freshly added section.
    pub default_blur: f64,

    /// Upper bound of the blur control (lower bound is 0).
    pub max_blur: f64,

    /// Granularity of the blur control.
    pub blur_step: f64,
}

/// Defaults for the exported presentation document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportDefaults {
    /// Title suggested to the user before export.
    pub suggested_title: String,

    /// Title used when the user supplies an empty one.
    pub fallback_title: String,

    /// File stem used when the title slug is empty.
    pub fallback_filename: String,

    /// Height of each transition spacer, in viewport-height units.
    pub spacer_height_vh: u32,

    /// Minimum height of each text block, in viewport-height units.
    pub text_section_min_vh: u32,

    /// Overlay cross-fade duration in milliseconds.
    pub fade_ms: u32,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Level for the ScrolliTelli crates ("info", "debug"), or a full
    /// filter directive such as "warn,scrollitelli_render_engine=trace".
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Append logs to this file instead of writing them to stdout.
    pub file: Option<PathBuf>,
}

impl Default for EditorDefaults {
    fn default() -> Self {
        Self {
            default_blur: 2.0,
            max_blur: 20.0,
            blur_step: 0.5,
        }
    }
}

impl Default for ExportDefaults {
    fn default() -> Self {
        Self {
            suggested_title: "My ScrolliTelli Story".to_string(),
            fallback_title: "ScrolliTelli Presentation".to_string(),
            fallback_filename: "scrollitelli-presentation".to_string(),
            spacer_height_vh: 60,
            text_section_min_vh: 80,
            fade_ms: 300,
        }
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
    /// Load config from [`config_file_path`].
    ///
    /// A missing file yields defaults silently; an unreadable or malformed
    /// one is reported and also yields defaults.
    pub fn load() -> Self {
        let path = config_file_path();
        if !path.exists() {
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(error = %e, "Using default configuration");
                Self::default()
            }
        }
    }

    /// Parse a config file, filling absent sections and fields with defaults.
    pub fn load_from(path: &Path) -> ScrolliResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ScrolliError::config(path, e.to_string()))?;
        serde_json::from_str(&content).map_err(|e| ScrolliError::config(path, e.to_string()))
    }
}

/// Config file location.
///
/// `SCROLLITELLI_CONFIG` names the file directly; otherwise
/// `$XDG_CONFIG_HOME/scrollitelli/config.json`, with `~/.config` standing in
/// for an unset `XDG_CONFIG_HOME`.
pub fn config_file_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_ENV).filter(|v| !v.is_empty()) {
        return PathBuf::from(path);
    }
    let base = std::env::var_os("XDG_CONFIG_HOME")
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            let home = std::env::var_os("HOME").unwrap_or_else(|| "/tmp".into());
            PathBuf::from(home).join(".config")
        });
    base.join("scrollitelli").join("config.json")
}

/// Environment variable overriding the config file location.
pub const CONFIG_ENV: &str = "SCROLLITELLI_CONFIG";
