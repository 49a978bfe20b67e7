//! Persistent user settings for the measurement tool.
//! Stored in the platform-specific config directory via `directories::ProjectDirs`.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{DEFAULT_DPI, DEFAULT_OUTPUT_DIR};
use crate::measurement::MeasurementGroup;
use crate::session::SessionOptions;

/// Application settings that can be saved and loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Rendering DPI used for pixel coordinates
    pub dpi: u32,
    /// Directory for CSV, JSON and PNG exports
    pub output_dir: String,
    /// Group selected when a session starts
    pub default_group: MeasurementGroup,
    /// Write the pre/post PNG figure on save
    pub write_visualization: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            dpi: DEFAULT_DPI,
            output_dir: DEFAULT_OUTPUT_DIR.to_string(),
            default_group: MeasurementGroup::default(),
            write_visualization: true,
        }
    }
}

impl AppSettings {
    /// Get the config directory path.
    pub fn config_dir() -> Option<PathBuf> {
        directories::ProjectDirs::from("org", "pdf-measure", "pdf-measure")
            .map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Get the settings file path.
    pub fn settings_path() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join("settings.json"))
    }

    /// Load settings from the config file, falling back to defaults.
    pub fn load() -> Self {
        Self::settings_path()
            .map(|path| Self::load_from(&path))
            .unwrap_or_default()
    }

    /// Load settings from a specific file.
    pub fn load_from(path: &Path) -> Self {
        let mut loaded: Self = fs::read_to_string(path)
            .ok()
            .and_then(|content| serde_json::from_str(&content).ok())
            .unwrap_or_default();

        // Backfill unusable values from older or hand-edited files
        if loaded.dpi == 0 {
            loaded.dpi = DEFAULT_DPI;
        }
        if loaded.output_dir.is_empty() {
            loaded.output_dir = DEFAULT_OUTPUT_DIR.to_string();
        }
        loaded
    }

    /// Save settings to the config file.
    pub fn save(&self) -> Result<(), String> {
        let path = Self::settings_path().ok_or("Cannot determine config directory")?;
        self.save_to(&path)
    }

    /// Save settings to a specific file.
    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .map_err(|e| format!("Failed to create config directory: {}", e))?;
        }

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize settings: {}", e))?;

        fs::write(path, content).map_err(|e| format!("Failed to write settings file: {}", e))
    }

    /// Session options derived from these settings.
    pub fn session_options(&self) -> SessionOptions {
        SessionOptions::default()
            .with_dpi(self.dpi)
            .with_output_dir(&self.output_dir)
            .with_visualization(self.write_visualization)
            .with_group(self.default_group)
    }
}
