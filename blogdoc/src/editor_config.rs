//! Editor configuration from blogdoc.toml

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default configuration file name
pub const CONFIG_FILE_NAME: &str = "blogdoc.toml";

/// Main editor configuration from blogdoc.toml
///
/// Every field has a default, so an empty file (or no file at all) is a
/// valid configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub autosave: AutosaveConfig,
    pub metrics: MetricsConfig,
    pub audit: AuditConfig,
    pub table_menu: TableMenuConfig,
    pub limits: EditorLimits,
}

/// Draft autosave settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutosaveConfig {
    /// Whether the interval timer is armed when a session starts
    pub enabled: bool,

    /// Seconds between automatic draft saves
    pub interval_secs: u64,

    /// Directory holding the file-backed draft store
    pub directory: PathBuf,
}

impl Default for AutosaveConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: 60,
            directory: PathBuf::from(".blogdoc/drafts"),
        }
    }
}

/// Word count and read time settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Reading speed used for the read-time estimate
    pub words_per_minute: u32,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            words_per_minute: 225,
        }
    }
}

/// Accessibility audit settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Paragraphs with more words than this are reported as too long
    pub long_paragraph_words: usize,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            long_paragraph_words: 100,
        }
    }
}

/// Offsets applied to the floating table menu, in pixels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableMenuConfig {
    pub offset_x: f64,
    pub offset_y: f64,
}

impl Default for TableMenuConfig {
    fn default() -> Self {
        Self {
            offset_x: 0.0,
            offset_y: -45.0,
        }
    }
}

/// Input limits enforced by modal validation and the undo history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorLimits {
    /// Largest accepted image file in bytes
    pub max_image_bytes: u64,

    pub max_table_rows: usize,
    pub max_table_cols: usize,

    /// Number of undo steps kept
    pub history_depth: usize,
}

impl Default for EditorLimits {
    fn default() -> Self {
        Self {
            max_image_bytes: 5 * 1024 * 1024,
            max_table_rows: 20,
            max_table_cols: 10,
            history_depth: 100,
        }
    }
}

impl EditorConfig {
    /// Load configuration from a blogdoc.toml file
    ///
    /// # Parameters
    /// * `path` - Path to the blogdoc.toml configuration file
    ///
    /// # Returns
    /// * `Ok(EditorConfig)` - Successfully loaded configuration
    /// * `Err(EditorConfigError)` - Error reading or parsing the configuration file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, EditorConfigError> {
        let content = fs::read_to_string(&path).map_err(EditorConfigError::IoError)?;

        let config: EditorConfig =
            toml::from_str(&content).map_err(EditorConfigError::ParseError)?;

        Ok(config)
    }

    /// Load configuration, falling back to defaults when the file is absent
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, EditorConfigError> {
        if !path.as_ref().exists() {
            log::debug!(
                "No config at {}, using defaults",
                path.as_ref().display()
            );
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Save configuration to a blogdoc.toml file
    ///
    /// # Parameters
    /// * `path` - Path where the blogdoc.toml file will be written
    ///
    /// # Returns
    /// * `Ok(())` - Successfully saved configuration
    /// * `Err(EditorConfigError)` - Error serializing or writing the configuration file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), EditorConfigError> {
        let content = toml::to_string_pretty(self).map_err(EditorConfigError::SerializeError)?;

        fs::write(&path, content).map_err(EditorConfigError::IoError)?;

        Ok(())
    }
}

/// Errors that can occur when loading or saving editor configuration
#[derive(Debug)]
#[allow(clippy::enum_variant_names)]
pub enum EditorConfigError {
    /// IO error when reading or writing file
    IoError(std::io::Error),

    /// Error parsing TOML
    ParseError(toml::de::Error),

    /// Error serializing to TOML
    SerializeError(toml::ser::Error),
}

impl std::fmt::Display for EditorConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EditorConfigError::IoError(e) => write!(f, "IO error: {}", e),
            EditorConfigError::ParseError(e) => write!(f, "TOML parse error: {}", e),
            EditorConfigError::SerializeError(e) => write!(f, "TOML serialize error: {}", e),
        }
    }
}

impl std::error::Error for EditorConfigError {}
