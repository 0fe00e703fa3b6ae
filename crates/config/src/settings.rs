//! Configuration structures for termcordion settings.

use serde::{Deserialize, Serialize};

use crate::defaults;

/// Application configuration with nested sections.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// General settings
    #[serde(default)]
    pub general: GeneralSettings,

    /// Accordion appearance
    #[serde(default)]
    pub appearance: AppearanceSettings,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// General settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneralSettings {
    /// How item ids are generated (random or sequential)
    #[serde(default = "default_id_policy")]
    pub id_policy: String,
}

/// Appearance settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppearanceSettings {
    /// Symbol before an open header
    #[serde(default = "default_open_symbol")]
    pub open_symbol: String,

    /// Symbol before a closed header
    #[serde(default = "default_closed_symbol")]
    pub closed_symbol: String,

    /// Color of the focused header (name like "cyan" or hex "#rrggbb")
    #[serde(default = "default_accent")]
    pub accent: String,

    /// Panel indentation in columns (unset = align with header labels)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indent: Option<u16>,
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log file path (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,

    /// Minimum log level (debug, info, warn, error)
    #[serde(default = "default_min_level")]
    pub min_level: String,

    /// Number of entries kept in memory
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
}

// Default value functions for serde
fn default_id_policy() -> String {
    defaults::ID_POLICY.to_string()
}

fn default_open_symbol() -> String {
    defaults::OPEN_SYMBOL.to_string()
}

fn default_closed_symbol() -> String {
    defaults::CLOSED_SYMBOL.to_string()
}

fn default_accent() -> String {
    defaults::ACCENT.to_string()
}

fn default_min_level() -> String {
    defaults::MIN_LOG_LEVEL.to_string()
}

fn default_max_entries() -> usize {
    defaults::MAX_LOG_ENTRIES
}

// Default implementations
impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            id_policy: default_id_policy(),
        }
    }
}

impl Default for AppearanceSettings {
    fn default() -> Self {
        Self {
            open_symbol: default_open_symbol(),
            closed_symbol: default_closed_symbol(),
            accent: default_accent(),
            indent: None,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            file_path: None,
            min_level: default_min_level(),
            max_entries: default_max_entries(),
        }
    }
}
