//! XDG Base Directory support for termcordion.

use anyhow::{Context, Result};
use std::path::PathBuf;

const APP_NAME: &str = "termcordion";

/// Get the configuration directory following XDG conventions.
///
/// Returns `$XDG_CONFIG_HOME/termcordion` or `~/.config/termcordion`.
pub fn get_config_dir() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|p| p.join(APP_NAME))
        .context("Failed to determine config directory")
}

/// Get the cache directory following XDG conventions.
///
/// Returns `$XDG_CACHE_HOME/termcordion` or `~/.cache/termcordion`.
/// The default log file lives here.
pub fn get_cache_dir() -> Result<PathBuf> {
    dirs::cache_dir()
        .map(|p| p.join(APP_NAME))
        .context("Failed to determine cache directory")
}
