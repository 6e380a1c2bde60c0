//! Cross-platform application paths using the `dirs` crate.
//!
//! Config dir (settings + agent registry):
//!   Windows: %APPDATA%\voice-agent-sim\
//!   macOS:   ~/Library/Application Support/voice-agent-sim/
//!   Linux:   ~/.config/voice-agent-sim/

use std::path::{Path, PathBuf};

/// Holds all resolved application directory/file paths.
#[derive(Debug, Clone)]
pub struct AppPaths {
    /// Directory for `settings.toml` and `agents.json`.
    pub config_dir: PathBuf,
    /// Full path to `settings.toml`.
    pub settings_file: PathBuf,
    /// Full path to `agents.json`.
    pub agents_file: PathBuf,
}

impl AppPaths {
    const APP_NAME: &'static str = "voice-agent-sim";

    /// Resolves all paths using the `dirs` crate.
    ///
    /// Falls back to the current directory if the platform cannot provide a
    /// standard config path.
    pub fn new() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(Self::APP_NAME);
        Self::in_dir(config_dir)
    }

    /// Lay the files out under an explicit directory (tests, `--config`).
    pub fn in_dir(config_dir: impl AsRef<Path>) -> Self {
        let config_dir = config_dir.as_ref().to_path_buf();
        Self {
            settings_file: config_dir.join("settings.toml"),
            agents_file: config_dir.join("agents.json"),
            config_dir,
        }
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}
