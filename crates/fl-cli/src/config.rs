//! Configuration loading and management.

use std::fmt;
use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

use fl_core::DEFAULT_STORAGE_KEY;

/// Application configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the database file holding the session snapshot.
    pub database_path: PathBuf,

    /// Key under which the snapshot is stored.
    pub storage_key: String,

    /// How long to wait before committing a phase change, in milliseconds.
    pub transition_ms: u64,

    /// Overrides the session's minimum-duration filter when printing summaries.
    pub min_duration_minutes: Option<u32>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("database_path", &self.database_path)
            .field("storage_key", &self.storage_key)
            .field("transition_ms", &self.transition_ms)
            .field("min_duration_minutes", &self.min_duration_minutes)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs_data_path().unwrap_or_else(|| PathBuf::from("."));
        Self {
            database_path: data_dir.join("fl.db"),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            transition_ms: 0,
            min_duration_minutes: None,
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (FL_*)
        figment = figment.merge(Env::prefixed("FL_"));

        figment.extract()
    }
}

/// Returns the platform-specific config directory for fl.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("fl"))
}

/// Returns the platform-specific data directory for fl.
///
/// On Linux: `~/.local/share/fl`
pub fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("fl"))
}
