//! User configuration for quill.
//!
//! Read once at startup from `$XDG_CONFIG_HOME/quill/config.toml` (falling back
//! to `~/.config/quill/config.toml`). Every field has a default, so a missing
//! file, a missing key, or a malformed file all still produce a usable config.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Built-in theme name, e.g. `"dark"` or `"catppuccin-mocha"`.
    pub theme: String,
    /// Directory holding the state database and the log file.
    pub data_dir: PathBuf,
    pub service: ServiceConfig,
    pub completion: CompletionConfig,
}

/// `[service]` table: where the assist service lives.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

/// `[completion]` table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CompletionConfig {
    /// Quiet period after the last trigger before a completion request fires.
    pub debounce_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: "catppuccin-mocha".to_owned(),
            data_dir: PathBuf::from(".quill"),
            service: ServiceConfig::default(),
            completion: CompletionConfig::default(),
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: quill_core::client::DEFAULT_BASE_URL.to_owned(),
            timeout_secs: quill_core::client::DEFAULT_TIMEOUT.as_secs(),
        }
    }
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            debounce_ms: quill_core::debounce::DEFAULT_QUIET_PERIOD.as_millis() as u64,
        }
    }
}

impl Config {
    /// Parses a config document. Absent keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns the TOML error when `raw` is not valid TOML or a key has the
    /// wrong type.
    pub fn from_toml_str(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }

    /// Loads the config at `path`.
    ///
    /// Never fails: a missing file yields defaults silently, and an unreadable
    /// or malformed file yields defaults plus a warning for the caller to log
    /// once logging is up.
    pub fn load(path: &Path) -> (Self, Option<String>) {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return (Self::default(), None),
            Err(e) => {
                return (Self::default(), Some(format!("cannot read {}: {e}", path.display())));
            }
        };
        match Self::from_toml_str(&raw) {
            Ok(config) => (config, None),
            Err(e) => (
                Self::default(),
                Some(format!("config parse error in {}: {e}", path.display())),
            ),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.service.timeout_secs.max(1))
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.completion.debounce_ms)
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("quill.db")
    }
}

/// Returns the path to the quill config file.
///
/// Prefers `$XDG_CONFIG_HOME/quill/config.toml`; falls back to
/// `~/.config/quill/config.toml` when the env var is absent.
pub fn config_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .ok()
        .map(PathBuf::from)
        .or_else(|| {
            std::env::var("HOME")
                .ok()
                .map(|h| PathBuf::from(h).join(".config"))
        })
        .unwrap_or_else(|| PathBuf::from(".config"));
    base.join("quill").join("config.toml")
}
