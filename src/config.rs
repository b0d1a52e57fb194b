//! Optional TOML settings, read from `~/.config/raiplaysound-rss/config.toml`
//! or the path given with `--config`.
//!
//! Every key has a default. Keys this crate does not know are reported in a
//! single warning and otherwise ignored.
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::feed::assemble::{DEFAULT_AUTHOR, DEFAULT_LANGUAGE, DEFAULT_OWNER_EMAIL};
use crate::feed::fetcher::{DEFAULT_MAX_RESPONSE_BYTES, DEFAULT_TIMEOUT};
use crate::feed::ChannelDefaults;
use crate::traverse::TraversalOptions;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config file exceeds maximum allowed size.
    #[error("Config file too large: {0}")]
    TooLarge(String),
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Top-level application configuration.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
/// Missing keys fall back to `Default::default()`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Skip pages whose typology is a radio programme or news bulletin.
    pub skip_program_typologies: bool,

    /// Skip pages whose typology is a film or fiction.
    pub skip_film_typologies: bool,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,

    /// Maximum size of a single JSON document.
    pub max_response_bytes: usize,

    /// User-Agent header sent with every request.
    pub user_agent: String,

    /// `itunes:author` of every feed.
    pub author: String,

    /// `language` of every feed.
    pub language: String,

    /// `itunes:owner` email of every feed.
    pub owner_email: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            skip_program_typologies: true,
            skip_film_typologies: true,
            request_timeout_secs: DEFAULT_TIMEOUT.as_secs(),
            max_response_bytes: DEFAULT_MAX_RESPONSE_BYTES,
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string(),
            author: DEFAULT_AUTHOR.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
            owner_email: DEFAULT_OWNER_EMAIL.to_string(),
        }
    }
}

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    const KNOWN_KEYS: [&'static str; 8] = [
        "skip_program_typologies",
        "skip_film_typologies",
        "request_timeout_secs",
        "max_response_bytes",
        "user_agent",
        "author",
        "language",
        "owner_email",
    ];

    /// Default location: `$HOME/.config/raiplaysound-rss/config.toml`.
    pub fn default_path() -> Option<PathBuf> {
        let home = std::env::var_os("HOME")?;
        Some(
            PathBuf::from(home)
                .join(".config")
                .join("raiplaysound-rss")
                .join("config.toml"),
        )
    }

    /// Reads the file at `path`.
    ///
    /// A missing or blank file yields the defaults. Malformed TOML, values of
    /// the wrong type and files over 1 MB are errors.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let Some(content) = read_capped(path, Self::MAX_FILE_SIZE)? else {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        };
        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Empty config file, using defaults");
            return Ok(Self::default());
        }

        let table: toml::Table = content.parse()?;
        let unknown: Vec<&str> = table
            .keys()
            .map(String::as_str)
            .filter(|key| !Self::KNOWN_KEYS.contains(key))
            .collect();
        if !unknown.is_empty() {
            tracing::warn!(path = %path.display(), keys = ?unknown, "Ignoring unknown config keys");
        }

        let config: Config = toml::Value::Table(table).try_into()?;
        tracing::info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn traversal_options(&self) -> TraversalOptions {
        TraversalOptions {
            skip_programs: self.skip_program_typologies,
            skip_films: self.skip_film_typologies,
            channel: ChannelDefaults {
                author: self.author.clone(),
                language: self.language.clone(),
                owner_email: self.owner_email.clone(),
            },
        }
    }
}

/// Reads `path` unless it is larger than `max` bytes; `None` when it does
/// not exist.
fn read_capped(path: &Path, max: u64) -> Result<Option<String>, ConfigError> {
    let size = match std::fs::metadata(path) {
        Ok(meta) => meta.len(),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    if size > max {
        return Err(ConfigError::TooLarge(format!(
            "{} is {} bytes (max {} bytes)",
            path.display(),
            size,
            max
        )));
    }

    match std::fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

// ============================================================================
// Tests
// ============================================================================
