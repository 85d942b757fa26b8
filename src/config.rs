//! Application configuration.
//!
//! Handles loading configuration from environment variables and .env files.

use dotenv::dotenv;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::constants::{cache, provider, sync};
use crate::error::{Error, Result};

/// Configuration for the application.
#[derive(Debug, Clone)]
pub struct Config {
    /// The application name
    app_name: String,
    /// The application version
    app_version: String,
    /// Directory holding cached lyric files; `None` disables caching
    pub cache_dir: Option<PathBuf>,
    /// Base URL of the LRCLIB service
    pub lrclib_url: String,
    /// Driver tick rate in Hz
    pub tick_hz: u32,
    /// Position jump that counts as a seek, in milliseconds
    pub discontinuity_tolerance_ms: u64,
    /// HTTP request timeout in seconds
    pub request_timeout_secs: u64,
}

impl Config {
    /// Get the application name.
    #[must_use]
    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    /// Get the application version.
    #[must_use]
    pub fn app_version(&self) -> &str {
        &self.app_version
    }

    /// User agent sent with provider requests, e.g. `lyricsync/0.1.0`.
    #[must_use]
    pub fn user_agent(&self) -> String {
        format!("{}/{}", self.app_name, self.app_version)
    }

    /// Interval between driver ticks.
    #[must_use]
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(1) / self.tick_hz.max(1)
    }

    /// HTTP request timeout.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_name: env!("CARGO_PKG_NAME").to_string(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            cache_dir: default_cache_dir(),
            lrclib_url: provider::DEFAULT_LRCLIB_URL.to_string(),
            tick_hz: sync::DEFAULT_TICK_HZ,
            discontinuity_tolerance_ms: sync::DEFAULT_DISCONTINUITY_TOLERANCE_MS,
            request_timeout_secs: provider::DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn load() -> Result<Self> {
        // Try to load .env file if present
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        // Cache directory: env var override, `off` disables caching
        if let Some(dir) = lookup("LYRICSYNC_CACHE_DIR") {
            config.cache_dir = match dir.trim() {
                "" | "off" | "none" => None,
                path => Some(PathBuf::from(shellexpand::tilde(path).to_string())),
            };
        }

        if let Some(url) = lookup("LRCLIB_URL") {
            config.lrclib_url = url.trim_end_matches('/').to_string();
        }

        if let Some(hz) = lookup("LYRICSYNC_TICK_HZ") {
            let hz: u32 = hz.trim().parse().map_err(|_| {
                Error::config(
                    format!("LYRICSYNC_TICK_HZ={hz:?} is not a number"),
                    "Use a whole number of ticks per second, e.g. 50",
                )
            })?;
            config.tick_hz = hz.clamp(sync::MIN_TICK_HZ, sync::MAX_TICK_HZ);
        }

        if let Some(tolerance) = lookup("LYRICSYNC_DISCONTINUITY_MS") {
            config.discontinuity_tolerance_ms = tolerance.trim().parse().map_err(|_| {
                Error::config(
                    format!("LYRICSYNC_DISCONTINUITY_MS={tolerance:?} is not a number"),
                    "Use a whole number of milliseconds, e.g. 750",
                )
            })?;
        }

        if let Some(timeout) = lookup("LYRICSYNC_TIMEOUT_SECS") {
            config.request_timeout_secs = timeout.trim().parse().map_err(|_| {
                Error::config(
                    format!("LYRICSYNC_TIMEOUT_SECS={timeout:?} is not a number"),
                    "Use a whole number of seconds, e.g. 10",
                )
            })?;
        }

        Ok(config)
    }
}

/// Platform cache directory for lyric files
fn default_cache_dir() -> Option<PathBuf> {
    dirs::cache_dir().map(|d| d.join(cache::DIR_NAME))
}
