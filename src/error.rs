//! Application error types.
//!
//! Provides unified error handling with actionable context for debugging.
//! The sync engine itself is infallible; these errors come from the collaborators
//! around it (lyric providers, the on-disk cache, configuration).

use thiserror::Error;

/// Application result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Application error types with specific context for actionable debugging
#[derive(Debug, Error)]
pub enum Error {
    /// IO error with path context
    #[error("IO error at {path:?}: {source}")]
    Io {
        /// The underlying IO error.
        source: std::io::Error,
        /// File path where the error occurred, if known.
        path: Option<std::path::PathBuf>,
    },

    /// Network error (connection, timeout, DNS)
    #[error("Network error: {0}")]
    Network(String),

    /// Lyric provider error with status context
    #[error("Lyrics provider error: {message}")]
    Provider {
        /// Human-readable error description.
        message: String,
        /// HTTP status code, if from an HTTP response.
        status: Option<u16>,
        /// Actionable suggestion for resolving the error.
        hint: Option<&'static str>,
    },

    /// Configuration error with guidance
    #[error("Configuration error: {message}. {hint}")]
    Config {
        /// Description of the configuration problem.
        message: String,
        /// Actionable guidance for fixing the issue.
        hint: &'static str,
    },

    /// File parsing error
    #[error("Parse error in {file:?}: {message}")]
    Parse {
        /// File that failed to parse, if known.
        file: Option<std::path::PathBuf>,
        /// Description of the parse failure.
        message: String,
    },
}

impl Error {
    /// Create an IO error with path context
    pub fn io(source: std::io::Error, path: impl Into<Option<std::path::PathBuf>>) -> Self {
        Self::Io { source, path: path.into() }
    }

    /// Create a provider error with HTTP status
    pub fn provider_status(message: impl Into<String>, status: u16) -> Self {
        let hint = match status {
            400 => Some("The track query was rejected; check artist and title"),
            429 => Some("Rate limited - wait a moment and try again"),
            500..=599 => Some("Lyrics server error - try again later"),
            _ => None,
        };
        Self::Provider {
            message: message.into(),
            status: Some(status),
            hint,
        }
    }

    /// Create a config error with actionable hint
    pub fn config(message: impl Into<String>, hint: &'static str) -> Self {
        Self::Config { message: message.into(), hint }
    }

    /// Create a parse error with file context
    pub fn parse(message: impl Into<String>, file: impl Into<Option<std::path::PathBuf>>) -> Self {
        Self::Parse { file: file.into(), message: message.into() }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

    use super::*;

    #[test]
    fn provider_status_provides_hints() {
        let err = Error::provider_status("Too many requests", 429);
        match err {
            Error::Provider { hint: Some(h), status: Some(429), .. } => {
                assert!(h.contains("Rate limited"));
            }
            _ => panic!("Expected Provider error with hint"),
        }
    }

    #[test]
    fn provider_status_without_known_hint() {
        let err = Error::provider_status("Teapot", 418);
        assert!(matches!(err, Error::Provider { hint: None, status: Some(418), .. }));
    }

    #[test]
    fn io_error_keeps_path() {
        let source = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = Error::io(source, std::path::PathBuf::from("/tmp/song.lrc"));
        assert!(err.to_string().contains("song.lrc"));
        assert!(matches!(err, Error::Io { path: Some(_), .. }));
    }

    #[test]
    fn config_error_message_includes_hint() {
        let err = Error::config("LYRICSYNC_TICK_HZ is not a number", "Use an integer such as 50");
        assert_eq!(
            err.to_string(),
            "Configuration error: LYRICSYNC_TICK_HZ is not a number. Use an integer such as 50"
        );
    }
}
