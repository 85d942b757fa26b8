//! Application constants.
//!
//! Centralizes magic numbers and configuration values for better maintainability.

/// Sync engine constants.
pub mod sync {
    /// Default difference between a reported and an extrapolated position that
    /// classifies a sample as a seek or pause/resume discontinuity.
    pub const DEFAULT_DISCONTINUITY_TOLERANCE_MS: u64 = 750;

    /// Default tick rate of the driver loop.
    pub const DEFAULT_TICK_HZ: u32 = 50;

    /// Lowest tick rate accepted from configuration.
    pub const MIN_TICK_HZ: u32 = 1;

    /// Highest tick rate accepted from configuration.
    pub const MAX_TICK_HZ: u32 = 240;
}

/// Lyric provider constants.
pub mod provider {
    /// Default LRCLIB endpoint.
    pub const DEFAULT_LRCLIB_URL: &str = "https://lrclib.net";

    /// Default HTTP request timeout in seconds.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
}

/// Cache constants.
pub mod cache {
    /// Directory name used under the platform cache directory.
    pub const DIR_NAME: &str = "lyricsync";

    /// File extension of cached lyric files.
    pub const FILE_EXTENSION: &str = "lrc";
}

/// Async task constants.
pub mod async_tasks {
    /// Channel buffer size for async task communication.
    pub const CHANNEL_BUFFER_SIZE: usize = 32;
}

/// Simulated player constants.
pub mod player {
    /// Default gap between simulated position samples, in milliseconds.
    pub const DEFAULT_SAMPLE_INTERVAL_MS: u64 = 1000;

    /// How long simulated playback runs past the last cue, in milliseconds.
    pub const TAIL_MS: u64 = 3000;

    /// Simulated length of a track whose duration is unknown, in milliseconds.
    pub const UNKNOWN_TRACK_LENGTH_MS: u64 = 240_000;
}
