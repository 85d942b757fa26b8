//! Lyric providers.
//!
//! Providers turn a [`TrackInfo`] into raw LRC text. The sync engine never sees
//! them directly: the driver fetches, parses and hands over a finished document.

use async_trait::async_trait;

use crate::error::Result;
use crate::lyrics::LyricSource;
use crate::types::TrackInfo;

/// On-disk lyric cache and the caching provider wrapper
pub mod cache;
/// Fixed lyric text, e.g. from a local file
pub mod local;
/// LRCLIB web service client
pub mod lrclib;

pub use cache::{CacheEntry, CachedProvider, LyricsCache};
pub use local::LocalProvider;
pub use lrclib::{LrclibClient, LrclibTrack};

/// Raw lyric text returned by a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedLyrics {
    /// Raw LRC text.
    pub text: String,
    /// Where the text came from.
    pub source: LyricSource,
}

impl FetchedLyrics {
    /// Create a new result.
    pub fn new(text: impl Into<String>, source: LyricSource) -> Self {
        Self { text: text.into(), source }
    }
}

/// Source of raw timed lyrics for a track.
///
/// `Ok(None)` means the provider answered and has no synced lyrics for the
/// track; `Err` means it could not answer.
#[async_trait]
pub trait LyricsProvider: Send + Sync {
    /// Fetch raw lyric text for a track.
    async fn fetch(&self, track: &TrackInfo) -> Result<Option<FetchedLyrics>>;

    /// Get the name of this provider (for logging).
    fn name(&self) -> &'static str;
}
