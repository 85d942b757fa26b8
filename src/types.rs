//! Core type definitions for compile-time safety.
//!
//! Newtype wrappers keep track identifiers and document versions from being mixed
//! with plain strings and counters.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Stable identifier for the track currently reported by the player.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrackId(pub String);

impl TrackId {
    /// Create a new `TrackId` from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Derive an identifier from title and artist, the pair players expose for every track.
    pub fn from_metadata(title: &str, artist: &str) -> Self {
        Self(format!("{title}-{artist}"))
    }

    /// Get the inner string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for TrackId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for TrackId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for TrackId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Identifies one loaded document within a `SyncEngine`.
///
/// Incremented on every document swap so stale state can never be matched
/// against a newer document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct DocumentVersion(pub u64);

impl DocumentVersion {
    /// The version following this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl fmt::Display for DocumentVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// Track metadata as announced by the player on a track change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackInfo {
    /// Stable identifier of the track.
    pub id: TrackId,
    /// Artist name.
    pub artist: String,
    /// Track title.
    pub title: String,
    /// Album title, if the player reports one.
    pub album: Option<String>,
    /// Track length, if the player reports one.
    pub duration: Option<Duration>,
}

impl TrackInfo {
    /// Create track info from artist and title, deriving the track id.
    pub fn new(artist: impl Into<String>, title: impl Into<String>) -> Self {
        let artist = artist.into();
        let title = title.into();
        Self {
            id: TrackId::from_metadata(&title, &artist),
            artist,
            title,
            album: None,
            duration: None,
        }
    }

    /// Set the album title.
    #[must_use]
    pub fn with_album(mut self, album: impl Into<String>) -> Self {
        self.album = Some(album.into());
        self
    }

    /// Set the track length.
    #[must_use]
    pub const fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }
}

impl fmt::Display for TrackInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.artist, self.title)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

    use super::*;

    #[test]
    fn track_id_from_metadata_is_stable() {
        let a = TrackInfo::new("Queen", "Bohemian Rhapsody");
        let b = TrackInfo::new("Queen", "Bohemian Rhapsody").with_album("A Night at the Opera");
        assert_eq!(a.id, b.id);
        assert_eq!(a.id.as_str(), "Bohemian Rhapsody-Queen");
    }

    #[test]
    fn document_version_increments() {
        let v = DocumentVersion::default();
        assert_eq!(v.next(), DocumentVersion(1));
        assert_eq!(v.next().to_string(), "v1");
    }
}
