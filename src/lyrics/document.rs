//! Immutable lyric document model.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::types::TrackId;

/// A single timestamped lyric line (a cue).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LyricLine {
    /// Start of the line, in milliseconds since track start.
    pub timestamp_ms: u64,
    /// Display text. May be empty for instrumental gaps.
    pub text: String,
}

impl LyricLine {
    /// Create a new line.
    pub fn new(timestamp_ms: u64, text: impl Into<String>) -> Self {
        Self { timestamp_ms, text: text.into() }
    }
}

/// Where the raw lyric text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum LyricSource {
    /// Fetched from the LRCLIB web service.
    Lrclib,
    /// Read back from the on-disk cache.
    Cache,
    /// Loaded from a local file.
    File,
    /// Supplied directly by the caller.
    #[default]
    Inline,
}

impl LyricSource {
    /// Returns the human-readable name of this source.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Lrclib => "LRCLIB",
            Self::Cache => "cache",
            Self::File => "file",
            Self::Inline => "inline",
        }
    }
}

impl fmt::Display for LyricSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Provenance of a document: which track it belongs to and where it came from.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Provenance {
    /// Track the lyrics were resolved for, if known.
    pub track: Option<TrackId>,
    /// Origin of the raw text.
    pub source: LyricSource,
}

impl Provenance {
    /// Provenance for lyrics resolved for a track.
    pub const fn new(track: TrackId, source: LyricSource) -> Self {
        Self { track: Some(track), source }
    }

    /// Provenance for lyrics not tied to a player track.
    pub const fn detached(source: LyricSource) -> Self {
        Self { track: None, source }
    }
}

/// LRC ID tags found alongside the timed lines.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct LyricMetadata {
    /// `[ar:]` artist tag.
    pub artist: Option<String>,
    /// `[ti:]` title tag.
    pub title: Option<String>,
    /// `[al:]` album tag.
    pub album: Option<String>,
    /// `[by:]` author of the LRC file.
    pub author: Option<String>,
    /// `[length:]` track length in milliseconds.
    pub length_ms: Option<u64>,
    /// `[offset:]` value already applied to every timestamp.
    pub offset_ms: i64,
}

/// Parsed, sorted, read-only lyric lines for one track.
///
/// Lines are strictly ascending by timestamp. When several lines share a
/// timestamp the one that appeared last in the input wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LyricDocument {
    provenance: Provenance,
    metadata: LyricMetadata,
    lines: Vec<LyricLine>,
}

impl LyricDocument {
    /// Build a document from lines in any order.
    pub fn from_lines(lines: impl IntoIterator<Item = LyricLine>, provenance: Provenance) -> Self {
        Self::with_metadata(lines, provenance, LyricMetadata::default())
    }

    /// Build a document from lines in any order, keeping LRC metadata.
    pub fn with_metadata(
        lines: impl IntoIterator<Item = LyricLine>,
        provenance: Provenance,
        metadata: LyricMetadata,
    ) -> Self {
        let mut by_time = BTreeMap::new();
        for line in lines {
            by_time.insert(line.timestamp_ms, line.text);
        }
        let lines = by_time
            .into_iter()
            .map(|(timestamp_ms, text)| LyricLine { timestamp_ms, text })
            .collect();
        Self { provenance, metadata, lines }
    }

    /// An empty document for a syntactically valid text with no cues.
    pub fn empty(provenance: Provenance) -> Self {
        Self { provenance, metadata: LyricMetadata::default(), lines: Vec::new() }
    }

    /// All lines, sorted by timestamp.
    pub fn lines(&self) -> &[LyricLine] {
        &self.lines
    }

    /// The line at `index`, if any.
    pub fn line(&self, index: usize) -> Option<&LyricLine> {
        self.lines.get(index)
    }

    /// Number of lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the document has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Track and source of this document.
    pub const fn provenance(&self) -> &Provenance {
        &self.provenance
    }

    /// LRC ID tags.
    pub const fn metadata(&self) -> &LyricMetadata {
        &self.metadata
    }

    /// Timestamp of the last cue.
    pub fn last_timestamp_ms(&self) -> Option<u64> {
        self.lines.last().map(|l| l.timestamp_ms)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

    use super::*;

    #[test]
    fn lines_are_sorted_on_construction() {
        let doc = LyricDocument::from_lines(
            vec![LyricLine::new(3000, "c"), LyricLine::new(0, "a"), LyricLine::new(1500, "b")],
            Provenance::default(),
        );
        let times: Vec<u64> = doc.lines().iter().map(|l| l.timestamp_ms).collect();
        assert_eq!(times, vec![0, 1500, 3000]);
    }

    #[test]
    fn duplicate_timestamps_keep_last_occurrence() {
        let doc = LyricDocument::from_lines(
            vec![LyricLine::new(1000, "first"), LyricLine::new(500, "x"), LyricLine::new(1000, "second")],
            Provenance::default(),
        );
        assert_eq!(doc.len(), 2);
        assert_eq!(doc.line(1).unwrap().text, "second");
    }

    #[test]
    fn empty_document_has_no_last_timestamp() {
        let doc = LyricDocument::empty(Provenance::detached(LyricSource::File));
        assert!(doc.is_empty());
        assert_eq!(doc.last_timestamp_ms(), None);
        assert_eq!(doc.provenance().source, LyricSource::File);
    }
}
