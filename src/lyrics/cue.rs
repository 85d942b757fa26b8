//! Binary-search index over a document's cue timestamps.

use super::document::LyricDocument;

/// Immutable lookup table from elapsed time to the active line.
///
/// Built once per document; lookups are `O(log n)` so they can run on every tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CueIndex {
    timestamps: Vec<u64>,
}

impl CueIndex {
    /// Build the index for a document.
    pub fn new(document: &LyricDocument) -> Self {
        Self {
            timestamps: document.lines().iter().map(|l| l.timestamp_ms).collect(),
        }
    }

    /// Index of the last line whose timestamp is `<= elapsed_ms`.
    ///
    /// Returns `None` before the first cue, for negative input, and for an
    /// empty document. Past the last cue the last line stays active.
    pub fn lookup(&self, elapsed_ms: i64) -> Option<usize> {
        let elapsed = u64::try_from(elapsed_ms).ok()?;
        self.timestamps
            .partition_point(|&t| t <= elapsed)
            .checked_sub(1)
    }

    /// Timestamp of the first cue strictly after `elapsed_ms`.
    pub fn next_cue_after(&self, elapsed_ms: i64) -> Option<u64> {
        let idx = u64::try_from(elapsed_ms)
            .map_or(0, |elapsed| self.timestamps.partition_point(|&t| t <= elapsed));
        self.timestamps.get(idx).copied()
    }

    /// Number of cues.
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    /// Whether the index has no cues.
    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }
}
