//! Tick-driven lyric synchronization state machine.

use std::time::Instant;

use crate::lyrics::{CueIndex, LyricDocument, LyricLine};
use crate::types::DocumentVersion;

use super::tracker::{Observation, PositionSample, PositionTracker};

/// Event for the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LyricEvent {
    /// The active line changed; `None` means no line is active.
    LineChanged(Option<String>),
    /// The document was dropped (track change or invalidation).
    DocumentCleared,
}

/// Observable engine state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// No lyrics loaded.
    NoDocument,
    /// Lyrics loaded, no tick has evaluated them yet.
    Idle,
    /// Lyrics loaded and evaluated at least once.
    Active {
        /// Index of the active line, `None` before the first cue.
        current_index: Option<usize>,
    },
}

/// Which line is active for which document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveLineState {
    /// Index of the active line, `None` before the first cue.
    pub current_index: Option<usize>,
    /// Document the index refers to.
    pub document_version: DocumentVersion,
}

#[derive(Debug)]
struct LoadedDocument {
    document: LyricDocument,
    cues: CueIndex,
    version: DocumentVersion,
    /// `None` while idle.
    active: Option<ActiveLineState>,
}

/// Composes a [`PositionTracker`] and a [`CueIndex`] and reports line changes.
///
/// Purely reactive: nothing happens between calls to [`SyncEngine::observe`] and
/// [`SyncEngine::tick`]. Not internally synchronized; drive it from one owner.
#[derive(Debug, Default)]
pub struct SyncEngine {
    tracker: PositionTracker,
    loaded: Option<LoadedDocument>,
    last_version: DocumentVersion,
}

impl SyncEngine {
    /// Create an engine with the given discontinuity tolerance.
    pub const fn new(tolerance_ms: u64) -> Self {
        Self {
            tracker: PositionTracker::new(tolerance_ms),
            loaded: None,
            last_version: DocumentVersion(0),
        }
    }

    /// Swap in a new document. The engine becomes idle until the next tick.
    ///
    /// Document, index and version are replaced together, so a tick never sees
    /// a mix of old and new.
    pub fn load_document(&mut self, document: LyricDocument) -> DocumentVersion {
        let version = self.last_version.next();
        self.last_version = version;

        tracing::info!(
            "Loaded {} lyric lines from {} ({version})",
            document.len(),
            document.provenance().source
        );

        self.loaded = Some(LoadedDocument {
            cues: CueIndex::new(&document),
            document,
            version,
            active: None,
        });
        version
    }

    /// Drop the current document.
    ///
    /// Returns [`LyricEvent::DocumentCleared`] if there was one.
    pub fn clear_document(&mut self) -> Option<LyricEvent> {
        self.loaded.take().map(|loaded| {
            tracing::debug!("Cleared lyrics document {}", loaded.version);
            LyricEvent::DocumentCleared
        })
    }

    /// Evaluate the active line at `now`.
    ///
    /// Emits [`LyricEvent::LineChanged`] on the first tick after a document load
    /// and whenever the active line differs from the previous tick. Without a
    /// document or before any sample, nothing is emitted.
    pub fn tick(&mut self, now: Instant) -> Option<LyricEvent> {
        let loaded = self.loaded.as_mut()?;
        let elapsed = self.tracker.estimate(now)?;
        let new_index = loaded.cues.lookup(elapsed);

        if loaded.active.is_some_and(|a| a.current_index == new_index) {
            return None;
        }

        loaded.active = Some(ActiveLineState {
            current_index: new_index,
            document_version: loaded.version,
        });

        let text = new_index
            .and_then(|i| loaded.document.line(i))
            .map(|line| line.text.clone());
        tracing::trace!(elapsed_ms = elapsed, ?new_index, "Active line changed");
        Some(LyricEvent::LineChanged(text))
    }

    /// Feed a position sample to the tracker.
    pub fn observe(&mut self, sample: PositionSample) -> Observation {
        self.tracker.observe(sample)
    }

    /// Pause or resume position interpolation at `at`.
    pub fn set_playing(&mut self, playing: bool, at: Instant) {
        self.tracker.set_playing(playing, at);
    }

    /// Forget all position samples, e.g. when a new track starts.
    pub fn reset_tracking(&mut self) {
        self.tracker.reset();
    }

    /// Current state machine state.
    pub fn state(&self) -> SyncState {
        match &self.loaded {
            None => SyncState::NoDocument,
            Some(LoadedDocument { active: None, .. }) => SyncState::Idle,
            Some(LoadedDocument { active: Some(a), .. }) => SyncState::Active {
                current_index: a.current_index,
            },
        }
    }

    /// Active line bookkeeping, once a tick has evaluated the document.
    pub fn active_state(&self) -> Option<ActiveLineState> {
        self.loaded.as_ref().and_then(|l| l.active)
    }

    /// The line reported by the last event, if any.
    pub fn active_line(&self) -> Option<&LyricLine> {
        let loaded = self.loaded.as_ref()?;
        let index = loaded.active?.current_index?;
        loaded.document.line(index)
    }

    /// The loaded document.
    pub fn document(&self) -> Option<&LyricDocument> {
        self.loaded.as_ref().map(|l| &l.document)
    }

    /// Version of the loaded document.
    pub fn document_version(&self) -> Option<DocumentVersion> {
        self.loaded.as_ref().map(|l| l.version)
    }

    /// Estimated playback position at `now`.
    pub fn elapsed_ms(&self, now: Instant) -> Option<i64> {
        self.tracker.estimate(now)
    }

    /// Timestamp of the next cue after the position at `now`.
    pub fn next_cue_ms(&self, now: Instant) -> Option<u64> {
        let loaded = self.loaded.as_ref()?;
        loaded.cues.next_cue_after(self.tracker.estimate(now)?)
    }

    /// The position tracker.
    pub const fn tracker(&self) -> &PositionTracker {
        &self.tracker
    }
}
