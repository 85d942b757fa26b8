//! Lyric synchronization engine.
//!
//! Raw position samples flow into a [`PositionTracker`]; on every tick the
//! [`SyncEngine`] turns the estimated position into an active line via the
//! document's cue index and emits a [`LyricEvent`] only when that line changes.

/// Position samples to active line, per tick
pub mod engine;
/// Position interpolation between samples
pub mod tracker;

pub use engine::{ActiveLineState, LyricEvent, SyncEngine, SyncState};
pub use tracker::{Observation, PositionSample, PositionTracker, TrackingState};
