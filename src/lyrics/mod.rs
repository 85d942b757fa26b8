//! Lyric data model, LRC parsing and cue lookup.
//!
//! A [`LyricDocument`] is built once per track from raw LRC text and never
//! changes afterwards; a [`CueIndex`] is derived from it for per-tick lookups.

/// Binary-search index over cue timestamps
pub mod cue;
/// Immutable document model
pub mod document;
/// LRC text parser
pub mod lrc;

pub use cue::CueIndex;
pub use document::{LyricDocument, LyricLine, LyricMetadata, LyricSource, Provenance};
pub use lrc::{parse_lrc, ParseError};
