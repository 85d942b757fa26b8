//! `lyricsync` - lyrics synchronized to media player playback.
//!
//! The core is a small, tick-driven engine: position samples from a player are
//! interpolated by a [`sync::PositionTracker`], looked up in a document's
//! [`lyrics::CueIndex`], and turned into line-change events by a
//! [`sync::SyncEngine`]. Around it sit an LRC parser, an LRCLIB client with an
//! on-disk cache, and an async driver that runs the engine at a fixed rate.

// Re-export public modules for use in integration tests and as a library
pub mod config;
pub mod constants;
pub mod driver;
pub mod error;
pub mod lyrics;
pub mod player;
pub mod provider;
pub mod sync;
pub mod types;
