//! Player sampling interface.
//!
//! Media-player integrations report what they observe as [`PlayerUpdate`]s over
//! a tokio channel; the driver is the only consumer.

use std::time::Instant;

use crate::sync::PositionSample;
use crate::types::TrackInfo;

/// Simulated clock-driven player
pub mod simulated;

pub use simulated::SimulatedPlayer;

/// One observation from the media player.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerUpdate {
    /// The player reported its position.
    Position(PositionSample),
    /// Playback was paused or resumed at `at`.
    Playback {
        /// Whether the player is now playing.
        playing: bool,
        /// When the change happened.
        at: Instant,
    },
    /// A different track is now loaded.
    TrackChanged(TrackInfo),
    /// Monitoring ended; the driver shuts down.
    Stopped,
}
