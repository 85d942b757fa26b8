use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::constants::player::DEFAULT_SAMPLE_INTERVAL_MS;
use crate::sync::PositionSample;
use crate::types::TrackInfo;

use super::PlayerUpdate;

/// A scripted jump in playback position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Seek {
    /// Time after playback start at which the seek happens.
    pub at: Duration,
    /// Position the player jumps to, in milliseconds.
    pub to_ms: u64,
}

/// Plays one track against the tokio clock and reports coarse position samples,
/// the way desktop media sessions do.
#[derive(Debug, Clone)]
pub struct SimulatedPlayer {
    track: TrackInfo,
    start_ms: u64,
    sample_interval: Duration,
    stop_after: Duration,
    seek: Option<Seek>,
}

impl SimulatedPlayer {
    /// Play `track` from the beginning for `stop_after`.
    pub fn new(track: TrackInfo, stop_after: Duration) -> Self {
        Self {
            track,
            start_ms: 0,
            sample_interval: Duration::from_millis(DEFAULT_SAMPLE_INTERVAL_MS),
            stop_after,
            seek: None,
        }
    }

    /// Start playback at `start_ms` instead of zero.
    #[must_use]
    pub const fn starting_at(mut self, start_ms: u64) -> Self {
        self.start_ms = start_ms;
        self
    }

    /// Report a position sample every `interval`.
    #[must_use]
    pub fn sample_every(mut self, interval: Duration) -> Self {
        self.sample_interval = interval.max(Duration::from_millis(1));
        self
    }

    /// Jump to `to_ms` once `at` has passed.
    #[must_use]
    pub const fn with_seek(mut self, at: Duration, to_ms: u64) -> Self {
        self.seek = Some(Seek { at, to_ms });
        self
    }

    /// Run the player on a background task.
    pub fn spawn(self, tx: mpsc::Sender<PlayerUpdate>) -> JoinHandle<()> {
        tokio::spawn(self.run(tx))
    }

    /// Run the player until `stop_after` elapses or the receiver is dropped.
    pub async fn run(self, tx: mpsc::Sender<PlayerUpdate>) {
        let started = Instant::now();
        if tx.send(PlayerUpdate::TrackChanged(self.track.clone())).await.is_err() {
            return;
        }

        let mut sampler = time::interval(self.sample_interval);
        sampler.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let stop_at = started + self.stop_after;
        let seek_deadline = self.seek.map(|s| started + s.at);
        let mut seek_pending = seek_deadline.is_some();

        loop {
            tokio::select! {
                _ = sampler.tick() => {}
                () = time::sleep_until(seek_deadline.unwrap_or(stop_at)), if seek_pending => {
                    seek_pending = false;
                    tracing::debug!("Simulated seek on {}", self.track);
                }
                () = time::sleep_until(stop_at) => break,
            }

            let now = Instant::now();
            let sample = PositionSample::new(now.into_std(), self.position_at(now - started));
            if tx.send(PlayerUpdate::Position(sample)).await.is_err() {
                return;
            }
        }

        let _ = tx.send(PlayerUpdate::Stopped).await;
    }

    /// Reported position after `elapsed` of playback.
    pub fn position_at(&self, elapsed: Duration) -> i64 {
        let elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        let position = match self.seek {
            Some(seek) if elapsed >= seek.at => {
                let since_seek = u64::try_from((elapsed - seek.at).as_millis()).unwrap_or(u64::MAX);
                seek.to_ms.saturating_add(since_seek)
            }
            _ => self.start_ms.saturating_add(elapsed_ms),
        };
        i64::try_from(position).unwrap_or(i64::MAX)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_position_at_with_seek() {
        let player = SimulatedPlayer::new(TrackInfo::new("a", "b"), ms(60_000))
            .starting_at(1_000)
            .with_seek(ms(2_000), 30_000);
        assert_eq!(player.position_at(ms(0)), 1_000);
        assert_eq!(player.position_at(ms(1_999)), 2_999);
        assert_eq!(player.position_at(ms(2_000)), 30_000);
        assert_eq!(player.position_at(ms(2_500)), 30_500);
    }

    #[tokio::test(start_paused = true)]
    async fn test_emits_track_samples_and_stop() {
        let (tx, mut rx) = mpsc::channel(64);
        SimulatedPlayer::new(TrackInfo::new("a", "b"), ms(3_500))
            .sample_every(ms(1_000))
            .spawn(tx);

        assert!(matches!(rx.recv().await, Some(PlayerUpdate::TrackChanged(_))));

        let mut positions = Vec::new();
        loop {
            match rx.recv().await {
                Some(PlayerUpdate::Position(s)) => positions.push(s.reported_position_ms),
                Some(PlayerUpdate::Stopped) | None => break,
                Some(other) => panic!("unexpected update {other:?}"),
            }
        }
        assert_eq!(positions, vec![0, 1_000, 2_000, 3_000]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_seek_is_reported_immediately() {
        let (tx, mut rx) = mpsc::channel(64);
        SimulatedPlayer::new(TrackInfo::new("a", "b"), ms(1_500))
            .sample_every(ms(1_000))
            .with_seek(ms(500), 90_000)
            .spawn(tx);

        let mut positions = Vec::new();
        while let Some(update) = rx.recv().await {
            if let PlayerUpdate::Position(s) = update {
                positions.push(s.reported_position_ms);
            }
        }
        assert_eq!(positions, vec![0, 90_000, 90_500]);
    }
}
