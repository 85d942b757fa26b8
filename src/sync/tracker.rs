//! Playback position interpolation.
//!
//! Players report their position irregularly, often only when their exposed state
//! changes. The tracker anchors on the latest sample and extrapolates linearly at
//! a playback rate of 1.0 so the active line can advance between samples.

use std::time::Instant;

use crate::constants::sync::DEFAULT_DISCONTINUITY_TOLERANCE_MS;

/// One observation: the player was at `reported_position_ms` at `wall_clock_time`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionSample {
    /// Monotonic time the position was valid at.
    pub wall_clock_time: Instant,
    /// Reported playback position in milliseconds.
    pub reported_position_ms: i64,
}

impl PositionSample {
    /// Create a new sample.
    pub const fn new(wall_clock_time: Instant, reported_position_ms: i64) -> Self {
        Self { wall_clock_time, reported_position_ms }
    }
}

/// Snapshot of the tracker's anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackingState {
    /// Latest accepted sample.
    pub last_sample: PositionSample,
    /// Whether position advances with the wall clock.
    pub is_playing: bool,
}

/// How a sample related to the position the tracker expected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Observation {
    /// First sample since creation or reset.
    First,
    /// Within tolerance of the extrapolated position.
    Continuous {
        /// Reported minus expected position.
        drift_ms: i64,
    },
    /// A seek or pause/resume; the tracker re-anchored on it.
    Discontinuity {
        /// Reported minus expected position.
        delta_ms: i64,
    },
    /// Older than the current anchor; ignored.
    Stale,
}

/// Converts jittery samples into a continuous position estimate.
#[derive(Debug, Clone)]
pub struct PositionTracker {
    last_sample: Option<PositionSample>,
    is_playing: bool,
    tolerance_ms: u64,
    samples_seen: u64,
    discontinuities: u64,
}

impl Default for PositionTracker {
    fn default() -> Self {
        Self::new(DEFAULT_DISCONTINUITY_TOLERANCE_MS)
    }
}

impl PositionTracker {
    /// Create a tracker with the given discontinuity tolerance.
    pub const fn new(tolerance_ms: u64) -> Self {
        Self {
            last_sample: None,
            is_playing: true,
            tolerance_ms,
            samples_seen: 0,
            discontinuities: 0,
        }
    }

    /// Record a new ground-truth observation.
    ///
    /// Negative positions are clamped to zero. The sample always becomes the new
    /// anchor unless it is older than the current one.
    pub fn observe(&mut self, sample: PositionSample) -> Observation {
        let sample = PositionSample {
            reported_position_ms: sample.reported_position_ms.max(0),
            ..sample
        };

        let Some(last) = self.last_sample else {
            self.last_sample = Some(sample);
            self.samples_seen += 1;
            return Observation::First;
        };

        if sample.wall_clock_time < last.wall_clock_time {
            tracing::trace!("Ignoring stale position sample at {}ms", sample.reported_position_ms);
            return Observation::Stale;
        }

        let expected = self.extrapolate(last, sample.wall_clock_time);
        let delta_ms = sample.reported_position_ms.saturating_sub(expected);
        self.last_sample = Some(sample);
        self.samples_seen += 1;

        if delta_ms.unsigned_abs() > self.tolerance_ms {
            self.discontinuities += 1;
            tracing::debug!(
                delta_ms,
                position_ms = sample.reported_position_ms,
                "Position discontinuity; re-anchoring"
            );
            Observation::Discontinuity { delta_ms }
        } else {
            Observation::Continuous { drift_ms: delta_ms }
        }
    }

    /// Estimated playback position at `now`, or `None` before the first sample.
    ///
    /// Always extrapolates from the latest sample; times earlier than the anchor
    /// yield the anchor position.
    pub fn estimate(&self, now: Instant) -> Option<i64> {
        self.last_sample.map(|last| self.extrapolate(last, now))
    }

    /// Pause or resume at `at`.
    ///
    /// Pausing freezes the position reached at `at`; resuming continues from the
    /// frozen position starting at `at`.
    pub fn set_playing(&mut self, playing: bool, at: Instant) {
        if playing == self.is_playing {
            return;
        }
        if let Some(last) = self.last_sample {
            let at = at.max(last.wall_clock_time);
            self.last_sample = Some(PositionSample::new(at, self.extrapolate(last, at)));
        }
        self.is_playing = playing;
    }

    /// Forget all samples, e.g. on track change.
    pub fn reset(&mut self) {
        self.last_sample = None;
        self.is_playing = true;
        self.samples_seen = 0;
        self.discontinuities = 0;
    }

    /// Current anchor, if any sample has been observed.
    pub fn state(&self) -> Option<TrackingState> {
        self.last_sample.map(|last_sample| TrackingState {
            last_sample,
            is_playing: self.is_playing,
        })
    }

    /// Whether position advances with the wall clock.
    pub const fn is_playing(&self) -> bool {
        self.is_playing
    }

    /// Discontinuity tolerance in milliseconds.
    pub const fn tolerance_ms(&self) -> u64 {
        self.tolerance_ms
    }

    /// Samples accepted since creation or reset.
    pub const fn samples_seen(&self) -> u64 {
        self.samples_seen
    }

    /// Discontinuities detected since creation or reset.
    pub const fn discontinuities(&self) -> u64 {
        self.discontinuities
    }

    fn extrapolate(&self, last: PositionSample, at: Instant) -> i64 {
        if !self.is_playing {
            return last.reported_position_ms;
        }
        let elapsed = at.saturating_duration_since(last.wall_clock_time);
        let elapsed_ms = i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX);
        last.reported_position_ms.saturating_add(elapsed_ms)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

    use std::time::Duration;

    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_estimate_before_first_sample_is_none() {
        let tracker = PositionTracker::default();
        assert_eq!(tracker.estimate(Instant::now()), None);
        assert!(tracker.state().is_none());
    }

    #[test]
    fn test_estimate_interpolates_while_playing() {
        let t0 = Instant::now();
        let mut tracker = PositionTracker::default();
        assert_eq!(tracker.observe(PositionSample::new(t0, 10_000)), Observation::First);
        assert_eq!(tracker.estimate(t0), Some(10_000));
        assert_eq!(tracker.estimate(t0 + ms(250)), Some(10_250));
        assert_eq!(tracker.estimate(t0 + ms(3_000)), Some(13_000));
    }

    #[test]
    fn test_estimate_is_frozen_while_paused() {
        let t0 = Instant::now();
        let mut tracker = PositionTracker::default();
        tracker.observe(PositionSample::new(t0, 1_000));
        tracker.set_playing(false, t0 + ms(500));
        assert_eq!(tracker.estimate(t0 + ms(500)), Some(1_500));
        assert_eq!(tracker.estimate(t0 + ms(10_000)), Some(1_500));

        tracker.set_playing(true, t0 + ms(10_000));
        assert_eq!(tracker.estimate(t0 + ms(10_400)), Some(1_900));
    }

    #[test]
    fn test_estimate_monotonic_without_new_samples() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..200 {
            let t0 = Instant::now();
            let mut tracker = PositionTracker::default();
            tracker.observe(PositionSample::new(t0, rng.gen_range(-500..300_000)));

            let mut offsets: Vec<u64> = (0..32).map(|_| rng.gen_range(0..600_000)).collect();
            offsets.sort_unstable();
            let estimates: Vec<i64> = offsets
                .iter()
                .map(|&o| tracker.estimate(t0 + ms(o)).unwrap())
                .collect();
            assert!(estimates.windows(2).all(|w| w[0] <= w[1]), "{estimates:?}");
        }
    }

    #[test]
    fn test_query_before_anchor_returns_anchor_position() {
        let t0 = Instant::now();
        let mut tracker = PositionTracker::default();
        tracker.observe(PositionSample::new(t0 + ms(1_000), 4_000));
        assert_eq!(tracker.estimate(t0), Some(4_000));
    }

    #[test]
    fn test_jump_is_discontinuity_and_reanchors_immediately() {
        let t0 = Instant::now();
        let mut tracker = PositionTracker::default();
        tracker.observe(PositionSample::new(t0, 1_000));
        let obs = tracker.observe(PositionSample::new(t0 + ms(1_000), 5_000));
        assert_eq!(obs, Observation::Discontinuity { delta_ms: 3_000 });
        assert_eq!(tracker.estimate(t0 + ms(1_000)), Some(5_000));
        assert_eq!(tracker.estimate(t0 + ms(1_100)), Some(5_100));
        assert_eq!(tracker.discontinuities(), 1);
    }

    #[test]
    fn test_backward_seek_is_discontinuity() {
        let t0 = Instant::now();
        let mut tracker = PositionTracker::default();
        tracker.observe(PositionSample::new(t0, 60_000));
        let obs = tracker.observe(PositionSample::new(t0 + ms(1_000), 2_000));
        assert_eq!(obs, Observation::Discontinuity { delta_ms: -59_000 });
        assert_eq!(tracker.estimate(t0 + ms(1_000)), Some(2_000));
    }

    #[test]
    fn test_small_drift_is_continuous() {
        let t0 = Instant::now();
        let mut tracker = PositionTracker::default();
        tracker.observe(PositionSample::new(t0, 0));
        let obs = tracker.observe(PositionSample::new(t0 + ms(1_000), 1_120));
        assert_eq!(obs, Observation::Continuous { drift_ms: 120 });
        // The fresher sample wins even when it only drifts.
        assert_eq!(tracker.estimate(t0 + ms(1_000)), Some(1_120));
        assert_eq!(tracker.samples_seen(), 2);
        assert_eq!(tracker.discontinuities(), 0);
    }

    #[test]
    fn test_tolerance_is_configurable() {
        let t0 = Instant::now();
        let mut tracker = PositionTracker::new(100);
        tracker.observe(PositionSample::new(t0, 0));
        let obs = tracker.observe(PositionSample::new(t0 + ms(1_000), 1_120));
        assert_eq!(obs, Observation::Discontinuity { delta_ms: 120 });
    }

    #[test]
    fn test_stale_sample_is_ignored() {
        let t0 = Instant::now();
        let mut tracker = PositionTracker::default();
        tracker.observe(PositionSample::new(t0 + ms(2_000), 2_000));
        assert_eq!(tracker.observe(PositionSample::new(t0, 0)), Observation::Stale);
        assert_eq!(tracker.estimate(t0 + ms(2_000)), Some(2_000));
    }

    #[test]
    fn test_negative_position_is_clamped() {
        let t0 = Instant::now();
        let mut tracker = PositionTracker::default();
        tracker.observe(PositionSample::new(t0, -300));
        assert_eq!(tracker.estimate(t0), Some(0));
    }

    #[test]
    fn test_reset_forgets_samples() {
        let t0 = Instant::now();
        let mut tracker = PositionTracker::default();
        tracker.observe(PositionSample::new(t0, 5_000));
        tracker.set_playing(false, t0);
        tracker.reset();
        assert_eq!(tracker.estimate(t0), None);
        assert!(tracker.is_playing());
        assert_eq!(tracker.samples_seen(), 0);
    }
}
