//! Fixed-rate driver around the sync engine.
//!
//! Owns the [`SyncEngine`] inside one task. Player updates and fetch results
//! arrive over channels and are applied between ticks, so every tick sees a
//! whole document or none.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::config::Config;
use crate::constants::async_tasks::CHANNEL_BUFFER_SIZE;
use crate::error::Result;
use crate::lyrics::{parse_lrc, LyricDocument, ParseError, Provenance};
use crate::player::PlayerUpdate;
use crate::provider::{FetchedLyrics, LyricsProvider};
use crate::sync::{LyricEvent, Observation, SyncEngine};
use crate::types::TrackInfo;

/// Why a track has nothing to display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LyricsUnavailable {
    /// The provider has no synced lyrics for the track.
    NotFound,
    /// The lyric text could not be parsed.
    Parse(ParseError),
    /// The provider could not be reached or answered with an error.
    Fetch(String),
}

impl fmt::Display for LyricsUnavailable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => f.write_str("no synced lyrics found"),
            Self::Parse(e) => write!(f, "unreadable lyrics: {e}"),
            Self::Fetch(e) => write!(f, "lyrics lookup failed: {e}"),
        }
    }
}

/// Turn a provider answer into a document, absorbing every failure.
pub fn resolve_lyrics(
    track: &TrackInfo,
    fetched: Result<Option<FetchedLyrics>>,
) -> std::result::Result<LyricDocument, LyricsUnavailable> {
    let lyrics = fetched
        .map_err(|e| LyricsUnavailable::Fetch(e.to_string()))?
        .ok_or(LyricsUnavailable::NotFound)?;
    parse_lrc(&lyrics.text, Provenance::new(track.id.clone(), lyrics.source))
        .map_err(LyricsUnavailable::Parse)
}

/// What the presentation layer is asked to show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayEvent {
    /// Engine output.
    Lyric(LyricEvent),
    /// Lyrics for a new track are being looked up.
    Searching(TrackInfo),
    /// The current track has nothing to display.
    NoLyrics {
        /// Track the lookup was for.
        track: TrackInfo,
        /// Why nothing is available.
        reason: LyricsUnavailable,
    },
}

/// Receives display events; rendering is entirely up to the implementation.
pub trait Presenter: Send {
    /// Handle one event.
    fn present(&mut self, event: DisplayEvent);
}

/// Records events in order, for tests and batch tools.
impl Presenter for Vec<DisplayEvent> {
    fn present(&mut self, event: DisplayEvent) {
        self.push(event);
    }
}

struct FetchOutcome {
    track: TrackInfo,
    result: std::result::Result<LyricDocument, LyricsUnavailable>,
}

/// Drives a [`SyncEngine`] from player updates at a fixed tick rate.
pub struct SyncDriver<P> {
    engine: SyncEngine,
    provider: Arc<P>,
    tick_interval: Duration,
    current_track: Option<TrackInfo>,
    fetch_tx: mpsc::Sender<FetchOutcome>,
    fetch_rx: mpsc::Receiver<FetchOutcome>,
}

impl<P: LyricsProvider + 'static> SyncDriver<P> {
    /// Create a driver using the configured tick rate and tolerance.
    pub fn new(provider: Arc<P>, config: &Config) -> Self {
        Self::with_settings(provider, config.tick_interval(), config.discontinuity_tolerance_ms)
    }

    /// Create a driver with explicit settings.
    pub fn with_settings(provider: Arc<P>, tick_interval: Duration, tolerance_ms: u64) -> Self {
        let (fetch_tx, fetch_rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);
        Self {
            engine: SyncEngine::new(tolerance_ms),
            provider,
            tick_interval: tick_interval.max(Duration::from_millis(1)),
            current_track: None,
            fetch_tx,
            fetch_rx,
        }
    }

    /// The engine, for inspection between runs.
    pub const fn engine(&self) -> &SyncEngine {
        &self.engine
    }

    /// Run until the player reports [`PlayerUpdate::Stopped`] or its channel closes.
    pub async fn run<R: Presenter>(&mut self, mut updates: mpsc::Receiver<PlayerUpdate>, presenter: &mut R) {
        let mut ticker = time::interval(self.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                update = updates.recv() => match update {
                    Some(PlayerUpdate::Stopped) | None => break,
                    Some(update) => self.apply_update(update, presenter),
                },
                Some(outcome) = self.fetch_rx.recv() => self.apply_fetch(outcome, presenter),
                _ = ticker.tick() => {
                    if let Some(event) = self.engine.tick(Instant::now().into_std()) {
                        presenter.present(DisplayEvent::Lyric(event));
                    }
                }
            }
        }

        tracing::debug!("Player monitoring stopped");
        self.current_track = None;
        if let Some(event) = self.engine.clear_document() {
            presenter.present(DisplayEvent::Lyric(event));
        }
    }

    fn apply_update<R: Presenter>(&mut self, update: PlayerUpdate, presenter: &mut R) {
        match update {
            PlayerUpdate::Position(sample) => {
                if let Observation::Discontinuity { delta_ms } = self.engine.observe(sample) {
                    tracing::debug!("Re-anchored after {delta_ms}ms jump");
                }
            }
            PlayerUpdate::Playback { playing, at } => self.engine.set_playing(playing, at),
            PlayerUpdate::TrackChanged(track) => self.change_track(track, presenter),
            PlayerUpdate::Stopped => {}
        }
    }

    fn change_track<R: Presenter>(&mut self, track: TrackInfo, presenter: &mut R) {
        if self.current_track.as_ref().is_some_and(|t| t.id == track.id) {
            return;
        }

        tracing::info!("Now playing: {track}");
        if let Some(event) = self.engine.clear_document() {
            presenter.present(DisplayEvent::Lyric(event));
        }
        self.engine.reset_tracking();
        self.current_track = Some(track.clone());
        presenter.present(DisplayEvent::Searching(track.clone()));

        let provider = Arc::clone(&self.provider);
        let tx = self.fetch_tx.clone();
        tokio::spawn(async move {
            let fetched = provider.fetch(&track).await;
            let result = resolve_lyrics(&track, fetched);
            let _ = tx.send(FetchOutcome { track, result }).await;
        });
    }

    fn apply_fetch<R: Presenter>(&mut self, outcome: FetchOutcome, presenter: &mut R) {
        let is_current = self.current_track.as_ref().is_some_and(|t| t.id == outcome.track.id);
        if !is_current {
            tracing::debug!("Discarding lyrics for {}; track already changed", outcome.track);
            return;
        }

        match outcome.result {
            Ok(document) => {
                if document.is_empty() {
                    tracing::info!("Lyrics for {} contain no lines", outcome.track);
                }
                self.engine.load_document(document);
            }
            Err(reason) => {
                match &reason {
                    LyricsUnavailable::NotFound => tracing::info!("No synced lyrics for {}", outcome.track),
                    other => tracing::warn!("No lyrics for {}: {other}", outcome.track),
                }
                presenter.present(DisplayEvent::NoLyrics { track: outcome.track, reason });
            }
        }
    }
}
