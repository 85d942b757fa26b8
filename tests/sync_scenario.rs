//! End-to-end checks of the sync engine through the public API.

#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;

use lyricsync::driver::{DisplayEvent, SyncDriver};
use lyricsync::lyrics::{parse_lrc, LyricDocument, LyricLine, LyricSource, Provenance};
use lyricsync::player::SimulatedPlayer;
use lyricsync::provider::{FetchedLyrics, LocalProvider};
use lyricsync::sync::{LyricEvent, PositionSample, SyncEngine, SyncState};
use lyricsync::types::TrackInfo;

fn two_lines() -> LyricDocument {
    LyricDocument::from_lines(
        [LyricLine::new(0, "Line A"), LyricLine::new(5_000, "Line B")],
        Provenance::detached(LyricSource::Inline),
    )
}

fn changed(text: &str) -> Option<LyricEvent> {
    Some(LyricEvent::LineChanged(Some(text.to_string())))
}

#[test]
fn test_two_line_scenario() {
    let start = Instant::now();
    let mut engine = SyncEngine::default();
    engine.load_document(two_lines());
    engine.observe(PositionSample::new(start, 0));

    assert_eq!(engine.tick(start + Duration::from_millis(2_000)), changed("Line A"));
    assert_eq!(engine.tick(start + Duration::from_millis(6_000)), changed("Line B"));
    assert_eq!(engine.tick(start + Duration::from_millis(7_000)), None);
    assert_eq!(engine.state(), SyncState::Active { current_index: Some(1) });
}

#[test]
fn test_discontinuity_reanchors_estimate() {
    let start = Instant::now();
    let mut engine = SyncEngine::default();
    engine.load_document(two_lines());
    engine.observe(PositionSample::new(start, 1_000));
    assert_eq!(engine.tick(start), changed("Line A"));

    let jump = start + Duration::from_millis(1_000);
    engine.observe(PositionSample::new(jump, 5_000));
    assert_eq!(engine.elapsed_ms(jump), Some(5_000));
    assert_eq!(engine.tick(jump), changed("Line B"));
    assert_eq!(engine.tracker().discontinuities(), 1);
}

#[test]
fn test_document_swap_never_mixes_versions() {
    let start = Instant::now();
    let mut engine = SyncEngine::default();
    let first = engine.load_document(two_lines());
    engine.observe(PositionSample::new(start, 0));
    engine.tick(start + Duration::from_millis(6_000));
    assert_eq!(engine.active_state().map(|a| a.document_version), Some(first));

    let replacement = parse_lrc(
        "[00:00.00]New 1\n[00:10.00]New 2\n",
        Provenance::detached(LyricSource::Inline),
    )
    .unwrap();
    let second = engine.load_document(replacement);
    assert!(second > first);
    assert_eq!(engine.state(), SyncState::Idle);

    // Same position, new document: the first line of the new text is active.
    assert_eq!(engine.tick(start + Duration::from_millis(6_000)), changed("New 1"));
    let active = engine.active_state().unwrap();
    assert_eq!(active.document_version, second);
    assert_eq!(engine.active_line().map(|l| l.text.as_str()), Some("New 1"));
}

#[tokio::test(start_paused = true)]
async fn test_simulated_playback_prints_every_line_once() {
    let text = "[ar:Artist]\n[ti:Song]\n[00:01.00]One\n[00:02.50]Two\n[00:04.00]Three\n";
    let provider = LocalProvider::new(Some(FetchedLyrics::new(text, LyricSource::File)));
    let mut driver = SyncDriver::with_settings(Arc::new(provider), Duration::from_millis(20), 750);

    let (tx, rx) = mpsc::channel(32);
    SimulatedPlayer::new(TrackInfo::new("Artist", "Song"), Duration::from_millis(6_000))
        .sample_every(Duration::from_millis(1_000))
        .spawn(tx);

    let mut events: Vec<DisplayEvent> = Vec::new();
    driver.run(rx, &mut events).await;

    let lines: Vec<Option<String>> = events
        .into_iter()
        .filter_map(|e| match e {
            DisplayEvent::Lyric(LyricEvent::LineChanged(text)) => Some(text),
            _ => None,
        })
        .collect();
    assert_eq!(
        lines,
        vec![None, Some("One".into()), Some("Two".into()), Some("Three".into())]
    );
}
