//! `lyricsync` - synchronized lyrics in the terminal.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use lyricsync::config::Config;
use lyricsync::constants::async_tasks::CHANNEL_BUFFER_SIZE;
use lyricsync::constants::player::{DEFAULT_SAMPLE_INTERVAL_MS, TAIL_MS, UNKNOWN_TRACK_LENGTH_MS};
use lyricsync::driver::{resolve_lyrics, DisplayEvent, Presenter, SyncDriver};
use lyricsync::lyrics::lrc::format_timestamp;
use lyricsync::lyrics::{parse_lrc, LyricDocument, LyricSource, Provenance};
use lyricsync::player::SimulatedPlayer;
use lyricsync::provider::{
    CachedProvider, FetchedLyrics, LocalProvider, LrclibClient, LyricsCache, LyricsProvider,
};
use lyricsync::sync::LyricEvent;
use lyricsync::types::TrackInfo;

/// Command-line arguments for lyricsync
#[derive(Parser, Debug)]
#[command(name = "lyricsync")]
#[command(about = "Display lyrics synchronized to playback position")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse an LRC file and print its cues
    Show {
        /// LRC file to parse
        file: PathBuf,
        /// Print the parsed document as JSON
        #[arg(long)]
        json: bool,
    },
    /// Simulate playback of an LRC file and print lines as they become active
    Play {
        /// LRC file to play
        file: PathBuf,
        #[command(flatten)]
        playback: PlaybackArgs,
    },
    /// Look up lyrics for a track through the cache and LRCLIB
    Fetch {
        #[command(flatten)]
        track: TrackArgs,
    },
    /// Look up lyrics for a track, then simulate playback
    Sync {
        #[command(flatten)]
        track: TrackArgs,
        #[command(flatten)]
        playback: PlaybackArgs,
    },
    /// List cached lyric files
    CacheList,
    /// Delete cached lyric files
    CacheClear,
}

#[derive(Args, Debug)]
struct TrackArgs {
    /// Artist name
    #[arg(long)]
    artist: String,
    /// Track title
    #[arg(long)]
    title: String,
    /// Album title
    #[arg(long)]
    album: Option<String>,
    /// Track length in seconds
    #[arg(long)]
    duration: Option<u64>,
}

impl TrackArgs {
    fn to_track(&self) -> TrackInfo {
        let mut track = TrackInfo::new(&self.artist, &self.title);
        if let Some(album) = &self.album {
            track = track.with_album(album);
        }
        if let Some(secs) = self.duration {
            track = track.with_duration(Duration::from_secs(secs));
        }
        track
    }
}

#[derive(Args, Debug)]
struct PlaybackArgs {
    /// Start position in milliseconds
    #[arg(long, default_value_t = 0)]
    start_ms: u64,
    /// Gap between simulated player position reports
    #[arg(long, default_value_t = DEFAULT_SAMPLE_INTERVAL_MS)]
    sample_interval_ms: u64,
    /// Seek after this many milliseconds of playback
    #[arg(long, requires = "seek_to_ms")]
    seek_at_ms: Option<u64>,
    /// Position to seek to, in milliseconds
    #[arg(long, requires = "seek_at_ms")]
    seek_to_ms: Option<u64>,
    /// Stop after this many milliseconds (default: just past the last line)
    #[arg(long)]
    stop_after_ms: Option<u64>,
}

/// Prints display events to stdout, one line each.
struct TerminalPresenter;

impl Presenter for TerminalPresenter {
    fn present(&mut self, event: DisplayEvent) {
        match event {
            DisplayEvent::Searching(track) => println!("♪ Searching lyrics for {track}..."),
            DisplayEvent::NoLyrics { reason, .. } => println!("  (no lyrics: {reason})"),
            DisplayEvent::Lyric(LyricEvent::LineChanged(Some(text))) if text.is_empty() => println!("  ♪"),
            DisplayEvent::Lyric(LyricEvent::LineChanged(Some(text))) => println!("  {text}"),
            DisplayEvent::Lyric(LyricEvent::LineChanged(None)) => println!("  ..."),
            DisplayEvent::Lyric(LyricEvent::DocumentCleared) => println!(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("lyricsync=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load().context("Failed to load configuration")?;

    match cli.command {
        Command::Show { file, json } => show(&file, json),
        Command::Play { file, playback } => {
            let provider = LocalProvider::from_file(&file)?;
            let stem = file
                .file_stem()
                .map_or_else(|| "track".to_string(), |s| s.to_string_lossy().into_owned());
            let track = TrackInfo::new("local", stem);
            let last_line_ms = provider
                .lyrics()
                .and_then(|l| resolve_lyrics(&track, Ok(Some(l.clone()))).ok())
                .and_then(|doc: LyricDocument| doc.last_timestamp_ms())
                .unwrap_or(0);
            let stop_after = playback_length(&playback, last_line_ms);
            play(&config, track, provider, stop_after, &playback).await;
            Ok(())
        }
        Command::Fetch { track } => fetch(&config, &track.to_track()).await,
        Command::Sync { track, playback } => {
            let track = track.to_track();
            let track_end_ms = track.duration.map_or(UNKNOWN_TRACK_LENGTH_MS, |d| {
                u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
            });
            let stop_after = playback_length(&playback, track_end_ms);
            // The driver does the lookup so fetch failures reach the presenter.
            let client = LrclibClient::new(&config);
            match &config.cache_dir {
                Some(dir) => {
                    let provider = CachedProvider::new(LyricsCache::new(dir), client);
                    play(&config, track, provider, stop_after, &playback).await;
                }
                None => play(&config, track, client, stop_after, &playback).await,
            }
            Ok(())
        }
        Command::CacheList => cache_list(&config),
        Command::CacheClear => {
            let removed = cache(&config)?.clear()?;
            println!("Removed {removed} cached lyric files");
            Ok(())
        }
    }
}

fn show(file: &Path, json: bool) -> Result<()> {
    let provider = LocalProvider::from_file(file)?;
    let text = provider.lyrics().map_or("", |l| l.text.as_str());
    let doc = parse_lrc(text, Provenance::detached(LyricSource::File))
        .map_err(|e| lyricsync::error::Error::parse(e.to_string(), file.to_path_buf()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&doc)?);
        return Ok(());
    }

    let meta = doc.metadata();
    for (label, value) in [
        ("Artist", &meta.artist),
        ("Title", &meta.title),
        ("Album", &meta.album),
        ("By", &meta.author),
    ] {
        if let Some(value) = value {
            println!("{label}: {value}");
        }
    }
    if let Some(length) = meta.length_ms {
        println!("Length: {}", format_timestamp(length));
    }
    if meta.offset_ms != 0 {
        println!("Offset: {}ms (applied)", meta.offset_ms);
    }
    println!("{} lines", doc.len());
    for line in doc.lines() {
        println!("[{}] {}", format_timestamp(line.timestamp_ms), line.text);
    }
    Ok(())
}

/// How long to simulate playback when the content ends at `end_ms`.
fn playback_length(args: &PlaybackArgs, end_ms: u64) -> u64 {
    if let Some(ms) = args.stop_after_ms {
        return ms;
    }
    let remaining = match (args.seek_at_ms, args.seek_to_ms) {
        (Some(at), Some(to)) => at.saturating_add(end_ms.saturating_sub(to)),
        _ => end_ms.saturating_sub(args.start_ms),
    };
    remaining.saturating_add(TAIL_MS)
}

async fn play<P: LyricsProvider + 'static>(
    config: &Config,
    track: TrackInfo,
    provider: P,
    stop_after: u64,
    args: &PlaybackArgs,
) {
    let mut player = SimulatedPlayer::new(track, Duration::from_millis(stop_after))
        .starting_at(args.start_ms)
        .sample_every(Duration::from_millis(args.sample_interval_ms));
    if let (Some(at), Some(to)) = (args.seek_at_ms, args.seek_to_ms) {
        player = player.with_seek(Duration::from_millis(at), to);
    }

    let (tx, rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);
    let player_task = player.spawn(tx);
    let mut driver = SyncDriver::new(Arc::new(provider), config);
    driver.run(rx, &mut TerminalPresenter).await;

    if let Err(e) = player_task.await {
        tracing::warn!("Simulated player task failed: {e}");
    }
}

async fn fetch(config: &Config, track: &TrackInfo) -> Result<()> {
    let Some(lyrics) = fetch_remote(config, track).await? else {
        println!("No synced lyrics found for {track}");
        return Ok(());
    };

    match resolve_lyrics(track, Ok(Some(lyrics.clone()))) {
        Ok(doc) => println!("# {} lines from {}", doc.len(), lyrics.source),
        Err(reason) => println!("# {reason}"),
    }
    println!("{}", lyrics.text);
    Ok(())
}

async fn fetch_remote(config: &Config, track: &TrackInfo) -> Result<Option<FetchedLyrics>> {
    let client = LrclibClient::new(config);
    let fetched = match &config.cache_dir {
        Some(dir) => CachedProvider::new(LyricsCache::new(dir), client).fetch(track).await,
        None => client.fetch(track).await,
    };
    fetched.with_context(|| format!("Failed to fetch lyrics for {track}"))
}

fn cache(config: &Config) -> Result<LyricsCache> {
    config
        .cache_dir
        .as_ref()
        .map(LyricsCache::new)
        .context("Lyrics cache is disabled (LYRICSYNC_CACHE_DIR=off)")
}

fn cache_list(config: &Config) -> Result<()> {
    let cache = cache(config)?;
    let entries = cache.entries()?;
    println!("{} cached lyric files in {}", entries.len(), cache.dir().display());
    for entry in entries {
        let modified = entry
            .modified
            .map_or_else(|| "-".to_string(), |t| t.format("%Y-%m-%d %H:%M").to_string());
        println!("  {modified}  {:>7}  {}", entry.size, entry.file_name);
    }
    Ok(())
}
