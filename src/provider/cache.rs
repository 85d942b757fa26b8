//! On-disk cache of raw lyric files.
//!
//! One `.lrc` file per track, named after artist and title, so cached lyrics
//! can be inspected and edited with any text editor.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use async_trait::async_trait;
use chrono::{DateTime, Local};
use regex::Regex;

use crate::constants::cache::FILE_EXTENSION;
use crate::error::{Error, Result};
use crate::lyrics::LyricSource;
use crate::types::TrackInfo;

use super::{FetchedLyrics, LyricsProvider};

/// Regex matching characters that are unsafe in cache file names.
#[allow(clippy::expect_used)]
static RE_UNSAFE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[^\w\-.]").expect("valid regex: RE_UNSAFE")
});

/// A cached lyric file.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// File name without directory.
    pub file_name: String,
    /// Full path of the file.
    pub path: PathBuf,
    /// File size in bytes.
    pub size: u64,
    /// Last modification time, if the platform reports one.
    pub modified: Option<DateTime<Local>>,
}

/// Directory of cached raw lyric texts.
#[derive(Debug, Clone)]
pub struct LyricsCache {
    dir: PathBuf,
}

impl LyricsCache {
    /// Create a cache rooted at `dir`. The directory is created on first store.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Cache directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File path used for a track.
    pub fn path_for(&self, track: &TrackInfo) -> PathBuf {
        self.dir.join(format!("{}.{FILE_EXTENSION}", cache_file_stem(track)))
    }

    /// Read cached lyrics for a track; `None` when nothing is cached.
    pub fn load(&self, track: &TrackInfo) -> Result<Option<String>> {
        let path = self.path_for(track);
        match fs_err::read_to_string(&path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::io(e, path)),
        }
    }

    /// Write lyrics for a track, returning the file path.
    pub fn store(&self, track: &TrackInfo, text: &str) -> Result<PathBuf> {
        fs_err::create_dir_all(&self.dir).map_err(|e| Error::io(e, self.dir.clone()))?;
        let path = self.path_for(track);
        fs_err::write(&path, text).map_err(|e| Error::io(e, path.clone()))?;
        tracing::debug!("Cached lyrics for {track} at {}", path.display());
        Ok(path)
    }

    /// List cached lyric files, sorted by name.
    pub fn entries(&self) -> Result<Vec<CacheEntry>> {
        let dir = match fs_err::read_dir(&self.dir) {
            Ok(d) => d,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(Error::io(e, self.dir.clone())),
        };

        let mut entries: Vec<CacheEntry> = dir
            .flatten()
            .filter_map(|entry| {
                let path = entry.path();
                if path.extension().is_none_or(|e| e != FILE_EXTENSION) {
                    return None;
                }
                let meta = entry.metadata().ok()?;
                Some(CacheEntry {
                    file_name: entry.file_name().to_string_lossy().into_owned(),
                    size: meta.len(),
                    modified: meta.modified().ok().map(DateTime::<Local>::from),
                    path,
                })
            })
            .collect();
        entries.sort_by(|a, b| a.file_name.cmp(&b.file_name));
        Ok(entries)
    }

    /// Delete every cached lyric file, returning how many were removed.
    pub fn clear(&self) -> Result<usize> {
        let mut removed = 0;
        for entry in self.entries()? {
            fs_err::remove_file(&entry.path).map_err(|e| Error::io(e, entry.path.clone()))?;
            removed += 1;
        }
        tracing::info!("Removed {removed} cached lyric files from {}", self.dir.display());
        Ok(removed)
    }
}

/// `artist_title`, lowercased, spaces to underscores, unsafe characters dropped.
fn cache_file_stem(track: &TrackInfo) -> String {
    let raw = format!("{}_{}", track.artist, track.title)
        .replace(' ', "_")
        .to_lowercase();
    let stem = RE_UNSAFE
        .replace_all(&raw, "")
        .trim_matches(|c| c == '.' || c == '_')
        .to_string();
    if stem.is_empty() {
        "untitled".to_string()
    } else {
        stem
    }
}

/// Serves lyrics from a [`LyricsCache`] and fills it from an inner provider.
///
/// Cache failures never hide the inner provider: they are logged and the
/// request falls through.
pub struct CachedProvider<P> {
    cache: LyricsCache,
    inner: P,
}

impl<P: LyricsProvider> CachedProvider<P> {
    /// Put `cache` in front of `inner`.
    pub const fn new(cache: LyricsCache, inner: P) -> Self {
        Self { cache, inner }
    }

    /// The underlying cache.
    pub const fn cache(&self) -> &LyricsCache {
        &self.cache
    }
}

#[async_trait]
impl<P: LyricsProvider> LyricsProvider for CachedProvider<P> {
    async fn fetch(&self, track: &TrackInfo) -> Result<Option<FetchedLyrics>> {
        match self.cache.load(track) {
            Ok(Some(text)) => {
                tracing::debug!("Cache hit for {track}");
                return Ok(Some(FetchedLyrics::new(text, LyricSource::Cache)));
            }
            Ok(None) => {}
            Err(e) => tracing::warn!("Failed to read lyrics cache for {track}: {e}"),
        }

        let fetched = self.inner.fetch(track).await?;
        if let Some(lyrics) = &fetched {
            if let Err(e) = self.cache.store(track, &lyrics.text) {
                tracing::warn!("Failed to cache lyrics for {track}: {e}");
            }
        }
        Ok(fetched)
    }

    fn name(&self) -> &'static str {
        self.inner.name()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    struct CountingProvider {
        calls: AtomicUsize,
        answer: Option<&'static str>,
    }

    #[async_trait]
    impl LyricsProvider for CountingProvider {
        async fn fetch(&self, _track: &TrackInfo) -> Result<Option<FetchedLyrics>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.answer.map(|t| FetchedLyrics::new(t, LyricSource::Lrclib)))
        }

        fn name(&self) -> &'static str {
            "counting"
        }
    }

    #[test]
    fn test_cache_file_stem() {
        let track = TrackInfo::new("AC/DC", "Back In Black");
        assert_eq!(cache_file_stem(&track), "acdc_back_in_black");

        let track = TrackInfo::new("Sigur Rós", "Hoppípolla");
        assert_eq!(cache_file_stem(&track), "sigur_rós_hoppípolla");

        let track = TrackInfo::new("..", "/");
        assert_eq!(cache_file_stem(&track), "untitled");
    }

    #[test]
    fn test_store_load_clear() {
        let dir = tempfile::tempdir().unwrap();
        let cache = LyricsCache::new(dir.path().join("lyrics"));
        let track = TrackInfo::new("Artist", "Song");

        assert_eq!(cache.load(&track).unwrap(), None);
        assert!(cache.entries().unwrap().is_empty());

        let path = cache.store(&track, "[00:01.00]hello").unwrap();
        assert!(path.ends_with("artist_song.lrc"));
        assert_eq!(cache.load(&track).unwrap().as_deref(), Some("[00:01.00]hello"));

        let entries = cache.entries().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].file_name, "artist_song.lrc");
        assert_eq!(entries[0].size, 15);

        assert_eq!(cache.clear().unwrap(), 1);
        assert_eq!(cache.load(&track).unwrap(), None);
    }

    #[tokio::test]
    async fn test_cached_provider_fills_and_serves_cache() {
        let dir = tempfile::tempdir().unwrap();
        let provider = CachedProvider::new(
            LyricsCache::new(dir.path()),
            CountingProvider { calls: AtomicUsize::new(0), answer: Some("[00:02.00]la") },
        );
        let track = TrackInfo::new("Band", "Tune");

        let first = provider.fetch(&track).await.unwrap().unwrap();
        assert_eq!(first.source, LyricSource::Lrclib);

        let second = provider.fetch(&track).await.unwrap().unwrap();
        assert_eq!(second.source, LyricSource::Cache);
        assert_eq!(second.text, "[00:02.00]la");
        assert_eq!(provider.inner.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cached_provider_does_not_cache_misses() {
        let dir = tempfile::tempdir().unwrap();
        let provider = CachedProvider::new(
            LyricsCache::new(dir.path()),
            CountingProvider { calls: AtomicUsize::new(0), answer: None },
        );
        let track = TrackInfo::new("Nobody", "Nothing");

        assert!(provider.fetch(&track).await.unwrap().is_none());
        assert!(provider.fetch(&track).await.unwrap().is_none());
        assert_eq!(provider.inner.calls.load(Ordering::SeqCst), 2);
        assert!(provider.cache().entries().unwrap().is_empty());
    }
}
