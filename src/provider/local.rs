use std::path::Path;

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::lyrics::LyricSource;
use crate::types::TrackInfo;

use super::{FetchedLyrics, LyricsProvider};

/// Answers every track with the same, already available lyric text.
///
/// Used to replay a local `.lrc` file or lyrics fetched ahead of time.
#[derive(Debug, Clone, Default)]
pub struct LocalProvider {
    lyrics: Option<FetchedLyrics>,
}

impl LocalProvider {
    /// Serve `lyrics`; `None` answers "not found".
    pub const fn new(lyrics: Option<FetchedLyrics>) -> Self {
        Self { lyrics }
    }

    /// Serve the contents of an `.lrc` file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs_err::read_to_string(path).map_err(|e| Error::io(e, path.to_path_buf()))?;
        Ok(Self::new(Some(FetchedLyrics::new(text, LyricSource::File))))
    }

    /// The text this provider serves.
    pub fn lyrics(&self) -> Option<&FetchedLyrics> {
        self.lyrics.as_ref()
    }
}

#[async_trait]
impl LyricsProvider for LocalProvider {
    async fn fetch(&self, _track: &TrackInfo) -> Result<Option<FetchedLyrics>> {
        Ok(self.lyrics.clone())
    }

    fn name(&self) -> &'static str {
        "local"
    }
}
