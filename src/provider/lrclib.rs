use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::lyrics::LyricSource;
use crate::types::TrackInfo;

use super::{FetchedLyrics, LyricsProvider};

/// A track record as returned by LRCLIB.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LrclibTrack {
    /// LRCLIB record id.
    #[serde(default)]
    pub id: Option<i64>,
    /// Track title.
    #[serde(default)]
    pub track_name: Option<String>,
    /// Artist name.
    #[serde(default)]
    pub artist_name: Option<String>,
    /// Album title.
    #[serde(default)]
    pub album_name: Option<String>,
    /// Track length in seconds.
    #[serde(default)]
    pub duration: Option<f64>,
    /// Whether the record is marked instrumental.
    #[serde(default)]
    pub instrumental: bool,
    /// Unsynced lyric text.
    #[serde(default)]
    pub plain_lyrics: Option<String>,
    /// LRC-formatted lyric text.
    #[serde(default)]
    pub synced_lyrics: Option<String>,
}

impl LrclibTrack {
    /// The synced lyrics, if the record has any.
    pub fn synced(&self) -> Option<&str> {
        if self.instrumental {
            return None;
        }
        self.synced_lyrics.as_deref().filter(|s| !s.trim().is_empty())
    }
}

/// Client for the LRCLIB lyrics service.
///
/// Tries the exact `/api/get` lookup when album and duration are known and
/// falls back to `/api/search` otherwise or when the exact lookup misses.
#[derive(Clone)]
pub struct LrclibClient {
    base_url: String,
    client: Client,
}

impl LrclibClient {
    /// Create a new LRCLIB client from config
    pub fn new(config: &Config) -> Self {
        Self::with_base_url(&config.lrclib_url, config.request_timeout(), &config.user_agent())
    }

    /// Create a client against an explicit endpoint
    pub fn with_base_url(base_url: &str, timeout: Duration, user_agent: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::builder()
                .timeout(timeout)
                .user_agent(user_agent)
                .build()
                .unwrap_or_default(),
        }
    }

    /// Make a GET request with query parameters; 404 maps to `None`
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Option<T>> {
        let url = format!("{}{}", self.base_url, path);
        let resp = self.client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| Error::Network(format!("Request to {path} failed: {e}")))?;

        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(Error::provider_status(
                format!("Request to {path} returned {status}"),
                status.as_u16(),
            ));
        }

        resp.json().await
            .map(Some)
            .map_err(|e| Error::parse(format!("Invalid JSON from {path}: {e}"), None))
    }

    /// Exact lookup by artist, title, album and duration
    pub async fn get_track(&self, track: &TrackInfo) -> Result<Option<LrclibTrack>> {
        let mut query = vec![
            ("artist_name", track.artist.clone()),
            ("track_name", track.title.clone()),
        ];
        if let Some(album) = &track.album {
            query.push(("album_name", album.clone()));
        }
        if let Some(duration) = track.duration {
            query.push(("duration", duration.as_secs().to_string()));
        }
        self.get_json("/api/get", &query).await
    }

    /// Search by artist and title
    pub async fn search(&self, track: &TrackInfo) -> Result<Vec<LrclibTrack>> {
        let query = [
            ("artist_name", track.artist.clone()),
            ("track_name", track.title.clone()),
        ];
        Ok(self.get_json("/api/search", &query).await?.unwrap_or_default())
    }
}

#[async_trait]
impl LyricsProvider for LrclibClient {
    async fn fetch(&self, track: &TrackInfo) -> Result<Option<FetchedLyrics>> {
        if track.album.is_some() && track.duration.is_some() {
            if let Some(found) = self.get_track(track).await? {
                tracing::debug!("LRCLIB exact match for {track}");
                return Ok(found.synced().map(|text| FetchedLyrics::new(text, LyricSource::Lrclib)));
            }
        }

        let results = self.search(track).await?;
        tracing::debug!("LRCLIB search for {track} returned {} records", results.len());
        Ok(pick_synced(&results, track.duration)
            .map(|text| FetchedLyrics::new(text, LyricSource::Lrclib)))
    }

    fn name(&self) -> &'static str {
        "LRCLIB"
    }
}

/// Choose the synced lyrics whose record length is closest to `duration`.
///
/// Without a duration the first synced record wins.
fn pick_synced(results: &[LrclibTrack], duration: Option<Duration>) -> Option<&str> {
    let mut candidates = results.iter().filter(|r| r.synced().is_some());
    let best = match duration {
        Some(d) => {
            let wanted = d.as_secs_f64();
            candidates.min_by(|a, b| {
                let da = a.duration.map_or(f64::INFINITY, |x| (x - wanted).abs());
                let db = b.duration.map_or(f64::INFINITY, |x| (x - wanted).abs());
                da.total_cmp(&db)
            })
        }
        None => candidates.next(),
    };
    best.and_then(LrclibTrack::synced)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

    use super::*;

    fn record(duration: f64, synced: Option<&str>) -> LrclibTrack {
        LrclibTrack {
            duration: Some(duration),
            synced_lyrics: synced.map(String::from),
            ..LrclibTrack::default()
        }
    }

    #[test]
    fn test_deserialize_get_response() {
        let json = r#"{
            "id": 3396226,
            "trackName": "I Want to Live",
            "artistName": "Borislav Slavov",
            "albumName": "Baldur's Gate 3 (Original Game Soundtrack)",
            "duration": 233,
            "instrumental": false,
            "plainLyrics": "I feel your breath upon my neck",
            "syncedLyrics": "[00:17.12] I feel your breath upon my neck"
        }"#;
        let track: LrclibTrack = serde_json::from_str(json).unwrap();
        assert_eq!(track.id, Some(3_396_226));
        assert_eq!(track.duration, Some(233.0));
        assert_eq!(track.synced(), Some("[00:17.12] I feel your breath upon my neck"));
    }

    #[test]
    fn test_instrumental_has_no_synced_lyrics() {
        let track: LrclibTrack =
            serde_json::from_str(r#"{"instrumental": true, "syncedLyrics": "[00:01.00]x"}"#).unwrap();
        assert_eq!(track.synced(), None);
    }

    #[test]
    fn test_blank_synced_lyrics_are_missing() {
        assert_eq!(record(100.0, Some("  ")).synced(), None);
    }

    #[test]
    fn test_pick_synced_prefers_closest_duration() {
        let results = vec![
            record(180.0, Some("[00:01.00]radio edit")),
            record(240.0, None),
            record(236.0, Some("[00:01.00]album version")),
        ];
        assert_eq!(
            pick_synced(&results, Some(Duration::from_secs(238))),
            Some("[00:01.00]album version")
        );
        assert_eq!(pick_synced(&results, None), Some("[00:01.00]radio edit"));
    }

    #[test]
    fn test_pick_synced_none_available() {
        let results = vec![record(200.0, None)];
        assert_eq!(pick_synced(&results, None), None);
        assert_eq!(pick_synced(&[], Some(Duration::from_secs(1))), None);
    }
}
