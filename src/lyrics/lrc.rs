//! LRC timed-lyric parser.
//!
//! Accepts `[mm:ss.xx]`, `[mm:ss.xxx]` and `[mm:ss]` timestamps, several per line,
//! the common ID tags, and strips enhanced-LRC `<mm:ss.xx>` word timings.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use super::document::{LyricDocument, LyricLine, LyricMetadata, Provenance};

/// Regex matching the inside of a timestamp tag, e.g. `01:23.45`.
#[allow(clippy::expect_used)]
static RE_TIMESTAMP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,4}):(\d{1,2})(?:[.:](\d{1,3}))?$").expect("valid regex: RE_TIMESTAMP")
});

/// Regex matching tags meant as timestamps: minutes followed by a colon.
#[allow(clippy::expect_used)]
static RE_TIMESTAMP_LIKE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\s*:").expect("valid regex: RE_TIMESTAMP_LIKE"));

/// Regex matching the inside of an ID tag, e.g. `ar:Artist`.
#[allow(clippy::expect_used)]
static RE_ID_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z]+):(.*)$").expect("valid regex: RE_ID_TAG")
});

/// Regex matching enhanced-LRC inline word timings like `<00:12.50>`.
#[allow(clippy::expect_used)]
static RE_WORD_TIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<\d+:\d+(?:[.:]\d+)?>").expect("valid regex: RE_WORD_TIME")
});

/// Why a text produced no synced lyrics.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A tag shaped like a timestamp whose fields could not be read.
    #[error("malformed timestamp [{tag}] on line {line}")]
    MalformedTimestamp {
        /// 1-based line number in the input.
        line: usize,
        /// Tag content without brackets.
        tag: String,
    },

    /// The text has lyrics, but none of them carry a timestamp.
    #[error("no synced lyrics available")]
    NoSyncedLines,
}

/// Parse LRC text into a sorted document.
///
/// Text made only of blank lines and ID tags yields an empty document;
/// text with content but no timestamps yields [`ParseError::NoSyncedLines`].
pub fn parse_lrc(text: &str, provenance: Provenance) -> Result<LyricDocument, ParseError> {
    let mut cues = Vec::new();
    let mut metadata = LyricMetadata::default();
    let mut unsynced = 0usize;

    for (idx, raw) in text.lines().enumerate() {
        let line_number = idx + 1;
        let mut rest = raw.trim();
        let mut stamps = Vec::new();
        let mut saw_id_tag = false;

        while let Some(after_open) = rest.strip_prefix('[') {
            let Some(close) = after_open.find(']') else {
                break;
            };
            let tag = after_open[..close].trim();

            if RE_TIMESTAMP_LIKE.is_match(tag) {
                let ms = parse_timestamp(tag).ok_or_else(|| ParseError::MalformedTimestamp {
                    line: line_number,
                    tag: tag.to_string(),
                })?;
                stamps.push(ms);
            } else if let Some(caps) = RE_ID_TAG.captures(tag) {
                apply_id_tag(&mut metadata, &caps[1], caps[2].trim());
                saw_id_tag = true;
            } else {
                // Section markers like `[Chorus]` or footnotes like `[1]` are text.
                break;
            }

            rest = after_open[close + 1..].trim_start();
        }

        if stamps.is_empty() {
            if !rest.is_empty() && !saw_id_tag {
                unsynced += 1;
            }
            continue;
        }

        let text = clean_text(rest);
        cues.extend(stamps.into_iter().map(|ms| LyricLine::new(ms, text.clone())));
    }

    if cues.is_empty() {
        if unsynced > 0 {
            tracing::debug!("{unsynced} lyric lines without timestamps; treating as unsynced");
            return Err(ParseError::NoSyncedLines);
        }
        return Ok(LyricDocument::with_metadata(Vec::new(), provenance, metadata));
    }

    if metadata.offset_ms != 0 {
        let offset = metadata.offset_ms;
        for cue in &mut cues {
            cue.timestamp_ms = apply_offset(cue.timestamp_ms, offset);
        }
    }

    let doc = LyricDocument::with_metadata(cues, provenance, metadata);
    tracing::debug!("Parsed {} cues from {}", doc.len(), doc.provenance().source);
    Ok(doc)
}

/// Parse `mm:ss`, `mm:ss.x`, `mm:ss.xx` or `mm:ss.xxx` into milliseconds.
pub fn parse_timestamp(tag: &str) -> Option<u64> {
    let caps = RE_TIMESTAMP.captures(tag.trim())?;
    let minutes: u64 = caps.get(1)?.as_str().parse().ok()?;
    let seconds: u64 = caps.get(2)?.as_str().parse().ok()?;
    if seconds >= 60 {
        return None;
    }

    let fraction_ms = match caps.get(3) {
        Some(m) => {
            let digits = m.as_str();
            let value: u64 = digits.parse().ok()?;
            match digits.len() {
                1 => value * 100,
                2 => value * 10,
                _ => value,
            }
        }
        None => 0,
    };

    minutes
        .checked_mul(60_000)?
        .checked_add(seconds * 1000)?
        .checked_add(fraction_ms)
}

/// Render milliseconds as `mm:ss.xx`.
pub fn format_timestamp(ms: u64) -> String {
    let minutes = ms / 60_000;
    let seconds = (ms / 1000) % 60;
    let centis = (ms % 1000) / 10;
    format!("{minutes:02}:{seconds:02}.{centis:02}")
}

fn apply_id_tag(metadata: &mut LyricMetadata, key: &str, value: &str) {
    let value_owned = || (!value.is_empty()).then(|| value.to_string());
    match key.to_ascii_lowercase().as_str() {
        "ar" => metadata.artist = value_owned(),
        "ti" => metadata.title = value_owned(),
        "al" => metadata.album = value_owned(),
        "by" => metadata.author = value_owned(),
        "length" => metadata.length_ms = parse_timestamp(value),
        "offset" => match value.parse::<i64>() {
            Ok(offset) => metadata.offset_ms = offset,
            Err(_) => tracing::debug!("Ignoring unreadable offset tag: {value:?}"),
        },
        _ => {}
    }
}

/// Positive offsets make lyrics appear sooner. Results never go below zero.
const fn apply_offset(timestamp_ms: u64, offset_ms: i64) -> u64 {
    if offset_ms >= 0 {
        timestamp_ms.saturating_sub(offset_ms.unsigned_abs())
    } else {
        timestamp_ms.saturating_add(offset_ms.unsigned_abs())
    }
}

fn clean_text(text: &str) -> String {
    if RE_WORD_TIME.is_match(text) {
        RE_WORD_TIME
            .replace_all(text, "")
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
    } else {
        text.trim().to_string()
    }
}
