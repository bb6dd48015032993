//! # Song Data
//!
//! Reads the song-data input contract (lines with nominal timing, optional word-level
//! "rich sync" timing, translations) and turns it into the engine's data model.
//!
//! ## Two loading tiers
//! - [`Song::from_json`] is lenient: numeric garbage is clamped into range, words that
//!   end before they start become instant words and lines are re-sorted by start time.
//!   Every repair is logged with `log::warn!`.
//! - [`validate_song`] is strict: it reports the first broken invariant so tooling can
//!   reject bad data before it ships.
//!
//! ## Input shape
//! ```json
//! {
//!   "title": "Rolling in The Deep",
//!   "artist": { "name": "Adele" },
//!   "lrc": [
//!     { "_id": { "$oid": "6751641f" }, "line": "There's a fire starting in my heart",
//!       "milliseconds": 6090, "duration": 4410,
//!       "translations": { "he": { "text": "יש אש שמתחילה בלב שלי" } } }
//!   ],
//!   "richSync": { "words": [
//!     { "word": "there's", "punctuatedWord": "There's", "start": 6759, "end": 7279,
//!       "isEstimatedTiming": false, "isEndOfLine": false }
//!   ] }
//! }
//! ```

use serde::Deserialize;
use std::collections::BTreeMap;

use crate::error::LyricsError;
use crate::types::{LanguageCode, Line, TimedWord};

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct RawSong {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    artist: Option<RawArtist>,
    #[serde(default)]
    languages: Vec<String>,
    #[serde(default)]
    musixmatch: Option<RawMusixmatch>,
    lrc: Vec<RawLine>,
    #[serde(default)]
    rich_sync: Option<RawRichSync>,
}

#[derive(Deserialize, Debug)]
struct RawArtist {
    #[serde(default)]
    name: Option<String>,
}

#[derive(Deserialize, Debug)]
struct RawMusixmatch {
    #[serde(default)]
    lyrics: Option<RawMusixmatchLyrics>,
}

#[derive(Deserialize, Debug)]
struct RawMusixmatchLyrics {
    #[serde(default)]
    lyrics_language: Option<String>,
}

#[derive(Deserialize, Debug)]
struct RawObjectId {
    #[serde(rename = "$oid")]
    oid: String,
}

#[derive(Deserialize, Debug)]
struct RawLine {
    #[serde(rename = "_id", default)]
    id: Option<RawObjectId>,
    #[serde(default)]
    line: String,
    milliseconds: f64,
    #[serde(default)]
    duration: f64,
    #[serde(default)]
    translations: BTreeMap<String, RawTranslation>,
}

#[derive(Deserialize, Debug)]
struct RawTranslation {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize, Debug)]
struct RawRichSync {
    #[serde(default)]
    words: Vec<RawWord>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct RawWord {
    #[serde(default)]
    word: String,
    start: f64,
    end: f64,
    #[serde(default)]
    punctuated_word: Option<String>,
    #[serde(default)]
    is_estimated_timing: bool,
    #[serde(default)]
    is_end_of_line: bool,
}

/// A loaded song: ordered lines plus the flat word timeline (empty without rich sync).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Song {
    pub title: Option<String>,
    pub artist: Option<String>,
    /// Language the lyrics are written in.
    pub language: Option<LanguageCode>,
    /// Languages translations are available in.
    pub languages: Vec<LanguageCode>,
    pub lines: Vec<Line>,
    pub words: Vec<TimedWord>,
}

impl Song {
    pub fn new(lines: Vec<Line>, words: Vec<TimedWord>) -> Self {
        Self {
            lines,
            words,
            ..Default::default()
        }
    }

    /// Decode and sanitize song JSON.
    ///
    /// # Errors
    /// Returns [`LyricsError::SongData`] when the JSON is malformed or lacks `lrc`.
    /// Out-of-range values never fail; they are repaired and logged.
    pub fn from_json(json: &str) -> Result<Self, LyricsError> {
        let raw: RawSong =
            serde_json::from_str(json).map_err(|e| LyricsError::SongData(e.to_string()))?;
        Ok(Self::from_raw(raw))
    }

    fn from_raw(raw: RawSong) -> Self {
        let mut lines: Vec<Line> = raw
            .lrc
            .into_iter()
            .enumerate()
            .map(|(index, raw_line)| {
                let id = raw_line
                    .id
                    .map(|id| id.oid)
                    .filter(|oid| !oid.is_empty())
                    .unwrap_or_else(|| format!("line-{}", index));
                let translations = raw_line
                    .translations
                    .into_iter()
                    .filter_map(|(lang, t)| {
                        t.text
                            .filter(|text| !text.trim().is_empty())
                            .map(|text| (lang, text))
                    })
                    .collect();
                Line {
                    id,
                    text: raw_line.line,
                    start_ms: sanitize_ms(raw_line.milliseconds, "line", index, "milliseconds"),
                    duration_ms: sanitize_ms(raw_line.duration, "line", index, "duration"),
                    translations,
                }
            })
            .collect();

        if lines.windows(2).any(|w| w[0].start_ms > w[1].start_ms) {
            log::warn!("lines are not ordered by start time, re-sorting");
            lines.sort_by_key(|line| line.start_ms);
        }

        let words = raw
            .rich_sync
            .map(|rs| rs.words)
            .unwrap_or_default()
            .into_iter()
            .enumerate()
            .map(|(index, raw_word)| {
                let start_ms = sanitize_ms(raw_word.start, "word", index, "start");
                let mut end_ms = sanitize_ms(raw_word.end, "word", index, "end");
                if end_ms < start_ms {
                    log::warn!(
                        "word {} ends at {} before it starts at {}, treating as instant",
                        index,
                        end_ms,
                        start_ms
                    );
                    end_ms = start_ms;
                }
                let punctuated_text = raw_word
                    .punctuated_word
                    .filter(|p| !p.is_empty())
                    .unwrap_or_else(|| raw_word.word.clone());
                TimedWord {
                    text: raw_word.word,
                    punctuated_text,
                    start_ms,
                    end_ms,
                    is_estimated: raw_word.is_estimated_timing,
                    is_end_of_line: raw_word.is_end_of_line,
                }
            })
            .collect();

        Song {
            title: raw.title,
            artist: raw.artist.and_then(|a| a.name),
            language: raw.musixmatch.and_then(|m| m.lyrics).and_then(|l| l.lyrics_language),
            languages: raw.languages,
            lines,
            words,
        }
    }

    /// True when word-level timing is available ("rich sync").
    pub fn has_word_timing(&self) -> bool {
        !self.words.is_empty()
    }

    /// `max(last line end, last word end)`; the line value alone without word data.
    pub fn total_duration_ms(&self) -> u64 {
        let line_end = self.lines.last().map(Line::end_ms).unwrap_or(0);
        let word_end = self.words.last().map(|w| w.end_ms).unwrap_or(0);
        line_end.max(word_end)
    }
}

/// Largest accepted time value: JavaScript's largest exact integer.
const MAX_TIME_MS: u64 = 9_007_199_254_740_991;

fn sanitize_ms(value: f64, kind: &str, index: usize, field: &str) -> u64 {
    if !value.is_finite() || value < 0.0 {
        log::warn!("{} {} has invalid {} ({}), clamping to 0", kind, index, field, value);
        return 0;
    }
    if value > MAX_TIME_MS as f64 {
        log::warn!(
            "{} {} has out-of-range {} ({}), clamping to {}",
            kind,
            index,
            field,
            value,
            MAX_TIME_MS
        );
        return MAX_TIME_MS;
    }
    value.round() as u64
}

/// Validate a song for timing correctness
///
/// Checks:
/// 1. Every word ends at or after its start
/// 2. Lines are strictly increasing in start time
/// 3. Words are non-decreasing in start time within each line
pub fn validate_song(song: &Song) -> Result<(), LyricsError> {
    for (index, word) in song.words.iter().enumerate() {
        if word.end_ms < word.start_ms {
            return Err(LyricsError::InvalidWord {
                index,
                message: format!(
                    "ends at {} ms before it starts at {} ms",
                    word.end_ms, word.start_ms
                ),
            });
        }
    }

    for (index, pair) in song.lines.windows(2).enumerate() {
        if pair[1].start_ms <= pair[0].start_ms {
            return Err(LyricsError::InvalidLine {
                index: index + 1,
                message: format!(
                    "starts at {} ms, not after the previous line at {} ms",
                    pair[1].start_ms, pair[0].start_ms
                ),
            });
        }
    }

    let mut line_start_word = 0;
    for (index, word) in song.words.iter().enumerate() {
        if index > line_start_word && word.start_ms < song.words[index - 1].start_ms {
            return Err(LyricsError::InvalidWord {
                index,
                message: format!(
                    "starts at {} ms, before the previous word in its line at {} ms",
                    word.start_ms,
                    song.words[index - 1].start_ms
                ),
            });
        }
        if word.is_end_of_line {
            line_start_word = index + 1;
        }
    }

    Ok(())
}
