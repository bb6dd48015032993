//! Core data model shared by every component of the engine.
//!
//! All timestamps are whole milliseconds since the start of playback. Character
//! offsets count Unicode scalar values (`char`s) of the rendered string, never bytes.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Language code as found in song data (e.g. `"en"`, `"he"`).
pub type LanguageCode = String;

/// Sentinel index meaning "no active line/word".
pub const NO_ACTIVE_INDEX: i64 = -1;

/// One token with start/end playback timestamps.
///
/// # Fields
/// - `text`: raw token as sung (may be empty for censored words)
/// - `punctuated_text`: token as displayed, including punctuation and casing
/// - `start_ms` / `end_ms`: playback interval `[start, end)`
/// - `is_estimated`: timing was interpolated rather than measured; seek precision
///   beyond the word itself must not be assumed
/// - `is_end_of_line`: last word of a lyric line (drives line segmentation)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimedWord {
    pub text: String,
    #[serde(default)]
    pub punctuated_text: String,
    pub start_ms: u64,
    pub end_ms: u64,
    #[serde(default)]
    pub is_estimated: bool,
    #[serde(default)]
    pub is_end_of_line: bool,
}

impl TimedWord {
    /// Create a measured, mid-line word. `end_ms < start_ms` is clamped to an
    /// instant word at `start_ms` (debug builds assert instead).
    pub fn new(text: impl Into<String>, start_ms: u64, end_ms: u64) -> Self {
        debug_assert!(end_ms >= start_ms, "word ends ({}) before it starts ({})", end_ms, start_ms);
        let text = text.into();
        Self {
            punctuated_text: text.clone(),
            text,
            start_ms,
            end_ms: end_ms.max(start_ms),
            is_estimated: false,
            is_end_of_line: false,
        }
    }

    pub fn with_punctuation(mut self, punctuated: impl Into<String>) -> Self {
        self.punctuated_text = punctuated.into();
        self
    }

    pub fn estimated(mut self) -> Self {
        self.is_estimated = true;
        self
    }

    pub fn end_of_line(mut self) -> Self {
        self.is_end_of_line = true;
        self
    }

    pub fn duration_ms(&self) -> u64 {
        self.end_ms.saturating_sub(self.start_ms)
    }

    /// The token to look for in rendered text: the punctuated form when present.
    pub fn display_text(&self) -> &str {
        if self.punctuated_text.is_empty() {
            &self.text
        } else {
            &self.punctuated_text
        }
    }

    /// Zero or near-zero duration word (elided or unpronounced token).
    pub fn is_instant(&self, max_instant_ms: u64) -> bool {
        self.duration_ms() <= max_instant_ms
    }
}

/// One lyric row covering `[start_ms, start_ms + duration_ms)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Line {
    pub id: String,
    pub text: String,
    pub start_ms: u64,
    pub duration_ms: u64,
    #[serde(default)]
    pub translations: BTreeMap<LanguageCode, String>,
}

impl Line {
    pub fn new(
        id: impl Into<String>,
        text: impl Into<String>,
        start_ms: u64,
        duration_ms: u64,
    ) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            start_ms,
            duration_ms,
            translations: BTreeMap::new(),
        }
    }

    pub fn with_translation(
        mut self,
        language: impl Into<LanguageCode>,
        text: impl Into<String>,
    ) -> Self {
        self.translations.insert(language.into(), text.into());
        self
    }

    pub fn end_ms(&self) -> u64 {
        self.start_ms.saturating_add(self.duration_ms)
    }

    pub fn translation(&self, language: &str) -> Option<&str> {
        self.translations.get(language).map(String::as_str)
    }
}

/// Association between one timed word and a `[start_char, end_char)` range of a
/// specific rendered string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharRange {
    pub word_index: usize,
    pub start_char: usize,
    pub end_char: usize,
}

impl CharRange {
    pub fn contains(&self, offset: usize) -> bool {
        offset >= self.start_char && offset < self.end_char
    }

    pub fn overlaps(&self, start: usize, end: usize) -> bool {
        self.start_char < end && self.end_char > start
    }

    /// Center of the range in chars, used for nearest-word fallbacks.
    pub fn center(&self) -> f64 {
        (self.start_char + self.end_char) as f64 / 2.0
    }
}

/// Geometry of one visually wrapped text line, supplied by the rendering host
/// after a measurement pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineLayout {
    pub line_index: usize,
    pub start_char: usize,
    pub end_char: usize,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl LineLayout {
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn contains_y(&self, y: f64) -> bool {
        y >= self.y && y < self.bottom()
    }

    pub fn char_span(&self) -> usize {
        self.end_char.saturating_sub(self.start_char)
    }
}

/// One measured line as reported by the host's text-measurement facility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasuredLine {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Resolved writing direction of a rendered string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WritingDirection {
    #[default]
    Ltr,
    Rtl,
}

impl WritingDirection {
    pub fn is_rtl(self) -> bool {
        self == WritingDirection::Rtl
    }
}
