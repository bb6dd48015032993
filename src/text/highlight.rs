//! Per-line highlight and tap state.
//!
//! [`TimedText`] bundles one rendered string with its words, the aligned character
//! ranges and whatever layout the host has measured so far. Mappings are derived data:
//! any change to the text or the words replaces them wholesale.

use crate::text::aligner::{align_words, slice_chars};
use crate::text::hit_test::{hit_test, layouts_from_measured};
use crate::timing::progress::{
    line_fill_fraction, synthesize_translation_timings, ProgressCalculator,
};
use crate::types::{CharRange, LineLayout, MeasuredLine, TimedWord, WritingDirection};

#[derive(Debug, Clone, PartialEq)]
pub struct TimedText {
    text: String,
    text_len: usize,
    words: Vec<TimedWord>,
    mappings: Vec<CharRange>,
    layouts: Vec<LineLayout>,
    direction: WritingDirection,
    progress: ProgressCalculator,
}

impl TimedText {
    /// Surrounding whitespace of `text` is trimmed before alignment.
    pub fn new(text: &str, words: Vec<TimedWord>, direction: WritingDirection) -> Self {
        let mut timed = Self {
            text: String::new(),
            text_len: 0,
            words,
            mappings: Vec::new(),
            layouts: Vec::new(),
            direction,
            progress: ProgressCalculator::default(),
        };
        timed.set_text(text);
        timed
    }

    /// A translation line timed by borrowing from the source line's words.
    pub fn translation(
        text: &str,
        source_words: &[TimedWord],
        direction: WritingDirection,
    ) -> Self {
        Self::new(text, synthesize_translation_timings(text, source_words), direction)
    }

    pub fn with_progress(mut self, progress: ProgressCalculator) -> Self {
        self.progress = progress;
        self
    }

    pub fn set_text(&mut self, text: &str) {
        self.text = text.trim().to_string();
        self.text_len = self.text.chars().count();
        // Old geometry described the old string
        self.layouts.clear();
        self.realign();
    }

    pub fn set_words(&mut self, words: Vec<TimedWord>) {
        self.words = words;
        self.realign();
    }

    fn realign(&mut self) {
        self.mappings = align_words(&self.text, &self.words);
    }

    /// Replace the measured geometry. May be called any number of times.
    pub fn set_layouts(&mut self, layouts: Vec<LineLayout>) {
        self.layouts = layouts;
    }

    pub fn set_measured_lines(&mut self, lines: &[MeasuredLine]) {
        self.layouts = layouts_from_measured(lines);
    }

    pub fn set_direction(&mut self, direction: WritingDirection) {
        self.direction = direction;
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Length of the display text in chars.
    pub fn text_len(&self) -> usize {
        self.text_len
    }

    pub fn words(&self) -> &[TimedWord] {
        &self.words
    }

    pub fn mappings(&self) -> &[CharRange] {
        &self.mappings
    }

    pub fn layouts(&self) -> &[LineLayout] {
        &self.layouts
    }

    pub fn direction(&self) -> WritingDirection {
        self.direction
    }

    /// Text with timing that has been measured: taps and per-line fills are meaningful.
    pub fn is_interactive(&self) -> bool {
        !self.layouts.is_empty() && !self.mappings.is_empty() && self.text_len > 0
    }

    /// The rendered slice aligned to word `index`.
    pub fn word_text(&self, index: usize) -> Option<&str> {
        self.mappings
            .get(index)
            .map(|m| slice_chars(&self.text, m.start_char, m.end_char))
    }

    /// Seek target for a tap at `(x, y)` in the host's local coordinates.
    pub fn tap(&self, x: f64, y: f64) -> u64 {
        hit_test(x, y, &self.layouts, &self.mappings, &self.words, self.direction)
    }

    /// Character position lit at time `t`.
    pub fn highlight_position(&self, t: u64) -> f64 {
        self.progress.highlight_char_position(&self.mappings, &self.words, t, self.text_len)
    }

    /// Lit fraction of each measured line at time `t`, in layout order. Empty until
    /// layouts arrive.
    pub fn line_fills(&self, t: u64) -> Vec<f64> {
        if self.layouts.is_empty() {
            return Vec::new();
        }
        let char_pos = self.highlight_position(t);
        self.layouts.iter().map(|layout| line_fill_fraction(layout, char_pos)).collect()
    }
}
