//! Progress arithmetic: elapsed time → highlight fractions.
//!
//! The free functions are the raw, unthresholded math. [`ProgressCalculator`] wraps
//! them with the configured instant-word limit and completion threshold, which is what
//! renderers should use.

use crate::config::{EngineConfig, INSTANT_WORD_MAX_MS};
use crate::types::{CharRange, Line, LineLayout, TimedWord};

/// Completion fraction of a word at time `t`.
///
/// 0 before `start`, 1 at or after `end`, linear in between.
///
/// # Example
/// ```
/// use lyricsync::timing::word_progress;
/// use lyricsync::TimedWord;
///
/// let word = TimedWord::new("There's", 6759, 7279);
/// assert_eq!(word_progress(&word, 6759), 0.0);
/// assert_eq!(word_progress(&word, 7019), 0.5);
/// assert_eq!(word_progress(&word, 7279), 1.0);
/// ```
pub fn word_progress(word: &TimedWord, t: u64) -> f64 {
    interval_progress(word.start_ms, word.end_ms, t)
}

/// Completion fraction of a line at time `t`. A zero-length line is 0 before its
/// start and complete from its start on.
pub fn line_progress(line: &Line, t: u64) -> f64 {
    interval_progress(line.start_ms, line.end_ms(), t)
}

fn interval_progress(start: u64, end: u64, t: u64) -> f64 {
    if t < start {
        return 0.0;
    }
    if t >= end {
        return 1.0;
    }
    let span = end.saturating_sub(start).max(1) as f64;
    ((t - start) as f64 / span).clamp(0.0, 1.0)
}

/// Index one past the instant group starting at `index`: consecutive instant words
/// that share the start time of `words[index]`.
fn instant_group_end(words: &[TimedWord], index: usize, max_instant_ms: u64) -> usize {
    let start = words[index].start_ms;
    let mut end = index + 1;
    while end < words.len()
        && words[end].is_instant(max_instant_ms)
        && words[end].start_ms == start
    {
        end += 1;
    }
    end
}

fn progresses_with_limit(words: &[TimedWord], t: u64, max_instant_ms: u64) -> Vec<f64> {
    let mut out = Vec::with_capacity(words.len());
    let mut i = 0;
    while i < words.len() {
        let word = &words[i];
        if !word.is_instant(max_instant_ms) {
            out.push(word_progress(word, t));
            i += 1;
            continue;
        }

        let group_end = instant_group_end(words, i, max_instant_ms);
        let complete = match words.get(group_end) {
            Some(next) => t >= next.start_ms,
            None => t >= word.start_ms,
        };
        let value = if complete { 1.0 } else { 0.0 };
        out.extend(std::iter::repeat(value).take(group_end - i));
        i = group_end;
    }
    out
}

/// Per-word progress for a whole word sequence.
///
/// Instant words (duration at most [`INSTANT_WORD_MAX_MS`]) that share a start time
/// form one group that stays at 0 until the next distinct word begins and then jumps
/// to 1. A trailing group completes as soon as it starts.
pub fn word_progresses(words: &[TimedWord], t: u64) -> Vec<f64> {
    progresses_with_limit(words, t, INSTANT_WORD_MAX_MS)
}

fn char_position_with_limit(
    mappings: &[CharRange],
    words: &[TimedWord],
    t: u64,
    text_len: usize,
    max_instant_ms: u64,
) -> f64 {
    let word_at = |i: usize| mappings.get(i).and_then(|m| words.get(m.word_index));
    let mut char_pos = 0.0;
    let mut i = 0;

    while i < mappings.len() {
        let mapping = &mappings[i];
        let Some(word) = word_at(i) else {
            i += 1;
            continue;
        };

        if t < word.start_ms {
            return mapping.start_char as f64;
        }

        if word.is_instant(max_instant_ms) {
            let mut j = i + 1;
            let mut group_end = mapping.end_char;
            while let Some(next) = word_at(j) {
                if next.is_instant(max_instant_ms) && next.start_ms == word.start_ms {
                    group_end = mappings[j].end_char;
                    j += 1;
                } else {
                    break;
                }
            }
            if let Some(next) = word_at(j) {
                if t < next.start_ms {
                    return mapping.start_char as f64;
                }
                char_pos = group_end as f64;
            }
            i = j;
            continue;
        }

        if t >= word.end_ms {
            char_pos = mappings.get(i + 1).map_or(text_len, |next| next.start_char) as f64;
            i += 1;
            continue;
        }

        let progress = word_progress(word, t);
        let span = (mapping.end_char - mapping.start_char) as f64;
        return mapping.start_char as f64 + span * progress;
    }

    if words.last().is_some_and(|w| t >= w.end_ms) {
        return text_len as f64;
    }
    char_pos
}

/// Character position up to which a rendered string is lit at time `t`.
///
/// Within a word the position advances linearly through the word's range. Between
/// words it rests at the start of the next word. Instant groups light up all at once
/// when the following word begins.
pub fn highlight_char_position(
    mappings: &[CharRange],
    words: &[TimedWord],
    t: u64,
    text_len: usize,
) -> f64 {
    char_position_with_limit(mappings, words, t, text_len, INSTANT_WORD_MAX_MS)
}

/// Lit fraction of one wrapped line given the global lit character position.
pub fn line_fill_fraction(layout: &LineLayout, char_pos: f64) -> f64 {
    let start = layout.start_char as f64;
    let end = layout.end_char as f64;
    if char_pos <= start {
        return 0.0;
    }
    if char_pos >= end {
        return 1.0;
    }
    let span = layout.char_span();
    if span == 0 {
        return 0.0;
    }
    (char_pos - start) / span as f64
}

/// Approximate word timing for a translation that has no timing of its own.
///
/// Each whitespace-separated token borrows the interval of the source word at the
/// proportional position `floor(token_index * source_len / token_len)`. The result is
/// an estimate: every word is flagged `is_estimated`, and the last token ends the line.
///
/// # Example
/// ```
/// use lyricsync::timing::synthesize_translation_timings;
/// use lyricsync::TimedWord;
///
/// let source = vec![
///     TimedWord::new("a", 0, 100),
///     TimedWord::new("b", 100, 200),
///     TimedWord::new("c", 200, 300),
///     TimedWord::new("d", 300, 400),
/// ];
/// let words = synthesize_translation_timings(" uno  dos ", &source);
///
/// assert_eq!(words.len(), 2);
/// assert_eq!((words[1].start_ms, words[1].end_ms), (200, 300));
/// assert!(words[1].is_estimated && words[1].is_end_of_line);
/// ```
pub fn synthesize_translation_timings(text: &str, source_words: &[TimedWord]) -> Vec<TimedWord> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    if tokens.is_empty() || source_words.is_empty() {
        return Vec::new();
    }

    let last = tokens.len() - 1;
    tokens
        .iter()
        .enumerate()
        .map(|(index, token)| {
            let source_index =
                (index * source_words.len() / tokens.len()).min(source_words.len() - 1);
            let source = &source_words[source_index];
            TimedWord {
                text: token.to_string(),
                punctuated_text: token.to_string(),
                start_ms: source.start_ms,
                end_ms: source.end_ms,
                is_estimated: true,
                is_end_of_line: index == last,
            }
        })
        .collect()
}

/// Config-aware progress: instant-word limit and completion threshold applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressCalculator {
    completion_threshold: f64,
    instant_word_max_ms: u64,
}

impl Default for ProgressCalculator {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

impl ProgressCalculator {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            completion_threshold: config.completion_threshold,
            instant_word_max_ms: config.instant_word_max_ms,
        }
    }

    fn snap(&self, progress: f64) -> f64 {
        if progress >= self.completion_threshold {
            1.0
        } else {
            progress
        }
    }

    pub fn word_progress(&self, word: &TimedWord, t: u64) -> f64 {
        self.snap(word_progress(word, t))
    }

    pub fn line_progress(&self, line: &Line, t: u64) -> f64 {
        self.snap(line_progress(line, t))
    }

    pub fn word_progresses(&self, words: &[TimedWord], t: u64) -> Vec<f64> {
        progresses_with_limit(words, t, self.instant_word_max_ms)
            .into_iter()
            .map(|p| self.snap(p))
            .collect()
    }

    pub fn highlight_char_position(
        &self,
        mappings: &[CharRange],
        words: &[TimedWord],
        t: u64,
        text_len: usize,
    ) -> f64 {
        char_position_with_limit(mappings, words, t, text_len, self.instant_word_max_ms)
    }

    pub fn is_instant(&self, word: &TimedWord) -> bool {
        word.is_instant(self.instant_word_max_ms)
    }
}

/// Linear line-fill animation for hosts without word timing.
///
/// Restart it whenever the active line or the play state changes. It resumes from the
/// line's true current fraction, runs to 1 over the line's remaining time while playing
/// and holds still while paused.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineProgressAnimation {
    from: f64,
    started_at_ms: u64,
    remaining_ms: u64,
    running: bool,
}

impl LineProgressAnimation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restart for `line` at playback time `t`; `now_wall_ms` is the host's frame clock.
    /// No active line, or a time outside the line, parks the animation at 0.
    pub fn restart(&mut self, line: Option<&Line>, t: u64, playing: bool, now_wall_ms: u64) {
        self.running = false;
        self.from = 0.0;
        self.started_at_ms = now_wall_ms;
        self.remaining_ms = 0;

        let Some(line) = line else {
            return;
        };
        if t < line.start_ms || t > line.end_ms() {
            return;
        }

        self.from = line_progress(line, t);
        self.remaining_ms = line.end_ms() - t;
        self.running = playing && self.from < 1.0;
    }

    pub fn sample(&self, now_wall_ms: u64) -> f64 {
        if !self.running {
            return self.from;
        }
        if self.remaining_ms == 0 {
            return 1.0;
        }
        let elapsed = now_wall_ms.saturating_sub(self.started_at_ms) as f64;
        let fraction = (elapsed / self.remaining_ms as f64).min(1.0);
        self.from + (1.0 - self.from) * fraction
    }

    pub fn is_running(&self) -> bool {
        self.running
    }
}
