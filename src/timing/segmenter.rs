//! Line segmentation: flat word timeline → per-line word groups.

use std::collections::HashMap;

use crate::types::{Line, TimedWord};

/// Words belonging to one line, plus where they sit in the flat timeline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordGroup {
    /// Flat index of `words[0]` in the song's word sequence.
    pub first_word_index: usize,
    pub words: Vec<TimedWord>,
}

impl WordGroup {
    pub fn start_ms(&self) -> Option<u64> {
        self.words.first().map(|w| w.start_ms)
    }

    pub fn end_ms(&self) -> Option<u64> {
        self.words.last().map(|w| w.end_ms)
    }
}

/// How a line is timed: by its nominal interval or by its words.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Timing<'a> {
    LineOnly(&'a Line),
    WordAware(&'a Line, &'a [TimedWord]),
}

impl<'a> Timing<'a> {
    pub fn line(&self) -> &'a Line {
        match *self {
            Timing::LineOnly(line) | Timing::WordAware(line, _) => line,
        }
    }

    /// `[start, end)` used for resolution: the word span when words exist, the
    /// nominal line interval otherwise.
    pub fn effective_interval(&self) -> (u64, u64) {
        match *self {
            Timing::WordAware(_, words) if !words.is_empty() => {
                let start = words[0].start_ms;
                let end = words[words.len() - 1].end_ms.max(start);
                (start, end)
            }
            Timing::LineOnly(line) | Timing::WordAware(line, _) => (line.start_ms, line.end_ms()),
        }
    }
}

/// Immutable `line id → word group` index, built once per song.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineWordIndex {
    groups: HashMap<String, WordGroup>,
}

impl LineWordIndex {
    /// Group `words` by line.
    ///
    /// With end-of-line markers, words are consumed greedily into the current line
    /// until a marked word closes it. Lines left over when the words run out get no
    /// group; a trailing unterminated group goes to the next unclaimed line.
    ///
    /// Without any marker, each word goes to the line whose `[start, next start)`
    /// contains the word's start (words before the first line go to the first line).
    pub fn build(lines: &[Line], words: &[TimedWord]) -> Self {
        if words.is_empty() || lines.is_empty() {
            return Self::default();
        }
        let index = if words.iter().any(|w| w.is_end_of_line) {
            Self::by_markers(lines, words)
        } else {
            log::debug!("no end-of-line markers, bucketing {} words by time", words.len());
            Self::by_time(lines, words)
        };
        log::debug!(
            "segmented {} words into {} of {} lines",
            words.len(),
            index.len(),
            lines.len()
        );
        index
    }

    fn by_markers(lines: &[Line], words: &[TimedWord]) -> Self {
        let mut index = Self::default();
        let mut line_cursor = 0usize;
        let mut current = WordGroup { first_word_index: 0, words: Vec::new() };

        for (word_index, word) in words.iter().enumerate() {
            if current.words.is_empty() {
                current.first_word_index = word_index;
            }
            current.words.push(word.clone());

            if word.is_end_of_line {
                let group = std::mem::take(&mut current);
                index.claim(lines.get(line_cursor), group);
                line_cursor += 1;
            }
        }

        if !current.words.is_empty() {
            index.claim(lines.get(line_cursor), current);
        }
        index
    }

    fn by_time(lines: &[Line], words: &[TimedWord]) -> Self {
        let mut index = Self::default();
        for (word_index, word) in words.iter().enumerate() {
            let line_index = lines
                .partition_point(|l| l.start_ms <= word.start_ms)
                .saturating_sub(1);
            let line = &lines[line_index];
            index
                .groups
                .entry(line.id.clone())
                .or_insert_with(|| WordGroup { first_word_index: word_index, words: Vec::new() })
                .words
                .push(word.clone());
        }
        index
    }

    fn claim(&mut self, line: Option<&Line>, group: WordGroup) {
        match line {
            Some(line) => {
                if self.groups.insert(line.id.clone(), group).is_some() {
                    log::warn!("duplicate line id {:?}, keeping the later word group", line.id);
                }
            }
            None => log::warn!(
                "{} words from index {} have no line left to attach to, dropping",
                group.words.len(),
                group.first_word_index
            ),
        }
    }

    pub fn group(&self, line_id: &str) -> Option<&WordGroup> {
        self.groups.get(line_id)
    }

    pub fn words_for(&self, line_id: &str) -> &[TimedWord] {
        self.groups.get(line_id).map(|g| g.words.as_slice()).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Tag every line with its timing mode.
    pub fn timings<'a>(&'a self, lines: &'a [Line]) -> Vec<Timing<'a>> {
        lines
            .iter()
            .map(|line| match self.groups.get(&line.id) {
                Some(group) if !group.words.is_empty() => Timing::WordAware(line, &group.words),
                _ => Timing::LineOnly(line),
            })
            .collect()
    }
}
