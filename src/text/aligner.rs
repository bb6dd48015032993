//! Text-to-timing alignment
//!
//! Maps an ordered sequence of timed words onto character ranges of a rendered string.
//! Rendered lyrics and timing tokens rarely agree exactly: casing differs, apostrophes
//! come curly or straight, tokens carry punctuation the text lacks (or the other way
//! round) and censored words show up as empty tokens. The aligner walks a cursor
//! through the text and places each word at its best match after the cursor.
//!
//! ## Matching order (per word)
//! 1. Normalized token (lowercase, unified apostrophes) verbatim
//! 2. Token with leading/trailing punctuation stripped
//! 3. Character scan comparing word characters only, skipping punctuation on both
//!    sides (handles `rock'n'roll` vs `rock 'n' roll`)
//! 4. The raw (unpunctuated) word through steps 1-3
//! 5. No match: placed at the cursor with the token's length
//!
//! Ranges are always non-decreasing and non-overlapping, even when nothing matches.

use crate::types::{CharRange, TimedWord};

/// Word characters: letters and digits of any script, underscore and the (unified)
/// apostrophe. Unicode-aware so Hebrew, Cyrillic or accented Latin words match and
/// widen like ASCII ones.
fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '\''
}

/// Scripts written without spaces between words (CJK ideographs, kana, Thai, Lao,
/// Myanmar, Khmer). A run of these is many words, so ranges never widen across it.
fn is_unspaced_script(c: char) -> bool {
    matches!(c,
        '\u{0E00}'..='\u{0EFF}'
        | '\u{1000}'..='\u{109F}'
        | '\u{1780}'..='\u{17FF}'
        | '\u{3040}'..='\u{30FF}'
        | '\u{3400}'..='\u{4DBF}'
        | '\u{4E00}'..='\u{9FFF}'
        | '\u{F900}'..='\u{FAFF}'
        | '\u{FF66}'..='\u{FF9F}'
        | '\u{20000}'..='\u{2FA1F}')
}

fn starts_with_at(haystack: &[char], needle: &[char], at: usize) -> bool {
    !needle.is_empty() && haystack.get(at..at + needle.len()) == Some(needle)
}

/// Extend a match ending at `end` over the rest of the rendered word, stopping where
/// `next` (the following word's stripped token) begins.
fn widen(text: &[char], end: usize, next: &[char]) -> usize {
    let mut end = end;
    while end < text.len()
        && is_word_char(text[end])
        && !is_unspaced_script(text[end])
        && !starts_with_at(text, next, end)
    {
        end += 1;
    }
    end
}

/// Lowercase and unify apostrophes, one output char per input char so offsets
/// into the normalized form are offsets into the original text.
pub(crate) fn normalize(s: &str) -> Vec<char> {
    s.chars()
        .map(|c| match c {
            '\u{2018}' | '\u{2019}' => '\'',
            c => {
                let mut lower = c.to_lowercase();
                match (lower.next(), lower.next()) {
                    (Some(l), None) => l,
                    _ => c,
                }
            }
        })
        .collect()
}

fn strip_punctuation(chars: &[char]) -> &[char] {
    let start = chars.iter().position(|&c| is_word_char(c)).unwrap_or(chars.len());
    let end = chars.iter().rposition(|&c| is_word_char(c)).map_or(start, |i| i + 1);
    &chars[start..end.max(start)]
}

fn index_of(haystack: &[char], needle: &[char], from: usize) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    (from..=haystack.len() - needle.len()).find(|&i| haystack[i..i + needle.len()] == *needle)
}

/// Match `core` (word chars, apostrophes removed) starting at `start`, skipping
/// punctuation and apostrophes in the text. Returns the end offset of the match.
fn match_word_chars(text: &[char], core: &[char], start: usize) -> Option<usize> {
    let mut t = start;
    for &c in core {
        while t < text.len() && (!is_word_char(text[t]) || text[t] == '\'') {
            t += 1;
        }
        if t >= text.len() || text[t] != c {
            return None;
        }
        t += 1;
    }
    Some(t)
}

/// Find `token` in `text` at or after `cursor`. Returns `(start, end)` of the match.
fn find_token(text: &[char], token: &str, cursor: usize) -> Option<(usize, usize)> {
    let token = normalize(token);
    if token.is_empty() {
        return None;
    }

    if let Some(pos) = index_of(text, &token, cursor) {
        return Some((pos, pos + token.len()));
    }

    let stripped = strip_punctuation(&token);
    if stripped.is_empty() {
        return None;
    }
    if stripped.len() != token.len() {
        if let Some(pos) = index_of(text, stripped, cursor) {
            return Some((pos, pos + stripped.len()));
        }
    }

    let core: Vec<char> = stripped.iter().copied().filter(|&c| c != '\'').collect();
    if core.is_empty() {
        return None;
    }
    (cursor..text.len())
        .filter(|&i| is_word_char(text[i]) && text[i] != '\'')
        .find_map(|i| match_word_chars(text, &core, i).map(|end| (i, end)))
}

/// Map each word onto a `[start_char, end_char)` range of `text`.
///
/// Returns exactly one [`CharRange`] per word (empty input gives an empty vec).
/// A matched range is widened to cover the rest of the rendered word it starts, so
/// `there` placed on `There's` covers the whole `There's`. Widening stops where the
/// next word's token begins and never crosses CJK or other unspaced scripts.
///
/// # Example
/// ```
/// use lyricsync::text::align_words;
/// use lyricsync::TimedWord;
///
/// let words = vec![
///     TimedWord::new("there's", 6759, 7279).with_punctuation("There's"),
///     TimedWord::new("a", 7299, 7859),
///     TimedWord::new("fire", 7960, 8779),
/// ];
/// let ranges = align_words("There’s a fire", &words);
///
/// assert_eq!((ranges[0].start_char, ranges[0].end_char), (0, 7));
/// assert_eq!((ranges[2].start_char, ranges[2].end_char), (10, 14));
/// ```
pub fn align_words(text: &str, words: &[TimedWord]) -> Vec<CharRange> {
    let text_norm = normalize(text);
    let len = text_norm.len();
    let mut ranges = Vec::with_capacity(words.len());
    let mut cursor = 0usize;

    for (word_index, word) in words.iter().enumerate() {
        let token = word.display_text();
        let base = word.text.as_str();

        if token.is_empty() && base.is_empty() {
            let at = cursor.min(len);
            ranges.push(CharRange { word_index, start_char: at, end_char: at });
            cursor += 1;
            continue;
        }

        let found = find_token(&text_norm, token, cursor).or_else(|| {
            if base.is_empty() || base == token {
                None
            } else {
                find_token(&text_norm, base, cursor)
            }
        });

        let (start_char, end_char) = match found {
            Some((start, end)) => {
                let next = words
                    .get(word_index + 1)
                    .map(|w| normalize(w.display_text()))
                    .unwrap_or_default();
                (start, widen(&text_norm, end, strip_punctuation(&next)))
            }
            None => {
                log::trace!("no match for word {} ({:?}) after char {}", word_index, token, cursor);
                let start = cursor.min(len);
                (start, (cursor + token.chars().count()).min(len))
            }
        };

        ranges.push(CharRange { word_index, start_char, end_char });
        cursor = (cursor + 1).max(end_char);
    }

    ranges
}

/// Slice `text` by a char range. Out-of-range offsets are clamped.
pub fn slice_chars(text: &str, start_char: usize, end_char: usize) -> &str {
    let byte_at = |n: usize| text.char_indices().nth(n).map_or(text.len(), |(b, _)| b);
    let start = byte_at(start_char);
    let end = byte_at(end_char.max(start_char));
    &text[start..end]
}
