//! # Timing Module
//!
//! Everything that turns a playback time into a position in the lyrics.
//!
//! ## Sub-modules
//! - `segmenter` - groups the flat word timeline into per-line word groups
//! - `resolver` - active line / active word lookup and throttled change detection
//! - `progress` - word, line and character-level highlight fractions
//!
//! ## Data Flow
//! ```text
//! Song { lines, words }
//!     → LineWordIndex::build        (once per song)
//!     → LineWordIndex::timings      (LineOnly | WordAware per line)
//!     → ActivePositionResolver      (per tick, through ActiveIndexTracker)
//!     → ProgressCalculator          (for the active line's words)
//! ```
//!
//! ## Example
//! ```rust
//! use lyricsync::timing::{ActivePositionResolver, LineWordIndex};
//! use lyricsync::{Line, TimedWord};
//!
//! let lines = vec![
//!     Line::new("a", "There's a fire", 6090, 4410),
//!     Line::new("b", "Reaching a fever pitch", 10500, 3970),
//! ];
//! let words = vec![
//!     TimedWord::new("there's", 6759, 7279),
//!     TimedWord::new("fire", 7960, 10980).end_of_line(),
//!     TimedWord::new("reaching", 11300, 12219).end_of_line(),
//! ];
//!
//! let index = LineWordIndex::build(&lines, &words);
//! let resolver = ActivePositionResolver::new(&index.timings(&lines), true);
//!
//! assert_eq!(resolver.resolve_line(6000), -1);
//! assert_eq!(resolver.resolve_line(10980), 0); // gap held by the earlier line
//! assert_eq!(resolver.resolve_line(11300), 1);
//! ```

pub mod progress;
pub mod resolver;
pub mod segmenter;

pub use progress::{
    highlight_char_position, line_fill_fraction, line_progress, synthesize_translation_timings,
    word_progress, word_progresses, LineProgressAnimation, ProgressCalculator,
};
pub use resolver::{find_word_index, ActiveIndexTracker, ActivePositionResolver};
pub use segmenter::{LineWordIndex, Timing, WordGroup};

#[cfg(test)]
mod tests;
