//! # Text Module
//!
//! Bridges abstract word timing and concrete rendered text.
//!
//! ## Sub-modules
//! - `aligner` - places timed words onto character ranges of a rendered string
//! - `hit_test` - turns a tap on measured text back into a seek time
//! - `highlight` - [`TimedText`], one rendered string with its words and layout
//!
//! ## Coordinates
//! Character offsets count `char`s of the trimmed display text. Layout geometry is
//! whatever the host's text measurement reports, in the same local coordinate space
//! as the taps it forwards.
//!
//! ## Example
//! ```rust
//! use lyricsync::text::TimedText;
//! use lyricsync::{MeasuredLine, TimedWord, WritingDirection};
//!
//! let words = vec![
//!     TimedWord::new("hello", 100, 400).with_punctuation("Hello,"),
//!     TimedWord::new("world", 500, 900),
//! ];
//! let mut text = TimedText::new("  Hello, world ", words, WritingDirection::Ltr);
//! assert_eq!(text.word_text(0), Some("Hello,"));
//! assert!(!text.is_interactive());
//!
//! text.set_measured_lines(&[
//!     MeasuredLine { text: "Hello, ".to_string(), x: 0.0, y: 0.0, width: 70.0, height: 30.0 },
//!     MeasuredLine { text: "world".to_string(), x: 0.0, y: 30.0, width: 50.0, height: 30.0 },
//! ]);
//! assert!(text.is_interactive());
//! assert_eq!(text.tap(10.0, 45.0), 500);
//! assert_eq!(text.line_fills(450), vec![1.0, 0.0]);
//! ```

pub mod aligner;
pub mod highlight;

pub use aligner::{align_words, slice_chars};
pub use highlight::TimedText;
pub use hit_test::{
    char_offset_at, hit_test, layouts_from_measured, line_at_position, mapping_at_offset,
};
