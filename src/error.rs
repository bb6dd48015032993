//! # Error Types
//!
//! This module defines the error type for the lyricsync engine.
//!
//! Only *loading* can fail. Runtime queries (times before the song starts or after it
//! ends, taps outside measured text, lines without word timing) are answered with
//! documented fallback values instead of errors.
//!
//! ## Error Types
//! - `SongData` - The song JSON could not be decoded
//! - `Config` - The YAML engine configuration is malformed or out of range
//! - `InvalidLine` / `InvalidWord` - Strict validation found a broken timing invariant
//! - `Io` - File access failed (binary and file helpers only)
//!
//! ## Usage
//! ```rust
//! use lyricsync::{validate_song, LyricsError, Song};
//!
//! let json = r#"{ "lrc": [ { "line": "Hello", "milliseconds": 0, "duration": 1000 } ] }"#;
//! let song = Song::from_json(json)?;
//!
//! match validate_song(&song) {
//!     Ok(()) => println!("song is well formed"),
//!     Err(LyricsError::InvalidLine { index, message }) => {
//!         eprintln!("line {} is broken: {}", index, message);
//!     }
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! # Ok::<(), LyricsError>(())
//! ```

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LyricsError {
    /// Song data could not be decoded.
    ///
    /// # Example
    /// ```
    /// # use lyricsync::LyricsError;
    /// let err = LyricsError::SongData("missing field `lrc`".to_string());
    /// assert_eq!(err.to_string(), "Invalid song data: missing field `lrc`");
    /// ```
    #[error("Invalid song data: {0}")]
    SongData(String),

    /// Engine configuration could not be decoded or holds an unusable value.
    ///
    /// # Example
    /// ```
    /// # use lyricsync::LyricsError;
    /// let err = LyricsError::Config("resolve-bucket-ms must be at least 1".to_string());
    /// assert_eq!(err.to_string(), "Invalid configuration: resolve-bucket-ms must be at least 1");
    /// ```
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// A line breaks an ordering or duration invariant (zero-based index).
    #[error("Invalid line {index}: {message}")]
    InvalidLine { index: usize, message: String },

    /// A timed word breaks an ordering or duration invariant (zero-based index).
    #[error("Invalid word {index}: {message}")]
    InvalidWord { index: usize, message: String },

    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for LyricsError {
    fn from(e: std::io::Error) -> Self {
        LyricsError::Io(e.to_string())
    }
}
