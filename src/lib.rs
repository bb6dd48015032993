//! # lyricsync
//!
//! Synchronizes a logical playback clock against time-stamped lyric lines and,
//! optionally, word-level timing. Answers three questions for a rendering host:
//! which line and word are active right now, how much of them has elapsed, and which
//! time a tap on the rendered text should seek to.
//!
//! ## Modules
//! - [`song`] - song-data input contract and strict validation
//! - [`text`] - text-to-timing alignment, hit-testing, per-line highlight state
//! - [`timing`] - line segmentation, active position resolution, progress
//! - [`playback`] - ticker, playback clock and the composed [`SyncEngine`]
//! - [`config`] - tunable thresholds ([`EngineConfig`])
//! - [`signal`] - subscribable change signals
//!
//! ## Example
//! ```rust
//! use lyricsync::playback::{ManualTimeSource, SyncEngine};
//! use lyricsync::EngineConfig;
//!
//! let json = r#"{
//!   "lrc": [ { "line": "There's a fire", "milliseconds": 6090, "duration": 4410 } ],
//!   "richSync": { "words": [
//!     { "word": "there's", "punctuatedWord": "There's", "start": 6759, "end": 7279 },
//!     { "word": "a", "start": 7299, "end": 7859 },
//!     { "word": "fire", "start": 7960, "end": 8779, "isEndOfLine": true }
//!   ] }
//! }"#;
//!
//! let song = lyricsync::load_song(json)?;
//! let mut engine = SyncEngine::new(song, EngineConfig::default(), ManualTimeSource::new(0));
//!
//! engine.seek(7019);
//! assert_eq!(engine.active_line(), 0);
//! assert_eq!(engine.active_word(), 0);
//! assert_eq!(engine.active_word_progresses()[0], 0.5);
//! # Ok::<(), lyricsync::LyricsError>(())
//! ```

pub mod config;
pub mod error;
pub mod playback;
pub mod signal;
pub mod song;
pub mod text;
pub mod timing;
pub mod types;

use std::fs;
use std::path::Path;

pub use config::{EngineConfig, ANDROID_COMPLETION_THRESHOLD};
pub use error::LyricsError;
pub use playback::SyncEngine;
pub use signal::{Signal, SubscriptionId};
pub use song::{validate_song, Song};
pub use text::hit_test;
pub use timing::{line_progress, word_progress};
pub use types::*;

/// Load song JSON and check its timing invariants.
/// This is the main entry point for tooling that must reject bad data.
pub fn load_song(json: &str) -> Result<Song, LyricsError> {
    let song = Song::from_json(json)?;
    validate_song(&song)?;
    Ok(song)
}

/// Load song JSON without validation (repairs are applied and logged instead)
pub fn load_song_unchecked(json: &str) -> Result<Song, LyricsError> {
    Song::from_json(json)
}

/// Read and leniently load a song file.
pub fn load_song_file(path: impl AsRef<Path>) -> Result<Song, LyricsError> {
    let json = fs::read_to_string(path)?;
    load_song_unchecked(&json)
}

/// Read a YAML engine configuration file.
pub fn load_config_file(path: impl AsRef<Path>) -> Result<EngineConfig, LyricsError> {
    let yaml = fs::read_to_string(path)?;
    EngineConfig::from_yaml(&yaml)
}
