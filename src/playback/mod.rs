//! # Playback Module
//!
//! Drives time forward and publishes what changed.
//!
//! ## Sub-modules
//! - `ticker` - armed/disarmed frame throttle, the single owner of the wake-up
//! - `clock` - logical stopwatch (play / pause / seek) over an injected time source
//! - `engine` - [`SyncEngine`], the clock composed with resolution and signals
//!
//! ## Scheduling
//! Single-threaded and cooperative. The host calls [`SyncEngine::on_frame`] from its
//! frame loop; the ticker drops frames closer than `frame-throttle-ms` apart and the
//! clock only publishes elapsed time every `publish-interval-ms`. Pause, the end of
//! the song and teardown disarm the ticker.
//!
//! ## Example
//! ```rust
//! use lyricsync::playback::{ManualTimeSource, SyncEngine};
//! use lyricsync::{EngineConfig, Line, Song};
//!
//! let lines = vec![Line::new("a", "Hello", 0, 1000), Line::new("b", "World", 1000, 1000)];
//! let song = Song::new(lines, vec![]);
//! let time = ManualTimeSource::new(0);
//! let mut engine = SyncEngine::new(song, EngineConfig::default(), time.clone());
//!
//! engine.play();
//! time.advance(1200);
//! engine.on_frame();
//! assert_eq!(engine.elapsed_ms(), 1200);
//! assert_eq!(engine.active_line(), 1);
//!
//! engine.seek(-500);
//! assert_eq!(engine.elapsed_ms(), 0);
//! ```

pub mod clock;
pub mod engine;
pub mod ticker;

pub use clock::{
    format_time, ManualTimeSource, MonotonicTimeSource, PlaybackClock, TickOutcome, TimeSource,
};
pub use engine::SyncEngine;
pub use ticker::Ticker;
