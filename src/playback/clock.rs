//! Logical playback clock.
//!
//! Elapsed time is derived, never stored while playing: the clock keeps an origin
//! instant such that `elapsed = now - origin`, and the frozen elapsed value while
//! paused. Play, pause and seek only move those bases, so elapsed time is continuous
//! across pauses and exact immediately after a seek.
//!
//! ## State machine
//! ```text
//! Paused --play--> Playing --pause--> Paused
//! Playing --reach end--> Paused (ended, play is a no-op until seek/reset)
//! Playing --pause past end--> Paused (ended)
//! seek: self-loop on either state
//! ```

use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

use crate::config::EngineConfig;
use crate::playback::ticker::Ticker;

/// Monotonic millisecond clock.
pub trait TimeSource {
    fn now_ms(&self) -> u64;
}

/// Wall time measured from construction with [`Instant`].
#[derive(Debug, Clone, Copy)]
pub struct MonotonicTimeSource {
    origin: Instant,
}

impl MonotonicTimeSource {
    pub fn new() -> Self {
        Self { origin: Instant::now() }
    }
}

impl Default for MonotonicTimeSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for MonotonicTimeSource {
    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

/// Externally driven time. Clones share the same cell, so a test (or a host that
/// has its own frame timestamps) keeps one handle and gives another to the engine.
#[derive(Debug, Clone, Default)]
pub struct ManualTimeSource {
    now: Rc<Cell<u64>>,
}

impl ManualTimeSource {
    pub fn new(start_ms: u64) -> Self {
        Self {
            now: Rc::new(Cell::new(start_ms)),
        }
    }

    pub fn advance(&self, ms: u64) {
        self.now.set(self.now.get().saturating_add(ms));
    }

    /// Jump to `ms`. Moving backwards breaks monotonicity; callers own that choice.
    pub fn set(&self, ms: u64) {
        self.now.set(ms);
    }
}

impl TimeSource for ManualTimeSource {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }
}

/// Result of one scheduler frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickOutcome {
    /// Elapsed time to publish, when the publish interval allowed it.
    pub elapsed: Option<u64>,
    /// Playback reached the end during this frame.
    pub ended: bool,
}

#[derive(Debug)]
pub struct PlaybackClock<T: TimeSource> {
    time: T,
    total_ms: u64,
    /// `now - elapsed` at the last (re)start; signed because a seek ahead of the
    /// time source's current value puts it before zero.
    origin_ms: i64,
    paused_elapsed_ms: u64,
    playing: bool,
    ended: bool,
    ticker: Ticker,
    publish_interval_ms: u64,
    last_publish_ms: Option<u64>,
}

impl<T: TimeSource> PlaybackClock<T> {
    pub fn new(total_ms: u64, config: &EngineConfig, time: T) -> Self {
        Self {
            time,
            total_ms,
            origin_ms: 0,
            paused_elapsed_ms: 0,
            playing: false,
            ended: false,
            ticker: Ticker::new(config.frame_throttle_ms),
            publish_interval_ms: config.publish_interval_ms,
            last_publish_ms: None,
        }
    }

    fn now(&self) -> u64 {
        self.time.now_ms()
    }

    /// Unclamped elapsed time while playing.
    fn running_elapsed(&self) -> u64 {
        signed(self.now()).saturating_sub(self.origin_ms).max(0) as u64
    }

    fn restart_origin(&mut self, now: u64, elapsed: u64) {
        self.origin_ms = signed(now).saturating_sub(signed(elapsed));
    }

    pub fn elapsed_ms(&self) -> u64 {
        if self.playing {
            self.running_elapsed().min(self.total_ms)
        } else {
            self.paused_elapsed_ms
        }
    }

    pub fn total_ms(&self) -> u64 {
        self.total_ms
    }

    pub fn remaining_ms(&self) -> u64 {
        self.total_ms - self.elapsed_ms()
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// The current run reached the end and has not been reopened by a seek.
    pub fn is_ended(&self) -> bool {
        self.ended
    }

    pub fn is_ticker_armed(&self) -> bool {
        self.ticker.is_armed()
    }

    pub fn now_ms(&self) -> u64 {
        self.now()
    }

    /// Start playing from the current position. Returns true when the state changed.
    ///
    /// A no-op while playing, and at the end of the song (the run is over).
    pub fn play(&mut self) -> bool {
        if self.playing {
            return false;
        }
        if self.paused_elapsed_ms >= self.total_ms {
            log::debug!("play ignored at end of song ({} ms)", self.total_ms);
            return false;
        }
        let now = self.now();
        self.restart_origin(now, self.paused_elapsed_ms);
        self.playing = true;
        self.last_publish_ms = None;
        self.ticker.start(now);
        log::debug!("play from {} ms", self.paused_elapsed_ms);
        true
    }

    /// Freeze at the current position. Returns true when the state changed.
    ///
    /// Pausing after the end has passed but before the next tick ends the run, as the
    /// tick would have; check [`is_ended`](Self::is_ended) afterwards.
    pub fn pause(&mut self) -> bool {
        if !self.playing {
            return false;
        }
        if self.running_elapsed() >= self.total_ms {
            self.finish();
            return true;
        }
        self.paused_elapsed_ms = self.elapsed_ms();
        self.playing = false;
        self.ticker.stop();
        log::debug!("pause at {} ms", self.paused_elapsed_ms);
        true
    }

    /// Jump to `ms`, clamped to `[0, total]`, keeping the play state.
    ///
    /// Returns true when this seek ended the run: landing on the end pauses the clock
    /// and reports the end once. Landing anywhere before the end reopens an ended run.
    pub fn seek(&mut self, ms: i64) -> bool {
        let target = if ms <= 0 { 0 } else { (ms as u64).min(self.total_ms) };
        let now = self.now();
        log::debug!("seek to {} ms (requested {})", target, ms);

        if self.playing {
            self.restart_origin(now, target);
            self.last_publish_ms = None;
            // Re-arm rather than race an in-flight frame
            self.ticker.stop();
            self.ticker.start(now);
        } else {
            self.paused_elapsed_ms = target;
        }

        if target < self.total_ms || self.total_ms == 0 {
            self.ended = false;
            return false;
        }
        self.finish()
    }

    /// `pause` then `seek(0)`.
    pub fn reset(&mut self) {
        self.pause();
        self.seek(0);
    }

    /// Run one scheduler frame.
    pub fn tick(&mut self) -> TickOutcome {
        if !self.playing {
            return TickOutcome::default();
        }
        let now = self.now();
        if !self.ticker.should_wake(now) {
            return TickOutcome::default();
        }

        if self.running_elapsed() >= self.total_ms {
            let ended = self.finish();
            return TickOutcome {
                elapsed: Some(self.total_ms),
                ended,
            };
        }

        let due = match self.last_publish_ms {
            Some(last) => now.saturating_sub(last) >= self.publish_interval_ms,
            None => true,
        };
        if !due {
            log::trace!("publish skipped at {} ms", now);
            return TickOutcome::default();
        }
        self.last_publish_ms = Some(now);
        TickOutcome {
            elapsed: Some(self.elapsed_ms()),
            ended: false,
        }
    }

    /// Park at the end. Returns true the first time per run.
    fn finish(&mut self) -> bool {
        self.paused_elapsed_ms = self.total_ms;
        self.playing = false;
        self.ticker.stop();
        if self.ended {
            return false;
        }
        self.ended = true;
        log::debug!("playback ended at {} ms", self.total_ms);
        true
    }
}

impl<T: TimeSource> Drop for PlaybackClock<T> {
    fn drop(&mut self) {
        self.ticker.stop();
    }
}

fn signed(ms: u64) -> i64 {
    i64::try_from(ms).unwrap_or(i64::MAX)
}

/// Format milliseconds as `m:ss`.
///
/// # Example
/// ```
/// use lyricsync::playback::format_time;
///
/// assert_eq!(format_time(0), "0:00");
/// assert_eq!(format_time(65_999), "1:05");
/// assert_eq!(format_time(24_019), "0:24");
/// ```
pub fn format_time(ms: u64) -> String {
    let total_seconds = ms / 1000;
    format!("{}:{:02}", total_seconds / 60, total_seconds % 60)
}
