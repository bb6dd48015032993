//! The repeating wake-up that drives the clock.
//!
//! The host owns the actual frame loop (an animation frame callback, a timer, a
//! `sleep` loop) and asks the ticker on every frame whether the engine should do
//! work. The ticker is armed between `start` and `stop` and enforces the minimum gap
//! between wake-ups.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticker {
    frame_throttle_ms: u64,
    armed_at: Option<u64>,
    last_wake: Option<u64>,
}

impl Ticker {
    pub fn new(frame_throttle_ms: u64) -> Self {
        Self {
            frame_throttle_ms,
            armed_at: None,
            last_wake: None,
        }
    }

    /// Arm (or re-arm) the ticker. The first wake after this is always allowed.
    pub fn start(&mut self, now_ms: u64) {
        self.armed_at = Some(now_ms);
        self.last_wake = None;
    }

    /// Disarm. Stopping an already stopped ticker is harmless.
    pub fn stop(&mut self) {
        if self.armed_at.take().is_none() {
            log::trace!("ticker already stopped");
        }
        self.last_wake = None;
    }

    pub fn is_armed(&self) -> bool {
        self.armed_at.is_some()
    }

    /// Whether a frame at `now_ms` should run the engine.
    pub fn should_wake(&mut self, now_ms: u64) -> bool {
        if self.armed_at.is_none() {
            return false;
        }
        match self.last_wake {
            Some(last) if now_ms.saturating_sub(last) < self.frame_throttle_ms => {
                log::trace!(
                    "frame at {} ms throttled ({} ms since last wake)",
                    now_ms,
                    now_ms.saturating_sub(last)
                );
                false
            }
            _ => {
                self.last_wake = Some(now_ms);
                true
            }
        }
    }
}
