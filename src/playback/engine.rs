//! The composed synchronization engine.
//!
//! [`SyncEngine`] owns one song's derived indexes, the playback clock and the change
//! signals. The presentation layer constructs it, subscribes to its signals and
//! forwards frames, taps and control input; nothing here is global.

use crate::config::EngineConfig;
use crate::playback::clock::{PlaybackClock, TimeSource};
use crate::signal::Signal;
use crate::song::Song;
use crate::text::TimedText;
use crate::timing::{
    find_word_index, ActiveIndexTracker, ActivePositionResolver, LineProgressAnimation,
    LineWordIndex, ProgressCalculator,
};
use crate::types::{Line, TimedWord, NO_ACTIVE_INDEX};

pub struct SyncEngine<T: TimeSource> {
    song: Song,
    config: EngineConfig,
    index: LineWordIndex,
    resolver: ActivePositionResolver,
    clock: PlaybackClock<T>,
    line_tracker: ActiveIndexTracker,
    word_tracker: ActiveIndexTracker,
    progress: ProgressCalculator,
    animation: LineProgressAnimation,
    elapsed_changed: Signal<u64>,
    active_line_changed: Signal<i64>,
    active_word_changed: Signal<i64>,
    playback_ended: Signal<()>,
    play_state_changed: Signal<bool>,
}

impl<T: TimeSource> SyncEngine<T> {
    /// Build the per-song indexes. The engine starts paused at 0.
    pub fn new(song: Song, config: EngineConfig, time: T) -> Self {
        let index = LineWordIndex::build(&song.lines, &song.words);
        let resolver =
            ActivePositionResolver::new(&index.timings(&song.lines), config.hold_through_gaps);
        let clock = PlaybackClock::new(song.total_duration_ms(), &config, time);
        log::debug!(
            "engine ready: {} lines, {} words, {} ms",
            song.lines.len(),
            song.words.len(),
            clock.total_ms()
        );

        let mut engine = Self {
            line_tracker: ActiveIndexTracker::new(config.resolve_bucket_ms),
            word_tracker: ActiveIndexTracker::new(config.resolve_bucket_ms),
            progress: ProgressCalculator::new(&config),
            animation: LineProgressAnimation::new(),
            song,
            config,
            index,
            resolver,
            clock,
            elapsed_changed: Signal::new(),
            active_line_changed: Signal::new(),
            active_word_changed: Signal::new(),
            playback_ended: Signal::new(),
            play_state_changed: Signal::new(),
        };
        engine.refresh_positions(true);
        engine
    }

    pub fn song(&self) -> &Song {
        &self.song
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn word_index(&self) -> &LineWordIndex {
        &self.index
    }

    pub fn resolver(&self) -> &ActivePositionResolver {
        &self.resolver
    }

    pub fn clock(&self) -> &PlaybackClock<T> {
        &self.clock
    }

    pub fn elapsed_changed(&mut self) -> &mut Signal<u64> {
        &mut self.elapsed_changed
    }

    pub fn active_line_changed(&mut self) -> &mut Signal<i64> {
        &mut self.active_line_changed
    }

    /// Only fires for songs with word timing.
    pub fn active_word_changed(&mut self) -> &mut Signal<i64> {
        &mut self.active_word_changed
    }

    pub fn playback_ended(&mut self) -> &mut Signal<()> {
        &mut self.playback_ended
    }

    pub fn play_state_changed(&mut self) -> &mut Signal<bool> {
        &mut self.play_state_changed
    }

    // ------------------------------------------------------------------
    // Control
    // ------------------------------------------------------------------

    pub fn play(&mut self) {
        if self.clock.play() {
            self.play_state_changed.emit(&true);
            self.restart_animation();
        }
    }

    pub fn pause(&mut self) {
        if self.clock.pause() {
            let elapsed = self.clock.elapsed_ms();
            self.elapsed_changed.emit(&elapsed);
            self.play_state_changed.emit(&false);
            if self.clock.is_ended() {
                self.on_end(false);
            } else {
                self.restart_animation();
            }
        }
    }

    pub fn toggle(&mut self) {
        if self.clock.is_playing() {
            self.pause();
        } else {
            self.play();
        }
    }

    /// Jump to `ms` (clamped to the song). Publishes the new time and positions
    /// immediately, bypassing the throttles.
    pub fn seek(&mut self, ms: i64) {
        let was_playing = self.clock.is_playing();
        let ended = self.clock.seek(ms);

        let elapsed = self.clock.elapsed_ms();
        self.elapsed_changed.emit(&elapsed);
        self.refresh_positions(true);
        if ended {
            self.on_end(was_playing);
        } else {
            self.restart_animation();
        }
    }

    /// Pause and return to the start.
    pub fn reset(&mut self) {
        self.pause();
        self.seek(0);
    }

    /// Seek to the word under a tap on `text`.
    pub fn seek_to_tap(&mut self, text: &TimedText, x: f64, y: f64) {
        let target = text.tap(x, y);
        log::debug!("tap at ({:.1}, {:.1}) → {} ms", x, y, target);
        self.seek(target as i64);
    }

    /// Drive one host frame. Cheap when throttled or paused.
    pub fn on_frame(&mut self) {
        let outcome = self.clock.tick();
        if let Some(elapsed) = outcome.elapsed {
            self.elapsed_changed.emit(&elapsed);
            self.refresh_positions(false);
        }
        if outcome.ended {
            self.on_end(true);
        }
    }

    fn on_end(&mut self, was_playing: bool) {
        if was_playing {
            self.play_state_changed.emit(&false);
        }
        self.restart_animation();
        self.playback_ended.emit(&());
    }

    fn refresh_positions(&mut self, force: bool) {
        let t = self.clock.elapsed_ms();

        let resolver = &self.resolver;
        let line = if force {
            self.line_tracker.force(t, |t| resolver.resolve_line(t))
        } else {
            self.line_tracker.update(t, |t| resolver.resolve_line(t))
        };
        if let Some(line) = line {
            log::debug!("active line → {} at {} ms", line, t);
            self.active_line_changed.emit(&line);
            self.restart_animation();
        }

        if !self.song.has_word_timing() {
            return;
        }
        let words = &self.song.words;
        let word = if force {
            self.word_tracker.force(t, |t| find_word_index(words, t))
        } else {
            self.word_tracker.update(t, |t| find_word_index(words, t))
        };
        if let Some(word) = word {
            self.active_word_changed.emit(&word);
        }
    }

    fn restart_animation(&mut self) {
        let t = self.clock.elapsed_ms();
        let now = self.clock.now_ms();
        let playing = self.clock.is_playing();
        let line = usize::try_from(self.line_tracker.current())
            .ok()
            .and_then(|i| self.song.lines.get(i));
        self.animation.restart(line, t, playing, now);
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn elapsed_ms(&self) -> u64 {
        self.clock.elapsed_ms()
    }

    pub fn total_ms(&self) -> u64 {
        self.clock.total_ms()
    }

    pub fn is_playing(&self) -> bool {
        self.clock.is_playing()
    }

    /// Last published active line (`-1` for none).
    pub fn active_line(&self) -> i64 {
        self.line_tracker.current()
    }

    /// Last published active flat word index (`-1` for none or without word timing).
    pub fn active_word(&self) -> i64 {
        if self.song.has_word_timing() {
            self.word_tracker.current()
        } else {
            NO_ACTIVE_INDEX
        }
    }

    fn line_at(&self, index: i64) -> Option<&Line> {
        usize::try_from(index).ok().and_then(|i| self.song.lines.get(i))
    }

    pub fn active_line_data(&self) -> Option<&Line> {
        self.line_at(self.active_line())
    }

    /// Words of line `line_index` (empty without word timing).
    pub fn line_words(&self, line_index: usize) -> &[TimedWord] {
        self.song
            .lines
            .get(line_index)
            .map(|line| self.index.words_for(&line.id))
            .unwrap_or(&[])
    }

    /// Progress of the active line at the current time, thresholded.
    pub fn active_line_progress(&self) -> f64 {
        self.active_line_data()
            .map(|line| self.progress.line_progress(line, self.elapsed_ms()))
            .unwrap_or(0.0)
    }

    /// Animated fill of the active line, sampled at the time source's now.
    pub fn animated_line_progress(&self) -> f64 {
        self.animation.sample(self.clock.now_ms())
    }

    /// Per-word progress for the active line's words.
    pub fn active_word_progresses(&self) -> Vec<f64> {
        match usize::try_from(self.active_line()) {
            Ok(line_index) => self
                .progress
                .word_progresses(self.line_words(line_index), self.elapsed_ms()),
            Err(_) => Vec::new(),
        }
    }

    /// Highlight state for line `line_index` in the song's own language.
    pub fn timed_text(&self, line_index: usize) -> Option<TimedText> {
        let line = self.song.lines.get(line_index)?;
        let direction = self.config.direction_for(self.song.language.as_deref());
        let words = self.line_words(line_index).to_vec();
        Some(TimedText::new(&line.text, words, direction).with_progress(self.progress))
    }

    /// Highlight state for a translation of line `line_index`, with estimated timing.
    pub fn translation_text(&self, line_index: usize, language: &str) -> Option<TimedText> {
        let line = self.song.lines.get(line_index)?;
        let text = line.translation(language)?;
        let direction = self.config.direction_for(Some(language));
        let words = self.line_words(line_index);
        Some(TimedText::translation(text, words, direction).with_progress(self.progress))
    }
}
