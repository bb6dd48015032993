//! Active position resolution: playback time → active line / word index.

use crate::timing::segmenter::Timing;
use crate::types::{TimedWord, NO_ACTIVE_INDEX};

/// Ordered search over effective line intervals.
///
/// Built once from the tagged [`Timing`] list. Effective starts are forced
/// non-decreasing so binary search stays valid even when a line's first word starts
/// before the previous line's.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActivePositionResolver {
    starts: Vec<u64>,
    ends: Vec<u64>,
    hold_through_gaps: bool,
}

impl ActivePositionResolver {
    pub fn new(timings: &[Timing<'_>], hold_through_gaps: bool) -> Self {
        let mut starts = Vec::with_capacity(timings.len());
        let mut ends = Vec::with_capacity(timings.len());
        let mut floor = 0u64;
        for timing in timings {
            let (start, end) = timing.effective_interval();
            floor = floor.max(start);
            starts.push(floor);
            ends.push(end.max(floor));
        }
        Self { starts, ends, hold_through_gaps }
    }

    /// Active line at `t`, or `-1` before the first line.
    ///
    /// Between one line's effective end and the next line's start the earlier line
    /// stays active (the last line stays active after the song ends). With
    /// `hold_through_gaps` off such times resolve to `-1` instead.
    pub fn resolve_line(&self, t: u64) -> i64 {
        let upper = self.starts.partition_point(|&start| start <= t);
        if upper == 0 {
            return NO_ACTIVE_INDEX;
        }
        let index = upper - 1;
        if self.hold_through_gaps || t < self.ends[index] {
            index as i64
        } else {
            NO_ACTIVE_INDEX
        }
    }

    /// Effective `[start, end)` of line `index`.
    pub fn effective_interval(&self, index: usize) -> Option<(u64, u64)> {
        Some((*self.starts.get(index)?, *self.ends.get(index)?))
    }

    pub fn line_count(&self) -> usize {
        self.starts.len()
    }
}

/// Greatest flat word index whose start is at or before `t`; `-1` before the first
/// word. A word stays active through the gap until the next one starts.
pub fn find_word_index(words: &[TimedWord], t: u64) -> i64 {
    words.partition_point(|w| w.start_ms <= t) as i64 - 1
}

/// Throttled change detector for an active index.
///
/// Time is discretized into buckets; the index is only recomputed when the bucket
/// changes, and only reported when the recomputed value differs from the last one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveIndexTracker {
    bucket_ms: u64,
    last_bucket: Option<u64>,
    current: i64,
}

impl ActiveIndexTracker {
    pub fn new(bucket_ms: u64) -> Self {
        Self {
            bucket_ms: bucket_ms.max(1),
            last_bucket: None,
            current: NO_ACTIVE_INDEX,
        }
    }

    pub fn current(&self) -> i64 {
        self.current
    }

    /// Recompute when `t` falls into a new bucket. Returns the new index if it changed.
    pub fn update(&mut self, t: u64, resolve: impl FnOnce(u64) -> i64) -> Option<i64> {
        let bucket = t / self.bucket_ms;
        if self.last_bucket == Some(bucket) {
            log::trace!("bucket {} unchanged, skipping resolve", bucket);
            return None;
        }
        self.force(t, resolve)
    }

    /// Recompute regardless of the bucket (after a seek). Returns the new index if it
    /// changed.
    pub fn force(&mut self, t: u64, resolve: impl FnOnce(u64) -> i64) -> Option<i64> {
        self.last_bucket = Some(t / self.bucket_ms);
        let index = resolve(t);
        if index == self.current {
            return None;
        }
        self.current = index;
        Some(index)
    }

    /// Forget the last bucket and index.
    pub fn clear(&mut self) {
        self.last_bucket = None;
        self.current = NO_ACTIVE_INDEX;
    }
}
