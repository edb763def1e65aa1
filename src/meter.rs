//! A time-windowed event recorder with per-minute histograms.
//!
//! `Meter` records the wall-clock times at which events occur ("marks") and
//! answers queries over that history:
//! - How many events happened in the past minute / 15 minutes / hour, or any
//!   caller-supplied trailing period (`count_within_past()`)
//! - A per-minute histogram of event counts over the trailing N hours
//!   (`events_per_minute_past_hours()` and fixed 1/4/24-hour variants)
//!
//! Times are kept newest-first, so every query walks from the head and stops
//! at the first entry outside its window. This only holds if marks arrive in
//! chronological order; `mark()` does so naturally, while `mark_at()` makes
//! it the caller's contract.
//!
//! Optionally a background task purges day-old events on an hourly schedule,
//! keeping memory bounded for long-lived meters (see [`Config`]).
//!
//! ## Example
//! ```rust,ignore
//! let meter = Meter::new();
//! meter.mark(); // record an event
//! let recent = meter.count_past_minute();
//! let buckets = meter.events_per_minute_past_hour(); // 60 counts, newest first
//! ```
//!
//! [`Config`]: crate::Config

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::error::{Error, Result};
use crate::purge::Purger;
use crate::Config;

pub const MS_1_MIN: i64 = 60_000;
pub const MS_15_MIN: i64 = MS_1_MIN * 15;
pub const MS_1_HR: i64 = MS_1_MIN * 60;
pub const MS_4_HR: i64 = MS_1_HR * 4;
pub const MS_24_HR: i64 = MS_1_HR * 24;

#[inline]
pub(crate) fn now_millis() -> i64 {
    chrono::Local::now().timestamp_millis()
}

/// Event times newest-first plus the lifetime mark counter. One lock around
/// this struct covers every append, scan and tail eviction.
#[derive(Default)]
pub(crate) struct MeterState {
    // Invariant: non-increasing from front to back. Maintained purely by
    // chronological insertion; scans rely on it to stop early.
    events: VecDeque<i64>,
    total: usize,
}

impl MeterState {
    #[inline]
    pub(crate) fn record(&mut self, time: i64) {
        debug_assert!(
            self.events.front().map_or(true, |newest| time >= *newest),
            "marks must be recorded in chronological order"
        );
        self.total += 1;
        self.events.push_front(time);
    }

    /// Drops entries older than `cutoff` off the tail, stopping at the first
    /// fresh one. Returns the number evicted. The lifetime counter is
    /// untouched.
    pub(crate) fn evict_older_than(&mut self, cutoff: i64) -> usize {
        let mut evicted = 0;
        while let Some(&oldest) = self.events.back() {
            if oldest < cutoff {
                self.events.pop_back();
                evicted += 1;
            } else {
                break;
            }
        }
        evicted
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.events.len()
    }

    #[inline]
    pub(crate) fn total(&self) -> usize {
        self.total
    }
}

pub struct Meter {
    state: Arc<Mutex<MeterState>>,
    purger: Option<Purger>,
}

impl Meter {
    /// Creates a meter with no background purging; recorded events accumulate
    /// for the meter's lifetime.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Creates a meter from a [`Config`]. With `enable_auto_purge` set this
    /// spawns the purge task and must be called within a tokio runtime.
    ///
    /// [`Config`]: crate::Config
    pub fn with_config(cfg: Config) -> Self {
        let state = Arc::new(Mutex::new(MeterState::default()));
        let purger = if cfg.enable_auto_purge {
            Some(Purger::spawn(Arc::clone(&state)))
        } else {
            None
        };
        Meter { state, purger }
    }

    /// Records an event at the current wall-clock time.
    #[inline]
    pub fn mark(&self) {
        self.mark_at(now_millis());
    }

    /// Records an event at the given epoch-millisecond time.
    ///
    /// Times supplied across successive calls must be non-decreasing, and
    /// must not run ahead of later `mark()` calls. Out-of-order insertion
    /// breaks the ordering invariant and makes subsequent query results
    /// unreliable; the meter does not sort or repair the sequence.
    #[inline]
    pub fn mark_at(&self, time: i64) {
        self.state.lock().record(time);
    }

    /// Number of events recorded in the past minute.
    #[inline]
    pub fn count_past_minute(&self) -> usize {
        self.count_within_past_millis(MS_1_MIN)
    }

    /// Number of events recorded in the past 15 minutes.
    #[inline]
    pub fn count_past_15_minutes(&self) -> usize {
        self.count_within_past_millis(MS_15_MIN)
    }

    /// Number of events recorded in the past hour.
    #[inline]
    pub fn count_past_hour(&self) -> usize {
        self.count_within_past_millis(MS_1_HR)
    }

    /// Number of events recorded within the given trailing period.
    #[inline]
    pub fn count_within_past(&self, period: Duration) -> usize {
        self.count_within_past_millis(period.as_millis() as i64)
    }

    fn count_within_past_millis(&self, period: i64) -> usize {
        let cutoff = now_millis() - period;
        let state = self.state.lock();
        let mut count = 0;
        for &time in state.events.iter() {
            // Strictly newer than the cutoff counts; an event exactly at the
            // cutoff instant is already outside the window.
            if time > cutoff {
                count += 1;
            } else {
                break;
            }
        }
        count
    }

    /// Events per minute for the past hour: 60 counts, element 0 covering
    /// 0-1 minutes ago, element 1 covering 1-2 minutes ago, and so on.
    #[inline]
    pub fn events_per_minute_past_hour(&self) -> Vec<usize> {
        self.minute_buckets(60)
    }

    /// Events per minute for the past 4 hours (240 counts, newest first).
    #[inline]
    pub fn events_per_minute_past_4_hours(&self) -> Vec<usize> {
        self.minute_buckets(4 * 60)
    }

    /// Events per minute for the past 24 hours (1440 counts, newest first).
    #[inline]
    pub fn events_per_minute_past_24_hours(&self) -> Vec<usize> {
        self.minute_buckets(24 * 60)
    }

    /// Events per minute for the past `hours` hours (`hours * 60` counts,
    /// newest first). Fails with [`Error::InvalidHours`] when `hours` is
    /// zero.
    pub fn events_per_minute_past_hours(&self, hours: usize) -> Result<Vec<usize>> {
        if hours == 0 {
            return Err(Error::InvalidHours(hours));
        }
        Ok(self.minute_buckets(hours * 60))
    }

    fn minute_buckets(&self, minutes: usize) -> Vec<usize> {
        let mut buckets = vec![0usize; minutes];
        // One "now" sample up front; every event is bucketed against this
        // instant, not re-sampled mid-scan.
        let start = now_millis();
        let cutoff = start - minutes as i64 * MS_1_MIN;
        let state = self.state.lock();
        for &time in state.events.iter() {
            if time > cutoff {
                // Truncating division is the bucket rule: an event aged k
                // minutes and change lands in bucket k.
                let minute = ((start - time) / MS_1_MIN) as usize;
                buckets[minute] += 1;
            } else {
                break;
            }
        }
        buckets
    }

    /// Number of event times currently held, which may be less than the
    /// total if day-old events are being purged.
    #[inline]
    pub fn current_count(&self) -> usize {
        self.state.lock().len()
    }

    /// Total number of events marked since the meter was created.
    #[inline]
    pub fn total_count(&self) -> usize {
        self.state.lock().total()
    }

    /// Stops the background purge task, if one was enabled, and waits for it
    /// to finish. Idempotent. Dropping the meter also stops the task, but
    /// without waiting.
    pub async fn stop_auto_purge(&mut self) {
        if let Some(purger) = self.purger.take() {
            purger.stop().await;
        }
    }
}

impl Default for Meter {
    fn default() -> Self {
        Self::new()
    }
}
