//! Virtual clock synchronization
//!
//! Every unit derives its clock reading from local monotonic time minus a
//! synchronized offset. The master resets its offset so its own clock reads
//! zero, then broadcasts redundant samples of that clock; every other unit
//! adopts the sample implying the earliest instant it has seen. Because
//! transport delay only ever makes a sample arrive *late*, the smallest
//! observed value is the lowest-latency, least-stale estimate, and the rule
//! is monotone under reordering and duplication.

use std::sync::Mutex;
use std::time::Instant;

use tracing::debug;

/// Reserved offset and clock reading meaning "no valid time base"
pub const UNSYNCED: i64 = i64::MAX;

/// Per-unit virtual clock state
///
/// The offset is the only piece of state in the system touched by more than
/// one execution context; all mutation and reading goes through one mutex so
/// [`ClockSync::adopt_clock_sample`] and [`ClockSync::reset_clock`] are
/// atomic with respect to [`ClockSync::current_clock`].
pub struct ClockSync {
    is_master: bool,
    epoch: Instant,
    offset: Mutex<i64>,
}

impl ClockSync {
    /// Creates the clock state for one unit
    ///
    /// A master starts synced to its own time base; every other unit starts
    /// unsynced and waits for samples.
    pub fn new(is_master: bool) -> Self {
        let clock = ClockSync {
            is_master,
            epoch: Instant::now(),
            offset: Mutex::new(UNSYNCED),
        };
        clock.reset_clock();
        clock
    }

    /// Milliseconds of local monotonic time since this unit started
    fn now_millis(&self) -> i64 {
        self.epoch.elapsed().as_millis() as i64
    }

    /// Returns the current virtual clock reading in milliseconds
    ///
    /// Reads [`UNSYNCED`] until a time base has been established; callers
    /// must treat that value as "no time base", not as a timestamp.
    pub fn current_clock(&self) -> i64 {
        let offset = self.lock_offset();
        match *offset {
            UNSYNCED => UNSYNCED,
            value => self.now_millis() - value,
        }
    }

    /// Returns true once a time base has been established
    pub fn is_synced(&self) -> bool {
        *self.lock_offset() != UNSYNCED
    }

    /// Resets the time base
    ///
    /// The master becomes the origin of time: its clock reads zero from this
    /// instant. Any other unit drops its time base and waits for samples.
    pub fn reset_clock(&self) {
        let mut offset = self.lock_offset();
        *offset = if self.is_master {
            self.now_millis()
        } else {
            UNSYNCED
        };
    }

    /// Offers a clock sample received from the time giver
    ///
    /// The sample is adopted if this unit has no time base yet, or if it
    /// implies an earlier instant than the clock currently reads. Returns
    /// whether the sample was adopted.
    pub fn adopt_clock_sample(&self, s_clock: i64) -> bool {
        let mut offset = self.lock_offset();
        let now = self.now_millis();

        let adopt = match *offset {
            UNSYNCED => true,
            value => s_clock < now - value,
        };

        if adopt {
            let old = *offset;
            *offset = now - s_clock;
            debug!(old_offset = old, sample = s_clock, "clock sample adopted");
        }

        adopt
    }

    fn lock_offset(&self) -> std::sync::MutexGuard<'_, i64> {
        // A poisoned lock cannot leave the i64 inconsistent
        self.offset.lock().unwrap_or_else(|e| e.into_inner())
    }
}
