//! Millisecond clock and interval timers
//!
//! The board clock is read as a wrapping `u32` millisecond counter, so every
//! comparison goes through [`ticks_diff`] instead of plain subtraction.

/// Monotonic millisecond clock
pub trait Clock {
    /// Current time in milliseconds; wraps around at `u32::MAX`
    fn now_ms(&self) -> u32;
}

impl<F> Clock for F
where
    F: Fn() -> u32,
{
    fn now_ms(&self) -> u32 {
        self()
    }
}

/// Signed distance from `earlier` to `later`, correct across counter wraparound
/// as long as the two instants are less than ~24 days apart.
pub fn ticks_diff(later: u32, earlier: u32) -> i32 {
    later.wrapping_sub(earlier) as i32
}

/// Remembers when it last fired and decides whether an interval has passed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntervalTimer {
    last_fired: u32,
}

impl IntervalTimer {
    /// Create a timer whose interval is measured from `now`
    pub const fn new(now: u32) -> Self {
        Self { last_fired: now }
    }

    /// Milliseconds since the timer last fired
    pub fn elapsed(&self, now: u32) -> i32 {
        ticks_diff(now, self.last_fired)
    }

    /// Whether at least `interval_ms` has passed. A non-positive interval is
    /// always due.
    pub fn is_due(&self, now: u32, interval_ms: i32) -> bool {
        self.elapsed(now) >= interval_ms
    }

    /// Fire if due, recording `now` as the new reference point
    pub fn fire_if_due(&mut self, now: u32, interval_ms: i32) -> bool {
        if self.is_due(now, interval_ms) {
            self.last_fired = now;
            true
        } else {
            false
        }
    }

    /// Restart the interval from `now` without firing
    pub fn reset(&mut self, now: u32) {
        self.last_fired = now;
    }

    pub fn last_fired(&self) -> u32 {
        self.last_fired
    }
}
