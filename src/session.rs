//! Session state shared by the animation and the control page
//!
//! There is exactly one session. The scheduler owns it; the HTTP handler writes
//! to it and the animation reads it, never at the same time.

use crate::config;

/// Whether the sweep is running
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Off,
    On,
}

impl Mode {
    /// Label used on the status page
    pub fn label(self) -> &'static str {
        match self {
            Mode::Off => "OFF",
            Mode::On => "ON",
        }
    }
}

/// Travel direction of the lit pixel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Forward,
    Backward,
}

impl Direction {
    pub fn step(self) -> isize {
        match self {
            Direction::Forward => 1,
            Direction::Backward => -1,
        }
    }
}

/// Mutable lightbar session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionState {
    pub mode: Mode,
    /// Animation tick interval. Values of zero or below tick on every loop pass.
    pub speed_ms: i32,
    /// Sweeps before the animation stops by itself; zero or below is unlimited.
    pub cycle_limit: i32,
    pub current_index: usize,
    pub direction: Direction,
    /// Completed sweeps since the last start or limit change
    pub cycle_count: u32,
}

impl SessionState {
    pub const fn new() -> Self {
        Self {
            mode: Mode::Off,
            speed_ms: config::DEFAULT_SPEED_MS,
            cycle_limit: config::DEFAULT_CYCLE_LIMIT,
            current_index: 0,
            direction: Direction::Forward,
            cycle_count: 0,
        }
    }

    pub fn is_running(&self) -> bool {
        self.mode == Mode::On
    }

    /// The configured limit, if one is in force
    pub fn limit(&self) -> Option<u32> {
        u32::try_from(self.cycle_limit).ok().filter(|limit| *limit > 0)
    }

    /// Whether the completed sweeps have used up the limit
    pub fn limit_reached(&self) -> bool {
        self.limit().is_some_and(|limit| self.cycle_count >= limit)
    }

    /// Restart the sweep from the first pixel
    pub fn restart(&mut self) {
        self.mode = Mode::On;
        self.cycle_count = 0;
        self.current_index = 0;
        self.direction = Direction::Forward;
    }

    pub fn set_cycle_limit(&mut self, limit: i32) {
        self.cycle_limit = limit;
        self.cycle_count = 0;
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}
