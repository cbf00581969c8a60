//! The lightbar: session, strip and animation timer in one place
//!
//! Both the animation tick and the control page act on this value, always
//! through `&mut`, so the single loop is the only owner.

use crate::BoardError;
use crate::animation::{self, TickOutcome};
use crate::pixel_buffer::PixelBuffer;
use crate::session::SessionState;
use crate::timer::IntervalTimer;
use smart_leds::{RGB8, SmartLedsWrite};

/// A change requested through the control page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Restart the sweep from the first pixel
    Start,
    /// Stop and show the ready indicator
    Stop,
    SetSpeed(i32),
    SetCycleLimit(i32),
}

pub struct Lightbar<W, const N: usize> {
    state: SessionState,
    strip: PixelBuffer<W, N>,
    animation_timer: IntervalTimer,
}

impl<W, const N: usize> Lightbar<W, N>
where
    W: SmartLedsWrite<Color = RGB8>,
{
    pub fn new(writer: W, now: u32) -> Self {
        Self {
            state: SessionState::new(),
            strip: PixelBuffer::new(writer),
            animation_timer: IntervalTimer::new(now),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn strip(&self) -> &PixelBuffer<W, N> {
        &self.strip
    }

    pub fn strip_mut(&mut self) -> &mut PixelBuffer<W, N> {
        &mut self.strip
    }

    pub fn animation_timer(&self) -> &IntervalTimer {
        &self.animation_timer
    }

    /// Show the ready indicator without touching the session
    pub fn show_ready(&mut self) -> Result<(), BoardError> {
        self.strip.show_ready()
    }

    /// Tick the animation if it is running and its interval has passed
    pub fn animate(&mut self, now: u32) -> Result<Option<TickOutcome>, BoardError> {
        if !self.state.is_running() {
            return Ok(None);
        }
        if !self.animation_timer.fire_if_due(now, self.state.speed_ms) {
            return Ok(None);
        }
        animation::tick(&mut self.state, &mut self.strip).map(Some)
    }

    /// Apply one control-page command
    pub fn apply(&mut self, command: Command, now: u32) -> Result<(), BoardError> {
        match command {
            Command::Start => {
                log::info!("[ANIM] Starting sweep");
                self.state.restart();
                self.animation_timer.reset(now);
            }
            Command::Stop => {
                log::info!("[ANIM] Stopping sweep");
                animation::stop(&mut self.state, &mut self.strip)?;
            }
            Command::SetSpeed(speed_ms) => {
                self.state.speed_ms = speed_ms;
            }
            Command::SetCycleLimit(limit) => {
                self.state.set_cycle_limit(limit);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixel_buffer::{BLACK, GREEN, WHITE};
    use crate::session::{Direction, Mode};
    use crate::testing::RecordingStrip;

    fn lightbar() -> Lightbar<RecordingStrip, 6> {
        Lightbar::new(RecordingStrip::default(), 0)
    }

    #[test]
    fn idle_lightbar_never_ticks() {
        let mut bar = lightbar();
        assert_eq!(bar.animate(1_000), Ok(None));
        assert!(bar.strip().writer().frames.is_empty());
    }

    #[test]
    fn ticks_only_once_the_speed_interval_passed() {
        let mut bar = lightbar();
        bar.apply(Command::SetSpeed(30), 0).unwrap();
        bar.apply(Command::Start, 100).unwrap();

        assert_eq!(bar.animate(129), Ok(None));
        assert_eq!(bar.animate(130), Ok(Some(TickOutcome::Advanced)));
        assert_eq!(bar.animate(140), Ok(None));
        assert_eq!(bar.animation_timer().last_fired(), 130);
        assert_eq!(bar.strip().pixels()[0], WHITE);
    }

    #[test]
    fn start_rewinds_and_resets_counters() {
        let mut bar = lightbar();
        bar.apply(Command::SetSpeed(0), 0).unwrap();
        bar.apply(Command::Start, 0).unwrap();
        for now in 0..13 {
            bar.animate(now).unwrap();
        }
        assert!(bar.state().cycle_count > 0);

        bar.apply(Command::Start, 50).unwrap();
        let state = bar.state();
        assert_eq!(state.mode, Mode::On);
        assert_eq!(state.current_index, 0);
        assert_eq!(state.direction, Direction::Forward);
        assert_eq!(state.cycle_count, 0);
        assert_eq!(bar.animation_timer().last_fired(), 50);
    }

    #[test]
    fn stop_is_idempotent() {
        let mut bar = lightbar();
        bar.apply(Command::Start, 0).unwrap();
        bar.animate(10).unwrap();

        bar.apply(Command::Stop, 20).unwrap();
        let after_first = *bar.strip().pixels();
        bar.apply(Command::Stop, 30).unwrap();

        assert_eq!(bar.state().mode, Mode::Off);
        assert_eq!(bar.strip().pixels(), &after_first);
        assert_eq!(after_first, [GREEN, BLACK, BLACK, BLACK, BLACK, GREEN]);
        assert_eq!(bar.animate(1_000), Ok(None));
    }

    #[test]
    fn limit_change_resets_the_count() {
        let mut bar = lightbar();
        bar.apply(Command::SetSpeed(0), 0).unwrap();
        bar.apply(Command::Start, 0).unwrap();
        for now in 0..11 {
            bar.animate(now).unwrap();
        }
        assert_eq!(bar.state().cycle_count, 1);

        bar.apply(Command::SetCycleLimit(5), 11).unwrap();
        assert_eq!(bar.state().cycle_limit, 5);
        assert_eq!(bar.state().cycle_count, 0);
        assert_eq!(bar.state().mode, Mode::On);
    }
}
