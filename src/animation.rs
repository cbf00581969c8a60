//! Bounce sweep animation
//!
//! One white pixel travels from the first LED to the last and back. A sweep is
//! counted when the pixel returns to the first LED, and that is also the only
//! place where the cycle limit can stop the animation.

use crate::BoardError;
use crate::pixel_buffer::{BLACK, PixelBuffer, WHITE};
use crate::session::{Direction, Mode, SessionState};
use smart_leds::{RGB8, SmartLedsWrite};

/// What a single tick did, after the frame was shown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Moved one step between the ends
    Advanced,
    /// Reached the last pixel and turned around
    TurnedAtEnd,
    /// Back at the first pixel; `cycles` sweeps completed so far
    SweepCompleted { cycles: u32 },
    /// The cycle limit was reached and the animation stopped
    Finished,
}

/// Show the current pixel, then advance it by one step.
///
/// Only called while the session is running and the tick interval has passed;
/// [`crate::lightbar::Lightbar::animate`] checks both.
pub fn tick<W, const N: usize>(
    state: &mut SessionState,
    strip: &mut PixelBuffer<W, N>,
) -> Result<TickOutcome, BoardError>
where
    W: SmartLedsWrite<Color = RGB8>,
{
    debug_assert!(state.current_index < N);

    strip.fill(BLACK);
    strip.set_pixel(state.current_index, WHITE)?;
    strip.flush()?;

    let last = (N - 1) as isize;
    let next = state.current_index as isize + state.direction.step();

    if next >= last {
        state.current_index = N - 1;
        state.direction = Direction::Backward;
        return Ok(TickOutcome::TurnedAtEnd);
    }

    if next <= 0 {
        state.current_index = 0;
        state.direction = Direction::Forward;
        state.cycle_count = state.cycle_count.saturating_add(1);

        if state.limit_reached() {
            log::info!(
                "[ANIM] Cycle limit of {} reached, stopping",
                state.cycle_limit
            );
            state.mode = Mode::Off;
            strip.show_ready()?;
            state.cycle_count = 0;
            return Ok(TickOutcome::Finished);
        }

        return Ok(TickOutcome::SweepCompleted {
            cycles: state.cycle_count,
        });
    }

    state.current_index = next as usize;
    Ok(TickOutcome::Advanced)
}

/// Stop the animation and show the ready indicator
pub fn stop<W, const N: usize>(
    state: &mut SessionState,
    strip: &mut PixelBuffer<W, N>,
) -> Result<(), BoardError>
where
    W: SmartLedsWrite<Color = RGB8>,
{
    state.mode = Mode::Off;
    strip.show_ready()
}
