//! Cooperative main loop
//!
//! Two independent timers share one thread: the animation timer (interval =
//! session speed, kept inside [`Lightbar`]) and the network poll timer (fixed
//! interval). The clock is read once per pass and, when both are due, the
//! animation is ticked first so its jitter never includes a network read.

use crate::BoardError;
use crate::animation::TickOutcome;
use crate::config;
use crate::http::{HttpServer, PollOutcome};
use crate::lightbar::Lightbar;
use crate::net::Listener;
use crate::timer::{Clock, IntervalTimer};
use smart_leds::{RGB8, SmartLedsWrite};

/// What happened during one pass of the loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PassReport {
    pub tick: Option<TickOutcome>,
    pub poll: Option<PollOutcome>,
}

pub struct Scheduler {
    network_timer: IntervalTimer,
}

impl Scheduler {
    pub fn new(now: u32) -> Self {
        Self {
            network_timer: IntervalTimer::new(now),
        }
    }

    /// One pass: tick the animation if due, then poll the network if due.
    pub fn run_once<W, const N: usize, L, C>(
        &mut self,
        clock: &C,
        lightbar: &mut Lightbar<W, N>,
        server: &mut HttpServer<L>,
    ) -> Result<PassReport, BoardError>
    where
        W: SmartLedsWrite<Color = RGB8>,
        L: Listener,
        C: Clock,
    {
        let now = clock.now_ms();
        let mut report = PassReport::default();

        report.tick = lightbar.animate(now)?;

        if self.network_timer.fire_if_due(now, config::NET_INTERVAL_MS) {
            report.poll = Some(server.poll_once(lightbar, clock)?);
        }

        Ok(report)
    }

    /// Run until the strip fails. There is no other way out.
    pub fn run<W, const N: usize, L, C>(
        &mut self,
        clock: &C,
        lightbar: &mut Lightbar<W, N>,
        server: &mut HttpServer<L>,
    ) -> BoardError
    where
        W: SmartLedsWrite<Color = RGB8>,
        L: Listener,
        C: Clock,
    {
        log::info!("[LOOP] Entering main loop");
        loop {
            if let Err(e) = self.run_once(clock, lightbar, server) {
                log::error!("[LOOP] Fatal: {}", e);
                return e;
            }
        }
    }
}
