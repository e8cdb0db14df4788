use crate::capture::CapturePipeline;
use crate::playback::controller::{PlaybackController, PlaybackSnapshot, TickOutcome};
use std::time::{Duration, Instant};

/// How the driver advances time between ticks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Pacing {
    /// Sleep until each deadline; ticks follow the wall clock.
    #[default]
    RealTime,
    /// Jump straight to each deadline; as fast as rendering allows.
    Virtual,
}

/// Event loop feeding a [`PlaybackController`] with monotonic time.
#[derive(Debug)]
pub struct Driver {
    pacing: Pacing,
    origin: Instant,
    virtual_now: Duration,
}

impl Driver {
    /// Driver whose time origin is now.
    pub fn new(pacing: Pacing) -> Self {
        Self {
            pacing,
            origin: Instant::now(),
            virtual_now: Duration::ZERO,
        }
    }

    /// Pacing mode.
    pub fn pacing(&self) -> Pacing {
        self.pacing
    }

    /// Time since the origin.
    pub fn now(&self) -> Duration {
        match self.pacing {
            Pacing::RealTime => self.origin.elapsed(),
            Pacing::Virtual => self.virtual_now,
        }
    }

    /// Block (or jump) until `deadline`. Deadlines in the past return immediately.
    pub fn wait_until(&mut self, deadline: Duration) {
        match self.pacing {
            Pacing::RealTime => {
                let now = self.origin.elapsed();
                if deadline > now {
                    std::thread::sleep(deadline - now);
                }
            }
            Pacing::Virtual => self.virtual_now = self.virtual_now.max(deadline),
        }
    }

    /// Tick `ctl` until `done` returns `true` or the controller stops scheduling ticks.
    ///
    /// Errors from individual ticks are logged and playback continues. Returns the number of
    /// processed ticks.
    #[tracing::instrument(skip_all, fields(pacing = ?self.pacing))]
    pub fn run<C: CapturePipeline>(
        &mut self,
        ctl: &mut PlaybackController<C>,
        mut done: impl FnMut(&PlaybackSnapshot, &TickOutcome) -> bool,
    ) -> u64 {
        let mut ticks = 0u64;
        while let Some(deadline) = ctl.next_deadline() {
            self.wait_until(deadline);
            match ctl.poll(self.now()) {
                Ok(Some(outcome)) => {
                    ticks += 1;
                    if done(&ctl.snapshot(), &outcome) {
                        break;
                    }
                }
                Ok(None) => {}
                Err(e) => tracing::warn!("tick failed: {e}"),
            }
        }
        tracing::debug!(ticks, "driver loop finished");
        ticks
    }
}
