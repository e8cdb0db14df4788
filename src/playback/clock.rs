use crate::foundation::core::{Fps, FrameIndex, Speed};
use crate::foundation::error::{SignplayError, SignplayResult};
use std::time::Duration;

/// One clock tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tick {
    /// Frame to show now.
    pub index: FrameIndex,
    /// Frame the following tick will show.
    pub next: FrameIndex,
    /// The index wrapped back to 0 after this tick (end of a loop pass).
    pub wrapped: bool,
}

#[derive(Clone, Copy, Debug)]
struct ClockRun {
    frame_count: u64,
    interval: Duration,
    index: FrameIndex,
    next_due: Duration,
}

/// Advances a frame index over monotonic time at `base_fps * speed`.
///
/// Time is passed in by the caller as an offset from any fixed origin, so the clock itself never
/// sleeps and can be driven by real or virtual time. The first tick of a run is due at its start
/// time; each following tick is due one interval after the previous one was taken.
#[derive(Debug, Default)]
pub struct FrameClock {
    run: Option<ClockRun>,
    generation: u64,
}

impl FrameClock {
    /// A stopped clock.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start at frame 0.
    pub fn start(
        &mut self,
        frame_count: u64,
        base_fps: Fps,
        speed: Speed,
        now: Duration,
    ) -> SignplayResult<()> {
        self.start_at(frame_count, base_fps, speed, FrameIndex(0), now)
    }

    /// Start at `index`.
    ///
    /// Any previous run is replaced, which cancels its pending tick. On error the previous run is
    /// left untouched.
    pub fn start_at(
        &mut self,
        frame_count: u64,
        base_fps: Fps,
        speed: Speed,
        index: FrameIndex,
        now: Duration,
    ) -> SignplayResult<()> {
        let run = plan_run(frame_count, base_fps, speed, index, now)?;
        self.install(run);
        Ok(())
    }

    /// `stop()` followed by `start_at(...)`.
    ///
    /// The arguments are validated before the active run is stopped, so a rejected restart keeps
    /// the clock ticking at its previous rate.
    pub fn restart(
        &mut self,
        frame_count: u64,
        base_fps: Fps,
        speed: Speed,
        index: FrameIndex,
        now: Duration,
    ) -> SignplayResult<()> {
        let run = plan_run(frame_count, base_fps, speed, index, now)?;
        self.stop();
        self.install(run);
        Ok(())
    }

    fn install(&mut self, run: ClockRun) {
        self.generation += 1;
        self.run = Some(run);
        tracing::debug!(
            generation = self.generation,
            frame_count = run.frame_count,
            start = run.index.0,
            interval_us = run.interval.as_micros() as u64,
            "frame clock started"
        );
    }

    /// Cancel the pending tick. No-op when already stopped.
    pub fn stop(&mut self) {
        if self.run.take().is_some() {
            tracing::debug!(generation = self.generation, "frame clock stopped");
        }
    }

    /// Return `true` while a run is active.
    pub fn is_running(&self) -> bool {
        self.run.is_some()
    }

    /// Number of runs started so far; every start or restart increments it.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Index the next tick will emit, if running.
    pub fn position(&self) -> Option<FrameIndex> {
        self.run.map(|r| r.index)
    }

    /// Interval between ticks of the active run.
    pub fn interval(&self) -> Option<Duration> {
        self.run.map(|r| r.interval)
    }

    /// When the next tick is due, if running.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.run.map(|r| r.next_due)
    }

    /// Take the tick due at `now`, if any. At most one tick is emitted per call.
    pub fn poll(&mut self, now: Duration) -> Option<Tick> {
        let run = self.run.as_mut()?;
        if now < run.next_due {
            return None;
        }
        let index = run.index;
        let (next, wrapped) = index.advance(run.frame_count);
        run.index = next;
        run.next_due = now + run.interval;
        Some(Tick {
            index,
            next,
            wrapped,
        })
    }
}

fn plan_run(
    frame_count: u64,
    base_fps: Fps,
    speed: Speed,
    index: FrameIndex,
    now: Duration,
) -> SignplayResult<ClockRun> {
    if frame_count == 0 {
        return Err(SignplayError::validation(
            "frame clock needs at least one frame",
        ));
    }
    if index.0 >= frame_count {
        return Err(SignplayError::validation(format!(
            "start index {} out of range for {} frames",
            index.0, frame_count
        )));
    }
    Ok(ClockRun {
        frame_count,
        interval: base_fps.scaled(speed)?.interval(),
        index,
        next_due: now,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/playback/clock.rs"]
mod tests;
