use crate::capture::{
    CaptureArtifact, CaptureOpts, CapturePipeline, SessionHandle, open_capture,
};
use crate::config::PlayerConfig;
use crate::foundation::core::{Fps, FrameIndex, Speed};
use crate::foundation::error::{SignplayError, SignplayResult};
use crate::model::landmark::{FrameData, SignSequenceSet};
use crate::playback::clock::FrameClock;
use crate::render::cpu::CpuSurface;
use crate::render::drawer::LandmarkDrawer;
use std::time::Duration;

/// Lifecycle state of a [`PlaybackController`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackState {
    /// Nothing loaded.
    Idle,
    /// A sequence fetch is in flight.
    Loading,
    /// Ticks are being rendered and captured.
    Playing,
    /// Playback halted at the current frame.
    Paused,
}

/// Observable playback state.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct PlaybackSnapshot {
    /// Current lifecycle state.
    pub state: PlaybackState,
    /// Frame the next tick shows.
    pub current_frame: FrameIndex,
    /// Frames in the loaded sequence set, 0 when idle.
    pub total_frames: u64,
    /// Active speed multiplier.
    pub speed: Speed,
    /// Completed passes over the frame list.
    pub loops_completed: u64,
}

/// What one processed tick did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TickOutcome {
    /// Frame shown by this tick.
    pub index: FrameIndex,
    /// The tick ended a loop pass.
    pub wrapped: bool,
    /// The frame reached the surface. `false` when the surface was detached.
    pub rendered: bool,
}

/// A downloadable artifact and the file name to offer it under.
#[derive(Clone, Debug)]
pub struct Download {
    /// `sign_language_<slug>.<ext>`.
    pub file_name: String,
    /// The finalized capture.
    pub artifact: CaptureArtifact,
}

/// Orchestrates the frame clock, the drawer and the capture pipeline for one player.
///
/// Invariants:
/// - at most one clock run is active, and only while [`PlaybackState::Playing`]
/// - at most one capture session is open, and only while [`PlaybackState::Playing`]
/// - every state exit stops the clock and ends the open capture session before anything new starts
pub struct PlaybackController<C: CapturePipeline = Box<dyn CapturePipeline>> {
    surface: CpuSurface,
    drawer: LandmarkDrawer,
    capture: C,
    clock: FrameClock,
    base_fps: Fps,
    speed: Speed,

    state: PlaybackState,
    frames: Vec<FrameData>,
    current: FrameIndex,
    loops_completed: u64,
    session: Option<SessionHandle>,
    session_frames: u64,
    frame_on_surface: bool,
    set_recorded: bool,
    capture_degraded: bool,
}

impl PlaybackController {
    /// Build a controller with the surface, style and capture backend described by `config`.
    pub fn from_config(config: &PlayerConfig) -> SignplayResult<Self> {
        config.base_fps.scaled(config.speed)?;
        let surface = CpuSurface::new(config.canvas)?;
        let capture = open_capture(
            config.capture,
            CaptureOpts {
                bg_rgba: config.style.background.0,
                ..CaptureOpts::default()
            },
        );
        let mut ctl = Self::new(
            surface,
            LandmarkDrawer::new(config.style),
            capture,
            config.base_fps,
        );
        ctl.speed = config.speed;
        Ok(ctl)
    }
}

impl<C: CapturePipeline> PlaybackController<C> {
    /// Idle controller playing at `base_fps` times the speed multiplier.
    pub fn new(surface: CpuSurface, drawer: LandmarkDrawer, capture: C, base_fps: Fps) -> Self {
        Self {
            surface,
            drawer,
            capture,
            clock: FrameClock::new(),
            base_fps,
            speed: Speed::NORMAL,
            state: PlaybackState::Idle,
            frames: Vec::new(),
            current: FrameIndex(0),
            loops_completed: 0,
            session: None,
            session_frames: 0,
            frame_on_surface: false,
            set_recorded: false,
            capture_degraded: false,
        }
    }

    /// Replace whatever is loaded with `set` and start playing it from frame 0.
    ///
    /// `None` (or an empty set) leaves the controller idle. A set arriving while playing or paused
    /// always resets the session.
    #[tracing::instrument(skip_all, fields(frames = set.as_ref().map(|s| s.total_frames())))]
    pub fn set_sequence(
        &mut self,
        set: Option<SignSequenceSet>,
        now: Duration,
    ) -> SignplayResult<()> {
        let closed = self.halt(PlaybackState::Idle);
        let Some(set) = set else {
            return closed;
        };
        set.validate()?;
        if set.is_empty() {
            tracing::debug!("empty sign sequence set; staying idle");
            return closed;
        }

        self.frames = set.into_frames();
        self.current = FrameIndex(0);
        self.loops_completed = 0;
        let started = self.start_playing(now);
        closed.and(started)
    }

    /// Stop playback and unload the sequence.
    pub fn stop(&mut self) -> SignplayResult<()> {
        self.halt(PlaybackState::Idle)
    }

    /// Unload the sequence and wait for a fetch result.
    pub fn begin_loading(&mut self) -> SignplayResult<()> {
        self.halt(PlaybackState::Loading)
    }

    /// Apply the outcome of a sequence fetch started with [`Self::begin_loading`].
    ///
    /// A failed fetch returns the controller to idle and is reported as
    /// [`SignplayError::SequenceFetch`].
    pub fn apply_fetch(
        &mut self,
        result: SignplayResult<SignSequenceSet>,
        now: Duration,
    ) -> SignplayResult<()> {
        if self.state != PlaybackState::Loading {
            tracing::debug!(state = ?self.state, "fetch result arrived outside of loading");
        }
        match result {
            Ok(set) => self.set_sequence(Some(set), now),
            Err(e) => {
                let closed = self.halt(PlaybackState::Idle);
                tracing::warn!("sequence fetch failed: {e}");
                let err = if matches!(e, SignplayError::SequenceFetch(_)) {
                    e
                } else {
                    SignplayError::sequence_fetch(e.to_string())
                };
                closed.and(Err(err))
            }
        }
    }

    /// Halt at the current frame and finalize the open capture session.
    ///
    /// No-op when already paused.
    #[tracing::instrument(skip_all)]
    pub fn pause(&mut self) -> SignplayResult<()> {
        match self.state {
            PlaybackState::Playing => {
                self.clock.stop();
                self.state = PlaybackState::Paused;
                tracing::debug!(frame = self.current.0, "paused");
                self.close_capture()
            }
            PlaybackState::Paused => Ok(()),
            state => Err(SignplayError::state(format!("cannot pause while {state:?}"))),
        }
    }

    /// Continue from the frame playback was paused at, in a new capture session.
    ///
    /// No-op when already playing.
    #[tracing::instrument(skip_all)]
    pub fn resume(&mut self, now: Duration) -> SignplayResult<()> {
        match self.state {
            PlaybackState::Paused => self.start_playing(now),
            PlaybackState::Playing => Ok(()),
            state => Err(SignplayError::state(format!("cannot resume while {state:?}"))),
        }
    }

    /// Change the speed multiplier.
    ///
    /// While playing, the clock restarts at the new rate from the current frame and the open capture
    /// session continues. Otherwise the speed applies to the next start. A multiplier that yields
    /// no usable rate is rejected and leaves speed and clock as they were.
    #[tracing::instrument(skip_all, fields(speed = speed.get()))]
    pub fn set_speed(&mut self, speed: Speed, now: Duration) -> SignplayResult<()> {
        self.base_fps.scaled(speed)?;
        if self.state == PlaybackState::Playing {
            self.clock.restart(
                self.frames.len() as u64,
                self.base_fps,
                speed,
                self.current,
                now,
            )?;
        }
        self.speed = speed;
        Ok(())
    }

    /// Process the tick due at `now`, if any.
    ///
    /// Renders the frame, mirrors it into the capture session and rotates the session when the
    /// tick ends a loop pass. A detached surface skips the render without stopping the clock.
    /// Capture failures end the faulty session and are returned after the tick completed.
    pub fn poll(&mut self, now: Duration) -> SignplayResult<Option<TickOutcome>> {
        if self.state != PlaybackState::Playing {
            return Ok(None);
        }
        let Some(tick) = self.clock.poll(now) else {
            return Ok(None);
        };
        self.current = tick.next;

        let frame = self.frames.get(tick.index.0 as usize).ok_or_else(|| {
            SignplayError::state(format!("tick index {} out of range", tick.index.0))
        })?;
        let rendered = match self.drawer.render(&mut self.surface, frame) {
            Ok(_) => {
                self.frame_on_surface = true;
                true
            }
            Err(SignplayError::SurfaceUnavailable(msg)) => {
                tracing::warn!(frame = tick.index.0, "skipping render: {msg}");
                false
            }
            Err(e) => return Err(e),
        };

        let mut captured = Ok(());
        if rendered && let Some(handle) = self.session {
            captured = self.capture.capture_frame(handle, &self.surface);
            if captured.is_ok() {
                self.session_frames += 1;
            } else {
                self.session = None;
                captured = captured.and(self.capture.end_session(handle));
            }
        }

        if tick.wrapped {
            self.loops_completed += 1;
            tracing::debug!(loops = self.loops_completed, "loop pass completed");
            let rotated = self.close_capture().and(self.open_capture());
            captured = captured.and(rotated);
        }

        captured.map(|()| {
            Some(TickOutcome {
                index: tick.index,
                wrapped: tick.wrapped,
                rendered,
            })
        })
    }

    /// When the next tick is due. `None` unless playing.
    pub fn next_deadline(&self) -> Option<Duration> {
        match self.state {
            PlaybackState::Playing => self.clock.next_deadline(),
            _ => None,
        }
    }

    /// Current observable state.
    pub fn snapshot(&self) -> PlaybackSnapshot {
        PlaybackSnapshot {
            state: self.state,
            current_frame: self.current,
            total_frames: self.frames.len() as u64,
            speed: self.speed,
            loops_completed: self.loops_completed,
        }
    }

    /// Lifecycle state.
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// The most recently finalized capture, if any.
    pub fn download_artifact(&self) -> Option<CaptureArtifact> {
        self.capture.latest_artifact()
    }

    /// The latest artifact with its download name derived from `input_text`.
    pub fn download(&self, input_text: &str) -> SignplayResult<Download> {
        let artifact = self
            .download_artifact()
            .ok_or(SignplayError::NothingToDownload)?;
        Ok(Download {
            file_name: artifact.file_name(input_text),
            artifact,
        })
    }

    /// Block until the capture pipeline has finished finalizing ended sessions.
    pub fn wait_idle(&mut self) {
        self.capture.wait_idle();
    }

    /// Render surface.
    pub fn surface(&self) -> &CpuSurface {
        &self.surface
    }

    /// Render surface, for attaching or detaching its drawing context.
    pub fn surface_mut(&mut self) -> &mut CpuSurface {
        &mut self.surface
    }

    /// Capture pipeline.
    pub fn capture(&self) -> &C {
        &self.capture
    }

    /// Frame clock.
    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    /// Base rate before the speed multiplier.
    pub fn base_fps(&self) -> Fps {
        self.base_fps
    }

    fn start_playing(&mut self, now: Duration) -> SignplayResult<()> {
        self.clock.start_at(
            self.frames.len() as u64,
            self.base_fps,
            self.speed,
            self.current,
            now,
        )?;
        self.state = PlaybackState::Playing;
        tracing::debug!(
            frame = self.current.0,
            total = self.frames.len(),
            speed = self.speed.get(),
            "playing"
        );
        self.open_capture()
    }

    /// Stop the clock, end the capture session and move to `next` with nothing loaded.
    fn halt(&mut self, next: PlaybackState) -> SignplayResult<()> {
        self.clock.stop();
        let closed = self.close_capture();
        if self.state != next {
            tracing::debug!(from = ?self.state, to = ?next, "playback halted");
        }
        self.state = next;
        self.frames.clear();
        self.current = FrameIndex(0);
        self.loops_completed = 0;
        self.frame_on_surface = false;
        self.set_recorded = false;
        closed
    }

    fn open_capture(&mut self) -> SignplayResult<()> {
        debug_assert!(self.session.is_none());
        let fps = self.base_fps.scaled(self.speed)?;
        match self.capture.begin_session(&self.surface, fps) {
            Ok(handle) => {
                self.session = Some(handle);
                self.session_frames = 0;
                Ok(())
            }
            Err(SignplayError::CaptureUnsupported(reason)) => {
                if !self.capture_degraded {
                    tracing::warn!("capture unavailable, playing without recording: {reason}");
                    self.capture_degraded = true;
                }
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    fn close_capture(&mut self) -> SignplayResult<()> {
        let Some(handle) = self.session.take() else {
            return Ok(());
        };
        let filled = if self.session_frames == 0 && !self.set_recorded {
            self.fill_empty_session(handle)
        } else {
            Ok(())
        };
        if self.session_frames > 0 {
            self.set_recorded = true;
        }
        filled.and(self.capture.end_session(handle))
    }

    /// Give the loaded set's first session the frame on screen when it ends before any tick, so a
    /// pause always leaves something to download. Later empty sessions are left empty and never
    /// replace a recorded pass. Draws the current frame first when nothing of this set was drawn.
    fn fill_empty_session(&mut self, handle: SessionHandle) -> SignplayResult<()> {
        if !self.frame_on_surface
            && let Some(frame) = self.frames.get(self.current.0 as usize)
        {
            match self.drawer.render(&mut self.surface, frame) {
                Ok(_) => self.frame_on_surface = true,
                Err(SignplayError::SurfaceUnavailable(msg)) => {
                    tracing::debug!("capturing the last pixels as they are: {msg}");
                }
                Err(e) => return Err(e),
            }
        }
        self.capture.capture_frame(handle, &self.surface)?;
        self.session_frames += 1;
        Ok(())
    }
}

impl<C: CapturePipeline> Drop for PlaybackController<C> {
    fn drop(&mut self) {
        self.clock.stop();
        if let Err(e) = self.close_capture() {
            tracing::warn!("failed to finalize capture on drop: {e}");
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/playback/controller.rs"]
mod tests;
