use crate::capture::{ArtifactSlot, CaptureArtifact, CapturePipeline, MediaFormat, SessionHandle};
use crate::foundation::core::{Canvas, Fps};
use crate::foundation::error::{SignplayError, SignplayResult};
use crate::foundation::math::flatten_premul_over_bg;
use crate::render::cpu::CpuSurface;
use std::sync::Arc;

#[derive(Debug)]
struct OpenSession {
    handle: SessionHandle,
    canvas: Canvas,
    fps: Fps,
    frames: u64,
    bytes: Vec<u8>,
}

/// Capture that keeps raw opaque RGBA8 frames in memory.
///
/// Finalization is immediate, which makes it the pipeline of choice for tests and debugging.
#[derive(Debug)]
pub struct InMemoryCapture {
    bg_rgba: [u8; 4],
    open: Option<OpenSession>,
    next_id: u64,
    sessions_begun: u64,
    sessions_ended: u64,
    slot: ArtifactSlot,
}

impl Default for InMemoryCapture {
    fn default() -> Self {
        Self::new([255, 255, 255, 255])
    }
}

impl InMemoryCapture {
    /// Create an in-memory capture flattening over `bg_rgba`.
    pub fn new(bg_rgba: [u8; 4]) -> Self {
        Self {
            bg_rgba,
            open: None,
            next_id: 0,
            sessions_begun: 0,
            sessions_ended: 0,
            slot: ArtifactSlot::default(),
        }
    }

    /// Sessions opened so far.
    pub fn sessions_begun(&self) -> u64 {
        self.sessions_begun
    }

    /// Sessions finalized so far.
    pub fn sessions_ended(&self) -> u64 {
        self.sessions_ended
    }

    /// Frames recorded into the open session.
    pub fn open_frames(&self) -> Option<u64> {
        self.open.as_ref().map(|s| s.frames)
    }
}

impl CapturePipeline for InMemoryCapture {
    fn begin_session(&mut self, surface: &CpuSurface, fps: Fps) -> SignplayResult<SessionHandle> {
        if let Some(open) = self.open.as_ref().map(|s| s.handle) {
            self.end_session(open)?;
        }
        self.next_id += 1;
        self.sessions_begun += 1;
        let handle = SessionHandle(self.next_id);
        self.open = Some(OpenSession {
            handle,
            canvas: surface.canvas(),
            fps,
            frames: 0,
            bytes: Vec::new(),
        });
        Ok(handle)
    }

    fn capture_frame(
        &mut self,
        handle: SessionHandle,
        surface: &CpuSurface,
    ) -> SignplayResult<()> {
        let open = self
            .open
            .as_mut()
            .filter(|s| s.handle == handle)
            .ok_or_else(|| SignplayError::capture(format!("session {} is not open", handle.0)))?;
        if surface.canvas() != open.canvas {
            return Err(SignplayError::capture(
                "surface size changed during the session",
            ));
        }

        let src = surface.pixels();
        let start = open.bytes.len();
        open.bytes.resize(start + src.len(), 0);
        if !flatten_premul_over_bg(&mut open.bytes[start..], src, self.bg_rgba) {
            return Err(SignplayError::capture("surface pixel buffer is malformed"));
        }
        open.frames += 1;
        Ok(())
    }

    fn end_session(&mut self, handle: SessionHandle) -> SignplayResult<()> {
        let Some(open) = self.open.take_if(|s| s.handle == handle) else {
            return Ok(());
        };
        self.sessions_ended += 1;
        if open.frames == 0 {
            tracing::debug!(session = handle.0, "discarding empty capture session");
            return Ok(());
        }
        self.slot.publish(CaptureArtifact {
            session: open.handle,
            format: MediaFormat::RawRgba,
            canvas: open.canvas,
            fps: open.fps,
            frame_count: open.frames,
            bytes: Arc::from(open.bytes),
        });
        Ok(())
    }

    fn latest_artifact(&self) -> Option<CaptureArtifact> {
        self.slot.latest()
    }

    fn open_session(&self) -> Option<SessionHandle> {
        self.open.as_ref().map(|s| s.handle)
    }
}
