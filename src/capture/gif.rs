use crate::capture::{
    ArtifactSlot, CaptureArtifact, CaptureOpts, CapturePipeline, Finalizers, MediaFormat,
    SessionHandle,
};
use crate::foundation::core::{Canvas, Fps};
use crate::foundation::error::{SignplayError, SignplayResult};
use crate::foundation::math::flatten_premul_over_bg;
use crate::render::cpu::CpuSurface;
use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, Frame, RgbaImage};
use std::sync::Arc;

struct GifSession {
    handle: SessionHandle,
    canvas: Canvas,
    fps: Fps,
    frames: Vec<RgbaImage>,
}

/// Capture that encodes each session as a looping animated GIF.
///
/// Frames are buffered as opaque RGBA images; quantization runs on a finalizer thread.
pub struct GifCapture {
    opts: CaptureOpts,
    open: Option<GifSession>,
    next_id: u64,
    slot: ArtifactSlot,
    finalizers: Finalizers,
}

impl GifCapture {
    /// Create a GIF capture.
    pub fn new(opts: CaptureOpts) -> Self {
        Self {
            opts,
            open: None,
            next_id: 0,
            slot: ArtifactSlot::default(),
            finalizers: Finalizers::default(),
        }
    }
}

impl CapturePipeline for GifCapture {
    fn begin_session(&mut self, surface: &CpuSurface, fps: Fps) -> SignplayResult<SessionHandle> {
        if let Some(open) = self.open.as_ref().map(|s| s.handle) {
            self.end_session(open)?;
        }
        self.next_id += 1;
        let handle = SessionHandle(self.next_id);
        self.open = Some(GifSession {
            handle,
            canvas: surface.canvas(),
            fps,
            frames: Vec::new(),
        });
        tracing::debug!(session = handle.0, "gif session opened");
        Ok(handle)
    }

    fn capture_frame(
        &mut self,
        handle: SessionHandle,
        surface: &CpuSurface,
    ) -> SignplayResult<()> {
        let session = self
            .open
            .as_mut()
            .filter(|s| s.handle == handle)
            .ok_or_else(|| SignplayError::capture(format!("session {} is not open", handle.0)))?;
        let canvas = session.canvas;
        if surface.canvas() != canvas {
            return Err(SignplayError::capture(
                "surface size changed during the session",
            ));
        }

        let mut buf = vec![0u8; surface.pixels().len()];
        if !flatten_premul_over_bg(&mut buf, surface.pixels(), self.opts.bg_rgba) {
            return Err(SignplayError::capture("surface pixel buffer is malformed"));
        }
        let img = RgbaImage::from_raw(canvas.width, canvas.height, buf)
            .ok_or_else(|| SignplayError::capture("frame buffer does not match canvas size"))?;
        session.frames.push(img);
        Ok(())
    }

    fn end_session(&mut self, handle: SessionHandle) -> SignplayResult<()> {
        let Some(session) = self.open.take_if(|s| s.handle == handle) else {
            return Ok(());
        };
        if session.frames.is_empty() {
            tracing::debug!(session = handle.0, "discarding empty capture session");
            return Ok(());
        }

        let slot = self.slot.clone();
        self.finalizers.spawn(format!("signplay-gif-{}", handle.0), move || {
            let frame_count = session.frames.len() as u64;
            match encode_gif(session.frames, session.fps) {
                Ok(bytes) => {
                    slot.publish(CaptureArtifact {
                        session: session.handle,
                        format: MediaFormat::Gif,
                        canvas: session.canvas,
                        fps: session.fps,
                        frame_count,
                        bytes: Arc::from(bytes),
                    });
                }
                Err(e) => tracing::warn!(session = handle.0, "gif capture failed: {e}"),
            }
        });
        Ok(())
    }

    fn latest_artifact(&self) -> Option<CaptureArtifact> {
        self.slot.latest()
    }

    fn open_session(&self) -> Option<SessionHandle> {
        self.open.as_ref().map(|s| s.handle)
    }

    fn wait_idle(&mut self) {
        self.finalizers.join_all();
    }
}

impl Drop for GifCapture {
    fn drop(&mut self) {
        if let Some(open) = self.open.as_ref().map(|s| s.handle) {
            let _ = self.end_session(open);
        }
        self.finalizers.join_all();
    }
}

fn encode_gif(frames: Vec<RgbaImage>, fps: Fps) -> SignplayResult<Vec<u8>> {
    // GIF delays are stored in centiseconds; `Delay` keeps the exact ratio until then.
    let delay = Delay::from_numer_denom_ms(fps.den.saturating_mul(1000), fps.num);
    let mut out = Vec::new();
    {
        let mut encoder = GifEncoder::new_with_speed(&mut out, 10);
        encoder
            .set_repeat(Repeat::Infinite)
            .map_err(|e| SignplayError::capture(format!("gif encode failed: {e}")))?;
        encoder
            .encode_frames(
                frames
                    .into_iter()
                    .map(|img| Frame::from_parts(img, 0, 0, delay)),
            )
            .map_err(|e| SignplayError::capture(format!("gif encode failed: {e}")))?;
    }
    Ok(out)
}
