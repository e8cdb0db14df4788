//! Capture pipelines that mirror the render surface into downloadable media.
//!
//! A pipeline records one session at a time. Sessions are finalized asynchronously: `end_session`
//! returns once the session is closed, and its [`CaptureArtifact`] becomes visible through
//! [`CapturePipeline::latest_artifact`] when encoding completes. Only the newest session's
//! artifact is retained.

/// System `ffmpeg` MP4 capture.
pub mod ffmpeg;
/// Animated GIF capture.
pub mod gif;
/// Raw in-memory capture.
pub mod memory;

use crate::foundation::core::{Canvas, Fps};
use crate::foundation::error::{SignplayError, SignplayResult};
use crate::render::cpu::CpuSurface;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

/// Identifies one capture session. Handles increase monotonically per pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionHandle(pub u64);

/// Encoding of a [`CaptureArtifact`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MediaFormat {
    /// H.264 in an MP4 container.
    Mp4,
    /// Looping animated GIF.
    Gif,
    /// Concatenated opaque RGBA8 frames.
    RawRgba,
}

impl MediaFormat {
    /// File extension, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            MediaFormat::Mp4 => "mp4",
            MediaFormat::Gif => "gif",
            MediaFormat::RawRgba => "rgba",
        }
    }

    /// MIME type.
    pub fn mime(self) -> &'static str {
        match self {
            MediaFormat::Mp4 => "video/mp4",
            MediaFormat::Gif => "image/gif",
            MediaFormat::RawRgba => "application/octet-stream",
        }
    }
}

/// Finalized output of one capture session.
#[derive(Clone, Debug)]
pub struct CaptureArtifact {
    /// Session this artifact was recorded in.
    pub session: SessionHandle,
    /// Encoding of `bytes`.
    pub format: MediaFormat,
    /// Frame size.
    pub canvas: Canvas,
    /// Rate the session was opened with.
    pub fps: Fps,
    /// Frames recorded.
    pub frame_count: u64,
    /// Encoded media.
    pub bytes: Arc<[u8]>,
}

impl CaptureArtifact {
    /// Download file name for an artifact translated from `input_text`.
    pub fn file_name(&self, input_text: &str) -> String {
        artifact_file_name(input_text, self.format)
    }
}

/// `sign_language_<slug>.<ext>` where slug is the first 10 characters of `input_text` with
/// whitespace runs (and path separators) replaced by `_`, or `video` when empty.
pub fn artifact_file_name(input_text: &str, format: MediaFormat) -> String {
    let head: String = input_text.chars().take(10).collect();
    let mut slug = String::with_capacity(head.len());
    let mut in_ws = false;
    for c in head.chars() {
        if c.is_whitespace() {
            if !in_ws {
                slug.push('_');
            }
            in_ws = true;
            continue;
        }
        in_ws = false;
        slug.push(if c == '/' || c == '\\' { '_' } else { c });
    }
    if slug.is_empty() {
        slug.push_str("video");
    }
    format!("sign_language_{slug}.{}", format.extension())
}

/// Session-oriented recorder of surface frames.
///
/// Contract:
/// - at most one session is open; `begin_session` on a pipeline with an open session ends it first
/// - `capture_frame` only reads the surface
/// - `end_session` is idempotent and returns before finalization completes
pub trait CapturePipeline: Send {
    /// Open a session recording `surface` at `fps`.
    ///
    /// Returns [`SignplayError::CaptureUnsupported`] when the backend cannot record on this
    /// platform.
    fn begin_session(&mut self, surface: &CpuSurface, fps: Fps) -> SignplayResult<SessionHandle>;

    /// Mirror the current surface pixels into the open session `handle`.
    fn capture_frame(&mut self, handle: SessionHandle, surface: &CpuSurface)
    -> SignplayResult<()>;

    /// Close `handle` and finalize it in the background. Closed or unknown handles are a no-op.
    fn end_session(&mut self, handle: SessionHandle) -> SignplayResult<()>;

    /// The most recently finalized artifact.
    fn latest_artifact(&self) -> Option<CaptureArtifact>;

    /// Handle of the open session, if any.
    fn open_session(&self) -> Option<SessionHandle>;

    /// Block until all pending finalizations have completed.
    fn wait_idle(&mut self) {}
}

impl<C: CapturePipeline + ?Sized> CapturePipeline for Box<C> {
    fn begin_session(&mut self, surface: &CpuSurface, fps: Fps) -> SignplayResult<SessionHandle> {
        (**self).begin_session(surface, fps)
    }

    fn capture_frame(
        &mut self,
        handle: SessionHandle,
        surface: &CpuSurface,
    ) -> SignplayResult<()> {
        (**self).capture_frame(handle, surface)
    }

    fn end_session(&mut self, handle: SessionHandle) -> SignplayResult<()> {
        (**self).end_session(handle)
    }

    fn latest_artifact(&self) -> Option<CaptureArtifact> {
        (**self).latest_artifact()
    }

    fn open_session(&self) -> Option<SessionHandle> {
        (**self).open_session()
    }

    fn wait_idle(&mut self) {
        (**self).wait_idle()
    }
}

/// Which capture backend to use.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureKind {
    /// MP4 through `ffmpeg` when it is on `PATH`, otherwise disabled.
    #[default]
    Auto,
    /// MP4 through `ffmpeg`.
    Mp4,
    /// Animated GIF.
    Gif,
    /// Raw frames kept in memory.
    Memory,
    /// No capture.
    Off,
}

/// Options shared by the encoding backends.
#[derive(Clone, Debug)]
pub struct CaptureOpts {
    /// Background used to flatten alpha (straight RGBA8).
    pub bg_rgba: [u8; 4],
    /// Directory for intermediate files.
    pub tmp_dir: std::path::PathBuf,
}

impl Default for CaptureOpts {
    fn default() -> Self {
        Self {
            bg_rgba: [255, 255, 255, 255],
            tmp_dir: std::env::temp_dir(),
        }
    }
}

/// Build the pipeline for `kind`.
///
/// `Auto` degrades to [`DisabledCapture`] when `ffmpeg` is not available.
pub fn open_capture(kind: CaptureKind, opts: CaptureOpts) -> Box<dyn CapturePipeline> {
    match kind {
        CaptureKind::Auto if ffmpeg::is_ffmpeg_on_path() => {
            Box::new(ffmpeg::FfmpegCapture::new(opts))
        }
        CaptureKind::Auto => {
            tracing::warn!("ffmpeg not found on PATH; capture disabled");
            Box::new(DisabledCapture::new("ffmpeg was not found on PATH"))
        }
        CaptureKind::Mp4 => Box::new(ffmpeg::FfmpegCapture::new(opts)),
        CaptureKind::Gif => Box::new(gif::GifCapture::new(opts)),
        CaptureKind::Memory => Box::new(memory::InMemoryCapture::new(opts.bg_rgba)),
        CaptureKind::Off => Box::new(DisabledCapture::new("capture is turned off")),
    }
}

/// Pipeline for platforms without a capture capability. Never opens a session.
#[derive(Debug, Clone)]
pub struct DisabledCapture {
    reason: String,
}

impl DisabledCapture {
    /// Disabled pipeline reporting `reason`.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl CapturePipeline for DisabledCapture {
    fn begin_session(&mut self, _surface: &CpuSurface, _fps: Fps) -> SignplayResult<SessionHandle> {
        Err(SignplayError::capture_unsupported(self.reason.clone()))
    }

    fn capture_frame(
        &mut self,
        _handle: SessionHandle,
        _surface: &CpuSurface,
    ) -> SignplayResult<()> {
        Ok(())
    }

    fn end_session(&mut self, _handle: SessionHandle) -> SignplayResult<()> {
        Ok(())
    }

    fn latest_artifact(&self) -> Option<CaptureArtifact> {
        None
    }

    fn open_session(&self) -> Option<SessionHandle> {
        None
    }
}

/// Latest-wins artifact store shared with finalizer threads.
#[derive(Clone, Debug, Default)]
pub(crate) struct ArtifactSlot(Arc<Mutex<Option<CaptureArtifact>>>);

impl ArtifactSlot {
    /// Store `artifact` unless a newer session already published.
    pub(crate) fn publish(&self, artifact: CaptureArtifact) -> bool {
        let mut slot = self.0.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(held) = slot.as_ref()
            && held.session > artifact.session
        {
            tracing::debug!(
                stale = artifact.session.0,
                held = held.session.0,
                "discarding artifact of an older session"
            );
            return false;
        }
        tracing::info!(
            session = artifact.session.0,
            format = artifact.format.extension(),
            frames = artifact.frame_count,
            bytes = artifact.bytes.len(),
            "capture artifact ready"
        );
        *slot = Some(artifact);
        true
    }

    pub(crate) fn latest(&self) -> Option<CaptureArtifact> {
        self.0.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

/// Background finalization threads of one pipeline.
#[derive(Debug, Default)]
pub(crate) struct Finalizers(Vec<JoinHandle<()>>);

impl Finalizers {
    pub(crate) fn spawn(&mut self, name: String, job: impl FnOnce() + Send + 'static) {
        self.0.retain(|h| !h.is_finished());
        match std::thread::Builder::new().name(name).spawn(job) {
            Ok(h) => self.0.push(h),
            Err(e) => tracing::warn!("failed to spawn capture finalizer: {e}"),
        }
    }

    pub(crate) fn join_all(&mut self) {
        for h in self.0.drain(..) {
            if h.join().is_err() {
                tracing::warn!("capture finalizer panicked");
            }
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/capture/mod.rs"]
mod tests;
