use crate::capture::{
    ArtifactSlot, CaptureArtifact, CaptureOpts, CapturePipeline, Finalizers, MediaFormat,
    SessionHandle,
};
use crate::foundation::core::{Canvas, Fps};
use crate::foundation::error::{SignplayError, SignplayResult};
use crate::foundation::math::flatten_premul_over_bg;
use crate::render::cpu::CpuSurface;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::Arc;
use std::thread::JoinHandle;

struct EncodeSession {
    handle: SessionHandle,
    canvas: Canvas,
    fps: Fps,
    frames: u64,

    child: Child,
    stdin: Option<ChildStdin>,
    stderr_drain: Option<JoinHandle<std::io::Result<Vec<u8>>>>,

    scratch: Vec<u8>,
    out_path: PathBuf,
}

/// Capture that spawns the system `ffmpeg` per session and streams raw frames to its stdin.
///
/// Each session becomes an H.264/yuv420p MP4 written to a temp file; the finalizer thread waits for
/// `ffmpeg`, loads the file into the artifact and removes it.
pub struct FfmpegCapture {
    opts: CaptureOpts,
    available: Option<bool>,
    open: Option<EncodeSession>,
    next_id: u64,
    slot: ArtifactSlot,
    finalizers: Finalizers,
}

impl FfmpegCapture {
    /// Create an `ffmpeg` capture. Availability is probed on the first session.
    pub fn new(opts: CaptureOpts) -> Self {
        Self {
            opts,
            available: None,
            open: None,
            next_id: 0,
            slot: ArtifactSlot::default(),
            finalizers: Finalizers::default(),
        }
    }

    fn spawn_encoder(&self, canvas: Canvas, fps: Fps, out_path: &Path) -> SignplayResult<Child> {
        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        // Input: raw RGBA8 frames, already flattened to opaque in `capture_frame`.
        cmd.args([
            "-y",
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "-s",
            &format!("{}x{}", canvas.width, canvas.height),
            "-r",
            &format!("{}/{}", fps.num, fps.den),
            "-i",
            "pipe:0",
            "-an",
            "-c:v",
            "libx264",
            "-pix_fmt",
            "yuv420p",
            "-movflags",
            "+faststart",
        ])
        .arg(out_path);

        cmd.spawn().map_err(|e| {
            SignplayError::capture(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })
    }
}

impl CapturePipeline for FfmpegCapture {
    #[tracing::instrument(skip_all, fields(fps = fps.as_f64()))]
    fn begin_session(&mut self, surface: &CpuSurface, fps: Fps) -> SignplayResult<SessionHandle> {
        if let Some(open) = self.open.as_ref().map(|s| s.handle) {
            self.end_session(open)?;
        }

        let available = *self.available.get_or_insert_with(is_ffmpeg_on_path);
        if !available {
            return Err(SignplayError::capture_unsupported(
                "ffmpeg is required for MP4 capture, but was not found on PATH",
            ));
        }

        let canvas = surface.canvas();
        if !canvas.width.is_multiple_of(2) || !canvas.height.is_multiple_of(2) {
            return Err(SignplayError::validation(
                "mp4 capture width/height must be even (required for yuv420p output)",
            ));
        }

        self.next_id += 1;
        let handle = SessionHandle(self.next_id);
        let out_path = self.opts.tmp_dir.join(format!(
            "signplay_capture_{}_{}_{}.mp4",
            std::process::id(),
            handle.0,
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_nanos())
                .unwrap_or(0)
        ));
        ensure_parent_dir(&out_path)?;

        let mut child = self.spawn_encoder(canvas, fps, &out_path)?;
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| SignplayError::capture("failed to open ffmpeg stdin (unexpected)"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| SignplayError::capture("failed to open ffmpeg stderr (unexpected)"))?;
        let stderr_drain = std::thread::spawn(move || {
            let mut stderr_bytes = Vec::new();
            stderr.read_to_end(&mut stderr_bytes)?;
            Ok(stderr_bytes)
        });

        tracing::debug!(session = handle.0, path = %out_path.display(), "ffmpeg session opened");
        self.open = Some(EncodeSession {
            handle,
            canvas,
            fps,
            frames: 0,
            child,
            stdin: Some(stdin),
            stderr_drain: Some(stderr_drain),
            scratch: vec![0u8; (canvas.width * canvas.height * 4) as usize],
            out_path,
        });
        Ok(handle)
    }

    fn capture_frame(
        &mut self,
        handle: SessionHandle,
        surface: &CpuSurface,
    ) -> SignplayResult<()> {
        let bg = self.opts.bg_rgba;
        let session = self
            .open
            .as_mut()
            .filter(|s| s.handle == handle)
            .ok_or_else(|| SignplayError::capture(format!("session {} is not open", handle.0)))?;

        if surface.canvas() != session.canvas {
            return Err(SignplayError::capture(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                surface.canvas().width,
                surface.canvas().height,
                session.canvas.width,
                session.canvas.height
            )));
        }
        if !flatten_premul_over_bg(&mut session.scratch, surface.pixels(), bg) {
            return Err(SignplayError::capture(
                "surface pixel buffer size mismatch with width*height*4",
            ));
        }

        let Some(stdin) = session.stdin.as_mut() else {
            return Err(SignplayError::capture("ffmpeg session is already finalized"));
        };

        use std::io::Write as _;
        stdin.write_all(&session.scratch).map_err(|e| {
            SignplayError::capture(format!("failed to write frame to ffmpeg stdin: {e}"))
        })?;
        session.frames += 1;
        Ok(())
    }

    fn end_session(&mut self, handle: SessionHandle) -> SignplayResult<()> {
        let Some(session) = self.open.take_if(|s| s.handle == handle) else {
            return Ok(());
        };
        let slot = self.slot.clone();
        self.finalizers.spawn(format!("signplay-ffmpeg-{}", handle.0), move || {
            finalize(session, &slot);
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

impl Drop for FfmpegCapture {
    fn drop(&mut self) {
        if let Some(open) = self.open.as_ref().map(|s| s.handle) {
            let _ = self.end_session(open);
        }
        self.finalizers.join_all();
    }
}

fn finalize(mut session: EncodeSession, slot: &ArtifactSlot) {
    let handle = session.handle;
    drop(session.stdin.take());

    if session.frames == 0 {
        let _ = session.child.kill();
        let _ = session.child.wait();
        let _ = session.stderr_drain.take().map(|h| h.join());
        let _ = std::fs::remove_file(&session.out_path);
        tracing::debug!(session = handle.0, "discarding empty capture session");
        return;
    }

    match wait_for_encoder(&mut session) {
        Ok(bytes) => {
            slot.publish(CaptureArtifact {
                session: handle,
                format: MediaFormat::Mp4,
                canvas: session.canvas,
                fps: session.fps,
                frame_count: session.frames,
                bytes: Arc::from(bytes),
            });
        }
        Err(e) => tracing::warn!(session = handle.0, "mp4 capture failed: {e}"),
    }
    let _ = std::fs::remove_file(&session.out_path);
}

fn wait_for_encoder(session: &mut EncodeSession) -> SignplayResult<Vec<u8>> {
    let status = session.child.wait().map_err(|e| {
        SignplayError::capture(format!("failed to wait for ffmpeg to finish: {e}"))
    })?;
    let stderr_bytes = match session.stderr_drain.take() {
        Some(handle) => handle
            .join()
            .map_err(|_| SignplayError::capture("ffmpeg stderr drain thread panicked"))?
            .map_err(|e| SignplayError::capture(format!("ffmpeg stderr read failed: {e}")))?,
        None => Vec::new(),
    };

    if !status.success() {
        let stderr = String::from_utf8_lossy(&stderr_bytes);
        return Err(SignplayError::capture(format!(
            "ffmpeg exited with status {}: {}",
            status,
            stderr.trim()
        )));
    }

    std::fs::read(&session.out_path).map_err(|e| {
        SignplayError::capture(format!(
            "read encoded capture '{}': {e}",
            session.out_path.display()
        ))
    })
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> SignplayResult<()> {
    if let Some(parent) = path.parent() {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    std::process::Command::new("ffmpeg")
        .arg("-version")
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}
