//! signplay plays back sign-language landmark animations and records them as video.
//!
//! A [`SignSequenceSet`] (pose and hand landmarks per frame) is loaded into a
//! [`PlaybackController`], which keeps three things consistent under pause, resume, speed
//! changes and new input:
//!
//! - a [`FrameClock`] advancing the frame index at `base_fps * speed`
//! - a [`LandmarkDrawer`] painting the current frame onto a [`CpuSurface`]
//! - a [`CapturePipeline`] mirroring every painted frame into one recording session per loop pass
//!
//! The controller is polled with monotonic time by a [`Driver`], in real time or virtual time.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

/// Capture pipelines and artifacts.
pub mod capture;
/// Player configuration.
pub mod config;
/// Landmark data model.
pub mod model;
/// Frame clock, controller and driver.
pub mod playback;
/// Drawing surface and landmark drawer.
pub mod render;
/// Sequence sources.
pub mod source;

pub use crate::foundation::core::{Canvas, Fps, FrameIndex, Point, Rgba8, Speed};
pub use crate::foundation::error::{SignplayError, SignplayResult};

pub use crate::capture::ffmpeg::{FfmpegCapture, is_ffmpeg_on_path};
pub use crate::capture::gif::GifCapture;
pub use crate::capture::memory::InMemoryCapture;
pub use crate::capture::{
    CaptureArtifact, CaptureKind, CaptureOpts, CapturePipeline, DisabledCapture, MediaFormat,
    SessionHandle, artifact_file_name, open_capture,
};
pub use crate::config::PlayerConfig;
pub use crate::model::landmark::{FrameData, Landmark, LandmarkSet, Sequence, SignSequenceSet};
pub use crate::playback::clock::{FrameClock, Tick};
pub use crate::playback::controller::{
    Download, PlaybackController, PlaybackSnapshot, PlaybackState, TickOutcome,
};
pub use crate::playback::driver::{Driver, Pacing};
pub use crate::render::FrameRGBA;
pub use crate::render::cpu::CpuSurface;
pub use crate::render::drawer::{DrawStats, DrawStyle, LandmarkDrawer};
pub use crate::source::{ClipLibrary, InputDebounce, JsonFileSource, SequenceSource};
