//! Player configuration.
//!
//! Every field has a default, so `{}` is a valid configuration file.

use crate::capture::CaptureKind;
use crate::foundation::core::{Canvas, Fps, Speed};
use crate::foundation::error::{SignplayError, SignplayResult};
use crate::render::drawer::DrawStyle;
use std::path::Path;

/// Settings for one player instance.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlayerConfig {
    /// Surface size.
    pub canvas: Canvas,
    /// Frame rate at speed 1.
    pub base_fps: Fps,
    /// Initial speed multiplier.
    pub speed: Speed,
    /// Drawing colors and sizes.
    pub style: DrawStyle,
    /// Capture backend.
    pub capture: CaptureKind,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            canvas: Canvas {
                width: 640,
                height: 480,
            },
            base_fps: Fps { num: 30, den: 1 },
            speed: Speed::NORMAL,
            style: DrawStyle::default(),
            capture: CaptureKind::Auto,
        }
    }
}

impl PlayerConfig {
    /// Parse a JSON configuration and validate it.
    pub fn from_reader<R: std::io::Read>(r: R) -> SignplayResult<Self> {
        let cfg: Self = serde_json::from_reader(r)
            .map_err(|e| SignplayError::serde(format!("player config: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read and validate a JSON configuration file.
    pub fn from_path(path: impl AsRef<Path>) -> SignplayResult<Self> {
        use anyhow::Context as _;
        let path = path.as_ref();
        let f = std::fs::File::open(path)
            .with_context(|| format!("open player config '{}'", path.display()))?;
        Self::from_reader(std::io::BufReader::new(f))
    }

    /// Check the invariants serde cannot express.
    pub fn validate(&self) -> SignplayResult<()> {
        if self.canvas.width == 0 || self.canvas.height == 0 {
            return Err(SignplayError::validation(
                "canvas width/height must be non-zero",
            ));
        }
        Fps::new(self.base_fps.num, self.base_fps.den)?;
        if !(self.style.point_radius.is_finite() && self.style.point_radius >= 0.0) {
            return Err(SignplayError::validation(
                "style.point_radius must be finite and >= 0",
            ));
        }
        if !(self.style.line_width.is_finite() && self.style.line_width >= 0.0) {
            return Err(SignplayError::validation(
                "style.line_width must be finite and >= 0",
            ));
        }
        Ok(())
    }
}
