use crate::foundation::error::{SignplayError, SignplayResult};
use std::time::Duration;

pub use kurbo::Point;

/// 0-based index into the flattened frame list of a playback session.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize,
    serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

impl FrameIndex {
    /// Index of the next frame, wrapping to 0 at `frame_count`.
    ///
    /// Returns `(next, wrapped)`.
    pub fn advance(self, frame_count: u64) -> (Self, bool) {
        let next = self.0.saturating_add(1);
        if next >= frame_count {
            (Self(0), true)
        } else {
            (Self(next), false)
        }
    }
}

/// Frames-per-second represented as a rational `num/den`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    /// Numerator (frames).
    pub num: u32,
    /// Denominator (seconds), must be non-zero.
    pub den: u32, // must be > 0
}

impl Fps {
    /// Create a validated FPS value.
    pub fn new(num: u32, den: u32) -> SignplayResult<Self> {
        if den == 0 {
            return Err(SignplayError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(SignplayError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Convert to floating-point FPS.
    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    /// Duration of one frame in seconds.
    pub fn frame_duration_secs(self) -> f64 {
        f64::from(self.den) / f64::from(self.num)
    }

    /// Effective rate when playing at `speed`.
    ///
    /// The result is kept rational (millesimal precision on the multiplier) so encoders receive an
    /// exact `num/den` pair.
    pub fn scaled(self, speed: Speed) -> SignplayResult<Self> {
        let milli = (speed.get() * 1000.0).round();
        if milli < 1.0 || milli > f64::from(u32::MAX) {
            return Err(SignplayError::validation(format!(
                "speed {} cannot be applied to {}/{} fps",
                speed.get(),
                self.num,
                self.den
            )));
        }
        let num = u64::from(self.num) * milli as u64;
        let den = u64::from(self.den) * 1000;
        let g = gcd(num, den);
        let (num, den) = (num / g, den / g);
        let num = u32::try_from(num)
            .map_err(|_| SignplayError::validation("scaled fps numerator overflows u32"))?;
        let den = u32::try_from(den)
            .map_err(|_| SignplayError::validation("scaled fps denominator overflows u32"))?;
        Self::new(num, den)
    }

    /// Tick interval at this rate.
    pub fn interval(self) -> Duration {
        Duration::from_secs_f64(self.frame_duration_secs())
    }
}

fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a.max(1)
}

/// Playback speed multiplier. Always finite and strictly positive.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Speed(f64);

impl Speed {
    /// Normal speed.
    pub const NORMAL: Speed = Speed(1.0);

    /// Multipliers offered by the player controls.
    pub const PRESETS: [Speed; 3] = [Speed(0.5), Speed(1.0), Speed(1.5)];

    /// Create a validated speed multiplier.
    pub fn new(multiplier: f64) -> SignplayResult<Self> {
        if !multiplier.is_finite() || multiplier <= 0.0 {
            return Err(SignplayError::validation(format!(
                "speed multiplier must be finite and > 0, got {multiplier}"
            )));
        }
        Ok(Self(multiplier))
    }

    /// Raw multiplier.
    pub fn get(self) -> f64 {
        self.0
    }
}

impl Default for Speed {
    fn default() -> Self {
        Self::NORMAL
    }
}

impl TryFrom<f64> for Speed {
    type Error = SignplayError;

    fn try_from(v: f64) -> Result<Self, Self::Error> {
        Self::new(v)
    }
}

impl From<Speed> for f64 {
    fn from(s: Speed) -> f64 {
        s.0
    }
}

/// Drawing surface dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Project a normalized `[0,1]` coordinate pair onto this canvas.
    pub fn project(self, x: f64, y: f64) -> Point {
        Point::new(x * f64::from(self.width), y * f64::from(self.height))
    }
}

/// Straight-alpha RGBA8 color as it appears in configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8(pub [u8; 4]);

impl Rgba8 {
    /// Opaque color from RGB channels.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self([r, g, b, 255])
    }

    /// Premultiplied channels, the layout of surface pixels.
    pub fn premultiplied(self) -> [u8; 4] {
        let [r, g, b, a] = self.0;
        let a16 = u16::from(a);
        let premul = |c: u8| -> u8 { (((u16::from(c) * a16) + 127) / 255) as u8 };
        [premul(r), premul(g), premul(b), a]
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
