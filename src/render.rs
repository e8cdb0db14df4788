//! CPU drawing surface and the landmark drawer.

/// `vello_cpu`-backed drawing surface.
pub mod cpu;
/// Landmark and skeleton drawing.
pub mod drawer;

/// A snapshot of surface pixels as RGBA8.
///
/// Surface snapshots are **premultiplied alpha**; the flag makes this explicit at API boundaries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether the `data` is premultiplied alpha.
    pub premultiplied: bool,
}
