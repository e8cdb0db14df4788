use crate::foundation::core::Canvas;
use crate::foundation::error::{SignplayError, SignplayResult};
use crate::render::FrameRGBA;

/// Raster surface the drawer paints into and capture reads from.
///
/// The drawing context can be detached (an unmounted viewport); painting a detached surface fails
/// with [`SignplayError::SurfaceUnavailable`] while its last pixels stay readable.
pub struct CpuSurface {
    width: u16,
    height: u16,
    ctx: Option<vello_cpu::RenderContext>,
    pixmap: vello_cpu::Pixmap,
}

impl std::fmt::Debug for CpuSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CpuSurface")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("attached", &self.ctx.is_some())
            .finish()
    }
}

impl CpuSurface {
    /// Allocate a surface of `canvas` size with an attached drawing context.
    pub fn new(canvas: Canvas) -> SignplayResult<Self> {
        if canvas.width == 0 || canvas.height == 0 {
            return Err(SignplayError::validation(
                "surface width/height must be non-zero",
            ));
        }
        let width: u16 = canvas
            .width
            .try_into()
            .map_err(|_| SignplayError::validation("surface width exceeds u16"))?;
        let height: u16 = canvas
            .height
            .try_into()
            .map_err(|_| SignplayError::validation("surface height exceeds u16"))?;

        Ok(Self {
            width,
            height,
            ctx: Some(vello_cpu::RenderContext::new(width, height)),
            pixmap: vello_cpu::Pixmap::new(width, height),
        })
    }

    /// Surface size in pixels.
    pub fn canvas(&self) -> Canvas {
        Canvas {
            width: u32::from(self.width),
            height: u32::from(self.height),
        }
    }

    /// Drop the drawing context. Pixels are kept.
    pub fn detach(&mut self) {
        self.ctx = None;
    }

    /// Re-acquire a drawing context after [`CpuSurface::detach`].
    pub fn attach(&mut self) {
        if self.ctx.is_none() {
            self.ctx = Some(vello_cpu::RenderContext::new(self.width, self.height));
        }
    }

    /// Return `true` when painting is possible.
    pub fn is_attached(&self) -> bool {
        self.ctx.is_some()
    }

    /// Run `f` against a fresh drawing pass and rasterize it into the surface pixels.
    ///
    /// `vello_cpu` renders the whole pass into the pixmap, so `f` is responsible for painting the
    /// background.
    pub(crate) fn paint<R>(
        &mut self,
        f: impl FnOnce(&mut vello_cpu::RenderContext) -> R,
    ) -> SignplayResult<R> {
        let ctx = self
            .ctx
            .as_mut()
            .ok_or_else(|| SignplayError::surface_unavailable("surface has no drawing context"))?;
        ctx.reset();
        let out = f(ctx);
        ctx.flush();
        ctx.render_to_pixmap(&mut self.pixmap);
        Ok(out)
    }

    /// Premultiplied RGBA8 bytes, row-major.
    pub fn pixels(&self) -> &[u8] {
        self.pixmap.data_as_u8_slice()
    }

    /// Pixel at `(x, y)`, or `None` outside the surface.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= u32::from(self.width) || y >= u32::from(self.height) {
            return None;
        }
        let i = ((y as usize) * usize::from(self.width) + (x as usize)) * 4;
        let px = self.pixels().get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Copy the current pixels out.
    pub fn snapshot(&self) -> FrameRGBA {
        FrameRGBA {
            width: u32::from(self.width),
            height: u32::from(self.height),
            data: self.pixels().to_vec(),
            premultiplied: true,
        }
    }
}
