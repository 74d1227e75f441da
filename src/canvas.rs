//! Drawing surface with an explicit release point.
//!
//! A [`Canvas`] owns its [`Framebuffer`] until [`Canvas::release`] is called.
//! Every access after that fails with [`Error::SurfaceClosed`] so that a
//! renderer can never draw into a surface an export has already finalized.

use crate::color::Rgba;
use crate::error::{Error, Result};
use crate::framebuffer::Framebuffer;

/// Mutable drawing target for one rendering or export operation.
#[derive(Debug)]
pub struct Canvas {
    surface: Option<Framebuffer>,
    width: u32,
    height: u32,
}

impl Canvas {
    /// Acquire a new canvas of the given size.
    ///
    /// # Errors
    ///
    /// Returns an error if width or height is zero.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        let surface = Framebuffer::new(width, height)?;
        Ok(Self {
            surface: Some(surface),
            width,
            height,
        })
    }

    /// Wrap an existing framebuffer.
    #[must_use]
    pub fn from_framebuffer(fb: Framebuffer) -> Self {
        Self {
            width: fb.width(),
            height: fb.height(),
            surface: Some(fb),
        }
    }

    /// Canvas size in pixels, available even after release.
    #[must_use]
    pub const fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Whether the canvas can still be drawn on.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.surface.is_some()
    }

    /// Borrow the backing framebuffer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SurfaceClosed`] once the canvas has been released.
    pub fn surface(&self) -> Result<&Framebuffer> {
        self.surface.as_ref().ok_or(Error::SurfaceClosed("canvas released"))
    }

    /// Mutably borrow the backing framebuffer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SurfaceClosed`] once the canvas has been released.
    pub fn surface_mut(&mut self) -> Result<&mut Framebuffer> {
        self.surface.as_mut().ok_or(Error::SurfaceClosed("canvas released"))
    }

    /// Fill the whole canvas with `color`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SurfaceClosed`] once the canvas has been released.
    pub fn clear(&mut self, color: Rgba) -> Result<()> {
        self.surface_mut()?.clear(color);
        Ok(())
    }

    /// Release the surface, handing back its final contents.
    ///
    /// Releasing twice is harmless and returns `None` the second time.
    pub fn release(&mut self) -> Option<Framebuffer> {
        self.surface.take()
    }
}
