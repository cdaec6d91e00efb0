// src/surface/mod.rs

//! Off-screen pixel surfaces that drawing operations paint into.
//!
//! A `Surface` is owned by exactly one thread at a time: the scheduling
//! loop's worker while operations run, and a `Receiver` only for the
//! duration of a publish call. Nothing here is synchronized.

mod framebuffer;
#[cfg(test)]
pub(crate) mod recording;

pub use framebuffer::{Framebuffer, FramebufferFactory};

use crate::color::Rgba;
use crate::geometry::{Rect, Size};
use anyhow::Result;

/// Minimal pixel-fill interface a drawing backend has to provide.
pub trait Surface: Send {
    /// Pixel dimensions of the surface.
    fn size(&self) -> Size;

    /// Fills `rect` with `color`, replacing what was there.
    ///
    /// Implementations clip `rect` to `bounds()`; an empty or fully clipped
    /// rectangle leaves the surface untouched.
    fn fill(&mut self, rect: Rect, color: Rgba);

    /// Reads back a single pixel, `None` outside the bounds.
    fn pixel(&self, x: i32, y: i32) -> Option<Rgba>;

    fn bounds(&self) -> Rect {
        Rect::from_size(self.size())
    }

    /// Copies the visible contents into an owned framebuffer.
    ///
    /// Receivers call this when they need the pixels after `update` returns.
    fn to_framebuffer(&self) -> Framebuffer {
        let size = self.size();
        let mut copy = Framebuffer::new(size);
        let bounds = self.bounds();
        for y in bounds.min.y..bounds.max.y {
            for x in bounds.min.x..bounds.max.x {
                if let Some(color) = self.pixel(x, y) {
                    copy.put_pixel(x, y, color);
                }
            }
        }
        copy
    }
}

/// Supplies blank surfaces to the scheduling loop.
pub trait SurfaceFactory: Send {
    fn new_surface(&self, size: Size) -> Result<Box<dyn Surface>>;
}

impl<F> SurfaceFactory for F
where
    F: Fn(Size) -> Result<Box<dyn Surface>> + Send,
{
    fn new_surface(&self, size: Size) -> Result<Box<dyn Surface>> {
        self(size)
    }
}
