// src/surface/framebuffer.rs

//! Software RGBA framebuffer, the default `Surface` backend.

use super::{Surface, SurfaceFactory};
use crate::color::Rgba;
use crate::geometry::{Point, Rect, Size};
use anyhow::{bail, Result};
use log::debug;
use std::io::{self, Write};

const BYTES_PER_PIXEL: usize = 4;

/// Row-major RGBA pixel buffer, 4 bytes per pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Framebuffer {
    size: Size,
    pixels: Box<[u8]>,
}

impl Framebuffer {
    /// Allocates a framebuffer with every byte zeroed (transparent black).
    pub fn new(size: Size) -> Self {
        let pixels = vec![0u8; size.area() * BYTES_PER_PIXEL].into_boxed_slice();
        Self { size, pixels }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    pub fn put_pixel(&mut self, x: i32, y: i32, color: Rgba) {
        if let Some(idx) = self.index_of(x, y) {
            self.pixels[idx..idx + BYTES_PER_PIXEL].copy_from_slice(&color.to_bytes());
        }
    }

    /// Writes the buffer as a binary PPM (P6). Alpha is dropped.
    pub fn write_ppm<W: Write>(&self, mut out: W) -> io::Result<()> {
        write!(out, "P6\n{} {}\n255\n", self.size.width, self.size.height)?;
        let mut row = Vec::with_capacity(self.size.width as usize * 3);
        for line in self
            .pixels
            .chunks_exact((self.size.width as usize * BYTES_PER_PIXEL).max(1))
        {
            row.clear();
            for px in line.chunks_exact(BYTES_PER_PIXEL) {
                row.extend_from_slice(&px[..3]);
            }
            out.write_all(&row)?;
        }
        out.flush()
    }

    fn index_of(&self, x: i32, y: i32) -> Option<usize> {
        if !self.bounds().contains(Point::new(x, y)) {
            return None;
        }
        Some((y as usize * self.size.width as usize + x as usize) * BYTES_PER_PIXEL)
    }
}

impl Surface for Framebuffer {
    fn size(&self) -> Size {
        self.size
    }

    fn fill(&mut self, rect: Rect, color: Rgba) {
        let clipped = rect.intersect(&self.bounds());
        if clipped.is_empty() {
            return;
        }

        let color_bytes = color.to_bytes();
        let stride = self.size.width as usize * BYTES_PER_PIXEL;
        let x_start = clipped.min.x as usize * BYTES_PER_PIXEL;
        let x_end = clipped.max.x as usize * BYTES_PER_PIXEL;

        for y in clipped.min.y..clipped.max.y {
            let row_start = y as usize * stride;
            let row = &mut self.pixels[row_start + x_start..row_start + x_end];
            for pixel in row.chunks_exact_mut(BYTES_PER_PIXEL) {
                pixel.copy_from_slice(&color_bytes);
            }
        }
    }

    fn pixel(&self, x: i32, y: i32) -> Option<Rgba> {
        let idx = self.index_of(x, y)?;
        let mut bytes = [0u8; BYTES_PER_PIXEL];
        bytes.copy_from_slice(&self.pixels[idx..idx + BYTES_PER_PIXEL]);
        Some(Rgba::from_bytes(bytes))
    }

    fn to_framebuffer(&self) -> Framebuffer {
        self.clone()
    }
}

/// Allocates `Framebuffer` surfaces.
#[derive(Debug, Clone, Copy, Default)]
pub struct FramebufferFactory;

impl SurfaceFactory for FramebufferFactory {
    fn new_surface(&self, size: Size) -> Result<Box<dyn Surface>> {
        if size.is_empty() {
            bail!(
                "cannot allocate a {}x{} surface: both dimensions must be non-zero",
                size.width,
                size.height
            );
        }
        debug!("FramebufferFactory: allocating {}x{}", size.width, size.height);
        Ok(Box::new(Framebuffer::new(size)))
    }
}
