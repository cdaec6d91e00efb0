// src/surface/recording.rs

//! Test surface that logs every fill on top of a real framebuffer.

use super::{Framebuffer, Surface};
use crate::color::Rgba;
use crate::geometry::{Rect, Size};
use std::sync::{Arc, Mutex, PoisonError};

/// Fills recorded by one or more `RecordingSurface`s, shared with the test.
pub(crate) type FillLog = Arc<Mutex<Vec<(Rect, Rgba)>>>;

pub(crate) struct RecordingSurface {
    inner: Framebuffer,
    fills: FillLog,
}

impl RecordingSurface {
    pub(crate) fn new(size: Size) -> Self {
        Self::with_log(size, FillLog::default())
    }

    pub(crate) fn with_log(size: Size, fills: FillLog) -> Self {
        Self {
            inner: Framebuffer::new(size),
            fills,
        }
    }

    pub(crate) fn fills(&self) -> Vec<(Rect, Rgba)> {
        self.fills
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub(crate) fn fill_colors(&self) -> Vec<Rgba> {
        self.fills().into_iter().map(|(_, c)| c).collect()
    }
}

impl Surface for RecordingSurface {
    fn size(&self) -> Size {
        self.inner.size()
    }

    fn fill(&mut self, rect: Rect, color: Rgba) {
        self.fills
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((rect, color));
        self.inner.fill(rect, color);
    }

    fn pixel(&self, x: i32, y: i32) -> Option<Rgba> {
        self.inner.pixel(x, y)
    }
}
