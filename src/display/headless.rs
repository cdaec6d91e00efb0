// src/display/headless.rs

//! Headless display: keeps published frames in memory and can dump them as
//! PPM files.

use crate::painter::Receiver;
use crate::surface::{Framebuffer, Surface};
use anyhow::{Context, Result};
use log::{error, info, trace};
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct Presented {
    frames: usize,
    last: Option<Framebuffer>,
}

/// `Receiver` with no window behind it.
///
/// Clones share the presented state, so one clone can be handed to the loop
/// and the other kept to inspect what was shown.
#[derive(Debug, Clone, Default)]
pub struct HeadlessDisplay {
    frame_dir: Option<PathBuf>,
    presented: Arc<Mutex<Presented>>,
}

impl HeadlessDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also writes every presented frame to `dir` as `frame-NNNNN.ppm`.
    pub fn with_frame_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            frame_dir: Some(dir.into()),
            ..Self::default()
        }
    }

    pub fn frame_dir(&self) -> Option<&Path> {
        self.frame_dir.as_deref()
    }

    pub fn frames_presented(&self) -> usize {
        self.lock().frames
    }

    /// Copy of the most recently presented frame.
    pub fn last_frame(&self) -> Option<Framebuffer> {
        self.lock().last.clone()
    }

    fn lock(&self) -> MutexGuard<'_, Presented> {
        self.presented.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_frame(dir: &Path, index: usize, frame: &Framebuffer) -> Result<PathBuf> {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create frame directory {}", dir.display()))?;
        let path = dir.join(format!("frame-{:05}.ppm", index));
        let file =
            File::create(&path).with_context(|| format!("Failed to create {}", path.display()))?;
        frame
            .write_ppm(BufWriter::new(file))
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }
}

impl Receiver for HeadlessDisplay {
    fn update(&mut self, surface: &dyn Surface) {
        let frame = surface.to_framebuffer();
        let index = {
            let mut presented = self.lock();
            presented.frames += 1;
            presented.last = Some(frame.clone());
            presented.frames
        };
        trace!("HeadlessDisplay: presented frame {}", index);

        if let Some(dir) = &self.frame_dir {
            match Self::write_frame(dir, index, &frame) {
                Ok(path) => info!("HeadlessDisplay: wrote {}", path.display()),
                Err(e) => error!("HeadlessDisplay: {:#}", e),
            }
        }
    }
}
