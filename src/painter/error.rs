// src/painter/error.rs

//! Error types for the scheduling loop.

use std::fmt;
use std::io;

/// Error returned by `Loop` and `LoopHandle`.
#[derive(Debug)]
pub enum LoopError {
    /// The loop is shutting down or has stopped; the envelope was not queued.
    Stopped,
    /// The surface factory could not provide a surface.
    SurfaceAllocation(anyhow::Error),
    /// The worker thread could not be spawned.
    Spawn(io::Error),
    /// An operation panicked while being applied.
    OperationPanicked(String),
    /// The worker thread itself panicked outside an operation.
    WorkerPanicked(String),
}

impl fmt::Display for LoopError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoopError::Stopped => write!(f, "painter loop stopped"),
            LoopError::SurfaceAllocation(e) => write!(f, "failed to allocate surface: {:#}", e),
            LoopError::Spawn(e) => write!(f, "failed to spawn painter loop thread: {}", e),
            LoopError::OperationPanicked(msg) => write!(f, "operation panicked: {}", msg),
            LoopError::WorkerPanicked(msg) => write!(f, "painter loop worker panicked: {}", msg),
        }
    }
}

impl std::error::Error for LoopError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoopError::SurfaceAllocation(e) => Some(&**e),
            LoopError::Spawn(e) => Some(e),
            _ => None,
        }
    }
}

/// Extracts a readable message from a panic payload.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "<non-string panic payload>".to_string()
    }
}
