// src/painter/mod.rs

//! Drawing operations and the loop that applies them.

mod error;
mod event_loop;
mod op;

pub use error::LoopError;
pub use event_loop::{FaultPolicy, Loop, LoopConfig, LoopHandle, Receiver, DEFAULT_SURFACE_SIZE};
pub use op::{
    BgRect, Figure, FigureHandle, Move, Operation, OperationBatch, OperationFn, OperationKind,
};
