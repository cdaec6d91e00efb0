// src/painter/event_loop.rs

//! Scheduling loop - the single serializer of all surface mutations.
//!
//! Threading model:
//! - Any number of producers call `LoopHandle::post` from any thread.
//! - One worker thread owns the surface, the factory and the receiver.
//! - The mailbox is an unbounded mpsc channel. Besides the closed flag it is
//!   the only state shared between producers and the worker.
//!
//! The worker blocks for the first envelope, drains whatever else is queued
//! with `try_recv`, applies that batch in order and publishes at most once
//! per batch.

use super::error::{panic_message, LoopError};
use super::op::Operation;
use crate::geometry::Size;
use crate::surface::{Surface, SurfaceFactory};
use log::*;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{self, Sender, TryRecvError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Surface size used when none is configured.
pub const DEFAULT_SURFACE_SIZE: Size = Size::new(800, 800);

/// Accepts published surfaces for display.
pub trait Receiver: Send {
    /// Called on the worker thread whenever a batch becomes ready.
    ///
    /// The worker keeps drawing into the same surface after this returns;
    /// copy it (`Surface::to_framebuffer`) to keep the pixels.
    fn update(&mut self, surface: &dyn Surface);
}

/// What the worker does when an operation panics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultPolicy {
    /// Stop the worker. `Loop::stop_and_wait` reports the panic.
    #[default]
    FailFast,
    /// Drop the rest of the faulting batch unpublished and keep running.
    SkipBatch,
}

/// Scheduling loop settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoopConfig {
    /// Size of the surfaces requested from the factory.
    pub surface_size: Size,
    /// Defer surface allocation until the first envelope needs one.
    pub lazy_surface: bool,
    /// Reaction to a panicking operation; see `FaultPolicy`. Fail-fast by default.
    pub fault_policy: FaultPolicy,
}

impl Default for LoopConfig {
    fn default() -> Self {
        LoopConfig {
            surface_size: DEFAULT_SURFACE_SIZE,
            lazy_surface: false,
            fault_policy: FaultPolicy::FailFast,
        }
    }
}

/// Mailbox message.
enum Envelope {
    Apply(Operation),
    Resize(Size),
    Stop,
}

static NEXT_LOOP_ID: AtomicU64 = AtomicU64::new(1);

struct ApplyFrame {
    loop_id: u64,
    posted: Vec<Operation>,
}

thread_local! {
    /// Present while a worker is inside `Operation::apply`.
    static APPLYING: RefCell<Option<ApplyFrame>> = const { RefCell::new(None) };
}

/// Runs `f` while capturing posts made to `loop_id` from this thread.
/// The captured operations are returned in post order.
fn collecting_posts<T>(loop_id: u64, f: impl FnOnce() -> T) -> (T, Vec<Operation>) {
    let outer = APPLYING.with(|slot| {
        slot.replace(Some(ApplyFrame {
            loop_id,
            posted: Vec::new(),
        }))
    });
    let out = f();
    let frame = APPLYING.with(|slot| slot.replace(outer));
    (out, frame.map(|frame| frame.posted).unwrap_or_default())
}

/// Hands `op` to the worker of `loop_id` if this thread is that worker and
/// it is applying an operation. Gives the operation back otherwise.
fn defer_if_applying(loop_id: u64, op: Operation) -> Option<Operation> {
    APPLYING.with(|slot| match slot.borrow_mut().as_mut() {
        Some(frame) if frame.loop_id == loop_id => {
            frame.posted.push(op);
            None
        }
        _ => Some(op),
    })
}

/// Cloneable producer side of a `Loop`. `Send + Sync`.
#[derive(Clone)]
pub struct LoopHandle {
    id: u64,
    tx: Sender<Envelope>,
    closed: Arc<AtomicBool>,
}

impl LoopHandle {
    /// Appends `op` to the mailbox. Never blocks.
    ///
    /// Called from inside an operation this loop is applying, `op` runs
    /// right after the calling operation finishes and before anything else
    /// in the current batch. It is never applied inline.
    pub fn post(&self, op: Operation) -> Result<(), LoopError> {
        let Some(op) = defer_if_applying(self.id, op) else {
            trace!("LoopHandle: follow-up posted from inside an operation");
            return Ok(());
        };
        self.send(Envelope::Apply(op))
    }

    /// Requests a new surface of `size` for subsequent operations.
    pub fn resize(&self, size: Size) -> Result<(), LoopError> {
        self.send(Envelope::Resize(size))
    }

    /// True once shutdown started or the worker terminated.
    pub fn is_stopped(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    fn send(&self, envelope: Envelope) -> Result<(), LoopError> {
        if self.is_stopped() {
            return Err(LoopError::Stopped);
        }
        self.tx.send(envelope).map_err(|_| LoopError::Stopped)
    }
}

impl fmt::Debug for LoopHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoopHandle")
            .field("id", &self.id)
            .field("stopped", &self.is_stopped())
            .finish()
    }
}

/// Owner of the worker thread. Dropping it stops the worker.
pub struct Loop {
    handle: LoopHandle,
    worker: Option<JoinHandle<Result<(), LoopError>>>,
}

impl Loop {
    /// Spawns the worker.
    ///
    /// Unless `config.lazy_surface` is set, the first surface is allocated
    /// here and a factory failure is returned as `LoopError::SurfaceAllocation`.
    pub fn start<F, R>(config: &LoopConfig, factory: F, receiver: R) -> Result<Self, LoopError>
    where
        F: SurfaceFactory + 'static,
        R: Receiver + 'static,
    {
        let surface = if config.lazy_surface {
            None
        } else {
            Some(
                factory
                    .new_surface(config.surface_size)
                    .map_err(LoopError::SurfaceAllocation)?,
            )
        };

        let (tx, rx) = mpsc::channel();
        let handle = LoopHandle {
            id: NEXT_LOOP_ID.fetch_add(1, Ordering::Relaxed),
            tx,
            closed: Arc::new(AtomicBool::new(false)),
        };

        let worker = Worker {
            loop_id: handle.id,
            mailbox: rx,
            factory: Box::new(factory),
            receiver: Box::new(receiver),
            surface,
            surface_size: config.surface_size,
            fault_policy: config.fault_policy,
            closed: Arc::clone(&handle.closed),
        };

        let join = thread::Builder::new()
            .name("painter-loop".to_string())
            .spawn(move || worker.run())
            .map_err(LoopError::Spawn)?;

        info!(
            "Loop: worker spawned (surface {}x{}, lazy={}, policy={:?})",
            config.surface_size.width,
            config.surface_size.height,
            config.lazy_surface,
            config.fault_policy
        );

        Ok(Self {
            handle,
            worker: Some(join),
        })
    }

    pub fn handle(&self) -> LoopHandle {
        self.handle.clone()
    }

    pub fn post(&self, op: Operation) -> Result<(), LoopError> {
        self.handle.post(op)
    }

    pub fn resize(&self, size: Size) -> Result<(), LoopError> {
        self.handle.resize(size)
    }

    /// Rejects further posts, waits until everything already queued has been
    /// applied, and joins the worker.
    ///
    /// Returns the fault that terminated the worker, if any. Calling it again
    /// afterwards returns `Ok(())`.
    pub fn stop_and_wait(&mut self) -> Result<(), LoopError> {
        let Some(worker) = self.worker.take() else {
            return Ok(());
        };

        info!("Loop: stop requested");
        self.handle.closed.store(true, Ordering::Release);
        if self.handle.tx.send(Envelope::Stop).is_err() {
            debug!("Loop: worker already exited");
        }

        match worker.join() {
            Ok(result) => result,
            Err(payload) => Err(LoopError::WorkerPanicked(panic_message(payload.as_ref()))),
        }
    }
}

impl Drop for Loop {
    fn drop(&mut self) {
        if let Err(e) = self.stop_and_wait() {
            error!("Loop: worker ended with error: {}", e);
        }
    }
}

/// State owned by the worker thread.
struct Worker {
    loop_id: u64,
    mailbox: mpsc::Receiver<Envelope>,
    factory: Box<dyn SurfaceFactory>,
    receiver: Box<dyn Receiver>,
    surface: Option<Box<dyn Surface>>,
    surface_size: Size,
    fault_policy: FaultPolicy,
    closed: Arc<AtomicBool>,
}

impl Worker {
    fn run(mut self) -> Result<(), LoopError> {
        info!("Loop worker: thread started");
        let result = self.process_batches();
        self.closed.store(true, Ordering::Release);
        match &result {
            Ok(()) => info!("Loop worker: thread stopped"),
            Err(e) => error!("Loop worker: terminated: {}", e),
        }
        result
    }

    fn process_batches(&mut self) -> Result<(), LoopError> {
        let mut batch = VecDeque::new();

        loop {
            let first = match self.mailbox.recv() {
                Ok(envelope) => envelope,
                Err(_) => {
                    info!("Loop worker: mailbox closed");
                    return Ok(());
                }
            };

            batch.clear();
            let mut stop = Self::enqueue(first, &mut batch);
            while !stop {
                match self.mailbox.try_recv() {
                    Ok(envelope) => stop = Self::enqueue(envelope, &mut batch),
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => stop = true,
                }
            }

            debug!(
                "Loop worker: applying batch of {} envelopes{}",
                batch.len(),
                if stop { " before stopping" } else { "" }
            );

            match self.apply_batch(&mut batch) {
                Ok(true) => self.publish()?,
                Ok(false) => {}
                Err(fault) => self.handle_fault(fault)?,
            }

            if stop {
                return Ok(());
            }
        }
    }

    /// Returns true when `envelope` ends the batch for good.
    fn enqueue(envelope: Envelope, batch: &mut VecDeque<Envelope>) -> bool {
        match envelope {
            Envelope::Stop => true,
            other => {
                batch.push_back(other);
                false
            }
        }
    }

    /// Applies the batch in order. Returns whether any operation was ready.
    fn apply_batch(&mut self, batch: &mut VecDeque<Envelope>) -> Result<bool, LoopError> {
        let mut ready = false;

        while let Some(envelope) = batch.pop_front() {
            match envelope {
                Envelope::Apply(op) => {
                    let loop_id = self.loop_id;
                    let surface = self.acquire_surface()?;
                    let (outcome, follow_ups) = collecting_posts(loop_id, || {
                        panic::catch_unwind(AssertUnwindSafe(|| op.apply(surface)))
                    });

                    match outcome {
                        Ok(op_ready) => ready |= op_ready,
                        Err(payload) => {
                            return Err(LoopError::OperationPanicked(panic_message(
                                payload.as_ref(),
                            )))
                        }
                    }

                    for follow_up in follow_ups.into_iter().rev() {
                        batch.push_front(Envelope::Apply(follow_up));
                    }
                }
                Envelope::Resize(size) => {
                    // The outgoing surface holds the ready frame.
                    if ready {
                        self.publish()?;
                        ready = false;
                    }
                    info!("Loop worker: resize to {}x{}", size.width, size.height);
                    self.surface_size = size;
                    self.surface = None;
                }
                Envelope::Stop => {}
            }
        }

        Ok(ready)
    }

    fn acquire_surface(&mut self) -> Result<&mut dyn Surface, LoopError> {
        let surface = match self.surface.take() {
            Some(surface) => surface,
            None => {
                debug!(
                    "Loop worker: allocating {}x{} surface",
                    self.surface_size.width, self.surface_size.height
                );
                self.factory
                    .new_surface(self.surface_size)
                    .map_err(LoopError::SurfaceAllocation)?
            }
        };
        Ok(self.surface.insert(surface).as_mut())
    }

    fn publish(&mut self) -> Result<(), LoopError> {
        self.acquire_surface()?;
        if let Some(surface) = self.surface.as_deref() {
            trace!("Loop worker: publishing surface");
            self.receiver.update(surface);
        }
        Ok(())
    }

    fn handle_fault(&self, fault: LoopError) -> Result<(), LoopError> {
        match (self.fault_policy, fault) {
            (FaultPolicy::SkipBatch, LoopError::OperationPanicked(msg)) => {
                warn!("Loop worker: operation panicked, batch dropped: {}", msg);
                Ok(())
            }
            (_, fault) => Err(fault),
        }
    }
}
