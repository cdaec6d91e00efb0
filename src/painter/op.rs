// src/painter/op.rs

//! Drawing operations applied by the scheduling loop.
//!
//! Every variant shares one capability: `apply` mutates a surface and
//! reports whether the surface should now be considered presentable.
//! The set is closed so the loop's readiness check stays a total `match`.

use crate::color::{Rgba, BG_RECT_FILL, DEFAULT_FIGURE_COLOR, RESET_FILL};
use crate::geometry::{Point, Rect};
use crate::surface::Surface;
use log::trace;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Half-width of a figure's horizontal bar.
const FIGURE_BAR_HALF_WIDTH: i32 = 200;
/// Height of the horizontal bar, which hangs below the center point.
const FIGURE_BAR_HEIGHT: i32 = 100;
/// The vertical bar spans `[x - 62, x + 63)`.
const FIGURE_STEM_LEFT: i32 = 62;
const FIGURE_STEM_RIGHT: i32 = 63;
/// Height of the vertical bar, which rises above the center point.
const FIGURE_STEM_HEIGHT: i32 = 200;

/// A unit of surface-mutating work.
#[derive(Debug, Clone)]
pub enum Operation {
    /// Paints the whole surface a solid color.
    Fill(Rgba),
    /// Paints an axis-aligned rectangle in the background color.
    BgRect(BgRect),
    /// Draws a shared figure at its current position.
    Figure(FigureHandle),
    /// Translates a captured group of figures.
    Move(Move),
    /// Fills the whole surface with the reset color.
    Reset,
    /// Changes nothing; marks the surface as ready.
    Update,
    /// Applies its members in order.
    Batch(OperationBatch),
    /// Runs a caller-supplied closure. Never reports ready.
    Func(OperationFn),
}

/// Fieldless discriminant of an `Operation`, for logging and assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Fill,
    BgRect,
    Figure,
    Move,
    Reset,
    Update,
    Batch,
    Func,
}

impl Operation {
    /// Wraps a closure as an operation.
    pub fn func<F>(f: F) -> Self
    where
        F: Fn(&mut dyn Surface) + Send + Sync + 'static,
    {
        Operation::Func(OperationFn::new(f))
    }

    pub fn kind(&self) -> OperationKind {
        match self {
            Operation::Fill(_) => OperationKind::Fill,
            Operation::BgRect(_) => OperationKind::BgRect,
            Operation::Figure(_) => OperationKind::Figure,
            Operation::Move(_) => OperationKind::Move,
            Operation::Reset => OperationKind::Reset,
            Operation::Update => OperationKind::Update,
            Operation::Batch(_) => OperationKind::Batch,
            Operation::Func(_) => OperationKind::Func,
        }
    }

    /// Applies the operation to `surface`, returning true when the surface
    /// should be published afterwards.
    pub fn apply(&self, surface: &mut dyn Surface) -> bool {
        trace!("apply {:?}", self.kind());
        match self {
            Operation::Fill(color) => {
                let bounds = surface.bounds();
                surface.fill(bounds, *color);
                false
            }
            Operation::BgRect(rect) => {
                rect.draw(surface);
                false
            }
            Operation::Figure(figure) => {
                figure.draw(surface);
                false
            }
            Operation::Move(mv) => {
                mv.run();
                false
            }
            Operation::Reset => {
                let bounds = surface.bounds();
                surface.fill(bounds, RESET_FILL);
                false
            }
            Operation::Update => true,
            Operation::Batch(batch) => batch.apply(surface),
            Operation::Func(f) => {
                (f.0)(surface);
                false
            }
        }
    }
}

impl From<BgRect> for Operation {
    fn from(rect: BgRect) -> Self {
        Operation::BgRect(rect)
    }
}

impl From<FigureHandle> for Operation {
    fn from(figure: FigureHandle) -> Self {
        Operation::Figure(figure)
    }
}

impl From<Move> for Operation {
    fn from(mv: Move) -> Self {
        Operation::Move(mv)
    }
}

impl From<OperationBatch> for Operation {
    fn from(batch: OperationBatch) -> Self {
        Operation::Batch(batch)
    }
}

/// Closure payload of `Operation::Func`.
#[derive(Clone)]
pub struct OperationFn(Arc<dyn Fn(&mut dyn Surface) + Send + Sync>);

impl OperationFn {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&mut dyn Surface) + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }
}

impl fmt::Debug for OperationFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("OperationFn(..)")
    }
}

/// Rectangle given by two opposite corners in any order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BgRect {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl BgRect {
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// The normalized rectangle, before clipping.
    pub fn rect(&self) -> Rect {
        Rect::from_corners(Point::new(self.x1, self.y1), Point::new(self.x2, self.y2))
    }

    fn draw(&self, surface: &mut dyn Surface) {
        let clipped = self.rect().intersect(&surface.bounds());
        if clipped.is_empty() {
            trace!("BgRect {:?} clipped away", self);
            return;
        }
        surface.fill(clipped, BG_RECT_FILL);
    }
}

/// A cross-shaped mark centered at (x, y).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Figure {
    pub x: i32,
    pub y: i32,
    /// Transparent means "use the default figure color".
    pub color: Rgba,
}

impl Figure {
    pub fn new(x: i32, y: i32, color: Rgba) -> Self {
        Self { x, y, color }
    }

    pub fn effective_color(&self) -> Rgba {
        if self.color.is_transparent() {
            DEFAULT_FIGURE_COLOR
        } else {
            self.color
        }
    }

    /// Horizontal bar, hanging below the center.
    pub fn bar(&self) -> Rect {
        Rect::new(
            self.x.saturating_sub(FIGURE_BAR_HALF_WIDTH),
            self.y,
            self.x.saturating_add(FIGURE_BAR_HALF_WIDTH),
            self.y.saturating_add(FIGURE_BAR_HEIGHT),
        )
    }

    /// Vertical bar, rising above the center.
    pub fn stem(&self) -> Rect {
        Rect::new(
            self.x.saturating_sub(FIGURE_STEM_LEFT),
            self.y.saturating_sub(FIGURE_STEM_HEIGHT),
            self.x.saturating_add(FIGURE_STEM_RIGHT),
            self.y,
        )
    }
}

/// Shared handle to a figure.
///
/// Clones alias the same figure: a `Move` built from a clone translates the
/// figure every other holder will draw.
#[derive(Debug, Clone)]
pub struct FigureHandle(Arc<Mutex<Figure>>);

impl FigureHandle {
    pub fn new(figure: Figure) -> Self {
        Self(Arc::new(Mutex::new(figure)))
    }

    /// Current state of the figure.
    pub fn get(&self) -> Figure {
        *self.lock()
    }

    /// Moves the figure by (dx, dy), saturating at the `i32` range.
    pub fn translate(&self, dx: i32, dy: i32) {
        let mut figure = self.lock();
        figure.x = figure.x.saturating_add(dx);
        figure.y = figure.y.saturating_add(dy);
    }

    /// True when both handles point at the same figure.
    pub fn same_figure(&self, other: &FigureHandle) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    fn draw(&self, surface: &mut dyn Surface) {
        let figure = self.get();
        let color = figure.effective_color();
        let bounds = surface.bounds();

        for part in [figure.bar(), figure.stem()] {
            if part.overlaps(&bounds) {
                surface.fill(part, color);
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, Figure> {
        // A figure is plain data; a panic mid-translate cannot leave it torn.
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Translates a fixed group of figures by (dx, dy) each time it runs.
#[derive(Debug, Clone)]
pub struct Move {
    pub dx: i32,
    pub dy: i32,
    figures: Vec<FigureHandle>,
}

impl Move {
    pub fn new(dx: i32, dy: i32, figures: Vec<FigureHandle>) -> Self {
        Self { dx, dy, figures }
    }

    pub fn figures(&self) -> &[FigureHandle] {
        &self.figures
    }

    fn run(&self) {
        for figure in &self.figures {
            figure.translate(self.dx, self.dy);
        }
    }
}

/// Ordered list of operations, some of which may be absent.
#[derive(Debug, Clone, Default)]
pub struct OperationBatch(Vec<Option<Operation>>);

impl OperationBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, op: impl Into<Option<Operation>>) {
        self.0.push(op.into());
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Operation> {
        self.0.iter().flatten()
    }

    /// Applies every present member in order; ready if any member was.
    pub fn apply(&self, surface: &mut dyn Surface) -> bool {
        let mut ready = false;
        for op in self.iter() {
            ready |= op.apply(surface);
        }
        ready
    }
}

impl From<Vec<Option<Operation>>> for OperationBatch {
    fn from(ops: Vec<Option<Operation>>) -> Self {
        Self(ops)
    }
}

impl FromIterator<Operation> for OperationBatch {
    fn from_iter<I: IntoIterator<Item = Operation>>(iter: I) -> Self {
        Self(iter.into_iter().map(Some).collect())
    }
}
