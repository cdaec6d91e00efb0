// src/lang/parser.rs

//! Compiles a command stream into drawing operations.
//!
//! Each `parse` call is one compilation pass. Commands only update the
//! parser's state; the operation list is built at end of input in a fixed
//! order:
//!
//! ```text
//! background fill  →  [background rect]  →  moves  →  figures  →  [update]
//! ```
//!
//! A `move` captures the figures declared before it, so it repositions
//! existing figures and never touches figures declared later.

use super::error::ParseError;
use super::lexer::{classify, Instruction, Line};
use crate::color::{Rgba, DEFAULT_FIGURE_COLOR, GREEN_FILL, WHITE_FILL};
use crate::painter::{BgRect, Figure, FigureHandle, Move, Operation};
use log::{debug, trace};
use std::io::{BufRead, BufReader, Read};

/// Background selected by `white`, `green` or `reset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Background {
    /// Full-surface reset.
    #[default]
    Reset,
    Solid(Rgba),
}

impl Background {
    fn operation(self) -> Operation {
        match self {
            Background::Reset => Operation::Reset,
            Background::Solid(color) => Operation::Fill(color),
        }
    }
}

/// Everything a pass accumulates.
#[derive(Debug, Clone, Default)]
struct State {
    background: Background,
    bg_rect: Option<BgRect>,
    figures: Vec<FigureHandle>,
    moves: Vec<Move>,
    update: bool,
}

impl State {
    fn execute(&mut self, instruction: Instruction) {
        trace!("Parser: {:?}", instruction);
        match instruction {
            Instruction::White => self.background = Background::Solid(WHITE_FILL),
            Instruction::Green => self.background = Background::Solid(GREEN_FILL),
            Instruction::BgRect { x1, y1, x2, y2 } => {
                self.bg_rect = Some(BgRect::new(x1, y1, x2, y2));
            }
            Instruction::Figure { x, y } => {
                self.figures
                    .push(FigureHandle::new(Figure::new(x, y, DEFAULT_FIGURE_COLOR)));
            }
            Instruction::Move { dx, dy } => {
                self.moves.push(Move::new(dx, dy, self.figures.clone()));
            }
            Instruction::Reset => *self = State::default(),
            Instruction::Update => self.update = true,
        }
    }

    /// Emits the pass result. Moves are consumed; everything else stays.
    fn compile(&mut self) -> Vec<Operation> {
        let mut ops = Vec::with_capacity(
            1 + usize::from(self.bg_rect.is_some())
                + self.moves.len()
                + self.figures.len()
                + usize::from(self.update),
        );

        ops.push(self.background.operation());
        if let Some(rect) = self.bg_rect {
            ops.push(Operation::BgRect(rect));
        }
        ops.extend(self.moves.drain(..).map(Operation::Move));
        ops.extend(self.figures.iter().cloned().map(Operation::Figure));
        if self.update {
            ops.push(Operation::Update);
        }
        ops
    }
}

/// Stateful command compiler.
///
/// Background, background rectangle and declared figures carry over to the
/// next `parse` call on the same instance until a `reset` line; moves are
/// emitted once, and the update request never carries over.
#[derive(Debug, Default)]
pub struct Parser {
    state: State,
}

impl Parser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compiles one pass from `input`.
    ///
    /// On error nothing is emitted and the parser state is left as it was
    /// before the call.
    pub fn parse<R: Read>(&mut self, input: R) -> Result<Vec<Operation>, ParseError> {
        let mut next = self.state.clone();
        next.update = false;

        let reader = BufReader::new(input);
        for (idx, line) in reader.lines().enumerate() {
            let line_number = idx + 1;
            let line = line.map_err(|source| ParseError::Read {
                line: line_number,
                source,
            })?;

            let Line::Command(command) = classify(&line) else {
                continue;
            };
            let instruction = Instruction::parse(command).map_err(|error| ParseError::Command {
                line: line_number,
                error,
            })?;
            next.execute(instruction);
        }

        let ops = next.compile();
        debug!("Parser: compiled {} operations", ops.len());
        self.state = next;
        Ok(ops)
    }

    /// Like `parse`, for callers whose source may be absent.
    pub fn parse_source<R: Read>(&mut self, input: Option<R>) -> Result<Vec<Operation>, ParseError> {
        match input {
            Some(input) => self.parse(input),
            None => Err(ParseError::NoInput),
        }
    }

    pub fn parse_str(&mut self, script: &str) -> Result<Vec<Operation>, ParseError> {
        self.parse(script.as_bytes())
    }

    /// Figures currently declared, in declaration order.
    pub fn figures(&self) -> &[FigureHandle] {
        &self.state.figures
    }
}
