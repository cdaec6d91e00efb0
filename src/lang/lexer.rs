// src/lang/lexer.rs

//! Turns one command line into an `Instruction`.
//!
//! Lines are whitespace-delimited: an instruction name followed by integer
//! arguments. Arity is exact.

use super::error::CommandError;

/// A single decoded command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    White,
    Green,
    BgRect { x1: i32, y1: i32, x2: i32, y2: i32 },
    Figure { x: i32, y: i32 },
    Move { dx: i32, dy: i32 },
    Reset,
    Update,
}

/// What a line contributes before it is decoded.
#[derive(Debug, PartialEq, Eq)]
pub(super) enum Line<'a> {
    /// Blank or `#` comment.
    Skip,
    Command(&'a str),
}

pub(super) fn classify(raw: &str) -> Line<'_> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        Line::Skip
    } else {
        Line::Command(trimmed)
    }
}

impl Instruction {
    /// Decodes a non-blank, non-comment line.
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let mut fields = line.split_whitespace();
        let name = fields.next().unwrap_or_default();
        let args: Vec<&str> = fields.collect();

        match name {
            "white" => no_args("white", &args).map(|()| Instruction::White),
            "green" => no_args("green", &args).map(|()| Instruction::Green),
            "reset" => no_args("reset", &args).map(|()| Instruction::Reset),
            "update" => no_args("update", &args).map(|()| Instruction::Update),
            "bgrect" => {
                let [x1, y1, x2, y2] = int_args::<4>("bgrect", &args)?;
                Ok(Instruction::BgRect { x1, y1, x2, y2 })
            }
            "figure" => {
                let [x, y] = int_args::<2>("figure", &args)?;
                Ok(Instruction::Figure { x, y })
            }
            "move" => {
                let [dx, dy] = int_args::<2>("move", &args)?;
                Ok(Instruction::Move { dx, dy })
            }
            other => Err(CommandError::UnknownInstruction(other.to_string())),
        }
    }
}

fn no_args(instruction: &'static str, args: &[&str]) -> Result<(), CommandError> {
    int_args::<0>(instruction, args).map(|_| ())
}

fn int_args<const N: usize>(
    instruction: &'static str,
    args: &[&str],
) -> Result<[i32; N], CommandError> {
    if args.len() != N {
        return Err(CommandError::WrongArity {
            instruction,
            expected: N,
            got: args.len(),
        });
    }

    let mut values = [0i32; N];
    for (position, (slot, raw)) in values.iter_mut().zip(args).enumerate() {
        *slot = raw.parse().map_err(|_| CommandError::InvalidInteger {
            instruction,
            position,
            value: (*raw).to_string(),
        })?;
    }
    Ok(values)
}
