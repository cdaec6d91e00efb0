// src/lang/error.rs

//! Errors produced while compiling a command stream.

use std::fmt;
use std::io;

/// Problem with a single command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    UnknownInstruction(String),
    WrongArity {
        instruction: &'static str,
        expected: usize,
        got: usize,
    },
    InvalidInteger {
        instruction: &'static str,
        /// Zero-based argument position.
        position: usize,
        value: String,
    },
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::UnknownInstruction(name) => write!(f, "unknown instruction '{}'", name),
            CommandError::WrongArity {
                instruction,
                expected,
                got,
            } => write!(
                f,
                "{} expects {} argument(s), got {}",
                instruction, expected, got
            ),
            CommandError::InvalidInteger {
                instruction,
                position,
                value,
            } => write!(
                f,
                "{}: argument {} is not an integer: '{}'",
                instruction,
                position + 1,
                value
            ),
        }
    }
}

impl std::error::Error for CommandError {}

/// Error returned by `Parser::parse`. Always aborts the whole pass.
#[derive(Debug)]
pub enum ParseError {
    /// No input source was supplied.
    NoInput,
    /// Reading the source failed at `line` (1-based).
    Read { line: usize, source: io::Error },
    /// `line` (1-based) holds an invalid command.
    Command { line: usize, error: CommandError },
}

impl ParseError {
    /// 1-based line the error refers to, if any.
    pub fn line(&self) -> Option<usize> {
        match self {
            ParseError::NoInput => None,
            ParseError::Read { line, .. } | ParseError::Command { line, .. } => Some(*line),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::NoInput => write!(f, "no input source"),
            ParseError::Read { line, source } => write!(f, "line {}: read failed: {}", line, source),
            ParseError::Command { line, error } => write!(f, "line {}: {}", line, error),
        }
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ParseError::NoInput => None,
            ParseError::Read { source, .. } => Some(source),
            ParseError::Command { error, .. } => Some(error),
        }
    }
}
