// src/lang/mod.rs

//! Text command language.
//!
//! One instruction per line; blank lines and `#` comments are ignored.
//!
//! | command  | args          |
//! |----------|---------------|
//! | `white`  |               |
//! | `green`  |               |
//! | `bgrect` | x1 y1 x2 y2   |
//! | `figure` | x y           |
//! | `move`   | dx dy         |
//! | `reset`  |               |
//! | `update` |               |

mod error;
mod lexer;
mod parser;

pub use error::{CommandError, ParseError};
pub use lexer::Instruction;
pub use parser::Parser;

#[cfg(test)]
mod tests;
