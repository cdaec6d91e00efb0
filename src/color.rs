// src/color.rs

//! Pixel color type and the fixed palette used by drawing operations.

use serde::{Deserialize, Serialize};

/// RGBA color in 32-bit format (8 bits per channel)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba::opaque(255, 255, 255);
    pub const GREEN: Rgba = Rgba::opaque(0, 255, 0);
    pub const BLACK: Rgba = Rgba::opaque(0, 0, 0);
    pub const BLUE: Rgba = Rgba::opaque(0, 0, 255);
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// A color with zero alpha carries no paint and is treated as "unset".
    pub const fn is_transparent(&self) -> bool {
        self.a == 0
    }

    /// Convert to RGBA byte array
    pub fn to_bytes(&self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    pub fn from_bytes(bytes: [u8; 4]) -> Self {
        let [r, g, b, a] = bytes;
        Self { r, g, b, a }
    }
}

/// Fill used by the `white` command.
pub const WHITE_FILL: Rgba = Rgba::WHITE;
/// Fill used by the `green` command.
pub const GREEN_FILL: Rgba = Rgba::GREEN;
/// Fill used when the surface is reset.
pub const RESET_FILL: Rgba = Rgba::BLACK;
/// Fill used for background rectangles.
pub const BG_RECT_FILL: Rgba = Rgba::BLACK;
/// Color used for figures whose own color is unset.
pub const DEFAULT_FIGURE_COLOR: Rgba = Rgba::BLUE;
