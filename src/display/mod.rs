// src/display/mod.rs

//! Receivers that present published surfaces.

pub mod headless;

pub use headless::HeadlessDisplay;
