// src/lib.rs

//! Text-command raster painter.
//!
//! Scripts are compiled by [`lang::Parser`] into [`painter::Operation`]s,
//! which a [`painter::Loop`] applies to a [`surface::Surface`] on its own
//! worker thread before handing ready frames to a [`painter::Receiver`].

pub mod color;
pub mod config;
pub mod display;
pub mod geometry;
pub mod lang;
pub mod painter;
pub mod surface;
