// RustPixel
// copyright zipxing@hotmail.com 2022～2025

//! pixel_vector renders the vector graphics of early 90s 320x200 games in
//! software. Shapes are decoded from their byte streams into quad strips,
//! filled into one of four pages and presented through a 16 colour
//! palette, or as RGB555 pages for high colour data.
//!
//! Pages can be larger than 320x200, drawing commands keep using the 320x200
//! design space and are scaled on the way in.
//!
//! Modules init, log, render and util are offered. The `base` feature
//! builds without file logging and png capture, which is a good fit for
//! wasm or embedding into another frontend.

/// width of the design space
pub const GFX_W: usize = 320;
/// height of the design space
pub const GFX_H: usize = 200;

pub mod init;
pub mod log;
pub mod render;
pub mod util;
