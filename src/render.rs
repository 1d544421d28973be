// RustPixel
// copyright zipxing@hotmail.com 2022～2025

//! # Render module
//!
//! Software renderer for 320x200 vector games: four pages, quad-strip
//! polygons, a 16 colour palette and a presentation step.
//!
//! ## Submodules
//! - `page`: the four framebuffers and page references
//! - `palette`: 16 entry palettes and the palette segment formats
//! - `pixfmt`: indexed and RGB555 pixel operations
//! - `raster`: quad-strip scanline fill, points and outlines
//! - `graphics`: design-space scaling, glyphs, sprites and page copies
//! - `shape`: shape stream decoder
//! - `surface`: frames, presentation surfaces and still capture
//! - `video`: page aliases, deferred palette switch and present

pub mod error;
pub mod graphics;
pub mod page;
pub mod palette;
pub mod pixfmt;
pub mod raster;
pub mod shape;
pub mod surface;
pub mod video;

pub use error::{DrawError, Result};
pub use graphics::{BitmapFormat, Graphics};
pub use page::{PageRef, PageStore, PixelFormat};
pub use palette::{Color, Palette, PaletteBank, PaletteFormat};
pub use raster::{ColorToken, QuadStrip};
pub use shape::{ShapeCanvas, ShapeDecoder, ShapeFormat};
pub use surface::{Frame, FrameCapture, FramePixels, MemorySurface, Surface};
#[cfg(capture_support)]
pub use surface::PngCapture;
pub use video::{CopySource, Video};
