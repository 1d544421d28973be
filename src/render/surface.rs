// RustPixel
// copyright zipxing@hotmail.com 2022～2025

//! Presentation side: the frame handed out on present, the surface that
//! receives it and the one-shot still capture.

use crate::render::error::Result;
use crate::render::palette::{Color, Palette};
#[cfg(capture_support)]
use crate::render::error::DrawError;
#[cfg(capture_support)]
use log::info;
#[cfg(capture_support)]
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramePixels<'a> {
    /// palette indices, one byte per pixel
    Clut { indices: &'a [u8], palette: Palette },
    /// little endian RGB555 words
    Rgb555(&'a [u8]),
}

/// Borrowed view of one page at present time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame<'a> {
    pub width: usize,
    pub height: usize,
    pub pixels: FramePixels<'a>,
}

impl Frame<'_> {
    /// Packed r,g,b bytes, row major
    pub fn to_rgb8(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.width * self.height * 3);
        match self.pixels {
            FramePixels::Clut { indices, palette } => {
                for &i in indices {
                    let c = palette.get(i);
                    out.extend_from_slice(&[c.r, c.g, c.b]);
                }
            }
            FramePixels::Rgb555(words) => {
                for px in words.chunks_exact(2) {
                    let c = Color::from_rgb555(u16::from_le_bytes([px[0], px[1]]));
                    out.extend_from_slice(&[c.r, c.g, c.b]);
                }
            }
        }
        out
    }
}

/// External presentation target
pub trait Surface {
    fn set_frame(&mut self, frame: &Frame);
    fn update(&mut self) {}
}

/// Keeps the last presented frame in memory
#[derive(Debug, Clone, Default)]
pub struct MemorySurface {
    pub width: usize,
    pub height: usize,
    pub rgb: Vec<u8>,
    pub presented: usize,
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<[u8; 3]> {
        let i = (y * self.width + x) * 3;
        let p = self.rgb.get(i..i + 3)?;
        Some([p[0], p[1], p[2]])
    }
}

impl Surface for MemorySurface {
    fn set_frame(&mut self, frame: &Frame) {
        self.width = frame.width;
        self.height = frame.height;
        self.rgb = frame.to_rgb8();
    }

    fn update(&mut self) {
        self.presented += 1;
    }
}

/// Receives the frame when a still capture is pending
pub trait FrameCapture {
    fn capture(&mut self, frame: &Frame, num: u32) -> Result<()>;
}

/// Writes `screenshot-N.png` files
#[cfg(capture_support)]
#[derive(Debug, Clone)]
pub struct PngCapture {
    dir: PathBuf,
}

#[cfg(capture_support)]
impl PngCapture {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self, num: u32) -> PathBuf {
        self.dir.join(format!("screenshot-{}.png", num))
    }
}

#[cfg(capture_support)]
impl FrameCapture for PngCapture {
    fn capture(&mut self, frame: &Frame, num: u32) -> Result<()> {
        let path = self.path(num);
        image::save_buffer(
            &path,
            &frame.to_rgb8(),
            frame.width as u32,
            frame.height as u32,
            image::ColorType::Rgb8,
        )
        .map_err(|e| DrawError::Capture(e.to_string()))?;
        info!("Written '{}'", path.display());
        Ok(())
    }
}
