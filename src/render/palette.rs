// RustPixel
// copyright zipxing@hotmail.com 2022～2025

//! 16 colour palettes and the readers for the palette segment layouts
//! shipped by the different platform data sets.

use crate::util::{read_be_u16, read_le_u16, read_le_u32};
use log::debug;
use serde::{Deserialize, Serialize};
use std::rc::Rc;

pub const PALETTE_SIZE: usize = 16;
/// Palette numbers at or above this are ignored
pub const PALETTE_COUNT: u8 = 32;
/// Entry blended into wide pages by the translucent span writer
pub const ALPHA_COLOR_INDEX: usize = 12;

const EGA_OFFSET: usize = 1024;
const WIN31_COLOR_TABLE: usize = 0xC04;

pub const PALETTE_EGA: [[u8; 3]; 16] = [
    [0x00, 0x00, 0x00],
    [0x00, 0x00, 0xAA],
    [0x00, 0xAA, 0x00],
    [0x00, 0xAA, 0xAA],
    [0xAA, 0x00, 0x00],
    [0xAA, 0x00, 0xAA],
    [0xAA, 0x55, 0x00],
    [0xAA, 0xAA, 0xAA],
    [0x55, 0x55, 0x55],
    [0x55, 0x55, 0xFF],
    [0x55, 0xFF, 0x55],
    [0x55, 0xFF, 0xFF],
    [0xFF, 0x55, 0x55],
    [0xFF, 0x55, 0xFF],
    [0xFF, 0xFF, 0x55],
    [0xFF, 0xFF, 0xFF],
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn rgb555(&self) -> u16 {
        (((self.r >> 3) as u16) << 10) | (((self.g >> 3) as u16) << 5) | (self.b >> 3) as u16
    }

    /// Expands a 15 bit pixel, bit 15 is ignored
    pub fn from_rgb555(c: u16) -> Self {
        let expand = |v: u16| -> u8 {
            let v = (v & 31) as u8;
            (v << 3) | (v >> 2)
        };
        Self::new(expand(c >> 10), expand(c >> 5), expand(c))
    }

    fn from_nibbles(c: u16) -> Self {
        let expand = |v: u16| -> u8 {
            let v = (v & 0xF) as u8;
            (v << 4) | v
        };
        Self::new(expand(c >> 8), expand(c >> 4), expand(c))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Palette {
    pub colors: [Color; PALETTE_SIZE],
}

impl Palette {
    pub fn new(colors: [Color; PALETTE_SIZE]) -> Self {
        Self { colors }
    }

    /// Overwrites the first `colors.len()` entries, at most 16
    pub fn set_colors(&mut self, colors: &[Color]) {
        let n = colors.len().min(PALETTE_SIZE);
        self.colors[..n].copy_from_slice(&colors[..n]);
    }

    pub fn get(&self, index: u8) -> Color {
        self.colors[index as usize & 0xF]
    }

    pub fn rgb555(&self, index: u8) -> u16 {
        self.get(index).rgb555()
    }

    pub fn alpha_rgb555(&self) -> u16 {
        self.colors[ALPHA_COLOR_INDEX].rgb555()
    }

    /// r,g,b triples, 48 bytes
    pub fn to_bytes(&self) -> Vec<u8> {
        self.colors.iter().flat_map(|c| [c.r, c.g, c.b]).collect()
    }
}

/// Byte layout of the palette segment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaletteFormat {
    /// Amiga and DOS VGA, big endian 0x0RGB words
    #[default]
    Amiga,
    /// DOS EGA table stored after the VGA one
    Ega,
    /// little endian indices into a 32 bit colour table
    Win31,
    /// big endian RGB555 words
    ThreeDo,
}

/// Palette segment owned by the resource loader
#[derive(Debug, Clone)]
pub struct PaletteBank {
    data: Rc<[u8]>,
    format: PaletteFormat,
}

impl PaletteBank {
    pub fn new(data: Rc<[u8]>, format: PaletteFormat) -> Self {
        Self { data, format }
    }

    pub fn format(&self) -> PaletteFormat {
        self.format
    }

    /// Reads palette `num`, None when out of range or the segment is short
    pub fn read(&self, num: u8) -> Option<Palette> {
        if num >= PALETTE_COUNT {
            return None;
        }
        let base = num as usize * PALETTE_SIZE * 2;
        let mut pal = Palette::default();
        for (i, c) in pal.colors.iter_mut().enumerate() {
            let p = base + i * 2;
            *c = match self.format {
                PaletteFormat::Amiga => Color::from_nibbles(read_be_u16(&self.data, p)?),
                PaletteFormat::Ega => {
                    let w = read_be_u16(&self.data, p + EGA_OFFSET)?;
                    let [r, g, b] = PALETTE_EGA[((w >> 12) & 15) as usize];
                    Color::new(r, g, b)
                }
                PaletteFormat::Win31 => {
                    let index = read_le_u16(&self.data, p)? as usize;
                    let c = read_le_u32(&self.data, WIN31_COLOR_TABLE + index * 4)?;
                    Color::new(c as u8, (c >> 8) as u8, (c >> 16) as u8)
                }
                PaletteFormat::ThreeDo => Color::from_rgb555(read_be_u16(&self.data, p)?),
            };
        }
        debug!("read palette {} ({:?})", num, self.format);
        Some(pal)
    }
}
