// RustPixel
// copyright zipxing@hotmail.com 2022～2025

//! Per-format pixel primitives.
//!
//! The rasterizer and the graphics backend are generic over `PixelOps`, so
//! the indexed and the RGB555 page layouts share one control flow and only
//! differ in how a span is filled or blended.

use crate::render::palette::Palette;

/// Marker bit or'ed into indexed pixels by the translucent writer
pub const CLUT_ALPHA_BIT: u8 = 8;

const RB_MASK: u16 = 0x7C1F;
const G_MASK: u16 = 0x03E0;
/// Set on blended 555 pixels, a pixel is blended at most once
const BLENDED: u16 = 0x8000;

pub trait PixelOps {
    const BYTE_DEPTH: usize;

    /// Raw pixel value written for palette colour `color`
    fn solid_value(palette: &Palette, color: u8) -> u16;

    /// Writes `value` to every pixel of `dst`
    fn fill_span(dst: &mut [u8], value: u16);

    /// Translucent blend of every pixel of `dst`
    fn blend_span(dst: &mut [u8], palette: &Palette);
}

pub struct Clut8;

impl PixelOps for Clut8 {
    const BYTE_DEPTH: usize = 1;

    fn solid_value(_palette: &Palette, color: u8) -> u16 {
        color as u16
    }

    fn fill_span(dst: &mut [u8], value: u16) {
        dst.fill(value as u8);
    }

    fn blend_span(dst: &mut [u8], _palette: &Palette) {
        for p in dst.iter_mut() {
            *p |= CLUT_ALPHA_BIT;
        }
    }
}

pub struct Rgb555;

impl PixelOps for Rgb555 {
    const BYTE_DEPTH: usize = 2;

    fn solid_value(palette: &Palette, color: u8) -> u16 {
        palette.rgb555(color)
    }

    fn fill_span(dst: &mut [u8], value: u16) {
        let b = value.to_le_bytes();
        for px in dst.chunks_exact_mut(2) {
            px.copy_from_slice(&b);
        }
    }

    fn blend_span(dst: &mut [u8], palette: &Palette) {
        let color = palette.alpha_rgb555();
        for px in dst.chunks_exact_mut(2) {
            let a = u16::from_le_bytes([px[0], px[1]]);
            px.copy_from_slice(&blend_rgb555(a, color).to_le_bytes());
        }
    }
}

/// Averages each channel of `a` with `b` unless `a` is already blended
pub fn blend_rgb555(a: u16, b: u16) -> u16 {
    if a & BLENDED != 0 {
        return a;
    }
    BLENDED
        | ((((a & RB_MASK) + (b & RB_MASK)) >> 1) & RB_MASK)
        | ((((a & G_MASK) + (b & G_MASK)) >> 1) & G_MASK)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::palette::{Color, ALPHA_COLOR_INDEX};

    #[test]
    fn blend_averages_once() {
        let white = 0x7FFF;
        let once = blend_rgb555(0, white);
        assert_eq!(once, 0x8000 | 0x3C0F | 0x01E0);
        assert_eq!(blend_rgb555(once, white), once);
    }

    #[test]
    fn clut_alpha_sets_marker_bit() {
        let mut span = [1u8, 8, 0x13];
        Clut8::blend_span(&mut span, &Palette::default());
        assert_eq!(span, [9, 8, 0x1B]);
    }

    #[test]
    fn wide_spans_use_palette() {
        let mut pal = Palette::default();
        pal.colors[3] = Color::new(0xFF, 0, 0);
        pal.colors[ALPHA_COLOR_INDEX] = Color::new(0, 0, 0xFF);
        let v = Rgb555::solid_value(&pal, 3);
        assert_eq!(v, 0x7C00);
        let mut span = [0u8; 4];
        Rgb555::fill_span(&mut span, v);
        assert_eq!(span, [0x00, 0x7C, 0x00, 0x7C]);
        Rgb555::blend_span(&mut span, &pal);
        let px = u16::from_le_bytes([span[0], span[1]]);
        assert_eq!(px, 0x8000 | 0x3C00 | 0x000F);
    }
}
