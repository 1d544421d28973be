// RustPixel
// copyright zipxing@hotmail.com 2022～2025

//! Software graphics backend.
//!
//! Owns the page store and the active palette, and maps every drawing call
//! from the 320x200 design space to page coordinates before handing it to
//! the rasterizer of the configured pixel format.

use crate::render::error::{DrawError, Result};
use crate::render::page::{PageStore, PixelFormat};
use crate::render::palette::{Color, Palette};
use crate::render::pixfmt::{Clut8, PixelOps, Rgb555};
use crate::render::raster::{ColorToken, QuadStrip, Rasterizer};
use crate::render::surface::{Frame, FramePixels};
use crate::util::{read_be_u16, scale_factor, PointI16};
use crate::{GFX_H, GFX_W};
use log::debug;
use std::rc::Rc;

const FONT_GLYPH_SIZE: usize = 8;

/// Runs `$body` with `$r` bound to a rasterizer for `$page` in the page
/// store's pixel format
macro_rules! rasterize {
    ($gfx:expr, $page:expr, |$r:ident| $body:expr) => {
        match $gfx.pages.format() {
            PixelFormat::Clut => {
                let mut $r = Rasterizer::<Clut8>::new(&mut $gfx.pages, $page, &$gfx.palette);
                $body
            }
            PixelFormat::Rgb555 => {
                let mut $r = Rasterizer::<Rgb555>::new(&mut $gfx.pages, $page, &$gfx.palette);
                $body
            }
        }
    };
}

/// Layout of a whole-page bitmap blit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitmapFormat {
    Clut,
    Rgb555,
}

/// 1991 edition mask sprites
#[derive(Debug, Clone)]
struct SpriteMasks {
    data: Rc<[u8]>,
    offsets: Vec<usize>,
}

pub struct Graphics {
    pub pages: PageStore,
    pub palette: Palette,
    u: i32,
    v: i32,
    font: Option<Vec<u8>>,
    sprites: Option<SpriteMasks>,
}

impl Graphics {
    pub fn new(width: usize, height: usize, format: PixelFormat) -> Self {
        Self {
            pages: PageStore::new(width, height, format),
            palette: Palette::default(),
            u: scale_factor(width, GFX_W),
            v: scale_factor(height, GFX_H),
            font: None,
            sprites: None,
        }
    }

    /// Reallocates the pages, their content is lost
    pub fn resize(&mut self, width: usize, height: usize) {
        self.pages.resize(width, height);
        self.u = scale_factor(width, GFX_W);
        self.v = scale_factor(height, GFX_H);
    }

    pub fn width(&self) -> usize {
        self.pages.width()
    }

    pub fn height(&self) -> usize {
        self.pages.height()
    }

    fn is_design_size(&self) -> bool {
        self.pages.width() == GFX_W && self.pages.height() == GFX_H
    }

    pub fn x_scale(&self, x: i32) -> i32 {
        ((x as i64 * self.u as i64) >> 16) as i32
    }

    pub fn y_scale(&self, y: i32) -> i32 {
        ((y as i64 * self.v as i64) >> 16) as i32
    }

    fn scale_point(&self, mut pt: PointI16) -> PointI16 {
        if !self.is_design_size() {
            pt.scale(self.u, self.v);
        }
        pt
    }

    pub fn set_palette(&mut self, palette: &Palette) {
        self.palette = *palette;
    }

    pub fn set_colors(&mut self, colors: &[Color]) {
        self.palette.set_colors(colors);
    }

    pub fn set_font(&mut self, font: Vec<u8>) {
        self.font = Some(font);
    }

    pub fn set_sprite_masks(&mut self, data: Rc<[u8]>, offsets: Vec<usize>) {
        debug!("{} mask sprites", offsets.len());
        self.sprites = Some(SpriteMasks { data, offsets });
    }

    pub fn draw_quad_strip(&mut self, page: usize, token: ColorToken, qs: &QuadStrip) -> Result<()> {
        if self.is_design_size() {
            return rasterize!(self, page, |r| r.fill_quad_strip(token, qs));
        }
        let mut scaled = qs.clone();
        scaled.scale(self.u, self.v);
        rasterize!(self, page, |r| r.fill_quad_strip(token, &scaled))
    }

    pub fn draw_point(&mut self, page: usize, token: ColorToken, pt: PointI16) {
        let pt = self.scale_point(pt);
        rasterize!(self, page, |r| r.draw_point(token, pt))
    }

    /// Outline from (x1, y1) to (x2, y2), the right and bottom edges excluded
    pub fn draw_rect(&mut self, page: usize, color: u8, x1: i32, y1: i32, x2: i32, y2: i32) {
        let (xa, ya) = (self.x_scale(x1), self.y_scale(y1));
        let (xb, yb) = (self.x_scale(x2 - 1), self.y_scale(y2 - 1));
        rasterize!(self, page, |r| r.outline_rect(color, xa, ya, xb, yb))
    }

    /// 8x8 glyph `c`, only drawn when fully inside the design space
    pub fn draw_char(&mut self, page: usize, color: u8, c: u8, pt: PointI16) {
        if pt.x < 0 || pt.y < 0 || pt.x as usize > GFX_W - 8 || pt.y as usize > GFX_H - 8 {
            return;
        }
        let glyph = match (&self.font, c.checked_sub(0x20)) {
            (Some(font), Some(idx)) => {
                let start = idx as usize * FONT_GLYPH_SIZE;
                match font.get(start..start + FONT_GLYPH_SIZE) {
                    Some(g) => {
                        let mut bits = [0u8; FONT_GLYPH_SIZE];
                        bits.copy_from_slice(g);
                        bits
                    }
                    None => return,
                }
            }
            _ => return,
        };
        let x = self.x_scale(pt.x as i32);
        let y = self.y_scale(pt.y as i32);
        let token = ColorToken::Solid(color);
        rasterize!(self, page, |r| {
            for (j, row) in glyph.iter().enumerate() {
                for i in 0..8 {
                    if row & (0x80 >> i) != 0 {
                        let p = PointI16::new((x + i) as i16, (y + j as i32) as i16);
                        r.draw_point(token, p);
                    }
                }
            }
        })
    }

    /// Mask sprite `num` centred on `pt`, clipped per pixel
    pub fn draw_sprite(&mut self, page: usize, num: u8, pt: PointI16, color: u8) -> Result<()> {
        let (data, start) = match &self.sprites {
            Some(s) => match s.offsets.get(num as usize) {
                Some(&start) => (s.data.clone(), start),
                None => return Err(DrawError::SpriteOutOfRange(num)),
            },
            None => return Err(DrawError::SpriteOutOfRange(num)),
        };
        let data = &data[..];
        let header = data.get(start..start + 2).ok_or(DrawError::StreamOverrun(start))?;
        let (w, h) = (header[0] as i32, header[1] as i32);
        let x = self.x_scale(pt.x as i32 - w / 2);
        let y = self.y_scale(pt.y as i32 - h / 2);
        let words = (w / 16 + 1) as usize;
        let token = ColorToken::Solid(color);
        let mut pos = start + 2;
        rasterize!(self, page, |r| {
            for j in 0..h {
                for i in 0..words {
                    let mask = read_be_u16(data, pos).ok_or(DrawError::StreamOverrun(pos))?;
                    pos += 2;
                    for b in 0..16 {
                        if mask & (0x8000 >> b) != 0 {
                            let px = x + (i * 16) as i32 + b;
                            r.draw_point(token, PointI16::new(px as i16, (y + j) as i16));
                        }
                    }
                }
            }
        });
        Ok(())
    }

    /// Whole-page blit, the bitmap must match the page size and format
    pub fn draw_bitmap(
        &mut self,
        page: usize,
        data: &[u8],
        width: usize,
        height: usize,
        fmt: BitmapFormat,
    ) -> Result<()> {
        let matching = matches!(
            (fmt, self.pages.format()),
            (BitmapFormat::Clut, PixelFormat::Clut) | (BitmapFormat::Rgb555, PixelFormat::Rgb555)
        );
        let size = self.pages.page_size();
        if !matching || width != self.width() || height != self.height() || data.len() < size {
            return Err(DrawError::UnsupportedBitmap { width, height });
        }
        self.pages.page_mut(page).copy_from_slice(&data[..size]);
        Ok(())
    }

    pub fn clear_page(&mut self, page: usize, color: u8) {
        let pixel = match self.pages.format() {
            PixelFormat::Clut => Clut8::solid_value(&self.palette, color),
            PixelFormat::Rgb555 => Rgb555::solid_value(&self.palette, color),
        };
        self.pages.fill(page, pixel);
    }

    /// Page copy, `vscroll` in design rows and ignored beyond +-199
    pub fn copy_page(&mut self, dst: usize, src: usize, vscroll: i32) {
        if vscroll == 0 {
            self.pages.copy(src, dst);
        } else if (-(GFX_H as i32 - 1)..GFX_H as i32).contains(&vscroll) {
            let dy = self.y_scale(vscroll);
            self.pages.copy_scrolled(src, dst, dy);
        }
    }

    /// Pixels of a concrete page with the palette needed to read them
    pub fn frame(&self, page: usize) -> Frame<'_> {
        let bytes = self.pages.page(page);
        let pixels = match self.pages.format() {
            PixelFormat::Clut => FramePixels::Clut {
                indices: bytes,
                palette: self.palette,
            },
            PixelFormat::Rgb555 => FramePixels::Rgb555(bytes),
        };
        Frame {
            width: self.width(),
            height: self.height(),
            pixels,
        }
    }
}
