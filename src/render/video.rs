// RustPixel
// copyright zipxing@hotmail.com 2022～2025

//! Display compositor.
//!
//! `Video` is what the command interpreter talks to. It tracks the draw
//! page and the displayed/rendering page pair, owns the deferred palette
//! switch and the one-shot capture flag, and runs shape decoding against
//! the current draw page.
//!
//! Every command is fail-soft: errors are logged and the next command runs
//! normally.

use crate::init::RenderConfig;
use crate::render::error::{DrawError, Result};
use crate::render::graphics::{BitmapFormat, Graphics};
use crate::render::page::PageRef;
use crate::render::palette::{Color, PaletteBank, PALETTE_COUNT};
use crate::render::raster::{ColorToken, QuadStrip};
use crate::render::shape::{ShapeCanvas, ShapeDecoder, ShapeFormat};
use crate::render::surface::{Frame, FrameCapture, Surface};
#[cfg(capture_support)]
use crate::render::surface::PngCapture;
use crate::util::PointI16;
use bitflags::bitflags;
use log::{debug, info, warn};
use std::rc::Rc;

/// Scroll amounts outside +-this are ignored by raw page copies
const MAX_VSCROLL: i16 = 199;

bitflags! {
    /// Source byte of a raw page copy command
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct CopySource: u8 {
        const PAGE    = 0b0000_0011;
        const IGNORED = 0b0100_0000;
        const VSCROLL = 0b1000_0000;
    }
}

// slots of Video::buffers
const DRAW: usize = 0;
const DISPLAYED: usize = 1;
const RENDERING: usize = 2;

pub struct Video {
    pub gfx: Graphics,
    buffers: [usize; 3],
    current_pal: Option<u8>,
    next_pal: Option<u8>,
    palettes: Option<PaletteBank>,
    data: Option<Rc<[u8]>>,
    pc: usize,
    shape_format: ShapeFormat,
    legacy_sprites: bool,
    max_depth: usize,
    parts: Vec<Vec<u8>>,
    capture: Option<Box<dyn FrameCapture>>,
    capture_pending: bool,
    screenshot_num: u32,
}

/// Shape decoder output drawn into one page
struct PageCanvas<'a> {
    gfx: &'a mut Graphics,
    page: usize,
    parts: &'a [Vec<u8>],
}

impl ShapeCanvas for PageCanvas<'_> {
    fn fill_polygon(&mut self, color: u8, qs: &QuadStrip) -> Result<()> {
        self.gfx.draw_quad_strip(self.page, ColorToken::from(color), qs)
    }

    fn draw_point(&mut self, color: u8, pt: PointI16) {
        self.gfx.draw_point(self.page, ColorToken::from(color), pt)
    }

    fn draw_sprite(&mut self, num: u8, pt: PointI16, color: u8) -> Result<()> {
        self.gfx.draw_sprite(self.page, num, pt, color)
    }

    /// Part table entry: w, h, then one (left, right) pair per row
    fn draw_shape_part(&mut self, color: u8, part: u8, pt: PointI16) -> Result<()> {
        let data = self
            .parts
            .get(part as usize)
            .ok_or(DrawError::SpriteOutOfRange(part))?;
        let (w, h) = match data.get(..2) {
            Some(&[w, h]) => (w as i16, h as usize),
            _ => return Err(DrawError::StreamOverrun(0)),
        };
        let rows = data.get(2..2 + h * 2).ok_or(DrawError::StreamOverrun(2))?;
        let x = pt.x.wrapping_sub(w / 2);
        let y = pt.y.wrapping_sub(h as i16 / 2);
        let mut v = vec![PointI16::default(); 2 * h];
        for (i, pair) in rows.chunks_exact(2).enumerate() {
            let yi = y.wrapping_add(i as i16);
            v[i] = PointI16::new(x.wrapping_add(pair[0] as i16), yi);
            v[2 * h - 1 - i] = PointI16::new(x.wrapping_add(pair[1] as i16), yi);
        }
        self.gfx
            .draw_quad_strip(self.page, ColorToken::from(color), &QuadStrip::from_vertices(v))
    }
}

impl Video {
    pub fn new(cfg: &RenderConfig) -> Self {
        let mut video = Self {
            gfx: Graphics::new(cfg.width, cfg.height, cfg.pixel_format),
            buffers: [0, 2, 1],
            current_pal: None,
            next_pal: None,
            palettes: None,
            data: None,
            pc: 0,
            shape_format: cfg.shape_format,
            legacy_sprites: false,
            max_depth: cfg.max_shape_depth,
            parts: vec![],
            capture: None,
            capture_pending: false,
            screenshot_num: 1,
        };
        #[cfg(capture_support)]
        {
            video.capture = Some(Box::new(PngCapture::new(&cfg.screenshot_dir)));
        }
        video.select_draw_page(PageRef::Displayed);
        video
    }

    /// Concrete buffer behind a page reference
    pub fn resolve(&self, page: PageRef) -> usize {
        match page {
            PageRef::Displayed => self.buffers[DISPLAYED],
            PageRef::Rendering => self.buffers[RENDERING],
            p => p.index().unwrap_or(0),
        }
    }

    fn resolve_raw(&self, raw: u8) -> Option<usize> {
        match PageRef::from_raw(raw) {
            Some(p) => Some(self.resolve(p)),
            None => {
                debug!("page 0x{:X} ignored: {}", raw, DrawError::InvalidPage(raw));
                None
            }
        }
    }

    pub fn draw_page(&self) -> usize {
        self.buffers[DRAW]
    }

    pub fn displayed_page(&self) -> usize {
        self.buffers[DISPLAYED]
    }

    pub fn rendering_page(&self) -> usize {
        self.buffers[RENDERING]
    }

    pub fn current_palette(&self) -> Option<u8> {
        self.current_pal
    }

    pub fn select_draw_page(&mut self, page: PageRef) {
        debug!("select draw page {:?}", page);
        self.buffers[DRAW] = self.resolve(page);
    }

    pub fn fill_page(&mut self, page: PageRef, color: u8) {
        debug!("fill page {:?} color {}", page, color);
        let p = self.resolve(page);
        self.gfx.clear_page(p, color);
    }

    /// Copies `src` onto `dst`, shifted by `vscroll` design rows
    pub fn copy_page(&mut self, src: PageRef, dst: PageRef, vscroll: i16) {
        debug!("copy page {:?} -> {:?} vscroll {}", src, dst, vscroll);
        let (s, d) = (self.resolve(src), self.resolve(dst));
        self.gfx.copy_page(d, s, vscroll as i32);
    }

    /// Page copy as encoded by the interpreter: the scroll only applies
    /// when the source carries the VSCROLL flag
    pub fn copy_page_raw(&mut self, src: u8, dst: u8, vscroll: i16) {
        debug!("copy page raw 0x{:X} -> 0x{:X} vscroll {}", src, dst, vscroll);
        let flags = CopySource::from_bits_retain(src);
        if src >= 0xFE || !flags.contains(CopySource::VSCROLL) {
            let src = if src >= 0xFE { src } else { src & !CopySource::IGNORED.bits() };
            if let (Some(s), Some(d)) = (self.resolve_raw(src), self.resolve_raw(dst)) {
                self.gfx.copy_page(d, s, 0);
            }
            return;
        }
        let s = self.resolve(PageRef::concrete((flags & CopySource::PAGE).bits() as usize));
        let Some(d) = self.resolve_raw(dst) else {
            return;
        };
        if s != d && (-MAX_VSCROLL..=MAX_VSCROLL).contains(&vscroll) {
            self.gfx.copy_page(d, s, vscroll as i32);
        }
    }

    /// Shape segment and the offset of the next shape to draw
    pub fn set_data_buffer(&mut self, data: Rc<[u8]>, offset: usize) {
        self.data = Some(data);
        self.pc = offset;
    }

    pub fn set_shape_offset(&mut self, offset: usize) {
        self.pc = offset;
    }

    /// Decodes the shape at the current offset into the draw page
    pub fn draw_shape(&mut self, color: u8, zoom: u16, pt: PointI16) {
        let Some(data) = self.data.clone() else {
            warn!("draw_shape without shape data");
            return;
        };
        let mut decoder = ShapeDecoder::new(&data, self.pc, self.shape_format)
            .with_max_depth(self.max_depth)
            .with_legacy_sprites(self.legacy_sprites);
        let mut canvas = PageCanvas {
            gfx: &mut self.gfx,
            page: self.buffers[DRAW],
            parts: &self.parts,
        };
        if let Err(e) = decoder.decode(&mut canvas, color, zoom, pt) {
            warn!("draw_shape at 0x{:X} abandoned: {}", self.pc, e);
        }
    }

    pub fn fill_quad_strip(&mut self, page: PageRef, color: u8, qs: &QuadStrip) {
        let p = self.resolve(page);
        if let Err(e) = self.gfx.draw_quad_strip(p, ColorToken::from(color), qs) {
            warn!("fill_quad_strip: {}", e);
        }
    }

    /// Outline in a solid colour, (x2, y2) excluded
    pub fn draw_rect(&mut self, page: PageRef, color: u8, x1: i32, y1: i32, x2: i32, y2: i32) {
        let p = self.resolve(page);
        self.gfx.draw_rect(p, color, x1, y1, x2, y2);
    }

    pub fn draw_point(&mut self, color: u8, pt: PointI16) {
        let p = self.buffers[DRAW];
        self.gfx.draw_point(p, ColorToken::from(color), pt);
    }

    pub fn draw_char(&mut self, color: u8, c: u8, pt: PointI16) {
        let p = self.buffers[DRAW];
        self.gfx.draw_char(p, color, c, pt);
    }

    /// Draws `text` from `pt`, 8 pixels per column, newlines go 8 rows down
    pub fn draw_string(&mut self, color: u8, text: &str, pt: PointI16) {
        let mut x = pt.x;
        let mut y = pt.y;
        for c in text.bytes() {
            if c == b'\n' || c == b'\r' {
                y = y.wrapping_add(8);
                x = pt.x;
            } else {
                self.draw_char(color, c, PointI16::new(x, y));
                x = x.wrapping_add(8);
            }
        }
    }

    pub fn set_font(&mut self, font: Vec<u8>) {
        self.gfx.set_font(font);
    }

    /// Mask sprites turn sprite-flagged shape children into sprite draws
    pub fn set_sprite_masks(&mut self, data: Rc<[u8]>, offsets: Vec<usize>) {
        self.gfx.set_sprite_masks(data, offsets);
        self.legacy_sprites = true;
    }

    /// Pre-rasterized parts used by 3DO shape streams
    pub fn set_shape_parts(&mut self, parts: Vec<Vec<u8>>) {
        self.parts = parts;
    }

    pub fn set_palettes(&mut self, bank: PaletteBank) {
        self.palettes = Some(bank);
    }

    /// Requests palette `num`, applied on the next present
    pub fn change_palette(&mut self, num: u8) {
        self.next_pal = Some(num);
    }

    fn apply_palette(&mut self, num: u8) {
        if num >= PALETTE_COUNT || self.current_pal == Some(num) {
            return;
        }
        let Some(pal) = self.palettes.as_ref().and_then(|b| b.read(num)) else {
            warn!("palette {} not available", num);
            return;
        };
        self.gfx.set_palette(&pal);
        self.current_pal = Some(num);
    }

    pub fn set_palette_color(&mut self, index: u8, r: u8, g: u8, b: u8) {
        self.gfx.palette.colors[index as usize & 0xF] = Color::new(r, g, b);
    }

    /// Whole-page bitmap into page 0
    pub fn draw_bitmap(&mut self, data: &[u8], width: usize, height: usize, fmt: BitmapFormat) {
        if let Err(e) = self.gfx.draw_bitmap(0, data, width, height, fmt) {
            warn!("draw_bitmap: {}", e);
        }
    }

    /// Arms a still capture of the next presented frame
    pub fn capture_display(&mut self) {
        self.capture_pending = true;
    }

    pub fn set_capture(&mut self, capture: Box<dyn FrameCapture>) {
        self.capture = Some(capture);
    }

    /// Pixels of a page, for pull style surfaces
    pub fn get_pixels(&self, page: PageRef) -> Frame<'_> {
        self.gfx.frame(self.resolve(page))
    }

    /// Shows `page`. The rendering alias swaps the displayed and rendering
    /// pages, the displayed alias shows the current one again. A pending
    /// palette change is applied first.
    pub fn present(&mut self, page: PageRef, surface: &mut dyn Surface) {
        debug!("present {:?}", page);
        match page {
            PageRef::Displayed => {}
            PageRef::Rendering => self.buffers.swap(DISPLAYED, RENDERING),
            p => self.buffers[DISPLAYED] = self.resolve(p),
        }
        if let Some(num) = self.next_pal.take() {
            self.apply_palette(num);
        }

        let frame = self.gfx.frame(self.buffers[DISPLAYED]);
        surface.set_frame(&frame);
        if self.capture_pending {
            self.capture_pending = false;
            match self.capture.as_mut() {
                Some(cap) => {
                    if let Err(e) = cap.capture(&frame, self.screenshot_num) {
                        warn!("{}", e);
                    }
                    self.screenshot_num += 1;
                }
                None => info!("capture requested without a capture target"),
            }
        }
        surface.update();
    }
}
