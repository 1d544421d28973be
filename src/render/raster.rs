// RustPixel
// copyright zipxing@hotmail.com 2022～2025

//! Quad strip scanline filler.
//!
//! A quad strip is a ring of vertices walked from both ends at once: the
//! first half is the right chain top to bottom, the second half the left
//! chain bottom to top. Each pair of edges is stepped in 16.16 fixed point
//! and every covered scanline is handed to one span writer, chosen once per
//! fill from the colour token.

use crate::render::error::{DrawError, Result};
use crate::render::page::PageStore;
use crate::render::palette::Palette;
use crate::render::pixfmt::PixelOps;
use crate::util::{calc_step, EdgeStep, PointI16};
use std::marker::PhantomData;

/// Vertex count must stay below this
pub const MAX_VERTICES: usize = 70;
/// Token for the translucent writer
pub const COL_ALPHA: u8 = 0x10;
/// Token for the copy-from-page-0 writer
pub const COL_PAGE: u8 = 0x11;

/// What a fill writes, decoded from the command colour byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorToken {
    Solid(u8),
    PageCopy,
    Alpha,
}

impl From<u8> for ColorToken {
    fn from(c: u8) -> Self {
        match c {
            COL_ALPHA => ColorToken::Alpha,
            COL_PAGE => ColorToken::PageCopy,
            c => ColorToken::Solid(c),
        }
    }
}

impl ColorToken {
    pub fn raw(&self) -> u8 {
        match self {
            ColorToken::Solid(c) => *c,
            ColorToken::PageCopy => COL_PAGE,
            ColorToken::Alpha => COL_ALPHA,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuadStrip {
    pub vertices: Vec<PointI16>,
}

impl QuadStrip {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_vertices(vertices: Vec<PointI16>) -> Self {
        Self { vertices }
    }

    pub fn push(&mut self, x: i16, y: i16) {
        self.vertices.push(PointI16::new(x, y));
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Even count below `MAX_VERTICES`
    pub fn check(&self) -> Result<()> {
        let n = self.vertices.len();
        if n & 1 != 0 {
            return Err(DrawError::OddVertexCount(n));
        }
        if n >= MAX_VERTICES {
            return Err(DrawError::TooManyVertices(n));
        }
        Ok(())
    }

    pub fn scale(&mut self, u: i32, v: i32) {
        for p in self.vertices.iter_mut() {
            p.scale(u, v);
        }
    }

    /// Four vertices on one column spanning at most two scanlines
    pub fn is_degenerate(&self) -> bool {
        if self.vertices.len() != 4 {
            return false;
        }
        let v = &self.vertices;
        let (ymin, ymax) = v
            .iter()
            .fold((i16::MAX, i16::MIN), |(lo, hi), p| (lo.min(p.y), hi.max(p.y)));
        v.iter().all(|p| p.x == v[0].x) && (ymax as i32 - ymin as i32) <= 1
    }
}

#[derive(Debug, Clone, Copy)]
enum SpanWriter {
    Solid(u16),
    PageCopy,
    Alpha,
}

/// Draws into one page of a `PageStore` with pixel format `F`
pub struct Rasterizer<'a, F: PixelOps> {
    dst: &'a mut [u8],
    page0: Option<&'a [u8]>,
    width: i32,
    height: i32,
    palette: &'a Palette,
    _format: PhantomData<F>,
}

impl<'a, F: PixelOps> Rasterizer<'a, F> {
    pub fn new(pages: &'a mut PageStore, index: usize, palette: &'a Palette) -> Self {
        debug_assert_eq!(pages.format().byte_depth(), F::BYTE_DEPTH);
        let width = pages.width() as i32;
        let height = pages.height() as i32;
        let (dst, page0) = pages.split_target(index);
        Self {
            dst,
            page0,
            width,
            height,
            palette,
            _format: PhantomData,
        }
    }

    fn writer(&self, token: ColorToken) -> SpanWriter {
        match token {
            ColorToken::Solid(c) => SpanWriter::Solid(F::solid_value(self.palette, c)),
            ColorToken::PageCopy => SpanWriter::PageCopy,
            ColorToken::Alpha => SpanWriter::Alpha,
        }
    }

    /// Fills a quad strip already in page coordinates.
    ///
    /// Malformed strips are reported and leave the page untouched.
    pub fn fill_quad_strip(&mut self, token: ColorToken, qs: &QuadStrip) -> Result<()> {
        qs.check()?;
        let v = &qs.vertices;
        if v.is_empty() {
            return Ok(());
        }
        if qs.is_degenerate() {
            self.draw_point(token, v[0]);
            return Ok(());
        }
        let writer = self.writer(token);

        let mut i = 0;
        let mut j = v.len() - 1;
        let mut left = EdgeStep::new(v[j].x);
        let mut right = EdgeStep::new(v[i].x);
        let mut hliney = v[i].y.min(v[j].y) as i32;
        i += 1;
        j -= 1;

        let mut remaining = v.len();
        loop {
            remaining -= 2;
            if remaining == 0 {
                return Ok(());
            }
            let (step1, _) = calc_step(v[j + 1], v[j]);
            let (step2, h) = calc_step(v[i - 1], v[i]);
            i += 1;
            j -= 1;

            left.align_left();
            right.align_right();

            if h == 0 {
                left.advance(step1);
                right.advance(step2);
                continue;
            }
            for _ in 0..h {
                if hliney >= self.height {
                    return Ok(());
                }
                if hliney >= 0 {
                    let x1 = left.x() as i32;
                    let x2 = right.x() as i32;
                    if x1 < self.width && x2 >= 0 {
                        let x1 = x1.max(0);
                        let x2 = x2.min(self.width - 1);
                        self.draw_span(writer, x1, x2, hliney);
                    }
                }
                left.advance(step1);
                right.advance(step2);
                hliney += 1;
            }
        }
    }

    /// One pixel in page coordinates, ignored outside the page
    pub fn draw_point(&mut self, token: ColorToken, pt: PointI16) {
        let (x, y) = (pt.x as i32, pt.y as i32);
        if x < 0 || x >= self.width || y < 0 || y >= self.height {
            return;
        }
        let writer = self.writer(token);
        self.draw_span(writer, x, x, y);
    }

    /// One pixel wide outline, clipped to the page
    pub fn outline_rect(&mut self, color: u8, x1: i32, y1: i32, x2: i32, y2: i32) {
        let writer = self.writer(ColorToken::Solid(color));
        let (xa, xb) = (x1.min(x2), x1.max(x2));
        let (ya, yb) = (y1.min(y2), y1.max(y2));
        if xb < 0 || xa >= self.width || yb < 0 || ya >= self.height {
            return;
        }
        let (cxa, cxb) = (xa.max(0), xb.min(self.width - 1));
        for y in [ya, yb] {
            if (0..self.height).contains(&y) {
                self.draw_span(writer, cxa, cxb, y);
            }
        }
        for y in ya.max(0)..=yb.min(self.height - 1) {
            for x in [xa, xb] {
                if (0..self.width).contains(&x) {
                    self.draw_span(writer, x, x, y);
                }
            }
        }
    }

    /// Writes pixels x1..=x2 (either order) of row y, both in range
    fn draw_span(&mut self, writer: SpanWriter, x1: i32, x2: i32, y: i32) {
        let d = F::BYTE_DEPTH;
        let row = (y * self.width) as usize;
        let start = (row + x1.min(x2) as usize) * d;
        let end = (row + x1.max(x2) as usize + 1) * d;
        let span = &mut self.dst[start..end];
        match writer {
            SpanWriter::Solid(value) => F::fill_span(span, value),
            SpanWriter::PageCopy => {
                if let Some(page0) = self.page0 {
                    span.copy_from_slice(&page0[start..end]);
                }
            }
            SpanWriter::Alpha => F::blend_span(span, self.palette),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::page::PixelFormat;
    use crate::render::palette::ALPHA_COLOR_INDEX;
    use crate::render::pixfmt::{blend_rgb555, Clut8, Rgb555, CLUT_ALPHA_BIT};

    fn rect(x1: i16, y1: i16, x2: i16, y2: i16) -> QuadStrip {
        QuadStrip::from_vertices(vec![
            PointI16::new(x2, y1),
            PointI16::new(x2, y2),
            PointI16::new(x1, y2),
            PointI16::new(x1, y1),
        ])
    }

    fn pixels(ps: &PageStore, page: usize) -> Vec<(usize, usize, u8)> {
        let w = ps.width();
        ps.page(page)
            .iter()
            .enumerate()
            .filter(|&(_, &b)| b != 0)
            .map(|(i, &b)| (i % w, i / w, b))
            .collect()
    }

    fn fill(ps: &mut PageStore, page: usize, token: ColorToken, qs: &QuadStrip) -> Result<()> {
        let pal = Palette::default();
        Rasterizer::<Clut8>::new(ps, page, &pal).fill_quad_strip(token, qs)
    }

    #[test]
    fn color_tokens() {
        assert_eq!(ColorToken::from(0x10), ColorToken::Alpha);
        assert_eq!(ColorToken::from(0x11), ColorToken::PageCopy);
        assert_eq!(ColorToken::from(7), ColorToken::Solid(7));
        assert_eq!(ColorToken::from(0x11).raw(), 0x11);
    }

    #[test]
    fn solid_rect_covers_exactly_its_spans() {
        let mut ps = PageStore::new(10, 8, PixelFormat::Clut);
        fill(&mut ps, 1, ColorToken::Solid(5), &rect(2, 1, 6, 4)).unwrap();
        let px = pixels(&ps, 1);
        assert_eq!(px.len(), 15);
        assert!(px
            .iter()
            .all(|&(x, y, c)| (2..=6).contains(&x) && (1..4).contains(&y) && c == 5));
        assert!(pixels(&ps, 0).is_empty());
    }

    #[test]
    fn sloped_edges_stay_inside_bounds() {
        let mut ps = PageStore::new(16, 16, PixelFormat::Clut);
        // right chain down (8,0)->(12,8), left chain up (4,8)->(8,0)
        let qs = QuadStrip::from_vertices(vec![
            PointI16::new(8, 0),
            PointI16::new(12, 8),
            PointI16::new(4, 8),
            PointI16::new(8, 0),
        ]);
        fill(&mut ps, 2, ColorToken::Solid(1), &qs).unwrap();
        let px = pixels(&ps, 2);
        assert!(!px.is_empty());
        assert!(px.iter().all(|&(x, y, _)| (4..=12).contains(&x) && y < 8));
        // row 0 is the apex, row 7 the widest span
        let row = |y| px.iter().filter(|p| p.1 == y).count();
        assert_eq!(row(0), 1);
        assert!(row(7) > row(3));
    }

    #[test]
    fn spans_are_clipped_per_side() {
        let mut ps = PageStore::new(10, 4, PixelFormat::Clut);
        fill(&mut ps, 1, ColorToken::Solid(3), &rect(-5, -2, 3, 2)).unwrap();
        fill(&mut ps, 1, ColorToken::Solid(4), &rect(8, 2, 15, 9)).unwrap();
        fill(&mut ps, 1, ColorToken::Solid(6), &rect(-10, 0, -2, 3)).unwrap();
        let px = pixels(&ps, 1);
        let threes: Vec<_> = px.iter().filter(|p| p.2 == 3).collect();
        assert_eq!(threes.len(), 8);
        assert!(threes.iter().all(|p| p.0 <= 3 && p.1 < 2));
        let fours: Vec<_> = px.iter().filter(|p| p.2 == 4).collect();
        assert_eq!(fours.len(), 4);
        assert!(fours.iter().all(|p| p.0 >= 8 && p.1 >= 2));
        assert!(px.iter().all(|p| p.2 != 6));
    }

    #[test]
    fn odd_or_oversized_strips_write_nothing() {
        let mut ps = PageStore::new(8, 8, PixelFormat::Clut);
        let mut qs = rect(0, 0, 4, 4);
        qs.push(2, 2);
        assert_eq!(
            fill(&mut ps, 1, ColorToken::Solid(1), &qs),
            Err(DrawError::OddVertexCount(5))
        );
        let big = QuadStrip::from_vertices(vec![PointI16::new(1, 1); 70]);
        assert_eq!(
            fill(&mut ps, 1, ColorToken::Solid(1), &big),
            Err(DrawError::TooManyVertices(70))
        );
        assert!(ps.page(1).iter().all(|&b| b == 0));
        assert_eq!(fill(&mut ps, 1, ColorToken::Solid(1), &QuadStrip::new()), Ok(()));
    }

    #[test]
    fn degenerate_quad_is_one_pixel() {
        let mut ps = PageStore::new(8, 8, PixelFormat::Clut);
        let qs = rect(3, 3, 3, 4);
        assert!(qs.is_degenerate());
        fill(&mut ps, 1, ColorToken::Solid(9), &qs).unwrap();
        assert_eq!(pixels(&ps, 1), vec![(3, 3, 9)]);
    }

    #[test]
    fn degenerate_quad_honours_every_token() {
        let qs = rect(3, 3, 3, 4);
        let mut ps = PageStore::new(8, 8, PixelFormat::Clut);
        ps.fill(0, 7);
        ps.fill(1, 2);
        ps.fill(2, 2);

        fill(&mut ps, 1, ColorToken::from(COL_PAGE), &qs).unwrap();
        let changed: Vec<usize> = (0..64).filter(|&i| ps.page(1)[i] != 2).collect();
        assert_eq!(changed, vec![3 * 8 + 3]);
        assert_eq!(ps.page(1)[3 * 8 + 3], 7);

        fill(&mut ps, 2, ColorToken::from(COL_ALPHA), &qs).unwrap();
        let changed: Vec<usize> = (0..64).filter(|&i| ps.page(2)[i] != 2).collect();
        assert_eq!(changed, vec![3 * 8 + 3]);
        assert_eq!(ps.page(2)[3 * 8 + 3], 2 | CLUT_ALPHA_BIT);

        // page 0 copying onto itself
        let before = ps.page(0).to_vec();
        fill(&mut ps, 0, ColorToken::from(COL_PAGE), &qs).unwrap();
        assert_eq!(ps.page(0), &before[..]);
    }

    #[test]
    fn degenerate_quad_blends_wide_pixels_once() {
        let qs = rect(1, 0, 1, 1);
        let mut ps = PageStore::new(4, 2, PixelFormat::Rgb555);
        let mut pal = Palette::default();
        pal.colors[ALPHA_COLOR_INDEX] = crate::render::palette::Color::new(0xFF, 0, 0);
        ps.fill(1, 0x001F);
        let mut r = Rasterizer::<Rgb555>::new(&mut ps, 1, &pal);
        r.fill_quad_strip(ColorToken::Alpha, &qs).unwrap();
        r.fill_quad_strip(ColorToken::Alpha, &qs).unwrap();
        let expected = blend_rgb555(0x001F, pal.alpha_rgb555());
        assert_eq!(expected & 0x8000, 0x8000);
        let words: Vec<u16> = ps
            .page(1)
            .chunks_exact(2)
            .map(|p| u16::from_le_bytes([p[0], p[1]]))
            .collect();
        assert_eq!(words, vec![0x001F, expected, 0x001F, 0x001F, 0x001F, 0x001F, 0x001F, 0x001F]);
    }

    #[test]
    fn page_copy_reads_page0() {
        let mut ps = PageStore::new(6, 4, PixelFormat::Clut);
        ps.fill(0, 7);
        fill(&mut ps, 2, ColorToken::PageCopy, &rect(1, 0, 2, 2)).unwrap();
        assert_eq!(pixels(&ps, 2).len(), 4);
        assert!(pixels(&ps, 2).iter().all(|p| p.2 == 7));

        let before = ps.page(0).to_vec();
        fill(&mut ps, 0, ColorToken::PageCopy, &rect(0, 0, 5, 4)).unwrap();
        assert_eq!(ps.page(0), &before[..]);
    }

    #[test]
    fn alpha_marks_indexed_pixels() {
        let mut ps = PageStore::new(4, 2, PixelFormat::Clut);
        ps.fill(3, 2);
        fill(&mut ps, 3, ColorToken::Alpha, &rect(0, 0, 1, 1)).unwrap();
        assert_eq!(ps.page(3), &[10, 10, 2, 2, 2, 2, 2, 2]);
    }

    #[test]
    fn wide_pages_fill_palette_colors() {
        let mut ps = PageStore::new(4, 2, PixelFormat::Rgb555);
        let mut pal = Palette::default();
        pal.colors[1] = crate::render::palette::Color::new(0, 0xFF, 0);
        let mut r = Rasterizer::<Rgb555>::new(&mut ps, 1, &pal);
        r.fill_quad_strip(ColorToken::Solid(1), &rect(1, 0, 2, 1)).unwrap();
        r.draw_point(ColorToken::Solid(1), PointI16::new(3, 1));
        r.draw_point(ColorToken::Solid(1), PointI16::new(4, 1));
        let p = ps.page(1);
        assert_eq!(&p[..8], &[0, 0, 0xE0, 0x03, 0xE0, 0x03, 0, 0]);
        assert_eq!(&p[14..16], &[0xE0, 0x03]);
    }

    #[test]
    fn outline_rect_clips() {
        let mut ps = PageStore::new(5, 5, PixelFormat::Clut);
        let pal = Palette::default();
        Rasterizer::<Clut8>::new(&mut ps, 1, &pal).outline_rect(4, 1, 1, 7, 3);
        let px = pixels(&ps, 1);
        // top and bottom rows x 1..=4, left column rows 1..=3, right edge off page
        assert_eq!(px.len(), 4 + 4 + 1);
        assert!(px.iter().all(|p| p.2 == 4 && p.0 >= 1 && (1..=3).contains(&p.1)));
    }
}
