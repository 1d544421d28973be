// RustPixel
// copyright zipxing@hotmail.com 2022～2025

//! Page store: four equally sized framebuffers.
//!
//! Pages are addressed through `PageRef`, the two aliases (displayed page
//! and rendering page) are resolved by the compositor right before use and
//! never own a buffer of their own.

use log::debug;
use num_derive::FromPrimitive;
use num_traits::FromPrimitive;
use serde::{Deserialize, Serialize};

pub const PAGE_COUNT: usize = 4;

/// Logical page as issued by drawing commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromPrimitive)]
#[repr(u8)]
pub enum PageRef {
    Page0 = 0,
    Page1 = 1,
    Page2 = 2,
    Page3 = 3,
    /// the page currently being displayed
    Displayed = 0xFE,
    /// the page currently being rendered into
    Rendering = 0xFF,
}

impl PageRef {
    /// Decodes a command byte, unknown values give None
    pub fn from_raw(raw: u8) -> Option<Self> {
        FromPrimitive::from_u8(raw)
    }

    pub fn concrete(index: usize) -> Self {
        match index & 3 {
            0 => PageRef::Page0,
            1 => PageRef::Page1,
            2 => PageRef::Page2,
            _ => PageRef::Page3,
        }
    }

    /// Buffer index for the four concrete pages
    pub fn index(&self) -> Option<usize> {
        match self {
            PageRef::Displayed | PageRef::Rendering => None,
            p => Some(*p as usize),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PixelFormat {
    /// one palette index per byte
    #[default]
    Clut,
    /// little endian 16 bit RGB555
    Rgb555,
}

impl PixelFormat {
    pub fn byte_depth(&self) -> usize {
        match self {
            PixelFormat::Clut => 1,
            PixelFormat::Rgb555 => 2,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PageStore {
    pages: [Vec<u8>; PAGE_COUNT],
    width: usize,
    height: usize,
    format: PixelFormat,
}

impl PageStore {
    /// Allocates the four pages cleared to zero.
    ///
    /// Panics on an empty or overflowing size, drawing cannot go on
    /// without the buffers.
    pub fn new(width: usize, height: usize, format: PixelFormat) -> Self {
        let mut ps = Self {
            pages: Default::default(),
            width: 0,
            height: 0,
            format,
        };
        ps.resize(width, height);
        ps
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        assert!(width > 0 && height > 0, "page size {}x{} is empty", width, height);
        let size = width
            .checked_mul(height)
            .and_then(|n| n.checked_mul(self.format.byte_depth()))
            .expect("page size overflows");
        for p in self.pages.iter_mut() {
            p.clear();
            p.resize(size, 0);
        }
        self.width = width;
        self.height = height;
        debug!("pages resized to {}x{} {:?}", width, height, self.format);
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Bytes per row
    pub fn pitch(&self) -> usize {
        self.width * self.format.byte_depth()
    }

    pub fn page_size(&self) -> usize {
        self.pitch() * self.height
    }

    pub fn page(&self, index: usize) -> &[u8] {
        &self.pages[index & 3]
    }

    pub fn page_mut(&mut self, index: usize) -> &mut [u8] {
        &mut self.pages[index & 3]
    }

    /// Destination page plus a read view of page 0, None when the
    /// destination is page 0 itself
    pub fn split_target(&mut self, index: usize) -> (&mut [u8], Option<&[u8]>) {
        let index = index & 3;
        if index == 0 {
            return (&mut self.pages[0], None);
        }
        let (head, tail) = self.pages.split_at_mut(1);
        (&mut tail[index - 1], Some(&head[0]))
    }

    /// Sets every pixel of a page, `pixel` is the raw index or 555 value
    pub fn fill(&mut self, index: usize, pixel: u16) {
        let format = self.format;
        let page = self.page_mut(index);
        match format {
            PixelFormat::Clut => page.fill(pixel as u8),
            PixelFormat::Rgb555 => {
                let b = pixel.to_le_bytes();
                for px in page.chunks_exact_mut(2) {
                    px.copy_from_slice(&b);
                }
            }
        }
    }

    /// Whole page copy, a no-op on the same page
    pub fn copy(&mut self, src: usize, dst: usize) {
        self.copy_scrolled(src, dst, 0);
    }

    /// Copies `src` into `dst` shifted by `dy` rows.
    ///
    /// Positive `dy` moves the content up: destination row r receives
    /// source row r + dy and the bottom dy rows keep their old content.
    /// Negative `dy` moves it down, leaving the top rows. |dy| >= height
    /// does nothing.
    pub fn copy_scrolled(&mut self, src: usize, dst: usize, dy: i32) {
        let (src, dst) = (src & 3, dst & 3);
        if src == dst {
            return;
        }
        let rows = self.height as i32 - dy.abs();
        if rows <= 0 {
            return;
        }
        let pitch = self.pitch();
        let len = rows as usize * pitch;
        let shift = dy.unsigned_abs() as usize * pitch;
        let (s, d) = if src < dst {
            let (a, b) = self.pages.split_at_mut(dst);
            (&a[src], &mut b[0])
        } else {
            let (a, b) = self.pages.split_at_mut(src);
            (&b[0], &mut a[dst])
        };
        if dy >= 0 {
            d[..len].copy_from_slice(&s[shift..shift + len]);
        } else {
            d[shift..shift + len].copy_from_slice(&s[..len]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marked(store: &mut PageStore, index: usize) {
        let w = store.width();
        for (r, row) in store.page_mut(index).chunks_mut(w).enumerate() {
            row.fill(r as u8);
        }
    }

    #[test]
    fn page_refs_from_raw() {
        assert_eq!(PageRef::from_raw(0), Some(PageRef::Page0));
        assert_eq!(PageRef::from_raw(3), Some(PageRef::Page3));
        assert_eq!(PageRef::from_raw(0xFE), Some(PageRef::Displayed));
        assert_eq!(PageRef::from_raw(0xFF), Some(PageRef::Rendering));
        assert_eq!(PageRef::from_raw(4), None);
        assert_eq!(PageRef::from_raw(0x80), None);
        assert_eq!(PageRef::Page2.index(), Some(2));
        assert_eq!(PageRef::Rendering.index(), None);
    }

    #[test]
    fn scroll_up_keeps_bottom_rows() {
        let mut ps = PageStore::new(2, 4, PixelFormat::Clut);
        marked(&mut ps, 1);
        ps.fill(2, 9);
        ps.copy_scrolled(1, 2, 1);
        assert_eq!(ps.page(2), &[1, 1, 2, 2, 3, 3, 9, 9]);
    }

    #[test]
    fn scroll_down_keeps_top_rows() {
        let mut ps = PageStore::new(2, 4, PixelFormat::Clut);
        marked(&mut ps, 3);
        ps.fill(0, 9);
        ps.copy_scrolled(3, 0, -2);
        assert_eq!(ps.page(0), &[9, 9, 9, 9, 0, 0, 1, 1]);
    }

    #[test]
    fn scroll_out_of_range_and_self_copy() {
        let mut ps = PageStore::new(2, 4, PixelFormat::Clut);
        marked(&mut ps, 1);
        ps.fill(2, 9);
        ps.copy_scrolled(1, 2, 4);
        ps.copy_scrolled(1, 2, -5);
        assert!(ps.page(2).iter().all(|&b| b == 9));
        let before = ps.page(1).to_vec();
        ps.copy(1, 1);
        ps.copy_scrolled(1, 1, 1);
        assert_eq!(ps.page(1), &before[..]);
        ps.copy(1, 2);
        assert_eq!(ps.page(2), &before[..]);
    }

    #[test]
    fn wide_pages() {
        let mut ps = PageStore::new(3, 2, PixelFormat::Rgb555);
        assert_eq!(ps.page_size(), 12);
        ps.fill(0, 0x7C1F);
        assert_eq!(&ps.page(0)[..4], &[0x1F, 0x7C, 0x1F, 0x7C]);
        ps.copy_scrolled(0, 1, 1);
        assert_eq!(ps.page(1)[..6], ps.page(0)[..6]);
        assert!(ps.page(1)[6..].iter().all(|&b| b == 0));
    }

    #[test]
    fn split_target_views_page0() {
        let mut ps = PageStore::new(2, 2, PixelFormat::Clut);
        ps.fill(0, 5);
        let (dst, p0) = ps.split_target(3);
        assert_eq!(p0.map(|p| p[0]), Some(5));
        dst[0] = 1;
        assert!(ps.split_target(0).1.is_none());
        assert_eq!(ps.page(3)[0], 1);
    }

    #[test]
    #[should_panic]
    fn empty_pages_are_fatal() {
        let _ = PageStore::new(0, 200, PixelFormat::Clut);
    }
}
