// RustPixel
// copyright zipxing@hotmail.com 2022～2025

//! Utilities for points in the 320x200 design space, big/little endian
//! readers for resource bytes, and the fixed-point stepper: fixed.rs

use serde::{Deserialize, Serialize};

pub mod fixed;
pub use fixed::*;

/// Signed point in the logical 320x200 design space.
///
/// Coordinates may leave that range while shapes are being decoded,
/// everything is culled or clipped before a pixel gets written.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PointI16 {
    pub x: i16,
    pub y: i16,
}

impl PointI16 {
    pub fn new(x: i16, y: i16) -> Self {
        Self { x, y }
    }

    /// Scales by 16.16 factors, as computed by `scale_factor`
    pub fn scale(&mut self, u: i32, v: i32) {
        self.x = ((self.x as i64 * u as i64) >> 16) as i16;
        self.y = ((self.y as i64 * v as i64) >> 16) as i16;
    }

    /// Moves by (dx, dy) with 16 bit wrap-around
    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: (self.x as i32 + dx) as i16,
            y: (self.y as i32 + dy) as i16,
        }
    }
}

/// 16.16 ratio between an output size and the design size
pub fn scale_factor(size: usize, design: usize) -> i32 {
    ((size << 16) / design) as i32
}

pub fn read_be_u16(data: &[u8], pos: usize) -> Option<u16> {
    let b = data.get(pos..pos + 2)?;
    Some(u16::from_be_bytes([b[0], b[1]]))
}

pub fn read_le_u16(data: &[u8], pos: usize) -> Option<u16> {
    let b = data.get(pos..pos + 2)?;
    Some(u16::from_le_bytes([b[0], b[1]]))
}

pub fn read_le_u32(data: &[u8], pos: usize) -> Option<u32> {
    let b = data.get(pos..pos + 4)?;
    Some(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scale_halves_and_doubles() {
        let mut p = PointI16::new(100, 50);
        p.scale(scale_factor(640, 320), scale_factor(400, 200));
        assert_eq!(p, PointI16::new(200, 100));

        let mut p = PointI16::new(-10, 199);
        p.scale(scale_factor(160, 320), scale_factor(100, 200));
        assert_eq!(p, PointI16::new(-5, 99));
    }

    #[test]
    fn offset_wraps_like_int16() {
        let p = PointI16::new(i16::MAX, 0).offset(1, -1);
        assert_eq!(p, PointI16::new(i16::MIN, -1));
    }

    #[test]
    fn readers_respect_bounds() {
        let d = [0x12, 0x34, 0x56, 0x78];
        assert_eq!(read_be_u16(&d, 0), Some(0x1234));
        assert_eq!(read_le_u16(&d, 2), Some(0x7856));
        assert_eq!(read_le_u32(&d, 0), Some(0x7856_3412));
        assert_eq!(read_be_u16(&d, 3), None);
        assert_eq!(read_le_u32(&d, 1), None);
    }
}
