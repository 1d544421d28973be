// RustPixel
// copyright zipxing@hotmail.com 2022～2025

//! Fixed-point stepping.
//!
//! `Frac` is a 16.16 position advanced by a constant increment, it can also
//! blend two 8 bit samples at its fractional offset (used by resamplers).
//! `EdgeStep` is the 16.16 x accumulator of one polygon edge, advanced once
//! per scanline by the increment computed in `calc_step`.

use crate::util::PointI16;

pub const FRAC_BITS: u32 = 16;
pub const FRAC_MASK: u64 = (1 << FRAC_BITS) - 1;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Frac {
    pub inc: u32,
    pub offset: u64,
}

impl Frac {
    /// Position 0 advancing by n/d per step
    pub fn new(n: u32, d: u32) -> Self {
        let mut f = Frac::default();
        f.reset(n, d);
        f
    }

    pub fn reset(&mut self, n: u32, d: u32) {
        self.inc = (((n as u64) << FRAC_BITS) / d.max(1) as u64) as u32;
        self.offset = 0;
    }

    pub fn step(&mut self) {
        self.offset += self.inc as u64;
    }

    pub fn get_int(&self) -> u32 {
        (self.offset >> FRAC_BITS) as u32
    }

    pub fn get_frac(&self) -> u32 {
        (self.offset & FRAC_MASK) as u32
    }

    /// Linear blend of two samples at the current fractional offset
    pub fn interpolate(&self, sample1: i8, sample2: i8) -> i32 {
        let fp = self.get_frac() as i64;
        let v = sample1 as i64 * ((1 << FRAC_BITS) - fp) + sample2 as i64 * fp;
        (v >> FRAC_BITS) as i32
    }
}

/// Per-scanline x increment from p1 to p2 and the scanline count |dy|.
///
/// The increment is a 0x4000 scaled reciprocal multiply, dy of 0 or 1
/// divides by 1.
pub fn calc_step(p1: PointI16, p2: PointI16) -> (u32, u16) {
    let dy = (p2.y as i32 - p1.y as i32).unsigned_abs() as u16;
    let delta = if dy <= 1 { 1 } else { dy as i32 };
    let dx = p2.x as i32 - p1.x as i32;
    let step = dx.wrapping_mul(0x4000 / delta).wrapping_shl(2);
    (step as u32, dy)
}

/// 16.16 x position of a polygon edge, wrapping like the 32 bit register
/// it models.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeStep {
    pub cpt: u32,
}

impl EdgeStep {
    pub fn new(x: i16) -> Self {
        Self {
            cpt: ((x as i32) << 16) as u32,
        }
    }

    /// Left edges round down at the half pixel
    pub fn align_left(&mut self) {
        self.cpt = (self.cpt & 0xFFFF_0000) | 0x7FFF;
    }

    /// Right edges round up at the half pixel
    pub fn align_right(&mut self) {
        self.cpt = (self.cpt & 0xFFFF_0000) | 0x8000;
    }

    pub fn advance(&mut self, step: u32) {
        self.cpt = self.cpt.wrapping_add(step);
    }

    /// Integer part, truncated
    pub fn x(&self) -> i16 {
        (self.cpt >> 16) as u16 as i16
    }
}
