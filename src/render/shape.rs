// RustPixel
// copyright zipxing@hotmail.com 2022～2025

//! Shape stream decoder.
//!
//! A shape is either a leaf (a polygon, or for the 3DO layout also a
//! rectangle or a point) or a group: a local origin and a list of children,
//! each child pointing at another shape of the same stream by word offset.
//! Groups are walked with an owned stack instead of native recursion, so a
//! stream that points back into itself stops at `max_depth` with
//! `ShapeDepthExceeded` rather than overflowing.
//!
//! Coordinates read from the stream are scaled by `zoom / 64`.
//!
//! Drawing goes to a `ShapeCanvas`; the decoder never touches pages.

use crate::render::error::{DrawError, Result};
use crate::render::raster::{QuadStrip, MAX_VERTICES};
use crate::util::PointI16;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

/// Zoom that keeps stream coordinates unchanged
pub const ZOOM_IDENTITY: u16 = 64;
pub const DEFAULT_MAX_DEPTH: usize = 32;
/// Colour argument asking for the colour stored in the stream
pub const EMBEDDED_COLOR: u8 = 0xFF;

const DESIGN_MAX_X: i32 = 319;
const DESIGN_MAX_Y: i32 = 199;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeFormat {
    /// DOS, Amiga, Atari and Windows data
    #[default]
    Generic,
    /// 3DO data: other leaf codes and little endian words
    ThreeDo,
}

/// Read cursor into a stream owned by the resource loader
#[derive(Debug, Clone)]
pub struct ShapeStream<'a> {
    data: &'a [u8],
    pub pc: usize,
    byte_swap: bool,
}

impl<'a> ShapeStream<'a> {
    pub fn new(data: &'a [u8], pc: usize, byte_swap: bool) -> Self {
        Self { data, pc, byte_swap }
    }

    pub fn fetch_byte(&mut self) -> Result<u8> {
        let b = *self.data.get(self.pc).ok_or(DrawError::StreamOverrun(self.pc))?;
        self.pc += 1;
        Ok(b)
    }

    pub fn fetch_word(&mut self) -> Result<u16> {
        let b = self
            .data
            .get(self.pc..self.pc + 2)
            .ok_or(DrawError::StreamOverrun(self.pc))?;
        self.pc += 2;
        Ok(if self.byte_swap {
            u16::from_le_bytes([b[0], b[1]])
        } else {
            u16::from_be_bytes([b[0], b[1]])
        })
    }
}

/// Where decoded shapes are drawn; colours are raw command colours
pub trait ShapeCanvas {
    fn fill_polygon(&mut self, color: u8, qs: &QuadStrip) -> Result<()>;
    fn draw_point(&mut self, color: u8, pt: PointI16);
    /// Pre-rasterized mask sprite of the 1991 edition
    fn draw_sprite(&mut self, num: u8, pt: PointI16, color: u8) -> Result<()>;
    /// Pre-rasterized 3DO shape part
    fn draw_shape_part(&mut self, color: u8, part: u8, pt: PointI16) -> Result<()>;
}

/// An open group on the decode stack
#[derive(Debug, Clone, Copy)]
struct ShapeGroup {
    origin: PointI16,
    remaining: u16,
    cursor: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Child {
    Shape { offset: usize, pos: PointI16, color: u8 },
    Sprite { num: u8, pos: PointI16, color: u8 },
    Part { num: u8, pos: PointI16, color: u8 },
}

fn zoomed(b: u8, zoom: u16) -> i32 {
    b as i32 * zoom as i32 / 64
}

pub struct ShapeDecoder<'a> {
    stream: ShapeStream<'a>,
    format: ShapeFormat,
    max_depth: usize,
    legacy_sprites: bool,
    skipped: usize,
}

impl<'a> ShapeDecoder<'a> {
    /// Decoder positioned at `offset`; 3DO streams default to little
    /// endian words
    pub fn new(data: &'a [u8], offset: usize, format: ShapeFormat) -> Self {
        Self {
            stream: ShapeStream::new(data, offset, format == ShapeFormat::ThreeDo),
            format,
            max_depth: DEFAULT_MAX_DEPTH,
            legacy_sprites: false,
            skipped: 0,
        }
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Children flagged as sprites draw 1991 mask sprites
    pub fn with_legacy_sprites(mut self, on: bool) -> Self {
        self.legacy_sprites = on;
        self
    }

    pub fn with_byte_swap(mut self, on: bool) -> Self {
        self.stream.byte_swap = on;
        self
    }

    /// Leaves abandoned with a warning during the last decode
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn pc(&self) -> usize {
        self.stream.pc
    }

    /// Decodes the shape at the cursor and everything it references.
    ///
    /// Malformed leaves are logged and skipped. A stream overrun or a
    /// nesting deeper than `max_depth` abandons the whole shape.
    pub fn decode<C: ShapeCanvas>(
        &mut self,
        canvas: &mut C,
        color: u8,
        zoom: u16,
        pt: PointI16,
    ) -> Result<()> {
        self.skipped = 0;
        let mut stack: Vec<ShapeGroup> = Vec::new();
        self.shape(canvas, color, zoom, pt, &mut stack)?;

        while let Some(group) = stack.last_mut() {
            if group.remaining == 0 {
                stack.pop();
                continue;
            }
            group.remaining -= 1;
            self.stream.pc = group.cursor;
            let child = match self.format {
                ShapeFormat::Generic => self.child(zoom, group.origin)?,
                ShapeFormat::ThreeDo => self.child_3do(zoom, group.origin)?,
            };
            group.cursor = self.stream.pc;

            let drawn = match child {
                Child::Shape { offset, pos, color } => {
                    self.stream.pc = offset;
                    self.shape(canvas, color, zoom, pos, &mut stack)?;
                    continue;
                }
                Child::Sprite { num, pos, color } => canvas.draw_sprite(num, pos, color),
                Child::Part { num, pos, color } => canvas.draw_shape_part(color, num, pos),
            };
            self.leaf(drawn)?;
        }
        Ok(())
    }

    /// Keeps decoding past leaf-local errors
    fn leaf(&mut self, r: Result<()>) -> Result<()> {
        match r {
            Err(e) if e.is_leaf_local() => {
                warn!("shape at 0x{:X}: {}", self.stream.pc, e);
                self.skipped += 1;
                Ok(())
            }
            r => r,
        }
    }

    fn open_group(&mut self, origin: PointI16, count: u16, stack: &mut Vec<ShapeGroup>) -> Result<()> {
        if stack.len() >= self.max_depth {
            return Err(DrawError::ShapeDepthExceeded(stack.len() + 1));
        }
        debug!("shape group n={} at {:?}", count, origin);
        stack.push(ShapeGroup {
            origin,
            remaining: count,
            cursor: self.stream.pc,
        });
        Ok(())
    }

    fn shape<C: ShapeCanvas>(
        &mut self,
        canvas: &mut C,
        color: u8,
        zoom: u16,
        pt: PointI16,
        stack: &mut Vec<ShapeGroup>,
    ) -> Result<()> {
        match self.format {
            ShapeFormat::Generic => self.shape_generic(canvas, color, zoom, pt, stack),
            ShapeFormat::ThreeDo => self.shape_3do(canvas, color, zoom, pt, stack),
        }
    }

    fn shape_generic<C: ShapeCanvas>(
        &mut self,
        canvas: &mut C,
        color: u8,
        zoom: u16,
        pt: PointI16,
        stack: &mut Vec<ShapeGroup>,
    ) -> Result<()> {
        let code = self.stream.fetch_byte()?;
        if code >= 0xC0 {
            let color = if color & 0x80 != 0 { code & 0x3F } else { color };
            let r = self.fill_polygon(canvas, color, zoom, pt);
            return self.leaf(r);
        }
        if code & 0x3F != 2 {
            return self.leaf(Err(DrawError::UnknownShapeCode(code)));
        }
        let dx = zoomed(self.stream.fetch_byte()?, zoom);
        let dy = zoomed(self.stream.fetch_byte()?, zoom);
        let n = self.stream.fetch_byte()? as u16;
        self.open_group(pt.offset(-dx, -dy), n + 1, stack)
    }

    /// Polygon leaf: bounding box, vertex count, vertices from its corner
    fn fill_polygon<C: ShapeCanvas>(
        &mut self,
        canvas: &mut C,
        color: u8,
        zoom: u16,
        pt: PointI16,
    ) -> Result<()> {
        let bbw = zoomed(self.stream.fetch_byte()?, zoom);
        let bbh = zoomed(self.stream.fetch_byte()?, zoom);
        let (px, py) = (pt.x as i32, pt.y as i32);
        let x1 = (px - bbw / 2) as i16;
        let x2 = (px + bbw / 2) as i16;
        let y1 = (py - bbh / 2) as i16;
        let y2 = (py + bbh / 2) as i16;
        if x1 as i32 > DESIGN_MAX_X || x2 < 0 || y1 as i32 > DESIGN_MAX_Y || y2 < 0 {
            return Ok(());
        }

        let n = self.stream.fetch_byte()? as usize;
        if n & 1 != 0 {
            return Err(DrawError::OddVertexCount(n));
        }
        if n >= MAX_VERTICES {
            return Err(DrawError::TooManyVertices(n));
        }
        let corner = PointI16::new(x1, y1);
        let mut qs = QuadStrip::new();
        for _ in 0..n {
            let x = zoomed(self.stream.fetch_byte()?, zoom);
            let y = zoomed(self.stream.fetch_byte()?, zoom);
            qs.vertices.push(corner.offset(x, y));
        }

        if n == 4 && bbw == 0 && bbh <= 1 {
            canvas.draw_point(color, pt);
            Ok(())
        } else {
            canvas.fill_polygon(color, &qs)
        }
    }

    fn child(&mut self, zoom: u16, origin: PointI16) -> Result<Child> {
        let mut offset = self.stream.fetch_word()?;
        let dx = zoomed(self.stream.fetch_byte()?, zoom);
        let dy = zoomed(self.stream.fetch_byte()?, zoom);
        let pos = origin.offset(dx, dy);
        let mut color = EMBEDDED_COLOR;
        if offset & 0x8000 != 0 {
            color = self.stream.fetch_byte()?;
            let num = self.stream.fetch_byte()?;
            if self.legacy_sprites && color & 0x80 != 0 {
                return Ok(Child::Sprite {
                    num,
                    pos,
                    color: color & 0x7F,
                });
            }
            color &= 0x7F;
        }
        offset <<= 1;
        Ok(Child::Shape {
            offset: offset as usize,
            pos,
            color,
        })
    }

    fn shape_3do<C: ShapeCanvas>(
        &mut self,
        canvas: &mut C,
        color: u8,
        zoom: u16,
        pt: PointI16,
        stack: &mut Vec<ShapeGroup>,
    ) -> Result<()> {
        let code = self.stream.fetch_byte()?;
        debug!("3do shape code=0x{:x} pt={},{}", code, pt.x, pt.y);
        let color = if color == EMBEDDED_COLOR { code & 31 } else { color };
        let r = match code & 0xE0 {
            0x00 => {
                let dx = zoomed(self.stream.fetch_byte()?, zoom);
                let dy = zoomed(self.stream.fetch_byte()?, zoom);
                let count = self.stream.fetch_byte()? as u16 + 1;
                return self.open_group(pt.offset(-dx, -dy), count, stack);
            }
            0x20 => self.rect_3do(canvas, color, zoom, pt),
            0x40 => {
                let (x, y) = (pt.x as i32, pt.y as i32);
                if (0..=DESIGN_MAX_X).contains(&x) && (0..=DESIGN_MAX_Y).contains(&y) {
                    canvas.draw_point(color, pt);
                }
                Ok(())
            }
            0xC0 => self.polygon_3do(canvas, color, zoom, pt),
            _ => Err(DrawError::UnknownShapeCode(code)),
        };
        self.leaf(r)
    }

    fn rect_3do<C: ShapeCanvas>(&mut self, canvas: &mut C, color: u8, zoom: u16, pt: PointI16) -> Result<()> {
        let w = zoomed(self.stream.fetch_byte()?, zoom);
        let h = zoomed(self.stream.fetch_byte()?, zoom);
        let x1 = pt.x as i32 - w / 2;
        let y1 = pt.y as i32 - h / 2;
        let (x2, y2) = (x1 + w, y1 + h);
        if x1 > DESIGN_MAX_X || x2 < 0 || y1 > DESIGN_MAX_Y || y2 < 0 {
            return Ok(());
        }
        let mut qs = QuadStrip::new();
        qs.push(x2 as i16, y1 as i16);
        qs.push(x2 as i16, y2 as i16);
        qs.push(x1 as i16, y2 as i16);
        qs.push(x1 as i16, y1 as i16);
        canvas.fill_polygon(color, &qs)
    }

    /// `count` triples (x1, x2, y) giving a 2 * count vertex strip
    fn polygon_3do<C: ShapeCanvas>(&mut self, canvas: &mut C, color: u8, zoom: u16, pt: PointI16) -> Result<()> {
        let w = zoomed(self.stream.fetch_byte()?, zoom);
        let h = zoomed(self.stream.fetch_byte()?, zoom);
        let count = self.stream.fetch_byte()? as usize;
        let n = count * 2;
        if n >= MAX_VERTICES {
            return Err(DrawError::TooManyVertices(n));
        }
        let (px, py) = (pt.x as i32, pt.y as i32);
        let x0 = px - w / 2;
        let y0 = py - h / 2;
        if count == 0 || x0 > DESIGN_MAX_X || px + w / 2 < 0 || y0 > DESIGN_MAX_Y || py + h / 2 < 0 {
            return Ok(());
        }
        let mut v = vec![PointI16::default(); n];
        for i in 0..count {
            let j = n - 1 - i;
            let x1 = zoomed(self.stream.fetch_byte()?, zoom);
            let x2 = zoomed(self.stream.fetch_byte()?, zoom);
            let y = (y0 + zoomed(self.stream.fetch_byte()?, zoom)) as i16;
            let next = (i + 1) % count;
            v[i].x = (x0 + x2) as i16;
            v[next].y = y;
            v[j].x = (x0 + x1) as i16;
            v[n - 1 - next].y = y;
        }
        canvas.fill_polygon(color, &QuadStrip::from_vertices(v))
    }

    fn child_3do(&mut self, zoom: u16, origin: PointI16) -> Result<Child> {
        let offset = self.stream.fetch_word()?;
        let dx = zoomed(self.stream.fetch_byte()?, zoom);
        let dy = zoomed(self.stream.fetch_byte()?, zoom);
        let pos = origin.offset(dx, dy);
        let mut color = EMBEDDED_COLOR;
        if offset & 0x8000 != 0 {
            color = self.stream.fetch_byte()?;
            let num = self.stream.fetch_byte()?;
            if color & 0x80 != 0 {
                return Ok(Child::Part {
                    num,
                    pos,
                    color: color & 0xF,
                });
            }
        }
        Ok(Child::Shape {
            offset: (offset << 1) as usize,
            pos,
            color,
        })
    }
}
