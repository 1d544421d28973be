// RustPixel
// copyright zipxing@hotmail.com 2022～2025

//! Drawing errors.
//!
//! None of these are fatal: every outer drawing command logs the error and
//! the next command renders normally.

/// Why a drawing command (or one leaf of a shape) was abandoned
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawError {
    // malformed geometry
    OddVertexCount(usize),
    TooManyVertices(usize),
    UnknownShapeCode(u8),

    // malformed shape stream
    StreamOverrun(usize),
    ShapeDepthExceeded(usize),

    // resource contract violations
    SpriteOutOfRange(u8),
    UnsupportedBitmap { width: usize, height: usize },
    InvalidPage(u8),

    // still capture
    Capture(String),
}

impl std::fmt::Display for DrawError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DrawError::OddVertexCount(n) => {
                write!(f, "unexpected number of vertices {}", n)
            }
            DrawError::TooManyVertices(n) => {
                write!(f, "too many vertices {}", n)
            }
            DrawError::UnknownShapeCode(code) => {
                write!(f, "unhandled shape code 0x{:X}", code)
            }
            DrawError::StreamOverrun(pos) => {
                write!(f, "shape stream read past end at offset 0x{:X}", pos)
            }
            DrawError::ShapeDepthExceeded(depth) => {
                write!(f, "shape nesting depth {} exceeds limit", depth)
            }
            DrawError::SpriteOutOfRange(num) => {
                write!(f, "sprite {} not in table", num)
            }
            DrawError::UnsupportedBitmap { width, height } => {
                write!(f, "unhandled bitmap w {} h {}", width, height)
            }
            DrawError::InvalidPage(raw) => {
                write!(f, "page 0x{:X} is not in [0,1,2,3,0xFE,0xFF]", raw)
            }
            DrawError::Capture(msg) => {
                write!(f, "screen capture failed: {}", msg)
            }
        }
    }
}

impl std::error::Error for DrawError {}

pub type Result<T> = std::result::Result<T, DrawError>;

impl DrawError {
    /// Errors that only abandon the current polygon, decoding carries on
    /// with the next sibling shape
    pub fn is_leaf_local(&self) -> bool {
        matches!(
            self,
            DrawError::OddVertexCount(_)
                | DrawError::TooManyVertices(_)
                | DrawError::UnknownShapeCode(_)
                | DrawError::SpriteOutOfRange(_)
        )
    }
}
