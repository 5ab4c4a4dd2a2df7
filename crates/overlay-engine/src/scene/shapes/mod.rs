//! Shape payloads and their `DrawList` push helpers.

pub mod image;
pub mod rect;
pub mod text;

use crate::paint::Color;

/// Stroke centered on a shape's edge.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Stroke {
    pub width: f32,
    pub color: Color,
}

impl Stroke {
    #[inline]
    pub fn new(width: f32, color: Color) -> Self {
        Self { width, color }
    }
}
