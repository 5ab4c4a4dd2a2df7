use crate::coords::Vec2;
use crate::paint::Color;
use crate::scene::{DrawCmd, DrawList, ZIndex};

/// Single-line text draw payload.
///
/// Glyph metrics come from the text renderer's atlas; `scale` multiplies the
/// atlas raster size (a 48 px atlas at `scale = 0.5` draws 24 px text).
#[derive(Debug, Clone, PartialEq)]
pub struct TextCmd {
    pub text: String,
    /// Pen start on the baseline, logical pixels.
    pub origin: Vec2,
    pub scale: f32,
    pub color: Color,
}

impl DrawList {
    /// Records a text draw command.
    pub fn push_text(
        &mut self,
        z: ZIndex,
        text: impl Into<String>,
        origin: Vec2,
        scale: f32,
        color: Color,
    ) {
        self.push(z, DrawCmd::Text(TextCmd {
            text: text.into(),
            origin,
            scale,
            color,
        }));
    }
}
