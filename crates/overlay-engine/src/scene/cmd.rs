use super::shapes::image::ImageCmd;
use super::shapes::rect::RectCmd;
use super::shapes::text::TextCmd;

/// Renderer-agnostic draw command stream.
///
/// Extending the scene:
/// - add a new shape module under `scene::shapes::*`
/// - add a new variant here and in [`DrawKind`]
/// - add a matching renderer under `render::*` and a batch arm in `OverlayRenderer`
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCmd {
    Image(ImageCmd),
    Rect(RectCmd),
    Text(TextCmd),
}

/// Which renderer consumes a command.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum DrawKind {
    Image,
    Rect,
    Text,
}

impl DrawCmd {
    #[inline]
    pub fn kind(&self) -> DrawKind {
        match self {
            DrawCmd::Image(_) => DrawKind::Image,
            DrawCmd::Rect(_) => DrawKind::Rect,
            DrawCmd::Text(_) => DrawKind::Text,
        }
    }
}
