use crate::coords::Rect;
use crate::scene::{DrawCmd, DrawList, ZIndex};

/// Opaque handle to an image registered with the image renderer.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct ImageId(pub(crate) usize);

/// Textured quad draw payload; the whole image is stretched over `rect`.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageCmd {
    pub image: ImageId,
    pub rect: Rect,
}

impl DrawList {
    /// Records an image draw command.
    #[inline]
    pub fn push_image(&mut self, z: ZIndex, image: ImageId, rect: Rect) {
        self.push(z, DrawCmd::Image(ImageCmd { image, rect }));
    }
}
