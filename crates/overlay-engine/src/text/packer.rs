/// Row-based rectangle packer for a square atlas.
///
/// Rectangles are placed left to right; when a row ("shelf") runs out of
/// width a new shelf starts below the tallest item of the current one.
#[derive(Debug, Clone)]
pub struct ShelfPacker {
    size: u32,
    padding: u32,
    cursor_x: u32,
    shelf_y: u32,
    shelf_h: u32,
}

impl ShelfPacker {
    pub fn new(size: u32, padding: u32) -> Self {
        Self {
            size,
            padding,
            cursor_x: padding,
            shelf_y: padding,
            shelf_h: 0,
        }
    }

    #[inline]
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Reserves a `w x h` region and returns its top-left corner, or `None`
    /// when the atlas has no room left.
    pub fn allocate(&mut self, w: u32, h: u32) -> Option<[u32; 2]> {
        let pad = self.padding;
        if w + 2 * pad > self.size || h + 2 * pad > self.size {
            return None;
        }

        if self.cursor_x + w + pad > self.size {
            self.shelf_y += self.shelf_h + pad;
            self.cursor_x = pad;
            self.shelf_h = 0;
        }
        if self.shelf_y + h + pad > self.size {
            return None;
        }

        let pos = [self.cursor_x, self.shelf_y];
        self.cursor_x += w + pad;
        self.shelf_h = self.shelf_h.max(h);
        Some(pos)
    }
}
