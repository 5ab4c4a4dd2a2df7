use super::{DrawCmd, SortKey, ZIndex};

/// A single draw item: sort key + command.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawItem {
    pub key: SortKey,
    pub cmd: DrawCmd,
}

/// Recorded draw stream for a frame.
///
/// - `push()` is O(1)
/// - paint-order iteration reuses an internal index buffer; no per-frame
///   allocation once warmed
#[derive(Debug, Default)]
pub struct DrawList {
    items: Vec<DrawItem>,
    next_order: u32,

    sorted_indices: Vec<usize>,
    sorted_dirty: bool,
}

impl DrawList {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears recorded items. Keeps allocated capacity for reuse.
    #[inline]
    pub fn clear(&mut self) {
        self.items.clear();
        self.next_order = 0;
        self.sorted_dirty = true;
        self.sorted_indices.clear();
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns items in insertion order.
    #[inline]
    pub fn items(&self) -> &[DrawItem] {
        &self.items
    }

    /// Pushes a draw command with the given z-index.
    #[inline]
    pub fn push(&mut self, z: ZIndex, cmd: DrawCmd) {
        let order = self.next_order;
        self.next_order = self.next_order.wrapping_add(1);

        self.items.push(DrawItem {
            key: SortKey::new(z, order),
            cmd,
        });

        self.sorted_dirty = true;
    }

    /// Iterates items in paint order (back-to-front) without cloning commands.
    pub fn iter_in_paint_order(&mut self) -> impl Iterator<Item = &DrawItem> {
        if self.sorted_dirty {
            self.rebuild_sorted_indices();
        }

        self.sorted_indices.iter().map(|&i| &self.items[i])
    }

    fn rebuild_sorted_indices(&mut self) {
        self.sorted_indices.clear();
        self.sorted_indices.extend(0..self.items.len());

        // SortKey includes insertion order, so an unstable sort is deterministic.
        let items = &self.items;
        self.sorted_indices
            .sort_unstable_by_key(|&i| items[i].key);

        self.sorted_dirty = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::Rect;
    use crate::paint::Color;
    use crate::scene::DrawKind;

    fn rect_at(x: f32) -> Rect {
        Rect::new(x, 0.0, 1.0, 1.0)
    }

    fn xs(list: &mut DrawList) -> Vec<f32> {
        list.iter_in_paint_order()
            .map(|item| match &item.cmd {
                DrawCmd::Rect(r) => r.rect.origin.x,
                _ => f32::NAN,
            })
            .collect()
    }

    #[test]
    fn paint_order_sorts_by_z_then_insertion() {
        let mut list = DrawList::new();
        list.push_rect(ZIndex(2), rect_at(0.0), Color::white());
        list.push_rect(ZIndex(1), rect_at(1.0), Color::white());
        list.push_rect(ZIndex(2), rect_at(2.0), Color::white());
        list.push_rect(ZIndex(0), rect_at(3.0), Color::white());

        assert_eq!(xs(&mut list), vec![3.0, 1.0, 0.0, 2.0]);
    }

    #[test]
    fn clear_resets_items_and_order() {
        let mut list = DrawList::new();
        list.push_rect(ZIndex(0), rect_at(0.0), Color::white());
        list.clear();
        assert!(list.is_empty());
        assert_eq!(list.iter_in_paint_order().count(), 0);

        list.push_rect(ZIndex(0), rect_at(5.0), Color::white());
        assert_eq!(list.items()[0].key.order, 0);
        assert_eq!(xs(&mut list), vec![5.0]);
    }

    #[test]
    fn pushes_after_iteration_are_resorted() {
        let mut list = DrawList::new();
        list.push_rect(ZIndex(1), rect_at(0.0), Color::white());
        assert_eq!(xs(&mut list), vec![0.0]);

        list.push_rect(ZIndex(0), rect_at(1.0), Color::white());
        assert_eq!(xs(&mut list), vec![1.0, 0.0]);
    }

    #[test]
    fn kinds_follow_commands() {
        let mut list = DrawList::new();
        list.push_rect(ZIndex(0), rect_at(0.0), Color::white());
        list.push_text(ZIndex(0), "a", crate::coords::Vec2::zero(), 1.0, Color::white());
        let kinds: Vec<_> = list.iter_in_paint_order().map(|i| i.cmd.kind()).collect();
        assert_eq!(kinds, vec![DrawKind::Rect, DrawKind::Text]);
    }
}
