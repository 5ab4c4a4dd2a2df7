use crate::coords::Rect;
use crate::paint::Color;
use crate::scene::{DrawCmd, DrawList, ZIndex};

use super::Stroke;

/// Solid rectangle draw payload.
#[derive(Debug, Clone, PartialEq)]
pub struct RectCmd {
    pub rect: Rect,
    pub color: Color,
}

impl RectCmd {
    #[inline]
    pub fn new(rect: Rect, color: Color) -> Self {
        Self { rect, color }
    }
}

/// The four edge bands of a stroked rectangle outline.
///
/// Bands are centered on the edges (half the stroke inside, half outside) and
/// do not overlap, so translucent strokes have uniform alpha at the corners.
/// Top and bottom bands span the full outer width; left and right bands fill
/// the gap between them.
pub fn outline_bands(rect: Rect, width: f32) -> [Rect; 4] {
    let r = rect.normalized();
    let outer = r.inflate(width * 0.5);
    let min = outer.min();
    let max = outer.max();
    let inner_h = (outer.size.y - 2.0 * width).max(0.0);

    [
        Rect::new(min.x, min.y, outer.size.x, width),
        Rect::new(min.x, max.y - width, outer.size.x, width),
        Rect::new(min.x, min.y + width, width, inner_h),
        Rect::new(max.x - width, min.y + width, width, inner_h),
    ]
}

impl DrawList {
    /// Records a solid rectangle draw command.
    #[inline]
    pub fn push_rect(&mut self, z: ZIndex, rect: Rect, color: Color) {
        self.push(z, DrawCmd::Rect(RectCmd::new(rect, color)));
    }

    /// Records a rectangle outline as four solid edge bands.
    pub fn push_rect_outline(&mut self, z: ZIndex, rect: Rect, stroke: Stroke) {
        if stroke.width <= 0.0 || !rect.is_finite() {
            return;
        }
        for band in outline_bands(rect, stroke.width) {
            if !band.is_empty() {
                self.push_rect(z, band, stroke.color);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Rect, b: Rect) -> bool {
        (a.origin.x - b.origin.x).abs() < 1e-4
            && (a.origin.y - b.origin.y).abs() < 1e-4
            && (a.size.x - b.size.x).abs() < 1e-4
            && (a.size.y - b.size.y).abs() < 1e-4
    }

    #[test]
    fn bands_straddle_edges() {
        let [top, bottom, left, right] = outline_bands(Rect::new(10.0, 20.0, 100.0, 50.0), 2.0);
        assert!(approx(top, Rect::new(9.0, 19.0, 102.0, 2.0)));
        assert!(approx(bottom, Rect::new(9.0, 69.0, 102.0, 2.0)));
        assert!(approx(left, Rect::new(9.0, 21.0, 2.0, 48.0)));
        assert!(approx(right, Rect::new(109.0, 21.0, 2.0, 48.0)));
    }

    #[test]
    fn bands_from_inverted_rect_match_normalized() {
        let a = outline_bands(Rect::new(110.0, 70.0, -100.0, -50.0), 2.0);
        let b = outline_bands(Rect::new(10.0, 20.0, 100.0, 50.0), 2.0);
        for (x, y) in a.iter().zip(b.iter()) {
            assert!(approx(*x, *y));
        }
    }

    #[test]
    fn thin_rect_skips_empty_side_bands() {
        let mut list = DrawList::new();
        let stroke = Stroke::new(4.0, Color::white());
        list.push_rect_outline(ZIndex(0), Rect::new(0.0, 0.0, 50.0, 1.0), stroke);
        // Height 1 + stroke 4 leaves no room between top and bottom bands.
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn zero_width_stroke_records_nothing() {
        let mut list = DrawList::new();
        list.push_rect_outline(
            ZIndex(0),
            Rect::new(0.0, 0.0, 10.0, 10.0),
            Stroke::new(0.0, Color::white()),
        );
        assert!(list.is_empty());
    }
}
