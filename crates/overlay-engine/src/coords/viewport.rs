use super::{Rect, Vec2};

/// Viewport size in logical pixels.
///
/// Renderers treat this as the basis for converting logical px positions to NDC.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    #[inline]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite()
    }

    /// Full-viewport rectangle.
    #[inline]
    pub fn rect(self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }

    /// Maps a normalized point (`[0, 1]`, top-left origin) to logical pixels.
    #[inline]
    pub fn denormalize(self, p: Vec2) -> Vec2 {
        Vec2::new(p.x * self.width, p.y * self.height)
    }

    /// Maps normalized corner coordinates to a logical-pixel rectangle.
    #[inline]
    pub fn denormalize_rect(self, min: Vec2, max: Vec2) -> Rect {
        Rect::from_min_max(self.denormalize(min), self.denormalize(max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn denormalize_scales_by_size() {
        let vp = Viewport::new(640.0, 480.0);
        assert_eq!(vp.denormalize(Vec2::new(0.5, 0.25)), Vec2::new(320.0, 120.0));
        assert_eq!(vp.denormalize(Vec2::new(1.0, 1.0)), Vec2::new(640.0, 480.0));
    }

    #[test]
    fn denormalize_rect_spans_corners() {
        let vp = Viewport::new(200.0, 100.0);
        let r = vp.denormalize_rect(Vec2::new(0.1, 0.2), Vec2::new(0.6, 0.7));
        assert!((r.origin.x - 20.0).abs() < 1e-4);
        assert!((r.origin.y - 20.0).abs() < 1e-4);
        assert!((r.size.x - 100.0).abs() < 1e-4);
        assert!((r.size.y - 50.0).abs() < 1e-4);
    }

    #[test]
    fn zero_or_nan_viewport_is_invalid() {
        assert!(!Viewport::new(0.0, 10.0).is_valid());
        assert!(!Viewport::new(f32::NAN, 10.0).is_valid());
        assert!(Viewport::new(1.0, 1.0).is_valid());
    }
}
