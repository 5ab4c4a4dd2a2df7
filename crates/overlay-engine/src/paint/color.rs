/// Linear premultiplied RGBA color.
///
/// Invariant: `r`, `g`, `b` are already multiplied by `a`.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Color {
    pub r: f32, // premultiplied
    pub g: f32, // premultiplied
    pub b: f32, // premultiplied
    pub a: f32,
}

impl Color {
    #[inline]
    pub const fn white() -> Self {
        Self { r: 1.0, g: 1.0, b: 1.0, a: 1.0 }
    }

    /// Creates a premultiplied color from straight-alpha components in `[0, 1]`.
    ///
    /// Inputs are clamped.
    #[inline]
    pub fn from_straight(r: f32, g: f32, b: f32, a: f32) -> Self {
        let a = a.clamp(0.0, 1.0);
        Self {
            r: r.clamp(0.0, 1.0) * a,
            g: g.clamp(0.0, 1.0) * a,
            b: b.clamp(0.0, 1.0) * a,
            a,
        }
    }

    /// Straight RGB triple + alpha, the form detections carry their color in.
    #[inline]
    pub fn from_rgb(rgb: [f32; 3], a: f32) -> Self {
        Self::from_straight(rgb[0], rgb[1], rgb[2], a)
    }

    /// Returns a straight-alpha representation. For `a == 0`, RGB is 0.
    #[inline]
    pub fn to_straight(self) -> (f32, f32, f32, f32) {
        if self.a <= 0.0 {
            (0.0, 0.0, 0.0, 0.0)
        } else {
            let inv = 1.0 / self.a;
            (self.r * inv, self.g * inv, self.b * inv, self.a)
        }
    }

    /// RGB complement (`1 - c` in straight space) at the same alpha.
    ///
    /// Used for label text so it contrasts with its background box.
    #[inline]
    pub fn inverted(self) -> Self {
        let (r, g, b, a) = self.to_straight();
        Self::from_straight(1.0 - r, 1.0 - g, 1.0 - b, a)
    }

    /// Same straight color at a different alpha.
    #[inline]
    pub fn with_alpha(self, a: f32) -> Self {
        let (r, g, b, _) = self.to_straight();
        Self::from_straight(r, g, b, a)
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.r.is_finite() && self.g.is_finite() && self.b.is_finite() && self.a.is_finite()
    }

    /// Vertex-attribute layout (`Float32x4`).
    #[inline]
    pub const fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Clear-color form expected by render pass load ops.
    #[inline]
    pub fn to_wgpu(self) -> wgpu::Color {
        wgpu::Color {
            r: self.r as f64,
            g: self.g as f64,
            b: self.b as f64,
            a: self.a as f64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn from_straight_premultiplies_and_clamps() {
        let c = Color::from_straight(1.0, 0.5, 2.0, 0.8);
        assert!(close(c.r, 0.8));
        assert!(close(c.g, 0.4));
        assert!(close(c.b, 0.8));
        assert!(close(c.a, 0.8));
    }

    #[test]
    fn straight_round_trip() {
        let (r, g, b, a) = Color::from_rgb([0.2, 0.4, 0.6], 0.5).to_straight();
        assert!(close(r, 0.2) && close(g, 0.4) && close(b, 0.6) && close(a, 0.5));
    }

    #[test]
    fn inverted_complements_rgb_and_keeps_alpha() {
        let c = Color::from_rgb([1.0, 0.0, 0.25], 0.8).inverted();
        let (r, g, b, a) = c.to_straight();
        assert!(close(r, 0.0));
        assert!(close(g, 1.0));
        assert!(close(b, 0.75));
        assert!(close(a, 0.8));
    }

    #[test]
    fn fully_transparent_has_zero_straight_rgb() {
        assert_eq!(Color::default().to_straight(), (0.0, 0.0, 0.0, 0.0));
    }

    #[test]
    fn with_alpha_rescales_premultiplied_channels() {
        let c = Color::white().with_alpha(0.5);
        assert!(close(c.r, 0.5) && close(c.a, 0.5));
    }
}
