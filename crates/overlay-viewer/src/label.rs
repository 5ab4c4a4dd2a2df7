//! Geometry of one detection's overlay: box outline, label background and
//! label text placement.

use overlay_engine::coords::{Rect, Vec2, Viewport};
use overlay_engine::paint::Color;
use overlay_engine::text::{line_advance, GlyphAtlas};

use crate::detection::Detection;

/// Alpha of outlines, label backgrounds and label text.
pub const OVERLAY_ALPHA: f32 = 0.8;
/// Outline stroke width in logical pixels.
pub const OUTLINE_WIDTH: f32 = 2.6;

/// Unscaled horizontal padding added to the text advance.
const BG_PADDING: f32 = 10.0;
/// Background height as a multiple of the 'X' glyph height.
const BG_HEIGHT_FACTOR: f32 = 1.7;
/// Boxes starting closer than this to the top get their label below the edge.
const TOP_MARGIN: f32 = 20.0;
const BASELINE_OFFSET: f32 = 6.0;
const MIN_BASELINE: f32 = 15.0;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LabelStyle {
    pub scale: f32,
    pub show_score: bool,
}

impl Default for LabelStyle {
    fn default() -> Self {
        Self {
            scale: 0.35,
            show_score: false,
        }
    }
}

/// Everything needed to draw one detection, in logical pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelLayout {
    pub outline: Rect,
    pub background: Rect,
    /// Pen start of the label text on its baseline.
    pub baseline: Vec2,
    pub text: String,
    pub box_color: Color,
    pub text_color: Color,
}

pub fn label_text(det: &Detection, style: &LabelStyle) -> String {
    if style.show_score {
        format!("{} {:.2}", det.label, det.score)
    } else {
        det.label.clone()
    }
}

/// Places `det` in a `viewport`-sized window.
///
/// The background box hugs the top-left corner of the detection: above the
/// top edge, or just below it when the box starts within `TOP_MARGIN` px of
/// the window top.
pub fn layout_label(
    det: &Detection,
    viewport: Viewport,
    atlas: &GlyphAtlas,
    style: &LabelStyle,
) -> LabelLayout {
    let outline = viewport.denormalize_rect(
        Vec2::new(det.xmin, det.ymin),
        Vec2::new(det.xmax, det.ymax),
    );
    let Vec2 { x, y } = outline.min();

    let text = label_text(det, style);
    let bg_w = (BG_PADDING + line_advance(atlas, &text)) * style.scale;
    let glyph_h = atlas
        .get('X')
        .map_or(atlas.px_size(), |g| g.size[1] as f32);
    let bg_h = glyph_h * BG_HEIGHT_FACTOR * style.scale;

    let bg_top = if y < TOP_MARGIN { y + 1.0 } else { y - 1.0 - bg_h };
    let background = Rect::new(x, bg_top, bg_w, bg_h);
    let baseline = Vec2::new(x + 1.0, (y - BASELINE_OFFSET).max(MIN_BASELINE));

    let box_color = Color::from_rgb(det.color, OVERLAY_ALPHA);
    LabelLayout {
        outline,
        background,
        baseline,
        text,
        box_color,
        text_color: box_color.inverted(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use overlay_engine::text::GlyphBitmap;

    fn glyph(ch: char, w: u32, h: u32, advance: f32) -> GlyphBitmap {
        GlyphBitmap {
            ch,
            width: w,
            height: h,
            bearing: [0, h as i32],
            advance,
            coverage: vec![255; (w * h) as usize],
        }
    }

    /// Every glyph advances 20 px; 'X' is 30 px tall.
    fn atlas() -> GlyphAtlas {
        let mut bitmaps: Vec<GlyphBitmap> = ('a'..='z').map(|c| glyph(c, 10, 20, 20.0)).collect();
        bitmaps.push(glyph('X', 18, 30, 20.0));
        bitmaps.push(glyph(' ', 0, 0, 20.0));
        bitmaps.extend(('0'..='9').map(|c| glyph(c, 10, 30, 20.0)));
        bitmaps.push(glyph('.', 4, 4, 20.0));
        GlyphAtlas::from_bitmaps(bitmaps, 48.0, 512, 1).unwrap()
    }

    fn det(xmin: f32, ymin: f32, label: &str) -> Detection {
        Detection {
            xmin,
            ymin,
            xmax: 0.9,
            ymax: 0.9,
            color: [1.0, 0.0, 0.0],
            label: label.into(),
            score: 0.981,
        }
    }

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    fn style(scale: f32, show_score: bool) -> LabelStyle {
        LabelStyle { scale, show_score }
    }

    #[test]
    fn background_sits_above_box() {
        let vp = Viewport::new(1000.0, 500.0);
        let l = layout_label(&det(0.1, 0.2, "cat"), vp, &atlas(), &style(0.5, false));

        assert_eq!(l.outline.origin, Vec2::new(100.0, 100.0));
        // width (10 + 3 * 20) * 0.5, height 30 * 1.7 * 0.5
        assert!(approx(l.background.size.x, 35.0));
        assert!(approx(l.background.size.y, 25.5));
        assert!(approx(l.background.origin.y, 100.0 - 1.0 - 25.5));
        assert!(approx(l.background.origin.x, 100.0));
        assert_eq!(l.baseline, Vec2::new(101.0, 94.0));
    }

    #[test]
    fn background_flips_below_near_top() {
        let vp = Viewport::new(1000.0, 1000.0);
        let l = layout_label(&det(0.0, 0.01, "cat"), vp, &atlas(), &LabelStyle::default());

        assert!(approx(l.background.origin.y, 11.0));
        assert!(l.background.max().y > 11.0);
        // baseline is clamped away from the top edge
        assert_eq!(l.baseline.y, 15.0);
    }

    #[test]
    fn background_stays_above_at_exactly_twenty() {
        // 0.5 * 40 lands on 20.0 exactly
        let vp = Viewport::new(1000.0, 40.0);
        let l = layout_label(&det(0.0, 0.5, "cat"), vp, &atlas(), &style(1.0, false));

        // height 30 * 1.7 = 51, spanning [20 - 1 - 51, 20 - 1]
        assert!(approx(l.background.max().y, 19.0));
        assert!(approx(l.background.origin.y, 19.0 - 51.0));
        assert_eq!(l.baseline.y, 15.0);
    }

    #[test]
    fn colors_are_inverted_for_text() {
        let vp = Viewport::new(100.0, 100.0);
        let l = layout_label(&det(0.5, 0.5, "a"), vp, &atlas(), &LabelStyle::default());
        let expected_box = Color::from_rgb([1.0, 0.0, 0.0], OVERLAY_ALPHA).to_array();
        let expected_text = Color::from_rgb([0.0, 1.0, 1.0], OVERLAY_ALPHA).to_array();
        for i in 0..4 {
            assert!(approx(l.box_color.to_array()[i], expected_box[i]));
            assert!(approx(l.text_color.to_array()[i], expected_text[i]));
        }
    }

    #[test]
    fn score_suffix_widens_background() {
        let a = atlas();
        let vp = Viewport::new(1000.0, 1000.0);
        let plain = layout_label(&det(0.5, 0.5, "cat"), vp, &a, &style(1.0, false));
        let scored = layout_label(&det(0.5, 0.5, "cat"), vp, &a, &style(1.0, true));

        assert_eq!(scored.text, "cat 0.98");
        // " 0.98" adds five glyphs
        assert!(approx(scored.background.size.x - plain.background.size.x, 100.0));
    }

    #[test]
    fn unknown_characters_add_no_width() {
        let vp = Viewport::new(100.0, 100.0);
        let l = layout_label(&det(0.5, 0.5, "\u{00e9}"), vp, &atlas(), &style(1.0, false));
        assert!(approx(l.background.size.x, 10.0));
    }
}
