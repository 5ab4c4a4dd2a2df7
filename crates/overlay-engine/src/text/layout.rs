use crate::coords::{Rect, Vec2};

use super::GlyphAtlas;

/// One positioned glyph: screen rectangle plus atlas UVs.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GlyphQuad {
    pub rect: Rect,
    pub uv_min: [f32; 2],
    pub uv_max: [f32; 2],
}

/// Lays out a single line of text starting at `origin` (pen position on the
/// baseline, y down), appending one quad per visible glyph to `out`.
///
/// Returns the pen x position after the last character.
pub fn layout_line(
    atlas: &GlyphAtlas,
    text: &str,
    origin: Vec2,
    scale: f32,
    out: &mut Vec<GlyphQuad>,
) -> f32 {
    let mut pen = origin.x;
    for ch in text.chars() {
        let Some(g) = atlas.get(ch) else {
            continue;
        };

        if !g.is_empty() {
            let x = pen + g.bearing[0] as f32 * scale;
            let top = origin.y - g.bearing[1] as f32 * scale;
            out.push(GlyphQuad {
                rect: Rect::new(x, top, g.size[0] as f32 * scale, g.size[1] as f32 * scale),
                uv_min: g.uv_min,
                uv_max: g.uv_max,
            });
        }
        pen += g.advance * scale;
    }
    pen
}

/// Sum of unscaled advances over the characters the atlas knows.
pub fn line_advance(atlas: &GlyphAtlas, text: &str) -> f32 {
    text.chars().filter_map(|ch| atlas.get(ch)).map(|g| g.advance).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::atlas::tests::synthetic_atlas;

    #[test]
    fn positions_follow_bearing_and_advance() {
        let atlas = synthetic_atlas();
        let mut quads = Vec::new();
        let end = layout_line(&atlas, "AX", Vec2::new(10.0, 100.0), 0.5, &mut quads);

        assert_eq!(quads.len(), 2);
        // 'A': bearing [1, 6], size 4x6, advance 5
        assert_eq!(quads[0].rect, Rect::new(10.5, 97.0, 2.0, 3.0));
        // 'X' starts at pen 10 + 2.5
        assert_eq!(quads[1].rect, Rect::new(13.0, 95.0, 2.5, 5.0));
        assert_eq!(end, 10.0 + 2.5 + 3.0);
    }

    #[test]
    fn space_advances_without_quad() {
        let atlas = synthetic_atlas();
        let mut quads = Vec::new();
        layout_line(&atlas, "A A", Vec2::zero(), 1.0, &mut quads);
        assert_eq!(quads.len(), 2);
        assert_eq!(quads[1].rect.origin.x, 5.0 + 1.0 + 1.0);
    }

    #[test]
    fn unknown_chars_are_skipped() {
        let atlas = synthetic_atlas();
        let mut quads = Vec::new();
        let end = layout_line(&atlas, "A\u{263a}", Vec2::zero(), 1.0, &mut quads);
        assert_eq!(quads.len(), 1);
        assert_eq!(end, 5.0);
        assert_eq!(line_advance(&atlas, "A\u{263a}X"), 11.0);
    }

    #[test]
    fn empty_text_lays_out_nothing() {
        let atlas = synthetic_atlas();
        let mut quads = Vec::new();
        assert_eq!(layout_line(&atlas, "", Vec2::new(3.0, 4.0), 1.0, &mut quads), 3.0);
        assert!(quads.is_empty());
        assert_eq!(line_advance(&atlas, ""), 0.0);
    }
}
