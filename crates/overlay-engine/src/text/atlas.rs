use std::collections::HashMap;
use std::ops::RangeInclusive;

use super::{ShelfPacker, TextError};

/// Glyph atlas build parameters.
#[derive(Debug, Clone)]
pub struct AtlasConfig {
    /// Raster size in pixels.
    pub px_size: f32,
    /// Width and height of the square atlas image.
    pub size: u32,
    /// Gap kept between packed glyphs, avoids bleeding under linear filtering.
    pub padding: u32,
    pub charset: RangeInclusive<char>,
}

impl Default for AtlasConfig {
    fn default() -> Self {
        Self {
            px_size: 48.0,
            size: 1024,
            padding: 1,
            charset: ' '..='~',
        }
    }
}

/// Placement and metrics of one character in the atlas.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Glyph {
    /// Bitmap size in pixels.
    pub size: [u32; 2],
    /// Offset from the pen position on the baseline to the bitmap's top-left
    /// corner, y up.
    pub bearing: [i32; 2],
    /// Horizontal pen advance in whole pixels.
    pub advance: f32,
    pub uv_min: [f32; 2],
    pub uv_max: [f32; 2],
}

impl Glyph {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size[0] == 0 || self.size[1] == 0
    }
}

/// A pre-rasterized glyph coverage bitmap.
#[derive(Debug, Clone)]
pub struct GlyphBitmap {
    pub ch: char,
    pub width: u32,
    pub height: u32,
    pub bearing: [i32; 2],
    pub advance: f32,
    /// Row-major, one coverage byte per pixel, top row first.
    pub coverage: Vec<u8>,
}

/// Single-channel coverage atlas plus the per-character glyph table.
///
/// Built once and immutable afterwards.
#[derive(Debug, Clone)]
pub struct GlyphAtlas {
    size: u32,
    px_size: f32,
    pixels: Vec<u8>,
    glyphs: HashMap<char, Glyph>,
}

impl GlyphAtlas {
    /// Rasterizes every character of `config.charset` that the font maps.
    pub fn from_font(font: &fontdue::Font, config: &AtlasConfig) -> Result<Self, TextError> {
        let bitmaps = config
            .charset
            .clone()
            .filter(|&ch| ch == ' ' || font.lookup_glyph_index(ch) != 0)
            .map(|ch| {
                let (m, coverage) = font.rasterize(ch, config.px_size);
                GlyphBitmap {
                    ch,
                    width: m.width as u32,
                    height: m.height as u32,
                    bearing: [m.xmin, m.ymin + m.height as i32],
                    advance: m.advance_width,
                    coverage,
                }
            });

        let atlas = Self::from_bitmaps(bitmaps, config.px_size, config.size, config.padding)?;
        log::info!(
            "glyph atlas: {} glyphs at {}px in {}x{}",
            atlas.glyphs.len(),
            config.px_size,
            atlas.size,
            atlas.size
        );
        Ok(atlas)
    }

    /// Packs already rasterized bitmaps into a new atlas.
    ///
    /// Advances are rounded to whole pixels. Zero-area bitmaps keep their
    /// metrics but take no atlas space.
    pub fn from_bitmaps(
        bitmaps: impl IntoIterator<Item = GlyphBitmap>,
        px_size: f32,
        size: u32,
        padding: u32,
    ) -> Result<Self, TextError> {
        let mut packer = ShelfPacker::new(size, padding);
        let mut pixels = vec![0u8; (size as usize) * (size as usize)];
        let mut glyphs = HashMap::new();
        let inv = 1.0 / size as f32;

        for bmp in bitmaps {
            let mut glyph = Glyph {
                size: [bmp.width, bmp.height],
                bearing: bmp.bearing,
                advance: bmp.advance.round(),
                uv_min: [0.0; 2],
                uv_max: [0.0; 2],
            };

            if !glyph.is_empty() {
                let [x, y] =
                    packer
                        .allocate(bmp.width, bmp.height)
                        .ok_or(TextError::AtlasFull {
                            ch: bmp.ch,
                            width: bmp.width,
                            height: bmp.height,
                            atlas_size: size,
                        })?;

                let w = bmp.width as usize;
                let rows = bmp.coverage.chunks_exact(w).take(bmp.height as usize);
                for (row, src) in rows.enumerate() {
                    let dst = (y as usize + row) * size as usize + x as usize;
                    pixels[dst..dst + w].copy_from_slice(src);
                }

                glyph.uv_min = [x as f32 * inv, y as f32 * inv];
                glyph.uv_max = [(x + bmp.width) as f32 * inv, (y + bmp.height) as f32 * inv];
            }

            glyphs.insert(bmp.ch, glyph);
        }

        Ok(Self {
            size,
            px_size,
            pixels,
            glyphs,
        })
    }

    #[inline]
    pub fn get(&self, ch: char) -> Option<&Glyph> {
        self.glyphs.get(&ch)
    }

    #[inline]
    pub fn size(&self) -> u32 {
        self.size
    }

    #[inline]
    pub fn px_size(&self) -> f32 {
        self.px_size
    }

    /// Coverage bytes, `size * size`, row-major.
    #[inline]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }
}
