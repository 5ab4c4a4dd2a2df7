use std::path::Path;

use super::TextError;

/// Parses a TrueType or OpenType font from raw bytes.
///
/// `px_size` is the size the font will be rasterized at; fontdue uses it to
/// tune its internal glyph outlines.
pub fn load_font(bytes: &[u8], px_size: f32) -> Result<fontdue::Font, TextError> {
    let settings = fontdue::FontSettings {
        scale: px_size,
        ..fontdue::FontSettings::default()
    };
    fontdue::Font::from_bytes(bytes, settings).map_err(|e| TextError::Font(e.to_string()))
}

/// Reads and parses a font file.
pub fn load_font_file(path: impl AsRef<Path>, px_size: f32) -> Result<fontdue::Font, TextError> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|source| TextError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    log::debug!("loaded font {} ({} bytes)", path.display(), bytes.len());
    load_font(&bytes, px_size)
}
