//! Glyph atlas generation and single-line text layout.
//!
//! Fonts are rasterized once into a [`GlyphAtlas`]; the text renderer uploads
//! it as a single coverage texture and draws one quad per visible glyph.

mod atlas;
mod error;
mod font;
mod layout;
mod packer;

pub use atlas::{AtlasConfig, Glyph, GlyphAtlas, GlyphBitmap};
pub use error::TextError;
pub use font::{load_font, load_font_file};
pub use layout::{layout_line, line_advance, GlyphQuad};
pub use packer::ShelfPacker;
