use std::path::PathBuf;

/// Errors raised while loading fonts or building a glyph atlas.
#[derive(Debug, thiserror::Error)]
pub enum TextError {
    #[error("failed to read font file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse font: {0}")]
    Font(String),

    #[error("glyph {ch:?} ({width}x{height}) does not fit in a {atlas_size}x{atlas_size} atlas")]
    AtlasFull {
        ch: char,
        width: u32,
        height: u32,
        atlas_size: u32,
    },
}
