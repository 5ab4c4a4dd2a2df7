//! Color model shared between the viewer and renderers.
//!
//! Colors are linear premultiplied RGBA; every pipeline blends with
//! `src + dst * (1 - src_alpha)`.

mod color;

pub use color::Color;
