//! Overlay engine crate.
//!
//! Owns the platform + GPU runtime pieces and the 2D overlay renderers
//! (image, solid rectangles, glyph-atlas text) used by the viewer.

pub mod device;
pub mod window;
pub mod input;
pub mod time;
pub mod core;

pub mod logging;
pub mod coords;
pub mod render;
pub mod paint;
pub mod scene;
pub mod text;
