//! Shape renderers.

mod common;

pub mod image;
pub mod rect;
pub mod text;
