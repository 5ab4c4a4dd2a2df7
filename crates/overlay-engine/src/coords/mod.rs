//! Coordinate and geometry types shared across renderers and the viewer.
//!
//! Canonical CPU space:
//! - Logical pixels (DPI-aware)
//! - Origin top-left
//! - +X right, +Y down
//!
//! Detections arrive in normalized `[0, 1]` coordinates with the same
//! orientation; `Viewport::denormalize*` maps them to logical pixels.
//! Renderers convert to NDC in shaders using a viewport uniform.

mod rect;
mod vec2;
mod viewport;

pub use rect::Rect;
pub use vec2::Vec2;
pub use viewport::Viewport;
