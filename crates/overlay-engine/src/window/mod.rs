//! Window + runtime loop.
//!
//! Owns the `winit` EventLoop and the single application window, and wires
//! them to the GPU layer.

mod keys;
mod runtime;

pub use runtime::{clamp_to_monitor, Runtime, RuntimeConfig, RuntimeCtx};
