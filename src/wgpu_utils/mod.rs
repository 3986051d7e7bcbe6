// src/wgpu_utils/mod.rs
//! WGPU utility functions and helpers
//!
//! Small typed wrappers around buffers and binding layouts used by the
//! render engine.

pub mod binding_types;
pub mod uniform_buffer;

pub use binding_types::*;
pub use uniform_buffer::{DynamicVertexBuffer, UniformBuffer};
