//! # Graphics Module
//!
//! Everything that touches geometry, cameras or the GPU.
//!
//! ## Architecture Overview
//!
//! - **Camera** ([`camera`]) - Y-up perspective camera the scenes steer
//! - **Geometry** ([`geometry`]) - Procedural primitive generators
//! - **Picking** ([`picking`]) - Pointer rays and bounding-box hit tests
//! - **Resources** ([`resources`]) - Material descriptions, uniform layouts and the
//!   [`ResourceAllocator`](resources::ResourceAllocator) seam
//! - **Rendering** ([`rendering`]) - wgpu pipelines and the [`RenderEngine`]
//!
//! Only [`rendering`] needs a device; the rest runs headless and is what the
//! unit tests exercise.

pub mod camera;
pub mod geometry;
pub mod picking;
pub mod rendering;
pub mod resources;
pub mod vertex;

// Re-export commonly used types
pub use camera::PerspectiveCamera;
pub use rendering::render_engine::RenderEngine;
