// src/gfx/rendering/mod.rs
//! Core rendering functionality
//!
//! Handles render pipelines, GPU resource management, and frame rendering.

pub mod billboard;
pub mod pipeline_manager;
pub mod render_engine;
pub mod render_pass_ext;

// Re-export main types
pub use pipeline_manager::{PipelineConfig, PipelineManager, PipelineStats, VertexLayout};
pub use render_engine::{FrameCounters, RenderEngine};
