// src/lib.rs
//! Strike Scene
//!
//! Interactive 3D scenes of procedurally built objects that drift, bob or
//! play a strike animation when hit. Built on wgpu and winit.
//!
//! The scene model, motion policies, picking and lifecycle code never touch
//! the GPU directly; they go through [`gfx::resources::ResourceAllocator`],
//! which the [`gfx::RenderEngine`] implements for real windows.

pub mod app;
pub mod config;
pub mod error;
pub mod gfx;
pub mod interaction;
pub mod lifecycle;
pub mod performance;
pub mod prelude;
pub mod scene;
pub mod simulation;
pub mod ui;
pub mod wgpu_utils;

// Re-export main types for convenience
pub use app::StrikeSceneApp;
pub use config::SceneConfig;
pub use error::{ConfigError, SceneError};

/// Creates and runs the app with the default configuration
pub fn run_default() -> Result<(), SceneError> {
    StrikeSceneApp::new(SceneConfig::default())?.run()
}
