//! Error types for scene construction, GPU resources and configuration.
//!
//! Library code returns [`SceneError`] or [`ConfigError`]; the binary wraps
//! them in `anyhow` at the top level.

use thiserror::Error;

/// Failures while building, driving or tearing down a scene
#[derive(Error, Debug)]
pub enum SceneError {
    /// The GPU backend refused to allocate a geometry or material resource.
    #[error("Failed to allocate {kind} resource: {reason}")]
    Allocation { kind: &'static str, reason: String },

    /// No compatible adapter was found for the window surface.
    #[error("Failed to request WGPU adapter: {0}")]
    AdapterRequestFailed(String),

    /// The GPU device could not be created.
    #[error("Failed to create WGPU device: {0}")]
    DeviceCreateFailed(#[from] wgpu::RequestDeviceError),

    /// The window surface could not be created or configured.
    #[error("Surface error: {0}")]
    Surface(String),

    #[error("Event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Configuration loading errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

pub type Result<T> = std::result::Result<T, SceneError>;
