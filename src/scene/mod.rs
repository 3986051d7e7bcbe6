//! # Scene Module
//!
//! Typed data model for one live view: the [`Scene`] container, its
//! [`SceneObject`]s and their registry, the procedural builder, and
//! particle effects.
//!
//! ## Key Components
//!
//! - [`Scene`] - Owns the registry, camera, lights and particles of a view
//! - [`SceneObject`] - One simulated entity with its render parts
//! - [`ObjectRegistry`] - Ordered objects plus node-to-owner lookup
//! - [`SceneBuilder`] - Procedural population for each [`SceneVariant`]

pub mod builder;
pub mod object;
pub mod particles;
pub mod registry;
#[allow(clippy::module_inception)]
pub mod scene;

pub use builder::{KindChoice, KindDistribution, SceneBuilder};
pub use object::{Highlight, ObjectId, ObjectKind, PrimitiveShape, SceneObject};
pub use particles::{ImpactBurst, ParticleField, ParticleSprite};
pub use registry::ObjectRegistry;
pub use scene::Scene;

use cgmath::Vector3;
use serde::{Deserialize, Serialize};

/// Which scene to run; each variant uses exactly one motion policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SceneVariant {
    /// Bouncing objects with energy, damping and a drifting camera
    #[default]
    Drift,
    /// Random primitives bobbing in place, draggable, regenerable
    Float,
    /// Five fixed shapes that play a strike timeline when hit
    Showcase,
}

impl SceneVariant {
    pub const ALL: [SceneVariant; 3] = [SceneVariant::Drift, SceneVariant::Float, SceneVariant::Showcase];

    pub fn title(&self) -> &'static str {
        match self {
            SceneVariant::Drift => "Interactive Objects",
            SceneVariant::Float => "Interactive 3D Playground",
            SceneVariant::Showcase => "Striking Objects",
        }
    }

    /// Key light intensity the scene starts with
    pub fn default_light_intensity(&self) -> f32 {
        match self {
            SceneVariant::Drift => 1.2,
            SceneVariant::Float | SceneVariant::Showcase => 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LightKind {
    Ambient,
    Directional { position: Vector3<f32> },
    Point { position: Vector3<f32> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Light {
    pub kind: LightKind,
    /// sRGB
    pub color: [f32; 3],
    pub intensity: f32,
}

impl Light {
    pub fn ambient(color: [f32; 3], intensity: f32) -> Self {
        Self { kind: LightKind::Ambient, color, intensity }
    }

    pub fn directional(position: Vector3<f32>, color: [f32; 3], intensity: f32) -> Self {
        Self { kind: LightKind::Directional { position }, color, intensity }
    }

    pub fn point(position: Vector3<f32>, color: [f32; 3], intensity: f32) -> Self {
        Self { kind: LightKind::Point { position }, color, intensity }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Fog {
    pub color: [f32; 3],
    pub near: f32,
    pub far: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Environment {
    pub background: [f32; 3],
    pub fog: Option<Fog>,
}
