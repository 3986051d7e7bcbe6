//! GPU resource seam.
//!
//! Scene code never talks to wgpu directly. It asks a [`ResourceAllocator`]
//! for opaque handles and gives every handle back exactly once on disposal.
//! The wgpu render engine is the production allocator; [`TrackingAllocator`]
//! stands in for it in headless runs and tests.

pub mod global_bindings;
pub mod material;
pub mod texture_resource;
pub mod tracking;

pub use global_bindings::{GlobalUniform, LightUniform, MAX_LIGHTS};
pub use material::{hex_color, hsl_color, MaterialDesc, Shading, SurfaceUniform};
pub use tracking::TrackingAllocator;

use crate::{error::SceneError, gfx::geometry::GeometryData};

/// Opaque reference to an uploaded mesh
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GeometryHandle(pub(crate) u64);

/// Opaque reference to a per-part surface (material parameters plus model transform)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MaterialHandle(pub(crate) u64);

impl GeometryHandle {
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl MaterialHandle {
    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// Allocates and releases the GPU-side resources behind scene parts.
///
/// Every handle returned from a `create_*` call must be passed to the matching
/// `release_*` call exactly once.
pub trait ResourceAllocator {
    fn create_geometry(&mut self, data: &GeometryData) -> Result<GeometryHandle, SceneError>;

    fn create_material(&mut self, desc: &MaterialDesc) -> Result<MaterialHandle, SceneError>;

    fn release_geometry(&mut self, handle: GeometryHandle);

    fn release_material(&mut self, handle: MaterialHandle);
}
