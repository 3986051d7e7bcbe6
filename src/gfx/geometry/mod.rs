//! # Procedural Geometry Generation
//!
//! Every shape in a scene is generated procedurally; no model files are read.
//! All generators produce Y-up geometry centered at the origin.
//!
//! ## Supported Primitives
//!
//! - **Box**, **Sphere**, **Cylinder**, **Cone**, **Torus**
//! - **Octahedron**, **Icosahedron**, **Dodecahedron** (flat shaded)
//! - **Plane** (horizontal, used for ground surfaces)
//!
//! ## Usage
//!
//! ```rust
//! use strike_scene::gfx::geometry::{generate_box, generate_sphere};
//!
//! let bar = generate_box(2.5, 0.5, 0.5);
//! let core = generate_sphere(0.3, 16, 12);
//! assert!(bar.triangle_count() < core.triangle_count());
//! ```

pub mod primitives;

pub use primitives::*;

use crate::gfx::{
    picking::{Aabb, CollisionMesh},
    vertex::Vertex3D,
};

/// Generated geometry data ready for GPU upload
#[derive(Debug, Clone, Default)]
pub struct GeometryData {
    /// Vertex positions (x, y, z)
    pub vertices: Vec<[f32; 3]>,
    /// Normal vectors (x, y, z)
    pub normals: Vec<[f32; 3]>,
    /// Triangle indices (counter-clockwise winding)
    pub indices: Vec<u32>,
}

impl GeometryData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of vertices in this geometry
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of triangles in this geometry
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Local-space bounding box, used for hit-testing
    pub fn local_bounds(&self) -> Aabb {
        Aabb::from_vertices(&self.vertices)
    }

    /// CPU copy of the triangles for exact ray picking
    pub fn collision_mesh(&self) -> CollisionMesh {
        CollisionMesh::from_indexed(&self.vertices, &self.indices)
    }

    /// Interleaves positions and normals into the vertex format the renderer consumes
    pub fn to_vertices(&self) -> Vec<Vertex3D> {
        self.vertices
            .iter()
            .enumerate()
            .map(|(i, position)| Vertex3D {
                position: *position,
                normal: self.normals.get(i).copied().unwrap_or([0.0, 1.0, 0.0]),
            })
            .collect()
    }

    /// Appends a triangle with its own three vertices and a shared face normal
    pub(crate) fn push_flat_triangle(&mut self, a: [f32; 3], b: [f32; 3], c: [f32; 3]) {
        let normal = face_normal(a, b, c);
        let base = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&[a, b, c]);
        self.normals.extend_from_slice(&[normal, normal, normal]);
        self.indices.extend_from_slice(&[base, base + 1, base + 2]);
    }
}

fn face_normal(a: [f32; 3], b: [f32; 3], c: [f32; 3]) -> [f32; 3] {
    let edge1 = [b[0] - a[0], b[1] - a[1], b[2] - a[2]];
    let edge2 = [c[0] - a[0], c[1] - a[1], c[2] - a[2]];
    let n = [
        edge1[1] * edge2[2] - edge1[2] * edge2[1],
        edge1[2] * edge2[0] - edge1[0] * edge2[2],
        edge1[0] * edge2[1] - edge1[1] * edge2[0],
    ];
    let length = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
    if length > 0.0 {
        [n[0] / length, n[1] / length, n[2] / length]
    } else {
        [0.0, 1.0, 0.0]
    }
}
