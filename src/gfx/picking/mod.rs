//! # Object Picking System
//!
//! Pointer ray-casting against the Object Registry.
//!
//! ## How it works
//!
//! 1. **Pointer to Ray**: Convert normalized pointer coordinates to a world-space ray
//! 2. **Ray-Part Intersection**: Move the ray into each render part's model
//!    space, reject it against the part's local bounds, then test the part's
//!    triangles so rotated bars and the torus hole report no false hits
//! 3. **Owner Resolution**: Map the closest hit part back to its owning object
//!    through the registry's node lookup table, so a hit on a satellite or a
//!    cross bar selects the whole object

use cgmath::{ElementWise, EuclideanSpace, InnerSpace, Matrix4, SquareMatrix, Vector3, Vector4, Zero};

use crate::{
    gfx::camera::PerspectiveCamera,
    scene::{
        object::{NodeHandle, ObjectId, SceneObject},
        registry::ObjectRegistry,
    },
};

/// A 3D ray for intersection testing
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    /// Ray origin point in world space
    pub origin: Vector3<f32>,
    /// Ray direction (normalized)
    pub direction: Vector3<f32>,
}

impl Ray {
    pub fn new(origin: Vector3<f32>, direction: Vector3<f32>) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    /// Get a point along the ray at distance t
    pub fn point_at(&self, t: f32) -> Vector3<f32> {
        self.origin + self.direction * t
    }

    /// Builds a ray from the camera through a pointer position given in
    /// normalized device coordinates (x right, y up, both in [-1, 1])
    pub fn from_camera(ndc: (f32, f32), camera: &PerspectiveCamera) -> Self {
        let (ndc_x, ndc_y) = ndc;

        // Unproject with the GL-convention projection so NDC depth spans [-1, 1]
        let view_proj = camera.projection_matrix() * camera.view_matrix();
        let inv_view_proj = view_proj.invert().unwrap_or(Matrix4::from_scale(1.0));

        let world_near = inv_view_proj * Vector4::new(ndc_x, ndc_y, -1.0, 1.0);
        let world_far = inv_view_proj * Vector4::new(ndc_x, ndc_y, 1.0, 1.0);

        let near_3d = world_near.truncate() / world_near.w;
        let far_3d = world_far.truncate() / world_far.w;

        Ray::new(near_3d, far_3d - near_3d)
    }

    /// Expresses the ray in the model space of `model`. The direction is not
    /// renormalized, so distances along the local ray stay in world units.
    /// Returns `None` for a degenerate (non-invertible) transform.
    pub fn to_local(&self, model: &Matrix4<f32>) -> Option<Ray> {
        let inverse = model.invert()?;
        Some(Ray {
            origin: (inverse * self.origin.extend(1.0)).truncate(),
            direction: (inverse * self.direction.extend(0.0)).truncate(),
        })
    }
}

/// Möller-Trumbore ray/triangle test, both faces; returns the ray parameter
fn intersect_triangle(ray: &Ray, triangle: &[Vector3<f32>; 3]) -> Option<f32> {
    const EPSILON: f32 = 1e-9;
    // Shared edges must not leak rays between adjacent triangles
    const EDGE: f32 = 1e-5;

    let edge1 = triangle[1] - triangle[0];
    let edge2 = triangle[2] - triangle[0];
    let h = ray.direction.cross(edge2);
    let a = edge1.dot(h);
    if a.abs() < EPSILON {
        return None;
    }

    let f = 1.0 / a;
    let s = ray.origin - triangle[0];
    let u = f * s.dot(h);
    if !(-EDGE..=1.0 + EDGE).contains(&u) {
        return None;
    }

    let q = s.cross(edge1);
    let v = f * ray.direction.dot(q);
    if v < -EDGE || u + v > 1.0 + EDGE {
        return None;
    }

    let t = f * edge2.dot(q);
    (t >= 0.0).then_some(t)
}

/// Model-space triangles of one mesh, kept on the CPU for exact picking
#[derive(Debug, Clone, Default)]
pub struct CollisionMesh {
    triangles: Vec<[Vector3<f32>; 3]>,
    bounds: Aabb,
}

impl CollisionMesh {
    pub fn from_indexed(vertices: &[[f32; 3]], indices: &[u32]) -> Self {
        let triangles = indices
            .chunks_exact(3)
            .filter_map(|tri| {
                let corner = |i: u32| vertices.get(i as usize).map(|v| Vector3::from(*v));
                Some([corner(tri[0])?, corner(tri[1])?, corner(tri[2])?])
            })
            .collect();

        Self {
            triangles,
            bounds: Aabb::from_vertices(vertices),
        }
    }

    pub fn bounds(&self) -> Aabb {
        self.bounds
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Closest hit of a model-space ray, bounds first
    pub fn intersect_ray(&self, ray: &Ray) -> Option<f32> {
        self.bounds.intersect_ray(ray)?;
        self.triangles
            .iter()
            .filter_map(|triangle| intersect_triangle(ray, triangle))
            .min_by(|a, b| a.total_cmp(b))
    }
}

/// Axis-aligned bounding box for intersection testing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vector3<f32>,
    pub max: Vector3<f32>,
}

impl Default for Aabb {
    fn default() -> Self {
        Self::new(Vector3::zero(), Vector3::zero())
    }
}

impl Aabb {
    pub fn new(min: Vector3<f32>, max: Vector3<f32>) -> Self {
        Self { min, max }
    }

    /// Create AABB from a set of vertices
    pub fn from_vertices(vertices: &[[f32; 3]]) -> Self {
        let Some(first) = vertices.first() else {
            return Self::new(Vector3::zero(), Vector3::zero());
        };

        let mut min = Vector3::from(*first);
        let mut max = min;

        for vertex in vertices.iter().skip(1) {
            min.x = min.x.min(vertex[0]);
            min.y = min.y.min(vertex[1]);
            min.z = min.z.min(vertex[2]);
            max.x = max.x.max(vertex[0]);
            max.y = max.y.max(vertex[1]);
            max.z = max.z.max(vertex[2]);
        }

        Self::new(min, max)
    }

    /// Test ray-AABB intersection (slab method)
    /// Returns the distance to intersection point, or None if no intersection
    pub fn intersect_ray(&self, ray: &Ray) -> Option<f32> {
        let inv_dir = Vector3::new(
            1.0 / ray.direction.x,
            1.0 / ray.direction.y,
            1.0 / ray.direction.z,
        );

        let t_min = (self.min - ray.origin).mul_element_wise(inv_dir);
        let t_max = (self.max - ray.origin).mul_element_wise(inv_dir);

        let t1 = Vector3::new(
            t_min.x.min(t_max.x),
            t_min.y.min(t_max.y),
            t_min.z.min(t_max.z),
        );
        let t2 = Vector3::new(
            t_min.x.max(t_max.x),
            t_min.y.max(t_max.y),
            t_min.z.max(t_max.z),
        );

        let t_near = t1.x.max(t1.y.max(t1.z));
        let t_far = t2.x.min(t2.y.min(t2.z));

        if t_near <= t_far && t_far >= 0.0 {
            Some(if t_near >= 0.0 { t_near } else { t_far })
        } else {
            None
        }
    }

    pub fn center(&self) -> Vector3<f32> {
        cgmath::Point3::from_vec(self.min)
            .midpoint(cgmath::Point3::from_vec(self.max))
            .to_vec()
    }
}

/// Result of an object picking operation
#[derive(Debug, Clone, PartialEq)]
pub struct PickResult {
    /// Top-level object that owns the hit part
    pub object: ObjectId,
    /// The render node the ray actually struck
    pub node: NodeHandle,
    /// Distance from the ray origin to the intersection point
    pub distance: f32,
    /// World space intersection point
    pub intersection_point: Vector3<f32>,
}

/// Ray-casting hit-tester over the Object Registry
#[derive(Debug, Default)]
pub struct ObjectPicker;

impl ObjectPicker {
    pub fn new() -> Self {
        Self
    }

    /// Returns the closest object hit by `ray`, resolving nested parts to
    /// their owning object. Ties keep the earlier-registered object.
    pub fn pick(&self, ray: &Ray, registry: &ObjectRegistry) -> Option<PickResult> {
        let mut closest: Option<PickResult> = None;

        for object in registry.iter() {
            let Some((node, distance)) = Self::intersect_parts(ray, object) else {
                continue;
            };

            if closest
                .as_ref()
                .map_or(true, |result| distance < result.distance)
            {
                let Some(owner) = registry.owner_of(node) else {
                    continue;
                };
                closest = Some(PickResult {
                    object: owner,
                    node,
                    distance,
                    intersection_point: ray.point_at(distance),
                });
            }
        }

        closest
    }

    /// Intersects the ray against a single object only (drag-follow)
    pub fn pick_single(&self, ray: &Ray, object: &SceneObject) -> Option<PickResult> {
        let (node, distance) = Self::intersect_parts(ray, object)?;
        Some(PickResult {
            object: object.id(),
            node,
            distance,
            intersection_point: ray.point_at(distance),
        })
    }

    fn intersect_parts(ray: &Ray, object: &SceneObject) -> Option<(NodeHandle, f32)> {
        let object_matrix = object.transform.matrix();

        object
            .parts()
            .iter()
            .filter_map(|part| {
                let local_ray = ray.to_local(&(object_matrix * part.local.matrix()))?;
                part.collision()
                    .intersect_ray(&local_ray)
                    .map(|d| (part.node(), d))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
    }
}
