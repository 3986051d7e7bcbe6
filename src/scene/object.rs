//! # Scene Objects
//!
//! A [`SceneObject`] is the unit of simulation: one top-level entity with a
//! transform, physics-like state and a list of [`RenderPart`]s. The object
//! owns its parts' GPU handles; nothing on the render side points back into
//! the simulation state.

use std::fmt;

use cgmath::{Matrix4, Rad, Vector3, Zero};

use crate::{
    error::SceneError,
    gfx::{
        geometry::GeometryData,
        picking::CollisionMesh,
        resources::{hex_color, GeometryHandle, MaterialDesc, MaterialHandle, ResourceAllocator},
    },
    simulation::strike::StrikeTimeline,
};

/// Upper bound on an object's energy
pub const ENERGY_CAP: f32 = 2.0;

pub const STRIKE_EMISSIVE: u32 = 0xff4444;
pub const DRAG_COLOR: u32 = 0xffff00;
pub const DRAG_EMISSIVE: u32 = 0x444400;

/// Stable object identity; never reused within a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub(crate) u64);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identity of one drawable node, as reported by hit-testing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeHandle(pub(crate) u64);

/// Single-mesh shapes used by the float and showcase scenes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveShape {
    Box,
    Sphere,
    Cone,
    Cylinder,
    Torus,
    Octahedron,
    Dodecahedron,
    Icosahedron,
}

impl PrimitiveShape {
    pub const ALL: [PrimitiveShape; 8] = [
        PrimitiveShape::Box,
        PrimitiveShape::Sphere,
        PrimitiveShape::Cone,
        PrimitiveShape::Cylinder,
        PrimitiveShape::Torus,
        PrimitiveShape::Octahedron,
        PrimitiveShape::Dodecahedron,
        PrimitiveShape::Icosahedron,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            PrimitiveShape::Box => "box",
            PrimitiveShape::Sphere => "sphere",
            PrimitiveShape::Cone => "cone",
            PrimitiveShape::Cylinder => "cylinder",
            PrimitiveShape::Torus => "torus",
            PrimitiveShape::Octahedron => "octahedron",
            PrimitiveShape::Dodecahedron => "dodecahedron",
            PrimitiveShape::Icosahedron => "icosahedron",
        }
    }
}

/// Closed set of object categories, fixed at creation
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ObjectKind {
    /// Two crossed bars around a core sphere
    Cross,
    /// Capped cylinder, optionally glass
    Cylinder { glass: bool },
    /// Octahedron body with orbiting satellites
    Complex { orbit_speed: f32 },
    Primitive(PrimitiveShape),
}

impl ObjectKind {
    pub fn label(&self) -> &'static str {
        match self {
            ObjectKind::Cross => "cross",
            ObjectKind::Cylinder { glass: true } => "glass cylinder",
            ObjectKind::Cylinder { glass: false } => "cylinder",
            ObjectKind::Complex { .. } => "complex",
            ObjectKind::Primitive(shape) => shape.name(),
        }
    }

    pub fn hover_emissive(&self) -> [f32; 3] {
        match self {
            ObjectKind::Cross => hex_color(0x440044),
            ObjectKind::Complex { .. } => hex_color(0x404040),
            _ => hex_color(0x444400),
        }
    }
}

/// Position, Euler rotation (XYZ order, radians) and per-axis scale
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vector3<f32>,
    pub rotation: Vector3<f32>,
    pub scale: Vector3<f32>,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vector3::zero(),
            rotation: Vector3::zero(),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Transform {
    pub fn at(position: Vector3<f32>) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    pub fn matrix(&self) -> Matrix4<f32> {
        Matrix4::from_translation(self.position)
            * Matrix4::from_angle_x(Rad(self.rotation.x))
            * Matrix4::from_angle_y(Rad(self.rotation.y))
            * Matrix4::from_angle_z(Rad(self.rotation.z))
            * Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
    }

    pub fn uniform_scale(&self) -> f32 {
        self.scale.x
    }

    pub fn set_uniform_scale(&mut self, scale: f32) {
        self.scale = Vector3::new(scale, scale, scale);
    }
}

/// Orbit parameters of a satellite part
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Orbit {
    pub angle: f32,
    pub radius: f32,
    pub bob_amplitude: f32,
}

impl Orbit {
    pub fn local_position(&self) -> Vector3<f32> {
        Vector3::new(
            self.angle.cos() * self.radius,
            self.angle.sin() * self.bob_amplitude,
            self.angle.sin() * self.radius,
        )
    }
}

/// One drawable mesh of an object, with its own geometry and material handle
#[derive(Debug)]
pub struct RenderPart {
    node: NodeHandle,
    pub local: Transform,
    pub surface: MaterialDesc,
    idle_emissive: [f32; 3],
    highlightable: bool,
    pub orbit: Option<Orbit>,
    collision: CollisionMesh,
    geometry: Option<GeometryHandle>,
    material: Option<MaterialHandle>,
}

impl RenderPart {
    /// Uploads `data` and `surface` through the allocator. If the material
    /// allocation fails the geometry is handed back before returning.
    pub fn allocate(
        allocator: &mut dyn ResourceAllocator,
        data: &GeometryData,
        surface: MaterialDesc,
    ) -> Result<Self, SceneError> {
        let geometry = allocator.create_geometry(data)?;
        let material = match allocator.create_material(&surface) {
            Ok(material) => material,
            Err(e) => {
                allocator.release_geometry(geometry);
                return Err(e);
            }
        };

        Ok(Self {
            node: NodeHandle(0),
            local: Transform::default(),
            idle_emissive: surface.emissive,
            surface,
            highlightable: true,
            orbit: None,
            collision: data.collision_mesh(),
            geometry: Some(geometry),
            material: Some(material),
        })
    }

    pub fn with_local(mut self, local: Transform) -> Self {
        self.local = local;
        self
    }

    pub fn with_orbit(mut self, orbit: Orbit) -> Self {
        self.local.position = orbit.local_position();
        self.orbit = Some(orbit);
        self
    }

    /// Excludes the part from hover/strike highlighting
    pub fn fixed_surface(mut self) -> Self {
        self.highlightable = false;
        self
    }

    pub fn node(&self) -> NodeHandle {
        self.node
    }

    pub(crate) fn set_node(&mut self, node: NodeHandle) {
        self.node = node;
    }

    /// Model-space triangles used for picking
    pub fn collision(&self) -> &CollisionMesh {
        &self.collision
    }

    pub fn geometry(&self) -> Option<GeometryHandle> {
        self.geometry
    }

    pub fn material(&self) -> Option<MaterialHandle> {
        self.material
    }

    pub fn is_released(&self) -> bool {
        self.geometry.is_none() && self.material.is_none()
    }

    /// Returns both handles to the allocator. A second call finds nothing to
    /// release and returns 0.
    pub fn release(&mut self, allocator: &mut dyn ResourceAllocator) -> usize {
        let mut released = 0;
        if let Some(geometry) = self.geometry.take() {
            allocator.release_geometry(geometry);
            released += 1;
        }
        if let Some(material) = self.material.take() {
            allocator.release_material(material);
            released += 1;
        }
        released
    }
}

/// Visual feedback state of an object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Highlight {
    #[default]
    None,
    Hover,
    Strike,
    Drag,
}

/// Bob-in-place parameters for the float scene
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bob {
    pub speed: f32,
    pub offset: f32,
}

/// One simulated, renderable entity
#[derive(Debug)]
pub struct SceneObject {
    id: ObjectId,
    pub kind: ObjectKind,
    pub transform: Transform,
    pub velocity: Vector3<f32>,
    pub angular_velocity: Vector3<f32>,
    energy: f32,
    pub base_scale: f32,
    pub target_scale: f32,
    /// Reference point for bobbing and strike timelines
    pub original_position: Vector3<f32>,
    pub original_scale: Vector3<f32>,
    pub bob: Option<Bob>,
    pub strike: Option<StrikeTimeline>,
    parts: Vec<RenderPart>,
    highlight: Highlight,
}

impl SceneObject {
    pub fn new(kind: ObjectKind, transform: Transform, parts: Vec<RenderPart>) -> Self {
        Self {
            id: ObjectId(0),
            kind,
            original_position: transform.position,
            original_scale: transform.scale,
            base_scale: transform.uniform_scale(),
            target_scale: transform.uniform_scale(),
            transform,
            velocity: Vector3::zero(),
            angular_velocity: Vector3::zero(),
            energy: 0.0,
            bob: None,
            strike: None,
            parts,
            highlight: Highlight::None,
        }
    }

    pub fn with_velocity(mut self, velocity: Vector3<f32>, angular_velocity: Vector3<f32>) -> Self {
        self.velocity = velocity;
        self.angular_velocity = angular_velocity;
        self
    }

    pub fn with_bob(mut self, bob: Bob) -> Self {
        self.bob = Some(bob);
        self
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub(crate) fn set_id(&mut self, id: ObjectId) {
        self.id = id;
    }

    pub fn parts(&self) -> &[RenderPart] {
        &self.parts
    }

    pub fn parts_mut(&mut self) -> &mut [RenderPart] {
        &mut self.parts
    }

    pub fn energy(&self) -> f32 {
        self.energy
    }

    /// Adds (or with a negative amount, removes) energy, keeping it in [0, cap]
    pub fn add_energy(&mut self, amount: f32) {
        self.energy = (self.energy + amount).clamp(0.0, ENERGY_CAP);
    }

    pub fn decay_energy(&mut self, factor: f32) {
        self.energy = (self.energy * factor).clamp(0.0, ENERGY_CAP);
    }

    pub fn is_struck(&self) -> bool {
        self.strike.is_some()
    }

    pub fn highlight(&self) -> Highlight {
        self.highlight
    }

    pub fn set_highlight(&mut self, highlight: Highlight) {
        self.highlight = highlight;
        let kind = self.kind;
        for part in self.parts.iter_mut().filter(|p| p.highlightable) {
            match highlight {
                Highlight::None => part.surface.emissive = part.idle_emissive,
                Highlight::Hover => part.surface.emissive = kind.hover_emissive(),
                Highlight::Strike => part.surface.emissive = hex_color(STRIKE_EMISSIVE),
                Highlight::Drag => {
                    part.surface.color = hex_color(DRAG_COLOR);
                    part.surface.emissive = hex_color(DRAG_EMISSIVE);
                }
            }
        }
    }

    /// Replaces the surface of every highlightable part and clears the highlight
    pub fn restyle(&mut self, surface: MaterialDesc) {
        for part in self.parts.iter_mut().filter(|p| p.highlightable) {
            part.idle_emissive = surface.emissive;
            part.surface = MaterialDesc {
                wireframe: part.surface.wireframe,
                ..surface.clone()
            };
        }
        self.highlight = Highlight::None;
    }

    pub fn set_wireframe(&mut self, wireframe: bool) {
        for part in &mut self.parts {
            part.surface.wireframe = wireframe;
        }
    }

    /// Releases every part's resources; safe to call repeatedly
    pub fn release(&mut self, allocator: &mut dyn ResourceAllocator) -> usize {
        self.parts.iter_mut().map(|part| part.release(allocator)).sum()
    }

    pub fn is_released(&self) -> bool {
        self.parts.iter().all(RenderPart::is_released)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::{
        geometry::{generate_box, generate_sphere},
        resources::{Shading, TrackingAllocator},
    };

    fn two_part_object(allocator: &mut TrackingAllocator) -> SceneObject {
        let body = RenderPart::allocate(
            allocator,
            &generate_box(1.0, 1.0, 1.0),
            MaterialDesc::new(Shading::Physical, [0.5, 0.5, 0.5]),
        )
        .unwrap();
        let cap = RenderPart::allocate(
            allocator,
            &generate_sphere(0.2, 8, 6),
            MaterialDesc::new(Shading::Physical, [0.2, 0.2, 0.2]).with_emissive([0.1, 0.1, 0.1]),
        )
        .unwrap()
        .fixed_surface();
        SceneObject::new(ObjectKind::Cylinder { glass: false }, Transform::default(), vec![body, cap])
    }

    #[test]
    fn test_energy_stays_within_cap() {
        let mut allocator = TrackingAllocator::new();
        let mut object = two_part_object(&mut allocator);

        for _ in 0..10 {
            object.add_energy(0.5);
        }
        assert_eq!(object.energy(), ENERGY_CAP);

        object.add_energy(-10.0);
        assert_eq!(object.energy(), 0.0);
    }

    #[test]
    fn test_release_is_idempotent() {
        let mut allocator = TrackingAllocator::new();
        let mut object = two_part_object(&mut allocator);
        assert_eq!(allocator.live(), 4);

        assert_eq!(object.release(&mut allocator), 4);
        assert_eq!(object.release(&mut allocator), 0);
        assert!(object.is_released());
        assert_eq!(allocator.live(), 0);
    }

    #[test]
    fn test_failed_material_returns_geometry() {
        struct RefusingMaterials(TrackingAllocator);
        impl ResourceAllocator for RefusingMaterials {
            fn create_geometry(&mut self, data: &GeometryData) -> Result<GeometryHandle, SceneError> {
                self.0.create_geometry(data)
            }
            fn create_material(&mut self, _desc: &MaterialDesc) -> Result<MaterialHandle, SceneError> {
                Err(SceneError::Allocation { kind: "material", reason: "test".into() })
            }
            fn release_geometry(&mut self, handle: GeometryHandle) {
                self.0.release_geometry(handle)
            }
            fn release_material(&mut self, handle: MaterialHandle) {
                self.0.release_material(handle)
            }
        }

        let mut allocator = RefusingMaterials(TrackingAllocator::new());
        let result = RenderPart::allocate(&mut allocator, &generate_box(1.0, 1.0, 1.0), MaterialDesc::default());
        assert!(result.is_err());
        assert_eq!(allocator.0.live(), 0);
    }

    #[test]
    fn test_highlight_skips_fixed_parts_and_resets_to_idle() {
        let mut allocator = TrackingAllocator::new();
        let mut object = two_part_object(&mut allocator);

        object.set_highlight(Highlight::Strike);
        assert_eq!(object.parts()[0].surface.emissive, hex_color(STRIKE_EMISSIVE));
        assert_eq!(object.parts()[1].surface.emissive, [0.1, 0.1, 0.1]);

        object.set_highlight(Highlight::None);
        assert_eq!(object.parts()[0].surface.emissive, [0.0, 0.0, 0.0]);
        object.release(&mut allocator);
    }

    #[test]
    fn test_orbit_position() {
        let orbit = Orbit { angle: std::f32::consts::FRAC_PI_2, radius: 1.5, bob_amplitude: 0.3 };
        let p = orbit.local_position();
        assert!(p.x.abs() < 1e-6);
        assert!((p.y - 0.3).abs() < 1e-6);
        assert!((p.z - 1.5).abs() < 1e-6);
    }
}
