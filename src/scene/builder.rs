//! # Scene Resource Set
//!
//! Procedural population of a [`Scene`]. Every random choice goes through the
//! injected RNG, so a seeded builder always produces the same scene.

use std::f32::consts::PI;

use cgmath::{Vector3, Zero};
use rand::Rng;

use super::{
    object::{Bob, ObjectKind, Orbit, PrimitiveShape, RenderPart, SceneObject, Transform},
    particles::ParticleField,
    scene::Scene,
    Environment, Fog, Light, SceneVariant,
};
use crate::{
    error::SceneError,
    gfx::{
        camera::PerspectiveCamera,
        geometry::{self, GeometryData},
        resources::{hex_color, hsl_color, MaterialDesc, ResourceAllocator, Shading},
    },
};

pub const FLOAT_DEFAULT_COUNT: usize = 8;
pub const SHOWCASE_SPACING: f32 = 2.0;

/// What a single draw from a [`KindDistribution`] produces
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KindChoice {
    Cross,
    Cylinder,
    Complex,
    /// A uniformly random [`PrimitiveShape`]
    AnyPrimitive,
    Primitive(PrimitiveShape),
}

/// Weighted set of kinds to draw objects from
#[derive(Debug, Clone, PartialEq)]
pub struct KindDistribution {
    entries: Vec<(KindChoice, f32)>,
}

impl KindDistribution {
    pub fn new(entries: Vec<(KindChoice, f32)>) -> Self {
        Self {
            entries: entries.into_iter().filter(|(_, w)| *w > 0.0).collect(),
        }
    }

    pub fn for_variant(variant: SceneVariant) -> Self {
        match variant {
            SceneVariant::Drift => Self::new(vec![
                (KindChoice::Cross, 4.0),
                (KindChoice::Cylinder, 5.0),
                (KindChoice::Complex, 3.0),
            ]),
            SceneVariant::Float => Self::new(vec![(KindChoice::AnyPrimitive, 1.0)]),
            SceneVariant::Showcase => Self::new(
                [
                    PrimitiveShape::Sphere,
                    PrimitiveShape::Box,
                    PrimitiveShape::Cylinder,
                    PrimitiveShape::Cone,
                    PrimitiveShape::Torus,
                ]
                .into_iter()
                .map(|shape| (KindChoice::Primitive(shape), 1.0))
                .collect(),
            ),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Kind at `index`, cycling; used where layout is deterministic
    pub fn nth(&self, index: usize) -> Option<KindChoice> {
        if self.entries.is_empty() {
            return None;
        }
        Some(self.entries[index % self.entries.len()].0)
    }

    pub fn sample<R: Rng>(&self, rng: &mut R) -> Option<KindChoice> {
        let total: f32 = self.entries.iter().map(|(_, w)| w).sum();
        if total <= 0.0 {
            return None;
        }
        let mut pick = rng.random::<f32>() * total;
        for (choice, weight) in &self.entries {
            if pick < *weight {
                return Some(*choice);
            }
            pick -= weight;
        }
        self.entries.last().map(|(choice, _)| *choice)
    }
}

/// Geometry, surface and placement of one part before allocation
struct PartSpec {
    geometry: GeometryData,
    surface: MaterialDesc,
    local: Transform,
    orbit: Option<Orbit>,
    fixed: bool,
}

impl PartSpec {
    fn new(geometry: GeometryData, surface: MaterialDesc) -> Self {
        Self {
            geometry,
            surface,
            local: Transform::default(),
            orbit: None,
            fixed: false,
        }
    }
}

/// Allocates every part or none: on failure, parts already allocated are released
fn allocate_parts(
    allocator: &mut dyn ResourceAllocator,
    specs: Vec<PartSpec>,
) -> Result<Vec<RenderPart>, SceneError> {
    let mut parts = Vec::with_capacity(specs.len());
    for spec in specs {
        match RenderPart::allocate(allocator, &spec.geometry, spec.surface) {
            Ok(part) => {
                let mut part = part.with_local(spec.local);
                if let Some(orbit) = spec.orbit {
                    part = part.with_orbit(orbit);
                }
                if spec.fixed {
                    part = part.fixed_surface();
                }
                parts.push(part);
            }
            Err(e) => {
                for mut part in parts {
                    part.release(allocator);
                }
                return Err(e);
            }
        }
    }
    Ok(parts)
}

/// A random surface in one of the float scene's shading models
pub fn random_surface<R: Rng>(rng: &mut R) -> MaterialDesc {
    match rng.random_range(0..4) {
        0 => MaterialDesc::new(Shading::Phong, hsl_color(rng.random(), 0.7, 0.6)).with_pbr(0.0, 0.2),
        1 => MaterialDesc::new(Shading::Lambert, hsl_color(rng.random(), 0.8, 0.5)).with_pbr(0.0, 1.0),
        2 => {
            let color = hsl_color(rng.random(), 0.6, 0.7);
            let metallic = rng.random::<f32>() * 0.5;
            let roughness = rng.random::<f32>() * 0.5;
            MaterialDesc::new(Shading::Standard, color).with_pbr(metallic, roughness)
        }
        _ => MaterialDesc::new(Shading::Toon, hsl_color(rng.random(), 0.9, 0.6)),
    }
}

fn symmetric<R: Rng>(rng: &mut R, extent: f32) -> f32 {
    (rng.random::<f32>() - 0.5) * extent
}

fn random_vector<R: Rng>(rng: &mut R, extent: Vector3<f32>) -> Vector3<f32> {
    Vector3::new(
        symmetric(rng, extent.x),
        symmetric(rng, extent.y),
        symmetric(rng, extent.z),
    )
}

fn random_rotation<R: Rng>(rng: &mut R) -> Vector3<f32> {
    Vector3::new(rng.random::<f32>() * PI, rng.random::<f32>() * PI, rng.random::<f32>() * PI)
}

/// Builds scenes and object populations for one [`SceneVariant`]
pub struct SceneBuilder<'r, R: Rng> {
    variant: SceneVariant,
    rng: &'r mut R,
    distribution: KindDistribution,
}

impl<'r, R: Rng> SceneBuilder<'r, R> {
    /// Placement extent of drift objects (full width per axis)
    const DRIFT_SPREAD: Vector3<f32> = Vector3 { x: 12.0, y: 8.0, z: 6.0 };
    const DRIFT_VELOCITY: f32 = 0.03;
    const DRIFT_SPIN: f32 = 0.02;

    pub fn new(variant: SceneVariant, rng: &'r mut R) -> Self {
        Self {
            variant,
            rng,
            distribution: KindDistribution::for_variant(variant),
        }
    }

    pub fn with_distribution(mut self, distribution: KindDistribution) -> Self {
        self.distribution = distribution;
        self
    }

    /// Builds a complete scene. `count` of `None` uses the variant's default population.
    pub fn build(
        &mut self,
        allocator: &mut dyn ResourceAllocator,
        count: Option<usize>,
        aspect: f32,
    ) -> Result<Scene, SceneError> {
        let mut scene = match self.variant {
            SceneVariant::Drift => {
                let mut scene = Scene::new(
                    self.variant,
                    PerspectiveCamera::new(Vector3::new(0.0, 2.0, 10.0), Vector3::zero(), 60.0, aspect),
                    vec![
                        Light::ambient(hex_color(0x404040), 0.4),
                        Light::directional(Vector3::new(10.0, 10.0, 5.0), [1.0, 1.0, 1.0], 1.2),
                        Light::point(Vector3::new(-8.0, 3.0, 2.0), hex_color(0xff3030), 0.8),
                        Light::point(Vector3::new(8.0, -3.0, 2.0), hex_color(0x3030ff), 0.8),
                        Light::point(Vector3::new(0.0, 8.0, -5.0), hex_color(0x30ff30), 0.6),
                    ],
                    Environment {
                        background: hex_color(0x0a0a0a),
                        fog: Some(Fog { color: hex_color(0x0a0a0a), near: 10.0, far: 25.0 }),
                    },
                );
                scene.ambient_field = Some(ParticleField::scatter(
                    &mut *self.rng,
                    ParticleField::DEFAULT_COUNT,
                    20.0,
                ));
                scene
            }
            SceneVariant::Float => Scene::new(
                self.variant,
                PerspectiveCamera::new(Vector3::new(0.0, 5.0, 15.0), Vector3::zero(), 75.0, aspect),
                vec![
                    Light::ambient(hex_color(0x404040), 0.3),
                    Light::directional(Vector3::new(10.0, 10.0, 5.0), [1.0, 1.0, 1.0], 1.0),
                    Light::point(Vector3::new(-8.0, 4.0, 0.0), hex_color(0xff4444), 0.5),
                    Light::point(Vector3::new(8.0, 4.0, 0.0), hex_color(0x4444ff), 0.5),
                ],
                Environment {
                    background: hex_color(0x0a0a0a),
                    fog: Some(Fog { color: hex_color(0x0a0a0a), near: 10.0, far: 50.0 }),
                },
            ),
            SceneVariant::Showcase => Scene::new(
                self.variant,
                PerspectiveCamera::new(Vector3::new(0.0, 5.0, 10.0), Vector3::zero(), 75.0, aspect),
                vec![
                    Light::ambient(hex_color(0x404040), 0.3),
                    Light::directional(Vector3::new(10.0, 10.0, 5.0), [1.0, 1.0, 1.0], 1.0),
                    Light::point(Vector3::new(-5.0, 5.0, 5.0), hex_color(0xff4444), 0.5),
                ],
                Environment { background: hex_color(0x1a1a1a), fog: None },
            ),
        };

        scene.ground = self.build_ground(allocator)?;

        match self.build_objects(allocator, count) {
            Ok(objects) => {
                scene.replace_objects(objects, allocator);
                log::info!(
                    "Built {:?} scene with {} objects",
                    self.variant,
                    scene.objects.len()
                );
                Ok(scene)
            }
            Err(e) => {
                scene.release_all(allocator);
                Err(e)
            }
        }
    }

    fn build_ground(&mut self, allocator: &mut dyn ResourceAllocator) -> Result<Option<RenderPart>, SceneError> {
        let (size, height, surface) = match self.variant {
            SceneVariant::Drift => return Ok(None),
            SceneVariant::Float => (
                30.0,
                -3.0,
                MaterialDesc::new(Shading::Standard, hex_color(0x1a1a1a)).with_pbr(0.2, 0.8),
            ),
            SceneVariant::Showcase => (
                20.0,
                -2.0,
                MaterialDesc::new(Shading::Lambert, hex_color(0x333333)).with_pbr(0.0, 1.0),
            ),
        };

        let ground = RenderPart::allocate(allocator, &geometry::generate_plane(size, size), surface)?
            .with_local(Transform::at(Vector3::new(0.0, height, 0.0)))
            .fixed_surface();
        Ok(Some(ground))
    }

    /// Builds a fresh object population without touching any existing scene.
    /// On failure every object built so far is released.
    pub fn build_objects(
        &mut self,
        allocator: &mut dyn ResourceAllocator,
        count: Option<usize>,
    ) -> Result<Vec<SceneObject>, SceneError> {
        let plan: Vec<KindChoice> = match (self.variant, count) {
            (SceneVariant::Drift, None) => std::iter::repeat(KindChoice::Cross)
                .take(4)
                .chain(std::iter::repeat(KindChoice::Cylinder).take(5))
                .chain(std::iter::repeat(KindChoice::Complex).take(3))
                .collect(),
            (SceneVariant::Showcase, count) => {
                let n = count.unwrap_or(self.distribution.len());
                (0..n).filter_map(|i| self.distribution.nth(i)).collect()
            }
            (_, count) => {
                let n = count.unwrap_or(FLOAT_DEFAULT_COUNT);
                (0..n).filter_map(|_| self.distribution.sample(&mut *self.rng)).collect()
            }
        };

        let total = plan.len();
        let mut objects = Vec::with_capacity(total);
        let mut cylinders = 0;

        for (index, choice) in plan.into_iter().enumerate() {
            let result = match choice {
                KindChoice::Cross => self.cross(allocator),
                KindChoice::Cylinder => {
                    let glass = cylinders % 3 == 0;
                    cylinders += 1;
                    self.capped_cylinder(allocator, glass)
                }
                KindChoice::Complex => self.complex(allocator),
                KindChoice::AnyPrimitive => {
                    let shape = PrimitiveShape::ALL[self.rng.random_range(0..PrimitiveShape::ALL.len())];
                    self.floating(allocator, shape)
                }
                KindChoice::Primitive(shape) => match self.variant {
                    SceneVariant::Showcase => self.showcase(allocator, shape, index, total),
                    _ => self.floating(allocator, shape),
                },
            };

            match result {
                Ok(object) => objects.push(object),
                Err(e) => {
                    log::warn!("Object allocation failed after {} objects: {e}", objects.len());
                    for mut object in objects {
                        object.release(allocator);
                    }
                    return Err(e);
                }
            }
        }

        Ok(objects)
    }

    fn drift_motion(&mut self, object: SceneObject) -> SceneObject {
        let velocity = random_vector(&mut *self.rng, Vector3::new(1.0, 1.0, 1.0) * Self::DRIFT_VELOCITY);
        let spin = random_vector(&mut *self.rng, Vector3::new(1.0, 1.0, 1.0) * Self::DRIFT_SPIN);
        object.with_velocity(velocity, spin)
    }

    fn cross(&mut self, allocator: &mut dyn ResourceAllocator) -> Result<SceneObject, SceneError> {
        let metal = MaterialDesc::new(Shading::Physical, hsl_color(0.6, 0.8, 0.6)).with_pbr(0.8, 0.2);
        let parts = allocate_parts(
            allocator,
            vec![
                PartSpec::new(geometry::generate_box(2.5, 0.5, 0.5), metal.clone()),
                PartSpec::new(geometry::generate_box(0.5, 2.5, 0.5), metal),
                PartSpec::new(
                    geometry::generate_sphere(0.3, 16, 12),
                    MaterialDesc::new(Shading::Physical, [1.0, 1.0, 1.0])
                        .with_pbr(1.0, 0.0)
                        .with_emissive(hex_color(0x222222)),
                ),
            ],
        )?;

        let mut transform = Transform::at(random_vector(&mut *self.rng, Self::DRIFT_SPREAD));
        transform.rotation = random_rotation(&mut *self.rng);
        let object = SceneObject::new(ObjectKind::Cross, transform, parts);
        Ok(self.drift_motion(object))
    }

    fn capped_cylinder(
        &mut self,
        allocator: &mut dyn ResourceAllocator,
        glass: bool,
    ) -> Result<SceneObject, SceneError> {
        let body = if glass {
            MaterialDesc::new(Shading::Physical, [1.0, 1.0, 1.0])
                .with_pbr(0.0, 0.0)
                .with_opacity(0.8)
        } else {
            MaterialDesc::new(Shading::Physical, hsl_color(self.rng.random(), 0.7, 0.5)).with_pbr(0.6, 0.3)
        };
        let cap = MaterialDesc::new(Shading::Physical, hex_color(0x333333)).with_pbr(0.9, 0.1);

        let cap_spec = |y: f32| PartSpec {
            local: Transform::at(Vector3::new(0.0, y, 0.0)),
            fixed: true,
            ..PartSpec::new(geometry::generate_cylinder(0.65, 0.65, 0.1, 16), cap.clone())
        };

        let parts = allocate_parts(
            allocator,
            vec![
                PartSpec::new(geometry::generate_cylinder(0.6, 0.6, 2.0, 16), body),
                cap_spec(1.05),
                cap_spec(-1.05),
            ],
        )?;

        let mut transform = Transform::at(random_vector(&mut *self.rng, Self::DRIFT_SPREAD));
        transform.rotation = random_rotation(&mut *self.rng);
        let object = SceneObject::new(ObjectKind::Cylinder { glass }, transform, parts);
        Ok(self.drift_motion(object))
    }

    fn complex(&mut self, allocator: &mut dyn ResourceAllocator) -> Result<SceneObject, SceneError> {
        const SATELLITES: usize = 3;

        let mut specs = vec![PartSpec::new(
            geometry::generate_octahedron(0.8),
            MaterialDesc::new(Shading::Physical, hsl_color(0.8, 0.6, 0.4)).with_pbr(0.7, 0.2),
        )];
        for j in 0..SATELLITES {
            let hue = j as f32 / SATELLITES as f32;
            specs.push(PartSpec {
                orbit: Some(Orbit { angle: hue * 2.0 * PI, radius: 1.5, bob_amplitude: 0.3 }),
                ..PartSpec::new(
                    geometry::generate_sphere(0.2, 12, 8),
                    MaterialDesc::new(Shading::Physical, hsl_color(hue, 0.8, 0.6))
                        .with_pbr(0.9, 0.1)
                        .with_emissive(hsl_color(hue, 0.5, 0.1)),
                )
            });
        }
        let parts = allocate_parts(allocator, specs)?;

        let orbit_speed = 0.02 + self.rng.random::<f32>() * 0.02;
        let transform = Transform::at(random_vector(&mut *self.rng, Self::DRIFT_SPREAD));
        let object = SceneObject::new(ObjectKind::Complex { orbit_speed }, transform, parts);
        Ok(self.drift_motion(object))
    }

    fn floating(
        &mut self,
        allocator: &mut dyn ResourceAllocator,
        shape: PrimitiveShape,
    ) -> Result<SceneObject, SceneError> {
        let s = 0.5 + self.rng.random::<f32>() * 1.5;
        let data = match shape {
            PrimitiveShape::Box => geometry::generate_box(s, s, s),
            PrimitiveShape::Sphere => geometry::generate_sphere(s * 0.6, 32, 16),
            PrimitiveShape::Cone => geometry::generate_cone(s * 0.6, s * 1.2, 8),
            PrimitiveShape::Cylinder => geometry::generate_cylinder(s * 0.5, s * 0.5, s * 1.2, 8),
            PrimitiveShape::Torus => geometry::generate_torus(s * 0.6, s * 0.2, 16, 100),
            PrimitiveShape::Octahedron => geometry::generate_octahedron(s * 0.8),
            PrimitiveShape::Dodecahedron => geometry::generate_dodecahedron(s * 0.7),
            PrimitiveShape::Icosahedron => geometry::generate_icosahedron(s * 0.8),
        };
        let surface = random_surface(&mut *self.rng);
        let part = RenderPart::allocate(allocator, &data, surface)?;

        let position = Vector3::new(
            symmetric(&mut *self.rng, 16.0),
            self.rng.random::<f32>() * 8.0 - 1.0,
            symmetric(&mut *self.rng, 16.0),
        );
        let mut transform = Transform::at(position);
        transform.rotation = random_rotation(&mut *self.rng);
        let spin = random_vector(&mut *self.rng, Vector3::new(0.02, 0.02, 0.02));
        let bob = Bob {
            speed: self.rng.random::<f32>() * 0.02 + 0.01,
            offset: self.rng.random::<f32>() * PI * 2.0,
        };

        Ok(SceneObject::new(ObjectKind::Primitive(shape), transform, vec![part])
            .with_velocity(Vector3::zero(), spin)
            .with_bob(bob))
    }

    fn showcase(
        &mut self,
        allocator: &mut dyn ResourceAllocator,
        shape: PrimitiveShape,
        index: usize,
        total: usize,
    ) -> Result<SceneObject, SceneError> {
        let (data, color) = match shape {
            PrimitiveShape::Sphere => (geometry::generate_sphere(0.8, 32, 32), 0xff6b6b),
            PrimitiveShape::Box => (geometry::generate_box(1.5, 1.5, 1.5), 0x4ecdc4),
            PrimitiveShape::Cylinder => (geometry::generate_cylinder(0.6, 0.6, 1.8, 32), 0x45b7d1),
            PrimitiveShape::Cone => (geometry::generate_cone(0.8, 1.8, 32), 0xf9ca24),
            PrimitiveShape::Torus => (geometry::generate_torus(0.8, 0.3, 16, 100), 0x6c5ce7),
            PrimitiveShape::Octahedron => (geometry::generate_octahedron(0.9), 0xe17055),
            PrimitiveShape::Dodecahedron => (geometry::generate_dodecahedron(0.9), 0x00b894),
            PrimitiveShape::Icosahedron => (geometry::generate_icosahedron(0.9), 0xfd79a8),
        };
        let part = RenderPart::allocate(
            allocator,
            &data,
            MaterialDesc::new(Shading::Phong, hex_color(color)).with_pbr(0.0, 0.2),
        )?;

        let x = (index as f32 - (total.saturating_sub(1)) as f32 / 2.0) * SHOWCASE_SPACING;
        Ok(SceneObject::new(
            ObjectKind::Primitive(shape),
            Transform::at(Vector3::new(x, 0.0, 0.0)),
            vec![part],
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::resources::TrackingAllocator;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_drift_default_composition() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut allocator = TrackingAllocator::new();
        let mut scene = SceneBuilder::new(SceneVariant::Drift, &mut rng)
            .build(&mut allocator, None, 1.5)
            .unwrap();

        let kinds: Vec<_> = scene.objects.iter().map(|o| o.kind).collect();
        assert_eq!(kinds.iter().filter(|k| matches!(k, ObjectKind::Cross)).count(), 4);
        assert_eq!(kinds.iter().filter(|k| matches!(k, ObjectKind::Cylinder { .. })).count(), 5);
        assert_eq!(kinds.iter().filter(|k| matches!(k, ObjectKind::Complex { .. })).count(), 3);
        assert!(matches!(kinds[4], ObjectKind::Cylinder { glass: true }));
        assert!(matches!(kinds[5], ObjectKind::Cylinder { glass: false }));
        assert_eq!(scene.ambient_field.as_ref().map(|f| f.len()), Some(200));

        for object in scene.objects.iter() {
            let p = object.transform.position;
            assert!(p.x.abs() <= 6.0 && p.y.abs() <= 4.0 && p.z.abs() <= 3.0);
            assert!(object.velocity.x.abs() <= 0.015);
            assert!(object.angular_velocity.y.abs() <= 0.01);
        }

        scene.release_all(&mut allocator);
        assert_eq!(allocator.live(), 0);
    }

    #[test]
    fn test_complex_objects_carry_three_satellites() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut allocator = TrackingAllocator::new();
        let objects = SceneBuilder::new(SceneVariant::Drift, &mut rng)
            .with_distribution(KindDistribution::new(vec![(KindChoice::Complex, 1.0)]))
            .build_objects(&mut allocator, Some(2))
            .unwrap();

        for object in &objects {
            let ObjectKind::Complex { orbit_speed } = object.kind else {
                panic!("expected complex kind");
            };
            assert!((0.02..0.04).contains(&orbit_speed));
            assert_eq!(object.parts().iter().filter(|p| p.orbit.is_some()).count(), 3);
        }
        for mut object in objects {
            object.release(&mut allocator);
        }
    }

    #[test]
    fn test_float_objects_within_ranges() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut allocator = TrackingAllocator::new();
        let scene = SceneBuilder::new(SceneVariant::Float, &mut rng)
            .build(&mut allocator, Some(12), 1.0)
            .unwrap();

        assert_eq!(scene.objects.len(), 12);
        assert!(scene.ground.is_some());
        for object in scene.objects.iter() {
            let p = object.transform.position;
            assert!(p.x.abs() <= 8.0 && p.z.abs() <= 8.0);
            assert!((-1.0..7.0).contains(&p.y));
            let bob = object.bob.expect("float objects bob");
            assert!((0.01..0.03).contains(&bob.speed));
        }
    }

    #[test]
    fn test_showcase_layout() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut allocator = TrackingAllocator::new();
        let scene = SceneBuilder::new(SceneVariant::Showcase, &mut rng)
            .build(&mut allocator, None, 1.0)
            .unwrap();

        let xs: Vec<f32> = scene.objects.iter().map(|o| o.transform.position.x).collect();
        assert_eq!(xs, vec![-4.0, -2.0, 0.0, 2.0, 4.0]);
        assert!(matches!(
            scene.objects.at(4).map(|o| o.kind),
            Some(ObjectKind::Primitive(PrimitiveShape::Torus))
        ));
    }

    #[test]
    fn test_failed_build_leaks_nothing() {
        struct FailAfter {
            inner: TrackingAllocator,
            remaining: usize,
        }
        impl ResourceAllocator for FailAfter {
            fn create_geometry(&mut self, data: &GeometryData) -> Result<crate::gfx::resources::GeometryHandle, SceneError> {
                if self.remaining == 0 {
                    return Err(SceneError::Allocation { kind: "geometry", reason: "exhausted".into() });
                }
                self.remaining -= 1;
                self.inner.create_geometry(data)
            }
            fn create_material(&mut self, desc: &MaterialDesc) -> Result<crate::gfx::resources::MaterialHandle, SceneError> {
                self.inner.create_material(desc)
            }
            fn release_geometry(&mut self, handle: crate::gfx::resources::GeometryHandle) {
                self.inner.release_geometry(handle)
            }
            fn release_material(&mut self, handle: crate::gfx::resources::MaterialHandle) {
                self.inner.release_material(handle)
            }
        }

        let mut rng = StdRng::seed_from_u64(4);
        let mut allocator = FailAfter { inner: TrackingAllocator::new(), remaining: 7 };
        let result = SceneBuilder::new(SceneVariant::Drift, &mut rng).build(&mut allocator, None, 1.0);

        assert!(result.is_err());
        assert_eq!(allocator.inner.live(), 0);
    }

    #[test]
    fn test_seeded_builds_match() {
        let positions = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut allocator = TrackingAllocator::new();
            let scene = SceneBuilder::new(SceneVariant::Float, &mut rng)
                .build(&mut allocator, None, 1.0)
                .unwrap();
            scene.objects.iter().map(|o| o.transform.position).collect::<Vec<_>>()
        };
        assert_eq!(positions(11), positions(11));
        assert_eq!(positions(11).len(), FLOAT_DEFAULT_COUNT);
    }
}
