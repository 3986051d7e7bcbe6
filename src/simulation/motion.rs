//! # Motion Policies
//!
//! The per-tick Simulation Step. Each scene variant runs exactly one policy:
//!
//! - [`DriftMotion`]: velocity integration with gravity bias, energy-scaled
//!   damping and inelastic wall bounces
//! - [`FloatMotion`]: objects bob and sway around a fixed origin
//! - [`ShowcaseMotion`]: idle spin, or the strike timeline while struck
//!
//! Policies mutate a single object in place and allocate nothing.

use cgmath::Vector3;

use crate::scene::{
    object::{ObjectId, ObjectKind, SceneObject},
    SceneVariant,
};

/// Per-object inputs to one step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepContext {
    /// Position of the object in the registry
    pub index: usize,
    /// Scene time in seconds, scaled by animation speed
    pub time: f32,
    pub auto_rotate: bool,
    /// Object currently held by a drag, exempt from positional motion
    pub held: Option<ObjectId>,
}

impl StepContext {
    pub fn at(index: usize) -> Self {
        Self {
            index,
            time: 0.0,
            auto_rotate: true,
            held: None,
        }
    }
}

/// One named motion model
pub trait MotionPolicy {
    fn name(&self) -> &'static str;

    /// Advances `object` by one tick
    fn step(&self, object: &mut SceneObject, ctx: &StepContext);
}

/// Selects the motion policy for a scene variant
pub fn policy_for(variant: SceneVariant) -> Box<dyn MotionPolicy> {
    match variant {
        SceneVariant::Drift => Box::new(DriftMotion::default()),
        SceneVariant::Float => Box::new(FloatMotion::default()),
        SceneVariant::Showcase => Box::new(ShowcaseMotion::default()),
    }
}

/// `scale += (target - scale) * factor`, applied uniformly
fn ease_scale(object: &mut SceneObject, factor: f32) {
    let current = object.transform.uniform_scale();
    let eased = current + (object.target_scale - current) * factor;
    object.transform.set_uniform_scale(eased);
}

/// Bounce-and-drift physics
#[derive(Debug, Clone, PartialEq)]
pub struct DriftMotion {
    /// Added to vertical velocity each tick
    pub gravity: f32,
    pub base_damping: f32,
    pub damping_energy_factor: f32,
    pub angular_damping: f32,
    pub energy_decay: f32,
    pub scale_easing: f32,
    /// Half extents of the box objects bounce inside
    pub bounds: Vector3<f32>,
    pub restitution: f32,
    pub bounce_energy: f32,
}

impl Default for DriftMotion {
    fn default() -> Self {
        Self {
            gravity: -0.001,
            base_damping: 0.985,
            damping_energy_factor: 0.01,
            angular_damping: 0.92,
            energy_decay: 0.99,
            scale_easing: 0.1,
            bounds: Vector3::new(8.0, 6.0, 4.0),
            restitution: 0.7,
            bounce_energy: 0.1,
        }
    }
}

impl DriftMotion {
    pub fn without_gravity() -> Self {
        Self {
            gravity: 0.0,
            ..Default::default()
        }
    }

    /// Reflects and clamps every axis that left the bounds. Returns how many
    /// axes bounced.
    pub fn bounce(&self, object: &mut SceneObject) -> usize {
        let mut bounced = 0;
        for axis in 0..3 {
            let bound = self.bounds[axis];
            let position = object.transform.position[axis];
            if position.abs() > bound {
                object.velocity[axis] *= -self.restitution;
                object.transform.position[axis] = bound.copysign(position);
                object.add_energy(self.bounce_energy);
                bounced += 1;
            }
        }
        bounced
    }
}

impl MotionPolicy for DriftMotion {
    fn name(&self) -> &'static str {
        "drift"
    }

    fn step(&self, object: &mut SceneObject, _ctx: &StepContext) {
        object.transform.position += object.velocity;
        object.velocity.y += self.gravity;
        object.transform.rotation += object.angular_velocity;

        let damping = self.base_damping + object.energy() * self.damping_energy_factor;
        object.velocity *= damping;
        object.angular_velocity *= self.angular_damping;
        object.decay_energy(self.energy_decay);

        ease_scale(object, self.scale_easing);

        if let ObjectKind::Complex { orbit_speed } = object.kind {
            for part in object.parts_mut() {
                if let Some(orbit) = part.orbit.as_mut() {
                    orbit.angle += orbit_speed;
                    part.local.position = orbit.local_position();
                }
            }
        }

        self.bounce(object);
    }
}

/// Bob-in-place motion
#[derive(Debug, Clone, PartialEq)]
pub struct FloatMotion {
    pub bob_amplitude: f32,
    pub sway_amplitude: f32,
    /// Sway frequencies for x and z
    pub sway_frequency: (f32, f32),
    pub scale_easing: f32,
}

impl Default for FloatMotion {
    fn default() -> Self {
        Self {
            bob_amplitude: 0.5,
            sway_amplitude: 0.2,
            sway_frequency: (0.3, 0.2),
            scale_easing: 0.1,
        }
    }
}

impl MotionPolicy for FloatMotion {
    fn name(&self) -> &'static str {
        "float"
    }

    fn step(&self, object: &mut SceneObject, ctx: &StepContext) {
        if ctx.auto_rotate {
            object.transform.rotation += object.angular_velocity;
        }
        ease_scale(object, self.scale_easing);

        if ctx.held == Some(object.id()) {
            return;
        }

        let origin = object.original_position;
        let phase = ctx.index as f32;
        if let Some(bob) = object.bob {
            object.transform.position.y =
                origin.y + (ctx.time * bob.speed + bob.offset).sin() * self.bob_amplitude;
        }
        object.transform.position.x =
            origin.x + (ctx.time * self.sway_frequency.0 + phase).sin() * self.sway_amplitude;
        object.transform.position.z =
            origin.z + (ctx.time * self.sway_frequency.1 + phase).cos() * self.sway_amplitude;
    }
}

/// Idle spin plus strike timelines
#[derive(Debug, Clone, PartialEq)]
pub struct ShowcaseMotion {
    /// Per-index spin increments about x and y
    pub spin: (f32, f32),
}

impl Default for ShowcaseMotion {
    fn default() -> Self {
        Self { spin: (0.003, 0.005) }
    }
}

impl MotionPolicy for ShowcaseMotion {
    fn name(&self) -> &'static str {
        "showcase"
    }

    fn step(&self, object: &mut SceneObject, ctx: &StepContext) {
        if let Some(timeline) = object.strike.as_mut() {
            if timeline.advance(&mut object.transform) {
                object.strike = None;
            }
            return;
        }

        let rate = (ctx.index + 1) as f32;
        object.transform.rotation.y += self.spin.1 * rate;
        object.transform.rotation.x += self.spin.0 * rate;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        gfx::{
            geometry::generate_box,
            resources::{MaterialDesc, TrackingAllocator},
        },
        scene::{
            builder::SceneBuilder,
            object::{Bob, ObjectKind, PrimitiveShape, RenderPart, Transform, ENERGY_CAP},
        },
        simulation::strike::StrikeImpulse,
    };
    use approx::assert_relative_eq;
    use cgmath::Zero;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    fn object_at(allocator: &mut TrackingAllocator, position: Vector3<f32>) -> SceneObject {
        let part = RenderPart::allocate(allocator, &generate_box(1.0, 1.0, 1.0), MaterialDesc::default()).unwrap();
        SceneObject::new(ObjectKind::Primitive(PrimitiveShape::Box), Transform::at(position), vec![part])
    }

    #[test]
    fn test_no_drift_without_forcing() {
        let mut allocator = TrackingAllocator::new();
        let positions = [
            Vector3::new(-2.0, 1.0, 0.5),
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(3.0, -2.5, -1.0),
        ];
        let mut objects: Vec<_> = positions.iter().map(|p| object_at(&mut allocator, *p)).collect();
        let policy = DriftMotion::without_gravity();

        for _ in 0..100 {
            for (i, object) in objects.iter_mut().enumerate() {
                policy.step(object, &StepContext::at(i));
            }
        }

        for (object, expected) in objects.iter().zip(positions) {
            assert_eq!(object.transform.position, expected);
            assert_eq!(object.transform.rotation, Vector3::zero());
        }
    }

    #[test]
    fn test_floor_bounce_clamps_reflects_and_adds_energy_once() {
        let mut allocator = TrackingAllocator::new();
        let mut object = object_at(&mut allocator, Vector3::zero());
        object.velocity = Vector3::new(0.0, -1.0, 0.0);
        let policy = DriftMotion::without_gravity();
        assert_relative_eq!(policy.bounds.y, 6.0);

        let mut ticks = 0;
        loop {
            let before = object.velocity.y;
            let energy_before = object.energy();
            policy.step(&mut object, &StepContext::at(0));
            ticks += 1;

            if object.energy() > energy_before {
                // Velocity was damped in this tick before the wall reflected it
                let pre_bounce = before * (policy.base_damping + energy_before * policy.damping_energy_factor);
                assert_eq!(object.transform.position.y, -6.0);
                assert!(object.velocity.y > 0.0 && pre_bounce < 0.0);
                assert_relative_eq!(object.velocity.y, -pre_bounce * policy.restitution, epsilon = 1e-6);
                assert_relative_eq!(object.energy(), policy.bounce_energy);
                break;
            }
            assert!(ticks < 50, "object never reached the floor");
        }

        // Moving away from the floor: no second increment
        let energy_after = object.energy();
        policy.step(&mut object, &StepContext::at(0));
        assert!(object.transform.position.y > -6.0);
        assert!(object.energy() < energy_after);
    }

    #[test]
    fn test_bounce_on_each_axis() {
        let mut allocator = TrackingAllocator::new();
        let mut object = object_at(&mut allocator, Vector3::new(8.5, -6.5, 3.0));
        object.velocity = Vector3::new(0.2, -0.1, 0.05);
        let policy = DriftMotion::default();

        assert_eq!(policy.bounce(&mut object), 2);
        assert_eq!(object.transform.position, Vector3::new(8.0, -6.0, 3.0));
        assert_relative_eq!(object.velocity.x, -0.14);
        assert_relative_eq!(object.velocity.y, 0.07);
        assert_relative_eq!(object.velocity.z, 0.05);
        assert_relative_eq!(object.energy(), 0.2);
    }

    #[test]
    fn test_energy_bounded_under_random_strikes() {
        let mut rng = StdRng::seed_from_u64(77);
        let mut allocator = TrackingAllocator::new();
        let mut scene = SceneBuilder::new(SceneVariant::Drift, &mut rng)
            .build(&mut allocator, None, 1.0)
            .unwrap();
        let policy = DriftMotion::default();
        let impulse = StrikeImpulse::default();

        for tick in 0..2000 {
            if tick % 7 == 0 {
                let index = rng.random_range(0..scene.objects.len());
                if let Some(object) = scene.objects.at_mut(index) {
                    impulse.apply(object, &mut rng);
                }
            }
            for (i, object) in scene.objects.iter_mut().enumerate() {
                policy.step(object, &StepContext::at(i));
                assert!((0.0..=ENERGY_CAP).contains(&object.energy()));
                let p = object.transform.position;
                assert!(p.x.abs() <= 8.0 && p.y.abs() <= 6.0 && p.z.abs() <= 4.0);
            }
        }
    }

    #[test]
    fn test_scale_converges_geometrically() {
        let mut allocator = TrackingAllocator::new();
        let mut object = object_at(&mut allocator, Vector3::zero());
        object.target_scale = 1.5;
        let policy = DriftMotion::without_gravity();

        let mut gap = (object.transform.uniform_scale() - object.target_scale).abs();
        for _ in 0..60 {
            policy.step(&mut object, &StepContext::at(0));
            let next = (object.transform.uniform_scale() - object.target_scale).abs();
            assert!(next < gap);
            assert_relative_eq!(next, gap * 0.9, epsilon = 1e-5);
            gap = next;
        }
        assert!(gap < 1e-3);
    }

    #[test]
    fn test_satellites_follow_orbit() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut allocator = TrackingAllocator::new();
        let mut objects = SceneBuilder::new(SceneVariant::Drift, &mut rng)
            .with_distribution(crate::scene::KindDistribution::new(vec![(
                crate::scene::KindChoice::Complex,
                1.0,
            )]))
            .build_objects(&mut allocator, Some(1))
            .unwrap();
        let object = &mut objects[0];
        let ObjectKind::Complex { orbit_speed } = object.kind else {
            panic!("expected complex");
        };
        let start = object.parts()[1].orbit.unwrap().angle;

        DriftMotion::default().step(object, &StepContext::at(0));

        let satellite = &object.parts()[1];
        let orbit = satellite.orbit.unwrap();
        assert_relative_eq!(orbit.angle, start + orbit_speed);
        assert_relative_eq!(satellite.local.position.x, orbit.angle.cos() * 1.5);
        assert_relative_eq!(satellite.local.position.y, orbit.angle.sin() * 0.3);
    }

    #[test]
    fn test_float_bobs_around_origin_and_respects_hold() {
        let mut allocator = TrackingAllocator::new();
        let origin = Vector3::new(1.0, 2.0, 3.0);
        let mut object = object_at(&mut allocator, origin).with_bob(Bob { speed: 0.02, offset: 0.5 });
        object.angular_velocity = Vector3::new(0.01, 0.0, 0.0);
        let policy = FloatMotion::default();

        let ctx = StepContext { index: 2, time: 40.0, auto_rotate: false, held: None };
        policy.step(&mut object, &ctx);
        assert_relative_eq!(object.transform.position.y, 2.0 + (40.0f32 * 0.02 + 0.5).sin() * 0.5);
        assert_relative_eq!(object.transform.position.x, 1.0 + (40.0f32 * 0.3 + 2.0).sin() * 0.2);
        assert_eq!(object.transform.rotation, Vector3::zero());

        object.transform.position = Vector3::new(-5.0, 0.0, 0.0);
        let held = StepContext { held: Some(object.id()), auto_rotate: true, ..ctx };
        policy.step(&mut object, &held);
        assert_eq!(object.transform.position, Vector3::new(-5.0, 0.0, 0.0));
        assert_relative_eq!(object.transform.rotation.x, 0.01);
    }

    #[test]
    fn test_showcase_idle_spin_scales_with_index() {
        let mut allocator = TrackingAllocator::new();
        let mut object = object_at(&mut allocator, Vector3::zero());
        let policy = ShowcaseMotion::default();

        policy.step(&mut object, &StepContext::at(3));
        assert_relative_eq!(object.transform.rotation.y, 0.02);
        assert_relative_eq!(object.transform.rotation.x, 0.012);
    }
}
