//! Strikes: impulses for drifting objects, timelines for showcase objects,
//! and scheduling of staggered and automatic strikes.

use std::f32::consts::PI;

use cgmath::{Vector3, VectorSpace, Zero};
use rand::Rng;

use crate::scene::{
    object::{Highlight, SceneObject, Transform},
    particles::ImpactBurst,
    scene::Scene,
    SceneVariant,
};

/// Impulse parameters applied when a drifting object is struck
#[derive(Debug, Clone, PartialEq)]
pub struct StrikeImpulse {
    /// Per-axis impulse is uniform in [-max, max)
    pub max_impulse: f32,
    pub energy_gain: f32,
    pub spin_burst: f32,
    pub target_scale: f32,
}

impl Default for StrikeImpulse {
    fn default() -> Self {
        Self {
            max_impulse: 0.075,
            energy_gain: 0.5,
            spin_burst: 1.8,
            target_scale: 1.5,
        }
    }
}

impl StrikeImpulse {
    pub fn apply<R: Rng>(&self, object: &mut SceneObject, rng: &mut R) {
        let m = self.max_impulse;
        object.velocity += Vector3::new(
            rng.random_range(-m..m),
            rng.random_range(-m..m),
            rng.random_range(-m..m),
        );
        object.add_energy(self.energy_gain);
        object.angular_velocity *= self.spin_burst;
        object.target_scale = self.target_scale;
        object.set_highlight(Highlight::Strike);
    }
}

/// Deform, bounce and land sequence played by a struck showcase object
#[derive(Debug, Clone, PartialEq)]
pub struct StrikeTimeline {
    elapsed_ms: f32,
    bounce_height: f32,
    bounce_rotation: f32,
    origin: Vector3<f32>,
    origin_scale: Vector3<f32>,
}

impl StrikeTimeline {
    pub const DURATION_MS: f32 = 2000.0;
    pub const STEP_MS: f32 = 16.0;
    const DEFORM_END: f32 = 0.1;
    const BOUNCE_END: f32 = 0.8;
    const SQUASH: Vector3<f32> = Vector3 { x: 1.3, y: 0.7, z: 1.3 };
    const SINK: f32 = -0.5;

    pub fn new<R: Rng>(rng: &mut R, origin: Vector3<f32>, origin_scale: Vector3<f32>) -> Self {
        Self {
            elapsed_ms: 0.0,
            bounce_height: 2.0 + rng.random::<f32>() * 3.0,
            bounce_rotation: (rng.random::<f32>() - 0.5) * PI * 2.0,
            origin,
            origin_scale,
        }
    }

    pub fn progress(&self) -> f32 {
        (self.elapsed_ms / Self::DURATION_MS).min(1.0)
    }

    pub fn bounce_height(&self) -> f32 {
        self.bounce_height
    }

    /// Advances one tick and poses `transform`. Returns true once the
    /// timeline has completed, at which point the pose is reset exactly.
    pub fn advance(&mut self, transform: &mut Transform) -> bool {
        self.elapsed_ms += Self::STEP_MS;
        let progress = self.progress();

        if progress < Self::DEFORM_END {
            let p = progress / Self::DEFORM_END;
            let squashed = Vector3::new(
                self.origin_scale.x * Self::SQUASH.x,
                self.origin_scale.y * Self::SQUASH.y,
                self.origin_scale.z * Self::SQUASH.z,
            );
            transform.scale = transform.scale.lerp(squashed, p * 0.5);
            transform.position.y = self.origin.y + Self::SINK * p;
        } else if progress < Self::BOUNCE_END {
            let p = (progress - Self::DEFORM_END) / (Self::BOUNCE_END - Self::DEFORM_END);
            transform.position.y = self.origin.y + (p * PI).sin() * self.bounce_height;
            transform.rotation.x = self.bounce_rotation * p;
            transform.rotation.z = self.bounce_rotation * 0.5 * p;
            transform.scale = transform.scale.lerp(self.origin_scale, p * 0.3);
        } else {
            let p = (progress - Self::BOUNCE_END) / (1.0 - Self::BOUNCE_END);
            transform.position = transform.position.lerp(self.origin, p);
            transform.rotation.x *= 1.0 - p;
            transform.rotation.z *= 1.0 - p;
            transform.scale = transform.scale.lerp(self.origin_scale, p);
        }

        if progress >= 1.0 {
            transform.position = self.origin;
            transform.rotation = Vector3::zero();
            transform.scale = self.origin_scale;
            true
        } else {
            false
        }
    }
}

/// Strikes the object at `index` the way its scene variant defines a strike.
/// Returns false when there is no such object, the object is mid-strike, or
/// the variant has no strike.
pub fn strike_object<R: Rng>(scene: &mut Scene, index: usize, rng: &mut R) -> bool {
    let variant = scene.variant();
    let Some(object) = scene.objects.at_mut(index) else {
        return false;
    };

    match variant {
        SceneVariant::Drift => {
            StrikeImpulse::default().apply(object, rng);
            true
        }
        SceneVariant::Showcase => {
            if object.is_struck() {
                log::debug!("Ignoring strike on {}: already struck", object.id());
                return false;
            }
            let origin = object.transform.position;
            object.strike = Some(StrikeTimeline::new(rng, origin, object.transform.scale));
            scene.bursts.push(ImpactBurst::spawn(rng, origin));
            true
        }
        SceneVariant::Float => false,
    }
}

/// Queue of pending strikes plus the optional auto-strike timer.
/// Times are seconds of driver time.
#[derive(Debug, Default)]
pub struct StrikeScheduler {
    pending: Vec<(f32, usize)>,
    next_auto: Option<f32>,
}

impl StrikeScheduler {
    pub const STAGGER: f32 = 0.2;
    pub const AUTO_INTERVAL: f32 = 1.5;

    pub fn new() -> Self {
        Self::default()
    }

    /// Queues every index in `0..count`, each 200 ms after the previous
    pub fn schedule_all(&mut self, now: f32, count: usize) {
        self.pending
            .extend((0..count).map(|i| (now + i as f32 * Self::STAGGER, i)));
    }

    pub fn schedule(&mut self, at: f32, index: usize) {
        self.pending.push((at, index));
    }

    pub fn set_auto(&mut self, enabled: bool, now: f32) {
        match (enabled, self.next_auto) {
            (true, None) => self.next_auto = Some(now + Self::AUTO_INTERVAL),
            (false, Some(_)) => self.next_auto = None,
            _ => {}
        }
    }

    pub fn auto_enabled(&self) -> bool {
        self.next_auto.is_some()
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// Removes and returns the indexes due at `now`, in due order. An auto
    /// strike that is due picks a random index in `0..count`.
    pub fn poll<R: Rng>(&mut self, now: f32, count: usize, rng: &mut R) -> Vec<usize> {
        let mut due: Vec<(f32, usize)> = Vec::new();
        self.pending.retain(|&(at, index)| {
            if at <= now {
                due.push((at, index));
                false
            } else {
                true
            }
        });
        due.sort_by(|a, b| a.0.total_cmp(&b.0));
        let mut fired: Vec<usize> = due.into_iter().map(|(_, index)| index).collect();

        if let Some(next) = self.next_auto {
            if now >= next {
                if count > 0 {
                    fired.push(rng.random_range(0..count));
                }
                self.next_auto = Some(next + Self::AUTO_INTERVAL);
            }
        }

        fired
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        gfx::resources::TrackingAllocator,
        scene::builder::SceneBuilder,
    };
    use approx::assert_relative_eq;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_timeline_completes_and_resets_exactly() {
        let mut rng = StdRng::seed_from_u64(21);
        let origin = Vector3::new(2.0, 0.0, 0.0);
        let mut transform = Transform::at(origin);
        transform.rotation = Vector3::new(0.4, 1.0, 0.0);
        let mut timeline = StrikeTimeline::new(&mut rng, origin, transform.scale);

        let mut ticks = 0;
        let mut peak = f32::MIN;
        while !timeline.advance(&mut transform) {
            peak = peak.max(transform.position.y);
            ticks += 1;
            assert!(ticks < 200);
        }

        assert_eq!(ticks + 1, 125);
        assert!(peak > 1.5 && peak <= timeline.bounce_height());
        assert_eq!(transform.position, origin);
        assert_eq!(transform.rotation, Vector3::zero());
        assert_eq!(transform.scale, Vector3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn test_deform_phase_squashes() {
        let mut rng = StdRng::seed_from_u64(22);
        let mut transform = Transform::default();
        let mut timeline = StrikeTimeline::new(&mut rng, Vector3::zero(), transform.scale);
        for _ in 0..10 {
            timeline.advance(&mut transform);
        }
        assert!(transform.scale.x > 1.0);
        assert!(transform.scale.y < 1.0);
        assert!(transform.position.y < 0.0);
    }

    #[test]
    fn test_showcase_strike_rejected_while_struck() {
        let mut rng = StdRng::seed_from_u64(23);
        let mut allocator = TrackingAllocator::new();
        let mut scene = SceneBuilder::new(SceneVariant::Showcase, &mut rng)
            .build(&mut allocator, None, 1.0)
            .unwrap();

        assert!(strike_object(&mut scene, 1, &mut rng));
        assert!(!strike_object(&mut scene, 1, &mut rng));
        assert!(!strike_object(&mut scene, 99, &mut rng));
        assert_eq!(scene.bursts.len(), 1);
        assert_eq!(scene.bursts[0].particles().len(), ImpactBurst::PARTICLES);
    }

    #[test]
    fn test_drift_strike_caps_energy() {
        let mut rng = StdRng::seed_from_u64(24);
        let mut allocator = TrackingAllocator::new();
        let mut scene = SceneBuilder::new(SceneVariant::Drift, &mut rng)
            .build(&mut allocator, None, 1.0)
            .unwrap();

        for _ in 0..10 {
            assert!(strike_object(&mut scene, 0, &mut rng));
        }
        let object = scene.objects.at(0).unwrap();
        assert_relative_eq!(object.energy(), 2.0);
        assert_relative_eq!(object.target_scale, 1.5);
        assert_eq!(object.highlight(), Highlight::Strike);
    }

    #[test]
    fn test_schedule_all_is_staggered() {
        let mut rng = StdRng::seed_from_u64(25);
        let mut scheduler = StrikeScheduler::new();
        scheduler.schedule_all(10.0, 5);

        assert_eq!(scheduler.poll(10.0, 5, &mut rng), vec![0]);
        assert!(scheduler.poll(10.1, 5, &mut rng).is_empty());
        assert_eq!(scheduler.poll(10.45, 5, &mut rng), vec![1, 2]);
        assert_eq!(scheduler.poll(20.0, 5, &mut rng), vec![3, 4]);
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn test_auto_strike_interval() {
        let mut rng = StdRng::seed_from_u64(26);
        let mut scheduler = StrikeScheduler::new();
        scheduler.set_auto(true, 0.0);

        assert!(scheduler.poll(1.0, 5, &mut rng).is_empty());
        let fired = scheduler.poll(1.5, 5, &mut rng);
        assert_eq!(fired.len(), 1);
        assert!(fired[0] < 5);
        assert!(scheduler.poll(2.9, 5, &mut rng).is_empty());
        assert_eq!(scheduler.poll(3.0, 5, &mut rng).len(), 1);

        scheduler.set_auto(false, 3.0);
        assert!(scheduler.poll(10.0, 5, &mut rng).is_empty());
    }
}
