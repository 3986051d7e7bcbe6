//! Ambient particle field and impact bursts.
//!
//! Neither owns GPU handles: the renderer rebuilds one shared billboard
//! buffer from [`ParticleSprite`]s each frame.

use cgmath::{Matrix3, Rad, Vector3, Zero};
use rand::Rng;

use crate::gfx::resources::hex_color;

/// A particle ready to draw: world position, linear color with opacity, size
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleSprite {
    pub position: Vector3<f32>,
    pub color: [f32; 4],
    pub size: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldParticle {
    pub position: Vector3<f32>,
    pub color: [f32; 3],
    pub size: f32,
}

/// Slowly rotating cloud of static points
#[derive(Debug, Clone)]
pub struct ParticleField {
    particles: Vec<FieldParticle>,
    pub rotation: Vector3<f32>,
    pub spin: Vector3<f32>,
    pub opacity: f32,
}

impl ParticleField {
    pub const DEFAULT_COUNT: usize = 200;
    /// Scale from a particle's size attribute to world units
    const SIZE_SCALE: f32 = 0.025;

    /// Scatters `count` particles in a cube of edge `extent` centered at the origin
    pub fn scatter<R: Rng>(rng: &mut R, count: usize, extent: f32) -> Self {
        let particles = (0..count)
            .map(|_| FieldParticle {
                position: Vector3::new(
                    (rng.random::<f32>() - 0.5) * extent,
                    (rng.random::<f32>() - 0.5) * extent,
                    (rng.random::<f32>() - 0.5) * extent,
                ),
                color: [
                    rng.random::<f32>() * 0.5 + 0.5,
                    rng.random::<f32>() * 0.5 + 0.5,
                    rng.random::<f32>() * 0.8 + 0.2,
                ],
                size: rng.random::<f32>() * 3.0 + 1.0,
            })
            .collect();

        Self {
            particles,
            rotation: Vector3::zero(),
            spin: Vector3::new(0.0005, 0.001, 0.0),
            opacity: 0.6,
        }
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// One tick of ambient rotation
    pub fn advance(&mut self) {
        self.rotation += self.spin;
    }

    pub fn sprites(&self) -> impl Iterator<Item = ParticleSprite> + '_ {
        let rotation = Matrix3::from_angle_x(Rad(self.rotation.x))
            * Matrix3::from_angle_y(Rad(self.rotation.y))
            * Matrix3::from_angle_z(Rad(self.rotation.z));
        self.particles.iter().map(move |p| ParticleSprite {
            position: rotation * p.position,
            color: [p.color[0], p.color[1], p.color[2], self.opacity],
            size: p.size * Self::SIZE_SCALE,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BurstParticle {
    pub position: Vector3<f32>,
    pub velocity: Vector3<f32>,
}

/// Short-lived spray of particles thrown from a struck object
#[derive(Debug, Clone)]
pub struct ImpactBurst {
    particles: Vec<BurstParticle>,
    color: [f32; 3],
    opacity: f32,
}

impl ImpactBurst {
    pub const PARTICLES: usize = 50;
    pub const STEP: f32 = 0.016;
    pub const GRAVITY: f32 = 9.8;
    pub const FADE_PER_TICK: f32 = 0.02;
    const SIZE: f32 = 0.1;

    pub fn spawn<R: Rng>(rng: &mut R, origin: Vector3<f32>) -> Self {
        let particles = (0..Self::PARTICLES)
            .map(|_| BurstParticle {
                position: origin
                    + Vector3::new(
                        rng.random_range(-0.1..0.1),
                        rng.random_range(-0.1..0.1),
                        rng.random_range(-0.1..0.1),
                    ),
                velocity: Vector3::new(
                    rng.random_range(-5.0..5.0),
                    rng.random_range(5.0..15.0),
                    rng.random_range(-5.0..5.0),
                ),
            })
            .collect();

        Self {
            particles,
            color: hex_color(0xff4444),
            opacity: 1.0,
        }
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    pub fn particles(&self) -> &[BurstParticle] {
        &self.particles
    }

    /// Advances one fixed step; returns false once fully faded
    pub fn advance(&mut self) -> bool {
        for particle in &mut self.particles {
            particle.position += particle.velocity * Self::STEP;
            particle.velocity.y -= Self::GRAVITY * Self::STEP;
        }
        self.opacity = (self.opacity - Self::FADE_PER_TICK).max(0.0);
        self.is_alive()
    }

    pub fn is_alive(&self) -> bool {
        self.opacity > 0.0
    }

    pub fn sprites(&self) -> impl Iterator<Item = ParticleSprite> + '_ {
        self.particles.iter().map(move |p| ParticleSprite {
            position: p.position,
            color: [self.color[0], self.color[1], self.color[2], self.opacity],
            size: Self::SIZE,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::InnerSpace;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_field_scatter_ranges() {
        let mut rng = StdRng::seed_from_u64(3);
        let field = ParticleField::scatter(&mut rng, ParticleField::DEFAULT_COUNT, 20.0);
        assert_eq!(field.len(), 200);
        for sprite in field.sprites() {
            assert!(sprite.position.x.abs() <= 10.0);
            assert!(sprite.color[0] >= 0.5 && sprite.color[2] >= 0.2);
        }
    }

    #[test]
    fn test_field_rotation_preserves_distance() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut field = ParticleField::scatter(&mut rng, 10, 20.0);
        let before: Vec<f32> = field.sprites().map(|s| s.position.magnitude()).collect();
        for _ in 0..1000 {
            field.advance();
        }
        let after: Vec<f32> = field.sprites().map(|s| s.position.magnitude()).collect();
        assert!((field.rotation.y - 1.0).abs() < 1e-3);
        for (a, b) in before.iter().zip(&after) {
            assert!((a - b).abs() < 1e-3);
        }
    }

    #[test]
    fn test_burst_fades_out_in_fifty_ticks() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut burst = ImpactBurst::spawn(&mut rng, Vector3::new(2.0, 0.0, 0.0));
        assert_eq!(burst.particles().len(), ImpactBurst::PARTICLES);
        assert!(burst.particles().iter().all(|p| p.velocity.y >= 5.0));

        let mut ticks = 0;
        while burst.advance() {
            ticks += 1;
            assert!(ticks < 100);
        }
        assert!((49..=50).contains(&ticks));
        assert_eq!(burst.opacity(), 0.0);
    }
}
