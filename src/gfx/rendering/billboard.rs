//! CPU expansion of particle sprites into camera-facing quads.

use cgmath::{InnerSpace, Matrix4, Vector3};

use crate::{
    gfx::{resources::material::srgb_to_linear, vertex::ParticleVertex},
    scene::ParticleSprite,
};

/// Vertices emitted per sprite (two triangles, no index buffer)
pub const VERTICES_PER_SPRITE: usize = 6;

const CORNERS: [[f32; 2]; VERTICES_PER_SPRITE] = [
    [-1.0, -1.0],
    [1.0, -1.0],
    [1.0, 1.0],
    [-1.0, -1.0],
    [1.0, 1.0],
    [-1.0, 1.0],
];

/// Camera right and up axes in world space, read from a view matrix
pub fn camera_axes(view: &Matrix4<f32>) -> (Vector3<f32>, Vector3<f32>) {
    let right = Vector3::new(view.x.x, view.y.x, view.z.x).normalize();
    let up = Vector3::new(view.x.y, view.y.y, view.z.y).normalize();
    (right, up)
}

/// Appends one quad per sprite to `out`, facing the camera described by `right` and `up`
pub fn expand_sprites(
    sprites: impl Iterator<Item = ParticleSprite>,
    right: Vector3<f32>,
    up: Vector3<f32>,
    out: &mut Vec<ParticleVertex>,
) {
    out.clear();
    for sprite in sprites {
        if sprite.color[3] <= 0.0 {
            continue;
        }
        let rgb = srgb_to_linear([sprite.color[0], sprite.color[1], sprite.color[2]]);
        let color = [rgb[0], rgb[1], rgb[2], sprite.color[3]];
        let half = sprite.size * 0.5;
        for corner in CORNERS {
            let position = sprite.position + right * (corner[0] * half) + up * (corner[1] * half);
            out.push(ParticleVertex {
                position: position.into(),
                color,
                corner,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::camera::PerspectiveCamera;
    use approx::assert_relative_eq;

    fn sprite(x: f32, opacity: f32) -> ParticleSprite {
        ParticleSprite {
            position: Vector3::new(x, 0.0, 0.0),
            color: [1.0, 1.0, 1.0, opacity],
            size: 2.0,
        }
    }

    #[test]
    fn test_axes_of_front_camera() {
        let camera = PerspectiveCamera::new(Vector3::new(0.0, 0.0, 10.0), Vector3::new(0.0, 0.0, 0.0), 60.0, 1.0);
        let (right, up) = camera_axes(&camera.view_matrix());
        assert_relative_eq!(right.x, 1.0, epsilon = 1e-5);
        assert_relative_eq!(up.y, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_expand_skips_invisible_sprites() {
        let mut out = vec![ParticleVertex {
            position: [9.0; 3],
            color: [0.0; 4],
            corner: [0.0; 2],
        }];
        let sprites = vec![sprite(0.0, 0.5), sprite(3.0, 0.0), sprite(5.0, 1.0)];
        expand_sprites(sprites.into_iter(), Vector3::unit_x(), Vector3::unit_y(), &mut out);

        assert_eq!(out.len(), 2 * VERTICES_PER_SPRITE);
        assert_relative_eq!(out[0].color[3], 0.5);
        // size 2 gives a half extent of 1 around the center
        assert_eq!(out[0].position, [-1.0, -1.0, 0.0]);
        assert_eq!(out[VERTICES_PER_SPRITE + 2].position, [6.0, 1.0, 0.0]);
    }
}
