//! Per-frame global uniform: camera, ambient term, lights and fog.

use crate::{
    gfx::{camera::PerspectiveCamera, resources::material::srgb_to_linear},
    scene::{Environment, Light, LightKind},
};

/// Maximum number of non-ambient lights the shader evaluates
pub const MAX_LIGHTS: usize = 4;

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightUniform {
    /// xyz position (or direction source for directional), w: 0 none, 1 directional, 2 point
    pub position: [f32; 4],
    /// Linear rgb + intensity
    pub color: [f32; 4],
}

/// MUST match the `Globals` struct in `shader.wgsl` exactly.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GlobalUniform {
    pub view_proj: [[f32; 4]; 4],
    pub view_position: [f32; 4],
    /// Linear rgb + intensity
    pub ambient: [f32; 4],
    /// Linear rgb + enabled flag
    pub fog_color: [f32; 4],
    /// near, far, unused, unused
    pub fog_range: [f32; 4],
    pub lights: [LightUniform; MAX_LIGHTS],
}

impl GlobalUniform {
    pub fn new(camera: &PerspectiveCamera, lights: &[Light], environment: &Environment) -> Self {
        let camera_uniform = camera.uniform();
        let mut ambient = [0.0f32; 4];
        let mut packed = [LightUniform::default(); MAX_LIGHTS];
        let mut slot = 0;

        for light in lights {
            let color = srgb_to_linear(light.color);
            match light.kind {
                LightKind::Ambient => {
                    ambient = [color[0], color[1], color[2], ambient[3] + light.intensity];
                }
                LightKind::Directional { position } | LightKind::Point { position } => {
                    if slot == MAX_LIGHTS {
                        log::warn!("Dropping light beyond the first {MAX_LIGHTS}");
                        continue;
                    }
                    let kind = if matches!(light.kind, LightKind::Point { .. }) { 2.0 } else { 1.0 };
                    packed[slot] = LightUniform {
                        position: [position.x, position.y, position.z, kind],
                        color: [color[0], color[1], color[2], light.intensity],
                    };
                    slot += 1;
                }
            }
        }

        let (fog_color, fog_range) = match &environment.fog {
            Some(fog) => {
                let c = srgb_to_linear(fog.color);
                ([c[0], c[1], c[2], 1.0], [fog.near, fog.far, 0.0, 0.0])
            }
            None => ([0.0; 4], [0.0; 4]),
        };

        Self {
            view_proj: camera_uniform.view_proj,
            view_position: camera_uniform.view_position,
            ambient,
            fog_color,
            fog_range,
            lights: packed,
        }
    }
}
