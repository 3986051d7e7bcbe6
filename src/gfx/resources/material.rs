//! Material descriptions and their GPU uniform layout.
//!
//! A [`MaterialDesc`] is the CPU-side surface description each render part
//! owns. Highlight changes mutate it in place; the render engine packs it into
//! a [`SurfaceUniform`] together with the part's world matrix every frame.

use cgmath::Matrix4;

/// Lighting model used by the fragment shader
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Shading {
    /// Unlit, color only
    Basic,
    /// Diffuse only
    Lambert,
    /// Diffuse plus Blinn-Phong highlight
    Phong,
    /// Metallic/roughness approximation
    #[default]
    Standard,
    /// Standard with a clear-coat style rim
    Physical,
    /// Quantized diffuse bands
    Toon,
}

impl Shading {
    /// Identifier the shader switches on; must match `shader.wgsl`
    pub fn shader_id(&self) -> f32 {
        match self {
            Shading::Basic => 0.0,
            Shading::Lambert => 1.0,
            Shading::Phong => 2.0,
            Shading::Standard => 3.0,
            Shading::Physical => 4.0,
            Shading::Toon => 5.0,
        }
    }
}

/// Surface description of one render part. Colors are sRGB in [0, 1].
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialDesc {
    pub shading: Shading,
    pub color: [f32; 3],
    pub emissive: [f32; 3],
    pub metallic: f32,
    pub roughness: f32,
    /// 1.0 is opaque; anything lower is alpha blended
    pub opacity: f32,
    pub wireframe: bool,
}

impl Default for MaterialDesc {
    fn default() -> Self {
        Self {
            shading: Shading::Standard,
            color: [0.8, 0.8, 0.8],
            emissive: [0.0, 0.0, 0.0],
            metallic: 0.0,
            roughness: 0.5,
            opacity: 1.0,
            wireframe: false,
        }
    }
}

impl MaterialDesc {
    pub fn new(shading: Shading, color: [f32; 3]) -> Self {
        Self {
            shading,
            color,
            ..Default::default()
        }
    }

    pub fn with_emissive(mut self, emissive: [f32; 3]) -> Self {
        self.emissive = emissive;
        self
    }

    pub fn with_pbr(mut self, metallic: f32, roughness: f32) -> Self {
        self.metallic = metallic.clamp(0.0, 1.0);
        self.roughness = roughness.clamp(0.0, 1.0);
        self
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity.clamp(0.0, 1.0);
        self
    }

    pub fn is_transparent(&self) -> bool {
        self.opacity < 1.0
    }
}

/// Parses a 0xRRGGBB literal into sRGB components
pub fn hex_color(hex: u32) -> [f32; 3] {
    [
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
    ]
}

/// HSL to sRGB, all inputs in [0, 1]; hue wraps
pub fn hsl_color(hue: f32, saturation: f32, lightness: f32) -> [f32; 3] {
    let h = hue.rem_euclid(1.0);
    let s = saturation.clamp(0.0, 1.0);
    let l = lightness.clamp(0.0, 1.0);

    if s == 0.0 {
        return [l, l, l];
    }

    let q = if l <= 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;

    // Hue in sixths keeps the primaries exact
    let sextant = h * 6.0;
    [
        hue_to_rgb(p, q, sextant + 2.0),
        hue_to_rgb(p, q, sextant),
        hue_to_rgb(p, q, sextant - 2.0),
    ]
}

fn hue_to_rgb(p: f32, q: f32, sextant: f32) -> f32 {
    let t = sextant.rem_euclid(6.0);
    if t < 1.0 {
        p + (q - p) * t
    } else if t < 3.0 {
        q
    } else if t < 4.0 {
        p + (q - p) * (4.0 - t)
    } else {
        p
    }
}

pub fn srgb_to_linear(c: [f32; 3]) -> [f32; 3] {
    c.map(|v| {
        if v <= 0.04045 {
            v / 12.92
        } else {
            ((v + 0.055) / 1.055).powf(2.4)
        }
    })
}

/// Per-part GPU uniform; layout must match `Surface` in `shader.wgsl`
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SurfaceUniform {
    pub model: [[f32; 4]; 4],
    /// Linear rgb + opacity
    pub color: [f32; 4],
    /// Linear rgb + shading id
    pub emissive: [f32; 4],
    /// metallic, roughness, unused, unused
    pub surface: [f32; 4],
}

impl SurfaceUniform {
    pub fn new(model: Matrix4<f32>, desc: &MaterialDesc) -> Self {
        let color = srgb_to_linear(desc.color);
        let emissive = srgb_to_linear(desc.emissive);
        Self {
            model: model.into(),
            color: [color[0], color[1], color[2], desc.opacity],
            emissive: [emissive[0], emissive[1], emissive[2], desc.shading.shader_id()],
            surface: [desc.metallic, desc.roughness, 0.0, 0.0],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_hex_color() {
        assert_eq!(hex_color(0xff4444), [1.0, 0x44 as f32 / 255.0, 0x44 as f32 / 255.0]);
        assert_eq!(hex_color(0x000000), [0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_hsl_primaries() {
        let red = hsl_color(0.0, 1.0, 0.5);
        assert_eq!(red, [1.0, 0.0, 0.0]);

        let blue = hsl_color(2.0 / 3.0, 1.0, 0.5);
        assert_relative_eq!(blue[0], 0.0, epsilon = 1e-5);
        assert_relative_eq!(blue[1], 0.0, epsilon = 1e-5);
        assert_relative_eq!(blue[2], 1.0, epsilon = 1e-5);

        let green = hsl_color(1.0 / 3.0, 1.0, 0.5);
        assert_relative_eq!(green[1], 1.0, epsilon = 1e-5);

        let yellow = hsl_color(1.0 / 6.0, 1.0, 0.5);
        assert_relative_eq!(yellow[0], 1.0, epsilon = 1e-5);
        assert_relative_eq!(yellow[1], 1.0, epsilon = 1e-5);
        assert_relative_eq!(yellow[2], 0.0, epsilon = 1e-5);

        let gray = hsl_color(0.7, 0.0, 0.4);
        assert_eq!(gray, [0.4, 0.4, 0.4]);
    }

    #[test]
    fn test_surface_uniform_carries_opacity_and_shading() {
        let desc = MaterialDesc::new(Shading::Toon, [1.0, 1.0, 1.0]).with_opacity(0.3);
        let uniform = SurfaceUniform::new(Matrix4::from_scale(1.0), &desc);
        assert_relative_eq!(uniform.color[3], 0.3);
        assert_relative_eq!(uniform.emissive[3], 5.0);
        assert!(desc.is_transparent());
    }
}
