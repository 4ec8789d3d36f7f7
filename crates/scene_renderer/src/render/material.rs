//! Surface material

use crate::assets::AssetMaterial;

use super::device::{GraphicsDevice, UniformValue};
use super::shader::ShaderProgram;

/// Roughness assumed when an asset does not specify one
pub const DEFAULT_ROUGHNESS: f32 = 0.5;

/// Lowest and highest specular exponent
pub const SHININESS_RANGE: (f32, f32) = (4.0, 128.0);

/// Map a roughness factor to a Blinn-Phong exponent.
///
/// `round((1 - roughness) * 124 + 4)` clamped to `4..=128`, so 0 gives 128,
/// 0.5 gives 66 and 1 gives 4.
pub fn shininess_from_roughness(roughness: f32) -> f32 {
    let roughness = if roughness.is_finite() { roughness.clamp(0.0, 1.0) } else { DEFAULT_ROUGHNESS };
    (1.0 - roughness)
        .mul_add(124.0, 4.0)
        .round()
        .clamp(SHININESS_RANGE.0, SHININESS_RANGE.1)
}

/// Base colour and shininess bound per drawable
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    /// Linear RGB base colour, multiplied with vertex colours when present
    pub base_color: [f32; 3],
    /// Specular exponent
    pub shininess: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            base_color: [1.0, 1.0, 1.0],
            shininess: shininess_from_roughness(DEFAULT_ROUGHNESS),
        }
    }
}

impl Material {
    /// Material from asset factors; missing values use the defaults
    pub fn from_asset(material: &AssetMaterial) -> Self {
        let base_color = material
            .base_color()
            .map_or([1.0, 1.0, 1.0], |[r, g, b, _]| [r, g, b]);
        Self {
            base_color,
            shininess: shininess_from_roughness(material.roughness().unwrap_or(DEFAULT_ROUGHNESS)),
        }
    }

    /// Bind the material uniforms on the current program
    pub fn apply(&self, device: &mut dyn GraphicsDevice, program: &ShaderProgram, use_vertex_color: bool) {
        program.set(device, "uUseVertexColor", UniformValue::Int(i32::from(use_vertex_color)));
        program.set(device, "uBaseColor", UniformValue::Vec3(self.base_color));
        program.set(device, "uShininess", UniformValue::Float(self.shininess));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::PbrMetallicRoughness;

    #[test]
    fn test_roughness_mapping() {
        assert_eq!(shininess_from_roughness(0.0), 128.0);
        assert_eq!(shininess_from_roughness(0.5), 66.0);
        assert_eq!(shininess_from_roughness(1.0), 4.0);
        assert_eq!(shininess_from_roughness(0.25), 97.0);
    }

    #[test]
    fn test_roughness_mapping_is_clamped() {
        assert_eq!(shininess_from_roughness(-3.0), 128.0);
        assert_eq!(shininess_from_roughness(7.0), 4.0);
        assert_eq!(shininess_from_roughness(f32::NAN), 66.0);
        for i in 0..=100 {
            let s = shininess_from_roughness(i as f32 / 100.0);
            assert!((4.0..=128.0).contains(&s));
        }
    }

    #[test]
    fn test_default_material() {
        let material = Material::default();
        assert_eq!(material.base_color, [1.0, 1.0, 1.0]);
        assert_eq!(material.shininess, 66.0);
        assert_eq!(Material::from_asset(&AssetMaterial::default()), material);
    }

    #[test]
    fn test_from_asset_drops_alpha() {
        let material = Material::from_asset(&AssetMaterial {
            pbr: Some(PbrMetallicRoughness {
                base_color_factor: [0.2, 0.3, 0.4, 0.5],
                roughness_factor: 1.0,
            }),
            ..AssetMaterial::default()
        });
        assert_eq!(material.base_color, [0.2, 0.3, 0.4]);
        assert_eq!(material.shininess, 4.0);
    }
}
