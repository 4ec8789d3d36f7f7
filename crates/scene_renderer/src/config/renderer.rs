//! # Renderer Configuration
//!
//! Every tunable of the frame pipeline lives here: output fallback size,
//! shadow-map resolution and depth bias, lighting constants fed to the lit
//! shader, the orbiting sun and camera, and the procedural node orbits.
//!
//! All structs are `#[serde(default)]`, so a config file only needs to name
//! the values it changes.

use serde::{Serialize, Deserialize};

/// # Shader Configuration
///
/// The three shader programs ship embedded in the crate. Pointing `directory`
/// at a folder containing `lit.vert`, `lit.frag`, `shadow.vert`,
/// `shadow.frag`, `composite.vert` and `composite.frag` replaces them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShaderConfig {
    /// Directory with GLSL overrides, `None` to use the embedded sources
    pub directory: Option<String>,
}

impl ShaderConfig {
    /// Load shader sources from a directory instead of the embedded set
    pub fn from_directory(directory: impl Into<String>) -> Self {
        Self {
            directory: Some(directory.into()),
        }
    }
}

/// Shadow pass settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShadowConfig {
    /// Edge length of the square depth target in texels
    pub map_size: u32,
    /// Slope-scaled polygon offset factor
    pub depth_bias_factor: f32,
    /// Constant polygon offset units
    pub depth_bias_units: f32,
}

impl Default for ShadowConfig {
    fn default() -> Self {
        Self {
            map_size: 4096,
            depth_bias_factor: 0.8,
            depth_bias_units: 1.0,
        }
    }
}

/// Frame-constant lighting values bound to the lit shader
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightingConfig {
    /// Hemisphere ambient contribution
    pub ambient_strength: f32,
    /// Specular highlight strength
    pub specular_strength: f32,
    /// Shininess bound once per frame before materials override it
    pub default_shininess: f32,
    /// Hemisphere colour facing up
    pub sky_color: [f32; 3],
    /// Hemisphere colour facing down
    pub ground_color: [f32; 3],
    /// Angular size of the sun in shadow-map texels; larger means softer shadows
    pub light_size_texels: f32,
    /// Scale applied to the penumbra estimate
    pub penumbra_scale: f32,
    /// Upper bound on how much very soft shadows are lightened
    pub max_shadow_lighten: f32,
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            ambient_strength: 0.35,
            specular_strength: 0.25,
            default_shininess: 32.0,
            sky_color: [0.6, 0.7, 0.9],
            ground_color: [0.3, 0.28, 0.25],
            light_size_texels: 2.0,
            penumbra_scale: 100.0,
            max_shadow_lighten: 0.35,
        }
    }
}

/// Directional light orbiting the scene origin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SunConfig {
    /// Y component of the unnormalized direction (negative points down)
    pub elevation: f32,
    /// Length of the horizontal component of the unnormalized direction
    pub horizontal: f32,
    /// Distance of the light eye from the origin
    pub standoff: f32,
    /// Half extent of the orthographic shadow box
    pub ortho_half_extent: f32,
    /// Near plane of the shadow projection
    pub near: f32,
    /// Far plane of the shadow projection
    pub far: f32,
    /// Orbit speed in radians per second
    pub angular_speed: f32,
    /// Orbit angle at startup in radians
    pub initial_angle: f32,
}

impl Default for SunConfig {
    fn default() -> Self {
        Self {
            elevation: -0.5,
            horizontal: 0.6,
            standoff: 50.0,
            ortho_half_extent: 30.0,
            near: 1.0,
            far: 120.0,
            angular_speed: 0.0072,
            initial_angle: 0.0,
        }
    }
}

/// Orbiting perspective camera
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Point the camera orbits and looks at
    pub center: [f32; 3],
    /// Horizontal orbit radius
    pub radius: f32,
    /// Eye height as a fraction of the radius
    pub height_factor: f32,
    /// Vertical field of view in degrees
    pub fov_y_degrees: f32,
    /// Near clipping plane
    pub near: f32,
    /// Far clipping plane, `radius * 10 + near` when absent
    pub far: Option<f32>,
    /// Orbit speed in radians per second
    pub angular_speed: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            center: [0.0, 0.0, 0.0],
            radius: 10.0,
            height_factor: 0.6,
            fov_y_degrees: 60.0,
            near: 0.1,
            far: None,
            angular_speed: 0.0144,
        }
    }
}

/// A named scene node circling the vertical axis through the origin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbitConfig {
    /// Exact node name to animate
    pub node: String,
    /// Orbit speed in radians per second
    pub angular_speed: f32,
    /// Radius used when the node starts on the axis
    pub fallback_radius: f32,
    /// Added to the start angle derived from the node position
    pub phase_offset: f32,
}

impl Default for OrbitConfig {
    fn default() -> Self {
        Self {
            node: String::new(),
            angular_speed: 0.036,
            fallback_radius: 8.0,
            phase_offset: 0.0,
        }
    }
}

/// # Renderer Configuration
///
/// Top-level configuration consumed by the frame orchestrator and passes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// Output size used when the surface reports a zero dimension
    pub fallback_size: (u32, u32),
    /// Clear colour of the visible framebuffer
    pub clear_color: [f32; 4],
    /// Shadow pass settings
    pub shadow: ShadowConfig,
    /// Lit shader constants
    pub lighting: LightingConfig,
    /// Sun orbit and shadow box
    pub sun: SunConfig,
    /// Camera orbit and projection
    pub camera: CameraConfig,
    /// Procedurally animated nodes
    pub orbits: Vec<OrbitConfig>,
    /// Shader source overrides
    pub shaders: ShaderConfig,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            fallback_size: (800, 600),
            clear_color: [0.1, 0.5, 0.6, 1.0],
            shadow: ShadowConfig::default(),
            lighting: LightingConfig::default(),
            sun: SunConfig::default(),
            camera: CameraConfig::default(),
            orbits: Vec::new(),
            shaders: ShaderConfig::default(),
        }
    }
}

impl RendererConfig {
    /// Add a procedural orbit for a named node
    pub fn with_orbit(mut self, orbit: OrbitConfig) -> Self {
        self.orbits.push(orbit);
        self
    }

    /// Set the shadow map resolution
    pub fn with_shadow_map_size(mut self, size: u32) -> Self {
        self.shadow.map_size = size.max(1);
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.shadow.map_size == 0 {
            return Err("Shadow map size must be at least 1".to_string());
        }
        if self.fallback_size.0 == 0 || self.fallback_size.1 == 0 {
            return Err("Fallback output size must be non-zero".to_string());
        }
        if self.sun.near <= 0.0 || self.sun.far <= self.sun.near {
            return Err("Sun near/far planes must satisfy 0 < near < far".to_string());
        }
        if self.camera.near <= 0.0 {
            return Err("Camera near plane must be positive".to_string());
        }
        if let Some(orbit) = self.orbits.iter().find(|o| o.node.is_empty()) {
            return Err(format!("Orbit entry is missing a node name: {orbit:?}"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(RendererConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let text = r#"
            clear_color = [0.0, 0.0, 0.0, 1.0]

            [shadow]
            map_size = 1024

            [[orbits]]
            node = "cloud_1"
            angular_speed = 0.5
        "#;
        let config: RendererConfig = toml::from_str(text).unwrap();

        assert_eq!(config.shadow.map_size, 1024);
        assert_eq!(config.shadow.depth_bias_factor, 0.8);
        assert_eq!(config.lighting, LightingConfig::default());
        assert_eq!(config.orbits.len(), 1);
        assert_eq!(config.orbits[0].fallback_radius, 8.0);
        assert_eq!(config.clear_color, [0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_ron_roundtrip() {
        let config = RendererConfig::default().with_orbit(OrbitConfig {
            node: "cloud_2".to_string(),
            ..OrbitConfig::default()
        });
        let text = ron::to_string(&config).unwrap();
        let parsed: RendererConfig = ron::from_str(&text).unwrap();

        assert_eq!(parsed, config);
    }

    #[test]
    fn test_validate_rejects_unnamed_orbit() {
        let config = RendererConfig::default().with_orbit(OrbitConfig::default());
        assert!(config.validate().is_err());
    }
}
