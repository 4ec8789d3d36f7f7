//! Directional sun orbiting the scene

use crate::config::SunConfig;
use crate::foundation::math::{utils, Mat4, Mat4Ext, Vec3};

/// Per-frame light matrices
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightState {
    /// Unit direction the light travels in
    pub direction: Vec3,
    /// World to light view
    pub view: Mat4,
    /// Orthographic shadow box
    pub projection: Mat4,
    /// `projection * view`
    pub view_projection: Mat4,
}

/// Directional light whose direction rotates about the vertical axis
#[derive(Debug, Clone, PartialEq)]
pub struct SunLight {
    config: SunConfig,
    angle: f32,
}

impl SunLight {
    /// Create a sun at the configured start angle
    pub fn new(config: &SunConfig) -> Self {
        Self {
            config: config.clone(),
            angle: config.initial_angle,
        }
    }

    /// Advance the orbit by `dt` seconds
    pub fn advance(&mut self, dt: f32) {
        self.angle += self.config.angular_speed * dt;
    }

    /// Current orbit angle in radians
    pub const fn angle(&self) -> f32 {
        self.angle
    }

    /// Unit light direction for the current angle
    pub fn direction(&self) -> Vec3 {
        let raw = Vec3::new(
            self.angle.cos() * self.config.horizontal,
            self.config.elevation,
            self.angle.sin() * self.config.horizontal,
        );
        utils::normalize_or(raw, -Vec3::y())
    }

    /// Light matrices: eye opposite the direction at the standoff distance,
    /// looking at the origin, with a fixed orthographic box
    pub fn state(&self) -> LightState {
        let direction = self.direction();
        let eye = direction * -self.config.standoff;
        let up = if direction.y.abs() > 0.999 { Vec3::z() } else { Vec3::y() };

        let view = Mat4::look_at(eye, Vec3::zeros(), up);
        let e = self.config.ortho_half_extent;
        let projection = Mat4::orthographic(-e, e, -e, e, self.config.near, self.config.far);

        LightState {
            direction,
            view,
            projection,
            view_projection: projection * view,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Point3;
    use approx::assert_relative_eq;

    #[test]
    fn test_direction_is_unit_and_points_down() {
        let mut sun = SunLight::new(&SunConfig::default());
        for _ in 0..8 {
            let d = sun.direction();
            assert_relative_eq!(d.norm(), 1.0, epsilon = 1e-6);
            assert!(d.y < 0.0);
            sun.advance(100.0);
        }
    }

    #[test]
    fn test_initial_direction() {
        let sun = SunLight::new(&SunConfig::default());
        assert_relative_eq!(sun.direction(), Vec3::new(0.6, -0.5, 0.0).normalize(), epsilon = 1e-6);
    }

    #[test]
    fn test_origin_projects_to_box_center() {
        let state = SunLight::new(&SunConfig::default()).state();
        let clip = state.view_projection.transform_point(&Point3::origin());

        assert_relative_eq!(clip.x, 0.0, epsilon = 1e-5);
        assert_relative_eq!(clip.y, 0.0, epsilon = 1e-5);
        assert!(clip.z > -1.0 && clip.z < 1.0);
        assert_eq!(state.view_projection, state.projection * state.view);
    }

    #[test]
    fn test_vertical_light_has_valid_view() {
        let sun = SunLight::new(&SunConfig {
            horizontal: 0.0,
            ..SunConfig::default()
        });
        let state = sun.state();
        assert!(state.view.iter().all(|v| v.is_finite()));
    }
}
