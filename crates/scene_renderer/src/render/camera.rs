//! Orbiting perspective camera

use crate::config::CameraConfig;
use crate::foundation::math::{utils, Mat4, Mat4Ext, Vec3};

/// Perspective camera circling a centre point at a fixed radius and height
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitCamera {
    center: Vec3,
    radius: f32,
    height_factor: f32,
    fov_y: f32,
    near: f32,
    far: f32,
    angular_speed: f32,
    angle: f32,
    aspect: f32,
}

impl OrbitCamera {
    /// Build from configuration; the far plane defaults to `radius * 10 + near`
    pub fn new(config: &CameraConfig) -> Self {
        Self {
            center: Vec3::from(config.center),
            radius: config.radius,
            height_factor: config.height_factor,
            fov_y: utils::deg_to_rad(config.fov_y_degrees),
            near: config.near,
            far: config.far.unwrap_or_else(|| config.radius.mul_add(10.0, config.near)),
            angular_speed: config.angular_speed,
            angle: 0.0,
            aspect: 1.0,
        }
    }

    /// Update the aspect ratio from an output size in pixels
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.aspect = (width as f32 / height.max(1) as f32).max(1e-3);
    }

    /// Advance the orbit by `dt` seconds
    pub fn advance(&mut self, dt: f32) {
        self.angle += self.angular_speed * dt;
    }

    /// Current orbit angle in radians
    pub const fn angle(&self) -> f32 {
        self.angle
    }

    /// Set the orbit angle directly
    pub fn set_angle(&mut self, angle: f32) {
        self.angle = angle;
    }

    /// Current aspect ratio
    pub const fn aspect(&self) -> f32 {
        self.aspect
    }

    /// Far clipping plane
    pub const fn far(&self) -> f32 {
        self.far
    }

    /// Eye position in world space
    pub fn eye(&self) -> Vec3 {
        self.center
            + Vec3::new(
                self.angle.sin() * self.radius,
                self.radius * self.height_factor,
                self.angle.cos() * self.radius,
            )
    }

    /// World to view transform
    pub fn view(&self) -> Mat4 {
        Mat4::look_at(self.eye(), self.center, Vec3::y())
    }

    /// View to clip transform
    pub fn projection(&self) -> Mat4 {
        Mat4::perspective(self.fov_y, self.aspect, self.near, self.far)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_orbit_geometry() {
        let camera = OrbitCamera::new(&CameraConfig::default());

        assert_relative_eq!(camera.eye(), Vec3::new(0.0, 6.0, 10.0), epsilon = 1e-5);
        assert_relative_eq!(camera.far(), 100.1, epsilon = 1e-4);
    }

    #[test]
    fn test_advance_scales_with_time() {
        let mut camera = OrbitCamera::new(&CameraConfig {
            angular_speed: 0.5,
            ..CameraConfig::default()
        });
        camera.advance(2.0);
        assert_relative_eq!(camera.angle(), 1.0);

        camera.set_angle(std::f32::consts::FRAC_PI_2);
        assert_relative_eq!(camera.eye(), Vec3::new(10.0, 6.0, 0.0), epsilon = 1e-5);
    }

    #[test]
    fn test_aspect_guards_zero_height() {
        let mut camera = OrbitCamera::new(&CameraConfig::default());
        camera.set_viewport(800, 0);
        assert_relative_eq!(camera.aspect(), 800.0);

        camera.set_viewport(0, 600);
        assert_relative_eq!(camera.aspect(), 1e-3);
    }

    #[test]
    fn test_view_looks_at_center() {
        let camera = OrbitCamera::new(&CameraConfig::default());
        let center = camera.view().transform_point(&crate::foundation::math::Point3::origin());

        assert_relative_eq!(center.x, 0.0, epsilon = 1e-5);
        assert_relative_eq!(center.y, 0.0, epsilon = 1e-5);
        assert!(center.z < 0.0);
    }
}
