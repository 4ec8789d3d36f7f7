//! Math utilities and types
//!
//! Provides the 3D math types shared by the scene graph, camera, light and
//! passes. Matrices follow the OpenGL clip-space convention (depth in -1..1).

pub use nalgebra::{
    Vector3,
    Matrix4,
    Quaternion,
    Unit,
};

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// Quaternion type for rotations
pub type Quat = Unit<Quaternion<f32>>;

/// Transform representing position, rotation, and scale
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    /// Position in 3D space
    pub position: Vec3,

    /// Rotation quaternion
    pub rotation: Quat,

    /// Scale factors
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Quat::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Transform {
    /// Build a transform from glTF-style arrays.
    ///
    /// `rotation` is `[x, y, z, w]`; it is normalized on the way in so slightly
    /// denormalized quaternions coming out of exporters stay rigid. A zero
    /// quaternion becomes the identity rotation.
    pub fn from_trs(translation: [f32; 3], rotation: [f32; 4], scale: [f32; 3]) -> Self {
        let [x, y, z, w] = rotation;
        Self {
            position: Vec3::from(translation),
            rotation: Unit::try_new(Quaternion::new(w, x, y, z), f32::EPSILON).unwrap_or_else(Quat::identity),
            scale: Vec3::from(scale),
        }
    }

    /// Convert to a transformation matrix (`T * R * S`)
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::new_translation(&self.position)
            * self.rotation.to_homogeneous()
            * Mat4::new_nonuniform_scaling(&self.scale)
    }
}

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f32 = PI / 180.0;
}

/// Math utility functions
pub mod utils {
    use super::{constants, Mat4, Vec3};

    /// Convert degrees to radians
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees * constants::DEG_TO_RAD
    }

    /// Normalize `v`, substituting `fallback` when the length is zero or not finite.
    pub fn normalize_or(v: Vec3, fallback: Vec3) -> Vec3 {
        let length = v.norm();
        if length > 0.0 && length.is_finite() {
            v / length
        } else {
            fallback
        }
    }

    /// Copy a matrix into the column-major array layout uniforms expect.
    pub fn to_column_array(m: &Mat4) -> [f32; 16] {
        let mut out = [0.0; 16];
        out.copy_from_slice(m.as_slice());
        out
    }

    /// Strip the translation column from an affine matrix.
    pub fn without_translation(m: &Mat4) -> Mat4 {
        let mut out = *m;
        out[(0, 3)] = 0.0;
        out[(1, 3)] = 0.0;
        out[(2, 3)] = 0.0;
        out
    }
}

/// Extension trait for Mat4 with additional convenience methods
pub trait Mat4Ext {
    /// Create a rotation matrix around the Y axis
    fn rotation_y(angle: f32) -> Mat4;

    /// Create a perspective projection matrix (GL clip space)
    fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4;

    /// Create an orthographic projection matrix (GL clip space)
    fn orthographic(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Mat4;

    /// Create a right-handed look-at view matrix
    fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Mat4;

    /// Build a matrix from 16 column-major floats
    fn from_column_array(values: &[f32; 16]) -> Mat4;
}

impl Mat4Ext for Mat4 {
    fn rotation_y(angle: f32) -> Mat4 {
        Mat4::from_axis_angle(&Vec3::y_axis(), angle)
    }

    fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
        Mat4::new_perspective(aspect, fov_y, near, far)
    }

    fn orthographic(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Mat4 {
        Mat4::new_orthographic(left, right, bottom, top, near, far)
    }

    fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Mat4 {
        Mat4::look_at_rh(&Point3::from(eye), &Point3::from(target), &up)
    }

    fn from_column_array(values: &[f32; 16]) -> Mat4 {
        Mat4::from_column_slice(values)
    }
}
