//! Procedural node animation

use crate::config::OrbitConfig;
use crate::foundation::math::{utils, Mat4, Vec3};
use crate::scene::{NodeId, Scene, SceneError, SceneGraph, SceneResult};

/// Moves a named node around the vertical axis through the origin.
///
/// The node keeps its starting orientation and height; only its horizontal
/// position follows the orbit.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeOrbit {
    node: NodeId,
    basis: Mat4,
    height: f32,
    radius: f32,
    angle: f32,
    angular_speed: f32,
}

impl NodeOrbit {
    /// Derive the orbit from the node's current local transform.
    ///
    /// Radius and start angle come from the local x/z translation; a node on
    /// the axis uses the configured fallback radius.
    pub fn new(scene: &Scene, config: &OrbitConfig) -> SceneResult<Self> {
        let node = scene.find(&config.node)?;
        let local = *scene.graph.node(node).ok_or(SceneError::UnknownNode(node))?.local();

        let (x, y, z) = (local[(0, 3)], local[(1, 3)], local[(2, 3)]);
        let distance = x.hypot(z);
        let radius = if distance > 0.0 { distance } else { config.fallback_radius };

        log::debug!("Orbit for '{}': radius {radius}, height {y}", config.node);
        Ok(Self {
            node,
            basis: utils::without_translation(&local),
            height: y,
            radius,
            angle: z.atan2(x) + config.phase_offset,
            angular_speed: config.angular_speed,
        })
    }

    /// Animated node
    pub const fn node(&self) -> NodeId {
        self.node
    }

    /// Current angle in radians
    pub const fn angle(&self) -> f32 {
        self.angle
    }

    /// Orbit radius
    pub const fn radius(&self) -> f32 {
        self.radius
    }

    /// Local transform at `angle`
    pub fn local_at(&self, angle: f32) -> Mat4 {
        let position = Vec3::new(angle.cos() * self.radius, self.height, angle.sin() * self.radius);
        Mat4::new_translation(&position) * self.basis
    }

    /// Advance by `dt` seconds and write the new local transform
    pub fn advance(&mut self, graph: &mut SceneGraph, dt: f32) -> SceneResult<()> {
        self.angle += self.angular_speed * dt;
        graph.set_local(self.node, self.local_at(self.angle))
    }
}
