//! Depth-only pass from the light's point of view

use crate::config::ShadowConfig;
use crate::foundation::math::utils;
use crate::render::device::{Capability, ClearFlags, DepthFunc, Face, GraphicsDevice, UniformValue};
use crate::render::light::LightState;
use crate::render::shader::ShaderProgram;
use crate::render::targets::ShadowMap;
use crate::render::RenderResult;
use crate::scene::Scene;

use super::PassStats;

/// Renders scene depth into the shadow map
#[derive(Debug)]
pub struct ShadowPass {
    map: ShadowMap,
    bias_factor: f32,
    bias_units: f32,
}

impl ShadowPass {
    /// Create the pass and its depth target
    pub fn new(device: &mut dyn GraphicsDevice, config: &ShadowConfig) -> RenderResult<Self> {
        Ok(Self {
            map: ShadowMap::new(device, config.map_size)?,
            bias_factor: config.depth_bias_factor,
            bias_units: config.depth_bias_units,
        })
    }

    /// The depth target sampled by the geometry pass
    pub const fn shadow_map(&self) -> &ShadowMap {
        &self.map
    }

    /// Draw every node of `scene` into the shadow map with `program`
    pub fn render(
        &self,
        device: &mut dyn GraphicsDevice,
        program: &ShaderProgram,
        scene: &Scene,
        light: &LightState,
    ) -> PassStats {
        self.map.bind(device);
        device.clear(ClearFlags::DEPTH);

        device.enable(Capability::DepthTest);
        device.depth_func(DepthFunc::Less);
        device.enable(Capability::PolygonOffsetFill);
        device.polygon_offset(self.bias_factor, self.bias_units);
        device.enable(Capability::CullFace);
        device.cull_face(Face::Back);

        program.bind(device);
        program.set(device, "uLightVP", UniformValue::Mat4(utils::to_column_array(&light.view_projection)));

        let mut stats = PassStats::default();
        for (_, node) in scene.walk() {
            stats.nodes_visited += 1;
            program.set(device, "uModel", UniformValue::Mat4(utils::to_column_array(node.world())));
            for drawable in node.drawables() {
                drawable.geometry.draw_with(device, program);
                stats.draw_calls += 1;
            }
        }

        device.disable(Capability::PolygonOffsetFill);
        device.polygon_offset(0.0, 0.0);
        device.disable(Capability::CullFace);

        log::trace!("Shadow pass: {stats:?}");
        stats
    }

    /// Release the depth target
    pub fn destroy(&self, device: &mut dyn GraphicsDevice) {
        self.map.destroy(device);
    }
}
