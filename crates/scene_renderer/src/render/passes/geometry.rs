//! Shaded colour pass into the intermediate target

use crate::config::LightingConfig;
use crate::foundation::math::{utils, Mat4, Vec3};
use crate::render::camera::OrbitCamera;
use crate::render::device::{Capability, ClearFlags, DepthFunc, Face, GraphicsDevice, UniformValue};
use crate::render::light::LightState;
use crate::render::shader::ShaderProgram;
use crate::render::targets::{ColorTarget, ShadowMap};
use crate::render::RenderResult;
use crate::scene::Scene;

use super::PassStats;

/// Texture unit the shadow map is bound to
pub const SHADOW_TEXTURE_UNIT: u32 = 1;

/// Camera matrices for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameView {
    /// World to view
    pub view: Mat4,
    /// View to clip
    pub projection: Mat4,
    /// Eye position in world space
    pub eye: Vec3,
}

impl FrameView {
    /// Snapshot a camera
    pub fn from_camera(camera: &OrbitCamera) -> Self {
        Self {
            view: camera.view(),
            projection: camera.projection(),
            eye: camera.eye(),
        }
    }
}

/// Renders lit, shadowed geometry into a colour + depth target
#[derive(Debug)]
pub struct GeometryPass {
    target: ColorTarget,
    clear_color: [f32; 4],
}

impl GeometryPass {
    /// Create the pass with a target of the given size
    pub fn new(device: &mut dyn GraphicsDevice, width: u32, height: u32, clear_color: [f32; 4]) -> RenderResult<Self> {
        Ok(Self {
            target: ColorTarget::new(device, width, height)?,
            clear_color,
        })
    }

    /// The colour target read by the compositor
    pub const fn target(&self) -> &ColorTarget {
        &self.target
    }

    /// Match the target to the output size; returns whether it changed
    pub fn resize(&mut self, device: &mut dyn GraphicsDevice, width: u32, height: u32) -> RenderResult<bool> {
        self.target.resize(device, width, height)
    }

    /// Draw every node of `scene` with frame-constant lighting and shadows
    pub fn render(
        &self,
        device: &mut dyn GraphicsDevice,
        program: &ShaderProgram,
        scene: &Scene,
        view: &FrameView,
        light: &LightState,
        shadow: &ShadowMap,
        lighting: &LightingConfig,
    ) -> PassStats {
        self.target.bind(device);
        device.clear_color(self.clear_color);
        device.clear(ClearFlags::COLOR | ClearFlags::DEPTH);
        device.enable(Capability::DepthTest);
        device.depth_func(DepthFunc::Less);
        device.enable(Capability::CullFace);
        device.cull_face(Face::Back);

        program.bind(device);
        program.set(device, "uProjection", UniformValue::Mat4(utils::to_column_array(&view.projection)));
        program.set(device, "uLightDir", UniformValue::Vec3(light.direction.into()));
        program.set(device, "uViewPos", UniformValue::Vec3(view.eye.into()));
        program.set(device, "uShininess", UniformValue::Float(lighting.default_shininess));
        program.set(device, "uLightVP", UniformValue::Mat4(utils::to_column_array(&light.view_projection)));

        device.bind_texture(SHADOW_TEXTURE_UNIT, Some(shadow.texture()));
        program.set(device, "uShadowMap", UniformValue::Int(SHADOW_TEXTURE_UNIT as i32));
        program.set(device, "uShadowTexelSize", UniformValue::Vec2(shadow.texel_size()));

        program.set(device, "uAmbientStrength", UniformValue::Float(lighting.ambient_strength));
        program.set(device, "uSpecularStrength", UniformValue::Float(lighting.specular_strength));
        program.set(device, "uSkyColor", UniformValue::Vec3(lighting.sky_color));
        program.set(device, "uGroundColor", UniformValue::Vec3(lighting.ground_color));
        program.set(device, "uLightSizeUV", UniformValue::Float(lighting.light_size_texels));
        program.set(device, "uPenumbraScale", UniformValue::Float(lighting.penumbra_scale));
        program.set(device, "uMaxShadowLighten", UniformValue::Float(lighting.max_shadow_lighten));

        let mut stats = PassStats::default();
        for (_, node) in scene.walk() {
            stats.nodes_visited += 1;
            let model_view = view.view * node.world();
            program.set(device, "uModelView", UniformValue::Mat4(utils::to_column_array(&model_view)));
            program.set(device, "uModel", UniformValue::Mat4(utils::to_column_array(node.world())));

            for drawable in node.drawables() {
                if drawable.program.handle() != program.handle() {
                    log::warn!(
                        "Drawable uses program '{}' instead of '{}'; frame uniforms are not bound for it",
                        drawable.program.label(),
                        program.label()
                    );
                    drawable.program.bind(device);
                    drawable.draw(device);
                    program.bind(device);
                } else {
                    drawable.draw(device);
                }
                stats.draw_calls += 1;
            }
        }

        device.bind_texture(SHADOW_TEXTURE_UNIT, None);
        log::trace!("Geometry pass: {stats:?}");
        stats
    }

    /// Release the colour target
    pub fn destroy(&self, device: &mut dyn GraphicsDevice) {
        self.target.destroy(device);
    }
}
