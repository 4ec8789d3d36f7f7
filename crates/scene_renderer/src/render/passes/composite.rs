//! Fullscreen copy of the intermediate target to the output

use crate::render::device::{BufferHandle, BufferTarget, Capability, ClearFlags, GraphicsDevice, UniformValue};
use crate::render::shader::ShaderProgram;
use crate::render::targets::ColorTarget;

use super::PassStats;

/// Texture unit the colour target is bound to
pub const COLOR_TEXTURE_UNIT: u32 = 0;

/// Two triangles covering clip space
const QUAD_POSITIONS: [f32; 12] = [-1.0, -1.0, 1.0, -1.0, -1.0, 1.0, 1.0, -1.0, 1.0, 1.0, -1.0, 1.0];

/// Texture coordinates matching [`QUAD_POSITIONS`]
const QUAD_UVS: [f32; 12] = [0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0];

/// Draws a colour target to the default framebuffer
#[derive(Debug)]
pub struct Compositor {
    positions: BufferHandle,
    uvs: BufferHandle,
    clear_color: [f32; 4],
}

impl Compositor {
    /// Upload the fullscreen quad
    pub fn new(device: &mut dyn GraphicsDevice, clear_color: [f32; 4]) -> Self {
        Self {
            positions: device.create_buffer(BufferTarget::Vertex, bytemuck::cast_slice(&QUAD_POSITIONS)),
            uvs: device.create_buffer(BufferTarget::Vertex, bytemuck::cast_slice(&QUAD_UVS)),
            clear_color,
        }
    }

    /// Copy `source` to the default output of `width` x `height` pixels
    pub fn render(
        &self,
        device: &mut dyn GraphicsDevice,
        program: &ShaderProgram,
        source: &ColorTarget,
        width: u32,
        height: u32,
    ) -> PassStats {
        device.bind_framebuffer(None);
        device.viewport(width, height);
        device.clear_color(self.clear_color);
        device.clear(ClearFlags::COLOR);
        device.disable(Capability::DepthTest);

        program.bind(device);
        device.bind_texture(COLOR_TEXTURE_UNIT, Some(source.texture()));
        program.set(device, "uTex", UniformValue::Int(COLOR_TEXTURE_UNIT as i32));

        let position = program.attribute(device, "aPosition");
        let uv = program.attribute(device, "aUV");
        if let Some(location) = position {
            device.bind_vertex_attribute(location, self.positions, 2);
        }
        if let Some(location) = uv {
            device.bind_vertex_attribute(location, self.uvs, 2);
        }

        device.draw_arrays(6);

        for location in [position, uv].into_iter().flatten() {
            device.disable_vertex_attribute(location);
        }
        device.bind_texture(COLOR_TEXTURE_UNIT, None);

        PassStats {
            nodes_visited: 0,
            draw_calls: 1,
        }
    }

    /// Release the quad buffers
    pub fn destroy(&self, device: &mut dyn GraphicsDevice) {
        device.delete_buffer(self.positions);
        device.delete_buffer(self.uvs);
    }
}
