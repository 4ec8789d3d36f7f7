//! Geometry + program + material, ready to draw

use std::rc::Rc;

use super::device::GraphicsDevice;
use super::material::Material;
use super::mesh::GeometryRecord;
use super::shader::ShaderProgram;

/// Everything one draw call needs. Owned by the resource cache and shared
/// with every scene node that references the same primitive.
#[derive(Debug)]
pub struct DrawableBinding {
    /// Uploaded geometry
    pub geometry: Rc<GeometryRecord>,
    /// Program the geometry is shaded with
    pub program: Rc<ShaderProgram>,
    /// Surface parameters
    pub material: Material,
}

impl DrawableBinding {
    /// Pair geometry with a program and material
    pub const fn new(geometry: Rc<GeometryRecord>, program: Rc<ShaderProgram>, material: Material) -> Self {
        Self {
            geometry,
            program,
            material,
        }
    }

    /// Bind the material and geometry on the drawable's program and draw.
    ///
    /// The program must already be current with its frame uniforms set.
    pub fn draw(&self, device: &mut dyn GraphicsDevice) {
        self.material.apply(device, &self.program, self.geometry.has_colors());
        self.geometry.draw_with(device, &self.program);
    }
}
