//! GPU-resident geometry

use crate::geometry::ExtractedGeometry;
use crate::assets::IndexData;

use super::device::{BufferHandle, BufferTarget, GraphicsDevice, IndexType};
use super::shader::ShaderProgram;

/// Vertex attribute names shared by every mesh program
pub mod attributes {
    /// Object-space position, `vec3`
    pub const POSITION: &str = "aPosition";
    /// Object-space normal, `vec3`
    pub const NORMAL: &str = "aNormal";
    /// RGB vertex colour, `vec3`
    pub const COLOR: &str = "aColor";
}

/// Uploaded vertex and index buffers of one primitive.
///
/// `draw_count` is the index count for indexed geometry and the vertex count
/// otherwise; draw calls use it directly.
#[derive(Debug, PartialEq, Eq)]
pub struct GeometryRecord {
    positions: BufferHandle,
    normals: BufferHandle,
    colors: Option<BufferHandle>,
    indices: Option<(BufferHandle, IndexType)>,
    draw_count: u32,
}

impl GeometryRecord {
    /// Upload extracted geometry
    pub fn upload(device: &mut dyn GraphicsDevice, geometry: &ExtractedGeometry) -> Self {
        let positions = device.create_buffer(BufferTarget::Vertex, bytemuck::cast_slice(&geometry.positions));
        let normals = device.create_buffer(BufferTarget::Vertex, bytemuck::cast_slice(&geometry.normals));
        let colors = geometry
            .colors
            .as_ref()
            .map(|colors| device.create_buffer(BufferTarget::Vertex, bytemuck::cast_slice(colors)));

        let indices = geometry.indices.as_ref().map(|indices| {
            let bytes: &[u8] = match indices {
                IndexData::U8(v) => v.as_slice(),
                IndexData::U16(v) => bytemuck::cast_slice(v),
                IndexData::U32(v) => bytemuck::cast_slice(v),
            };
            (device.create_buffer(BufferTarget::Index, bytes), IndexType::of(indices))
        });

        let draw_count = u32::try_from(geometry.draw_count()).unwrap_or(u32::MAX);
        log::debug!(
            "Uploaded geometry: {} vertices, draw count {draw_count}, indexed {}",
            geometry.vertex_count(),
            indices.is_some()
        );

        Self {
            positions,
            normals,
            colors,
            indices,
            draw_count,
        }
    }

    /// Elements covered by a draw call
    pub const fn draw_count(&self) -> u32 {
        self.draw_count
    }

    /// Whether the geometry carries vertex colours
    pub const fn has_colors(&self) -> bool {
        self.colors.is_some()
    }

    /// Index width, `None` for non-indexed geometry
    pub fn index_type(&self) -> Option<IndexType> {
        self.indices.map(|(_, index_type)| index_type)
    }

    /// Every buffer this record owns
    pub fn buffers(&self) -> Vec<BufferHandle> {
        let mut buffers = vec![self.positions, self.normals];
        buffers.extend(self.colors);
        buffers.extend(self.indices.map(|(buffer, _)| buffer));
        buffers
    }

    /// Source the attributes `program` reads from this geometry's buffers
    pub fn bind(&self, device: &mut dyn GraphicsDevice, program: &ShaderProgram) {
        let streams = [
            (attributes::POSITION, Some(self.positions)),
            (attributes::NORMAL, Some(self.normals)),
            (attributes::COLOR, self.colors),
        ];
        for (name, buffer) in streams {
            match (program.attribute(device, name), buffer) {
                (Some(location), Some(buffer)) => device.bind_vertex_attribute(location, buffer, 3),
                (Some(location), None) => device.disable_vertex_attribute(location),
                (None, _) => {}
            }
        }
        device.bind_index_buffer(self.indices.map(|(buffer, _)| buffer));
    }

    /// Detach the attributes bound by [`bind`](Self::bind)
    pub fn unbind(&self, device: &mut dyn GraphicsDevice, program: &ShaderProgram) {
        for name in [attributes::POSITION, attributes::NORMAL, attributes::COLOR] {
            if let Some(location) = program.attribute(device, name) {
                device.disable_vertex_attribute(location);
            }
        }
        if self.indices.is_some() {
            device.bind_index_buffer(None);
        }
    }

    /// Submit the draw call: indexed when an index buffer exists
    pub fn draw(&self, device: &mut dyn GraphicsDevice) {
        match self.indices {
            Some((_, index_type)) => device.draw_elements(self.draw_count, index_type),
            None => device.draw_arrays(self.draw_count),
        }
    }

    /// Bind, draw and unbind with `program`
    pub fn draw_with(&self, device: &mut dyn GraphicsDevice, program: &ShaderProgram) {
        self.bind(device, program);
        self.draw(device);
        self.unbind(device, program);
    }

    /// Release every buffer
    pub fn destroy(&self, device: &mut dyn GraphicsDevice) {
        for buffer in self.buffers() {
            device.delete_buffer(buffer);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::recording::{DeviceCommand, RecordingDevice};
    use crate::render::shader::{ShaderLibrary, ShaderSources};

    fn triangle(indices: Option<IndexData>) -> ExtractedGeometry {
        ExtractedGeometry {
            positions: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            normals: vec![[0.0, 0.0, 1.0]; 3],
            colors: None,
            indices,
        }
    }

    #[test]
    fn test_upload_keeps_bytes_and_index_width() {
        let mut device = RecordingDevice::new();
        let record = GeometryRecord::upload(&mut device, &triangle(Some(IndexData::U16(vec![0, 1, 2]))));

        assert_eq!(record.draw_count(), 3);
        assert_eq!(record.index_type(), Some(IndexType::U16));
        assert_eq!(record.buffers().len(), 3);

        let positions = device.buffer_contents(record.buffers()[0]).unwrap();
        assert_eq!(positions.len(), 9 * 4);
        let indices = device.buffer_contents(record.buffers()[2]).unwrap();
        assert_eq!(indices, &[0, 0, 1, 0, 2, 0]);
    }

    #[test]
    fn test_indexed_and_plain_draws() {
        let mut device = RecordingDevice::new();
        let indexed = GeometryRecord::upload(&mut device, &triangle(Some(IndexData::U8(vec![0, 1, 2]))));
        let plain = GeometryRecord::upload(&mut device, &triangle(None));

        indexed.draw(&mut device);
        plain.draw(&mut device);

        let draws: Vec<_> = device.draws().cloned().collect();
        assert!(matches!(
            draws[0],
            DeviceCommand::DrawElements { count: 3, index_type: IndexType::U8, .. }
        ));
        assert!(matches!(draws[1], DeviceCommand::DrawArrays { count: 3, .. }));
    }

    #[test]
    fn test_bind_skips_attributes_the_program_lacks() {
        let mut device = RecordingDevice::new();
        let library = ShaderLibrary::new(&mut device, &ShaderSources::default()).unwrap();
        let record = GeometryRecord::upload(&mut device, &triangle(None));
        device.take_commands();

        library.shadow.bind(&mut device);
        record.bind(&mut device, &library.shadow);

        let bound: Vec<String> = device
            .commands()
            .iter()
            .filter_map(|c| match c {
                DeviceCommand::BindAttribute { name, .. } => Some(name.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(bound, vec!["aPosition".to_string()]);
    }

    #[test]
    fn test_destroy_releases_all_buffers() {
        let mut device = RecordingDevice::new();
        let record = GeometryRecord::upload(&mut device, &triangle(Some(IndexData::U32(vec![0, 1, 2]))));
        assert_eq!(device.live_buffer_count(), 3);

        record.destroy(&mut device);
        assert_eq!(device.live_buffer_count(), 0);
    }
}
