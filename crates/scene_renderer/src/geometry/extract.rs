//! Primitive to renderer-ready vertex streams

use crate::assets::{AssetError, AssetPrimitive, AssetResult, ColorAttribute, IndexData, PrimitiveId, Topology};

use super::normals;

/// Vertex streams ready for upload: one normal per position and RGB colours
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedGeometry {
    /// Vertex positions
    pub positions: Vec<[f32; 3]>,
    /// Vertex normals, supplied or synthesized
    pub normals: Vec<[f32; 3]>,
    /// RGB vertex colours in `0..=1`
    pub colors: Option<Vec<[f32; 3]>>,
    /// Triangle-list indices at their source width
    pub indices: Option<IndexData>,
}

impl ExtractedGeometry {
    /// Number of vertices
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Elements a draw call covers: index count when indexed, vertex count otherwise
    pub fn draw_count(&self) -> usize {
        self.indices
            .as_ref()
            .map_or(self.positions.len(), IndexData::len)
    }
}

/// Convert one asset primitive into [`ExtractedGeometry`].
///
/// Positions are required. Missing normals are synthesized: smooth when the
/// primitive is indexed, flat otherwise. Colours lose their alpha channel and
/// integer encodings are scaled into `0..=1`.
pub fn extract_primitive(primitive: &AssetPrimitive, id: PrimitiveId) -> AssetResult<ExtractedGeometry> {
    if let Topology::Other(mode) = primitive.topology {
        return Err(AssetError::UnsupportedTopology(mode.to_string()));
    }

    let positions = primitive
        .positions
        .as_ref()
        .ok_or(AssetError::MissingPositions {
            mesh: id.mesh,
            primitive: id.primitive,
        })?
        .clone();
    let vertex_count = positions.len();

    let indices = primitive.indices.clone();
    let widened: Option<Vec<u32>> = indices.as_ref().map(|i| i.iter().collect());
    if let Some(index) = widened.iter().flatten().find(|&&i| i as usize >= vertex_count) {
        return Err(AssetError::IndexOutOfRange {
            index: *index,
            vertex_count,
        });
    }

    let normals = match &primitive.normals {
        Some(normals) => {
            check_length("NORMAL", vertex_count, normals.len())?;
            normals.clone()
        }
        None => match &widened {
            Some(indices) => normals::smooth_normals(&positions, indices),
            None => normals::flat_normals(&positions),
        },
    };

    let colors = primitive
        .colors
        .as_ref()
        .map(|colors| reduce_colors(colors, vertex_count))
        .transpose()?;

    log::trace!(
        "Extracted primitive {}/{}: {} vertices, {} indices, normals {}",
        id.mesh,
        id.primitive,
        vertex_count,
        indices.as_ref().map_or(0, IndexData::len),
        if primitive.normals.is_some() { "supplied" } else { "synthesized" }
    );

    Ok(ExtractedGeometry {
        positions,
        normals,
        colors,
        indices,
    })
}

fn check_length(attribute: &'static str, expected: usize, actual: usize) -> AssetResult<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(AssetError::AttributeLength {
            attribute,
            expected,
            actual,
        })
    }
}

/// Normalize colour values and drop the alpha channel
fn reduce_colors(colors: &ColorAttribute, vertex_count: usize) -> AssetResult<Vec<[f32; 3]>> {
    let stride = colors.components;
    if stride != 3 && stride != 4 {
        return Err(AssetError::UnsupportedColorComponents(stride));
    }
    check_length("COLOR_0", vertex_count, colors.vertex_count())?;

    Ok((0..vertex_count)
        .map(|v| {
            let base = v * stride;
            [
                colors.values.normalized(base),
                colors.values.normalized(base + 1),
                colors.values.normalized(base + 2),
            ]
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::ColorValues;
    use approx::assert_relative_eq;

    const ID: PrimitiveId = PrimitiveId::new(0, 0);

    fn quad() -> AssetPrimitive {
        AssetPrimitive {
            positions: Some(vec![
                [0.0, 0.0, 0.0],
                [1.0, 0.0, 0.0],
                [0.0, 1.0, 0.0],
                [1.0, 1.0, 0.0],
            ]),
            indices: Some(IndexData::U8(vec![0, 1, 2, 2, 1, 3])),
            ..AssetPrimitive::default()
        }
    }

    #[test]
    fn test_missing_positions_is_an_error() {
        let primitive = AssetPrimitive::default();
        assert_eq!(
            extract_primitive(&primitive, PrimitiveId::new(3, 1)),
            Err(AssetError::MissingPositions { mesh: 3, primitive: 1 })
        );
    }

    #[test]
    fn test_indexed_quad_draws_index_count() {
        let geometry = extract_primitive(&quad(), ID).unwrap();

        assert_eq!(geometry.vertex_count(), 4);
        assert_eq!(geometry.draw_count(), 6);
        assert_eq!(geometry.normals.len(), 4);
        for n in &geometry.normals {
            assert_relative_eq!(n[2], 1.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_non_indexed_draws_vertex_count() {
        let mut primitive = quad();
        primitive.indices = None;
        primitive.positions.as_mut().unwrap().truncate(3);

        let geometry = extract_primitive(&primitive, ID).unwrap();
        assert_eq!(geometry.draw_count(), 3);
    }

    #[test]
    fn test_extraction_is_repeatable() {
        let primitive = quad();
        assert_eq!(extract_primitive(&primitive, ID), extract_primitive(&primitive, ID));
    }

    #[test]
    fn test_supplied_normals_are_kept() {
        let mut primitive = quad();
        primitive.normals = Some(vec![[1.0, 0.0, 0.0]; 4]);

        let geometry = extract_primitive(&primitive, ID).unwrap();
        assert_eq!(geometry.normals, vec![[1.0, 0.0, 0.0]; 4]);
    }

    #[test]
    fn test_rgba_reduces_to_rgb() {
        let mut primitive = quad();
        primitive.colors = Some(ColorAttribute::rgba(&[[0.2, 0.4, 0.6, 0.1]; 4]));

        let colors = extract_primitive(&primitive, ID).unwrap().colors.unwrap();
        assert_eq!(colors, vec![[0.2, 0.4, 0.6]; 4]);
    }

    #[test]
    fn test_alpha_does_not_affect_rgb() {
        let mut opaque = quad();
        opaque.colors = Some(ColorAttribute::rgba(&[[0.2, 0.4, 0.6, 1.0]; 4]));
        let mut clear = quad();
        clear.colors = Some(ColorAttribute::rgba(&[[0.2, 0.4, 0.6, 0.0]; 4]));

        assert_eq!(
            extract_primitive(&opaque, ID).unwrap().colors,
            extract_primitive(&clear, ID).unwrap().colors
        );
    }

    #[test]
    fn test_integer_colors_are_normalized_before_alpha_drop() {
        let mut primitive = quad();
        primitive.colors = Some(ColorAttribute {
            components: 4,
            values: ColorValues::Unorm16([65535, 0, 65535, 1].repeat(4)),
        });

        let colors = extract_primitive(&primitive, ID).unwrap().colors.unwrap();
        assert_eq!(colors, vec![[1.0, 0.0, 1.0]; 4]);

        primitive.colors = Some(ColorAttribute {
            components: 3,
            values: ColorValues::Unorm8([255, 51, 0].repeat(4)),
        });
        let colors = extract_primitive(&primitive, ID).unwrap().colors.unwrap();
        assert_relative_eq!(colors[0][1], 0.2, epsilon = 1e-6);
    }

    #[test]
    fn test_out_of_range_index_is_rejected() {
        let mut primitive = quad();
        primitive.indices = Some(IndexData::U32(vec![0, 1, 9]));

        assert_eq!(
            extract_primitive(&primitive, ID),
            Err(AssetError::IndexOutOfRange { index: 9, vertex_count: 4 })
        );
    }

    #[test]
    fn test_mismatched_attribute_length_is_rejected() {
        let mut primitive = quad();
        primitive.normals = Some(vec![[0.0, 0.0, 1.0]; 2]);

        assert!(matches!(
            extract_primitive(&primitive, ID),
            Err(AssetError::AttributeLength { attribute: "NORMAL", .. })
        ));
    }

    #[test]
    fn test_two_component_colors_are_rejected() {
        let mut primitive = quad();
        primitive.colors = Some(ColorAttribute {
            components: 2,
            values: ColorValues::Float(vec![0.0; 8]),
        });

        assert_eq!(
            extract_primitive(&primitive, ID),
            Err(AssetError::UnsupportedColorComponents(2))
        );
    }

    #[test]
    fn test_non_triangle_topology_is_rejected() {
        let mut primitive = quad();
        primitive.topology = Topology::Other("LINES");

        assert!(matches!(extract_primitive(&primitive, ID), Err(AssetError::UnsupportedTopology(_))));
    }
}
