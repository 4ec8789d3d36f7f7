//! glTF 2.0 importer
//!
//! Reads `.gltf`/`.glb` files through the `gltf` crate and converts the
//! document into a [`SceneAsset`]. Only what the renderer consumes is kept:
//! node hierarchy and transforms, positions, normals, the first colour set,
//! indices and the base-colour/roughness factors.

use std::path::Path;

use gltf::mesh::util::{ReadColors, ReadIndices};
use gltf::mesh::Mode;

use super::{
    AssetError, AssetMaterial, AssetMesh, AssetNode, AssetPrimitive, AssetResult, AssetScene,
    ColorAttribute, ColorValues, IndexData, NodeTransform, PbrMetallicRoughness, SceneAsset,
    Topology,
};

/// Load a glTF or GLB file from disk, resolving external buffers relative to it
pub fn load_gltf(path: impl AsRef<Path>) -> AssetResult<SceneAsset> {
    let path = path.as_ref();
    log::info!("Loading glTF asset {}", path.display());

    let (document, buffers, _images) =
        gltf::import(path).map_err(|e| AssetError::Import(format!("{}: {e}", path.display())))?;
    convert(&document, &buffers)
}

/// Load a glTF or GLB document held in memory; buffers must be embedded
pub fn load_gltf_slice(bytes: &[u8]) -> AssetResult<SceneAsset> {
    let (document, buffers, _images) =
        gltf::import_slice(bytes).map_err(|e| AssetError::Import(e.to_string()))?;
    convert(&document, &buffers)
}

fn convert(document: &gltf::Document, buffers: &[gltf::buffer::Data]) -> AssetResult<SceneAsset> {
    let meshes = document
        .meshes()
        .map(|mesh| convert_mesh(&mesh, buffers))
        .collect::<AssetResult<Vec<_>>>()?;

    let materials = document.materials().map(|m| convert_material(&m)).collect();

    let scenes: Vec<AssetScene> = document
        .scenes()
        .map(|scene| AssetScene {
            name: scene.name().map(str::to_owned),
            roots: scene.nodes().map(|node| convert_node(&node)).collect(),
        })
        .collect();

    if scenes.is_empty() {
        return Err(AssetError::NoScene);
    }

    let asset = SceneAsset {
        meshes,
        materials,
        scenes,
        default_scene: document.default_scene().map(|s| s.index()),
    };

    log::info!(
        "glTF asset: {} meshes, {} materials, {} scenes",
        asset.meshes.len(),
        asset.materials.len(),
        asset.scenes.len()
    );
    Ok(asset)
}

fn convert_node(node: &gltf::Node) -> AssetNode {
    let transform = match node.transform() {
        gltf::scene::Transform::Matrix { matrix } => {
            let mut values = [0.0; 16];
            for (column, chunk) in matrix.iter().zip(values.chunks_exact_mut(4)) {
                chunk.copy_from_slice(column);
            }
            NodeTransform::Matrix(values)
        }
        gltf::scene::Transform::Decomposed {
            translation,
            rotation,
            scale,
        } => NodeTransform::Decomposed {
            translation,
            rotation,
            scale,
        },
    };

    AssetNode {
        name: node.name().map(str::to_owned),
        transform,
        mesh: node.mesh().map(|m| m.index()),
        children: node.children().map(|child| convert_node(&child)).collect(),
    }
}

fn convert_mesh(mesh: &gltf::Mesh, buffers: &[gltf::buffer::Data]) -> AssetResult<AssetMesh> {
    let primitives = mesh
        .primitives()
        .map(|primitive| {
            let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));

            let colors = reader.read_colors(0).map(|colors| match colors {
                ReadColors::RgbU8(iter) => ColorAttribute {
                    components: 3,
                    values: ColorValues::Unorm8(iter.flatten().collect()),
                },
                ReadColors::RgbU16(iter) => ColorAttribute {
                    components: 3,
                    values: ColorValues::Unorm16(iter.flatten().collect()),
                },
                ReadColors::RgbF32(iter) => ColorAttribute {
                    components: 3,
                    values: ColorValues::Float(iter.flatten().collect()),
                },
                ReadColors::RgbaU8(iter) => ColorAttribute {
                    components: 4,
                    values: ColorValues::Unorm8(iter.flatten().collect()),
                },
                ReadColors::RgbaU16(iter) => ColorAttribute {
                    components: 4,
                    values: ColorValues::Unorm16(iter.flatten().collect()),
                },
                ReadColors::RgbaF32(iter) => ColorAttribute {
                    components: 4,
                    values: ColorValues::Float(iter.flatten().collect()),
                },
            });

            let indices = reader.read_indices().map(|indices| match indices {
                ReadIndices::U8(iter) => IndexData::U8(iter.collect()),
                ReadIndices::U16(iter) => IndexData::U16(iter.collect()),
                ReadIndices::U32(iter) => IndexData::U32(iter.collect()),
            });

            Ok(AssetPrimitive {
                positions: reader.read_positions().map(Iterator::collect),
                normals: reader.read_normals().map(Iterator::collect),
                colors,
                indices,
                material: primitive.material().index(),
                topology: map_topology(primitive.mode()),
            })
        })
        .collect::<AssetResult<Vec<_>>>()?;

    Ok(AssetMesh {
        name: mesh.name().map(str::to_owned),
        primitives,
    })
}

fn convert_material(material: &gltf::Material) -> AssetMaterial {
    let pbr = material.pbr_metallic_roughness();
    AssetMaterial {
        name: material.name().map(str::to_owned),
        base_color_factor: None,
        roughness_factor: None,
        pbr: Some(PbrMetallicRoughness {
            base_color_factor: pbr.base_color_factor(),
            roughness_factor: pbr.roughness_factor(),
        }),
    }
}

const fn map_topology(mode: Mode) -> Topology {
    match mode {
        Mode::Triangles => Topology::Triangles,
        Mode::Points => Topology::Other("POINTS"),
        Mode::Lines => Topology::Other("LINES"),
        Mode::LineLoop => Topology::Other("LINE_LOOP"),
        Mode::LineStrip => Topology::Other("LINE_STRIP"),
        Mode::TriangleStrip => Topology::Other("TRIANGLE_STRIP"),
        Mode::TriangleFan => Topology::Other("TRIANGLE_FAN"),
    }
}
