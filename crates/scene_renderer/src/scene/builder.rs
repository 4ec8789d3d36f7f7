//! Scene construction from an asset

use std::rc::Rc;

use crate::assets::{AssetNode, NodeTransform, PrimitiveId, SceneAsset};
use crate::foundation::math::{Mat4, Mat4Ext, Transform};
use crate::render::device::GraphicsDevice;
use crate::render::ShaderProgram;

use super::cache::ResourceCache;
use super::node::{NodeId, SceneGraph};
use super::SceneResult;

/// Local matrix of an asset node: the explicit matrix when present,
/// otherwise `T * R * S`
pub fn local_matrix(transform: &NodeTransform) -> Mat4 {
    match transform {
        NodeTransform::Matrix(values) => Mat4::from_column_array(values),
        NodeTransform::Decomposed {
            translation,
            rotation,
            scale,
        } => Transform::from_trs(*translation, *rotation, *scale).to_matrix(),
    }
}

/// Walks the active scene of an asset and creates one scene node per asset
/// node, attaching cached drawables for every mesh primitive.
pub struct SceneBuilder<'a> {
    device: &'a mut dyn GraphicsDevice,
    asset: &'a SceneAsset,
    program: Rc<ShaderProgram>,
    cache: &'a mut ResourceCache,
}

impl<'a> SceneBuilder<'a> {
    /// Prepare a build that shades every drawable with `program`
    pub fn new(
        device: &'a mut dyn GraphicsDevice,
        asset: &'a SceneAsset,
        program: Rc<ShaderProgram>,
        cache: &'a mut ResourceCache,
    ) -> Self {
        Self {
            device,
            asset,
            program,
            cache,
        }
    }

    /// Build every root of the active scene into `graph`, in asset order
    pub fn build(mut self, graph: &mut SceneGraph) -> SceneResult<Vec<NodeId>> {
        let asset = self.asset;
        let scene = asset.active_scene()?;
        let mut roots = Vec::with_capacity(scene.roots.len());
        for root in &scene.roots {
            roots.push(self.build_node(graph, root, None)?);
        }

        log::info!(
            "Built scene '{}': {} roots, {} nodes, {} unique primitives",
            scene.name.as_deref().unwrap_or("<unnamed>"),
            roots.len(),
            graph.len(),
            self.cache.geometry_count()
        );
        Ok(roots)
    }

    fn build_node(&mut self, graph: &mut SceneGraph, source: &AssetNode, parent: Option<NodeId>) -> SceneResult<NodeId> {
        let name = source.name.clone().unwrap_or_default();
        let id = graph.create_node(name, local_matrix(&source.transform));
        if let Some(parent) = parent {
            graph.add_child(parent, id)?;
        }

        if let Some(mesh) = source.mesh {
            let primitive_count = self.asset.mesh(mesh)?.primitives.len();
            for primitive in 0..primitive_count {
                let drawable = self.cache.get_or_create_drawable(
                    &mut *self.device,
                    self.asset,
                    PrimitiveId::new(mesh, primitive),
                    &self.program,
                )?;
                if let Some(node) = graph.node_mut(id) {
                    node.add_drawable(drawable);
                }
            }
        }

        for child in &source.children {
            self.build_node(graph, child, Some(id))?;
        }
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{AssetError, AssetMesh, AssetPrimitive, AssetScene};
    use crate::foundation::math::Vec3;
    use crate::render::{RecordingDevice, ShaderLibrary, ShaderSources};
    use crate::scene::SceneError;
    use approx::assert_relative_eq;

    fn triangle_mesh() -> AssetMesh {
        AssetMesh {
            name: Some("tri".into()),
            primitives: vec![AssetPrimitive {
                positions: Some(vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]),
                ..AssetPrimitive::default()
            }],
        }
    }

    fn build(asset: &SceneAsset) -> (SceneResult<Vec<NodeId>>, SceneGraph, ResourceCache) {
        let mut device = RecordingDevice::new();
        let library = ShaderLibrary::new(&mut device, &ShaderSources::default()).unwrap();
        let mut cache = ResourceCache::new();
        let mut graph = SceneGraph::new();
        let result = SceneBuilder::new(&mut device, asset, Rc::clone(&library.lit), &mut cache).build(&mut graph);
        (result, graph, cache)
    }

    #[test]
    fn test_local_matrix_from_both_forms() {
        let decomposed = NodeTransform::Decomposed {
            translation: [1.0, 2.0, 3.0],
            rotation: [0.0, 0.0, 0.0, 1.0],
            scale: [2.0, 2.0, 2.0],
        };
        let m = local_matrix(&decomposed);
        assert_relative_eq!(m.transform_vector(&Vec3::x()), Vec3::new(2.0, 0.0, 0.0));

        let mut values = [0.0; 16];
        values[0] = 1.0;
        values[5] = 1.0;
        values[10] = 1.0;
        values[15] = 1.0;
        values[12] = 7.0;
        let explicit = local_matrix(&NodeTransform::Matrix(values));
        assert_eq!(explicit, Mat4::new_translation(&Vec3::new(7.0, 0.0, 0.0)));
    }

    #[test]
    fn test_instanced_mesh_shares_drawable() {
        let asset = SceneAsset {
            meshes: vec![triangle_mesh()],
            scenes: vec![AssetScene {
                name: None,
                roots: vec![
                    AssetNode::named("a").with_mesh(0),
                    AssetNode::named("b").with_mesh(0),
                ],
            }],
            ..SceneAsset::default()
        };
        let (result, graph, cache) = build(&asset);
        let roots = result.unwrap();

        let a = &graph.node(roots[0]).unwrap().drawables()[0];
        let b = &graph.node(roots[1]).unwrap().drawables()[0];
        assert!(Rc::ptr_eq(a, b));
        assert_eq!(cache.drawable_count(), 1);
    }

    #[test]
    fn test_world_threads_down_the_tree() {
        let offset = |x: f32| NodeTransform::Decomposed {
            translation: [x, 0.0, 0.0],
            rotation: [0.0, 0.0, 0.0, 1.0],
            scale: [1.0; 3],
        };
        let asset = SceneAsset {
            scenes: vec![AssetScene {
                name: None,
                roots: vec![AssetNode::named("root")
                    .with_transform(offset(1.0))
                    .with_child(AssetNode::named("child").with_transform(offset(2.0)))],
            }],
            ..SceneAsset::default()
        };
        let (result, graph, _) = build(&asset);
        let root = result.unwrap()[0];
        let child = graph.find_by_name(root, "child").unwrap();

        assert_relative_eq!(
            *graph.node(child).unwrap().world(),
            Mat4::new_translation(&Vec3::new(3.0, 0.0, 0.0))
        );
    }

    #[test]
    fn test_missing_positions_abort_the_build() {
        let asset = SceneAsset {
            meshes: vec![AssetMesh {
                name: None,
                primitives: vec![AssetPrimitive::default()],
            }],
            scenes: vec![AssetScene {
                name: None,
                roots: vec![AssetNode::named("broken").with_mesh(0)],
            }],
            ..SceneAsset::default()
        };
        let (result, _, _) = build(&asset);

        assert!(matches!(
            result,
            Err(SceneError::Asset(AssetError::MissingPositions { mesh: 0, primitive: 0 }))
        ));
    }

    #[test]
    fn test_asset_without_scene_fails() {
        let (result, _, _) = build(&SceneAsset::default());
        assert!(matches!(result, Err(SceneError::Asset(AssetError::NoScene))));
    }
}
