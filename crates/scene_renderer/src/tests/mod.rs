//! Cross-module tests: scene construction from assets and the full frame
//! pipeline against the recording device.


use crate::assets::{AssetMesh, AssetNode, AssetPrimitive, AssetScene, IndexData, NodeTransform, SceneAsset};
use crate::config::RendererConfig;
use crate::frame::FrameOrchestrator;
use crate::render::{RecordingDevice, ShaderLibrary, ShaderSources};
use crate::scene::{Scene, SceneResult};

/// Two triangles folded along their shared edge 0-1
pub(crate) fn folded_quad() -> AssetPrimitive {
    AssetPrimitive {
        positions: Some(vec![
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, -1.0],
        ]),
        indices: Some(IndexData::U16(vec![0, 1, 2, 0, 1, 3])),
        ..AssetPrimitive::default()
    }
}

pub(crate) fn translated(x: f32, y: f32, z: f32) -> NodeTransform {
    NodeTransform::Decomposed {
        translation: [x, y, z],
        rotation: [0.0, 0.0, 0.0, 1.0],
        scale: [1.0; 3],
    }
}

/// Root "ground" with a child "cloud_1" 8 units out; both draw the quad
pub(crate) fn ground_and_cloud() -> SceneAsset {
    SceneAsset {
        meshes: vec![AssetMesh {
            name: Some("quad".into()),
            primitives: vec![folded_quad()],
        }],
        scenes: vec![AssetScene {
            name: Some("test".into()),
            roots: vec![AssetNode::named("ground")
                .with_mesh(0)
                .with_child(AssetNode::named("cloud_1").with_mesh(0).with_transform(translated(8.0, 3.0, 0.0)))],
        }],
        ..SceneAsset::default()
    }
}

/// Small-target configuration so resize and texel sizes are easy to check
pub(crate) fn test_config() -> RendererConfig {
    RendererConfig::default().with_shadow_map_size(256)
}

pub(crate) fn orchestrator(
    asset: &SceneAsset,
    config: RendererConfig,
) -> SceneResult<FrameOrchestrator<RecordingDevice>> {
    let mut device = RecordingDevice::new();
    let shaders = ShaderLibrary::new(&mut device, &ShaderSources::default())?;
    let scene = Scene::from_asset(&mut device, asset, &shaders.lit)?;
    FrameOrchestrator::new(device, config, shaders, scene)
}

/// Decode little-endian `[f32; 3]` vertices from raw buffer bytes
pub(crate) fn decode_vec3(bytes: &[u8]) -> Vec<[f32; 3]> {
    bytes
        .chunks_exact(12)
        .map(|v| {
            let f = |i: usize| f32::from_le_bytes([v[i], v[i + 1], v[i + 2], v[i + 3]]);
            [f(0), f(4), f(8)]
        })
        .collect()
}
