//! Built-in scene used when no asset file is configured

use scene_renderer::assets::{
    AssetMaterial, AssetMesh, AssetNode, AssetPrimitive, AssetScene, ColorAttribute, IndexData,
    NodeTransform, PbrMetallicRoughness, SceneAsset,
};

const GROUND_HALF_EXTENT: f32 = 12.0;

fn translated(translation: [f32; 3], scale: f32) -> NodeTransform {
    NodeTransform::Decomposed {
        translation,
        rotation: [0.0, 0.0, 0.0, 1.0],
        scale: [scale; 3],
    }
}

/// Unindexed ground plane; its normals are synthesized per face
fn ground() -> AssetPrimitive {
    let e = GROUND_HALF_EXTENT;
    AssetPrimitive {
        positions: Some(vec![
            [-e, 0.0, -e],
            [-e, 0.0, e],
            [e, 0.0, e],
            [-e, 0.0, -e],
            [e, 0.0, e],
            [e, 0.0, -e],
        ]),
        material: Some(0),
        ..AssetPrimitive::default()
    }
}

/// Indexed octahedron with per-vertex colours; its normals are smoothed
fn puff() -> AssetPrimitive {
    let positions = vec![
        [1.0, 0.0, 0.0],
        [-1.0, 0.0, 0.0],
        [0.0, 1.0, 0.0],
        [0.0, -1.0, 0.0],
        [0.0, 0.0, 1.0],
        [0.0, 0.0, -1.0],
    ];
    let colors = ColorAttribute::rgb(&[
        [0.95, 0.95, 1.0],
        [0.9, 0.9, 0.95],
        [1.0, 1.0, 1.0],
        [0.75, 0.78, 0.85],
        [0.92, 0.92, 0.98],
        [0.88, 0.88, 0.94],
    ]);
    let indices = vec![
        0, 2, 4, 4, 2, 1, 1, 2, 5, 5, 2, 0, //
        4, 3, 0, 1, 3, 4, 5, 3, 1, 0, 3, 5,
    ];

    AssetPrimitive {
        positions: Some(positions),
        colors: Some(colors),
        indices: Some(IndexData::U16(indices)),
        material: Some(1),
        ..AssetPrimitive::default()
    }
}

/// A ground plane with two clouds floating above it
pub fn scene() -> SceneAsset {
    SceneAsset {
        meshes: vec![
            AssetMesh {
                name: Some("ground".into()),
                primitives: vec![ground()],
            },
            AssetMesh {
                name: Some("puff".into()),
                primitives: vec![puff()],
            },
        ],
        materials: vec![
            AssetMaterial {
                name: Some("grass".into()),
                pbr: Some(PbrMetallicRoughness {
                    base_color_factor: [0.35, 0.55, 0.3, 1.0],
                    roughness_factor: 0.9,
                }),
                ..AssetMaterial::default()
            },
            AssetMaterial {
                name: Some("cloud".into()),
                roughness_factor: Some(0.6),
                ..AssetMaterial::default()
            },
        ],
        scenes: vec![AssetScene {
            name: Some("demo".into()),
            roots: vec![
                AssetNode::named("ground").with_mesh(0),
                AssetNode::named("cloud_1")
                    .with_mesh(1)
                    .with_transform(translated([8.0, 4.0, 0.0], 1.5))
                    .with_child(AssetNode::named("cloud_1_tail").with_mesh(1).with_transform(translated([1.2, -0.2, 0.4], 0.6))),
                AssetNode::named("cloud_2")
                    .with_mesh(1)
                    .with_transform(translated([0.0, 5.0, 0.0], 2.0)),
            ],
        }],
        default_scene: Some(0),
    }
}
