//! # Scene Assets
//!
//! In-memory form of a scene file as handed to the scene builder: a list of
//! meshes and materials plus one or more scenes, each a tree of nodes that
//! reference meshes by index. The importer lives in [`gltf_loader`]; tests and
//! procedural content build these structs directly.

#[cfg(feature = "gltf")]
pub mod gltf_loader;

#[cfg(feature = "gltf")]
pub use gltf_loader::{load_gltf, load_gltf_slice};

/// Asset import and geometry extraction errors
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AssetError {
    /// A primitive has no position attribute
    #[error("mesh {mesh} primitive {primitive} has no POSITION attribute")]
    MissingPositions {
        /// Mesh index in the asset
        mesh: usize,
        /// Primitive index within the mesh
        primitive: usize,
    },

    /// The asset contains no scene at all
    #[error("asset contains no scene")]
    NoScene,

    /// An optional attribute does not have one entry per vertex
    #[error("{attribute} has {actual} entries, expected {expected}")]
    AttributeLength {
        /// Attribute name
        attribute: &'static str,
        /// Vertex count taken from the positions
        expected: usize,
        /// Entry count actually present
        actual: usize,
    },

    /// An index refers past the end of the vertex arrays
    #[error("index {index} out of range for {vertex_count} vertices")]
    IndexOutOfRange {
        /// Offending index value
        index: u32,
        /// Number of vertices
        vertex_count: usize,
    },

    /// Colour attributes must have 3 or 4 components
    #[error("unsupported colour component count {0}")]
    UnsupportedColorComponents(usize),

    /// Only triangle lists can be rendered
    #[error("unsupported primitive topology {0}")]
    UnsupportedTopology(String),

    /// A node or primitive points at a mesh or material that does not exist
    #[error("invalid {kind} reference {index}")]
    InvalidReference {
        /// What was referenced
        kind: &'static str,
        /// Out of range index
        index: usize,
    },

    /// File could not be read or parsed
    #[error("import failed: {0}")]
    Import(String),
}

/// Result type for asset operations
pub type AssetResult<T> = Result<T, AssetError>;

/// Stable identity of one primitive: mesh index and position in that mesh
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PrimitiveId {
    /// Mesh index in [`SceneAsset::meshes`]
    pub mesh: usize,
    /// Primitive index in [`AssetMesh::primitives`]
    pub primitive: usize,
}

impl PrimitiveId {
    /// Create a primitive id
    pub const fn new(mesh: usize, primitive: usize) -> Self {
        Self { mesh, primitive }
    }
}

/// How a node stores its local transform
#[derive(Debug, Clone, PartialEq)]
pub enum NodeTransform {
    /// Explicit 4x4 matrix, column-major
    Matrix([f32; 16]),
    /// Separate translation, `[x, y, z, w]` rotation and scale
    Decomposed {
        /// Translation
        translation: [f32; 3],
        /// Unit quaternion as `[x, y, z, w]`
        rotation: [f32; 4],
        /// Non-uniform scale
        scale: [f32; 3],
    },
}

impl Default for NodeTransform {
    fn default() -> Self {
        Self::Decomposed {
            translation: [0.0; 3],
            rotation: [0.0, 0.0, 0.0, 1.0],
            scale: [1.0; 3],
        }
    }
}

/// One node in an asset scene tree
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssetNode {
    /// Optional node name
    pub name: Option<String>,
    /// Local transform
    pub transform: NodeTransform,
    /// Mesh index, if the node draws something
    pub mesh: Option<usize>,
    /// Child nodes in authored order
    pub children: Vec<AssetNode>,
}

impl AssetNode {
    /// Create a named node with an identity transform
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Attach a mesh
    pub fn with_mesh(mut self, mesh: usize) -> Self {
        self.mesh = Some(mesh);
        self
    }

    /// Replace the local transform
    pub fn with_transform(mut self, transform: NodeTransform) -> Self {
        self.transform = transform;
        self
    }

    /// Append a child
    pub fn with_child(mut self, child: AssetNode) -> Self {
        self.children.push(child);
        self
    }
}

/// A named tree of nodes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssetScene {
    /// Optional scene name
    pub name: Option<String>,
    /// Root nodes in authored order
    pub roots: Vec<AssetNode>,
}

/// Per-vertex colour values in their stored encoding
#[derive(Debug, Clone, PartialEq)]
pub enum ColorValues {
    /// Floating point, already in `0..=1`
    Float(Vec<f32>),
    /// Normalized unsigned bytes
    Unorm8(Vec<u8>),
    /// Normalized unsigned shorts
    Unorm16(Vec<u16>),
}

impl ColorValues {
    /// Number of scalar values stored
    pub fn len(&self) -> usize {
        match self {
            Self::Float(v) => v.len(),
            Self::Unorm8(v) => v.len(),
            Self::Unorm16(v) => v.len(),
        }
    }

    /// Whether no values are stored
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Value at `i` scaled to `0..=1`
    pub fn normalized(&self, i: usize) -> f32 {
        match self {
            Self::Float(v) => v[i],
            Self::Unorm8(v) => f32::from(v[i]) / 255.0,
            Self::Unorm16(v) => f32::from(v[i]) / 65535.0,
        }
    }
}

/// Interleaved colour attribute with 3 or 4 components per vertex
#[derive(Debug, Clone, PartialEq)]
pub struct ColorAttribute {
    /// Components per vertex
    pub components: usize,
    /// Flat values, `components` per vertex
    pub values: ColorValues,
}

impl ColorAttribute {
    /// Float RGB colours
    pub fn rgb(colors: &[[f32; 3]]) -> Self {
        Self {
            components: 3,
            values: ColorValues::Float(colors.iter().flatten().copied().collect()),
        }
    }

    /// Float RGBA colours
    pub fn rgba(colors: &[[f32; 4]]) -> Self {
        Self {
            components: 4,
            values: ColorValues::Float(colors.iter().flatten().copied().collect()),
        }
    }

    /// Number of vertices described
    pub fn vertex_count(&self) -> usize {
        if self.components == 0 {
            0
        } else {
            self.values.len() / self.components
        }
    }
}

/// Triangle-list indices at their stored width
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexData {
    /// 8-bit indices
    U8(Vec<u8>),
    /// 16-bit indices
    U16(Vec<u16>),
    /// 32-bit indices
    U32(Vec<u32>),
}

impl IndexData {
    /// Number of indices
    pub fn len(&self) -> usize {
        match self {
            Self::U8(v) => v.len(),
            Self::U16(v) => v.len(),
            Self::U32(v) => v.len(),
        }
    }

    /// Whether the list is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Index at `i` widened to `u32`
    pub fn get(&self, i: usize) -> u32 {
        match self {
            Self::U8(v) => u32::from(v[i]),
            Self::U16(v) => u32::from(v[i]),
            Self::U32(v) => v[i],
        }
    }

    /// Iterate over all indices widened to `u32`
    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        (0..self.len()).map(move |i| self.get(i))
    }

    /// Width of one index in bytes
    pub const fn stride(&self) -> usize {
        match self {
            Self::U8(_) => 1,
            Self::U16(_) => 2,
            Self::U32(_) => 4,
        }
    }
}

/// How the vertices of a primitive are assembled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Topology {
    /// Independent triangles
    #[default]
    Triangles,
    /// Anything else the importer saw, by name
    Other(&'static str),
}

/// Raw vertex streams of one mesh primitive
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssetPrimitive {
    /// Positions, required for rendering
    pub positions: Option<Vec<[f32; 3]>>,
    /// Normals, synthesized when absent
    pub normals: Option<Vec<[f32; 3]>>,
    /// First colour set
    pub colors: Option<ColorAttribute>,
    /// Triangle-list indices
    pub indices: Option<IndexData>,
    /// Material index
    pub material: Option<usize>,
    /// Assembly mode
    pub topology: Topology,
}

/// A mesh: an ordered list of primitives
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssetMesh {
    /// Optional mesh name
    pub name: Option<String>,
    /// Primitives
    pub primitives: Vec<AssetPrimitive>,
}

/// The nested metallic-roughness block of a material
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PbrMetallicRoughness {
    /// Linear RGBA base colour
    pub base_color_factor: [f32; 4],
    /// Roughness in `0..=1`
    pub roughness_factor: f32,
}

/// Material factors consumed by the renderer
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssetMaterial {
    /// Optional material name
    pub name: Option<String>,
    /// Top-level base colour factor
    pub base_color_factor: Option<[f32; 4]>,
    /// Top-level roughness factor
    pub roughness_factor: Option<f32>,
    /// Nested block, overrides the top-level factors when present
    pub pbr: Option<PbrMetallicRoughness>,
}

impl AssetMaterial {
    /// Resolved base colour, nested block first, then top level
    pub fn base_color(&self) -> Option<[f32; 4]> {
        self.pbr
            .map(|pbr| pbr.base_color_factor)
            .or(self.base_color_factor)
    }

    /// Resolved roughness, nested block first, then top level
    pub fn roughness(&self) -> Option<f32> {
        self.pbr
            .map(|pbr| pbr.roughness_factor)
            .or(self.roughness_factor)
    }
}

/// A loaded scene file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneAsset {
    /// All meshes
    pub meshes: Vec<AssetMesh>,
    /// All materials
    pub materials: Vec<AssetMaterial>,
    /// All scenes
    pub scenes: Vec<AssetScene>,
    /// Index of the scene to show, first scene when absent
    pub default_scene: Option<usize>,
}

impl SceneAsset {
    /// The default scene, or the first scene when none is marked default
    pub fn active_scene(&self) -> AssetResult<&AssetScene> {
        match self.default_scene {
            Some(index) => self.scenes.get(index).ok_or(AssetError::InvalidReference {
                kind: "scene",
                index,
            }),
            None => self.scenes.first().ok_or(AssetError::NoScene),
        }
    }

    /// Look up a mesh
    pub fn mesh(&self, index: usize) -> AssetResult<&AssetMesh> {
        self.meshes
            .get(index)
            .ok_or(AssetError::InvalidReference { kind: "mesh", index })
    }

    /// Look up a primitive by identity
    pub fn primitive(&self, id: PrimitiveId) -> AssetResult<&AssetPrimitive> {
        self.mesh(id.mesh)?
            .primitives
            .get(id.primitive)
            .ok_or(AssetError::InvalidReference {
                kind: "primitive",
                index: id.primitive,
            })
    }

    /// Look up a material
    pub fn material(&self, index: usize) -> AssetResult<&AssetMaterial> {
        self.materials
            .get(index)
            .ok_or(AssetError::InvalidReference { kind: "material", index })
    }
}
