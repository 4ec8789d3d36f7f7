//! # Scene
//!
//! The runtime scene: an arena of transform nodes ([`SceneGraph`]), the roots
//! built from an asset, and the [`ResourceCache`] that owns the GPU resources
//! those nodes draw with.

pub mod node;
pub mod cache;
pub mod builder;

pub use node::{NodeId, SceneGraph, SceneNode, Walk};
pub use cache::ResourceCache;
pub use builder::{local_matrix, SceneBuilder};

use std::rc::Rc;

use crate::assets::{AssetError, SceneAsset};
use crate::render::device::GraphicsDevice;
use crate::render::{RenderError, ShaderProgram};

/// Scene construction and graph errors
#[derive(thiserror::Error, Debug)]
pub enum SceneError {
    /// No node with this name exists
    #[error("node '{0}' not found")]
    NodeNotFound(String),

    /// The id does not refer to a live node
    #[error("unknown node {0:?}")]
    UnknownNode(NodeId),

    /// Attaching would make a node its own ancestor
    #[error("attaching {child:?} under {parent:?} would create a cycle")]
    CyclicAttachment {
        /// Requested parent
        parent: NodeId,
        /// Requested child
        child: NodeId,
    },

    /// Renderer settings rejected by validation
    #[error("invalid renderer configuration: {0}")]
    InvalidConfig(String),

    /// Asset or geometry problem
    #[error(transparent)]
    Asset(#[from] AssetError),

    /// GPU resource problem
    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Result type for scene operations
pub type SceneResult<T> = Result<T, SceneError>;

/// A built scene: node forest plus the resources it draws with
#[derive(Debug, Default)]
pub struct Scene {
    /// Node arena
    pub graph: SceneGraph,
    /// Root nodes in draw order
    pub roots: Vec<NodeId>,
    /// GPU resources shared by the nodes
    pub cache: ResourceCache,
}

impl Scene {
    /// Build the active scene of `asset`, shading every drawable with `program`
    pub fn from_asset(
        device: &mut dyn GraphicsDevice,
        asset: &SceneAsset,
        program: &Rc<ShaderProgram>,
    ) -> SceneResult<Self> {
        let mut scene = Self::default();
        scene.roots = SceneBuilder::new(device, asset, Rc::clone(program), &mut scene.cache)
            .build(&mut scene.graph)?;
        Ok(scene)
    }

    /// Every node of every root, roots in order, each subtree in pre-order
    pub fn walk(&self) -> impl Iterator<Item = (NodeId, &SceneNode)> + '_ {
        self.roots.iter().flat_map(|&root| self.graph.walk(root))
    }

    /// First node with exactly this name across all roots
    pub fn find(&self, name: &str) -> SceneResult<NodeId> {
        self.roots
            .iter()
            .find_map(|&root| self.graph.find_by_name(root, name))
            .ok_or_else(|| SceneError::NodeNotFound(name.to_string()))
    }

    /// Release the GPU resources of the scene
    pub fn destroy(&mut self, device: &mut dyn GraphicsDevice) {
        self.cache.destroy(device);
    }
}
