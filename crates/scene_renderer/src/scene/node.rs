//! Scene nodes and the arena that owns them
//!
//! Nodes live in a [`SlotMap`] and refer to each other by [`NodeId`]. Children
//! are owned downward through the arena; the parent link is a plain id and
//! never keeps a node alive.

use std::rc::Rc;

use slotmap::{new_key_type, SlotMap};

use crate::foundation::math::Mat4;
use crate::render::DrawableBinding;

use super::{SceneError, SceneResult};

new_key_type! {
    /// Handle to a node in a [`SceneGraph`]
    pub struct NodeId;
}

/// A transform node with optional drawables
#[derive(Debug, Clone)]
pub struct SceneNode {
    name: String,
    local: Mat4,
    world: Mat4,
    drawables: Vec<Rc<DrawableBinding>>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl SceneNode {
    /// Node name, empty when the source had none
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Transform relative to the parent
    pub const fn local(&self) -> &Mat4 {
        &self.local
    }

    /// Transform to scene space, as of the last world update
    pub const fn world(&self) -> &Mat4 {
        &self.world
    }

    /// Replace the local transform without touching `world`.
    ///
    /// Call [`SceneGraph::update_world`] afterwards, or use
    /// [`SceneGraph::set_local`] which does both.
    pub fn set_local(&mut self, local: Mat4) {
        self.local = local;
    }

    /// Drawables attached to this node
    pub fn drawables(&self) -> &[Rc<DrawableBinding>] {
        &self.drawables
    }

    /// Attach a drawable
    pub fn add_drawable(&mut self, drawable: Rc<DrawableBinding>) {
        self.drawables.push(drawable);
    }

    /// Parent node, `None` for roots and detached nodes
    pub const fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Children in attachment order
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// Arena of scene nodes
#[derive(Debug, Default)]
pub struct SceneGraph {
    nodes: SlotMap<NodeId, SceneNode>,
}

impl SceneGraph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a parentless node; its world transform equals `local`
    pub fn create_node(&mut self, name: impl Into<String>, local: Mat4) -> NodeId {
        self.nodes.insert(SceneNode {
            name: name.into(),
            local,
            world: local,
            drawables: Vec::new(),
            parent: None,
            children: Vec::new(),
        })
    }

    /// Number of live nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph has no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether `id` refers to a live node
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Borrow a node
    pub fn node(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(id)
    }

    /// Borrow a node mutably
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        self.nodes.get_mut(id)
    }

    fn get(&self, id: NodeId) -> SceneResult<&SceneNode> {
        self.nodes.get(id).ok_or(SceneError::UnknownNode(id))
    }

    fn get_mut(&mut self, id: NodeId) -> SceneResult<&mut SceneNode> {
        self.nodes.get_mut(id).ok_or(SceneError::UnknownNode(id))
    }

    /// Whether `ancestor` is `id` or one of its ancestors
    fn is_ancestor_or_self(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.nodes.get(node).and_then(SceneNode::parent);
        }
        false
    }

    /// Attach `child` as the last child of `parent` and refresh its subtree.
    ///
    /// A child that already has a parent is detached from it first. Attaching
    /// a node under itself or one of its descendants is rejected.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> SceneResult<()> {
        self.get(parent)?;
        self.get(child)?;
        if self.is_ancestor_or_self(child, parent) {
            return Err(SceneError::CyclicAttachment { parent, child });
        }

        if let Some(previous) = self.get(child)?.parent {
            self.remove_child(previous, child);
        }

        self.get_mut(parent)?.children.push(child);
        self.get_mut(child)?.parent = Some(parent);
        self.update_world(child, None)
    }

    /// Detach `child` from `parent`.
    ///
    /// Returns whether it was a child. The detached node keeps its current
    /// world transform until it is reattached or refreshed.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        let Some(parent_node) = self.nodes.get_mut(parent) else {
            return false;
        };
        let Some(position) = parent_node.children.iter().position(|&c| c == child) else {
            return false;
        };
        parent_node.children.remove(position);

        if let Some(child_node) = self.nodes.get_mut(child) {
            child_node.parent = None;
        }
        true
    }

    /// Recompute `world = parent_world * local` for `id` and its descendants.
    ///
    /// Without `parent_world` the actual parent's world is used, or identity
    /// for a node without parent.
    pub fn update_world(&mut self, id: NodeId, parent_world: Option<&Mat4>) -> SceneResult<()> {
        let base = match parent_world {
            Some(world) => *world,
            None => match self.get(id)?.parent {
                Some(parent) => *self.get(parent)?.world(),
                None => Mat4::identity(),
            },
        };

        let mut stack = vec![(id, base)];
        while let Some((current, parent_world)) = stack.pop() {
            let node = self.get_mut(current)?;
            node.world = parent_world * node.local;
            let world = node.world;
            stack.extend(node.children.iter().map(|&child| (child, world)));
        }
        Ok(())
    }

    /// Replace a node's local transform and refresh its subtree
    pub fn set_local(&mut self, id: NodeId, local: Mat4) -> SceneResult<()> {
        self.get_mut(id)?.local = local;
        self.update_world(id, None)
    }

    /// Pre-order traversal of the subtree under `root`
    pub fn walk(&self, root: NodeId) -> Walk<'_> {
        Walk {
            graph: self,
            stack: vec![root],
        }
    }

    /// First node named `name` in pre-order under `root`
    pub fn find_by_name(&self, root: NodeId, name: &str) -> Option<NodeId> {
        self.walk(root)
            .find(|(_, node)| node.name == name)
            .map(|(id, _)| id)
    }

    /// Remove a node and all its descendants from the arena.
    ///
    /// The node is detached from its parent first. Returns how many nodes
    /// were removed.
    pub fn destroy_subtree(&mut self, id: NodeId) -> SceneResult<usize> {
        if let Some(parent) = self.get(id)?.parent {
            self.remove_child(parent, id);
        }

        let doomed: Vec<NodeId> = self.walk(id).map(|(id, _)| id).collect();
        for node in &doomed {
            self.nodes.remove(*node);
        }
        Ok(doomed.len())
    }
}

/// Pre-order iterator over a subtree, see [`SceneGraph::walk`]
#[derive(Debug)]
pub struct Walk<'a> {
    graph: &'a SceneGraph,
    stack: Vec<NodeId>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = (NodeId, &'a SceneNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(id) = self.stack.pop() {
            if let Some(node) = self.graph.nodes.get(id) {
                self.stack.extend(node.children.iter().rev());
                return Some((id, node));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::{Mat4Ext, Vec3};
    use approx::assert_relative_eq;

    fn translation(x: f32, y: f32, z: f32) -> Mat4 {
        Mat4::new_translation(&Vec3::new(x, y, z))
    }

    /// Check the world invariant for every node reachable from `root`
    fn assert_worlds_consistent(graph: &SceneGraph, root: NodeId) {
        for (_, node) in graph.walk(root) {
            let expected = match node.parent() {
                Some(parent) => graph.node(parent).unwrap().world() * node.local(),
                None => *node.local(),
            };
            assert_relative_eq!(*node.world(), expected, epsilon = 1e-5);
        }
    }

    fn chain(graph: &mut SceneGraph) -> (NodeId, NodeId, NodeId) {
        let root = graph.create_node("root", translation(1.0, 0.0, 0.0));
        let mid = graph.create_node("mid", Mat4::rotation_y(0.5));
        let leaf = graph.create_node("leaf", translation(0.0, 0.0, 2.0));
        graph.add_child(root, mid).unwrap();
        graph.add_child(mid, leaf).unwrap();
        (root, mid, leaf)
    }

    #[test]
    fn test_add_child_composes_world() {
        let mut graph = SceneGraph::new();
        let (root, _, leaf) = chain(&mut graph);

        assert_worlds_consistent(&graph, root);
        let expected = translation(1.0, 0.0, 0.0) * Mat4::rotation_y(0.5) * translation(0.0, 0.0, 2.0);
        assert_relative_eq!(*graph.node(leaf).unwrap().world(), expected, epsilon = 1e-5);
    }

    #[test]
    fn test_set_local_refreshes_descendants() {
        let mut graph = SceneGraph::new();
        let (root, mid, _) = chain(&mut graph);

        graph.set_local(root, translation(0.0, 5.0, 0.0)).unwrap();
        assert_worlds_consistent(&graph, root);

        graph.node_mut(mid).unwrap().set_local(Mat4::rotation_y(-1.0));
        graph.update_world(mid, None).unwrap();
        assert_worlds_consistent(&graph, root);
    }

    #[test]
    fn test_update_world_with_explicit_parent_world() {
        let mut graph = SceneGraph::new();
        let node = graph.create_node("n", translation(0.0, 1.0, 0.0));

        graph.update_world(node, Some(&translation(3.0, 0.0, 0.0))).unwrap();
        assert_relative_eq!(*graph.node(node).unwrap().world(), translation(3.0, 1.0, 0.0), epsilon = 1e-6);

        graph.update_world(node, None).unwrap();
        assert_relative_eq!(*graph.node(node).unwrap().world(), translation(0.0, 1.0, 0.0), epsilon = 1e-6);
    }

    #[test]
    fn test_remove_child_leaves_world_stale() {
        let mut graph = SceneGraph::new();
        let (_, mid, leaf) = chain(&mut graph);
        let before = *graph.node(leaf).unwrap().world();

        assert!(graph.remove_child(mid, leaf));
        assert!(!graph.remove_child(mid, leaf));

        let node = graph.node(leaf).unwrap();
        assert_eq!(node.parent(), None);
        assert_eq!(*node.world(), before);
        assert!(graph.node(mid).unwrap().children().is_empty());
    }

    #[test]
    fn test_reattach_updates_world_not_local() {
        let mut graph = SceneGraph::new();
        let (_, mid, leaf) = chain(&mut graph);
        let other = graph.create_node("other", translation(0.0, -4.0, 0.0));
        let local = *graph.node(leaf).unwrap().local();

        graph.remove_child(mid, leaf);
        graph.add_child(other, leaf).unwrap();

        let node = graph.node(leaf).unwrap();
        assert_eq!(*node.local(), local);
        assert_relative_eq!(*node.world(), translation(0.0, -4.0, 2.0), epsilon = 1e-6);
    }

    #[test]
    fn test_add_child_detaches_from_previous_parent() {
        let mut graph = SceneGraph::new();
        let (root, mid, leaf) = chain(&mut graph);

        graph.add_child(root, leaf).unwrap();

        assert!(graph.node(mid).unwrap().children().is_empty());
        assert_eq!(graph.node(root).unwrap().children(), &[mid, leaf]);
        assert_eq!(graph.node(leaf).unwrap().parent(), Some(root));
        assert_worlds_consistent(&graph, root);
    }

    #[test]
    fn test_cycles_are_rejected() {
        let mut graph = SceneGraph::new();
        let (root, _, leaf) = chain(&mut graph);

        assert!(matches!(graph.add_child(leaf, root), Err(SceneError::CyclicAttachment { .. })));
        assert!(matches!(graph.add_child(leaf, leaf), Err(SceneError::CyclicAttachment { .. })));
        assert_eq!(graph.node(root).unwrap().parent(), None);
    }

    #[test]
    fn test_walk_is_preorder() {
        let mut graph = SceneGraph::new();
        let root = graph.create_node("root", Mat4::identity());
        let a = graph.create_node("a", Mat4::identity());
        let b = graph.create_node("b", Mat4::identity());
        let a1 = graph.create_node("a1", Mat4::identity());
        graph.add_child(root, a).unwrap();
        graph.add_child(root, b).unwrap();
        graph.add_child(a, a1).unwrap();

        let names: Vec<&str> = graph.walk(root).map(|(_, n)| n.name()).collect();
        assert_eq!(names, vec!["root", "a", "a1", "b"]);
    }

    #[test]
    fn test_find_by_name_returns_first_match() {
        let mut graph = SceneGraph::new();
        let root = graph.create_node("root", Mat4::identity());
        let first = graph.create_node("dup", Mat4::identity());
        let second = graph.create_node("dup", Mat4::identity());
        graph.add_child(root, first).unwrap();
        graph.add_child(root, second).unwrap();

        assert_eq!(graph.find_by_name(root, "dup"), Some(first));
        assert_eq!(graph.find_by_name(root, "missing"), None);
    }

    #[test]
    fn test_destroy_subtree() {
        let mut graph = SceneGraph::new();
        let (root, mid, leaf) = chain(&mut graph);

        assert_eq!(graph.destroy_subtree(mid).unwrap(), 2);
        assert!(!graph.contains(leaf));
        assert!(graph.node(root).unwrap().children().is_empty());
        assert_eq!(graph.len(), 1);
    }
}
