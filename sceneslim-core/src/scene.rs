//! Scene graph nodes

use crate::id::{NodeId, TransformId};
use crate::mesh::Mesh;
use crate::timeline::Timeline;
use crate::transform::Transform;
use serde::{Deserialize, Serialize};

/// What a scene node holds besides its transforms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeContent {
    /// Plain grouping node.
    Group(Vec<SceneNode>),
    /// Specialized composite (sub-scene, layout pane, ...). Its children are
    /// never spliced into it or out of it.
    Container { kind: String, children: Vec<SceneNode> },
    /// Mesh leaf.
    Mesh(Mesh),
    /// Any other leaf (camera, light, ...).
    Empty,
}

/// A node of the scene tree. Each node exclusively owns its children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneNode {
    id: NodeId,
    pub name: Option<String>,
    pub transforms: Vec<Transform>,
    pub content: NodeContent,
}

impl SceneNode {
    pub fn new(content: NodeContent) -> Self {
        Self {
            id: NodeId::fresh(),
            name: None,
            transforms: Vec::new(),
            content,
        }
    }

    /// Create a plain group
    pub fn group(children: Vec<SceneNode>) -> Self {
        Self::new(NodeContent::Group(children))
    }

    /// Create a specialized composite node
    pub fn container(kind: impl Into<String>, children: Vec<SceneNode>) -> Self {
        Self::new(NodeContent::Container {
            kind: kind.into(),
            children,
        })
    }

    /// Create a mesh leaf
    pub fn mesh(mesh: Mesh) -> Self {
        Self::new(NodeContent::Mesh(mesh))
    }

    /// Create a leaf without geometry
    pub fn empty() -> Self {
        Self::new(NodeContent::Empty)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transforms.push(transform);
        self
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Human-readable label for diagnostics
    pub fn label(&self) -> String {
        match &self.name {
            Some(name) => format!("{} ({})", name, self.id),
            None => self.id.to_string(),
        }
    }

    pub fn is_group(&self) -> bool {
        matches!(self.content, NodeContent::Group(_))
    }

    pub fn children(&self) -> &[SceneNode] {
        match &self.content {
            NodeContent::Group(children) | NodeContent::Container { children, .. } => children,
            NodeContent::Mesh(_) | NodeContent::Empty => &[],
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<SceneNode>> {
        match &mut self.content {
            NodeContent::Group(children) | NodeContent::Container { children, .. } => {
                Some(children)
            }
            NodeContent::Mesh(_) | NodeContent::Empty => None,
        }
    }

    pub fn mesh_ref(&self) -> Option<&Mesh> {
        match &self.content {
            NodeContent::Mesh(mesh) => Some(mesh),
            _ => None,
        }
    }

    pub fn mesh_mut(&mut self) -> Option<&mut Mesh> {
        match &mut self.content {
            NodeContent::Mesh(mesh) => Some(mesh),
            _ => None,
        }
    }

    /// Pre-order visit of this node and all descendants
    pub fn visit<'a>(&'a self, f: &mut impl FnMut(&'a SceneNode)) {
        f(self);
        for child in self.children() {
            child.visit(f);
        }
    }

    /// Pre-order mutable visit of this node and all descendants
    pub fn visit_mut(&mut self, f: &mut impl FnMut(&mut SceneNode)) {
        f(self);
        if let Some(children) = self.children_mut() {
            for child in children.iter_mut() {
                child.visit_mut(f);
            }
        }
    }

    /// Find a node by id in this subtree
    pub fn find(&self, id: NodeId) -> Option<&SceneNode> {
        if self.id == id {
            return Some(self);
        }
        self.children().iter().find_map(|child| child.find(id))
    }

    /// Find a node by id in this subtree, mutably
    pub fn find_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        if self.id == id {
            return Some(self);
        }
        self.children_mut()?
            .iter_mut()
            .find_map(|child| child.find_mut(id))
    }

    /// Find a transform instance by id in this subtree
    pub fn find_transform(&self, id: TransformId) -> Option<&Transform> {
        self.transforms
            .iter()
            .find(|t| t.id() == id)
            .or_else(|| self.children().iter().find_map(|child| child.find_transform(id)))
    }

    /// Number of nodes in this subtree, including this one
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        self.visit(&mut |_| count += 1);
        count
    }
}

/// An imported scene: a root node and an optional animation timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub root: SceneNode,
    pub timeline: Option<Timeline>,
}

impl Scene {
    pub fn new(root: SceneNode) -> Self {
        Self { root, timeline: None }
    }

    pub fn with_timeline(mut self, timeline: Timeline) -> Self {
        self.timeline = Some(timeline);
        self
    }
}
