//! Transform pruning and group flattening
//!
//! A depth-first walk over the scene graph that drops identity transforms
//! the timeline does not drive, counts runs of static transforms that could be
//! merged, and records plain groups that no longer carry any transform. Those
//! groups are flattened in a second pass once the walk is over, so the tree is
//! never restructured while it is being traversed.

use sceneslim_core::{NodeId, SceneNode, TransformId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info};

/// Knobs for [`prune_scene`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PruneOptions {
    /// Drop identity transforms that are not bound to the timeline.
    pub remove_identity: bool,
    /// Splice transform-less plain groups into their parent group.
    pub flatten: bool,
}

impl Default for PruneOptions {
    fn default() -> Self {
        Self {
            remove_identity: true,
            flatten: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PruneStats {
    pub transforms_total: usize,
    pub transforms_removed: usize,
    /// Adjacent pairs of static transforms on the same node. Reported only.
    pub merge_opportunities: usize,
    pub groups_total: usize,
    pub groups_flattened: usize,
}

/// Result of [`prune_scene`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PruneOutcome {
    pub stats: PruneStats,
    /// Mesh leaves found during the walk, in pre-order.
    pub meshes: Vec<NodeId>,
}

/// What kind of node the walk came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParentKind {
    /// The walk started here; nothing above to splice into.
    None,
    Group,
    Other,
}

struct Walk<'a> {
    bound: &'a HashSet<TransformId>,
    options: &'a PruneOptions,
    stats: PruneStats,
    meshes: Vec<NodeId>,
    candidates: HashSet<NodeId>,
}

impl Walk<'_> {
    fn visit(&mut self, node: &mut SceneNode, parent: ParentKind) {
        self.prune_transforms(node);

        if node.mesh_ref().is_some() {
            self.meshes.push(node.id());
        }

        let kind = if node.is_group() {
            ParentKind::Group
        } else {
            ParentKind::Other
        };
        if let Some(children) = node.children_mut() {
            for child in children.iter_mut() {
                self.visit(child, kind);
            }
        }

        if node.is_group() {
            self.stats.groups_total += 1;
            if self.options.flatten && parent == ParentKind::Group && node.transforms.is_empty() {
                self.candidates.insert(node.id());
            }
        }
    }

    fn prune_transforms(&mut self, node: &mut SceneNode) {
        let bound = self.bound;
        let before = node.transforms.len();
        self.stats.transforms_total += before;

        if self.options.remove_identity {
            node.transforms
                .retain(|t| bound.contains(&t.id()) || !t.is_identity());
            let removed = before - node.transforms.len();
            if removed > 0 {
                debug!("{}: dropped {} identity transforms", node.label(), removed);
                self.stats.transforms_removed += removed;
            }
        }

        let mut run = 0;
        for transform in &node.transforms {
            if bound.contains(&transform.id()) {
                run = 0;
                continue;
            }
            if run > 0 {
                self.stats.merge_opportunities += 1;
            }
            run += 1;
        }
    }
}

/// Replace every candidate below `node` by its children, in place.
///
/// Children are handled before their parent, so a candidate nested in
/// another candidate ends up in the nearest surviving ancestor.
fn splice_candidates(node: &mut SceneNode, candidates: &HashSet<NodeId>) -> usize {
    let Some(children) = node.children_mut() else {
        return 0;
    };

    let mut flattened = 0;
    for child in children.iter_mut() {
        flattened += splice_candidates(child, candidates);
    }

    if children.iter().any(|child| candidates.contains(&child.id())) {
        let previous = std::mem::take(children);
        for mut child in previous {
            if !candidates.contains(&child.id()) {
                children.push(child);
                continue;
            }
            flattened += 1;
            if let Some(grandchildren) = child.children_mut() {
                children.append(grandchildren);
            }
        }
    }
    flattened
}

/// Prune transforms and flatten redundant groups below `root`.
///
/// `bound` holds the transforms driven by the timeline; they are never
/// removed. `root` itself is never flattened away.
pub fn prune_scene(
    root: &mut SceneNode,
    bound: &HashSet<TransformId>,
    options: &PruneOptions,
) -> PruneOutcome {
    let mut walk = Walk {
        bound,
        options,
        stats: PruneStats::default(),
        meshes: Vec::new(),
        candidates: HashSet::new(),
    };
    walk.visit(root, ParentKind::None);

    let mut stats = walk.stats;
    if !walk.candidates.is_empty() {
        stats.groups_flattened = splice_candidates(root, &walk.candidates);
    }

    info!(
        "pruned {} of {} transforms, flattened {} of {} groups, {} merge opportunities, {} meshes",
        stats.transforms_removed,
        stats.transforms_total,
        stats.groups_flattened,
        stats.groups_total,
        stats.merge_opportunities,
        walk.meshes.len()
    );

    PruneOutcome {
        stats,
        meshes: walk.meshes,
    }
}
