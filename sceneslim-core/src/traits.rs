//! Core traits for sceneslim

use crate::{
    error::{Error, Result},
    id::TransformId,
    scene::SceneNode,
    timeline::PropertyTarget,
    transform::Transform,
};
use std::collections::HashMap;

/// Resolves animation targets to the live value of the property they drive.
///
/// Only transform-owned properties resolve; any other target is a
/// [`Error::Configuration`] fault.
pub trait PropertyLookup {
    /// Current (pre-animation) value of `target`
    fn live_value(&self, target: &PropertyTarget) -> Result<f64>;
}

/// Snapshot of every transform in a scene subtree, keyed by instance id
#[derive(Debug, Clone, Default)]
pub struct TransformIndex {
    transforms: HashMap<TransformId, Transform>,
}

impl TransformIndex {
    /// Index all transforms reachable from `root`
    pub fn build(root: &SceneNode) -> Self {
        let mut transforms = HashMap::new();
        root.visit(&mut |node| {
            for t in &node.transforms {
                transforms.insert(t.id(), t.clone());
            }
        });
        Self { transforms }
    }

    pub fn get(&self, id: TransformId) -> Option<&Transform> {
        self.transforms.get(&id)
    }

    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }
}

impl PropertyLookup for TransformIndex {
    fn live_value(&self, target: &PropertyTarget) -> Result<f64> {
        match target {
            PropertyTarget::Transform { id, property } => {
                let transform = self
                    .get(*id)
                    .ok_or_else(|| Error::configuration(target, "refers to a transform outside the scene"))?;
                transform
                    .property(*property)
                    .ok_or_else(|| Error::configuration(target, "is not a property of this kind of transform"))
            }
            PropertyTarget::Node { .. } | PropertyTarget::External { .. } => {
                Err(Error::configuration(target, "is not owned by a transform"))
            }
        }
    }
}

impl PropertyLookup for SceneNode {
    fn live_value(&self, target: &PropertyTarget) -> Result<f64> {
        match target {
            PropertyTarget::Transform { id, property } => self
                .find_transform(*id)
                .ok_or_else(|| Error::configuration(target, "refers to a transform outside the scene"))?
                .property(*property)
                .ok_or_else(|| Error::configuration(target, "is not a property of this kind of transform")),
            PropertyTarget::Node { .. } | PropertyTarget::External { .. } => {
                Err(Error::configuration(target, "is not owned by a transform"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::TransformProperty;

    #[test]
    fn test_index_resolves_transform_properties() {
        let t = Transform::translate(4.0, 5.0, 6.0);
        let id = t.id();
        let root = SceneNode::group(vec![SceneNode::empty().with_transform(t)]);
        let index = TransformIndex::build(&root);

        assert_eq!(index.len(), 1);
        let target = PropertyTarget::transform(id, TransformProperty::Z);
        assert_eq!(index.live_value(&target), Ok(6.0));
        assert_eq!(root.live_value(&target), Ok(6.0));
    }

    #[test]
    fn test_unresolvable_targets_are_configuration_faults() {
        let root = SceneNode::group(vec![SceneNode::empty().with_transform(Transform::scale(2.0, 2.0, 2.0))]);
        let index = TransformIndex::build(&root);

        let missing = PropertyTarget::transform(TransformId::fresh(), TransformProperty::X);
        assert!(index.live_value(&missing).unwrap_err().is_configuration());

        let node = PropertyTarget::Node {
            id: root.id(),
            property: "opacity".into(),
        };
        assert!(index.live_value(&node).unwrap_err().is_configuration());
        assert!(root.live_value(&node).unwrap_err().is_configuration());

        let scale_id = root.children()[0].transforms[0].id();
        let wrong_property = PropertyTarget::transform(scale_id, TransformProperty::Angle);
        assert!(index.live_value(&wrong_property).unwrap_err().is_configuration());
    }
}
