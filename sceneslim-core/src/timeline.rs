//! Keyframe animation timeline

use crate::id::{NodeId, TransformId};
use crate::transform::TransformProperty;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of an animatable property: its owner plus which property
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PropertyTarget {
    Transform { id: TransformId, property: TransformProperty },
    /// A property of the node itself (opacity, visibility, ...).
    Node { id: NodeId, property: String },
    /// Anything else an importer could bind to (materials, lights, ...).
    External { owner: String, property: String },
}

impl PropertyTarget {
    /// Target a property of a transform
    pub fn transform(id: TransformId, property: TransformProperty) -> Self {
        PropertyTarget::Transform { id, property }
    }

    /// The owning transform, if the owner is one
    pub fn transform_id(&self) -> Option<TransformId> {
        match self {
            PropertyTarget::Transform { id, .. } => Some(*id),
            _ => None,
        }
    }
}

impl fmt::Display for PropertyTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyTarget::Transform { id, property } => write!(f, "{}.{}", id, property),
            PropertyTarget::Node { id, property } => write!(f, "{}.{}", id, property),
            PropertyTarget::External { owner, property } => write!(f, "{}.{}", owner, property),
        }
    }
}

/// How a value is reached from the previous keyframe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Interpolation {
    /// Linear blend from the previous value.
    Continuous,
    /// Jump to the end value when the keyframe time is reached.
    Discrete,
}

/// Opaque marker for a completion callback attached to a keyframe.
///
/// The optimizer never inspects it; a keyframe carrying one is never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CallbackMarker(pub String);

/// One animated property value at a keyframe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyValue {
    pub target: PropertyTarget,
    pub end_value: f64,
    pub interpolation: Interpolation,
}

impl KeyValue {
    pub fn new(target: PropertyTarget, end_value: f64) -> Self {
        Self {
            target,
            end_value,
            interpolation: Interpolation::Continuous,
        }
    }

    pub fn discrete(target: PropertyTarget, end_value: f64) -> Self {
        Self {
            target,
            end_value,
            interpolation: Interpolation::Discrete,
        }
    }
}

/// A point in time with the values reached at it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyFrame {
    /// Offset from the start of the timeline, in seconds.
    pub time: f64,
    pub name: Option<String>,
    pub on_finished: Option<CallbackMarker>,
    pub values: Vec<KeyValue>,
}

impl KeyFrame {
    pub fn new(time: f64, values: Vec<KeyValue>) -> Self {
        Self {
            time,
            name: None,
            on_finished: None,
            values,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_callback(mut self, marker: CallbackMarker) -> Self {
        self.on_finished = Some(marker);
        self
    }
}

/// Keyframe animation over scene properties.
///
/// Keyframes are stored in import order; consumers that need time order sort
/// a view (see [`Timeline::sorted_indices`]).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    pub key_frames: Vec<KeyFrame>,
}

impl Timeline {
    pub fn new(key_frames: Vec<KeyFrame>) -> Self {
        Self { key_frames }
    }

    /// Indices of `key_frames` in time order, stable for equal times
    pub fn sorted_indices(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.key_frames.len()).collect();
        order.sort_by(|&a, &b| self.key_frames[a].time.total_cmp(&self.key_frames[b].time));
        order
    }

    /// Total number of key values across all keyframes
    pub fn key_value_count(&self) -> usize {
        self.key_frames.iter().map(|kf| kf.values.len()).sum()
    }

    /// Time of the last keyframe, or zero for an empty timeline
    pub fn duration(&self) -> f64 {
        self.key_frames
            .iter()
            .map(|kf| kf.time)
            .fold(0.0, f64::max)
    }

    /// All key values in time order with their keyframe time
    pub fn values_in_time_order(&self) -> impl Iterator<Item = (f64, &KeyValue)> + '_ {
        self.sorted_indices().into_iter().flat_map(move |i| {
            let frame = &self.key_frames[i];
            frame.values.iter().map(move |kv| (frame.time, kv))
        })
    }
}
