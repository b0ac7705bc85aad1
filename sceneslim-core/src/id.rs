//! Identity handles for scene entities
//!
//! The optimizer reasons about *instances*: two transforms with equal values
//! are still different transforms if they were created separately. Every node
//! and transform therefore carries an id allocated once at construction.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

fn fresh() -> u64 {
    NEXT_ID.fetch_add(1, Ordering::Relaxed)
}

/// Read a raw id and move the allocator past it, so ids handed out after
/// loading a scene never collide with the loaded ones.
fn observe<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    let raw = u64::deserialize(deserializer)?;
    NEXT_ID.fetch_max(raw.saturating_add(1), Ordering::Relaxed);
    Ok(raw)
}

/// Identity of a [`SceneNode`](crate::SceneNode).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NodeId(u64);

impl<'de> Deserialize<'de> for NodeId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        observe(deserializer).map(Self)
    }
}

impl NodeId {
    pub fn fresh() -> Self {
        Self(fresh())
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

/// Identity of a [`Transform`](crate::Transform).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct TransformId(u64);

impl<'de> Deserialize<'de> for TransformId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        observe(deserializer).map(Self)
    }
}

impl TransformId {
    pub fn fresh() -> Self {
        Self(fresh())
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TransformId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "transform#{}", self.0)
    }
}
