//! Mesh-level optimization passes
//!
//! This crate provides the per-mesh passes of the scene optimizer:
//! - Exact-value deduplication of points and texture coordinates
//! - Degenerate triangle removal
//! - Unreferenced point/texcoord compaction
//! - Smoothing group computation from per-vertex normals

// Library code propagates or reports; tests may unwrap.
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

pub mod dedup;
pub mod degenerate;
pub mod smoothing;

pub use dedup::*;
pub use degenerate::*;
pub use smoothing::*;

use sceneslim_core::Mesh;

/// An in-place pass over a single mesh
pub trait MeshPass {
    /// Counts describing what the pass changed
    type Stats;

    /// Rewrite `mesh` in place and report what changed
    fn apply(&self, mesh: &mut Mesh) -> Self::Stats;
}
