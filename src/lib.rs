//! # sceneslim
//!
//! Offline optimizer for imported 3D scenes.
//!
//! This is the umbrella crate: it re-exports the data model from
//! `sceneslim-core`, the scene-level passes from `sceneslim-algorithms` and
//! the per-mesh passes from `sceneslim-simplification`, and ties them together
//! in the [`Optimizer`] pipeline.
//!
//! ## Quick Start
//!
//! ```rust
//! use sceneslim::prelude::*;
//!
//! let mut mesh = Mesh::new();
//! mesh.add_point(0.0, 0.0, 0.0);
//! mesh.add_point(1.0, 0.0, 0.0);
//! mesh.add_point(0.0, 1.0, 0.0);
//! mesh.add_point(1.0, 0.0, 0.0);
//! mesh.add_texcoord(0.0, 0.0);
//! mesh.add_face([0, 0, 1, 0, 2, 0]);
//! mesh.add_face([0, 0, 3, 0, 1, 0]);
//!
//! let mut scene = Scene::new(SceneNode::group(vec![SceneNode::mesh(mesh)]));
//! let report = Optimizer::new(OptimizerConfig::default())
//!     .with_sink(NullSink)
//!     .optimize(&mut scene)
//!     .unwrap();
//!
//! assert_eq!(report.dedup.points_after, 3);
//! assert_eq!(report.degenerate.same_index, 1);
//! ```
//!
//! ## Feature Flags
//!
//! - `default`: Enables algorithms and simplification
//! - `algorithms`: Timeline reduction, transform pruning, group flattening
//! - `simplification`: Geometry dedup, degenerate faces, smoothing groups
//!
//! The [`Optimizer`] needs both.

// Re-export core functionality
pub use sceneslim_core::*;

// Re-export sub-crates
#[cfg(feature = "algorithms")]
pub use sceneslim_algorithms as algorithms;

#[cfg(feature = "simplification")]
pub use sceneslim_simplification as simplification;

#[cfg(all(feature = "algorithms", feature = "simplification"))]
pub mod optimizer;
#[cfg(all(feature = "algorithms", feature = "simplification"))]
pub mod report;

#[cfg(all(feature = "algorithms", feature = "simplification"))]
pub use optimizer::{Optimizer, OptimizerConfig};
#[cfg(all(feature = "algorithms", feature = "simplification"))]
pub use report::{NullSink, OptimizationReport, ReportSink, TracingSink};

/// Convenient imports for common use cases
pub mod prelude {
    pub use sceneslim_core::{
        validate_mesh, validate_scene, CallbackMarker, Error, Interpolation, KeyFrame, KeyValue, Mesh,
        NodeContent, NodeId, PropertyLookup, PropertyTarget, Result, Scene, SceneNode, StructuralFault,
        Timeline, Transform, TransformId, TransformIndex, TransformKind, TransformProperty,
    };

    #[cfg(feature = "algorithms")]
    pub use sceneslim_algorithms::{
        prune_scene, reduce_timeline, sample, PruneOptions, PruneOutcome, PruneStats, TimelineOptions,
        TimelineReduction, TimelineStats,
    };

    #[cfg(feature = "simplification")]
    pub use sceneslim_simplification::{
        dedup_mesh, remove_degenerate_faces, remove_unreferenced, DedupStats, DegenerateFilter,
        DegenerateReason, DegenerateStats, Deduplicator, MeshPass, SmoothingGroupSolver,
    };

    #[cfg(all(feature = "algorithms", feature = "simplification"))]
    pub use crate::{NullSink, OptimizationReport, Optimizer, OptimizerConfig, ReportSink, TracingSink};
}
