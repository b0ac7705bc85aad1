//! The optimization pipeline
//!
//! Order matters: the timeline is reduced first because pruning must know
//! which transforms it drives, and each mesh is deduplicated before degenerate
//! faces are filtered, since "same index" is only meaningful once coincident
//! points share an index.

use crate::report::{OptimizationReport, ReportSink, TracingSink};
use sceneslim_algorithms::{bound_transforms, prune_scene, reduce_timeline, PruneOptions, TimelineOptions};
use sceneslim_core::{Mesh, NodeId, Result, Scene, TransformIndex};
use sceneslim_simplification::{remove_unreferenced, DegenerateFilter, Deduplicator, MeshPass};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

/// Which passes run and how
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    /// Rewrite surviving key values to discrete interpolation.
    pub downgrade_to_discrete: bool,
    /// Drop identity transforms not driven by the timeline.
    pub prune_transforms: bool,
    pub flatten_groups: bool,
    pub dedup_geometry: bool,
    pub remove_degenerate: bool,
    /// Drop points and texcoords no face references.
    pub remove_unreferenced: bool,
    pub optimize_timeline: bool,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            downgrade_to_discrete: true,
            prune_transforms: true,
            flatten_groups: true,
            dedup_geometry: true,
            remove_degenerate: true,
            remove_unreferenced: false,
            optimize_timeline: true,
        }
    }
}

impl OptimizerConfig {
    pub fn with_downgrade_to_discrete(mut self, enabled: bool) -> Self {
        self.downgrade_to_discrete = enabled;
        self
    }

    pub fn with_prune_transforms(mut self, enabled: bool) -> Self {
        self.prune_transforms = enabled;
        self
    }

    pub fn with_flatten_groups(mut self, enabled: bool) -> Self {
        self.flatten_groups = enabled;
        self
    }

    pub fn with_dedup_geometry(mut self, enabled: bool) -> Self {
        self.dedup_geometry = enabled;
        self
    }

    pub fn with_remove_degenerate(mut self, enabled: bool) -> Self {
        self.remove_degenerate = enabled;
        self
    }

    pub fn with_remove_unreferenced(mut self, enabled: bool) -> Self {
        self.remove_unreferenced = enabled;
        self
    }

    pub fn with_optimize_timeline(mut self, enabled: bool) -> Self {
        self.optimize_timeline = enabled;
        self
    }
}

/// Runs every enabled pass over a scene and reports what changed
pub struct Optimizer {
    config: OptimizerConfig,
    sink: Box<dyn ReportSink>,
}

impl Default for Optimizer {
    fn default() -> Self {
        Self::new(OptimizerConfig::default())
    }
}

impl Optimizer {
    /// Create an optimizer reporting through [`TracingSink`]
    pub fn new(config: OptimizerConfig) -> Self {
        Self {
            config,
            sink: Box::new(TracingSink),
        }
    }

    /// Send reports to `sink` instead
    pub fn with_sink(mut self, sink: impl ReportSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    /// Optimize `scene` in place.
    ///
    /// Fails with a configuration fault, leaving the scene untouched, when the
    /// timeline animates anything other than a transform in the scene.
    pub fn optimize(&self, scene: &mut Scene) -> Result<OptimizationReport> {
        let mut report = OptimizationReport::default();

        let bound = match scene.timeline.as_mut() {
            Some(timeline) => {
                let index = TransformIndex::build(&scene.root);
                if self.config.optimize_timeline {
                    let options = TimelineOptions {
                        downgrade_to_discrete: self.config.downgrade_to_discrete,
                    };
                    let reduction = reduce_timeline(timeline, &index, &options)?;
                    report.timeline = Some(reduction.stats);
                    reduction.bound
                } else {
                    bound_transforms(timeline, &index)?.0
                }
            }
            None => HashSet::new(),
        };
        report.bound_transforms = bound.len();

        let options = PruneOptions {
            remove_identity: self.config.prune_transforms,
            flatten: self.config.flatten_groups,
        };
        let outcome = prune_scene(&mut scene.root, &bound, &options);
        report.prune = outcome.stats;

        let meshes: HashSet<NodeId> = outcome.meshes.into_iter().collect();
        scene.root.visit_mut(&mut |node| {
            if !meshes.contains(&node.id()) {
                return;
            }
            let label = node.label();
            if let Some(mesh) = node.mesh_mut() {
                debug!("optimizing mesh {}", label);
                self.optimize_mesh(mesh, &mut report);
            }
        });

        self.sink.report(&report);
        Ok(report)
    }

    fn optimize_mesh(&self, mesh: &mut Mesh, report: &mut OptimizationReport) {
        report.meshes += 1;

        if self.config.dedup_geometry {
            report.dedup += Deduplicator.apply(mesh);
        } else {
            report.dedup.points_before += mesh.point_count();
            report.dedup.points_after += mesh.point_count();
            report.dedup.texcoords_before += mesh.texcoord_count();
            report.dedup.texcoords_after += mesh.texcoord_count();
        }

        if self.config.remove_degenerate {
            report.degenerate += DegenerateFilter.apply(mesh);
        } else {
            report.degenerate.faces_before += mesh.face_count();
        }

        if self.config.remove_unreferenced {
            let (points, texcoords) = remove_unreferenced(mesh);
            report.unreferenced_points += points;
            report.unreferenced_texcoords += texcoords;
        }
    }
}
