//! Optimization report and where it goes

use sceneslim_algorithms::{PruneStats, TimelineStats};
use sceneslim_simplification::{DedupStats, DegenerateStats};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::info;

/// Everything one [`Optimizer::optimize`](crate::Optimizer::optimize) run changed
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OptimizationReport {
    /// `None` when the scene had no timeline or timeline reduction was off.
    pub timeline: Option<TimelineStats>,
    pub bound_transforms: usize,
    pub prune: PruneStats,
    /// Mesh leaves processed.
    pub meshes: usize,
    pub dedup: DedupStats,
    pub degenerate: DegenerateStats,
    pub unreferenced_points: usize,
    pub unreferenced_texcoords: usize,
}

/// Share of `whole` that `part` represents, in percent
fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 * 100.0 / whole as f64
    }
}

impl OptimizationReport {
    /// Points left after every mesh pass
    pub fn points_after(&self) -> usize {
        self.dedup.points_after - self.unreferenced_points
    }

    pub fn texcoords_after(&self) -> usize {
        self.dedup.texcoords_after - self.unreferenced_texcoords
    }

    /// Percentage of points removed across all meshes
    pub fn point_reduction(&self) -> f64 {
        percent(self.dedup.points_before - self.points_after(), self.dedup.points_before)
    }

    /// Percentage of texture coordinates removed across all meshes
    pub fn texcoord_reduction(&self) -> f64 {
        percent(
            self.dedup.texcoords_before - self.texcoords_after(),
            self.dedup.texcoords_before,
        )
    }

    /// Percentage of triangles removed across all meshes
    pub fn face_reduction(&self) -> f64 {
        percent(self.degenerate.removed(), self.degenerate.faces_before)
    }
}

impl fmt::Display for OptimizationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(timeline) = &self.timeline {
            writeln!(
                f,
                "timeline: {} of {} key values removed ({:.1}%), {} of {} keyframes removed, {} kept for callbacks",
                timeline.key_values_removed,
                timeline.key_values_before,
                percent(timeline.key_values_removed, timeline.key_values_before),
                timeline.key_frames_removed,
                timeline.key_frames_before,
                timeline.callback_frames_kept
            )?;
            writeln!(f, "  {} key values switched to discrete", timeline.key_values_discretized)?;
        }
        writeln!(
            f,
            "transforms: {} of {} removed, {} bound, {} merge opportunities",
            self.prune.transforms_removed,
            self.prune.transforms_total,
            self.bound_transforms,
            self.prune.merge_opportunities
        )?;
        writeln!(
            f,
            "groups: {} of {} flattened",
            self.prune.groups_flattened, self.prune.groups_total
        )?;
        writeln!(f, "meshes: {}", self.meshes)?;
        writeln!(
            f,
            "  points: {} -> {} ({:.1}% removed)",
            self.dedup.points_before,
            self.points_after(),
            self.point_reduction()
        )?;
        writeln!(
            f,
            "  texcoords: {} -> {} ({:.1}% removed)",
            self.dedup.texcoords_before,
            self.texcoords_after(),
            self.texcoord_reduction()
        )?;
        write!(
            f,
            "  faces: {} -> {} ({:.1}% removed: {} same index, {} same point, {} small area)",
            self.degenerate.faces_before,
            self.degenerate.faces_after(),
            self.face_reduction(),
            self.degenerate.same_index,
            self.degenerate.same_point,
            self.degenerate.small_area
        )
    }
}

/// Receives the report at the end of every optimization run
pub trait ReportSink {
    fn report(&self, report: &OptimizationReport);
}

/// Emits the report as `tracing` events at info level
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl ReportSink for TracingSink {
    fn report(&self, report: &OptimizationReport) {
        if let Some(timeline) = &report.timeline {
            info!(
                key_values_before = timeline.key_values_before,
                key_values_removed = timeline.key_values_removed,
                key_frames_before = timeline.key_frames_before,
                key_frames_removed = timeline.key_frames_removed,
                "timeline reduced"
            );
        }
        info!(
            transforms_removed = report.prune.transforms_removed,
            merge_opportunities = report.prune.merge_opportunities,
            groups_flattened = report.prune.groups_flattened,
            "scene graph pruned"
        );
        info!(
            meshes = report.meshes,
            points_before = report.dedup.points_before,
            points_after = report.points_after(),
            texcoords_before = report.dedup.texcoords_before,
            texcoords_after = report.texcoords_after(),
            faces_before = report.degenerate.faces_before,
            faces_after = report.degenerate.faces_after(),
            "geometry optimized"
        );
    }
}

/// Discards the report
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl ReportSink for NullSink {
    fn report(&self, _report: &OptimizationReport) {}
}
