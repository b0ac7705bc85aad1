//! Degenerate triangle removal
//!
//! Runs on already-deduplicated meshes, so "same index" catches every pair of
//! exactly coincident corners that dedup merged, and "same point" only sees
//! coincident corners that survived dedup (e.g. `0.0` vs `-0.0`).

use crate::MeshPass;
use sceneslim_core::{Mesh, PointKey, FACE_SIZE};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::AddAssign;
use tracing::debug;

/// Heron products (squared areas) below this are treated as zero: 2⁻⁴⁰.
pub const MIN_HERON_PRODUCT: f64 = 1.0 / (1u64 << 40) as f64;

/// Why a triangle was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DegenerateReason {
    /// Two corners use the same point index.
    SameIndex,
    /// Two corners resolve to bit-identical positions.
    SamePoint,
    /// The Heron product is below [`MIN_HERON_PRODUCT`].
    SmallArea,
}

impl fmt::Display for DegenerateReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DegenerateReason::SameIndex => write!(f, "same index"),
            DegenerateReason::SamePoint => write!(f, "same point"),
            DegenerateReason::SmallArea => write!(f, "small area"),
        }
    }
}

/// Heron product `p(p-a)(p-b)(p-c)` of a triangle, i.e. its squared area.
pub fn heron_product(p0: &[f32], p1: &[f32], p2: &[f32]) -> f64 {
    let a = distance(p0, p1);
    let b = distance(p1, p2);
    let c = distance(p2, p0);
    let p = (a + b + c) / 2.0;
    p * (p - a) * (p - b) * (p - c)
}

fn distance(u: &[f32], v: &[f32]) -> f64 {
    u.iter()
        .zip(v)
        .map(|(&x, &y)| {
            let d = x as f64 - y as f64;
            d * d
        })
        .sum::<f64>()
        .sqrt()
}

/// Classify triangle `face` of `mesh`; `None` means it is kept.
pub fn classify_face(mesh: &Mesh, face: usize) -> Option<DegenerateReason> {
    let [i0, i1, i2] = mesh.face_points(face);
    if i0 == i1 || i1 == i2 || i2 == i0 {
        return Some(DegenerateReason::SameIndex);
    }

    let p0 = mesh.point_slice(i0 as usize);
    let p1 = mesh.point_slice(i1 as usize);
    let p2 = mesh.point_slice(i2 as usize);
    let (k0, k1, k2) = (PointKey::new(p0), PointKey::new(p1), PointKey::new(p2));
    if k0 == k1 || k1 == k2 || k2 == k0 {
        return Some(DegenerateReason::SamePoint);
    }

    if heron_product(p0, p1, p2) < MIN_HERON_PRODUCT {
        return Some(DegenerateReason::SmallArea);
    }
    None
}

/// Counts of rejected triangles by reason
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DegenerateStats {
    pub faces_before: usize,
    pub same_index: usize,
    pub same_point: usize,
    pub small_area: usize,
}

impl DegenerateStats {
    /// Total number of rejected triangles
    pub fn removed(&self) -> usize {
        self.same_index + self.same_point + self.small_area
    }

    pub fn faces_after(&self) -> usize {
        self.faces_before - self.removed()
    }

    fn record(&mut self, reason: DegenerateReason) {
        match reason {
            DegenerateReason::SameIndex => self.same_index += 1,
            DegenerateReason::SamePoint => self.same_point += 1,
            DegenerateReason::SmallArea => self.small_area += 1,
        }
    }
}

impl AddAssign for DegenerateStats {
    fn add_assign(&mut self, rhs: Self) {
        self.faces_before += rhs.faces_before;
        self.same_index += rhs.same_index;
        self.same_point += rhs.same_point;
        self.small_area += rhs.small_area;
    }
}

/// Remove degenerate triangles from `mesh` in place.
///
/// Surviving triangles keep their order; `face_smoothing_groups`, if present,
/// is compacted in step with `faces`.
pub fn remove_degenerate_faces(mesh: &mut Mesh) -> DegenerateStats {
    let face_count = mesh.face_count();
    let mut stats = DegenerateStats {
        faces_before: face_count,
        ..Default::default()
    };

    let mut faces = Vec::with_capacity(mesh.faces.len());
    let mut groups = mesh
        .face_smoothing_groups
        .as_ref()
        .map(|g| Vec::with_capacity(g.len()));

    for face in 0..face_count {
        match classify_face(mesh, face) {
            Some(reason) => stats.record(reason),
            None => {
                faces.extend_from_slice(mesh.face(face));
                if let (Some(kept), Some(source)) = (groups.as_mut(), mesh.face_smoothing_groups.as_ref()) {
                    kept.push(source[face]);
                }
            }
        }
    }

    if stats.removed() > 0 {
        debug_assert_eq!(faces.len(), stats.faces_after() * FACE_SIZE);
        mesh.faces = faces;
        mesh.face_smoothing_groups = groups;
        debug!(
            "removed {} degenerate faces of {} (same index {}, same point {}, small area {})",
            stats.removed(),
            stats.faces_before,
            stats.same_index,
            stats.same_point,
            stats.small_area
        );
    }
    stats
}

/// [`MeshPass`] wrapper around [`remove_degenerate_faces`]
#[derive(Debug, Clone, Copy, Default)]
pub struct DegenerateFilter;

impl MeshPass for DegenerateFilter {
    type Stats = DegenerateStats;

    fn apply(&self, mesh: &mut Mesh) -> DegenerateStats {
        remove_degenerate_faces(mesh)
    }
}
