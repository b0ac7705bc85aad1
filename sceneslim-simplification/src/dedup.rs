//! Exact-value deduplication of mesh points and texture coordinates
//!
//! Points (and, independently, texture coordinates) that are bit-for-bit
//! identical are collapsed onto the first occurrence, and every face index is
//! rewritten through the resulting old-to-new table. No tolerance is applied:
//! `1.0` and `1.0 + f32::EPSILON` stay distinct, as do `0.0` and `-0.0`.

use crate::MeshPass;
use sceneslim_core::{Mesh, PointKey, TexCoordKey, POINT_SIZE, TEXCOORD_SIZE};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::hash::Hash;
use std::ops::AddAssign;
use tracing::debug;

/// Result of compacting one flat array
#[derive(Debug, Clone, PartialEq)]
pub struct Compaction {
    /// Unique entries in first-occurrence order.
    pub values: Vec<f32>,
    /// `remap[old_index]` is the entry's index in `values`.
    pub remap: Vec<u32>,
}

impl Compaction {
    /// Whether every entry was already unique
    pub fn is_identity(&self) -> bool {
        self.remap.iter().enumerate().all(|(i, &j)| i as u32 == j)
    }
}

/// Compact a flat array of `width`-sized tuples by exact key
pub fn compact_by_key<K, F>(values: &[f32], width: usize, key: F) -> Compaction
where
    K: Hash + Eq,
    F: Fn(&[f32]) -> K,
{
    let count = values.len() / width;
    let mut seen: HashMap<K, u32> = HashMap::with_capacity(count);
    let mut compacted = Vec::with_capacity(values.len());
    let mut remap = Vec::with_capacity(count);

    for tuple in values.chunks_exact(width) {
        let next = (compacted.len() / width) as u32;
        let index = *seen.entry(key(tuple)).or_insert_with(|| {
            compacted.extend_from_slice(tuple);
            next
        });
        remap.push(index);
    }

    Compaction {
        values: compacted,
        remap,
    }
}

/// Compact a flat point array (3 floats per point)
pub fn compact_points(points: &[f32]) -> Compaction {
    compact_by_key(points, POINT_SIZE, PointKey::new)
}

/// Compact a flat texture coordinate array (2 floats per entry)
pub fn compact_texcoords(texcoords: &[f32]) -> Compaction {
    compact_by_key(texcoords, TEXCOORD_SIZE, TexCoordKey::new)
}

/// Rewrite one component of every (point, texcoord) pair in `faces`.
///
/// `component` is 0 for point indices, 1 for texcoord indices.
fn reindex_faces(faces: &mut [u32], component: usize, remap: &[u32]) {
    for pair in faces.chunks_exact_mut(2) {
        pair[component] = remap[pair[component] as usize];
    }
}

/// What deduplication changed in one or more meshes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DedupStats {
    pub points_before: usize,
    pub points_after: usize,
    pub texcoords_before: usize,
    pub texcoords_after: usize,
}

impl DedupStats {
    pub fn duplicate_points(&self) -> usize {
        self.points_before - self.points_after
    }

    pub fn duplicate_texcoords(&self) -> usize {
        self.texcoords_before - self.texcoords_after
    }
}

impl AddAssign for DedupStats {
    fn add_assign(&mut self, rhs: Self) {
        self.points_before += rhs.points_before;
        self.points_after += rhs.points_after;
        self.texcoords_before += rhs.texcoords_before;
        self.texcoords_after += rhs.texcoords_after;
    }
}

/// Deduplicate points and texture coordinates of `mesh` in place.
///
/// Faces keep their order and count; only their indices change.
pub fn dedup_mesh(mesh: &mut Mesh) -> DedupStats {
    let points = compact_points(&mesh.points);
    let texcoords = compact_texcoords(&mesh.texcoords);

    let stats = DedupStats {
        points_before: mesh.point_count(),
        points_after: points.values.len() / POINT_SIZE,
        texcoords_before: mesh.texcoord_count(),
        texcoords_after: texcoords.values.len() / TEXCOORD_SIZE,
    };

    if !points.is_identity() {
        reindex_faces(&mut mesh.faces, 0, &points.remap);
    }
    if !texcoords.is_identity() {
        reindex_faces(&mut mesh.faces, 1, &texcoords.remap);
    }
    mesh.points = points.values;
    mesh.texcoords = texcoords.values;

    debug!(
        "dedup: points {} -> {}, texcoords {} -> {}",
        stats.points_before, stats.points_after, stats.texcoords_before, stats.texcoords_after
    );
    stats
}

/// Drop points and texture coordinates that no face references.
///
/// Surviving entries keep their relative order. Returns
/// `(points_removed, texcoords_removed)`.
pub fn remove_unreferenced(mesh: &mut Mesh) -> (usize, usize) {
    let points_removed = retain_referenced(&mut mesh.points, POINT_SIZE, &mut mesh.faces, 0);
    let texcoords_removed = retain_referenced(&mut mesh.texcoords, TEXCOORD_SIZE, &mut mesh.faces, 1);
    if points_removed + texcoords_removed > 0 {
        debug!(
            "removed {} unreferenced points and {} unreferenced texcoords",
            points_removed, texcoords_removed
        );
    }
    (points_removed, texcoords_removed)
}

fn retain_referenced(values: &mut Vec<f32>, width: usize, faces: &mut [u32], component: usize) -> usize {
    const UNUSED: u32 = u32::MAX;

    let count = values.len() / width;
    let mut remap = vec![UNUSED; count];
    for pair in faces.chunks_exact(2) {
        remap[pair[component] as usize] = 0;
    }

    let mut kept = Vec::with_capacity(values.len());
    for (old, tuple) in values.chunks_exact(width).enumerate() {
        if remap[old] != UNUSED {
            remap[old] = (kept.len() / width) as u32;
            kept.extend_from_slice(tuple);
        }
    }

    let removed = count - kept.len() / width;
    if removed > 0 {
        reindex_faces(faces, component, &remap);
        *values = kept;
    }
    removed
}

/// [`MeshPass`] wrapper around [`dedup_mesh`]
#[derive(Debug, Clone, Copy, Default)]
pub struct Deduplicator;

impl MeshPass for Deduplicator {
    type Stats = DedupStats;

    fn apply(&self, mesh: &mut Mesh) -> DedupStats {
        dedup_mesh(mesh)
    }
}
