//! Smoothing groups from per-vertex normals
//!
//! Faces that share a manifold edge whose endpoint normals agree (within a
//! small angle) are smooth neighbours. Connected components of that relation
//! with at least two faces become smoothing groups, encoded as single bits.

use itertools::Itertools;
use sceneslim_core::{Error, Mesh, Result, Vector3f};
use std::collections::{HashMap, VecDeque};
use tracing::debug;

/// Normal component value marking a normal that must never be smoothed across.
pub const LOCKED_NORMAL: f32 = 1.0e20;

/// Default maximum angle, in degrees, between normals on a smooth edge.
pub const DEFAULT_SMOOTHING_ANGLE: f32 = 2.0;

/// Number of distinct smoothing-group bits before the counter wraps.
pub const GROUP_SLOTS: u32 = 32;

/// Whether `normal` is the locked sentinel
pub fn is_locked(normal: &Vector3f) -> bool {
    normal.iter().any(|&c| c == LOCKED_NORMAL)
}

/// Edge identity: unordered vertex pair plus unordered normal-index pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct EdgeKey {
    from: u32,
    to: u32,
    from_normal: u32,
    to_normal: u32,
}

impl EdgeKey {
    fn new(from: u32, to: u32, from_normal: u32, to_normal: u32) -> Self {
        Self {
            from: from.min(to),
            to: from.max(to),
            from_normal: from_normal.min(to_normal),
            to_normal: from_normal.max(to_normal),
        }
    }
}

/// One face's view of an edge: its endpoints and their normal indices, in the
/// face's winding order.
#[derive(Debug, Clone, Copy)]
struct FaceEdge {
    face: usize,
    vertices: [u32; 2],
    normals: [u32; 2],
}

/// Computes smoothing groups for polygon faces
#[derive(Debug, Clone, Copy)]
pub struct SmoothingGroupSolver {
    cos_threshold: f32,
}

impl Default for SmoothingGroupSolver {
    fn default() -> Self {
        Self::with_angle(DEFAULT_SMOOTHING_ANGLE)
    }
}

impl SmoothingGroupSolver {
    /// Solver treating normals within `degrees` of each other as equal
    pub fn with_angle(degrees: f32) -> Self {
        Self {
            cos_threshold: degrees.to_radians().cos(),
        }
    }

    pub fn cos_threshold(&self) -> f32 {
        self.cos_threshold
    }

    /// Whether two normals are close enough to smooth across
    pub fn normals_match(&self, n1: &Vector3f, n2: &Vector3f) -> bool {
        if is_locked(n1) || is_locked(n2) {
            return false;
        }
        n1.normalize().dot(&n2.normalize()) >= self.cos_threshold
    }

    /// Compute one smoothing group per face.
    ///
    /// `faces[i]` is the flat `v0 t0 v1 t1 ...` list of polygon `i`;
    /// `face_normals[i]` holds one index into `normals` per vertex of that
    /// polygon.
    pub fn solve(&self, faces: &[Vec<u32>], face_normals: &[Vec<u32>], normals: &[Vector3f]) -> Result<Vec<i32>> {
        if faces.len() != face_normals.len() {
            return Err(Error::InvalidData(format!(
                "{} faces but {} face normal lists",
                faces.len(),
                face_normals.len()
            )));
        }

        let adjacency = self.build_adjacency(faces, face_normals, normals)?;
        Ok(assign_groups(&adjacency))
    }

    /// Smooth-edge adjacency list per face
    fn build_adjacency(
        &self,
        faces: &[Vec<u32>],
        face_normals: &[Vec<u32>],
        normals: &[Vector3f],
    ) -> Result<Vec<Vec<usize>>> {
        let mut edges: HashMap<EdgeKey, Vec<FaceEdge>> = HashMap::new();

        for (face, (indices, normal_indices)) in faces.iter().zip(face_normals).enumerate() {
            let arity = indices.len() / 2;
            if indices.len() % 2 != 0 || normal_indices.len() != arity {
                return Err(Error::InvalidData(format!(
                    "face {} has {} indices but {} normals",
                    face,
                    indices.len(),
                    normal_indices.len()
                )));
            }
            if let Some(&bad) = normal_indices.iter().find(|&&n| n as usize >= normals.len()) {
                return Err(Error::InvalidData(format!(
                    "face {} references normal {} (table has {})",
                    face,
                    bad,
                    normals.len()
                )));
            }

            let vertices = indices.iter().step_by(2).copied();
            let corners: Vec<(u32, u32)> = vertices.zip(normal_indices.iter().copied()).collect();
            for ((v0, n0), (v1, n1)) in corners.iter().copied().circular_tuple_windows() {
                edges
                    .entry(EdgeKey::new(v0, v1, n0, n1))
                    .or_default()
                    .push(FaceEdge {
                        face,
                        vertices: [v0, v1],
                        normals: [n0, n1],
                    });
            }
        }

        let mut adjacency = vec![Vec::new(); faces.len()];
        let mut manifold = 0usize;
        let mut smooth = 0usize;
        for shared in edges.values() {
            // Boundary and non-manifold edges never carry continuity.
            let [a, b] = shared.as_slice() else {
                continue;
            };
            manifold += 1;
            if self.is_smooth(a, b, normals) {
                smooth += 1;
                adjacency[a.face].push(b.face);
                adjacency[b.face].push(a.face);
            }
        }

        debug!(
            "smoothing: {} faces, {} edges, {} manifold, {} smooth",
            faces.len(),
            edges.len(),
            manifold,
            smooth
        );
        Ok(adjacency)
    }

    /// Compare endpoint normals of two face-edges in both correspondences.
    fn is_smooth(&self, a: &FaceEdge, b: &FaceEdge, normals: &[Vector3f]) -> bool {
        let n = |i: u32| &normals[i as usize];
        let (a0, a1) = if a.vertices[0] <= a.vertices[1] {
            (a.normals[0], a.normals[1])
        } else {
            (a.normals[1], a.normals[0])
        };
        let (b0, b1) = if b.vertices[0] <= b.vertices[1] {
            (b.normals[0], b.normals[1])
        } else {
            (b.normals[1], b.normals[0])
        };

        let direct = self.normals_match(n(a0), n(b0)) && self.normals_match(n(a1), n(b1));
        let swapped = self.normals_match(n(a0), n(b1)) && self.normals_match(n(a1), n(b0));
        direct || swapped
    }

    /// Compute smoothing groups for a triangle mesh and store them on it.
    ///
    /// `face_normals` holds three normal indices per triangle, in corner order.
    pub fn apply_to_mesh(&self, mesh: &mut Mesh, face_normals: &[u32], normals: &[Vector3f]) -> Result<()> {
        if face_normals.len() != mesh.face_count() * 3 {
            return Err(Error::InvalidData(format!(
                "{} normal indices for {} triangles",
                face_normals.len(),
                mesh.face_count()
            )));
        }
        let faces: Vec<Vec<u32>> = (0..mesh.face_count()).map(|i| mesh.face(i).to_vec()).collect();
        let per_face: Vec<Vec<u32>> = face_normals.chunks_exact(3).map(<[u32]>::to_vec).collect();
        mesh.face_smoothing_groups = Some(self.solve(&faces, &per_face, normals)?);
        Ok(())
    }
}

/// Label connected components by breadth-first search.
///
/// Singletons get 0; larger components get `1 << slot` with `slot` cycling
/// through [`GROUP_SLOTS`] values, so groups beyond the 32nd reuse bits.
fn assign_groups(adjacency: &[Vec<usize>]) -> Vec<i32> {
    let mut groups = vec![0i32; adjacency.len()];
    let mut visited = vec![false; adjacency.len()];
    let mut queue = VecDeque::new();
    let mut component = Vec::new();
    let mut slot = 0u32;
    let mut multi_face_groups = 0usize;

    for start in 0..adjacency.len() {
        if visited[start] {
            continue;
        }
        visited[start] = true;
        queue.push_back(start);
        component.clear();

        while let Some(face) = queue.pop_front() {
            component.push(face);
            for &next in &adjacency[face] {
                if !visited[next] {
                    visited[next] = true;
                    queue.push_back(next);
                }
            }
        }

        if component.len() > 1 {
            let bit = (1u32 << slot) as i32;
            for &face in &component {
                groups[face] = bit;
            }
            multi_face_groups += 1;
            slot = (slot + 1) % GROUP_SLOTS;
        }
    }

    debug!("smoothing: {} multi-face groups", multi_face_groups);
    groups
}

/// Compute smoothing groups with the default 2° tolerance
pub fn calc_smoothing_groups(faces: &[Vec<u32>], face_normals: &[Vec<u32>], normals: &[Vector3f]) -> Result<Vec<i32>> {
    SmoothingGroupSolver::default().solve(faces, face_normals, normals)
}
