//! Flat-array triangle mesh as produced by scene importers

use crate::point::{Point3f, Vector3f};
use serde::{Deserialize, Serialize};

/// Number of `f32`s per point.
pub const POINT_SIZE: usize = 3;
/// Number of `f32`s per texture coordinate.
pub const TEXCOORD_SIZE: usize = 2;
/// Number of indices per triangle: three (point, texcoord) pairs.
pub const FACE_SIZE: usize = 6;

/// A triangle mesh stored as flat arrays.
///
/// `faces` holds, per triangle, `p0 t0 p1 t1 p2 t2` where `p*` index into
/// `points` (in units of whole points) and `t*` into `texcoords`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    pub points: Vec<f32>,
    pub texcoords: Vec<f32>,
    pub faces: Vec<u32>,
    pub face_smoothing_groups: Option<Vec<i32>>,
}

impl Mesh {
    /// Create a new empty mesh
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mesh from its flat arrays
    pub fn from_arrays(points: Vec<f32>, texcoords: Vec<f32>, faces: Vec<u32>) -> Self {
        Self {
            points,
            texcoords,
            faces,
            face_smoothing_groups: None,
        }
    }

    /// Get the number of points
    pub fn point_count(&self) -> usize {
        self.points.len() / POINT_SIZE
    }

    /// Get the number of texture coordinates
    pub fn texcoord_count(&self) -> usize {
        self.texcoords.len() / TEXCOORD_SIZE
    }

    /// Get the number of triangles
    pub fn face_count(&self) -> usize {
        self.faces.len() / FACE_SIZE
    }

    /// Check if the mesh is empty
    pub fn is_empty(&self) -> bool {
        self.points.is_empty() || self.faces.is_empty()
    }

    /// Add a point, returning its index
    pub fn add_point(&mut self, x: f32, y: f32, z: f32) -> u32 {
        let index = self.point_count() as u32;
        self.points.extend_from_slice(&[x, y, z]);
        index
    }

    /// Add a texture coordinate, returning its index
    pub fn add_texcoord(&mut self, u: f32, v: f32) -> u32 {
        let index = self.texcoord_count() as u32;
        self.texcoords.extend_from_slice(&[u, v]);
        index
    }

    /// Add a triangle given as `[p0, t0, p1, t1, p2, t2]`
    pub fn add_face(&mut self, face: [u32; FACE_SIZE]) {
        self.faces.extend_from_slice(&face);
    }

    /// Raw coordinates of a point
    pub fn point_slice(&self, index: usize) -> &[f32] {
        &self.points[index * POINT_SIZE..(index + 1) * POINT_SIZE]
    }

    /// Point position as a nalgebra point
    pub fn point(&self, index: usize) -> Point3f {
        let p = self.point_slice(index);
        Point3f::new(p[0], p[1], p[2])
    }

    /// Raw coordinates of a texture coordinate
    pub fn texcoord_slice(&self, index: usize) -> &[f32] {
        &self.texcoords[index * TEXCOORD_SIZE..(index + 1) * TEXCOORD_SIZE]
    }

    /// The six indices of a triangle
    pub fn face(&self, index: usize) -> &[u32] {
        &self.faces[index * FACE_SIZE..(index + 1) * FACE_SIZE]
    }

    /// The three point indices of a triangle
    pub fn face_points(&self, index: usize) -> [u32; 3] {
        let f = self.face(index);
        [f[0], f[2], f[4]]
    }

    /// Calculate per-face normals (unit length, or NaN for zero-area faces)
    pub fn calculate_face_normals(&self) -> Vec<Vector3f> {
        (0..self.face_count())
            .map(|i| {
                let [a, b, c] = self.face_points(i);
                let v0 = self.point(a as usize);
                let v1 = self.point(b as usize);
                let v2 = self.point(c as usize);
                (v1 - v0).cross(&(v2 - v0)).normalize()
            })
            .collect()
    }

    /// Clear the mesh
    pub fn clear(&mut self) {
        self.points.clear();
        self.texcoords.clear();
        self.faces.clear();
        self.face_smoothing_groups = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_quad() -> Mesh {
        let mut mesh = Mesh::new();
        mesh.add_point(0.0, 0.0, 0.0);
        mesh.add_point(1.0, 0.0, 0.0);
        mesh.add_point(1.0, 1.0, 0.0);
        mesh.add_point(0.0, 1.0, 0.0);
        mesh.add_texcoord(0.0, 0.0);
        mesh.add_face([0, 0, 1, 0, 2, 0]);
        mesh.add_face([0, 0, 2, 0, 3, 0]);
        mesh
    }

    #[test]
    fn test_counts() {
        let mesh = make_quad();
        assert_eq!(mesh.point_count(), 4);
        assert_eq!(mesh.texcoord_count(), 1);
        assert_eq!(mesh.face_count(), 2);
        assert!(!mesh.is_empty());
        assert_eq!(mesh.face_points(1), [0, 2, 3]);
        assert_eq!(mesh.point(2), Point3f::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn test_face_normals() {
        let normals = make_quad().calculate_face_normals();
        assert_eq!(normals.len(), 2);
        for n in normals {
            assert_eq!(n, Vector3f::new(0.0, 0.0, 1.0));
        }
    }

    #[test]
    fn test_clear() {
        let mut mesh = make_quad();
        mesh.face_smoothing_groups = Some(vec![1, 1]);
        mesh.clear();
        assert!(mesh.is_empty());
        assert_eq!(mesh.face_smoothing_groups, None);
    }
}
