//! Point types and exact-value keys

use nalgebra::{Point3, Vector3};

/// A 3D point with floating point coordinates
pub type Point3f = Point3<f32>;

/// A 3D vector with floating point components
pub type Vector3f = Vector3<f32>;

/// Bit pattern of a 3-component point, usable as an exact hash key.
///
/// Two keys are equal iff every component has the same IEEE-754 bit pattern,
/// so `0.0` and `-0.0` are distinct and a NaN only matches the identical NaN.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PointKey(pub [u32; 3]);

impl PointKey {
    pub fn new(coords: &[f32]) -> Self {
        Self([coords[0].to_bits(), coords[1].to_bits(), coords[2].to_bits()])
    }
}

/// Bit pattern of a 2-component texture coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TexCoordKey(pub [u32; 2]);

impl TexCoordKey {
    pub fn new(coords: &[f32]) -> Self {
        Self([coords[0].to_bits(), coords[1].to_bits()])
    }
}

/// Exact equality of two scalar values by bit pattern.
#[inline]
pub fn same_bits(a: f64, b: f64) -> bool {
    a.to_bits() == b.to_bits()
}
