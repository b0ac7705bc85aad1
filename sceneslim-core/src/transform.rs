//! Node-scoped transforms and their animatable properties

use crate::id::TransformId;
use nalgebra::{Matrix4, Point3, Translation3, Unit, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The geometric operation a [`Transform`] applies
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TransformKind {
    Translate { x: f64, y: f64, z: f64 },
    /// Rotation by `angle` degrees around `axis`, about `pivot`.
    Rotate { angle: f64, axis: Vector3<f64>, pivot: Point3<f64> },
    Scale { x: f64, y: f64, z: f64, pivot: Point3<f64> },
    Affine(Matrix4<f64>),
}

/// A scalar property of a transform that an animation can drive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransformProperty {
    X,
    Y,
    Z,
    Angle,
    PivotX,
    PivotY,
    PivotZ,
    /// Matrix element of an affine transform.
    Element { row: u8, col: u8 },
}

impl fmt::Display for TransformProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransformProperty::X => write!(f, "x"),
            TransformProperty::Y => write!(f, "y"),
            TransformProperty::Z => write!(f, "z"),
            TransformProperty::Angle => write!(f, "angle"),
            TransformProperty::PivotX => write!(f, "pivotX"),
            TransformProperty::PivotY => write!(f, "pivotY"),
            TransformProperty::PivotZ => write!(f, "pivotZ"),
            TransformProperty::Element { row, col } => write!(f, "m{}{}", row, col),
        }
    }
}

/// A transform instance attached to a scene node.
///
/// Two separately created transforms never compare equal, even with the same
/// [`TransformKind`]; compare `kind` for value equality.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    id: TransformId,
    pub kind: TransformKind,
}

impl Transform {
    /// Wrap a kind in a new transform instance
    pub fn new(kind: TransformKind) -> Self {
        Self {
            id: TransformId::fresh(),
            kind,
        }
    }

    /// Create a translation transformation
    pub fn translate(x: f64, y: f64, z: f64) -> Self {
        Self::new(TransformKind::Translate { x, y, z })
    }

    /// Create a rotation of `angle` degrees around `axis` through the origin
    pub fn rotate(angle: f64, axis: Vector3<f64>) -> Self {
        Self::new(TransformKind::Rotate {
            angle,
            axis,
            pivot: Point3::origin(),
        })
    }

    /// Create a scaling transformation about the origin
    pub fn scale(x: f64, y: f64, z: f64) -> Self {
        Self::new(TransformKind::Scale {
            x,
            y,
            z,
            pivot: Point3::origin(),
        })
    }

    /// Create a transformation from a full matrix
    pub fn affine(matrix: Matrix4<f64>) -> Self {
        Self::new(TransformKind::Affine(matrix))
    }

    /// Create an identity transformation
    pub fn identity() -> Self {
        Self::affine(Matrix4::identity())
    }

    pub fn id(&self) -> TransformId {
        self.id
    }

    /// Check if this is exactly the identity transformation.
    ///
    /// No tolerance is applied: a translation of `1e-30` is not identity.
    pub fn is_identity(&self) -> bool {
        match self.kind {
            TransformKind::Translate { x, y, z } => x == 0.0 && y == 0.0 && z == 0.0,
            TransformKind::Rotate { angle, .. } => angle == 0.0,
            TransformKind::Scale { x, y, z, .. } => x == 1.0 && y == 1.0 && z == 1.0,
            TransformKind::Affine(m) => m == Matrix4::identity(),
        }
    }

    /// Current value of an animatable property, or `None` if this kind of
    /// transform has no such property.
    pub fn property(&self, property: TransformProperty) -> Option<f64> {
        use TransformProperty as P;
        match (&self.kind, property) {
            (TransformKind::Translate { x, .. }, P::X) => Some(*x),
            (TransformKind::Translate { y, .. }, P::Y) => Some(*y),
            (TransformKind::Translate { z, .. }, P::Z) => Some(*z),
            (TransformKind::Rotate { angle, .. }, P::Angle) => Some(*angle),
            (TransformKind::Rotate { pivot, .. }, P::PivotX) => Some(pivot.x),
            (TransformKind::Rotate { pivot, .. }, P::PivotY) => Some(pivot.y),
            (TransformKind::Rotate { pivot, .. }, P::PivotZ) => Some(pivot.z),
            (TransformKind::Scale { x, .. }, P::X) => Some(*x),
            (TransformKind::Scale { y, .. }, P::Y) => Some(*y),
            (TransformKind::Scale { z, .. }, P::Z) => Some(*z),
            (TransformKind::Scale { pivot, .. }, P::PivotX) => Some(pivot.x),
            (TransformKind::Scale { pivot, .. }, P::PivotY) => Some(pivot.y),
            (TransformKind::Scale { pivot, .. }, P::PivotZ) => Some(pivot.z),
            (TransformKind::Affine(m), P::Element { row, col }) if row < 4 && col < 4 => {
                Some(m[(row as usize, col as usize)])
            }
            _ => None,
        }
    }

    /// Homogeneous matrix of this transformation
    pub fn to_matrix(&self) -> Matrix4<f64> {
        match self.kind {
            TransformKind::Translate { x, y, z } => {
                Matrix4::new_translation(&Vector3::new(x, y, z))
            }
            TransformKind::Rotate { angle, axis, pivot } => {
                let rotation = match Unit::try_new(axis, f64::EPSILON) {
                    Some(axis) => UnitQuaternion::from_axis_angle(&axis, angle.to_radians()),
                    None => UnitQuaternion::identity(),
                };
                about_pivot(rotation.to_homogeneous(), pivot)
            }
            TransformKind::Scale { x, y, z, pivot } => {
                about_pivot(Matrix4::new_nonuniform_scaling(&Vector3::new(x, y, z)), pivot)
            }
            TransformKind::Affine(m) => m,
        }
    }
}

fn about_pivot(matrix: Matrix4<f64>, pivot: Point3<f64>) -> Matrix4<f64> {
    let to = Translation3::from(pivot.coords).to_homogeneous();
    let back = Translation3::from(-pivot.coords).to_homogeneous();
    to * matrix * back
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl From<Matrix4<f64>> for Transform {
    fn from(matrix: Matrix4<f64>) -> Self {
        Self::affine(matrix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_identity_detection() {
        assert!(Transform::translate(0.0, 0.0, 0.0).is_identity());
        assert!(Transform::rotate(0.0, Vector3::y()).is_identity());
        assert!(Transform::scale(1.0, 1.0, 1.0).is_identity());
        assert!(Transform::identity().is_identity());

        assert!(!Transform::translate(0.0, 1e-30, 0.0).is_identity());
        assert!(!Transform::rotate(90.0, Vector3::y()).is_identity());
        assert!(!Transform::scale(2.0, 1.0, 1.0).is_identity());
    }

    #[test]
    fn test_identity_matrix_matches_flag() {
        for t in [
            Transform::translate(0.0, 0.0, 0.0),
            Transform::rotate(0.0, Vector3::x()),
            Transform::scale(1.0, 1.0, 1.0),
        ] {
            assert_eq!(t.to_matrix(), Matrix4::identity());
        }
    }

    #[test]
    fn test_rotation_about_pivot() {
        let t = Transform::new(TransformKind::Rotate {
            angle: 90.0,
            axis: Vector3::z(),
            pivot: Point3::new(1.0, 0.0, 0.0),
        });
        let p = t.to_matrix().transform_point(&Point3::new(2.0, 0.0, 0.0));
        assert_relative_eq!(p, Point3::new(1.0, 1.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn test_property_resolution() {
        let t = Transform::translate(1.0, 2.0, 3.0);
        assert_eq!(t.property(TransformProperty::Y), Some(2.0));
        assert_eq!(t.property(TransformProperty::Angle), None);

        let r = Transform::rotate(45.0, Vector3::z());
        assert_eq!(r.property(TransformProperty::Angle), Some(45.0));
        assert_eq!(r.property(TransformProperty::X), None);

        let a = Transform::identity();
        assert_eq!(a.property(TransformProperty::Element { row: 3, col: 3 }), Some(1.0));
        assert_eq!(a.property(TransformProperty::Element { row: 4, col: 0 }), None);
    }

    #[test]
    fn test_clones_share_identity_but_new_instances_do_not() {
        let a = Transform::translate(1.0, 0.0, 0.0);
        let b = Transform::translate(1.0, 0.0, 0.0);
        assert_eq!(a.kind, b.kind);
        assert_ne!(a, b);
        assert_eq!(a.clone(), a);
    }
}
