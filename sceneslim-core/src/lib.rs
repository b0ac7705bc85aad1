//! Core data structures and traits for sceneslim
//!
//! This crate provides the in-memory model an importer produces and the
//! optimizer rewrites: flat-array meshes, node-scoped transforms, the scene
//! tree, the keyframe timeline, plus the error type and the structural
//! validator.

pub mod error;
pub mod id;
pub mod mesh;
pub mod point;
pub mod scene;
pub mod timeline;
pub mod traits;
pub mod transform;
pub mod validate;

pub use error::*;
pub use id::*;
pub use mesh::*;
pub use point::*;
pub use scene::*;
pub use timeline::*;
pub use traits::*;
pub use transform::*;
pub use validate::*;

/// Re-export commonly used types from nalgebra
pub use nalgebra::{Matrix4, Point3, Vector3};
