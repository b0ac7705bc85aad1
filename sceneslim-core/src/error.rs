//! Error types for sceneslim

use thiserror::Error;

/// Main error type for sceneslim operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// An animation target that does not resolve to a property owned by a
    /// transform in the scene. The optimizer cannot compute a complete
    /// bound-transform set without it, so the whole pass is aborted.
    #[error("configuration fault: target {target} {reason}")]
    Configuration { target: String, reason: String },

    /// Malformed mesh arrays, reported by the validator.
    #[error("structural fault in {mesh}: {fault}")]
    Structural { mesh: String, fault: StructuralFault },

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// The specific mesh invariant a structural fault violates.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StructuralFault {
    #[error("points length {0} is not a multiple of 3")]
    PointsLength(usize),

    #[error("texcoords length {0} is not a multiple of 2")]
    TexCoordsLength(usize),

    #[error("faces length {0} is not a multiple of 6")]
    FacesLength(usize),

    #[error("face {face} references point {index} (mesh has {count} points)")]
    PointIndex { face: usize, index: u32, count: usize },

    #[error("face {face} references texcoord {index} (mesh has {count} texcoords)")]
    TexCoordIndex { face: usize, index: u32, count: usize },

    #[error("{groups} smoothing groups for {faces} faces")]
    SmoothingGroupCount { groups: usize, faces: usize },
}

impl Error {
    pub fn configuration(target: impl ToString, reason: impl Into<String>) -> Self {
        Error::Configuration {
            target: target.to_string(),
            reason: reason.into(),
        }
    }

    /// Whether this error is a [`Error::Configuration`] fault.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::Configuration { .. })
    }

    /// Whether this error is a [`Error::Structural`] fault.
    pub fn is_structural(&self) -> bool {
        matches!(self, Error::Structural { .. })
    }
}

/// Result type alias for sceneslim operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = Error::configuration("node#3.opacity", "is not owned by a transform");
        assert!(err.is_configuration());
        assert_eq!(
            err.to_string(),
            "configuration fault: target node#3.opacity is not owned by a transform"
        );

        let err = Error::Structural {
            mesh: "cube".to_string(),
            fault: StructuralFault::FacesLength(7),
        };
        assert!(err.is_structural());
        assert_eq!(err.to_string(), "structural fault in cube: faces length 7 is not a multiple of 6");
    }
}
