//! Structural validation of mesh arrays.
//!
//! The validator is a contract check, not a repair tool: the first violated
//! invariant is returned as an [`Error::Structural`] and nothing is modified.
//! The optimizer never calls it; callers run it before and/or after.

use crate::error::{Error, Result, StructuralFault};
use crate::mesh::{Mesh, FACE_SIZE, POINT_SIZE, TEXCOORD_SIZE};
use crate::scene::SceneNode;
use tracing::debug;

/// Check a single mesh against its flat-array invariants
pub fn check_mesh(mesh: &Mesh) -> std::result::Result<(), StructuralFault> {
    if mesh.points.len() % POINT_SIZE != 0 {
        return Err(StructuralFault::PointsLength(mesh.points.len()));
    }
    if mesh.texcoords.len() % TEXCOORD_SIZE != 0 {
        return Err(StructuralFault::TexCoordsLength(mesh.texcoords.len()));
    }
    if mesh.faces.len() % FACE_SIZE != 0 {
        return Err(StructuralFault::FacesLength(mesh.faces.len()));
    }

    let point_count = mesh.point_count();
    let texcoord_count = mesh.texcoord_count();
    for (face, indices) in mesh.faces.chunks_exact(FACE_SIZE).enumerate() {
        for pair in indices.chunks_exact(2) {
            if pair[0] as usize >= point_count {
                return Err(StructuralFault::PointIndex {
                    face,
                    index: pair[0],
                    count: point_count,
                });
            }
            if pair[1] as usize >= texcoord_count {
                return Err(StructuralFault::TexCoordIndex {
                    face,
                    index: pair[1],
                    count: texcoord_count,
                });
            }
        }
    }

    if let Some(groups) = &mesh.face_smoothing_groups {
        if groups.len() != mesh.face_count() {
            return Err(StructuralFault::SmoothingGroupCount {
                groups: groups.len(),
                faces: mesh.face_count(),
            });
        }
    }

    Ok(())
}

/// Validate one mesh, labelling any fault with `name`
pub fn validate_mesh(mesh: &Mesh, name: &str) -> Result<()> {
    check_mesh(mesh).map_err(|fault| Error::Structural {
        mesh: name.to_string(),
        fault,
    })
}

/// Validate every mesh leaf in a scene subtree.
///
/// Returns the number of meshes checked.
pub fn validate_scene(root: &SceneNode) -> Result<usize> {
    let mut checked = 0;
    let mut first_fault = None;
    root.visit(&mut |node| {
        if first_fault.is_some() {
            return;
        }
        if let Some(mesh) = node.mesh_ref() {
            checked += 1;
            if let Err(err) = validate_mesh(mesh, &node.label()) {
                first_fault = Some(err);
            }
        }
    });

    match first_fault {
        Some(err) => Err(err),
        None => {
            debug!("validated {} meshes", checked);
            Ok(checked)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_triangle() -> Mesh {
        Mesh::from_arrays(
            vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
            vec![0.0, 0.0],
            vec![0, 0, 1, 0, 2, 0],
        )
    }

    #[test]
    fn test_valid_mesh() {
        assert_eq!(check_mesh(&make_triangle()), Ok(()));
        assert_eq!(check_mesh(&Mesh::new()), Ok(()));
    }

    #[test]
    fn test_length_faults() {
        let mut mesh = make_triangle();
        mesh.points.push(1.0);
        assert_eq!(check_mesh(&mesh), Err(StructuralFault::PointsLength(10)));

        let mut mesh = make_triangle();
        mesh.texcoords.push(1.0);
        assert_eq!(check_mesh(&mesh), Err(StructuralFault::TexCoordsLength(3)));

        let mut mesh = make_triangle();
        mesh.faces.pop();
        assert_eq!(check_mesh(&mesh), Err(StructuralFault::FacesLength(5)));
    }

    #[test]
    fn test_index_faults() {
        let mut mesh = make_triangle();
        mesh.faces[4] = 3;
        assert_eq!(
            check_mesh(&mesh),
            Err(StructuralFault::PointIndex { face: 0, index: 3, count: 3 })
        );

        let mut mesh = make_triangle();
        mesh.faces[3] = 1;
        assert_eq!(
            check_mesh(&mesh),
            Err(StructuralFault::TexCoordIndex { face: 0, index: 1, count: 1 })
        );
    }

    #[test]
    fn test_smoothing_group_count_fault() {
        let mut mesh = make_triangle();
        mesh.face_smoothing_groups = Some(vec![1, 2]);
        assert_eq!(
            check_mesh(&mesh),
            Err(StructuralFault::SmoothingGroupCount { groups: 2, faces: 1 })
        );
    }

    #[test]
    fn test_validate_scene_reports_first_fault() {
        let mut broken = make_triangle();
        broken.faces.push(0);
        let root = SceneNode::group(vec![
            SceneNode::mesh(make_triangle()),
            SceneNode::mesh(broken).with_name("broken"),
        ]);

        let err = validate_scene(&root).unwrap_err();
        match err {
            Error::Structural { mesh, fault } => {
                assert!(mesh.starts_with("broken"));
                assert_eq!(fault, StructuralFault::FacesLength(7));
            }
            other => panic!("unexpected error {other:?}"),
        }

        let ok = SceneNode::group(vec![SceneNode::mesh(make_triangle())]);
        assert_eq!(validate_scene(&ok), Ok(1));
    }
}
