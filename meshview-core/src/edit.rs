/// Destructive editing: removing selected vertices and faces
use std::collections::BTreeSet;

use tracing::debug;

use crate::geometry::{Face, Mesh};
use crate::pick::Selection;

/// What a deletion removed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeleteSummary {
    /// Vertices removed by the vertex pass
    pub vertices_removed: usize,
    /// Faces dropped because they lost a corner (or had fewer than three)
    pub faces_dropped: usize,
    /// Faces removed by the face pass
    pub faces_removed: usize,
}

/// Remove vertices, re-index the faces that survive, and drop the rest
///
/// A face that referenced any removed vertex is dropped whole, as is any
/// face left with fewer than three corners.
pub fn delete_vertices(mesh: &mut Mesh, selected: &BTreeSet<usize>) -> DeleteSummary {
    let mut remap: Vec<Option<usize>> = Vec::with_capacity(mesh.vertex_count());
    let mut vertices = Vec::with_capacity(mesh.vertex_count());

    for (i, vertex) in mesh.vertices().iter().enumerate() {
        if selected.contains(&i) {
            remap.push(None);
        } else {
            remap.push(Some(vertices.len()));
            vertices.push(*vertex);
        }
    }

    let faces: Vec<Face> = mesh
        .faces()
        .iter()
        .filter_map(|face| {
            let indices: Option<Vec<usize>> = face
                .indices()
                .iter()
                .map(|&i| remap.get(i).copied().flatten())
                .collect();
            indices.map(Face::new).filter(Face::is_polygon)
        })
        .collect();

    let summary = DeleteSummary {
        vertices_removed: mesh.vertex_count() - vertices.len(),
        faces_dropped: mesh.face_count() - faces.len(),
        faces_removed: 0,
    };
    mesh.replace(vertices, faces);

    debug!(
        removed = summary.vertices_removed,
        dropped_faces = summary.faces_dropped,
        "Deleted vertices"
    );
    summary
}

/// Remove faces by position, keeping the order of the rest
pub fn delete_faces(mesh: &mut Mesh, selected: &BTreeSet<usize>) -> DeleteSummary {
    let faces: Vec<Face> = mesh
        .faces()
        .iter()
        .enumerate()
        .filter(|(i, _)| !selected.contains(i))
        .map(|(_, face)| face.clone())
        .collect();

    let summary = DeleteSummary {
        faces_removed: mesh.face_count() - faces.len(),
        ..DeleteSummary::default()
    };
    mesh.replace_faces(faces);

    debug!(removed = summary.faces_removed, "Deleted faces");
    summary
}

/// Delete selected vertices, then selected faces
///
/// Face indices are read against the face list left by the vertex pass.
/// Each pass only runs when its set is non-empty. All indices the caller
/// held before this call are stale afterwards.
pub fn delete_selection(
    mesh: &mut Mesh,
    vertices: &BTreeSet<usize>,
    faces: &BTreeSet<usize>,
) -> DeleteSummary {
    let mut summary = DeleteSummary::default();

    if !vertices.is_empty() {
        summary = delete_vertices(mesh, vertices);
    }
    if !faces.is_empty() {
        summary.faces_removed = delete_faces(mesh, faces).faces_removed;
    }

    summary
}

/// Delete everything in `selection` from `mesh`, then clear the selection
///
/// A selection taken against an older revision of the mesh is cleared
/// without touching the mesh.
pub fn delete_selected(mesh: &mut Mesh, selection: &mut Selection) -> DeleteSummary {
    let summary = if selection.is_stale(mesh) {
        debug!("Ignoring stale selection");
        DeleteSummary::default()
    } else {
        delete_selection(mesh, selection.vertices(), selection.faces())
    };
    selection.reset(mesh);
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Vertex;

    fn set(indices: &[usize]) -> BTreeSet<usize> {
        indices.iter().copied().collect()
    }

    /// Vertices A, B, C, D at distinct x positions
    fn abcd() -> Mesh {
        let mut mesh = Mesh::new();
        for x in 0..4 {
            mesh.add_vertex(Vertex::new(f64::from(x), 0.0, 0.0));
        }
        mesh
    }

    fn xs(mesh: &Mesh) -> Vec<f64> {
        mesh.vertices().iter().map(|v| v.x).collect()
    }

    #[test]
    fn test_delete_vertex_drops_referencing_face() {
        let mut mesh = abcd();
        mesh.add_face([0, 1, 2]);

        let summary = delete_selection(&mut mesh, &set(&[1]), &set(&[]));
        assert_eq!(xs(&mesh), vec![0.0, 2.0, 3.0]);
        assert!(mesh.faces().is_empty());
        assert_eq!(summary.vertices_removed, 1);
        assert_eq!(summary.faces_dropped, 1);
    }

    #[test]
    fn test_delete_vertex_remaps_surviving_faces() {
        let mut mesh = abcd();
        mesh.add_face([0, 1, 2]);
        mesh.add_face([1, 2, 3]);

        delete_selection(&mut mesh, &set(&[0]), &set(&[]));
        assert_eq!(xs(&mesh), vec![1.0, 2.0, 3.0]);
        assert_eq!(mesh.faces(), &[Face::from([0, 1, 2])]);
    }

    #[test]
    fn test_vertex_pass_drops_short_and_broken_faces() {
        let mut mesh = abcd();
        mesh.add_face([2, 3]);
        mesh.add_face([2, 3, 9]);
        mesh.add_face([3, 2, 1]);

        let summary = delete_vertices(&mut mesh, &set(&[0]));
        assert_eq!(mesh.faces(), &[Face::from([2, 1, 0])]);
        assert_eq!(summary.faces_dropped, 2);
    }

    #[test]
    fn test_face_pass_uses_post_vertex_indices() {
        let mut mesh = abcd();
        mesh.add_face([0, 1, 2]);
        mesh.add_face([1, 2, 3]);
        mesh.add_face([3, 2, 1]);

        // Removing A leaves faces [0,1,2] and [2,1,0]; face 0 then goes
        let summary = delete_selection(&mut mesh, &set(&[0]), &set(&[0]));
        assert_eq!(mesh.faces(), &[Face::from([2, 1, 0])]);
        assert_eq!(summary.faces_dropped, 1);
        assert_eq!(summary.faces_removed, 1);
    }

    #[test]
    fn test_delete_faces_only() {
        let mut mesh = Mesh::cube(2.0);
        let revision = mesh.revision();

        let summary = delete_selection(&mut mesh, &set(&[]), &set(&[1, 3, 40]));
        assert_eq!(mesh.vertex_count(), 8);
        assert_eq!(mesh.face_count(), 4);
        assert_eq!(summary.faces_removed, 2);
        assert_eq!(mesh.revision(), revision + 1);
        assert_eq!(mesh.faces()[1], Mesh::cube(2.0).faces()[2]);
    }

    #[test]
    fn test_empty_selection_is_noop() {
        let mut mesh = Mesh::cube(2.0);
        let revision = mesh.revision();
        assert_eq!(delete_selection(&mut mesh, &set(&[]), &set(&[])), DeleteSummary::default());
        assert_eq!(mesh.revision(), revision);
    }

    #[test]
    fn test_delete_selected_clears_selection() {
        let mut mesh = Mesh::cube(2.0);
        let mut selection = Selection::for_mesh(&mesh);
        selection.toggle_vertex(0);

        let summary = delete_selected(&mut mesh, &mut selection);
        assert_eq!(summary.vertices_removed, 1);
        // Vertex 0 is a corner of the back, bottom and left faces
        assert_eq!(mesh.face_count(), 3);
        assert!(selection.is_empty());
        assert!(!selection.is_stale(&mesh));
        assert!(mesh.validate().is_ok());
    }

    #[test]
    fn test_delete_selected_ignores_stale_selection() {
        let mut mesh = Mesh::cube(2.0);
        let mut selection = Selection::for_mesh(&mesh);
        selection.toggle_face(0);
        mesh.replace_faces(mesh.faces().to_vec());

        let summary = delete_selected(&mut mesh, &mut selection);
        assert_eq!(summary, DeleteSummary::default());
        assert_eq!(mesh.face_count(), 6);
        assert!(selection.is_empty());
    }
}
