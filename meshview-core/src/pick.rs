/// Pointer picking and index-based selection sets
///
/// Click points are in screen units relative to the viewport centre, the
/// same frame [`Projector::to_screen`] produces.
use std::collections::BTreeSet;

use nalgebra::Point2;

use crate::geometry::Mesh;
use crate::projection::Projector;
use crate::transform::ViewState;

/// A vertex is picked only if the click lands strictly closer than this
pub const PICK_THRESHOLD: f64 = 10.0;

/// Nearest vertex to `click`, if it is within [`PICK_THRESHOLD`]
pub fn pick_vertex(mesh: &Mesh, click: Point2<f64>, view: &ViewState) -> Option<usize> {
    let projector = Projector::new(view.rotation);
    let mut best: Option<(usize, f64)> = None;

    for (i, vertex) in mesh.vertices().iter().enumerate() {
        let distance = nalgebra::distance(&projector.to_screen(vertex, view.scale()), &click);
        if distance < best.map_or(PICK_THRESHOLD, |(_, d)| d) {
            best = Some((i, distance));
        }
    }

    best.map(|(i, _)| i)
}

/// First face, in mesh order, whose screen outline contains `click`
///
/// Faces with fewer than three corners or with missing vertices are never
/// hit. Outline corners keep their fractional screen position; they are not
/// snapped to whole pixels before the even-odd test, so a click within a
/// pixel of an edge can hit a face that a pixel-grid rasterizer would miss.
pub fn pick_face(mesh: &Mesh, click: Point2<f64>, view: &ViewState) -> Option<usize> {
    let projector = Projector::new(view.rotation);

    mesh.faces().iter().position(|face| {
        face.is_polygon()
            && projector
                .face_outline(mesh, face, view.scale())
                .is_some_and(|outline| polygon_contains(&outline, click))
    })
}

/// Even-odd point-in-polygon test
pub fn polygon_contains(polygon: &[Point2<f64>], point: Point2<f64>) -> bool {
    if polygon.len() < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let (a, b) = (polygon[i], polygon[j]);
        if (a.y > point.y) != (b.y > point.y) {
            let x = a.x + (point.y - a.y) * (b.x - a.x) / (b.y - a.y);
            if point.x < x {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Whether clicks select vertices or faces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionMode {
    #[default]
    Vertices,
    Faces,
}

/// Selected vertex and face indices for one mesh revision
///
/// Indices are positions, so they stop meaning anything once the mesh is
/// edited. The selection remembers the [`Mesh::revision`] it was taken
/// against; see [`Selection::is_stale`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub mode: SelectionMode,
    vertices: BTreeSet<usize>,
    faces: BTreeSet<usize>,
    revision: u64,
}

impl Selection {
    /// Empty selection bound to the current state of `mesh`
    pub fn for_mesh(mesh: &Mesh) -> Self {
        Self {
            revision: mesh.revision(),
            ..Self::default()
        }
    }

    pub fn vertices(&self) -> &BTreeSet<usize> {
        &self.vertices
    }

    pub fn faces(&self) -> &BTreeSet<usize> {
        &self.faces
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() && self.faces.is_empty()
    }

    pub fn is_stale(&self, mesh: &Mesh) -> bool {
        self.revision != mesh.revision()
    }

    /// Add the vertex if absent, remove it if present; returns new membership
    pub fn toggle_vertex(&mut self, index: usize) -> bool {
        toggle(&mut self.vertices, index)
    }

    pub fn toggle_face(&mut self, index: usize) -> bool {
        toggle(&mut self.faces, index)
    }

    /// Drop every index and rebind to the current state of `mesh`
    pub fn reset(&mut self, mesh: &Mesh) {
        self.vertices.clear();
        self.faces.clear();
        self.revision = mesh.revision();
    }

    /// Resolve a click in the current mode and toggle whatever it hits
    ///
    /// A stale selection is cleared before the pick. Returns the toggled
    /// index, or `None` if the click hit nothing.
    pub fn click(&mut self, mesh: &Mesh, click: Point2<f64>, view: &ViewState) -> Option<usize> {
        if self.is_stale(mesh) {
            self.reset(mesh);
        }
        match self.mode {
            SelectionMode::Vertices => {
                let index = pick_vertex(mesh, click, view)?;
                self.toggle_vertex(index);
                Some(index)
            }
            SelectionMode::Faces => {
                let index = pick_face(mesh, click, view)?;
                self.toggle_face(index);
                Some(index)
            }
        }
    }
}

fn toggle(set: &mut BTreeSet<usize>, index: usize) -> bool {
    if set.remove(&index) {
        false
    } else {
        set.insert(index);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Face, Vertex};
    use crate::transform::RotationState;

    fn flat_view() -> ViewState {
        ViewState::new(RotationState::zero(), 100.0)
    }

    /// Two unit squares in the z = 0 plane, the second overlapping the first
    fn overlapping_squares() -> Mesh {
        let mut mesh = Mesh::new();
        for &(x, y) in &[
            (0.0, 0.0),
            (1.0, 0.0),
            (1.0, 1.0),
            (0.0, 1.0),
            (0.5, 0.5),
            (1.5, 0.5),
            (1.5, 1.5),
            (0.5, 1.5),
        ] {
            mesh.add_vertex(Vertex::new(x, y, 0.0));
        }
        mesh.add_face([0, 1, 2, 3]);
        mesh.add_face([4, 5, 6, 7]);
        mesh
    }

    #[test]
    fn test_pick_threshold() {
        let mut mesh = Mesh::new();
        mesh.add_vertex(Vertex::origin());
        let view = flat_view();

        assert_eq!(pick_vertex(&mesh, Point2::new(9.9, 0.0), &view), Some(0));
        assert_eq!(pick_vertex(&mesh, Point2::new(0.0, -9.9), &view), Some(0));
        assert_eq!(pick_vertex(&mesh, Point2::new(10.1, 0.0), &view), None);
        assert_eq!(pick_vertex(&mesh, Point2::new(10.0, 0.0), &view), None);
    }

    #[test]
    fn test_pick_nearest_vertex() {
        let mut mesh = Mesh::new();
        mesh.add_vertex(Vertex::new(0.0, 0.0, 0.0));
        mesh.add_vertex(Vertex::new(0.05, 0.0, 0.0));
        let view = flat_view();

        // Screen positions are 0 and 5; the click at 3.5 is nearer the second
        assert_eq!(pick_vertex(&mesh, Point2::new(3.5, 0.0), &view), Some(1));
        assert_eq!(pick_vertex(&mesh, Point2::new(1.0, 0.0), &view), Some(0));
        assert_eq!(pick_vertex(&Mesh::new(), Point2::origin(), &view), None);
    }

    #[test]
    fn test_pick_face_first_match() {
        let mesh = overlapping_squares();
        let view = flat_view();

        // Inside both squares: declaration order wins
        assert_eq!(pick_face(&mesh, Point2::new(75.0, 75.0), &view), Some(0));
        // Only inside the second
        assert_eq!(pick_face(&mesh, Point2::new(125.0, 125.0), &view), Some(1));
        // Outside both
        assert_eq!(pick_face(&mesh, Point2::new(-10.0, 50.0), &view), None);
    }

    #[test]
    fn test_pick_face_skips_broken_faces() {
        let mut mesh = overlapping_squares();
        let view = flat_view();
        mesh.replace_faces(vec![
            Face::from([0, 1, 99]),
            Face::from([0, 1]),
            Face::from([0, 1, 2, 3]),
        ]);

        assert_eq!(pick_face(&mesh, Point2::new(75.0, 25.0), &view), Some(2));
    }

    #[test]
    fn test_pick_face_uses_fractional_corners() {
        let mut mesh = Mesh::new();
        for &(x, y) in &[(0.0, 0.0), (1.007, 0.0), (1.007, 1.0), (0.0, 1.0)] {
            mesh.add_vertex(Vertex::new(x, y, 0.0));
        }
        mesh.add_face([0, 1, 2, 3]);
        let view = flat_view();

        // Right edge sits at x = 100.7, so 100.5 is inside
        assert_eq!(pick_face(&mesh, Point2::new(100.5, 50.0), &view), Some(0));
        assert_eq!(pick_face(&mesh, Point2::new(100.9, 50.0), &view), None);
    }

    #[test]
    fn test_polygon_contains_concave() {
        // An L shape: the notch at the top right is outside
        let l = [
            Point2::new(0.0, 0.0),
            Point2::new(2.0, 0.0),
            Point2::new(2.0, 1.0),
            Point2::new(1.0, 1.0),
            Point2::new(1.0, 2.0),
            Point2::new(0.0, 2.0),
        ];
        assert!(polygon_contains(&l, Point2::new(0.5, 1.5)));
        assert!(polygon_contains(&l, Point2::new(1.5, 0.5)));
        assert!(!polygon_contains(&l, Point2::new(1.5, 1.5)));
        assert!(!polygon_contains(&l[..2], Point2::new(0.5, 0.0)));
    }

    #[test]
    fn test_click_toggles_membership() {
        let mesh = overlapping_squares();
        let view = flat_view();
        let mut selection = Selection::for_mesh(&mesh);

        assert_eq!(selection.click(&mesh, Point2::new(2.0, 3.0), &view), Some(0));
        assert!(selection.vertices().contains(&0));
        assert_eq!(selection.click(&mesh, Point2::new(2.0, 3.0), &view), Some(0));
        assert!(selection.is_empty());

        assert_eq!(selection.click(&mesh, Point2::new(300.0, 300.0), &view), None);
        assert!(selection.is_empty());

        selection.mode = SelectionMode::Faces;
        assert_eq!(selection.click(&mesh, Point2::new(125.0, 125.0), &view), Some(1));
        assert_eq!(selection.faces().iter().copied().collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn test_stale_selection_is_reset() {
        let mut mesh = overlapping_squares();
        let view = flat_view();
        let mut selection = Selection::for_mesh(&mesh);
        selection.toggle_vertex(5);
        assert!(!selection.is_stale(&mesh));

        mesh.replace_faces(Vec::new());
        assert!(selection.is_stale(&mesh));

        selection.click(&mesh, Point2::new(0.0, 0.0), &view);
        assert!(!selection.is_stale(&mesh));
        assert_eq!(selection.vertices().iter().copied().collect::<Vec<_>>(), vec![0]);
    }
}
