/// Perspective projection of mesh-space points onto the view plane
use nalgebra::{Point2, Rotation3};

use crate::geometry::{Face, Mesh, Vertex};
use crate::transform::{RotationState, ViewState};

/// Distance from the eye to the rotation centre along the view axis
pub const CAMERA_DEPTH: f64 = 5.0;

/// Projects vertices under a fixed rotation
///
/// Results are in view units centred on the origin. Multiply by the view
/// scale (see [`Projector::to_screen`]) to get screen units relative to the
/// viewport centre. A point that lands exactly on the eye plane
/// (`z = -CAMERA_DEPTH` after rotation) projects to a non-finite value.
#[derive(Debug, Clone, Copy)]
pub struct Projector {
    rotation: Rotation3<f64>,
}

impl Projector {
    pub fn new(rotation: RotationState) -> Self {
        Self {
            rotation: rotation.rotation_matrix(),
        }
    }

    pub fn project(&self, vertex: &Vertex) -> Point2<f64> {
        let rotated = self.rotation * vertex;
        let k = CAMERA_DEPTH / (CAMERA_DEPTH + rotated.z);
        Point2::new(rotated.x * k, rotated.y * k)
    }

    /// Project and apply the zoom scale
    pub fn to_screen(&self, vertex: &Vertex, scale: f64) -> Point2<f64> {
        self.project(vertex) * scale
    }

    /// Screen outline of a face, or `None` if it references a missing vertex
    pub fn face_outline(&self, mesh: &Mesh, face: &Face, scale: f64) -> Option<Vec<Point2<f64>>> {
        face.indices()
            .iter()
            .map(|&i| mesh.vertex(i).map(|v| self.to_screen(v, scale)))
            .collect()
    }
}

/// Project a single vertex under the given rotation
pub fn project(vertex: &Vertex, rotation: RotationState) -> Point2<f64> {
    Projector::new(rotation).project(vertex)
}

/// Screen positions of every vertex of `mesh` under `view`, in mesh order
pub fn project_mesh(mesh: &Mesh, view: &ViewState) -> Vec<Point2<f64>> {
    let projector = Projector::new(view.rotation);
    mesh.vertices()
        .iter()
        .map(|v| projector.to_screen(v, view.scale()))
        .collect()
}
