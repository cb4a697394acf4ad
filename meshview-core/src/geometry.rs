/// Geometry primitives: vertices, polygonal faces, and the indexed mesh
use nalgebra::Point3;
use tracing::warn;

use crate::error::{MeshError, Result};

/// A vertex position in mesh space
pub type Vertex = Point3<f64>;

/// A polygon defined by an ordered list of vertex indices
///
/// Index order is the polygon boundary (and winding) exactly as it was read
/// or built; it is never sorted.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Face {
    indices: Vec<usize>,
}

impl Face {
    pub fn new(indices: Vec<usize>) -> Self {
        Self { indices }
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// A face needs at least three corners to enclose an area
    pub fn is_polygon(&self) -> bool {
        self.indices.len() >= 3
    }

    /// First index that does not address one of `vertex_count` vertices
    pub fn first_out_of_range(&self, vertex_count: usize) -> Option<usize> {
        self.indices.iter().copied().find(|&i| i >= vertex_count)
    }
}

impl From<Vec<usize>> for Face {
    fn from(indices: Vec<usize>) -> Self {
        Self::new(indices)
    }
}

impl<const N: usize> From<[usize; N]> for Face {
    fn from(indices: [usize; N]) -> Self {
        Self::new(indices.to_vec())
    }
}

/// A polygonal mesh: ordered vertices plus ordered faces indexing into them
///
/// The mesh does not check indices on append. Whoever installs a new
/// vertex/face pair through [`Mesh::replace`] must make it consistent first.
/// Every structural replacement bumps [`Mesh::revision`], so index-based
/// selections can tell that they no longer match.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    vertices: Vec<Vertex>,
    faces: Vec<Face>,
    revision: u64,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(vertices: usize, faces: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertices),
            faces: Vec::with_capacity(faces),
            revision: 0,
        }
    }

    pub fn from_parts(vertices: Vec<Vertex>, faces: Vec<Face>) -> Self {
        Self {
            vertices,
            faces,
            revision: 0,
        }
    }

    pub fn add_vertex(&mut self, vertex: Vertex) -> usize {
        self.vertices.push(vertex);
        self.vertices.len() - 1
    }

    pub fn add_face(&mut self, face: impl Into<Face>) -> usize {
        self.faces.push(face.into());
        self.faces.len() - 1
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    pub fn vertex(&self, index: usize) -> Option<&Vertex> {
        self.vertices.get(index)
    }

    pub fn face(&self, index: usize) -> Option<&Face> {
        self.faces.get(index)
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() && self.faces.is_empty()
    }

    /// Counter bumped whenever existing vertex or face indices change meaning
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Install a new vertex list and face list in one step
    pub fn replace(&mut self, vertices: Vec<Vertex>, faces: Vec<Face>) {
        self.vertices = vertices;
        self.faces = faces;
        self.revision += 1;
    }

    /// Install a new face list, keeping the vertices
    pub fn replace_faces(&mut self, faces: Vec<Face>) {
        self.faces = faces;
        self.revision += 1;
    }

    /// Resolve the corner positions of a face
    ///
    /// Returns `None` if any index is out of range.
    pub fn face_positions(&self, face: &Face) -> Option<Vec<Vertex>> {
        face.indices()
            .iter()
            .map(|&i| self.vertices.get(i).copied())
            .collect()
    }

    /// Check that every face index addresses an existing vertex
    pub fn validate(&self) -> Result<()> {
        let vertex_count = self.vertices.len();
        for (face_index, face) in self.faces.iter().enumerate() {
            if let Some(vertex) = face.first_out_of_range(vertex_count) {
                return Err(MeshError::InvalidVertexIndex {
                    face: face_index,
                    vertex,
                    vertex_count,
                });
            }
        }
        Ok(())
    }

    /// Drop faces that reference missing vertices, returning how many went
    pub fn retain_valid_faces(&mut self) -> usize {
        let vertex_count = self.vertices.len();
        let before = self.faces.len();
        if self
            .faces
            .iter()
            .all(|f| f.first_out_of_range(vertex_count).is_none())
        {
            return 0;
        }

        let faces: Vec<Face> = self
            .faces
            .iter()
            .enumerate()
            .filter_map(|(i, face)| match face.first_out_of_range(vertex_count) {
                Some(vertex) => {
                    warn!(face = i, vertex, vertex_count, "Dropping face with out-of-range index");
                    None
                }
                None => Some(face.clone()),
            })
            .collect();
        let dropped = before - faces.len();
        self.replace_faces(faces);
        dropped
    }

    /// Create an axis-aligned cube of quads centred on the origin
    pub fn cube(size: f64) -> Self {
        let half = size / 2.0;
        let mut mesh = Self::with_capacity(8, 6);

        for &(x, y, z) in &[
            (-half, -half, -half),
            (half, -half, -half),
            (half, half, -half),
            (-half, half, -half),
            (-half, -half, half),
            (half, -half, half),
            (half, half, half),
            (-half, half, half),
        ] {
            mesh.add_vertex(Vertex::new(x, y, z));
        }

        // Front, back, top, bottom, right, left; counter-clockwise from outside
        mesh.add_face([4, 5, 6, 7]);
        mesh.add_face([1, 0, 3, 2]);
        mesh.add_face([3, 7, 6, 2]);
        mesh.add_face([0, 1, 5, 4]);
        mesh.add_face([1, 2, 6, 5]);
        mesh.add_face([0, 4, 7, 3]);

        mesh
    }
}
