/// Meshview Core Library - polygon mesh model, OBJ codec, projection, and picking
///
/// This library provides the UI-independent part of the mesh viewer:
/// loading and saving meshes, projecting them under the view rotation,
/// resolving pointer clicks to vertices or faces, and deleting selections
/// while keeping face indices consistent.

pub mod edit;
pub mod error;
pub mod geometry;
pub mod obj;
pub mod pick;
pub mod projection;
pub mod transform;

// Re-export commonly used types
pub use edit::{delete_selected, delete_selection, DeleteSummary};
pub use error::{MeshError, ParseError, Result};
pub use geometry::{Face, Mesh, Vertex};
pub use obj::Validation;
pub use pick::{pick_face, pick_vertex, Selection, SelectionMode};
pub use projection::{project, Projector};
pub use transform::{adjust_scale, RotationState, ScaleAdjustment, ViewState};
