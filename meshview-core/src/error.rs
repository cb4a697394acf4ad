//! Error types for mesh loading, saving, and validation.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using [`MeshError`].
pub type Result<T> = std::result::Result<T, MeshError>;

/// Failure while reading OBJ text.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    /// A vertex record carried a coordinate that is not a valid float.
    #[error("line {line}: invalid vertex coordinate {token:?}")]
    NumericFormat {
        /// 1-based line number in the source text.
        line: usize,
        /// The offending token.
        token: String,
    },
}

/// Errors that can occur while loading, saving, or validating a mesh.
#[derive(Error, Debug)]
pub enum MeshError {
    /// Malformed source text.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// A face references a vertex that does not exist.
    #[error("face {face} references vertex {vertex}, but the mesh has {vertex_count} vertices")]
    InvalidVertexIndex {
        /// The face index.
        face: usize,
        /// The out-of-range vertex index.
        vertex: usize,
        /// Number of vertices in the mesh.
        vertex_count: usize,
    },

    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error loading mesh from file.
    #[error("failed to load mesh from {path}: {source}")]
    Load {
        /// The file path.
        path: PathBuf,
        /// The underlying failure.
        #[source]
        source: Box<MeshError>,
    },

    /// Error saving mesh to file.
    #[error("failed to save mesh to {path}: {source}")]
    Save {
        /// The file path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ParseError::NumericFormat {
            line: 3,
            token: "abc".to_string(),
        };
        assert_eq!(format!("{err}"), "line 3: invalid vertex coordinate \"abc\"");

        let err = MeshError::InvalidVertexIndex {
            face: 0,
            vertex: 7,
            vertex_count: 4,
        };
        assert!(format!("{err}").contains("vertex 7"));
    }

    #[test]
    fn test_parse_error_is_transparent() {
        let err: MeshError = ParseError::NumericFormat {
            line: 1,
            token: "x".to_string(),
        }
        .into();
        assert_eq!(format!("{err}"), "line 1: invalid vertex coordinate \"x\"");
    }
}
