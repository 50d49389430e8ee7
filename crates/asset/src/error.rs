//! Import and mesh-construction errors.

use std::{io, path::PathBuf};

use thiserror::Error;

/// Why a single OBJ line was rejected.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ParseErrorKind {
    #[error("missing {0}")]
    MissingComponent(&'static str),
    #[error("invalid {what} '{token}'")]
    InvalidNumber { what: &'static str, token: String },
    #[error("invalid index '{0}'")]
    InvalidIndex(String),
    #[error("OBJ indices are 1-based; found 0")]
    ZeroIndex,
    #[error("relative (negative) index {0} is not supported")]
    NegativeIndex(i64),
    #[error("{what} index {index} out of bounds (count={count})")]
    IndexOutOfBounds {
        what: &'static str,
        index: i64,
        count: usize,
    },
    #[error("malformed face element '{0}'")]
    MalformedFaceElement(String),
}

/// Failure to turn a file into a [`Mesh`](crate::mesh::Mesh).
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("OBJ file not found: {}", path.display())]
    FileNotFound { path: PathBuf },
    #[error("failed to read OBJ file {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("line {line}: {kind}")]
    Parse { line: usize, kind: ParseErrorKind },
    #[error("OBJ contained no faces")]
    NoFaces,
    #[error(transparent)]
    Mesh(#[from] MeshError),
}

impl ImportError {
    pub(crate) fn parse(line_no: usize, kind: ParseErrorKind) -> Self {
        Self::Parse {
            line: line_no + 1,
            kind,
        }
    }
}

/// Violated [`Mesh`](crate::mesh::Mesh) invariant.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum MeshError {
    #[error("triangle {triangle} references vertex {index} (count={count})")]
    IndexOutOfRange {
        triangle: usize,
        index: u32,
        count: usize,
    },
    #[error("{what} count {got} does not match position count {expected}")]
    AttributeCount {
        what: &'static str,
        got: usize,
        expected: usize,
    },
    #[error("too many vertices (>{})", u32::MAX)]
    TooManyVertices,
}

/// Non-fatal problem found while importing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ImportWarning {
    /// Face with fewer than three distinct positions; skipped.
    DegenerateFace { line: usize },
}
