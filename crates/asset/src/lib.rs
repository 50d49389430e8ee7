//! Asset loading/parsers.
//! OBJ mesh importer producing validated CPU-side meshes, plus the shared
//! placeholder primitive.

pub mod error;
pub mod mesh;
pub mod obj;
pub mod primitive;

pub use error::{ImportError, ImportWarning, MeshError, ParseErrorKind};
pub use mesh::Mesh;
pub use obj::{MeshImporter, ObjImport, ObjImporter};
pub use primitive::placeholder_mesh;
