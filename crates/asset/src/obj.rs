//! Minimal OBJ parser supporting positions, normals and texture coordinates.
//!
//! Faces are fan-triangulated from their first corner, so concave or
//! non-planar polygons may come out wrong. Relative (negative) indices are
//! rejected rather than resolved.

use std::{
    collections::HashMap,
    fs::File,
    io::{self, BufRead, BufReader},
    path::Path,
};

use corelib::{Vec2, Vec3};

use crate::{
    error::{ImportError, ImportWarning, MeshError, ParseErrorKind},
    mesh::Mesh,
};

/// A parsed mesh plus the non-fatal problems met on the way.
#[derive(Clone, Debug)]
pub struct ObjImport {
    pub mesh: Mesh,
    pub warnings: Vec<ImportWarning>,
}

/// Anything that can turn a path into a [`Mesh`].
pub trait MeshImporter {
    fn import(&self, path: &Path) -> Result<Mesh, ImportError>;
}

/// Stateless OBJ importer; one value can serve every caller.
#[derive(Clone, Copy, Debug, Default)]
pub struct ObjImporter;

impl MeshImporter for ObjImporter {
    fn import(&self, path: &Path) -> Result<Mesh, ImportError> {
        load_obj_from_path(path)
    }
}

/// Load an OBJ mesh from a file path. Warnings are logged and dropped.
pub fn load_obj_from_path(path: impl AsRef<Path>) -> Result<Mesh, ImportError> {
    let path = path.as_ref();
    let import = load_obj_from_path_with_report(path)?;
    log_warnings(path, &import.warnings);
    Ok(import.mesh)
}

pub fn load_obj_from_path_with_report(path: impl AsRef<Path>) -> Result<ObjImport, ImportError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => ImportError::FileNotFound {
            path: path.to_path_buf(),
        },
        _ => ImportError::Io {
            path: path.to_path_buf(),
            source,
        },
    })?;
    parse_obj(BufReader::new(file), path)
}

/// Load an OBJ mesh from a [`BufRead`] implementation.
pub fn load_obj_from_reader<R: BufRead>(reader: R) -> Result<Mesh, ImportError> {
    let import = load_obj_from_reader_with_report(reader)?;
    log_warnings(Path::new("<reader>"), &import.warnings);
    Ok(import.mesh)
}

pub fn load_obj_from_reader_with_report<R: BufRead>(reader: R) -> Result<ObjImport, ImportError> {
    parse_obj(reader, Path::new("<reader>"))
}

/// Convenience helper to parse an OBJ string literal.
pub fn load_obj_from_str(contents: &str) -> Result<Mesh, ImportError> {
    let import = load_obj_from_str_with_report(contents)?;
    log_warnings(Path::new("<str>"), &import.warnings);
    Ok(import.mesh)
}

pub fn load_obj_from_str_with_report(contents: &str) -> Result<ObjImport, ImportError> {
    parse_obj(io::Cursor::new(contents), Path::new("<str>"))
}

fn log_warnings(path: &Path, warnings: &[ImportWarning]) {
    for warning in warnings {
        match warning {
            ImportWarning::DegenerateFace { line } => {
                log::warn!(
                    "{}: skipped degenerate face on line {}",
                    path.display(),
                    line
                );
            }
        }
    }
}

/// One face corner: position, optional texcoord, optional normal (0-based).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
struct Corner(usize, Option<usize>, Option<usize>);

fn parse_obj<R: BufRead>(reader: R, origin: &Path) -> Result<ObjImport, ImportError> {
    let mut positions: Vec<Vec3> = Vec::new();
    let mut normals: Vec<Vec3> = Vec::new();
    let mut texcoords: Vec<Vec2> = Vec::new();
    let mut faces: Vec<Vec<Corner>> = Vec::new();
    let mut warnings: Vec<ImportWarning> = Vec::new();
    let mut has_attributes = false;

    for (line_no, line) in reader.lines().enumerate() {
        let line = line.map_err(|source| ImportError::Io {
            path: origin.to_path_buf(),
            source,
        })?;
        // BOM written by some Windows tools
        let line = match line_no {
            0 => line.trim_start_matches('\u{feff}'),
            _ => line.as_str(),
        };
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let mut parts = trimmed.split_whitespace();
        let Some(tag) = parts.next() else {
            continue;
        };

        match tag {
            "v" => {
                let x = parse_f32(parts.next(), line_no, "x coordinate")?;
                let y = parse_f32(parts.next(), line_no, "y coordinate")?;
                let z = parse_f32(parts.next(), line_no, "z coordinate")?;
                positions.push(Vec3::new(x, y, z));
            }
            "vt" => {
                let u = parse_f32(parts.next(), line_no, "u coordinate")?;
                let v = parse_f32(parts.next(), line_no, "v coordinate")?;
                texcoords.push(Vec2::new(u, v));
            }
            "vn" => {
                let nx = parse_f32(parts.next(), line_no, "nx coordinate")?;
                let ny = parse_f32(parts.next(), line_no, "ny coordinate")?;
                let nz = parse_f32(parts.next(), line_no, "nz coordinate")?;
                normals.push(Vec3::new(nx, ny, nz));
            }
            "f" => {
                let corners = parts
                    .map(|part| {
                        parse_face_vertex(
                            part,
                            positions.len(),
                            texcoords.len(),
                            normals.len(),
                            line_no,
                        )
                    })
                    .collect::<Result<Vec<_>, _>>()?;

                if fan(&corners).next().is_none() {
                    warnings.push(ImportWarning::DegenerateFace { line: line_no + 1 });
                    continue;
                }
                has_attributes |= corners.iter().any(|c| c.1.is_some() || c.2.is_some());
                faces.push(corners);
            }
            _ => {
                // Ignore other directives (o/g/s/usemtl/mtllib/l/etc.)
            }
        }
    }

    if faces.is_empty() {
        return Err(ImportError::NoFaces);
    }

    let mesh = if has_attributes {
        build_welded(&positions, &normals, &texcoords, &faces)?
    } else {
        build_direct(positions, &faces)?
    };

    Ok(ObjImport { mesh, warnings })
}

/// Positions stay as declared; triangles index them directly.
fn build_direct(positions: Vec<Vec3>, faces: &[Vec<Corner>]) -> Result<Mesh, ImportError> {
    let mut triangles = Vec::new();
    for face in faces {
        let indices = face
            .iter()
            .map(|c| u32::try_from(c.0).map_err(|_| MeshError::TooManyVertices))
            .collect::<Result<Vec<_>, _>>()?;
        triangulate_fan(face, &indices, &mut triangles);
    }
    Ok(Mesh::new(positions, Vec::new(), Vec::new(), triangles)?)
}

/// Each distinct (position, texcoord, normal) corner becomes one vertex.
fn build_welded(
    positions: &[Vec3],
    normals: &[Vec3],
    texcoords: &[Vec2],
    faces: &[Vec<Corner>],
) -> Result<Mesh, ImportError> {
    let mut unique: HashMap<Corner, u32> = HashMap::new();
    let mut out_positions: Vec<Vec3> = Vec::new();
    let mut out_normals: Vec<Vec3> = Vec::new();
    let mut out_texcoords: Vec<Vec2> = Vec::new();
    let mut triangles = Vec::new();

    for face in faces {
        let mut indices = Vec::with_capacity(face.len());
        for corner in face {
            let index = match unique.get(corner) {
                Some(&idx) => idx,
                None => {
                    let idx = u32::try_from(out_positions.len())
                        .map_err(|_| MeshError::TooManyVertices)?;
                    out_positions.push(positions[corner.0]);
                    out_texcoords.push(corner.1.map_or(Vec2::ZERO, |i| texcoords[i]));
                    out_normals.push(corner.2.map_or(Vec3::Z, |i| normals[i]));
                    unique.insert(*corner, idx);
                    idx
                }
            };
            indices.push(index);
        }
        triangulate_fan(face, &indices, &mut triangles);
    }

    Ok(Mesh::new(out_positions, out_normals, out_texcoords, triangles)?)
}

/// Corner triples (0, i, i+1) for i in 1..n-1, minus those repeating a position.
fn fan(corners: &[Corner]) -> impl Iterator<Item = [usize; 3]> + '_ {
    (1..corners.len().saturating_sub(1))
        .map(|i| [0, i, i + 1])
        .filter(move |tri| {
            let [a, b, c] = tri.map(|k| corners[k].0);
            a != b && b != c && a != c
        })
}

/// `indices` holds one output index per corner of `face`.
fn triangulate_fan(face: &[Corner], indices: &[u32], out: &mut Vec<[u32; 3]>) {
    out.extend(fan(face).map(|[a, b, c]| [indices[a], indices[b], indices[c]]));
}

fn parse_f32(value: Option<&str>, line_no: usize, what: &'static str) -> Result<f32, ImportError> {
    let token =
        value.ok_or_else(|| ImportError::parse(line_no, ParseErrorKind::MissingComponent(what)))?;
    token
        .parse::<f32>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| {
            ImportError::parse(
                line_no,
                ParseErrorKind::InvalidNumber {
                    what,
                    token: token.to_string(),
                },
            )
        })
}

fn parse_face_vertex(
    token: &str,
    pos_count: usize,
    tex_count: usize,
    norm_count: usize,
    line_no: usize,
) -> Result<Corner, ImportError> {
    let mut split = token.split('/');
    let pos = match split.next() {
        Some(value) if !value.is_empty() => value,
        _ => {
            return Err(ImportError::parse(
                line_no,
                ParseErrorKind::MalformedFaceElement(token.to_string()),
            ));
        }
    };
    let pos_idx = resolve_index(pos, pos_count, "position", line_no)?;

    let tex_idx = match split.next() {
        Some(value) if !value.is_empty() => {
            Some(resolve_index(value, tex_count, "texcoord", line_no)?)
        }
        _ => None,
    };

    let norm_idx = match split.next() {
        Some(value) if !value.is_empty() => {
            Some(resolve_index(value, norm_count, "normal", line_no)?)
        }
        _ => None,
    };

    if split.next().is_some() {
        return Err(ImportError::parse(
            line_no,
            ParseErrorKind::MalformedFaceElement(token.to_string()),
        ));
    }

    Ok(Corner(pos_idx, tex_idx, norm_idx))
}

fn resolve_index(
    token: &str,
    len: usize,
    what: &'static str,
    line_no: usize,
) -> Result<usize, ImportError> {
    let raw = token.parse::<i64>().map_err(|_| {
        ImportError::parse(line_no, ParseErrorKind::InvalidIndex(token.to_string()))
    })?;
    if raw == 0 {
        return Err(ImportError::parse(line_no, ParseErrorKind::ZeroIndex));
    }
    if raw < 0 {
        return Err(ImportError::parse(line_no, ParseErrorKind::NegativeIndex(raw)));
    }

    let idx = (raw - 1) as usize;
    if idx >= len {
        return Err(ImportError::parse(
            line_no,
            ParseErrorKind::IndexOutOfBounds {
                what,
                index: raw,
                count: len,
            },
        ));
    }

    Ok(idx)
}
