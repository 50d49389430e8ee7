//! CPU-side mesh representation used by loaders.

use corelib::{Aabb, Vec2, Vec3};

use crate::error::MeshError;

/// Indexed triangle mesh. Immutable once built; replace it wholesale instead.
#[derive(Clone, Debug, PartialEq)]
pub struct Mesh {
    positions: Vec<Vec3>,
    normals: Vec<Vec3>,
    texcoords: Vec<Vec2>,
    triangles: Vec<[u32; 3]>,
    bounds: Aabb,
}

impl Mesh {
    /// Validates attribute counts and triangle indices, then caches the bounds.
    ///
    /// `normals` and `texcoords` must each be empty or match `positions` in length.
    pub fn new(
        positions: Vec<Vec3>,
        normals: Vec<Vec3>,
        texcoords: Vec<Vec2>,
        triangles: Vec<[u32; 3]>,
    ) -> Result<Self, MeshError> {
        if u32::try_from(positions.len()).is_err() {
            return Err(MeshError::TooManyVertices);
        }
        check_attribute("normal", normals.len(), positions.len())?;
        check_attribute("texcoord", texcoords.len(), positions.len())?;

        let count = positions.len();
        for (triangle, tri) in triangles.iter().enumerate() {
            if let Some(&index) = tri.iter().find(|&&i| i as usize >= count) {
                return Err(MeshError::IndexOutOfRange {
                    triangle,
                    index,
                    count,
                });
            }
        }

        let bounds = Aabb::from_points(&positions);
        Ok(Self {
            positions,
            normals,
            texcoords,
            triangles,
            bounds,
        })
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    /// Empty when the source carried no normals.
    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    /// Empty when the source carried no texture coordinates.
    pub fn texcoords(&self) -> &[Vec2] {
        &self.texcoords
    }

    pub fn triangles(&self) -> &[[u32; 3]] {
        &self.triangles
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn bounds(&self) -> Aabb {
        self.bounds
    }

    /// Flattened index buffer, three entries per triangle.
    pub fn indices(&self) -> impl Iterator<Item = u32> + '_ {
        self.triangles.iter().flatten().copied()
    }

    /// Returns `true` if both position and triangle lists are non-empty.
    pub fn is_valid(&self) -> bool {
        !self.positions.is_empty() && !self.triangles.is_empty()
    }
}

fn check_attribute(what: &'static str, got: usize, expected: usize) -> Result<(), MeshError> {
    if got != 0 && got != expected {
        return Err(MeshError::AttributeCount {
            what,
            got,
            expected,
        });
    }
    Ok(())
}
