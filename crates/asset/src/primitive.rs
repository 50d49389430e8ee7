//! Built-in primitive meshes and the shared placeholder.

use std::{f32::consts::PI, sync::OnceLock};

use corelib::{Vec2, Vec3};

use crate::mesh::Mesh;

/// Longitude segments of the placeholder sphere.
pub const PLACEHOLDER_SECTORS: u32 = 24;
/// Latitude segments of the placeholder sphere.
pub const PLACEHOLDER_STACKS: u32 = 16;

static PLACEHOLDER: OnceLock<Mesh> = OnceLock::new();

/// Process-wide placeholder: a unit-diameter UV sphere, built on first use.
pub fn placeholder_mesh() -> &'static Mesh {
    PLACEHOLDER.get_or_init(|| {
        log::debug!(
            "Building placeholder sphere ({}x{})",
            PLACEHOLDER_SECTORS,
            PLACEHOLDER_STACKS
        );
        uv_sphere(0.5, PLACEHOLDER_SECTORS, PLACEHOLDER_STACKS)
    })
}

/// UV sphere centred on the origin. `sectors` is clamped to >= 3, `stacks` to >= 2.
///
/// Seam and pole vertices are duplicated so each carries its own texcoord.
pub fn uv_sphere(radius: f32, sectors: u32, stacks: u32) -> Mesh {
    let sectors = sectors.max(3);
    let stacks = stacks.max(2);
    let ring = sectors + 1;

    let vertex_count = (ring * (stacks + 1)) as usize;
    let mut positions = Vec::with_capacity(vertex_count);
    let mut normals = Vec::with_capacity(vertex_count);
    let mut texcoords = Vec::with_capacity(vertex_count);

    for stack in 0..=stacks {
        let v = stack as f32 / stacks as f32;
        let phi = v * PI;
        for sector in 0..=sectors {
            let u = sector as f32 / sectors as f32;
            let theta = u * 2.0 * PI;
            let n = Vec3::new(phi.sin() * theta.cos(), phi.cos(), phi.sin() * theta.sin());
            positions.push(n * radius);
            normals.push(n);
            texcoords.push(Vec2::new(u, 1.0 - v));
        }
    }

    let mut triangles = Vec::with_capacity((sectors * (stacks - 1) * 2) as usize);
    for stack in 0..stacks {
        for sector in 0..sectors {
            let a = stack * ring + sector;
            let b = a + ring;
            // pole rows collapse to a single triangle per sector
            if stack != 0 {
                triangles.push([a, a + 1, b]);
            }
            if stack != stacks - 1 {
                triangles.push([a + 1, b + 1, b]);
            }
        }
    }

    match Mesh::new(positions, normals, texcoords, triangles) {
        Ok(mesh) => mesh,
        Err(err) => unreachable!("sphere indices are generated in range: {err}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_is_shared() {
        let a = placeholder_mesh();
        let b = placeholder_mesh();
        assert!(std::ptr::eq(a, b));
        assert!(a.is_valid());
    }

    #[test]
    fn sphere_has_unit_diameter_bounds() {
        let mesh = placeholder_mesh();
        let size = mesh.bounds().size();
        assert!((size.y - 1.0).abs() < 1e-5);
        assert!((size.x - 1.0).abs() < 1e-5);
        assert!((size.z - 1.0).abs() < 1e-2);
        assert!(mesh.bounds().center().length() < 1e-2);
    }

    #[test]
    fn sphere_triangle_count() {
        let mesh = uv_sphere(1.0, 8, 4);
        assert_eq!(mesh.triangle_count(), 8 * (4 - 1) * 2);
        assert_eq!(mesh.vertex_count(), 9 * 5);
        assert!(mesh.normals().iter().all(|n| (n.length() - 1.0).abs() < 1e-5));
    }
}
