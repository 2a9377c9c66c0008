//! # Geometry Data
//!
//! Flat triangle lists as produced by the mesh import collaborator, plus the
//! one procedural primitive the viewport needs (the unit cube reused for the
//! ground slab).

pub mod importer;

pub use importer::{find_free_slot, load_geometry, ImportError, ImportedGeometry};

/// A flat, unindexed triangle list ready for interleaving.
///
/// `positions` always holds three corners per triangle. `normals` and `uvs`
/// are either empty or the same length as `positions`; missing normals
/// default to world-up and missing UVs to `(0, 0)` when the vertices are
/// interleaved for upload.
#[derive(Debug, Clone, Default)]
pub struct GeometryData {
    /// Vertex positions (x, y, z), one entry per triangle corner
    pub positions: Vec<[f32; 3]>,
    /// Per-vertex normals, empty if the source mesh carried none
    pub normals: Vec<[f32; 3]>,
    /// Per-vertex texture coordinates, empty if the source mesh carried none
    pub uvs: Vec<[f32; 2]>,
}

impl GeometryData {
    /// Get the number of vertices in this geometry
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Get the number of triangles in this geometry
    pub fn triangle_count(&self) -> usize {
        self.positions.len() / 3
    }
}

/// Generate a unit cube centered at the origin
///
/// Returns 36 unindexed corners (12 triangles, counter-clockwise as seen from
/// outside) with vertices from -0.5 to 0.5 on all axes, face normals and
/// per-face UVs. The renderer reuses this single mesh for the ground slab.
pub fn generate_cube() -> GeometryData {
    // (outward face normal, four corners in counter-clockwise order)
    const FACES: [([f32; 3], [[f32; 3]; 4]); 6] = [
        // Front face (+Z)
        (
            [0.0, 0.0, 1.0],
            [
                [-0.5, -0.5, 0.5],
                [0.5, -0.5, 0.5],
                [0.5, 0.5, 0.5],
                [-0.5, 0.5, 0.5],
            ],
        ),
        // Back face (-Z)
        (
            [0.0, 0.0, -1.0],
            [
                [0.5, -0.5, -0.5],
                [-0.5, -0.5, -0.5],
                [-0.5, 0.5, -0.5],
                [0.5, 0.5, -0.5],
            ],
        ),
        // Left face (-X)
        (
            [-1.0, 0.0, 0.0],
            [
                [-0.5, -0.5, -0.5],
                [-0.5, -0.5, 0.5],
                [-0.5, 0.5, 0.5],
                [-0.5, 0.5, -0.5],
            ],
        ),
        // Right face (+X)
        (
            [1.0, 0.0, 0.0],
            [
                [0.5, -0.5, 0.5],
                [0.5, -0.5, -0.5],
                [0.5, 0.5, -0.5],
                [0.5, 0.5, 0.5],
            ],
        ),
        // Top face (+Y)
        (
            [0.0, 1.0, 0.0],
            [
                [-0.5, 0.5, 0.5],
                [0.5, 0.5, 0.5],
                [0.5, 0.5, -0.5],
                [-0.5, 0.5, -0.5],
            ],
        ),
        // Bottom face (-Y)
        (
            [0.0, -1.0, 0.0],
            [
                [-0.5, -0.5, -0.5],
                [0.5, -0.5, -0.5],
                [0.5, -0.5, 0.5],
                [-0.5, -0.5, 0.5],
            ],
        ),
    ];

    const CORNER_UVS: [[f32; 2]; 4] = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];
    // Two counter-clockwise triangles per quad
    const QUAD_TRIANGLES: [usize; 6] = [0, 1, 2, 2, 3, 0];

    let mut data = GeometryData::default();
    for (normal, corners) in FACES {
        for corner in QUAD_TRIANGLES {
            data.positions.push(corners[corner]);
            data.normals.push(normal);
            data.uvs.push(CORNER_UVS[corner]);
        }
    }
    data
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cube_has_36_corners() {
        let cube = generate_cube();
        assert_eq!(cube.vertex_count(), 36);
        assert_eq!(cube.triangle_count(), 12);
        assert_eq!(cube.normals.len(), 36);
        assert_eq!(cube.uvs.len(), 36);
    }

    #[test]
    fn cube_is_unit_sized() {
        let cube = generate_cube();
        for position in &cube.positions {
            for &coordinate in position {
                assert!(coordinate == 0.5 || coordinate == -0.5);
            }
        }
    }
}
