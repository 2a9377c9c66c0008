//! # Mesh Import and Placement
//!
//! Converts the triangle list returned by the OBJ loading collaborator into a
//! centered, ground-seated object descriptor and finds a non-overlapping spot
//! for it on the ground plane.
//!
//! Import is all-or-nothing: every fallible step runs before any scene state
//! or GPU resource is touched, so a failed import leaves the scene exactly as
//! it was.

use cgmath::Vector3;

use crate::gfx::scene::{object::ObjectPlacement, GROUND_PLANE_Y};

use super::GeometryData;

/// Two placed footprint circles may touch up to this tolerance.
const PLACEMENT_EPSILON: f32 = 0.05;

/// Why an import failed. All variants are recoverable.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("could not parse mesh file: {0}")]
    Parse(#[from] tobj::LoadError),
    #[error("file contains no mesh")]
    NoMesh,
    #[error("mesh has no position data")]
    NoPositions,
    #[error("no triangles left after filtering degenerate faces")]
    EmptyGeometry,
}

/// Loads an OBJ file and flattens the first mesh into a triangle list.
///
/// Faces with fewer than three indices are skipped; larger faces are fan
/// triangulated. Normals and UVs are carried over only when the mesh provides
/// one per vertex.
pub fn load_geometry(path: &str) -> Result<GeometryData, ImportError> {
    let (models, _materials) = tobj::load_obj(
        path,
        &tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        },
    )?;

    let model = models.first().ok_or(ImportError::NoMesh)?;
    let mesh = &model.mesh;

    if mesh.positions.is_empty() {
        return Err(ImportError::NoPositions);
    }

    let mut corners: Vec<u32> = Vec::with_capacity(mesh.indices.len());
    if mesh.face_arities.is_empty() {
        // Already triangulated; a trailing partial face is dropped.
        corners.extend(mesh.indices.chunks_exact(3).flatten().copied());
    } else {
        let mut next = 0usize;
        for &arity in &mesh.face_arities {
            let arity = arity as usize;
            let face = &mesh.indices[next..next + arity];
            next += arity;
            if arity < 3 {
                continue;
            }
            for i in 1..arity - 1 {
                corners.extend_from_slice(&[face[0], face[i], face[i + 1]]);
            }
        }
    }

    if corners.is_empty() {
        return Err(ImportError::EmptyGeometry);
    }

    let vertex_count = mesh.positions.len() / 3;
    let has_normals = mesh.normals.len() == mesh.positions.len();
    let has_uvs = mesh.texcoords.len() / 2 == vertex_count;

    let mut data = GeometryData::default();
    for &corner in &corners {
        let i = corner as usize;
        data.positions.push([
            mesh.positions[i * 3],
            mesh.positions[i * 3 + 1],
            mesh.positions[i * 3 + 2],
        ]);
        if has_normals {
            data.normals.push([
                mesh.normals[i * 3],
                mesh.normals[i * 3 + 1],
                mesh.normals[i * 3 + 2],
            ]);
        }
        if has_uvs {
            data.uvs
                .push([mesh.texcoords[i * 2], mesh.texcoords[i * 2 + 1]]);
        }
    }

    log::debug!(
        "loaded {}: {} triangles (normals: {}, uvs: {})",
        path,
        data.triangle_count(),
        has_normals,
        has_uvs
    );

    Ok(data)
}

/// A triangle list recentered for placement, with its placement metrics.
///
/// The mesh is shifted so its bounding box is centered on the local Y axis in
/// X/Z and its lowest point sits at local Y = 0 (seated on the ground once
/// translated there).
#[derive(Debug, Clone)]
pub struct ImportedGeometry {
    pub data: GeometryData,
    /// Planar bounding extent before scale, with a margin for placement
    pub base_footprint: f32,
    /// Maximum distance from the local origin to any vertex, before scale
    pub bounding_radius: f32,
}

impl ImportedGeometry {
    pub fn prepare(mut data: GeometryData) -> Result<Self, ImportError> {
        if data.positions.is_empty() {
            return Err(ImportError::EmptyGeometry);
        }

        let mut min = data.positions[0];
        let mut max = data.positions[0];
        for position in &data.positions {
            for axis in 0..3 {
                min[axis] = min[axis].min(position[axis]);
                max[axis] = max[axis].max(position[axis]);
            }
        }

        let center_x = (min[0] + max[0]) * 0.5;
        let center_z = (min[2] + max[2]) * 0.5;

        let mut bounding_radius_sq = 0.0f32;
        for position in &mut data.positions {
            position[0] -= center_x;
            position[1] -= min[1];
            position[2] -= center_z;

            let distance_sq =
                position[0] * position[0] + position[1] * position[1] + position[2] * position[2];
            bounding_radius_sq = bounding_radius_sq.max(distance_sq);
        }

        let width_x = max[0] - min[0];
        let width_z = max[2] - min[2];
        let base_footprint = 1.0f32.max(width_x).max(width_z) + 0.5;

        Ok(Self {
            data,
            base_footprint,
            bounding_radius: bounding_radius_sq.sqrt(),
        })
    }
}

/// Finds a ground-plane position whose footprint circle does not overlap any
/// existing placement.
///
/// The candidate starts at the origin and walks right along +X one footprint
/// width at a time until it is clear of every existing circle. Each step
/// strictly increases X, so the search always terminates.
pub fn find_free_slot(
    existing: &[ObjectPlacement],
    base_footprint: f32,
    scale: f32,
) -> Vector3<f32> {
    let radius = base_footprint * scale * 0.5;
    let step = base_footprint * scale;
    let mut candidate = Vector3::new(0.0, GROUND_PLANE_Y, 0.0);

    loop {
        let overlapping = existing.iter().any(|placement| {
            let dx = candidate.x - placement.translation.x;
            let dz = candidate.z - placement.translation.z;
            let planar_distance = (dx * dx + dz * dz).sqrt();
            planar_distance < radius + placement.footprint_radius() - PLACEMENT_EPSILON
        });
        if !overlapping {
            return candidate;
        }
        candidate.x += step;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn box_geometry(min: [f32; 3], max: [f32; 3]) -> GeometryData {
        // Two triangles spanning the box diagonal are enough to exercise the
        // bounding-box math.
        GeometryData {
            positions: vec![
                min,
                [max[0], min[1], min[2]],
                max,
                max,
                [min[0], max[1], max[2]],
                min,
            ],
            normals: Vec::new(),
            uvs: Vec::new(),
        }
    }

    fn placement_at(x: f32, base_footprint: f32, scale: f32) -> ObjectPlacement {
        ObjectPlacement {
            translation: Vector3::new(x, GROUND_PLANE_Y, 0.0),
            scale,
            base_footprint,
            bounding_radius: 1.0,
        }
    }

    #[test]
    fn prepare_centers_in_x_and_z_and_seats_on_ground() {
        let imported =
            ImportedGeometry::prepare(box_geometry([1.0, 2.0, 5.0], [3.0, 4.0, 9.0])).unwrap();

        let mut min = imported.data.positions[0];
        let mut max = imported.data.positions[0];
        for position in &imported.data.positions {
            for axis in 0..3 {
                min[axis] = min[axis].min(position[axis]);
                max[axis] = max[axis].max(position[axis]);
            }
        }

        assert_eq!((min[0] + max[0]) * 0.5, 0.0);
        assert_eq!((min[2] + max[2]) * 0.5, 0.0);
        assert_eq!(min[1], 0.0);
    }

    #[test]
    fn prepare_computes_footprint_with_margin() {
        // widths: x = 2, z = 4 -> footprint max(1, 2, 4) + 0.5
        let imported =
            ImportedGeometry::prepare(box_geometry([1.0, 2.0, 5.0], [3.0, 4.0, 9.0])).unwrap();
        assert_eq!(imported.base_footprint, 4.5);
    }

    #[test]
    fn prepare_footprint_has_unit_minimum() {
        let imported =
            ImportedGeometry::prepare(box_geometry([0.0, 0.0, 0.0], [0.1, 0.1, 0.1])).unwrap();
        assert_eq!(imported.base_footprint, 1.5);
    }

    #[test]
    fn prepare_bounding_radius_covers_all_vertices() {
        let imported =
            ImportedGeometry::prepare(box_geometry([-1.0, 0.0, -1.0], [1.0, 2.0, 1.0])).unwrap();
        // Farthest recentered corner is (±1, 2, ±1)
        let expected = (1.0f32 + 4.0 + 1.0).sqrt();
        assert!((imported.bounding_radius - expected).abs() < 1e-6);
    }

    #[test]
    fn prepare_rejects_empty_geometry() {
        assert!(matches!(
            ImportedGeometry::prepare(GeometryData::default()),
            Err(ImportError::EmptyGeometry)
        ));
    }

    #[test]
    fn first_object_lands_at_origin() {
        let slot = find_free_slot(&[], 2.5, 1.0);
        assert_eq!(slot, Vector3::new(0.0, GROUND_PLANE_Y, 0.0));
    }

    #[test]
    fn second_identical_object_lands_one_footprint_to_the_right() {
        let existing = vec![placement_at(0.0, 2.5, 1.0)];
        let slot = find_free_slot(&existing, 2.5, 1.0);
        assert_eq!(slot.x, 2.5);
        assert_eq!(slot.y, GROUND_PLANE_Y);
        assert_eq!(slot.z, 0.0);
    }

    #[test]
    fn placements_never_overlap_beyond_tolerance() {
        let footprints = [1.5f32, 3.0, 2.0, 4.5, 1.5];
        let mut placed: Vec<ObjectPlacement> = Vec::new();
        for &footprint in &footprints {
            let translation = find_free_slot(&placed, footprint, 1.0);
            placed.push(ObjectPlacement {
                translation,
                scale: 1.0,
                base_footprint: footprint,
                bounding_radius: 1.0,
            });
        }

        for i in 0..placed.len() {
            for j in (i + 1)..placed.len() {
                let dx = placed[i].translation.x - placed[j].translation.x;
                let dz = placed[i].translation.z - placed[j].translation.z;
                let planar = (dx * dx + dz * dz).sqrt();
                let limit =
                    placed[i].footprint_radius() + placed[j].footprint_radius() - PLACEMENT_EPSILON;
                assert!(
                    planar >= limit,
                    "objects {i} and {j} overlap: {planar} < {limit}"
                );
            }
        }
    }

    #[test]
    fn scaled_neighbours_respect_scaled_radii() {
        let existing = vec![placement_at(0.0, 2.0, 2.0)];
        let slot = find_free_slot(&existing, 2.0, 1.0);
        // Existing circle radius 2.0, new circle radius 1.0; candidate steps
        // by 2.0 until clear.
        assert!(slot.x >= 2.0 + 1.0 - PLACEMENT_EPSILON);
    }

    #[test]
    fn load_geometry_defaults_missing_attributes() {
        let path = std::env::temp_dir().join("cairn_importer_triangle.obj");
        std::fs::write(&path, "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n").unwrap();

        let data = load_geometry(path.to_str().unwrap()).unwrap();
        assert_eq!(data.vertex_count(), 3);
        assert!(data.normals.is_empty());
        assert!(data.uvs.is_empty());
    }

    #[test]
    fn load_geometry_reports_parse_failures() {
        assert!(matches!(
            load_geometry("/nonexistent/cairn-no-such-file.obj"),
            Err(ImportError::Parse(_))
        ));
    }
}
