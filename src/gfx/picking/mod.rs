//! # Ray Picking
//!
//! Converts screen coordinates into world-space rays and intersects them
//! against the ground plane and object bounding spheres.
//!
//! 1. **Mouse to Ray**: unproject the cursor through the inverse projection
//!    and view matrices
//! 2. **Ray-Object Intersection**: test the ray against each object's
//!    picking sphere
//! 3. **Selection**: the closest intersected object wins
//!
//! Geometric degeneracies (near-parallel ground rays, a collapsed viewport)
//! are not errors; they return `None` and the caller skips the dependent
//! operation for that frame.

use cgmath::{InnerSpace, SquareMatrix, Vector3, Vector4};

use crate::gfx::{
    camera::FreeCamera,
    scene::{object::ObjectPlacement, GROUND_PLANE_Y},
};

/// Rays steeper than this against the ground normal count as parallel.
const GROUND_PARALLEL_EPSILON: f32 = 1e-4;

/// A 3D ray for intersection testing
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    /// Ray origin point in world space
    pub origin: Vector3<f32>,
    /// Ray direction (normalized)
    pub direction: Vector3<f32>,
}

impl Ray {
    /// Create a new ray
    pub fn new(origin: Vector3<f32>, direction: Vector3<f32>) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    /// Get a point along the ray at distance t
    pub fn point_at(&self, t: f32) -> Vector3<f32> {
        self.origin + self.direction * t
    }
}

/// Convert screen coordinates to a world-space ray
///
/// The pixel goes to normalized device coordinates (Y inverted), through the
/// inverse projection to a view-space direction (forward = -1), then through
/// the inverse view to world space. The ray originates at the camera.
/// Returns `None` if the viewport has no extent.
pub fn screen_to_ray(
    screen_pos: (f32, f32),
    viewport: (u32, u32),
    camera: &FreeCamera,
) -> Option<Ray> {
    let (width, height) = viewport;
    if width == 0 || height == 0 {
        return None;
    }

    let ndc_x = (2.0 * screen_pos.0) / width as f32 - 1.0;
    let ndc_y = 1.0 - (2.0 * screen_pos.1) / height as f32; // Flip Y axis

    let inv_projection = camera.build_projection_matrix(width, height).invert()?;
    let inv_view = camera.build_view_matrix().invert()?;

    // Unproject to a view-space direction pointing down the forward axis
    let mut ray_eye = inv_projection * Vector4::new(ndc_x, ndc_y, -1.0, 1.0);
    ray_eye.z = -1.0;
    ray_eye.w = 0.0;

    let direction = (inv_view * ray_eye).truncate();
    Some(Ray::new(camera.position, direction))
}

/// Intersects the ray with the ground plane at [`GROUND_PLANE_Y`].
///
/// Near-parallel rays and intersections behind the origin yield `None`. The
/// hit point is snapped exactly onto the ground height so repeated drags
/// cannot drift off the plane.
pub fn intersect_ground_plane(ray: &Ray) -> Option<Vector3<f32>> {
    if ray.direction.y.abs() < GROUND_PARALLEL_EPSILON {
        return None;
    }

    let t = (GROUND_PLANE_Y - ray.origin.y) / ray.direction.y;
    if t < 0.0 {
        return None;
    }

    let mut hit = ray.point_at(t);
    hit.y = GROUND_PLANE_Y;
    Some(hit)
}

/// Ray-sphere intersection, returning the smallest non-negative ray
/// parameter.
///
/// Prefers the near root; if that lies behind the origin (ray started inside
/// the sphere) the far root is used instead.
pub fn intersect_sphere(ray: &Ray, center: Vector3<f32>, radius: f32) -> Option<f32> {
    let to_origin = ray.origin - center;
    // Direction is normalized, so the quadratic's leading coefficient is 1
    let half_b = to_origin.dot(ray.direction);
    let c = to_origin.dot(to_origin) - radius * radius;

    let discriminant = half_b * half_b - c;
    if discriminant < 0.0 {
        return None;
    }

    let sqrt_discriminant = discriminant.sqrt();
    let near = -half_b - sqrt_discriminant;
    if near >= 0.0 {
        return Some(near);
    }
    let far = -half_b + sqrt_discriminant;
    if far >= 0.0 {
        return Some(far);
    }
    None
}

/// Picks the object whose bounding sphere the ray hits closest to its origin.
///
/// Every placement is treated as a sphere of its scaled bounding radius
/// centered at its translation. Returns `None` if nothing intersects. When
/// two spheres yield exactly the same ray parameter the winner is
/// implementation-defined and not guaranteed stable.
pub fn pick_object(ray: &Ray, placements: &[ObjectPlacement]) -> Option<usize> {
    let mut closest: Option<(usize, f32)> = None;

    for (index, placement) in placements.iter().enumerate() {
        if let Some(t) = intersect_sphere(ray, placement.translation, placement.picking_radius()) {
            if closest.map_or(true, |(_, best)| t < best) {
                closest = Some((index, t));
            }
        }
    }

    closest.map(|(index, _)| index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn placement_at(translation: Vector3<f32>, bounding_radius: f32) -> ObjectPlacement {
        ObjectPlacement::new(translation, 1.5, bounding_radius)
    }

    fn camera_looking_down_z() -> FreeCamera {
        FreeCamera {
            position: Vector3::new(0.0, 0.0, 10.0),
            rotation_degrees: Vector3::new(0.0, 0.0, 0.0),
            ..FreeCamera::default()
        }
    }

    #[test]
    fn unit_sphere_hit_at_nine() {
        let ray = Ray::new(Vector3::new(0.0, 0.0, 10.0), Vector3::new(0.0, 0.0, -1.0));
        let t = intersect_sphere(&ray, Vector3::new(0.0, 0.0, 0.0), 1.0).unwrap();
        assert_relative_eq!(t, 9.0);
    }

    #[test]
    fn sphere_behind_origin_is_rejected() {
        let ray = Ray::new(Vector3::new(0.0, 0.0, 10.0), Vector3::new(0.0, 0.0, 1.0));
        assert!(intersect_sphere(&ray, Vector3::new(0.0, 0.0, 0.0), 1.0).is_none());
    }

    #[test]
    fn ray_inside_sphere_uses_far_root() {
        let ray = Ray::new(Vector3::new(0.0, 0.0, 0.0), Vector3::new(0.0, 0.0, -1.0));
        let t = intersect_sphere(&ray, Vector3::new(0.0, 0.0, 0.0), 2.0).unwrap();
        assert_relative_eq!(t, 2.0);
    }

    #[test]
    fn parallel_ray_misses_ground() {
        let ray = Ray::new(Vector3::new(0.0, 0.0, 0.0), Vector3::new(1.0, 0.0, 0.0));
        assert!(intersect_ground_plane(&ray).is_none());
    }

    #[test]
    fn ground_hit_is_snapped_onto_the_plane() {
        let ray = Ray::new(Vector3::new(0.0, 0.0, 10.0), Vector3::new(0.0, -1.0, -1.0));
        let hit = intersect_ground_plane(&ray).unwrap();
        assert_eq!(hit.y, GROUND_PLANE_Y);
    }

    #[test]
    fn upward_ray_misses_ground() {
        let ray = Ray::new(Vector3::new(0.0, 0.0, 0.0), Vector3::new(0.0, 1.0, 0.0));
        assert!(intersect_ground_plane(&ray).is_none());
    }

    #[test]
    fn pick_prefers_the_closest_object() {
        let ray = Ray::new(Vector3::new(0.0, 0.0, 10.0), Vector3::new(0.0, 0.0, -1.0));
        let placements = vec![
            placement_at(Vector3::new(0.0, 0.0, 0.0), 1.0),
            placement_at(Vector3::new(0.0, 0.0, 5.0), 1.0),
        ];
        assert_eq!(pick_object(&ray, &placements), Some(1));
    }

    #[test]
    fn pick_respects_scaled_radius() {
        let ray = Ray::new(Vector3::new(0.0, 2.0, 10.0), Vector3::new(0.0, 0.0, -1.0));
        let mut placements = vec![placement_at(Vector3::new(0.0, 0.0, 0.0), 1.0)];
        // Radius 1 misses a ray passing 2 units above center...
        assert_eq!(pick_object(&ray, &placements), None);
        // ...but scaling the object to 4x grows the picking sphere over it.
        placements[0].scale = 4.0;
        assert_eq!(pick_object(&ray, &placements), Some(0));
    }

    #[test]
    fn pick_reports_no_hit() {
        let ray = Ray::new(Vector3::new(0.0, 0.0, 10.0), Vector3::new(0.0, 1.0, 0.0));
        let placements = vec![placement_at(Vector3::new(0.0, 0.0, 0.0), 1.0)];
        assert_eq!(pick_object(&ray, &placements), None);
    }

    #[test]
    fn center_pixel_ray_points_forward() {
        let camera = camera_looking_down_z();
        let ray = screen_to_ray((400.0, 300.0), (800, 600), &camera).unwrap();
        assert_eq!(ray.origin, camera.position);
        assert_relative_eq!(ray.direction, Vector3::new(0.0, 0.0, -1.0), epsilon = 1e-5);
    }

    #[test]
    fn top_of_screen_rays_point_upward() {
        let camera = camera_looking_down_z();
        let ray = screen_to_ray((400.0, 0.0), (800, 600), &camera).unwrap();
        assert!(ray.direction.y > 0.0);
    }

    #[test]
    fn collapsed_viewport_yields_no_ray() {
        let camera = camera_looking_down_z();
        assert!(screen_to_ray((0.0, 0.0), (0, 600), &camera).is_none());
        assert!(screen_to_ray((0.0, 0.0), (800, 0), &camera).is_none());
    }
}
