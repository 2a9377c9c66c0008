//! Free-look camera with Euler rotation in degrees.
//!
//! The camera stores its own placement (position plus pitch/yaw/roll); the
//! view matrix undoes that placement every frame and is never cached across
//! mutations.

use cgmath::{Deg, Matrix4, Vector3, Vector4};

/// Degrees of rotation per pixel of pointer drag.
pub const ORBIT_SENSITIVITY: f32 = 0.3;
/// World units per pixel of pointer drag while panning.
pub const PAN_SENSITIVITY: f32 = 0.01;
/// World units per wheel detent while dollying.
pub const DOLLY_STEP: f32 = 0.5;
/// World units per keyboard step, normal and with the fast modifier.
pub const KEY_MOVE_STEP: f32 = 0.1;
pub const KEY_MOVE_STEP_FAST: f32 = 0.25;
/// Degrees per keyboard rotation step.
pub const KEY_ROTATE_STEP: f32 = 2.0;

/// Orbiting around a focus point never collapses below this radius.
const MIN_FOCUS_RADIUS: f32 = 0.25;

const DEFAULT_POSITION: Vector3<f32> = Vector3::new(3.0, 3.5, 15.0);
const DEFAULT_ROTATION_DEGREES: Vector3<f32> = Vector3::new(-15.0, 15.0, 0.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectionKind {
    Perspective,
    Orthographic,
}

#[derive(Debug, Clone, Copy)]
pub struct FreeCamera {
    pub position: Vector3<f32>,
    /// pitch = x, yaw = y, roll = z, always in degrees
    pub rotation_degrees: Vector3<f32>,
    pub projection: ProjectionKind,
}

impl Default for FreeCamera {
    fn default() -> Self {
        Self {
            position: DEFAULT_POSITION,
            rotation_degrees: DEFAULT_ROTATION_DEGREES,
            projection: ProjectionKind::Perspective,
        }
    }
}

impl FreeCamera {
    /// Restores the default pose and projection.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Free-look orbit: yaw and pitch follow the pointer, unclamped.
    pub fn orbit(&mut self, delta_x: f32, delta_y: f32) {
        self.rotation_degrees.y += ORBIT_SENSITIVITY * delta_x;
        self.rotation_degrees.x += ORBIT_SENSITIVITY * delta_y;
    }

    /// Translates the camera without rotating it.
    ///
    /// With the vertical modifier the camera moves along its own up axis;
    /// otherwise it slides along world X and Z.
    pub fn pan(&mut self, delta_x: f32, delta_y: f32, vertical_modifier: bool) {
        if vertical_modifier {
            self.position += self.up_vector() * (-PAN_SENSITIVITY * delta_y);
        } else {
            self.position.x += PAN_SENSITIVITY * delta_x;
            self.position.z += -PAN_SENSITIVITY * delta_y;
        }
    }

    /// Moves the camera along world Z, half a unit per wheel detent.
    pub fn dolly(&mut self, steps: f32) {
        self.position.z += -DOLLY_STEP * steps;
    }

    /// Moves the camera on a circle around `focus`, horizontal drag only.
    ///
    /// The radius is the current planar distance to the focus (at least
    /// [`MIN_FOCUS_RADIUS`]); yaw advances with the azimuth so the focus stays
    /// centered, and the camera's height is preserved.
    pub fn orbit_around_focus(&mut self, delta_x: f32, focus: Vector3<f32>) {
        let offset_x = self.position.x - focus.x;
        let offset_z = self.position.z - focus.z;
        let radius = (offset_x * offset_x + offset_z * offset_z)
            .sqrt()
            .max(MIN_FOCUS_RADIUS);

        let delta_degrees = ORBIT_SENSITIVITY * delta_x;
        let azimuth = offset_x.atan2(offset_z) + delta_degrees.to_radians();

        self.position.x = focus.x + radius * azimuth.sin();
        self.position.z = focus.z + radius * azimuth.cos();
        self.rotation_degrees.y += delta_degrees;
    }

    /// Discrete keyboard translation.
    pub fn translate_step(&mut self, delta: Vector3<f32>) {
        self.position += delta;
    }

    /// Discrete keyboard rotation, in degrees.
    pub fn rotate_step(&mut self, delta_degrees: Vector3<f32>) {
        self.rotation_degrees += delta_degrees;
    }

    pub fn toggle_projection(&mut self) {
        self.projection = match self.projection {
            ProjectionKind::Perspective => ProjectionKind::Orthographic,
            ProjectionKind::Orthographic => ProjectionKind::Perspective,
        };
    }

    /// The camera rig rotation: roll innermost, yaw outermost.
    fn rig_rotation(&self) -> Matrix4<f32> {
        Matrix4::from_angle_y(Deg(self.rotation_degrees.y))
            * Matrix4::from_angle_x(Deg(self.rotation_degrees.x))
            * Matrix4::from_angle_z(Deg(self.rotation_degrees.z))
    }

    /// The camera's local up axis in world space.
    pub fn up_vector(&self) -> Vector3<f32> {
        (self.rig_rotation() * Vector4::new(0.0, 1.0, 0.0, 0.0)).truncate()
    }

    /// Builds the world-to-camera matrix by undoing the rig in reverse:
    /// V = Rz(-roll) * Rx(-pitch) * Ry(-yaw) * T(-position)
    pub fn build_view_matrix(&self) -> Matrix4<f32> {
        Matrix4::from_angle_z(Deg(-self.rotation_degrees.z))
            * Matrix4::from_angle_x(Deg(-self.rotation_degrees.x))
            * Matrix4::from_angle_y(Deg(-self.rotation_degrees.y))
            * Matrix4::from_translation(-self.position)
    }

    /// Builds the projection matrix for the given viewport.
    ///
    /// A zero-height viewport falls back to an aspect ratio of 1 instead of
    /// dividing by zero.
    pub fn build_projection_matrix(&self, width: u32, height: u32) -> Matrix4<f32> {
        let aspect = if height > 0 {
            width as f32 / height as f32
        } else {
            1.0
        };
        match self.projection {
            ProjectionKind::Perspective => cgmath::perspective(Deg(45.0), aspect, 0.1, 100.0),
            ProjectionKind::Orthographic => {
                let half_h = 4.0;
                let half_w = aspect * half_h;
                cgmath::ortho(-half_w, half_w, -half_h, half_h, -100.0, 100.0)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn camera_at(position: Vector3<f32>) -> FreeCamera {
        FreeCamera {
            position,
            rotation_degrees: Vector3::new(0.0, 0.0, 0.0),
            projection: ProjectionKind::Perspective,
        }
    }

    #[test]
    fn view_matrix_undoes_translation() {
        let camera = camera_at(Vector3::new(0.0, 0.0, 10.0));
        let origin = camera.build_view_matrix() * Vector4::new(0.0, 0.0, 0.0, 1.0);
        assert_relative_eq!(origin.truncate(), Vector3::new(0.0, 0.0, -10.0), epsilon = 1e-5);
    }

    #[test]
    fn view_matrix_yaw_turns_toward_negative_x() {
        let mut camera = camera_at(Vector3::new(0.0, 0.0, 0.0));
        camera.rotation_degrees.y = 90.0;
        // Looking down -X now; a point on -X ends up straight ahead.
        let ahead = camera.build_view_matrix() * Vector4::new(-1.0, 0.0, 0.0, 1.0);
        assert_relative_eq!(ahead.truncate(), Vector3::new(0.0, 0.0, -1.0), epsilon = 1e-5);
    }

    #[test]
    fn orbit_applies_sensitivity_per_pixel() {
        let mut camera = camera_at(Vector3::new(0.0, 0.0, 0.0));
        camera.orbit(10.0, -20.0);
        assert_relative_eq!(camera.rotation_degrees.y, 3.0);
        assert_relative_eq!(camera.rotation_degrees.x, -6.0);
    }

    #[test]
    fn pan_slides_along_world_axes() {
        let mut camera = camera_at(Vector3::new(0.0, 0.0, 0.0));
        camera.pan(10.0, 20.0, false);
        assert_relative_eq!(camera.position.x, 0.1);
        assert_relative_eq!(camera.position.z, -0.2);
        assert_relative_eq!(camera.position.y, 0.0);
    }

    #[test]
    fn vertical_pan_moves_along_camera_up() {
        let mut camera = camera_at(Vector3::new(0.0, 0.0, 0.0));
        camera.pan(50.0, 10.0, true);
        // Unrotated camera: up is world Y, horizontal delta is ignored.
        assert_relative_eq!(camera.position, Vector3::new(0.0, -0.1, 0.0), epsilon = 1e-6);
    }

    #[test]
    fn dolly_moves_along_world_z() {
        let mut camera = camera_at(Vector3::new(0.0, 0.0, 5.0));
        camera.dolly(2.0);
        assert_relative_eq!(camera.position.z, 4.0);
    }

    #[test]
    fn orbit_around_focus_preserves_height_and_radius() {
        let mut camera = camera_at(Vector3::new(0.0, 2.0, 5.0));
        let focus = Vector3::new(0.0, 0.0, 0.0);
        // 300 px * 0.3 deg/px = a quarter turn
        camera.orbit_around_focus(300.0, focus);

        assert_relative_eq!(camera.position.x, 5.0, epsilon = 1e-4);
        assert_relative_eq!(camera.position.z, 0.0, epsilon = 1e-4);
        assert_relative_eq!(camera.position.y, 2.0);
        assert_relative_eq!(camera.rotation_degrees.y, 90.0);
    }

    #[test]
    fn orbit_around_focus_clamps_tiny_radius() {
        let mut camera = camera_at(Vector3::new(0.0, 5.0, 0.0));
        camera.orbit_around_focus(10.0, Vector3::new(0.0, 0.0, 0.0));
        let planar = (camera.position.x * camera.position.x
            + camera.position.z * camera.position.z)
            .sqrt();
        assert_relative_eq!(planar, 0.25, epsilon = 1e-6);
        assert_relative_eq!(camera.position.y, 5.0);
    }

    #[test]
    fn zero_height_viewport_falls_back_to_square_aspect() {
        let camera = FreeCamera::default();
        let degenerate = camera.build_projection_matrix(800, 0);
        let square = camera.build_projection_matrix(100, 100);
        assert_relative_eq!(degenerate, square);
    }

    #[test]
    fn toggle_projection_switches_kind() {
        let mut camera = FreeCamera::default();
        camera.toggle_projection();
        assert_eq!(camera.projection, ProjectionKind::Orthographic);
        camera.toggle_projection();
        assert_eq!(camera.projection, ProjectionKind::Perspective);
    }

    #[test]
    fn reset_restores_default_pose() {
        let mut camera = FreeCamera::default();
        camera.orbit(100.0, 50.0);
        camera.dolly(4.0);
        camera.toggle_projection();
        camera.reset();

        assert_relative_eq!(camera.position, Vector3::new(3.0, 3.5, 15.0));
        assert_relative_eq!(camera.rotation_degrees, Vector3::new(-15.0, 15.0, 0.0));
        assert_eq!(camera.projection, ProjectionKind::Perspective);
    }
}
