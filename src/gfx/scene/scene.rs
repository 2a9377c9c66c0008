//! Scene registry: placed objects, selection/focus state and the camera.

use cgmath::{Vector3, Zero};
use wgpu::Device;

use crate::gfx::{
    camera::FreeCamera,
    geometry::importer::{self, ImportError},
    rendering::color_mode::ColorMode,
};
use crate::wgpu_utils::binding_builder::BindGroupLayoutWithDesc;

use super::object::{Mesh, ObjectPlacement, SceneObject};

/// Observer invoked with `(position, rotation_degrees)` after every camera
/// mutation. Purely informational; the UI layer mirrors the values.
pub type CameraStateCallback = Box<dyn Fn([f32; 3], [f32; 3])>;

/// Base colors cycled through as objects are imported.
const OBJECT_PALETTE: [[f32; 4]; 8] = [
    [1.00, 0.20, 0.20, 1.0],
    [0.20, 1.00, 0.20, 1.0],
    [0.20, 0.60, 1.00, 1.0],
    [1.00, 0.60, 0.20, 1.0],
    [0.80, 0.20, 1.00, 1.0],
    [1.00, 0.90, 0.20, 1.0],
    [0.20, 1.00, 0.80, 1.0],
    [0.90, 0.30, 0.40, 1.0],
];

/// Main scene: ordered object registry, selection/focus state, camera and
/// the active color mode.
pub struct Scene {
    pub camera: FreeCamera,
    pub objects: Vec<SceneObject>,
    selected: Option<usize>,
    focus_point: Vector3<f32>,
    color_mode: ColorMode,
    camera_observer: Option<CameraStateCallback>,
}

impl Scene {
    pub fn new() -> Self {
        Self {
            camera: FreeCamera::default(),
            objects: Vec::new(),
            selected: None,
            focus_point: Vector3::zero(),
            color_mode: ColorMode::Uniform,
            camera_observer: None,
        }
    }

    /// Index of the selected object, if any.
    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected_object(&self) -> Option<&SceneObject> {
        self.selected.and_then(|index| self.objects.get(index))
    }

    pub fn selected_object_mut(&mut self) -> Option<&mut SceneObject> {
        match self.selected {
            Some(index) => self.objects.get_mut(index),
            None => None,
        }
    }

    /// Orbit pivot: the selected object's translation, or the world origin.
    pub fn focus_point(&self) -> Vector3<f32> {
        self.focus_point
    }

    /// Selects an object and moves the focus point to it.
    ///
    /// An out-of-range index clamps to no selection instead of propagating;
    /// deselecting returns the focus to the world origin.
    pub fn select(&mut self, index: Option<usize>) {
        match index {
            Some(i) if i < self.objects.len() => {
                self.selected = Some(i);
                self.focus_point = self.objects[i].placement.translation;
            }
            _ => {
                self.selected = None;
                self.focus_point = Vector3::zero();
            }
        }
    }

    /// Snapshot of all placements, for picking and placement queries.
    pub fn placements(&self) -> Vec<ObjectPlacement> {
        self.objects.iter().map(|object| object.placement).collect()
    }

    /// Imports an OBJ file and places it on the ground without overlapping
    /// any existing object. On failure the scene is left untouched.
    pub fn import_object(&mut self, path: &str) -> Result<usize, ImportError> {
        let geometry = importer::load_geometry(path)?;
        let imported = importer::ImportedGeometry::prepare(geometry)?;

        let translation =
            importer::find_free_slot(&self.placements(), imported.base_footprint, 1.0);
        let placement =
            ObjectPlacement::new(translation, imported.base_footprint, imported.bounding_radius);
        let base_color = OBJECT_PALETTE[self.objects.len() % OBJECT_PALETTE.len()];

        let name = std::path::Path::new(path)
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| format!("object_{}", self.objects.len()));

        let mesh = Mesh::new(&imported.data);
        log::info!(
            "imported {}: {} vertices, footprint {:.2}, placed at x = {:.2}",
            name,
            mesh.vertex_count(),
            imported.base_footprint,
            translation.x
        );

        self.objects
            .push(SceneObject::new(name, mesh, placement, base_color));
        Ok(self.objects.len() - 1)
    }

    pub fn color_mode(&self) -> ColorMode {
        self.color_mode
    }

    pub fn set_color_mode(&mut self, mode: ColorMode) {
        self.color_mode = mode;
    }

    pub fn set_camera_observer(&mut self, callback: CameraStateCallback) {
        self.camera_observer = Some(callback);
    }

    /// Reports the camera pose to the observer, if one is registered. Called
    /// after every camera mutation.
    pub fn emit_camera_state(&self) {
        if let Some(observer) = &self.camera_observer {
            let position = self.camera.position;
            let rotation = self.camera.rotation_degrees;
            observer(
                [position.x, position.y, position.z],
                [rotation.x, rotation.y, rotation.z],
            );
        }
    }

    pub fn set_camera_position(&mut self, x: f32, y: f32, z: f32) {
        self.camera.position = Vector3::new(x, y, z);
        self.emit_camera_state();
    }

    pub fn set_camera_rotation(&mut self, x: f32, y: f32, z: f32) {
        self.camera.rotation_degrees = Vector3::new(x, y, z);
        self.emit_camera_state();
    }

    /// Clears the registry and restores the documented defaults.
    ///
    /// Dropping the objects releases their GPU buffers.
    pub fn reset(&mut self) {
        self.objects.clear();
        self.selected = None;
        self.focus_point = Vector3::zero();
        self.camera.reset();
        self.color_mode = ColorMode::Uniform;
        self.emit_camera_state();
        log::debug!("scene reset");
    }

    /// Initializes GPU resources for all objects. Idempotent; call again
    /// after importing while a device already exists.
    pub fn init_gpu_resources(&mut self, device: &Device, draw_layout: &BindGroupLayoutWithDesc) {
        for object in self.objects.iter_mut() {
            object.init_gpu_resources(device, draw_layout);
        }
    }

    /// Syncs every object's draw uniform (transform, color, color mode).
    pub fn update_draw_uniforms(&mut self, queue: &wgpu::Queue) {
        let mode = self.color_mode;
        for object in &mut self.objects {
            object.update_draw_uniform(queue, mode);
        }
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::geometry::GeometryData;
    use crate::gfx::scene::GROUND_PLANE_Y;
    use approx::assert_relative_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn test_object(translation: Vector3<f32>) -> SceneObject {
        let geometry = GeometryData {
            positions: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            normals: Vec::new(),
            uvs: Vec::new(),
        };
        SceneObject::new(
            "test",
            Mesh::new(&geometry),
            ObjectPlacement::new(translation, 1.5, 1.0),
            [0.8, 0.8, 0.8, 1.0],
        )
    }

    #[test]
    fn select_moves_focus_to_object() {
        let mut scene = Scene::new();
        scene
            .objects
            .push(test_object(Vector3::new(3.0, GROUND_PLANE_Y, 0.0)));
        scene.select(Some(0));
        assert_eq!(scene.selected(), Some(0));
        assert_eq!(scene.focus_point(), Vector3::new(3.0, GROUND_PLANE_Y, 0.0));
    }

    #[test]
    fn out_of_range_selection_clamps_to_none() {
        let mut scene = Scene::new();
        scene
            .objects
            .push(test_object(Vector3::new(0.0, GROUND_PLANE_Y, 0.0)));
        scene.select(Some(5));
        assert_eq!(scene.selected(), None);
        assert_eq!(scene.focus_point(), Vector3::zero());
    }

    #[test]
    fn deselect_returns_focus_to_origin() {
        let mut scene = Scene::new();
        scene
            .objects
            .push(test_object(Vector3::new(3.0, GROUND_PLANE_Y, 0.0)));
        scene.select(Some(0));
        scene.select(None);
        assert_eq!(scene.selected(), None);
        assert_eq!(scene.focus_point(), Vector3::zero());
    }

    #[test]
    fn reset_is_idempotent() {
        let mut scene = Scene::new();
        scene
            .objects
            .push(test_object(Vector3::new(0.0, GROUND_PLANE_Y, 0.0)));
        scene.select(Some(0));
        scene.set_color_mode(ColorMode::Normal);
        scene.set_camera_position(9.0, 9.0, 9.0);

        scene.reset();
        let first_position = scene.camera.position;
        let first_rotation = scene.camera.rotation_degrees;
        assert!(scene.objects.is_empty());
        assert_eq!(scene.selected(), None);
        assert_eq!(scene.color_mode(), ColorMode::Uniform);
        assert_eq!(scene.focus_point(), Vector3::zero());

        scene.reset();
        assert_relative_eq!(scene.camera.position, first_position);
        assert_relative_eq!(scene.camera.rotation_degrees, first_rotation);
        assert!(scene.objects.is_empty());
        assert_eq!(scene.selected(), None);
        assert_eq!(scene.color_mode(), ColorMode::Uniform);
    }

    #[test]
    fn camera_observer_sees_every_mutation() {
        let seen: Rc<RefCell<Vec<([f32; 3], [f32; 3])>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();

        let mut scene = Scene::new();
        scene.set_camera_observer(Box::new(move |position, rotation| {
            sink.borrow_mut().push((position, rotation));
        }));

        scene.set_camera_position(1.0, 2.0, 3.0);
        scene.set_camera_rotation(-10.0, 20.0, 0.0);

        let seen = seen.borrow();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].0, [1.0, 2.0, 3.0]);
        assert_eq!(seen[1].1, [-10.0, 20.0, 0.0]);
    }

    #[test]
    fn failed_import_leaves_scene_untouched() {
        let mut scene = Scene::new();
        scene
            .objects
            .push(test_object(Vector3::new(0.0, GROUND_PLANE_Y, 0.0)));
        scene.select(Some(0));

        let result = scene.import_object("/nonexistent/cairn-missing.obj");
        assert!(result.is_err());
        assert_eq!(scene.objects.len(), 1);
        assert_eq!(scene.selected(), Some(0));
    }
}
