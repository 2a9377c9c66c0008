pub mod camera_utils;
pub mod free_camera;

// Re-export main types
pub use camera_utils::{convert_matrix4_to_array, CameraUniform};
pub use free_camera::{FreeCamera, ProjectionKind};
