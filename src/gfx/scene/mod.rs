pub mod object;
pub mod scene;
pub mod vertex;

// Re-export main types
pub use object::{ObjectPlacement, SceneObject};
pub use scene::{CameraStateCallback, Scene};

/// World height of the ground plane: the top surface of the slab the
/// renderer draws. Objects are seated on it and dragged along it.
pub const GROUND_PLANE_Y: f32 = -1.95;
