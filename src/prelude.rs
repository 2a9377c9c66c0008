//! # Cairn Prelude
//!
//! Brings the commonly used types into scope:
//!
//! ```no_run
//! use cairn::prelude::*;
//!
//! fn main() -> anyhow::Result<()> {
//!     let mut app = cairn::default();
//!     app.import_object("models/rock.obj")?;
//!     app.set_color_mode(ColorMode::Normal);
//!     app.run()
//! }
//! ```

// Re-export core application types
pub use crate::app::CairnApp;
pub use crate::default;

// Re-export graphics and scene types
pub use crate::gfx::camera::{FreeCamera, ProjectionKind};
pub use crate::gfx::geometry::{GeometryData, ImportError};
pub use crate::gfx::picking::Ray;
pub use crate::gfx::rendering::ColorMode;
pub use crate::gfx::scene::{ObjectPlacement, Scene, SceneObject, GROUND_PLANE_Y};

// Re-export interaction types
pub use crate::input::{InteractionMode, PointerButton, ViewportController};

// Re-export common external dependencies
pub use cgmath::{InnerSpace, Vector3, Zero};
