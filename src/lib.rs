// src/lib.rs
//! Cairn 3D Viewport
//!
//! An interactive 3D viewport built on wgpu and winit: import meshes, place
//! them without overlap on a ground plane, and navigate, select and drag
//! them with the mouse.

pub mod app;
pub mod gfx;
pub mod input;
pub mod prelude;
pub mod wgpu_utils;

// Re-export main types for convenience
pub use app::CairnApp;

/// Creates a default Cairn application instance
pub fn default() -> CairnApp {
    pollster::block_on(CairnApp::new())
}
