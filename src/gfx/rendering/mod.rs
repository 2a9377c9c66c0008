pub mod color_mode;
pub mod render_engine;

// Re-export main types
pub use color_mode::{ColorMode, DrawUniform};
pub use render_engine::RenderEngine;
