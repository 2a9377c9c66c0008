//! Pointer input handling for the viewport.

pub mod interaction;

// Re-export main types
pub use interaction::{InteractionMode, PointerButton, ViewportController};
