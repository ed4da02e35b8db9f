//! Sketchboard browser shell
//!
//! Wires the core board to a JavaScript-drawn canvas and browser storage.

mod shortcuts;

pub use shortcuts::{Shortcut, ShortcutAction, ShortcutRegistry};

#[cfg(target_arch = "wasm32")]
mod web;

#[cfg(target_arch = "wasm32")]
pub use web::{JsSurface, WebBoard, extract_diagram, extract_markdown, start};
