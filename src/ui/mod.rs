//! # User Interface Module
//!
//! Dear ImGui overlay drawn on top of the scene.
//!
//! ## Key Components
//!
//! - [`UiManager`] - ImGui integration with winit and wgpu
//! - [`panel`] - The controls window and the [`UiCommand`]s it emits
//!
//! The overlay never touches the scene directly: toggles are edited on a
//! copy and commands are applied by the app once the frame is presented.
//! When the overlay wants the mouse, pointer events are kept away from
//! scene picking.

pub mod manager;
pub mod panel;

// Re-export main types
pub use manager::UiManager;
pub use panel::{control_panel, SelectionReadout, UiCommand};
