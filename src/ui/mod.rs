//! Rendering layer: draw commands, the camera, and the Ratatui backend.
//!
//! Screens speak in [`render::DrawCommand`]s; only [`terminal`] knows about
//! Ratatui widgets.

pub mod camera;
pub mod layout;
pub mod render;
pub mod terminal;
pub mod text;
pub mod theme;
