//! Renderer interface consumed by the screens.
//!
//! A frame is `begin_frame` on each surface (draws go to the most recently
//! begun surface) followed by a single `end_frame` that presents them all.

use crate::core::control::{Bounds, Point};

/// 8-bit RGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb(pub u8, pub u8, pub u8);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    Left,
    Center,
}

/// One draw primitive.  What it looks like is up to the renderer.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Text {
        at: Point,
        text: String,
        color: Rgb,
        align: Align,
        bold: bool,
    },
    Control {
        bounds: Bounds,
        label: String,
        text_scale: f32,
        selected: bool,
    },
}

pub trait Renderer {
    fn surface_count(&self) -> usize;
    /// Surface width in cells.
    fn width(&self, surface: usize) -> f32;
    /// Surface height in cells.
    fn height(&self, surface: usize) -> f32;
    fn begin_frame(&mut self, surface: usize, background: Rgb);
    fn draw(&mut self, command: DrawCommand);
    fn end_frame(&mut self) -> anyhow::Result<()>;
}

impl DrawCommand {
    pub fn text(at: Point, text: impl Into<String>, color: Rgb) -> Self {
        DrawCommand::Text {
            at,
            text: text.into(),
            color,
            align: Align::Left,
            bold: false,
        }
    }

    pub fn centered(at: Point, text: impl Into<String>, color: Rgb) -> Self {
        DrawCommand::Text {
            at,
            text: text.into(),
            color,
            align: Align::Center,
            bold: false,
        }
    }

    pub fn bold(mut self) -> Self {
        if let DrawCommand::Text { bold, .. } = &mut self {
            *bold = true;
        }
        self
    }
}
