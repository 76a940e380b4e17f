//! Text extent measurement used for layout decisions.

use ratatui::text::Line;

pub trait TextMeasure {
    /// `(width, height)` of `text` in cells.
    fn measure(&self, text: &str) -> (f32, f32);
}

/// Measures by terminal display width (wide glyphs count double).
#[derive(Debug, Default, Clone, Copy)]
pub struct CellMeasure;

impl TextMeasure for CellMeasure {
    fn measure(&self, text: &str) -> (f32, f32) {
        let lines: Vec<&str> = text.lines().collect();
        let width = lines.iter().map(|l| Line::raw(*l).width()).max().unwrap_or(0);
        (width as f32, lines.len().max(1) as f32)
    }
}

/// Scale that makes text of width `text_width` fit within `fraction` of
/// `available`, or `1.0` when it already fits.
pub fn fit_scale(text_width: f32, available: f32, fraction: f32) -> f32 {
    if text_width > available * fraction && text_width > 0.0 {
        available / (text_width * (1.0 + (1.0 - fraction)))
    } else {
        1.0
    }
}
