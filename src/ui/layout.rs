//! Layout helpers: split the terminal into display surfaces.

use ratatui::layout::{Constraint, Direction, Layout, Rect};

use crate::core::control::Bounds;

/// Display surfaces stacked vertically (surface 0 on top).
pub struct SurfaceLayout {
    pub surfaces: Vec<Rect>,
}

impl SurfaceLayout {
    /// Split `area` into `count` equal-height surfaces.
    pub fn from_area(area: Rect, count: usize) -> Self {
        let count = count.max(1) as u32;
        let surfaces = Layout::default()
            .direction(Direction::Vertical)
            .constraints((0..count).map(|_| Constraint::Ratio(1, count)))
            .split(area)
            .to_vec();
        Self { surfaces }
    }

    /// Which surface holds the terminal cell `(column, row)`, and the cell
    /// relative to that surface.
    pub fn locate(&self, column: u16, row: u16) -> Option<(usize, u16, u16)> {
        self.surfaces.iter().enumerate().find_map(|(i, r)| {
            let inside =
                column >= r.x && column < r.x + r.width && row >= r.y && row < r.y + r.height;
            inside.then(|| (i, column - r.x, row - r.y))
        })
    }
}

/// Convert fractional surface-space bounds into a cell rectangle inside
/// `surface`, clipped to it.  `None` when nothing is visible.
pub fn clip_to_surface(bounds: Bounds, surface: Rect) -> Option<Rect> {
    let x0 = (bounds.x.round() as i32).max(0);
    let y0 = (bounds.y.round() as i32).max(0);
    let x1 = ((bounds.x + bounds.width).round() as i32).min(surface.width as i32);
    let y1 = ((bounds.y + bounds.height).round() as i32).min(surface.height as i32);
    if x1 <= x0 || y1 <= y0 {
        return None;
    }
    Some(Rect::new(
        surface.x + x0 as u16,
        surface.y + y0 as u16,
        (x1 - x0) as u16,
        (y1 - y0) as u16,
    ))
}
