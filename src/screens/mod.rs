//! The interactive screens and the drawing helpers they share.

pub mod controls;
pub mod download;
pub mod main_menu;
pub mod project_settings;
pub mod projects;

use crate::core::control::{ControlId, FocusableControl, Point};
use crate::core::graph::ControlGraph;
use crate::ui::render::{DrawCommand, Renderer, Rgb};

pub use main_menu::MainMenu;

/// Vertical distance between rows of a scrolling list.
pub(crate) const ROW_SPACING: f32 = 4.0;
/// Rows further than this from the selection are not drawn.
pub(crate) const MAX_ROW_DISTANCE: f32 = 10.0 * ROW_SPACING;
/// Size of one row box in a scrolling list.
pub(crate) const ROW_SIZE: (f32, f32) = (30.0, 3.0);

/// The Back control every sub-screen carries in its top-right corner.
/// It never takes focus, so it fires from anywhere on its trigger keys.
pub(crate) fn back_button(surface_width: f32) -> FocusableControl {
    FocusableControl::new("back", Point::new(surface_width - 7.0, 1.5))
        .with_label("Back (B)")
        .with_size(12.0, 3.0)
        .without_focus()
}

/// Draw `id` centred on `at` and remember that spot for hit-testing.
pub(crate) fn draw_control(render: &mut dyn Renderer, graph: &mut ControlGraph, id: ControlId, at: Point) {
    graph.place(id, at);
    let Some(control) = graph.get(id) else {
        return;
    };
    render.draw(DrawCommand::Control {
        bounds: control.bounds(),
        label: control.label.clone().unwrap_or_default(),
        text_scale: control.text_scale,
        // a clicked control flashes on the tick it fires
        selected: control.is_selected() || control.pressed_this_tick(),
    });
}

/// Draw `id` at its layout position.
pub(crate) fn draw_in_place(render: &mut dyn Renderer, graph: &mut ControlGraph, id: ControlId) {
    if let Some(at) = graph.get(id).map(|c| c.position) {
        draw_control(render, graph, id, at);
    }
}

/// Present one frame.  `info` draws onto the top surface and `controls`
/// onto the interactive one; with a single surface both share it.
pub(crate) fn present(
    render: &mut dyn Renderer,
    background: Rgb,
    info: impl FnOnce(&mut dyn Renderer),
    controls: impl FnOnce(&mut dyn Renderer),
) -> anyhow::Result<()> {
    let count = render.surface_count();
    if count > 1 {
        render.begin_frame(0, background);
        info(&mut *render);
        render.begin_frame(count - 1, background);
        controls(&mut *render);
    } else {
        render.begin_frame(0, background);
        controls(&mut *render);
        info(&mut *render);
    }
    render.end_frame()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingRenderer;
    use crate::ui::theme::Theme;

    #[test]
    fn single_surface_draws_info_last() {
        let mut r = RecordingRenderer::new(1);
        present(
            &mut r,
            Theme::MAIN_MENU_BG,
            |r| r.draw(DrawCommand::text(Point::new(0.0, 0.0), "info", Theme::TEXT)),
            |r| r.draw(DrawCommand::text(Point::new(0.0, 0.0), "controls", Theme::TEXT)),
        )
        .unwrap();
        assert_eq!(r.begins, vec![(0, Theme::MAIN_MENU_BG)]);
        assert_eq!(r.last_texts(), vec!["controls", "info"]);
    }

    #[test]
    fn drawn_position_drives_hit_testing() {
        let mut r = RecordingRenderer::new(2);
        let mut g = ControlGraph::new();
        let id = g.register(back_button(80.0));
        draw_control(&mut r, &mut g, id, Point::new(10.0, 10.0));
        assert!(g.get(id).unwrap().bounds().contains(Point::new(10.0, 10.0)));
        assert_eq!(r.draws.len(), 1);
    }

    #[test]
    fn control_fired_this_tick_draws_highlighted() {
        let mut r = RecordingRenderer::new(2);
        let mut g = ControlGraph::new();
        let pin = g.register(FocusableControl::new("7", Point::new(5.0, 5.0)).with_label("7"));
        let table = crate::app::input::InputTable::default();
        let idle = crate::testing::snapshot(&[], &[]);
        let click = crate::app::input::InputSnapshot {
            click: Some(Point::new(5.0, 5.0)),
            ..Default::default()
        };
        g.is_pressed(pin, &["a"], &idle, &table);
        assert!(g.is_pressed(pin, &["a"], &click, &table));
        draw_in_place(&mut r, &mut g, pin);
        assert!(matches!(r.draws[0], DrawCommand::Control { selected: true, .. }));
    }
}
