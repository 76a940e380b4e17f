//! Per-project settings menu.

use super::controls::ControlsScreen;
use super::{back_button, draw_in_place, present, ROW_SIZE};
use crate::app::input::InputSnapshot;
use crate::app::screen::{Screen, Transition};
use crate::app::services::Services;
use crate::core::control::{ControlId, FocusableControl, Point};
use crate::core::graph::ControlGraph;
use crate::ui::render::{DrawCommand, Rgb};
use crate::ui::theme::Theme;

pub struct ProjectSettings {
    project: String,
    graph: ControlGraph,
    change_controls: ControlId,
    back: ControlId,
}

impl ProjectSettings {
    pub fn new(project: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            graph: ControlGraph::new(),
            change_controls: 0,
            back: 0,
        }
    }
}

impl Screen for ProjectSettings {
    fn name(&self) -> &'static str {
        "project-settings"
    }

    fn background(&self) -> Rgb {
        Theme::SETTINGS_BG
    }

    fn init(&mut self, services: &mut Services<'_>) {
        let surface = services.interactive_surface();
        let w = services.render.width(surface);
        let h = services.render.height(surface);

        self.graph = ControlGraph::new();
        self.change_controls = self.graph.register(
            FocusableControl::new("change-controls", Point::new(w / 2.0, h / 2.0))
                .with_label("Change Controls")
                .with_size(ROW_SIZE.0, ROW_SIZE.1),
        );
        self.back = self.graph.register(back_button(w));
        self.graph.select(self.change_controls);
    }

    fn render_one_frame(
        &mut self,
        input: &InputSnapshot,
        services: &mut Services<'_>,
    ) -> anyhow::Result<Transition> {
        let table = &services.table;
        self.graph.handle_input(input, table);
        let change = self.graph.is_pressed(self.change_controls, &["a"], input, table);
        let back = self.graph.is_pressed(self.back, &["b", "y"], input, table);
        if change {
            return Ok(Transition::Push(Box::new(ControlsScreen::new(self.project.clone()))));
        }
        if back {
            return Ok(Transition::Pop);
        }

        let top_w = services.render.width(0);
        let title = self.project.clone();
        let graph = &mut self.graph;
        let ids = [self.change_controls, self.back];
        present(
            &mut *services.render,
            Theme::SETTINGS_BG,
            |r| {
                r.draw(DrawCommand::centered(Point::new(top_w / 2.0, 2.0), title, Theme::TEXT).bold());
                r.draw(DrawCommand::centered(Point::new(top_w / 2.0, 4.0), "Project settings", Theme::TEXT_DIM));
            },
            |r| {
                for id in ids {
                    draw_in_place(r, graph, id);
                }
            },
        )?;
        Ok(Transition::Continue)
    }

    fn cleanup(&mut self, _services: &mut Services<'_>) {
        self.graph = ControlGraph::new();
    }
}
