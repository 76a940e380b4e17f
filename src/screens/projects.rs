//! Project browser: a scrolling list of the projects in the projects folder.

use super::download::ProjectDownload;
use super::project_settings::ProjectSettings;
use super::{back_button, draw_control, draw_in_place, present, MAX_ROW_DISTANCE, ROW_SIZE, ROW_SPACING};
use crate::app::input::InputSnapshot;
use crate::app::screen::{Screen, Transition};
use crate::app::services::Services;
use crate::core::control::{ControlId, FocusableControl, Point};
use crate::core::graph::ControlGraph;
use crate::ui::camera::{ease, CameraTracker};
use crate::ui::render::{DrawCommand, Rgb};
use crate::ui::text::fit_scale;
use crate::ui::theme::Theme;

struct Row {
    id: ControlId,
    name: String,
}

/// Buttons shown while at least one project exists.
struct Actions {
    play: ControlId,
    settings: ControlId,
    download: ControlId,
}

pub struct ProjectBrowser {
    graph: ControlGraph,
    rows: Vec<Row>,
    back: ControlId,
    actions: Option<Actions>,
    no_projects: Option<ControlId>,
    camera: CameraTracker,
    /// Selection to restore when the screen is re-initialised.
    remembered: Option<String>,
}

impl Default for ProjectBrowser {
    fn default() -> Self {
        Self::new()
    }
}

impl ProjectBrowser {
    pub fn new() -> Self {
        Self {
            graph: ControlGraph::new(),
            rows: Vec::new(),
            back: 0,
            actions: None,
            no_projects: None,
            camera: CameraTracker::new(0.1),
            remembered: None,
        }
    }

    fn selected_name(&self) -> Option<&str> {
        let selected = self.graph.selected()?;
        self.rows.iter().find(|r| r.id == selected).map(|r| r.name.as_str())
    }

    fn selected_position(&self) -> Point {
        self.graph.selected_control().map(|c| c.position).unwrap_or_default()
    }
}

impl Screen for ProjectBrowser {
    fn name(&self) -> &'static str {
        "projects"
    }

    fn background(&self) -> Rgb {
        Theme::PROJECTS_BG
    }

    fn init(&mut self, services: &mut Services<'_>) {
        let surface = services.interactive_surface();
        let w = services.render.width(surface);
        let h = services.render.height(surface);

        self.graph = ControlGraph::new();
        self.rows.clear();
        self.camera = CameraTracker::new(services.config.camera_smoothing);
        self.back = self.graph.register(back_button(w));

        let names = services.projects.list_projects();
        tracing::debug!(count = names.len(), "listing projects");

        if names.is_empty() {
            let id = self.graph.register(
                FocusableControl::new("no-projects", Point::new(w / 2.0, h / 2.0))
                    .with_label("No projects found")
                    .with_size(ROW_SIZE.0, ROW_SIZE.1),
            );
            self.graph.select(id);
            self.no_projects = Some(id);
            self.actions = None;
            return;
        }
        self.no_projects = None;

        let inner_width = ROW_SIZE.0 - 2.0;
        for (i, name) in names.into_iter().enumerate() {
            let (text_w, _) = services.text.measure(&name);
            let mut control = FocusableControl::new(name.clone(), Point::new(0.0, i as f32 * ROW_SPACING))
                .with_label(name.clone())
                .with_size(ROW_SIZE.0, ROW_SIZE.1)
                .with_hit_test(false);
            control.text_scale = fit_scale(text_w, inner_width, 0.85);
            let id = self.graph.register(control);
            self.rows.push(Row { id, name });
        }
        let ids: Vec<ControlId> = self.rows.iter().map(|r| r.id).collect();
        self.graph.link_column(&ids);

        let restore = self
            .remembered
            .as_deref()
            .and_then(|name| self.rows.iter().find(|r| r.name == name))
            .map_or(ids[0], |r| r.id);
        self.graph.select(restore);
        self.camera.snap_to(self.selected_position());

        let bottom = h - 1.5;
        let button = |name: &str, label: &str, x: f32| {
            FocusableControl::new(name, Point::new(x, bottom))
                .with_label(label)
                .with_size(16.0, 3.0)
                .without_focus()
        };
        self.actions = Some(Actions {
            play: self.graph.register(button("play", "Play (A)", w / 2.0 - 18.0)),
            settings: self.graph.register(button("settings", "Settings (R)", w / 2.0)),
            download: self.graph.register(button("download", "Download (L)", w / 2.0 + 18.0)),
        });
    }

    fn render_one_frame(
        &mut self,
        input: &InputSnapshot,
        services: &mut Services<'_>,
    ) -> anyhow::Result<Transition> {
        let table = &services.table;
        self.graph.handle_input(input, table);

        if let Some(actions) = &self.actions {
            let item = match self.graph.selected() {
                Some(id) => self.graph.is_pressed(id, &["a"], input, table),
                None => false,
            };
            let play = self.graph.is_pressed(actions.play, &["a"], input, table);
            let settings = self.graph.is_pressed(actions.settings, &["r"], input, table);
            let download = self.graph.is_pressed(actions.download, &["l"], input, table);
            let back = self.graph.is_pressed(self.back, &["b", "y"], input, table);

            if let Some(name) = self.selected_name().map(str::to_string) {
                if item || play {
                    return Ok(Transition::Launch(name));
                }
                if settings {
                    return Ok(Transition::Push(Box::new(ProjectSettings::new(name))));
                }
            }
            if download {
                return Ok(Transition::Push(Box::new(ProjectDownload::new())));
            }
            if back {
                return Ok(Transition::Pop);
            }
        } else {
            let none = self
                .no_projects
                .is_some_and(|id| self.graph.is_pressed(id, &["a"], input, table));
            let back = self.graph.is_pressed(self.back, &["b", "y"], input, table);
            if none || back {
                return Ok(Transition::Pop);
            }
        }

        // camera and per-row scale
        let target = self.selected_position();
        self.camera.advance(target);
        let factor = services.config.camera_smoothing;
        for row in &self.rows {
            if let Some(control) = self.graph.get_mut(row.id) {
                let distance = (control.position.y - target.y).abs();
                if distance <= MAX_ROW_DISTANCE {
                    control.scale = ease(control.scale, 1.0 - distance / MAX_ROW_DISTANCE, factor);
                }
            }
        }

        let surface = services.interactive_surface();
        let w = services.render.width(surface);
        let h = services.render.height(surface);
        let top_w = services.render.width(0);
        let base = Point::new(w / 2.0, h / 2.0 - 1.0);

        let header = match self.selected_name() {
            Some(name) => name.to_string(),
            None => "Projects".to_string(),
        };
        let count = self.rows.len();
        let folder = services.config.projects_dir.display().to_string();
        let empty = self.no_projects.is_some();

        let graph = &mut self.graph;
        let rows = &self.rows;
        let camera = &self.camera;
        let (back, actions, no_projects) = (self.back, self.actions.as_ref(), self.no_projects);

        present(
            &mut *services.render,
            Theme::PROJECTS_BG,
            |r| {
                r.draw(DrawCommand::centered(Point::new(top_w / 2.0, 2.0), header, Theme::TEXT).bold());
                if empty {
                    r.draw(DrawCommand::centered(Point::new(top_w / 2.0, 5.0), "No projects found", Theme::TEXT));
                    r.draw(DrawCommand::centered(
                        Point::new(top_w / 2.0, 7.0),
                        format!("Put .sb3 projects in {folder}"),
                        Theme::TEXT_DIM,
                    ));
                } else {
                    r.draw(DrawCommand::centered(
                        Point::new(top_w / 2.0, 4.0),
                        format!("{count} project{}", if count == 1 { "" } else { "s" }),
                        Theme::TEXT_DIM,
                    ));
                }
            },
            |r| {
                for row in rows {
                    let Some(control) = graph.get(row.id) else {
                        continue;
                    };
                    if (control.position.y - target.y).abs() > MAX_ROW_DISTANCE {
                        continue;
                    }
                    let at = camera.to_screen(control.position, base);
                    draw_control(r, graph, row.id, at);
                }
                if let Some(id) = no_projects {
                    draw_in_place(r, graph, id);
                }
                if let Some(a) = actions {
                    for id in [a.play, a.settings, a.download] {
                        draw_in_place(r, graph, id);
                    }
                }
                draw_in_place(r, graph, back);
            },
        )?;
        Ok(Transition::Continue)
    }

    fn cleanup(&mut self, _services: &mut Services<'_>) {
        self.remembered = self.selected_name().map(str::to_string);
        self.graph = ControlGraph::new();
        self.rows.clear();
        self.actions = None;
        self.no_projects = None;
    }
}
