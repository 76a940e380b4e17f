//! Control remapping for one project.
//!
//! Lists every key the project reads as a `name = key` row.  Activating a
//! row shows a prompt for one frame, then hands the input stream to a
//! [`KeyCaptureSession`] on the next tick.  Apply (Y) saves the table
//! beside the project; Back (B) discards it.

use super::{back_button, draw_control, draw_in_place, present, MAX_ROW_DISTANCE, ROW_SIZE, ROW_SPACING};
use crate::app::capture::{CaptureResult, KeyCaptureSession};
use crate::app::input::InputSnapshot;
use crate::app::screen::{Screen, Transition};
use crate::app::services::Services;
use crate::core::binding::{resolve_bindings, ControlBinding};
use crate::core::control::{ControlId, FocusableControl, Point};
use crate::core::graph::ControlGraph;
use crate::ui::camera::{ease, CameraTracker};
use crate::ui::render::{DrawCommand, Rgb};
use crate::ui::text::fit_scale;
use crate::ui::theme::Theme;

struct Row {
    id: ControlId,
    binding: ControlBinding,
}

impl Row {
    fn label(&self) -> String {
        format!("{} = {}", self.binding.name, self.binding.display_key())
    }
}

pub struct ControlsScreen {
    project: String,
    graph: ControlGraph,
    rows: Vec<Row>,
    back: ControlId,
    apply: ControlId,
    camera: CameraTracker,
    /// Row waiting for a key; the capture runs on the next tick.
    pending_capture: Option<usize>,
    /// Set by `init` when there is nothing to remap.
    leave: bool,
}

impl ControlsScreen {
    pub fn new(project: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            graph: ControlGraph::new(),
            rows: Vec::new(),
            back: 0,
            apply: 0,
            camera: CameraTracker::new(0.1),
            pending_capture: None,
            leave: false,
        }
    }

    fn selected_row(&self) -> Option<usize> {
        let selected = self.graph.selected()?;
        self.rows.iter().position(|r| r.id == selected)
    }

    fn capture(&mut self, row: usize, input: &InputSnapshot, services: &mut Services<'_>) {
        let mut session = KeyCaptureSession::new(services.config.dwell_ticks);
        session.arm();
        // this tick's snapshot was already taken by the driver
        session.step(input, &services.table);
        let result = session.run(&mut *services.input, &services.table, services.signal);
        // whatever was held to finish the capture must not also press a button
        self.graph.relatch_all();

        let Some(row) = self.rows.get_mut(row) else {
            return;
        };
        match result {
            CaptureResult::Bound(key) => {
                tracing::info!(control = %row.binding.name, %key, "updated control");
                row.binding.key = Some(key);
                let label = row.label();
                if let Some(control) = self.graph.get_mut(row.id) {
                    control.label = Some(label);
                }
            }
            CaptureResult::NoChange => {}
            CaptureResult::Aborted => tracing::debug!("capture aborted"),
        }
    }

    fn save(&self, services: &Services<'_>) {
        let bindings: Vec<ControlBinding> = self.rows.iter().map(|r| r.binding.clone()).collect();
        if let Err(e) = services.bindings.save(&self.project, &bindings) {
            tracing::error!(project = %self.project, error = %e, "failed to save controls");
        }
    }
}

impl Screen for ControlsScreen {
    fn name(&self) -> &'static str {
        "controls"
    }

    fn background(&self) -> Rgb {
        Theme::CONTROLS_BG
    }

    fn init(&mut self, services: &mut Services<'_>) {
        let surface = services.interactive_surface();
        let w = services.render.width(surface);
        let h = services.render.height(surface);

        self.graph = ControlGraph::new();
        self.rows.clear();
        self.pending_capture = None;
        self.leave = false;
        self.camera = CameraTracker::new(services.config.camera_smoothing);

        let project = match services.projects.load_project(&self.project) {
            Ok(project) => project,
            Err(e) => {
                tracing::error!(project = %self.project, error = %e, "failed to load project for controls");
                self.leave = true;
                return;
            }
        };
        let controls = project.control_names();
        if controls.is_empty() {
            tracing::warn!(project = %self.project, "no controls found in project");
            self.leave = true;
            return;
        }
        let saved = services.bindings.load(&self.project).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "ignoring saved controls");
            Default::default()
        });

        let inner_width = ROW_SIZE.0 - 2.0;
        for (i, binding) in resolve_bindings(&controls, &saved, &services.table).into_iter().enumerate() {
            let mut row = Row { id: 0, binding };
            let label = row.label();
            let (text_w, _) = services.text.measure(&label);
            let mut control = FocusableControl::new(row.binding.name.clone(), Point::new(0.0, i as f32 * ROW_SPACING))
                .with_label(label)
                .with_size(ROW_SIZE.0, ROW_SIZE.1)
                .with_hit_test(false);
            control.text_scale = fit_scale(text_w, inner_width, 0.85);
            row.id = self.graph.register(control);
            self.rows.push(row);
        }
        let ids: Vec<ControlId> = self.rows.iter().map(|r| r.id).collect();
        self.graph.link_column(&ids);
        self.graph.select(ids[0]);
        self.camera.snap_to(Point::new(0.0, 0.0));

        self.back = self.graph.register(back_button(w));
        self.apply = self.graph.register(
            FocusableControl::new("apply", Point::new(w / 2.0, h - 1.5))
                .with_label("Apply (Y)")
                .with_size(16.0, 3.0)
                .without_focus(),
        );
    }

    fn render_one_frame(
        &mut self,
        input: &InputSnapshot,
        services: &mut Services<'_>,
    ) -> anyhow::Result<Transition> {
        if self.leave {
            return Ok(Transition::Pop);
        }
        if let Some(row) = self.pending_capture.take() {
            self.capture(row, input, services);
        } else {
            let table = &services.table;
            self.graph.handle_input(input, table);
            let back = self.graph.is_pressed(self.back, &["b"], input, table);
            let apply = self.graph.is_pressed(self.apply, &["y"], input, table);
            let row_pressed = match self.graph.selected() {
                Some(id) => self.graph.is_pressed(id, &["a"], input, table),
                None => false,
            };
            if back {
                return Ok(Transition::Pop);
            }
            if apply {
                self.save(services);
                return Ok(Transition::Pop);
            }
            if row_pressed {
                self.pending_capture = self.selected_row();
            }
        }

        let target = self.graph.selected_control().map(|c| c.position).unwrap_or_default();
        self.camera.advance(target);
        let factor = services.config.camera_smoothing;
        for row in &self.rows {
            if let Some(control) = self.graph.get_mut(row.id) {
                let distance = (control.position.y - target.y).abs();
                let goal = if distance <= MAX_ROW_DISTANCE { 1.0 - distance / MAX_ROW_DISTANCE } else { 0.0 };
                control.scale = ease(control.scale, goal, factor);
            }
        }

        let surface = services.interactive_surface();
        let w = services.render.width(surface);
        let h = services.render.height(surface);
        let top_w = services.render.width(0);
        let base = Point::new(w / 2.0, h / 2.0 - 1.0);

        let prompt = self
            .pending_capture
            .and_then(|i| self.rows.get(i))
            .map(|r| format!("Press and hold a button for \"{}\"", r.binding.name));
        let title = format!("Controls: {}", self.project);
        let graph = &mut self.graph;
        let rows = &self.rows;
        let camera = &self.camera;
        let (back, apply) = (self.back, self.apply);

        present(
            &mut *services.render,
            Theme::CONTROLS_BG,
            |r| {
                r.draw(DrawCommand::centered(Point::new(top_w / 2.0, 2.0), title, Theme::TEXT_DARK).bold());
                let hint = prompt.unwrap_or_else(|| "A: remap   Y: apply   B: back".to_string());
                r.draw(DrawCommand::centered(Point::new(top_w / 2.0, 4.0), hint, Theme::TEXT_DARK));
            },
            |r| {
                for row in rows {
                    let at = match graph.get(row.id) {
                        Some(c) if (c.position.y - target.y).abs() <= MAX_ROW_DISTANCE => {
                            camera.to_screen(c.position, base)
                        }
                        _ => continue,
                    };
                    draw_control(r, graph, row.id, at);
                }
                draw_in_place(r, graph, back);
                draw_in_place(r, graph, apply);
            },
        )?;
        Ok(Transition::Continue)
    }

    fn cleanup(&mut self, _services: &mut Services<'_>) {
        self.graph = ControlGraph::new();
        self.rows.clear();
        self.pending_capture = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::input::PhysicalKey::{self, *};
    use crate::app::screen::{run_shell, ShellOutcome};
    use crate::testing::{project_with_keys, snapshot, Harness, MemoryProjects, ScriptedInput};
    use std::collections::BTreeMap;
    use tracing_test::traced_test;

    fn harness(keys: &[&str]) -> Harness {
        let mut h = Harness::new();
        h.projects = MemoryProjects::default().with("Pong", project_with_keys(keys));
        h
    }

    fn saved(h: &mut Harness) -> BTreeMap<String, PhysicalKey> {
        h.services().bindings.load("Pong").unwrap()
    }

    #[test]
    fn rows_show_resolved_bindings() {
        let mut h = harness(&["space", "a", "up arrow"]);
        let mut screen = ControlsScreen::new("Pong");
        {
            let mut s = h.services();
            screen.init(&mut s);
            screen.render_one_frame(&snapshot(&[], &[]), &mut s).unwrap();
        }
        let labels: Vec<String> = screen.rows.iter().map(Row::label).collect();
        assert_eq!(labels, ["space = (none)", "a = A", "up arrow = DpadUp"]);
        assert!(h.render.last_texts().contains(&"a = A".to_string()));
    }

    #[test]
    fn capture_then_apply_writes_file() {
        let mut h = harness(&["space", "left arrow"]);
        h.input = ScriptedInput::new()
            .idle(1)
            // A opens the capture; hold X past the dwell
            .hold(&[A], 1)
            .idle(1)
            .hold(&[X], 3)
            .idle(1)
            .tap(Y);
        let outcome = run_shell(Box::new(ControlsScreen::new("Pong")), &mut h.services()).unwrap();
        assert_eq!(outcome, ShellOutcome::Exit);
        assert_eq!(
            saved(&mut h),
            BTreeMap::from([("space".to_string(), X), ("left arrow".to_string(), DpadLeft)])
        );
    }

    #[test]
    fn capture_key_does_not_trigger_apply() {
        let mut h = harness(&["space"]);
        // Y is both the captured key and the apply trigger
        h.input = ScriptedInput::new().idle(1).hold(&[A], 1).idle(1).hold(&[Y], 4).idle(1).tap(B);
        run_shell(Box::new(ControlsScreen::new("Pong")), &mut h.services()).unwrap();
        // left with Back: nothing saved
        assert!(saved(&mut h).is_empty());
    }

    #[test]
    #[traced_test]
    fn release_before_dwell_keeps_binding() {
        let mut h = harness(&["space"]);
        h.config.dwell_ticks = 3;
        h.input = ScriptedInput::new().idle(1).hold(&[A], 1).idle(1).hold(&[X], 1).idle(2).tap(Y);
        run_shell(Box::new(ControlsScreen::new("Pong")), &mut h.services()).unwrap();
        // the row was never bound, so nothing is written for it
        assert!(saved(&mut h).is_empty());
        assert!(h.services().bindings.path_for("Pong").exists());
        assert!(logs_contain("input released before dwell threshold"));
        assert!(!logs_contain("updated control"));
    }

    #[test]
    fn back_discards_changes() {
        let mut h = harness(&["space"]);
        h.input = ScriptedInput::new().idle(1).hold(&[A], 1).idle(1).hold(&[X], 2).idle(1).tap(B);
        run_shell(Box::new(ControlsScreen::new("Pong")), &mut h.services()).unwrap();
        assert!(!h.services().bindings.path_for("Pong").exists());
    }

    #[test]
    fn project_without_controls_pops() {
        let mut h = harness(&[]);
        let outcome = run_shell(Box::new(ControlsScreen::new("Pong")), &mut h.services()).unwrap();
        assert_eq!(outcome, ShellOutcome::Exit);
        assert_eq!(h.input.polls(), 1);
    }

    #[test]
    fn missing_project_pops() {
        let mut h = Harness::new();
        let outcome = run_shell(Box::new(ControlsScreen::new("Ghost")), &mut h.services()).unwrap();
        assert_eq!(outcome, ShellOutcome::Exit);
    }

    #[test]
    fn saved_bindings_seed_the_rows() {
        let mut h = harness(&["space"]);
        h.services()
            .bindings
            .save("Pong", &[ControlBinding { name: "space".into(), key: Some(R) }])
            .unwrap();
        let mut screen = ControlsScreen::new("Pong");
        screen.init(&mut h.services());
        assert_eq!(screen.rows[0].label(), "space = R");
    }
}
