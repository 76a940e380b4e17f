//! Numeric project-ID entry with an on-screen pin pad.

use super::{back_button, draw_control, draw_in_place, present};
use crate::app::input::InputSnapshot;
use crate::app::screen::{Screen, Transition};
use crate::app::services::Services;
use crate::core::control::{ControlId, Direction, FocusableControl, Point};
use crate::core::graph::ControlGraph;
use crate::ui::render::{DrawCommand, Rgb};
use crate::ui::theme::Theme;

/// Longest ID the pad accepts.
pub const MAX_DIGITS: usize = 13;

const PAD: [[&str; 3]; 4] = [["1", "2", "3"], ["4", "5", "6"], ["7", "8", "9"], ["<", "0", "OK"]];
const KEY_SIZE: (f32, f32) = (7.0, 3.0);
const KEY_PITCH: (f32, f32) = (8.0, 3.0);
const SELECTED_SCALE: f32 = 1.15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PadKey {
    Digit(char),
    Delete,
    Submit,
}

impl PadKey {
    fn from_label(label: &str) -> Self {
        match label {
            "<" => PadKey::Delete,
            "OK" => PadKey::Submit,
            digit => PadKey::Digit(digit.chars().next().unwrap_or('0')),
        }
    }
}

pub struct ProjectDownload {
    graph: ControlGraph,
    /// `(control, key)` in pad order, row by row.
    keys: Vec<(ControlId, PadKey)>,
    back: ControlId,
    digits: String,
    /// Text shown after a fetch.
    result: Option<String>,
}

impl Default for ProjectDownload {
    fn default() -> Self {
        Self::new()
    }
}

impl ProjectDownload {
    pub fn new() -> Self {
        Self {
            graph: ControlGraph::new(),
            keys: Vec::new(),
            back: 0,
            digits: String::new(),
            result: None,
        }
    }

    fn press(&mut self, key: PadKey, services: &Services<'_>) {
        match key {
            PadKey::Digit(d) => {
                // a shown result ends the previous entry
                if self.result.take().is_some() {
                    self.digits.clear();
                }
                if self.digits.len() < MAX_DIGITS {
                    self.digits.push(d);
                }
            }
            PadKey::Delete => {
                if self.result.take().is_some() {
                    self.digits.clear();
                } else {
                    self.digits.pop();
                }
            }
            PadKey::Submit => {
                if self.digits.is_empty() {
                    tracing::debug!("no project id entered");
                    return;
                }
                let url = format!("{}{}", services.config.fetch_url, self.digits);
                let outcome = services.fetcher.fetch(&url);
                tracing::debug!(?outcome, "fetched project metadata");
                self.result = Some(outcome.display());
            }
        }
    }

    fn display_text(&self) -> &str {
        match &self.result {
            Some(result) => result,
            None if self.digits.is_empty() => "Project ID",
            None => &self.digits,
        }
    }
}

impl Screen for ProjectDownload {
    fn name(&self) -> &'static str {
        "download"
    }

    fn background(&self) -> Rgb {
        Theme::DOWNLOAD_BG
    }

    fn init(&mut self, services: &mut Services<'_>) {
        let surface = services.interactive_surface();
        let w = services.render.width(surface);

        self.graph = ControlGraph::new();
        self.keys.clear();

        let mut grid = [[0; 3]; 4];
        for (r, row) in PAD.iter().enumerate() {
            for (c, label) in row.iter().enumerate() {
                let at = Point::new(
                    KEY_SIZE.0 / 2.0 + 2.0 + c as f32 * KEY_PITCH.0,
                    KEY_SIZE.1 / 2.0 + r as f32 * KEY_PITCH.1,
                );
                let id = self.graph.register(
                    FocusableControl::new(*label, at)
                        .with_label(*label)
                        .with_size(KEY_SIZE.0, KEY_SIZE.1),
                );
                grid[r][c] = id;
                self.keys.push((id, PadKey::from_label(label)));
            }
        }
        // wrap-around in both axes
        let (rows, cols) = (PAD.len(), PAD[0].len());
        for r in 0..rows {
            for c in 0..cols {
                let id = grid[r][c];
                self.graph.link(id, Direction::Up, grid[(r + rows - 1) % rows][c]);
                self.graph.link(id, Direction::Down, grid[(r + 1) % rows][c]);
                self.graph.link(id, Direction::Left, grid[r][(c + cols - 1) % cols]);
                self.graph.link(id, Direction::Right, grid[r][(c + 1) % cols]);
            }
        }
        self.graph.select(grid[0][0]);
        self.back = self.graph.register(back_button(w));
    }

    fn render_one_frame(
        &mut self,
        input: &InputSnapshot,
        services: &mut Services<'_>,
    ) -> anyhow::Result<Transition> {
        let table = &services.table;
        self.graph.handle_input(input, table);

        let mut pressed = Vec::new();
        for &(id, key) in &self.keys {
            if self.graph.is_pressed(id, &["a"], input, table) {
                pressed.push(key);
            }
        }
        let back = self.graph.is_pressed(self.back, &["b", "y"], input, table);
        for key in pressed {
            self.press(key, services);
        }
        if back {
            return Ok(Transition::Pop);
        }

        for &(id, _) in &self.keys {
            if let Some(control) = self.graph.get_mut(id) {
                control.scale = if control.is_selected() { SELECTED_SCALE } else { 1.0 };
            }
        }

        let surface = services.interactive_surface();
        let w = services.render.width(surface);
        let h = services.render.height(surface);
        let top_w = services.render.width(0);
        let shown = self.display_text().to_string();
        let graph = &mut self.graph;
        let keys = &self.keys;
        let back_id = self.back;

        present(
            &mut *services.render,
            Theme::DOWNLOAD_BG,
            |r| {
                r.draw(DrawCommand::centered(Point::new(top_w / 2.0, 2.0), "Download", Theme::TEXT).bold());
                r.draw(DrawCommand::centered(
                    Point::new(top_w / 2.0, 4.0),
                    "Enter a project ID and press OK",
                    Theme::TEXT_DIM,
                ));
            },
            |r| {
                for &(id, _) in keys {
                    if let Some(at) = graph.get(id).map(|c| c.position) {
                        draw_control(r, graph, id, at);
                    }
                }
                draw_in_place(r, graph, back_id);
                r.draw(DrawCommand::centered(Point::new(w * 0.7, h * 0.4), shown, Theme::TEXT).bold());
            },
        )?;
        Ok(Transition::Continue)
    }

    fn cleanup(&mut self, _services: &mut Services<'_>) {
        self.graph = ControlGraph::new();
        self.keys.clear();
    }
}
