//! Title screen: bobbing logo, Play and Quit.

use super::{draw_in_place, present, projects::ProjectBrowser};
use crate::app::input::InputSnapshot;
use crate::app::screen::{Screen, Transition};
use crate::app::services::Services;
use crate::core::control::{ControlId, Direction, FocusableControl, Point};
use crate::core::graph::ControlGraph;
use crate::ui::render::{DrawCommand, Rgb};
use crate::ui::theme::Theme;

const LOGO: &str = "P L A Y E R   S H E L L";
const VERSION: &str = concat!("v", env!("CARGO_PKG_VERSION"));

#[derive(Default)]
pub struct MainMenu {
    graph: ControlGraph,
    play: ControlId,
    quit: ControlId,
    /// Frames drawn since the screen was first shown; drives the logo bob.
    frames: u64,
}

impl MainMenu {
    pub fn new() -> Self {
        Self::default()
    }

    fn logo_offset(&self, tick_ms: u64) -> f32 {
        let elapsed_ms = (self.frames * tick_ms) as f32;
        (elapsed_ms * 0.0025).sin()
    }
}

impl Screen for MainMenu {
    fn name(&self) -> &'static str {
        "main-menu"
    }

    fn background(&self) -> Rgb {
        Theme::MAIN_MENU_BG
    }

    fn init(&mut self, services: &mut Services<'_>) {
        let surface = services.interactive_surface();
        let w = services.render.width(surface);
        let h = services.render.height(surface);

        self.graph = ControlGraph::new();
        self.play = self.graph.register(
            FocusableControl::new("play", Point::new(w / 2.0 - 8.0, h / 2.0)).with_label("Play"),
        );
        self.quit = self.graph.register(
            FocusableControl::new("quit", Point::new(w / 2.0 + 8.0, h / 2.0)).with_label("Quit"),
        );
        self.graph.link_mutual(self.play, Direction::Right, self.quit);
        self.graph.select(self.play);
    }

    fn render_one_frame(
        &mut self,
        input: &InputSnapshot,
        services: &mut Services<'_>,
    ) -> anyhow::Result<Transition> {
        self.graph.handle_input(input, &services.table);
        let play = self.graph.is_pressed(self.play, &["a"], input, &services.table);
        let quit = self.graph.is_pressed(self.quit, &["a"], input, &services.table);
        if play {
            return Ok(Transition::Push(Box::new(ProjectBrowser::new())));
        }
        if quit {
            tracing::info!("quit selected");
            return Ok(Transition::Quit);
        }

        self.frames += 1;
        let bob = self.logo_offset(services.config.tick_ms);
        let top_w = services.render.width(0);
        let graph = &mut self.graph;
        let (play_id, quit_id) = (self.play, self.quit);
        present(
            &mut *services.render,
            Theme::MAIN_MENU_BG,
            |r| {
                r.draw(DrawCommand::centered(Point::new(top_w / 2.0, 4.0 + bob), LOGO, Theme::TEXT).bold());
                r.draw(DrawCommand::centered(
                    Point::new(top_w / 2.0, 8.0),
                    "arrows: move   enter/z: select   esc/x: back",
                    Theme::TEXT_DIM,
                ));
                r.draw(DrawCommand::text(Point::new(1.0, 10.0), VERSION, Theme::TEXT_DIM));
            },
            |r| {
                draw_in_place(r, graph, play_id);
                draw_in_place(r, graph, quit_id);
            },
        )?;
        Ok(Transition::Continue)
    }

    fn cleanup(&mut self, _services: &mut Services<'_>) {
        self.graph = ControlGraph::new();
    }
}
