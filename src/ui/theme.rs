//! Colour palette and text styles used across the UI.

use ratatui::style::{Color, Modifier, Style};

use super::render::Rgb;

/// Central theme.  Every colour the screens use comes from here.
pub struct Theme;

impl Theme {
    // ── screen backgrounds ─────────────────────────────────────
    pub const MAIN_MENU_BG: Rgb = Rgb(117, 77, 117);
    pub const PROJECTS_BG: Rgb = Rgb(108, 100, 128);
    pub const SETTINGS_BG: Rgb = Rgb(147, 138, 168);
    pub const CONTROLS_BG: Rgb = Rgb(181, 165, 111);
    pub const DOWNLOAD_BG: Rgb = Rgb(147, 138, 168);

    // ── text ───────────────────────────────────────────────────
    pub const TEXT: Rgb = Rgb(255, 255, 255);
    pub const TEXT_DARK: Rgb = Rgb(0, 0, 0);
    pub const TEXT_DIM: Rgb = Rgb(210, 205, 220);

    pub fn color(rgb: Rgb) -> Color {
        Color::Rgb(rgb.0, rgb.1, rgb.2)
    }

    pub fn background_style(bg: Rgb) -> Style {
        Style::default().bg(Self::color(bg))
    }

    // ── controls ───────────────────────────────────────────────
    pub fn control_style() -> Style {
        Style::default().fg(Color::White).bg(Color::Rgb(60, 56, 72))
    }

    pub fn control_border_style() -> Style {
        Style::default().fg(Color::Gray)
    }

    pub fn selected_style() -> Style {
        Style::default()
            .fg(Color::Black)
            .bg(Color::Rgb(250, 220, 120))
            .add_modifier(Modifier::BOLD)
    }

    pub fn selected_border_style() -> Style {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    }
}
