//! Ratatui renderer: collects draw commands per surface between
//! `begin_frame` and `end_frame`, then paints them in one `Terminal::draw`.

use std::io::Stderr;

use ratatui::{
    backend::CrosstermBackend,
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::Line,
    widgets::{Block, BorderType, Borders, Paragraph, Widget},
    Terminal,
};

use super::layout::{clip_to_surface, SurfaceLayout};
use super::render::{Align, DrawCommand, Renderer, Rgb};
use super::theme::Theme;

#[derive(Debug, Default)]
struct SurfaceFrame {
    background: Option<Rgb>,
    commands: Vec<DrawCommand>,
}

/// Per-surface command buffers for the frame being built.
#[derive(Debug)]
struct FrameSlots {
    frames: Vec<SurfaceFrame>,
    current: usize,
}

impl FrameSlots {
    fn new(surfaces: usize) -> Self {
        Self {
            frames: (0..surfaces.max(1)).map(|_| SurfaceFrame::default()).collect(),
            current: 0,
        }
    }

    fn len(&self) -> usize {
        self.frames.len()
    }

    fn begin(&mut self, surface: usize, background: Rgb) {
        let idx = surface.min(self.frames.len() - 1);
        self.frames[idx] = SurfaceFrame {
            background: Some(background),
            commands: Vec::new(),
        };
        self.current = idx;
    }

    fn push(&mut self, command: DrawCommand) {
        self.frames[self.current].commands.push(command);
    }

    /// Hand the built frame to `paint`, then empty every slot whether or
    /// not painting succeeded.
    fn finish<E>(&mut self, paint: impl FnOnce(&[SurfaceFrame]) -> Result<(), E>) -> Result<(), E> {
        let painted = paint(&self.frames);
        for slot in &mut self.frames {
            *slot = SurfaceFrame::default();
        }
        self.current = 0;
        painted
    }
}

pub struct TerminalRenderer {
    terminal: Terminal<CrosstermBackend<Stderr>>,
    slots: FrameSlots,
    area: Rect,
}

impl TerminalRenderer {
    pub fn new(terminal: Terminal<CrosstermBackend<Stderr>>, surfaces: usize) -> anyhow::Result<Self> {
        let size = terminal.size()?;
        Ok(Self {
            terminal,
            slots: FrameSlots::new(surfaces),
            area: Rect::new(0, 0, size.width, size.height),
        })
    }

    fn surface_rect(&self, surface: usize) -> Rect {
        SurfaceLayout::from_area(self.area, self.slots.len())
            .surfaces
            .get(surface)
            .copied()
            .unwrap_or_default()
    }
}

impl Renderer for TerminalRenderer {
    fn surface_count(&self) -> usize {
        self.slots.len()
    }

    fn width(&self, surface: usize) -> f32 {
        self.surface_rect(surface).width as f32
    }

    fn height(&self, surface: usize) -> f32 {
        self.surface_rect(surface).height as f32
    }

    fn begin_frame(&mut self, surface: usize, background: Rgb) {
        if surface == 0 {
            if let Ok(size) = self.terminal.size() {
                self.area = Rect::new(0, 0, size.width, size.height);
            }
        }
        self.slots.begin(surface, background);
    }

    fn draw(&mut self, command: DrawCommand) {
        self.slots.push(command);
    }

    fn end_frame(&mut self) -> anyhow::Result<()> {
        let terminal = &mut self.terminal;
        self.slots.finish(|frames| -> anyhow::Result<()> {
            terminal.draw(|frame| {
                let layout = SurfaceLayout::from_area(frame.area(), frames.len());
                let buf = frame.buffer_mut();
                for (surface, rect) in frames.iter().zip(layout.surfaces.iter().copied()) {
                    paint_surface(surface, rect, buf);
                }
            })?;
            Ok(())
        })
    }
}

fn paint_surface(surface: &SurfaceFrame, rect: Rect, buf: &mut Buffer) {
    if let Some(bg) = surface.background {
        Block::default()
            .style(Theme::background_style(bg))
            .render(rect, buf);
    }
    for command in &surface.commands {
        match command {
            DrawCommand::Text { at, text, color, align, bold } => {
                paint_text(*at, text, *color, *align, *bold, rect, buf);
            }
            DrawCommand::Control { bounds, label, text_scale, selected } => {
                let Some(area) = clip_to_surface(*bounds, rect) else {
                    continue;
                };
                paint_control(area, label, *text_scale, *selected, buf);
            }
        }
    }
}

fn paint_text(
    at: crate::core::control::Point,
    text: &str,
    color: Rgb,
    align: Align,
    bold: bool,
    surface: Rect,
    buf: &mut Buffer,
) {
    let mut style = Style::default().fg(Theme::color(color));
    if bold {
        style = style.add_modifier(Modifier::BOLD);
    }
    for (i, line) in text.lines().enumerate() {
        let width = Line::raw(line).width() as f32;
        let x = match align {
            Align::Left => at.x,
            Align::Center => at.x - width / 2.0,
        };
        let bounds = crate::core::control::Bounds {
            x,
            y: at.y + i as f32,
            width: width.max(1.0),
            height: 1.0,
        };
        if let Some(area) = clip_to_surface(bounds, surface) {
            Paragraph::new(line.to_string()).style(style).render(area, buf);
        }
    }
}

fn paint_control(area: Rect, label: &str, text_scale: f32, selected: bool, buf: &mut Buffer) {
    let (style, border) = if selected {
        (Theme::selected_style(), Theme::selected_border_style())
    } else {
        (Theme::control_style(), Theme::control_border_style())
    };

    // Too small for a border: draw the label alone.
    if area.height < 3 || area.width < 3 {
        Paragraph::new(truncate(label, area.width as usize))
            .style(style)
            .alignment(Alignment::Center)
            .render(area, buf);
        return;
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(if selected { BorderType::Thick } else { BorderType::Rounded })
        .border_style(border)
        .style(style);
    let inner = block.inner(area);
    block.render(area, buf);

    let budget = ((Line::raw(label).width() as f32) * text_scale.clamp(0.1, 1.0)).floor() as usize;
    let text = truncate(label, budget.min(inner.width as usize));
    let text_area = Rect::new(inner.x, inner.y + inner.height.saturating_sub(1) / 2, inner.width, 1);
    Paragraph::new(text)
        .alignment(Alignment::Center)
        .render(text_area, buf);
}

/// Cut `s` to at most `max` display columns, ending in `…` when cut.
fn truncate(s: &str, max: usize) -> String {
    if Line::raw(s).width() <= max {
        return s.to_string();
    }
    if max == 0 {
        return String::new();
    }
    let mut out = String::new();
    for ch in s.chars() {
        let candidate = format!("{out}{ch}…");
        if Line::raw(candidate.as_str()).width() > max {
            break;
        }
        out.push(ch);
    }
    out.push('…');
    out
}
