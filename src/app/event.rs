//! Terminal input: crossterm events folded into per-tick pad snapshots.
//!
//! Keyboard keys stand in for the buttons of the virtual pad.  Terminals
//! that report key releases (keyboard enhancement) give exact held state;
//! elsewhere a key counts as held until no press or repeat has been seen
//! for `release_latch`.

use std::time::{Duration, Instant};

use crossterm::event::{
    self, Event as CtEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};
use ratatui::layout::Rect;

use super::input::{Input, InputSnapshot, PhysicalKey};
use super::services::{QuitFlag, RunSignal};
use crate::config::ShellConfig;
use crate::core::control::Point;
use crate::ui::layout::SurfaceLayout;

/// Keyboard → pad mapping.
pub fn map_key(code: KeyCode) -> Option<PhysicalKey> {
    use PhysicalKey::*;
    let key = match code {
        KeyCode::Up => DpadUp,
        KeyCode::Down => DpadDown,
        KeyCode::Left => DpadLeft,
        KeyCode::Right => DpadRight,
        KeyCode::Enter | KeyCode::Char('z') => A,
        KeyCode::Esc | KeyCode::Backspace | KeyCode::Char('x') => B,
        KeyCode::Char('c') => X,
        KeyCode::Char('v') => Y,
        KeyCode::Char('q') => L,
        KeyCode::Char('e') => R,
        KeyCode::Char(' ') => Start,
        KeyCode::Tab => Select,
        _ => return None,
    };
    Some(key)
}

#[derive(Debug, Clone, Copy)]
struct HeldKey {
    key: PhysicalKey,
    last_seen: Instant,
}

pub struct TerminalInput {
    held: Vec<HeldKey>,
    just_pressed: Vec<PhysicalKey>,
    click: Option<Point>,
    area: Rect,
    surfaces: usize,
    tick: Duration,
    release_latch: Duration,
    reports_release: bool,
    signal: QuitFlag,
}

impl TerminalInput {
    pub fn new(config: &ShellConfig, signal: QuitFlag, reports_release: bool) -> Self {
        let (width, height) = crossterm::terminal::size().unwrap_or((80, 24));
        Self {
            held: Vec::new(),
            just_pressed: Vec::new(),
            click: None,
            area: Rect::new(0, 0, width, height),
            surfaces: config.surfaces.max(1),
            tick: config.tick(),
            release_latch: config.release_latch(),
            reports_release,
            signal,
        }
    }

    fn apply(&mut self, event: CtEvent, now: Instant) {
        match event {
            CtEvent::Key(key) => self.apply_key(key, now),
            CtEvent::Mouse(mouse) => self.apply_mouse(mouse),
            CtEvent::Resize(w, h) => self.area = Rect::new(0, 0, w, h),
            _ => {}
        }
    }

    fn apply_key(&mut self, key: KeyEvent, now: Instant) {
        if key.kind != KeyEventKind::Release
            && key.modifiers.contains(KeyModifiers::CONTROL)
            && key.code == KeyCode::Char('c')
        {
            tracing::info!("quit requested from keyboard");
            self.signal.request_quit();
            return;
        }
        let Some(pad) = map_key(key.code) else {
            return;
        };
        match key.kind {
            KeyEventKind::Press | KeyEventKind::Repeat => {
                if let Some(h) = self.held.iter_mut().find(|h| h.key == pad) {
                    h.last_seen = now;
                } else {
                    self.held.push(HeldKey { key: pad, last_seen: now });
                    if !self.just_pressed.contains(&pad) {
                        self.just_pressed.push(pad);
                    }
                }
            }
            KeyEventKind::Release => {
                self.reports_release = true;
                self.held.retain(|h| h.key != pad);
            }
        }
    }

    fn apply_mouse(&mut self, mouse: MouseEvent) {
        if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
            return;
        }
        let interactive = self.surfaces - 1;
        let layout = SurfaceLayout::from_area(self.area, self.surfaces);
        if let Some((surface, x, y)) = layout.locate(mouse.column, mouse.row) {
            if surface == interactive {
                self.click = Some(Point::new(x as f32 + 0.5, y as f32 + 0.5));
            }
        }
    }

    fn expire(&mut self, now: Instant) {
        if self.reports_release {
            return;
        }
        let latch = self.release_latch;
        self.held.retain(|h| now.duration_since(h.last_seen) < latch);
    }

    fn take_snapshot(&mut self) -> InputSnapshot {
        InputSnapshot {
            held: self.held.iter().map(|h| h.key).collect(),
            just_pressed: std::mem::take(&mut self.just_pressed),
            click: self.click.take(),
        }
    }
}

impl Input for TerminalInput {
    /// Collect events for one tick, then report the resulting state.
    fn poll(&mut self) -> InputSnapshot {
        let deadline = Instant::now() + self.tick;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match event::poll(remaining) {
                Ok(true) => match event::read() {
                    Ok(ev) => self.apply(ev, Instant::now()),
                    Err(e) => {
                        tracing::warn!(error = %e, "failed to read terminal event");
                        break;
                    }
                },
                Ok(false) => break,
                Err(e) => {
                    tracing::warn!(error = %e, "failed to poll terminal events");
                    break;
                }
            }
            if remaining.is_zero() {
                break;
            }
        }
        self.expire(Instant::now());
        self.take_snapshot()
    }

    fn drain(&mut self) {
        while let Ok(true) = event::poll(Duration::ZERO) {
            match event::read() {
                Ok(ev) => self.apply(ev, Instant::now()),
                Err(_) => break,
            }
        }
        self.expire(Instant::now());
        self.just_pressed.clear();
        self.click = None;
    }
}
