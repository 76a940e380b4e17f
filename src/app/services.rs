//! Service handles passed into every screen.
//!
//! Nothing reaches for a global: input, rendering, storage, and the run
//! signal arrive through [`Services`], so tests substitute fakes.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::input::{Input, InputTable};
use crate::config::ShellConfig;
use crate::core::binding::BindingStore;
use crate::core::fetch::Fetcher;
use crate::core::project::ProjectStore;
use crate::ui::render::Renderer;
use crate::ui::text::TextMeasure;

/// Global "keep running" signal.  Every blocking loop checks it each
/// iteration.
pub trait RunSignal {
    fn should_run(&self) -> bool;
    fn request_quit(&self);
}

/// Shared quit flag (cheap to clone; all clones see the same flag).
#[derive(Debug, Clone, Default)]
pub struct QuitFlag(Arc<AtomicBool>);

impl RunSignal for QuitFlag {
    fn should_run(&self) -> bool {
        !self.0.load(Ordering::Relaxed)
    }

    fn request_quit(&self) {
        self.0.store(true, Ordering::Relaxed);
    }
}

/// Everything a screen may touch.
pub struct Services<'a> {
    pub input: &'a mut dyn Input,
    pub render: &'a mut dyn Renderer,
    pub text: &'a dyn TextMeasure,
    pub projects: &'a dyn ProjectStore,
    pub fetcher: &'a dyn Fetcher,
    pub signal: &'a dyn RunSignal,
    pub config: &'a ShellConfig,
    /// Canonical table used by the menus (never carries project overrides).
    pub table: InputTable,
    pub bindings: BindingStore,
}

impl Services<'_> {
    /// Index of the surface that hosts interactive controls.
    pub fn interactive_surface(&self) -> usize {
        self.render.surface_count().saturating_sub(1)
    }
}
