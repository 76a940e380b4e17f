//! Screen lifecycle and the stack driver that sequences screens.
//!
//! Only the top screen is live.  Pushing a child cleans the parent up first
//! and the parent is re-initialised when the child pops, so no two screens
//! ever hold controls at the same time.

use std::fmt;
use std::path::PathBuf;

use super::input::{InputSnapshot, InputTable};
use super::services::Services;
use crate::ui::render::Rgb;

/// What the driver should do after a frame.
pub enum Transition {
    Continue,
    Push(Box<dyn Screen>),
    /// Return to the parent screen.
    Pop,
    Quit,
    /// Leave the shell and play the named project.
    Launch(String),
}

impl fmt::Debug for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transition::Continue => f.write_str("Continue"),
            Transition::Push(screen) => write!(f, "Push({})", screen.name()),
            Transition::Pop => f.write_str("Pop"),
            Transition::Quit => f.write_str("Quit"),
            Transition::Launch(project) => write!(f, "Launch({project})"),
        }
    }
}

/// How the shell ended.
#[derive(Debug, Clone, PartialEq)]
pub enum ShellOutcome {
    /// Run `project` with `controls` (canonical table plus saved bindings).
    Play { project: PathBuf, controls: InputTable },
    Exit,
}

pub trait Screen {
    fn name(&self) -> &'static str;

    /// Background used for this screen's surfaces (and its blank frame).
    fn background(&self) -> Rgb;

    /// Build controls.  Called on first show and every time a child pops.
    fn init(&mut self, services: &mut Services<'_>);

    /// Handle one tick of input and draw one frame.
    fn render_one_frame(
        &mut self,
        input: &InputSnapshot,
        services: &mut Services<'_>,
    ) -> anyhow::Result<Transition>;

    /// Drop everything built in `init`.
    fn cleanup(&mut self, services: &mut Services<'_>);
}

/// Owns the screens, bottom (root) first.
pub struct ScreenStack {
    screens: Vec<Box<dyn Screen>>,
}

impl ScreenStack {
    pub fn new(root: Box<dyn Screen>) -> Self {
        Self { screens: vec![root] }
    }

    /// Drive screens until one of them ends the shell or the run signal
    /// drops.
    pub fn run(mut self, services: &mut Services<'_>) -> anyhow::Result<ShellOutcome> {
        let Some(root) = self.screens.last_mut() else {
            return Ok(ShellOutcome::Exit);
        };
        tracing::debug!(screen = root.name(), "init");
        root.init(services);

        loop {
            if !services.signal.should_run() {
                tracing::warn!("app should exit; closing shell");
                self.close_top(services)?;
                return Ok(ShellOutcome::Exit);
            }
            let input = services.input.poll();
            let Some(top) = self.screens.last_mut() else {
                return Ok(ShellOutcome::Exit);
            };
            let transition = top.render_one_frame(&input, services)?;
            if let Some(outcome) = self.apply(transition, services)? {
                return Ok(outcome);
            }
        }
    }

    fn apply(
        &mut self,
        transition: Transition,
        services: &mut Services<'_>,
    ) -> anyhow::Result<Option<ShellOutcome>> {
        match transition {
            Transition::Continue => Ok(None),
            Transition::Push(mut child) => {
                let depth = self.screens.len();
                if let Some(parent) = self.screens.last_mut() {
                    tracing::debug!(from = parent.name(), to = child.name(), depth, "push");
                    parent.cleanup(services);
                    blank_frame(services, parent.background())?;
                }
                child.init(services);
                self.screens.push(child);
                Ok(None)
            }
            Transition::Pop => {
                let Some(mut child) = self.screens.pop() else {
                    return Ok(Some(ShellOutcome::Exit));
                };
                child.cleanup(services);
                blank_frame(services, child.background())?;
                match self.screens.last_mut() {
                    Some(parent) => {
                        tracing::debug!(from = child.name(), to = parent.name(), "pop");
                        parent.init(services);
                        Ok(None)
                    }
                    None => Ok(Some(ShellOutcome::Exit)),
                }
            }
            Transition::Quit => {
                self.close_top(services)?;
                Ok(Some(ShellOutcome::Exit))
            }
            Transition::Launch(project) => {
                self.close_top(services)?;
                Ok(Some(prepare_launch(&project, services)))
            }
        }
    }

    /// Clean up the live screen and drop the rest.  Suspended screens were
    /// already cleaned up when their child was pushed.
    fn close_top(&mut self, services: &mut Services<'_>) -> anyhow::Result<()> {
        if let Some(mut top) = self.screens.pop() {
            top.cleanup(services);
            blank_frame(services, top.background())?;
        }
        while let Some(screen) = self.screens.pop() {
            tracing::debug!(screen = screen.name(), "dropping suspended screen");
        }
        Ok(())
    }
}

/// Run `root` (and whatever it pushes) to completion.
pub fn run_shell(root: Box<dyn Screen>, services: &mut Services<'_>) -> anyhow::Result<ShellOutcome> {
    ScreenStack::new(root).run(services)
}

/// One empty frame on every surface with an input drain in between, so the
/// next screen starts from a clean display and a clean input buffer.
pub fn blank_frame(services: &mut Services<'_>, background: Rgb) -> anyhow::Result<()> {
    for surface in 0..services.render.surface_count() {
        services.render.begin_frame(surface, background);
    }
    services.input.drain();
    services.render.end_frame()
}

/// Resolve the controls `project` should run with.
fn prepare_launch(project: &str, services: &Services<'_>) -> ShellOutcome {
    let mut controls = services.table.clone();
    match services.bindings.load(project) {
        Ok(saved) => controls.apply_overrides(&saved),
        Err(e) => tracing::error!(%project, error = %e, "ignoring unreadable bindings"),
    }
    let path = services.projects.project_path(project);
    tracing::info!(path = %path.display(), "launching project");
    ShellOutcome::Play { project: path, controls }
}
