//! Fakes for the service traits, shared by the unit tests.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, VecDeque};
use std::path::PathBuf;

use serde_json::Value;

use crate::app::input::{Input, InputSnapshot, InputTable, PhysicalKey};
use crate::app::services::{QuitFlag, RunSignal, Services};
use crate::config::ShellConfig;
use crate::core::binding::BindingStore;
use crate::core::control::Point;
use crate::core::fetch::{FetchOutcome, Fetcher};
use crate::core::project::{ProjectData, ProjectError, ProjectStore};
use crate::ui::render::{DrawCommand, Renderer, Rgb};
use crate::ui::text::CellMeasure;

pub fn snapshot(held: &[PhysicalKey], just_pressed: &[PhysicalKey]) -> InputSnapshot {
    InputSnapshot {
        held: held.to_vec(),
        just_pressed: just_pressed.to_vec(),
        click: None,
    }
}

// ───────────────────────────────────────── input ─────────────

/// Plays back a fixed sequence of held sets, one per poll, then idles.
#[derive(Debug, Default)]
pub struct ScriptedInput {
    script: VecDeque<(Vec<PhysicalKey>, Option<Point>)>,
    previous: Vec<PhysicalKey>,
    polls: usize,
    drains: usize,
}

impl ScriptedInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hold `keys` for `ticks` polls.
    pub fn hold(mut self, keys: &[PhysicalKey], ticks: usize) -> Self {
        for _ in 0..ticks {
            self.script.push_back((keys.to_vec(), None));
        }
        self
    }

    pub fn idle(self, ticks: usize) -> Self {
        self.hold(&[], ticks)
    }

    /// Hold `key` for one tick, then release it for one.
    pub fn tap(self, key: PhysicalKey) -> Self {
        self.hold(&[key], 1).idle(1)
    }

    pub fn click(mut self, at: Point) -> Self {
        self.script.push_back((Vec::new(), Some(at)));
        self
    }

    pub fn polls(&self) -> usize {
        self.polls
    }

    pub fn drains(&self) -> usize {
        self.drains
    }
}

impl Input for ScriptedInput {
    fn poll(&mut self) -> InputSnapshot {
        self.polls += 1;
        let (held, click) = self.script.pop_front().unwrap_or_default();
        let just_pressed = held.iter().copied().filter(|k| !self.previous.contains(k)).collect();
        self.previous = held.clone();
        InputSnapshot { held, just_pressed, click }
    }

    fn drain(&mut self) {
        self.drains += 1;
    }
}

// ───────────────────────────────────────── render ────────────

/// Records frames instead of drawing them.  Every surface is 80×12.
#[derive(Debug)]
pub struct RecordingRenderer {
    surfaces: usize,
    pub begins: Vec<(usize, Rgb)>,
    pub ends: usize,
    pub draws: Vec<DrawCommand>,
    /// Draw commands of the most recently ended frame.
    pub last_frame: Vec<DrawCommand>,
    pending: Vec<DrawCommand>,
}

impl RecordingRenderer {
    pub fn new(surfaces: usize) -> Self {
        Self {
            surfaces,
            begins: Vec::new(),
            ends: 0,
            draws: Vec::new(),
            last_frame: Vec::new(),
            pending: Vec::new(),
        }
    }

    /// Every text string drawn in the last presented frame.
    pub fn last_texts(&self) -> Vec<String> {
        self.last_frame
            .iter()
            .map(|c| match c {
                DrawCommand::Text { text, .. } => text.clone(),
                DrawCommand::Control { label, .. } => label.clone(),
            })
            .collect()
    }
}

impl Renderer for RecordingRenderer {
    fn surface_count(&self) -> usize {
        self.surfaces
    }

    fn width(&self, _surface: usize) -> f32 {
        80.0
    }

    fn height(&self, _surface: usize) -> f32 {
        12.0
    }

    fn begin_frame(&mut self, surface: usize, background: Rgb) {
        self.begins.push((surface, background));
    }

    fn draw(&mut self, command: DrawCommand) {
        self.draws.push(command.clone());
        self.pending.push(command);
    }

    fn end_frame(&mut self) -> anyhow::Result<()> {
        self.ends += 1;
        self.last_frame = std::mem::take(&mut self.pending);
        Ok(())
    }
}

// ───────────────────────────────────────── signal ────────────

/// `should_run` is true for the first `n` checks.
#[derive(Debug)]
pub struct CountdownSignal {
    remaining: Cell<usize>,
}

impl CountdownSignal {
    pub fn new(n: usize) -> Self {
        Self { remaining: Cell::new(n) }
    }
}

impl RunSignal for CountdownSignal {
    fn should_run(&self) -> bool {
        let left = self.remaining.get();
        if left == 0 {
            return false;
        }
        self.remaining.set(left - 1);
        true
    }

    fn request_quit(&self) {
        self.remaining.set(0);
    }
}

// ───────────────────────────────────────── storage ───────────

/// In-memory projects keyed by name.
#[derive(Debug, Default)]
pub struct MemoryProjects {
    pub projects: BTreeMap<String, Value>,
}

impl MemoryProjects {
    pub fn with(mut self, name: &str, json: Value) -> Self {
        self.projects.insert(name.to_string(), json);
        self
    }
}

impl ProjectStore for MemoryProjects {
    fn list_projects(&self) -> Vec<String> {
        self.projects.keys().cloned().collect()
    }

    fn project_path(&self, name: &str) -> PathBuf {
        PathBuf::from("/projects").join(format!("{name}.sb3"))
    }

    fn load_project(&self, name: &str) -> Result<ProjectData, ProjectError> {
        self.projects
            .get(name)
            .map(|json| ProjectData { json: json.clone() })
            .ok_or_else(|| ProjectError::NotFound(name.to_string()))
    }
}

/// Project JSON whose stage reacts to each of `keys`.
pub fn project_with_keys(keys: &[&str]) -> Value {
    let blocks: serde_json::Map<String, Value> = keys
        .iter()
        .enumerate()
        .map(|(i, k)| {
            (
                format!("b{i}"),
                serde_json::json!({"opcode": "event_whenkeypressed", "fields": {"KEY_OPTION": [k, null]}}),
            )
        })
        .collect();
    serde_json::json!({"targets": [{"isStage": true, "blocks": blocks}]})
}

#[derive(Debug)]
pub struct StubFetcher {
    pub outcome: FetchOutcome,
    pub urls: RefCell<Vec<String>>,
}

impl StubFetcher {
    pub fn new(outcome: FetchOutcome) -> Self {
        Self { outcome, urls: RefCell::new(Vec::new()) }
    }
}

impl Fetcher for StubFetcher {
    fn fetch(&self, url: &str) -> FetchOutcome {
        self.urls.borrow_mut().push(url.to_string());
        self.outcome.clone()
    }
}

// ───────────────────────────────────────── harness ───────────

/// Owns one of every fake and lends them out as [`Services`].
pub struct Harness {
    pub input: ScriptedInput,
    pub render: RecordingRenderer,
    pub projects: MemoryProjects,
    pub fetcher: StubFetcher,
    pub signal: QuitFlag,
    pub config: ShellConfig,
    pub bindings_dir: tempfile::TempDir,
    text: CellMeasure,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            input: ScriptedInput::new(),
            render: RecordingRenderer::new(2),
            projects: MemoryProjects::default(),
            fetcher: StubFetcher::new(FetchOutcome::Empty),
            signal: QuitFlag::default(),
            config: ShellConfig::default(),
            bindings_dir: tempfile::tempdir().unwrap(),
            text: CellMeasure,
        }
    }

    pub fn services(&mut self) -> Services<'_> {
        Services {
            input: &mut self.input,
            render: &mut self.render,
            text: &self.text,
            projects: &self.projects,
            fetcher: &self.fetcher,
            signal: &self.signal,
            config: &self.config,
            table: InputTable::default(),
            bindings: BindingStore::new(self.bindings_dir.path()),
        }
    }
}
