//! User configuration: folders, timing, and fetch settings.
//!
//! Stored as a simple key-value text file at
//! `$XDG_CONFIG_HOME/player-shell/config.toml`
//! (default `~/.config/player-shell/config.toml`).

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;

/// Application configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ShellConfig {
    /// Folder scanned for `*.sb3` projects.
    pub projects_dir: PathBuf,
    /// Folder holding `<project>.sb3.json` bindings files.
    pub bindings_dir: PathBuf,
    /// Number of display surfaces (1 or 2).
    pub surfaces: usize,
    /// Frame period in milliseconds.
    pub tick_ms: u64,
    /// Fraction of the remaining distance the camera covers per tick.
    pub camera_smoothing: f32,
    /// Consecutive ticks a held key must survive to be captured.
    pub dwell_ticks: u32,
    /// How long a key counts as held when the terminal never reports its
    /// release.
    pub release_latch_ms: u64,
    /// Prefix the numeric project ID is appended to.
    pub fetch_url: String,
    pub fetch_timeout_secs: u64,
}

impl Default for ShellConfig {
    fn default() -> Self {
        let projects_dir = default_projects_dir();
        Self {
            bindings_dir: projects_dir.clone(),
            projects_dir,
            surfaces: 2,
            tick_ms: 33,
            camera_smoothing: 0.1,
            dwell_ticks: 2,
            release_latch_ms: 120,
            fetch_url: "https://api.scratch.mit.edu/projects/".to_string(),
            fetch_timeout_secs: 10,
        }
    }
}

impl ShellConfig {
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn release_latch(&self) -> Duration {
        Duration::from_millis(self.release_latch_ms)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    // ── persistence ─────────────────────────────────────────────

    /// Load config from `path` (or the default location), falling back to
    /// defaults for anything missing or malformed.
    pub fn load(path: Option<&Path>) -> Self {
        let path = path.map(Path::to_path_buf).unwrap_or_else(config_path);
        match std::fs::read_to_string(&path) {
            Ok(contents) => {
                tracing::debug!(path = %path.display(), "loaded config");
                Self::parse(&contents)
            }
            Err(_) => Self::default(),
        }
    }

    /// Persist current config to `path` (or the default location).
    pub fn save(&self, path: Option<&Path>) -> anyhow::Result<PathBuf> {
        let path = path.map(Path::to_path_buf).unwrap_or_else(config_path);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        std::fs::write(&path, self.serialise())
            .with_context(|| format!("failed to write {}", path.display()))?;
        Ok(path)
    }

    fn parse(s: &str) -> Self {
        let mut config = Self::default();
        let mut bindings_dir = None;

        for line in s.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('[') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let key = key.trim();
            let value = value.trim().trim_matches('"');

            match key {
                "projects_dir" => config.projects_dir = PathBuf::from(value),
                "bindings_dir" => bindings_dir = Some(PathBuf::from(value)),
                "surfaces" => {
                    if let Ok(v) = value.parse::<usize>() {
                        config.surfaces = v.clamp(1, 2);
                    }
                }
                "tick_ms" => {
                    if let Ok(v) = value.parse::<u64>() {
                        config.tick_ms = v.clamp(10, 200);
                    }
                }
                "camera_smoothing" => {
                    if let Ok(v) = value.parse::<f32>() {
                        config.camera_smoothing = v.clamp(0.01, 0.99);
                    }
                }
                "dwell_ticks" => {
                    if let Ok(v) = value.parse::<u32>() {
                        config.dwell_ticks = v.clamp(1, 60);
                    }
                }
                "release_latch_ms" => {
                    if let Ok(v) = value.parse::<u64>() {
                        config.release_latch_ms = v.clamp(30, 1000);
                    }
                }
                "fetch_url" => config.fetch_url = value.to_string(),
                "fetch_timeout_secs" => {
                    if let Ok(v) = value.parse::<u64>() {
                        config.fetch_timeout_secs = v.clamp(1, 120);
                    }
                }
                other => tracing::debug!(key = other, "ignoring unknown config key"),
            }
        }

        // bindings live beside the projects unless told otherwise
        config.bindings_dir = bindings_dir.unwrap_or_else(|| config.projects_dir.clone());
        config
    }

    fn serialise(&self) -> String {
        [
            "# player-shell configuration".to_string(),
            String::new(),
            "# Folders".to_string(),
            format!("projects_dir = \"{}\"", self.projects_dir.display()),
            format!("bindings_dir = \"{}\"", self.bindings_dir.display()),
            String::new(),
            "# Display".to_string(),
            format!("surfaces = {}", self.surfaces),
            format!("tick_ms = {}", self.tick_ms),
            format!("camera_smoothing = {}", self.camera_smoothing),
            String::new(),
            "# Input".to_string(),
            format!("dwell_ticks = {}", self.dwell_ticks),
            format!("release_latch_ms = {}", self.release_latch_ms),
            String::new(),
            "# Download".to_string(),
            format!("fetch_url = \"{}\"", self.fetch_url),
            format!("fetch_timeout_secs = {}", self.fetch_timeout_secs),
            String::new(),
        ]
        .join("\n")
    }
}

/// Return the config file path (`$XDG_CONFIG_HOME/player-shell/config.toml`).
pub fn config_path() -> PathBuf {
    config_home().join(env!("CARGO_PKG_NAME")).join("config.toml")
}

fn config_home() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home().join(".config"))
}

fn default_projects_dir() -> PathBuf {
    let data = std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home().join(".local").join("share"));
    data.join(env!("CARGO_PKG_NAME")).join("projects")
}

fn home() -> PathBuf {
    PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()))
}
