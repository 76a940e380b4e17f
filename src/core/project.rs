//! Project storage.  Enumerates projects in the projects folder, loads a
//! project's `project.json`, and scans it for the keys it reads.
//!
//! Projects are `*.sb3` entries: normally a zip archive holding
//! `project.json` beside its assets, or a `<name>.sb3/` directory that was
//! already unpacked.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use serde_json::Value;
use thiserror::Error;
use zip::ZipArchive;

/// File suffix that marks a project.
pub const PROJECT_SUFFIX: &str = ".sb3";
const PROJECT_JSON: &str = "project.json";

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("project {0} not found")]
    NotFound(String),
    #[error("cannot read project.json from archive {path}")]
    Archive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },
    #[error("failed to read {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed project.json in {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Parsed project content (only what the shell looks at).
#[derive(Debug, Clone)]
pub struct ProjectData {
    pub json: Value,
}

impl ProjectData {
    pub fn control_names(&self) -> Vec<String> {
        scan_controls(&self.json)
    }
}

pub trait ProjectStore {
    /// Project names (without suffix), sorted.  An absent folder is simply
    /// an empty list.
    fn list_projects(&self) -> Vec<String>;
    /// Path handed to the player runtime when `name` is launched.
    fn project_path(&self, name: &str) -> PathBuf;
    fn load_project(&self, name: &str) -> Result<ProjectData, ProjectError>;
}

/// Projects in a folder on disk.
#[derive(Debug, Clone)]
pub struct FsProjectStore {
    folder: PathBuf,
}

impl FsProjectStore {
    pub fn new(folder: impl Into<PathBuf>) -> Self {
        Self { folder: folder.into() }
    }

}

impl ProjectStore for FsProjectStore {
    fn list_projects(&self) -> Vec<String> {
        let walker = WalkBuilder::new(&self.folder)
            .max_depth(Some(1))
            .hidden(true)
            .git_ignore(false)
            .sort_by_file_name(|a, b| a.cmp(b))
            .build();

        walker
            .flatten()
            .filter(|entry| entry.depth() == 1)
            .filter_map(|entry| {
                let name = entry.file_name().to_string_lossy().into_owned();
                name.strip_suffix(PROJECT_SUFFIX)
                    .filter(|stem| !stem.is_empty())
                    .map(str::to_string)
            })
            .collect()
    }

    fn project_path(&self, name: &str) -> PathBuf {
        self.folder.join(format!("{name}{PROJECT_SUFFIX}"))
    }

    fn load_project(&self, name: &str) -> Result<ProjectData, ProjectError> {
        let path = self.project_path(name);
        if path.is_file() {
            read_packed(&path)
        } else if path.is_dir() {
            read_unpacked(&path)
        } else {
            Err(ProjectError::NotFound(name.to_string()))
        }
    }
}

/// `project.json` from a `.sb3` zip archive.
fn read_packed(path: &Path) -> Result<ProjectData, ProjectError> {
    let read_err = |source| ProjectError::Read { path: path.to_path_buf(), source };
    let archive_err = |source| ProjectError::Archive { path: path.to_path_buf(), source };

    let file = File::open(path).map_err(read_err)?;
    let mut archive = ZipArchive::new(BufReader::new(file)).map_err(archive_err)?;
    let mut entry = archive.by_name(PROJECT_JSON).map_err(archive_err)?;
    let mut text = String::new();
    entry.read_to_string(&mut text).map_err(read_err)?;
    parse_project(path, &text)
}

/// `project.json` from a project already unpacked into a directory.
fn read_unpacked(dir: &Path) -> Result<ProjectData, ProjectError> {
    let json_path = dir.join(PROJECT_JSON);
    let text = std::fs::read_to_string(&json_path).map_err(|source| ProjectError::Read {
        path: json_path.clone(),
        source,
    })?;
    parse_project(&json_path, &text)
}

fn parse_project(path: &Path, text: &str) -> Result<ProjectData, ProjectError> {
    let json = serde_json::from_str(text)
        .map_err(|source| ProjectError::Parse { path: path.to_path_buf(), source })?;
    Ok(ProjectData { json })
}

// ───────────────────────────────────────── control scan ──────

/// Collect the key names a project reads, in first-seen order, without
/// duplicates.
///
/// Two block kinds read keys: `event_whenkeypressed` carries the key in its
/// `KEY_OPTION` field; `sensing_keypressed` points its `KEY_OPTION` input at
/// a menu block that carries it.  Keys computed at run time cannot be known
/// here and are skipped.
pub fn scan_controls(project: &Value) -> Vec<String> {
    let mut controls: Vec<String> = Vec::new();
    let targets = project["targets"].as_array().map(Vec::as_slice).unwrap_or(&[]);

    for target in targets {
        let Some(blocks) = target["blocks"].as_object() else {
            continue;
        };
        for block in blocks.values() {
            let key = match block["opcode"].as_str() {
                Some("event_whenkeypressed") => field_key(block),
                Some("sensing_keypressed") => {
                    let input = &block["inputs"]["KEY_OPTION"];
                    match input[1].as_str() {
                        Some(menu_id) => blocks.get(menu_id).and_then(field_key),
                        None => {
                            tracing::debug!("skipping key read from a computed input");
                            None
                        }
                    }
                }
                _ => None,
            };
            if let Some(key) = key.filter(|k| !k.is_empty()) {
                if !controls.iter().any(|c| c == &key) {
                    tracing::debug!(%key, "found new control");
                    controls.push(key);
                }
            }
        }
    }
    controls
}

fn field_key(block: &Value) -> Option<String> {
    block["fields"]["KEY_OPTION"][0].as_str().map(str::to_string)
}
