//! Per-project control bindings and their persistence.
//!
//! Bindings are stored next to the project as `<project>.sb3.json`:
//!
//! ```json
//! {
//!   "controls": {
//!     "space": "A",
//!     "up arrow": "DpadUp"
//!   }
//! }
//! ```
//!
//! Writes go through a temporary file in the same directory and are
//! renamed into place, so a failed save never leaves a partial file.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::app::input::{InputTable, PhysicalKey};

/// Suffix appended to a project name to form its bindings file name.
pub const BINDINGS_SUFFIX: &str = ".sb3.json";

/// One logical control name and the physical key it is bound to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlBinding {
    pub name: String,
    pub key: Option<PhysicalKey>,
}

impl ControlBinding {
    pub fn display_key(&self) -> String {
        self.key.map_or_else(|| "(none)".to_string(), |k| k.to_string())
    }
}

#[derive(Debug, Error)]
pub enum BindingError {
    #[error("failed to create directory {path}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write bindings file {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read bindings file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed bindings file {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to serialise bindings")]
    Serialise(#[from] serde_json::Error),
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct BindingsFile {
    #[serde(default)]
    controls: BTreeMap<String, String>,
}

/// Reads and writes bindings files under one root folder.
#[derive(Debug, Clone)]
pub struct BindingStore {
    root: PathBuf,
}

impl BindingStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path_for(&self, project: &str) -> PathBuf {
        self.root.join(format!("{project}{BINDINGS_SUFFIX}"))
    }

    /// Persist `bindings` for `project`, overwriting any previous file.
    /// Unbound entries are omitted.
    pub fn save(&self, project: &str, bindings: &[ControlBinding]) -> Result<PathBuf, BindingError> {
        let path = self.path_for(project);
        let dir = path.parent().unwrap_or(Path::new(".")).to_path_buf();
        std::fs::create_dir_all(&dir).map_err(|source| BindingError::CreateDir {
            path: dir.clone(),
            source,
        })?;

        let file = BindingsFile {
            controls: bindings
                .iter()
                .filter_map(|b| b.key.map(|k| (b.name.clone(), k.to_string())))
                .collect(),
        };
        let json = serde_json::to_string_pretty(&file)?;

        let write_err = |source| BindingError::Write {
            path: path.clone(),
            source,
        };
        let mut tmp = tempfile::NamedTempFile::new_in(&dir).map_err(write_err)?;
        tmp.write_all(json.as_bytes()).map_err(write_err)?;
        tmp.write_all(b"\n").map_err(write_err)?;
        tmp.persist(&path).map_err(|e| write_err(e.error))?;

        tracing::info!(path = %path.display(), count = file.controls.len(), "controls saved");
        Ok(path)
    }

    /// Load saved bindings for `project`.  A missing file is an empty map;
    /// entries naming an unknown key are skipped.
    pub fn load(&self, project: &str) -> Result<BTreeMap<String, PhysicalKey>, BindingError> {
        let path = self.path_for(project);
        let contents = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(source) => return Err(BindingError::Read { path, source }),
        };
        let file: BindingsFile = serde_json::from_str(&contents)
            .map_err(|source| BindingError::Parse { path: path.clone(), source })?;

        let mut out = BTreeMap::new();
        for (name, key) in file.controls {
            match PhysicalKey::from_str(&key) {
                Ok(k) => {
                    out.insert(name, k);
                }
                Err(_) => tracing::warn!(%name, %key, "ignoring binding to unknown key"),
            }
        }
        Ok(out)
    }
}

/// Build the binding list for a project's scanned `controls`: saved entry
/// first, otherwise the canonical table's default key for that name.
pub fn resolve_bindings(
    controls: &[String],
    saved: &BTreeMap<String, PhysicalKey>,
    table: &InputTable,
) -> Vec<ControlBinding> {
    controls
        .iter()
        .map(|name| ControlBinding {
            name: name.clone(),
            key: saved.get(name).copied().or_else(|| table.physical_for(name)),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn binding(name: &str, key: Option<PhysicalKey>) -> ControlBinding {
        ControlBinding { name: name.into(), key }
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = BindingStore::new(dir.path());
        let bindings = vec![
            binding("space", Some(PhysicalKey::A)),
            binding("up arrow", Some(PhysicalKey::DpadUp)),
            binding("z", Some(PhysicalKey::R)),
        ];
        store.save("Pong", &bindings).unwrap();
        let loaded = store.load("Pong").unwrap();
        let expected: BTreeMap<_, _> = bindings.iter().map(|b| (b.name.clone(), b.key.unwrap())).collect();
        assert_eq!(loaded, expected);
    }

    #[test]
    fn file_layout_is_pretty_controls_object() {
        let dir = tempfile::tempdir().unwrap();
        let store = BindingStore::new(dir.path());
        let path = store.save("Maze Game", &[binding("space", Some(PhysicalKey::B)), binding("q", None)]).unwrap();
        assert_eq!(path, dir.path().join("Maze Game.sb3.json"));

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\n  \"controls\""), "not pretty-printed: {text}");
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value, serde_json::json!({"controls": {"space": "B"}}));
    }

    #[test]
    fn save_overwrites_whole_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = BindingStore::new(dir.path());
        store.save("p", &[binding("a", Some(PhysicalKey::A)), binding("b", Some(PhysicalKey::B))]).unwrap();
        store.save("p", &[binding("a", Some(PhysicalKey::X))]).unwrap();
        let loaded = store.load("p").unwrap();
        assert_eq!(loaded, BTreeMap::from([("a".to_string(), PhysicalKey::X)]));
    }

    #[test]
    fn creates_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let store = BindingStore::new(dir.path().join("nested/deeper"));
        store.save("p", &[binding("a", Some(PhysicalKey::A))]).unwrap();
        assert!(dir.path().join("nested/deeper/p.sb3.json").exists());
    }

    #[test]
    fn directory_failure_aborts_and_keeps_state() {
        let dir = tempfile::tempdir().unwrap();
        // a file where the directory should be
        let blocker = dir.path().join("blocked");
        std::fs::write(&blocker, "x").unwrap();
        let store = BindingStore::new(blocker.join("sub"));
        let err = store.save("p", &[binding("a", Some(PhysicalKey::A))]).unwrap_err();
        assert!(matches!(err, BindingError::CreateDir { .. }));
        assert_eq!(std::fs::read_to_string(&blocker).unwrap(), "x");
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = BindingStore::new(dir.path());
        assert!(store.load("nothing").unwrap().is_empty());
    }

    #[test]
    fn unknown_keys_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let store = BindingStore::new(dir.path());
        std::fs::write(
            store.path_for("p"),
            r#"{"controls": {"space": "A", "left arrow": "Turbo", "x": ""}}"#,
        )
        .unwrap();
        let loaded = store.load("p").unwrap();
        assert_eq!(loaded, BTreeMap::from([("space".to_string(), PhysicalKey::A)]));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = BindingStore::new(dir.path());
        std::fs::write(store.path_for("p"), "{not json").unwrap();
        assert!(matches!(store.load("p"), Err(BindingError::Parse { .. })));
    }

    #[test]
    fn resolve_prefers_saved_then_default() {
        let table = InputTable::default();
        let saved = BTreeMap::from([("space".to_string(), PhysicalKey::Y)]);
        let controls = vec!["space".to_string(), "a".to_string(), "w".to_string()];
        let resolved = resolve_bindings(&controls, &saved, &table);
        assert_eq!(
            resolved,
            vec![
                binding("space", Some(PhysicalKey::Y)),
                binding("a", Some(PhysicalKey::A)),
                binding("w", None),
            ]
        );
        assert_eq!(resolved[2].display_key(), "(none)");
    }
}
