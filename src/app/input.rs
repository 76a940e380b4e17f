//! Input model: physical keys, per-tick snapshots, and the canonical
//! physical → logical table.
//!
//! Physical keys are the buttons of a virtual game pad.  Logical ids are the
//! key names projects read (`"a"`, `"space"`, `"up arrow"`, …).  Menus match
//! on logical ids so they keep working whatever the platform pad looks like.

use std::collections::BTreeMap;

use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

use crate::core::control::Point;

/// Synthetic logical id reported whenever anything is held.
pub const WILDCARD: &str = "any";

/// A physical button on the virtual pad.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumString, EnumIter,
)]
pub enum PhysicalKey {
    A,
    B,
    X,
    Y,
    L,
    R,
    Start,
    Select,
    DpadUp,
    DpadDown,
    DpadLeft,
    DpadRight,
}

/// Input state for one tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputSnapshot {
    /// Held keys, oldest registration first.
    pub held: Vec<PhysicalKey>,
    /// Keys that went down this tick.
    pub just_pressed: Vec<PhysicalKey>,
    /// Pointer click this tick, in interactive-surface coordinates.
    pub click: Option<Point>,
}

impl InputSnapshot {
    /// Held keys as logical ids, preceded by [`WILDCARD`] when anything is
    /// held.  Unmapped physical keys are skipped.
    pub fn held_logical<'t>(&self, table: &'t InputTable) -> Vec<&'t str> {
        let mut out = Vec::with_capacity(self.held.len() + 1);
        if !self.held.is_empty() {
            out.push(WILDCARD);
        }
        out.extend(self.held.iter().filter_map(|&k| table.logical(k)));
        out
    }
}

/// Per-tick input source.
pub trait Input {
    /// Take one snapshot.  Implementations may block up to one tick.
    fn poll(&mut self) -> InputSnapshot;

    /// Discard anything buffered without producing a snapshot.
    fn drain(&mut self);
}

// ───────────────────────────────────────── canonical table ───

/// Canonical physical → logical mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputTable {
    map: BTreeMap<PhysicalKey, String>,
}

impl Default for InputTable {
    fn default() -> Self {
        use PhysicalKey::*;
        let map = [
            (A, "a"),
            (B, "b"),
            (X, "x"),
            (Y, "y"),
            (L, "l"),
            (R, "r"),
            (Start, "1"),
            (Select, "0"),
            (DpadUp, "up arrow"),
            (DpadDown, "down arrow"),
            (DpadLeft, "left arrow"),
            (DpadRight, "right arrow"),
        ]
        .into_iter()
        .map(|(k, v)| (k, v.to_string()))
        .collect();
        Self { map }
    }
}

impl InputTable {
    pub fn logical(&self, key: PhysicalKey) -> Option<&str> {
        self.map.get(&key).map(String::as_str)
    }

    /// First physical key (in pad order) mapped to `logical`.
    pub fn physical_for(&self, logical: &str) -> Option<PhysicalKey> {
        PhysicalKey::iter().find(|k| self.logical(*k) == Some(logical))
    }

    /// Re-point physical keys at project control names
    /// (`logical name → physical key`, as stored in a bindings file).
    pub fn apply_overrides(&mut self, overrides: &BTreeMap<String, PhysicalKey>) {
        for (name, &key) in overrides {
            self.map.insert(key, name.clone());
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (PhysicalKey, &str)> {
        self.map.iter().map(|(k, v)| (*k, v.as_str()))
    }

    /// `{"A": "a", …}` for handing to the player runtime.
    pub fn to_json(&self) -> serde_json::Value {
        let obj: serde_json::Map<String, serde_json::Value> = self
            .iter()
            .map(|(k, v)| (k.to_string(), serde_json::Value::from(v)))
            .collect();
        serde_json::Value::Object(obj)
    }
}
