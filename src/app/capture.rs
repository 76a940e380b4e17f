//! Blocking key capture used to rebind a project control.
//!
//! ```text
//! Idle ──arm──▶ Armed ──held set appears──▶ Capturing ──dwell reached──▶ Resolved
//!                 │ (waits for release first)    │ released early ─────────▶ Resolved(NoChange)
//! ```
//!
//! The session is a plain state machine fed one [`InputSnapshot`] per
//! step; [`KeyCaptureSession::run`] is the blocking driver that owns the
//! input stream until a result is reached or the run signal drops.

use super::input::{Input, InputSnapshot, InputTable, PhysicalKey, WILDCARD};
use super::services::RunSignal;

/// Final outcome of a capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureResult {
    /// Bind the control to this key.
    Bound(PhysicalKey),
    /// Nothing usable was held; keep the old binding.
    NoChange,
    /// The run signal dropped mid-capture.
    Aborted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureState {
    Idle,
    /// `released` turns true once the activating press has been let go.
    Armed { released: bool },
    /// `keys` has been held unchanged for `ticks` snapshots.
    Capturing { keys: Vec<PhysicalKey>, ticks: u32 },
    Resolved(CaptureResult),
}

#[derive(Debug)]
pub struct KeyCaptureSession {
    state: CaptureState,
    dwell_ticks: u32,
}

impl KeyCaptureSession {
    /// `dwell_ticks` is the number of consecutive snapshots a held set must
    /// survive before it is accepted (minimum 1).
    pub fn new(dwell_ticks: u32) -> Self {
        Self {
            state: CaptureState::Idle,
            dwell_ticks: dwell_ticks.max(1),
        }
    }

    pub fn state(&self) -> &CaptureState {
        &self.state
    }

    /// Idle → Armed.  No-op in any other state.
    pub fn arm(&mut self) {
        if self.state == CaptureState::Idle {
            self.state = CaptureState::Armed { released: false };
        }
    }

    /// Advance with one snapshot.
    pub fn step(&mut self, input: &InputSnapshot, table: &InputTable) -> &CaptureState {
        let next = match &self.state {
            CaptureState::Idle | CaptureState::Resolved(_) => None,
            CaptureState::Armed { released: false } => input
                .held
                .is_empty()
                .then_some(CaptureState::Armed { released: true }),
            CaptureState::Armed { released: true } => {
                if input.held.is_empty() {
                    None
                } else {
                    Some(self.held_for(input.held.clone(), 1, table))
                }
            }
            CaptureState::Capturing { keys, ticks } => {
                if input.held.is_empty() {
                    tracing::warn!("input released before dwell threshold; binding unchanged");
                    Some(CaptureState::Resolved(CaptureResult::NoChange))
                } else if input.held == *keys {
                    Some(self.held_for(keys.clone(), ticks + 1, table))
                } else {
                    // held set changed: restart the dwell on the new set
                    Some(self.held_for(input.held.clone(), 1, table))
                }
            }
        };
        if let Some(state) = next {
            self.state = state;
        }
        &self.state
    }

    fn held_for(&self, keys: Vec<PhysicalKey>, ticks: u32, table: &InputTable) -> CaptureState {
        if ticks >= self.dwell_ticks {
            CaptureState::Resolved(resolve(&keys, table))
        } else {
            CaptureState::Capturing { keys, ticks }
        }
    }

    /// Blocking driver: arms the session if idle, then polls `input` until
    /// resolved.  Checks `signal` before every poll.
    pub fn run(
        &mut self,
        input: &mut dyn Input,
        table: &InputTable,
        signal: &dyn RunSignal,
    ) -> CaptureResult {
        self.arm();
        loop {
            if !signal.should_run() {
                tracing::warn!("run signal dropped during key capture");
                self.state = CaptureState::Resolved(CaptureResult::Aborted);
                return CaptureResult::Aborted;
            }
            let snapshot = input.poll();
            if let CaptureState::Resolved(result) = self.step(&snapshot, table) {
                return *result;
            }
        }
    }
}

/// Pick the most recently registered held key (ignoring the wildcard) and
/// map it back through the canonical table.
fn resolve(keys: &[PhysicalKey], table: &InputTable) -> CaptureResult {
    let snapshot = InputSnapshot {
        held: keys.to_vec(),
        ..Default::default()
    };
    let candidate = snapshot
        .held_logical(table)
        .into_iter()
        .filter(|name| *name != WILDCARD)
        .last();

    match candidate.and_then(|name| table.physical_for(name)) {
        Some(key) => CaptureResult::Bound(key),
        None => {
            tracing::warn!(?keys, "no input detected for control assignment");
            CaptureResult::NoChange
        }
    }
}
