//! Launcher integration.
//!
//! The binary talks to whatever wrapped it through **stdout**.  The menu
//! itself is drawn on the alternate screen (stderr-backed), so stdout only
//! carries the chosen project and its controls.

pub mod integration;
