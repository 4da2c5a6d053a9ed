//! # Picker Host
//!
//! Host runtime for the column picker.
//!
//! ## Philosophy
//!
//! - **Host owns I/O**: The picker never prints or touches storage
//! - **Output is snapshot rendering**: One frame per step, text or JSON lines
//! - **Input is explicit actions**: Scripts, not keystrokes
//! - **Deterministic**: The same tree and script always give the same frames
//!
//! ## Responsibilities
//!
//! The host:
//! - Resolves settings for the configured origin
//! - Opens the origin's sandbox (or reads a JSON tree) and loads a snapshot
//! - Replays an action script and reports the signals it produced

pub mod action_script;
pub mod runtime;

pub use action_script::{ActionScript, ScriptCommand, ScriptError, ScriptStep};
pub use runtime::{HostConfig, HostError, PickerRuntime, RunSummary};
