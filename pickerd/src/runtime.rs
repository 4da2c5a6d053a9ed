//! # Picker Runtime
//!
//! Loads a snapshot, replays an action script against the picker and writes
//! one frame per step.

use crate::action_script::{ActionScript, ScriptCommand, ScriptError, ScriptStep};
use fs_tree::{SnapshotError, SnapshotOptions, TreeSnapshot};
use picker_settings::persistence::{self, PersistenceError};
use picker_settings::{create_default_registry, PickerSettings};
use serde::Serialize;
use services_column_picker::{NavigationController, PickerResult, RenderModel};
use services_sandbox_storage::{
    DirectoryStorage, LoadEvent, MemoryStorage, SandboxStorage, SnapshotLoader, StorageError,
};
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// Host error types
#[derive(Debug, Error)]
pub enum HostError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),

    #[error("Settings error: {0}")]
    Settings(#[from] PersistenceError),

    #[error("Script error: {0}")]
    Script(#[from] ScriptError),

    #[error("Output error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Conflicting sources: use either --sandbox or --tree")]
    ConflictingSources,
}

/// Host configuration
#[derive(Debug, Clone)]
pub struct HostConfig {
    /// Origin whose sandbox and settings are used
    pub origin: String,
    /// Base directory holding one sandbox per origin
    pub sandbox: Option<PathBuf>,
    /// JSON tree to browse instead of a sandbox
    pub tree: Option<PathBuf>,
    /// Settings overrides document
    pub settings: Option<PathBuf>,
    /// Action script text
    pub script: Option<String>,
    /// Emit JSON lines instead of text frames
    pub json: bool,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            origin: "local".to_string(),
            sandbox: None,
            tree: None,
            settings: None,
            script: None,
            json: false,
        }
    }
}

/// Where snapshots come from
enum SnapshotSource {
    Storage(Arc<dyn SandboxStorage>),
    TreeFile(PathBuf),
}

/// What a finished run produced
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Number of script steps executed
    pub steps: usize,
    /// Every signal other than "continue", in order
    pub signals: Vec<PickerResult>,
    /// Whether the picker was closed
    pub closed: bool,
}

#[derive(Serialize)]
struct SignalRecord<'a> {
    kind: &'static str,
    path: Option<&'a str>,
}

#[derive(Serialize)]
struct FrameRecord<'a> {
    step: usize,
    command: &'a str,
    signal: Option<SignalRecord<'a>>,
    model: &'a RenderModel,
}

/// Picker runtime
pub struct PickerRuntime {
    config: HostConfig,
    settings: PickerSettings,
    source: SnapshotSource,
    loader: SnapshotLoader,
    controller: NavigationController,
    script: ActionScript,
}

impl PickerRuntime {
    /// Creates a runtime and loads the first snapshot
    pub fn new(config: HostConfig) -> Result<Self, HostError> {
        let mut registry = create_default_registry();
        if let Some(path) = &config.settings {
            registry.import_overrides(persistence::load_file(path)?.to_overrides());
        }
        let settings = PickerSettings::resolve(&registry, &config.origin);
        info!(origin = %config.origin, ?settings, "settings resolved");

        let source = match (&config.sandbox, &config.tree) {
            (Some(_), Some(_)) => return Err(HostError::ConflictingSources),
            (Some(base), None) => SnapshotSource::Storage(Arc::new(DirectoryStorage::open(
                base,
                config.origin.as_str(),
            )?)),
            (None, Some(tree)) => SnapshotSource::TreeFile(tree.clone()),
            (None, None) => {
                SnapshotSource::Storage(Arc::new(MemoryStorage::new(config.origin.as_str())))
            }
        };

        let script = match &config.script {
            Some(text) => ActionScript::from_text(text)?,
            None => ActionScript::new(),
        };

        let options = SnapshotOptions {
            show_hidden: settings.show_hidden,
        };
        let mut loader = SnapshotLoader::new(options);
        let snapshot = load(&source, &mut loader, options)?;
        let controller = NavigationController::with_history_limit(snapshot, settings.history_limit);

        Ok(Self {
            config,
            settings,
            source,
            loader,
            controller,
            script,
        })
    }

    /// Runs the script to completion, writing a frame after every step
    ///
    /// Stops early once the picker is closed.
    pub fn run(&mut self, out: &mut impl Write) -> Result<RunSummary, HostError> {
        let mut summary = RunSummary::default();
        self.write_frame(out, 0, "load", &PickerResult::Continue)?;

        while let Some(step) = self.script.next_step() {
            summary.steps += 1;
            let result = self.execute(&step)?;
            self.write_frame(out, summary.steps, &step.text, &result)?;

            match result {
                PickerResult::Continue => {}
                PickerResult::Closed => {
                    summary.signals.push(result);
                    summary.closed = true;
                    break;
                }
                other => summary.signals.push(other),
            }
        }

        info!(steps = summary.steps, signals = summary.signals.len(), "script finished");
        Ok(summary)
    }

    /// Returns the picker
    pub fn controller(&self) -> &NavigationController {
        &self.controller
    }

    /// Returns the effective settings
    pub fn settings(&self) -> &PickerSettings {
        &self.settings
    }

    /// Loads a fresh snapshot and hands it to the picker
    pub fn reload(&mut self) -> Result<(), HostError> {
        let options = SnapshotOptions {
            show_hidden: self.settings.show_hidden,
        };
        let snapshot = load(&self.source, &mut self.loader, options)?;
        self.controller.replace_snapshot(snapshot);
        Ok(())
    }

    fn execute(&mut self, step: &ScriptStep) -> Result<PickerResult, HostError> {
        debug!(line = step.line, command = %step.text, "script step");
        match &step.command {
            ScriptCommand::Action(action) => Ok(self.controller.dispatch(action.clone())),
            ScriptCommand::Reload => {
                self.reload()?;
                Ok(PickerResult::Continue)
            }
        }
    }

    fn write_frame(
        &self,
        out: &mut impl Write,
        step: usize,
        command: &str,
        result: &PickerResult,
    ) -> Result<(), HostError> {
        let model = self.controller.render_model();
        let signal = signal_record(result);

        if self.config.json {
            let record = FrameRecord {
                step,
                command,
                signal,
                model: &model,
            };
            serde_json::to_writer(&mut *out, &record)?;
            writeln!(out)?;
            return Ok(());
        }

        writeln!(out, "== {} [{}] ==", step, command)?;
        for line in model.render_text(self.settings.column_width) {
            writeln!(out, "{}", line)?;
        }
        if let Some(signal) = signal {
            writeln!(out, "signal: {} {}", signal.kind, signal.path.unwrap_or(""))?;
        }
        Ok(())
    }
}

fn signal_record(result: &PickerResult) -> Option<SignalRecord<'_>> {
    match result {
        PickerResult::Continue => None,
        PickerResult::OpenFile(path) => Some(SignalRecord {
            kind: "open-file",
            path: Some(path.as_str()),
        }),
        PickerResult::OpenSelection(path) => Some(SignalRecord {
            kind: "open-selection",
            path: Some(path.as_str()),
        }),
        PickerResult::Closed => Some(SignalRecord {
            kind: "close",
            path: None,
        }),
    }
}

/// Builds a snapshot from the source
///
/// A storage failure is returned as an error and leaves the loader's
/// installed snapshot untouched.
fn load(
    source: &SnapshotSource,
    loader: &mut SnapshotLoader,
    options: SnapshotOptions,
) -> Result<Arc<TreeSnapshot>, HostError> {
    match source {
        SnapshotSource::Storage(storage) => {
            loader.request(Arc::clone(storage));
            for event in loader.wait() {
                if let LoadEvent::Failed(_, e) = event {
                    return Err(e.into());
                }
            }
            Ok(loader.snapshot())
        }
        SnapshotSource::TreeFile(path) => {
            let json = fs::read_to_string(path)?;
            Ok(Arc::new(TreeSnapshot::from_json(&json, options)?))
        }
    }
}
