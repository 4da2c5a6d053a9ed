//! Snapshot loading
//!
//! Loads are tagged with a generation when they are requested. A completed
//! load is installed only if it is newer than the snapshot already installed,
//! so a slow stale load can never clobber a fresher view.

use crate::operations::{load_snapshot, SandboxStorage, StorageError};
use fs_tree::{SnapshotOptions, TreeSnapshot};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;
use std::thread;
use tracing::{info, warn};

/// Generation tag of one requested load
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LoadTicket(u64);

impl LoadTicket {
    /// Returns the generation number
    pub fn generation(&self) -> u64 {
        self.0
    }
}

/// Holds the installed snapshot and decides which completed loads win
#[derive(Debug, Clone)]
pub struct SnapshotSlot {
    issued: u64,
    installed: u64,
    snapshot: Arc<TreeSnapshot>,
}

impl SnapshotSlot {
    /// Creates a slot holding an empty snapshot
    pub fn new() -> Self {
        Self {
            issued: 0,
            installed: 0,
            snapshot: Arc::new(TreeSnapshot::empty()),
        }
    }

    /// Issues a ticket for a new load
    pub fn begin(&mut self) -> LoadTicket {
        self.issued += 1;
        LoadTicket(self.issued)
    }

    /// Offers a completed load
    ///
    /// Returns true if the snapshot was installed, false if it was stale.
    pub fn complete(&mut self, ticket: LoadTicket, snapshot: TreeSnapshot) -> bool {
        if ticket.0 <= self.installed {
            info!(
                generation = ticket.0,
                installed = self.installed,
                "discarding stale snapshot"
            );
            return false;
        }
        self.installed = ticket.0;
        self.snapshot = Arc::new(snapshot);
        info!(generation = ticket.0, nodes = self.snapshot.len(), "snapshot installed");
        true
    }

    /// Returns true if the ticket is older than the installed snapshot
    pub fn is_stale(&self, ticket: LoadTicket) -> bool {
        ticket.0 <= self.installed
    }

    /// Returns the installed snapshot
    pub fn current(&self) -> Arc<TreeSnapshot> {
        Arc::clone(&self.snapshot)
    }

    /// Returns the generation of the installed snapshot (0 before any load)
    pub fn installed_generation(&self) -> u64 {
        self.installed
    }
}

impl Default for SnapshotSlot {
    fn default() -> Self {
        Self::new()
    }
}

/// What happened to a load once it finished
#[derive(Debug)]
pub enum LoadEvent {
    /// The snapshot is now the current one
    Installed(LoadTicket),
    /// A newer snapshot was already installed
    Discarded(LoadTicket),
    /// The storage failed; the current snapshot is unchanged
    Failed(LoadTicket, StorageError),
}

struct LoadOutcome {
    ticket: LoadTicket,
    result: Result<TreeSnapshot, StorageError>,
}

/// Runs snapshot loads on worker threads
pub struct SnapshotLoader {
    slot: SnapshotSlot,
    options: SnapshotOptions,
    outstanding: usize,
    tx: Sender<LoadOutcome>,
    rx: Receiver<LoadOutcome>,
}

impl SnapshotLoader {
    /// Creates a loader
    pub fn new(options: SnapshotOptions) -> Self {
        let (tx, rx) = channel();
        Self {
            slot: SnapshotSlot::new(),
            options,
            outstanding: 0,
            tx,
            rx,
        }
    }

    /// Starts loading a fresh snapshot from `storage`
    pub fn request(&mut self, storage: Arc<dyn SandboxStorage>) -> LoadTicket {
        let ticket = self.slot.begin();
        let options = self.options;
        let tx = self.tx.clone();
        self.outstanding += 1;

        let spawned = thread::Builder::new()
            .name(format!("snapshot-load-{}", ticket.0))
            .spawn(move || {
                let result = load_snapshot(storage.as_ref(), options);
                let _ = tx.send(LoadOutcome { ticket, result });
            });

        if let Err(e) = spawned {
            let _ = self.tx.send(LoadOutcome {
                ticket,
                result: Err(StorageError::Io(e)),
            });
        }
        ticket
    }

    /// Applies every load that has finished, without blocking
    pub fn poll(&mut self) -> Vec<LoadEvent> {
        let mut events = Vec::new();
        while let Ok(outcome) = self.rx.try_recv() {
            events.push(self.apply(outcome));
        }
        events
    }

    /// Blocks until every requested load has finished
    pub fn wait(&mut self) -> Vec<LoadEvent> {
        let mut events = Vec::new();
        while self.outstanding > 0 {
            match self.rx.recv() {
                Ok(outcome) => events.push(self.apply(outcome)),
                Err(_) => break,
            }
        }
        events
    }

    /// Returns the installed snapshot
    pub fn snapshot(&self) -> Arc<TreeSnapshot> {
        self.slot.current()
    }

    /// Returns the number of loads still running
    pub fn outstanding(&self) -> usize {
        self.outstanding
    }

    fn apply(&mut self, outcome: LoadOutcome) -> LoadEvent {
        self.outstanding = self.outstanding.saturating_sub(1);
        let LoadOutcome { ticket, result } = outcome;
        match result {
            Ok(snapshot) => {
                if self.slot.complete(ticket, snapshot) {
                    LoadEvent::Installed(ticket)
                } else {
                    LoadEvent::Discarded(ticket)
                }
            }
            Err(e) if self.slot.is_stale(ticket) => {
                warn!(generation = ticket.0, error = %e, "stale load failed");
                LoadEvent::Discarded(ticket)
            }
            Err(e) => {
                warn!(generation = ticket.0, error = %e, "snapshot load failed");
                LoadEvent::Failed(ticket, e)
            }
        }
    }
}
