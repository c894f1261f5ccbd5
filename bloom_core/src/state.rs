//! Ledger persistence with file locking.
//!
//! Loading never fails: a missing, unreadable, or corrupt record logs a
//! warning and yields the default ledger. Saving writes the whole record
//! atomically. [`LedgerHandle`] saves after every change and swallows save
//! failures, keeping the in-memory ledger authoritative.

use crate::ledger::{LedgerTransition, ProgressionLedger, TransitionOutcome};
use crate::session::SessionState;
use crate::{Error, Result};
use fs2::FileExt;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

impl ProgressionLedger {
    /// Load the ledger from a file with shared locking
    ///
    /// Returns the default ledger if the file doesn't exist or can't be parsed.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            tracing::info!("No state file found, using default state");
            return Self::default();
        }

        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) => {
                tracing::warn!(
                    "Unable to open state file {:?}: {}. Using defaults.",
                    path,
                    e
                );
                return Self::default();
            }
        };

        if let Err(e) = file.lock_shared() {
            tracing::warn!(
                "Unable to lock state file {:?}: {}. Using defaults.",
                path,
                e
            );
            return Self::default();
        }

        let mut contents = String::new();
        let read = std::io::BufReader::new(&file).read_to_string(&mut contents);
        let _ = file.unlock();

        if let Err(e) = read {
            tracing::warn!(
                "Failed to read state file {:?}: {}. Using defaults.",
                path,
                e
            );
            return Self::default();
        }

        match serde_json::from_str::<ProgressionLedger>(&contents) {
            Ok(ledger) => {
                tracing::debug!("Loaded ledger from {:?}", path);
                ledger
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to parse state file {:?}: {}. Using defaults.",
                    path,
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the ledger to a file with exclusive locking
    ///
    /// Writes to a temp file in the same directory, syncs it, then renames
    /// it over the original.
    pub fn save(&self, path: &Path) -> Result<()> {
        let parent = path
            .parent()
            .ok_or_else(|| Error::State(format!("State path {:?} has no parent", path)))?;
        std::fs::create_dir_all(parent)?;

        let temp = NamedTempFile::new_in(parent)?;
        temp.as_file().lock_exclusive()?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            let contents = serde_json::to_string(self)?;
            writer.write_all(contents.as_bytes())?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;

        temp.persist(path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Saved ledger to {:?}", path);
        Ok(())
    }
}

/// Durable storage for the ledger record
pub trait LedgerStore {
    /// Load the stored record, or the default when there is none
    fn load(&self) -> ProgressionLedger;

    fn save(&self, ledger: &ProgressionLedger) -> Result<()>;
}

/// Stores the ledger as a JSON file
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LedgerStore for JsonFileStore {
    fn load(&self) -> ProgressionLedger {
        ProgressionLedger::load(&self.path)
    }

    fn save(&self, ledger: &ProgressionLedger) -> Result<()> {
        ledger.save(&self.path)
    }
}

/// The process-wide ledger plus the store it is written through to
pub struct LedgerHandle<S> {
    ledger: ProgressionLedger,
    store: S,
}

impl<S: LedgerStore> LedgerHandle<S> {
    /// Load the ledger from the store (or start from defaults)
    pub fn open(store: S) -> Self {
        let ledger = store.load();
        Self { ledger, store }
    }

    pub fn ledger(&self) -> &ProgressionLedger {
        &self.ledger
    }

    /// Apply a transition and save the result if anything changed
    pub fn dispatch(&mut self, transition: LedgerTransition) -> TransitionOutcome {
        let outcome = self.ledger.apply(transition);
        if outcome.changed() {
            self.persist();
        }
        outcome
    }

    /// Report a finished session
    ///
    /// A completed session is credited; a quit session resets the streak.
    /// Returns None while the session is still in progress or was empty.
    pub fn record_session_end(&mut self, state: &SessionState) -> Option<TransitionOutcome> {
        match state {
            SessionState::Completed(outcome) => {
                Some(self.dispatch(LedgerTransition::CompleteWorkout(outcome.clone())))
            }
            SessionState::Quit => Some(self.dispatch(LedgerTransition::QuitWorkout)),
            _ => None,
        }
    }

    fn persist(&self) {
        if let Err(e) = self.store.save(&self.ledger) {
            tracing::warn!("Failed to save ledger: {}. Continuing in memory.", e);
        }
    }
}
