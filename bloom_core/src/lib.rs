#![forbid(unsafe_code)]

//! Core domain model and business logic for Bloom, a cycle-aware workout coach.
//!
//! This crate provides:
//! - Domain types (phases, exercises, workouts, modifiers)
//! - The built-in catalog and exercise substitution
//! - XP allocation and the workout session state machine
//! - A timer-driven session runner
//! - The progression ledger and its persistence
//! - Cycle phase calculation, bloom stages, audio cues, and the workout journal

pub mod types;
pub mod error;
pub mod catalog;
pub mod config;
pub mod logging;
pub mod substitution;
pub mod xp;
pub mod session;
pub mod timer;
pub mod runner;
pub mod ledger;
pub mod state;
pub mod bloom;
pub mod cycle;
pub mod cues;
pub mod journal;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use catalog::{build_default_catalog, get_default_catalog};
pub use config::Config;
pub use substitution::{format_duration, resolve_workout, Conflict, ResolvedExercise, ResolvedWorkout};
pub use session::{Command, Session, SessionEvent, SessionOutcome, SessionPlan, SessionState};
pub use runner::{SessionRunner, TimerTick};
pub use ledger::{CompletionReport, LedgerTransition, ProgressionLedger, TransitionOutcome};
pub use state::{JsonFileStore, LedgerHandle, LedgerStore};
pub use cycle::CycleCalendar;
pub use cues::{Cue, CueSink};
pub use journal::{Feeling, JournalEntry, JournalSink, JsonlJournal};
