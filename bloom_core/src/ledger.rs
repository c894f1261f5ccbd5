//! Progression ledger: the durable cross-session record.
//!
//! The ledger is only ever changed through [`ProgressionLedger::apply`]
//! with a [`LedgerTransition`]. Each transition computes the complete next
//! record from the current one and replaces it in a single assignment, so
//! no partially-applied state (for example all four phase flags set with
//! the evolution not yet credited) can be observed or persisted.

use crate::cycle;
use crate::session::SessionOutcome;
use crate::{Modifier, Modifiers, Phase, PhaseMap, Workout};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Streak length at which sessions earn a bonus unless configured otherwise
pub const DEFAULT_STREAK_BONUS_THRESHOLD: u32 = 3;

/// Persisted progression record
///
/// Field names match the stored JSON record. Every field is defaulted on
/// load, so records written by older versions (without evolution tracking
/// or a cycle anchor) load cleanly.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct ProgressionLedger {
    #[serde(rename = "totalXP")]
    total_xp: u32,
    streak: u32,
    completed_ids: BTreeSet<String>,
    completed_by_phase: PhaseMap<u32>,
    modifiers: Modifiers,
    cycle_phase_flags: PhaseMap<bool>,
    evolution_count: u32,
    has_onboarded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    cycle_start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_observed_phase: Option<Phase>,
}

/// Transition messages accepted by the ledger
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LedgerTransition {
    /// A session ran to completion
    CompleteWorkout(SessionOutcome),
    /// A session was abandoned
    QuitWorkout,
    SetModifier { modifier: Modifier, value: bool },
    SetOnboarded,
    /// New cycle anchor; clears evolution progress for the old cycle
    SetCycleStart(NaiveDate),
    /// Clear the phase flags (no-op when already clear)
    ResetCyclePhases,
    /// The externally computed current phase, checked for rollover
    ObservePhase(Phase),
}

/// Reported to the presentation layer after a completion
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CompletionReport {
    pub just_evolved: bool,
    pub new_evolution_count: u32,
    pub new_total_xp: u32,
}

/// Result of applying a transition
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransitionOutcome {
    Completed(CompletionReport),
    /// The record changed
    Applied,
    /// A phase rollover cleared leftover phase flags
    RolledOver,
    /// The record is identical to before
    NoChange,
}

impl TransitionOutcome {
    /// Whether the record changed and needs persisting
    pub fn changed(&self) -> bool {
        !matches!(self, TransitionOutcome::NoChange)
    }
}

impl ProgressionLedger {
    pub fn total_xp(&self) -> u32 {
        self.total_xp
    }

    pub fn streak(&self) -> u32 {
        self.streak
    }

    pub fn completed_ids(&self) -> &BTreeSet<String> {
        &self.completed_ids
    }

    pub fn completed_by_phase(&self) -> &PhaseMap<u32> {
        &self.completed_by_phase
    }

    /// Total completions across all phases
    pub fn completion_count(&self) -> u32 {
        self.completed_by_phase.iter().map(|(_, n)| *n).sum()
    }

    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    pub fn cycle_phase_flags(&self) -> &PhaseMap<bool> {
        &self.cycle_phase_flags
    }

    pub fn evolution_count(&self) -> u32 {
        self.evolution_count
    }

    pub fn has_onboarded(&self) -> bool {
        self.has_onboarded
    }

    pub fn cycle_start_date(&self) -> Option<NaiveDate> {
        self.cycle_start_date
    }

    pub fn last_observed_phase(&self) -> Option<Phase> {
        self.last_observed_phase
    }

    /// Whether the current streak earns a session bonus
    pub fn streak_bonus_eligible(&self, threshold: u32) -> bool {
        self.streak >= threshold
    }

    /// Whether a workout's unlock requirement is met
    pub fn is_unlocked(&self, workout: &Workout) -> bool {
        match &workout.unlock {
            None => true,
            Some(req) => self.completed_by_phase[req.phase] >= req.workouts_needed,
        }
    }

    /// Apply a transition, replacing the whole record at once
    pub fn apply(&mut self, transition: LedgerTransition) -> TransitionOutcome {
        let (next, outcome) = self.next(transition);
        *self = next;
        outcome
    }

    /// Compute the record a transition would produce without applying it
    pub fn next(&self, transition: LedgerTransition) -> (ProgressionLedger, TransitionOutcome) {
        let mut next = self.clone();

        let outcome = match transition {
            LedgerTransition::CompleteWorkout(outcome) => {
                TransitionOutcome::Completed(next.complete(&outcome))
            }

            LedgerTransition::QuitWorkout => {
                if next.streak == 0 {
                    TransitionOutcome::NoChange
                } else {
                    tracing::info!("Workout quit, streak of {} reset", next.streak);
                    next.streak = 0;
                    TransitionOutcome::Applied
                }
            }

            LedgerTransition::SetModifier { modifier, value } => {
                if next.modifiers.get(modifier) == value {
                    TransitionOutcome::NoChange
                } else {
                    next.modifiers = next.modifiers.with(modifier, value);
                    TransitionOutcome::Applied
                }
            }

            LedgerTransition::SetOnboarded => {
                if next.has_onboarded {
                    TransitionOutcome::NoChange
                } else {
                    next.has_onboarded = true;
                    TransitionOutcome::Applied
                }
            }

            LedgerTransition::SetCycleStart(date) => {
                next.cycle_start_date = Some(date);
                next.cycle_phase_flags = PhaseMap::default();
                next.last_observed_phase = None;
                if next == *self {
                    TransitionOutcome::NoChange
                } else {
                    TransitionOutcome::Applied
                }
            }

            LedgerTransition::ResetCyclePhases => {
                if next.cycle_phase_flags.none() {
                    TransitionOutcome::NoChange
                } else {
                    next.cycle_phase_flags = PhaseMap::default();
                    TransitionOutcome::Applied
                }
            }

            LedgerTransition::ObservePhase(phase) => next.observe(phase),
        };

        (next, outcome)
    }

    fn complete(&mut self, outcome: &SessionOutcome) -> CompletionReport {
        let phase = outcome.phase;

        self.total_xp = self.total_xp.saturating_add(outcome.total_xp());
        self.streak += 1;
        self.completed_ids.insert(outcome.workout_id.clone());
        self.completed_by_phase[phase] += 1;

        let mut flags = self.cycle_phase_flags.clone();
        flags[phase] = true;

        let just_evolved = flags.all();
        if just_evolved {
            self.cycle_phase_flags = PhaseMap::default();
            self.evolution_count += 1;
            tracing::info!("Evolution {} reached", self.evolution_count);
        } else {
            self.cycle_phase_flags = flags;
        }

        tracing::info!(
            "Completed {} in {} phase: +{} XP ({} bonus), total {}",
            outcome.workout_id,
            phase,
            outcome.total_xp(),
            outcome.bonus_xp,
            self.total_xp
        );

        CompletionReport {
            just_evolved,
            new_evolution_count: self.evolution_count,
            new_total_xp: self.total_xp,
        }
    }

    fn observe(&mut self, phase: Phase) -> TransitionOutcome {
        let previous = self.last_observed_phase.replace(phase);

        match previous {
            Some(prev) if prev == phase => TransitionOutcome::NoChange,
            Some(prev) if cycle::is_rollover(prev, phase) => {
                // Flags already cleared by an evolution: nothing to reset
                if self.cycle_phase_flags.none() {
                    tracing::debug!("Cycle rolled over from {} to {}", prev, phase);
                    TransitionOutcome::Applied
                } else {
                    tracing::info!(
                        "Cycle rolled over from {} to {}, clearing {} phase flag(s)",
                        prev,
                        phase,
                        self.cycle_phase_flags.count()
                    );
                    self.cycle_phase_flags = PhaseMap::default();
                    TransitionOutcome::RolledOver
                }
            }
            _ => TransitionOutcome::Applied,
        }
    }
}
