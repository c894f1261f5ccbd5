//! Exercise substitution under safety modifiers.
//!
//! Resolution rules, in priority order:
//! 1. `low_impact_only` + high-impact exercise + low-impact table entry
//! 2. `no_floor_work` + floor exercise + standing table entry (clears the floor flag)
//! 3. Pass-through
//!
//! At most one rule applies to an exercise. Rest steps are never substituted.

use crate::{Exercise, Impact, Modifiers, SubstitutionTables, Workout};
use serde::Serialize;

/// A modifier that still applies to an exercise after resolution because
/// no table entry exists for it
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Conflict {
    /// Low-impact mode is on but the exercise is still high impact
    HighImpact,
    /// No-floor mode is on but the exercise still needs floor space
    FloorRequired,
}

/// Exercise as it will actually be performed
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct ResolvedExercise {
    pub exercise: Exercise,
    /// Name of the exercise this one replaces ("Replacing: X")
    pub replaces: Option<String>,
    pub conflicts: Vec<Conflict>,
}

impl ResolvedExercise {
    /// Wrap an exercise with no substitution applied
    pub fn unchanged(exercise: Exercise) -> Self {
        Self {
            exercise,
            replaces: None,
            conflicts: Vec::new(),
        }
    }

    pub fn is_substituted(&self) -> bool {
        self.replaces.is_some()
    }
}

/// Resolve the exercise to perform under the given modifiers
pub fn resolve(
    exercise: &Exercise,
    modifiers: &Modifiers,
    tables: &SubstitutionTables,
) -> ResolvedExercise {
    if exercise.is_rest() {
        return ResolvedExercise::unchanged(exercise.clone());
    }

    let impact_sub = if modifiers.low_impact_only && exercise.impact == Impact::High {
        tables.low_impact.get(&exercise.name)
    } else {
        None
    };
    let floor_sub = if modifiers.no_floor_work && exercise.requires_floor {
        tables.standing.get(&exercise.name)
    } else {
        None
    };

    let mut resolved = if let Some(name) = impact_sub {
        ResolvedExercise {
            exercise: Exercise {
                name: name.clone(),
                cue: format!(
                    "Low-impact version of {}. Same movement pattern, gentler on joints.",
                    exercise.name
                ),
                impact: Impact::Low,
                ..exercise.clone()
            },
            replaces: Some(exercise.name.clone()),
            conflicts: Vec::new(),
        }
    } else if let Some(name) = floor_sub {
        ResolvedExercise {
            exercise: Exercise {
                name: name.clone(),
                cue: format!("Standing version of {}. No floor needed.", exercise.name),
                requires_floor: false,
                ..exercise.clone()
            },
            replaces: Some(exercise.name.clone()),
            conflicts: Vec::new(),
        }
    } else {
        ResolvedExercise::unchanged(exercise.clone())
    };

    if modifiers.low_impact_only && resolved.exercise.impact == Impact::High {
        resolved.conflicts.push(Conflict::HighImpact);
    }
    if modifiers.no_floor_work && resolved.exercise.requires_floor {
        resolved.conflicts.push(Conflict::FloorRequired);
    }

    if !resolved.conflicts.is_empty() {
        tracing::debug!(
            "No substitution for '{}' under {:?}: {:?}",
            exercise.name,
            modifiers,
            resolved.conflicts
        );
    }

    resolved
}

/// A workout with every exercise resolved, ready for preview or a session
#[derive(Clone, Debug, Serialize)]
pub struct ResolvedWorkout {
    pub exercises: Vec<ResolvedExercise>,
}

impl ResolvedWorkout {
    /// Total scheduled time, in seconds
    pub fn total_seconds(&self) -> u32 {
        self.exercises
            .iter()
            .map(|r| r.exercise.duration_seconds)
            .sum()
    }

    /// Exercises that still violate an active modifier
    pub fn conflicts(&self) -> impl Iterator<Item = &ResolvedExercise> {
        self.exercises.iter().filter(|r| !r.conflicts.is_empty())
    }

    pub fn substitution_count(&self) -> usize {
        self.exercises.iter().filter(|r| r.is_substituted()).count()
    }
}

/// Resolve every exercise of a workout
pub fn resolve_workout(
    workout: &Workout,
    modifiers: &Modifiers,
    tables: &SubstitutionTables,
) -> ResolvedWorkout {
    ResolvedWorkout {
        exercises: workout
            .exercises
            .iter()
            .map(|e| resolve(e, modifiers, tables))
            .collect(),
    }
}

/// Human-friendly duration: "N sec" under two minutes, otherwise rounded minutes
pub fn format_duration(total_seconds: u32) -> String {
    let minutes = (total_seconds + 30) / 60;
    if minutes < 2 {
        format!("{} sec", total_seconds)
    } else {
        format!("{} min", minutes)
    }
}
