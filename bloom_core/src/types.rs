//! Core domain types for the Bloom cycle-aware coaching system.
//!
//! This module defines the fundamental types used throughout the system:
//! - Cycle phases and per-phase maps
//! - Exercises, workouts, and unlock requirements
//! - Safety modifiers consumed by the substitution resolver
//! - The content catalog container

use crate::Error;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::ops::{Index, IndexMut};
use std::str::FromStr;

// ============================================================================
// Phase Types
// ============================================================================

/// One of the four recurring cycle stages, in cycle order
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Menstrual,
    Follicular,
    Ovulatory,
    Luteal,
}

impl Phase {
    /// All phases in cycle order
    pub const ALL: [Phase; 4] = [
        Phase::Menstrual,
        Phase::Follicular,
        Phase::Ovulatory,
        Phase::Luteal,
    ];

    /// Position of this phase within one cycle (menstrual = 0)
    pub fn ordinal(self) -> usize {
        match self {
            Phase::Menstrual => 0,
            Phase::Follicular => 1,
            Phase::Ovulatory => 2,
            Phase::Luteal => 3,
        }
    }

    /// Stable lowercase key, as used in persisted records
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Menstrual => "menstrual",
            Phase::Follicular => "follicular",
            Phase::Ovulatory => "ovulatory",
            Phase::Luteal => "luteal",
        }
    }

    /// Human-readable label
    pub fn label(self) -> &'static str {
        match self {
            Phase::Menstrual => "Menstrual",
            Phase::Follicular => "Follicular",
            Phase::Ovulatory => "Ovulatory",
            Phase::Luteal => "Luteal",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Phase {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "menstrual" | "m" => Ok(Phase::Menstrual),
            "follicular" | "f" => Ok(Phase::Follicular),
            "ovulatory" | "o" => Ok(Phase::Ovulatory),
            "luteal" | "l" => Ok(Phase::Luteal),
            other => Err(Error::Other(format!("Unknown phase: {}", other))),
        }
    }
}

/// A value for each of the four phases
///
/// Serializes as an object keyed by phase name, which is the shape of
/// `completedByPhase` and `cyclePhaseFlags` in the persisted record.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PhaseMap<T> {
    #[serde(default)]
    pub menstrual: T,
    #[serde(default)]
    pub follicular: T,
    #[serde(default)]
    pub ovulatory: T,
    #[serde(default)]
    pub luteal: T,
}

impl<T> PhaseMap<T> {
    /// Iterate over (phase, value) pairs in cycle order
    pub fn iter(&self) -> impl Iterator<Item = (Phase, &T)> {
        Phase::ALL.into_iter().map(move |p| (p, &self[p]))
    }
}

impl PhaseMap<bool> {
    /// True when every phase is set
    pub fn all(&self) -> bool {
        self.iter().all(|(_, v)| *v)
    }

    /// True when no phase is set
    pub fn none(&self) -> bool {
        self.iter().all(|(_, v)| !*v)
    }

    /// Number of phases set
    pub fn count(&self) -> usize {
        self.iter().filter(|(_, v)| **v).count()
    }
}

impl<T> Index<Phase> for PhaseMap<T> {
    type Output = T;

    fn index(&self, phase: Phase) -> &T {
        match phase {
            Phase::Menstrual => &self.menstrual,
            Phase::Follicular => &self.follicular,
            Phase::Ovulatory => &self.ovulatory,
            Phase::Luteal => &self.luteal,
        }
    }
}

impl<T> IndexMut<Phase> for PhaseMap<T> {
    fn index_mut(&mut self, phase: Phase) -> &mut T {
        match phase {
            Phase::Menstrual => &mut self.menstrual,
            Phase::Follicular => &mut self.follicular,
            Phase::Ovulatory => &mut self.ovulatory,
            Phase::Luteal => &mut self.luteal,
        }
    }
}

// ============================================================================
// Exercise and Workout Types
// ============================================================================

/// Kind of movement step
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseKind {
    Strength,
    Cardio,
    Hold,
    Flow,
    Rest,
}

/// Joint impact of a movement
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Impact {
    Low,
    High,
}

/// One timed movement step within a workout
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Exercise {
    pub name: String,
    pub duration_seconds: u32,
    pub kind: ExerciseKind,
    pub impact: Impact,
    pub requires_floor: bool,
    pub cue: String,
    pub muscle_group: String,
}

impl Exercise {
    pub fn is_rest(&self) -> bool {
        self.kind == ExerciseKind::Rest
    }
}

/// Minimum completions in a phase before a workout becomes available
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct UnlockRequirement {
    pub phase: Phase,
    pub workouts_needed: u32,
}

/// A named, ordered sequence of exercises with a total XP reward
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Workout {
    pub id: String,
    pub title: String,
    pub subtitle: String,
    pub phase: Phase,
    pub difficulty: u8,
    pub xp: u32,
    pub warmup_note: Option<String>,
    pub unlock: Option<UnlockRequirement>,
    pub exercises: Vec<Exercise>,
}

impl Workout {
    /// Total scheduled time across all exercises, in seconds
    pub fn total_seconds(&self) -> u32 {
        self.exercises.iter().map(|e| e.duration_seconds).sum()
    }

    pub fn has_high_impact(&self) -> bool {
        self.exercises
            .iter()
            .any(|e| !e.is_rest() && e.impact == Impact::High)
    }

    pub fn has_floor_work(&self) -> bool {
        self.exercises
            .iter()
            .any(|e| !e.is_rest() && e.requires_floor)
    }
}

// ============================================================================
// Safety Modifiers
// ============================================================================

/// User safety toggles that trigger exercise substitution
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Modifiers {
    #[serde(default)]
    pub low_impact_only: bool,
    #[serde(default)]
    pub no_floor_work: bool,
}

/// Name of a single safety toggle
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Modifier {
    LowImpactOnly,
    NoFloorWork,
}

impl Modifiers {
    pub fn get(&self, modifier: Modifier) -> bool {
        match modifier {
            Modifier::LowImpactOnly => self.low_impact_only,
            Modifier::NoFloorWork => self.no_floor_work,
        }
    }

    /// Copy of these modifiers with exactly one toggle replaced
    pub fn with(mut self, modifier: Modifier, value: bool) -> Self {
        match modifier {
            Modifier::LowImpactOnly => self.low_impact_only = value,
            Modifier::NoFloorWork => self.no_floor_work = value,
        }
        self
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Modifier::LowImpactOnly => f.write_str("low-impact only"),
            Modifier::NoFloorWork => f.write_str("no floor work"),
        }
    }
}

impl FromStr for Modifier {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "low-impact" | "low-impact-only" | "lowimpactonly" => Ok(Modifier::LowImpactOnly),
            "no-floor" | "no-floor-work" | "nofloorwork" => Ok(Modifier::NoFloorWork),
            other => Err(Error::Other(format!("Unknown modifier: {}", other))),
        }
    }
}

// ============================================================================
// Catalog Types
// ============================================================================

/// Exercise-name keyed replacement tables for the two safety modifiers
#[derive(Clone, Debug, Default)]
pub struct SubstitutionTables {
    /// High-impact movement name -> low-impact alternative
    pub low_impact: HashMap<String, String>,
    /// Floor movement name -> standing alternative
    pub standing: HashMap<String, String>,
}

/// The complete catalog of workouts and substitution tables
#[derive(Clone, Debug)]
pub struct Catalog {
    pub workouts: Vec<Workout>,
    pub substitutions: SubstitutionTables,
}
