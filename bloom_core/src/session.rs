//! Workout session state machine.
//!
//! A session owns the resolved exercise list, the current exercise index,
//! the countdown for the current exercise, and the XP earned so far. All
//! changes go through [`Session::apply`] with a [`Command`]; intents the
//! current state does not accept are rejected with
//! [`Error::InvalidTransition`] and leave the session untouched.
//!
//! ```text
//! Idle --Start--> Running <--Pause/Resume--> Paused
//!   |               |  Tick/Skip (advance)
//!   |               v
//!   |           Completed            Running/Paused --Quit--> Quit
//!   +--Start (no exercises)--> Empty
//! ```
//!
//! Ticks and skips are stamped with the exercise index they were issued
//! for. A stamp that does not match the current index is stale and is
//! dropped, and each index can be advanced from at most once, so a timeout
//! and a skip racing on the same exercise produce exactly one advance.

use crate::substitution::{resolve_workout, ResolvedExercise};
use crate::{xp, Error, ExerciseKind, Modifiers, Phase, Result, SubstitutionTables, Workout};
use serde::{Deserialize, Serialize};

/// Seconds added by [`Command::Extend`] unless the plan says otherwise
pub const DEFAULT_EXTEND_SECONDS: u32 = 15;

/// Percent of earned XP granted as a streak bonus unless the plan says otherwise
pub const DEFAULT_STREAK_BONUS_PERCENT: u32 = 10;

/// Everything needed to start a session
#[derive(Clone, Debug)]
pub struct SessionPlan {
    pub workout_id: String,
    pub phase: Phase,
    pub total_xp: u32,
    /// Exercises with substitutions already applied
    pub exercises: Vec<ResolvedExercise>,
    pub streak_bonus_eligible: bool,
    pub streak_bonus_percent: u32,
    pub extend_seconds: u32,
}

impl SessionPlan {
    /// Build a plan for a catalog workout, resolving substitutions
    pub fn for_workout(
        workout: &Workout,
        phase: Phase,
        modifiers: &Modifiers,
        tables: &SubstitutionTables,
        streak_bonus_eligible: bool,
    ) -> Self {
        Self {
            workout_id: workout.id.clone(),
            phase,
            total_xp: workout.xp,
            exercises: resolve_workout(workout, modifiers, tables).exercises,
            streak_bonus_eligible,
            streak_bonus_percent: DEFAULT_STREAK_BONUS_PERCENT,
            extend_seconds: DEFAULT_EXTEND_SECONDS,
        }
    }
}

/// What a completed session reports to the progression ledger
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionOutcome {
    pub workout_id: String,
    pub phase: Phase,
    pub base_xp: u32,
    pub bonus_xp: u32,
}

impl SessionOutcome {
    pub fn total_xp(&self) -> u32 {
        self.base_xp + self.bonus_xp
    }
}

/// Lifecycle state of a session
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// No workout loaded
    Idle,
    /// Exercise active, timer counting down
    Running,
    /// Timer stopped; time remaining is preserved
    Paused,
    /// Every exercise finished
    Completed(SessionOutcome),
    /// Abandoned by the user; earned XP is discarded
    Quit,
    /// Started with a workout that has no exercises
    Empty,
}

impl SessionState {
    pub fn name(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Running => "running",
            SessionState::Paused => "paused",
            SessionState::Completed(_) => "completed",
            SessionState::Quit => "quit",
            SessionState::Empty => "empty",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SessionState::Completed(_) | SessionState::Quit | SessionState::Empty
        )
    }
}

/// Transition messages accepted by a session
#[derive(Clone, Debug)]
pub enum Command {
    Start(SessionPlan),
    /// One second elapsed on the exercise at `index`
    Tick { index: usize },
    /// User skipped the exercise at `index`
    Skip { index: usize },
    Pause,
    Resume,
    /// Add time to the current rest step
    Extend,
    Quit,
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Start(_) => "start",
            Command::Tick { .. } => "tick",
            Command::Skip { .. } => "skip",
            Command::Pause => "pause",
            Command::Resume => "resume",
            Command::Extend => "extend",
            Command::Quit => "quit",
        }
    }
}

/// Observable effects of a transition, in order
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    Started {
        exercise_count: usize,
        time_remaining: u32,
    },
    Ticked {
        index: usize,
        time_remaining: u32,
    },
    /// Left the exercise at `from` and began the one at `to`
    Advanced {
        from: usize,
        to: usize,
        awarded: u32,
        left_kind: ExerciseKind,
        time_remaining: u32,
    },
    Paused {
        time_remaining: u32,
    },
    Resumed {
        time_remaining: u32,
    },
    Extended {
        time_remaining: u32,
    },
    Completed {
        awarded: u32,
        outcome: SessionOutcome,
    },
    Quit {
        discarded_xp: u32,
    },
    Empty,
}

/// Ensures at most one advance per exercise index
///
/// Claimed when an advance starts for an index; released only when the
/// index actually changes.
#[derive(Clone, Debug, Default)]
struct AdvanceGuard {
    claimed: Option<usize>,
}

impl AdvanceGuard {
    fn claim(&mut self, index: usize) -> bool {
        if self.claimed == Some(index) {
            return false;
        }
        self.claimed = Some(index);
        true
    }

    fn release(&mut self) {
        self.claimed = None;
    }
}

/// The runtime state of one in-progress workout
#[derive(Clone, Debug)]
pub struct Session {
    state: SessionState,
    workout_id: String,
    phase: Phase,
    exercises: Vec<ResolvedExercise>,
    awards: Vec<u32>,
    index: usize,
    time_remaining: u32,
    accumulated_xp: u32,
    streak_bonus_eligible: bool,
    streak_bonus_percent: u32,
    extend_seconds: u32,
    guard: AdvanceGuard,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// A session in the idle state
    pub fn new() -> Self {
        Self {
            state: SessionState::Idle,
            workout_id: String::new(),
            phase: Phase::Menstrual,
            exercises: Vec::new(),
            awards: Vec::new(),
            index: 0,
            time_remaining: 0,
            accumulated_xp: 0,
            streak_bonus_eligible: false,
            streak_bonus_percent: DEFAULT_STREAK_BONUS_PERCENT,
            extend_seconds: DEFAULT_EXTEND_SECONDS,
            guard: AdvanceGuard::default(),
        }
    }

    /// Apply a transition
    ///
    /// Returns the events it produced. Stale ticks and skips produce no
    /// events and are not errors.
    pub fn apply(&mut self, command: Command) -> Result<Vec<SessionEvent>> {
        let idle = self.state == SessionState::Idle;
        let running = self.state == SessionState::Running;
        let paused = self.state == SessionState::Paused;

        match command {
            Command::Start(plan) if idle => Ok(self.start(plan)),

            Command::Tick { index } if running => Ok(self.tick(index)),
            // A tick already queued when the timer was cancelled
            Command::Tick { index } if paused => {
                tracing::debug!("Dropping tick for exercise {} while paused", index);
                Ok(Vec::new())
            }

            Command::Skip { index } if running => {
                if !self.is_current(index) {
                    tracing::debug!("Dropping stale skip for exercise {}", index);
                    return Ok(Vec::new());
                }
                Ok(self.advance())
            }

            Command::Pause if running => {
                self.state = SessionState::Paused;
                tracing::debug!("Paused with {}s remaining", self.time_remaining);
                Ok(vec![SessionEvent::Paused {
                    time_remaining: self.time_remaining,
                }])
            }

            Command::Resume if paused => {
                self.state = SessionState::Running;
                tracing::debug!("Resumed with {}s remaining", self.time_remaining);
                Ok(vec![SessionEvent::Resumed {
                    time_remaining: self.time_remaining,
                }])
            }

            Command::Extend if (running || paused) && self.current_is_rest() => {
                self.time_remaining += self.extend_seconds;
                Ok(vec![SessionEvent::Extended {
                    time_remaining: self.time_remaining,
                }])
            }

            Command::Quit if running || paused => {
                let discarded_xp = self.accumulated_xp;
                self.state = SessionState::Quit;
                tracing::info!(
                    "Quit workout {} at exercise {} ({} XP discarded)",
                    self.workout_id,
                    self.index,
                    discarded_xp
                );
                Ok(vec![SessionEvent::Quit { discarded_xp }])
            }

            command => Err(Error::InvalidTransition {
                state: self.state.name(),
                command: command.name(),
            }),
        }
    }

    /// Convenience: tick stamped with the current index
    pub fn tick_current(&mut self) -> Result<Vec<SessionEvent>> {
        let index = self.index;
        self.apply(Command::Tick { index })
    }

    /// Convenience: skip stamped with the current index
    pub fn skip_current(&mut self) -> Result<Vec<SessionEvent>> {
        let index = self.index;
        self.apply(Command::Skip { index })
    }

    fn start(&mut self, plan: SessionPlan) -> Vec<SessionEvent> {
        self.workout_id = plan.workout_id;
        self.phase = plan.phase;
        self.streak_bonus_eligible = plan.streak_bonus_eligible;
        self.streak_bonus_percent = plan.streak_bonus_percent;
        self.extend_seconds = plan.extend_seconds;
        self.index = 0;
        self.accumulated_xp = 0;
        self.guard.release();

        if plan.exercises.is_empty() {
            tracing::warn!("Workout {} has no exercises", self.workout_id);
            self.state = SessionState::Empty;
            return vec![SessionEvent::Empty];
        }

        self.awards = xp::allocate(
            plan.total_xp,
            plan.exercises.iter().map(|r| r.exercise.kind),
        );
        self.exercises = plan.exercises;
        self.time_remaining = self.exercises[0].exercise.duration_seconds;
        self.state = SessionState::Running;

        tracing::info!(
            "Started workout {} ({} exercises, {} XP)",
            self.workout_id,
            self.exercises.len(),
            plan.total_xp
        );

        vec![SessionEvent::Started {
            exercise_count: self.exercises.len(),
            time_remaining: self.time_remaining,
        }]
    }

    fn tick(&mut self, index: usize) -> Vec<SessionEvent> {
        if !self.is_current(index) {
            tracing::debug!("Dropping stale tick for exercise {}", index);
            return Vec::new();
        }

        self.time_remaining = self.time_remaining.saturating_sub(1);
        let mut events = vec![SessionEvent::Ticked {
            index,
            time_remaining: self.time_remaining,
        }];
        if self.time_remaining == 0 {
            events.extend(self.advance());
        }
        events
    }

    /// Award the exercise being left, then move on or complete
    fn advance(&mut self) -> Vec<SessionEvent> {
        let from = self.index;
        if !self.guard.claim(from) {
            tracing::debug!("Advance already taken for exercise {}", from);
            return Vec::new();
        }

        let awarded = self.awards.get(from).copied().unwrap_or(0);
        self.accumulated_xp += awarded;
        let left_kind = self.exercises[from].exercise.kind;

        if from + 1 < self.exercises.len() {
            self.index = from + 1;
            self.guard.release();
            self.time_remaining = self.exercises[self.index].exercise.duration_seconds;
            tracing::debug!(
                "Advanced {} -> {} (+{} XP, total {})",
                from,
                self.index,
                awarded,
                self.accumulated_xp
            );
            return vec![SessionEvent::Advanced {
                from,
                to: self.index,
                awarded,
                left_kind,
                time_remaining: self.time_remaining,
            }];
        }

        self.time_remaining = 0;
        let bonus_xp = xp::streak_bonus(
            self.accumulated_xp,
            self.streak_bonus_eligible,
            self.streak_bonus_percent,
        );
        let outcome = SessionOutcome {
            workout_id: self.workout_id.clone(),
            phase: self.phase,
            base_xp: self.accumulated_xp,
            bonus_xp,
        };
        self.state = SessionState::Completed(outcome.clone());
        tracing::info!(
            "Completed workout {} ({} XP + {} bonus)",
            outcome.workout_id,
            outcome.base_xp,
            outcome.bonus_xp
        );

        vec![SessionEvent::Completed { awarded, outcome }]
    }

    fn is_current(&self, index: usize) -> bool {
        index == self.index
    }

    fn current_is_rest(&self) -> bool {
        self.current_exercise().map_or(false, |r| r.exercise.is_rest())
    }

    // ------------------------------------------------------------------
    // Read access for the presentation layer
    // ------------------------------------------------------------------

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn workout_id(&self) -> &str {
        &self.workout_id
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn time_remaining(&self) -> u32 {
        self.time_remaining
    }

    /// XP earned so far in this session
    pub fn accumulated_xp(&self) -> u32 {
        self.accumulated_xp
    }

    pub fn exercises(&self) -> &[ResolvedExercise] {
        &self.exercises
    }

    pub fn current_exercise(&self) -> Option<&ResolvedExercise> {
        self.exercises.get(self.index)
    }

    pub fn next_exercise(&self) -> Option<&ResolvedExercise> {
        self.exercises.get(self.index + 1)
    }

    /// XP the exercise at `index` is worth
    pub fn award_for(&self, index: usize) -> u32 {
        self.awards.get(index).copied().unwrap_or(0)
    }

    /// Fraction of exercises reached, counting the current one
    pub fn progress(&self) -> f64 {
        if self.exercises.is_empty() {
            return 0.0;
        }
        (self.index + 1) as f64 / self.exercises.len() as f64
    }

    pub fn outcome(&self) -> Option<&SessionOutcome> {
        match &self.state {
            SessionState::Completed(outcome) => Some(outcome),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::get_default_catalog;
    use crate::{Exercise, Impact};

    fn step(name: &str, duration_seconds: u32, kind: ExerciseKind) -> ResolvedExercise {
        ResolvedExercise::unchanged(Exercise {
            name: name.into(),
            duration_seconds,
            kind,
            impact: Impact::Low,
            requires_floor: false,
            cue: String::new(),
            muscle_group: String::new(),
        })
    }

    fn plan(exercises: Vec<ResolvedExercise>, total_xp: u32, bonus: bool) -> SessionPlan {
        SessionPlan {
            workout_id: "t1".into(),
            phase: Phase::Follicular,
            total_xp,
            exercises,
            streak_bonus_eligible: bonus,
            streak_bonus_percent: DEFAULT_STREAK_BONUS_PERCENT,
            extend_seconds: DEFAULT_EXTEND_SECONDS,
        }
    }

    /// squat 3s, rest 2s, plank 2s; 10 XP split 5/5
    fn short_plan(bonus: bool) -> SessionPlan {
        plan(
            vec![
                step("Squat", 3, ExerciseKind::Strength),
                step("Rest", 2, ExerciseKind::Rest),
                step("Plank", 2, ExerciseKind::Hold),
            ],
            10,
            bonus,
        )
    }

    fn started(bonus: bool) -> Session {
        let mut session = Session::new();
        session.apply(Command::Start(short_plan(bonus))).unwrap();
        session
    }

    fn run_to_end(session: &mut Session) {
        while *session.state() == SessionState::Running {
            session.tick_current().unwrap();
        }
    }

    #[test]
    fn test_start_enters_running() {
        crate::logging::init_test();
        let session = started(false);
        assert_eq!(*session.state(), SessionState::Running);
        assert_eq!(session.index(), 0);
        assert_eq!(session.time_remaining(), 3);
        assert_eq!(session.accumulated_xp(), 0);
        assert_eq!(session.award_for(0), 5);
        assert_eq!(session.award_for(1), 0);
        assert_eq!(session.award_for(2), 5);
    }

    #[test]
    fn test_start_empty_workout() {
        let mut session = Session::new();
        let events = session.apply(Command::Start(plan(vec![], 10, false))).unwrap();
        assert_eq!(events, vec![SessionEvent::Empty]);
        assert_eq!(*session.state(), SessionState::Empty);
        assert!(session.state().is_terminal());
        assert_eq!(session.time_remaining(), 0);
        assert!(session.tick_current().is_err());
    }

    #[test]
    fn test_ticks_count_down_and_advance() {
        let mut session = started(false);
        session.tick_current().unwrap();
        session.tick_current().unwrap();
        assert_eq!(session.time_remaining(), 1);

        let events = session.tick_current().unwrap();
        assert_eq!(
            events,
            vec![
                SessionEvent::Ticked {
                    index: 0,
                    time_remaining: 0
                },
                SessionEvent::Advanced {
                    from: 0,
                    to: 1,
                    awarded: 5,
                    left_kind: ExerciseKind::Strength,
                    time_remaining: 2,
                },
            ]
        );
        assert_eq!(session.index(), 1);
        assert_eq!(session.accumulated_xp(), 5);
    }

    #[test]
    fn test_full_run_completes_with_all_xp() {
        let mut session = started(false);
        run_to_end(&mut session);

        let outcome = session.outcome().unwrap();
        assert_eq!(outcome.base_xp, 10);
        assert_eq!(outcome.bonus_xp, 0);
        assert_eq!(outcome.phase, Phase::Follicular);
        assert_eq!(outcome.workout_id, "t1");
        assert_eq!(session.time_remaining(), 0);
    }

    #[test]
    fn test_streak_bonus_on_completion() {
        let mut session = Session::new();
        let mut p = short_plan(true);
        p.total_xp = 35;
        session.apply(Command::Start(p)).unwrap();
        run_to_end(&mut session);

        let outcome = session.outcome().unwrap();
        assert_eq!(outcome.base_xp, 35);
        assert_eq!(outcome.bonus_xp, 4);
        assert_eq!(outcome.total_xp(), 39);
    }

    #[test]
    fn test_timeout_and_skip_on_same_index_advance_once() {
        let mut session = started(false);
        session.tick_current().unwrap();
        session.tick_current().unwrap();

        // Natural timeout and a skip both issued for exercise 0
        let timeout = session.apply(Command::Tick { index: 0 }).unwrap();
        let skip = session.apply(Command::Skip { index: 0 }).unwrap();

        assert!(timeout
            .iter()
            .any(|e| matches!(e, SessionEvent::Advanced { from: 0, .. })));
        assert!(skip.is_empty());
        assert_eq!(session.index(), 1);
        assert_eq!(session.accumulated_xp(), 5);
        assert_eq!(session.time_remaining(), 2);
    }

    #[test]
    fn test_skip_then_stale_timeout_advance_once() {
        let mut session = started(false);
        session.apply(Command::Skip { index: 0 }).unwrap();
        let late = session.apply(Command::Tick { index: 0 }).unwrap();

        assert!(late.is_empty());
        assert_eq!(session.index(), 1);
        assert_eq!(session.time_remaining(), 2);
        assert_eq!(session.accumulated_xp(), 5);
    }

    #[test]
    fn test_guard_blocks_second_claim() {
        let mut guard = AdvanceGuard::default();
        assert!(guard.claim(3));
        assert!(!guard.claim(3));
        guard.release();
        assert!(guard.claim(3));
    }

    #[test]
    fn test_skipping_everything_earns_same_xp() {
        let mut played = started(false);
        run_to_end(&mut played);

        let mut skipped = started(false);
        while *skipped.state() == SessionState::Running {
            skipped.skip_current().unwrap();
        }

        assert_eq!(played.outcome(), skipped.outcome());
    }

    #[test]
    fn test_pause_freezes_timer() {
        let mut session = started(false);
        session.tick_current().unwrap();
        session.apply(Command::Pause).unwrap();

        // Late ticks are ignored while paused
        assert!(session.apply(Command::Tick { index: 0 }).unwrap().is_empty());
        assert!(session.apply(Command::Tick { index: 0 }).unwrap().is_empty());
        assert_eq!(session.time_remaining(), 2);

        let events = session.apply(Command::Resume).unwrap();
        assert_eq!(events, vec![SessionEvent::Resumed { time_remaining: 2 }]);
        assert_eq!(*session.state(), SessionState::Running);
    }

    #[test]
    fn test_illegal_transitions_rejected() {
        let mut session = started(false);
        let err = session.apply(Command::Resume).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidTransition {
                state: "running",
                command: "resume"
            }
        ));

        session.apply(Command::Pause).unwrap();
        assert!(session.apply(Command::Pause).is_err());
        assert!(session.apply(Command::Skip { index: 0 }).is_err());
        assert!(session.apply(Command::Start(short_plan(false))).is_err());

        let mut idle = Session::new();
        assert!(idle.apply(Command::Quit).is_err());
        assert!(idle.apply(Command::Pause).is_err());
    }

    #[test]
    fn test_extend_only_on_rest() {
        let mut session = started(false);
        assert!(session.apply(Command::Extend).is_err());
        assert_eq!(session.time_remaining(), 3);

        session.skip_current().unwrap();
        let events = session.apply(Command::Extend).unwrap();
        assert_eq!(events, vec![SessionEvent::Extended { time_remaining: 17 }]);

        session.apply(Command::Pause).unwrap();
        session.apply(Command::Extend).unwrap();
        assert_eq!(session.time_remaining(), 32);
        assert_eq!(*session.state(), SessionState::Paused);
    }

    #[test]
    fn test_quit_discards_xp() {
        let mut session = started(false);
        session.skip_current().unwrap();
        let events = session.apply(Command::Quit).unwrap();
        assert_eq!(events, vec![SessionEvent::Quit { discarded_xp: 5 }]);
        assert_eq!(*session.state(), SessionState::Quit);
        assert!(session.outcome().is_none());
        assert!(session.apply(Command::Resume).is_err());
    }

    #[test]
    fn test_quit_from_paused() {
        let mut session = started(false);
        session.apply(Command::Pause).unwrap();
        session.apply(Command::Quit).unwrap();
        assert_eq!(*session.state(), SessionState::Quit);
    }

    #[test]
    fn test_terminal_rejects_everything() {
        let mut session = started(false);
        run_to_end(&mut session);
        assert!(session.tick_current().is_err());
        assert!(session.skip_current().is_err());
        assert!(session.apply(Command::Quit).is_err());
    }

    #[test]
    fn test_zero_duration_step_clamps_and_advances() {
        let mut session = Session::new();
        session
            .apply(Command::Start(plan(
                vec![
                    step("Blink", 0, ExerciseKind::Flow),
                    step("Breathe", 5, ExerciseKind::Flow),
                ],
                4,
                false,
            )))
            .unwrap();

        let events = session.tick_current().unwrap();
        assert!(events.contains(&SessionEvent::Ticked {
            index: 0,
            time_remaining: 0
        }));
        assert_eq!(session.index(), 1);
        assert_eq!(session.time_remaining(), 5);
    }

    #[test]
    fn test_catalog_workout_conserves_xp() {
        let catalog = get_default_catalog();
        let workout = catalog.workout("f1").unwrap();
        let mut session = Session::new();
        session
            .apply(Command::Start(SessionPlan::for_workout(
                workout,
                Phase::Follicular,
                &Modifiers::default(),
                &catalog.substitutions,
                false,
            )))
            .unwrap();
        run_to_end(&mut session);

        assert_eq!(session.outcome().unwrap().base_xp, workout.xp);
    }

    #[test]
    fn test_progress() {
        let mut session = started(false);
        assert!((session.progress() - 1.0 / 3.0).abs() < 1e-9);
        session.skip_current().unwrap();
        session.skip_current().unwrap();
        assert!((session.progress() - 1.0).abs() < 1e-9);
        assert!(session.next_exercise().is_none());
        assert_eq!(session.current_exercise().unwrap().exercise.name, "Plank");
    }
}
