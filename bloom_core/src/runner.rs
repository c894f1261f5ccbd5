//! Drives a [`Session`] from a real one-second timer.
//!
//! The runner owns at most one [`Ticker`], tied 1:1 to the session being in
//! the running state on a particular exercise. Every ticker gets a fresh
//! epoch and stamps its ticks with that epoch and the exercise index it was
//! armed for. Ticks from a cancelled ticker can still be sitting in the
//! channel; their epoch no longer matches and they are dropped before they
//! reach the session.
//!
//! The ticker is cancelled before any command that leaves the current
//! timer behind (pause, quit, skip, or the tick that ends an exercise) is
//! applied, and a new one is armed afterwards if the session is still
//! running. Resuming arms a new ticker anchored to the moment of resume.

use crate::session::{Command, Session, SessionEvent, SessionPlan, SessionState};
use crate::timer::Ticker;
use crate::Result;
use std::sync::mpsc::Sender;
use std::time::Duration;

/// A timer tick stamped with the ticker that produced it
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimerTick {
    pub epoch: u64,
    pub index: usize,
}

struct ArmedTicker {
    ticker: Ticker,
    index: usize,
}

/// Session plus the timer that feeds it
///
/// Ticks are delivered as `E::from(TimerTick)` on the sender given at
/// construction, so the caller can merge them with user input on one
/// channel and feed them back through [`SessionRunner::handle_tick`].
pub struct SessionRunner<E> {
    session: Session,
    ticker: Option<ArmedTicker>,
    epoch: u64,
    interval: Duration,
    events: Sender<E>,
}

impl<E> SessionRunner<E>
where
    E: From<TimerTick> + Send + 'static,
{
    pub fn new(interval: Duration, events: Sender<E>) -> Self {
        Self {
            session: Session::new(),
            ticker: None,
            epoch: 0,
            interval,
            events,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn state(&self) -> &SessionState {
        self.session.state()
    }

    /// True while a ticker is running
    pub fn is_armed(&self) -> bool {
        self.ticker.is_some()
    }

    /// Epoch of the current (or most recent) ticker
    pub fn current_epoch(&self) -> u64 {
        self.epoch
    }

    pub fn start(&mut self, plan: SessionPlan) -> Result<Vec<SessionEvent>> {
        self.dispatch(Command::Start(plan))
    }

    /// Feed a tick received from the channel
    pub fn handle_tick(&mut self, tick: TimerTick) -> Result<Vec<SessionEvent>> {
        if !self.is_armed() || tick.epoch != self.epoch {
            tracing::debug!(
                "Dropping tick from epoch {} (current {})",
                tick.epoch,
                self.epoch
            );
            return Ok(Vec::new());
        }
        self.dispatch(Command::Tick { index: tick.index })
    }

    pub fn skip(&mut self) -> Result<Vec<SessionEvent>> {
        let index = self.session.index();
        self.dispatch(Command::Skip { index })
    }

    pub fn pause(&mut self) -> Result<Vec<SessionEvent>> {
        self.dispatch(Command::Pause)
    }

    pub fn resume(&mut self) -> Result<Vec<SessionEvent>> {
        self.dispatch(Command::Resume)
    }

    /// Pause when running, resume when paused
    pub fn toggle_pause(&mut self) -> Result<Vec<SessionEvent>> {
        if *self.session.state() == SessionState::Paused {
            self.resume()
        } else {
            self.pause()
        }
    }

    pub fn extend(&mut self) -> Result<Vec<SessionEvent>> {
        self.dispatch(Command::Extend)
    }

    pub fn quit(&mut self) -> Result<Vec<SessionEvent>> {
        self.dispatch(Command::Quit)
    }

    fn dispatch(&mut self, command: Command) -> Result<Vec<SessionEvent>> {
        if self.leaves_current_timer(&command) {
            self.disarm();
        }
        let result = self.session.apply(command);
        self.sync_timer();
        result
    }

    fn leaves_current_timer(&self, command: &Command) -> bool {
        match command {
            Command::Pause | Command::Quit | Command::Skip { .. } => true,
            Command::Tick { .. } => self.session.time_remaining() <= 1,
            Command::Start(_) | Command::Resume | Command::Extend => false,
        }
    }

    /// Arm or cancel so a ticker exists exactly while running
    fn sync_timer(&mut self) {
        let running = *self.session.state() == SessionState::Running;
        let index = self.session.index();

        match &self.ticker {
            Some(armed) if running && armed.index == index => {}
            _ if running => {
                self.disarm();
                self.arm(index);
            }
            Some(_) => self.disarm(),
            None => {}
        }
    }

    fn arm(&mut self, index: usize) {
        self.epoch += 1;
        let tick = TimerTick {
            epoch: self.epoch,
            index,
        };
        let events = self.events.clone();
        let ticker = Ticker::spawn(self.interval, move || events.send(E::from(tick)).is_ok());
        tracing::debug!("Armed ticker epoch {} for exercise {}", self.epoch, index);
        self.ticker = Some(ArmedTicker { ticker, index });
    }

    fn disarm(&mut self) {
        if let Some(armed) = self.ticker.take() {
            armed.ticker.cancel();
            tracing::debug!("Cancelled ticker epoch {}", self.epoch);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::substitution::ResolvedExercise;
    use crate::{Exercise, ExerciseKind, Impact, Phase};
    use std::sync::mpsc::{self, Receiver};

    // Long enough that no real tick arrives during a synchronous test
    const SLOW: Duration = Duration::from_secs(3600);

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

    fn plan() -> SessionPlan {
        SessionPlan {
            workout_id: "r1".into(),
            phase: Phase::Luteal,
            total_xp: 9,
            exercises: vec![
                step("March", 3, ExerciseKind::Cardio),
                step("Rest", 2, ExerciseKind::Rest),
                step("Stretch", 2, ExerciseKind::Flow),
            ],
            streak_bonus_eligible: false,
            streak_bonus_percent: 10,
            extend_seconds: 15,
        }
    }

    fn runner(interval: Duration) -> (SessionRunner<TimerTick>, Receiver<TimerTick>) {
        let (tx, rx) = mpsc::channel();
        (SessionRunner::new(interval, tx), rx)
    }

    fn tick(runner: &SessionRunner<TimerTick>) -> TimerTick {
        TimerTick {
            epoch: runner.current_epoch(),
            index: runner.session().index(),
        }
    }

    #[test]
    fn test_timer_armed_only_while_running() {
        let (mut runner, _rx) = runner(SLOW);
        assert!(!runner.is_armed());

        runner.start(plan()).unwrap();
        assert!(runner.is_armed());

        runner.pause().unwrap();
        assert!(!runner.is_armed());

        runner.resume().unwrap();
        assert!(runner.is_armed());

        runner.quit().unwrap();
        assert!(!runner.is_armed());
    }

    #[test]
    fn test_pause_resume_keeps_time_remaining() {
        let (mut runner, _rx) = runner(SLOW);
        runner.start(plan()).unwrap();
        runner.handle_tick(tick(&runner)).unwrap();
        assert_eq!(runner.session().time_remaining(), 2);

        let before_pause = tick(&runner);
        runner.pause().unwrap();
        std::thread::sleep(Duration::from_millis(30));

        // A tick queued by the cancelled ticker arrives late
        assert!(runner.handle_tick(before_pause).unwrap().is_empty());
        runner.resume().unwrap();
        assert_eq!(runner.session().time_remaining(), 2);

        // Even after resume, the old epoch stays dead
        assert!(runner.handle_tick(before_pause).unwrap().is_empty());
        assert_eq!(runner.session().time_remaining(), 2);
        assert_ne!(runner.current_epoch(), before_pause.epoch);
    }

    #[test]
    fn test_queued_tick_after_skip_is_dropped() {
        let (mut runner, _rx) = runner(SLOW);
        runner.start(plan()).unwrap();
        runner.handle_tick(tick(&runner)).unwrap();
        runner.handle_tick(tick(&runner)).unwrap();

        // The tick that would time out exercise 0 is already queued
        let queued = tick(&runner);
        runner.skip().unwrap();
        assert!(runner.handle_tick(queued).unwrap().is_empty());

        assert_eq!(runner.session().index(), 1);
        assert_eq!(runner.session().accumulated_xp(), 5);
        assert_eq!(runner.session().time_remaining(), 2);
    }

    #[test]
    fn test_rearms_on_new_exercise() {
        let (mut runner, _rx) = runner(SLOW);
        runner.start(plan()).unwrap();
        let first_epoch = runner.current_epoch();

        runner.skip().unwrap();
        assert!(runner.is_armed());
        assert!(runner.current_epoch() > first_epoch);

        // Ticks within one exercise do not re-arm
        let epoch = runner.current_epoch();
        runner.handle_tick(tick(&runner)).unwrap();
        assert_eq!(runner.current_epoch(), epoch);
    }

    #[test]
    fn test_real_timer_runs_to_completion() {
        let (mut runner, rx) = runner(Duration::from_millis(2));
        runner.start(plan()).unwrap();

        let mut completed = None;
        while completed.is_none() {
            let tick = rx.recv_timeout(Duration::from_secs(5)).unwrap();
            for event in runner.handle_tick(tick).unwrap() {
                if let SessionEvent::Completed { outcome, .. } = event {
                    completed = Some(outcome);
                }
            }
        }

        let outcome = completed.unwrap();
        assert_eq!(outcome.base_xp, 9);
        assert!(!runner.is_armed());
    }
}
