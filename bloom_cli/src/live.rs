//! Interactive workout screen.
//!
//! Timer ticks and stdin lines arrive on one channel, so every session
//! transition happens on the main thread in the order the inputs arrived.

use bloom_core::cues::{self, Cue, CueSink};
use bloom_core::journal::Feeling;
use bloom_core::*;
use std::io::{self, BufRead, Write};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

pub enum Input {
    Tick(TimerTick),
    Line(String),
    /// stdin closed
    Eof,
}

impl From<TimerTick> for Input {
    fn from(tick: TimerTick) -> Self {
        Input::Tick(tick)
    }
}

/// Plays cues as terminal bells
struct BellCues;

impl CueSink for BellCues {
    fn play(&mut self, cue: Cue) {
        let bells = match cue {
            Cue::Countdown => 1,
            Cue::Transition | Cue::RestEnd => 2,
            Cue::Complete => 3,
        };
        print!("{}", "\x07".repeat(bells));
    }
}

/// Line-based terminal input shared by the workout and the prompts after it
pub struct Console {
    tx: Sender<Input>,
    rx: Receiver<Input>,
    stdin_open: bool,
}

impl Console {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        let reader_tx = tx.clone();

        // Blocks on stdin for the life of the process; never joined
        thread::spawn(move || {
            let stdin = io::stdin();
            for line in stdin.lock().lines() {
                match line {
                    Ok(line) => {
                        if reader_tx.send(Input::Line(line)).is_err() {
                            return;
                        }
                    }
                    Err(_) => break,
                }
            }
            let _ = reader_tx.send(Input::Eof);
        });

        Self {
            tx,
            rx,
            stdin_open: true,
        }
    }

    /// Run a session to a terminal state with the real timer
    pub fn run_session(&mut self, plan: SessionPlan, interval: Duration) -> Result<SessionState> {
        let mut runner = SessionRunner::new(interval, self.tx.clone());
        let mut bells = BellCues;
        let mut quit_requested = false;

        print_controls();
        let events = runner.start(plan)?;
        render(runner.session(), &events);

        while !runner.state().is_terminal() {
            let input = match self.rx.recv() {
                Ok(input) => input,
                Err(_) => break,
            };

            let result = match input {
                Input::Tick(tick) => runner.handle_tick(tick),
                Input::Eof => {
                    tracing::debug!("stdin closed, timer keeps running");
                    self.stdin_open = false;
                    continue;
                }
                Input::Line(line) => {
                    let key = line.trim().chars().next().map(|c| c.to_ascii_lowercase());
                    if key != Some('q') {
                        quit_requested = false;
                    }
                    match key {
                        Some('p') => runner.toggle_pause(),
                        Some('s') => runner.skip(),
                        Some('e') => runner.extend(),
                        Some('q') if quit_requested => runner.quit(),
                        Some('q') => {
                            quit_requested = true;
                            println!("\n  Quit workout? Progress won't be saved. Press q again to confirm.");
                            continue;
                        }
                        _ => {
                            print_controls();
                            continue;
                        }
                    }
                }
            };

            match result {
                Ok(events) => {
                    cues::play_all(&mut bells, &events);
                    render(runner.session(), &events);
                }
                Err(e) => println!("\n  {}", e),
            }
        }

        println!();
        Ok(runner.state().clone())
    }

    /// Ask how the workout felt; None when skipped or stdin is closed
    pub fn prompt_feeling(&mut self) -> Option<Feeling> {
        if !self.stdin_open {
            return None;
        }

        println!("How did that feel?  [t]ough  [j]ust right  [e]asy  (Enter to skip)");
        print!("> ");
        let _ = io::stdout().flush();

        loop {
            match self.rx.recv() {
                Ok(Input::Line(line)) => {
                    return match line.trim().chars().next().map(|c| c.to_ascii_lowercase()) {
                        Some('t') => Some(Feeling::Tough),
                        Some('j') => Some(Feeling::JustRight),
                        Some('e') => Some(Feeling::Easy),
                        _ => None,
                    };
                }
                // Ticks left over from the finished session
                Ok(Input::Tick(_)) => continue,
                Ok(Input::Eof) | Err(_) => {
                    self.stdin_open = false;
                    return None;
                }
            }
        }
    }
}

fn print_controls() {
    println!("  p + Enter: pause/resume   s: skip   e: +15s rest   q: quit");
}

fn render(session: &Session, events: &[SessionEvent]) {
    for event in events {
        match event {
            SessionEvent::Started { .. } => print_exercise(session),
            SessionEvent::Ticked { time_remaining, .. } => {
                if let Some(current) = session.current_exercise() {
                    print!(
                        "\r  {:<28} {}   {} XP ",
                        current.exercise.name,
                        clock(*time_remaining),
                        session.accumulated_xp()
                    );
                }
            }
            SessionEvent::Advanced { awarded, .. } => {
                if *awarded > 0 {
                    println!("\n  +{} XP", awarded);
                } else {
                    println!();
                }
                print_exercise(session);
            }
            SessionEvent::Paused { time_remaining } => {
                println!("\n  Paused at {}", clock(*time_remaining));
            }
            SessionEvent::Resumed { .. } => println!("  Resumed"),
            SessionEvent::Extended { time_remaining } => {
                println!("\n  Rest extended to {}", clock(*time_remaining));
            }
            SessionEvent::Completed { .. } => println!(),
            SessionEvent::Quit { .. } => println!("\n  Workout quit."),
            SessionEvent::Empty => println!("  This workout has no exercises."),
        }
    }
    let _ = io::stdout().flush();
}

fn print_exercise(session: &Session) {
    let Some(current) = session.current_exercise() else {
        return;
    };
    println!();
    println!(
        "  [{}/{}] {}",
        session.index() + 1,
        session.exercises().len(),
        current.exercise.name
    );
    if let Some(original) = &current.replaces {
        println!("        Replacing: {}", original);
    }
    if !current.exercise.cue.is_empty() {
        println!("        {}", current.exercise.cue);
    }
    if let Some(next) = session.next_exercise() {
        println!("        Up next: {}", next.exercise.name);
    }
}

fn clock(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}
