use bloom_core::bloom::{bloom_stage, evolution_tier, next_stage};
use bloom_core::journal::{self, Feeling, JournalEntry, JournalSink, JsonlJournal};
use bloom_core::*;
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

mod live;

#[derive(Parser)]
#[command(name = "bloom")]
#[command(about = "Cycle-aware workout coach", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Treat this date (YYYY-MM-DD) as today when working out the cycle phase
    #[arg(long, global = true)]
    today: Option<NaiveDate>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show your Bloom, streak, and cycle progress (default)
    Status,

    /// Finish first-run setup
    Onboard {
        /// First day of your last period (YYYY-MM-DD)
        #[arg(long)]
        cycle_start: Option<NaiveDate>,
    },

    /// Manage the cycle calendar
    Cycle {
        #[command(subcommand)]
        action: CycleAction,
    },

    /// Turn a safety modifier on or off
    Modifier {
        /// low-impact or no-floor
        name: Modifier,

        #[arg(value_enum)]
        state: Toggle,
    },

    /// List workouts
    List {
        /// Phase to list (defaults to the current phase, or all phases)
        #[arg(long)]
        phase: Option<Phase>,
    },

    /// Show a workout with substitutions applied
    Preview { id: String },

    /// Start a workout
    Start {
        id: String,

        /// Play through instantly and complete (for testing)
        #[arg(long, conflicts_with = "auto_quit")]
        auto_complete: bool,

        /// Play the first exercise, then quit (for testing)
        #[arg(long, conflicts_with = "auto_complete")]
        auto_quit: bool,

        /// Record how the workout felt (tough, just_right, easy)
        #[arg(long)]
        feeling: Option<Feeling>,
    },

    /// Show the workout journal
    History {
        /// Export the journal to a CSV file
        #[arg(long)]
        export: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum CycleAction {
    /// Set the first day of your last period
    SetStart { date: NaiveDate },
}

#[derive(Clone, Copy, ValueEnum)]
enum Toggle {
    On,
    Off,
}

/// Everything a command needs: configuration, the ledger, and today's phase
struct App {
    config: Config,
    data_dir: PathBuf,
    ledger: LedgerHandle<JsonFileStore>,
    today: NaiveDate,
}

impl App {
    fn open(config: Config, data_dir: PathBuf, today: NaiveDate) -> Self {
        let store = JsonFileStore::new(data_dir.join("state.json"));
        let mut app = Self {
            config,
            data_dir,
            ledger: LedgerHandle::open(store),
            today,
        };
        app.observe_phase();
        app
    }

    fn journal_path(&self) -> PathBuf {
        self.data_dir.join("journal.jsonl")
    }

    fn calendar(&self) -> Option<CycleCalendar> {
        let anchor = self
            .ledger
            .ledger()
            .cycle_start_date()
            .or(self.config.cycle.start_date)?;
        CycleCalendar::new(anchor, self.config.cycle.length_days).ok()
    }

    fn current_phase(&self) -> Option<Phase> {
        self.calendar().map(|c| c.phase_on(self.today))
    }

    /// Feed today's phase to the ledger so a new cycle clears stale progress
    fn observe_phase(&mut self) {
        if let Some(phase) = self.current_phase() {
            if self.ledger.dispatch(LedgerTransition::ObservePhase(phase))
                == TransitionOutcome::RolledOver
            {
                println!("A new cycle has begun. Phase progress starts fresh.\n");
            }
        }
    }

    fn append_journal(&self, entry: &JournalEntry) {
        let mut journal = JsonlJournal::new(self.journal_path());
        if let Err(e) = journal.append(entry) {
            tracing::warn!("Failed to write journal entry: {}", e);
        }
    }
}

fn main() {
    bloom_core::logging::init();

    if let Err(e) = run(Cli::parse()) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;
    let data_dir = cli
        .data_dir
        .unwrap_or_else(|| config.data.data_dir.clone());
    let today = cli.today.unwrap_or_else(|| Local::now().date_naive());

    let catalog = get_default_catalog();
    let errors = catalog.validate();
    if !errors.is_empty() {
        eprintln!("Catalog validation errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        return Err(Error::CatalogValidation("Invalid catalog".into()));
    }

    let mut app = App::open(config, data_dir, today);

    match cli.command.unwrap_or(Commands::Status) {
        Commands::Status => cmd_status(&app),
        Commands::Onboard { cycle_start } => cmd_onboard(&mut app, cycle_start),
        Commands::Cycle {
            action: CycleAction::SetStart { date },
        } => cmd_set_cycle_start(&mut app, date),
        Commands::Modifier { name, state } => cmd_modifier(&mut app, name, state),
        Commands::List { phase } => cmd_list(&app, catalog, phase),
        Commands::Preview { id } => cmd_preview(&app, catalog, &id),
        Commands::Start {
            id,
            auto_complete,
            auto_quit,
            feeling,
        } => {
            let mode = if auto_complete {
                PlayMode::AutoComplete
            } else if auto_quit {
                PlayMode::AutoQuit
            } else {
                PlayMode::Interactive
            };
            cmd_start(&mut app, catalog, &id, mode, feeling)
        }
        Commands::History { export } => cmd_history(&app, export),
    }
}

fn cmd_status(app: &App) -> Result<()> {
    let ledger = app.ledger.ledger();

    if !ledger.has_onboarded() {
        println!("Welcome to Bloom! Run `bloom onboard` to get started.\n");
    }

    let stage = bloom_stage(ledger.total_xp());
    println!("Bloom: {} ({} XP)", stage.name, ledger.total_xp());
    match next_stage(ledger.total_xp()) {
        Some(next) => println!(
            "  {} XP to {}",
            next.min_xp - ledger.total_xp(),
            next.name
        ),
        None => println!("  Fully grown"),
    }

    match evolution_tier(ledger.evolution_count()) {
        Some(tier) => println!(
            "Evolutions: {} ({}: {})",
            ledger.evolution_count(),
            tier.name,
            tier.description
        ),
        None => println!("Evolutions: 0"),
    }

    let bonus = if ledger.streak_bonus_eligible(app.config.session.streak_bonus_threshold) {
        format!(" (+{}% streak bonus active)", app.config.session.streak_bonus_percent)
    } else {
        String::new()
    };
    println!("Streak: {}{}", ledger.streak(), bonus);

    if let Some(calendar) = app.calendar() {
        let day = calendar.cycle_day(app.today);
        println!(
            "Cycle day {}: {} phase ({} day(s) until the next phase)",
            day,
            calendar.phase_on(app.today),
            calendar.days_until_next_phase(app.today)
        );
    } else {
        println!("Cycle: not set (bloom cycle set-start YYYY-MM-DD)");
    }

    let flags = ledger.cycle_phase_flags();
    let marks: Vec<String> = flags
        .iter()
        .map(|(phase, done)| format!("{} {}", phase.as_str(), if *done { "[x]" } else { "[ ]" }))
        .collect();
    println!("Cycle progress: {}/4  {}", flags.count(), marks.join("  "));

    let completed = ledger.completed_by_phase();
    println!(
        "Workouts completed: {} ({})",
        ledger.completion_count(),
        completed
            .iter()
            .map(|(phase, n)| format!("{} {}", phase.as_str(), n))
            .collect::<Vec<_>>()
            .join(", ")
    );

    let modifiers = ledger.modifiers();
    println!(
        "Modifiers: low-impact {}, no-floor {}",
        on_off(modifiers.low_impact_only),
        on_off(modifiers.no_floor_work)
    );

    Ok(())
}

fn cmd_onboard(app: &mut App, cycle_start: Option<NaiveDate>) -> Result<()> {
    app.ledger.dispatch(LedgerTransition::SetOnboarded);
    if let Some(date) = cycle_start {
        app.ledger.dispatch(LedgerTransition::SetCycleStart(date));
        app.observe_phase();
    }

    println!("✓ You're all set. Your Bloom is a Seedling for now.");
    if let Some(phase) = app.current_phase() {
        println!("  Today is in your {} phase.", phase);
    }
    Ok(())
}

fn cmd_set_cycle_start(app: &mut App, date: NaiveDate) -> Result<()> {
    app.ledger.dispatch(LedgerTransition::SetCycleStart(date));
    app.observe_phase();

    if let Some(calendar) = app.calendar() {
        println!(
            "✓ Cycle start set to {}: day {}, {} phase",
            date,
            calendar.cycle_day(app.today),
            calendar.phase_on(app.today)
        );
    }
    Ok(())
}

fn cmd_modifier(app: &mut App, modifier: Modifier, state: Toggle) -> Result<()> {
    let value = matches!(state, Toggle::On);
    let outcome = app
        .ledger
        .dispatch(LedgerTransition::SetModifier { modifier, value });

    if outcome.changed() {
        println!("✓ {} {}", modifier, on_off(value));
    } else {
        println!("{} already {}", modifier, on_off(value));
    }
    Ok(())
}

fn cmd_list(app: &App, catalog: &Catalog, phase: Option<Phase>) -> Result<()> {
    let phases: Vec<Phase> = match phase.or_else(|| app.current_phase()) {
        Some(phase) => vec![phase],
        None => Phase::ALL.to_vec(),
    };
    let ledger = app.ledger.ledger();
    let modifiers = ledger.modifiers();

    for phase in phases {
        println!("{} phase", phase);
        for workout in catalog.workouts_for(phase) {
            let resolved = resolve_workout(workout, &modifiers, &catalog.substitutions);
            let done = if ledger.completed_ids().contains(&workout.id) {
                " ✓"
            } else {
                ""
            };
            println!(
                "  {:<4} {:<22} {:>7}  {}  {} XP{}",
                workout.id,
                workout.title,
                format_duration(resolved.total_seconds()),
                difficulty(workout.difficulty),
                workout.xp,
                done
            );
            if let Some(req) = &workout.unlock {
                if !ledger.is_unlocked(workout) {
                    let have = ledger.completed_by_phase()[req.phase];
                    println!(
                        "       locked: complete {} more {} workout(s)",
                        req.workouts_needed.saturating_sub(have),
                        req.phase.as_str()
                    );
                }
            }
        }
        println!();
    }
    Ok(())
}

fn cmd_preview(app: &App, catalog: &Catalog, id: &str) -> Result<()> {
    let workout = catalog
        .workout(id)
        .ok_or_else(|| Error::UnknownWorkout(id.to_string()))?;
    let resolved = resolve_workout(workout, &app.ledger.ledger().modifiers(), &catalog.substitutions);

    println!("{}: {}", workout.title, workout.subtitle);
    println!(
        "{} phase, {}, {}, {} XP",
        workout.phase,
        format_duration(resolved.total_seconds()),
        difficulty(workout.difficulty),
        workout.xp
    );
    if let Some(note) = &workout.warmup_note {
        println!("Warmup: {}", note);
    }
    println!();

    for (i, step) in resolved.exercises.iter().enumerate() {
        println!(
            "  {:>2}. {:<28} {:>3}s  {}",
            i + 1,
            step.exercise.name,
            step.exercise.duration_seconds,
            step.exercise.muscle_group
        );
        if let Some(original) = &step.replaces {
            println!("      Replacing: {}", original);
        }
    }

    print_conflicts(&resolved);
    Ok(())
}

fn print_conflicts(resolved: &ResolvedWorkout) {
    let conflicts: Vec<_> = resolved.conflicts().collect();
    if conflicts.is_empty() {
        return;
    }
    println!();
    println!("⚠ No substitute available for:");
    for step in conflicts {
        let reasons: Vec<&str> = step
            .conflicts
            .iter()
            .map(|c| match c {
                Conflict::HighImpact => "high impact",
                Conflict::FloorRequired => "needs floor space",
            })
            .collect();
        println!("  - {} ({})", step.exercise.name, reasons.join(", "));
    }
}

enum PlayMode {
    Interactive,
    AutoComplete,
    AutoQuit,
}

fn cmd_start(
    app: &mut App,
    catalog: &Catalog,
    id: &str,
    mode: PlayMode,
    feeling: Option<Feeling>,
) -> Result<()> {
    let workout = catalog
        .workout(id)
        .ok_or_else(|| Error::UnknownWorkout(id.to_string()))?;

    let ledger = app.ledger.ledger();
    if !ledger.is_unlocked(workout) {
        return Err(Error::Other(format!(
            "{} is locked. Complete more {} workouts to unlock it.",
            workout.title,
            workout.unlock.as_ref().map_or("", |r| r.phase.as_str())
        )));
    }

    let session_config = &app.config.session;
    let eligible = ledger.streak_bonus_eligible(session_config.streak_bonus_threshold);
    let mut plan = SessionPlan::for_workout(
        workout,
        workout.phase,
        &ledger.modifiers(),
        &catalog.substitutions,
        eligible,
    );
    plan.extend_seconds = session_config.extend_seconds;
    plan.streak_bonus_percent = session_config.streak_bonus_percent;

    println!("{}: {}", workout.title, workout.subtitle);
    if let Some(note) = &workout.warmup_note {
        println!("Warmup: {}", note);
    }
    print_conflicts(&ResolvedWorkout {
        exercises: plan.exercises.clone(),
    });

    let xp_before = ledger.total_xp();
    let mut console = None;
    let end_state = match mode {
        PlayMode::AutoComplete => play_through(plan, false)?,
        PlayMode::AutoQuit => play_through(plan, true)?,
        PlayMode::Interactive => {
            let console = console.insert(live::Console::new());
            console.run_session(plan, app.config.session.tick_interval())?
        }
    };

    match app.ledger.record_session_end(&end_state) {
        Some(TransitionOutcome::Completed(report)) => {
            let outcome = match &end_state {
                SessionState::Completed(outcome) => outcome,
                _ => return Ok(()),
            };
            app.append_journal(&JournalEntry::completed(outcome, report.just_evolved));
            print_completion(outcome, &report, xp_before);

            let feeling = feeling.or_else(|| console.as_mut().and_then(|c| c.prompt_feeling()));
            if let Some(feeling) = feeling {
                app.append_journal(&JournalEntry::reflected(&outcome.workout_id, outcome.phase, feeling));
                println!("{}", feeling.response(outcome.phase));
            }
        }
        Some(_) => println!("Workout quit. Progress from this session was not saved."),
        None => {
            if end_state == SessionState::Empty {
                println!("This workout has no exercises.");
            }
        }
    }
    Ok(())
}

/// Drive a session to its end without a timer
fn play_through(plan: SessionPlan, quit_after_first: bool) -> Result<SessionState> {
    let mut session = Session::new();
    session.apply(Command::Start(plan))?;

    while *session.state() == SessionState::Running {
        if quit_after_first && session.index() > 0 {
            session.apply(Command::Quit)?;
            break;
        }
        session.tick_current()?;
    }
    Ok(session.state().clone())
}

fn print_completion(outcome: &SessionOutcome, report: &CompletionReport, xp_before: u32) {
    println!();
    println!("✓ Workout complete! +{} XP", outcome.base_xp);
    if outcome.bonus_xp > 0 {
        println!("  +{} streak bonus", outcome.bonus_xp);
    }
    println!("  Total: {} XP", report.new_total_xp);

    let before = bloom_stage(xp_before);
    let after = bloom_stage(report.new_total_xp);
    if before != after {
        println!("  Your Bloom grew into {}!", after.name);
    }

    if report.just_evolved {
        println!("✨ Your Bloom evolved! All four phases completed this cycle.");
        if let Some(tier) = evolution_tier(report.new_evolution_count) {
            println!("  {}: {}", tier.name, tier.description);
        }
    }
}

fn cmd_history(app: &App, export: Option<PathBuf>) -> Result<()> {
    let entries = journal::read_entries(&app.journal_path())?;

    if let Some(path) = export {
        let count = journal::export_csv(&entries, &path)?;
        println!("✓ Exported {} entries to {}", count, path.display());
        return Ok(());
    }

    if entries.is_empty() {
        println!("No workouts recorded yet.");
        return Ok(());
    }

    for entry in &entries {
        let when = entry.at().with_timezone(&Local).format("%Y-%m-%d %H:%M");
        match entry {
            JournalEntry::Completed {
                workout_id,
                phase,
                base_xp,
                bonus_xp,
                evolved,
                ..
            } => println!(
                "{}  completed {:<4} {:<10} +{} XP{}{}",
                when,
                workout_id,
                phase.as_str(),
                base_xp,
                if *bonus_xp > 0 {
                    format!(" (+{} bonus)", bonus_xp)
                } else {
                    String::new()
                },
                if *evolved { "  evolved" } else { "" }
            ),
            JournalEntry::Reflected {
                workout_id,
                feeling,
                ..
            } => println!("{}  felt      {:<4} {}", when, workout_id, feeling.label()),
        }
    }
    Ok(())
}

fn on_off(value: bool) -> &'static str {
    if value {
        "on"
    } else {
        "off"
    }
}

fn difficulty(level: u8) -> String {
    let level = usize::from(level.min(5));
    format!("{}{}", "●".repeat(level), "○".repeat(5 - level))
}
