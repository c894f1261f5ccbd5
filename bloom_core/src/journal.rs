//! Workout journal: an append-only JSONL log of completions and reflections.
//!
//! Entries are appended under an exclusive file lock. Reading skips lines
//! that fail to parse so one bad line never hides the rest of the history.
//! The journal can be exported to CSV.

use crate::session::SessionOutcome;
use crate::{Error, Phase, Result};
use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use uuid::Uuid;

/// How a workout felt
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Feeling {
    Tough,
    JustRight,
    Easy,
}

impl Feeling {
    pub const ALL: [Feeling; 3] = [Feeling::Tough, Feeling::JustRight, Feeling::Easy];

    pub fn as_str(self) -> &'static str {
        match self {
            Feeling::Tough => "tough",
            Feeling::JustRight => "just_right",
            Feeling::Easy => "easy",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Feeling::Tough => "Tough",
            Feeling::JustRight => "Just right",
            Feeling::Easy => "Easy",
        }
    }

    /// Encouragement shown after the reflection is recorded
    pub fn response(self, phase: Phase) -> &'static str {
        match (self, phase) {
            (Feeling::Tough, Phase::Menstrual) => {
                "Listening to your body is strength. You still showed up."
            }
            (Feeling::Tough, Phase::Follicular) => {
                "Building takes effort. It gets easier from here."
            }
            (Feeling::Tough, Phase::Ovulatory) => {
                "Even at peak, some days are harder. That's real."
            }
            (Feeling::Tough, Phase::Luteal) => {
                "Progesterone makes everything heavier. You did it anyway."
            }
            (Feeling::JustRight, Phase::Menstrual) => {
                "Your body and the workout were in sync today."
            }
            (Feeling::JustRight, Phase::Follicular) => {
                "Right in the sweet spot. Your Bloom noticed."
            }
            (Feeling::JustRight, Phase::Ovulatory) => {
                "Peak energy, matched effort. That's the design."
            }
            (Feeling::JustRight, Phase::Luteal) => {
                "Steady and consistent. Exactly what this phase needs."
            }
            (Feeling::Easy, Phase::Menstrual) => {
                "Good sign. Try the next workout up when you're ready."
            }
            (Feeling::Easy, Phase::Follicular) => {
                "Your strength is building. Challenge yourself next time."
            }
            (Feeling::Easy, Phase::Ovulatory) => "You're stronger than this workout. Level up.",
            (Feeling::Easy, Phase::Luteal) => "Feeling strong in luteal phase is a great sign.",
        }
    }
}

impl fmt::Display for Feeling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Feeling {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "tough" | "hard" => Ok(Feeling::Tough),
            "just_right" | "right" | "ok" => Ok(Feeling::JustRight),
            "easy" => Ok(Feeling::Easy),
            other => Err(Error::Other(format!("Unknown feeling: {}", other))),
        }
    }
}

/// One line of the journal
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum JournalEntry {
    Completed {
        id: Uuid,
        at: DateTime<Utc>,
        workout_id: String,
        phase: Phase,
        base_xp: u32,
        bonus_xp: u32,
        evolved: bool,
    },
    Reflected {
        id: Uuid,
        at: DateTime<Utc>,
        workout_id: String,
        phase: Phase,
        feeling: Feeling,
    },
}

impl JournalEntry {
    pub fn completed(outcome: &SessionOutcome, evolved: bool) -> Self {
        JournalEntry::Completed {
            id: Uuid::new_v4(),
            at: Utc::now(),
            workout_id: outcome.workout_id.clone(),
            phase: outcome.phase,
            base_xp: outcome.base_xp,
            bonus_xp: outcome.bonus_xp,
            evolved,
        }
    }

    pub fn reflected(workout_id: &str, phase: Phase, feeling: Feeling) -> Self {
        JournalEntry::Reflected {
            id: Uuid::new_v4(),
            at: Utc::now(),
            workout_id: workout_id.to_string(),
            phase,
            feeling,
        }
    }

    pub fn id(&self) -> Uuid {
        match self {
            JournalEntry::Completed { id, .. } | JournalEntry::Reflected { id, .. } => *id,
        }
    }

    pub fn at(&self) -> DateTime<Utc> {
        match self {
            JournalEntry::Completed { at, .. } | JournalEntry::Reflected { at, .. } => *at,
        }
    }

    pub fn workout_id(&self) -> &str {
        match self {
            JournalEntry::Completed { workout_id, .. }
            | JournalEntry::Reflected { workout_id, .. } => workout_id,
        }
    }

    pub fn phase(&self) -> Phase {
        match self {
            JournalEntry::Completed { phase, .. } | JournalEntry::Reflected { phase, .. } => *phase,
        }
    }
}

/// Journal sink trait for recording entries
pub trait JournalSink {
    fn append(&mut self, entry: &JournalEntry) -> Result<()>;
}

/// JSONL journal with file locking
pub struct JsonlJournal {
    path: PathBuf,
}

impl JsonlJournal {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn ensure_parent_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

impl JournalSink for JsonlJournal {
    fn append(&mut self, entry: &JournalEntry) -> Result<()> {
        self.ensure_parent_dir()?;

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        file.lock_exclusive()?;

        let mut writer = std::io::BufWriter::new(&file);
        let line = serde_json::to_string(entry)?;
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        drop(writer);

        file.unlock()?;

        tracing::debug!("Appended journal entry {}", entry.id());
        Ok(())
    }
}

/// Read every entry from a journal file, oldest first
pub fn read_entries(path: &Path) -> Result<Vec<JournalEntry>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = File::open(path)?;
    file.lock_shared()?;

    let reader = BufReader::new(&file);
    let mut entries = Vec::new();

    for (line_num, line_result) in reader.lines().enumerate() {
        let line = match line_result {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!("Failed to read journal line {}: {}", line_num + 1, e);
                continue;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<JournalEntry>(&line) {
            Ok(entry) => entries.push(entry),
            Err(e) => {
                tracing::warn!("Failed to parse journal entry at line {}: {}", line_num + 1, e);
            }
        }
    }

    file.unlock()?;
    tracing::debug!("Read {} journal entries", entries.len());
    Ok(entries)
}

/// A row in the CSV export
#[derive(Debug, Serialize)]
struct CsvRow {
    kind: &'static str,
    id: String,
    at: String,
    workout_id: String,
    phase: &'static str,
    base_xp: Option<u32>,
    bonus_xp: Option<u32>,
    evolved: Option<bool>,
    feeling: Option<&'static str>,
}

impl From<&JournalEntry> for CsvRow {
    fn from(entry: &JournalEntry) -> Self {
        let mut row = CsvRow {
            kind: "",
            id: entry.id().to_string(),
            at: entry.at().to_rfc3339(),
            workout_id: entry.workout_id().to_string(),
            phase: entry.phase().as_str(),
            base_xp: None,
            bonus_xp: None,
            evolved: None,
            feeling: None,
        };
        match entry {
            JournalEntry::Completed {
                base_xp,
                bonus_xp,
                evolved,
                ..
            } => {
                row.kind = "completed";
                row.base_xp = Some(*base_xp);
                row.bonus_xp = Some(*bonus_xp);
                row.evolved = Some(*evolved);
            }
            JournalEntry::Reflected { feeling, .. } => {
                row.kind = "reflected";
                row.feeling = Some(feeling.as_str());
            }
        }
        row
    }
}

/// Write entries to a CSV file, replacing it
///
/// Returns the number of rows written.
pub fn export_csv(entries: &[JournalEntry], csv_path: &Path) -> Result<usize> {
    if let Some(parent) = csv_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let file = File::create(csv_path)?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(true)
        .from_writer(file);

    for entry in entries {
        writer.serialize(CsvRow::from(entry))?;
    }

    writer.flush()?;
    let file = writer
        .into_inner()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
    file.sync_all()?;

    tracing::info!("Exported {} journal entries to {:?}", entries.len(), csv_path);
    Ok(entries.len())
}
