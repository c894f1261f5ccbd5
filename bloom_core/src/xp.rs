//! Deterministic XP distribution and streak bonus.
//!
//! A workout's XP pool is split across its non-rest exercises so that the
//! awards always sum to the pool exactly: every scoring exercise gets
//! `floor(total / n)`, and the first `total % n` of them get one more.

use crate::ExerciseKind;

/// Split `total_xp` into `count` awards in sequence order
///
/// Returns an empty Vec when `count` is zero.
pub fn split(total_xp: u32, count: usize) -> Vec<u32> {
    if count == 0 {
        return Vec::new();
    }
    let n = count as u32;
    let base = total_xp / n;
    let remainder = (total_xp % n) as usize;

    (0..count)
        .map(|i| if i < remainder { base + 1 } else { base })
        .collect()
}

/// Per-exercise XP awards aligned with the exercise list
///
/// Rest steps receive 0 and do not count toward the split. A workout made
/// only of rest awards nothing.
pub fn allocate<I>(total_xp: u32, kinds: I) -> Vec<u32>
where
    I: IntoIterator<Item = ExerciseKind>,
{
    let kinds: Vec<ExerciseKind> = kinds.into_iter().collect();
    let scoring = kinds.iter().filter(|k| **k != ExerciseKind::Rest).count();
    let mut awards = split(total_xp, scoring).into_iter();

    kinds
        .iter()
        .map(|k| match k {
            ExerciseKind::Rest => 0,
            _ => awards.next().unwrap_or(0),
        })
        .collect()
}

/// Bonus for a session earned while on a streak
///
/// `percent` of the earned XP, rounded half-up. Zero when not eligible.
pub fn streak_bonus(earned_xp: u32, eligible: bool, percent: u32) -> u32 {
    if !eligible {
        return 0;
    }
    let scaled = u64::from(earned_xp) * u64::from(percent);
    ((scaled + 50) / 100) as u32
}
