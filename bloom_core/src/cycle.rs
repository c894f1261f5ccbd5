//! Cycle phase from a calendar anchor date.
//!
//! Day 1 is the anchor (first day of the last period). Days 1-5 are
//! menstrual, 6-13 follicular, 14-16 ovulatory, and the rest of the cycle
//! luteal. The cycle length only moves the wrap point back to day 1.

use crate::{Error, Phase, Result};
use chrono::NaiveDate;

/// Default cycle length in days
pub const DEFAULT_CYCLE_LENGTH: u32 = 28;

/// Phase for a 1-based day of the cycle
pub fn phase_for_day(day: u32) -> Phase {
    match day {
        0..=5 => Phase::Menstrual,
        6..=13 => Phase::Follicular,
        14..=16 => Phase::Ovulatory,
        _ => Phase::Luteal,
    }
}

/// Whether moving from `previous` to `current` wraps into a new cycle
pub fn is_rollover(previous: Phase, current: Phase) -> bool {
    current.ordinal() < previous.ordinal()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CycleCalendar {
    start: NaiveDate,
    length_days: u32,
}

impl CycleCalendar {
    pub fn new(start: NaiveDate, length_days: u32) -> Result<Self> {
        if length_days == 0 {
            return Err(Error::Config("cycle length must be at least 1 day".into()));
        }
        Ok(Self { start, length_days })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// 1-based day of the cycle on `date`
    ///
    /// An anchor in the future counts as day 1.
    pub fn cycle_day(&self, date: NaiveDate) -> u32 {
        let elapsed = (date - self.start).num_days();
        if elapsed < 0 {
            return 1;
        }
        (elapsed as u64 % u64::from(self.length_days)) as u32 + 1
    }

    pub fn phase_on(&self, date: NaiveDate) -> Phase {
        phase_for_day(self.cycle_day(date))
    }

    /// Days from `date` until the phase changes, or until the cycle restarts
    pub fn days_until_next_phase(&self, date: NaiveDate) -> u32 {
        let day = self.cycle_day(date);
        let phase = phase_for_day(day);
        (day + 1..=self.length_days)
            .find(|d| phase_for_day(*d) != phase)
            .map(|d| d - day)
            .unwrap_or(self.length_days - day + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn calendar() -> CycleCalendar {
        CycleCalendar::new(date(2024, 1, 1), DEFAULT_CYCLE_LENGTH).unwrap()
    }

    #[test]
    fn test_phase_boundaries() {
        assert_eq!(phase_for_day(1), Phase::Menstrual);
        assert_eq!(phase_for_day(5), Phase::Menstrual);
        assert_eq!(phase_for_day(6), Phase::Follicular);
        assert_eq!(phase_for_day(13), Phase::Follicular);
        assert_eq!(phase_for_day(14), Phase::Ovulatory);
        assert_eq!(phase_for_day(16), Phase::Ovulatory);
        assert_eq!(phase_for_day(17), Phase::Luteal);
        assert_eq!(phase_for_day(28), Phase::Luteal);
    }

    #[test]
    fn test_cycle_day_wraps() {
        let cal = calendar();
        assert_eq!(cal.cycle_day(date(2024, 1, 1)), 1);
        assert_eq!(cal.cycle_day(date(2024, 1, 28)), 28);
        assert_eq!(cal.cycle_day(date(2024, 1, 29)), 1);
        assert_eq!(cal.phase_on(date(2024, 1, 20)), Phase::Luteal);
        assert_eq!(cal.phase_on(date(2024, 2, 2)), Phase::Menstrual);
    }

    #[test]
    fn test_future_anchor_is_day_one() {
        let cal = calendar();
        assert_eq!(cal.cycle_day(date(2023, 12, 25)), 1);
        assert_eq!(cal.phase_on(date(2023, 12, 25)), Phase::Menstrual);
    }

    #[test]
    fn test_custom_length_moves_wrap_point() {
        let cal = CycleCalendar::new(date(2024, 1, 1), 32).unwrap();
        assert_eq!(cal.cycle_day(date(2024, 2, 1)), 32);
        assert_eq!(cal.phase_on(date(2024, 2, 1)), Phase::Luteal);
        assert_eq!(cal.cycle_day(date(2024, 2, 2)), 1);
    }

    #[test]
    fn test_zero_length_rejected() {
        assert!(CycleCalendar::new(date(2024, 1, 1), 0).is_err());
    }

    #[test]
    fn test_days_until_next_phase() {
        let cal = calendar();
        assert_eq!(cal.days_until_next_phase(date(2024, 1, 1)), 5);
        assert_eq!(cal.days_until_next_phase(date(2024, 1, 16)), 1);
        assert_eq!(cal.days_until_next_phase(date(2024, 1, 28)), 1);
    }

    #[test]
    fn test_rollover_detection() {
        assert!(is_rollover(Phase::Luteal, Phase::Menstrual));
        assert!(is_rollover(Phase::Ovulatory, Phase::Follicular));
        assert!(!is_rollover(Phase::Menstrual, Phase::Follicular));
        assert!(!is_rollover(Phase::Luteal, Phase::Luteal));
    }
}
