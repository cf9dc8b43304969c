//! Time-interval rules shared by the schedule checks.
//!
//! Every interval is closed-open, `[start, end)`: a block ending at 11:00 and
//! another starting at 11:00 do not overlap.

use crate::models::{TimeOfDay, TimetableBlock};

/// Longest span a professor may teach without a real break.
pub const MAX_CONSECUTIVE_SECS: i64 = 6 * 3600;

/// Gaps up to this length do not end a teaching run.
pub const BREAK_THRESHOLD_SECS: i64 = 30 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    pub start: TimeOfDay,
    pub end: TimeOfDay,
}

impl Interval {
    pub fn new(start: TimeOfDay, end: TimeOfDay) -> Self {
        Self { start, end }
    }

    pub fn duration_secs(&self) -> i64 {
        self.start.seconds_until(self.end)
    }
}

impl From<&TimetableBlock> for Interval {
    fn from(block: &TimetableBlock) -> Self {
        Self::new(block.start_time, block.end_time)
    }
}

pub fn intervals_overlap(a: Interval, b: Interval) -> bool {
    a.start < b.end && b.start < a.end
}

/// A protected meal window no single block may fully cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MealPeriod {
    pub name: &'static str,
    start_secs: u32,
    end_secs: u32,
}

impl MealPeriod {
    const fn at(name: &'static str, start_hour: u32, end_hour: u32) -> Self {
        Self {
            name,
            start_secs: start_hour * 3600,
            end_secs: end_hour * 3600,
        }
    }

    pub fn start_hour(&self) -> u32 {
        self.start_secs / 3600
    }

    pub fn end_hour(&self) -> u32 {
        self.end_secs / 3600
    }

    pub fn is_covered_by(&self, interval: Interval) -> bool {
        interval.start.seconds_from_midnight() <= self.start_secs
            && interval.end.seconds_from_midnight() >= self.end_secs
    }
}

pub const LUNCH: MealPeriod = MealPeriod::at("lunch", 13, 14);
pub const DINNER: MealPeriod = MealPeriod::at("dinner", 20, 21);
pub const MEAL_PERIODS: [MealPeriod; 2] = [LUNCH, DINNER];

/// Sorts `intervals` by start and merges them into runs, where an interval
/// joins the current run when it starts no more than `gap_secs` after the
/// run's end. Returns the first run whose length exceeds `limit_secs`, as it
/// stood at the moment it crossed the limit.
pub fn first_run_exceeding(
    mut intervals: Vec<Interval>,
    gap_secs: i64,
    limit_secs: i64,
) -> Option<Interval> {
    intervals.sort_by_key(|i| (i.start, i.end));

    let mut run: Option<Interval> = None;
    for next in intervals {
        let current = match run {
            Some(mut r) if r.end.seconds_until(next.start) <= gap_secs => {
                // Overlapping or out-of-order durations never shrink the run.
                r.end = r.end.max(next.end);
                r
            }
            _ => next,
        };

        if current.duration_secs() > limit_secs {
            return Some(current);
        }
        run = Some(current);
    }
    None
}
