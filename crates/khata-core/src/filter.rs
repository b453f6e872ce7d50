//! Date-range filtering over loaded entries
//!
//! Filtering never touches a store: a `LedgerView` keeps the entries it was
//! loaded with and recomputes its summary through `aggregate::summarize`.

use chrono::{Datelike, NaiveDate};
use khata_config::TimeRange;
use serde::{Deserialize, Serialize};

use crate::aggregate::summarize;
use crate::models::{ExpenseEntry, Summary};

/// Inclusive date bounds; a missing bound is unbounded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    /// Range matching every date
    pub fn all() -> Self {
        Self::default()
    }

    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    /// Range for a preset, relative to `today`
    pub fn for_preset(range: TimeRange, today: NaiveDate) -> Self {
        match range {
            TimeRange::Month => {
                let start = first_of_month(today.year(), today.month());
                Self::new(start, start.and_then(|s| last_day(s, 1)))
            }
            TimeRange::Quarter => {
                let start = first_of_month(today.year(), (today.month0() / 3) * 3 + 1);
                Self::new(start, start.and_then(|s| last_day(s, 3)))
            }
            TimeRange::Year => Self::new(
                NaiveDate::from_ymd_opt(today.year(), 1, 1),
                NaiveDate::from_ymd_opt(today.year(), 12, 31),
            ),
            TimeRange::All => Self::all(),
        }
    }

    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    /// Check if a date is within the range
    pub fn contains(&self, date: &NaiveDate) -> bool {
        match (self.start, self.end) {
            (None, None) => true,
            (Some(s), None) => *date >= s,
            (None, Some(e)) => *date <= e,
            (Some(s), Some(e)) => *date >= s && *date <= e,
        }
    }

    /// Entries dated inside the range, in their original order
    pub fn apply(&self, entries: &[ExpenseEntry]) -> Vec<ExpenseEntry> {
        entries
            .iter()
            .filter(|e| self.contains(&e.date))
            .cloned()
            .collect()
    }

    /// Human-readable description of the range
    pub fn description(&self) -> String {
        match (self.start, self.end) {
            (None, None) => "All Time".to_string(),
            (Some(s), None) => format!("From {}", s),
            (None, Some(e)) => format!("Until {}", e),
            (Some(s), Some(e)) => format!("{} to {}", s, e),
        }
    }
}

fn first_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)
}

/// Last day of the span of `months` months starting at `start`
fn last_day(start: NaiveDate, months: u32) -> Option<NaiveDate> {
    start
        .checked_add_months(chrono::Months::new(months))
        .and_then(|d| d.pred_opt())
}

/// Loaded entries with an adjustable date filter and its summary
#[derive(Debug, Clone)]
pub struct LedgerView {
    entries: Vec<ExpenseEntry>,
    range: DateRange,
    filtered: Vec<ExpenseEntry>,
    summary: Summary,
}

impl LedgerView {
    /// Wrap loaded entries with no filter applied
    pub fn new(entries: Vec<ExpenseEntry>) -> Self {
        let summary = summarize(&entries);
        Self {
            filtered: entries.clone(),
            entries,
            range: DateRange::all(),
            summary,
        }
    }

    /// Narrow to `range` and recompute the summary
    pub fn set_range(&mut self, range: DateRange) {
        self.range = range;
        self.filtered = range.apply(&self.entries);
        self.summary = summarize(&self.filtered);
    }

    /// Drop the filter, restoring the unfiltered entries and summary
    pub fn clear(&mut self) {
        self.set_range(DateRange::all());
    }

    pub fn range(&self) -> DateRange {
        self.range
    }

    /// Every loaded entry regardless of filter
    pub fn all_entries(&self) -> &[ExpenseEntry] {
        &self.entries
    }

    /// Entries passing the current filter
    pub fn entries(&self) -> &[ExpenseEntry] {
        &self.filtered
    }

    pub fn summary(&self) -> Summary {
        self.summary
    }
}
