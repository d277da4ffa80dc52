//! # Week Navigation
//!
//! A week runs Sunday through Saturday. Navigation moves whole weeks.

use chrono::{Datelike, Days, NaiveDate};
use std::fmt;

/// Number of days shown in the grid.
pub const DAYS_PER_WEEK: u64 = 7;

/// Sunday-to-Saturday date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Week {
    start: NaiveDate,
}

impl Week {
    /// The week containing `today`.
    #[must_use]
    pub fn current(today: NaiveDate) -> Self {
        Self::containing(today)
    }

    /// The week containing `date`.
    #[must_use]
    pub fn containing(date: NaiveDate) -> Self {
        let offset = u64::from(date.weekday().num_days_from_sunday());
        Self {
            start: date.checked_sub_days(Days::new(offset)).unwrap_or(date),
        }
    }

    /// Sunday.
    #[must_use]
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Saturday.
    #[must_use]
    pub fn end(&self) -> NaiveDate {
        self.start
            .checked_add_days(Days::new(DAYS_PER_WEEK - 1))
            .unwrap_or(self.start)
    }

    #[must_use]
    pub fn previous(&self) -> Self {
        Self {
            start: self
                .start
                .checked_sub_days(Days::new(DAYS_PER_WEEK))
                .unwrap_or(self.start),
        }
    }

    #[must_use]
    pub fn next(&self) -> Self {
        Self {
            start: self
                .start
                .checked_add_days(Days::new(DAYS_PER_WEEK))
                .unwrap_or(self.start),
        }
    }

    /// The seven dates in order.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.start.iter_days().take(DAYS_PER_WEEK as usize)
    }

    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end()
    }
}

impl fmt::Display for Week {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} .. {}",
            self.start.format("%Y-%m-%d"),
            self.end().format("%Y-%m-%d")
        )
    }
}

#[must_use]
pub fn is_today(date: NaiveDate, today: NaiveDate) -> bool {
    date == today
}

#[must_use]
pub fn is_past(date: NaiveDate, today: NaiveDate) -> bool {
    date < today
}

/// Short weekday name for a column header.
#[must_use]
pub fn day_label(date: NaiveDate) -> String {
    format!("{} {}", date.format("%a"), date.day())
}
