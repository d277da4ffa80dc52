//! # Summaries
//!
//! Counts shown beside the grid. Integer arithmetic only.

use crate::grid::{DailyRecord, GridStudent};
use crate::status::AttendanceStatus;
use chrono::NaiveDate;

/// Tally of effective statuses over a set of cells.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WeekSummary {
    pub present: usize,
    pub absent: usize,
    pub late: usize,
    pub excused: usize,
    /// Every cell counted, including empty ones.
    pub total_cells: usize,
}

impl WeekSummary {
    /// Count a sequence of cells.
    pub fn tally(cells: impl IntoIterator<Item = Option<AttendanceStatus>>) -> Self {
        let mut summary = Self::default();
        for cell in cells {
            summary.total_cells += 1;
            match cell {
                Some(AttendanceStatus::Present) => summary.present += 1,
                Some(AttendanceStatus::Absent) => summary.absent += 1,
                Some(AttendanceStatus::Late) => summary.late += 1,
                Some(AttendanceStatus::Excused) => summary.excused += 1,
                None => {}
            }
        }
        summary
    }

    /// Cells with no status at all.
    #[must_use]
    pub fn empty(&self) -> usize {
        self.total_cells
            .saturating_sub(self.present + self.absent + self.late + self.excused)
    }

    /// Present cells as a percentage of all cells, rounded half up.
    #[must_use]
    pub fn present_percent(&self) -> u8 {
        if self.total_cells == 0 {
            return 0;
        }
        let scaled = self
            .present
            .saturating_mul(100)
            .saturating_add(self.total_cells / 2);
        (scaled / self.total_cells).min(100) as u8
    }
}

/// Colour band for a backend attendance rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateBand {
    /// 90 and above.
    Good,
    /// 75 to 89.
    Warning,
    /// Below 75, or unreadable.
    Poor,
}

impl RateBand {
    /// Band for a rate string such as `"92%"` or `"80.5"`.
    ///
    /// Only the leading integer is read.
    #[must_use]
    pub fn from_rate(rate: &str) -> Self {
        let digits: String = rate
            .trim()
            .chars()
            .take_while(|c| c.is_ascii_digit())
            .collect();
        match digits.parse::<u32>() {
            Ok(v) if v >= 90 => RateBand::Good,
            Ok(v) if v >= 75 => RateBand::Warning,
            _ => RateBand::Poor,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            RateBand::Good => "good",
            RateBand::Warning => "warning",
            RateBand::Poor => "poor",
        }
    }
}

/// The recorded entries behind one cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayDetail<'a> {
    pub student: &'a GridStudent,
    pub date: NaiveDate,
    pub records: &'a [DailyRecord],
}

impl<'a> DayDetail<'a> {
    pub fn new(student: &'a GridStudent, date: NaiveDate) -> Self {
        Self {
            student,
            date,
            records: student.records(date),
        }
    }

    /// More than one subject was recorded that day.
    #[must_use]
    pub fn has_multiple_subjects(&self) -> bool {
        self.records.len() > 1
    }

    /// Subjects the student missed that day.
    #[must_use]
    pub fn absent_subject_count(&self) -> usize {
        self.records
            .iter()
            .filter(|r| r.status == AttendanceStatus::Absent)
            .count()
    }
}
