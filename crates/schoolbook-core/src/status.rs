//! # Attendance Status
//!
//! The four statuses a cell can hold, plus the toggle cycle used by a plain
//! cell click.

use crate::CoreError;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Attendance status for one student on one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
    Excused,
}

impl AttendanceStatus {
    /// All statuses in menu order.
    pub const ALL: [AttendanceStatus; 4] = [
        AttendanceStatus::Present,
        AttendanceStatus::Absent,
        AttendanceStatus::Late,
        AttendanceStatus::Excused,
    ];

    /// Wire and display label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            AttendanceStatus::Present => "Present",
            AttendanceStatus::Absent => "Absent",
            AttendanceStatus::Late => "Late",
            AttendanceStatus::Excused => "Excused",
        }
    }

    /// One-character grid symbol.
    #[must_use]
    pub fn symbol(self) -> char {
        match self {
            AttendanceStatus::Present => '✓',
            AttendanceStatus::Absent => 'A',
            AttendanceStatus::Late => 'L',
            AttendanceStatus::Excused => 'E',
        }
    }

    /// Status a plain cell click moves to.
    ///
    /// `None` means the pending edit is dropped. Only an `Absent` cell
    /// clears; every other status (and an empty cell) goes to `Present`
    /// first, then `Absent`.
    #[must_use]
    pub fn toggled(current: Option<AttendanceStatus>) -> Option<AttendanceStatus> {
        match current {
            Some(AttendanceStatus::Present) => Some(AttendanceStatus::Absent),
            Some(AttendanceStatus::Absent) => None,
            _ => Some(AttendanceStatus::Present),
        }
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for AttendanceStatus {
    type Err = CoreError;

    /// Parses by first letter, ignoring case, so `"present"`, `"P"` and
    /// `"Present"` are all accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().chars().next().map(|c| c.to_ascii_uppercase()) {
            Some('P') => Ok(AttendanceStatus::Present),
            Some('A') => Ok(AttendanceStatus::Absent),
            Some('L') => Ok(AttendanceStatus::Late),
            Some('E') => Ok(AttendanceStatus::Excused),
            _ => Err(CoreError::InvalidStatus(s.to_string())),
        }
    }
}

impl<'de> Deserialize<'de> for AttendanceStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
