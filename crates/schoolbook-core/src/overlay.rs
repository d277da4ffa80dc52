//! # Staging Overlay
//!
//! Attendance edits made on the client and not yet written to the server.
//!
//! The overlay is keyed by (student, date): staging the same cell again
//! overwrites the earlier edit. A pending edit always wins over the
//! server's record when the grid is displayed. Submitting or discarding
//! empties the overlay as a whole; there is no per-entry rollback.

use crate::status::AttendanceStatus;
use crate::StudentId;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::fmt;

/// Overlay key: one grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellKey {
    pub student: StudentId,
    pub date: NaiveDate,
}

impl CellKey {
    pub fn new(student: StudentId, date: NaiveDate) -> Self {
        Self { student, date }
    }
}

impl fmt::Display for CellKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.student, self.date.format("%Y-%m-%d"))
    }
}

/// A staged edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingUpdate {
    pub student: StudentId,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
}

impl PendingUpdate {
    pub fn key(&self) -> CellKey {
        CellKey::new(self.student, self.date)
    }
}

/// The set of unsaved edits.
#[derive(Debug, Clone, Default)]
pub struct StagingOverlay {
    entries: BTreeMap<CellKey, PendingUpdate>,
    unsaved: bool,
}

impl StagingOverlay {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the edit for (student, date).
    ///
    /// Returns the status that was pending before, if any.
    pub fn stage(
        &mut self,
        student: StudentId,
        date: NaiveDate,
        status: AttendanceStatus,
    ) -> Option<AttendanceStatus> {
        let update = PendingUpdate {
            student,
            date,
            status,
        };
        self.unsaved = true;
        self.entries
            .insert(update.key(), update)
            .map(|previous| previous.status)
    }

    /// Drop the edit for one cell.
    pub fn unstage(&mut self, student: StudentId, date: NaiveDate) -> Option<AttendanceStatus> {
        let removed = self
            .entries
            .remove(&CellKey::new(student, date))
            .map(|u| u.status);
        if self.entries.is_empty() {
            self.unsaved = false;
        }
        removed
    }

    /// Pending status for a cell.
    #[must_use]
    pub fn pending(&self, student: StudentId, date: NaiveDate) -> Option<AttendanceStatus> {
        self.entries
            .get(&CellKey::new(student, date))
            .map(|u| u.status)
    }

    #[must_use]
    pub fn is_pending(&self, student: StudentId, date: NaiveDate) -> bool {
        self.entries.contains_key(&CellKey::new(student, date))
    }

    #[must_use]
    pub fn has_unsaved_changes(&self) -> bool {
        self.unsaved
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Pending edits in (student, date) order.
    pub fn iter(&self) -> impl Iterator<Item = &PendingUpdate> {
        self.entries.values()
    }

    /// Forget every edit without touching the server.
    pub fn discard(&mut self) {
        self.entries.clear();
        self.unsaved = false;
    }

    /// Empty the overlay after a submit attempt, whatever its outcome.
    ///
    /// Returns the edits that were pending.
    pub fn drain(&mut self) -> Vec<PendingUpdate> {
        let drained = std::mem::take(&mut self.entries).into_values().collect();
        self.unsaved = false;
        drained
    }
}

// =============================================================================
// TESTS
// =============================================================================
