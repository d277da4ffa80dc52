//! # Bulk Selection
//!
//! Per-date selection of students plus one chosen status. Applying stages
//! the chosen status for every selected student and closes the panel.
//! Selections are not checked against the loaded roster.

use crate::overlay::StagingOverlay;
use crate::status::AttendanceStatus;
use crate::StudentId;
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};

/// Selection state for one date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkState {
    pub status: AttendanceStatus,
    pub selected: BTreeSet<StudentId>,
}

impl Default for BulkState {
    fn default() -> Self {
        Self {
            status: AttendanceStatus::Present,
            selected: BTreeSet::new(),
        }
    }
}

/// Bulk selection panel: at most one date is open at a time.
#[derive(Debug, Clone, Default)]
pub struct BulkSelection {
    states: BTreeMap<NaiveDate, BulkState>,
    open: Option<NaiveDate>,
}

impl BulkSelection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Date whose panel is open.
    #[must_use]
    pub fn open_date(&self) -> Option<NaiveDate> {
        self.open
    }

    #[must_use]
    pub fn is_active(&self, date: NaiveDate) -> bool {
        self.open == Some(date)
    }

    /// Open the panel for `date`, or close it if `date` is already open.
    pub fn toggle_panel(&mut self, date: NaiveDate) {
        if self.open == Some(date) {
            self.open = None;
        } else {
            self.open = Some(date);
        }
    }

    /// Close the panel without staging anything. Selections are kept.
    pub fn cancel(&mut self) {
        self.open = None;
    }

    /// State for a date, created on first use.
    pub fn state_mut(&mut self, date: NaiveDate) -> &mut BulkState {
        self.states.entry(date).or_default()
    }

    /// State for a date if one exists.
    #[must_use]
    pub fn state(&self, date: NaiveDate) -> Option<&BulkState> {
        self.states.get(&date)
    }

    /// Add or remove a student from the date's selection.
    ///
    /// Returns true if the student is selected afterwards.
    pub fn toggle_student(&mut self, date: NaiveDate, student: StudentId) -> bool {
        let state = self.state_mut(date);
        if state.selected.remove(&student) {
            false
        } else {
            state.selected.insert(student);
            true
        }
    }

    #[must_use]
    pub fn is_selected(&self, date: NaiveDate, student: StudentId) -> bool {
        self.state(date)
            .is_some_and(|s| s.selected.contains(&student))
    }

    /// Add every given student to the date's selection.
    pub fn select_all(&mut self, date: NaiveDate, students: impl IntoIterator<Item = StudentId>) {
        self.state_mut(date).selected.extend(students);
    }

    pub fn deselect_all(&mut self, date: NaiveDate) {
        self.state_mut(date).selected.clear();
    }

    #[must_use]
    pub fn selected_count(&self, date: NaiveDate) -> usize {
        self.state(date).map_or(0, |s| s.selected.len())
    }

    /// Choose the status that `apply` will stage for the date.
    pub fn set_status(&mut self, date: NaiveDate, status: AttendanceStatus) {
        self.state_mut(date).status = status;
    }

    #[must_use]
    pub fn status(&self, date: NaiveDate) -> AttendanceStatus {
        self.state(date)
            .map_or(AttendanceStatus::Present, |s| s.status)
    }

    /// Stage the chosen status for every selected student, then close the
    /// panel. Returns the number of cells staged.
    pub fn apply(&mut self, date: NaiveDate, overlay: &mut StagingOverlay) -> usize {
        let state = self.state_mut(date);
        let status = state.status;
        let staged = state.selected.len();
        for &student in &state.selected {
            overlay.stage(student, date, status);
        }
        self.open = None;
        staged
    }
}
