//! # Attendance Board
//!
//! The weekly attendance view as a state machine.
//!
//! The board combines the last-fetched [`WeeklyGrid`] with the
//! [`StagingOverlay`] of unsaved edits, the [`BulkSelection`] panel, the
//! [`Week`] being viewed, the [`Pager`] and the current search. It performs
//! no I/O: the caller fetches the grid for [`AttendanceBoard::grid_request`]
//! and sends [`AttendanceBoard::pending_writes`], then reports back with
//! [`AttendanceBoard::load_grid`] and [`AttendanceBoard::finish_commit`].
//!
//! ## Commit semantics
//!
//! `finish_commit` empties the overlay whatever happened to the individual
//! writes. A partial failure therefore loses the failed edits; the caller
//! reports one aggregate error and reloads the grid.

use crate::bulk::BulkSelection;
use crate::filter::{SearchTerm, Searchable};
use crate::grid::{GridStudent, WeeklyGrid};
use crate::models::AttendanceWrite;
use crate::overlay::StagingOverlay;
use crate::pager::Pager;
use crate::status::AttendanceStatus;
use crate::summary::{DayDetail, WeekSummary};
use crate::week::Week;
use crate::{ClassId, CoreError, StudentId, SubjectId, TeacherId};
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Ids used when a pending write has nothing better.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommitDefaults {
    /// Teacher recorded on every write.
    pub teacher: TeacherId,
    /// Subject used when no subject is selected or known for the date.
    pub subject: SubjectId,
}

impl Default for CommitDefaults {
    fn default() -> Self {
        Self {
            teacher: TeacherId(1),
            subject: SubjectId(1),
        }
    }
}

/// What a cell click did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellClick {
    /// A status was staged for the cell.
    Staged(AttendanceStatus),
    /// The cell's pending edit was dropped.
    Cleared,
    /// The bulk panel is open for the date; the student was added (`true`)
    /// or removed (`false`) from the selection.
    Selected(bool),
}

/// Client-side state of the weekly attendance view.
#[derive(Debug, Clone)]
pub struct AttendanceBoard {
    class: Option<ClassId>,
    week: Week,
    grid: Option<WeeklyGrid>,
    overlay: StagingOverlay,
    bulk: BulkSelection,
    pager: Pager,
    search: SearchTerm,
    search_raw: String,
    subjects: Vec<SubjectId>,
    subject_by_date: BTreeMap<NaiveDate, SubjectId>,
    last_error: Option<String>,
}

impl AttendanceBoard {
    /// An empty board showing the week that contains `today`.
    #[must_use]
    pub fn new(today: NaiveDate) -> Self {
        Self {
            class: None,
            week: Week::current(today),
            grid: None,
            overlay: StagingOverlay::new(),
            bulk: BulkSelection::new(),
            pager: Pager::default(),
            search: SearchTerm::default(),
            search_raw: String::new(),
            subjects: Vec::new(),
            subject_by_date: BTreeMap::new(),
            last_error: None,
        }
    }

    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.pager = Pager::new(page_size);
        self
    }

    // =========================================================================
    // SELECTION + NAVIGATION
    // =========================================================================

    #[must_use]
    pub fn class(&self) -> Option<ClassId> {
        self.class
    }

    /// Select the class to show. The caller reloads the grid afterwards.
    pub fn select_class(&mut self, class: ClassId) {
        self.class = Some(class);
    }

    #[must_use]
    pub fn week(&self) -> Week {
        self.week
    }

    pub fn previous_week(&mut self) {
        self.week = self.week.previous();
    }

    pub fn next_week(&mut self) {
        self.week = self.week.next();
    }

    pub fn reset_to_current_week(&mut self, today: NaiveDate) {
        self.week = Week::current(today);
    }

    /// Jump to the week containing `date`.
    pub fn go_to_week_of(&mut self, date: NaiveDate) {
        self.week = Week::containing(date);
    }

    /// Parameters for `GET /attendance/weekly-grid`, once a class is chosen.
    #[must_use]
    pub fn grid_request(&self) -> Option<(ClassId, NaiveDate, NaiveDate)> {
        self.class
            .map(|class| (class, self.week.start(), self.week.end()))
    }

    // =========================================================================
    // GRID
    // =========================================================================

    /// Replace the server snapshot. Pending edits are kept.
    pub fn load_grid(&mut self, grid: WeeklyGrid) {
        self.grid = Some(grid);
        self.last_error = None;
        self.refresh_total();
    }

    #[must_use]
    pub fn grid(&self) -> Option<&WeeklyGrid> {
        self.grid.as_ref()
    }

    /// Number of students in the loaded grid.
    #[must_use]
    pub fn total_students(&self) -> usize {
        self.grid.as_ref().map_or(0, WeeklyGrid::len)
    }

    fn student(&self, id: StudentId) -> Result<&GridStudent, CoreError> {
        self.grid
            .as_ref()
            .ok_or(CoreError::GridNotLoaded)?
            .student(id)
            .ok_or(CoreError::UnknownStudent(id))
    }

    // =========================================================================
    // SEARCH + PAGINATION
    // =========================================================================

    /// Set the search text and go back to page 1.
    pub fn set_search(&mut self, raw: &str) {
        self.search_raw = raw.to_string();
        self.search = SearchTerm::new(raw);
        self.pager.first();
        self.refresh_total();
    }

    pub fn clear_search(&mut self) {
        self.set_search("");
    }

    /// Search text as typed.
    #[must_use]
    pub fn search(&self) -> &str {
        &self.search_raw
    }

    /// Grid students matching the search, in roster order.
    #[must_use]
    pub fn filtered_students(&self) -> Vec<&GridStudent> {
        self.grid
            .as_ref()
            .map(|g| {
                g.students
                    .iter()
                    .filter(|s| s.matches(&self.search))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// The current page of filtered students.
    #[must_use]
    pub fn visible_students(&self) -> Vec<&GridStudent> {
        let filtered = self.filtered_students();
        self.pager.page(&filtered).to_vec()
    }

    #[must_use]
    pub fn pager(&self) -> &Pager {
        &self.pager
    }

    pub fn next_page(&mut self) -> bool {
        self.pager.next()
    }

    pub fn previous_page(&mut self) -> bool {
        self.pager.previous()
    }

    pub fn set_page_size(&mut self, page_size: usize) {
        self.pager.set_page_size(page_size);
        self.refresh_total();
    }

    fn refresh_total(&mut self) {
        let total = self.filtered_students().len();
        self.pager.set_total(total);
    }

    // =========================================================================
    // STAGING
    // =========================================================================

    /// Pending status if staged, else the first recorded status for the day.
    #[must_use]
    pub fn effective_status(&self, student: StudentId, date: NaiveDate) -> Option<AttendanceStatus> {
        self.overlay.pending(student, date).or_else(|| {
            self.grid
                .as_ref()
                .and_then(|g| g.student(student))
                .and_then(|s| s.server_status(date))
        })
    }

    #[must_use]
    pub fn is_pending(&self, student: StudentId, date: NaiveDate) -> bool {
        self.overlay.is_pending(student, date)
    }

    /// Stage a status for one cell.
    pub fn stage(&mut self, student: StudentId, date: NaiveDate, status: AttendanceStatus) {
        self.overlay.stage(student, date, status);
    }

    /// Handle a click on a cell.
    ///
    /// With the bulk panel open for `date` the click toggles the student's
    /// selection. Otherwise it moves the cell one step along
    /// Present → Absent → cleared. An Absent cell that comes from the server
    /// (nothing pending to clear) goes back to Present.
    pub fn click_cell(&mut self, student: StudentId, date: NaiveDate) -> Result<CellClick, CoreError> {
        if self.bulk.is_active(date) {
            return Ok(CellClick::Selected(self.bulk.toggle_student(date, student)));
        }

        let server = self.student(student)?.server_status(date);
        let pending = self.overlay.pending(student, date);

        match AttendanceStatus::toggled(pending.or(server)) {
            Some(next) => {
                self.overlay.stage(student, date, next);
                Ok(CellClick::Staged(next))
            }
            None if pending.is_some() => {
                self.overlay.unstage(student, date);
                Ok(CellClick::Cleared)
            }
            None => {
                self.overlay
                    .stage(student, date, AttendanceStatus::Present);
                Ok(CellClick::Staged(AttendanceStatus::Present))
            }
        }
    }

    #[must_use]
    pub fn overlay(&self) -> &StagingOverlay {
        &self.overlay
    }

    #[must_use]
    pub fn has_unsaved_changes(&self) -> bool {
        self.overlay.has_unsaved_changes()
    }

    /// Drop every pending edit without contacting the server.
    pub fn discard(&mut self) {
        self.overlay.discard();
    }

    // =========================================================================
    // BULK
    // =========================================================================

    #[must_use]
    pub fn bulk(&self) -> &BulkSelection {
        &self.bulk
    }

    pub fn toggle_bulk_panel(&mut self, date: NaiveDate) {
        self.bulk.toggle_panel(date);
    }

    pub fn cancel_bulk(&mut self) {
        self.bulk.cancel();
    }

    pub fn toggle_bulk_student(&mut self, date: NaiveDate, student: StudentId) -> bool {
        self.bulk.toggle_student(date, student)
    }

    /// Select every student matching the current search.
    pub fn bulk_select_all(&mut self, date: NaiveDate) {
        let ids: Vec<StudentId> = self
            .filtered_students()
            .iter()
            .map(|s| s.student_id)
            .collect();
        self.bulk.select_all(date, ids);
    }

    pub fn bulk_deselect_all(&mut self, date: NaiveDate) {
        self.bulk.deselect_all(date);
    }

    pub fn set_bulk_status(&mut self, date: NaiveDate, status: AttendanceStatus) {
        self.bulk.set_status(date, status);
    }

    /// Stage the chosen status for every selected student and close the
    /// panel. Returns the number of cells staged.
    pub fn apply_bulk(&mut self, date: NaiveDate) -> usize {
        self.bulk.apply(date, &mut self.overlay)
    }

    /// Stage Present for every student matching the search.
    pub fn quick_all_present(&mut self, date: NaiveDate) -> usize {
        let ids: Vec<StudentId> = self
            .filtered_students()
            .iter()
            .map(|s| s.student_id)
            .collect();
        for &id in &ids {
            self.overlay.stage(id, date, AttendanceStatus::Present);
        }
        ids.len()
    }

    // =========================================================================
    // SUBJECTS
    // =========================================================================

    /// Known subjects, first one used as the default for every date.
    pub fn set_subjects(&mut self, subjects: Vec<SubjectId>) {
        self.subjects = subjects;
    }

    pub fn select_subject(&mut self, date: NaiveDate, subject: SubjectId) {
        self.subject_by_date.insert(date, subject);
    }

    /// Subject a write for `date` is recorded against.
    #[must_use]
    pub fn subject_for(&self, date: NaiveDate) -> Option<SubjectId> {
        self.subject_by_date
            .get(&date)
            .copied()
            .or_else(|| self.subjects.first().copied())
    }

    // =========================================================================
    // COMMIT
    // =========================================================================

    /// One write per pending edit, in (student, date) order.
    #[must_use]
    pub fn pending_writes(&self, defaults: &CommitDefaults) -> Vec<AttendanceWrite> {
        self.overlay
            .iter()
            .map(|u| AttendanceWrite {
                student_id: u.student,
                subject_id: self.subject_for(u.date).unwrap_or(defaults.subject),
                attendance_date: u.date,
                status: u.status,
                teacher_id: defaults.teacher,
            })
            .collect()
    }

    /// Empty the overlay after a submit attempt, successful or not.
    ///
    /// Returns the number of edits dropped.
    pub fn finish_commit(&mut self) -> usize {
        self.overlay.drain().len()
    }

    // =========================================================================
    // SUMMARIES + ERRORS
    // =========================================================================

    /// Effective statuses of the filtered students over the whole week.
    #[must_use]
    pub fn summary(&self) -> WeekSummary {
        let dates: Vec<NaiveDate> = self.week.dates().collect();
        let dates = &dates;
        let cells = self.filtered_students().into_iter().flat_map(move |s| {
            dates
                .iter()
                .map(move |&d| self.effective_status(s.student_id, d))
        });
        WeekSummary::tally(cells)
    }

    /// Days this week the student is effectively Present.
    #[must_use]
    pub fn present_count(&self, student: StudentId) -> usize {
        self.week
            .dates()
            .filter(|&d| self.effective_status(student, d) == Some(AttendanceStatus::Present))
            .count()
    }

    /// Recorded entries for one cell.
    pub fn day_detail(&self, student: StudentId, date: NaiveDate) -> Result<DayDetail<'_>, CoreError> {
        Ok(DayDetail::new(self.student(student)?, date))
    }

    pub fn record_error(&mut self, message: impl Into<String>) {
        self.last_error = Some(message.into());
    }

    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}

// =============================================================================
// TESTS
// =============================================================================
