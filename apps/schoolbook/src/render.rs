//! Plain-text rendering of records and the attendance grid.

use chrono::NaiveDate;
use regex::{Regex, RegexBuilder};
use schoolbook_core::week::{day_label, is_past, is_today};
use schoolbook_core::{
    AttendanceBoard, Class, DashboardStats, DayDetail, GridStudent, RateBand, Student, StudentId,
    Subject, Teacher, WeekSummary,
};
use std::io::{self, Write};

const EMAIL_PATTERN: &str = r"^[a-zA-Z0-9_.+-]+@[a-zA-Z0-9-]+\.[a-zA-Z0-9-.]+$";

// =============================================================================
// SEARCH HIGHLIGHT
// =============================================================================

/// Marks every case-insensitive occurrence of a search term as `[term]`.
#[derive(Debug, Clone, Default)]
pub struct Highlighter {
    pattern: Option<Regex>,
}

impl Highlighter {
    pub fn new(term: &str) -> Self {
        if term.trim().is_empty() {
            return Self::default();
        }
        let pattern = RegexBuilder::new(&regex::escape(term))
            .case_insensitive(true)
            .build()
            .ok();
        Self { pattern }
    }

    pub fn apply(&self, text: &str) -> String {
        match &self.pattern {
            Some(re) => re.replace_all(text, "[${0}]").into_owned(),
            None => text.to_string(),
        }
    }
}

// =============================================================================
// RECORD TABLES
// =============================================================================

/// A record that renders as one table row.
pub trait TableRecord {
    /// Singular noun for messages.
    const NOUN: &'static str;

    fn headers() -> &'static [&'static str];

    /// Cells in header order. Name cells go through the highlighter.
    fn row(&self, hl: &Highlighter) -> Vec<String>;

    /// Check a record read from a file before it is sent.
    fn validate(&self) -> Result<(), String>;
}

fn id_cell<T: ToString>(id: Option<T>) -> String {
    id.map(|i| i.to_string()).unwrap_or_else(|| "-".to_string())
}

fn opt_cell(value: Option<&str>) -> String {
    value.unwrap_or("-").to_string()
}

fn require(value: &str, field: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err(format!("{} is required", field))
    } else {
        Ok(())
    }
}

impl TableRecord for Student {
    const NOUN: &'static str = "student";

    fn headers() -> &'static [&'static str] {
        &["ID", "Name (EN)", "Name (KH)", "Gender", "Class"]
    }

    fn row(&self, hl: &Highlighter) -> Vec<String> {
        vec![
            id_cell(self.student_id),
            hl.apply(&self.studentname_en),
            hl.apply(&self.studentname_kh),
            opt_cell(self.gender.as_deref()),
            hl.apply(self.class_code.as_deref().unwrap_or("-")),
        ]
    }

    fn validate(&self) -> Result<(), String> {
        require(&self.studentname_en, "studentname_en")
    }
}

impl TableRecord for Teacher {
    const NOUN: &'static str = "teacher";

    fn headers() -> &'static [&'static str] {
        &["ID", "Name (EN)", "Name (KH)", "Email"]
    }

    fn row(&self, hl: &Highlighter) -> Vec<String> {
        vec![
            id_cell(self.teacher_id),
            hl.apply(&self.teachername_en),
            hl.apply(&self.teachername_kh),
            hl.apply(self.email.as_deref().unwrap_or("-")),
        ]
    }

    fn validate(&self) -> Result<(), String> {
        require(&self.teachername_en, "teachername_en")?;
        if let Some(email) = self.email.as_deref().filter(|e| !e.is_empty()) {
            let re = Regex::new(EMAIL_PATTERN).map_err(|e| e.to_string())?;
            if !re.is_match(email) {
                return Err(format!("invalid email address: {}", email));
            }
        }
        Ok(())
    }
}

impl TableRecord for Subject {
    const NOUN: &'static str = "subject";

    fn headers() -> &'static [&'static str] {
        &["ID", "Name", "Code", "Description"]
    }

    fn row(&self, hl: &Highlighter) -> Vec<String> {
        vec![
            id_cell(self.subject_id),
            hl.apply(&self.subject_name),
            hl.apply(self.subject_code.as_deref().unwrap_or("-")),
            opt_cell(self.description.as_deref()),
        ]
    }

    fn validate(&self) -> Result<(), String> {
        require(&self.subject_name, "subject_name")
    }
}

impl TableRecord for Class {
    const NOUN: &'static str = "class";

    fn headers() -> &'static [&'static str] {
        &["ID", "Code", "Year", "Room", "Schedule"]
    }

    fn row(&self, hl: &Highlighter) -> Vec<String> {
        vec![
            id_cell(self.class_id),
            hl.apply(&self.class_code),
            hl.apply(self.class_year.as_deref().unwrap_or("-")),
            opt_cell(self.room_number.as_deref()),
            opt_cell(self.schedule.as_deref()),
        ]
    }

    fn validate(&self) -> Result<(), String> {
        require(&self.class_code, "class_code")
    }
}

/// Write rows under a header, columns padded to their widest cell.
pub fn write_table<W: Write>(out: &mut W, headers: &[&str], rows: &[Vec<String>]) -> io::Result<()> {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.chars().count());
            }
        }
    }

    let header: Vec<String> = headers.iter().map(|h| (*h).to_string()).collect();
    write_row(out, &header, &widths)?;
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    write_row(out, &rule, &widths)?;
    for row in rows {
        write_row(out, row, &widths)?;
    }
    Ok(())
}

fn write_row<W: Write>(out: &mut W, cells: &[String], widths: &[usize]) -> io::Result<()> {
    let line: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, w)| pad(cell, *w))
        .collect();
    writeln!(out, "{}", line.join("  ").trim_end())
}

fn pad(cell: &str, width: usize) -> String {
    let len = cell.chars().count();
    format!("{}{}", cell, " ".repeat(width.saturating_sub(len)))
}

/// Render a list of records with the search term highlighted.
pub fn write_records<W: Write, R: TableRecord>(out: &mut W, records: &[&R], search: &str) -> io::Result<()> {
    let hl = Highlighter::new(search);
    let rows: Vec<Vec<String>> = records.iter().map(|r| r.row(&hl)).collect();
    write_table(out, R::headers(), &rows)?;
    writeln!(out, "{} {}(s)", records.len(), R::NOUN)
}

pub fn write_dashboard<W: Write>(out: &mut W, stats: &DashboardStats) -> io::Result<()> {
    writeln!(out, "Students:        {}", stats.total_students)?;
    writeln!(out, "Teachers:        {}", stats.total_teachers)?;
    writeln!(out, "Classes:         {}", stats.total_classes)?;
    writeln!(out, "Attendance rate: {}%", stats.attendance_rate)
}

// =============================================================================
// ATTENDANCE GRID
// =============================================================================

fn cell_text(board: &AttendanceBoard, student: StudentId, date: NaiveDate, today: NaiveDate) -> String {
    let mut text = match board.effective_status(student, date) {
        Some(status) => status.symbol().to_string(),
        None if is_past(date, today) || is_today(date, today) => "·".to_string(),
        None => String::new(),
    };
    if board.is_pending(student, date) {
        text.push('*');
    }
    if board.bulk().is_active(date) {
        let mark = if board.bulk().is_selected(date, student) { "x" } else { " " };
        text = format!("[{}] {}", mark, text);
    }
    text
}

fn sex_cell(student: &GridStudent) -> String {
    if student.is_male() {
        "M".to_string()
    } else {
        opt_cell(student.gender.as_deref())
    }
}

fn rate_cell(rate: Option<&str>) -> String {
    match rate {
        Some(r) => format!("{} ({})", r, RateBand::from_rate(r).label()),
        None => "-".to_string(),
    }
}

/// The visible page of the board, one row per student.
pub fn write_grid<W: Write>(out: &mut W, board: &AttendanceBoard, today: NaiveDate) -> io::Result<()> {
    let week = board.week();
    let class = board
        .class()
        .map_or_else(|| "no class selected".to_string(), |c| format!("class {}", c));
    writeln!(out, "Week {} | {}", week, class)?;

    if board.grid().is_none() {
        return writeln!(out, "(grid not loaded)");
    }

    let dates: Vec<NaiveDate> = week.dates().collect();
    let mut headers: Vec<String> = vec!["ID".to_string(), "Name".to_string(), "Sex".to_string()];
    for &date in &dates {
        let label = day_label(date);
        headers.push(if is_today(date, today) { format!(">{}", label) } else { label });
    }
    headers.push("Present".to_string());
    headers.push("Rate".to_string());

    let hl = Highlighter::new(board.search());
    let rows: Vec<Vec<String>> = board
        .visible_students()
        .into_iter()
        .map(|s| {
            let mut row = vec![
                s.student_id.to_string(),
                format!("{} / {}", hl.apply(&s.student_name_eng), hl.apply(&s.student_name_kh)),
                sex_cell(s),
            ];
            row.extend(dates.iter().map(|&d| cell_text(board, s.student_id, d, today)));
            row.push(format!("{}/{}", board.present_count(s.student_id), dates.len()));
            row.push(rate_cell(s.attendance_rate.as_deref()));
            row
        })
        .collect();

    let header_refs: Vec<&str> = headers.iter().map(String::as_str).collect();
    write_table(out, &header_refs, &rows)?;
    write_status_line(out, board)
}

/// Paging, search, pending edits, bulk panel and the last error.
pub fn write_status_line<W: Write>(out: &mut W, board: &AttendanceBoard) -> io::Result<()> {
    let pager = board.pager();
    let mut parts = vec![format!(
        "page {}/{} ({} students)",
        pager.current_page(),
        pager.total_pages().max(1),
        pager.total()
    )];
    if !board.search().trim().is_empty() {
        parts.push(format!(
            "search '{}' ({} of {})",
            board.search(),
            pager.total(),
            board.total_students()
        ));
    }
    if board.has_unsaved_changes() {
        parts.push(format!("{} unsaved", board.overlay().len()));
    }
    if let Some(date) = board.bulk().open_date() {
        parts.push(format!(
            "bulk {}: {} selected, {}",
            day_label(date),
            board.bulk().selected_count(date),
            board.bulk().status(date)
        ));
    }
    writeln!(out, "{}", parts.join(" | "))?;
    if let Some(err) = board.last_error() {
        writeln!(out, "error: {}", err)?;
    }
    Ok(())
}

pub fn write_summary<W: Write>(out: &mut W, summary: &WeekSummary) -> io::Result<()> {
    writeln!(
        out,
        "Present {} | Absent {} | Late {} | Excused {} | Unmarked {} | {}% present",
        summary.present,
        summary.absent,
        summary.late,
        summary.excused,
        summary.empty(),
        summary.present_percent()
    )
}

pub fn write_day_detail<W: Write>(out: &mut W, detail: &DayDetail<'_>) -> io::Result<()> {
    writeln!(
        out,
        "{} ({}) on {}",
        detail.student.student_name_eng,
        detail.student.student_id,
        detail.date.format("%A %Y-%m-%d")
    )?;
    if detail.records.is_empty() {
        return writeln!(out, "  no records");
    }
    for record in detail.records {
        let subject = match (&record.subject_name, record.subject_id) {
            (Some(name), _) => name.clone(),
            (None, Some(id)) => format!("subject {}", id),
            (None, None) => "unspecified subject".to_string(),
        };
        writeln!(out, "  {} {}: {}", record.status.symbol(), subject, record.status)?;
    }
    if detail.has_multiple_subjects() {
        writeln!(
            out,
            "  absent from {} of {} subjects",
            detail.absent_subject_count(),
            detail.records.len()
        )?;
    }
    Ok(())
}
