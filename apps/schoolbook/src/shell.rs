//! Interactive attendance shell.
//!
//! Reads one command per line and drives an [`AttendanceBoard`]. Only the
//! shell talks to the backend: navigation reloads the grid, `submit` sends
//! the staged edits. Errors are printed and recorded on the board; the
//! shell keeps running.

use crate::config::GridArgs;
use crate::render;
use chrono::{NaiveDate, Weekday};
use schoolbook_client::SchoolClient;
use schoolbook_core::{
    AttendanceBoard, AttendanceStatus, CellClick, ClassId, CommitDefaults, CoreError, StudentId,
    SubjectId, Week, parse_date,
};
use std::io::{self, BufRead, Write};
use thiserror::Error;

pub const PROMPT: &str = "schoolbook> ";

const HELP: &str = "\
Navigation
  class <id>                    open a class
  week prev|next|today|<date>   change week
  search <text> | search        filter students by name (empty clears)
  page next|prev|<size>         move between pages or set the page size
  show                          print the grid
Editing (<day> is sun..sat or YYYY-MM-DD)
  toggle <student> <day>        Present -> Absent -> cleared
  mark <student> <day> <status> stage a status (P, A, L, E)
  allpresent <day>              stage Present for every listed student
  bulk open <day>               open the bulk panel for a day
  bulk select <student>         toggle a student in the open panel
  bulk all | bulk none          select every listed student / nobody
  bulk status <status>          status the panel applies
  bulk apply | bulk cancel      stage the selection / close the panel
  subjects                      list subjects
  subject <day> <id>            record a day against a subject
Review
  summary                       weekly totals for listed students
  detail <student> <day>        recorded entries for one cell
  submit                        send staged edits
  discard                       drop staged edits
  quit | quit!                  leave (quit! drops staged edits)";

#[derive(Debug, Error)]
pub enum ShellError {
    #[error("{0}")]
    Usage(String),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("{}", .0.message())]
    Client(#[from] schoolbook_client::Error),

    #[error(transparent)]
    Io(#[from] io::Error),
}

fn usage(message: impl Into<String>) -> ShellError {
    ShellError::Usage(message.into())
}

// =============================================================================
// COMMANDS
// =============================================================================

/// A day argument, resolved against the board's week when executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Day {
    Weekday(Weekday),
    Date(NaiveDate),
}

impl Day {
    fn parse(raw: &str) -> Result<Self, ShellError> {
        if let Ok(weekday) = raw.parse::<Weekday>() {
            return Ok(Day::Weekday(weekday));
        }
        Ok(Day::Date(parse_date(raw)?))
    }

    /// The date this day names within `week`.
    pub fn resolve(self, week: Week) -> NaiveDate {
        match self {
            Day::Date(date) => date,
            Day::Weekday(weekday) => week
                .dates()
                .find(|d| chrono::Datelike::weekday(d) == weekday)
                .unwrap_or_else(|| week.start()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeekMove {
    Previous,
    Next,
    Today,
    Of(NaiveDate),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageMove {
    Next,
    Previous,
    Size(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkCommand {
    Open(Day),
    Select(StudentId),
    All,
    None,
    Status(AttendanceStatus),
    Apply,
    Cancel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Help,
    Class(ClassId),
    Week(WeekMove),
    Search(String),
    Page(PageMove),
    Show,
    Toggle(StudentId, Day),
    Mark(StudentId, Day, AttendanceStatus),
    AllPresent(Day),
    Bulk(BulkCommand),
    Subjects,
    Subject(Day, SubjectId),
    Summary,
    Detail(StudentId, Day),
    Submit,
    Discard,
    Quit { force: bool },
}

fn id_arg(raw: Option<&str>, what: &str) -> Result<u64, ShellError> {
    let raw = raw.ok_or_else(|| usage(format!("missing {}", what)))?;
    raw.parse()
        .map_err(|_| usage(format!("invalid {}: {}", what, raw)))
}

fn day_arg(raw: Option<&str>) -> Result<Day, ShellError> {
    Day::parse(raw.ok_or_else(|| usage("missing day"))?)
}

fn status_arg(raw: Option<&str>) -> Result<AttendanceStatus, ShellError> {
    Ok(raw.ok_or_else(|| usage("missing status"))?.parse()?)
}

impl ShellCommand {
    /// Parse one input line. Blank lines and `#` comments give `None`.
    pub fn parse(line: &str) -> Result<Option<Self>, ShellError> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }
        let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();
        let mut args = rest.split_whitespace();

        let command = match word.to_ascii_lowercase().as_str() {
            "help" | "?" => ShellCommand::Help,
            "class" => ShellCommand::Class(ClassId(id_arg(args.next(), "class id")?)),
            "week" => ShellCommand::Week(match args.next() {
                Some("prev") | Some("previous") => WeekMove::Previous,
                Some("next") => WeekMove::Next,
                Some("today") | None => WeekMove::Today,
                Some(raw) => WeekMove::Of(parse_date(raw)?),
            }),
            "search" => ShellCommand::Search(rest.to_string()),
            "page" => ShellCommand::Page(match args.next() {
                Some("next") | None => PageMove::Next,
                Some("prev") | Some("previous") => PageMove::Previous,
                Some(raw) => PageMove::Size(
                    raw.parse()
                        .map_err(|_| usage(format!("invalid page size: {}", raw)))?,
                ),
            }),
            "show" | "grid" => ShellCommand::Show,
            "toggle" | "t" => {
                let student = StudentId(id_arg(args.next(), "student id")?);
                ShellCommand::Toggle(student, day_arg(args.next())?)
            }
            "mark" => {
                let student = StudentId(id_arg(args.next(), "student id")?);
                let day = day_arg(args.next())?;
                ShellCommand::Mark(student, day, status_arg(args.next())?)
            }
            "allpresent" => ShellCommand::AllPresent(day_arg(args.next())?),
            "bulk" => ShellCommand::Bulk(match args.next() {
                Some("open") => BulkCommand::Open(day_arg(args.next())?),
                Some("select") => BulkCommand::Select(StudentId(id_arg(args.next(), "student id")?)),
                Some("all") => BulkCommand::All,
                Some("none") => BulkCommand::None,
                Some("status") => BulkCommand::Status(status_arg(args.next())?),
                Some("apply") => BulkCommand::Apply,
                Some("cancel") => BulkCommand::Cancel,
                other => return Err(usage(format!("unknown bulk command: {}", other.unwrap_or("")))),
            }),
            "subjects" => ShellCommand::Subjects,
            "subject" => {
                let day = day_arg(args.next())?;
                ShellCommand::Subject(day, SubjectId(id_arg(args.next(), "subject id")?))
            }
            "summary" => ShellCommand::Summary,
            "detail" => {
                let student = StudentId(id_arg(args.next(), "student id")?);
                ShellCommand::Detail(student, day_arg(args.next())?)
            }
            "submit" | "save" => ShellCommand::Submit,
            "discard" => ShellCommand::Discard,
            "quit" | "exit" => ShellCommand::Quit { force: false },
            "quit!" | "exit!" => ShellCommand::Quit { force: true },
            other => return Err(usage(format!("unknown command: {} (try help)", other))),
        };
        Ok(Some(command))
    }
}

// =============================================================================
// SHELL
// =============================================================================

/// Whether the shell keeps reading after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Shell<'a> {
    client: &'a SchoolClient,
    board: AttendanceBoard,
    defaults: CommitDefaults,
    today: NaiveDate,
}

impl<'a> Shell<'a> {
    pub fn new(client: &'a SchoolClient, today: NaiveDate, defaults: CommitDefaults, page_size: usize) -> Self {
        Self {
            client,
            board: AttendanceBoard::new(today).with_page_size(page_size),
            defaults,
            today,
        }
    }

    pub fn board(&self) -> &AttendanceBoard {
        &self.board
    }

    /// Load subjects, then open the class and week given on the command line.
    pub async fn open(&mut self, args: &GridArgs) -> Result<(), ShellError> {
        if let Err(e) = self.load_subjects().await {
            tracing::warn!(error = %e, "subjects unavailable, using the fallback subject");
        }
        if let Some(raw) = &args.week_of {
            self.board.go_to_week_of(parse_date(raw)?);
        }
        if let Some(class) = args.class {
            self.board.select_class(ClassId(class));
            self.reload().await?;
        }
        Ok(())
    }

    async fn load_subjects(&mut self) -> Result<usize, ShellError> {
        let subjects = self.client.subjects().list().await?;
        let ids: Vec<SubjectId> = subjects.iter().filter_map(|s| s.subject_id).collect();
        let count = ids.len();
        self.board.set_subjects(ids);
        Ok(count)
    }

    /// Fetch the grid for the board's class and week.
    pub async fn reload(&mut self) -> Result<(), ShellError> {
        let Some((class, start, end)) = self.board.grid_request() else {
            return Ok(());
        };
        let grid = self.client.attendance().weekly_grid(class, start, end).await?;
        tracing::info!(class = class.0, %start, students = grid.len(), "grid reloaded");
        self.board.load_grid(grid);
        Ok(())
    }

    fn date(&self, day: Day) -> NaiveDate {
        day.resolve(self.board.week())
    }

    fn open_bulk_date(&self) -> Result<NaiveDate, ShellError> {
        self.board
            .bulk()
            .open_date()
            .ok_or_else(|| usage("no bulk panel open (bulk open <day>)"))
    }

    /// Run one command.
    pub async fn execute<W: Write>(&mut self, command: ShellCommand, out: &mut W) -> Result<Flow, ShellError> {
        match command {
            ShellCommand::Help => writeln!(out, "{}", HELP)?,
            ShellCommand::Class(class) => {
                self.board.select_class(class);
                self.reload().await?;
                render::write_grid(out, &self.board, self.today)?;
            }
            ShellCommand::Week(movement) => {
                match movement {
                    WeekMove::Previous => self.board.previous_week(),
                    WeekMove::Next => self.board.next_week(),
                    WeekMove::Today => self.board.reset_to_current_week(self.today),
                    WeekMove::Of(date) => self.board.go_to_week_of(date),
                }
                self.reload().await?;
                render::write_grid(out, &self.board, self.today)?;
            }
            ShellCommand::Search(term) => {
                self.board.set_search(&term);
                render::write_grid(out, &self.board, self.today)?;
            }
            ShellCommand::Page(movement) => {
                let moved = match movement {
                    PageMove::Next => self.board.next_page(),
                    PageMove::Previous => self.board.previous_page(),
                    PageMove::Size(size) => {
                        self.board.set_page_size(size);
                        true
                    }
                };
                if !moved {
                    writeln!(out, "no more pages")?;
                }
                render::write_grid(out, &self.board, self.today)?;
            }
            ShellCommand::Show => render::write_grid(out, &self.board, self.today)?,
            ShellCommand::Toggle(student, day) => {
                let date = self.date(day);
                match self.board.click_cell(student, date)? {
                    CellClick::Staged(status) => {
                        writeln!(out, "{} {}: {} (unsaved)", student, date, status)?
                    }
                    CellClick::Cleared => writeln!(out, "{} {}: cleared", student, date)?,
                    CellClick::Selected(true) => writeln!(out, "{} selected", student)?,
                    CellClick::Selected(false) => writeln!(out, "{} deselected", student)?,
                }
            }
            ShellCommand::Mark(student, day, status) => {
                let date = self.date(day);
                if self.board.grid().is_some_and(|g| !g.contains(student)) {
                    return Err(CoreError::UnknownStudent(student).into());
                }
                self.board.stage(student, date, status);
                writeln!(out, "{} {}: {} (unsaved)", student, date, status)?;
            }
            ShellCommand::AllPresent(day) => {
                let date = self.date(day);
                let staged = self.board.quick_all_present(date);
                writeln!(out, "marked {} present on {}", staged, date)?;
            }
            ShellCommand::Bulk(bulk) => self.execute_bulk(bulk, out)?,
            ShellCommand::Subjects => {
                let subjects = self.client.subjects().list().await?;
                let matching: Vec<&schoolbook_core::Subject> = subjects.iter().collect();
                render::write_records(out, &matching, "")?;
                self.board
                    .set_subjects(subjects.iter().filter_map(|s| s.subject_id).collect());
            }
            ShellCommand::Subject(day, subject) => {
                let date = self.date(day);
                self.board.select_subject(date, subject);
                writeln!(out, "{} recorded against subject {}", date, subject)?;
            }
            ShellCommand::Summary => render::write_summary(out, &self.board.summary())?,
            ShellCommand::Detail(student, day) => {
                let date = self.date(day);
                let detail = self.board.day_detail(student, date)?;
                render::write_day_detail(out, &detail)?;
            }
            ShellCommand::Submit => self.submit(out).await?,
            ShellCommand::Discard => {
                let dropped = self.board.overlay().len();
                self.board.discard();
                writeln!(out, "discarded {} unsaved change(s)", dropped)?;
            }
            ShellCommand::Quit { force } => {
                if self.board.has_unsaved_changes() && !force {
                    writeln!(
                        out,
                        "{} unsaved change(s): submit, discard, or quit! to leave anyway",
                        self.board.overlay().len()
                    )?;
                } else {
                    return Ok(Flow::Quit);
                }
            }
        }
        Ok(Flow::Continue)
    }

    fn execute_bulk<W: Write>(&mut self, command: BulkCommand, out: &mut W) -> Result<(), ShellError> {
        match command {
            BulkCommand::Open(day) => {
                let date = self.date(day);
                self.board.toggle_bulk_panel(date);
                match self.board.bulk().open_date() {
                    Some(open) => writeln!(
                        out,
                        "bulk panel open for {} ({} selected, {})",
                        open,
                        self.board.bulk().selected_count(open),
                        self.board.bulk().status(open)
                    )?,
                    None => writeln!(out, "bulk panel closed")?,
                }
            }
            BulkCommand::Select(student) => {
                let date = self.open_bulk_date()?;
                let selected = self.board.toggle_bulk_student(date, student);
                writeln!(
                    out,
                    "{} {} ({} selected)",
                    student,
                    if selected { "selected" } else { "deselected" },
                    self.board.bulk().selected_count(date)
                )?;
            }
            BulkCommand::All => {
                let date = self.open_bulk_date()?;
                self.board.bulk_select_all(date);
                writeln!(out, "{} selected", self.board.bulk().selected_count(date))?;
            }
            BulkCommand::None => {
                let date = self.open_bulk_date()?;
                self.board.bulk_deselect_all(date);
                writeln!(out, "0 selected")?;
            }
            BulkCommand::Status(status) => {
                let date = self.open_bulk_date()?;
                self.board.set_bulk_status(date, status);
                writeln!(out, "bulk status {}", status)?;
            }
            BulkCommand::Apply => {
                let date = self.open_bulk_date()?;
                let staged = self.board.apply_bulk(date);
                writeln!(out, "staged {} cell(s) on {}", staged, date)?;
            }
            BulkCommand::Cancel => {
                self.board.cancel_bulk();
                writeln!(out, "bulk panel closed")?;
            }
        }
        Ok(())
    }

    /// Send every staged edit, clear the overlay whatever the outcome and
    /// reload the grid.
    async fn submit<W: Write>(&mut self, out: &mut W) -> Result<(), ShellError> {
        let writes = self.board.pending_writes(&self.defaults);
        if writes.is_empty() {
            writeln!(out, "nothing to submit")?;
            return Ok(());
        }

        let result = self.client.attendance().submit_all(writes).await;
        let dropped = self.board.finish_commit();
        let reloaded = self.reload().await;

        let saved = match result {
            Ok(saved) => saved,
            Err(e) => {
                if let Err(reload) = &reloaded {
                    tracing::warn!(error = %reload, "grid reload after failed commit failed");
                }
                return Err(e.into());
            }
        };
        writeln!(out, "saved {} of {} change(s)", saved, dropped)?;
        reloaded
    }

    /// Parse and run one line, reporting errors instead of returning them.
    pub async fn handle_line<W: Write>(&mut self, line: &str, out: &mut W) -> io::Result<Flow> {
        let outcome = match ShellCommand::parse(line) {
            Ok(Some(command)) => self.execute(command, out).await,
            Ok(None) => Ok(Flow::Continue),
            Err(e) => Err(e),
        };
        match outcome {
            Ok(flow) => Ok(flow),
            Err(ShellError::Io(e)) => Err(e),
            Err(e) => {
                tracing::debug!(line, error = %e, "command failed");
                self.board.record_error(e.to_string());
                writeln!(out, "error: {}", e)?;
                Ok(Flow::Continue)
            }
        }
    }

    /// Read commands until `quit` or end of input.
    pub async fn run<R: BufRead, W: Write>(&mut self, input: R, out: &mut W) -> io::Result<()> {
        writeln!(out, "Type help for commands.")?;
        render::write_grid(out, &self.board, self.today)?;
        write!(out, "{}", PROMPT)?;
        out.flush()?;

        for line in input.lines() {
            let line = line?;
            if self.handle_line(&line, out).await? == Flow::Quit {
                return Ok(());
            }
            write!(out, "{}", PROMPT)?;
            out.flush()?;
        }

        if self.board.has_unsaved_changes() {
            tracing::warn!(
                pending = self.board.overlay().len(),
                "input closed with unsaved attendance changes"
            );
        }
        writeln!(out)?;
        Ok(())
    }
}
