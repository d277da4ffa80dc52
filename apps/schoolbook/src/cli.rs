//! CLI command implementations.
//!
//! Each `cmd_*` function performs one command against the backend and writes
//! its report to `out`, so the binary and the tests drive them the same way.

use crate::config::{
    AttendanceAction, Cli, Commands, ExportableAction, GridArgs, RecordAction, StudentAction,
};
use crate::render::{self, TableRecord};
use crate::shell::Shell;
use chrono::{Local, NaiveDate, Utc};
use schoolbook_client::{ApiResource, Exportable, ResourceApi, SchoolClient};
use schoolbook_core::filter::{Searchable, filter_students, search};
use schoolbook_core::{AttendanceBoard, AttendanceWrite, ClassId, Student, parse_date};
use serde::Serialize;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

pub type CliResult<T = ()> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Dispatch a parsed command line.
pub async fn run<R: BufRead, W: Write>(cli: &Cli, input: R, out: &mut W) -> CliResult {
    let client = cli.client()?;
    tracing::info!(api = client.base_url(), "using backend");

    match &cli.command {
        Commands::Students { action } => match action {
            StudentAction::Roster { search, gender } => {
                cmd_roster(&client, search, gender, out).await
            }
            StudentAction::Record(action) => exportable(client.students(), action, out).await,
            StudentAction::Import { file } => cmd_import(&client, file, out).await,
            StudentAction::Template { out: path } => cmd_template(&client, path, out).await,
            StudentAction::DeleteAll { yes } => cmd_delete_all(&client, *yes, out).await,
        },
        Commands::Teachers { action } => record(client.teachers(), action, out).await,
        Commands::Subjects { action } => exportable(client.subjects(), action, out).await,
        Commands::Classes { action } => exportable(client.classes(), action, out).await,
        Commands::Attendance { action } => match action {
            AttendanceAction::Record(action) => cmd_attendance(&client, action, out).await,
            AttendanceAction::Grid(args) => cmd_grid(&client, args, today(), out).await,
        },
        Commands::Dashboard { detailed } => cmd_dashboard(&client, *detailed, out).await,
        Commands::Shell(args) => {
            let mut shell = Shell::new(&client, today(), cli.commit_defaults(), cli.page_size);
            shell.open(args).await?;
            shell.run(input, out).await?;
            Ok(())
        }
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

async fn record<R, W>(api: ResourceApi<'_, R>, action: &RecordAction, out: &mut W) -> CliResult
where
    R: ApiResource + TableRecord + Searchable,
    R::Id: From<u64>,
    W: Write,
{
    match action {
        RecordAction::List { search } => cmd_list(api, search, out).await,
        RecordAction::Show { id } => cmd_show(api, R::Id::from(*id), out).await,
        RecordAction::Create { file } => cmd_create(api, file, out).await,
        RecordAction::Update { id, file } => cmd_update(api, R::Id::from(*id), file, out).await,
        RecordAction::Delete { id, yes } => cmd_delete(api, R::Id::from(*id), *yes, out).await,
    }
}

async fn exportable<R, W>(api: ResourceApi<'_, R>, action: &ExportableAction, out: &mut W) -> CliResult
where
    R: Exportable + TableRecord + Searchable,
    R::Id: From<u64>,
    W: Write,
{
    match action {
        ExportableAction::Record(action) => record(api, action, out).await,
        ExportableAction::Export { out_dir } => cmd_export(api, out_dir, out).await.map(|_| ()),
    }
}

// =============================================================================
// GENERIC RESOURCE COMMANDS
// =============================================================================

/// List every record matching `term`.
pub async fn cmd_list<R, W>(api: ResourceApi<'_, R>, term: &str, out: &mut W) -> CliResult
where
    R: ApiResource + TableRecord + Searchable,
    W: Write,
{
    let all = api.list().await?;
    let matching = search(&all, term);
    render::write_records(out, &matching, term)?;
    Ok(())
}

/// Print one record as pretty JSON.
pub async fn cmd_show<R: ApiResource, W: Write>(api: ResourceApi<'_, R>, id: R::Id, out: &mut W) -> CliResult {
    let record = api.get(id).await?;
    write_json(out, &record)
}

/// Create a record from a JSON file.
pub async fn cmd_create<R, W>(api: ResourceApi<'_, R>, file: &Path, out: &mut W) -> CliResult
where
    R: ApiResource + TableRecord,
    W: Write,
{
    let record: R = read_record(file)?;
    let created = api.create(&record).await?;
    let id = created
        .id()
        .map_or_else(|| "?".to_string(), |id| id.to_string());
    tracing::info!(id = %id, "{} created", R::NOUN);
    writeln!(out, "Created {} {}", R::NOUN, id)?;
    Ok(())
}

/// Replace a record from a JSON file.
pub async fn cmd_update<R, W>(api: ResourceApi<'_, R>, id: R::Id, file: &Path, out: &mut W) -> CliResult
where
    R: ApiResource + TableRecord,
    W: Write,
{
    let record: R = read_record(file)?;
    api.update(id, &record).await?;
    writeln!(out, "Updated {} {}", R::NOUN, id)?;
    Ok(())
}

/// Delete a record. Refuses without confirmation.
pub async fn cmd_delete<R, W>(api: ResourceApi<'_, R>, id: R::Id, yes: bool, out: &mut W) -> CliResult
where
    R: ApiResource + TableRecord,
    W: Write,
{
    if !yes {
        return Err(format!("refusing to delete {} {} without --yes", R::NOUN, id).into());
    }
    let message = api.delete(id).await?;
    writeln!(
        out,
        "{}",
        message.unwrap_or_else(|| format!("Deleted {} {}", R::NOUN, id))
    )?;
    Ok(())
}

/// Save the Excel export as `{prefix}_{millis}.xlsx` in `out_dir`.
pub async fn cmd_export<R: Exportable, W: Write>(
    api: ResourceApi<'_, R>,
    out_dir: &Path,
    out: &mut W,
) -> CliResult<PathBuf> {
    let bytes = api.export().await?;
    let path = out_dir.join(format!(
        "{}_{}.xlsx",
        R::EXPORT_PREFIX,
        Utc::now().timestamp_millis()
    ));
    std::fs::write(&path, &bytes)?;
    writeln!(out, "Saved {} bytes to {}", bytes.len(), path.display())?;
    Ok(path)
}

fn read_record<R: ApiResource + TableRecord>(file: &Path) -> CliResult<R> {
    let text = std::fs::read_to_string(file)
        .map_err(|e| format!("cannot read {}: {}", file.display(), e))?;
    let record: R = serde_json::from_str(&text)?;
    record.validate()?;
    Ok(record)
}

fn write_json<T: Serialize, W: Write>(out: &mut W, value: &T) -> CliResult {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

// =============================================================================
// STUDENTS
// =============================================================================

/// Students matching `term` and `gender`.
pub async fn cmd_roster<W: Write>(client: &SchoolClient, term: &str, gender: &str, out: &mut W) -> CliResult {
    let all: Vec<Student> = client.students().list().await?;
    let matching = filter_students(&all, term, gender);
    render::write_records(out, &matching, term)?;
    Ok(())
}

/// Upload a workbook and report the per-row outcome.
pub async fn cmd_import<W: Write>(client: &SchoolClient, file: &Path, out: &mut W) -> CliResult {
    let bytes = std::fs::read(file).map_err(|e| format!("cannot read {}: {}", file.display(), e))?;
    let name = file
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("students.xlsx");

    let summary = client.students().upload(name, bytes).await?;
    if let Some(message) = &summary.message {
        writeln!(out, "{}", message)?;
    }
    writeln!(
        out,
        "Rows: {} | created: {} | failed: {}",
        summary.total,
        summary.success_count(),
        summary.failed_count()
    )?;
    for created in &summary.created {
        let id = created
            .student_id
            .map_or_else(|| "?".to_string(), |id| id.to_string());
        writeln!(out, "  + {} {} / {}", id, created.name_en, created.name_kh)?;
    }
    for failed in &summary.failed {
        writeln!(out, "  ! row {}: {}", failed.row, failed.error)?;
    }
    if !summary.success {
        return Err(summary
            .message
            .unwrap_or_else(|| schoolbook_client::GENERIC_ERROR.to_string())
            .into());
    }
    Ok(())
}

pub async fn cmd_template<W: Write>(client: &SchoolClient, path: &Path, out: &mut W) -> CliResult {
    let bytes = client.students().download_template().await?;
    std::fs::write(path, &bytes)?;
    writeln!(out, "Saved template to {}", path.display())?;
    Ok(())
}

pub async fn cmd_delete_all<W: Write>(client: &SchoolClient, yes: bool, out: &mut W) -> CliResult {
    if !yes {
        return Err("refusing to delete every student without --yes".into());
    }
    let message = client.students().delete_all().await?;
    writeln!(
        out,
        "{}",
        message.unwrap_or_else(|| "Deleted all students".to_string())
    )?;
    Ok(())
}

// =============================================================================
// ATTENDANCE + DASHBOARD
// =============================================================================

/// Stored attendance records. `create` takes an attendance write, not a
/// stored record.
pub async fn cmd_attendance<W: Write>(client: &SchoolClient, action: &RecordAction, out: &mut W) -> CliResult {
    let api = client.attendance();
    match action {
        RecordAction::List { search } => {
            let term = schoolbook_core::filter::SearchTerm::new(search);
            let records = api.list().await?;
            let rows: Vec<Vec<String>> = records
                .iter()
                .filter(|r| term.matches_any([r.attendance_date.as_str(), r.status.label()]))
                .map(|r| {
                    vec![
                        r.attendance_id.map_or_else(|| "-".to_string(), |id| id.to_string()),
                        r.student_id.to_string(),
                        r.subject_id.map_or_else(|| "-".to_string(), |id| id.to_string()),
                        r.attendance_date.clone(),
                        r.status.to_string(),
                    ]
                })
                .collect();
            render::write_table(out, &["ID", "Student", "Subject", "Date", "Status"], &rows)?;
            writeln!(out, "{} record(s)", rows.len())?;
        }
        RecordAction::Show { id } => write_json(out, &api.get(*id).await?)?,
        RecordAction::Create { file } => {
            let text = std::fs::read_to_string(file)
                .map_err(|e| format!("cannot read {}: {}", file.display(), e))?;
            let write: AttendanceWrite = serde_json::from_str(&text)?;
            api.create(&write).await?;
            writeln!(
                out,
                "Recorded {} for student {} on {}",
                write.status, write.student_id, write.attendance_date
            )?;
        }
        RecordAction::Update { id, file } => {
            let text = std::fs::read_to_string(file)
                .map_err(|e| format!("cannot read {}: {}", file.display(), e))?;
            let record = serde_json::from_str(&text)?;
            api.update(*id, &record).await?;
            writeln!(out, "Updated attendance {}", id)?;
        }
        RecordAction::Delete { id, yes } => {
            if !yes {
                return Err(format!("refusing to delete attendance {} without --yes", id).into());
            }
            let message = api.delete(*id).await?;
            writeln!(
                out,
                "{}",
                message.unwrap_or_else(|| format!("Deleted attendance {}", id))
            )?;
        }
    }
    Ok(())
}

/// Print one week of a class's grid without entering the shell.
pub async fn cmd_grid<W: Write>(client: &SchoolClient, args: &GridArgs, today: NaiveDate, out: &mut W) -> CliResult {
    let class = args
        .class
        .map(ClassId)
        .ok_or("a class is required (--class)")?;
    let mut board = AttendanceBoard::new(today).with_page_size(usize::MAX);
    board.select_class(class);
    if let Some(raw) = &args.week_of {
        board.go_to_week_of(parse_date(raw)?);
    }

    if let Some((class, start, end)) = board.grid_request() {
        let grid = client.attendance().weekly_grid(class, start, end).await?;
        board.load_grid(grid);
    }
    render::write_grid(out, &board, today)?;
    render::write_summary(out, &board.summary())?;
    Ok(())
}

pub async fn cmd_dashboard<W: Write>(client: &SchoolClient, detailed: bool, out: &mut W) -> CliResult {
    let stats = client.dashboard().stats().await?;
    render::write_dashboard(out, &stats)?;
    if detailed {
        let breakdown = client.dashboard().attendance_stats().await?;
        write_json(out, &breakdown)?;
    }
    Ok(())
}
