//! Command-line configuration.
//!
//! Every connection setting can also come from the environment, so the
//! shell can be started with a bare `schoolbook shell`.

use clap::{Args, Parser, Subcommand};
use schoolbook_client::{Error, SchoolClient};
use schoolbook_core::{CommitDefaults, DEFAULT_PAGE_SIZE, SubjectId, TeacherId};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:3000/api";

#[derive(Debug, Parser)]
#[command(name = "schoolbook")]
#[command(version)]
#[command(about = "Student records and weekly attendance for the school backend", long_about = None)]
pub struct Cli {
    /// Root of the backend REST API
    #[arg(long, env = "SCHOOLBOOK_API_URL", default_value = DEFAULT_API_URL, global = true)]
    pub api_url: String,

    /// Bearer token sent with every request
    #[arg(long, env = "SCHOOLBOOK_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, env = "SCHOOLBOOK_TIMEOUT_SECS", default_value_t = 30, global = true)]
    pub timeout_secs: u64,

    /// Teacher recorded on submitted attendance
    #[arg(long, env = "SCHOOLBOOK_TEACHER_ID", default_value_t = 1, global = true)]
    pub teacher_id: u64,

    /// Subject used for attendance when none is known for the day
    #[arg(long, env = "SCHOOLBOOK_SUBJECT_ID", default_value_t = 1, global = true)]
    pub subject_id: u64,

    /// Students per page in the attendance grid
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE, global = true)]
    pub page_size: usize,

    /// Log at info level (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Client for the configured backend.
    pub fn client(&self) -> Result<SchoolClient, Error> {
        SchoolClient::with_options(
            self.api_url.as_str(),
            self.api_key.as_deref(),
            Duration::from_secs(self.timeout_secs.max(1)),
        )
    }

    /// Fallback ids for attendance writes.
    pub fn commit_defaults(&self) -> CommitDefaults {
        CommitDefaults {
            teacher: TeacherId(self.teacher_id),
            subject: SubjectId(self.subject_id),
        }
    }

    /// Default log directive when RUST_LOG is unset.
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "info" } else { "warn" }
    }
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Manage students
    Students {
        #[command(subcommand)]
        action: StudentAction,
    },

    /// Manage teachers
    Teachers {
        #[command(subcommand)]
        action: RecordAction,
    },

    /// Manage subjects
    Subjects {
        #[command(subcommand)]
        action: ExportableAction,
    },

    /// Manage classes
    Classes {
        #[command(subcommand)]
        action: ExportableAction,
    },

    /// Stored attendance records
    Attendance {
        #[command(subcommand)]
        action: AttendanceAction,
    },

    /// Show headline counts and the attendance rate
    Dashboard {
        /// Also print the attendance breakdown
        #[arg(long)]
        detailed: bool,
    },

    /// Interactive weekly attendance grid
    Shell(GridArgs),
}

/// Operations every resource supports.
#[derive(Debug, Subcommand)]
pub enum RecordAction {
    /// List records, optionally filtered
    List {
        /// Case-insensitive text to match against names
        #[arg(short, long, default_value = "")]
        search: String,
    },

    /// Show one record as JSON
    Show { id: u64 },

    /// Create a record from a JSON file
    Create {
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Replace a record from a JSON file
    Update {
        id: u64,
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Delete a record
    Delete {
        id: u64,
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Debug, Subcommand)]
pub enum ExportableAction {
    #[command(flatten)]
    Record(RecordAction),

    /// Download the Excel export
    Export {
        /// Directory the workbook is written to
        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,
    },
}

#[derive(Debug, Subcommand)]
pub enum StudentAction {
    /// List students, optionally filtered by text and gender
    Roster {
        #[arg(short, long, default_value = "")]
        search: String,
        /// Exact gender to keep ("All" keeps everyone)
        #[arg(short, long, default_value = schoolbook_core::filter::ALL_GENDERS)]
        gender: String,
    },

    #[command(flatten)]
    Record(ExportableAction),

    /// Upload an Excel workbook of students
    Import {
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Download the blank upload template
    Template {
        #[arg(short, long, default_value = "student_template.xlsx")]
        out: PathBuf,
    },

    /// Delete every student
    DeleteAll {
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Debug, Subcommand)]
pub enum AttendanceAction {
    #[command(flatten)]
    Record(RecordAction),

    /// Print one week of a class's grid
    Grid(GridArgs),
}

#[derive(Debug, Clone, Args)]
pub struct GridArgs {
    /// Class to open
    #[arg(short, long)]
    pub class: Option<u64>,

    /// Any date in the week to open (YYYY-MM-DD); defaults to this week
    #[arg(short, long)]
    pub week_of: Option<String>,
}
