//! # Schoolbook Core - The Logic
//!
//! Deterministic data model and attendance state machine for Schoolbook.
//!
//! The school backend owns every record. This crate models what the client
//! holds between two fetches:
//!
//! - typed models for students, teachers, subjects and classes
//! - the weekly attendance grid as last fetched from the server
//! - the staging overlay of attendance edits not yet written back
//! - bulk selection, week navigation, pagination and search
//!
//! ```text
//! ┌──────────────────┐  load_grid   ┌───────────────────────────────┐
//! │  WeeklyGrid      │ ───────────► │ AttendanceBoard               │
//! │  (server state)  │              │  ├─ StagingOverlay (pending)  │
//! └──────────────────┘              │  ├─ BulkSelection             │
//!                                   │  ├─ Week / Pager / search     │
//!  AttendanceWrite  ◄────────────── │  └─ subject per date          │
//!  (pending_writes)                 └───────────────────────────────┘
//! ```
//!
//! No async, no I/O. All ordered collections are `BTreeMap`/`BTreeSet`.

pub mod board;
pub mod bulk;
pub mod filter;
pub mod grid;
pub mod models;
pub mod overlay;
pub mod pager;
pub mod status;
pub mod summary;
pub mod week;

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub use board::{AttendanceBoard, CellClick, CommitDefaults};
pub use bulk::{BulkSelection, BulkState};
pub use grid::{DailyRecord, GridStudent, WeeklyGrid};
pub use models::{AttendanceWrite, Class, DashboardStats, Student, Subject, Teacher};
pub use overlay::{CellKey, PendingUpdate, StagingOverlay};
pub use pager::{DEFAULT_PAGE_SIZE, Pager};
pub use status::AttendanceStatus;
pub use summary::{DayDetail, RateBand, WeekSummary};
pub use week::Week;

// =============================================================================
// IDENTIFIERS
// =============================================================================

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }
    };
}

id_type!(
    /// Server-assigned student identifier.
    StudentId
);
id_type!(
    /// Server-assigned teacher identifier.
    TeacherId
);
id_type!(
    /// Server-assigned subject identifier.
    SubjectId
);
id_type!(
    /// Server-assigned class identifier.
    ClassId
);

// =============================================================================
// ERROR TYPE
// =============================================================================

/// Errors raised by core state transitions and parsers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// A status string did not start with P, A, L or E.
    #[error("invalid attendance status: {0:?}")]
    InvalidStatus(String),

    /// A date string was not `YYYY-MM-DD`.
    #[error("invalid date {0:?}, expected YYYY-MM-DD")]
    InvalidDate(String),

    /// The student is not part of the loaded grid.
    #[error("student {0} is not in the loaded grid")]
    UnknownStudent(StudentId),

    /// An operation needs grid data that has not been loaded yet.
    #[error("no attendance grid loaded")]
    GridNotLoaded,
}

/// Parse a `YYYY-MM-DD` date.
pub fn parse_date(raw: &str) -> Result<chrono::NaiveDate, CoreError> {
    chrono::NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| CoreError::InvalidDate(raw.to_string()))
}

// =============================================================================
// TESTS
// =============================================================================
