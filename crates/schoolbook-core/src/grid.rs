//! # Weekly Grid
//!
//! The roster and recorded attendance for one class over one week, as
//! returned by `GET /attendance/weekly-grid`. This is server state and is
//! never mutated locally; pending edits live in the overlay.

use crate::status::AttendanceStatus;
use crate::{StudentId, SubjectId};
use chrono::NaiveDate;
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// One recorded attendance entry (one subject slot on one day).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyRecord {
    pub status: AttendanceStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject_id: Option<SubjectId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attendance_id: Option<u64>,
}

impl DailyRecord {
    pub fn new(status: AttendanceStatus) -> Self {
        Self {
            status,
            subject_id: None,
            subject_name: None,
            attendance_id: None,
        }
    }
}

/// A student row in the weekly grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridStudent {
    pub student_id: StudentId,
    #[serde(default)]
    pub student_name_kh: String,
    #[serde(default)]
    pub student_name_eng: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    /// Backend-computed rate, e.g. `"92%"`. Sent as a string or a number.
    #[serde(
        default,
        deserialize_with = "rate_as_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub attendance_rate: Option<String>,
    /// Recorded entries per day. Days without records may be absent.
    /// Entries whose status is blank or unknown are dropped on decode.
    #[serde(default, deserialize_with = "known_records")]
    pub daily_attendance: BTreeMap<NaiveDate, Vec<DailyRecord>>,
}

impl GridStudent {
    pub fn new(id: StudentId, name_kh: impl Into<String>, name_eng: impl Into<String>) -> Self {
        Self {
            student_id: id,
            student_name_kh: name_kh.into(),
            student_name_eng: name_eng.into(),
            gender: None,
            attendance_rate: None,
            daily_attendance: BTreeMap::new(),
        }
    }

    /// Add a recorded entry for a day (builder style, used by fixtures).
    #[must_use]
    pub fn with_record(mut self, date: NaiveDate, record: DailyRecord) -> Self {
        self.daily_attendance.entry(date).or_default().push(record);
        self
    }

    /// Recorded entries for a day, empty when none.
    pub fn records(&self, date: NaiveDate) -> &[DailyRecord] {
        self.daily_attendance
            .get(&date)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Status of the first recorded entry for a day.
    pub fn server_status(&self, date: NaiveDate) -> Option<AttendanceStatus> {
        self.records(date).first().map(|r| r.status)
    }

    /// True if the backend reports a male student.
    pub fn is_male(&self) -> bool {
        matches!(self.gender.as_deref(), Some("M" | "Male"))
    }
}

/// The weekly grid payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyGrid {
    #[serde(default)]
    pub students: Vec<GridStudent>,
}

impl WeeklyGrid {
    pub fn new(students: Vec<GridStudent>) -> Self {
        Self { students }
    }

    /// Find a student row by id.
    pub fn student(&self, id: StudentId) -> Option<&GridStudent> {
        self.students.iter().find(|s| s.student_id == id)
    }

    pub fn contains(&self, id: StudentId) -> bool {
        self.student(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.students.len()
    }

    pub fn is_empty(&self) -> bool {
        self.students.is_empty()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RateRepr {
    Text(String),
    Integer(i64),
    Decimal(f64),
}

fn rate_as_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let raw = Option::<RateRepr>::deserialize(deserializer)?;
    Ok(raw.map(|r| match r {
        RateRepr::Text(s) => s,
        RateRepr::Integer(n) => n.to_string(),
        RateRepr::Decimal(n) => n.to_string(),
    }))
}

/// A daily entry as sent, before its status is checked.
#[derive(Deserialize)]
struct RawRecord {
    #[serde(default)]
    status: Option<StatusRepr>,
    #[serde(default)]
    subject_id: Option<SubjectId>,
    #[serde(default)]
    subject_name: Option<String>,
    #[serde(default)]
    attendance_id: Option<u64>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StatusRepr {
    Text(String),
    Other(IgnoredAny),
}

impl RawRecord {
    fn known(self) -> Option<DailyRecord> {
        let status = match self.status? {
            StatusRepr::Text(s) => s.parse().ok()?,
            StatusRepr::Other(_) => return None,
        };
        Some(DailyRecord {
            status,
            subject_id: self.subject_id,
            subject_name: self.subject_name,
            attendance_id: self.attendance_id,
        })
    }
}

fn known_records<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<BTreeMap<NaiveDate, Vec<DailyRecord>>, D::Error> {
    let raw = Option::<BTreeMap<NaiveDate, Vec<RawRecord>>>::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .filter_map(|(date, records)| {
            let known: Vec<DailyRecord> = records.into_iter().filter_map(RawRecord::known).collect();
            (!known.is_empty()).then_some((date, known))
        })
        .collect())
}
