//! # Models
//!
//! Records as the school backend sends and accepts them. Field names follow
//! the backend's JSON exactly; ids are absent on records not yet created.

use crate::status::AttendanceStatus;
use crate::{ClassId, StudentId, SubjectId, TeacherId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A student.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_id: Option<StudentId>,
    /// Name in Khmer script.
    #[serde(default)]
    pub studentname_kh: String,
    /// Name in Latin script.
    #[serde(default)]
    pub studentname_en: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_id: Option<ClassId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_at: Option<String>,
}

impl Student {
    /// Create an unsaved student with both names.
    pub fn new(name_kh: impl Into<String>, name_en: impl Into<String>) -> Self {
        Self {
            studentname_kh: name_kh.into(),
            studentname_en: name_en.into(),
            ..Self::default()
        }
    }
}

/// A teacher.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Teacher {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teacher_id: Option<TeacherId>,
    #[serde(default)]
    pub teachername_kh: String,
    #[serde(default)]
    pub teachername_en: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_at: Option<String>,
}

impl Teacher {
    pub fn new(name_kh: impl Into<String>, name_en: impl Into<String>) -> Self {
        Self {
            teachername_kh: name_kh.into(),
            teachername_en: name_en.into(),
            ..Self::default()
        }
    }
}

/// A subject taught at the school.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject_id: Option<SubjectId>,
    #[serde(default)]
    pub subject_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_at: Option<String>,
}

impl Subject {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            subject_name: name.into(),
            ..Self::default()
        }
    }
}

/// A class (cohort + room + schedule).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Class {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_id: Option<ClassId>,
    #[serde(default)]
    pub class_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_year: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject_id: Option<SubjectId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_at: Option<String>,
}

impl Class {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            class_code: code.into(),
            ..Self::default()
        }
    }
}

/// One attendance record to be written by `POST /attendance/create`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceWrite {
    pub student_id: StudentId,
    pub subject_id: SubjectId,
    pub attendance_date: NaiveDate,
    pub status: AttendanceStatus,
    pub teacher_id: TeacherId,
}

/// Headline numbers from `GET /dashboard/stats`.
///
/// The rate is whatever the backend computed; it is only displayed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    #[serde(default)]
    pub total_students: u64,
    #[serde(default)]
    pub total_teachers: u64,
    #[serde(default)]
    pub total_classes: u64,
    #[serde(default)]
    pub attendance_rate: f64,
}
