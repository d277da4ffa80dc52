//! # Attendance Service
//!
//! CRUD on `/attendance`, the weekly grid query and the concurrent commit of
//! staged edits.

use crate::{ApiResource, Envelope, Error, ResourceApi, SchoolClient};
use chrono::NaiveDate;
use schoolbook_core::{AttendanceStatus, AttendanceWrite, ClassId, StudentId, SubjectId, TeacherId, WeeklyGrid};
use serde::{Deserialize, Serialize};
use tokio::task::JoinSet;

const SERVICE: &str = "AttendanceService";

/// Aggregate message when any write of a commit fails.
pub const COMMIT_FAILED: &str = "Failed to save some changes";

/// A stored attendance record as `/attendance/getall` returns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attendance_id: Option<u64>,
    pub student_id: StudentId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject_id: Option<SubjectId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teacher_id: Option<TeacherId>,
    /// Date as the backend formats it (a date or a full timestamp).
    pub attendance_date: String,
    pub status: AttendanceStatus,
}

impl ApiResource for AttendanceRecord {
    type Id = u64;
    const PATH: &'static str = "/attendance";
    const SERVICE: &'static str = SERVICE;

    fn id(&self) -> Option<u64> {
        self.attendance_id
    }
}

/// Access to `/attendance`.
#[derive(Debug, Clone, Copy)]
pub struct AttendanceApi<'a> {
    records: ResourceApi<'a, AttendanceRecord>,
}

impl<'a> AttendanceApi<'a> {
    pub(crate) fn new(client: &'a SchoolClient) -> Self {
        Self {
            records: ResourceApi::new(client),
        }
    }

    pub async fn list(&self) -> Result<Vec<AttendanceRecord>, Error> {
        self.records.list().await
    }

    pub async fn get(&self, id: u64) -> Result<AttendanceRecord, Error> {
        self.records.get(id).await
    }

    pub async fn update(&self, id: u64, record: &AttendanceRecord) -> Result<AttendanceRecord, Error> {
        self.records.update(id, record).await
    }

    pub async fn delete(&self, id: u64) -> Result<Option<String>, Error> {
        self.records.delete(id).await
    }

    /// Write one attendance record.
    pub async fn create(&self, write: &AttendanceWrite) -> Result<(), Error> {
        let client = self.records.client;
        let req = client.post("/attendance/create").json(write);
        let _: Envelope<serde_json::Value> = client.envelope(SERVICE, req).await?;
        Ok(())
    }

    /// Students and their daily records for one class and date range.
    pub async fn weekly_grid(
        &self,
        class: ClassId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<WeeklyGrid, Error> {
        let client = self.records.client;
        let req = client.get("/attendance/weekly-grid").query(&[
            ("classId", class.to_string()),
            ("startDate", start.format("%Y-%m-%d").to_string()),
            ("endDate", end.format("%Y-%m-%d").to_string()),
        ]);
        let env: Envelope<WeeklyGrid> = client.envelope(SERVICE, req).await?;
        let grid = env.data.unwrap_or_default();
        tracing::debug!(class = class.0, students = grid.len(), "weekly grid loaded");
        Ok(grid)
    }

    /// Send every write concurrently and wait for all of them.
    ///
    /// Returns the number written. Any failure makes the whole call fail with
    /// [`COMMIT_FAILED`]; there is no rollback of writes that succeeded.
    pub async fn submit_all(&self, writes: Vec<AttendanceWrite>) -> Result<usize, Error> {
        let total = writes.len();
        let mut set = JoinSet::new();
        for write in writes {
            let client = self.records.client.clone();
            set.spawn(async move { client.attendance().create(&write).await });
        }

        let mut failed = 0usize;
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    tracing::warn!(service = SERVICE, error = %e, "attendance write failed");
                    failed += 1;
                }
                Err(e) => {
                    tracing::warn!(service = SERVICE, error = %e, "attendance task aborted");
                    failed += 1;
                }
            }
        }

        if failed > 0 {
            tracing::error!(service = SERVICE, failed, total, "{}", COMMIT_FAILED);
            return Err(Error::Server(COMMIT_FAILED.to_string()));
        }
        tracing::info!(total, "attendance committed");
        Ok(total)
    }
}
