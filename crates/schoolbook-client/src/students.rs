//! # Student Extras
//!
//! Endpoints only the student resource has: bulk delete, Excel upload and
//! the upload template.

use crate::{Envelope, Error, ResourceApi, SchoolClient};
use reqwest::multipart::{Form, Part};
use schoolbook_core::{Student, StudentId};
use serde::{Deserialize, Serialize};

const SERVICE: &str = "StudentService";

/// Multipart field the backend reads the workbook from.
const UPLOAD_FIELD: &str = "students";

/// A row the backend created from an uploaded workbook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadSuccess {
    pub student_id: Option<StudentId>,
    pub name_en: String,
    pub name_kh: String,
}

/// A row the backend rejected.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UploadFailure {
    pub row: u64,
    pub error: String,
    pub data: serde_json::Value,
}

/// Normalised result of `POST /student/upload`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UploadSummary {
    pub success: bool,
    pub message: Option<String>,
    /// Rows the backend read from the file.
    pub total: u64,
    pub created: Vec<UploadSuccess>,
    pub failed: Vec<UploadFailure>,
}

impl UploadSummary {
    pub fn success_count(&self) -> usize {
        self.created.len()
    }

    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }
}

// The upload endpoint does not use the envelope's `data` field.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawUpload {
    #[serde(default)]
    success: bool,
    message: Option<String>,
    summary: Option<RawUploadCounts>,
    #[serde(default)]
    newly_created: Vec<Student>,
    #[serde(default)]
    errors: Vec<RawUploadError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawUploadCounts {
    #[serde(default)]
    total_rows_in_file: u64,
}

#[derive(Debug, Deserialize)]
struct RawUploadError {
    #[serde(default)]
    row: u64,
    #[serde(default)]
    message: String,
    #[serde(default)]
    data: serde_json::Value,
}

impl From<RawUpload> for UploadSummary {
    fn from(raw: RawUpload) -> Self {
        Self {
            success: raw.success,
            message: raw.message,
            total: raw.summary.map_or(0, |s| s.total_rows_in_file),
            created: raw
                .newly_created
                .into_iter()
                .map(|s| UploadSuccess {
                    student_id: s.student_id,
                    name_en: s.studentname_en,
                    name_kh: s.studentname_kh,
                })
                .collect(),
            failed: raw
                .errors
                .into_iter()
                .map(|e| UploadFailure {
                    row: e.row,
                    error: e.message,
                    data: e.data,
                })
                .collect(),
        }
    }
}

impl ResourceApi<'_, Student> {
    /// Delete every student.
    pub async fn delete_all(&self) -> Result<Option<String>, Error> {
        let client: &SchoolClient = self.client;
        let env: Envelope<serde_json::Value> = client
            .envelope(SERVICE, client.delete("/student/delete-all"))
            .await?;
        Ok(env.message)
    }

    /// Upload an Excel workbook of students.
    ///
    /// Per-row rejections are part of the summary, not an error.
    pub async fn upload(&self, file_name: &str, bytes: Vec<u8>) -> Result<UploadSummary, Error> {
        let client: &SchoolClient = self.client;
        let part = Part::bytes(bytes).file_name(file_name.to_string());
        let form = Form::new().part(UPLOAD_FIELD, part);

        let resp = client
            .send(SERVICE, client.post("/student/upload").multipart(form))
            .await?;
        let bytes = resp.bytes().await?;
        let raw: RawUpload = serde_json::from_slice(&bytes).map_err(|e| {
            tracing::error!(service = SERVICE, error = %e, "malformed upload response");
            Error::Json(e)
        })?;

        let summary = UploadSummary::from(raw);
        tracing::info!(
            total = summary.total,
            created = summary.success_count(),
            failed = summary.failed_count(),
            "student upload processed"
        );
        Ok(summary)
    }

    /// Download the blank upload template.
    pub async fn download_template(&self) -> Result<Vec<u8>, Error> {
        let client: &SchoolClient = self.client;
        client
            .blob(SERVICE, client.get("/student/download-template"))
            .await
    }
}
