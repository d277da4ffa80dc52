//! # Schoolbook Client - The Kit
//!
//! Async client for the school backend's REST API.
//!
//! Every response is wrapped in a `{success, data, message}` envelope. This
//! crate unwraps it, turns failures into [`Error`] and logs them with
//! `tracing`, tagged with the service that failed.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use schoolbook_client::{Error, SchoolClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Error> {
//!     let client = SchoolClient::new("http://localhost:3000/api");
//!
//!     let students = client.students().list().await?;
//!     println!("{} students", students.len());
//!
//!     let stats = client.dashboard().stats().await?;
//!     println!("{} classes", stats.total_classes);
//!     Ok(())
//! }
//! ```
//!
//! ## Endpoints
//!
//! ```text
//! ┌────────────────────┐                ┌───────────────────────────────┐
//! │ schoolbook-client  │  GET  /getall  │ /student /teacher /subject    │
//! │                    │  GET  /{id}    │ /class   /attendance          │
//! │  ResourceApi<R>    │  POST /create  │                               │
//! │  AttendanceApi     │  PUT  /update  │ /attendance/weekly-grid       │
//! │  DashboardApi      │  DELETE        │ /dashboard/stats              │
//! └────────────────────┘  GET  /export  └───────────────────────────────┘
//! ```

pub mod attendance;
pub mod dashboard;
pub mod envelope;
pub mod resource;
pub mod students;

use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;

pub use attendance::{AttendanceApi, AttendanceRecord, COMMIT_FAILED};
pub use dashboard::DashboardApi;
pub use envelope::Envelope;
pub use resource::{ApiResource, Exportable, ResourceApi};
pub use students::{UploadFailure, UploadSuccess, UploadSummary};

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Fallback message when the backend gives none.
pub const GENERIC_ERROR: &str = "An error occurred";

// =============================================================================
// ERROR TYPE
// =============================================================================

/// Errors from the Schoolbook client.
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP request failed before a response arrived.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The backend reported a failure.
    #[error("Server error: {0}")]
    Server(String),
}

impl Error {
    /// Message for display, without the variant prefix.
    pub fn message(&self) -> String {
        match self {
            Error::Server(msg) => msg.clone(),
            other => other.to_string(),
        }
    }
}

#[derive(serde::Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

// =============================================================================
// CLIENT
// =============================================================================

/// HTTP client for the school backend.
///
/// Cheap to clone; clones share one connection pool.
#[derive(Debug, Clone)]
pub struct SchoolClient {
    base_url: String,
    client: reqwest::Client,
}

impl SchoolClient {
    /// Create a client for the API rooted at `base_url`
    /// (e.g. `http://localhost:3000/api`).
    ///
    /// Falls back to a client without the default timeout if the configured
    /// builder fails; the failure is logged.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self::with_options(base_url.clone(), None, DEFAULT_TIMEOUT).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "HTTP client build failed, using defaults without timeout");
            Self {
                base_url: normalize_base(base_url),
                client: reqwest::Client::new(),
            }
        })
    }

    /// Create a client that sends `Authorization: Bearer <api_key>` (when
    /// given) and uses `timeout` for every request.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Server`] if the API key contains invalid header characters,
    /// or [`Error::Http`] if the HTTP client fails to build.
    pub fn with_options(
        base_url: impl Into<String>,
        api_key: Option<&str>,
        timeout: Duration,
    ) -> Result<Self, Error> {
        use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
        let mut headers = HeaderMap::new();
        if let Some(key) = api_key {
            let value = HeaderValue::from_str(&format!("Bearer {}", key))
                .map_err(|e| Error::Server(format!("Invalid API key header: {}", e)))?;
            headers.insert(AUTHORIZATION, value);
        }
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;
        Ok(Self {
            base_url: normalize_base(base_url.into()),
            client,
        })
    }

    /// API root this client talks to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn students(&self) -> ResourceApi<'_, schoolbook_core::Student> {
        ResourceApi::new(self)
    }

    pub fn teachers(&self) -> ResourceApi<'_, schoolbook_core::Teacher> {
        ResourceApi::new(self)
    }

    pub fn subjects(&self) -> ResourceApi<'_, schoolbook_core::Subject> {
        ResourceApi::new(self)
    }

    pub fn classes(&self) -> ResourceApi<'_, schoolbook_core::Class> {
        ResourceApi::new(self)
    }

    pub fn attendance(&self) -> AttendanceApi<'_> {
        AttendanceApi::new(self)
    }

    pub fn dashboard(&self) -> DashboardApi<'_> {
        DashboardApi::new(self)
    }

    // =========================================================================
    // REQUEST PLUMBING
    // =========================================================================

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub(crate) fn get(&self, path: &str) -> RequestBuilder {
        self.client.get(self.url(path))
    }

    pub(crate) fn post(&self, path: &str) -> RequestBuilder {
        self.client.post(self.url(path))
    }

    pub(crate) fn put(&self, path: &str) -> RequestBuilder {
        self.client.put(self.url(path))
    }

    pub(crate) fn delete(&self, path: &str) -> RequestBuilder {
        self.client.delete(self.url(path))
    }

    /// Send a request and turn a non-2xx status into [`Error::Server`].
    pub(crate) async fn send(&self, service: &'static str, req: RequestBuilder) -> Result<Response, Error> {
        let resp = req.send().await.map_err(|e| {
            tracing::error!(service, error = %e, "request failed");
            Error::Http(e)
        })?;

        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let body = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.message)
            .unwrap_or_else(|| {
                format!(
                    "Error Code: {}\nMessage: {}",
                    status.as_u16(),
                    status.canonical_reason().unwrap_or("Unknown")
                )
            });
        tracing::error!(service, status = status.as_u16(), "{}", message);
        Err(Error::Server(message))
    }

    /// Send a request and decode a successful envelope.
    pub(crate) async fn envelope<T: DeserializeOwned>(
        &self,
        service: &'static str,
        req: RequestBuilder,
    ) -> Result<Envelope<T>, Error> {
        let resp = self.send(service, req).await?;
        let bytes = resp.bytes().await?;
        let envelope: Envelope<T> = serde_json::from_slice(&bytes).map_err(|e| {
            tracing::error!(service, error = %e, "malformed response body");
            Error::Json(e)
        })?;
        envelope.into_success(service)
    }

    /// Send a request and return the raw body (Excel exports, templates).
    pub(crate) async fn blob(&self, service: &'static str, req: RequestBuilder) -> Result<Vec<u8>, Error> {
        let resp = self.send(service, req).await?;
        Ok(resp.bytes().await?.to_vec())
    }
}

fn normalize_base(mut base: String) -> String {
    while base.ends_with('/') {
        base.pop();
    }
    base
}
