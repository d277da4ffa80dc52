//! # Dashboard Service

use crate::{Envelope, Error, SchoolClient};
use schoolbook_core::DashboardStats;

const SERVICE: &str = "DashboardService";

/// Access to `/dashboard`.
#[derive(Debug, Clone, Copy)]
pub struct DashboardApi<'a> {
    client: &'a SchoolClient,
}

impl<'a> DashboardApi<'a> {
    pub(crate) fn new(client: &'a SchoolClient) -> Self {
        Self { client }
    }

    /// Headline counts and the overall attendance rate.
    pub async fn stats(&self) -> Result<DashboardStats, Error> {
        let env: Envelope<DashboardStats> = self
            .client
            .envelope(SERVICE, self.client.get("/dashboard/stats"))
            .await?;
        Ok(env.data.unwrap_or_default())
    }

    /// Attendance breakdown, passed through as the backend shapes it.
    pub async fn attendance_stats(&self) -> Result<serde_json::Value, Error> {
        let env: Envelope<serde_json::Value> = self
            .client
            .envelope(SERVICE, self.client.get("/dashboard/attendance-stats"))
            .await?;
        Ok(env.data.unwrap_or(serde_json::Value::Null))
    }
}
