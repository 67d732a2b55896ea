use crate::api::error::ApiError;
use crate::models::{
    AnalyticsPeriod, AnalyticsReport, DailyLog, DashboardSnapshot, IncomeSource, NewDailyLog,
    NewIncomeSource,
};

pub(crate) mod client;
pub use client::ApiClient;
pub mod error;

#[cfg(test)]
use mockall::{automock, predicate::*};

/// The operations the income-tracker service exposes to this client.
///
/// Each call resolves the service's `{success, data, error}` envelope into a
/// typed payload or an [`ApiError`].
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait IncomeApi: Send + Sync {
    /// Base URL this client talks to, for display.
    fn base_url(&self) -> String;

    /// Fetch the full dashboard snapshot for the current month.
    async fn get_dashboard(&self) -> Result<DashboardSnapshot, ApiError>;

    /// List all income sources.
    async fn list_sources(&self) -> Result<Vec<IncomeSource>, ApiError>;

    /// Create a new income source, returning its id.
    async fn create_source(&self, source: NewIncomeSource) -> Result<i64, ApiError>;

    /// Update an existing income source.
    async fn update_source(&self, id: i64, source: NewIncomeSource) -> Result<(), ApiError>;

    /// Delete an income source and its related records.
    async fn delete_source(&self, id: i64) -> Result<(), ApiError>;

    /// List daily logs, optionally filtered by date (YYYY-MM-DD) and source.
    async fn list_logs(
        &self,
        date: Option<String>,
        source_id: Option<i64>,
    ) -> Result<Vec<DailyLog>, ApiError>;

    /// Record a daily log, returning its id. The service computes the earned
    /// amount from the source kind.
    async fn create_log(&self, log: NewDailyLog) -> Result<i64, ApiError>;

    /// Delete a daily log.
    async fn delete_log(&self, id: i64) -> Result<(), ApiError>;

    /// Fetch the analytics report for the given period.
    async fn get_analytics(&self, period: AnalyticsPeriod) -> Result<AnalyticsReport, ApiError>;
}
