//! Typed mirrors of the tracker service's JSON payloads.
//!
//! The service computes all monthly aggregation server-side; the client only
//! deserializes, validates outgoing writes, and formats amounts for display.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use thiserror::Error;

/// How an income source turns work into money.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceKind {
    /// Per-unit work with a fixed price (e.g. articles at ¥5,000 each).
    #[serde(rename = "Fixed Unit")]
    FixedUnit,
    /// Free-form daily earnings entered directly (e.g. delivery work).
    #[serde(rename = "Daily Input")]
    DailyInput,
    /// Recurring income logged as it arrives.
    #[serde(rename = "Passive")]
    Passive,
}

impl SourceKind {
    pub const ALL: [SourceKind; 3] = [
        SourceKind::FixedUnit,
        SourceKind::DailyInput,
        SourceKind::Passive,
    ];
}

impl Display for SourceKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceKind::FixedUnit => write!(f, "Fixed Unit"),
            SourceKind::DailyInput => write!(f, "Daily Input"),
            SourceKind::Passive => write!(f, "Passive"),
        }
    }
}

/// Server-assigned urgency for a source that is behind its monthly pace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    #[default]
    None,
    Low,
    Medium,
    High,
}

/// An income source as stored by the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomeSource {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: SourceKind,
    #[serde(default)]
    pub unit_price: Option<f64>,
    pub goal_amount: f64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// A source plus the monthly progress the dashboard endpoint computes for it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SourceProgress {
    #[serde(flatten)]
    pub source: IncomeSource,
    pub earned_amount: f64,
    #[serde(default)]
    pub completion_rate: f64,
    pub progress_percent: f64,
    #[serde(default)]
    pub task_count: i64,
    #[serde(default = "default_avg_mood")]
    pub avg_mood: f64,
    pub remaining_amount: f64,
    pub required_daily_pace: f64,
    #[serde(default)]
    pub alert_level: AlertLevel,
    #[serde(default)]
    pub is_behind_target: bool,
}

fn default_avg_mood() -> f64 {
    3.0
}

/// Catch-up advice for a source that has fallen behind.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RecoveryPlan {
    pub income_name: String,
    pub shortfall: f64,
    pub catch_up_message: String,
    #[serde(default)]
    pub likelihood: f64,
    #[serde(default)]
    pub severity: AlertLevel,
}

/// Cross-source roll-up shown under the source table.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GlobalSummary {
    #[serde(default)]
    pub total_behind_target: i64,
    #[serde(default)]
    pub avg_completion_rate: f64,
    #[serde(default)]
    pub total_required_daily: f64,
}

/// The full dashboard payload. Replaced wholesale on every successful fetch.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DashboardSnapshot {
    pub total_earned: f64,
    pub total_goal: f64,
    pub overall_progress: f64,
    pub current_day: u32,
    pub days_in_month: u32,
    pub days_remaining: u32,
    #[serde(default)]
    pub sources: Vec<SourceProgress>,
    #[serde(default)]
    pub recovery_plans: Vec<RecoveryPlan>,
    #[serde(default)]
    pub global_summary: GlobalSummary,
}

/// One logged task or earning for a day.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DailyLog {
    pub id: i64,
    pub income_id: i64,
    pub date: String,
    pub task_name: String,
    #[serde(default)]
    pub task_count: Option<i64>,
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub progress_percent: i64,
    #[serde(default = "default_mood_score")]
    pub mood_score: i64,
    #[serde(default)]
    pub note: Option<String>,
    /// Joined in by the service for display; absent on bare rows.
    #[serde(default)]
    pub source_name: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

fn default_mood_score() -> i64 {
    3
}

/// Validation failures for outgoing writes, mirroring the service's rules so
/// a doomed request never leaves the client.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Name is required")]
    MissingName,
    #[error("Task name is required")]
    MissingTaskName,
    #[error("Goal amount must be positive")]
    NonPositiveGoal,
    #[error("Unit price is required for Fixed Unit sources")]
    MissingUnitPrice,
    #[error("Progress must be between 0 and 100")]
    ProgressOutOfRange,
    #[error("Mood score must be between 1 and 5")]
    MoodOutOfRange,
    #[error("{0} must be a number")]
    NotANumber(&'static str),
}

/// Request body for creating or updating an income source.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewIncomeSource {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: SourceKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<f64>,
    pub goal_amount: f64,
    pub description: String,
}

impl NewIncomeSource {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::MissingName);
        }
        if self.goal_amount <= 0.0 {
            return Err(ValidationError::NonPositiveGoal);
        }
        if self.kind == SourceKind::FixedUnit && self.unit_price.is_none() {
            return Err(ValidationError::MissingUnitPrice);
        }
        Ok(())
    }
}

/// Request body for recording a daily log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewDailyLog {
    pub income_id: i64,
    pub date: String,
    pub task_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    pub progress_percent: i64,
    pub mood_score: i64,
    pub note: String,
}

impl NewDailyLog {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.task_name.trim().is_empty() {
            return Err(ValidationError::MissingTaskName);
        }
        if !(0..=100).contains(&self.progress_percent) {
            return Err(ValidationError::ProgressOutOfRange);
        }
        if !(1..=5).contains(&self.mood_score) {
            return Err(ValidationError::MoodOutOfRange);
        }
        Ok(())
    }
}

/// Reporting window for the analytics endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalyticsPeriod {
    #[default]
    Week,
    Month,
}

impl AnalyticsPeriod {
    pub fn as_str(self) -> &'static str {
        match self {
            AnalyticsPeriod::Week => "week",
            AnalyticsPeriod::Month => "month",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            AnalyticsPeriod::Week => AnalyticsPeriod::Month,
            AnalyticsPeriod::Month => AnalyticsPeriod::Week,
        }
    }
}

impl Display for AnalyticsPeriod {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One day's total on the income trend chart.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TrendPoint {
    pub date: String,
    #[serde(default)]
    pub daily_total: f64,
    #[serde(default)]
    pub task_count: i64,
}

/// Average earnings grouped by mood score.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MoodBucket {
    pub mood_score: i64,
    #[serde(default)]
    pub avg_earnings: f64,
    #[serde(default)]
    pub count: i64,
}

/// Task volume per source over the reporting window.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SourceVolume {
    pub name: String,
    #[serde(default)]
    pub total_tasks: Option<i64>,
    #[serde(default)]
    pub total_amount: f64,
}

/// Month-to-date earnings vs goal per source.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SourcePerformance {
    pub name: String,
    pub goal_amount: f64,
    #[serde(default)]
    pub earned: f64,
    #[serde(default)]
    pub task_days: i64,
    #[serde(default)]
    pub avg_mood: Option<f64>,
}

/// The analytics payload for one reporting window.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AnalyticsReport {
    #[serde(default)]
    pub period: AnalyticsPeriod,
    #[serde(default)]
    pub daily_income_trend: Vec<TrendPoint>,
    #[serde(default)]
    pub mood_productivity_correlation: Vec<MoodBucket>,
    #[serde(default)]
    pub weekly_task_volume: Vec<SourceVolume>,
    #[serde(default)]
    pub income_performance: Vec<SourcePerformance>,
}

/// Format a yen amount with grouped thousands, e.g. `¥1,234,567`.
///
/// Fractional yen are rounded; the service stores whole-yen amounts anyway.
pub fn fmt_yen(amount: f64) -> String {
    let rounded = amount.round() as i64;
    let digits = rounded.abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if rounded < 0 {
        format!("-¥{}", grouped)
    } else {
        format!("¥{}", grouped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fmt_yen_groups_thousands() {
        assert_eq!(fmt_yen(0.0), "¥0");
        assert_eq!(fmt_yen(950.0), "¥950");
        assert_eq!(fmt_yen(70000.0), "¥70,000");
        assert_eq!(fmt_yen(1_234_567.0), "¥1,234,567");
        assert_eq!(fmt_yen(-5000.0), "-¥5,000");
        // Rounds fractional yen
        assert_eq!(fmt_yen(999.6), "¥1,000");
    }

    #[test]
    fn test_source_kind_round_trips_service_strings() {
        let json = serde_json::to_string(&SourceKind::FixedUnit).unwrap();
        assert_eq!(json, "\"Fixed Unit\"");
        let kind: SourceKind = serde_json::from_str("\"Daily Input\"").unwrap();
        assert_eq!(kind, SourceKind::DailyInput);
        assert!(serde_json::from_str::<SourceKind>("\"Hourly\"").is_err());
    }

    #[test]
    fn test_dashboard_snapshot_parses_service_payload() {
        // Shape captured from GET /api/dashboard
        let payload = r#"{
            "total_earned": 42000,
            "total_goal": 105000,
            "overall_progress": 40.0,
            "current_day": 12,
            "days_in_month": 31,
            "days_remaining": 19,
            "sources": [{
                "id": 1,
                "name": "Publishing",
                "type": "Fixed Unit",
                "unit_price": 100,
                "goal_amount": 30000,
                "description": "digital publishing",
                "created_at": "2026-08-01 09:00:00",
                "updated_at": "2026-08-01 09:00:00",
                "earned_amount": 12000,
                "completion_rate": 0.4,
                "progress_percent": 40.0,
                "task_count": 8,
                "avg_mood": 3.5,
                "remaining_amount": 18000,
                "required_daily_pace": 947.4,
                "alert_level": "medium",
                "is_behind_target": true
            }],
            "recovery_plans": [{
                "income_name": "Publishing",
                "shortfall": 18000,
                "catch_up_message": "Do 1.5x more daily tasks for 19 days",
                "likelihood": 62.0,
                "severity": "medium"
            }],
            "global_summary": {
                "total_behind_target": 1,
                "avg_completion_rate": 0.4,
                "total_required_daily": 947.4
            }
        }"#;

        let snapshot: DashboardSnapshot = serde_json::from_str(payload).unwrap();
        assert_eq!(snapshot.days_remaining, 19);
        assert_eq!(snapshot.sources.len(), 1);

        let progress = &snapshot.sources[0];
        assert_eq!(progress.source.name, "Publishing");
        assert_eq!(progress.source.kind, SourceKind::FixedUnit);
        assert_eq!(progress.alert_level, AlertLevel::Medium);
        assert!(progress.is_behind_target);
        assert_eq!(snapshot.global_summary.total_behind_target, 1);
        assert_eq!(snapshot.recovery_plans[0].severity, AlertLevel::Medium);
    }

    #[test]
    fn test_daily_log_defaults_for_sparse_rows() {
        // Daily Input rows have no task_count; older rows predate some columns.
        let payload = r#"{
            "id": 7,
            "income_id": 3,
            "date": "2026-08-07",
            "task_name": "Deliveries",
            "amount": 4800
        }"#;

        let log: DailyLog = serde_json::from_str(payload).unwrap();
        assert_eq!(log.task_count, None);
        assert_eq!(log.mood_score, 3);
        assert_eq!(log.progress_percent, 0);
        assert_eq!(log.source_name, None);
    }

    #[test]
    fn test_new_source_validation() {
        let mut source = NewIncomeSource {
            name: "Writing".to_string(),
            kind: SourceKind::FixedUnit,
            unit_price: Some(5000.0),
            goal_amount: 50000.0,
            description: String::new(),
        };
        assert!(source.validate().is_ok());

        source.unit_price = None;
        assert_eq!(source.validate(), Err(ValidationError::MissingUnitPrice));

        source.kind = SourceKind::DailyInput;
        assert!(source.validate().is_ok());

        source.goal_amount = 0.0;
        assert_eq!(source.validate(), Err(ValidationError::NonPositiveGoal));

        source.goal_amount = 25000.0;
        source.name = "   ".to_string();
        assert_eq!(source.validate(), Err(ValidationError::MissingName));
    }

    #[test]
    fn test_new_log_validation() {
        let mut log = NewDailyLog {
            income_id: 1,
            date: "2026-08-07".to_string(),
            task_name: "Chapter draft".to_string(),
            task_count: Some(2),
            amount: None,
            progress_percent: 80,
            mood_score: 4,
            note: String::new(),
        };
        assert!(log.validate().is_ok());

        log.progress_percent = 101;
        assert_eq!(log.validate(), Err(ValidationError::ProgressOutOfRange));

        log.progress_percent = 100;
        log.mood_score = 0;
        assert_eq!(log.validate(), Err(ValidationError::MoodOutOfRange));

        log.mood_score = 5;
        log.task_name = String::new();
        assert_eq!(log.validate(), Err(ValidationError::MissingTaskName));
    }

    #[test]
    fn test_new_source_body_omits_absent_unit_price() {
        let source = NewIncomeSource {
            name: "Deliveries".to_string(),
            kind: SourceKind::DailyInput,
            unit_price: None,
            goal_amount: 25000.0,
            description: "evening shifts".to_string(),
        };
        let body = serde_json::to_value(&source).unwrap();
        assert_eq!(body["type"], "Daily Input");
        assert!(body.get("unit_price").is_none());
    }

    #[test]
    fn test_analytics_report_tolerates_null_aggregates() {
        // SUM/AVG over zero rows come back as null from the service.
        let payload = r#"{
            "period": "week",
            "daily_income_trend": [
                {"date": "2026-08-01", "daily_total": 5000, "task_count": 2}
            ],
            "mood_productivity_correlation": [],
            "weekly_task_volume": [
                {"name": "Deliveries", "total_tasks": null, "total_amount": 9600}
            ],
            "income_performance": [
                {"name": "Writing", "goal_amount": 50000, "earned": 0, "task_days": 0, "avg_mood": null}
            ]
        }"#;

        let report: AnalyticsReport = serde_json::from_str(payload).unwrap();
        assert_eq!(report.period, AnalyticsPeriod::Week);
        assert_eq!(report.weekly_task_volume[0].total_tasks, None);
        assert_eq!(report.income_performance[0].avg_mood, None);
    }
}
