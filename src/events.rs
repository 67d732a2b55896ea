//! Event System
//!
//! Events are the diagnostic channel between the API runtime and the UI: every
//! background request reports its outcome here, and the activity log renders
//! whatever passes the display filter. Fetched payloads travel back to the
//! shell as typed [`Outcome`]s attached to their event.

use crate::error_classifier::LogLevel;
use crate::logging::should_log_with_env;
use crate::models::{AnalyticsReport, DailyLog, DashboardSnapshot, IncomeSource};
use chrono::Local;
use std::fmt::Display;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Worker {
    /// Background task that fetches the dashboard snapshot.
    SnapshotFetcher,
    /// Background task that fetches per-view data (sources, logs, analytics).
    ViewFetcher,
    /// Background task that applies create/update/delete operations.
    Mutator,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, strum::Display)]
pub enum EventType {
    Success,
    Error,
    Refresh,
    Waiting,
}

/// Typed payload carried back to the shell by a completed request.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// A dashboard fetch resolved successfully.
    SnapshotFetched(Box<DashboardSnapshot>),
    /// The income-source list was fetched.
    SourcesFetched(Vec<IncomeSource>),
    /// Daily logs were fetched for the given date filter.
    LogsFetched {
        date: Option<String>,
        logs: Vec<DailyLog>,
    },
    /// An analytics report was fetched.
    AnalyticsFetched(Box<AnalyticsReport>),
    /// A create/update/delete call succeeded; the shell should re-fetch.
    MutationApplied,
}

#[derive(Debug, Clone)]
pub struct Event {
    pub worker: Worker,
    pub msg: String,
    pub timestamp: String,
    pub event_type: EventType,
    pub log_level: LogLevel,
    /// Data payload for the shell, present on Success events that fetched something.
    pub outcome: Option<Outcome>,
}

impl Event {
    fn new(worker: Worker, msg: String, event_type: EventType, log_level: LogLevel) -> Self {
        Self {
            worker,
            msg,
            timestamp: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            event_type,
            log_level,
            outcome: None,
        }
    }

    pub fn snapshot_with_level(msg: String, event_type: EventType, log_level: LogLevel) -> Self {
        Self::new(Worker::SnapshotFetcher, msg, event_type, log_level)
    }

    pub fn view_with_level(msg: String, event_type: EventType, log_level: LogLevel) -> Self {
        Self::new(Worker::ViewFetcher, msg, event_type, log_level)
    }

    pub fn mutator_with_level(msg: String, event_type: EventType, log_level: LogLevel) -> Self {
        Self::new(Worker::Mutator, msg, event_type, log_level)
    }

    /// Attach a data payload for the shell.
    pub fn with_outcome(mut self, outcome: Outcome) -> Self {
        self.outcome = Some(outcome);
        self
    }

    pub fn should_display(&self) -> bool {
        // Always show success events and info level events
        if self.event_type == EventType::Success || self.log_level >= LogLevel::Info {
            return true;
        }
        should_log_with_env(self.log_level)
    }
}

impl Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} [{}] {}", self.event_type, self.timestamp, self.msg)
    }
}
