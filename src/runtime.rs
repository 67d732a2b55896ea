//! Background API runtime
//!
//! A single task owns command intake from the UI; every command is executed on
//! its own spawned task so that overlapping snapshot refreshes stay
//! independent in-flight requests. Whichever resolves last wins, which is the
//! contract the shell expects.

use crate::api::IncomeApi;
use crate::consts::cli_consts;
use crate::error_classifier::{ErrorClassifier, LogLevel};
use crate::events::{Event, EventType, Outcome};
use crate::models::{AnalyticsPeriod, NewDailyLog, NewIncomeSource, fmt_yen};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

/// Requests the shell (or a view, through the shell) can make of the service.
#[derive(Debug, Clone)]
pub enum ApiCommand {
    FetchSnapshot,
    FetchSources,
    FetchLogs { date: Option<String> },
    FetchAnalytics { period: AnalyticsPeriod },
    CreateSource(NewIncomeSource),
    UpdateSource { id: i64, source: NewIncomeSource },
    DeleteSource { id: i64 },
    CreateLog(NewDailyLog),
    DeleteLog { id: i64 },
}

/// Common event sending utilities for background tasks
#[derive(Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
    classifier: ErrorClassifier,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self {
            sender,
            classifier: ErrorClassifier::new(),
        }
    }

    /// Send a generic event
    pub async fn send_event(&self, event: Event) {
        let _ = self.sender.send(event).await;
    }

    /// Pick a log level for a failed API call
    pub fn classify(&self, error: &crate::api::error::ApiError) -> LogLevel {
        self.classifier.classify_fetch_error(error)
    }
}

/// Start the API runtime. Returns the event stream for the UI, the command
/// sender, and the intake task's join handle.
pub fn start_api_runtime(
    api: Arc<dyn IncomeApi>,
    mut shutdown: broadcast::Receiver<()>,
) -> (
    mpsc::Receiver<Event>,
    mpsc::Sender<ApiCommand>,
    JoinHandle<()>,
) {
    let (event_sender, event_receiver) =
        mpsc::channel::<Event>(cli_consts::EVENT_QUEUE_SIZE);
    let (command_sender, mut command_receiver) =
        mpsc::channel::<ApiCommand>(cli_consts::COMMAND_QUEUE_SIZE);

    let sender = EventSender::new(event_sender);
    let handle = tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = shutdown.recv() => break,
                command = command_receiver.recv() => {
                    let Some(command) = command else { break };
                    let api = api.clone();
                    let sender = sender.clone();
                    tokio::spawn(async move {
                        run_command(api, sender, command).await;
                    });
                }
            }
        }
    });

    (event_receiver, command_sender, handle)
}

async fn run_command(api: Arc<dyn IncomeApi>, sender: EventSender, command: ApiCommand) {
    match command {
        ApiCommand::FetchSnapshot => fetch_snapshot(api, sender).await,
        ApiCommand::FetchSources => fetch_sources(api, sender).await,
        ApiCommand::FetchLogs { date } => fetch_logs(api, sender, date).await,
        ApiCommand::FetchAnalytics { period } => fetch_analytics(api, sender, period).await,
        ApiCommand::CreateSource(source) => create_source(api, sender, source).await,
        ApiCommand::UpdateSource { id, source } => update_source(api, sender, id, source).await,
        ApiCommand::DeleteSource { id } => delete_source(api, sender, id).await,
        ApiCommand::CreateLog(log) => create_log(api, sender, log).await,
        ApiCommand::DeleteLog { id } => delete_log(api, sender, id).await,
    }
}

async fn fetch_snapshot(api: Arc<dyn IncomeApi>, sender: EventSender) {
    sender
        .send_event(Event::snapshot_with_level(
            "Requesting dashboard snapshot...".to_string(),
            EventType::Refresh,
            LogLevel::Debug,
        ))
        .await;

    match api.get_dashboard().await {
        Ok(snapshot) => {
            let msg = format!(
                "Dashboard snapshot updated: {} of {} earned",
                fmt_yen(snapshot.total_earned),
                fmt_yen(snapshot.total_goal)
            );
            sender
                .send_event(
                    Event::snapshot_with_level(msg, EventType::Success, LogLevel::Info)
                        .with_outcome(Outcome::SnapshotFetched(Box::new(snapshot))),
                )
                .await;
        }
        Err(e) => {
            let log_level = sender.classify(&e);
            sender
                .send_event(Event::snapshot_with_level(
                    format!("Failed to fetch dashboard: {}", e),
                    EventType::Error,
                    log_level,
                ))
                .await;
        }
    }
}

async fn fetch_sources(api: Arc<dyn IncomeApi>, sender: EventSender) {
    match api.list_sources().await {
        Ok(sources) => {
            sender
                .send_event(
                    Event::view_with_level(
                        format!("Fetched {} income sources", sources.len()),
                        EventType::Success,
                        LogLevel::Debug,
                    )
                    .with_outcome(Outcome::SourcesFetched(sources)),
                )
                .await;
        }
        Err(e) => {
            let log_level = sender.classify(&e);
            sender
                .send_event(Event::view_with_level(
                    format!("Failed to fetch income sources: {}", e),
                    EventType::Error,
                    log_level,
                ))
                .await;
        }
    }
}

async fn fetch_logs(api: Arc<dyn IncomeApi>, sender: EventSender, date: Option<String>) {
    match api.list_logs(date.clone(), None).await {
        Ok(logs) => {
            let scope = date.clone().unwrap_or_else(|| "all days".to_string());
            sender
                .send_event(
                    Event::view_with_level(
                        format!("Fetched {} daily logs for {}", logs.len(), scope),
                        EventType::Success,
                        LogLevel::Debug,
                    )
                    .with_outcome(Outcome::LogsFetched { date, logs }),
                )
                .await;
        }
        Err(e) => {
            let log_level = sender.classify(&e);
            sender
                .send_event(Event::view_with_level(
                    format!("Failed to fetch daily logs: {}", e),
                    EventType::Error,
                    log_level,
                ))
                .await;
        }
    }
}

async fn fetch_analytics(api: Arc<dyn IncomeApi>, sender: EventSender, period: AnalyticsPeriod) {
    match api.get_analytics(period).await {
        Ok(report) => {
            sender
                .send_event(
                    Event::view_with_level(
                        format!("Fetched analytics report ({})", period),
                        EventType::Success,
                        LogLevel::Debug,
                    )
                    .with_outcome(Outcome::AnalyticsFetched(Box::new(report))),
                )
                .await;
        }
        Err(e) => {
            let log_level = sender.classify(&e);
            sender
                .send_event(Event::view_with_level(
                    format!("Failed to fetch analytics: {}", e),
                    EventType::Error,
                    log_level,
                ))
                .await;
        }
    }
}

async fn create_source(api: Arc<dyn IncomeApi>, sender: EventSender, source: NewIncomeSource) {
    let name = source.name.clone();
    match api.create_source(source).await {
        Ok(id) => {
            sender
                .send_event(
                    Event::mutator_with_level(
                        format!("Income source '{}' created (#{})", name, id),
                        EventType::Success,
                        LogLevel::Info,
                    )
                    .with_outcome(Outcome::MutationApplied),
                )
                .await;
        }
        Err(e) => {
            let log_level = sender.classify(&e);
            sender
                .send_event(Event::mutator_with_level(
                    format!("Failed to create income source '{}': {}", name, e),
                    EventType::Error,
                    log_level,
                ))
                .await;
        }
    }
}

async fn update_source(
    api: Arc<dyn IncomeApi>,
    sender: EventSender,
    id: i64,
    source: NewIncomeSource,
) {
    let name = source.name.clone();
    match api.update_source(id, source).await {
        Ok(()) => {
            sender
                .send_event(
                    Event::mutator_with_level(
                        format!("Income source '{}' updated", name),
                        EventType::Success,
                        LogLevel::Info,
                    )
                    .with_outcome(Outcome::MutationApplied),
                )
                .await;
        }
        Err(e) => {
            let log_level = sender.classify(&e);
            sender
                .send_event(Event::mutator_with_level(
                    format!("Failed to update income source '{}': {}", name, e),
                    EventType::Error,
                    log_level,
                ))
                .await;
        }
    }
}

async fn delete_source(api: Arc<dyn IncomeApi>, sender: EventSender, id: i64) {
    match api.delete_source(id).await {
        Ok(()) => {
            sender
                .send_event(
                    Event::mutator_with_level(
                        format!("Income source #{} deleted", id),
                        EventType::Success,
                        LogLevel::Info,
                    )
                    .with_outcome(Outcome::MutationApplied),
                )
                .await;
        }
        Err(e) => {
            let log_level = sender.classify(&e);
            sender
                .send_event(Event::mutator_with_level(
                    format!("Failed to delete income source #{}: {}", id, e),
                    EventType::Error,
                    log_level,
                ))
                .await;
        }
    }
}

async fn create_log(api: Arc<dyn IncomeApi>, sender: EventSender, log: NewDailyLog) {
    let task_name = log.task_name.clone();
    let date = log.date.clone();
    match api.create_log(log).await {
        Ok(_id) => {
            sender
                .send_event(
                    Event::mutator_with_level(
                        format!("Logged '{}' for {}", task_name, date),
                        EventType::Success,
                        LogLevel::Info,
                    )
                    .with_outcome(Outcome::MutationApplied),
                )
                .await;
        }
        Err(e) => {
            let log_level = sender.classify(&e);
            sender
                .send_event(Event::mutator_with_level(
                    format!("Failed to record daily log '{}': {}", task_name, e),
                    EventType::Error,
                    log_level,
                ))
                .await;
        }
    }
}

async fn delete_log(api: Arc<dyn IncomeApi>, sender: EventSender, id: i64) {
    match api.delete_log(id).await {
        Ok(()) => {
            sender
                .send_event(
                    Event::mutator_with_level(
                        format!("Daily log #{} deleted", id),
                        EventType::Success,
                        LogLevel::Info,
                    )
                    .with_outcome(Outcome::MutationApplied),
                )
                .await;
        }
        Err(e) => {
            let log_level = sender.classify(&e);
            sender
                .send_event(Event::mutator_with_level(
                    format!("Failed to delete daily log #{}: {}", id, e),
                    EventType::Error,
                    log_level,
                ))
                .await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockIncomeApi;
    use crate::api::error::ApiError;
    use crate::events::Worker;
    use crate::models::{DashboardSnapshot, GlobalSummary};

    fn sample_snapshot() -> DashboardSnapshot {
        DashboardSnapshot {
            total_earned: 42000.0,
            total_goal: 105000.0,
            overall_progress: 40.0,
            current_day: 12,
            days_in_month: 31,
            days_remaining: 19,
            sources: Vec::new(),
            recovery_plans: Vec::new(),
            global_summary: GlobalSummary::default(),
        }
    }

    async fn next_with_type(
        receiver: &mut mpsc::Receiver<Event>,
        event_type: EventType,
    ) -> Event {
        loop {
            let event = receiver.recv().await.expect("event stream closed");
            if event.event_type == event_type {
                return event;
            }
        }
    }

    #[tokio::test]
    async fn test_snapshot_fetch_success_carries_outcome() {
        let mut api = MockIncomeApi::new();
        api.expect_get_dashboard()
            .returning(|| Ok(sample_snapshot()));

        let (shutdown_sender, _) = broadcast::channel(1);
        let (mut events, commands, _handle) =
            start_api_runtime(Arc::new(api), shutdown_sender.subscribe());

        commands.send(ApiCommand::FetchSnapshot).await.unwrap();

        let refresh = next_with_type(&mut events, EventType::Refresh).await;
        assert_eq!(refresh.worker, Worker::SnapshotFetcher);

        let success = next_with_type(&mut events, EventType::Success).await;
        match success.outcome {
            Some(Outcome::SnapshotFetched(snapshot)) => {
                assert_eq!(snapshot.total_earned, 42000.0);
            }
            other => panic!("expected snapshot outcome, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_snapshot_fetch_failure_has_no_outcome() {
        let mut api = MockIncomeApi::new();
        api.expect_get_dashboard().returning(|| {
            Err(ApiError::Http {
                status: 503,
                message: "maintenance".to_string(),
            })
        });

        let (shutdown_sender, _) = broadcast::channel(1);
        let (mut events, commands, _handle) =
            start_api_runtime(Arc::new(api), shutdown_sender.subscribe());

        commands.send(ApiCommand::FetchSnapshot).await.unwrap();

        let error = next_with_type(&mut events, EventType::Error).await;
        assert_eq!(error.worker, Worker::SnapshotFetcher);
        assert_eq!(error.log_level, LogLevel::Warn);
        assert!(error.outcome.is_none());
    }

    #[tokio::test]
    async fn test_mutation_success_emits_mutation_applied() {
        let mut api = MockIncomeApi::new();
        api.expect_delete_source().returning(|_| Ok(()));

        let (shutdown_sender, _) = broadcast::channel(1);
        let (mut events, commands, _handle) =
            start_api_runtime(Arc::new(api), shutdown_sender.subscribe());

        commands
            .send(ApiCommand::DeleteSource { id: 3 })
            .await
            .unwrap();

        let success = next_with_type(&mut events, EventType::Success).await;
        assert_eq!(success.worker, Worker::Mutator);
        assert!(matches!(success.outcome, Some(Outcome::MutationApplied)));
    }

    #[tokio::test]
    async fn test_shutdown_stops_intake() {
        let api = MockIncomeApi::new();
        let (shutdown_sender, _) = broadcast::channel(1);
        let (_events, _commands, handle) =
            start_api_runtime(Arc::new(api), shutdown_sender.subscribe());

        shutdown_sender.send(()).unwrap();
        handle.await.unwrap();
    }
}
