//! Application shell state and UI loop
//!
//! The shell owns the three pieces of session state: the selected view, the
//! dashboard snapshot, and the loading flag. Views read that state and hand
//! back typed [`ViewCommand`]s; the event loop here is the only writer.

use crate::consts::cli_consts;
use crate::events::{Event as WorkerEvent, EventType, Outcome, Worker};
use crate::models::DashboardSnapshot;
use crate::runtime::ApiCommand;
use crate::ui::command::ViewCommand;
use crate::ui::components;
use crate::ui::loading::render_loading;
use crate::ui::views;
use crate::ui::views::analytics::AnalyticsState;
use crate::ui::views::logger::LoggerState;
use crate::ui::views::sources::SourcesState;
use crossterm::event::{self, Event, KeyCode, KeyEvent};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::{Frame, Terminal, backend::Backend};
use std::collections::VecDeque;
use tokio::sync::{broadcast, mpsc};

/// The four views of the application. Closed set; navigation is total over it.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum View {
    Dashboard,
    Sources,
    Logger,
    Analytics,
}

impl View {
    pub const ALL: [View; 4] = [
        View::Dashboard,
        View::Sources,
        View::Logger,
        View::Analytics,
    ];

    pub fn title(self) -> &'static str {
        match self {
            View::Dashboard => "Dashboard",
            View::Sources => "Sources",
            View::Logger => "Logger",
            View::Analytics => "Analytics",
        }
    }

    pub fn index(self) -> usize {
        match self {
            View::Dashboard => 0,
            View::Sources => 1,
            View::Logger => 2,
            View::Analytics => 3,
        }
    }

    fn next(self) -> View {
        View::ALL[(self.index() + 1) % View::ALL.len()]
    }

    fn previous(self) -> View {
        View::ALL[(self.index() + View::ALL.len() - 1) % View::ALL.len()]
    }
}

/// Today's date in the service's YYYY-MM-DD convention.
fn today() -> String {
    chrono::Local::now().format("%Y-%m-%d").to_string()
}

/// Application state
pub struct App {
    /// Service base URL, shown on the loading screen.
    pub base_url: String,

    /// The currently selected view. Resets to Dashboard on every start.
    pub view: View,

    /// The most recent dashboard snapshot. Replaced wholesale on each
    /// successful fetch; `None` until the first one resolves.
    pub snapshot: Option<DashboardSnapshot>,

    /// True from startup (or a refresh trigger) until a snapshot fetch
    /// resolves. While set, only the loading screen is drawn.
    pub loading: bool,

    /// Set by the Quit command; the run loop exits on the next turn.
    pub should_quit: bool,

    /// Receives events from the API runtime.
    event_receiver: mpsc::Receiver<WorkerEvent>,

    /// Sends commands into the API runtime.
    command_sender: mpsc::Sender<ApiCommand>,

    /// Broadcasts shutdown signal to background tasks.
    shutdown_sender: broadcast::Sender<()>,

    /// Queue of events waiting to be processed
    pending_events: VecDeque<WorkerEvent>,

    /// Recent events for the activity log panel
    pub activity_logs: VecDeque<WorkerEvent>,

    /// Per-view state
    pub sources_view: SourcesState,
    pub logger_view: LoggerState,
    pub analytics_view: AnalyticsState,
}

impl App {
    /// Creates a new instance of the application.
    pub fn new(
        base_url: String,
        event_receiver: mpsc::Receiver<WorkerEvent>,
        command_sender: mpsc::Sender<ApiCommand>,
        shutdown_sender: broadcast::Sender<()>,
    ) -> Self {
        Self {
            base_url,
            view: View::Dashboard,
            snapshot: None,
            // Set before the first frame so the indicator is visible for the
            // whole span of the startup fetch.
            loading: true,
            should_quit: false,
            event_receiver,
            command_sender,
            shutdown_sender,
            pending_events: VecDeque::new(),
            activity_logs: VecDeque::new(),
            sources_view: SourcesState::default(),
            logger_view: LoggerState {
                date: today(),
                ..Default::default()
            },
            analytics_view: AnalyticsState::default(),
        }
    }

    /// Commands to issue once at startup.
    fn initial_commands(&self) -> Vec<ApiCommand> {
        vec![ApiCommand::FetchSnapshot]
    }

    /// Queue an incoming worker event for the next update pass.
    pub fn add_event(&mut self, event: WorkerEvent) {
        self.pending_events.push_back(event);
    }

    /// Add an event to activity logs with size limit
    fn add_to_activity_log(&mut self, event: WorkerEvent) {
        if self.activity_logs.len() >= cli_consts::MAX_ACTIVITY_LOGS {
            self.activity_logs.pop_front();
        }
        self.activity_logs.push_back(event);
    }

    /// Drain queued events into shell state. Returns follow-up commands the
    /// caller must forward to the API runtime (mutations trigger re-fetches).
    pub fn update(&mut self) -> Vec<ApiCommand> {
        let mut follow_ups = Vec::new();
        while let Some(event) = self.pending_events.pop_front() {
            self.add_to_activity_log(event.clone());
            self.apply_event(event, &mut follow_ups);
        }
        follow_ups
    }

    fn apply_event(&mut self, event: WorkerEvent, follow_ups: &mut Vec<ApiCommand>) {
        // A failed snapshot fetch clears the loading flag so the UI can never
        // stay stuck loading; the snapshot keeps its previous value.
        if event.worker == Worker::SnapshotFetcher && event.event_type == EventType::Error {
            self.loading = false;
        }

        let Some(outcome) = event.outcome else {
            return;
        };
        match outcome {
            Outcome::SnapshotFetched(snapshot) => {
                // Overlapping refreshes race; the last to resolve wins.
                self.snapshot = Some(*snapshot);
                self.loading = false;
                self.clamp_selections();
            }
            Outcome::SourcesFetched(sources) => {
                self.logger_view.sources = sources;
            }
            Outcome::LogsFetched { date: _, logs } => {
                self.logger_view.logs = logs;
                self.clamp_selections();
            }
            Outcome::AnalyticsFetched(report) => {
                self.analytics_view.report = Some(*report);
            }
            Outcome::MutationApplied => {
                // A write landed; re-run the refresh sequence and re-fetch
                // the data behind the current view.
                self.loading = true;
                follow_ups.push(ApiCommand::FetchSnapshot);
                match self.view {
                    View::Logger => follow_ups.push(ApiCommand::FetchLogs {
                        date: Some(self.logger_view.date.clone()),
                    }),
                    View::Analytics => follow_ups.push(ApiCommand::FetchAnalytics {
                        period: self.analytics_view.period,
                    }),
                    View::Dashboard | View::Sources => {}
                }
            }
        }
    }

    /// Keep table selections inside their rows after data shrinks.
    fn clamp_selections(&mut self) {
        let source_rows = self
            .snapshot
            .as_ref()
            .map(|s| s.sources.len())
            .unwrap_or(0);
        self.sources_view.selected = self
            .sources_view
            .selected
            .min(source_rows.saturating_sub(1));
        self.logger_view.selected = self
            .logger_view
            .selected
            .min(self.logger_view.logs.len().saturating_sub(1));
    }

    /// Whether the current view's form or confirmation dialog owns the keyboard.
    fn view_is_capturing(&self) -> bool {
        match self.view {
            View::Sources => self.sources_view.is_capturing(),
            View::Logger => self.logger_view.is_capturing(),
            View::Dashboard | View::Analytics => false,
        }
    }

    /// Translate a key press into a command. Global keys first, unless the
    /// current view has a form open and is capturing text input.
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<ViewCommand> {
        if self.view_is_capturing() {
            return self.route_key_to_view(key);
        }
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => Some(ViewCommand::Quit),
            KeyCode::Char('r') => Some(ViewCommand::Refresh),
            KeyCode::Char('1') => Some(ViewCommand::Navigate(View::Dashboard)),
            KeyCode::Char('2') => Some(ViewCommand::Navigate(View::Sources)),
            KeyCode::Char('3') => Some(ViewCommand::Navigate(View::Logger)),
            KeyCode::Char('4') => Some(ViewCommand::Navigate(View::Analytics)),
            KeyCode::Tab => Some(ViewCommand::Navigate(self.view.next())),
            KeyCode::BackTab => Some(ViewCommand::Navigate(self.view.previous())),
            _ => self.route_key_to_view(key),
        }
    }

    fn route_key_to_view(&mut self, key: KeyEvent) -> Option<ViewCommand> {
        match self.view {
            View::Dashboard => None,
            View::Sources => self.sources_view.handle_key(key, self.snapshot.as_ref()),
            View::Logger => self.logger_view.handle_key(key),
            View::Analytics => self.analytics_view.handle_key(key),
        }
    }

    /// Execute a view command against shell state. Returns the API commands
    /// to forward to the runtime.
    pub fn apply_command(&mut self, command: ViewCommand) -> Vec<ApiCommand> {
        match command {
            ViewCommand::Navigate(view) => {
                self.view = view;
                self.entry_commands(view)
            }
            ViewCommand::Refresh => {
                // Same sequence as the startup trigger; the selected view is
                // untouched.
                self.loading = true;
                vec![ApiCommand::FetchSnapshot]
            }
            ViewCommand::Api(api_command) => vec![api_command],
            ViewCommand::Quit => {
                self.should_quit = true;
                Vec::new()
            }
        }
    }

    /// Data fetches a view needs when it is entered.
    fn entry_commands(&mut self, view: View) -> Vec<ApiCommand> {
        match view {
            View::Dashboard | View::Sources => Vec::new(),
            View::Logger => {
                self.logger_view.date = today();
                vec![
                    ApiCommand::FetchLogs {
                        date: Some(self.logger_view.date.clone()),
                    },
                    ApiCommand::FetchSources,
                ]
            }
            View::Analytics => vec![ApiCommand::FetchAnalytics {
                period: self.analytics_view.period,
            }],
        }
    }
}

/// Runs the application UI in a loop, handling events and rendering the
/// current view.
pub async fn run<B: Backend>(terminal: &mut Terminal<B>, mut app: App) -> std::io::Result<()> {
    for command in app.initial_commands() {
        let _ = app.command_sender.send(command).await;
    }

    // UI event loop
    loop {
        // Queue all incoming events for processing
        while let Ok(event) = app.event_receiver.try_recv() {
            app.add_event(event);
        }

        // Apply queued events and forward any re-fetches they trigger
        let follow_ups = app.update();
        for command in follow_ups {
            let _ = app.command_sender.send(command).await;
        }

        terminal.draw(|f| render(f, &app))?;

        // Poll for key events
        if event::poll(cli_consts::ui::key_poll_interval())? {
            if let Event::Key(key) = event::read()? {
                // Skip events that are not KeyEventKind::Press
                if key.kind == event::KeyEventKind::Release {
                    continue;
                }
                if let Some(view_command) = app.handle_key(key) {
                    for command in app.apply_command(view_command) {
                        let _ = app.command_sender.send(command).await;
                    }
                }
            }
        }

        if app.should_quit {
            // Send shutdown signal to background tasks
            let _ = app.shutdown_sender.send(());
            return Ok(());
        }
    }
}

/// Renders the current frame: the loading screen exclusively while a fetch is
/// outstanding, otherwise the nav bar, the selected view, and the activity log.
fn render(f: &mut Frame, app: &App) {
    if app.loading {
        render_loading(f, &app.base_url);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Fill(1),
            Constraint::Length(8),
            Constraint::Length(2),
        ])
        .margin(1)
        .split(f.area());

    components::nav::render_nav(f, chunks[0], app.view);

    match app.view {
        View::Dashboard => {
            views::dashboard::render_dashboard(f, chunks[1], app.snapshot.as_ref())
        }
        View::Sources => {
            views::sources::render_sources(f, chunks[1], &app.sources_view, app.snapshot.as_ref())
        }
        View::Logger => views::logger::render_logger(f, chunks[1], &app.logger_view),
        View::Analytics => views::analytics::render_analytics(f, chunks[1], &app.analytics_view),
    }

    components::activity_log::render_activity_log(f, chunks[2], &app.activity_logs);
    components::footer::render_footer(f, chunks[3], app.view);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error_classifier::LogLevel;
    use crate::models::GlobalSummary;
    use ratatui::backend::TestBackend;

    fn test_app() -> App {
        let (_event_sender, event_receiver) = mpsc::channel(16);
        let (command_sender, _command_receiver) = mpsc::channel(16);
        let (shutdown_sender, _) = broadcast::channel(1);
        App::new(
            "http://localhost:5000".to_string(),
            event_receiver,
            command_sender,
            shutdown_sender,
        )
    }

    fn sample_snapshot(total_earned: f64) -> DashboardSnapshot {
        DashboardSnapshot {
            total_earned,
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

    fn snapshot_event(total_earned: f64) -> WorkerEvent {
        WorkerEvent::snapshot_with_level(
            "Dashboard snapshot updated".to_string(),
            EventType::Success,
            LogLevel::Info,
        )
        .with_outcome(Outcome::SnapshotFetched(Box::new(sample_snapshot(
            total_earned,
        ))))
    }

    fn snapshot_error_event() -> WorkerEvent {
        WorkerEvent::snapshot_with_level(
            "Failed to fetch dashboard: maintenance".to_string(),
            EventType::Error,
            LogLevel::Warn,
        )
    }

    fn press(app: &mut App, code: KeyCode) -> Vec<ApiCommand> {
        match app.handle_key(KeyEvent::from(code)) {
            Some(command) => app.apply_command(command),
            None => Vec::new(),
        }
    }

    #[test]
    fn test_initial_state() {
        let app = test_app();
        assert_eq!(app.view, View::Dashboard);
        assert!(app.snapshot.is_none());
        assert!(app.loading);
        assert!(matches!(
            app.initial_commands().as_slice(),
            [ApiCommand::FetchSnapshot]
        ));
    }

    #[test]
    fn test_view_tracks_most_recent_navigation() {
        let mut app = test_app();
        for view in [View::Analytics, View::Sources, View::Logger, View::Sources] {
            app.apply_command(ViewCommand::Navigate(view));
        }
        assert_eq!(app.view, View::Sources);
        // Navigation leaves the snapshot and loading flag alone
        assert!(app.snapshot.is_none());
        assert!(app.loading);
    }

    #[test]
    fn test_successful_fetch_replaces_snapshot_and_clears_loading() {
        let mut app = test_app();
        app.add_event(snapshot_event(42000.0));
        let follow_ups = app.update();

        assert!(follow_ups.is_empty());
        assert!(!app.loading);
        assert_eq!(app.snapshot.as_ref().unwrap().total_earned, 42000.0);
    }

    #[test]
    fn test_failed_first_fetch_leaves_snapshot_absent() {
        let mut app = test_app();
        app.add_event(snapshot_error_event());
        app.update();

        assert!(!app.loading);
        assert!(app.snapshot.is_none());
    }

    #[test]
    fn test_failed_refresh_keeps_prior_snapshot() {
        let mut app = test_app();
        app.add_event(snapshot_event(42000.0));
        app.update();

        press(&mut app, KeyCode::Char('r'));
        assert!(app.loading);

        app.add_event(snapshot_error_event());
        app.update();
        assert!(!app.loading);
        assert_eq!(app.snapshot.as_ref().unwrap().total_earned, 42000.0);
    }

    #[test]
    fn test_racing_refreshes_last_resolved_wins() {
        let mut app = test_app();
        app.add_event(snapshot_event(42000.0));
        app.add_event(snapshot_event(55000.0));
        app.update();

        assert_eq!(app.snapshot.as_ref().unwrap().total_earned, 55000.0);
        assert!(!app.loading);
    }

    #[test]
    fn test_refresh_does_not_reset_view() {
        let mut app = test_app();
        app.add_event(snapshot_event(42000.0));
        app.update();
        app.apply_command(ViewCommand::Navigate(View::Sources));

        let commands = press(&mut app, KeyCode::Char('r'));
        assert!(matches!(commands.as_slice(), [ApiCommand::FetchSnapshot]));
        assert!(app.loading);
        assert_eq!(app.view, View::Sources);

        app.add_event(snapshot_event(60000.0));
        app.update();
        assert_eq!(app.view, View::Sources);
        assert_eq!(app.snapshot.as_ref().unwrap().total_earned, 60000.0);
    }

    #[test]
    fn test_number_keys_and_tab_navigate() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char('3'));
        assert_eq!(app.view, View::Logger);
        press(&mut app, KeyCode::Char('1'));
        assert_eq!(app.view, View::Dashboard);
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.view, View::Sources);
        press(&mut app, KeyCode::BackTab);
        assert_eq!(app.view, View::Dashboard);
        press(&mut app, KeyCode::BackTab);
        assert_eq!(app.view, View::Analytics);
    }

    #[test]
    fn test_logger_entry_fetches_logs_and_sources() {
        let mut app = test_app();
        let commands = press(&mut app, KeyCode::Char('3'));

        assert_eq!(commands.len(), 2);
        match &commands[0] {
            ApiCommand::FetchLogs { date: Some(date) } => {
                assert_eq!(*date, today());
            }
            other => panic!("expected logs fetch, got {:?}", other),
        }
        assert!(matches!(commands[1], ApiCommand::FetchSources));
    }

    #[test]
    fn test_analytics_entry_fetches_report() {
        let mut app = test_app();
        let commands = press(&mut app, KeyCode::Char('4'));
        assert!(matches!(
            commands.as_slice(),
            [ApiCommand::FetchAnalytics { .. }]
        ));
    }

    #[test]
    fn test_mutation_triggers_snapshot_refetch() {
        let mut app = test_app();
        app.add_event(snapshot_event(42000.0));
        app.update();

        app.add_event(
            WorkerEvent::mutator_with_level(
                "Income source 'Writing' created (#1)".to_string(),
                EventType::Success,
                LogLevel::Info,
            )
            .with_outcome(Outcome::MutationApplied),
        );
        let follow_ups = app.update();

        assert!(app.loading);
        assert!(matches!(follow_ups.as_slice(), [ApiCommand::FetchSnapshot]));
    }

    #[test]
    fn test_mutation_on_logger_view_also_refetches_logs() {
        let mut app = test_app();
        app.apply_command(ViewCommand::Navigate(View::Logger));
        app.add_event(
            WorkerEvent::mutator_with_level(
                "Logged 'Chapter draft' for 2026-08-07".to_string(),
                EventType::Success,
                LogLevel::Info,
            )
            .with_outcome(Outcome::MutationApplied),
        );
        let follow_ups = app.update();

        assert_eq!(follow_ups.len(), 2);
        assert!(matches!(follow_ups[0], ApiCommand::FetchSnapshot));
        assert!(matches!(follow_ups[1], ApiCommand::FetchLogs { .. }));
    }

    #[test]
    fn test_quit_key_requests_shutdown() {
        let mut app = test_app();
        let commands = press(&mut app, KeyCode::Char('q'));
        assert!(commands.is_empty());
        assert!(app.should_quit);
    }

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_loading_screen_suppresses_view_content() {
        let app = test_app();
        let backend = TestBackend::new(80, 30);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| render(f, &app)).unwrap();

        let content = buffer_text(&terminal);
        assert!(content.contains("Contacting http://localhost:5000"));
        assert!(!content.contains("ACTIVITY LOG"));
        assert!(!content.contains("[1] Dashboard"));
    }

    #[test]
    fn test_loaded_frame_shows_nav_view_and_activity_log() {
        let mut app = test_app();
        app.add_event(snapshot_event(42000.0));
        app.update();

        let backend = TestBackend::new(80, 30);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| render(f, &app)).unwrap();

        let content = buffer_text(&terminal);
        assert!(!content.contains("Contacting"));
        assert!(content.contains("[1] Dashboard"));
        assert!(content.contains("THIS MONTH"));
        assert!(content.contains("ACTIVITY LOG"));
    }
}
