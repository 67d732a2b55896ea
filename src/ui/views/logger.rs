//! Daily logging view
//!
//! Today's logs with an add form and delete confirmation. Logs and the source
//! picker list are fetched when the view is entered; the service computes the
//! earned amount from the source kind, so the form only collects raw input.

use crate::models::{DailyLog, IncomeSource, NewDailyLog, SourceKind, ValidationError, fmt_yen};
use crate::runtime::ApiCommand;
use crate::ui::command::ViewCommand;
use crate::ui::components::centered_rect;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::prelude::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Cell, Clear, Padding, Paragraph, Row, Table};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LogField {
    Source,
    TaskName,
    Quantity,
    Progress,
    Mood,
    Note,
}

impl LogField {
    fn next(self) -> Self {
        match self {
            LogField::Source => LogField::TaskName,
            LogField::TaskName => LogField::Quantity,
            LogField::Quantity => LogField::Progress,
            LogField::Progress => LogField::Mood,
            LogField::Mood => LogField::Note,
            LogField::Note => LogField::Source,
        }
    }

    fn previous(self) -> Self {
        match self {
            LogField::Source => LogField::Note,
            LogField::TaskName => LogField::Source,
            LogField::Quantity => LogField::TaskName,
            LogField::Progress => LogField::Quantity,
            LogField::Mood => LogField::Progress,
            LogField::Note => LogField::Mood,
        }
    }
}

/// Add-log form state. The quantity field records a task count for Fixed Unit
/// sources and a yen amount for everything else.
#[derive(Debug, Clone)]
pub struct LogForm {
    field: LogField,
    source_index: usize,
    task_name: String,
    quantity: String,
    progress: String,
    mood: String,
    note: String,
    error: Option<String>,
}

impl LogForm {
    fn empty() -> Self {
        Self {
            field: LogField::Source,
            source_index: 0,
            task_name: String::new(),
            quantity: String::new(),
            progress: "100".to_string(),
            mood: "3".to_string(),
            note: String::new(),
            error: None,
        }
    }

    fn focused_text(&mut self) -> Option<&mut String> {
        match self.field {
            LogField::Source => None,
            LogField::TaskName => Some(&mut self.task_name),
            LogField::Quantity => Some(&mut self.quantity),
            LogField::Progress => Some(&mut self.progress),
            LogField::Mood => Some(&mut self.mood),
            LogField::Note => Some(&mut self.note),
        }
    }

    /// Build and validate the request body against the picked source.
    fn submit(&mut self, sources: &[IncomeSource], date: &str) -> Option<NewDailyLog> {
        let Some(source) = sources.get(self.source_index) else {
            self.error = Some("No income sources yet".to_string());
            return None;
        };

        let (task_count, amount) = if source.kind == SourceKind::FixedUnit {
            match self.quantity.trim().parse::<i64>() {
                Ok(count) => (Some(count), None),
                Err(_) => {
                    self.error = Some(ValidationError::NotANumber("Task count").to_string());
                    return None;
                }
            }
        } else {
            match self.quantity.trim().parse::<f64>() {
                Ok(amount) => (None, Some(amount)),
                Err(_) => {
                    self.error = Some(ValidationError::NotANumber("Amount").to_string());
                    return None;
                }
            }
        };
        let progress_percent = match self.progress.trim().parse::<i64>() {
            Ok(progress) => progress,
            Err(_) => {
                self.error = Some(ValidationError::NotANumber("Progress").to_string());
                return None;
            }
        };
        let mood_score = match self.mood.trim().parse::<i64>() {
            Ok(mood) => mood,
            Err(_) => {
                self.error = Some(ValidationError::NotANumber("Mood score").to_string());
                return None;
            }
        };

        let log = NewDailyLog {
            income_id: source.id,
            date: date.to_string(),
            task_name: self.task_name.trim().to_string(),
            task_count,
            amount,
            progress_percent,
            mood_score,
            note: self.note.trim().to_string(),
        };
        if let Err(e) = log.validate() {
            self.error = Some(e.to_string());
            return None;
        }
        Some(log)
    }
}

#[derive(Debug, Clone, Default)]
pub enum LoggerMode {
    #[default]
    Normal,
    Form(Box<LogForm>),
    ConfirmDelete {
        id: i64,
    },
}

/// Logger view state, owned by the shell.
#[derive(Debug, Default)]
pub struct LoggerState {
    /// Date filter (YYYY-MM-DD), set to today when the view is entered.
    pub date: String,
    pub logs: Vec<DailyLog>,
    /// Source list for the add-form picker, fetched on view entry.
    pub sources: Vec<IncomeSource>,
    pub selected: usize,
    pub mode: LoggerMode,
}

impl LoggerState {
    /// Whether a form or confirmation is consuming keystrokes.
    pub fn is_capturing(&self) -> bool {
        !matches!(self.mode, LoggerMode::Normal)
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Option<ViewCommand> {
        match &mut self.mode {
            LoggerMode::Normal => self.handle_normal_key(key),
            LoggerMode::Form(_) => self.handle_form_key(key),
            LoggerMode::ConfirmDelete { id } => {
                let id = *id;
                match key.code {
                    KeyCode::Char('y') | KeyCode::Enter => {
                        self.mode = LoggerMode::Normal;
                        Some(ViewCommand::Api(ApiCommand::DeleteLog { id }))
                    }
                    KeyCode::Char('n') | KeyCode::Esc => {
                        self.mode = LoggerMode::Normal;
                        None
                    }
                    _ => None,
                }
            }
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent) -> Option<ViewCommand> {
        match key.code {
            KeyCode::Down | KeyCode::Char('j') => {
                if !self.logs.is_empty() {
                    self.selected = (self.selected + 1) % self.logs.len();
                }
                None
            }
            KeyCode::Up | KeyCode::Char('k') => {
                if !self.logs.is_empty() {
                    self.selected = self
                        .selected
                        .checked_sub(1)
                        .unwrap_or(self.logs.len() - 1);
                }
                None
            }
            KeyCode::Char('a') => {
                self.mode = LoggerMode::Form(Box::new(LogForm::empty()));
                None
            }
            KeyCode::Char('d') => {
                if let Some(log) = self.logs.get(self.selected) {
                    self.mode = LoggerMode::ConfirmDelete { id: log.id };
                }
                None
            }
            _ => None,
        }
    }

    fn handle_form_key(&mut self, key: KeyEvent) -> Option<ViewCommand> {
        let LoggerMode::Form(form) = &mut self.mode else {
            return None;
        };
        match key.code {
            KeyCode::Esc => {
                self.mode = LoggerMode::Normal;
                None
            }
            KeyCode::Tab | KeyCode::Down => {
                form.field = form.field.next();
                None
            }
            KeyCode::BackTab | KeyCode::Up => {
                form.field = form.field.previous();
                None
            }
            KeyCode::Left if form.field == LogField::Source => {
                if !self.sources.is_empty() {
                    form.source_index =
                        (form.source_index + self.sources.len() - 1) % self.sources.len();
                }
                None
            }
            KeyCode::Right if form.field == LogField::Source => {
                if !self.sources.is_empty() {
                    form.source_index = (form.source_index + 1) % self.sources.len();
                }
                None
            }
            KeyCode::Enter => {
                let Some(log) = form.submit(&self.sources, &self.date) else {
                    return None;
                };
                self.mode = LoggerMode::Normal;
                Some(ViewCommand::Api(ApiCommand::CreateLog(log)))
            }
            KeyCode::Backspace => {
                if let Some(text) = form.focused_text() {
                    text.pop();
                }
                None
            }
            KeyCode::Char(c) => {
                if let Some(text) = form.focused_text() {
                    text.push(c);
                }
                None
            }
            _ => None,
        }
    }
}

pub fn render_logger(f: &mut Frame, area: Rect, state: &LoggerState) {
    let header = Row::new(vec!["Source", "Task", "Amount", "Progress", "Mood", "Note"]).style(
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    );

    let rows: Vec<Row> = state
        .logs
        .iter()
        .enumerate()
        .map(|(i, log)| {
            let style = if i == state.selected {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };
            Row::new(vec![
                Cell::from(log.source_name.clone().unwrap_or_else(|| "-".to_string())),
                Cell::from(log.task_name.clone()),
                Cell::from(fmt_yen(log.amount)),
                Cell::from(format!("{}%", log.progress_percent)),
                Cell::from("*".repeat(log.mood_score.clamp(0, 5) as usize)),
                Cell::from(log.note.clone().unwrap_or_default()),
            ])
            .style(style)
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(16),
            Constraint::Fill(2),
            Constraint::Length(12),
            Constraint::Length(9),
            Constraint::Length(6),
            Constraint::Fill(1),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .title(format!("DAILY LOGS: {}", state.date))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Cyan)),
    );

    f.render_widget(table, area);

    match &state.mode {
        LoggerMode::Normal => {}
        LoggerMode::Form(form) => render_form(f, area, form, &state.sources),
        LoggerMode::ConfirmDelete { .. } => render_confirm(f, area),
    }
}

fn field_line<'a>(label: &'a str, value: String, focused: bool) -> Line<'a> {
    let marker = if focused { "> " } else { "  " };
    let value_style = if focused {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White)
    };
    Line::from(vec![
        Span::styled(
            format!("{}{:<10}", marker, label),
            Style::default().fg(Color::Gray),
        ),
        Span::styled(value, value_style),
    ])
}

fn render_form(f: &mut Frame, area: Rect, form: &LogForm, sources: &[IncomeSource]) {
    let popup = centered_rect(52, 12, area);
    f.render_widget(Clear, popup);

    let picked = sources.get(form.source_index);
    let source_label = picked
        .map(|s| format!("< {} >", s.name))
        .unwrap_or_else(|| "< no sources >".to_string());
    let quantity_label = match picked.map(|s| s.kind) {
        Some(SourceKind::FixedUnit) => "Tasks",
        _ => "Amount",
    };

    let mut lines = vec![
        field_line("Source", source_label, form.field == LogField::Source),
        field_line(
            "Task",
            form.task_name.clone(),
            form.field == LogField::TaskName,
        ),
        field_line(
            quantity_label,
            form.quantity.clone(),
            form.field == LogField::Quantity,
        ),
        field_line(
            "Progress",
            form.progress.clone(),
            form.field == LogField::Progress,
        ),
        field_line("Mood 1-5", form.mood.clone(), form.field == LogField::Mood),
        field_line("Note", form.note.clone(), form.field == LogField::Note),
        Line::from(Span::styled(
            "[Enter] Save  [Tab] Next field  [Esc] Cancel",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    if let Some(error) = &form.error {
        lines.push(Line::from(Span::styled(
            error.clone(),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )));
    }

    let widget = Paragraph::new(lines).block(
        Block::default()
            .title("LOG TODAY'S WORK")
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Yellow))
            .padding(Padding::horizontal(1)),
    );
    f.render_widget(widget, popup);
}

fn render_confirm(f: &mut Frame, area: Rect) {
    let popup = centered_rect(40, 5, area);
    f.render_widget(Clear, popup);

    let widget = Paragraph::new(vec![
        Line::from("Delete this log entry?"),
        Line::from(Span::styled(
            "[Y] Delete  [N] Cancel",
            Style::default().fg(Color::DarkGray),
        )),
    ])
    .block(
        Block::default()
            .title("CONFIRM DELETE")
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Red))
            .padding(Padding::horizontal(1)),
    );
    f.render_widget(widget, popup);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sources() -> Vec<IncomeSource> {
        vec![
            IncomeSource {
                id: 1,
                name: "Writing".to_string(),
                kind: SourceKind::FixedUnit,
                unit_price: Some(5000.0),
                goal_amount: 50000.0,
                description: None,
                created_at: None,
                updated_at: None,
            },
            IncomeSource {
                id: 2,
                name: "Deliveries".to_string(),
                kind: SourceKind::DailyInput,
                unit_price: None,
                goal_amount: 25000.0,
                description: None,
                created_at: None,
                updated_at: None,
            },
        ]
    }

    fn state_with_sources() -> LoggerState {
        LoggerState {
            date: "2026-08-07".to_string(),
            sources: sources(),
            ..Default::default()
        }
    }

    fn press(state: &mut LoggerState, code: KeyCode) -> Option<ViewCommand> {
        state.handle_key(KeyEvent::from(code))
    }

    fn type_text(state: &mut LoggerState, text: &str) {
        for c in text.chars() {
            press(state, KeyCode::Char(c));
        }
    }

    #[test]
    fn test_fixed_unit_log_submits_task_count() {
        let mut state = state_with_sources();
        press(&mut state, KeyCode::Char('a'));
        press(&mut state, KeyCode::Tab); // Source stays Writing
        type_text(&mut state, "Chapter draft");
        press(&mut state, KeyCode::Tab);
        type_text(&mut state, "2");

        let command = press(&mut state, KeyCode::Enter);
        match command {
            Some(ViewCommand::Api(ApiCommand::CreateLog(log))) => {
                assert_eq!(log.income_id, 1);
                assert_eq!(log.date, "2026-08-07");
                assert_eq!(log.task_count, Some(2));
                assert_eq!(log.amount, None);
                assert_eq!(log.progress_percent, 100);
                assert_eq!(log.mood_score, 3);
            }
            other => panic!("expected create-log command, got {:?}", other),
        }
    }

    #[test]
    fn test_daily_input_log_submits_amount() {
        let mut state = state_with_sources();
        press(&mut state, KeyCode::Char('a'));
        press(&mut state, KeyCode::Right); // pick Deliveries
        press(&mut state, KeyCode::Tab);
        type_text(&mut state, "Evening shift");
        press(&mut state, KeyCode::Tab);
        type_text(&mut state, "4800");

        let command = press(&mut state, KeyCode::Enter);
        match command {
            Some(ViewCommand::Api(ApiCommand::CreateLog(log))) => {
                assert_eq!(log.income_id, 2);
                assert_eq!(log.task_count, None);
                assert_eq!(log.amount, Some(4800.0));
            }
            other => panic!("expected create-log command, got {:?}", other),
        }
    }

    #[test]
    fn test_mood_out_of_range_never_reaches_the_api() {
        let mut state = state_with_sources();
        press(&mut state, KeyCode::Char('a'));
        press(&mut state, KeyCode::Tab);
        type_text(&mut state, "Chapter draft");
        press(&mut state, KeyCode::Tab);
        type_text(&mut state, "1");
        press(&mut state, KeyCode::Tab); // Progress
        press(&mut state, KeyCode::Tab); // Mood
        press(&mut state, KeyCode::Backspace);
        type_text(&mut state, "9");

        assert!(press(&mut state, KeyCode::Enter).is_none());
        match &state.mode {
            LoggerMode::Form(form) => {
                assert_eq!(
                    form.error.as_deref(),
                    Some("Mood score must be between 1 and 5")
                );
            }
            other => panic!("expected form to stay open, got {:?}", other),
        }
    }

    #[test]
    fn test_submit_without_sources_is_rejected() {
        let mut state = LoggerState {
            date: "2026-08-07".to_string(),
            ..Default::default()
        };
        press(&mut state, KeyCode::Char('a'));
        press(&mut state, KeyCode::Tab);
        type_text(&mut state, "Anything");

        assert!(press(&mut state, KeyCode::Enter).is_none());
        match &state.mode {
            LoggerMode::Form(form) => {
                assert_eq!(form.error.as_deref(), Some("No income sources yet"));
            }
            other => panic!("expected form to stay open, got {:?}", other),
        }
    }

    #[test]
    fn test_delete_selected_log_after_confirmation() {
        let mut state = state_with_sources();
        state.logs = vec![DailyLog {
            id: 42,
            income_id: 1,
            date: "2026-08-07".to_string(),
            task_name: "Chapter draft".to_string(),
            task_count: Some(2),
            amount: 10000.0,
            progress_percent: 100,
            mood_score: 4,
            note: None,
            source_name: Some("Writing".to_string()),
            created_at: None,
        }];

        press(&mut state, KeyCode::Char('d'));
        let command = press(&mut state, KeyCode::Char('y'));
        assert!(matches!(
            command,
            Some(ViewCommand::Api(ApiCommand::DeleteLog { id: 42 }))
        ));
    }
}
