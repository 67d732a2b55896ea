//! Income-source management view
//!
//! Table of sources with an add/edit form and delete confirmation. Rows come
//! from the dashboard snapshot; every mutation is returned to the shell as a
//! typed command and lands on the service through the API runtime.

use crate::models::{
    DashboardSnapshot, NewIncomeSource, SourceKind, SourceProgress, ValidationError, fmt_yen,
};
use crate::runtime::ApiCommand;
use crate::ui::command::ViewCommand;
use crate::ui::components::centered_rect;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::prelude::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Cell, Clear, Padding, Paragraph, Row, Table};

/// Which form field has keyboard focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SourceField {
    Name,
    Kind,
    UnitPrice,
    Goal,
    Description,
}

impl SourceField {
    fn next(self) -> Self {
        match self {
            SourceField::Name => SourceField::Kind,
            SourceField::Kind => SourceField::UnitPrice,
            SourceField::UnitPrice => SourceField::Goal,
            SourceField::Goal => SourceField::Description,
            SourceField::Description => SourceField::Name,
        }
    }

    fn previous(self) -> Self {
        match self {
            SourceField::Name => SourceField::Description,
            SourceField::Kind => SourceField::Name,
            SourceField::UnitPrice => SourceField::Kind,
            SourceField::Goal => SourceField::UnitPrice,
            SourceField::Description => SourceField::Goal,
        }
    }
}

/// Add/edit form state. Numeric fields stay text until submit.
#[derive(Debug, Clone)]
pub struct SourceForm {
    /// Id of the source being edited; `None` when adding.
    editing: Option<i64>,
    field: SourceField,
    name: String,
    kind_index: usize,
    unit_price: String,
    goal_amount: String,
    description: String,
    error: Option<String>,
}

impl SourceForm {
    fn empty() -> Self {
        Self {
            editing: None,
            field: SourceField::Name,
            name: String::new(),
            kind_index: 0,
            unit_price: String::new(),
            goal_amount: String::new(),
            description: String::new(),
            error: None,
        }
    }

    fn prefilled(progress: &SourceProgress) -> Self {
        let source = &progress.source;
        Self {
            editing: Some(source.id),
            field: SourceField::Name,
            name: source.name.clone(),
            kind_index: SourceKind::ALL
                .iter()
                .position(|k| *k == source.kind)
                .unwrap_or(0),
            unit_price: source
                .unit_price
                .map(|p| format!("{}", p))
                .unwrap_or_default(),
            goal_amount: format!("{}", source.goal_amount),
            description: source.description.clone().unwrap_or_default(),
            error: None,
        }
    }

    fn kind(&self) -> SourceKind {
        SourceKind::ALL[self.kind_index % SourceKind::ALL.len()]
    }

    fn focused_text(&mut self) -> Option<&mut String> {
        match self.field {
            SourceField::Name => Some(&mut self.name),
            SourceField::Kind => None,
            SourceField::UnitPrice => Some(&mut self.unit_price),
            SourceField::Goal => Some(&mut self.goal_amount),
            SourceField::Description => Some(&mut self.description),
        }
    }

    /// Build and validate the request body. Errors stay in the form.
    fn submit(&mut self) -> Option<NewIncomeSource> {
        let unit_price = if self.unit_price.trim().is_empty() {
            None
        } else {
            match self.unit_price.trim().parse::<f64>() {
                Ok(price) => Some(price),
                Err(_) => {
                    self.error = Some(ValidationError::NotANumber("Unit price").to_string());
                    return None;
                }
            }
        };
        let goal_amount = match self.goal_amount.trim().parse::<f64>() {
            Ok(goal) => goal,
            Err(_) => {
                self.error = Some(ValidationError::NotANumber("Goal amount").to_string());
                return None;
            }
        };

        let source = NewIncomeSource {
            name: self.name.trim().to_string(),
            kind: self.kind(),
            unit_price,
            goal_amount,
            description: self.description.trim().to_string(),
        };
        if let Err(e) = source.validate() {
            self.error = Some(e.to_string());
            return None;
        }
        Some(source)
    }
}

/// Modal state for the sources view.
#[derive(Debug, Clone, Default)]
pub enum SourcesMode {
    #[default]
    Normal,
    Form(Box<SourceForm>),
    ConfirmDelete {
        id: i64,
        name: String,
    },
}

/// Sources view state, owned by the shell.
#[derive(Debug, Default)]
pub struct SourcesState {
    pub selected: usize,
    pub mode: SourcesMode,
}

impl SourcesState {
    /// Whether a form or confirmation is consuming keystrokes.
    pub fn is_capturing(&self) -> bool {
        !matches!(self.mode, SourcesMode::Normal)
    }

    pub fn handle_key(
        &mut self,
        key: KeyEvent,
        snapshot: Option<&DashboardSnapshot>,
    ) -> Option<ViewCommand> {
        let row_count = snapshot.map(|s| s.sources.len()).unwrap_or(0);
        match &mut self.mode {
            SourcesMode::Normal => self.handle_normal_key(key, snapshot, row_count),
            SourcesMode::Form(_) => self.handle_form_key(key),
            SourcesMode::ConfirmDelete { id, .. } => {
                let id = *id;
                match key.code {
                    KeyCode::Char('y') | KeyCode::Enter => {
                        self.mode = SourcesMode::Normal;
                        Some(ViewCommand::Api(ApiCommand::DeleteSource { id }))
                    }
                    KeyCode::Char('n') | KeyCode::Esc => {
                        self.mode = SourcesMode::Normal;
                        None
                    }
                    _ => None,
                }
            }
        }
    }

    fn handle_normal_key(
        &mut self,
        key: KeyEvent,
        snapshot: Option<&DashboardSnapshot>,
        row_count: usize,
    ) -> Option<ViewCommand> {
        match key.code {
            KeyCode::Down | KeyCode::Char('j') => {
                if row_count > 0 {
                    self.selected = (self.selected + 1) % row_count;
                }
                None
            }
            KeyCode::Up | KeyCode::Char('k') => {
                if row_count > 0 {
                    self.selected = self.selected.checked_sub(1).unwrap_or(row_count - 1);
                }
                None
            }
            KeyCode::Char('a') => {
                self.mode = SourcesMode::Form(Box::new(SourceForm::empty()));
                None
            }
            KeyCode::Char('e') => {
                if let Some(progress) =
                    snapshot.and_then(|s| s.sources.get(self.selected))
                {
                    self.mode = SourcesMode::Form(Box::new(SourceForm::prefilled(progress)));
                }
                None
            }
            KeyCode::Char('d') => {
                if let Some(progress) =
                    snapshot.and_then(|s| s.sources.get(self.selected))
                {
                    self.mode = SourcesMode::ConfirmDelete {
                        id: progress.source.id,
                        name: progress.source.name.clone(),
                    };
                }
                None
            }
            _ => None,
        }
    }

    fn handle_form_key(&mut self, key: KeyEvent) -> Option<ViewCommand> {
        let SourcesMode::Form(form) = &mut self.mode else {
            return None;
        };
        match key.code {
            KeyCode::Esc => {
                self.mode = SourcesMode::Normal;
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
            KeyCode::Left if form.field == SourceField::Kind => {
                form.kind_index =
                    (form.kind_index + SourceKind::ALL.len() - 1) % SourceKind::ALL.len();
                None
            }
            KeyCode::Right if form.field == SourceField::Kind => {
                form.kind_index = (form.kind_index + 1) % SourceKind::ALL.len();
                None
            }
            KeyCode::Enter => {
                let editing = form.editing;
                let Some(source) = form.submit() else {
                    return None;
                };
                self.mode = SourcesMode::Normal;
                match editing {
                    Some(id) => Some(ViewCommand::Api(ApiCommand::UpdateSource { id, source })),
                    None => Some(ViewCommand::Api(ApiCommand::CreateSource(source))),
                }
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

pub fn render_sources(
    f: &mut Frame,
    area: Rect,
    state: &SourcesState,
    snapshot: Option<&DashboardSnapshot>,
) {
    let header = Row::new(vec!["Source", "Kind", "Unit price", "Goal", "Earned"]).style(
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    );

    let sources: &[SourceProgress] = snapshot.map(|s| s.sources.as_slice()).unwrap_or(&[]);
    let rows: Vec<Row> = sources
        .iter()
        .enumerate()
        .map(|(i, progress)| {
            let style = if i == state.selected {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };
            Row::new(vec![
                Cell::from(progress.source.name.clone()),
                Cell::from(progress.source.kind.to_string()),
                Cell::from(
                    progress
                        .source
                        .unit_price
                        .map(fmt_yen)
                        .unwrap_or_else(|| "-".to_string()),
                ),
                Cell::from(fmt_yen(progress.source.goal_amount)),
                Cell::from(fmt_yen(progress.earned_amount)),
            ])
            .style(style)
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Fill(2),
            Constraint::Length(11),
            Constraint::Length(12),
            Constraint::Length(12),
            Constraint::Length(12),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .title("INCOME SOURCES")
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Cyan)),
    );

    f.render_widget(table, area);

    match &state.mode {
        SourcesMode::Normal => {}
        SourcesMode::Form(form) => render_form(f, area, form),
        SourcesMode::ConfirmDelete { name, .. } => render_confirm(f, area, name),
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
            format!("{}{:<12}", marker, label),
            Style::default().fg(Color::Gray),
        ),
        Span::styled(value, value_style),
    ])
}

fn render_form(f: &mut Frame, area: Rect, form: &SourceForm) {
    let popup = centered_rect(52, 11, area);
    f.render_widget(Clear, popup);

    let title = if form.editing.is_some() {
        "EDIT INCOME SOURCE"
    } else {
        "ADD INCOME SOURCE"
    };

    let mut lines = vec![
        field_line("Name", form.name.clone(), form.field == SourceField::Name),
        field_line(
            "Kind",
            format!("< {} >", form.kind()),
            form.field == SourceField::Kind,
        ),
        field_line(
            "Unit price",
            form.unit_price.clone(),
            form.field == SourceField::UnitPrice,
        ),
        field_line(
            "Goal/month",
            form.goal_amount.clone(),
            form.field == SourceField::Goal,
        ),
        field_line(
            "Description",
            form.description.clone(),
            form.field == SourceField::Description,
        ),
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
            .title(title)
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Yellow))
            .padding(Padding::horizontal(1)),
    );
    f.render_widget(widget, popup);
}

fn render_confirm(f: &mut Frame, area: Rect, name: &str) {
    let popup = centered_rect(46, 5, area);
    f.render_widget(Clear, popup);

    let widget = Paragraph::new(vec![
        Line::from(format!("Delete '{}' and all of its logs?", name)),
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
