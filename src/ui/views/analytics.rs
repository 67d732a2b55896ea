//! Analytics view
//!
//! Renders the report for the selected period: income trend bar chart, mood
//! vs earnings table, and per-source performance. The report is fetched when
//! the view is entered and again whenever the period is toggled.

use crate::models::{AnalyticsPeriod, AnalyticsReport, fmt_yen};
use crate::runtime::ApiCommand;
use crate::ui::command::ViewCommand;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::prelude::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{
    Bar, BarChart, BarGroup, Block, BorderType, Borders, Cell, Paragraph, Row, Table,
};

/// Analytics view state, owned by the shell.
#[derive(Debug, Default)]
pub struct AnalyticsState {
    pub period: AnalyticsPeriod,
    pub report: Option<AnalyticsReport>,
}

impl AnalyticsState {
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<ViewCommand> {
        match key.code {
            KeyCode::Char('p') => {
                self.period = self.period.toggled();
                self.report = None;
                Some(ViewCommand::Api(ApiCommand::FetchAnalytics {
                    period: self.period,
                }))
            }
            _ => None,
        }
    }
}

pub fn render_analytics(f: &mut Frame, area: Rect, state: &AnalyticsState) {
    let Some(report) = &state.report else {
        let placeholder = Paragraph::new(format!("Fetching {} analytics...", state.period))
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::DarkGray))
            .block(
                Block::default()
                    .title("ANALYTICS")
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded),
            );
        f.render_widget(placeholder, area);
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Fill(1)])
        .split(area);

    render_trend_chart(f, chunks[0], state.period, report);

    let lower = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(28),
            Constraint::Percentage(32),
            Constraint::Percentage(40),
        ])
        .split(chunks[1]);

    render_mood_table(f, lower[0], report);
    render_volume_table(f, lower[1], report);
    render_performance_table(f, lower[2], report);
}

/// Shorten "YYYY-MM-DD" to "MM-DD" for bar labels.
fn day_label(date: &str) -> String {
    date.get(5..10).map(str::to_string).unwrap_or_else(|| date.to_string())
}

fn render_trend_chart(f: &mut Frame, area: Rect, period: AnalyticsPeriod, report: &AnalyticsReport) {
    let bars: Vec<Bar> = report
        .daily_income_trend
        .iter()
        .map(|point| {
            Bar::default()
                .value(point.daily_total.max(0.0).round() as u64)
                .label(Line::from(day_label(&point.date)))
        })
        .collect();

    let chart = BarChart::default()
        .data(BarGroup::default().bars(&bars))
        .bar_width(6)
        .bar_gap(1)
        .bar_style(Style::default().fg(Color::Cyan))
        .value_style(
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .block(
            Block::default()
                .title(format!("DAILY INCOME ({})", period))
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(Color::Cyan)),
        );

    f.render_widget(chart, area);
}

fn render_mood_table(f: &mut Frame, area: Rect, report: &AnalyticsReport) {
    let header = Row::new(vec!["Mood", "Avg earned", "Logs"]).style(
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    );

    let rows: Vec<Row> = report
        .mood_productivity_correlation
        .iter()
        .map(|bucket| {
            Row::new(vec![
                Cell::from("*".repeat(bucket.mood_score.clamp(0, 5) as usize)),
                Cell::from(fmt_yen(bucket.avg_earnings)),
                Cell::from(bucket.count.to_string()),
            ])
            .style(Style::default().fg(Color::White))
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(7),
            Constraint::Fill(1),
            Constraint::Length(6),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .title("MOOD VS EARNINGS")
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Cyan)),
    );

    f.render_widget(table, area);
}

fn render_volume_table(f: &mut Frame, area: Rect, report: &AnalyticsReport) {
    let header = Row::new(vec!["Source", "Tasks", "Total"]).style(
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    );

    let rows: Vec<Row> = report
        .weekly_task_volume
        .iter()
        .map(|volume| {
            Row::new(vec![
                Cell::from(volume.name.clone()),
                Cell::from(
                    volume
                        .total_tasks
                        .map(|t| t.to_string())
                        .unwrap_or_else(|| "-".to_string()),
                ),
                Cell::from(fmt_yen(volume.total_amount)),
            ])
            .style(Style::default().fg(Color::White))
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Fill(1),
            Constraint::Length(7),
            Constraint::Length(12),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .title("TASK VOLUME")
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Cyan)),
    );

    f.render_widget(table, area);
}

fn render_performance_table(f: &mut Frame, area: Rect, report: &AnalyticsReport) {
    let header = Row::new(vec!["Source", "Earned", "Goal", "Days", "Avg mood"]).style(
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    );

    let rows: Vec<Row> = report
        .income_performance
        .iter()
        .map(|perf| {
            Row::new(vec![
                Cell::from(perf.name.clone()),
                Cell::from(fmt_yen(perf.earned)),
                Cell::from(fmt_yen(perf.goal_amount)),
                Cell::from(perf.task_days.to_string()),
                Cell::from(
                    perf.avg_mood
                        .map(|m| format!("{:.1}", m))
                        .unwrap_or_else(|| "-".to_string()),
                ),
            ])
            .style(Style::default().fg(Color::White))
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Fill(1),
            Constraint::Length(12),
            Constraint::Length(12),
            Constraint::Length(6),
            Constraint::Length(9),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .title("SOURCE PERFORMANCE")
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Cyan)),
    );

    f.render_widget(table, area);
}
