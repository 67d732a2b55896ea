//! Dashboard view
//!
//! Renders the monthly snapshot: overall progress, per-source pace, recovery
//! plans, and the cross-source summary. Read-only; all data comes from the
//! snapshot the shell owns.

use crate::models::{AlertLevel, DashboardSnapshot, fmt_yen};
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::prelude::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Block, BorderType, Borders, Cell, Gauge, Padding, Paragraph, Row, Table, Wrap,
};

/// Color coding for the server-assigned alert level.
fn alert_color(level: AlertLevel) -> Color {
    match level {
        AlertLevel::None => Color::White,
        AlertLevel::Low => Color::Yellow,
        AlertLevel::Medium => Color::LightRed,
        AlertLevel::High => Color::Red,
    }
}

pub fn render_dashboard(f: &mut Frame, area: Rect, snapshot: Option<&DashboardSnapshot>) {
    // A failed first fetch leaves the snapshot absent; the view still renders.
    let Some(snapshot) = snapshot else {
        let placeholder = Paragraph::new("No dashboard data yet. Press [R] to refresh.")
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::DarkGray))
            .block(
                Block::default()
                    .title("THIS MONTH")
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .padding(Padding::uniform(1)),
            );
        f.render_widget(placeholder, area);
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Fill(1),
            Constraint::Percentage(30),
            Constraint::Length(1),
        ])
        .split(area);

    render_month_gauge(f, chunks[0], snapshot);
    render_source_table(f, chunks[1], snapshot);
    render_recovery_plans(f, chunks[2], snapshot);
    render_global_summary(f, chunks[3], snapshot);
}

/// Overall monthly progress with the day counter in the title.
fn render_month_gauge(f: &mut Frame, area: Rect, snapshot: &DashboardSnapshot) {
    let title = format!(
        "THIS MONTH: day {} of {} ({} days left)",
        snapshot.current_day, snapshot.days_in_month, snapshot.days_remaining
    );
    let label = format!(
        "{} of {} ({:.1}%)",
        fmt_yen(snapshot.total_earned),
        fmt_yen(snapshot.total_goal),
        snapshot.overall_progress
    );

    let gauge = Gauge::default()
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .gauge_style(
            Style::default()
                .fg(Color::LightGreen)
                .add_modifier(Modifier::BOLD),
        )
        .percent((snapshot.overall_progress.clamp(0.0, 100.0)) as u16)
        .label(label);

    f.render_widget(gauge, area);
}

/// Per-source earned vs goal table, colored by alert level.
fn render_source_table(f: &mut Frame, area: Rect, snapshot: &DashboardSnapshot) {
    let header = Row::new(vec![
        "Source", "Kind", "Earned", "Goal", "Progress", "Pace/day", "Mood",
    ])
    .style(
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    );

    let rows: Vec<Row> = snapshot
        .sources
        .iter()
        .map(|progress| {
            let row_color = alert_color(progress.alert_level);
            let marker = if progress.is_behind_target { "!" } else { "" };
            Row::new(vec![
                Cell::from(format!("{}{}", progress.source.name, marker)),
                Cell::from(progress.source.kind.to_string()),
                Cell::from(fmt_yen(progress.earned_amount)),
                Cell::from(fmt_yen(progress.source.goal_amount)),
                Cell::from(format!("{:.1}%", progress.progress_percent)),
                Cell::from(fmt_yen(progress.required_daily_pace)),
                Cell::from(format!("{:.1}", progress.avg_mood)),
            ])
            .style(Style::default().fg(row_color))
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Fill(2),
            Constraint::Length(11),
            Constraint::Length(12),
            Constraint::Length(12),
            Constraint::Length(9),
            Constraint::Length(12),
            Constraint::Length(6),
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
}

/// Catch-up advice for sources behind pace.
fn render_recovery_plans(f: &mut Frame, area: Rect, snapshot: &DashboardSnapshot) {
    let plan_lines: Vec<Line> = if snapshot.recovery_plans.is_empty() {
        vec![Line::from(Span::styled(
            "All sources on pace",
            Style::default().fg(Color::Green),
        ))]
    } else {
        snapshot
            .recovery_plans
            .iter()
            .map(|plan| {
                Line::from(vec![
                    Span::styled(
                        format!("{}: ", plan.income_name),
                        Style::default()
                            .fg(alert_color(plan.severity))
                            .add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(
                        format!("short {} ", fmt_yen(plan.shortfall)),
                        Style::default().fg(alert_color(plan.severity)),
                    ),
                    Span::styled(
                        format!("({:.0}% likely) ", plan.likelihood),
                        Style::default().fg(Color::DarkGray),
                    ),
                    Span::styled(
                        plan.catch_up_message.clone(),
                        Style::default().fg(Color::Gray),
                    ),
                ])
            })
            .collect()
    };

    let plans = Paragraph::new(plan_lines)
        .block(
            Block::default()
                .title("RECOVERY PLANS")
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(Color::Cyan))
                .padding(Padding::uniform(1)),
        )
        .wrap(Wrap { trim: true });

    f.render_widget(plans, area);
}

fn render_global_summary(f: &mut Frame, area: Rect, snapshot: &DashboardSnapshot) {
    let summary = &snapshot.global_summary;
    let text = format!(
        "{} behind target  |  avg completion {:.0}%  |  required {} per day",
        summary.total_behind_target,
        summary.avg_completion_rate * 100.0,
        fmt_yen(summary.total_required_daily)
    );

    let line = Paragraph::new(text)
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Gray));
    f.render_widget(line, area);
}
