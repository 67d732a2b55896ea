//! Navigation bar component
//!
//! Renders the view switcher tabs

use crate::ui::app::View;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::prelude::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, BorderType, Borders, Tabs};

/// Render the view switcher reflecting the currently selected view.
pub fn render_nav(f: &mut Frame, area: Rect, view: View) {
    let titles: Vec<Line> = View::ALL
        .iter()
        .map(|v| Line::from(format!("[{}] {}", v.index() + 1, v.title())))
        .collect();

    let tabs = Tabs::new(titles)
        .select(view.index())
        .style(Style::default().fg(Color::Gray))
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .block(
            Block::default()
                .title(format!(" KASEGI v{} ", env!("CARGO_PKG_VERSION")))
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(Color::Cyan)),
        );

    f.render_widget(tabs, area);
}
