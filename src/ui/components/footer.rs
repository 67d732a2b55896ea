//! Footer component
//!
//! Renders key hints for the current view

use crate::ui::app::View;
use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::prelude::{Color, Modifier, Style};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};

/// Render the footer with key hints.
pub fn render_footer(f: &mut Frame, area: Rect, view: View) {
    let view_hints = match view {
        View::Dashboard => "",
        View::Sources => "[A] Add  [E] Edit  [D] Delete  | ",
        View::Logger => "[A] Add  [D] Delete  | ",
        View::Analytics => "[P] Period  | ",
    };
    let footer_text = format!("{}[1-4] Views  [R] Refresh  [Q] Quit", view_hints);

    let footer = Paragraph::new(footer_text)
        .alignment(Alignment::Center)
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .block(
            Block::default()
                .borders(Borders::TOP)
                .border_type(BorderType::Thick),
        );
    f.render_widget(footer, area);
}
