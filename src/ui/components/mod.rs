// Module declarations
pub mod activity_log;
pub mod footer;
pub mod nav;

use ratatui::layout::Rect;

/// Center a fixed-size popup inside the given area, clamped to fit.
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
