use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::Line;
use ratatui::Frame;

use crate::app::App;
use crate::ui::list_pane::QUERY_PANE;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let title = format!("{} ({})", QUERY_PANE.title, app.catalog.count());

    if app.catalog.is_empty() {
        let message = Line::styled(
            "No saved queries configured",
            Style::default().fg(Color::Gray),
        );
        QUERY_PANE.render_message(frame, area, title, message);
        return;
    }

    let labels = app.catalog.iter().map(|q| q.name.as_str());
    QUERY_PANE.render_list(frame, area, title, labels, app.selection.query_selected);
}
