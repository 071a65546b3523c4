use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::Line;
use ratatui::Frame;

use crate::app::App;
use crate::cache::TicketRows;
use crate::ui::list_pane::TICKET_PANE;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let name = app.current_query_name().unwrap_or(TICKET_PANE.title);

    match app.tickets.state() {
        TicketRows::Loading => {
            let message = Line::styled("Loading...", Style::default().fg(Color::Yellow));
            TICKET_PANE.render_message(frame, area, name.to_string(), message);
        }
        TicketRows::Failed(error) => {
            let message = Line::styled(
                format!("Error fetching tickets: {}", error),
                Style::default().fg(Color::Red),
            );
            TICKET_PANE.render_message(frame, area, name.to_string(), message);
        }
        TicketRows::Loaded(rows) if rows.is_empty() => {
            let message = Line::styled(
                "No tickets match this query",
                Style::default().fg(Color::Gray),
            );
            TICKET_PANE.render_message(frame, area, format!("{} (0)", name), message);
        }
        TicketRows::Loaded(rows) => {
            let title = format!("{} ({})", name, rows.len());
            let labels = rows.iter().map(String::as_str);
            TICKET_PANE.render_list(frame, area, title, labels, app.selection.ticket_selected);
        }
    }
}
