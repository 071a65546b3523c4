mod list_pane;
mod queries;
mod tickets;

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::app::{App, Page};
use crate::cache::TicketRows;

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(frame.area());

    render_header(frame, app, chunks[0]);

    match app.page() {
        Page::QueryList => queries::render(frame, app, chunks[1]),
        Page::TicketList => tickets::render(frame, app, chunks[1]),
        Page::TicketDetail => {}
    }

    render_status_bar(frame, app, chunks[2]);
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let title = match app.page() {
        Page::QueryList => "tix - Saved Queries".to_string(),
        Page::TicketList => match app.current_query_name() {
            Some(name) => format!("tix - {}", name),
            None => "tix - Tickets".to_string(),
        },
        Page::TicketDetail => "tix - Ticket".to_string(),
    };

    let header = Paragraph::new(Line::from(vec![Span::styled(
        title,
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )]))
    .style(Style::default().bg(Color::DarkGray));

    frame.render_widget(header, area);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let failed = match (app.page(), app.tickets.state()) {
        (Page::TicketList, TicketRows::Failed(error)) => Some(error),
        _ => None,
    };

    let status = if let Some(error) = failed {
        Line::from(vec![Span::styled(
            format!("Error: {}", error),
            Style::default().fg(Color::Red),
        )])
    } else if app.page() == Page::TicketList && app.tickets.is_loading() {
        Line::from(vec![Span::styled(
            "Loading...",
            Style::default().fg(Color::Yellow),
        )])
    } else {
        let help = match app.page() {
            Page::QueryList => "j/k: nav | l: open query | q: quit",
            Page::TicketList => "j/k: nav | l: back to queries | q: quit",
            Page::TicketDetail => "q: quit",
        };
        Line::from(vec![Span::styled(help, Style::default().fg(Color::Gray))])
    };

    let status_bar = Paragraph::new(status).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(status_bar, area);
}
