use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListState, Paragraph};
use ratatui::Frame;

/// Size and title of one list-bearing page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListPane {
    pub title: &'static str,
    pub width: u16,
    pub height: u16,
}

pub const QUERY_PANE: ListPane = ListPane {
    title: "Queries",
    width: 80,
    height: 10,
};

pub const TICKET_PANE: ListPane = ListPane {
    title: "Tickets",
    width: 132,
    height: 30,
};

pub fn marked_style() -> Style {
    Style::default()
        .fg(Color::White)
        .bg(Color::Blue)
        .add_modifier(Modifier::BOLD)
}

fn unmarked_style() -> Style {
    Style::default().fg(Color::Yellow)
}

/// One line per label; only the row at `selected` gets [`marked_style`].
pub fn mark_rows<'a>(
    labels: impl IntoIterator<Item = &'a str>,
    selected: usize,
) -> Vec<Line<'a>> {
    labels
        .into_iter()
        .enumerate()
        .map(|(i, label)| {
            let style = if i == selected {
                marked_style()
            } else {
                unmarked_style()
            };
            Line::styled(label, style)
        })
        .collect()
}

impl ListPane {
    /// The pane's rect inside `area`, clipped to fit.
    pub fn area(&self, area: Rect) -> Rect {
        Rect::new(
            area.x,
            area.y,
            self.width.min(area.width),
            self.height.min(area.height),
        )
    }

    fn block(&self, title: String) -> Block<'static> {
        Block::default().borders(Borders::ALL).title(Span::styled(
            format!(" {} ", title),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ))
    }

    pub fn render_list<'a>(
        &self,
        frame: &mut Frame,
        area: Rect,
        title: String,
        labels: impl IntoIterator<Item = &'a str>,
        selected: usize,
    ) {
        let lines = mark_rows(labels, selected);

        // Selection only drives scrolling; marking is done per row above
        let mut state = ListState::default();
        if !lines.is_empty() {
            state.select(Some(selected.min(lines.len() - 1)));
        }

        let list = List::new(lines).block(self.block(title));

        frame.render_stateful_widget(list, self.area(area), &mut state);
    }

    pub fn render_message(&self, frame: &mut Frame, area: Rect, title: String, message: Line) {
        let paragraph = Paragraph::new(message).block(self.block(title));
        frame.render_widget(paragraph, self.area(area));
    }
}
