use std::io::{self, Stdout};
use std::time::Duration;

use crossterm::event::{Event as CrosstermEvent, EventStream, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use futures::StreamExt;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::{Result, TixError};
use crate::event::Event;

pub type Tui = Terminal<CrosstermBackend<Stdout>>;

/// Switch to the alternate screen in raw mode. Any failure is an
/// [`TixError::Init`]; partial setup is undone before returning.
pub fn init() -> Result<Tui> {
    let entered = execute!(io::stdout(), EnterAlternateScreen)
        .and_then(|_| enable_raw_mode())
        .and_then(|_| Terminal::new(CrosstermBackend::new(io::stdout())));

    entered.map_err(|e| {
        let _ = restore();
        TixError::Init(e.to_string())
    })
}

pub fn restore() -> io::Result<()> {
    execute!(io::stdout(), LeaveAlternateScreen)?;
    disable_raw_mode()
}

/// Keep key presses; drop releases, repeats, mouse, focus and resize events.
/// Resizes need no event since every frame is laid out from the current size.
fn translate(event: CrosstermEvent) -> Option<Event> {
    match event {
        CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => Some(Event::Key(key)),
        _ => None,
    }
}

async fn pump(tx: UnboundedSender<Event>, cancel: CancellationToken, render_rate: Duration) {
    let mut input = EventStream::new();
    let mut frames = tokio::time::interval(render_rate);

    loop {
        let event = tokio::select! {
            _ = cancel.cancelled() => break,
            _ = frames.tick() => Some(Event::Render),
            read = input.next() => match read {
                Some(Ok(raw)) => translate(raw),
                Some(Err(e)) => {
                    debug!(error = %e, "terminal read failed");
                    None
                }
                None => break,
            },
        };

        if let Some(event) = event {
            if tx.send(event).is_err() {
                break;
            }
        }
    }
}

/// Terminal input and render ticks, read on a background task.
pub struct EventHandler {
    rx: UnboundedReceiver<Event>,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl EventHandler {
    pub fn new(render_rate: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        let task = tokio::spawn(pump(tx, cancel.clone(), render_rate));
        Self { rx, cancel, task }
    }

    pub async fn next(&mut self) -> Option<Event> {
        self.rx.recv().await
    }
}

impl Drop for EventHandler {
    fn drop(&mut self) {
        self.cancel.cancel();
        self.task.abort();
    }
}
