mod action;
mod app;
mod auth;
mod cache;
mod catalog;
mod config;
mod cursor;
mod error;
mod event;
mod jira;
mod source;
mod tui;
mod ui;

use std::panic;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use clap::Parser;
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::action::Action;
use crate::app::App;
use crate::config::Config;
use crate::error::Result;
use crate::event::Event;
use crate::jira::Jira;
use crate::source::TicketSource;
use crate::tui::EventHandler;

/// Browse Jira saved searches from the terminal.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Config file to use instead of ~/.config/tix/config.toml
    #[arg(long)]
    config: Option<PathBuf>,

    /// Jira base URL, overriding the config file and JIRA_ENDPOINT
    #[arg(long)]
    endpoint: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging();

    match start(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("tix: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Log to ~/.cache/tix/tix.log; stderr would draw over the TUI.
fn init_logging() {
    let Some(dir) = dirs::cache_dir().map(|d| d.join("tix")) else {
        return;
    };
    if std::fs::create_dir_all(&dir).is_err() {
        return;
    }
    let Ok(file) = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("tix.log"))
    else {
        return;
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false),
        )
        .init();
}

async fn start(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load(),
    };

    let endpoint = config.jira.resolve_endpoint(cli.endpoint.as_deref())?;
    let token = auth::load_token(&config.jira);
    if token.is_none() {
        warn!("no Jira token found; sending unauthenticated requests");
    }

    let jira = Jira::new(endpoint, &config.jira, token)?;
    match jira.current_user().await {
        Ok(user) => info!(user = %user, "authenticated with Jira"),
        Err(e) => warn!(error = %e, "could not verify Jira credentials"),
    }

    // Set up panic hook to restore terminal
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = tui::restore();
        original_hook(panic_info);
    }));

    let result = run(config, Arc::new(jira)).await;

    // Restore terminal
    let restored = tui::restore();

    result?;
    restored?;
    Ok(())
}

async fn run(config: Config, source: Arc<dyn TicketSource>) -> Result<()> {
    let mut terminal = tui::init()?;

    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();

    let mut app = App::new(config.catalog(), source, action_tx.clone());

    let render_rate = Duration::from_millis(16); // ~60fps
    let mut events = EventHandler::new(render_rate);

    loop {
        tokio::select! {
            Some(event) = events.next() => {
                if event.is_quit() {
                    break;
                }

                match event {
                    Event::Render => {
                        terminal.draw(|frame| ui::render(frame, &app))?;
                    }
                    _ => {
                        let action = app.handle_event(event);
                        if !matches!(action, Action::None) {
                            action_tx.send(action).ok();
                        }
                    }
                }
            }
            Some(action) = action_rx.recv() => {
                app.update(action);
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
