//! Stylist TUI - interactive outfit restyling
//!
//! Pick a photo, describe an outfit, and watch the loading carousel while the
//! model redraws it. Results can be saved with Ctrl+S.

mod app;
mod tui;
mod ui;

use std::fs::OpenOptions;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use stylist_core::config::Config;
use stylist_core::session::PendingAttempt;
use stylist_core::styling::StyleClient;
use tokio::sync::mpsc::UnboundedSender;
use tracing::info;

use crate::app::{Action, App};
use crate::tui::{AppEvent, EventHandler, Tui};

const TICK_RATE: Duration = Duration::from_millis(250);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    let config = Config::load()?;
    init_file_logging()?;

    // Checked before raw mode so the message lands on a normal terminal
    let client = match StyleClient::from_config(&config.api) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Error [{}]: {}", e.code(), e);
            if let Some(suggestion) = e.suggestion() {
                eprintln!("  Suggestion: {}", suggestion);
            }
            std::process::exit(1);
        }
    };

    let mut app = App::new(&config);

    tui::install_panic_hook();
    let mut terminal = tui::init()?;

    let result = run_app(&mut terminal, &mut app, &client).await;

    tui::restore()?;
    terminal.show_cursor()?;

    result
}

fn init_file_logging() -> anyhow::Result<()> {
    let dir = Config::config_dir()?;
    std::fs::create_dir_all(&dir)?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("stylist-tui.log"))?;

    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("stylist=info".parse()?),
        )
        .init();
    Ok(())
}

async fn run_app(terminal: &mut Tui, app: &mut App, client: &StyleClient) -> anyhow::Result<()> {
    let mut events = EventHandler::new(TICK_RATE);
    info!("Interactive stylist started");

    loop {
        terminal.draw(|frame| ui::render(frame, app))?;

        let Some(event) = events.next().await else {
            break;
        };

        match event {
            AppEvent::Key(key) => match app.handle_key(key) {
                Some(Action::LoadImage(path)) => app.load_image(&path).await,
                Some(Action::Generate(attempt)) => {
                    spawn_generation(client, attempt, events.sender())
                }
                None => {}
            },
            AppEvent::Resize(_, _) => {}
            AppEvent::Tick => app.tick(Instant::now()),
            AppEvent::Generation { token, result } => app.finish_generation(token, result),
        }

        if app.should_quit {
            break;
        }
    }

    info!("Interactive stylist stopped");
    Ok(())
}

/// Run one attempt off the event loop and report back with its token
fn spawn_generation(client: &StyleClient, attempt: PendingAttempt, tx: UnboundedSender<AppEvent>) {
    let client = client.clone();
    tokio::spawn(async move {
        let result = client
            .generate_styled_image(&attempt.image, &attempt.prompt)
            .await;
        let _ = tx.send(AppEvent::Generation {
            token: attempt.token,
            result,
        });
    });
}
