use anyhow::Result;
use substance_sense_core::{Config, PredictionClient};

mod app;
mod handler;
mod logging;
mod markdown;
mod tui;
mod ui;

use app::App;
use tui::{EventHandler, Tui};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // A .env next to the binary may carry SUBSTANCE_SENSE_BACKEND
    dotenvy::dotenv().ok();

    let log_path = logging::init()?;

    // Resolve configuration before taking over the terminal so errors print normally
    let config = Config::load()?;
    let backend_url = config.backend_base_url()?;
    tracing::info!(%backend_url, log = %log_path.display(), "starting substance-sense");

    let mut app = App::new(PredictionClient::new(&backend_url));

    tui::install_panic_hook();
    let mut terminal = tui::init()?;

    let result = run(&mut terminal, &mut app).await;

    tui::restore()?;
    if let Err(err) = &result {
        tracing::error!(error = %err, "event loop exited with error");
    }
    tracing::info!(messages = app.session.transcript().len(), "shutting down");

    result
}

async fn run(terminal: &mut Tui, app: &mut App) -> Result<()> {
    let mut events = EventHandler::new();
    let tx = events.sender();

    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event, &tx),
            None => break,
        }
    }

    Ok(())
}
