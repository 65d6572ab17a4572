use anyhow::Result;
use tracing::{info, warn};

mod app;
mod config;
mod error;
mod handler;
mod orchestrator;
mod recipes;
mod spoonacular;
mod state;
mod telemetry;
mod tui;
mod ui;

use app::App;
use config::Config;
use tui::EventHandler;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load()?;
    telemetry::init(&config.log_path()?)?;

    match Config::write_template_if_missing() {
        Ok(Some(path)) => info!("wrote config template to {}", path.display()),
        Ok(None) => {}
        Err(e) => warn!("could not write config template: {e:#}"),
    }
    if !config.has_api_key() {
        warn!("no Spoonacular API key configured; requests will be rejected");
    }

    tui::install_panic_hook();
    let mut terminal = tui::init()?;

    info!(base_url = config.base_url(), "recipe chat starting");
    let mut app = App::new(&config);
    let result = run(&mut terminal, &mut app).await;

    tui::restore()?;
    result
}

async fn run(terminal: &mut tui::Tui, app: &mut App) -> Result<()> {
    let mut events = EventHandler::new();

    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        tokio::select! {
            event = events.next() => match event {
                Some(event) => handler::handle_event(app, event),
                None => break,
            },
            joined = app.wait_for_reply(), if app.query_in_flight() => {
                app.finish_query(joined);
            }
        }

        app.follow_transcript();
    }

    if let Some(task) = app.query_task.take() {
        task.abort();
    }
    info!("recipe chat exiting");
    Ok(())
}
