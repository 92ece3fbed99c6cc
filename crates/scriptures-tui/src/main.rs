use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use scriptures_core::{Config, HttpScriptureApi};
use tracing::info;

mod app;
mod cli;
mod handler;
mod logging;
mod tui;
mod ui;

use app::App;
use cli::Cli;
use logging::{init_logging, LogConfig};
use tui::EventHandler;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load().context("Failed to load config")?;

    // The reader owns stderr, so it logs to a file
    let log_file = match cli.command {
        Some(_) => None,
        None => config.log_path(),
    };
    let log_config = LogConfig::from_verbosity(cli.verbose).with_log_file(log_file);
    init_logging(&log_config).context("Failed to initialize logging")?;

    let api_url = config.resolve_api_url(cli.api_url.as_deref());
    let api = HttpScriptureApi::with_timeout(&api_url, config.request_timeout())
        .with_context(|| format!("Invalid API URL: {}", api_url))?;
    info!(%api_url, "using scripture API");

    match cli.command {
        Some(command) => cli::run(command, &api, config.search_limit()).await,
        None => run_reader(api, &config).await,
    }
}

async fn run_reader(api: HttpScriptureApi, config: &Config) -> Result<()> {
    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = EventHandler::new();

    let mut app = App::new(Arc::new(api), events.sender(), config);
    app.start();

    while !app.should_quit {
        terminal.draw(|frame| ui::render(&mut app, frame))?;

        if let Some(event) = events.next().await {
            handler::handle_event(&mut app, event);
        }
    }

    tui::restore()?;
    Ok(())
}
