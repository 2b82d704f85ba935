mod app;
mod cli;
mod handler;
mod oneshot;
mod tui;
mod ui;

use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use fiddy_core::{Config, GeminiClient, ModuleKind, TextGenerator};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use app::App;
use cli::Cli;
use tui::{EventHandler, Tui};

fn get_log_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("fiddy")
        .join("logs")
        .join("fiddy.log")
}

/// Log to a file so nothing is written over the alternate screen
fn setup_logging(level: &str) -> Result<()> {
    let log_path = get_log_path();
    if let Some(dir) = log_path.parent() {
        fs::create_dir_all(dir).context("Failed to create log directory")?;
    }
    let log_file = fs::File::create(&log_path).context("Failed to create log file")?;

    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(filter)
        .init();

    info!(filter = level, path = %log_path.display(), "Logging initialized");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // An explicit --config must load; the default location falls back to
    // defaults so a fresh install still starts
    let (mut config, config_err) = match &cli.config {
        Some(path) => (
            Config::load_from(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?,
            None,
        ),
        None => match Config::load() {
            Ok(config) => (config, None),
            Err(e) => (Config::new(), Some(e)),
        },
    };

    let level = cli
        .log_level
        .clone()
        .or_else(|| config.log_level.clone())
        .unwrap_or_else(|| "info".to_string());
    setup_logging(&level).context("Failed to setup logging")?;

    if let Some(e) = config_err {
        warn!(error = %e, "Could not load config, using defaults");
    }
    if let Some(model) = cli.model {
        config.model = Some(model);
    }

    info!(
        model = %config.model(),
        has_key = config.resolve_api_key().is_some(),
        "fiddy starting"
    );

    let client = GeminiClient::from_config(&config).context("Failed to build HTTP client")?;

    match cli.command {
        Some(command) => {
            let mut stdout = io::stdout();
            let generated = oneshot::run(
                command,
                &config,
                cli.config.as_deref(),
                &client,
                &mut oneshot::StderrSink,
                &mut stdout,
            )
            .await?;
            if !generated {
                std::process::exit(1);
            }
        }
        None => run_tui(&config, Arc::new(client), cli.open).await?,
    }

    Ok(())
}

async fn run_tui(
    config: &Config,
    generator: Arc<dyn TextGenerator>,
    open: Option<ModuleKind>,
) -> Result<()> {
    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = EventHandler::new();
    let mut app = App::new(config, generator);
    if let Some(kind) = open {
        app.open_module(kind);
    }

    let result = run_loop(&mut terminal, &mut app, &mut events).await;

    tui::restore()?;
    info!("fiddy exiting");
    result
}

async fn run_loop(terminal: &mut Tui, app: &mut App, events: &mut EventHandler) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        if let Some(event) = events.next().await {
            handler::handle_event(app, event);
        }

        app.poll_tasks().await;
    }
    Ok(())
}
