//! travel-admin binary entry point

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use travel_admin::{
    admin_tui::App,
    api::{AdminApi, HttpAdminApi},
    cache::QueryCache,
    cli::{Cli, Commands},
    config::Config,
    listing::{load_driver_rows, load_travel_rows, EntityListing},
    table::render_grid,
};

const DEFAULT_LOG_FILTER: &str = "travel_admin=info";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

/// Log to the configured file so the TUI display stays clean
fn init_file_logging(log_file: &Path) -> WorkerGuard {
    let directory = log_file
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = log_file
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_else(|| "travel_admin.log".into());

    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(directory, file_name));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(writer)
        .with_ansi(false)
        .init();
    guard
}

fn init_stderr_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::from_env()?;
    let _guard = if cli.is_tui() {
        Some(init_file_logging(&config.log_file))
    } else {
        init_stderr_logging();
        None
    };

    config.validate()?;
    info!("Using travel API at {}", config.api_base_url);

    let api: Arc<dyn AdminApi> = Arc::new(HttpAdminApi::new(&config).context("Failed to build HTTP client")?);

    match cli.command {
        Some(Commands::Travels) => print_travels(api.as_ref()).await,
        Some(Commands::Drivers) => print_drivers(api.as_ref()).await,
        None | Some(Commands::Tui) => run_tui(api).await,
    }
}

async fn print_travels(api: &dyn AdminApi) -> Result<()> {
    let rows = load_travel_rows(api, &QueryCache::new())
        .await
        .context("Failed to load travels")?;
    print_rows(&rows, "No travels found.");
    Ok(())
}

async fn print_drivers(api: &dyn AdminApi) -> Result<()> {
    let rows = load_driver_rows(api, &QueryCache::new())
        .await
        .context("Failed to load drivers")?;
    print_rows(&rows, "No drivers found.");
    Ok(())
}

fn print_rows<L: EntityListing>(rows: &[L], empty: &str) {
    if rows.is_empty() {
        println!("{}", empty);
        return;
    }

    println!("{}", render_grid(&L::columns(), rows).to_plain_text());
    println!();
    println!("Total: {}", rows.len());
}

async fn run_tui(api: Arc<dyn AdminApi>) -> Result<()> {
    info!("Starting travel admin TUI...");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(api);
    let result = app.run(&mut terminal).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    match result {
        Ok(()) => {
            info!("Travel admin TUI exited successfully");
            Ok(())
        }
        Err(e) => {
            error!("Travel admin TUI encountered an error: {:#}", e);
            Err(e)
        }
    }
}
