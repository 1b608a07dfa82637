use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;
use trailer_row::catalog::{self, details_api::DetailsApi, DetailsSource};
use trailer_row::config::Config;
use trailer_row::loader::{RowSession, RowState};
use trailer_row::settings::{DebugSettings, SettingsHub};
use trailer_row::tui::{self, TuiCommand};

#[tokio::main]
async fn main() -> Result<()> {
    let log_file = std::fs::File::create("trailer-row.log")?;
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("trailer_row=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(log_file)
        .with_ansi(false)
        .init();

    let headless = std::env::args().any(|arg| arg == "--headless");

    let config = Config::load(Path::new("config.toml"))?;

    // Load saved keys from .env (real env vars take precedence)
    Config::load_env_file();

    let items = catalog::load_items(Path::new(&config.row.items_file))?;

    println!();
    println!("  Trailer Row v0.1.0");
    println!("  ==================");
    println!();
    println!("  {} items from {}, batches of {}", items.len(), config.row.items_file, config.row.batch_size);
    println!("  Details API: {}", config.catalog.api_base);
    println!();

    let details: Arc<dyn DetailsSource> = Arc::new(DetailsApi::new(
        &config.catalog.api_base,
        config.catalog.request_timeout_ms,
        Config::catalog_api_token(),
    )?);
    let settings = SettingsHub::new(DebugSettings::from(&config.debug));

    let session = RowSession::start(&config.row.title, items, details, &config.row, settings.clone());

    if headless {
        let row = session.finished().await;
        print_summary(&row);
        return Ok(());
    }

    let (cmd_tx, mut cmd_rx) = mpsc::channel::<TuiCommand>(16);
    let tui_task = tokio::spawn(tui::run_tui(session.subscribe(), settings, cmd_tx));

    // Runs until the TUI asks to quit or goes away.
    while let Some(cmd) = cmd_rx.recv().await {
        match cmd {
            TuiCommand::Scrolled(position) => {
                if session.on_scroll(position) {
                    tracing::debug!(offset = position.offset, content = position.content, "scroll requested next batch");
                }
            }
            TuiCommand::Quit => break,
        }
    }

    session.teardown().await;
    tui_task.await??;

    tracing::debug!("shutting down");
    Ok(())
}

fn print_summary(row: &RowState) {
    if !row.should_render() {
        println!("  {}: nothing to show", row.title);
        return;
    }
    println!("  {}", row.title);
    for entry in row.visible.entries() {
        let url = entry.trailer.as_ref().map(|t| t.watch_url()).unwrap_or_default();
        println!("    {:<40} {}", entry.item.title, url);
    }
    println!();
    println!(
        "  {} shown, {} without trailer, {} failed, {} batches",
        row.stats.verified, row.stats.no_trailer, row.stats.failed, row.stats.batches_settled
    );
}
