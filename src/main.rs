use std::fs::{self, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::Mutex;

use anyhow::Context;
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing_subscriber::EnvFilter;

mod app;
mod cli;
mod config;
mod error;
mod history;
mod locate;
mod normalize;
mod provider;
mod state;
mod store;
mod ui;
mod units;
mod weather;

use crate::app::{run_app, Services};
use crate::cli::Args;
use crate::config::Config;
use crate::history::History;
use crate::provider::Gateway;
use crate::state::ViewState;
use crate::store::{FileStore, PreferenceStore};

// The terminal belongs to the TUI, so logs go to a file.
fn init_logging(path: &Path) -> anyhow::Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("cannot open log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("wxlookup=info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

/// Runs `setup`, and `undo` if it fails, so a half-initialised terminal
/// is not left in raw mode.
fn undo_on_error<T>(
    setup: impl FnOnce() -> io::Result<T>,
    undo: impl FnOnce(),
) -> io::Result<T> {
    match setup() {
        Ok(value) => Ok(value),
        Err(err) => {
            undo();
            Err(err)
        }
    }
}

fn main() -> anyhow::Result<()> {
    let config = Config::from_args(Args::parse())?;
    init_logging(&config.log_file)?;
    tracing::info!(data_dir = %config.data_dir.display(), "starting");

    let runtime = tokio::runtime::Runtime::new().context("cannot start async runtime")?;
    let gateway = Gateway::new(&config.base_url, &config.api_key, config.timeout)?;
    let locator = config.locator()?;
    tracing::info!(geolocation = locator.is_available(), "location capability");
    let services = Services::new(gateway, locator, runtime.handle().clone());

    let store = match FileStore::open(&config.data_dir) {
        Ok(files) => PreferenceStore::new(files),
        Err(err) => {
            tracing::warn!("preferences will not be saved: {err}");
            PreferenceStore::in_memory()
        }
    };
    let mut state = ViewState::new(History::load(store));

    // setup terminal
    enable_raw_mode()?;
    let mut terminal = undo_on_error(
        || {
            let mut stdout = io::stdout();
            execute!(stdout, EnterAlternateScreen)?;
            Terminal::new(CrosstermBackend::new(stdout))
        },
        || {
            let _ = execute!(io::stdout(), LeaveAlternateScreen);
            let _ = disable_raw_mode();
        },
    )?;

    let res = run_app(
        &mut terminal,
        &mut state,
        &services,
        config.initial_query.clone(),
    );

    // restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!("terminal error: {err}");
        println!("{:?}", err)
    }

    runtime.shutdown_background();
    Ok(())
}
