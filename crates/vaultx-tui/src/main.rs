//! VaultX - terminal password manager client
//!
//! Built with Ratatui and crossterm on top of a hosted backend.

mod app;
mod clipboard;
mod config;
mod form;
mod handlers;
mod toast;
mod ui;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use vaultx_core::{Backend, MemoryBackend, RestBackend, RestConfig};

use app::{App, AppOptions, AppState};
use clipboard::Osc52Clipboard;

/// VaultX - a terminal client for your hosted password vault
#[derive(Parser, Debug)]
#[command(name = "vaultx")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Backend project URL (overrides config and environment)
    #[arg(short, long, value_name = "URL")]
    url: Option<String>,

    /// Use a local in-memory vault with sample data
    #[arg(long)]
    demo: bool,

    /// Log to stderr instead of the log file
    #[arg(long)]
    log_stderr: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(args.log_stderr)?;
    tracing::info!("Starting VaultX");

    let mut config = config::Config::load(args.config)?;
    config.apply_env();

    if let Some(url) = args.url {
        tracing::info!("Overriding backend URL from CLI: {}", url);
        config.backend_url = url;
    }

    let backend: Arc<dyn Backend> = if args.demo {
        tracing::info!("Running with the in-memory demo vault");
        Arc::new(MemoryBackend::demo())
    } else {
        tracing::info!("Backend URL: {}", config.backend_url);
        let session_file = if config.persist_session {
            RestConfig::default_session_file()
        } else {
            None
        };
        Arc::new(
            RestBackend::new(RestConfig {
                base_url: config.backend_url.clone(),
                anon_key: config.anon_key.clone(),
                session_file,
            })
            .context("Failed to create backend client")?,
        )
    };

    let options = AppOptions {
        toast_duration: Duration::from_millis(config.toast_duration_ms),
        reveal_by_default: config.reveal_by_default,
    };
    let mut app = App::new(backend, Box::new(Osc52Clipboard::stdout()), options);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Main loop
    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        tracing::error!("Exiting on error: {:#}", e);
        eprintln!("Error: {e}");
    }

    Ok(())
}

/// Logs go to a file because the terminal belongs to the UI.
fn init_logging(to_stderr: bool) -> Result<()> {
    let filter = EnvFilter::from_default_env().add_directive("vaultx_tui=info".parse()?);

    if to_stderr {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .init();
        return Ok(());
    }

    let log_dir = dirs::data_dir()
        .context("Could not determine data directory")?
        .join("vaultx");
    // Shared with the persisted session, so owner-only.
    let mut dir_builder = std::fs::DirBuilder::new();
    dir_builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        dir_builder.mode(0o700);
    }
    dir_builder
        .create(&log_dir)
        .with_context(|| format!("Failed to create log directory: {}", log_dir.display()))?;
    let log_path = log_dir.join("vaultx.log");
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file: {}", log_path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(std::sync::Mutex::new(file))
        .init();
    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    loop {
        app.grid_columns = ui::grid_columns(terminal.size()?.width);
        app.tick();
        terminal.draw(|frame| ui::render(frame, app))?;

        // The in-flight state is on screen; now make the call
        if app.is_busy() {
            app.run_pending();
            continue;
        }

        // Poll for events with timeout for smooth updates
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && handlers::handle_key(app, key) {
                    break;
                }
            }
        }

        // Check if we should quit
        if matches!(app.state, AppState::Quit) {
            break;
        }
    }

    Ok(())
}
