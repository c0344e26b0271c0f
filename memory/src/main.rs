mod app;
mod config;
mod events;
mod headless;
mod ui;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::fs::File;
use std::io::{self, stdout};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use memory_api::MemoryClient;
use memory_core::Router;

use app::App;
use config::{FileConfig, Overrides, Settings};
use events::{handle_event, EventResult};
use ui::render::render;

/// Terminal front-end for the unified AI memory backend
#[derive(Parser, Debug)]
#[command(name = "memory", version, about)]
struct Cli {
    /// Backend base URL
    #[arg(long, env = "MEMORY_BACKEND_URL")]
    backend_url: Option<String>,

    /// Request timeout in seconds (0 disables it)
    #[arg(long, env = "MEMORY_TIMEOUT_SECS")]
    timeout_secs: Option<u64>,

    /// Config file (defaults to ./memory.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Line-oriented mode reading commands from stdin
    #[arg(long)]
    headless: bool,

    /// Write logs to this file while the TUI runs
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Filter directive: `-v` overrides RUST_LOG, which overrides the warn default.
fn filter_directive(verbose: u8, rust_log: Option<String>) -> String {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    match rust_log {
        Some(directive) if verbose == 0 && !directive.trim().is_empty() => directive,
        _ => level.to_string(),
    }
}

fn init_tracing(cli: &Cli) -> Result<()> {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = EnvFilter::new(filter_directive(cli.verbose, rust_log));

    if cli.headless {
        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
            .with(filter)
            .init();
    } else if let Some(path) = &cli.log_file {
        let file = File::create(path)
            .with_context(|| format!("Failed to create log file {}", path.display()))?;
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(Mutex::new(file))
                    .with_ansi(false),
            )
            .with(filter)
            .init();
    }
    // Otherwise the TUI runs without a subscriber.

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(&cli)?;

    let file = FileConfig::load(cli.config.as_deref())?;
    let overrides = Overrides {
        backend_url: cli.backend_url.clone(),
        timeout_secs: cli.timeout_secs,
    };
    let settings = Settings::resolve(file, &overrides)?;

    let base_url = settings.client.base_url().to_string();
    let client = MemoryClient::new(settings.client)
        .with_context(|| format!("Failed to create a client for {base_url}"))?;
    tracing::info!(backend = %base_url, "starting");

    let router = Router::new(Arc::new(client), settings.router);

    if cli.headless {
        return headless::run_headless(router).await;
    }

    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let app = App::new(router).with_backend_url(base_url);
    let result = run_app(&mut terminal, app).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {e}");
    }

    Ok(())
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    mut app: App,
) -> io::Result<()> {
    loop {
        app.sync();
        terminal.draw(|f| render(f, &app))?;

        if let Some(path) = app.take_pending_path() {
            app.load_import_file(path).await;
        }

        if event::poll(Duration::from_millis(100))? {
            let ev = event::read()?;
            if handle_event(&mut app, ev) == EventResult::Quit {
                app.should_quit = true;
            }
        } else {
            app.tick();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbose_flag_overrides_rust_log() {
        assert_eq!(filter_directive(2, Some("memory=trace".into())), "DEBUG");
        assert_eq!(filter_directive(1, None), "INFO");
    }

    #[test]
    fn test_rust_log_used_without_verbose_flag() {
        assert_eq!(filter_directive(0, Some("memory_core=debug".into())), "memory_core=debug");
        assert_eq!(filter_directive(0, Some("  ".into())), "WARN");
        assert_eq!(filter_directive(0, None), "WARN");
    }
}
