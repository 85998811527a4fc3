//! nvitals - a terminal dashboard for county drug overdose statistics.
//!
//! Opens a county report by FIPS code: a summary card for the selected year,
//! and a detailed view with the 2018-2023 overdose trend, socioeconomic
//! indicators, CSV export and share links.

mod app;
mod ui;

use std::io;
use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use nvitals_core::api::ApiClient;
use nvitals_core::models::{normalize_fips, REPORT_YEARS};
use nvitals_core::store::{FileStore, YearCache};
use nvitals_core::Config;

use app::{App, AppState};
use ui::input::handle_input;
use ui::render::render;

// ============================================================================
// Constants
// ============================================================================

/// Timeout for polling terminal events (in milliseconds)
const EVENT_POLL_TIMEOUT_MS: u64 = 100;

const LOG_FILE_NAME: &str = "nvitals.log";

const USAGE: &str = "Usage: nvitals [FIPS] [--name NAME] [--year YYYY]\n       nvitals --warm-cache";

/// Initialize the tracing subscriber for logging.
///
/// The terminal belongs to the UI, so logs go to a daily file in the cache
/// directory. Use RUST_LOG to control the level (e.g. RUST_LOG=debug).
fn init_tracing(log_dir: &Path) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    std::fs::create_dir_all(log_dir).ok()?;

    let appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_NAME);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(filter)
        .init();

    Some(guard)
}

// ============================================================================
// Command line
// ============================================================================

#[derive(Debug, Default, PartialEq)]
struct CliArgs {
    fips: Option<String>,
    name: Option<String>,
    year: Option<String>,
    warm_cache: bool,
}

fn parse_args(args: &[String]) -> Result<CliArgs> {
    let mut cli = CliArgs::default();
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--warm-cache" => cli.warm_cache = true,
            "--name" => {
                let name = iter.next().context("--name requires a value")?;
                cli.name = Some(name.clone());
            }
            "--year" => {
                let year = iter.next().context("--year requires a value")?;
                let valid = year
                    .parse::<u16>()
                    .map(|y| REPORT_YEARS.contains(&y))
                    .unwrap_or(false);
                if !valid {
                    bail!("Unsupported year: {}", year);
                }
                cli.year = Some(year.clone());
            }
            "-h" | "--help" => bail!("{}", USAGE),
            other if other.starts_with('-') => bail!("Unknown option: {}\n{}", other, USAGE),
            other => {
                let fips = normalize_fips(other)
                    .with_context(|| format!("Invalid FIPS code: {}", other))?;
                cli.fips = Some(fips);
            }
        }
    }

    Ok(cli)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let cli = parse_args(&args)?;

    let mut config = Config::load()?;
    if let Some(ref year) = cli.year {
        config.selected_year = year.clone();
    }

    // Held until exit so buffered log lines are flushed. Installed before
    // --warm-cache so its fetch failures are logged too.
    let _log_guard = config.cache_dir().ok().and_then(|dir| init_tracing(&dir));

    if cli.warm_cache {
        return warm_cache(&config).await;
    }

    info!("nvitals starting");

    let mut app = App::new(config)?;
    if let Some(ref fips) = cli.fips {
        app.open_county(fips, cli.name.as_deref());
    }

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
        eprintln!("Error: {}", e);
    }

    info!("nvitals shutting down");
    Ok(())
}

/// Fetch every report year and store it in the local year cache.
async fn warm_cache(config: &Config) -> Result<()> {
    let store = FileStore::new(config.cache_dir()?)?;
    let cache = YearCache::with_namespace(
        std::sync::Arc::new(store),
        &config.cache_namespace,
        config.cache_version,
    );
    let client = ApiClient::new(&config.api_base_url)?;

    eprintln!("Warming year cache from {}...", client.base_url());

    let mut failures = 0;
    for year in REPORT_YEARS {
        eprint!("  {}: ", year);
        match client.fetch_year(year).await {
            Ok(dataset) => {
                cache.save(year, &dataset)?;
                eprintln!("{} counties", dataset.len());
            }
            Err(e) => {
                warn!(year, error = %e, "Failed to fetch year");
                eprintln!("failed ({})", e);
                failures += 1;
            }
        }
    }

    if failures > 0 {
        bail!("{} of {} years could not be fetched", failures, REPORT_YEARS.len());
    }
    eprintln!("Done.");
    Ok(())
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    loop {
        // Draw UI
        terminal.draw(|f| render(f, app))?;
        app.tick = app.tick.wrapping_add(1);

        // Poll for events with timeout to allow background updates
        if event::poll(Duration::from_millis(EVENT_POLL_TIMEOUT_MS))? {
            if let Event::Key(key) = event::read()? {
                // Ctrl+C to quit
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    return Ok(());
                }

                // Handle input
                if handle_input(app, key)? {
                    return Ok(());
                }
            }
        }

        // Check for completed background tasks
        app.check_background_tasks();

        // Check if we should quit
        if matches!(app.state, AppState::Quitting) {
            return Ok(());
        }
    }
}
