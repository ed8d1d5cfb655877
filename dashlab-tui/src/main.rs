//! DashLab TUI: two reactive dashboards over the derived value engine.
//!
//! Pages:
//! 1. Stocks - ticker + date range, price/change boxes, candles, histogram, price grid
//! 2. Tips - categorical filters + value range, summary boxes, scatter, histogram, grid
//!
//! Every input change recomputes the page synchronously; the engine answers
//! repeated selectors from its session cache.

mod app;
mod input;
mod panels;
mod theme;
mod ui;

use std::fs::File;
use std::io::{self, stdout};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{self, Event};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use log::info;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use dashlab_core::data::{
    DataProvider, StaticTable, StockUniverse, SyntheticProvider, YahooProvider,
};
use dashlab_core::{DerivedValueEngine, SessionConfig};

use crate::app::App;

#[derive(Parser)]
#[command(
    name = "dashlab",
    about = "DashLab - stock and table dashboards in the terminal"
)]
struct Args {
    /// Session config (TOML). Defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Use generated prices instead of the remote provider.
    #[arg(long, default_value_t = false)]
    offline: bool,

    /// Opening ticker, overriding the config.
    #[arg(long)]
    symbol: Option<String>,

    /// Log file; the terminal is owned by the UI.
    #[arg(long, default_value = "dashlab.log")]
    log_file: PathBuf,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_file = File::create(&args.log_file)
        .with_context(|| format!("cannot create log file {}", args.log_file.display()))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .init();

    let mut config = match &args.config {
        Some(path) => SessionConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => SessionConfig::default(),
    };
    if let Some(symbol) = &args.symbol {
        config.default_symbol = symbol.trim().to_uppercase();
    }

    let universe = match &config.universe_path {
        Some(path) => StockUniverse::from_file(path)
            .with_context(|| format!("loading universe {}", path.display()))?,
        None => StockUniverse::default_us(),
    };

    let provider: Box<dyn DataProvider> = if args.offline {
        Box::new(SyntheticProvider::default())
    } else {
        Box::new(YahooProvider::new(config.fetch_timeout()).context("building HTTP client")?)
    };

    let table = match &config.table.path {
        Some(path) => StaticTable::from_path(path)
            .with_context(|| format!("loading table {}", path.display()))?,
        None => StaticTable::tips().context("loading bundled tips table")?,
    };

    info!(
        "starting: provider={} symbol={} table={} ({} rows)",
        provider.name(),
        config.default_symbol,
        table.name(),
        table.data().len()
    );

    let engine = DerivedValueEngine::new(config, provider).with_table(table);

    // Install a panic hook that restores the terminal before printing the panic.
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stderr(), LeaveAlternateScreen);
        default_hook(info);
    }));

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // First computation happens here so the initial fetch runs behind the alternate screen.
    let mut app = App::new(engine, universe, chrono::Local::now().date_naive());

    // Run the main event loop
    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    let stats = app.engine.cache_stats();
    info!(
        "exiting: {} hits, {} misses, {} evictions",
        stats.hits, stats.misses, stats.evictions
    );

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        // 1. Render
        terminal.draw(|f| ui::draw(f, app))?;

        // 2. Poll for input events (50ms timeout for ~20 FPS tick)
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                input::handle_key(app, key);
            }
        }

        // 3. Check quit
        if !app.running {
            break;
        }
    }
    Ok(())
}
