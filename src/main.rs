use std::fs::OpenOptions;
use std::io::{Write, stdout};
use std::process::ExitCode;
use std::sync::Mutex;

use clap::Parser;
use rand::SeedableRng;
use rand::rngs::StdRng;
use ratatui::crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use ratatui::crossterm::execute;
use tracing::info;
use tracing_error::ErrorLayer;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod columns;
mod controller;
mod data;
mod domain;
mod filter;
mod inputter;
mod model;
mod resize;
mod ui;

use controller::Controller;
use domain::{TVConfig, TVError};
use model::{AppStatus, Model};
use ui::TableUI;

/// A table with resizable columns and a row filter.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Number of generated rows
    #[arg(short, long, default_value_t = 25)]
    rows: usize,

    /// Number of sub rows generated below every row
    #[arg(short, long, default_value_t = 0)]
    nested: usize,

    /// Seed for the data generator
    #[arg(short, long)]
    seed: Option<u64>,

    /// Write logs to this file (RUST_LOG controls the level)
    #[arg(short, long)]
    log: Option<String>,

    /// Start with the state panel hidden
    #[arg(long)]
    no_debug: bool,

    /// Event poll timeout in milliseconds
    #[arg(long, default_value_t = 100)]
    poll_ms: u64,

    /// Pixels a column grows or shrinks per key press
    #[arg(long, default_value_t = 10)]
    resize_step: u16,
}

impl TryFrom<&Args> for TVConfig {
    type Error = TVError;

    fn try_from(args: &Args) -> Result<Self, Self::Error> {
        if args.resize_step == 0 {
            return Err(TVError::InvalidArgument(
                "--resize-step must be at least 1".into(),
            ));
        }
        Ok(TVConfig {
            event_poll_time: args.poll_ms,
            rows: args.rows,
            nested: args.nested,
            seed: args.seed,
            resize_step: args.resize_step,
            show_debug: !args.no_debug,
            ..TVConfig::default()
        })
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    match setup(&args).and_then(|cfg| run(&cfg)) {
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
        Ok(_) => ExitCode::SUCCESS,
    }
}

fn init_logging(path: &str) -> Result<(), TVError> {
    let path = shellexpand::full(path)
        .map_err(|e| TVError::InvalidArgument(format!("log path {path}: {e}")))?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path.as_ref())?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("adjustable_table=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(false),
        )
        .with(ErrorLayer::default())
        .try_init()
        .map_err(|e| TVError::Logging(e.to_string()))
}

fn setup(args: &Args) -> Result<TVConfig, TVError> {
    if let Some(path) = &args.log {
        init_logging(path)?;
    }
    let cfg = TVConfig::try_from(args)?;
    info!("Starting with {:?}", cfg);
    Ok(cfg)
}

fn generate_rows(cfg: &TVConfig) -> Vec<data::Row> {
    match (cfg.seed, cfg.nested) {
        (Some(seed), 0) => data::generate_with(&mut StdRng::seed_from_u64(seed), cfg.rows),
        (Some(seed), n) => {
            data::generate_nested_with(&mut StdRng::seed_from_u64(seed), &[cfg.rows, n])
        }
        (None, 0) => data::generate(cfg.rows),
        (None, n) => data::generate_nested(&[cfg.rows, n]),
    }
}

fn run(cfg: &TVConfig) -> Result<(), TVError> {
    let rows = generate_rows(cfg);

    let mut terminal = ratatui::init();
    let result = with_mouse_capture(&mut stdout(), ratatui::restore, || {
        let size = terminal.size()?;
        let mut model = Model::init(cfg, rows, size.width, size.height);
        let mut ui = TableUI::new(cfg);
        let controller = Controller::new(cfg);

        while model.status != AppStatus::Quitting {
            // Render the current view
            terminal.draw(|f| ui.draw(&model, f))?;

            // Handle events and map to a Message
            let message = controller.handle_event(&model)?;
            model.update(message)?;
        }
        Ok(())
    });
    info!("Bye!");
    result
}

/// Runs `body` with mouse capture enabled on `out`. Capture is released and
/// `restore` runs on every path, and the first error is returned.
fn with_mouse_capture<W: Write>(
    out: &mut W,
    restore: impl FnOnce(),
    body: impl FnOnce() -> Result<(), TVError>,
) -> Result<(), TVError> {
    let result = execute!(out, EnableMouseCapture)
        .map_err(TVError::from)
        .and_then(|_| body());
    let disable = execute!(out, DisableMouseCapture);
    restore();
    result.and(disable.map_err(TVError::from))
}
