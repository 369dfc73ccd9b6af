//! keysynth - terminal front end for the synthesis engine
//!
//! Run with: cargo run -- play
//!       or: cargo run -- bounce --seconds 2 --hold 1 --output tone.wav

mod app;
mod bounce;
mod ui;

use std::{fs::File, path::PathBuf, sync::Mutex};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result as EyreResult, WrapErr};
use keysynth::EngineConfig;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "keysynth", version, about = "Seven-key synthesizer with a terminal UI")]
struct Cli {
    /// TOML file overriding the compiled-in engine defaults
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Write logs here while the TUI owns the terminal
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Play through the default output device with the TUI (default)
    Play,
    /// Render offline to an 8-bit mono WAV file
    Bounce {
        /// Total length in seconds
        #[arg(long, default_value_t = 2.0)]
        seconds: f32,
        /// How long the key is held before release, in seconds
        #[arg(long, default_value_t = 1.0)]
        hold: f32,
        /// Trigger source (key) to hold
        #[arg(long, default_value_t = 0)]
        key: usize,
        #[arg(long, short)]
        output: PathBuf,
    },
}

fn main() -> EyreResult<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    let command = cli.command.unwrap_or(Command::Play);
    init_tracing(&command, cli.log_file.as_ref())?;

    let config = match &cli.config {
        Some(path) => EngineConfig::load(path)
            .wrap_err_with(|| format!("failed to load config from {}", path.display()))?,
        None => EngineConfig::default(),
    };

    match command {
        Command::Play => app::run(config),
        Command::Bounce {
            seconds,
            hold,
            key,
            output,
        } => bounce::run(
            config,
            &bounce::BounceSettings {
                seconds,
                hold,
                key,
                output,
            },
        ),
    }
}

/// Bounce logs to stderr. The TUI only logs when given a file, since
/// anything written to the terminal would tear the display.
fn init_tracing(command: &Command, log_file: Option<&PathBuf>) -> EyreResult<()> {
    let filter = || EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match (command, log_file) {
        (_, Some(path)) => {
            let file = File::create(path)
                .wrap_err_with(|| format!("failed to create log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter())
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        (Command::Bounce { .. }, None) => {
            tracing_subscriber::fmt()
                .with_env_filter(filter())
                .with_writer(std::io::stderr)
                .init();
        }
        (Command::Play, None) => {}
    }
    Ok(())
}
