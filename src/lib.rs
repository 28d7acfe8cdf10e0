// MODA - multi-track audio container tools
// Module declarations
pub mod audio;
pub mod cli;
pub mod commands;
pub mod container;
pub mod error;
pub mod library;
pub mod metadata;
pub mod playback;
pub mod settings;

use anyhow::Result;
use clap::Parser;

use cli::{Cli, Command};
use settings::AppSettings;

pub use error::{ModaError, PlaybackError};

pub fn run() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    if let Err(e) = dispatch(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn dispatch(cli: Cli) -> Result<()> {
    let settings = match &cli.config {
        Some(path) => AppSettings::load(path)?,
        None => AppSettings::default(),
    };

    match cli.command {
        Command::Compile {
            tracks,
            dir,
            output,
            mode,
            thumbnail,
        } => {
            let path = commands::compile(
                &settings,
                tracks,
                dir.as_deref(),
                &output,
                mode,
                thumbnail.as_deref(),
            )?;
            println!("MODA file saved: {}", path.display());
        }
        Command::Extract { file, output } => {
            let report = commands::extract(&file, &output)?;
            println!(
                "Extracted {} tracks to {}",
                report.tracks.len(),
                report.output_dir.display()
            );
        }
        Command::Info { file, json } => {
            let report = commands::inspect(&file)?;
            commands::print_info(&report, json)?;
        }
        Command::Play { file, mode } => {
            commands::play(&settings, &file, mode)?;
        }
        Command::Config { write } => {
            commands::show_config(&settings, cli.config.as_deref(), write)?;
        }
    }

    Ok(())
}
