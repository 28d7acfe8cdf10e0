// Command line definition
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::container::PlayMode;

#[derive(Debug, Parser)]
#[command(name = "moda", version, about = "Build, inspect and play MODA audio containers")]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Settings file (JSON)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Bundle audio tracks and an optional thumbnail into a .moda file
    Compile {
        /// Audio tracks, in playback order
        #[arg(required_unless_present = "dir")]
        tracks: Vec<PathBuf>,

        /// Also add every audio file found under this folder (sorted by path)
        #[arg(long)]
        dir: Option<PathBuf>,

        #[arg(short, long)]
        output: PathBuf,

        #[arg(short, long, value_enum, default_value_t = PlayMode::Sequential)]
        mode: PlayMode,

        #[arg(short, long)]
        thumbnail: Option<PathBuf>,
    },
    /// Unpack tracks, thumbnail and meta.json into a folder
    Extract {
        file: PathBuf,

        #[arg(short, long)]
        output: PathBuf,
    },
    /// Show play mode, tracks and thumbnail of a .moda file
    Info {
        file: PathBuf,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Play a .moda file until it ends or Ctrl-C
    Play {
        file: PathBuf,

        /// Override the play mode stored in the file
        #[arg(short, long, value_enum)]
        mode: Option<PlayMode>,
    },
    /// Print the effective settings
    Config {
        /// Write them to the --config file
        #[arg(long)]
        write: bool,
    },
}
