use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build the final audio track from a vocabulary table
    Audio {
        /// Input vocabulary table (xlsx or csv)
        #[arg(short, long)]
        input: PathBuf,

        /// Output audio file (default: <output_dir>/final.mp3)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Maximum number of data rows to process
        #[arg(short, long)]
        max_rows: Option<usize>,

        /// Also write one audio file per row
        #[arg(long)]
        per_row: bool,
    },

    /// Build the caption video composited with the final audio track
    Video {
        /// Input vocabulary table (xlsx or csv)
        #[arg(short, long)]
        input: PathBuf,

        /// Output video file (default: <output_dir>/final.mp4)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Maximum number of data rows to process
        #[arg(short, long)]
        max_rows: Option<usize>,
    },

    /// Print the planned segment sequence without synthesizing anything
    Plan {
        /// Input vocabulary table (xlsx or csv)
        #[arg(short, long)]
        input: PathBuf,

        /// Maximum number of data rows to process
        #[arg(short, long)]
        max_rows: Option<usize>,
    },

    /// Synthesize a single text with a column's voice
    Synth {
        /// Text to synthesize
        #[arg(short, long)]
        text: String,

        /// Column key whose voice to use
        #[arg(long, default_value = "de")]
        column: String,

        /// Output audio file
        #[arg(short, long, default_value = "new.mp3")]
        output: PathBuf,
    },

    /// Manage the generated clip cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand)]
pub enum CacheAction {
    /// List cached clips
    List,

    /// Clear all cached clips
    Clear,

    /// Show cache statistics and size
    Info,
}
