//! Wortlaut - Vocabulary Audio/Video Track Builder
//!
//! This is the main entry point for the Wortlaut application, which turns
//! a vocabulary spreadsheet into spoken audio tracks and caption videos
//! using a cloud TTS API and ffmpeg.

use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use wortlaut::cache::ClipCache;
use wortlaut::cli::{Args, CacheAction, Commands};
use wortlaut::config::Config;
use wortlaut::sequence::{assemble, Segment};
use wortlaut::table;
use wortlaut::tts::{Synthesizer, SynthesizerFactory};
use wortlaut::workflow::Workflow;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Setup logging to both console and file
    setup_logging(args.verbose)?;

    info!("Starting Wortlaut - Vocabulary Audio/Video Track Builder");

    // Load configuration
    let mut config = match &args.config {
        Some(config_path) => Config::from_file(config_path)?,
        None => {
            // Try to load config.toml from current directory first
            if std::path::Path::new("config.toml").exists() {
                info!("Found config.toml in current directory, loading...");
                Config::from_file("config.toml")?
            } else {
                Config::default()
            }
        }
    };

    // Execute command
    match args.command {
        Commands::Audio {
            input,
            output,
            max_rows,
            per_row,
        } => {
            info!("Building audio track from: {}", input.display());

            if max_rows.is_some() {
                config.table.max_rows = max_rows;
            }

            let workflow = Workflow::new(config)?;
            workflow
                .build_audio(&input, output.as_deref(), per_row)
                .await?;
        }
        Commands::Video {
            input,
            output,
            max_rows,
        } => {
            info!("Building caption video from: {}", input.display());

            if max_rows.is_some() {
                config.table.max_rows = max_rows;
            }

            let workflow = Workflow::new(config)?;
            workflow.build_video(&input, output.as_deref()).await?;
        }
        Commands::Plan { input, max_rows } => {
            info!("Planning sequence for: {}", input.display());

            if max_rows.is_some() {
                config.table.max_rows = max_rows;
            }

            let rows = table::read_rows(&input, &config.table.columns)?;
            let sequence = assemble(
                &rows,
                &config.table.columns,
                &config.sequence,
                config.table.max_rows,
            );

            print_plan(&sequence);
        }
        Commands::Synth {
            text,
            column,
            output,
        } => {
            info!("Synthesizing one-off text with voice for column '{}'", column);

            let voice = config.tts.voice_for(&column)?.clone();
            let synthesizer = SynthesizerFactory::create_default(config.tts.clone())?;
            let bytes = synthesizer.synthesize(&text, &voice).await?;
            tokio::fs::write(&output, bytes).await?;

            println!("Audio file created: {}", output.display());
        }
        Commands::Cache { action } => {
            info!("Managing clip cache...");

            let cache = ClipCache::new(&config.cache.dir)?;

            match action {
                CacheAction::List => {
                    let clips = cache.list()?;

                    if clips.is_empty() {
                        println!("No cached clips found.");
                    } else {
                        println!("\nCached Clips:");
                        println!("{:<30} {:<12} {:<15}", "File", "Size (KB)", "Age");
                        println!("{}", "-".repeat(57));

                        let now = std::time::SystemTime::now()
                            .duration_since(std::time::UNIX_EPOCH)
                            .unwrap_or_default()
                            .as_secs();

                        for clip in clips {
                            let age = clip
                                .modified
                                .map(|m| format_duration(now.saturating_sub(m)))
                                .unwrap_or_else(|| "unknown".to_string());

                            println!(
                                "{:<30} {:<12.1} {:<15}",
                                clip.filename,
                                clip.size as f64 / 1024.0,
                                age
                            );
                        }
                    }
                }
                CacheAction::Clear => {
                    let deleted = cache.clear()?;
                    println!("Cleared {} cached clips", deleted);
                }
                CacheAction::Info => {
                    let info = cache.info()?;

                    println!("\nCache Statistics:");
                    println!("Speech clips: {}", info.speech_files);
                    println!("Silence clips: {}", info.silence_files);
                    println!(
                        "Total size: {:.2} MB",
                        info.total_size as f64 / 1024.0 / 1024.0
                    );

                    let now = std::time::SystemTime::now()
                        .duration_since(std::time::UNIX_EPOCH)
                        .unwrap_or_default()
                        .as_secs();

                    if let Some(oldest) = info.oldest_entry {
                        println!("Oldest entry: {} ago", format_duration(now.saturating_sub(oldest)));
                    }
                    if let Some(newest) = info.newest_entry {
                        println!("Newest entry: {} ago", format_duration(now.saturating_sub(newest)));
                    }
                }
            }
        }
    }

    info!("Wortlaut run completed successfully");
    Ok(())
}

/// Print a planned sequence in a readable table
fn print_plan(sequence: &[Segment]) {
    if sequence.is_empty() {
        println!("No non-empty rows/cells were found.");
        return;
    }

    println!("\nPlanned Sequence:");
    println!("{:<5} {:<10} {:<12} {}", "#", "Kind", "Clip", "Text");
    println!("{}", "-".repeat(70));

    let mut speech = 0u64;
    let mut silence_ms = 0u64;

    for (idx, segment) in sequence.iter().enumerate() {
        match segment {
            Segment::Speech { column, row, text } => {
                speech += 1;
                println!(
                    "{:<5} {:<10} {:<12} {}",
                    idx + 1,
                    "speech",
                    format!("{}_{}", column, row),
                    text
                );
            }
            Segment::Repeat { column, row } => {
                println!(
                    "{:<5} {:<10} {:<12} {}",
                    idx + 1,
                    "repeat",
                    format!("{}_{}", column, row),
                    "(replay)"
                );
            }
            Segment::Silence { duration_ms } => {
                silence_ms += duration_ms;
                println!(
                    "{:<5} {:<10} {:<12} {}",
                    idx + 1,
                    "silence",
                    format!("{}ms", duration_ms),
                    ""
                );
            }
        }
    }

    println!(
        "\n{} segments, {} speech clips, {:.1}s planned silence",
        sequence.len(),
        speech,
        silence_ms as f64 / 1000.0
    );
}

/// Setup logging to both console and file
fn setup_logging(verbose: bool) -> Result<()> {
    // Create log directory
    let app_dir = std::env::current_dir()?.join(".wortlaut");
    let log_dir = app_dir.join("log");
    std::fs::create_dir_all(&log_dir)?;

    // Set up file appender with daily rotation
    let file_appender = rolling::daily(&log_dir, "wortlaut.log");
    let (non_blocking_file, _guard) = non_blocking(file_appender);
    // Keep the guard alive for the duration of the program
    std::mem::forget(_guard);

    // Determine log level
    let log_level = if verbose { Level::DEBUG } else { Level::INFO };

    // Create console layer
    let console_layer = fmt::layer()
        .with_target(false)
        .with_file(true)
        .with_line_number(true);

    // Create file layer
    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false); // No ANSI colors in file

    // Setup layered subscriber
    let subscriber = tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(console_layer)
        .with(file_layer);

    // Initialize the subscriber
    subscriber
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

/// Format duration in seconds to human readable string
fn format_duration(seconds: u64) -> String {
    if seconds < 60 {
        format!("{}s", seconds)
    } else if seconds < 3600 {
        format!("{}m {}s", seconds / 60, seconds % 60)
    } else {
        format!("{}h {}m", seconds / 3600, (seconds % 3600) / 60)
    }
}
