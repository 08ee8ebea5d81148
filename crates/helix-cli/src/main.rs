//! Helix CLI
//!
//! Command-line host for the Triple-Helix tube scheduler. Every command
//! loads one learner's snapshot, runs a single scheduler operation and lets
//! the SQLite sink persist the result.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use tracing::{debug, Level};
use tracing_subscriber::EnvFilter;

use helix_core::{
    PositionEntry, ResilientScheduler, SchedulerConfig, SchedulerState, SnapshotStore, SqliteSink,
    Tube, TubeNumber,
};

/// Helix - Triple-Helix spaced repetition scheduler CLI
#[derive(Parser)]
#[command(name = "helix")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "CLI for the Triple-Helix tube scheduler")]
#[command(long_about = "Helix tracks three parallel content queues (tubes) per learner.\n\nPerfect passes push a unit back by its skip number (1, 3, 5, 10, 25, 100); imperfect passes reset it.")]
struct Cli {
    /// SQLite database path (defaults to the platform data directory)
    #[arg(long, global = true, env = "HELIX_DB_PATH")]
    db: Option<PathBuf>,

    /// Learner whose snapshot is used
    #[arg(long, global = true, env = "HELIX_LEARNER", default_value = "default")]
    learner: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replace a tube's content with the given ids at positions 0, 1, 2, ...
    Seed {
        /// Tube number (1-3)
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=3))]
        tube: u8,
        /// Thread id to associate with the tube
        #[arg(long)]
        thread: String,
        /// Content ids in presentation order
        #[arg(required = true)]
        content: Vec<String>,
    },

    /// Advance to the next tube and show its current stitch
    Next,

    /// Show the current stitch of the active tube
    Current,

    /// Record a completed stitch
    Complete {
        /// Thread the stitch was served from
        #[arg(long)]
        thread: String,
        /// Content id of the stitch
        #[arg(long)]
        content: String,
        /// Correct answers
        #[arg(long)]
        score: u32,
        /// Questions asked
        #[arg(long)]
        total: u32,
    },

    /// Show all three tubes
    Show {
        /// Maximum positions to print per tube
        #[arg(long, default_value = "10")]
        limit: usize,
    },

    /// Show session statistics
    Stats,

    /// Turn infinite play mode on or off
    Infinite {
        /// Desired mode
        mode: Toggle,
    },

    /// Write the learner's snapshot as JSON
    Export {
        /// Output file path
        output: PathBuf,
    },

    /// Replace the learner's snapshot from a JSON file
    Import {
        /// Path to snapshot JSON file
        file: PathBuf,
    },

    /// Delete the learner's snapshot
    Reset,

    /// List learners stored in the database
    Learners,
}

#[derive(Clone, Copy, ValueEnum)]
enum Toggle {
    On,
    Off,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so command output stays pipeable
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::WARN.into()))
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    let store = Arc::new(SnapshotStore::open(cli.db.clone())?);
    debug!(path = %store.path().display(), learner = %cli.learner, "Using snapshot store");

    match cli.command {
        Commands::Seed {
            tube,
            thread,
            content,
        } => run_seed(&store, &cli.learner, tube, &thread, content),
        Commands::Next => run_next(&store, &cli.learner),
        Commands::Current => run_current(&store, &cli.learner),
        Commands::Complete {
            thread,
            content,
            score,
            total,
        } => run_complete(&store, &cli.learner, &thread, &content, score, total),
        Commands::Show { limit } => run_show(&store, &cli.learner, limit),
        Commands::Stats => run_stats(&store, &cli.learner),
        Commands::Infinite { mode } => run_infinite(&store, &cli.learner, mode),
        Commands::Export { output } => run_export(&store, &cli.learner, output),
        Commands::Import { file } => run_import(&store, &cli.learner, file),
        Commands::Reset => run_reset(&store, &cli.learner),
        Commands::Learners => run_learners(&store),
    }
}

/// Load the learner's snapshot into a scheduler that saves back to the store
fn open_scheduler(
    store: &Arc<SnapshotStore>,
    learner: &str,
) -> anyhow::Result<ResilientScheduler<SqliteSink>> {
    let snapshot = store
        .load(learner)
        .with_context(|| format!("Failed to load snapshot for learner '{}'", learner))?;
    let sink = SqliteSink::new(Arc::clone(store), learner);
    Ok(ResilientScheduler::with_config(
        snapshot,
        sink,
        SchedulerConfig::from_env(),
    ))
}

/// Run seed command
fn run_seed(
    store: &Arc<SnapshotStore>,
    learner: &str,
    tube: u8,
    thread: &str,
    content: Vec<String>,
) -> anyhow::Result<()> {
    let mut scheduler = open_scheduler(store, learner)?;
    let count = content.len();
    scheduler.initialize_tube_with_content(tube, thread, content)?;

    println!(
        "{} tube {} with {} stitches (thread {})",
        "Seeded".green().bold(),
        tube,
        count,
        thread.cyan()
    );
    Ok(())
}

/// Run next command
fn run_next(store: &Arc<SnapshotStore>, learner: &str) -> anyhow::Result<()> {
    let mut scheduler = open_scheduler(store, learner)?;
    let stitch = scheduler.cycle_tubes();
    print_stitch(scheduler.state(), &stitch);
    Ok(())
}

/// Run current command
fn run_current(store: &Arc<SnapshotStore>, learner: &str) -> anyhow::Result<()> {
    let mut scheduler = open_scheduler(store, learner)?;
    let stitch = scheduler.current_stitch();
    print_stitch(scheduler.state(), &stitch);
    Ok(())
}

/// Run complete command
fn run_complete(
    store: &Arc<SnapshotStore>,
    learner: &str,
    thread: &str,
    content: &str,
    score: u32,
    total: u32,
) -> anyhow::Result<()> {
    let mut scheduler = open_scheduler(store, learner)?;
    let stitch = scheduler.handle_stitch_completion(thread, content, score, total);

    let verdict = if score == total {
        "Perfect".green().bold()
    } else {
        "Try again".yellow().bold()
    };
    println!("{}: {} ({}/{})", verdict, content, score, total);
    print_stitch(scheduler.state(), &stitch);
    Ok(())
}

/// Run show command
fn run_show(store: &Arc<SnapshotStore>, learner: &str, limit: usize) -> anyhow::Result<()> {
    let mut scheduler = open_scheduler(store, learner)?;
    // Repairs the active tube number if needed
    scheduler.current_stitch();
    let state = scheduler.state();

    println!("{}", "=== Helix Tubes ===".cyan().bold());
    for number in TubeNumber::ALL {
        let Some(tube) = state.tube(number) else {
            continue;
        };
        println!();
        print_tube(number, tube, number.get() == state.active_tube_number, limit);
    }
    Ok(())
}

/// Run stats command
fn run_stats(store: &Arc<SnapshotStore>, learner: &str) -> anyhow::Result<()> {
    let scheduler = open_scheduler(store, learner)?;
    let stats = scheduler.stats();

    println!("{}", "=== Helix Session Statistics ===".cyan().bold());
    println!();
    println!("{}: {}", "Learner".white().bold(), learner);
    println!("{}: {}", "Total Points".white().bold(), stats.total_points);
    println!("{}: {}", "Completed Stitches".white().bold(), stats.completed_count);
    println!("{}: {}", "Perfect Passes".white().bold(), stats.perfect_count);
    println!("{}: {}", "Tube Cycles".white().bold(), stats.cycle_count);
    println!("{}: {:.1}%", "Accuracy".white().bold(), stats.accuracy * 100.0);
    println!(
        "{}: {}",
        "Infinite Play".white().bold(),
        if scheduler.state().infinite_play_mode { "on" } else { "off" }
    );
    Ok(())
}

/// Run infinite command
fn run_infinite(store: &Arc<SnapshotStore>, learner: &str, mode: Toggle) -> anyhow::Result<()> {
    let mut scheduler = open_scheduler(store, learner)?;
    let enabled = matches!(mode, Toggle::On);
    scheduler.set_infinite_play_mode(enabled);
    println!(
        "Infinite play {}",
        if enabled { "enabled".green() } else { "disabled".yellow() }
    );
    Ok(())
}

/// Run export command
fn run_export(store: &Arc<SnapshotStore>, learner: &str, output: PathBuf) -> anyhow::Result<()> {
    let scheduler = open_scheduler(store, learner)?;
    let json = serde_json::to_string_pretty(scheduler.state())?;
    std::fs::write(&output, json)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    println!("{} {}", "Exported to".green().bold(), output.display());
    Ok(())
}

/// Run import command
fn run_import(store: &Arc<SnapshotStore>, learner: &str, file: PathBuf) -> anyhow::Result<()> {
    let raw = std::fs::read_to_string(&file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let state: SchedulerState = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a scheduler snapshot", file.display()))?;

    let mut scheduler = open_scheduler(store, learner)?;
    scheduler.restore(state);
    println!(
        "{} {} ({} completions)",
        "Imported".green().bold(),
        file.display(),
        scheduler.state().completed_stitches.len()
    );
    Ok(())
}

/// Run reset command
fn run_reset(store: &Arc<SnapshotStore>, learner: &str) -> anyhow::Result<()> {
    if store.delete(learner)? {
        println!("{} snapshot for {}", "Deleted".red().bold(), learner);
    } else {
        println!("{}", format!("No snapshot for {}", learner).dimmed());
    }
    Ok(())
}

/// Run learners command
fn run_learners(store: &Arc<SnapshotStore>) -> anyhow::Result<()> {
    let learners = store.list_learners()?;
    if learners.is_empty() {
        println!("{}", "No learners found.".dimmed());
        return Ok(());
    }

    for summary in learners {
        println!(
            "{}  points={} completions={} cycles={}  {}",
            summary.learner_id.white().bold(),
            summary.total_points,
            summary.completed_count,
            summary.cycle_count,
            summary.updated_at.format("%Y-%m-%d %H:%M:%S").to_string().dimmed()
        );
    }
    Ok(())
}

// ============================================================================
// OUTPUT
// ============================================================================

fn print_stitch(state: &SchedulerState, stitch: &PositionEntry) {
    let thread = TubeNumber::new(state.active_tube_number)
        .and_then(|n| state.tube(n))
        .map(|t| t.thread_id.as_str())
        .unwrap_or("?");
    println!(
        "{} tube {} [{}]: {}  skip={} distractors={}",
        "Current".cyan().bold(),
        state.active_tube_number,
        thread,
        stitch.content_id.white().bold(),
        stitch.skip_number,
        stitch.distractor_level
    );
}

fn print_tube(number: TubeNumber, tube: &Tube, active: bool, limit: usize) {
    let marker = if active { " (active)".green().to_string() } else { String::new() };
    println!(
        "{}{}  thread={}  entries={}",
        format!("Tube {}", number).yellow().bold(),
        marker,
        tube.thread_id,
        tube.len()
    );

    for (pos, entry) in tube.ordered().take(limit) {
        let done = if entry.completed { "*" } else { " " };
        println!(
            "  {:>4} {} {:<24} skip={:<3} {}",
            pos, done, entry.content_id, entry.skip_number, entry.distractor_level
        );
    }
    if tube.len() > limit {
        println!("  {}", format!("... {} more", tube.len() - limit).dimmed());
    }
}
