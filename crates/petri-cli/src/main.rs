//! CLI frontend for the Petri artificial-life engine.

mod commands;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "petri",
    about = "Petri: a 2D artificial-life sandbox",
    version,
    propagate_version = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the simulation headless and print a summary
    Run {
        /// Number of ticks to simulate
        #[arg(short, long, default_value = "600")]
        ticks: u64,

        /// RNG seed for deterministic simulation
        #[arg(short, long, default_value = "42")]
        seed: u64,

        /// Arena width
        #[arg(long, default_value = "800")]
        width: f64,

        /// Arena height
        #[arg(long, default_value = "600")]
        height: f64,

        /// Cells seeded at start
        #[arg(long, default_value = "10")]
        cells: usize,

        /// Food particles seeded at start
        #[arg(long, default_value = "20")]
        food: usize,

        /// Seconds per tick
        #[arg(long, default_value_t = 1.0 / 60.0)]
        dt: f64,

        /// JSON file with settings (missing fields use defaults)
        #[arg(long)]
        settings: Option<PathBuf>,

        /// JSON file with a trait table (default: built-in table)
        #[arg(long)]
        traits: Option<PathBuf>,

        /// Show the full event log
        #[arg(short, long)]
        verbose: bool,

        /// Print statistics and the final frame as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the trait table
    Traits {
        /// JSON file with a trait table (default: built-in table)
        #[arg(long)]
        traits: Option<PathBuf>,

        /// Print the table as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    // Logs go to stderr so `--json` output stays clean.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            ticks,
            seed,
            width,
            height,
            cells,
            food,
            dt,
            settings,
            traits,
            verbose,
            json,
        } => commands::run::run(&commands::run::RunOptions {
            ticks,
            seed,
            width,
            height,
            cells,
            food,
            dt,
            settings,
            traits,
            verbose,
            json,
        }),
        Commands::Traits { traits, json } => commands::traits::run(traits.as_deref(), json),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
