//! Cultiv Command-Line Interface
//!
//! Generates magic-state cultivation programs for the rotated surface code
//! and prints patch layouts.
//!
//! ```text
//! cultiv generate --distance 7 --prep unitstab --noise 0.001 -o d7.stim
//! cultiv generate --config sweep.yaml --hardware neutral_atom
//! cultiv layout --distance 5
//! ```

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use clap::{Parser, Subcommand};
use console::style;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::generate::Overrides;
use commands::{generate, layout, version};

/// Cultiv - surface-code magic-state cultivation program generator
#[derive(Parser)]
#[command(name = "cultiv")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a cultivation program
    Generate {
        /// Protocol config file (JSON or YAML)
        #[arg(short, long)]
        config: Option<String>,

        /// Final patch distance
        #[arg(short, long)]
        distance: Option<u32>,

        /// Preparation strategy (hookinj, optunit, unitstab)
        #[arg(long)]
        prep: Option<String>,

        /// Where the distance-3 code sits (spread, native)
        #[arg(long)]
        embedding: Option<String>,

        /// Helper register length (3 or 5)
        #[arg(long)]
        helper_length: Option<u32>,

        /// Noisy rounds on the full patch
        #[arg(short, long)]
        rounds: Option<u32>,

        /// Postselection mode (grown, unrotated, rotated)
        #[arg(long)]
        postselect: Option<String>,

        /// Physical error rate
        #[arg(short, long)]
        noise: Option<f64>,

        /// Hardware model (uniform, neutral_atom)
        #[arg(long)]
        hardware: Option<String>,

        /// Final readout (logical_y, handoff)
        #[arg(long)]
        observable: Option<String>,

        /// Stop after the postselection round
        #[arg(long)]
        cultivation_only: bool,

        /// Skip the gauge-fixing corrections after hook injection
        #[arg(long)]
        no_gauge_fix: bool,

        /// Check every fragment for qubits used twice in a moment
        #[arg(long)]
        verify: bool,

        /// Output file (.stim or .json); stdout if omitted
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Show the layout of a patch
    Layout {
        /// Patch distance
        #[arg(short, long, default_value = "5")]
        distance: u32,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show version information
    Version,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Execute command
    let result = match cli.command {
        Commands::Generate {
            config,
            distance,
            prep,
            embedding,
            helper_length,
            rounds,
            postselect,
            noise,
            hardware,
            observable,
            cultivation_only,
            no_gauge_fix,
            verify,
            output,
        } => {
            let overrides = Overrides {
                distance,
                prep,
                embedding,
                helper_length,
                rounds,
                postselect,
                noise,
                hardware,
                observable,
                cultivation_only,
                no_gauge_fix,
                verify,
            };
            generate::execute(config.as_deref(), &overrides, output.as_deref())
        }

        Commands::Layout { distance, json } => layout::execute(distance, json),

        Commands::Version => {
            version::execute();
            Ok(())
        }
    };

    // Handle errors
    if let Err(e) = result {
        eprintln!("{} {}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}
