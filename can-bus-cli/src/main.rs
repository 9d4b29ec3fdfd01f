//! CAN Bus Core CLI Application
//!
//! Command-line front-end for the can-bus-core library. It loads a descriptor
//! catalog (signals, states, commands and buses) from a TOML file and:
//! - Resolves signals, signal states and commands by name or value
//! - Validates the descriptor tables
//! - Replays recorded bus counters through the statistics tracker

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

mod config;
mod replay;
mod report;

/// CAN Bus Core - descriptor lookup and bus telemetry
#[derive(Parser, Debug)]
#[command(name = "can-bus-cli")]
#[command(about = "Look up CAN descriptors and replay bus statistics", long_about = None)]
#[command(version)]
struct Args {
    /// Path to catalog file (catalog.toml)
    #[arg(short, long, value_name = "FILE", default_value = "catalog.toml")]
    config: PathBuf,

    /// Verbosity level (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Find a signal by generic name
    Signal {
        name: String,
        /// Only match writable signals
        #[arg(long)]
        writable: bool,
    },
    /// Find a state of a signal by name or value
    State {
        signal: String,
        #[arg(long, conflicts_with = "value", required_unless_present = "value")]
        name: Option<String>,
        #[arg(long, allow_negative_numbers = true)]
        value: Option<i32>,
    },
    /// Find a command by generic name
    Command { name: String },
    /// Show catalog statistics and report duplicate entries
    Check,
    /// Replay recorded counter samples through the statistics tracker
    Replay {
        /// Print reports as JSON lines
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<ExitCode> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(args.verbose, args.quiet);

    log::info!("CAN Bus CLI v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Using core library v{}", can_bus_core::VERSION);

    let config = config::load_config(&args.config)?;
    log::debug!("Configuration loaded from {:?}", args.config);

    let catalog = config.catalog();
    let found = match &args.command {
        Cmd::Signal { name, writable } => {
            let signal = if *writable {
                catalog.writable_signal(name)
            } else {
                catalog.signal(name)
            };
            print_match(signal)?
        }
        Cmd::State {
            signal,
            name,
            value,
        } => {
            let state = match (name, value) {
                (Some(name), _) => catalog.signal_state(signal, name),
                (None, Some(value)) => catalog.signal_state_by_value(signal, *value),
                (None, None) => unreachable!("clap requires --name or --value"),
            };
            print_match(state)?
        }
        Cmd::Command { name } => print_match(catalog.command(name))?,
        Cmd::Check => {
            println!("{}", report::render_catalog_stats(&catalog.stats()));
            let issues = catalog.validate();
            for issue in &issues {
                println!("  ✗ {}", issue);
            }
            if issues.is_empty() {
                println!("✓ No duplicate descriptors");
            }
            issues.is_empty()
        }
        Cmd::Replay { json } => {
            let outcome = replay::run(&config);
            if *json {
                for stats in &outcome.reports {
                    println!("{}", serde_json::to_string(stats)?);
                }
            } else {
                println!("{}", report::render_header("Bus statistics replay", chrono::Utc::now()));
                for stats in &outcome.reports {
                    print!("{}", report::render_stats(stats));
                }
                println!("Bus activity at {} ms:", outcome.end_time_ms);
                print!("{}", report::render_activity(&outcome.buses, outcome.end_time_ms));
            }
            true
        }
    };

    Ok(if found {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Print a lookup result as JSON; returns false when nothing matched
fn print_match<T: serde::Serialize>(item: Option<&T>) -> Result<bool> {
    match item {
        Some(item) => {
            println!("{}", serde_json::to_string_pretty(item)?);
            Ok(true)
        }
        None => {
            println!("not found");
            Ok(false)
        }
    }
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;
    use std::io::Write;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}
