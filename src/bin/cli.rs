//! LiteStore CLI
//!
//! Offline inspection of a LiteStore data directory.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use litestore::inspect::{inspect_table, TableReport};
use litestore::store::list_tables;
use tracing_subscriber::{fmt, EnvFilter};

/// LiteStore CLI
#[derive(Parser, Debug)]
#[command(name = "litestore-cli")]
#[command(about = "Inspect and verify LiteStore tables")]
#[command(version)]
struct Args {
    /// Data directory
    #[arg(short, long, default_value = "./litestore_data")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the tables in the data directory
    Tables,

    /// Show record counts and live / dead space for a table
    Stats {
        /// Table name
        table: String,
    },

    /// Check that every index entry points at an intact record
    Verify {
        /// Table name
        table: String,
    },
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,litestore=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    tracing::debug!("LiteStore CLI v{}", litestore::VERSION);

    match run(&args) {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> litestore::Result<ExitCode> {
    match &args.command {
        Commands::Tables => {
            for table in list_tables(&args.data_dir)? {
                println!("{}", table);
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Stats { table } => {
            let report = inspect_table(&args.data_dir, table)?;
            print_stats(&report);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Verify { table } => {
            let report = inspect_table(&args.data_dir, table)?;
            if report.is_healthy() {
                println!("{}: OK ({} records)", report.table, report.records);
                return Ok(ExitCode::SUCCESS);
            }

            for problem in &report.problems {
                println!("{}: {}", report.table, problem);
            }
            println!(
                "{}: {} of {} entries damaged",
                report.table,
                report.problems.len(),
                report.records
            );
            Ok(ExitCode::FAILURE)
        }
    }
}

fn print_stats(report: &TableReport) {
    println!("table:          {}", report.table);
    println!("records:        {}", report.records);
    println!("data bytes:     {}", report.data_bytes);
    println!("live bytes:     {}", report.live_bytes);
    println!("dead bytes:     {}", report.dead_bytes);
    if report.indexed_fields.is_empty() {
        println!("indexed fields: -");
    } else {
        println!("indexed fields: {}", report.indexed_fields.join(", "));
    }
}
