//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `bucket_probe` library that handles:
//! - Command-line argument parsing
//! - Environment variable loading (.env file)
//! - Logger initialization
//! - User-facing output formatting
//!
//! All core functionality is implemented in the library crate.

use anyhow::{Context, Result};
use clap::Parser;
use std::process;

use bucket_probe::config::Opt;
use bucket_probe::initialization::init_logger_with;
use bucket_probe::{run_discovery, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // SERVER_ADDRESS may come from a .env file next to the working directory
    let _ = dotenvy::dotenv();

    let config = Config::from(Opt::parse());

    let log_level = config.log_level.clone();
    let log_format = config.log_format.clone();
    init_logger_with(log_level.into(), log_format).context("Failed to initialize logger")?;

    let json = config.json;
    match run_discovery(config).await {
        Ok(report) => {
            if json {
                println!("{}", report.to_json().context("Failed to encode report")?);
            } else {
                println!(
                    "Search took {}ms ({} probes); found {} partition{}:",
                    report.elapsed.as_millis(),
                    report.probes,
                    report.partition.len(),
                    if report.partition.len() == 1 { "" } else { "s" }
                );
                for group in report.partition.groups() {
                    println!("{}", group);
                }
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("bucket_probe error: {:#}", e);
            process::exit(1);
        }
    }
}
