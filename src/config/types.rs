//! Configuration types and CLI options.
//!
//! This module defines enums and structs used for command-line argument parsing
//! and configuration.

use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::budget::BudgetModel;
use crate::config::constants::{
    DEFAULT_ALPHABET, DEFAULT_PROBE_TIMEOUT_MS, DEFAULT_SERVER_ADDRESS, SERVER_ADDRESS_ENV,
};
use crate::discovery::Alphabet;
use crate::error_handling::ConfigurationError;

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace (every probe)
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// Controls how log messages are formatted:
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Library configuration (no CLI dependencies).
///
/// # Examples
///
/// ```no_run
/// use bucket_probe::Config;
///
/// let config = Config {
///     rate_limit: 5,
///     alphabet: "ABCD".to_string(),
///     ..Default::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Address (`host:port`) of the probed service
    pub address: String,

    /// Requests per second each group accepts before rejecting
    pub rate_limit: u32,

    /// Symbols to classify, one character each, in probing order
    pub alphabet: String,

    /// Extra delay added to every wait, in milliseconds
    pub safety_margin_ms: u64,

    /// Probes a drain may issue beyond `2 * rate_limit + 1` before giving up
    pub drain_slack: u32,

    /// Response timeout per probe in milliseconds (0 waits forever)
    pub probe_timeout_ms: u64,

    /// Log level
    pub log_level: LogLevel,

    /// Log format
    pub log_format: LogFormat,

    /// Print the final report as JSON instead of plain text
    pub json: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            address: DEFAULT_SERVER_ADDRESS.to_string(),
            rate_limit: 1,
            alphabet: DEFAULT_ALPHABET.to_string(),
            safety_margin_ms: 0,
            drain_slack: 0,
            probe_timeout_ms: DEFAULT_PROBE_TIMEOUT_MS,
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
            json: false,
        }
    }
}

impl Config {
    /// Checks everything that can be checked without touching the network.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        self.budget()?;
        self.alphabet()?;
        Ok(())
    }

    /// Budget model for the configured rate limit and margins.
    pub fn budget(&self) -> Result<BudgetModel, ConfigurationError> {
        Ok(BudgetModel::new(self.rate_limit)?
            .with_safety_margin(Duration::from_millis(self.safety_margin_ms))
            .with_drain_slack(self.drain_slack))
    }

    /// The configured alphabet, one symbol per character.
    pub fn alphabet(&self) -> Result<Alphabet<char>, ConfigurationError> {
        Alphabet::new(self.alphabet.chars())
    }

    /// Per-probe timeout, `None` when disabled.
    pub fn probe_timeout(&self) -> Option<Duration> {
        (self.probe_timeout_ms > 0).then(|| Duration::from_millis(self.probe_timeout_ms))
    }
}

/// Command-line options.
///
/// # Examples
///
/// ```bash
/// # Discover groups of a service limiting each group to 5 requests per second
/// bucket_probe --rate-limit 5
///
/// # Probe a custom alphabet on another host
/// SERVER_ADDRESS=10.0.0.7:31337 bucket_probe --rate-limit 20 --alphabet ABCDEF
/// ```
#[derive(Debug, Parser)]
#[command(
    name = "bucket_probe",
    about = "Discovers which symbols of a rate-limited service share a token bucket."
)]
pub struct Opt {
    /// Requests per second the service accepts per group
    #[arg(long, short = 'r')]
    pub rate_limit: u32,

    /// Service address (host:port)
    #[arg(long, env = SERVER_ADDRESS_ENV, default_value = DEFAULT_SERVER_ADDRESS)]
    pub address: String,

    /// Symbols to classify, one character each
    #[arg(long, default_value = DEFAULT_ALPHABET)]
    pub alphabet: String,

    /// Extra milliseconds added to every wait to absorb clock drift
    #[arg(long, default_value_t = 0)]
    pub safety_margin_ms: u64,

    /// Extra drain probes tolerated beyond 2 * rate_limit + 1
    #[arg(long, default_value_t = 0)]
    pub drain_slack: u32,

    /// Response timeout per probe in milliseconds (0 disables)
    #[arg(long, default_value_t = DEFAULT_PROBE_TIMEOUT_MS)]
    pub probe_timeout_ms: u64,

    /// Log level: error|warn|info|debug|trace
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log format: plain|json
    #[arg(long, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

impl From<Opt> for Config {
    fn from(opt: Opt) -> Self {
        Self {
            address: opt.address,
            rate_limit: opt.rate_limit,
            alphabet: opt.alphabet,
            safety_margin_ms: opt.safety_margin_ms,
            drain_slack: opt.drain_slack,
            probe_timeout_ms: opt.probe_timeout_ms,
            log_level: opt.log_level,
            log_format: opt.log_format,
            json: opt.json,
        }
    }
}
