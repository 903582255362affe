//! bucket_probe library: black-box discovery of shared rate-limit groups
//!
//! A service answers single-symbol requests with accepted or rejected, and
//! internally splits its alphabet into groups that share one token bucket.
//! This library reconstructs those groups from the accept/reject sequence
//! alone, given the per-group rate limit.
//!
//! # Example
//!
//! ```no_run
//! use bucket_probe::{run_discovery, Config};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config {
//!     address: "127.0.0.1:31337".to_string(),
//!     rate_limit: 5,
//!     ..Default::default()
//! };
//!
//! let report = run_discovery(config).await?;
//! println!("{}", report.partition);
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime with the time driver enabled.

pub mod budget;
pub mod channel;
pub mod config;
pub mod discovery;
pub mod error_handling;
pub mod initialization;
#[cfg(any(test, feature = "test-support"))]
pub mod oracle;

// Re-export public API
pub use budget::BudgetModel;
pub use channel::{Channel, Outcome, Symbol, TcpChannel};
pub use config::{Config, LogFormat, LogLevel};
pub use discovery::{
    discover_partition, Alphabet, DiscoveryEngine, DiscoveryReport, Group, Partition,
};
pub use error_handling::{ChannelError, ConfigurationError, DiscoveryError, ProbeContext};
pub use run::run_discovery;

// Internal run module (connects and drives one discovery)
mod run {
    use anyhow::{Context, Result};
    use log::info;

    use crate::config::Config;
    use crate::discovery::{DiscoveryEngine, DiscoveryReport};
    use crate::initialization::init_channel;

    /// Runs one discovery against the configured service.
    ///
    /// Validates the configuration before connecting, opens a single TCP
    /// connection, classifies the alphabet and closes the connection.
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    /// - The rate limit or alphabet is invalid (nothing is sent)
    /// - The service cannot be reached
    /// - The service answers outside the protocol or drops the connection
    pub async fn run_discovery(config: Config) -> Result<DiscoveryReport<char>> {
        let budget = config.budget().context("Invalid rate limit")?;
        let alphabet = config.alphabet().context("Invalid alphabet")?;

        let channel = init_channel(&config)
            .await
            .context("Failed to open probe channel")?;
        info!(
            "Classifying {} symbols at {} requests/s per group",
            alphabet.len(),
            budget.rate_limit()
        );

        let mut engine = DiscoveryEngine::new(channel, budget);
        let report = engine
            .discover(&alphabet)
            .await
            .context("Discovery aborted; no partition produced")?;
        info!("Closing connection");
        Ok(report)
    }
}
