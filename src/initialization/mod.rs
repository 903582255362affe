//! Application initialization and resource setup.
//!
//! This module provides functions to initialize shared resources:
//! - The logger
//! - The probe channel to the service
//!
//! All initialization functions return proper error types for error handling.

mod logger;

use crate::channel::TcpChannel;
use crate::config::Config;
use crate::error_handling::InitializationError;

// Re-export public API
pub use logger::init_logger_with;

/// Opens the TCP channel to the configured service address.
///
/// # Errors
///
/// Returns `InitializationError::ConnectError` if the service is unreachable.
pub async fn init_channel(config: &Config) -> Result<TcpChannel, InitializationError> {
    TcpChannel::connect(&config.address, config.probe_timeout()).await
}
