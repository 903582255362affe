//! Configuration constants.
//!
//! This module contains defaults and protocol constants used throughout the
//! application.

use std::time::Duration;

/// Address of the probed service when neither `--address` nor the
/// environment provides one.
pub const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:31337";

/// Environment variable consulted for the service address.
pub const SERVER_ADDRESS_ENV: &str = "SERVER_ADDRESS";

/// Default alphabet: the 26 uppercase Latin letters.
pub const DEFAULT_ALPHABET: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";

// Wire protocol
/// Response line meaning the request was accepted
pub const RESPONSE_ACCEPTED: &[u8] = b"0\n";
/// Response line meaning the request was rejected
pub const RESPONSE_REJECTED: &[u8] = b"1\n";
/// Maximum number of bytes read for a single response line.
/// Anything longer without a newline is a protocol violation.
pub const MAX_RESPONSE_BYTES: u64 = 64;

/// Default time to wait for a single response (milliseconds)
pub const DEFAULT_PROBE_TIMEOUT_MS: u64 = 5_000;

/// Length of one rate-limit window. The service replenishes R tokens per window.
pub const RATE_WINDOW: Duration = Duration::from_secs(1);
