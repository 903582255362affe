//! Error handling.
//!
//! This module provides the error types for every failure a discovery run can
//! hit. They fall into:
//! - **Configuration**: rejected before any probe is sent
//! - **Channel**: a single probe exchange failed (protocol or transport)
//! - **Discovery**: a channel failure or drain overrun, tagged with the probe
//!   that caused it

mod types;

// Re-export public API
pub use types::{
    ChannelError, ConfigurationError, DiscoveryError, InitializationError, ProbeContext,
    ProbePhase,
};
