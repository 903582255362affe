//! Error type definitions.
//!
//! This module defines all error types used throughout the application.

use std::fmt;

use log::SetLoggerError;
use strum_macros::{Display, EnumIter};
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error opening the connection to the probed service.
    #[error("Connection error for {address}: {source}")]
    ConnectError {
        /// Address that could not be reached
        address: String,
        /// Underlying I/O failure
        source: std::io::Error,
    },
}

/// Invalid configuration, rejected before any probe is sent.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// The rate limit must be at least one request per second.
    #[error("rate limit must be greater than 0 (got {0})")]
    ZeroRateLimit(u32),

    /// The alphabet has no symbols to classify.
    #[error("alphabet must contain at least one symbol")]
    EmptyAlphabet,

    /// The same symbol occurs twice in the alphabet.
    #[error("alphabet contains duplicate symbol {0:?}")]
    DuplicateSymbol(String),

    /// A symbol cannot be sent as a single request line.
    #[error("symbol {0:?} cannot be sent as one request line")]
    InvalidSymbol(String),
}

/// Failure of a single probe exchange on a channel.
#[derive(Error, Debug)]
pub enum ChannelError {
    /// The response did not decode to accepted or rejected.
    #[error("undecodable response {0:?}")]
    Protocol(String),

    /// The underlying transport failed.
    #[error("transport failure: {0}")]
    Transport(#[from] std::io::Error),

    /// No response arrived within the configured timeout.
    #[error("no response within {0:?}")]
    Timeout(std::time::Duration),

    /// The peer closed the connection before a full response arrived.
    #[error("connection closed by peer")]
    Closed,
}

impl ChannelError {
    /// True when the peer answered, but with something other than `0` or `1`.
    pub fn is_protocol_violation(&self) -> bool {
        matches!(self, ChannelError::Protocol(_))
    }
}

/// Which half of a group test a probe belonged to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum ProbePhase {
    /// Probing the representative until the group budget is exhausted.
    Drain,
    /// The single probe of the symbol under classification.
    Test,
}

/// Where the engine was when a run failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeContext {
    /// Symbol being classified
    pub symbol: String,
    /// Index of the candidate group, in discovery order
    pub group: usize,
    /// Representative of the candidate group
    pub representative: String,
    /// Drain or test
    pub phase: ProbePhase,
}

impl fmt::Display for ProbeContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "testing {} against group #{} (representative {}, {} phase)",
            self.symbol, self.group, self.representative, self.phase
        )
    }
}

/// Error aborting a discovery run. No partial partition survives any of these.
#[derive(Error, Debug)]
pub enum DiscoveryError {
    /// The run was misconfigured.
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// The service answered with bytes outside the protocol.
    #[error("protocol violation while {context}: {source}")]
    Protocol {
        /// Probe that failed
        context: ProbeContext,
        /// Channel failure
        source: ChannelError,
    },

    /// The connection failed, timed out or closed mid-run.
    #[error("transport failure while {context}: {source}")]
    Transport {
        /// Probe that failed
        context: ProbeContext,
        /// Channel failure
        source: ChannelError,
    },

    /// A drain never saw a rejection.
    #[error("drain did not observe a rejection after {probes} probes while {context}; check the rate limit")]
    DrainLimitExceeded {
        /// Probe that failed
        context: ProbeContext,
        /// Probes issued before giving up
        probes: u32,
    },
}

impl DiscoveryError {
    /// Wraps a channel failure with the probe it occurred on.
    pub fn from_channel(context: ProbeContext, source: ChannelError) -> Self {
        if source.is_protocol_violation() {
            DiscoveryError::Protocol { context, source }
        } else {
            DiscoveryError::Transport { context, source }
        }
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, DiscoveryError::Configuration(_))
    }

    pub fn is_protocol_violation(&self) -> bool {
        matches!(self, DiscoveryError::Protocol { .. })
    }

    pub fn is_transport_failure(&self) -> bool {
        matches!(self, DiscoveryError::Transport { .. })
    }

    /// Probe context of a runtime failure; `None` for configuration errors.
    pub fn context(&self) -> Option<&ProbeContext> {
        match self {
            DiscoveryError::Configuration(_) => None,
            DiscoveryError::Protocol { context, .. }
            | DiscoveryError::Transport { context, .. }
            | DiscoveryError::DrainLimitExceeded { context, .. } => Some(context),
        }
    }
}
