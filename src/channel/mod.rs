//! Probe channel: one symbol out, one outcome back.
//!
//! This module provides:
//! - The `Channel` trait the discovery engine drives
//! - The `Outcome` of a probe and the line codec of the wire protocol
//! - A TCP implementation (`TcpChannel`)
//!
//! Wire protocol: the request is the symbol followed by `\n`; the response is
//! exactly `0\n` (accepted) or `1\n` (rejected). Any other response is a
//! protocol violation and is never retried.

mod tcp;

use std::fmt;
use std::future::Future;

use serde::Serialize;
use strum_macros::Display;

use crate::config::{RESPONSE_ACCEPTED, RESPONSE_REJECTED};
use crate::error_handling::ChannelError;

pub use tcp::TcpChannel;

/// Anything that can be classified: ordered, cloneable and printable as one
/// request line.
pub trait Symbol: Ord + Clone + fmt::Display + fmt::Debug + Send + Sync {}

impl<T> Symbol for T where T: Ord + Clone + fmt::Display + fmt::Debug + Send + Sync {}

/// Result of a single probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize)]
pub enum Outcome {
    /// The group still had budget.
    Accepted,
    /// The group's budget was exhausted.
    Rejected,
}

impl Outcome {
    /// Decodes one response line.
    ///
    /// # Errors
    ///
    /// Returns `ChannelError::Protocol` for anything other than `0\n` or `1\n`.
    pub fn decode(response: &[u8]) -> Result<Self, ChannelError> {
        match response {
            RESPONSE_ACCEPTED => Ok(Outcome::Accepted),
            RESPONSE_REJECTED => Ok(Outcome::Rejected),
            other => Err(ChannelError::Protocol(
                String::from_utf8_lossy(other).into_owned(),
            )),
        }
    }

    /// Wire form of this outcome, as a server would send it.
    pub fn encode(self) -> &'static [u8] {
        match self {
            Outcome::Accepted => RESPONSE_ACCEPTED,
            Outcome::Rejected => RESPONSE_REJECTED,
        }
    }

    pub fn is_rejected(self) -> bool {
        self == Outcome::Rejected
    }
}

/// Request line for `symbol`.
pub fn encode_request<S: fmt::Display>(symbol: &S) -> String {
    format!("{}\n", symbol)
}

/// Sends single-symbol requests and reports whether they were accepted.
///
/// Every probe consumes one unit of the budget of the symbol's group on the
/// service side. Implementations must answer strictly in request order and
/// must surface lost probes as errors: the engine cannot reason about budget
/// state after a silent loss.
pub trait Channel<S: Symbol> {
    /// Sends `symbol` and waits for its outcome.
    fn probe(&mut self, symbol: &S) -> impl Future<Output = Result<Outcome, ChannelError>> + Send;
}
