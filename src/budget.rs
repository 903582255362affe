//! Token-bucket timing model of the probed service.
//!
//! The service replenishes each group's bucket at `R` tokens per second, so one
//! token regenerates every `1/R` seconds. The discovery engine uses this model
//! to pace its probes so every group test starts from a known bucket state.

use std::num::NonZeroU32;
use std::time::Duration;

use crate::config::RATE_WINDOW;
use crate::error_handling::ConfigurationError;

/// Timing model derived from a known per-group rate limit.
///
/// Pure value type: every accessor is a computation over the rate limit and
/// the operator-supplied margins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BudgetModel {
    rate_limit: NonZeroU32,
    safety_margin: Duration,
    drain_slack: u32,
}

impl BudgetModel {
    /// Creates a model for a service accepting `rate_limit` requests per second
    /// per group.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::ZeroRateLimit` if `rate_limit` is 0.
    pub fn new(rate_limit: u32) -> Result<Self, ConfigurationError> {
        let rate_limit =
            NonZeroU32::new(rate_limit).ok_or(ConfigurationError::ZeroRateLimit(rate_limit))?;
        Ok(Self {
            rate_limit,
            safety_margin: Duration::ZERO,
            drain_slack: 0,
        })
    }

    /// Adds `margin` to every wait. Decisions are unaffected.
    pub fn with_safety_margin(mut self, margin: Duration) -> Self {
        self.safety_margin = margin;
        self
    }

    /// Tolerates `slack` extra probes per drain before giving up.
    pub fn with_drain_slack(mut self, slack: u32) -> Self {
        self.drain_slack = slack;
        self
    }

    pub fn rate_limit(&self) -> u32 {
        self.rate_limit.get()
    }

    pub fn safety_margin(&self) -> Duration {
        self.safety_margin
    }

    /// Time for one token to regenerate: `1/R` seconds.
    pub fn replenish_interval(&self) -> Duration {
        RATE_WINDOW / self.rate_limit.get()
    }

    /// Wait after each group test, before the next candidate group.
    pub fn settle_delay(&self) -> Duration {
        self.replenish_interval() + self.safety_margin
    }

    /// Wait after a symbol is classified, aligning the next symbol to a
    /// whole rate window.
    pub fn window_remainder(&self) -> Duration {
        RATE_WINDOW.saturating_sub(self.replenish_interval()) + self.safety_margin
    }

    /// Upper bound on probes in one drain.
    ///
    /// A full bucket holds at most `R` tokens, and tokens keep regenerating
    /// while the drain's probes are in flight. The bound allows up to `R`
    /// regenerated tokens on top of a full bucket: `2R + 1` probes, plus the
    /// configured slack.
    pub fn max_drain_probes(&self) -> u32 {
        self.rate_limit
            .get()
            .saturating_mul(2)
            .saturating_add(1)
            .saturating_add(self.drain_slack)
    }
}
