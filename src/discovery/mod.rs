//! Group discovery engine.
//!
//! Reconstructs which symbols share a rate-limit budget using nothing but the
//! accept/reject answers of the service.
//!
//! For every symbol after the first, in alphabet order, each known group is
//! tested in discovery order:
//! 1. **Drain**: probe the group's representative until it is rejected, so the
//!    group's bucket is known to be empty.
//! 2. **Test**: probe the symbol once. A rejection means it draws from the
//!    bucket that was just emptied, so it joins that group and no further
//!    groups are tested. An acceptance means its bucket still had budget.
//! 3. **Settle**: wait one replenishment interval.
//!
//! A symbol no group claims starts a new group. After each symbol the engine
//! waits out the rest of the one-second rate window, so the next symbol's
//! tests start from a predictable bucket state.
//!
//! Probing is strictly sequential: one probe in flight, and the engine owns
//! the channel for the whole run.

mod partition;

use std::fmt;
use std::time::Duration;

use log::{debug, info, trace};
use serde::Serialize;
use tokio::time::Instant;

use crate::budget::BudgetModel;
use crate::channel::{Channel, Outcome, Symbol};
use crate::error_handling::{DiscoveryError, ProbeContext, ProbePhase};

pub use partition::{Alphabet, Group, Partition};

/// Outcome of a successful discovery run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryReport<S> {
    /// Discovered groups, in canonical order
    pub partition: Partition<S>,
    /// Wall-clock duration of the run
    pub elapsed: Duration,
    /// Number of probes sent during the run
    pub probes: u64,
}

#[derive(Serialize)]
struct ReportJson<'a, S> {
    groups: &'a Partition<S>,
    elapsed_ms: u64,
    probes: u64,
}

impl<S: Symbol + Serialize> DiscoveryReport<S> {
    /// Machine-readable form: `{"groups": [[..], ..], "elapsed_ms": .., "probes": ..}`.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&ReportJson {
            groups: &self.partition,
            elapsed_ms: u64::try_from(self.elapsed.as_millis()).unwrap_or(u64::MAX),
            probes: self.probes,
        })
    }
}

impl<S: Symbol> fmt::Display for DiscoveryReport<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Found {} group{} in {}ms ({} probes): {}",
            self.partition.len(),
            if self.partition.len() == 1 { "" } else { "s" },
            self.elapsed.as_millis(),
            self.probes,
            self.partition
        )
    }
}

/// Drives a channel to discover the partition of an alphabet.
pub struct DiscoveryEngine<C> {
    channel: C,
    budget: BudgetModel,
    probes: u64,
}

impl<C> DiscoveryEngine<C> {
    pub fn new(channel: C, budget: BudgetModel) -> Self {
        Self {
            channel,
            budget,
            probes: 0,
        }
    }

    pub fn budget(&self) -> &BudgetModel {
        &self.budget
    }

    /// Probes sent over the lifetime of this engine.
    pub fn probes_sent(&self) -> u64 {
        self.probes
    }

    /// Gives the channel back, closing nothing.
    pub fn into_channel(self) -> C {
        self.channel
    }

    /// Classifies every symbol of `alphabet`.
    ///
    /// # Errors
    ///
    /// Any channel failure or drain overrun aborts the run; no partial
    /// partition is returned. The error carries the symbol, candidate group
    /// and phase that failed.
    pub async fn discover<S>(
        &mut self,
        alphabet: &Alphabet<S>,
    ) -> Result<DiscoveryReport<S>, DiscoveryError>
    where
        S: Symbol,
        C: Channel<S>,
    {
        let started = Instant::now();
        let probes_before = self.probes;
        info!(
            "Rate limit {}/s; replenish interval {:?}; {} symbols to classify",
            self.budget.rate_limit(),
            self.budget.replenish_interval(),
            alphabet.len()
        );

        let (seed, rest) = alphabet.split_first();

        let mut found = vec![Group::new(seed.clone())];
        for symbol in rest {
            info!("Testing {}", symbol);
            let mut matched = None;
            for (index, group) in found.iter().enumerate() {
                let rejected = self
                    .test_group(symbol, index, group.representative())
                    .await?;
                pause(self.budget.settle_delay()).await;
                if rejected {
                    matched = Some(index);
                    break;
                }
            }

            match matched {
                Some(index) => {
                    debug!("{} joins group #{}", symbol, index);
                    found[index].push(symbol.clone());
                }
                None => {
                    debug!("{} starts group #{}", symbol, found.len());
                    found.push(Group::new(symbol.clone()));
                }
            }
            pause(self.budget.window_remainder()).await;
        }

        let report = DiscoveryReport {
            partition: Partition::from_groups(found),
            elapsed: started.elapsed(),
            probes: self.probes - probes_before,
        };
        info!("{}", report);
        Ok(report)
    }

    /// Drains group `index` through `representative`, then tests `symbol`.
    /// Returns true when `symbol` was rejected, i.e. shares the group's budget.
    async fn test_group<S>(
        &mut self,
        symbol: &S,
        index: usize,
        representative: &S,
    ) -> Result<bool, DiscoveryError>
    where
        S: Symbol,
        C: Channel<S>,
    {
        let mut context = ProbeContext {
            symbol: symbol.to_string(),
            group: index,
            representative: representative.to_string(),
            phase: ProbePhase::Drain,
        };
        let drained = self.drain(representative, &context).await?;

        context.phase = ProbePhase::Test;
        let outcome = self.send(symbol, &context).await?;
        debug!(
            "Group #{} drained after {} probes of {}; {} {}",
            index, drained, representative, symbol, outcome
        );
        Ok(outcome.is_rejected())
    }

    /// Probes `representative` until the first rejection and returns the
    /// number of probes sent, the rejected one included.
    ///
    /// # Errors
    ///
    /// `DrainLimitExceeded` if no rejection arrives within
    /// `BudgetModel::max_drain_probes`.
    async fn drain<S>(
        &mut self,
        representative: &S,
        context: &ProbeContext,
    ) -> Result<u32, DiscoveryError>
    where
        S: Symbol,
        C: Channel<S>,
    {
        let limit = self.budget.max_drain_probes();
        for sent in 1..=limit {
            if self.send(representative, context).await?.is_rejected() {
                return Ok(sent);
            }
        }
        Err(DiscoveryError::DrainLimitExceeded {
            context: context.clone(),
            probes: limit,
        })
    }

    async fn send<S>(&mut self, symbol: &S, context: &ProbeContext) -> Result<Outcome, DiscoveryError>
    where
        S: Symbol,
        C: Channel<S>,
    {
        self.probes += 1;
        let outcome = self
            .channel
            .probe(symbol)
            .await
            .map_err(|source| DiscoveryError::from_channel(context.clone(), source))?;
        trace!("probe #{} {} ({}): {}", self.probes, symbol, context.phase, outcome);
        Ok(outcome)
    }
}

/// Validates the inputs, then runs a discovery over `channel`.
///
/// Nothing is sent when the rate limit or the alphabet is invalid.
pub async fn discover_partition<C, S, I>(
    channel: C,
    symbols: I,
    rate_limit: u32,
) -> Result<DiscoveryReport<S>, DiscoveryError>
where
    C: Channel<S>,
    S: Symbol,
    I: IntoIterator<Item = S>,
{
    let budget = BudgetModel::new(rate_limit)?;
    let alphabet = Alphabet::new(symbols)?;
    DiscoveryEngine::new(channel, budget)
        .discover(&alphabet)
        .await
}

async fn pause(duration: Duration) {
    if !duration.is_zero() {
        tokio::time::sleep(duration).await;
    }
}
