//! In-memory reference service for offline validation.
//!
//! `ReferenceOracle` knows the ground-truth partition and answers membership
//! questions from a lookup table. It exercises the grouping logic of the
//! discovery engine without a live server or any timing semantics, and is not
//! meant to stand in for a real service.

use std::collections::{BTreeMap, BTreeSet};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::channel::{Channel, Outcome, Symbol};
use crate::error_handling::{ChannelError, ConfigurationError};

/// Ground-truth partition exposed as a probe channel.
///
/// As a channel, a probe is rejected exactly when its symbol shares a group
/// with the immediately preceding probe. Draining a group therefore takes at
/// most two probes of its representative, and the test probe that follows is
/// rejected exactly when the tested symbol belongs to the drained group.
#[derive(Debug, Clone)]
pub struct ReferenceOracle<S> {
    table: BTreeMap<S, usize>,
    previous: Option<usize>,
    probes: u64,
}

impl<S: Symbol> ReferenceOracle<S> {
    /// Builds the lookup table from ground-truth groups. Empty groups are
    /// ignored.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateSymbol` if a symbol appears in two groups.
    pub fn new<I, G>(groups: I) -> Result<Self, ConfigurationError>
    where
        I: IntoIterator<Item = G>,
        G: IntoIterator<Item = S>,
    {
        let mut table = BTreeMap::new();
        for (index, group) in groups.into_iter().enumerate() {
            for symbol in group {
                let text = symbol.to_string();
                if table.insert(symbol, index).is_some() {
                    return Err(ConfigurationError::DuplicateSymbol(text));
                }
            }
        }
        Ok(Self {
            table,
            previous: None,
            probes: 0,
        })
    }

    /// True when `a` and `b` share a budget. Unknown symbols share nothing.
    pub fn same_group(&self, a: &S, b: &S) -> bool {
        match (self.table.get(a), self.table.get(b)) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        }
    }

    pub fn group_of(&self, symbol: &S) -> Option<usize> {
        self.table.get(symbol).copied()
    }

    /// Probes answered so far.
    pub fn probes(&self) -> u64 {
        self.probes
    }

    /// The ground truth as a set of sets.
    pub fn ground_truth(&self) -> BTreeSet<BTreeSet<S>> {
        let mut groups: BTreeMap<usize, BTreeSet<S>> = BTreeMap::new();
        for (symbol, index) in &self.table {
            groups.entry(*index).or_default().insert(symbol.clone());
        }
        groups.into_values().collect()
    }

    /// All known symbols, in their natural order.
    pub fn symbols(&self) -> Vec<S> {
        self.table.keys().cloned().collect()
    }
}

impl<S: Symbol> Channel<S> for ReferenceOracle<S> {
    async fn probe(&mut self, symbol: &S) -> Result<Outcome, ChannelError> {
        let group = self
            .group_of(symbol)
            .ok_or_else(|| ChannelError::Protocol(format!("unknown symbol {}", symbol)))?;
        self.probes += 1;
        let outcome = if self.previous == Some(group) {
            Outcome::Rejected
        } else {
            Outcome::Accepted
        };
        self.previous = Some(group);
        Ok(outcome)
    }
}

/// Splits `symbols` into `groups` non-empty random groups, reproducibly for a
/// given `seed`.
///
/// The symbols are shuffled and cut at `groups - 1` distinct random points.
/// `groups` is clamped to `1..=symbols.len()`.
pub fn random_partition<S: Clone>(symbols: &[S], groups: usize, seed: u64) -> Vec<Vec<S>> {
    let n = symbols.len();
    if n == 0 {
        return Vec::new();
    }
    let k = groups.clamp(1, n);

    let mut rng = StdRng::seed_from_u64(seed);
    let mut shuffled = symbols.to_vec();
    shuffled.shuffle(&mut rng);

    if k == 1 {
        return vec![shuffled];
    }
    if k == n {
        return shuffled.into_iter().map(|s| vec![s]).collect();
    }

    let mut cuts: Vec<usize> = rand::seq::index::sample(&mut rng, n - 1, k - 1)
        .into_iter()
        .map(|i| i + 1)
        .collect();
    cuts.sort_unstable();

    let mut result = Vec::with_capacity(k);
    let mut last = 0;
    for cut in cuts {
        result.push(shuffled[last..cut].to_vec());
        last = cut;
    }
    result.push(shuffled[last..].to_vec());
    result
}
