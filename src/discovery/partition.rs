//! Alphabet, groups and partitions.

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

use crate::channel::Symbol;
use crate::config::DEFAULT_ALPHABET;
use crate::error_handling::ConfigurationError;

/// Ordered set of distinct symbols to classify.
///
/// The order only decides which symbol seeds the first group and the order
/// in which the rest are tested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alphabet<S> {
    symbols: Vec<S>,
}

impl<S: Symbol> Alphabet<S> {
    /// Validates and wraps `symbols`, keeping their order.
    ///
    /// # Errors
    ///
    /// - `EmptyAlphabet` if there are no symbols
    /// - `DuplicateSymbol` if a symbol occurs twice
    /// - `InvalidSymbol` if a symbol prints as an empty string or contains a
    ///   line break, since it could not be sent as one request line
    pub fn new<I>(symbols: I) -> Result<Self, ConfigurationError>
    where
        I: IntoIterator<Item = S>,
    {
        let symbols: Vec<S> = symbols.into_iter().collect();
        if symbols.is_empty() {
            return Err(ConfigurationError::EmptyAlphabet);
        }

        let mut seen = BTreeSet::new();
        for symbol in &symbols {
            let text = symbol.to_string();
            if text.is_empty() || text.contains(|c: char| c == '\n' || c == '\r') {
                return Err(ConfigurationError::InvalidSymbol(text));
            }
            if !seen.insert(symbol) {
                return Err(ConfigurationError::DuplicateSymbol(text));
            }
        }

        Ok(Self { symbols })
    }

    pub fn symbols(&self) -> &[S] {
        &self.symbols
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Always false for a constructed alphabet.
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// The seed symbol and the symbols still to classify.
    pub fn split_first(&self) -> (&S, &[S]) {
        // non-empty by construction
        (&self.symbols[0], &self.symbols[1..])
    }
}

impl Default for Alphabet<char> {
    /// The 26 uppercase Latin letters.
    fn default() -> Self {
        Self {
            symbols: DEFAULT_ALPHABET.chars().collect(),
        }
    }
}

/// Symbols believed to share one rate-limit budget.
///
/// Members keep insertion order; the first member is the representative used
/// to drain the group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Group<S> {
    members: Vec<S>,
}

impl<S: Symbol> Group<S> {
    pub fn new(first: S) -> Self {
        Self {
            members: vec![first],
        }
    }

    pub fn representative(&self) -> &S {
        &self.members[0]
    }

    pub fn push(&mut self, symbol: S) {
        self.members.push(symbol);
    }

    pub fn members(&self) -> &[S] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Always false: a group is created with its representative.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, symbol: &S) -> bool {
        self.members.contains(symbol)
    }
}

impl<S: Symbol> fmt::Display for Group<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, member) in self.members.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", member)?;
        }
        write!(f, "]")
    }
}

/// Final, immutable collection of disjoint groups.
///
/// Members of each group are sorted and groups are sorted by their content,
/// so two runs that find the same groups produce equal partitions regardless
/// of discovery order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Partition<S> {
    groups: Vec<Group<S>>,
}

impl<S: Symbol> Partition<S> {
    /// Normalizes discovered groups into their canonical order.
    pub fn from_groups(groups: Vec<Group<S>>) -> Self {
        let mut groups: Vec<Group<S>> = groups
            .into_iter()
            .map(|mut group| {
                group.members.sort();
                group
            })
            .collect();
        groups.sort_by(|a, b| a.members.cmp(&b.members));
        Self { groups }
    }

    pub fn groups(&self) -> &[Group<S>] {
        &self.groups
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Total number of classified symbols.
    pub fn symbol_count(&self) -> usize {
        self.groups.iter().map(Group::len).sum()
    }

    /// Index of the group holding `symbol`.
    pub fn group_of(&self, symbol: &S) -> Option<usize> {
        self.groups.iter().position(|g| g.contains(symbol))
    }

    /// The partition as a set of sets, ignoring all ordering.
    pub fn as_sets(&self) -> BTreeSet<BTreeSet<S>> {
        self.groups
            .iter()
            .map(|g| g.members.iter().cloned().collect())
            .collect()
    }
}

impl<S: Symbol> fmt::Display for Partition<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, group) in self.groups.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", group)?;
        }
        Ok(())
    }
}
