use std::collections::btree_map::{self, BTreeMap};

/// Occurrence count of every distinct symbol in an input.
///
/// Backed by an ordered map so iteration, and therefore tree construction,
/// is deterministic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyMap<Symbol> {
    counts: BTreeMap<Symbol, usize>,
}

impl<Symbol: Ord> FrequencyMap<Symbol> {
    pub fn count(symbols: impl IntoIterator<Item = Symbol>) -> Self {
        let mut counts = BTreeMap::new();
        for s in symbols {
            *counts.entry(s).or_default() += 1;
        }

        Self { counts }
    }

    /// Combines counts taken over separate chunks of the same input.
    pub fn merge(mut self, other: Self) -> Self {
        for (s, n) in other.counts {
            *self.counts.entry(s).or_default() += n;
        }

        self
    }

    pub fn get(&self, symbol: &Symbol) -> Option<usize> {
        self.counts.get(symbol).copied()
    }

    /// Number of distinct symbols.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Number of symbols counted, duplicates included.
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Symbol, usize)> {
        self.counts.iter().map(|(s, n)| (s, *n))
    }
}

impl<Symbol: Ord> FromIterator<Symbol> for FrequencyMap<Symbol> {
    fn from_iter<I: IntoIterator<Item = Symbol>>(iter: I) -> Self {
        Self::count(iter)
    }
}

impl<Symbol> IntoIterator for FrequencyMap<Symbol> {
    type Item = (Symbol, usize);
    type IntoIter = btree_map::IntoIter<Symbol, usize>;

    fn into_iter(self) -> Self::IntoIter {
        self.counts.into_iter()
    }
}
