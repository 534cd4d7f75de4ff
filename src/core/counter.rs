// eximscope - GPL-3.0-or-later
// This file is part of eximscope.
//
// Copyright (C) 2025 Daniel Freiermuth
//
// eximscope is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// eximscope is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with eximscope.  If not, see <https://www.gnu.org/licenses/>.

//! Frequency counting shared by all analyses.

use indexmap::IndexMap;
use serde::Serialize;
use std::hash::Hash;

/// Insert-or-increment counter that remembers first-seen order.
///
/// Keys only enter the map through [`FrequencyCounter::increment`], so every
/// stored count is at least one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FrequencyCounter<K: Hash + Eq> {
    counts: IndexMap<K, usize>,
}

impl<K: Hash + Eq> FrequencyCounter<K> {
    pub fn new() -> Self {
        Self {
            counts: IndexMap::new(),
        }
    }

    pub fn increment(&mut self, key: K) {
        *self.counts.entry(key).or_insert(0) += 1;
    }

    pub fn get<Q>(&self, key: &Q) -> usize
    where
        Q: Hash + indexmap::Equivalent<K> + ?Sized,
    {
        self.counts.get(key).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sum of all counts
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    /// Entries in first-seen order
    pub fn iter(&self) -> impl Iterator<Item = (&K, usize)> {
        self.counts.iter().map(|(k, &v)| (k, v))
    }

    /// Entries sorted by descending count; ties keep first-seen order
    pub fn most_common(&self) -> Vec<(&K, usize)> {
        let mut entries: Vec<(&K, usize)> = self.iter().collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1));
        entries
    }

    /// The `n` largest entries, same ordering as [`Self::most_common`]
    pub fn top(&self, n: usize) -> Vec<(&K, usize)> {
        let mut entries = self.most_common();
        entries.truncate(n);
        entries
    }

    /// Drop every key counted fewer than `min` times
    #[must_use]
    pub fn at_least(mut self, min: usize) -> Self {
        self.counts.retain(|_, count| *count >= min);
        self
    }
}

impl<K: Hash + Eq> Default for FrequencyCounter<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Hash + Eq> FromIterator<K> for FrequencyCounter<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut counter = Self::new();
        for key in iter {
            counter.increment(key);
        }
        counter
    }
}
