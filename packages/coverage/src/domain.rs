//! Explicit key domain for coverage aggregation.
//!
//! Totals are accumulated over the full key domain first (every region
//! code, every populated hex cell), covered sums are accumulated
//! separately, and the two are merged by walking the domain and defaulting
//! absent covered keys to zero. A region or cell with no covered
//! population therefore still gets a row.

use std::collections::BTreeMap;

use access_atlas_coverage_models::CoverageStats;

/// Per-key population totals with a separate covered-population tally.
pub struct KeyDomain<K: Ord> {
    totals: BTreeMap<K, f64>,
    covered: BTreeMap<K, f64>,
}

impl<K: Ord + Clone> KeyDomain<K> {
    /// Seeds the domain with keys that must appear even when nothing is
    /// assigned to them.
    pub fn with_keys(keys: impl IntoIterator<Item = K>) -> Self {
        Self {
            totals: keys.into_iter().map(|key| (key, 0.0)).collect(),
            covered: BTreeMap::new(),
        }
    }

    /// Adds population to a key's total, extending the domain if needed.
    pub fn add_total(&mut self, key: &K, population: f64) {
        if let Some(total) = self.totals.get_mut(key) {
            *total += population;
        } else {
            self.totals.insert(key.clone(), population);
        }
    }

    /// Adds population to a key's covered tally.
    pub fn add_covered(&mut self, key: &K, population: f64) {
        if let Some(covered) = self.covered.get_mut(key) {
            *covered += population;
        } else {
            self.covered.insert(key.clone(), population);
        }
    }

    /// Merges covered sums onto the full domain and derives the stats,
    /// in ascending key order.
    pub fn finish(self) -> Vec<(K, CoverageStats)> {
        let Self { totals, covered } = self;
        debug_assert!(covered.keys().all(|key| totals.contains_key(key)));

        totals
            .into_iter()
            .map(|(key, pop_tot)| {
                let pop_cov = covered.get(&key).copied().unwrap_or(0.0);
                (key, CoverageStats::from_totals(pop_tot, pop_cov))
            })
            .collect()
    }
}
