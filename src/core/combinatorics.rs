// combinatorics.rs - Distinct-allele distributions over groups of samples
//
// For a group of k samples, count the distinct allele strings among its 2k
// haplotypes. Small cohorts enumerate every k-subset lazily; large cohorts
// draw a fixed number of random k-subsets instead.

use crate::core::window::Genotype;
use itertools::Itertools;
use rand::seq::index;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Group sizes reported for every window
pub const GROUP_SIZES: [usize; 3] = [2, 3, 4];

/// Exhaustive vs sampled enumeration bounds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinatorialConfig {
    /// Enumerate every group while `C(N, k)` stays at or below this
    pub exhaustive_limit: u64,
    /// Random groups drawn once the limit is exceeded
    pub sample_size: usize,
}

impl Default for CombinatorialConfig {
    fn default() -> Self {
        Self {
            exhaustive_limit: 50_000,
            sample_size: 10_000,
        }
    }
}

/// `C(n, k)`, saturating at `u128::MAX`
pub fn binomial(n: usize, k: usize) -> u128 {
    if k > n {
        return 0;
    }
    let k = k.min(n - k);
    let mut result: u128 = 1;
    for i in 0..k {
        // Exact at every step: result * (n - i) is divisible by (i + 1)
        result = match result.checked_mul((n - i) as u128) {
            Some(v) => v / (i as u128 + 1),
            None => return u128::MAX,
        };
    }
    result
}

/// Probability mass over the number of distinct alleles `1..=2k`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiversityDistribution {
    pub group_size: usize,
    /// `probabilities[i - 1]` is the probability of exactly `i` distinct alleles
    pub probabilities: Vec<f64>,
    pub groups_evaluated: u64,
    pub exhaustive: bool,
}

impl DiversityDistribution {
    fn from_counts(group_size: usize, counts: &[u64], exhaustive: bool) -> Self {
        let total: u64 = counts.iter().sum();
        let probabilities = counts
            .iter()
            .map(|&c| if total > 0 { c as f64 / total as f64 } else { 0.0 })
            .collect();
        Self {
            group_size,
            probabilities,
            groups_evaluated: total,
            exhaustive,
        }
    }

    /// Probability of exactly `distinct` alleles (0 outside `1..=2k`)
    pub fn probability(&self, distinct: usize) -> f64 {
        if distinct == 0 {
            return 0.0;
        }
        self.probabilities.get(distinct - 1).copied().unwrap_or(0.0)
    }

    /// Expected number of distinct alleles in a group
    pub fn expected_distinct(&self) -> f64 {
        self.probabilities
            .iter()
            .enumerate()
            .map(|(i, p)| (i + 1) as f64 * p)
            .sum()
    }

    /// `1:0.0000;2:0.2500;…`
    pub fn compact(&self) -> String {
        self.probabilities
            .iter()
            .enumerate()
            .map(|(i, p)| format!("{}:{:.4}", i + 1, p))
            .collect::<Vec<_>>()
            .join(";")
    }
}

/// Intern each sample's two alleles as small integer ids
pub fn allele_ids<'a>(genotypes: &[Genotype<'a>]) -> Vec<[usize; 2]> {
    let mut ids: HashMap<&'a str, usize> = HashMap::new();
    let mut intern = |allele: &'a str| {
        let next = ids.len();
        *ids.entry(allele).or_insert(next)
    };
    genotypes
        .iter()
        .map(|g| [intern(g.allele1), intern(g.allele2)])
        .collect()
}

fn distinct_in_group(ids: &[[usize; 2]], group: &[usize], scratch: &mut Vec<usize>) -> usize {
    scratch.clear();
    for &sample in group {
        scratch.extend_from_slice(&ids[sample]);
    }
    scratch.sort_unstable();
    scratch.dedup();
    scratch.len()
}

/// Distribution of distinct alleles across groups of `k` samples.
///
/// `None` when the cohort has fewer than `k` samples.
pub fn diversity_distribution<R: Rng>(
    ids: &[[usize; 2]],
    k: usize,
    config: &CombinatorialConfig,
    rng: &mut R,
) -> Option<DiversityDistribution> {
    let n = ids.len();
    if k == 0 || n < k {
        return None;
    }

    let mut counts = vec![0u64; 2 * k];
    let mut scratch = Vec::with_capacity(2 * k);
    let total = binomial(n, k);

    if total <= config.exhaustive_limit as u128 {
        for group in (0..n).combinations(k) {
            let distinct = distinct_in_group(ids, &group, &mut scratch);
            counts[distinct - 1] += 1;
        }
        return Some(DiversityDistribution::from_counts(k, &counts, true));
    }

    for _ in 0..config.sample_size.max(1) {
        let group = index::sample(rng, n, k).into_vec();
        let distinct = distinct_in_group(ids, &group, &mut scratch);
        counts[distinct - 1] += 1;
    }
    Some(DiversityDistribution::from_counts(k, &counts, false))
}
