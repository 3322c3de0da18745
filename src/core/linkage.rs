//! Linkage disequilibrium between positions inside a window
//!
//! Window alleles are whole substrings, so each position pair is reduced to
//! single bases and to the two most frequent bases per position before the
//! classic two-locus statistics are computed.

use crate::core::window::Genotype;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// LD statistics for one pair of positions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LdStatistics {
    /// Raw disequilibrium for the major/major cell
    pub d: f64,
    /// |D| normalised by its bound given the marginals
    pub d_prime: f64,
    /// Squared allelic correlation
    pub r_squared: f64,
}

impl LdStatistics {
    const ZERO: Self = Self {
        d: 0.0,
        d_prime: 0.0,
        r_squared: 0.0,
    };
}

/// Pair selection bounds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LdConfig {
    /// Windows with at most this many positions enumerate every pair
    pub exhaustive_positions: usize,
    /// Pairs sampled per window above that size
    pub max_pairs: usize,
}

impl Default for LdConfig {
    fn default() -> Self {
        Self {
            exhaustive_positions: 10,
            max_pairs: 20,
        }
    }
}

/// Mean LD over the evaluated pairs of one window
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct LdSummary {
    pub r_squared_mean: Option<f64>,
    pub d_prime_mean: Option<f64>,
    pub pairs_evaluated: usize,
}

/// Two most frequent bases at one position (ties by byte value).
/// `None` when fewer than two bases are observed.
fn major_bases(haplotypes: &[&[u8]], pos: usize) -> Option<(u8, u8)> {
    let mut counts = [0usize; 256];
    for hap in haplotypes {
        counts[hap[pos] as usize] += 1;
    }
    let mut observed: Vec<(u8, usize)> = counts
        .iter()
        .enumerate()
        .filter(|&(_, &c)| c > 0)
        .map(|(b, &c)| (b as u8, c))
        .collect();
    if observed.len() < 2 {
        return None;
    }
    observed.sort_by(|(ba, ca), (bb, cb)| cb.cmp(ca).then_with(|| ba.cmp(bb)));
    Some((observed[0].0, observed[1].0))
}

/// LD between two positions over a haplotype pool.
///
/// Returns all-zero statistics when either position shows fewer than two bases,
/// and `None` when no haplotype carries major bases at both positions.
pub fn pairwise_ld(haplotypes: &[&[u8]], pos1: usize, pos2: usize) -> Option<LdStatistics> {
    let (a1, a2) = match major_bases(haplotypes, pos1) {
        Some(bases) => bases,
        None => return Some(LdStatistics::ZERO),
    };
    let (b1, b2) = match major_bases(haplotypes, pos2) {
        Some(bases) => bases,
        None => return Some(LdStatistics::ZERO),
    };

    let mut n = 0usize;
    let mut n_a1 = 0usize;
    let mut n_b1 = 0usize;
    let mut n_a1b1 = 0usize;
    for hap in haplotypes {
        let (x, y) = (hap[pos1], hap[pos2]);
        if (x != a1 && x != a2) || (y != b1 && y != b2) {
            continue;
        }
        n += 1;
        if x == a1 {
            n_a1 += 1;
        }
        if y == b1 {
            n_b1 += 1;
        }
        if x == a1 && y == b1 {
            n_a1b1 += 1;
        }
    }
    if n == 0 {
        return None;
    }

    let n = n as f64;
    let p_a1 = n_a1 as f64 / n;
    let p_b1 = n_b1 as f64 / n;
    let p_a2 = 1.0 - p_a1;
    let p_b2 = 1.0 - p_b1;
    let d = n_a1b1 as f64 / n - p_a1 * p_b1;

    let d_max = if d > 0.0 {
        (p_a1 * p_b2).min(p_a2 * p_b1)
    } else {
        (p_a1 * p_b1).min(p_a2 * p_b2)
    };
    let d_prime = if d != 0.0 && d_max > 0.0 {
        (d.abs() / d_max).min(1.0)
    } else {
        0.0
    };

    let denominator = p_a1 * p_a2 * p_b1 * p_b2;
    let r_squared = if denominator > 0.0 {
        (d * d / denominator).min(1.0)
    } else {
        0.0
    };

    Some(LdStatistics {
        d,
        d_prime,
        r_squared,
    })
}

/// Position pairs to evaluate: all pairs for small windows, otherwise a
/// bounded random subset drawn from `rng`.
pub fn select_position_pairs<R: Rng>(width: usize, config: &LdConfig, rng: &mut R) -> Vec<(usize, usize)> {
    if width < 2 {
        return Vec::new();
    }
    let total_pairs = width * (width - 1) / 2;
    if width <= config.exhaustive_positions || total_pairs <= config.max_pairs {
        return (0..width)
            .flat_map(|i| ((i + 1)..width).map(move |j| (i, j)))
            .collect();
    }

    let mut chosen = BTreeSet::new();
    while chosen.len() < config.max_pairs {
        let i = rng.random_range(0..width);
        let mut j = rng.random_range(0..width - 1);
        if j >= i {
            j += 1;
        }
        chosen.insert((i.min(j), i.max(j)));
    }
    chosen.into_iter().collect()
}

/// Mean r² and D' over the selected pairs of one window.
///
/// The pool is every sample's two substrings (`2N` haplotypes).
pub fn window_ld<R: Rng>(genotypes: &[Genotype<'_>], config: &LdConfig, rng: &mut R) -> LdSummary {
    let haplotypes: Vec<&[u8]> = genotypes
        .iter()
        .flat_map(|g| [g.allele1.as_bytes(), g.allele2.as_bytes()])
        .collect();
    let width = match haplotypes.first() {
        Some(hap) => hap.len(),
        None => return LdSummary::default(),
    };

    let mut r2_sum = 0.0;
    let mut d_prime_sum = 0.0;
    let mut evaluated = 0usize;
    for (pos1, pos2) in select_position_pairs(width, config, rng) {
        if let Some(ld) = pairwise_ld(&haplotypes, pos1, pos2) {
            r2_sum += ld.r_squared;
            d_prime_sum += ld.d_prime;
            evaluated += 1;
        }
    }

    if evaluated == 0 {
        return LdSummary::default();
    }
    LdSummary {
        r_squared_mean: Some(r2_sum / evaluated as f64),
        d_prime_mean: Some(d_prime_sum / evaluated as f64),
        pairs_evaluated: evaluated,
    }
}
