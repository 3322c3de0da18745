// frequency.rs - Pooled allele frequency distribution for one window

use crate::core::window::Genotype;
use serde::Serialize;
use std::collections::HashMap;

/// One distinct allele observed in a window
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlleleFrequency {
    pub allele: String,
    /// Display relabeling `A1, A2, …`
    pub label: String,
    pub count: usize,
    pub frequency: f64,
}

/// Frequencies of the distinct alleles among the `2N` pooled draws.
///
/// Entries are ordered by descending frequency, ties by ascending allele string;
/// labels follow that order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AlleleFrequencyTable {
    entries: Vec<AlleleFrequency>,
    total: usize,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl AlleleFrequencyTable {
    /// Pool both alleles of every genotype and count them
    pub fn from_genotypes(genotypes: &[Genotype<'_>]) -> Self {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for genotype in genotypes {
            *counts.entry(genotype.allele1).or_insert(0) += 1;
            *counts.entry(genotype.allele2).or_insert(0) += 1;
        }
        Self::from_counts(counts)
    }

    /// Build from raw allele counts
    pub fn from_counts<'s>(counts: impl IntoIterator<Item = (&'s str, usize)>) -> Self {
        let mut pairs: Vec<(&str, usize)> = counts.into_iter().filter(|(_, c)| *c > 0).collect();
        let total: usize = pairs.iter().map(|(_, c)| c).sum();

        // Integer counts give an exact frequency order
        pairs.sort_by(|(a, ca), (b, cb)| cb.cmp(ca).then_with(|| a.cmp(b)));

        let entries: Vec<AlleleFrequency> = pairs
            .into_iter()
            .enumerate()
            .map(|(i, (allele, count))| AlleleFrequency {
                allele: allele.to_string(),
                label: format!("A{}", i + 1),
                count,
                frequency: count as f64 / total as f64,
            })
            .collect();

        let index = entries
            .iter()
            .enumerate()
            .map(|(i, e)| (e.allele.clone(), i))
            .collect();

        Self {
            entries,
            total,
            index,
        }
    }

    pub fn entries(&self) -> &[AlleleFrequency] {
        &self.entries
    }

    /// `numAlleles`
    pub fn num_alleles(&self) -> usize {
        self.entries.len()
    }

    /// Number of pooled allele draws (`2N`)
    pub fn total_draws(&self) -> usize {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Frequencies in table order
    pub fn frequencies(&self) -> impl Iterator<Item = f64> + '_ {
        self.entries.iter().map(|e| e.frequency)
    }

    /// Position of an allele in table order
    pub fn index_of(&self, allele: &str) -> Option<usize> {
        self.index.get(allele).copied()
    }

    pub fn frequency_of(&self, allele: &str) -> f64 {
        self.index_of(allele)
            .map(|i| self.entries[i].frequency)
            .unwrap_or(0.0)
    }

    /// `Σ p_i²`
    pub fn homozygosity(&self) -> f64 {
        self.frequencies().map(|p| p * p).sum()
    }

    /// `A1(0.5000), A2(0.2500), …`
    pub fn labeled_summary(&self) -> String {
        self.entries
            .iter()
            .map(|e| format!("{}({:.4})", e.label, e.frequency))
            .collect::<Vec<_>>()
            .join(", ")
    }
}
