// metrics.rs - Per-window population-genetics metrics
//
// Every metric is a pure function of the frequency table and/or the genotype
// list of one window. `None` marks a metric that is undefined for the window.

use crate::core::frequency::AlleleFrequencyTable;
use crate::core::stats::chi_square_sf;
use crate::core::window::Genotype;
use serde::Serialize;
use std::collections::HashMap;

/// Expected heterozygosity `He = 1 - Σ p_i²`
pub fn expected_heterozygosity(table: &AlleleFrequencyTable) -> Option<f64> {
    if table.is_empty() {
        return None;
    }
    Some((1.0 - table.homozygosity()).max(0.0))
}

/// Observed heterozygosity: fraction of samples with `a1 != a2`
pub fn observed_heterozygosity(genotypes: &[Genotype<'_>]) -> Option<f64> {
    if genotypes.is_empty() {
        return None;
    }
    let heterozygous = genotypes.iter().filter(|g| g.is_heterozygous()).count();
    Some(heterozygous as f64 / genotypes.len() as f64)
}

/// Effective number of alleles `Ae = 1 / Σ p_i²`
pub fn effective_number_of_alleles(table: &AlleleFrequencyTable) -> Option<f64> {
    let s = table.homozygosity();
    if s > 0.0 {
        Some(1.0 / s)
    } else {
        None
    }
}

/// `PIC = 1 - Σ p_i² - Σ_{i<j} 2 p_i² p_j²`
///
/// The pair sum is folded as `(Σ p²)² - Σ p⁴`.
pub fn polymorphism_information_content(table: &AlleleFrequencyTable) -> Option<f64> {
    if table.is_empty() {
        return None;
    }
    let s2 = table.homozygosity();
    let s4: f64 = table.frequencies().map(|p| p.powi(4)).sum();
    let pairs = s2 * s2 - s4;
    Some(1.0 - s2 - pairs)
}

/// One unordered genotype class under Hardy-Weinberg proportions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HweGenotype {
    /// Index into the frequency table, `allele_a <= allele_b`
    pub allele_a: usize,
    pub allele_b: usize,
    pub frequency: f64,
}

/// Genotype frequencies under HWE: `p_a²` for homozygotes, `2 p_a p_b` otherwise
pub fn genotype_frequencies_under_hwe(table: &AlleleFrequencyTable) -> Vec<HweGenotype> {
    let freqs: Vec<f64> = table.frequencies().collect();
    let mut classes = Vec::with_capacity(freqs.len() * (freqs.len() + 1) / 2);
    for (a, &pa) in freqs.iter().enumerate() {
        classes.push(HweGenotype {
            allele_a: a,
            allele_b: a,
            frequency: pa * pa,
        });
        for (b, &pb) in freqs.iter().enumerate().skip(a + 1) {
            classes.push(HweGenotype {
                allele_a: a,
                allele_b: b,
                frequency: 2.0 * pa * pb,
            });
        }
    }
    classes
}

/// Match probability `MP = Σ genotype_freq²` over the HWE genotype table.
///
/// Summed in closed form: `Σ p⁴ + Σ_{a<b} 4 p_a² p_b² = 2 (Σ p²)² - Σ p⁴`.
pub fn match_probability(table: &AlleleFrequencyTable) -> Option<f64> {
    if table.is_empty() {
        return None;
    }
    let s2 = table.homozygosity();
    let s4: f64 = table.frequencies().map(|p| p.powi(4)).sum();
    Some(2.0 * s2 * s2 - s4)
}

/// Probability that `m` independent allele draws are pairwise distinct:
/// `m! · Σ_{m-combinations} Π p_i`.
///
/// Each of the `m` individuals is one allele draw, not a diploid genotype.
/// The combination sum is the elementary symmetric polynomial `e_m(p)`,
/// accumulated without enumerating combinations.
pub fn probability_all_distinct(table: &AlleleFrequencyTable, m: usize) -> Option<f64> {
    if table.is_empty() {
        return None;
    }
    if m > table.num_alleles() {
        return Some(0.0);
    }
    let mut e = vec![0.0f64; m + 1];
    e[0] = 1.0;
    for p in table.frequencies() {
        for j in (1..=m).rev() {
            e[j] += e[j - 1] * p;
        }
    }
    let factorial: f64 = (1..=m).map(|k| k as f64).product();
    Some(factorial * e[m])
}

/// Result of a chi-square goodness-of-fit test
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChiSquareTest {
    pub statistic: f64,
    pub degrees_of_freedom: usize,
    pub p_value: f64,
}

/// Full HWE chi-square test over unordered genotype classes.
///
/// Classes with zero expected count are dropped; `df = classes - alleles`.
/// Undefined when there are no genotypes or `df <= 0`.
pub fn hardy_weinberg_test(
    genotypes: &[Genotype<'_>],
    table: &AlleleFrequencyTable,
) -> Option<ChiSquareTest> {
    let n = genotypes.len();
    if n == 0 || table.is_empty() {
        return None;
    }
    let n_f = n as f64;

    let mut observed: HashMap<(usize, usize), usize> = HashMap::new();
    for genotype in genotypes {
        let a = table.index_of(genotype.allele1)?;
        let b = table.index_of(genotype.allele2)?;
        *observed.entry((a.min(b), a.max(b))).or_insert(0) += 1;
    }

    // Summed in genotype-table order so the statistic is bit-stable
    let mut statistic = 0.0;
    let mut included_classes = 0usize;
    for class in genotype_frequencies_under_hwe(table) {
        let expected = class.frequency * n_f;
        if expected <= 0.0 {
            continue;
        }
        let count = observed
            .get(&(class.allele_a, class.allele_b))
            .copied()
            .unwrap_or(0);
        statistic += (count as f64 - expected).powi(2) / expected;
        included_classes += 1;
    }

    let num_alleles = table.num_alleles();
    if included_classes <= num_alleles {
        return None;
    }
    let degrees_of_freedom = included_classes - num_alleles;
    Some(ChiSquareTest {
        statistic,
        degrees_of_freedom,
        p_value: chi_square_sf(statistic, degrees_of_freedom as f64),
    })
}

/// Two-category HWE check: homozygote vs heterozygote counts against `He`,
/// one degree of freedom. Undefined when either expected count is zero.
pub fn simplified_hwe_test(genotypes: &[Genotype<'_>], he: Option<f64>) -> Option<ChiSquareTest> {
    let he = he?;
    let n = genotypes.len() as f64;
    let heterozygous = genotypes.iter().filter(|g| g.is_heterozygous()).count() as f64;
    let homozygous = n - heterozygous;

    let expected_het = he * n;
    let expected_hom = (1.0 - he) * n;
    if expected_het <= 0.0 || expected_hom <= 0.0 {
        return None;
    }

    let statistic = (heterozygous - expected_het).powi(2) / expected_het
        + (homozygous - expected_hom).powi(2) / expected_hom;
    Some(ChiSquareTest {
        statistic,
        degrees_of_freedom: 1,
        p_value: chi_square_sf(statistic, 1.0),
    })
}

/// Inbreeding coefficient `Fis = (He - Ho) / He`, 0 when `He = 0`
pub fn inbreeding_coefficient(he: Option<f64>, ho: Option<f64>) -> Option<f64> {
    let (he, ho) = (he?, ho?);
    if he == 0.0 {
        Some(0.0)
    } else {
        Some((he - ho) / he)
    }
}

/// All frequency/genotype metrics of one window
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PopulationMetrics {
    pub he: Option<f64>,
    pub ho: Option<f64>,
    pub ae: Option<f64>,
    pub pic: Option<f64>,
    pub fis: Option<f64>,
    pub mp: Option<f64>,
    pub pd: Option<f64>,
    pub prob_all_distinct_2: Option<f64>,
    pub prob_all_distinct_3: Option<f64>,
    pub prob_all_distinct_4: Option<f64>,
    pub hwe: Option<ChiSquareTest>,
    pub hwe_simple: Option<ChiSquareTest>,
}

impl PopulationMetrics {
    pub fn compute(genotypes: &[Genotype<'_>], table: &AlleleFrequencyTable) -> Self {
        let he = expected_heterozygosity(table);
        let ho = observed_heterozygosity(genotypes);
        let mp = match_probability(table);
        Self {
            he,
            ho,
            ae: effective_number_of_alleles(table),
            pic: polymorphism_information_content(table),
            fis: inbreeding_coefficient(he, ho),
            mp,
            pd: mp.map(|mp| 1.0 - mp),
            prob_all_distinct_2: probability_all_distinct(table, 2),
            prob_all_distinct_3: probability_all_distinct(table, 3),
            prob_all_distinct_4: probability_all_distinct(table, 4),
            hwe: hardy_weinberg_test(genotypes, table),
            hwe_simple: simplified_hwe_test(genotypes, he),
        }
    }

    pub fn hwe_p_value(&self) -> Option<f64> {
        self.hwe.map(|t| t.p_value)
    }

    pub fn hwe_simple_p_value(&self) -> Option<f64> {
        self.hwe_simple.map(|t| t.p_value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-12;

    fn genotype<'a>(a1: &'a str, a2: &'a str) -> Genotype<'a> {
        Genotype {
            sample_id: "s",
            allele1: a1,
            allele2: a2,
        }
    }

    fn table_for(genotypes: &[Genotype<'_>]) -> AlleleFrequencyTable {
        AlleleFrequencyTable::from_genotypes(genotypes)
    }

    #[test]
    fn test_monomorphic_window() {
        let genotypes = vec![genotype("ACG", "ACG"); 4];
        let table = table_for(&genotypes);
        let m = PopulationMetrics::compute(&genotypes, &table);

        assert_eq!(table.num_alleles(), 1);
        assert_eq!(m.he, Some(0.0));
        assert_eq!(m.ho, Some(0.0));
        assert_eq!(m.ae, Some(1.0));
        assert!(m.pic.unwrap().abs() < TOL);
        assert_eq!(m.fis, Some(0.0));
        assert!(m.hwe.is_none());
        assert!(m.hwe_simple.is_none());
    }

    #[test]
    fn test_two_sample_full_heterozygote() {
        let genotypes = vec![genotype("AAA", "TTT"), genotype("TTT", "AAA")];
        let table = table_for(&genotypes);
        let m = PopulationMetrics::compute(&genotypes, &table);

        assert!((m.he.unwrap() - 0.5).abs() < TOL);
        assert_eq!(m.ho, Some(1.0));
        assert!((m.ae.unwrap() - 2.0).abs() < TOL);
        // HWE classes: AA 0.25, TT 0.25, AT 0.5 -> 0.0625 + 0.0625 + 0.25
        assert!((m.mp.unwrap() - 0.375).abs() < TOL);
        assert!((m.pd.unwrap() - 0.625).abs() < TOL);
        assert!((m.fis.unwrap() + 1.0).abs() < TOL);
    }

    #[test]
    fn test_match_probability_matches_genotype_table() {
        let genotypes = vec![
            genotype("A", "C"),
            genotype("A", "A"),
            genotype("G", "T"),
            genotype("C", "C"),
            genotype("A", "G"),
        ];
        let table = table_for(&genotypes);
        let classes = genotype_frequencies_under_hwe(&table);

        assert_eq!(classes.len(), 10);
        let class_sum: f64 = classes.iter().map(|c| c.frequency).sum();
        assert!((class_sum - 1.0).abs() < TOL);

        let direct: f64 = classes.iter().map(|c| c.frequency * c.frequency).sum();
        let mp = match_probability(&table).unwrap();
        assert!((mp - direct).abs() < TOL);
        assert!((mp + (1.0 - mp) - 1.0).abs() < TOL);
    }

    #[test]
    fn test_pic_matches_pairwise_sum() {
        let genotypes = vec![genotype("A", "C"), genotype("G", "C"), genotype("T", "C")];
        let table = table_for(&genotypes);
        let p: Vec<f64> = table.frequencies().collect();

        let mut direct = 1.0 - p.iter().map(|x| x * x).sum::<f64>();
        for i in 0..p.len() {
            for j in (i + 1)..p.len() {
                direct -= 2.0 * p[i] * p[i] * p[j] * p[j];
            }
        }
        assert!((polymorphism_information_content(&table).unwrap() - direct).abs() < TOL);
    }

    #[test]
    fn test_effective_alleles_equiprobable() {
        let genotypes = vec![genotype("A", "C"), genotype("G", "T")];
        let table = table_for(&genotypes);
        assert!((effective_number_of_alleles(&table).unwrap() - 4.0).abs() < TOL);

        let skewed = vec![genotype("A", "A"), genotype("A", "T")];
        let table = table_for(&skewed);
        let ae = effective_number_of_alleles(&table).unwrap();
        assert!(ae >= 1.0 && ae < 2.0);
    }

    #[test]
    fn test_prob_all_distinct_two_all_distinct_cohort() {
        // 5 samples, 10 distinct alleles
        let alleles = ["A", "C", "G", "T", "AA", "CC", "GG", "TT", "AC", "GT"];
        let genotypes: Vec<Genotype> = alleles
            .chunks(2)
            .map(|pair| genotype(pair[0], pair[1]))
            .collect();
        let table = table_for(&genotypes);
        let p: Vec<f64> = table.frequencies().collect();

        let mut pair_sum = 0.0;
        for i in 0..p.len() {
            for j in (i + 1)..p.len() {
                pair_sum += p[i] * p[j];
            }
        }
        let pad2 = probability_all_distinct(&table, 2).unwrap();
        assert!((pad2 - 2.0 * pair_sum).abs() < TOL);
        // For m = 2 this is also 1 - Σ p² = He
        assert!((pad2 - expected_heterozygosity(&table).unwrap()).abs() < TOL);
        assert!((pad2 - 0.9).abs() < TOL);
    }

    #[test]
    fn test_prob_all_distinct_more_draws_than_alleles() {
        let genotypes = vec![genotype("A", "C"), genotype("C", "A")];
        let table = table_for(&genotypes);
        assert_eq!(probability_all_distinct(&table, 3), Some(0.0));
        assert!((probability_all_distinct(&table, 2).unwrap() - 0.5).abs() < TOL);
    }

    #[test]
    fn test_hwe_matches_explicit_table() {
        let genotypes = vec![
            genotype("A", "A"),
            genotype("A", "A"),
            genotype("A", "C"),
            genotype("C", "C"),
            genotype("A", "G"),
            genotype("C", "G"),
        ];
        let table = table_for(&genotypes);
        let test = hardy_weinberg_test(&genotypes, &table).unwrap();

        let n = genotypes.len() as f64;
        let mut observed: HashMap<(usize, usize), f64> = HashMap::new();
        for g in &genotypes {
            let a = table.index_of(g.allele1).unwrap();
            let b = table.index_of(g.allele2).unwrap();
            *observed.entry((a.min(b), a.max(b))).or_insert(0.0) += 1.0;
        }
        let explicit: f64 = genotype_frequencies_under_hwe(&table)
            .iter()
            .map(|c| {
                let e = c.frequency * n;
                let o = observed.get(&(c.allele_a, c.allele_b)).copied().unwrap_or(0.0);
                (o - e).powi(2) / e
            })
            .sum();

        assert_eq!(test.degrees_of_freedom, 3);
        assert!((test.statistic - explicit).abs() < 1e-9);
        // p = (5, 4, 3) / 12: 529/600 + 1/6 + 3/8 + 4/15 + 1/20 + 0 = 87/50
        assert!((test.statistic - 1.74).abs() < 1e-9);
        assert!((test.p_value - 0.628_077_8).abs() < 1e-6);
    }

    #[test]
    fn test_hwe_statistic_is_bit_stable() {
        let genotypes = vec![
            genotype("A", "A"),
            genotype("A", "C"),
            genotype("C", "G"),
            genotype("G", "T"),
            genotype("T", "T"),
            genotype("A", "T"),
            genotype("C", "C"),
        ];
        let table = table_for(&genotypes);
        let first = hardy_weinberg_test(&genotypes, &table).unwrap();
        for _ in 0..200 {
            let again = hardy_weinberg_test(&genotypes, &table).unwrap();
            assert_eq!(again.statistic.to_bits(), first.statistic.to_bits());
            assert_eq!(again.p_value.to_bits(), first.p_value.to_bits());
        }
    }

    #[test]
    fn test_simplified_hwe() {
        let genotypes = vec![genotype("A", "C"), genotype("A", "A"), genotype("C", "C"), genotype("C", "A")];
        let he = expected_heterozygosity(&table_for(&genotypes));
        let test = simplified_hwe_test(&genotypes, he).unwrap();
        // He = 0.5, 2 het / 2 hom observed -> perfect fit
        assert!(test.statistic.abs() < TOL);
        assert!((test.p_value - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_fis_zero_when_he_equals_ho() {
        assert_eq!(inbreeding_coefficient(Some(0.4), Some(0.4)), Some(0.0));
        assert_eq!(inbreeding_coefficient(Some(0.0), Some(0.0)), Some(0.0));
        assert_eq!(inbreeding_coefficient(Some(0.5), None), None);
    }
}
