// engine.rs - Window scan engine: per-window analysis, parallel driver and ranking

use crate::core::combinatorics::{
    allele_ids, diversity_distribution, CombinatorialConfig, DiversityDistribution, GROUP_SIZES,
};
use crate::core::frequency::AlleleFrequencyTable;
use crate::core::linkage::{window_ld, LdConfig, LdSummary};
use crate::core::metrics::PopulationMetrics;
use crate::core::scoring::{ScoringPolicy, WindowScorer};
use crate::core::window::{Window, WindowScanner};
use crate::data::{HaplotypeStore, ScanError};
use indicatif::{ProgressBar, ProgressStyle};
use rand::{RngCore, SeedableRng};
use rand_xoshiro::{SplitMix64, Xoshiro256PlusPlus};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// RNG stream tags, one per sampling step of a window
const LD_STREAM: u64 = 1;
const DIVERSITY_STREAM: u64 = 16;

/// Explicit run configuration for one scan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub window_width: usize,
    pub seed: u64,
    pub ld: LdConfig,
    pub combinatorial: CombinatorialConfig,
    pub scoring: ScoringPolicy,
    /// Process windows on the rayon pool
    pub parallel: bool,
    pub show_progress: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            window_width: 10,
            seed: 42,
            ld: LdConfig::default(),
            combinatorial: CombinatorialConfig::default(),
            scoring: ScoringPolicy::default(),
            parallel: true,
            show_progress: false,
        }
    }
}

impl EngineConfig {
    pub fn with_window_width(mut self, width: usize) -> Self {
        self.window_width = width;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// Everything computed for one window
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WindowResult {
    pub window: Window,
    pub num_alleles: usize,
    pub frequencies: AlleleFrequencyTable,
    pub metrics: PopulationMetrics,
    pub ld: LdSummary,
    /// One entry per group size in `GROUP_SIZES`
    pub diversity: Vec<Option<DiversityDistribution>>,
    pub score: Option<f64>,
}

impl WindowResult {
    pub fn start(&self) -> usize {
        self.window.start
    }

    /// Diversity distribution for group size `k`, if computed and defined
    pub fn diversity_for(&self, k: usize) -> Option<&DiversityDistribution> {
        GROUP_SIZES
            .iter()
            .position(|&size| size == k)
            .and_then(|i| self.diversity.get(i))
            .and_then(Option::as_ref)
    }
}

/// Independent RNG for one `(window, purpose)` pair, so results do not
/// depend on the order windows are processed in.
pub fn window_rng(seed: u64, start: usize, stream: u64) -> Xoshiro256PlusPlus {
    let window_seed = SplitMix64::seed_from_u64(seed ^ start as u64).next_u64();
    let stream_seed = SplitMix64::seed_from_u64(window_seed ^ stream).next_u64();
    Xoshiro256PlusPlus::seed_from_u64(stream_seed)
}

/// Computes and ranks window results over a validated cohort
pub struct WindowEngine<'a> {
    scanner: WindowScanner<'a>,
    config: EngineConfig,
    scorer: WindowScorer,
}

impl<'a> WindowEngine<'a> {
    /// Fails before any window is processed if the cohort cannot be scanned.
    pub fn new(store: &'a HaplotypeStore, config: EngineConfig) -> Result<Self, ScanError> {
        let scanner = WindowScanner::new(store, config.window_width)?;
        let scorer = WindowScorer::new(config.scoring.clone());
        Ok(Self {
            scanner,
            config,
            scorer,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn num_windows(&self) -> usize {
        self.scanner.len()
    }

    /// Full analysis of a single window
    pub fn analyze_window(&self, window: Window) -> WindowResult {
        let genotypes = self.scanner.genotypes(window);
        let frequencies = AlleleFrequencyTable::from_genotypes(&genotypes);
        let metrics = PopulationMetrics::compute(&genotypes, &frequencies);

        let mut ld_rng = window_rng(self.config.seed, window.start, LD_STREAM);
        let ld = window_ld(&genotypes, &self.config.ld, &mut ld_rng);

        let ids = allele_ids(&genotypes);
        let diversity = GROUP_SIZES
            .iter()
            .map(|&k| {
                let mut rng = window_rng(self.config.seed, window.start, DIVERSITY_STREAM + k as u64);
                diversity_distribution(&ids, k, &self.config.combinatorial, &mut rng)
            })
            .collect();

        let score = self.scorer.score(&metrics, &ld);

        WindowResult {
            window,
            num_alleles: frequencies.num_alleles(),
            frequencies,
            metrics,
            ld,
            diversity,
            score,
        }
    }

    fn progress_bar(&self) -> ProgressBar {
        if !self.config.show_progress {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new(self.num_windows() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} windows ({percent}%) {per_sec} ETA: {eta}")
                .unwrap()
                .progress_chars("#>-"),
        );
        pb
    }

    /// All window results in scan order (ascending start)
    pub fn scan(&self) -> Vec<WindowResult> {
        let pb = self.progress_bar();
        let starts: Vec<usize> = self.scanner.windows().map(|w| w.start).collect();

        let results: Vec<WindowResult> = if self.config.parallel {
            starts
                .into_par_iter()
                .map(|start| {
                    let result = self.analyze_window(self.scanner.window_at(start));
                    pb.inc(1);
                    result
                })
                .collect()
        } else {
            starts
                .into_iter()
                .map(|start| {
                    let result = self.analyze_window(self.scanner.window_at(start));
                    pb.inc(1);
                    result
                })
                .collect()
        };

        pb.finish_with_message("✅ Window scan completed!");
        results
    }

    /// Scan and rank
    pub fn run(&self) -> RankedWindows {
        let mut aggregator = ResultAggregator::with_capacity(self.num_windows());
        for result in self.scan() {
            aggregator.push(result);
        }
        aggregator.into_ranked()
    }
}

/// Score descending, ties by ascending start, undefined scores last
pub fn rank_order(a: &WindowResult, b: &WindowResult) -> Ordering {
    match (a.score, b.score) {
        (Some(x), Some(y)) => y.total_cmp(&x).then_with(|| a.start().cmp(&b.start())),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.start().cmp(&b.start()),
    }
}

/// Collects results in scan order until ranking
#[derive(Debug, Default)]
pub struct ResultAggregator {
    results: Vec<WindowResult>,
}

impl ResultAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            results: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, result: WindowResult) {
        self.results.push(result);
    }

    pub fn into_ranked(mut self) -> RankedWindows {
        self.results.sort_by(rank_order);
        RankedWindows {
            windows: self.results,
        }
    }
}

/// Final ranked table; no window is ever dropped
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedWindows {
    windows: Vec<WindowResult>,
}

impl RankedWindows {
    pub fn windows(&self) -> &[WindowResult] {
        &self.windows
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &WindowResult> {
        self.windows.iter()
    }

    pub fn top(&self, n: usize) -> &[WindowResult] {
        &self.windows[..n.min(self.windows.len())]
    }

    /// Windows with a defined score
    pub fn scored(&self) -> usize {
        self.windows.iter().filter(|w| w.score.is_some()).count()
    }
}

/// Validate, scan and rank in one call
pub fn scan_cohort(store: &HaplotypeStore, config: EngineConfig) -> Result<RankedWindows, ScanError> {
    let engine = WindowEngine::new(store, config)?;
    Ok(engine.run())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Sample;

    fn config(width: usize) -> EngineConfig {
        EngineConfig::default().with_window_width(width)
    }

    #[test]
    fn test_monomorphic_window() {
        let store = HaplotypeStore::new(
            (1..=4)
                .map(|i| Sample::new(format!("s{}", i), "ACG", "ACG"))
                .collect(),
        )
        .unwrap();
        let ranked = scan_cohort(&store, config(3)).unwrap();
        assert_eq!(ranked.len(), 1);

        let result = &ranked.windows()[0];
        assert_eq!(result.num_alleles, 1);
        assert_eq!(result.metrics.he, Some(0.0));
        assert_eq!(result.metrics.ho, Some(0.0));
        assert_eq!(result.metrics.ae, Some(1.0));
        assert_eq!(result.metrics.pic, Some(0.0));
        assert_eq!(result.metrics.hwe_p_value(), None);
        assert_eq!(result.ld.r_squared_mean, Some(0.0));
        let k2 = result.diversity_for(2).unwrap();
        assert_eq!(k2.probability(1), 1.0);
    }

    #[test]
    fn test_two_sample_heterozygotes() {
        let store = HaplotypeStore::new(vec![
            Sample::new("s1", "AAA", "CCC"),
            Sample::new("s2", "CCC", "AAA"),
        ])
        .unwrap();
        let engine = WindowEngine::new(&store, config(3)).unwrap();
        let result = engine.analyze_window(Window::new(0, 3));

        assert_eq!(result.metrics.he, Some(0.5));
        assert_eq!(result.metrics.ho, Some(1.0));
        assert_eq!(result.metrics.ae, Some(2.0));
        let mp = result.metrics.mp.unwrap();
        let pd = result.metrics.pd.unwrap();
        assert!((mp - 0.375).abs() < 1e-12);
        assert!((mp + pd - 1.0).abs() < 1e-12);
        assert!(result.diversity_for(3).is_none());
        assert!(result.diversity_for(4).is_none());
        assert_eq!(result.diversity_for(2).unwrap().probability(2), 1.0);
    }

    #[test]
    fn test_ranking_order_with_undefined_scores() {
        let store = HaplotypeStore::new(vec![
            Sample::new("s1", "AAAAT", "AAAAG"),
            Sample::new("s2", "AAAAC", "AAAAT"),
        ])
        .unwrap();
        let engine = WindowEngine::new(&store, config(1)).unwrap();
        let mut results = engine.scan();
        assert_eq!(results.len(), 5);
        assert!(results.windows(2).all(|w| w[0].start() < w[1].start()));

        results[1].score = None;
        results[3].score = None;
        let mut aggregator = ResultAggregator::new();
        for r in results {
            aggregator.push(r);
        }
        let ranked = aggregator.into_ranked();
        let starts: Vec<usize> = ranked.iter().map(|r| r.start()).collect();

        // Window 4 is polymorphic and outranks the monomorphic windows 0 and 2
        assert_eq!(starts, vec![4, 0, 2, 1, 3]);
        assert_eq!(ranked.scored(), 3);
        assert_eq!(ranked.top(2).len(), 2);
        assert_eq!(ranked.top(99).len(), 5);
    }

    #[test]
    fn test_sequential_and_parallel_agree() {
        let samples = (0..12)
            .map(|i| {
                let bases = ["ACGTTGCAAC", "ACGATGCTAC", "TCGTTGCAAG", "ACCTAGCAAC"];
                Sample::new(format!("s{:02}", i), bases[i % 4], bases[(i * 3 + 1) % 4])
            })
            .collect();
        let store = HaplotypeStore::new(samples).unwrap();
        let mut cfg = config(6);
        cfg.ld.exhaustive_positions = 2;
        cfg.ld.max_pairs = 4;
        cfg.combinatorial.exhaustive_limit = 10;
        cfg.combinatorial.sample_size = 200;

        let parallel = scan_cohort(&store, cfg.clone()).unwrap();
        cfg.parallel = false;
        let sequential = scan_cohort(&store, cfg).unwrap();
        assert_eq!(parallel, sequential);
    }

    #[test]
    fn test_window_rng_streams_differ() {
        use rand::Rng;
        let mut a = window_rng(1, 0, LD_STREAM);
        let mut b = window_rng(1, 1, LD_STREAM);
        let mut c = window_rng(1, 0, DIVERSITY_STREAM);
        let mut a2 = window_rng(1, 0, LD_STREAM);
        let x: u64 = a.random();
        assert_ne!(x, b.random::<u64>());
        assert_ne!(x, c.random::<u64>());
        assert_eq!(x, a2.random::<u64>());
    }

    #[test]
    fn test_degenerate_length_aborts() {
        let store = HaplotypeStore::new(vec![Sample::new("s1", "AC", "ACG")]).unwrap();
        let err = scan_cohort(&store, config(3)).err().unwrap();
        assert_eq!(
            err,
            ScanError::DegenerateLength {
                usable_length: 2,
                window_width: 3
            }
        );
    }
}
