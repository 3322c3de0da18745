// merge.rs - Merge configuration file with CLI arguments

use crate::cli::args::DEFAULT_SCORE_METRICS;
use crate::cli::{Args, Config};

impl Args {
    /// Merge with configuration from file
    /// CLI arguments take precedence over config file values
    pub fn merge_with_config(mut self, config: Config) -> Self {
        // Input/Output
        if self.fasta.is_none() {
            self.fasta = config.fasta;
        }
        if self.outdir.is_none() {
            self.outdir = config.outdir;
        }
        if let Some(format) = config.format.filter(|_| self.format == "tsv") {
            self.format = format;
        }
        if let Some(top) = config.top.filter(|_| self.top == 10) {
            self.top = top;
        }

        // Scan (only override defaults, not explicit CLI values)
        if self.window.is_none() {
            self.window = config.window;
        }
        if let Some(seed) = config.seed.filter(|_| self.seed == 42) {
            self.seed = seed;
        }

        // Performance
        if self.threads.is_none() {
            self.threads = config.threads;
        }

        // Sampling bounds
        if let Some(v) = config.ld_pairs.filter(|_| self.ld_pairs == 20) {
            self.ld_pairs = v;
        }
        if let Some(v) = config
            .ld_exhaustive_positions
            .filter(|_| self.ld_exhaustive_positions == 10)
        {
            self.ld_exhaustive_positions = v;
        }
        if let Some(v) = config.exhaustive_limit.filter(|_| self.exhaustive_limit == 50_000) {
            self.exhaustive_limit = v;
        }
        if let Some(v) = config.group_samples.filter(|_| self.group_samples == 10_000) {
            self.group_samples = v;
        }

        // Scoring
        if let Some(metrics) = config
            .score_metrics
            .filter(|_| self.score_metrics == DEFAULT_SCORE_METRICS)
        {
            self.score_metrics = metrics.join(",");
        }
        if let Some(scale) = config.ae_scale.filter(|_| self.ae_scale == 10.0) {
            self.ae_scale = scale;
        }

        // Sample filtering
        if self.include_samples.is_none() {
            self.include_samples = config.include_samples;
        }
        if self.exclude_samples.is_none() {
            self.exclude_samples = config.exclude_samples;
        }
        if self.include_samples_list.is_none() {
            self.include_samples_list = config.include_samples_list;
        }
        if self.exclude_samples_list.is_none() {
            self.exclude_samples_list = config.exclude_samples_list;
        }

        // Flags (CLI flags take precedence, config only sets if not explicitly set)
        if !self.sequential && config.sequential.unwrap_or(false) {
            self.sequential = true;
        }
        if !self.no_allele_tables && config.no_allele_tables.unwrap_or(false) {
            self.no_allele_tables = true;
        }
        if !self.dry_run && config.dry_run.unwrap_or(false) {
            self.dry_run = true;
        }

        self
    }

    /// Load configuration and merge with CLI args
    pub fn with_config_file(self, config_path: &str) -> Result<Self, String> {
        let config = Config::from_file(config_path)?;
        Ok(self.merge_with_config(config))
    }
}
