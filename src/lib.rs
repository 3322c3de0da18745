// lib.rs - microhap library root

//! # microhap - Sliding-window microhaplotype informativeness scanner
//!
//! This library scans a cohort of phased diploid haplotypes with a fixed-width
//! window and reports, per window, the population-genetics and forensic
//! statistics used to pick informative microhaplotype markers.
//!
//! ## Features
//!
//! - **Population metrics**: He, Ho, Ae, PIC, Fis, match probability, power of discrimination
//! - **HWE tests**: full genotype-class chi-square plus a two-category check
//! - **Linkage disequilibrium**: mean r² and D′ between positions inside a window
//! - **Mixture proxy**: distribution of distinct alleles across groups of 2, 3 and 4 samples
//! - **Reproducible**: every sampling step is seeded per window, sequential and parallel scans agree
//! - **Multiple formats**: TSV, CSV and JSON summaries plus per-window allele tables
//!
//! ## Basic Usage
//!
//! ```rust,no_run
//! use microhap::prelude::*;
//!
//! let samples = load_haplotype_pairs(std::path::Path::new("cohort.fasta"))?;
//! let store = HaplotypeStore::new(samples).map_err(|e| e.to_string())?;
//!
//! let config = EngineConfig::default().with_window_width(10).with_seed(42);
//! let ranked = scan_cohort(&store, config).map_err(|e| e.to_string())?;
//!
//! for result in ranked.top(5) {
//!     println!("{}-{}: {:?}", result.window.start_1based(), result.window.end_1based(), result.score);
//! }
//! # Ok::<(), String>(())
//! ```

// Re-export all main modules
pub mod cli;
pub mod core;
pub mod data;
pub mod output;

// Convenience prelude for common imports
pub mod prelude {
    pub use crate::cli::{validate_args, Args, ValidationResult};
    pub use crate::core::{scan_cohort, EngineConfig, RankedWindows, WindowEngine, WindowResult};
    pub use crate::core::{AlleleFrequencyTable, PopulationMetrics, ScoringPolicy, Window};
    pub use crate::data::{load_haplotype_pairs, HaplotypeStore, Sample, ScanError};
    pub use crate::output::{write_allele_tables, write_summary, SummaryFormat};
}

// Re-export main types at the root level for convenience
pub use cli::{Args, ValidationResult};
pub use core::{EngineConfig, RankedWindows, WindowEngine, WindowResult};
pub use data::{HaplotypeStore, Sample, ScanError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
