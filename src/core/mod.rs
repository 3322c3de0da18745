// mod.rs - Core logic module

pub mod combinatorics;
pub mod engine;
pub mod frequency;
pub mod linkage;
pub mod metrics;
pub mod scoring;
pub mod stats;
pub mod window;

// Re-export main types for convenience
pub use combinatorics::{CombinatorialConfig, DiversityDistribution, GROUP_SIZES};
pub use engine::{scan_cohort, EngineConfig, RankedWindows, ResultAggregator, WindowEngine, WindowResult};
pub use frequency::{AlleleFrequency, AlleleFrequencyTable};
pub use linkage::{LdConfig, LdSummary};
pub use metrics::{ChiSquareTest, PopulationMetrics};
pub use scoring::{ScoreMetric, ScoringPolicy, WindowScorer};
pub use window::{Genotype, Window, WindowScanner};
