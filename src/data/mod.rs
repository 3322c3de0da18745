// mod.rs - Data structures module

pub mod fasta;
pub mod haplotypes;

// Re-export main types for convenience
pub use fasta::{load_haplotype_pairs, read_haplotype_pairs};
pub use haplotypes::{HaplotypeStore, Sample, ScanError};
