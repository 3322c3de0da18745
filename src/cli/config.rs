// config.rs - Configuration file support

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    // Input/Output
    pub fasta: Option<String>,
    pub outdir: Option<String>,
    pub format: Option<String>,
    pub no_allele_tables: Option<bool>,
    pub top: Option<usize>,

    // Scan
    pub window: Option<usize>,
    pub seed: Option<u64>,

    // Performance
    pub threads: Option<usize>,
    pub sequential: Option<bool>,

    // Sampling bounds
    pub ld_pairs: Option<usize>,
    pub ld_exhaustive_positions: Option<usize>,
    pub exhaustive_limit: Option<u64>,
    pub group_samples: Option<usize>,

    // Scoring
    pub score_metrics: Option<Vec<String>>,
    pub ae_scale: Option<f64>,

    // Sample filtering
    pub include_samples: Option<String>,
    pub exclude_samples: Option<String>,
    pub include_samples_list: Option<String>,
    pub exclude_samples_list: Option<String>,

    // Flags
    pub dry_run: Option<bool>,
}

impl Config {
    /// Create a new empty configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file '{}': {}", path.display(), e))?;

        let config = Self::from_toml_str(&content)
            .map_err(|e| format!("Failed to parse config file '{}': {}", path.display(), e))?;

        println!("📄 Loaded configuration from: {}", path.display());
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    /// Save configuration to TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), String> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize config: {}", e))?;

        fs::write(path, content)
            .map_err(|e| format!("Failed to write config file '{}': {}", path.display(), e))?;

        println!("📄 Saved configuration to: {}", path.display());
        Ok(())
    }

    /// Generate a sample configuration file with comments
    pub fn generate_sample() -> String {
        r#"# microhap.toml - Configuration file for microhap
# Command line arguments will override these settings

# =============================================================================
# INPUT/OUTPUT
# =============================================================================

# FASTA file with phased haplotypes (<sample>_h1 / <sample>_h2 records)
fasta = "/path/to/haplotypes.fasta"

# Output directory (summaries/ and alleles/ are created inside)
outdir = "microhap_out"

# Summary format: tsv, csv, json
format = "tsv"

# Skip the per-window allele frequency tables
no_allele_tables = false

# Number of best windows printed after the scan
top = 10

# =============================================================================
# SCAN
# =============================================================================

# Window width in positions
window = 10

# Random seed for LD pair sampling and large-cohort group sampling
seed = 42

# =============================================================================
# PERFORMANCE
# =============================================================================

# Number of threads (omit for auto-detection)
threads = 8

# Process windows one at a time
sequential = false

# =============================================================================
# SAMPLING BOUNDS
# =============================================================================

# Position pairs sampled for LD in windows wider than ld_exhaustive_positions
ld_pairs = 20
ld_exhaustive_positions = 10

# Enumerate every group of k samples while C(N,k) <= exhaustive_limit,
# otherwise draw group_samples random groups
exhaustive_limit = 50000
group_samples = 10000

# =============================================================================
# SCORING
# =============================================================================

# Metrics averaged into the ranking score (each clipped to [0,1])
# Available: he, ho, ae, pic, pd, pad2, pad3, pad4, hwe, hwe-simple, ld-penalty
score_metrics = ["he", "ho", "ae", "pic", "pd", "pad4"]

# Ae is divided by this before scoring
ae_scale = 10.0

# =============================================================================
# SAMPLE FILTERING
# =============================================================================

# Include only samples matching regex pattern
# include_samples = "HG.*"

# Exclude samples matching regex pattern
# exclude_samples = "control.*"

# Include only samples listed in a file (one sample per line)
# include_samples_list = "samples.txt"

# Exclude samples listed in a file (one sample per line)
# exclude_samples_list = "exclude.txt"

# =============================================================================
# FLAGS
# =============================================================================

# Validate inputs without computation (dry run)
dry_run = false
"#
        .to_string()
    }
}
