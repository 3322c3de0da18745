// args.rs - Command line arguments definition

use argh::FromArgs;

/// Default comma-separated score metric list
pub const DEFAULT_SCORE_METRICS: &str = "he,ho,ae,pic,pd,pad4";

#[derive(FromArgs)]
/// microhap - Sliding-window microhaplotype informativeness scanner
pub struct Args {
    /// FASTA file with phased haplotypes (<sample>_h1 / <sample>_h2 records)
    #[argh(option)]
    pub fasta: Option<String>,

    /// window width in positions
    #[argh(option)]
    pub window: Option<usize>,

    /// output directory for summaries and allele tables
    #[argh(option)]
    pub outdir: Option<String>,

    /// random seed for LD pair and group sampling (default: 42)
    #[argh(option, default = "42")]
    pub seed: u64,

    /// summary format: tsv, csv, json (default: tsv)
    #[argh(option, default = "String::from(\"tsv\")")]
    pub format: String,

    /// number of threads (default: auto-detect)
    #[argh(option)]
    pub threads: Option<usize>,

    /// process windows one at a time instead of on the thread pool
    #[argh(switch)]
    pub sequential: bool,

    /// position pairs sampled for LD in wide windows (default: 20)
    #[argh(option, default = "20")]
    pub ld_pairs: usize,

    /// windows up to this width evaluate every LD position pair (default: 10)
    #[argh(option, default = "10")]
    pub ld_exhaustive_positions: usize,

    /// enumerate all sample groups while C(N,k) stays at or below this (default: 50000)
    #[argh(option, default = "50000")]
    pub exhaustive_limit: u64,

    /// random sample groups drawn above the exhaustive limit (default: 10000)
    #[argh(option, default = "10000")]
    pub group_samples: usize,

    /// comma-separated score metrics: he, ho, ae, pic, pd, pad2, pad3, pad4, hwe, hwe-simple, ld-penalty
    #[argh(option, default = "String::from(DEFAULT_SCORE_METRICS)")]
    pub score_metrics: String,

    /// divisor applied to Ae before scoring (default: 10)
    #[argh(option, default = "10.0")]
    pub ae_scale: f64,

    /// include only samples matching regex pattern
    #[argh(option)]
    pub include_samples: Option<String>,

    /// exclude samples matching regex pattern
    #[argh(option)]
    pub exclude_samples: Option<String>,

    /// include only samples listed in a file (one sample per line)
    #[argh(option)]
    pub include_samples_list: Option<String>,

    /// exclude samples listed in a file (one sample per line)
    #[argh(option)]
    pub exclude_samples_list: Option<String>,

    /// skip the per-window allele frequency tables
    #[argh(switch)]
    pub no_allele_tables: bool,

    /// number of best windows to print after the scan (default: 10)
    #[argh(option, default = "10")]
    pub top: usize,

    /// validate inputs without computation (dry run)
    #[argh(switch)]
    pub dry_run: bool,

    /// path to TOML configuration file
    #[argh(option)]
    pub config: Option<String>,

    /// generate sample configuration file and exit
    #[argh(switch)]
    pub generate_config: bool,
}
