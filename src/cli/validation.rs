// validation.rs - Input validation utilities

use crate::cli::args::Args;
use crate::core::{CombinatorialConfig, EngineConfig, LdConfig, ScoringPolicy};
use crate::output::SummaryFormat;
use regex::Regex;
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::str::FromStr;

pub struct ValidationResult {
    pub engine_config: EngineConfig,
    pub format: SummaryFormat,
    pub sample_include_regex: Option<Regex>,
    pub sample_exclude_regex: Option<Regex>,
    pub samples_include_set: Option<HashSet<String>>,
    pub samples_exclude_set: Option<HashSet<String>>,
}

impl ValidationResult {
    /// Whether a sample survives the include/exclude filters
    pub fn keep_sample(&self, sample_id: &str) -> bool {
        if let Some(re) = &self.sample_include_regex {
            if !re.is_match(sample_id) {
                return false;
            }
        }
        if let Some(set) = &self.samples_include_set {
            if !set.contains(sample_id) {
                return false;
            }
        }
        if let Some(re) = &self.sample_exclude_regex {
            if re.is_match(sample_id) {
                return false;
            }
        }
        if let Some(set) = &self.samples_exclude_set {
            if set.contains(sample_id) {
                return false;
            }
        }
        true
    }

    pub fn has_sample_filters(&self) -> bool {
        self.sample_include_regex.is_some()
            || self.sample_exclude_regex.is_some()
            || self.samples_include_set.is_some()
            || self.samples_exclude_set.is_some()
    }
}

/// Validate all command line arguments
pub fn validate_args(args: &Args) -> Result<ValidationResult, String> {
    let window_width = args.window.ok_or("--window is required")?;
    if window_width == 0 {
        return Err("Window width must be a positive integer".to_string());
    }

    let format = SummaryFormat::from_str(&args.format)?;

    if args.ld_pairs == 0 {
        return Err("--ld-pairs must be at least 1".to_string());
    }
    if args.group_samples == 0 {
        return Err("--group-samples must be at least 1".to_string());
    }

    let scoring = ScoringPolicy::from_list(&args.score_metrics, args.ae_scale)?;

    let engine_config = EngineConfig {
        window_width,
        seed: args.seed,
        ld: LdConfig {
            exhaustive_positions: args.ld_exhaustive_positions,
            max_pairs: args.ld_pairs,
        },
        combinatorial: CombinatorialConfig {
            exhaustive_limit: args.exhaustive_limit,
            sample_size: args.group_samples,
        },
        scoring,
        parallel: !args.sequential,
        show_progress: true,
    };

    // Compile regex patterns
    let sample_include_regex = if let Some(pattern) = &args.include_samples {
        Some(Regex::new(pattern).map_err(|e| format!("Invalid include_samples regex: {}", e))?)
    } else {
        None
    };

    let sample_exclude_regex = if let Some(pattern) = &args.exclude_samples {
        Some(Regex::new(pattern).map_err(|e| format!("Invalid exclude_samples regex: {}", e))?)
    } else {
        None
    };

    // Load filter sets from files
    let samples_include_set = if let Some(file_path) = &args.include_samples_list {
        Some(load_set_from_file(file_path)?)
    } else {
        None
    };

    let samples_exclude_set = if let Some(file_path) = &args.exclude_samples_list {
        Some(load_set_from_file(file_path)?)
    } else {
        None
    };

    Ok(ValidationResult {
        engine_config,
        format,
        sample_include_regex,
        sample_exclude_regex,
        samples_include_set,
        samples_exclude_set,
    })
}

/// Load a set of strings from a file (one per line)
fn load_set_from_file(file_path: &str) -> Result<HashSet<String>, String> {
    let file = File::open(file_path)
        .map_err(|e| format!("Failed to open filter file '{}': {}", file_path, e))?;

    let reader = BufReader::new(file);
    let mut set = HashSet::new();

    for (line_num, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| {
            format!("Failed to read line {} from '{}': {}", line_num + 1, file_path, e)
        })?;
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            set.insert(trimmed.to_string());
        }
    }

    println!("📋 Loaded {} items from filter file '{}'", set.len(), file_path);
    Ok(set)
}
