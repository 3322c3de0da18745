// mod.rs - Output formatters module

use crate::core::{RankedWindows, Window, WindowResult};
use csv::WriterBuilder;
use serde::Serialize;
use std::fs::{create_dir_all, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Summary table columns, in output order
pub const SUMMARY_COLUMNS: [&str; 22] = [
    "start_1based",
    "end_1based",
    "num_alleles",
    "alleles_freqs",
    "He",
    "Ho",
    "Ae",
    "PIC",
    "Fis",
    "HWE",
    "HWE_simple",
    "MP",
    "PD",
    "prob_2_diff",
    "prob_3_diff",
    "prob_4_diff",
    "r2_mean",
    "Dprime_mean",
    "diversity_k2",
    "diversity_k3",
    "diversity_k4",
    "Score",
];

const ALLELE_TABLE_COLUMNS: [&str; 3] = ["Allele", "Renamed", "Frequency"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryFormat {
    Tsv,
    Csv,
    Json,
}

impl SummaryFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            SummaryFormat::Tsv => "tsv",
            SummaryFormat::Csv => "csv",
            SummaryFormat::Json => "json",
        }
    }
}

impl FromStr for SummaryFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "tsv" => Ok(SummaryFormat::Tsv),
            "csv" => Ok(SummaryFormat::Csv),
            "json" => Ok(SummaryFormat::Json),
            _ => Err(format!("Unsupported output format: {}. Use: tsv, csv, json", s)),
        }
    }
}

/// Ensure parent directory exists before creating file
fn ensure_parent_dir(file_path: &Path) -> Result<(), String> {
    if let Some(parent) = file_path.parent() {
        create_dir_all(parent)
            .map_err(|e| format!("Failed to create parent directory '{}': {}", parent.display(), e))?;
    }
    Ok(())
}

/// `<outdir>/summaries/all_windows_summary.<ext>`
pub fn summary_path(outdir: &Path, format: SummaryFormat) -> PathBuf {
    outdir
        .join("summaries")
        .join(format!("all_windows_summary.{}", format.extension()))
}

/// `<outdir>/alleles/window_<start>_<end>_alleles.tsv`, 1-based inclusive
pub fn allele_table_path(outdir: &Path, window: &Window) -> PathBuf {
    outdir.join("alleles").join(format!(
        "window_{}_{}_alleles.tsv",
        window.start_1based(),
        window.end_1based()
    ))
}

fn format_value(value: Option<f64>) -> String {
    match value {
        Some(v) if !v.is_nan() => format!("{:.6}", v),
        _ => "NA".to_string(),
    }
}

/// One summary row as strings, `NA` for undefined values
pub fn summary_row(result: &WindowResult) -> Vec<String> {
    let m = &result.metrics;
    let diversity = |k: usize| {
        result
            .diversity_for(k)
            .map(|d| d.compact())
            .unwrap_or_else(|| "NA".to_string())
    };
    vec![
        result.window.start_1based().to_string(),
        result.window.end_1based().to_string(),
        result.num_alleles.to_string(),
        result.frequencies.labeled_summary(),
        format_value(m.he),
        format_value(m.ho),
        format_value(m.ae),
        format_value(m.pic),
        format_value(m.fis),
        format_value(m.hwe_p_value()),
        format_value(m.hwe_simple_p_value()),
        format_value(m.mp),
        format_value(m.pd),
        format_value(m.prob_all_distinct_2),
        format_value(m.prob_all_distinct_3),
        format_value(m.prob_all_distinct_4),
        format_value(result.ld.r_squared_mean),
        format_value(result.ld.d_prime_mean),
        diversity(2),
        diversity(3),
        diversity(4),
        format_value(result.score),
    ]
}

/// Write the ranked summary in TSV format
pub fn write_summary_tsv(file_path: &Path, ranked: &RankedWindows, command_line: &str) -> Result<(), String> {
    ensure_parent_dir(file_path)?;
    let file = File::create(file_path)
        .map_err(|e| format!("Failed to create output file '{}': {}", file_path.display(), e))?;
    let mut writer = BufWriter::new(file);

    // Write command header
    writeln!(writer, "# Command: {}", command_line).map_err(|e| format!("Write error: {}", e))?;
    writeln!(writer, "# Generated: {}", chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")).map_err(|e| format!("Write error: {}", e))?;
    writeln!(writer, "# microhap v{}", crate::VERSION).map_err(|e| format!("Write error: {}", e))?;

    writeln!(writer, "{}", SUMMARY_COLUMNS.join("\t")).map_err(|e| format!("Write error: {}", e))?;
    for result in ranked.iter() {
        writeln!(writer, "{}", summary_row(result).join("\t")).map_err(|e| format!("Write error: {}", e))?;
    }

    writer.flush().map_err(|e| format!("Flush error: {}", e))?;
    println!("✅ Window summary written to: {}", file_path.display());
    Ok(())
}

/// Write the ranked summary in CSV format (quoted where needed)
pub fn write_summary_csv(file_path: &Path, ranked: &RankedWindows) -> Result<(), String> {
    ensure_parent_dir(file_path)?;
    let mut writer = WriterBuilder::new()
        .from_path(file_path)
        .map_err(|e| format!("Failed to create output file '{}': {}", file_path.display(), e))?;

    writer
        .write_record(SUMMARY_COLUMNS)
        .map_err(|e| format!("Write error: {}", e))?;
    for result in ranked.iter() {
        writer
            .write_record(summary_row(result))
            .map_err(|e| format!("Write error: {}", e))?;
    }

    writer.flush().map_err(|e| format!("Flush error: {}", e))?;
    println!("✅ Window summary written to: {}", file_path.display());
    Ok(())
}

#[derive(Serialize)]
struct JsonWindow<'a> {
    rank: usize,
    start_1based: usize,
    end_1based: usize,
    #[serde(flatten)]
    result: &'a WindowResult,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    command: &'a str,
    generated: String,
    version: &'static str,
    windows: Vec<JsonWindow<'a>>,
}

/// Write the ranked results as a JSON document
pub fn write_summary_json(file_path: &Path, ranked: &RankedWindows, command_line: &str) -> Result<(), String> {
    ensure_parent_dir(file_path)?;
    let report = JsonReport {
        command: command_line,
        generated: chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        version: crate::VERSION,
        windows: ranked
            .iter()
            .enumerate()
            .map(|(i, result)| JsonWindow {
                rank: i + 1,
                start_1based: result.window.start_1based(),
                end_1based: result.window.end_1based(),
                result,
            })
            .collect(),
    };

    let file = File::create(file_path)
        .map_err(|e| format!("Failed to create output file '{}': {}", file_path.display(), e))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, &report)
        .map_err(|e| format!("Failed to serialize results: {}", e))?;
    writer.flush().map_err(|e| format!("Flush error: {}", e))?;
    println!("✅ Window summary written to: {}", file_path.display());
    Ok(())
}

/// Write the ranked summary in the specified format, returning its path
pub fn write_summary(
    outdir: &Path,
    format: SummaryFormat,
    ranked: &RankedWindows,
    command_line: &str,
) -> Result<PathBuf, String> {
    let path = summary_path(outdir, format);
    match format {
        SummaryFormat::Tsv => write_summary_tsv(&path, ranked, command_line)?,
        SummaryFormat::Csv => write_summary_csv(&path, ranked)?,
        SummaryFormat::Json => write_summary_json(&path, ranked, command_line)?,
    }
    Ok(path)
}

/// Allele, display label and frequency for one window
pub fn write_allele_table(file_path: &Path, result: &WindowResult) -> Result<(), String> {
    ensure_parent_dir(file_path)?;
    let mut writer = WriterBuilder::new()
        .delimiter(b'\t')
        .from_path(file_path)
        .map_err(|e| format!("Failed to create allele table '{}': {}", file_path.display(), e))?;

    writer
        .write_record(ALLELE_TABLE_COLUMNS)
        .map_err(|e| format!("Write error: {}", e))?;
    for entry in result.frequencies.entries() {
        let frequency = format!("{:.6}", entry.frequency);
        writer
            .write_record([entry.allele.as_str(), entry.label.as_str(), frequency.as_str()])
            .map_err(|e| format!("Write error: {}", e))?;
    }
    writer.flush().map_err(|e| format!("Flush error: {}", e))?;
    Ok(())
}

/// One allele table per window under `<outdir>/alleles/`
pub fn write_allele_tables(outdir: &Path, ranked: &RankedWindows) -> Result<usize, String> {
    let mut written = 0;
    for result in ranked.iter() {
        write_allele_table(&allele_table_path(outdir, &result.window), result)?;
        written += 1;
    }
    println!(
        "✅ {} allele tables written to: {}",
        written,
        outdir.join("alleles").display()
    );
    Ok(written)
}
