// fasta.rs - Load phased haplotype pairs from a FASTA file

use crate::data::haplotypes::Sample;
use bio::io::fasta;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Split a record id into (sample, haplotype tag).
///
/// Accepts `<sample>_h1`, `<sample>_h2`, `<sample>_1`, `<sample>_2`.
/// Anything else is taken as a whole sample id with no tag.
fn split_haplotype_tag(record_id: &str) -> (&str, Option<&str>) {
    if let Some(pos) = record_id.rfind("_h") {
        let tag = &record_id[pos + 2..];
        if !tag.is_empty() && tag.chars().all(|c| c.is_ascii_digit()) {
            return (&record_id[..pos], Some(tag));
        }
    }
    if let Some((base, tail)) = record_id.rsplit_once('_') {
        if !base.is_empty() && !tail.is_empty() && tail.chars().all(|c| c.is_ascii_digit()) {
            return (base, Some(tail));
        }
    }
    (record_id, None)
}

/// Read haplotype pairs from any FASTA source
pub fn read_haplotype_pairs<R: Read>(source: R) -> Result<Vec<Sample>, String> {
    let reader = fasta::Reader::new(BufReader::new(source));
    // sample -> tag -> sequence, in record order per sample
    let mut grouped: BTreeMap<String, Vec<(Option<String>, String)>> = BTreeMap::new();

    for record_result in reader.records() {
        let record = record_result.map_err(|e| format!("Invalid FASTA record: {}", e))?;
        let sequence = String::from_utf8(record.seq().to_ascii_uppercase())
            .map_err(|_| format!("Record '{}' is not valid UTF-8", record.id()))?;
        let (sample_id, tag) = split_haplotype_tag(record.id());
        if sample_id.is_empty() {
            return Err(format!("Record '{}' has an empty sample name", record.id()));
        }
        grouped
            .entry(sample_id.to_string())
            .or_default()
            .push((tag.map(str::to_string), sequence));
    }

    let mut samples = Vec::with_capacity(grouped.len());
    for (sample_id, mut records) in grouped {
        let h1 = take_tagged(&mut records, "1");
        let h2 = take_tagged(&mut records, "2");
        let (h1, h2) = match (h1, h2) {
            (Some(h1), Some(h2)) => (h1, h2),
            (Some(h1), None) => {
                let h2 = first_remaining(&mut records).unwrap_or_else(|| h1.clone());
                (h1, h2)
            }
            (None, Some(h2)) => {
                let h1 = first_remaining(&mut records).unwrap_or_else(|| h2.clone());
                (h1, h2)
            }
            (None, None) => {
                let h1 = first_remaining(&mut records)
                    .ok_or_else(|| format!("Sample '{}' has no sequences", sample_id))?;
                let h2 = first_remaining(&mut records).unwrap_or_else(|| h1.clone());
                (h1, h2)
            }
        };
        if !records.is_empty() {
            println!(
                "⚠️  Sample '{}' has {} extra record(s); only two haplotypes are used",
                sample_id,
                records.len()
            );
        }
        samples.push(Sample::new(sample_id, h1, h2));
    }

    Ok(samples)
}

fn take_tagged(records: &mut Vec<(Option<String>, String)>, tag: &str) -> Option<String> {
    let pos = records.iter().position(|(t, _)| t.as_deref() == Some(tag))?;
    Some(records.remove(pos).1)
}

fn first_remaining(records: &mut Vec<(Option<String>, String)>) -> Option<String> {
    if records.is_empty() {
        None
    } else {
        Some(records.remove(0).1)
    }
}

/// Load haplotype pairs from a FASTA file on disk
pub fn load_haplotype_pairs(path: &Path) -> Result<Vec<Sample>, String> {
    println!("🧬 Loading phased haplotypes from: {}", path.display());
    let file = File::open(path)
        .map_err(|e| format!("Failed to open FASTA file '{}': {}", path.display(), e))?;
    let samples = read_haplotype_pairs(file)
        .map_err(|e| format!("{} ({})", e, path.display()))?;
    println!("✅ Loaded {} samples", samples.len());
    Ok(samples)
}
