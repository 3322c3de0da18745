// haplotypes.rs - Phased haplotype cohort and pre-scan validation

use std::collections::{BTreeMap, HashSet};
use std::error;
use std::fmt;

/// Fatal, pre-scan errors. Nothing here is raised once windows are being processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanError {
    /// The cohort contains no samples.
    EmptyCohort,
    /// The usable length is shorter than the requested window width.
    DegenerateLength {
        usable_length: usize,
        window_width: usize,
    },
    /// Window width must be at least 1.
    InvalidWindowWidth,
    /// Two samples share the same identifier.
    DuplicateSample(String),
    /// A haplotype contains non-ASCII residue symbols.
    NonAsciiSequence(String),
}

impl fmt::Display for ScanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyCohort => write!(f, "Empty cohort: no samples with haplotypes were provided"),
            Self::DegenerateLength {
                usable_length,
                window_width,
            } => write!(
                f,
                "Usable length {} is shorter than window width {}",
                usable_length, window_width
            ),
            Self::InvalidWindowWidth => write!(f, "Window width must be a positive integer"),
            Self::DuplicateSample(id) => write!(f, "Duplicate sample identifier: '{}'", id),
            Self::NonAsciiSequence(id) => {
                write!(f, "Sample '{}' has non-ASCII residue symbols", id)
            }
        }
    }
}

impl error::Error for ScanError {}

/// One diploid sample: an identifier and its two phased haplotypes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sample {
    pub id: String,
    pub haplotype1: String,
    pub haplotype2: String,
}

impl Sample {
    pub fn new(id: impl Into<String>, haplotype1: impl Into<String>, haplotype2: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            haplotype1: haplotype1.into(),
            haplotype2: haplotype2.into(),
        }
    }

    /// Shorter of the two haplotype lengths
    pub fn usable_length(&self) -> usize {
        self.haplotype1.len().min(self.haplotype2.len())
    }
}

/// Read-only cohort shared by every window of a run.
///
/// Samples are kept sorted by identifier so that combination enumeration and
/// sampling see the same order on every run.
#[derive(Debug, Clone)]
pub struct HaplotypeStore {
    samples: Vec<Sample>,
    usable_length: usize,
}

impl HaplotypeStore {
    /// Build the store and compute the usable length `L`.
    pub fn new(mut samples: Vec<Sample>) -> Result<Self, ScanError> {
        if samples.is_empty() {
            return Err(ScanError::EmptyCohort);
        }

        let mut seen = HashSet::with_capacity(samples.len());
        for sample in &samples {
            if !seen.insert(sample.id.as_str()) {
                return Err(ScanError::DuplicateSample(sample.id.clone()));
            }
            if !sample.haplotype1.is_ascii() || !sample.haplotype2.is_ascii() {
                return Err(ScanError::NonAsciiSequence(sample.id.clone()));
            }
        }

        samples.sort_by(|a, b| a.id.cmp(&b.id));
        let usable_length = samples
            .iter()
            .map(Sample::usable_length)
            .min()
            .unwrap_or(0);

        Ok(Self {
            samples,
            usable_length,
        })
    }

    /// Build from a `sample_id -> (h1, h2)` mapping
    pub fn from_map(map: BTreeMap<String, (String, String)>) -> Result<Self, ScanError> {
        let samples = map
            .into_iter()
            .map(|(id, (h1, h2))| Sample::new(id, h1, h2))
            .collect();
        Self::new(samples)
    }

    /// Fails if no window of `width` fits in the usable length.
    pub fn check_window_width(&self, width: usize) -> Result<(), ScanError> {
        if width == 0 {
            return Err(ScanError::InvalidWindowWidth);
        }
        if self.usable_length < width {
            return Err(ScanError::DegenerateLength {
                usable_length: self.usable_length,
                window_width: width,
            });
        }
        Ok(())
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn num_samples(&self) -> usize {
        self.samples.len()
    }

    pub fn usable_length(&self) -> usize {
        self.usable_length
    }

    /// Number of stride-1 windows of `width` (0 if none fit)
    pub fn window_count(&self, width: usize) -> usize {
        if width == 0 || width > self.usable_length {
            0
        } else {
            self.usable_length - width + 1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usable_length_is_global_minimum() {
        let store = HaplotypeStore::new(vec![
            Sample::new("s1", "ACGTACGT", "ACGTAC"),
            Sample::new("s2", "ACGTACGTAA", "ACGTACGTAA"),
        ])
        .unwrap();

        assert_eq!(store.usable_length(), 6);
        assert_eq!(store.window_count(3), 4);
        assert_eq!(store.window_count(7), 0);
    }

    #[test]
    fn test_empty_cohort_rejected() {
        assert_eq!(HaplotypeStore::new(Vec::new()).unwrap_err(), ScanError::EmptyCohort);
        assert_eq!(
            HaplotypeStore::from_map(BTreeMap::new()).unwrap_err(),
            ScanError::EmptyCohort
        );
    }

    #[test]
    fn test_degenerate_length() {
        let store = HaplotypeStore::new(vec![Sample::new("s1", "ACG", "ACGT")]).unwrap();
        assert!(store.check_window_width(3).is_ok());
        assert_eq!(
            store.check_window_width(4).unwrap_err(),
            ScanError::DegenerateLength {
                usable_length: 3,
                window_width: 4
            }
        );
        assert_eq!(store.check_window_width(0).unwrap_err(), ScanError::InvalidWindowWidth);
    }

    #[test]
    fn test_samples_sorted_and_unique() {
        let store = HaplotypeStore::new(vec![
            Sample::new("zeta", "AAA", "AAA"),
            Sample::new("alpha", "CCC", "CCC"),
        ])
        .unwrap();
        let ids: Vec<&str> = store.samples().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["alpha", "zeta"]);

        let dup = HaplotypeStore::new(vec![
            Sample::new("a", "AAA", "AAA"),
            Sample::new("a", "CCC", "CCC"),
        ]);
        assert_eq!(dup.unwrap_err(), ScanError::DuplicateSample("a".to_string()));
    }

    #[test]
    fn test_non_ascii_rejected() {
        let result = HaplotypeStore::new(vec![Sample::new("s1", "AÇG", "ACG")]);
        assert_eq!(result.unwrap_err(), ScanError::NonAsciiSequence("s1".to_string()));
    }
}
