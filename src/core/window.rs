// window.rs - Fixed-width window scanning over the shared coordinate range

use crate::data::{HaplotypeStore, ScanError};
use serde::{Deserialize, Serialize};

/// Half-open window `[start, end)` in 0-based coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Window {
    pub start: usize,
    pub end: usize,
}

impl Window {
    pub fn new(start: usize, width: usize) -> Self {
        Self {
            start,
            end: start + width,
        }
    }

    pub fn width(&self) -> usize {
        self.end - self.start
    }

    /// 1-based inclusive start for reporting
    pub fn start_1based(&self) -> usize {
        self.start + 1
    }

    /// 1-based inclusive end (same number as the exclusive 0-based end)
    pub fn end_1based(&self) -> usize {
        self.end
    }
}

/// The two allele substrings one sample carries in one window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Genotype<'a> {
    pub sample_id: &'a str,
    pub allele1: &'a str,
    pub allele2: &'a str,
}

impl Genotype<'_> {
    pub fn is_heterozygous(&self) -> bool {
        self.allele1 != self.allele2
    }

    /// Alleles ordered so that `(a, b)` and `(b, a)` compare equal
    pub fn unordered(&self) -> (&str, &str) {
        if self.allele1 <= self.allele2 {
            (self.allele1, self.allele2)
        } else {
            (self.allele2, self.allele1)
        }
    }
}

/// Stride-1 scanner over a validated store.
///
/// Cheap to copy; `windows()` can be called any number of times.
#[derive(Debug, Clone, Copy)]
pub struct WindowScanner<'a> {
    store: &'a HaplotypeStore,
    width: usize,
}

impl<'a> WindowScanner<'a> {
    pub fn new(store: &'a HaplotypeStore, width: usize) -> Result<Self, ScanError> {
        store.check_window_width(width)?;
        Ok(Self { store, width })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn store(&self) -> &'a HaplotypeStore {
        self.store
    }

    pub fn len(&self) -> usize {
        self.store.window_count(self.width)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Lazy sequence of every window, `start` in `0..=L - width`
    pub fn windows(&self) -> impl Iterator<Item = Window> + 'a {
        let width = self.width;
        (0..self.store.window_count(width)).map(move |start| Window::new(start, width))
    }

    /// Window starting at `start`
    pub fn window_at(&self, start: usize) -> Window {
        Window::new(start, self.width)
    }

    /// Per-sample genotypes for one window, in store order
    pub fn genotypes(&self, window: Window) -> Vec<Genotype<'a>> {
        self.store
            .samples()
            .iter()
            .map(|sample| Genotype {
                sample_id: sample.id.as_str(),
                allele1: &sample.haplotype1[window.start..window.end],
                allele2: &sample.haplotype2[window.start..window.end],
            })
            .collect()
    }
}
