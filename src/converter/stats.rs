//! # Statistics Module
//!
//! Risultato di una singola conversione e statistiche aggregate per directory.
//! Ogni directory costruisce il proprio record, che viene restituito al
//! chiamante e fuso nel totale del genitore: nessuno stato condiviso tra
//! chiamate ricorsive.

use crate::report::reduction_percent;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Sizes measured around one successful conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionOutcome {
    pub original_size: u64,
    pub new_size: u64,
}

impl ConversionOutcome {
    pub fn reduction_percent(&self) -> f64 {
        reduction_percent(self.original_size, self.new_size)
    }
}

/// Aggregated results for a directory subtree.
///
/// `total_files` always equals `successful_conversions + failed_conversions`;
/// the size totals only cover successful conversions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryStatistics {
    pub total_files: u64,
    pub successful_conversions: u64,
    pub failed_conversions: u64,
    pub total_original_size: u64,
    pub total_new_size: u64,
    /// Attempted files per lower-cased source extension
    pub format_counts: BTreeMap<String, u64>,
}

impl DirectoryStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one converter result in; `None` is a failed conversion
    pub fn record(&mut self, extension: &str, outcome: Option<ConversionOutcome>) {
        self.total_files += 1;
        *self.format_counts.entry(extension.to_string()).or_insert(0) += 1;

        match outcome {
            Some(outcome) => {
                self.successful_conversions += 1;
                self.total_original_size += outcome.original_size;
                self.total_new_size += outcome.new_size;
            }
            None => self.failed_conversions += 1,
        }
    }

    /// Statistics of a single converted file
    pub fn single(extension: &str, outcome: Option<ConversionOutcome>) -> Self {
        let mut stats = Self::new();
        stats.record(extension, outcome);
        stats
    }

    /// Merge a child's statistics into this record
    pub fn merge(mut self, child: DirectoryStatistics) -> Self {
        self.total_files += child.total_files;
        self.successful_conversions += child.successful_conversions;
        self.failed_conversions += child.failed_conversions;
        self.total_original_size += child.total_original_size;
        self.total_new_size += child.total_new_size;

        for (extension, count) in child.format_counts {
            *self.format_counts.entry(extension).or_insert(0) += count;
        }
        self
    }

    pub fn is_consistent(&self) -> bool {
        self.total_files == self.successful_conversions + self.failed_conversions
    }

    pub fn bytes_saved(&self) -> i128 {
        self.total_original_size as i128 - self.total_new_size as i128
    }

    pub fn reduction_percent(&self) -> f64 {
        reduction_percent(self.total_original_size, self.total_new_size)
    }
}
