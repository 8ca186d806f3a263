//! # Report Module
//!
//! Formattazione delle statistiche finali per l'utente.
//!
//! ## Responsabilità:
//! - Calcolo della percentuale di riduzione (0% se la dimensione originale è 0)
//! - Blocco di riepilogo con totali, dimensioni leggibili e conteggio per estensione

use crate::converter::stats::DirectoryStatistics;
use crate::file_manager::FileManager;
use tracing::info;

/// Percentage size reduction, `(original - new) / original * 100`.
///
/// Defined as 0 when `original_size` is 0. Grows negative when the output
/// is larger than the input.
pub fn reduction_percent(original_size: u64, new_size: u64) -> f64 {
    if original_size == 0 {
        0.0
    } else {
        ((original_size as f64 - new_size as f64) / original_size as f64) * 100.0
    }
}

/// Signed human-readable size difference
fn format_signed_size(bytes: i128) -> String {
    let magnitude = FileManager::format_size(bytes.unsigned_abs().min(u64::MAX as u128) as u64);
    if bytes < 0 {
        format!("-{}", magnitude)
    } else {
        magnitude
    }
}

/// Final summary of a conversion run
pub struct SummaryReport<'a> {
    stats: &'a DirectoryStatistics,
    duration_seconds: f64,
}

impl<'a> SummaryReport<'a> {
    pub fn new(stats: &'a DirectoryStatistics, duration_seconds: f64) -> Self {
        Self { stats, duration_seconds }
    }

    /// One-line summary for the progress bar
    pub fn headline(&self) -> String {
        format!(
            "Converted: {} | Failed: {} | Saved: {} ({:.2}%)",
            self.stats.successful_conversions,
            self.stats.failed_conversions,
            format_signed_size(self.stats.bytes_saved()),
            self.stats.reduction_percent()
        )
    }

    pub fn lines(&self) -> Vec<String> {
        let stats = self.stats;
        let mut lines = vec![
            "📊 Conversion summary".to_string(),
            format!("  Total files:        {}", stats.total_files),
            format!("  Converted:          {}", stats.successful_conversions),
            format!("  Failed:             {}", stats.failed_conversions),
            format!("  Original size:      {}", FileManager::format_size(stats.total_original_size)),
            format!("  New size:           {}", FileManager::format_size(stats.total_new_size)),
            format!(
                "  Space saved:        {} ({:.2}%)",
                format_signed_size(stats.bytes_saved()),
                stats.reduction_percent()
            ),
            format!("  Duration:           {:.1}s", self.duration_seconds),
        ];

        if !stats.format_counts.is_empty() {
            lines.push("  Files by format:".to_string());
            for (extension, count) in &stats.format_counts {
                lines.push(format!("    .{:<6} {}", extension, count));
            }
        }
        lines
    }

    /// Log the summary block line by line
    pub fn log(&self) {
        for line in self.lines() {
            info!("{}", line);
        }
    }
}
