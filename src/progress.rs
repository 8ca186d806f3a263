//! # Progress Reporting Module
//!
//! Feedback per file durante la conversione.
//!
//! ## Responsabilità:
//! - Progress bar con `indicatif` in modalità interattiva
//! - Eventi JSON (`json_output`) in modalità programmatica
//!
//! Le righe di log per file sono emesse dal converter con `tracing`;
//! questo modulo gestisce solo la barra e gli eventi strutturati.

use crate::converter::stats::ConversionOutcome;
use crate::json_output::JsonMessage;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;

/// Progress sink shared by the walker and the file converter
#[derive(Clone)]
pub struct ProgressReporter {
    bar: ProgressBar,
    json_output: bool,
}

impl ProgressReporter {
    /// Create a reporter for `total_files` convertible files
    pub fn new(total_files: u64, json_output: bool) -> Self {
        let bar = if json_output {
            ProgressBar::hidden()
        } else {
            let bar = ProgressBar::new(total_files);
            if let Ok(style) = ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
            {
                bar.set_style(style.progress_chars("=>-"));
            }
            bar.enable_steady_tick(Duration::from_millis(100));
            bar
        };

        Self { bar, json_output }
    }

    /// Reporter that draws and emits nothing
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
            json_output: false,
        }
    }

    pub fn file_converted(&self, input: &Path, output: &Path, outcome: &ConversionOutcome, animated: bool) {
        if self.json_output {
            JsonMessage::FileComplete {
                input: input.to_path_buf(),
                output: output.to_path_buf(),
                original_size: outcome.original_size,
                new_size: outcome.new_size,
                reduction_percent: outcome.reduction_percent(),
                animated,
            }
            .emit();
        }
        self.bar.inc(1);
        self.bar.set_message(format!(
            "[OK] {}: {:.1}% saved",
            file_name(input),
            outcome.reduction_percent()
        ));
    }

    pub fn file_failed(&self, input: &Path, error: &str) {
        if self.json_output {
            JsonMessage::FileFailed {
                input: input.to_path_buf(),
                error: error.to_string(),
            }
            .emit();
        }
        self.bar.inc(1);
        self.bar.set_message(format!("[ERROR] {}", file_name(input)));
    }

    pub fn file_skipped(&self, path: &Path, reason: &str) {
        if self.json_output {
            JsonMessage::FileSkipped {
                path: path.to_path_buf(),
                reason: reason.to_string(),
            }
            .emit();
        }
    }

    /// Finish with a final message
    pub fn finish(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }
}

fn file_name(path: &Path) -> String {
    path.file_name().unwrap_or_default().to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hidden_reporter_counts_files() {
        let reporter = ProgressReporter::hidden();
        let outcome = ConversionOutcome { original_size: 10, new_size: 5 };
        reporter.file_converted(Path::new("a.png"), Path::new("a.webp"), &outcome, false);
        reporter.file_failed(Path::new("b.png"), "boom");
        reporter.file_skipped(Path::new("c.txt"), "unsupported format");
        assert_eq!(reporter.bar.position(), 2);
        reporter.finish("done");
    }
}
