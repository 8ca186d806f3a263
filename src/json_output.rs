//! # JSON Output Module
//!
//! Output strutturato in JSON per l'uso programmatico del convertitore.
//!
//! ## Tipi di messaggi:
//! - `start`: Inizio della conversione (root, numero di file, configurazione)
//! - `file_complete`: File convertito con dimensioni e riduzione
//! - `file_failed`: Conversione fallita con messaggio di errore
//! - `file_skipped`: File ignorato (formato non supportato)
//! - `complete`: Fine del processo con statistiche aggregate
//! - `error`: Errore di setup che termina il processo

use crate::config::Config;
use crate::converter::stats::DirectoryStatistics;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Tipo di messaggio JSON
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JsonMessage {
    /// Inizio della conversione
    Start {
        pending_dir: PathBuf,
        output_dir: PathBuf,
        total_files: u64,
        config: JsonConfig,
    },

    /// File convertito
    FileComplete {
        input: PathBuf,
        output: PathBuf,
        original_size: u64,
        new_size: u64,
        reduction_percent: f64,
        animated: bool,
    },

    /// Conversione fallita
    FileFailed {
        input: PathBuf,
        error: String,
    },

    /// File ignorato
    FileSkipped {
        path: PathBuf,
        reason: String,
    },

    /// Processo completato
    Complete {
        total_files: u64,
        successful_conversions: u64,
        failed_conversions: u64,
        total_original_size: u64,
        total_new_size: u64,
        reduction_percent: f64,
        format_counts: BTreeMap<String, u64>,
        duration_seconds: f64,
    },

    /// Errore generale
    Error {
        message: String,
        details: Option<String>,
    },
}

/// Configurazione riportata nel messaggio di start
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonConfig {
    pub workers: usize,
    pub skip_existing: bool,
    pub lossless_quality: u8,
    pub photographic_quality: u8,
    pub generic_quality: u8,
    pub animated_quality: u8,
}

impl JsonMessage {
    /// Emette il messaggio JSON su stdout
    pub fn emit(&self) {
        if let Ok(json) = serde_json::to_string(self) {
            println!("{}", json);
        }
    }

    pub fn start(config: &Config, total_files: u64) -> Self {
        Self::Start {
            pending_dir: config.pending_dir.clone(),
            output_dir: config.output_dir.clone(),
            total_files,
            config: JsonConfig::from(config),
        }
    }

    pub fn complete(stats: &DirectoryStatistics, duration_seconds: f64) -> Self {
        Self::Complete {
            total_files: stats.total_files,
            successful_conversions: stats.successful_conversions,
            failed_conversions: stats.failed_conversions,
            total_original_size: stats.total_original_size,
            total_new_size: stats.total_new_size,
            reduction_percent: stats.reduction_percent(),
            format_counts: stats.format_counts.clone(),
            duration_seconds,
        }
    }

    pub fn error(message: String, details: Option<String>) -> Self {
        Self::Error { message, details }
    }
}

impl From<&Config> for JsonConfig {
    fn from(config: &Config) -> Self {
        Self {
            workers: config.workers,
            skip_existing: config.skip_existing,
            lossless_quality: config.profiles.lossless.quality,
            photographic_quality: config.profiles.photographic.quality,
            generic_quality: config.profiles.generic.quality,
            animated_quality: config.profiles.animated.quality,
        }
    }
}
