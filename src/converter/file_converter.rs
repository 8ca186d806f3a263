//! # File Converter Module
//!
//! Worker per la conversione di un singolo file.
//!
//! Ogni errore (stat, creazione directory, probe, encoder) viene catturato
//! qui: il chiamante riceve `None` e la run prosegue con il file successivo.

use crate::{
    config::EncodingProfiles,
    encoder::{EncodePlan, EncodeRequest, ImageEncoder},
    error::ConvertError,
    file_manager::FileManager,
    format::{requires_animated_path, SourceFormat},
    progress::ProgressReporter,
};
use std::path::Path;
use tokio::sync::Semaphore;
use tracing::{debug, error, info};

use super::stats::ConversionOutcome;

/// Converte un singolo file nel formato di destinazione
pub struct FileConverter<E> {
    encoder: E,
    profiles: EncodingProfiles,
    skip_existing: bool,
    permits: Semaphore,
    reporter: ProgressReporter,
}

impl<E: ImageEncoder> FileConverter<E> {
    /// Crea un converter che limita a `workers` gli encoding concorrenti
    pub fn new(
        encoder: E,
        profiles: EncodingProfiles,
        skip_existing: bool,
        workers: usize,
        reporter: ProgressReporter,
    ) -> Self {
        Self {
            encoder,
            profiles,
            skip_existing,
            permits: Semaphore::new(workers.max(1)),
            reporter,
        }
    }

    pub fn encoder(&self) -> &E {
        &self.encoder
    }

    /// Converte `input` in `output`; `None` se la conversione fallisce
    pub async fn convert(&self, input: &Path, output: &Path) -> Option<ConversionOutcome> {
        match self.try_convert(input, output).await {
            Ok((outcome, animated)) => {
                info!(
                    "✅ {} -> {} ({} → {}, {:.2}% reduction)",
                    input.display(),
                    output.display(),
                    FileManager::format_size(outcome.original_size),
                    FileManager::format_size(outcome.new_size),
                    outcome.reduction_percent()
                );
                self.reporter.file_converted(input, output, &outcome, animated);
                Some(outcome)
            }
            Err(e) => {
                error!("❌ Failed to convert {}: {}", input.display(), e);
                self.reporter.file_failed(input, &e.to_string());
                None
            }
        }
    }

    async fn try_convert(&self, input: &Path, output: &Path) -> Result<(ConversionOutcome, bool), ConvertError> {
        let format = SourceFormat::from_path(input)
            .ok_or_else(|| ConvertError::UnsupportedFormat(input.display().to_string()))?;

        let original_size = FileManager::file_size(input).await?;
        FileManager::ensure_parent_dirs(output).await?;

        if self.skip_existing && output.exists() {
            let new_size = FileManager::file_size(output).await?;
            info!("⏭️ Already converted, reusing {}", output.display());
            return Ok((ConversionOutcome { original_size, new_size }, false));
        }

        let plan = self.plan_for(input, format).await;
        let request = EncodeRequest {
            input: input.to_path_buf(),
            output: output.to_path_buf(),
            format,
            plan,
        };

        {
            let _permit = self
                .permits
                .acquire()
                .await
                .map_err(|e| ConvertError::Encoder(format!("encoder pool closed: {}", e)))?;
            self.encoder.encode(&request).await?;
        }

        let new_size = FileManager::file_size(output).await?;
        Ok((ConversionOutcome { original_size, new_size }, plan.is_animated()))
    }

    /// Sceglie il percorso di encoding per un file.
    ///
    /// Se il task del probe non termina (panic o cancellazione) la GIF va al
    /// percorso animato, come per un probe fallito.
    pub async fn plan_for(&self, input: &Path, format: SourceFormat) -> EncodePlan {
        let animated = if format.is_animation_capable() {
            let probe_path = input.to_path_buf();
            tokio::task::spawn_blocking(move || requires_animated_path(&probe_path))
                .await
                .unwrap_or(true)
        } else {
            false
        };

        let plan = if animated {
            EncodePlan::Animated(self.profiles.animated)
        } else {
            EncodePlan::Static(self.profiles.static_profile_for(format))
        };
        debug!("Plan for {}: {:?}", input.display(), plan);
        plan
    }
}
