//! # Configuration Management Module
//!
//! Questo modulo gestisce tutta la configurazione del convertitore.
//!
//! ## Responsabilità:
//! - Definisce la struct `Config` con root di input/output e parametri di conversione
//! - Definisce i profili di encoding WebP per classe di formato sorgente
//! - Fornisce validazione dei parametri (qualità, effort, workers)
//! - Supporta caricamento/salvataggio configurazione da/verso file JSON
//!
//! ## Parametri di configurazione:
//! - `pending_dir`: Directory sorgente da scansionare (default: `pending`)
//! - `output_dir`: Directory che rispecchia la struttura convertita (default: `output`)
//! - `workers`: Numero massimo di encoding concorrenti (default: 1 = sequenziale)
//! - `skip_existing`: Non riconverte file il cui output esiste già (default: false)
//! - `json_output`: Eventi JSON su stdout per uso programmatico (default: false)
//! - `profiles`: Profili cwebp/gif2webp per PNG, JPEG, altri formati e animazioni
//!
//! ## Esempio:
//! ```ignore
//! let config = Config {
//!     workers: 4,
//!     ..Default::default()
//! };
//! config.validate()?;
//! ```

use crate::format::{ProfileClass, SourceFormat};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Encoder settings for single-frame inputs (cwebp)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StaticProfile {
    /// Quality factor (0-100)
    pub quality: u8,
    /// Compression effort (0-6, higher = slower and smaller)
    pub method: u8,
    /// Near-lossless preprocessing level (0-100), None = lossy encoding
    pub near_lossless: Option<u8>,
    /// Sharper RGB->YUV conversion for the subsampled chroma planes
    pub sharp_yuv: bool,
}

/// Encoder settings for multi-frame inputs (gif2webp)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnimatedProfile {
    /// Quality factor (0-100)
    pub quality: u8,
    /// Compression effort (0-6)
    pub method: u8,
    /// Try every key-frame placement to minimize output size
    pub min_size: bool,
    /// Use multi-threading when available
    pub multi_threaded: bool,
}

/// Encoding profiles, one per source format class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncodingProfiles {
    pub lossless: StaticProfile,
    pub photographic: StaticProfile,
    pub generic: StaticProfile,
    pub animated: AnimatedProfile,
}

impl Default for EncodingProfiles {
    fn default() -> Self {
        Self {
            lossless: StaticProfile {
                quality: 90,
                method: 6,
                near_lossless: Some(60),
                sharp_yuv: true,
            },
            photographic: StaticProfile {
                quality: 85,
                method: 6,
                near_lossless: None,
                sharp_yuv: true,
            },
            generic: StaticProfile {
                quality: 80,
                method: 4,
                near_lossless: None,
                sharp_yuv: false,
            },
            animated: AnimatedProfile {
                quality: 80,
                method: 6,
                min_size: true,
                multi_threaded: true,
            },
        }
    }
}

impl EncodingProfiles {
    /// Pick the static profile tuned for a source format
    pub fn static_profile_for(&self, format: SourceFormat) -> StaticProfile {
        match format.profile_class() {
            ProfileClass::Lossless => self.lossless,
            ProfileClass::Photographic => self.photographic,
            ProfileClass::Generic => self.generic,
        }
    }
}

/// Configuration for a conversion run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Root scanned for convertible images
    pub pending_dir: PathBuf,
    /// Root mirroring `pending_dir` with converted files
    pub output_dir: PathBuf,
    /// Maximum number of concurrent encoder runs
    pub workers: usize,
    /// Skip files whose mirrored output already exists
    pub skip_existing: bool,
    /// Output progress and status as JSON for programmatic use
    pub json_output: bool,
    /// WebP encoder profiles
    pub profiles: EncodingProfiles,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pending_dir: PathBuf::from("pending"),
            output_dir: PathBuf::from("output"),
            workers: 1,
            skip_existing: false,
            json_output: false,
            profiles: EncodingProfiles::default(),
        }
    }
}

impl Config {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(anyhow::anyhow!("Number of workers must be greater than 0"));
        }

        // The output root must lie outside the pending tree
        if resolved_path(&self.output_dir).starts_with(resolved_path(&self.pending_dir)) {
            return Err(anyhow::anyhow!(
                "Output directory {} must not be inside the pending directory {}",
                self.output_dir.display(),
                self.pending_dir.display()
            ));
        }

        let statics = [
            ("lossless", &self.profiles.lossless),
            ("photographic", &self.profiles.photographic),
            ("generic", &self.profiles.generic),
        ];
        for (name, profile) in statics {
            if profile.quality > 100 {
                return Err(anyhow::anyhow!("{} quality must be between 0 and 100", name));
            }
            if profile.method > 6 {
                return Err(anyhow::anyhow!("{} method must be between 0 and 6", name));
            }
            if profile.near_lossless.is_some_and(|level| level > 100) {
                return Err(anyhow::anyhow!("{} near-lossless level must be between 0 and 100", name));
            }
        }

        if self.profiles.animated.quality > 100 {
            return Err(anyhow::anyhow!("animated quality must be between 0 and 100"));
        }
        if self.profiles.animated.method > 6 {
            return Err(anyhow::anyhow!("animated method must be between 0 and 6"));
        }

        Ok(())
    }

    /// Default location of the config file (`<config_dir>/webp-converter/config.json`)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("webp-converter").join("config.json"))
    }

    /// Load configuration from file, falling back to defaults when it is missing
    pub async fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path).await?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub async fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let content = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }
}

/// Absolute form of a path with its longest existing prefix canonicalized
fn resolved_path(path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    };

    for ancestor in absolute.ancestors() {
        if let Ok(canonical) = std::fs::canonicalize(ancestor) {
            return match absolute.strip_prefix(ancestor) {
                Ok(rest) if !rest.as_os_str().is_empty() => canonical.join(rest),
                _ => canonical,
            };
        }
    }
    absolute
}
