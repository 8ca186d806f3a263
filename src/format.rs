//! # Format Classifier Module
//!
//! Registro fisso dei formati sorgente riconosciuti e classificazione per
//! la scelta del profilo di encoding.
//!
//! ## Formati supportati (case-insensitive):
//! | Estensione   | Classe        | Note                                   |
//! |--------------|---------------|----------------------------------------|
//! | gif          | Generic       | Unico formato che può essere animato   |
//! | png          | Lossless      | Encoding near-lossless ad alto effort  |
//! | jpg / jpeg   | Photographic  | Qualità più alta per contenuto foto    |
//! | tiff         | Generic       |                                        |
//! | bmp          | Generic       |                                        |
//! | webp / avif  | Generic       |                                        |
//!
//! ## Percorso animato
//! Una GIF con più di un frame va a `gif2webp`, tutto il resto a `cwebp`.
//! Se il probe dei frame fallisce la GIF viene trattata come animata.

use crate::error::ConvertError;
use image::codecs::gif::GifDecoder;
use image::{AnimationDecoder, ImageResult};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::{debug, warn};

/// Extension of every output file
pub const TARGET_EXTENSION: &str = "webp";

/// Source image formats accepted for conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceFormat {
    Gif,
    Png,
    Jpeg,
    Tiff,
    Bmp,
    Webp,
    Avif,
}

/// Encoder tuning class of a source format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileClass {
    Lossless,
    Photographic,
    Generic,
}

const FORMAT_REGISTRY: [(&str, SourceFormat); 8] = [
    ("gif", SourceFormat::Gif),
    ("png", SourceFormat::Png),
    ("jpg", SourceFormat::Jpeg),
    ("jpeg", SourceFormat::Jpeg),
    ("tiff", SourceFormat::Tiff),
    ("bmp", SourceFormat::Bmp),
    ("webp", SourceFormat::Webp),
    ("avif", SourceFormat::Avif),
];

/// Check if an extension (with or without leading dot) is in the registry
pub fn is_supported(extension: &str) -> bool {
    SourceFormat::from_extension(extension).is_some()
}

/// Lower-cased extension of a path, used as key in the per-format counts
pub fn normalized_extension(path: &Path) -> Option<String> {
    path.extension().map(|ext| ext.to_string_lossy().to_lowercase())
}

impl SourceFormat {
    pub fn from_extension(extension: &str) -> Option<Self> {
        let ext = extension.trim_start_matches('.').to_lowercase();
        FORMAT_REGISTRY
            .iter()
            .find(|(name, _)| *name == ext)
            .map(|(_, format)| *format)
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        normalized_extension(path).and_then(|ext| Self::from_extension(&ext))
    }

    pub fn profile_class(self) -> ProfileClass {
        match self {
            Self::Png => ProfileClass::Lossless,
            Self::Jpeg => ProfileClass::Photographic,
            Self::Gif | Self::Tiff | Self::Bmp | Self::Webp | Self::Avif => ProfileClass::Generic,
        }
    }

    /// Only GIF inputs are probed for multiple frames
    pub fn is_animation_capable(self) -> bool {
        matches!(self, Self::Gif)
    }

    /// Whether cwebp can read the format directly, without a PNG intermediate
    pub fn cwebp_readable(self) -> bool {
        !matches!(self, Self::Gif | Self::Bmp)
    }
}

/// Decide whether a file must go through the animation transcoder.
///
/// Returns true only for GIF inputs reporting more than one frame. A probe
/// failure is logged and treated as animated.
pub fn requires_animated_path(path: &Path) -> bool {
    match SourceFormat::from_path(path) {
        Some(format) if format.is_animation_capable() => match has_multiple_frames(path) {
            Ok(animated) => {
                debug!("Frame probe for {}: animated = {}", path.display(), animated);
                animated
            }
            Err(e) => {
                warn!("Frame probe failed for {} ({}), treating as animated", path.display(), e);
                true
            }
        },
        _ => false,
    }
}

/// Decode frames until a second one shows up
fn has_multiple_frames(path: &Path) -> Result<bool, ConvertError> {
    let reader = BufReader::new(File::open(path)?);
    let decoder = GifDecoder::new(reader)?;
    let frames: ImageResult<Vec<_>> = decoder.into_frames().take(2).collect();
    Ok(frames?.len() > 1)
}
