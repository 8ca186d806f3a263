//! # Path Resolution Module
//!
//! Centralizza il calcolo dei mirrored path: path relativo alla pending root,
//! riattaccato sotto la output root.

use crate::error::ConvertError;
use crate::format::TARGET_EXTENSION;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Utility per calcolare i path di output in modo centralizzato
pub struct PathResolver;

impl PathResolver {
    /// Mirror any entry (file or directory) of the source tree under the output root
    pub fn mirrored_path(source_root: &Path, output_root: &Path, entry: &Path) -> Result<PathBuf, ConvertError> {
        let relative = entry.strip_prefix(source_root).map_err(|_| {
            ConvertError::Path(format!(
                "{} is not inside {}",
                entry.display(),
                source_root.display()
            ))
        })?;
        Ok(output_root.join(relative))
    }

    /// Output path of a convertible file: mirrored path with the target extension
    pub fn output_path(source_root: &Path, output_root: &Path, input: &Path) -> Result<PathBuf, ConvertError> {
        if input.file_stem().is_none() {
            return Err(ConvertError::Path(format!("Invalid file name: {}", input.display())));
        }
        let result = Self::mirrored_path(source_root, output_root, input)?.with_extension(TARGET_EXTENSION);
        debug!("Resolved output path: {} -> {}", input.display(), result.display());
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_path_is_mirrored_with_new_extension() {
        let output = PathResolver::output_path(
            Path::new("pending"),
            Path::new("output"),
            Path::new("pending/a/b/img.png"),
        )
        .unwrap();
        assert_eq!(output, PathBuf::from("output/a/b/img.webp"));
    }

    #[test]
    fn test_top_level_file() {
        let output = PathResolver::output_path(
            Path::new("/srv/pending"),
            Path::new("/srv/output"),
            Path::new("/srv/pending/photo.JPEG"),
        )
        .unwrap();
        assert_eq!(output, PathBuf::from("/srv/output/photo.webp"));
    }

    #[test]
    fn test_only_last_extension_is_replaced() {
        let output = PathResolver::output_path(
            Path::new("pending"),
            Path::new("output"),
            Path::new("pending/archive.tar.gif"),
        )
        .unwrap();
        assert_eq!(output, PathBuf::from("output/archive.tar.webp"));
    }

    #[test]
    fn test_directory_is_mirrored_unchanged() {
        let output = PathResolver::mirrored_path(
            Path::new("pending"),
            Path::new("output"),
            Path::new("pending/a/b"),
        )
        .unwrap();
        assert_eq!(output, PathBuf::from("output/a/b"));
    }

    #[test]
    fn test_path_outside_source_root_is_rejected() {
        let result = PathResolver::output_path(
            Path::new("pending"),
            Path::new("output"),
            Path::new("elsewhere/img.png"),
        );
        assert!(matches!(result, Err(ConvertError::Path(_))));
    }
}
