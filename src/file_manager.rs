//! # File Management Module
//!
//! Operazioni sui file condivise tra converter, walker e report.
//!
//! ## Responsabilità:
//! - Dimensione dei file prima e dopo la conversione
//! - Creazione idempotente delle directory (root e parent dell'output)
//! - Conteggio preliminare dei file convertibili per la progress bar
//! - Formattazione human-readable delle dimensioni

use crate::format::SourceFormat;
use anyhow::Result;
use std::path::Path;
use tokio::fs;
use walkdir::WalkDir;

/// Manages file operations and discovery
pub struct FileManager;

impl FileManager {
    /// Size of a file in bytes
    pub async fn file_size(path: &Path) -> std::io::Result<u64> {
        Ok(fs::metadata(path).await?.len())
    }

    /// Create a directory and its parents, succeeding if it already exists
    pub async fn ensure_dir(path: &Path) -> Result<()> {
        fs::create_dir_all(path)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to create directory {}: {}", path.display(), e))
    }

    /// Create the parent directories of a file path
    pub async fn ensure_parent_dirs(path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// Count supported image files below a directory
    pub fn count_convertible_files(root: &Path) -> u64 {
        WalkDir::new(root)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| SourceFormat::from_path(e.path()).is_some())
            .count() as u64
    }

    /// Get human-readable file size
    pub fn format_size(size: u64) -> String {
        const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
        let mut size = size as f64;
        let mut unit_index = 0;

        while size >= 1024.0 && unit_index < UNITS.len() - 1 {
            size /= 1024.0;
            unit_index += 1;
        }

        if unit_index == 0 {
            format!("{} {}", size as u64, UNITS[unit_index])
        } else {
            format!("{:.2} {}", size, UNITS[unit_index])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_format_size() {
        assert_eq!(FileManager::format_size(0), "0 B");
        assert_eq!(FileManager::format_size(1023), "1023 B");
        assert_eq!(FileManager::format_size(1536), "1.50 KB");
        assert_eq!(FileManager::format_size(5 * 1024 * 1024), "5.00 MB");
    }

    #[test]
    fn test_count_convertible_files() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(temp_dir.path().join("one.png"), b"x").unwrap();
        std::fs::write(nested.join("two.JPG"), b"x").unwrap();
        std::fs::write(nested.join("notes.txt"), b"x").unwrap();

        assert_eq!(FileManager::count_convertible_files(temp_dir.path()), 2);
    }

    #[tokio::test]
    async fn test_ensure_dir_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("x").join("y");
        FileManager::ensure_dir(&dir).await.unwrap();
        FileManager::ensure_dir(&dir).await.unwrap();
        assert!(dir.is_dir());

        let file = dir.join("z").join("img.webp");
        FileManager::ensure_parent_dirs(&file).await.unwrap();
        FileManager::ensure_parent_dirs(&file).await.unwrap();
        assert!(dir.join("z").is_dir());
    }

    #[tokio::test]
    async fn test_file_size() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("data.bin");
        std::fs::write(&file, vec![0u8; 321]).unwrap();
        assert_eq!(FileManager::file_size(&file).await.unwrap(), 321);
        assert!(FileManager::file_size(&temp_dir.path().join("nope")).await.is_err());
    }
}
