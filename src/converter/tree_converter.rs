//! # Tree Converter Main Orchestrator
//!
//! Orchestratore principale: visita ricorsivamente la pending root, calcola
//! il mirrored path di ogni entry e delega la conversione a `FileConverter`.
//!
//! Ogni directory restituisce il proprio `DirectoryStatistics`, fuso dal
//! chiamante solo dopo che il sottoalbero è stato completato.

use crate::{
    config::Config,
    converter::{
        file_converter::FileConverter,
        path_resolver::PathResolver,
        stats::DirectoryStatistics,
    },
    encoder::ImageEncoder,
    file_manager::FileManager,
    format::{self, SourceFormat},
    json_output::JsonMessage,
    progress::ProgressReporter,
    report::SummaryReport,
};
use anyhow::Result;
use futures::future::{self, BoxFuture, FutureExt};
use futures::stream::{self, StreamExt};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Orchestratore della conversione di un intero albero
pub struct TreeConverter<E> {
    config: Config,
    source_root: PathBuf,
    output_root: PathBuf,
    file_converter: FileConverter<E>,
    reporter: ProgressReporter,
    total_files: u64,
}

impl<E: ImageEncoder> TreeConverter<E> {
    /// Valida la configurazione e prepara le root di input e output.
    ///
    /// Le root mancanti vengono create: una pending root appena creata è vuota
    /// e la run produce statistiche a zero. Un fallimento qui termina la run.
    pub async fn new(config: Config, encoder: E) -> Result<Self> {
        config.validate()?;

        FileManager::ensure_dir(&config.pending_dir).await?;
        FileManager::ensure_dir(&config.output_dir).await?;

        let total_files = FileManager::count_convertible_files(&config.pending_dir);
        let reporter = ProgressReporter::new(total_files, config.json_output);
        Ok(Self::with_reporter(config, encoder, reporter, total_files))
    }

    fn with_reporter(config: Config, encoder: E, reporter: ProgressReporter, total_files: u64) -> Self {
        let file_converter = FileConverter::new(
            encoder,
            config.profiles.clone(),
            config.skip_existing,
            config.workers,
            reporter.clone(),
        );

        Self {
            source_root: config.pending_dir.clone(),
            output_root: config.output_dir.clone(),
            config,
            file_converter,
            reporter,
            total_files,
        }
    }

    pub fn file_converter(&self) -> &FileConverter<E> {
        &self.file_converter
    }

    /// Esegue la conversione dell'intero albero e stampa il riepilogo
    pub async fn run(&self) -> DirectoryStatistics {
        let start_time = Instant::now();

        if self.config.json_output {
            JsonMessage::start(&self.config, self.total_files).emit();
        } else {
            info!("Starting conversion: {} -> {}", self.source_root.display(), self.output_root.display());
            info!("Found {} convertible files (workers: {})", self.total_files, self.config.workers);
        }

        let stats = self.walk(&self.source_root).await;
        let elapsed = start_time.elapsed().as_secs_f64();

        let report = SummaryReport::new(&stats, elapsed);
        self.reporter.finish(&report.headline());
        if self.config.json_output {
            JsonMessage::complete(&stats, elapsed).emit();
        } else {
            report.log();
        }

        if !stats.is_consistent() {
            warn!("Inconsistent statistics: {:?}", stats);
        }
        stats
    }

    /// Visita una directory e restituisce le statistiche del suo sottoalbero
    pub fn walk<'a>(&'a self, dir: &'a Path) -> BoxFuture<'a, DirectoryStatistics> {
        self.walk_within(dir, Vec::new())
    }

    /// Walk ricorsivo con la catena delle directory antenate (path canonici).
    ///
    /// Una directory già presente tra gli antenati chiude un loop di symlink:
    /// viene saltata, come fa `walkdir` nel conteggio preliminare.
    fn walk_within<'a>(&'a self, dir: &'a Path, mut ancestors: Vec<PathBuf>) -> BoxFuture<'a, DirectoryStatistics> {
        async move {
            let canonical = match tokio::fs::canonicalize(dir).await {
                Ok(canonical) => canonical,
                Err(e) => {
                    error!("Failed to list directory {}: {}", dir.display(), e);
                    return DirectoryStatistics::new();
                }
            };
            if ancestors.contains(&canonical) {
                warn!("Skipping symlink loop: {} -> {}", dir.display(), canonical.display());
                return DirectoryStatistics::new();
            }
            ancestors.push(canonical);

            let entries = match Self::list_entries(dir).await {
                Ok(entries) => entries,
                Err(e) => {
                    error!("Failed to list directory {}: {}", dir.display(), e);
                    return DirectoryStatistics::new();
                }
            };
            debug!("Visiting {} ({} entries)", dir.display(), entries.len());

            let ancestors = &ancestors;
            stream::iter(entries)
                .map(|entry| self.visit(entry, ancestors))
                .buffer_unordered(self.config.workers.max(1))
                .fold(DirectoryStatistics::new(), |total, child| future::ready(total.merge(child)))
                .await
        }
        .boxed()
    }

    /// Elenca le entry nell'ordine restituito dal filesystem.
    ///
    /// Un errore a metà listing conserva le entry già lette.
    async fn list_entries(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
        let mut read_dir = tokio::fs::read_dir(dir).await?;
        let mut entries = Vec::new();
        loop {
            match read_dir.next_entry().await {
                Ok(Some(entry)) => entries.push(entry.path()),
                Ok(None) => break,
                Err(e) => {
                    error!("Directory listing of {} interrupted: {}", dir.display(), e);
                    break;
                }
            }
        }
        Ok(entries)
    }

    /// Gestisce una singola entry: ricorsione per le directory, conversione per i file
    fn visit<'a>(&'a self, path: PathBuf, ancestors: &'a [PathBuf]) -> BoxFuture<'a, DirectoryStatistics> {
        async move {
            let supported = SourceFormat::from_path(&path).is_some();
            let metadata = match tokio::fs::metadata(&path).await {
                Ok(metadata) => metadata,
                Err(e) if supported => {
                    // A supported file that cannot be inspected is a failed conversion
                    error!("❌ Failed to convert {}: {}", path.display(), e);
                    self.reporter.file_failed(&path, &e.to_string());
                    let extension = format::normalized_extension(&path).unwrap_or_default();
                    return DirectoryStatistics::single(&extension, None);
                }
                Err(e) => {
                    error!("Failed to inspect {}: {}", path.display(), e);
                    return DirectoryStatistics::new();
                }
            };

            if metadata.is_dir() {
                return self.walk_within(&path, ancestors.to_vec()).await;
            }

            if !supported {
                debug!("Skipping unsupported file: {}", path.display());
                self.reporter.file_skipped(&path, "unsupported format");
                return DirectoryStatistics::new();
            }
            let extension = format::normalized_extension(&path).unwrap_or_default();

            let outcome = match PathResolver::output_path(&self.source_root, &self.output_root, &path) {
                Ok(output) => self.file_converter.convert(&path, &output).await,
                Err(e) => {
                    error!("❌ Failed to convert {}: {}", path.display(), e);
                    self.reporter.file_failed(&path, &e.to_string());
                    None
                }
            };

            DirectoryStatistics::single(&extension, outcome)
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converter::file_converter::tests::RecordingEncoder;
    use crate::encoder::EncodePlan;
    use crate::format::tests::write_gif;
    use tempfile::TempDir;
    use walkdir::WalkDir;

    fn test_config(root: &Path) -> Config {
        Config {
            pending_dir: root.join("pending"),
            output_dir: root.join("output"),
            ..Default::default()
        }
    }

    async fn tree_converter(config: Config, encoder: RecordingEncoder) -> TreeConverter<RecordingEncoder> {
        FileManager::ensure_dir(&config.pending_dir).await.unwrap();
        FileManager::ensure_dir(&config.output_dir).await.unwrap();
        let total_files = FileManager::count_convertible_files(&config.pending_dir);
        TreeConverter::with_reporter(config, encoder, ProgressReporter::hidden(), total_files)
    }

    fn write_file(path: &Path, bytes: usize) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, vec![7u8; bytes]).unwrap();
    }

    fn output_files(root: &Path) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = WalkDir::new(root)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.path().strip_prefix(root).unwrap().to_path_buf())
            .collect();
        files.sort();
        files
    }

    #[tokio::test]
    async fn test_missing_pending_root_is_created() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(temp_dir.path());
        let pending = config.pending_dir.clone();

        let converter = TreeConverter::new(config, RecordingEncoder::new(10)).await.unwrap();
        assert!(pending.is_dir());

        let stats = converter.run().await;
        assert_eq!(stats, DirectoryStatistics::new());
    }

    #[tokio::test]
    async fn test_empty_directory_yields_zero_statistics() {
        let temp_dir = TempDir::new().unwrap();
        let converter = tree_converter(test_config(temp_dir.path()), RecordingEncoder::new(10)).await;

        let stats = converter.walk(&temp_dir.path().join("pending")).await;
        assert_eq!(stats.total_files, 0);
        assert_eq!(stats.successful_conversions, 0);
        assert_eq!(stats.failed_conversions, 0);
        assert_eq!(stats.total_original_size, 0);
        assert_eq!(stats.total_new_size, 0);
        assert!(stats.format_counts.is_empty());
    }

    #[tokio::test]
    async fn test_nested_file_is_mirrored() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(temp_dir.path());
        write_file(&config.pending_dir.join("a").join("b").join("img.png"), 1000);

        let converter = tree_converter(config, RecordingEncoder::new(400)).await;
        let stats = converter.run().await;

        assert_eq!(
            output_files(&temp_dir.path().join("output")),
            vec![PathBuf::from("a/b/img.webp")]
        );
        assert_eq!(stats.successful_conversions, 1);
        assert_eq!(stats.total_original_size, 1000);
        assert_eq!(stats.total_new_size, 400);
        assert_eq!(format!("{:.2}", stats.reduction_percent()), "60.00");
    }

    #[tokio::test]
    async fn test_unsupported_files_are_not_counted() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(temp_dir.path());
        write_file(&config.pending_dir.join("notes.txt"), 50);
        write_file(&config.pending_dir.join("photo.JPG"), 80);

        let converter = tree_converter(config, RecordingEncoder::new(20)).await;
        let stats = converter.run().await;

        assert_eq!(stats.total_files, 1);
        assert_eq!(stats.format_counts.get("jpg"), Some(&1));
        assert!(!stats.format_counts.contains_key("txt"));
        assert_eq!(
            output_files(&temp_dir.path().join("output")),
            vec![PathBuf::from("photo.webp")]
        );
    }

    #[tokio::test]
    async fn test_one_failure_among_three_files() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(temp_dir.path());
        for name in ["first.png", "broken.png", "third.png"] {
            write_file(&config.pending_dir.join(name), 100);
        }

        let converter = tree_converter(config, RecordingEncoder::failing_on(40, "broken")).await;
        let stats = converter.run().await;

        assert_eq!(stats.total_files, 3);
        assert_eq!(stats.successful_conversions, 2);
        assert_eq!(stats.failed_conversions, 1);
        assert_eq!(stats.total_original_size, 200);
        assert_eq!(stats.total_new_size, 80);
        assert_eq!(
            output_files(&temp_dir.path().join("output")),
            vec![PathBuf::from("first.webp"), PathBuf::from("third.webp")]
        );
    }

    #[tokio::test]
    async fn test_statistics_are_consistent_at_every_level() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(temp_dir.path());
        let pending = config.pending_dir.clone();
        write_file(&pending.join("top.png"), 10);
        write_file(&pending.join("x").join("fail_one.jpg"), 10);
        write_file(&pending.join("x").join("ok.jpeg"), 10);
        write_file(&pending.join("x").join("y").join("fail_two.bmp"), 10);
        write_file(&pending.join("x").join("y").join("skip.md"), 10);
        write_file(&pending.join("z").join("deep.tiff"), 10);

        let converter = tree_converter(config, RecordingEncoder::failing_on(5, "fail")).await;

        for dir in [pending.clone(), pending.join("x"), pending.join("x").join("y"), pending.join("z")] {
            let stats = converter.walk(&dir).await;
            assert!(stats.is_consistent(), "inconsistent statistics for {}", dir.display());
        }

        let root = converter.walk(&pending).await;
        assert_eq!(root.total_files, 5);
        assert_eq!(root.failed_conversions, 2);
        assert_eq!(root.format_counts.len(), 5);

        let y = converter.walk(&pending.join("x").join("y")).await;
        assert_eq!(y.total_files, 1);
        assert_eq!(y.failed_conversions, 1);
    }

    #[tokio::test]
    async fn test_parallel_walk_matches_sequential_totals() {
        let temp_dir = TempDir::new().unwrap();
        let sequential_config = test_config(temp_dir.path());
        let pending = sequential_config.pending_dir.clone();
        for i in 0..6 {
            write_file(&pending.join(format!("d{}", i % 3)).join(format!("img{}.png", i)), 100 + i);
        }
        write_file(&pending.join("d1").join("bad.gif"), 30);

        let sequential = tree_converter(sequential_config.clone(), RecordingEncoder::failing_on(50, "bad"))
            .await
            .walk(&pending)
            .await;

        let parallel_config = Config { workers: 4, ..sequential_config };
        let parallel = tree_converter(parallel_config, RecordingEncoder::failing_on(50, "bad"))
            .await
            .walk(&pending)
            .await;

        assert_eq!(sequential, parallel);
        assert_eq!(parallel.total_files, 7);
        assert_eq!(parallel.failed_conversions, 1);
    }

    #[tokio::test]
    async fn test_animated_and_static_gifs_in_tree() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(temp_dir.path());
        std::fs::create_dir_all(config.pending_dir.join("gifs")).unwrap();
        write_gif(&config.pending_dir.join("gifs").join("anim.gif"), 2);
        write_gif(&config.pending_dir.join("gifs").join("still.gif"), 1);

        let converter = tree_converter(config, RecordingEncoder::new(10)).await;
        let stats = converter.run().await;
        assert_eq!(stats.successful_conversions, 2);
        assert_eq!(stats.format_counts.get("gif"), Some(&2));

        let requests = converter.file_converter().encoder().recorded();
        let animated: Vec<_> = requests.iter().filter(|r| r.plan.is_animated()).collect();
        assert_eq!(animated.len(), 1);
        assert!(animated[0].input.ends_with("anim.gif"));
        assert!(requests
            .iter()
            .any(|r| r.input.ends_with("still.gif") && matches!(r.plan, EncodePlan::Static(_))));
    }

    #[tokio::test]
    async fn test_unlistable_directory_yields_empty_statistics() {
        let temp_dir = TempDir::new().unwrap();
        let converter = tree_converter(test_config(temp_dir.path()), RecordingEncoder::new(10)).await;
        let stats = converter.walk(&temp_dir.path().join("pending").join("vanished")).await;
        assert_eq!(stats, DirectoryStatistics::new());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_dangling_symlink_counts_as_failure() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(temp_dir.path());
        write_file(&config.pending_dir.join("ok.png"), 100);
        std::os::unix::fs::symlink(
            config.pending_dir.join("gone.png"),
            config.pending_dir.join("dangling.png"),
        )
        .unwrap();

        let converter = tree_converter(config, RecordingEncoder::new(40)).await;
        let stats = converter.run().await;

        assert_eq!(stats.total_files, 2);
        assert_eq!(stats.successful_conversions, 1);
        assert_eq!(stats.failed_conversions, 1);
        assert_eq!(stats.format_counts.get("png"), Some(&2));
        assert!(stats.is_consistent());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_symlink_loop_is_visited_once() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(temp_dir.path());
        let pending = config.pending_dir.clone();
        write_file(&pending.join("ok.png"), 100);
        std::fs::create_dir_all(pending.join("sub")).unwrap();
        std::os::unix::fs::symlink(&pending, pending.join("loop")).unwrap();
        std::os::unix::fs::symlink(&pending, pending.join("sub").join("back")).unwrap();

        let converter = tree_converter(config, RecordingEncoder::new(40)).await;
        assert_eq!(converter.total_files, 1);

        let stats = converter.run().await;
        assert_eq!(stats.total_files, converter.total_files);
        assert_eq!(stats.successful_conversions, 1);
        assert_eq!(
            output_files(&temp_dir.path().join("output")),
            vec![PathBuf::from("ok.webp")]
        );
    }

    #[tokio::test]
    async fn test_invalid_config_is_a_setup_failure() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config {
            workers: 0,
            ..test_config(temp_dir.path())
        };
        assert!(TreeConverter::new(config, RecordingEncoder::new(10)).await.is_err());
    }
}
