//! # Converter Module
//!
//! Separa le responsabilità della conversione in sottomoduli:
//! - `tree_converter`: Orchestratore e walk ricorsivo
//! - `file_converter`: Worker per singoli file
//! - `path_resolver`: Calcolo dei mirrored path
//! - `stats`: Risultati per file e statistiche aggregate

pub mod file_converter;
pub mod path_resolver;
pub mod stats;
pub mod tree_converter;

pub use file_converter::FileConverter;
pub use path_resolver::PathResolver;
pub use stats::{ConversionOutcome, DirectoryStatistics};
pub use tree_converter::TreeConverter;
