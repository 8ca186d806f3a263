//! # WebP Tree Converter Library
//!
//! Converte ricorsivamente le immagini di una directory in WebP, replicando
//! la struttura delle directory in una root di output, e riporta statistiche
//! aggregate di compressione.
//! 
//! ## Architettura dei moduli:
//! - `config`: Configurazione, profili di encoding e validazione
//! - `error`: Tipi di errore per singolo file
//! - `format`: Registro dei formati supportati e probe delle GIF animate
//! - `encoder`: Seam `ImageEncoder` e implementazione con cwebp/gif2webp
//! - `converter`: Walk ricorsivo, conversione per file e statistiche
//! - `report`: Percentuali di riduzione e riepilogo finale
//! - `progress` / `json_output`: Feedback interattivo o JSON
//! - `tool_resolver`: Ricerca dei tool esterni
//! 
//! ## Utilizzo:
//! ```ignore
//! use webp_tree_converter::{Config, TreeConverter, ToolPathResolver, WebpToolchain};
//! 
//! let encoder = WebpToolchain::new(&ToolPathResolver::new());
//! let converter = TreeConverter::new(Config::default(), encoder).await?;
//! let stats = converter.run().await;
//! ```

pub mod config;
pub mod converter;
pub mod encoder;
pub mod error;
pub mod file_manager;
pub mod format;
pub mod json_output;
pub mod progress;
pub mod report;
pub mod tool_resolver;

pub use config::Config;
pub use converter::{ConversionOutcome, DirectoryStatistics, TreeConverter};
pub use encoder::{ImageEncoder, WebpToolchain};
pub use error::ConvertError;
pub use tool_resolver::ToolPathResolver;
