//! # Error Types Module
//!
//! Questo modulo definisce i tipi di errore della conversione.
//! 
//! ## Categorie di errori:
//! - `Io`: Errori di I/O (file non trovati, permessi, stat fallite)
//! - `Image`: Errori di decodifica immagini (GIF corrotte, BMP illeggibili)
//! - `Encoder`: Il tool esterno (cwebp, gif2webp) è terminato con errore
//! - `UnsupportedFormat`: Estensione fuori dal registro dei formati
//! - `MissingDependency`: Tool esterno non trovato
//! - `Path`: Path di output non calcolabile
//! 
//! Gli errori per singolo file non escono mai dal converter: vengono loggati
//! e contati come conversioni fallite. Solo gli errori di setup arrivano al
//! `main` tramite `anyhow`.

/// Errors raised while converting a single file
#[derive(thiserror::Error, Debug)]
pub enum ConvertError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    
    #[error("Image decoding error: {0}")]
    Image(#[from] image::ImageError),
    
    #[error("Encoder error: {0}")]
    Encoder(String),
    
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),
    
    #[error("Dependency missing: {0}")]
    MissingDependency(String),
    
    #[error("Path error: {0}")]
    Path(String),
}
