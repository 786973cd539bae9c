use std::io;
use std::path::PathBuf;

use deck_core::ConfigurationError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SheetError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid SVG: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("malformed SVG: {0}")]
    Malformed(String),

    #[error("invalid slice annotation '{0}' (expected '(slice=N)' with N > 0)")]
    SliceAnnotation(String),

    #[error("template error: {0}")]
    Template(String),

    #[error("no image sets found under {}", .0.display())]
    NoImageSets(PathBuf),

    #[error("failed to scan image folders: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("PNG encoding failed: {0}")]
    Png(#[from] png::EncodingError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("SVG output is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error(transparent)]
    Layout(#[from] ConfigurationError),
}

pub type Result<T, E = SheetError> = std::result::Result<T, E>;
