//! Failure modes of an import attempt.
//!
//! None of these cross the public pipeline boundary as `Err`; the importer
//! renders them into [`crate::importer::ImportTransformResult`].

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Invalid JSON: {0}")]
    Parse(#[source] serde_json::Error),

    #[error("Failed to read import structure: {0}")]
    Shape(#[source] serde_json::Error),

    #[error("Failed to read file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Import file is not valid UTF-8 text")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    #[error("Timed out after {0:?} reading import file")]
    Timeout(Duration),

    #[error("Failed to read upload: {0}")]
    Upload(String),
}

pub type Result<T> = std::result::Result<T, ImportError>;
