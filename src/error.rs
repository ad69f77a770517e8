//! Crate-level error type

use thiserror::Error;

use crate::catalog::CatalogError;
use crate::normalize::NormalizeError;
use crate::source::SourceError;
use crate::template::TemplateError;

/// Errors surfaced by the pipeline and the command-line tool
#[derive(Error, Debug)]
pub enum Error {
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("source error: {0}")]
    Source(#[from] SourceError),

    #[error("normalization error: {0}")]
    Normalize(#[from] NormalizeError),

    #[error("template error: {0}")]
    Template(#[from] TemplateError),

    /// Malformed bracket request or report serialization failure
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Process exit code for the command-line tool
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Catalog(_) | Error::Template(_) | Error::Json(_) => 2,
            _ => 1,
        }
    }
}
