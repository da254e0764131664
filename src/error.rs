//! Error types for doxup operations.

use thiserror::Error;

/// Errors that can occur while enumerating or rewriting documentation pages.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid glob pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("Glob error: {0}")]
    Glob(#[from] glob::GlobError),

    #[error("Missing required element: {0}")]
    MissingElement(String),

    #[error("Malformed event field: {0}")]
    MalformedField(String),
}

pub type Result<T> = std::result::Result<T, Error>;
