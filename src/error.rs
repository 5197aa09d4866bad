//! Error types for k2list.

use std::path::PathBuf;
use thiserror::Error;

/// Error type for k2list operations.
///
/// Every variant is fatal for a merge run. Entries that fail to parse as
/// networks are not errors; they are kept as domains.
#[derive(Error, Debug)]
pub enum Error {
    /// Directory could not be listed
    #[error("failed to read directory {path:?}: {source}")]
    ReadDir {
        path: PathBuf,
        source: std::io::Error,
    },

    /// List file could not be read or is not valid UTF-8
    #[error("failed to read list file {path:?}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Output file could not be written
    #[error("failed to write {path:?}: {source}")]
    WriteFile {
        path: PathBuf,
        source: std::io::Error,
    },

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type alias for k2list operations.
pub type Result<T> = std::result::Result<T, Error>;
