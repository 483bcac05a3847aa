//! Error types and handling for the fpick core

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for fpick operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the fpick core
#[derive(Error, Debug)]
pub enum Error {
    /// Directory argument is not under any known workspace root
    #[error("directory is outside every workspace root: {0}")]
    OutsideWorkspace(PathBuf),

    /// Un-excluding a directory whose ancestor is still excluded
    #[error("cannot un-exclude {dir}: parent directory {ancestor} is still excluded")]
    AncestorExcluded { dir: PathBuf, ancestor: PathBuf },

    /// An index build for the same root is already in flight
    #[error("an index build is already running for {0}")]
    BuildInProgress(PathBuf),

    /// Cache directory could not be created; nothing else can work
    #[error("failed to create cache directory {path}: {source}")]
    CacheDir {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Workspace root itself could not be read
    #[error("failed to read workspace root {path}: {source}")]
    RootUnreadable {
        path: PathBuf,
        source: std::io::Error,
    },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
