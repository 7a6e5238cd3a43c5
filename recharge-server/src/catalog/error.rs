//! Station catalog error types.

use std::path::PathBuf;

/// Errors that can occur when loading the station catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// Catalog file could not be read
    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Catalog JSON is malformed
    #[error("JSON parse error: {message}")]
    Json { message: String },

    /// Two stations in one district share a name
    #[error("duplicate station {name} in {region}/{district}")]
    DuplicateStation {
        region: String,
        district: String,
        name: String,
    },
}
