//! Error types for file serving

use hyper::StatusCode;
use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum ServeError {
    #[error("Not found: {path}")]
    NotFound { path: String },

    #[error("Path escapes base directory: {path} -> {}", .resolved.display())]
    Forbidden { path: String, resolved: PathBuf },

    #[error("Failed to read '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ServeError {
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound { path: path.into() }
    }

    /// Status code sent to the client.
    ///
    /// Containment violations look exactly like missing files from outside.
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } | Self::Forbidden { .. } => StatusCode::NOT_FOUND,
            Self::Io { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
