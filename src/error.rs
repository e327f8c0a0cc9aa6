use std::path::PathBuf;

use thiserror::Error;

/// Fatal per-file conditions. Anything softer (unknown record types,
/// malformed lines) is skipped with a warning instead.
#[derive(Debug, Error)]
pub enum ZoneError {
    #[error("{file}: no SOA record found")]
    MissingSoa { file: String },

    #[error("{file}: invalid $TTL value '{token}'")]
    InvalidTtl { file: String, token: String },

    #[error("{op} {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        op: &'static str,
        #[source]
        source: std::io::Error,
    },
}

impl ZoneError {
    pub fn io(op: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ZoneError::Io {
            path: path.into(),
            op,
            source,
        }
    }
}
