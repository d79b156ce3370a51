use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DebarrelError {
    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read {path}")]
    Unreadable { path: PathBuf },

    #[error("failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("failed to parse config at {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },

    #[error("invalid glob {pattern:?}: {message}")]
    InvalidGlob { pattern: String, message: String },
}
