// src/errors.rs

//! Crate-wide error type.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum JarsyncError {
    /// Invalid or missing source directory, or an output path nested inside
    /// the source directory.
    #[error("Path error: {0}")]
    PathError(String),

    /// Any I/O failure while building the archive.
    #[error("Archive error: {context}: {source}")]
    ArchiveError {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl JarsyncError {
    pub(crate) fn archive(context: impl Into<String>, source: std::io::Error) -> Self {
        JarsyncError::ArchiveError {
            context: context.into(),
            source,
        }
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, JarsyncError>;
