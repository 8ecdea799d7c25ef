//! SNF-prefixed error types with structured error codes.

#![allow(missing_docs)]

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Shared `Result` alias for the project.
pub type Result<T> = std::result::Result<T, SniffError>;

/// Top-level error type for the dashboard engine.
///
/// A user-requested quit is deliberately *not* an error variant: the event
/// loop reports it as a normal `Ok(())` return so callers never log a clean
/// exit as a failure.
#[derive(Debug, Error)]
pub enum SniffError {
    #[error("[SNF-1001] invalid configuration: {details}")]
    InvalidConfig { details: String },

    #[error("[SNF-1002] missing configuration file: {path}")]
    MissingConfig { path: PathBuf },

    #[error("[SNF-1003] configuration parse failure in {context}: {details}")]
    ConfigParse {
        context: &'static str,
        details: String,
    },

    #[error("[SNF-2001] terminal backend failure during {op}: {source}")]
    Backend {
        op: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("[SNF-3002] IO failure at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("[SNF-3003] channel closed in component {component}")]
    ChannelClosed { component: &'static str },

    #[error("[SNF-3900] runtime failure: {details}")]
    Runtime { details: String },
}

impl SniffError {
    /// Stable machine-parseable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidConfig { .. } => "SNF-1001",
            Self::MissingConfig { .. } => "SNF-1002",
            Self::ConfigParse { .. } => "SNF-1003",
            Self::Backend { .. } => "SNF-2001",
            Self::Io { .. } => "SNF-3002",
            Self::ChannelClosed { .. } => "SNF-3003",
            Self::Runtime { .. } => "SNF-3900",
        }
    }

    /// Whether retrying might resolve the failure.
    ///
    /// Backend failures are not retryable: an I/O error from clear/flush
    /// means the terminal is unusable and the loop must abort.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Io { .. } | Self::Runtime { .. })
    }

    /// Convenience constructor for IO errors with a known path.
    #[must_use]
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Convenience constructor for backend failures tagged with the failing
    /// operation (`init`, `clear`, `flush`, `sync`).
    #[must_use]
    pub const fn backend(op: &'static str, source: std::io::Error) -> Self {
        Self::Backend { op, source }
    }
}

impl From<toml::de::Error> for SniffError {
    fn from(value: toml::de::Error) -> Self {
        Self::ConfigParse {
            context: "toml",
            details: value.to_string(),
        }
    }
}
