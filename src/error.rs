//! Error types for the merge gate
//!
//! Only configuration and tooling failures are errors. An unauthorized file is
//! a normal outcome of the gate and never surfaces here, and neither does an
//! API call that comes back empty-handed (see `sources::github`).

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the merge gate
#[derive(Error, Debug)]
pub enum GateError {
    #[error("GITHUB_TOKEN environment variable is not set")]
    MissingCredential,

    #[error("cannot read ownership file {}: {source}", path.display())]
    OwnershipFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid ownership pattern '{pattern}' on line {line}: {source}")]
    InvalidPattern {
        line: usize,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("git {command} failed: {message}")]
    Git { command: String, message: String },

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("repository must be given as owner/name, got '{0}'")]
    InvalidRepository(String),
}

pub type Result<T> = std::result::Result<T, GateError>;
