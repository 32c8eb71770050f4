use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum HiriseError {
    #[error("malformed identifier: {0}")]
    MalformedIdentifier(String),

    #[error("invalid orbit number: {0} (must be an integer in 0..=999999)")]
    InvalidOrbit(String),

    #[error("invalid target code: {0} (must be exactly 4 characters)")]
    InvalidTargetCode(String),

    #[error("invalid product kind: {0}")]
    InvalidKind(String),

    #[error("invalid CCD: {0}")]
    InvalidCcd(String),

    #[error("invalid channel: {0} (must be 0 or 1)")]
    InvalidChannel(String),

    #[error("no {artifact} exists for {kind} products")]
    UnsupportedArtifact {
        artifact: &'static str,
        kind: String,
    },

    #[error("archive-relative path must not be empty")]
    EmptyPath,

    #[error("missing config file hirise-dl.json in current directory")]
    MissingConfig,

    #[error("failed to read config file at {0}")]
    ConfigRead(PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),

    #[error("archive request failed: {0}")]
    ArchiveHttp(String),

    #[error("archive returned status {status} for {url}")]
    ArchiveStatus { status: u16, url: String },

    #[error("filesystem error: {0}")]
    Filesystem(String),

    #[error("product not found locally: {0}")]
    ProductNotFound(String),
}
