use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DiscoveryError>;

/// Fatal discovery errors. Per-file problems never surface here, see [`SkippedFile`].
#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("Invalid project root: {0}")]
    InvalidRoot(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Discovery task failed: {0}")]
    Task(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl ConfigError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::Invalid(msg.into())
    }
}

/// Why a file was left out of the registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SkipReason {
    /// Missing, unreadable, or not UTF-8
    Unreadable { message: String },
    TooLarge { bytes: u64, limit: u64 },
    /// Even best-effort parsing gave up
    Unparseable { message: String },
    /// Analysis of the file panicked
    Crashed { message: String },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unreadable { message } => write!(f, "unreadable: {message}"),
            Self::TooLarge { bytes, limit } => write!(f, "too large: {bytes} bytes > {limit}"),
            Self::Unparseable { message } => write!(f, "unparseable: {message}"),
            Self::Crashed { message } => write!(f, "analysis crashed: {message}"),
        }
    }
}

/// A file discovery had to skip, with the repo-relative path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedFile {
    pub path: String,
    pub reason: SkipReason,
}

impl SkippedFile {
    /// Record the skip and emit its single warning line
    pub(crate) fn logged(path: impl Into<String>, reason: SkipReason) -> Self {
        let skipped = Self {
            path: path.into(),
            reason,
        };
        log::warn!("Skipping {}: {}", skipped.path, skipped.reason);
        skipped
    }
}
