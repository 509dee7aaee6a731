//! Error types for contract and policy loading.
//!
//! Only configuration and input problems are errors. Anything wrong inside
//! the contract itself is reported as a [`Violation`](crate::Violation).

use std::path::PathBuf;
use thiserror::Error;

/// Errors while loading a contract or a rule document.
#[derive(Debug, Error)]
pub enum LoadError {
    // IO errors (exit code 3)
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("cannot read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[cfg(feature = "remote")]
    #[error("failed to fetch {url}: {source}")]
    NetworkError {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    // Parse errors (exit code 2)
    #[error("invalid JSON: {source}")]
    InvalidJson {
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid YAML: {source}")]
    InvalidYaml {
        #[source]
        source: serde_yaml::Error,
    },

    #[error("unsupported contract format for {path}: expected .json, .yaml or .yml")]
    UnsupportedFormat { path: PathBuf },
}

impl LoadError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            LoadError::FileNotFound { .. } | LoadError::ReadError { .. } => 3,
            #[cfg(feature = "remote")]
            LoadError::NetworkError { .. } => 3,
            _ => 2,
        }
    }
}

/// Errors in the shape of the rule document itself.
///
/// A malformed per-method entry is not an error; it is skipped with a
/// warning so the remaining methods still validate.
#[derive(Debug, Error)]
pub enum RulesError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("rule document must be a JSON object, got {actual}")]
    NotAnObject { actual: String },

    #[error("invalid \"{key}\": expected a list of strings, got {actual}")]
    InvalidList { key: String, actual: String },

    #[error("cannot compile special character pattern: {source}")]
    InvalidPattern {
        #[source]
        source: regex::Error,
    },
}

impl RulesError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            RulesError::Load(e) => e.exit_code(),
            _ => 2,
        }
    }
}

/// Errors while preparing a conformance checker.
#[derive(Debug, Error)]
pub enum ConformanceError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("invalid meta-schema: {message}")]
    InvalidMetaSchema { message: String },
}

impl ConformanceError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            ConformanceError::Load(e) => e.exit_code(),
            ConformanceError::InvalidMetaSchema { .. } => 2,
        }
    }
}
