use thiserror::Error;

/// Core error type shared across Fixtura crates.
#[derive(Debug, Error)]
pub enum Error {
    /// The model value cannot be described as an ordered set of fields.
    #[error("invalid model: {0}")]
    InvalidModel(String),
    /// A dotted override path does not resolve against the instance.
    #[error("invalid override path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },
    /// Conversion between a model and its field values failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias for results returned by Fixtura crates.
pub type Result<T> = std::result::Result<T, Error>;
