use thiserror::Error;

/// Boxed failure raised by user generator functions and hooks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors emitted by factories.
#[derive(Debug, Error)]
pub enum FactoryError {
    #[error("no such attribute name '{name}' on {model}")]
    UnknownField { model: &'static str, name: String },
    #[error("target should be {expected}, got {found}")]
    ShapeMismatch {
        expected: &'static str,
        found: &'static str,
    },
    #[error("override '{key}' does not address a field of {model}")]
    UnknownOverride { model: &'static str, key: String },
    #[error("sequence for '{key}' no longer fits in i32")]
    SequenceOverflow { key: String },
    #[error("build of {model} cancelled")]
    Cancelled { model: &'static str },
    #[error("core error: {0}")]
    Core(#[from] fixtura_core::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Generator(BoxError),
}

impl FactoryError {
    /// Wrap a failure raised inside a generator function or hook.
    pub fn generator(err: impl Into<BoxError>) -> Self {
        FactoryError::Generator(err.into())
    }
}

/// Result type for factory operations.
pub type FactoryResult<T> = std::result::Result<T, FactoryError>;
