use serde::{Deserialize, Serialize};

/// Options for a factory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FactoryOptions {
    /// Fail builds on override keys or paths that do not resolve against the
    /// model instead of skipping them with a warning.
    pub strict: bool,
}

impl Default for FactoryOptions {
    fn default() -> Self {
        Self { strict: true }
    }
}

impl FactoryOptions {
    pub fn lenient() -> Self {
        Self { strict: false }
    }
}
