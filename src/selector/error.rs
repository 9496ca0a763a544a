//! Error types for selector parsing.

use thiserror::Error;

/// Errors that can occur while reading a selector from text.
#[derive(Debug, Error)]
pub enum SelectorParseError {
    /// The input is not a valid JSON selector.
    #[error("Invalid JSON selector: {0}")]
    Json(#[from] serde_json::Error),

    /// The input is not a valid YAML selector.
    #[error("Invalid YAML selector: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
