// ABOUTME: Error type shared by the uint codec, the observation codec, and list key parsing.
// ABOUTME: Separates malformed input, corrupt encoded data, and values too wide for a field.

use thiserror::Error;

/// Errors produced while validating, encoding, or decoding lintulista data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// Caller-supplied input is malformed or out of range.
    #[error("validation error: {0}")]
    Validation(String),

    /// Persisted encoded data is corrupt: wrong length, bad symbol, or unknown index.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// A value does not fit in the requested number of symbols.
    #[error("value {value} does not fit in {width} symbol(s)")]
    Overflow { value: i64, width: usize },
}

impl CoreError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn encoding(message: impl Into<String>) -> Self {
        Self::Encoding(message.into())
    }
}
