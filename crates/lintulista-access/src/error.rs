// ABOUTME: Error taxonomy surfaced by list access operations.
// ABOUTME: Codec and storage errors are folded in so callers match on one enum.

use lintulista_core::CoreError;
use lintulista_store::StoreError;
use thiserror::Error;

/// Errors returned by [`crate::SessionManager`] and [`crate::ListAccessor`].
#[derive(Debug, Error)]
pub enum AccessError {
    /// Malformed or out-of-range input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Missing, invalid, or expired token.
    #[error("authorization error: {0}")]
    Auth(String),

    /// The observation to delete is not on the list.
    #[error("not found: {0}")]
    NotFound(String),

    /// The persisted observation log is corrupt.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// A value was too wide for its encoded field.
    #[error("value {value} does not fit in {width} symbol(s)")]
    Overflow { value: i64, width: usize },

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl From<CoreError> for AccessError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(message) => AccessError::Validation(message),
            CoreError::Encoding(message) => AccessError::Encoding(message),
            CoreError::Overflow { value, width } => AccessError::Overflow { value, width },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_errors_keep_their_kind() {
        assert!(matches!(
            AccessError::from(CoreError::validation("bad day")),
            AccessError::Validation(m) if m == "bad day"
        ));
        assert!(matches!(
            AccessError::from(CoreError::encoding("bad symbol")),
            AccessError::Encoding(_)
        ));
        assert!(matches!(
            AccessError::from(CoreError::Overflow { value: 4096, width: 2 }),
            AccessError::Overflow { value: 4096, width: 2 }
        ));
    }
}
