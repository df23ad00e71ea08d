// ABOUTME: The capability interface the list core consumes: read and write one column of one list.
// ABOUTME: Defines the column set, native column value types, and storage errors.

use std::fmt;

use async_trait::async_trait;
use lintulista_core::ListKey;
use thiserror::Error;

/// Errors that can occur in a column store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("list not found: {0}")]
    ListNotFound(ListKey),

    #[error("list already exists: {0}")]
    DuplicateList(ListKey),

    #[error("column {column} holds {found}, expected {expected}")]
    TypeMismatch {
        column: Column,
        expected: &'static str,
        found: &'static str,
    },

    #[error("storage task failed: {0}")]
    Task(String),
}

/// The writable columns of a list row. The key column identifies the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Username,
    PasswordHash,
    Token,
    TokenValidUntil,
    Observations,
}

impl Column {
    pub const ALL: [Column; 5] = [
        Column::Username,
        Column::PasswordHash,
        Column::Token,
        Column::TokenValidUntil,
        Column::Observations,
    ];

    /// The SQL column name.
    pub fn name(self) -> &'static str {
        match self {
            Column::Username => "username",
            Column::PasswordHash => "password_hash",
            Column::Token => "token",
            Column::TokenValidUntil => "token_valid_until",
            Column::Observations => "observations",
        }
    }

    /// Whether the column stores integers rather than text.
    pub fn is_integer(self) -> bool {
        matches!(self, Column::TokenValidUntil)
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A column value in its native type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnValue {
    Text(String),
    Integer(i64),
}

impl ColumnValue {
    fn kind(&self) -> &'static str {
        match self {
            ColumnValue::Text(_) => "text",
            ColumnValue::Integer(_) => "integer",
        }
    }

    /// Unwrap a text value read from `column`.
    pub fn into_text(self, column: Column) -> Result<String, StoreError> {
        match self {
            ColumnValue::Text(text) => Ok(text),
            other => Err(StoreError::TypeMismatch {
                column,
                expected: "text",
                found: other.kind(),
            }),
        }
    }

    /// Unwrap an integer value read from `column`.
    pub fn into_integer(self, column: Column) -> Result<i64, StoreError> {
        match self {
            ColumnValue::Integer(value) => Ok(value),
            other => Err(StoreError::TypeMismatch {
                column,
                expected: "integer",
                found: other.kind(),
            }),
        }
    }

    /// Reject values whose native type does not match the column.
    pub fn check_for(&self, column: Column) -> Result<(), StoreError> {
        let expected = if column.is_integer() { "integer" } else { "text" };
        if self.kind() == expected {
            Ok(())
        } else {
            Err(StoreError::TypeMismatch {
                column,
                expected,
                found: self.kind(),
            })
        }
    }
}

impl From<String> for ColumnValue {
    fn from(value: String) -> Self {
        ColumnValue::Text(value)
    }
}

impl From<&str> for ColumnValue {
    fn from(value: &str) -> Self {
        ColumnValue::Text(value.to_owned())
    }
}

impl From<i64> for ColumnValue {
    fn from(value: i64) -> Self {
        ColumnValue::Integer(value)
    }
}

/// A freshly provisioned list row: empty log, no token.
#[derive(Debug, Clone)]
pub struct NewList {
    pub key: ListKey,
    pub username: String,
    pub password_hash: String,
}

/// Column-level access to list rows. Every call goes to the backing store;
/// implementations keep no per-list cache.
#[async_trait]
pub trait ColumnStore: Send + Sync {
    /// Read one column of the list identified by `key`.
    async fn get_column(&self, column: Column, key: &ListKey) -> Result<ColumnValue, StoreError>;

    /// Overwrite one column of the list identified by `key`.
    async fn set_column(
        &self,
        column: Column,
        key: &ListKey,
        value: ColumnValue,
    ) -> Result<(), StoreError>;

    /// Overwrite several columns together. Backends that can apply the writes
    /// atomically override this; the default writes them in order.
    async fn set_columns(
        &self,
        key: &ListKey,
        values: Vec<(Column, ColumnValue)>,
    ) -> Result<(), StoreError> {
        for (column, value) in values {
            self.set_column(column, key, value).await?;
        }
        Ok(())
    }

    /// Whether a row exists for `key`.
    async fn list_exists(&self, key: &ListKey) -> Result<bool, StoreError>;

    /// Insert a new list row. Fails with [`StoreError::DuplicateList`] if the key is taken.
    async fn create_list(&self, list: NewList) -> Result<(), StoreError>;
}
