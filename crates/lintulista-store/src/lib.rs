// ABOUTME: Persistence layer for lintulista, exposing list rows as individually addressable columns.
// ABOUTME: Provides the ColumnStore capability trait with SQLite and in-memory backends.

pub mod column;
pub mod memory;
pub mod sqlite;

pub use column::{Column, ColumnStore, ColumnValue, NewList, StoreError};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
