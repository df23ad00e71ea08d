// ABOUTME: SQLite-backed column store holding one row per list in the `lintulista` table.
// ABOUTME: Statements run on tokio's blocking pool against a single mutex-guarded connection.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use lintulista_core::ListKey;
use rusqlite::types::Value;
use rusqlite::{Connection, ErrorCode, OptionalExtension, params};

use crate::column::{Column, ColumnStore, ColumnValue, NewList, StoreError};

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS lintulista (
    key TEXT PRIMARY KEY NOT NULL,
    username TEXT NOT NULL,
    password_hash TEXT NOT NULL,
    token TEXT NOT NULL DEFAULT '',
    token_valid_until INTEGER NOT NULL DEFAULT 0,
    observations TEXT NOT NULL DEFAULT ''
);";

/// A column store persisting lists in a SQLite database file.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open or create a database at the given path and ensure the schema exists.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        tracing::debug!("opened sqlite store at {}", path.display());
        Self::with_schema(conn)
    }

    /// Open a private in-memory database. Useful for tests.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::with_schema(Connection::open_in_memory()?)
    }

    fn with_schema(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    async fn run<T, F>(&self, op: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T, StoreError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = conn
                .lock()
                .map_err(|_| StoreError::Task("sqlite connection lock poisoned".to_string()))?;
            op(&mut guard)
        })
        .await
        .map_err(|e| StoreError::Task(e.to_string()))?
    }
}

fn update_column(
    conn: &Connection,
    column: Column,
    key: &ListKey,
    value: ColumnValue,
) -> Result<(), StoreError> {
    value.check_for(column)?;
    let sql = format!("UPDATE lintulista SET {} = ?1 WHERE key = ?2", column.name());
    let changed = match value {
        ColumnValue::Text(text) => conn.execute(&sql, params![text, key.as_str()])?,
        ColumnValue::Integer(int) => conn.execute(&sql, params![int, key.as_str()])?,
    };
    if changed == 0 {
        return Err(StoreError::ListNotFound(key.clone()));
    }
    Ok(())
}

fn value_from_sql(column: Column, value: Value) -> Result<ColumnValue, StoreError> {
    let value = match value {
        Value::Text(text) => ColumnValue::Text(text),
        Value::Integer(int) => ColumnValue::Integer(int),
        Value::Null => return Err(mismatch(column, "null")),
        Value::Real(_) => return Err(mismatch(column, "real")),
        Value::Blob(_) => return Err(mismatch(column, "blob")),
    };
    value.check_for(column)?;
    Ok(value)
}

fn mismatch(column: Column, found: &'static str) -> StoreError {
    StoreError::TypeMismatch {
        column,
        expected: if column.is_integer() { "integer" } else { "text" },
        found,
    }
}

#[async_trait]
impl ColumnStore for SqliteStore {
    async fn get_column(&self, column: Column, key: &ListKey) -> Result<ColumnValue, StoreError> {
        let key = key.clone();
        self.run(move |conn| {
            let sql = format!("SELECT {} FROM lintulista WHERE key = ?1", column.name());
            let value: Option<Value> = conn
                .query_row(&sql, params![key.as_str()], |row| row.get(0))
                .optional()?;
            match value {
                Some(value) => value_from_sql(column, value),
                None => Err(StoreError::ListNotFound(key)),
            }
        })
        .await
    }

    async fn set_column(
        &self,
        column: Column,
        key: &ListKey,
        value: ColumnValue,
    ) -> Result<(), StoreError> {
        let key = key.clone();
        self.run(move |conn| update_column(conn, column, &key, value))
            .await
    }

    async fn set_columns(
        &self,
        key: &ListKey,
        values: Vec<(Column, ColumnValue)>,
    ) -> Result<(), StoreError> {
        let key = key.clone();
        self.run(move |conn| {
            let tx = conn.transaction()?;
            for (column, value) in values {
                update_column(&tx, column, &key, value)?;
            }
            tx.commit()?;
            Ok(())
        })
        .await
    }

    async fn list_exists(&self, key: &ListKey) -> Result<bool, StoreError> {
        let key = key.clone();
        self.run(move |conn| {
            let found: Option<i64> = conn
                .query_row(
                    "SELECT 1 FROM lintulista WHERE key = ?1",
                    params![key.as_str()],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(found.is_some())
        })
        .await
    }

    async fn create_list(&self, list: NewList) -> Result<(), StoreError> {
        self.run(move |conn| {
            let result = conn.execute(
                "INSERT INTO lintulista (key, username, password_hash, token, token_valid_until, observations)
                 VALUES (?1, ?2, ?3, '', 0, '')",
                params![list.key.as_str(), list.username, list.password_hash],
            );
            match result {
                Ok(_) => {
                    tracing::info!("created list {}", list.key);
                    Ok(())
                }
                Err(rusqlite::Error::SqliteFailure(err, _))
                    if err.code == ErrorCode::ConstraintViolation =>
                {
                    Err(StoreError::DuplicateList(list.key))
                }
                Err(e) => Err(StoreError::Sqlite(e)),
            }
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn key() -> ListKey {
        ListKey::parse("testeihin").unwrap()
    }

    fn new_list() -> NewList {
        NewList {
            key: key(),
            username: "tester".to_string(),
            password_hash: "$argon2id$placeholder".to_string(),
        }
    }

    #[tokio::test]
    async fn created_list_has_empty_defaults() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.create_list(new_list()).await.unwrap();

        assert!(store.list_exists(&key()).await.unwrap());
        assert_eq!(
            store.get_column(Column::Username, &key()).await.unwrap(),
            ColumnValue::from("tester")
        );
        assert_eq!(
            store.get_column(Column::Token, &key()).await.unwrap(),
            ColumnValue::from("")
        );
        assert_eq!(
            store.get_column(Column::TokenValidUntil, &key()).await.unwrap(),
            ColumnValue::Integer(0)
        );
        assert_eq!(
            store.get_column(Column::Observations, &key()).await.unwrap(),
            ColumnValue::from("")
        );
    }

    #[tokio::test]
    async fn set_then_get_round_trips() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.create_list(new_list()).await.unwrap();

        store
            .set_column(Column::Observations, &key(), "#-@+G=".into())
            .await
            .unwrap();
        store
            .set_column(Column::TokenValidUntil, &key(), ColumnValue::Integer(1_700_000_000))
            .await
            .unwrap();

        assert_eq!(
            store.get_column(Column::Observations, &key()).await.unwrap(),
            ColumnValue::from("#-@+G=")
        );
        assert_eq!(
            store.get_column(Column::TokenValidUntil, &key()).await.unwrap(),
            ColumnValue::Integer(1_700_000_000)
        );
    }

    #[tokio::test]
    async fn set_columns_writes_all_values() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.create_list(new_list()).await.unwrap();

        store
            .set_columns(
                &key(),
                vec![
                    (Column::Token, "a".repeat(30).into()),
                    (Column::TokenValidUntil, ColumnValue::Integer(99)),
                ],
            )
            .await
            .unwrap();

        assert_eq!(
            store.get_column(Column::Token, &key()).await.unwrap(),
            ColumnValue::from("a".repeat(30))
        );
        assert_eq!(
            store.get_column(Column::TokenValidUntil, &key()).await.unwrap(),
            ColumnValue::Integer(99)
        );
    }

    #[tokio::test]
    async fn set_columns_is_atomic_on_type_mismatch() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.create_list(new_list()).await.unwrap();

        let result = store
            .set_columns(
                &key(),
                vec![
                    (Column::Token, "b".repeat(30).into()),
                    (Column::TokenValidUntil, "not a number".into()),
                ],
            )
            .await;
        assert!(matches!(result, Err(StoreError::TypeMismatch { .. })));

        // The first write was rolled back with the failed transaction.
        assert_eq!(
            store.get_column(Column::Token, &key()).await.unwrap(),
            ColumnValue::from("")
        );
    }

    #[tokio::test]
    async fn missing_list_is_reported() {
        let store = SqliteStore::open_in_memory().unwrap();
        let other = ListKey::parse("eiolemass").unwrap();

        assert!(!store.list_exists(&other).await.unwrap());
        assert!(matches!(
            store.get_column(Column::Observations, &other).await,
            Err(StoreError::ListNotFound(k)) if k == other
        ));
        assert!(matches!(
            store.set_column(Column::Observations, &other, "".into()).await,
            Err(StoreError::ListNotFound(_))
        ));
    }

    #[tokio::test]
    async fn duplicate_key_is_rejected() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.create_list(new_list()).await.unwrap();

        let result = store.create_list(new_list()).await;
        assert!(matches!(result, Err(StoreError::DuplicateList(k)) if k == key()));
    }

    #[tokio::test]
    async fn data_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("lintulista.db");

        {
            let store = SqliteStore::open(&path).unwrap();
            store.create_list(new_list()).await.unwrap();
            store
                .set_column(Column::Observations, &key(), "#-@+G=".into())
                .await
                .unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(
            store.get_column(Column::Observations, &key()).await.unwrap(),
            ColumnValue::from("#-@+G=")
        );
    }
}
