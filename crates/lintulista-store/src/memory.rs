// ABOUTME: In-memory column store with the same contract as the SQLite backend.
// ABOUTME: Substituted for the database in tests and throwaway sessions.

use std::collections::HashMap;

use async_trait::async_trait;
use lintulista_core::ListKey;
use tokio::sync::RwLock;

use crate::column::{Column, ColumnStore, ColumnValue, NewList, StoreError};

type Row = HashMap<Column, ColumnValue>;

/// A column store backed by a map of rows.
#[derive(Default)]
pub struct MemoryStore {
    rows: RwLock<HashMap<ListKey, Row>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ColumnStore for MemoryStore {
    async fn get_column(&self, column: Column, key: &ListKey) -> Result<ColumnValue, StoreError> {
        let rows = self.rows.read().await;
        let row = rows
            .get(key)
            .ok_or_else(|| StoreError::ListNotFound(key.clone()))?;
        row.get(&column)
            .cloned()
            .ok_or_else(|| StoreError::Task(format!("row {key} is missing column {column}")))
    }

    async fn set_column(
        &self,
        column: Column,
        key: &ListKey,
        value: ColumnValue,
    ) -> Result<(), StoreError> {
        self.set_columns(key, vec![(column, value)]).await
    }

    async fn set_columns(
        &self,
        key: &ListKey,
        values: Vec<(Column, ColumnValue)>,
    ) -> Result<(), StoreError> {
        for (column, value) in &values {
            value.check_for(*column)?;
        }

        let mut rows = self.rows.write().await;
        let row = rows
            .get_mut(key)
            .ok_or_else(|| StoreError::ListNotFound(key.clone()))?;
        row.extend(values);
        Ok(())
    }

    async fn list_exists(&self, key: &ListKey) -> Result<bool, StoreError> {
        Ok(self.rows.read().await.contains_key(key))
    }

    async fn create_list(&self, list: NewList) -> Result<(), StoreError> {
        let mut rows = self.rows.write().await;
        if rows.contains_key(&list.key) {
            return Err(StoreError::DuplicateList(list.key));
        }

        let row = Row::from([
            (Column::Username, ColumnValue::Text(list.username)),
            (Column::PasswordHash, ColumnValue::Text(list.password_hash)),
            (Column::Token, ColumnValue::Text(String::new())),
            (Column::TokenValidUntil, ColumnValue::Integer(0)),
            (Column::Observations, ColumnValue::Text(String::new())),
        ]);
        rows.insert(list.key, row);
        Ok(())
    }
}
