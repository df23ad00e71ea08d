// ABOUTME: Creates new lists: validates credentials, hashes the password, and assigns a fresh key.
// ABOUTME: New rows start with an empty observation log and no session token.

use lintulista_core::ListKey;
use lintulista_store::{ColumnStore, NewList, StoreError};

use crate::config::SessionPolicy;
use crate::error::AccessError;
use crate::password::hash_password;

const KEY_ATTEMPTS: usize = 8;

/// Create a list owned by `username` and return its key.
pub async fn create_list(
    store: &dyn ColumnStore,
    policy: &SessionPolicy,
    username: &str,
    password: &str,
) -> Result<ListKey, AccessError> {
    policy
        .check_credentials(username, password)
        .map_err(AccessError::Validation)?;

    let owned = password.to_owned();
    let password_hash = tokio::task::spawn_blocking(move || hash_password(&owned))
        .await
        .map_err(|e| StoreError::Task(e.to_string()))?
        .map_err(|e| AccessError::Validation(format!("cannot hash password: {e}")))?;

    for _ in 0..KEY_ATTEMPTS {
        let key = ListKey::generate();
        let list = NewList {
            key: key.clone(),
            username: username.to_owned(),
            password_hash: password_hash.clone(),
        };
        match store.create_list(list).await {
            Ok(()) => {
                tracing::info!("provisioned list {} for {}", key, username);
                return Ok(key);
            }
            Err(StoreError::DuplicateList(taken)) => {
                tracing::warn!("list key {} already taken, drawing another", taken);
            }
            Err(e) => return Err(e.into()),
        }
    }

    Err(AccessError::Store(StoreError::Task(format!(
        "no free list key after {KEY_ATTEMPTS} attempts"
    ))))
}
