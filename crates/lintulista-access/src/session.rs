// ABOUTME: Session lifecycle for one list: login issues a token, validate checks it, logout clears it.
// ABOUTME: Token and expiry live in the list row and are always written together.

use std::sync::Arc;

use lintulista_core::ListKey;
use lintulista_store::{Column, ColumnStore, ColumnValue, StoreError};
use serde::Serialize;

use crate::clock::Clock;
use crate::config::SessionPolicy;
use crate::error::AccessError;
use crate::password::verify_password;
use crate::token::{generate_token, is_well_formed};

/// A freshly issued session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionGrant {
    pub token: String,
    /// Epoch seconds after which the token stops validating.
    pub valid_until: i64,
}

/// Result of a login attempt that passed input validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    Granted(SessionGrant),
    InvalidCredentials,
}

/// Issues and checks session tokens for a single list.
#[derive(Clone)]
pub struct SessionManager {
    store: Arc<dyn ColumnStore>,
    key: ListKey,
    clock: Arc<dyn Clock>,
    policy: SessionPolicy,
}

impl SessionManager {
    pub fn new(
        store: Arc<dyn ColumnStore>,
        key: ListKey,
        clock: Arc<dyn Clock>,
        policy: SessionPolicy,
    ) -> Self {
        Self {
            store,
            key,
            clock,
            policy,
        }
    }

    pub fn key(&self) -> &ListKey {
        &self.key
    }

    pub fn policy(&self) -> &SessionPolicy {
        &self.policy
    }

    /// Check credentials and, on success, issue a new token.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginOutcome, AccessError> {
        self.policy
            .check_credentials(username, password)
            .map_err(AccessError::Validation)?;

        let stored_username = self
            .store
            .get_column(Column::Username, &self.key)
            .await?
            .into_text(Column::Username)?;
        let stored_hash = self
            .store
            .get_column(Column::PasswordHash, &self.key)
            .await?
            .into_text(Column::PasswordHash)?;

        // The hash comparison runs whether or not the username matched.
        let password = password.to_owned();
        let password_ok =
            tokio::task::spawn_blocking(move || verify_password(&password, &stored_hash))
                .await
                .map_err(|e| StoreError::Task(e.to_string()))?;

        if !(password_ok && stored_username == username) {
            tracing::info!("rejected login for list {}", self.key);
            return Ok(LoginOutcome::InvalidCredentials);
        }

        let grant = SessionGrant {
            token: generate_token(),
            valid_until: self.clock.now() + self.policy.token_lifetime,
        };
        self.store
            .set_columns(
                &self.key,
                vec![
                    (Column::Token, ColumnValue::Text(grant.token.clone())),
                    (Column::TokenValidUntil, ColumnValue::Integer(grant.valid_until)),
                ],
            )
            .await?;

        tracing::info!("issued token for list {} valid until {}", self.key, grant.valid_until);
        Ok(LoginOutcome::Granted(grant))
    }

    /// Whether `token` is the list's current, unexpired token. An expired
    /// token is cleared as a side effect.
    pub async fn validate(&self, token: &str) -> Result<bool, AccessError> {
        if !is_well_formed(token) {
            return Ok(false);
        }

        let stored = self
            .store
            .get_column(Column::Token, &self.key)
            .await?
            .into_text(Column::Token)?;
        if !is_well_formed(&stored) || stored != token {
            return Ok(false);
        }

        let valid_until = self
            .store
            .get_column(Column::TokenValidUntil, &self.key)
            .await?
            .into_integer(Column::TokenValidUntil)?;
        if self.clock.now() > valid_until {
            tracing::info!("token for list {} expired at {}", self.key, valid_until);
            self.clear_token().await?;
            return Ok(false);
        }

        Ok(true)
    }

    /// End the session identified by `token`.
    pub async fn logout(&self, token: &str) -> Result<(), AccessError> {
        if !self.validate(token).await? {
            return Err(AccessError::Auth("invalid or expired token".to_string()));
        }
        self.clear_token().await?;
        tracing::info!("logged out of list {}", self.key);
        Ok(())
    }

    async fn clear_token(&self) -> Result<(), AccessError> {
        self.store
            .set_columns(
                &self.key,
                vec![
                    (Column::Token, ColumnValue::Text(String::new())),
                    (Column::TokenValidUntil, ColumnValue::Integer(0)),
                ],
            )
            .await?;
        Ok(())
    }
}
