// ABOUTME: Configuration loading for lintulista: database path, catalog path, and session policy.
// ABOUTME: Reads LINTULISTA_* environment variables and validates credential bounds.

use std::ops::RangeInclusive;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} is not a valid number: {value:?}")]
    InvalidNumber { name: &'static str, value: String },

    #[error("{what} bounds are inverted: min {min} > max {max}")]
    InvertedBounds {
        what: &'static str,
        min: usize,
        max: usize,
    },

    #[error("LINTULISTA_TOKEN_HOURS must be positive")]
    ZeroLifetime,
}

/// Credential length bounds and token lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionPolicy {
    pub username_min: usize,
    pub username_max: usize,
    pub password_min: usize,
    pub password_max: usize,
    /// Token lifetime in seconds.
    pub token_lifetime: i64,
}

impl Default for SessionPolicy {
    fn default() -> Self {
        Self {
            username_min: 5,
            username_max: 30,
            password_min: 5,
            password_max: 30,
            token_lifetime: 6 * 60 * 60,
        }
    }
}

impl SessionPolicy {
    pub fn username_lengths(&self) -> RangeInclusive<usize> {
        self.username_min..=self.username_max
    }

    pub fn password_lengths(&self) -> RangeInclusive<usize> {
        self.password_min..=self.password_max
    }

    /// Reject credentials whose character counts fall outside the bounds.
    pub fn check_credentials(&self, username: &str, password: &str) -> Result<(), String> {
        let username_len = username.chars().count();
        if !self.username_lengths().contains(&username_len) {
            return Err(format!(
                "username must be {}-{} characters",
                self.username_min, self.username_max
            ));
        }
        let password_len = password.chars().count();
        if !self.password_lengths().contains(&password_len) {
            return Err(format!(
                "password must be {}-{} characters",
                self.password_min, self.password_max
            ));
        }
        Ok(())
    }

    fn validate(self) -> Result<Self, ConfigError> {
        if self.username_min > self.username_max {
            return Err(ConfigError::InvertedBounds {
                what: "username",
                min: self.username_min,
                max: self.username_max,
            });
        }
        if self.password_min > self.password_max {
            return Err(ConfigError::InvertedBounds {
                what: "password",
                min: self.password_min,
                max: self.password_max,
            });
        }
        if self.token_lifetime <= 0 {
            return Err(ConfigError::ZeroLifetime);
        }
        Ok(self)
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct LintulistaConfig {
    pub db_path: PathBuf,
    pub catalog_path: Option<PathBuf>,
    pub policy: SessionPolicy,
}

impl LintulistaConfig {
    /// Load configuration from environment variables with sensible defaults.
    ///
    /// Environment variables:
    /// - LINTULISTA_DB: SQLite database file (default: ./lintulista.db)
    /// - LINTULISTA_CATALOG: species catalog JSON (default: bundled Finnish list)
    /// - LINTULISTA_USERNAME_MIN / LINTULISTA_USERNAME_MAX (default: 5 / 30)
    /// - LINTULISTA_PASSWORD_MIN / LINTULISTA_PASSWORD_MAX (default: 5 / 30)
    /// - LINTULISTA_TOKEN_HOURS: token lifetime in hours (default: 6)
    pub fn from_env() -> Result<Self, ConfigError> {
        let db_path = std::env::var("LINTULISTA_DB")
            .ok()
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("lintulista.db"));

        let catalog_path = std::env::var("LINTULISTA_CATALOG")
            .ok()
            .filter(|p| !p.is_empty())
            .map(PathBuf::from);

        let defaults = SessionPolicy::default();
        let token_hours = env_number("LINTULISTA_TOKEN_HOURS", 6)?;
        let policy = SessionPolicy {
            username_min: env_number("LINTULISTA_USERNAME_MIN", defaults.username_min)?,
            username_max: env_number("LINTULISTA_USERNAME_MAX", defaults.username_max)?,
            password_min: env_number("LINTULISTA_PASSWORD_MIN", defaults.password_min)?,
            password_max: env_number("LINTULISTA_PASSWORD_MAX", defaults.password_max)?,
            token_lifetime: i64::try_from(token_hours)
                .ok()
                .and_then(|hours| hours.checked_mul(3600))
                .ok_or_else(|| ConfigError::InvalidNumber {
                    name: "LINTULISTA_TOKEN_HOURS",
                    value: token_hours.to_string(),
                })?,
        }
        .validate()?;

        Ok(Self {
            db_path,
            catalog_path,
            policy,
        })
    }
}

fn env_number(name: &'static str, default: usize) -> Result<usize, ConfigError> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => {
            value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidNumber { name, value })
        }
        _ => Ok(default),
    }
}
