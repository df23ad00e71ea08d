// ABOUTME: Validated identifier of a shared list: exactly nine lowercase ASCII letters.
// ABOUTME: Keys are assigned at list creation and never change afterwards.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Number of characters in every list key.
pub const LIST_KEY_LENGTH: usize = 9;

/// The opaque key identifying one list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ListKey(String);

impl ListKey {
    /// Validate and wrap a candidate key.
    pub fn parse(candidate: &str) -> Result<Self, CoreError> {
        if candidate.len() != LIST_KEY_LENGTH
            || !candidate.bytes().all(|b| b.is_ascii_lowercase())
        {
            return Err(CoreError::validation(format!(
                "list key must be {LIST_KEY_LENGTH} lowercase letters, got {candidate:?}"
            )));
        }
        Ok(Self(candidate.to_owned()))
    }

    /// Draw a fresh random key.
    pub fn generate() -> Self {
        let mut rng = rand::rng();
        let key = (0..LIST_KEY_LENGTH)
            .map(|_| char::from(rng.random_range(b'a'..=b'z')))
            .collect();
        Self(key)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ListKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ListKey {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ListKey {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ListKey> for String {
    fn from(key: ListKey) -> Self {
        key.0
    }
}
