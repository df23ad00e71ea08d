// ABOUTME: Static ordered table of known bird species, mapping names to stable integer indices.
// ABOUTME: Loaded once at startup; the index of a species is its position and must never change.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::observation::SPECIES_WIDTH;
use crate::uint_codec::BITS_PER_SYMBOL;

/// Largest number of species the two-symbol index field can address.
pub const MAX_SPECIES: usize = 1 << (BITS_PER_SYMBOL * SPECIES_WIDTH);

const BUILTIN_CATALOG: &str = include_str!("../data/known-birds.json");

/// Errors that can occur while loading a species catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("species name at index {0} is empty")]
    EmptyName(usize),

    #[error("species {name:?} appears more than once (indices {first} and {second})")]
    Duplicate {
        name: String,
        first: usize,
        second: usize,
    },

    #[error("catalog has {0} species, more than the {max} an observation can index", max = MAX_SPECIES)]
    TooLarge(usize),
}

#[derive(Deserialize)]
struct CatalogFile {
    birds: Vec<CatalogEntry>,
}

#[derive(Deserialize)]
struct CatalogEntry {
    species: String,
}

/// Ordered species names plus a precomputed name-to-index map.
#[derive(Debug, Clone)]
pub struct SpeciesCatalog {
    names: Vec<String>,
    indices: HashMap<String, usize>,
}

impl SpeciesCatalog {
    /// Build a catalog from names in their canonical order.
    pub fn from_names<I, S>(names: I) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        if names.len() > MAX_SPECIES {
            return Err(CatalogError::TooLarge(names.len()));
        }

        let mut indices = HashMap::with_capacity(names.len());
        for (index, name) in names.iter().enumerate() {
            if name.trim().is_empty() {
                return Err(CatalogError::EmptyName(index));
            }
            if let Some(first) = indices.insert(name.clone(), index) {
                return Err(CatalogError::Duplicate {
                    name: name.clone(),
                    first,
                    second: index,
                });
            }
        }

        Ok(Self { names, indices })
    }

    /// Parse a catalog from `{"birds": [{"species": "..."}, ...]}` JSON.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_json::from_str(json)?;
        Self::from_names(file.birds.into_iter().map(|entry| entry.species))
    }

    /// Load a catalog JSON file from disk.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let json = std::fs::read_to_string(path)?;
        let catalog = Self::from_json(&json)?;
        tracing::info!("loaded {} species from {}", catalog.len(), path.display());
        Ok(catalog)
    }

    /// The catalog of Finnish species compiled into the binary.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json(BUILTIN_CATALOG)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.indices.get(name).copied()
    }

    pub fn name_of(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Iterate over `(index, name)` pairs in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
        self.names.iter().map(String::as_str).enumerate()
    }
}
