// ABOUTME: Core library for lintulista, containing the species catalog and the observation codecs.
// ABOUTME: Defines the byte-level contract of the persisted observation log shared by all crates.

pub mod catalog;
pub mod error;
pub mod list_key;
pub mod observation;
pub mod uint_codec;

pub use catalog::{CatalogError, SpeciesCatalog};
pub use error::CoreError;
pub use list_key::ListKey;
pub use observation::{ObservationCodec, ObservationRecord};
