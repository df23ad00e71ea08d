// ABOUTME: Packs one observation (species, day, month, year) into a fixed six-symbol block.
// ABOUTME: A list's observation log is the concatenation of blocks in insertion order.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::catalog::SpeciesCatalog;
use crate::error::CoreError;
use crate::uint_codec;

/// Symbols used by the species index field.
pub const SPECIES_WIDTH: usize = 2;

/// Field widths of one block, in order: species index, day, month, year.
pub const FIELD_WIDTHS: [usize; 4] = [SPECIES_WIDTH, 1, 1, 2];

/// Symbols in one encoded observation.
pub const BLOCK_WIDTH: usize = 6;

const _: () = assert!(
    FIELD_WIDTHS[0] + FIELD_WIDTHS[1] + FIELD_WIDTHS[2] + FIELD_WIDTHS[3] == BLOCK_WIDTH
);

/// One sighting of a species on a given date.
///
/// Dates are range-checked on encode but not calendar-validated, so the 31st
/// of a 30-day month is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservationRecord {
    pub species: String,
    pub day: u32,
    pub month: u32,
    pub year: u32,
}

impl ObservationRecord {
    pub fn new(species: impl Into<String>, day: u32, month: u32, year: u32) -> Self {
        Self {
            species: species.into(),
            day,
            month,
            year,
        }
    }

    /// Check the date fields against the ranges the format accepts.
    pub fn validate_date(&self) -> Result<(), CoreError> {
        if !(1..=31).contains(&self.day)
            || !(1..=12).contains(&self.month)
            || !(2001..=8999).contains(&self.year)
        {
            return Err(CoreError::validation(format!(
                "invalid observation date {}.{}.{}",
                self.day, self.month, self.year
            )));
        }
        Ok(())
    }
}

/// Encodes and decodes observation blocks against a species catalog.
#[derive(Debug, Clone)]
pub struct ObservationCodec {
    catalog: Arc<SpeciesCatalog>,
}

impl ObservationCodec {
    pub fn new(catalog: Arc<SpeciesCatalog>) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &SpeciesCatalog {
        &self.catalog
    }

    /// Encode a record into one six-symbol block.
    pub fn encode(&self, record: &ObservationRecord) -> Result<String, CoreError> {
        record.validate_date()?;

        let species_index = self.catalog.index_of(&record.species).ok_or_else(|| {
            CoreError::validation(format!("unknown species {:?}", record.species))
        })?;

        uint_codec::encode_many(&[
            (FIELD_WIDTHS[0], species_index as i64),
            (FIELD_WIDTHS[1], i64::from(record.day)),
            (FIELD_WIDTHS[2], i64::from(record.month)),
            (FIELD_WIDTHS[3], i64::from(record.year)),
        ])
    }

    /// Decode exactly one six-symbol block.
    pub fn decode_one(&self, block: &str) -> Result<ObservationRecord, CoreError> {
        let length = block.chars().count();
        if length != BLOCK_WIDTH {
            return Err(CoreError::encoding(format!(
                "observation block must be {BLOCK_WIDTH} symbols, found {length}"
            )));
        }

        let fields = uint_codec::decode_many(block, &FIELD_WIDTHS)?;
        let &[species_index, day, month, year] = fields.as_slice() else {
            return Err(CoreError::encoding(format!("malformed observation block {block:?}")));
        };

        let species = usize::try_from(species_index)
            .ok()
            .and_then(|index| self.catalog.name_of(index))
            .ok_or_else(|| CoreError::encoding(format!("invalid species index {species_index}")))?;

        // Single-symbol and two-symbol fields always fit in u32.
        Ok(ObservationRecord {
            species: species.to_owned(),
            day: day as u32,
            month: month as u32,
            year: year as u32,
        })
    }

    /// Decode a full observation log, preserving block order.
    pub fn decode_log(&self, log: &str) -> Result<Vec<ObservationRecord>, CoreError> {
        split_log(log)?
            .into_iter()
            .map(|block| self.decode_one(block))
            .collect()
    }
}

/// Split a log into its raw six-symbol blocks without decoding them.
pub fn split_log(log: &str) -> Result<Vec<&str>, CoreError> {
    if !log.is_ascii() {
        return Err(CoreError::encoding("observation log contains non-ASCII symbols"));
    }
    if log.len() % BLOCK_WIDTH != 0 {
        return Err(CoreError::encoding(format!(
            "observation log length {} is not a multiple of {BLOCK_WIDTH}",
            log.len()
        )));
    }

    Ok((0..log.len())
        .step_by(BLOCK_WIDTH)
        .map(|start| &log[start..start + BLOCK_WIDTH])
        .collect())
}
