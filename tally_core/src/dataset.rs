//! Dataset ingestion.
//!
//! The inbound contract is a JSON document produced by an external
//! data-compilation step. Loading always ends with the startup validation
//! pass: a dataset that parses but fails validation is refused outright,
//! never partially loaded or patched up with defaults.

use crate::types::Dataset;
use crate::validate::validate_dataset;
use crate::Result;
use std::path::Path;

impl Dataset {
    /// Parse a dataset from a JSON string and run the startup validation
    /// pass over it.
    pub fn from_json(json: &str) -> Result<Self> {
        let dataset: Dataset = serde_json::from_str(json)?;
        validate_dataset(&dataset)?;
        Ok(dataset)
    }

    /// Load and validate a dataset from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        tracing::info!("Loading dataset from {:?}", path);
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }
}
