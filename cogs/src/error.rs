//! FILENAME: cogs/src/error.rs

use thiserror::Error;

/// A malformed or incomplete dataset. Fatal to the load that produced it.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DataError {
    #[error("Dataset contains no records")]
    Empty,

    #[error("Record '{panel_key}' is missing attribute '{attribute}'")]
    MissingAttribute { panel_key: String, attribute: String },

    #[error("Duplicate panel key: {0}")]
    DuplicatePanelKey(String),

    #[error("Duplicate attribute in catalog: {0}")]
    DuplicateAttribute(String),

    #[error("Record '{panel_key}' has non-numeric value '{value}' for numeric attribute '{attribute}'")]
    NotNumeric {
        panel_key: String,
        attribute: String,
        value: String,
    },
}
