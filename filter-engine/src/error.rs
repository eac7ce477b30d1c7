//! FILENAME: filter-engine/src/error.rs

use thiserror::Error;
use cogs::CogType;

/// A rejected filter or sort mutation. The index and filter state are left
/// exactly as they were before the attempt.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FilterError {
    #[error("Unknown attribute: {0}")]
    UnknownAttribute(String),

    #[error("Attribute '{attribute}' is {cog_type} and cannot take a {predicate} filter")]
    WrongShape {
        attribute: String,
        cog_type: CogType,
        predicate: &'static str,
    },

    #[error("Invalid range for '{attribute}': from {from:?} to {to:?}")]
    InvalidRange {
        attribute: String,
        from: Option<f64>,
        to: Option<f64>,
    },

    #[error("Invalid pattern for '{attribute}': {message}")]
    InvalidPattern { attribute: String, message: String },

    #[error("Attribute '{0}' has no active filter")]
    NotFiltered(String),

    #[error("Unknown order preference: {0}")]
    InvalidOrder(String),
}
