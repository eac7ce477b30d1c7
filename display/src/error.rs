//! FILENAME: display/src/error.rs

use thiserror::Error;
use cogs::DataError;
use filter_engine::FilterError;
use layout_engine::LayoutError;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Data error: {0}")]
    Data(#[from] DataError),

    #[error("Filter error: {0}")]
    Filter(#[from] FilterError),

    #[error("Layout error: {0}")]
    Layout(#[from] LayoutError),

    #[error("Unknown label attribute: {0}")]
    UnknownLabel(String),

    #[error("Invalid display configuration: {0}")]
    Config(#[from] serde_json::Error),
}
