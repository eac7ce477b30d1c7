//! FILENAME: layout-engine/src/error.rs

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LayoutError {
    #[error("Grid must have at least one row and one column (got {nrow}x{ncol})")]
    EmptyGrid { nrow: usize, ncol: usize },

    #[error("Aspect ratio must be positive and finite (got {0})")]
    InvalidAspectRatio(f64),

    #[error("Container size must be finite and non-negative (got {width}x{height})")]
    InvalidContainer { width: f64, height: f64 },
}
