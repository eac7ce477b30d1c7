//! FILENAME: filter-engine/src/lib.rs
//! Multi-dimensional filter subsystem for the display core.
//!
//! This crate keeps every attribute of a dataset indexed so that any
//! combination of per-attribute filters can be applied and removed cheaply,
//! while each attribute's histogram reflects all filters but its own.
//!
//! Layers:
//! - `definition`: Serializable configuration (what the filters ARE)
//! - `cache`: Incrementally maintained index (HOW we compute)
//! - `view`: Renderable output for the frontend (WHAT we display)
//! - `engine`: Mutation, distribution and pagination entry points

pub mod definition;
pub mod cache;
pub mod view;
pub mod engine;
pub mod error;

pub use definition::*;
pub use cache::{DimensionalIndex, Dimension, DimensionId, IndexStats, RecordId, ValueId, ValueStore};
pub use view::*;
pub use engine::{
    apply_filter, compute_distributions, navigate, numeric_histogram, page, rebase_page,
    total_pages,
};
pub use error::FilterError;
pub use cogs::DataError;
