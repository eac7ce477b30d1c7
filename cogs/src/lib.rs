//! FILENAME: cogs/src/lib.rs
//! PURPOSE: Shared dataset types for the display core.
//! CONTEXT: Every other crate in the workspace depends on `cogs` for the
//! record, value and attribute-metadata types, and for `DataError`.

pub mod catalog;
pub mod error;
pub mod record;
pub mod value;

pub use catalog::{CogCatalog, CogInfo, CogType};
pub use error::DataError;
pub use record::{Record, RecordStore};
pub use value::{CogValue, OrderedFloat};
