//! FILENAME: layout-engine/src/lib.rs
//! Panel grid layout subsystem.
//!
//! Given a container, a grid shape and the panels' aspect ratio, this crate
//! computes how large each panel is, how tall its label strip is and where
//! each panel of the current page sits in the grid.
//!
//! Layers:
//! - `definition`: Serializable configuration (what the grid IS)
//! - `view`: Renderable output for the frontend (WHAT we display)
//! - `engine`: Geometry calculation (HOW we fit)

pub mod definition;
pub mod view;
pub mod engine;
pub mod error;

pub use definition::*;
pub use view::*;
pub use engine::{compute_layout, place_panels, round_half_up};
pub use error::LayoutError;
