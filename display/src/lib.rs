//! FILENAME: display/src/lib.rs
//! Display session: the inbound/outbound contract between the analytic core
//! and the renderer.
//!
//! A `DisplaySession` owns the filter index for one dataset together with
//! the user's filters, ranking, page, labels and grid, and produces a
//! `DisplayView` snapshot for each frame.

pub mod config;
pub mod session;
pub mod view;
pub mod error;

pub use config::{DisplayConfig, DisplayState};
pub use session::{DisplaySession, HISTOGRAM_BINS};
pub use view::{DisplayView, PanelLabel, PanelView};
pub use error::SessionError;
