//! FILENAME: display/src/view.rs
//! Display View - Everything the renderer needs for one frame.

use serde::Serialize;
use cogs::{CogType, CogValue};
use filter_engine::{Distribution, FilterVersion, NumericHistogram};
use layout_engine::LayoutGeometry;

/// One entry of a panel's label strip.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelLabel {
    pub name: String,
    pub value: CogValue,
    #[serde(rename = "type")]
    pub cog_type: CogType,
    #[serde(rename = "desc")]
    pub description: String,
}

/// A visible panel with its grid cell and label values.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelView {
    pub panel_key: String,
    pub rank: usize,
    pub row: usize,
    pub col: usize,
    pub inverse_col: usize,
    pub labels: Vec<PanelLabel>,
}

/// Outbound snapshot of a display session.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayView {
    /// Visible panels, sorted by panel key.
    pub panels: Vec<PanelView>,
    pub page_number: usize,
    pub total_pages: usize,
    /// Records passing every filter.
    pub active_count: usize,
    pub total_count: usize,
    /// One per actively filtered categorical attribute, in activation order.
    pub distributions: Vec<Distribution>,
    /// One per active range filter, in activation order.
    pub histograms: Vec<NumericHistogram>,
    /// Last geometry that fit; `None` until a layout has succeeded.
    pub geometry: Option<LayoutGeometry>,
    pub filter_version: FilterVersion,
}

impl DisplayView {
    pub fn panel(&self, panel_key: &str) -> Option<&PanelView> {
        self.panels.iter().find(|p| p.panel_key == panel_key)
    }
}
