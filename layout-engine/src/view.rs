//! FILENAME: layout-engine/src/view.rs
//! Layout View - Renderable geometry for the frontend.

use serde::{Deserialize, Serialize};

/// Which pass produced the panel size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FitMode {
    /// Panels stretched across the full width.
    WidthFirst,
    /// Panels sized to the full height and centered horizontally.
    HeightFirst,
}

/// Pixel geometry of one page of panels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutGeometry {
    pub panel_width: f64,
    /// Plot area only, without the label strip.
    pub panel_height: f64,

    /// Height of one label row.
    pub label_height: f64,
    pub label_count: usize,
    /// `label_count * label_height`.
    pub label_area_height: f64,
    pub label_font_size: f64,
    pub label_padding: f64,

    pub panel_padding: f64,
    pub horizontal_offset: f64,
    pub vertical_offset: f64,

    pub grid_rows: usize,
    pub grid_cols: usize,

    pub fit: FitMode,
}

impl LayoutGeometry {
    /// Panel plus its label strip.
    pub fn outer_height(&self) -> f64 {
        self.panel_height + self.label_area_height
    }
}

/// Where one panel of the page goes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelPlacement {
    pub panel_key: String,
    /// Position within the current page's ranking.
    pub rank: usize,
    pub row: usize,
    pub col: usize,
    /// Column counted from the right edge (`ncol - col - 1`).
    pub inverse_col: usize,
}
