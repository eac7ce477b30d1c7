//! FILENAME: layout-engine/src/definition.rs
//! Layout Definition - The serializable configuration.
//!
//! This module contains all the types needed to DESCRIBE a panel grid.
//! These structures are designed to be:
//! - Serializable (loaded from the display's saved state)
//! - Sent over the bridge to the renderer
//! - Immutable snapshots of user intent

use serde::{Deserialize, Serialize};

// ============================================================================
// GRID SHAPE
// ============================================================================

/// How page ranks fill the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Arrangement {
    /// Rank r goes to (r / ncol, r % ncol).
    #[default]
    #[serde(rename = "row")]
    Row,
    /// Rank r goes to (r % nrow, r / nrow).
    #[serde(rename = "col", alias = "column")]
    Column,
}

/// Rows and columns of panels shown per page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridShape {
    pub nrow: usize,
    pub ncol: usize,
    #[serde(default)]
    pub arrange: Arrangement,
}

impl GridShape {
    pub fn new(nrow: usize, ncol: usize, arrange: Arrangement) -> Self {
        GridShape { nrow, ncol, arrange }
    }

    /// Number of panels on a full page.
    pub fn panels_per_page(&self) -> usize {
        self.nrow * self.ncol
    }

    /// Maps a rank within the page to its (row, column) cell.
    pub fn cell(&self, rank: usize) -> (usize, usize) {
        match self.arrange {
            Arrangement::Row => (rank / self.ncol.max(1), rank % self.ncol.max(1)),
            Arrangement::Column => (rank % self.nrow.max(1), rank / self.nrow.max(1)),
        }
    }
}

impl Default for GridShape {
    fn default() -> Self {
        GridShape { nrow: 1, ncol: 1, arrange: Arrangement::Row }
    }
}

// ============================================================================
// LAYOUT CONFIGURATION
// ============================================================================

/// Fixed chrome around panels, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Padding on either side of a panel.
    pub panel_padding: f64,

    /// Border drawn around each panel.
    pub border_width: f64,

    /// Height of the header above the grid; becomes the vertical offset.
    pub header_height: f64,

    /// Label row height as a fraction of the smaller preliminary panel side.
    pub label_height_factor: f64,

    pub min_label_height: f64,
    pub max_label_height: f64,
}

impl LayoutConfig {
    /// Padding plus border: the gutter between adjacent panels.
    pub fn gutter(&self) -> f64 {
        self.panel_padding + self.border_width
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        LayoutConfig {
            panel_padding: 2.0,
            border_width: 2.0,
            header_height: 50.0,
            label_height_factor: 0.08,
            min_label_height: 13.0,
            max_label_height: 26.0,
        }
    }
}

// ============================================================================
// REQUEST
// ============================================================================

/// Pixel size of the content area the grid must fit into.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ContainerSize {
    pub width: f64,
    pub height: f64,
}

impl ContainerSize {
    pub fn new(width: f64, height: f64) -> Self {
        ContainerSize { width, height }
    }
}

/// Everything `compute_layout` needs for one fit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutRequest {
    pub container: ContainerSize,
    pub grid: GridShape,
    /// Panel height divided by panel width.
    pub aspect_ratio: f64,
    /// Label rows shown under each panel.
    pub label_count: usize,
}

impl LayoutRequest {
    pub fn new(container: ContainerSize, grid: GridShape, aspect_ratio: f64, label_count: usize) -> Self {
        LayoutRequest { container, grid, aspect_ratio, label_count }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arrangement_accepts_short_and_long_names() {
        let grid: GridShape = serde_json::from_str(r#"{"nrow":2,"ncol":3,"arrange":"col"}"#).unwrap();
        assert_eq!(grid.arrange, Arrangement::Column);
        let grid: GridShape = serde_json::from_str(r#"{"nrow":2,"ncol":3,"arrange":"column"}"#).unwrap();
        assert_eq!(grid.arrange, Arrangement::Column);
        let grid: GridShape = serde_json::from_str(r#"{"nrow":2,"ncol":3}"#).unwrap();
        assert_eq!(grid.arrange, Arrangement::Row);
        assert_eq!(grid.panels_per_page(), 6);
        assert_eq!(GridShape::default().arrange, Arrangement::default());
    }

    #[test]
    fn test_cell_mapping() {
        let row = GridShape::new(2, 3, Arrangement::Row);
        assert_eq!(row.cell(0), (0, 0));
        assert_eq!(row.cell(4), (1, 1));
        let col = GridShape::new(2, 3, Arrangement::Column);
        assert_eq!(col.cell(1), (1, 0));
        assert_eq!(col.cell(4), (0, 2));
    }

    #[test]
    fn test_config_defaults_fill_missing_fields() {
        let config: LayoutConfig = serde_json::from_str(r#"{"header_height": 0}"#).unwrap();
        assert_eq!(config.header_height, 0.0);
        assert_eq!(config.panel_padding, 2.0);
        assert_eq!(config.gutter(), 4.0);
    }
}
