//! FILENAME: layout-engine/src/engine.rs
//! Layout Engine - Fits a grid of panels into a container.
//!
//! The fit runs in two phases. A preliminary panel size (ignoring padding and
//! labels) picks the label height, since labels scale with the panel. The
//! final size then tries to stretch panels across the full width and, when
//! that overflows vertically, falls back to filling the height and centering
//! the grid horizontally.
//!
//! All rounding is half-up to match the renderer's pixel math.

use crate::definition::{GridShape, LayoutConfig, LayoutRequest};
use crate::error::LayoutError;
use crate::view::{FitMode, LayoutGeometry, PanelPlacement};

/// Rounds half-way cases toward positive infinity (2.5 -> 3, -2.5 -> -2).
pub fn round_half_up(x: f64) -> f64 {
    // x - floor(x) is exact; adding 0.5 first is not
    let floor = x.floor();
    if x - floor >= 0.5 {
        floor + 1.0
    } else {
        floor
    }
}

/// Computes panel size, label strip metrics and offsets for one page.
pub fn compute_layout(request: &LayoutRequest, config: &LayoutConfig) -> Result<LayoutGeometry, LayoutError> {
    validate(request)?;

    let cw = request.container.width;
    let ch = request.container.height;
    let nrow = request.grid.nrow as f64;
    let ncol = request.grid.ncol as f64;
    let aspect = request.aspect_ratio;

    // Phase 1: rough panel size, only used to scale the labels
    let mut pre_w = round_half_up(cw / ncol);
    let mut pre_h = round_half_up(pre_w * aspect);
    if pre_h * nrow > ch {
        pre_h = round_half_up(ch / nrow);
        pre_w = round_half_up(pre_h / aspect);
    }

    let label_height = (pre_w.min(pre_h) * config.label_height_factor)
        .min(config.max_label_height)
        .max(config.min_label_height);
    let label_padding = label_height / 1.625 - 4.0;
    let label_font_size = label_height - label_padding;
    let label_area_height = request.label_count as f64 * label_height;

    // Phase 2: fixed extras, then width-first with height-first fallback
    let w_extra = config.gutter() * (ncol + 1.0);
    let h_extra = config.gutter() * (nrow + 1.0) + label_area_height * nrow;

    let mut fit = FitMode::WidthFirst;
    let mut panel_width = round_half_up((cw - w_extra) / ncol);
    let mut panel_height = round_half_up(panel_width * aspect);
    let mut horizontal_offset = 0.0;

    if panel_height * nrow + h_extra > ch {
        fit = FitMode::HeightFirst;
        panel_height = round_half_up((ch - h_extra) / nrow);
        panel_width = round_half_up(panel_height / aspect);
        horizontal_offset = (cw - (panel_width * ncol + w_extra)) / 2.0;
    }

    if panel_width < 0.0 || panel_height < 0.0 {
        log::warn!(
            target: "LAYOUT",
            "container {}x{} too small for {}x{} grid, clamping panels to zero",
            cw,
            ch,
            request.grid.nrow,
            request.grid.ncol
        );
        panel_width = panel_width.max(0.0);
        panel_height = panel_height.max(0.0);
        if fit == FitMode::HeightFirst {
            horizontal_offset = (cw - (panel_width * ncol + w_extra)) / 2.0;
        }
    }

    log::debug!(
        target: "LAYOUT",
        "compute_layout {}x{} grid={}x{} panel={}x{} fit={:?}",
        cw,
        ch,
        request.grid.nrow,
        request.grid.ncol,
        panel_width,
        panel_height,
        fit
    );

    Ok(LayoutGeometry {
        panel_width,
        panel_height,
        label_height,
        label_count: request.label_count,
        label_area_height,
        label_font_size,
        label_padding,
        panel_padding: config.panel_padding,
        horizontal_offset,
        vertical_offset: config.header_height,
        grid_rows: request.grid.nrow,
        grid_cols: request.grid.ncol,
        fit,
    })
}

fn validate(request: &LayoutRequest) -> Result<(), LayoutError> {
    let grid = &request.grid;
    if grid.nrow == 0 || grid.ncol == 0 {
        return Err(LayoutError::EmptyGrid { nrow: grid.nrow, ncol: grid.ncol });
    }
    if !request.aspect_ratio.is_finite() || request.aspect_ratio <= 0.0 {
        return Err(LayoutError::InvalidAspectRatio(request.aspect_ratio));
    }
    let container = &request.container;
    let usable = |v: f64| v.is_finite() && v >= 0.0;
    if !usable(container.width) || !usable(container.height) {
        return Err(LayoutError::InvalidContainer {
            width: container.width,
            height: container.height,
        });
    }
    Ok(())
}

/// Assigns grid cells to the page's panels, given in rank order. The result
/// is sorted by panel key so each panel's entry is stable across re-sorts.
pub fn place_panels<'a, I>(panel_keys: I, grid: &GridShape) -> Result<Vec<PanelPlacement>, LayoutError>
where
    I: IntoIterator<Item = &'a str>,
{
    if grid.nrow == 0 || grid.ncol == 0 {
        return Err(LayoutError::EmptyGrid { nrow: grid.nrow, ncol: grid.ncol });
    }

    let mut placements: Vec<PanelPlacement> = panel_keys
        .into_iter()
        .take(grid.panels_per_page())
        .enumerate()
        .map(|(rank, key)| {
            let (row, col) = grid.cell(rank);
            PanelPlacement {
                panel_key: key.to_string(),
                rank,
                row,
                col,
                inverse_col: grid.ncol - col - 1,
            }
        })
        .collect();
    placements.sort_by(|a, b| a.panel_key.cmp(&b.panel_key));
    Ok(placements)
}
