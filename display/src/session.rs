//! FILENAME: display/src/session.rs
//! PURPOSE: One open display: its dataset, filters, ranking, page, labels and
//! grid geometry, kept consistent with each other.
//! CONTEXT: The session is the single writer of its index. Every mutation is
//! validated before anything is committed, so a rejected call leaves the
//! session exactly as it was.

use std::sync::Arc;
use cogs::{CogCatalog, CogValue, RecordStore};
use filter_engine::{
    self as filters, DimensionalIndex, Distribution, FilterKind, FilterMutation, FilterState,
    FilterVersion, NumericHistogram, PageDirection, SortKey,
};
use layout_engine::{
    compute_layout, place_panels, ContainerSize, GridShape, LayoutConfig, LayoutError,
    LayoutGeometry, LayoutRequest,
};
use crate::config::DisplayConfig;
use crate::error::SessionError;
use crate::view::{DisplayView, PanelLabel, PanelView};

/// Bins in each snapshot histogram of a range-filtered attribute.
pub const HISTOGRAM_BINS: usize = 20;

/// Distributions computed for one (filter version, index generation) pair.
#[derive(Debug, Clone)]
struct DistributionCache {
    filter_version: FilterVersion,
    generation: u64,
    distributions: Vec<Distribution>,
}

#[derive(Debug, Clone)]
pub struct DisplaySession {
    index: DimensionalIndex,
    filters: FilterState,
    grid: GridShape,
    labels: Vec<String>,
    /// 1-based, always within `1..=total_pages()`.
    page_number: usize,
    aspect_ratio: f64,
    layout_config: LayoutConfig,
    container: Option<ContainerSize>,
    /// Last geometry that fit.
    geometry: Option<LayoutGeometry>,
    distributions: Option<DistributionCache>,
}

impl DisplaySession {
    // ========================================================================
    // LOADING
    // ========================================================================

    /// Indexes `records` and restores the configured state. Nothing is
    /// returned unless every part of the saved state is valid for the data.
    pub fn load(records: Arc<RecordStore>, config: &DisplayConfig) -> Result<Self, SessionError> {
        let catalog = Arc::new(config.cog_info.clone());
        let state = &config.state;

        check_grid(&state.layout)?;
        check_aspect(config.panel_aspect)?;
        check_labels(&catalog, &state.labels)?;

        let mut index = DimensionalIndex::build(records, catalog)?;
        index.set_sort(&state.sort)?;
        let mut filter_state = FilterState::new();
        for entry in &state.filter {
            filters::apply_filter(&mut index, &mut filter_state, &entry.to_mutation())?;
        }

        let mut session = DisplaySession {
            index,
            filters: filter_state,
            grid: state.layout,
            labels: state.labels.clone(),
            page_number: state.page_num,
            aspect_ratio: config.panel_aspect,
            layout_config: config.layout_config,
            container: None,
            geometry: None,
            distributions: None,
        };
        session.clamp_page();

        log::info!(
            target: "SESSION",
            "loaded display records={} cogs={} filters={} page={}/{}",
            session.index.record_count(),
            session.index.catalog().len(),
            session.filters.len(),
            session.page_number,
            session.total_pages()
        );
        Ok(session)
    }

    /// Replaces the dataset wholesale, re-applying the current sort and
    /// filters to the new records. On error the old dataset stays loaded.
    pub fn replace_records(&mut self, records: Arc<RecordStore>) -> Result<(), SessionError> {
        let mut index = DimensionalIndex::build(records, self.index.catalog().clone())?;
        index.set_sort(self.index.sort_spec())?;
        let mut filter_state = FilterState::new();
        for entry in self.filters.entries() {
            filters::apply_filter(&mut index, &mut filter_state, &entry.to_mutation())?;
        }

        self.index = index;
        self.filters = filter_state;
        self.distributions = None;
        self.clamp_page();
        log::info!(
            target: "SESSION",
            "replaced records records={} active={}",
            self.index.record_count(),
            self.index.active_count()
        );
        Ok(())
    }

    // ========================================================================
    // FILTERING AND RANKING
    // ========================================================================

    pub fn apply_filter(&mut self, mutation: &FilterMutation) -> Result<(), SessionError> {
        filters::apply_filter(&mut self.index, &mut self.filters, mutation)?;
        self.clamp_page();
        Ok(())
    }

    pub fn set_sort(&mut self, spec: &[SortKey]) -> Result<(), SessionError> {
        self.index.set_sort(spec)?;
        Ok(())
    }

    /// Conditional distributions of the filtered categorical attributes,
    /// recomputed only when the filters or the index changed.
    pub fn distributions(&mut self) -> &[Distribution] {
        let version = self.filters.version();
        let generation = self.index.generation();
        let stale = !matches!(
            &self.distributions,
            Some(cache) if cache.filter_version == version && cache.generation == generation
        );
        if stale {
            log::debug!(target: "SESSION", "recomputing distributions version={} generation={}", version, generation);
            self.distributions = Some(DistributionCache {
                filter_version: version,
                generation,
                distributions: filters::compute_distributions(&self.index, &self.filters),
            });
        }
        match &self.distributions {
            Some(cache) => cache.distributions.as_slice(),
            None => &[],
        }
    }

    /// Equal-width conditional histogram of a numeric attribute.
    pub fn numeric_histogram(&self, attribute: &str, bins: usize) -> Result<NumericHistogram, SessionError> {
        Ok(filters::numeric_histogram(&self.index, attribute, bins)?)
    }

    // ========================================================================
    // PAGING
    // ========================================================================

    pub fn total_pages(&self) -> usize {
        filters::total_pages(self.index.active_count(), self.grid.panels_per_page())
    }

    /// Moves one page back or forward; stays put at either end.
    pub fn navigate(&mut self, direction: PageDirection) -> usize {
        self.page_number = filters::navigate(self.page_number, direction, self.total_pages());
        self.page_number
    }

    /// Jumps to `page_number`, clamped to the available pages.
    pub fn set_page(&mut self, page_number: usize) -> usize {
        self.page_number = page_number;
        self.clamp_page();
        self.page_number
    }

    fn clamp_page(&mut self) {
        self.page_number = self.page_number.clamp(1, self.total_pages());
    }

    // ========================================================================
    // LAYOUT AND LABELS
    // ========================================================================

    /// Changes the grid shape, keeping the first visible panel on screen.
    pub fn set_layout(&mut self, grid: GridShape) -> Result<(), SessionError> {
        check_grid(&grid)?;
        let geometry = self.fit(self.container, &grid, self.labels.len(), self.aspect_ratio)?;

        self.page_number = filters::rebase_page(
            self.page_number,
            self.grid.panels_per_page(),
            grid.panels_per_page(),
        );
        self.grid = grid;
        self.commit_geometry(geometry);
        self.clamp_page();
        log::info!(
            target: "SESSION",
            "set_layout {}x{} {:?} page={}",
            grid.nrow,
            grid.ncol,
            grid.arrange,
            self.page_number
        );
        Ok(())
    }

    /// Replaces the label strip. Every label must name a catalog attribute.
    pub fn set_labels(&mut self, labels: Vec<String>) -> Result<(), SessionError> {
        check_labels(self.index.catalog(), &labels)?;
        let geometry = self.fit(self.container, &self.grid, labels.len(), self.aspect_ratio)?;
        self.labels = labels;
        self.commit_geometry(geometry);
        Ok(())
    }

    /// Drops one label from the strip. Returns false when it was not shown.
    pub fn remove_label(&mut self, name: &str) -> Result<bool, SessionError> {
        let Some(pos) = self.labels.iter().position(|l| l == name) else {
            return Ok(false);
        };
        let geometry = self.fit(self.container, &self.grid, self.labels.len() - 1, self.aspect_ratio)?;
        self.labels.remove(pos);
        self.commit_geometry(geometry);
        Ok(true)
    }

    pub fn set_aspect_ratio(&mut self, aspect_ratio: f64) -> Result<(), SessionError> {
        check_aspect(aspect_ratio)?;
        let geometry = self.fit(self.container, &self.grid, self.labels.len(), aspect_ratio)?;
        self.aspect_ratio = aspect_ratio;
        self.commit_geometry(geometry);
        Ok(())
    }

    /// Refits the grid to a new container. A container the grid cannot be
    /// fitted into is rejected and the previous geometry is kept.
    pub fn resize(&mut self, container: ContainerSize) -> Result<&LayoutGeometry, SessionError> {
        let request = LayoutRequest::new(container, self.grid, self.aspect_ratio, self.labels.len());
        let geometry = compute_layout(&request, &self.layout_config).map_err(|e| {
            log::warn!(target: "LAYOUT", "keeping previous layout: {}", e);
            e
        })?;
        self.container = Some(container);
        Ok(&*self.geometry.insert(geometry))
    }

    /// Geometry for a prospective state; `None` while no container is known.
    fn fit(
        &self,
        container: Option<ContainerSize>,
        grid: &GridShape,
        label_count: usize,
        aspect_ratio: f64,
    ) -> Result<Option<LayoutGeometry>, LayoutError> {
        let Some(container) = container else {
            return Ok(None);
        };
        let request = LayoutRequest::new(container, *grid, aspect_ratio, label_count);
        compute_layout(&request, &self.layout_config).map(Some)
    }

    fn commit_geometry(&mut self, geometry: Option<LayoutGeometry>) {
        if geometry.is_some() {
            self.geometry = geometry;
        }
    }

    // ========================================================================
    // OUTPUT
    // ========================================================================

    /// Everything the renderer needs: the visible panels with their labels
    /// and cells, paging totals, distributions and geometry.
    pub fn snapshot(&mut self) -> Result<DisplayView, SessionError> {
        let window = filters::page(&self.index, self.page_number, self.grid.panels_per_page());
        let placements = place_panels(window.panel_keys(), &self.grid)?;
        let catalog = self.index.catalog();

        let panels = placements
            .into_iter()
            .filter_map(|placement| {
                let record = window.records.get(placement.rank)?;
                let labels = self
                    .labels
                    .iter()
                    .filter_map(|name| {
                        let info = catalog.get(name)?;
                        Some(PanelLabel {
                            name: name.clone(),
                            value: record.get(name).cloned().unwrap_or(CogValue::Empty),
                            cog_type: info.cog_type,
                            description: info.description.clone(),
                        })
                    })
                    .collect();
                Some(PanelView {
                    panel_key: placement.panel_key,
                    rank: placement.rank,
                    row: placement.row,
                    col: placement.col,
                    inverse_col: placement.inverse_col,
                    labels,
                })
            })
            .collect();

        let histograms = self
            .filters
            .entries()
            .iter()
            .filter(|entry| matches!(entry.kind, FilterKind::Range { .. }))
            .map(|entry| filters::numeric_histogram(&self.index, &entry.attribute, HISTOGRAM_BINS))
            .collect::<Result<Vec<_>, _>>()?;

        let distributions = self.distributions().to_vec();
        Ok(DisplayView {
            panels,
            page_number: window.page_number,
            total_pages: window.total_pages,
            active_count: window.active_count,
            total_count: self.index.record_count(),
            distributions,
            histograms,
            geometry: self.geometry.clone(),
            filter_version: self.filters.version(),
        })
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn index(&self) -> &DimensionalIndex {
        &self.index
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn grid(&self) -> GridShape {
        self.grid
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn page_number(&self) -> usize {
        self.page_number
    }

    pub fn geometry(&self) -> Option<&LayoutGeometry> {
        self.geometry.as_ref()
    }

    pub fn container(&self) -> Option<ContainerSize> {
        self.container
    }
}

fn check_grid(grid: &GridShape) -> Result<(), LayoutError> {
    if grid.nrow == 0 || grid.ncol == 0 {
        return Err(LayoutError::EmptyGrid { nrow: grid.nrow, ncol: grid.ncol });
    }
    Ok(())
}

fn check_aspect(aspect_ratio: f64) -> Result<(), LayoutError> {
    if !aspect_ratio.is_finite() || aspect_ratio <= 0.0 {
        return Err(LayoutError::InvalidAspectRatio(aspect_ratio));
    }
    Ok(())
}

fn check_labels(catalog: &CogCatalog, labels: &[String]) -> Result<(), SessionError> {
    match labels.iter().find(|l| !catalog.contains(l)) {
        Some(unknown) => Err(SessionError::UnknownLabel(unknown.clone())),
        None => Ok(()),
    }
}
