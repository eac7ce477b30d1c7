//! FILENAME: filter-engine/src/engine.rs
//! Filter Engine - Applies filter mutations and derives the renderable views.
//!
//! Entry points:
//! 1. `apply_filter`: atomic validate-then-apply of one filter mutation
//! 2. `compute_distributions`: one conditional histogram per active
//!    categorical filter
//! 3. `numeric_histogram`: binned conditional histogram for a numeric attribute
//! 4. `page` / `navigate` / `rebase_page`: pagination over the ranked records

use rustc_hash::FxHashSet;
use cogs::{CogType, CogValue};
use crate::cache::{Dimension, DimensionalIndex};
use crate::definition::{
    FilterEntry, FilterKind, FilterMutation, FilterOp, FilterState, OrderPreference,
    PageDirection, RangeBounds,
};
use crate::error::FilterError;
use crate::view::{Bucket, Distribution, HistogramBin, NumericHistogram, PageWindow};

// ============================================================================
// FILTER MUTATIONS
// ============================================================================

/// Applies one mutation to both the index and the filter state. On error
/// neither is changed.
pub fn apply_filter(
    index: &mut DimensionalIndex,
    state: &mut FilterState,
    mutation: &FilterMutation,
) -> Result<(), FilterError> {
    let attribute = mutation.attribute.as_str();
    let existing_order = state.get(attribute).map(|e| e.order);
    let order = mutation.order.or(existing_order).unwrap_or_default();

    let result = match &mutation.op {
        FilterOp::SetValues { values } => {
            let kind = FilterKind::Select { values: values.clone() };
            set_entry(index, state, attribute, kind, order)
        }
        FilterOp::SetRange { from, to } => {
            let kind = FilterKind::Range { bounds: RangeBounds::new(*from, *to) };
            set_entry(index, state, attribute, kind, order)
        }
        FilterOp::SetRegex { pattern } => index
            .matching_values(attribute, pattern)
            .and_then(|values| {
                let kind = FilterKind::Regex { regex: pattern.clone(), values };
                set_entry(index, state, attribute, kind, order)
            }),
        FilterOp::SetOrder => match state.get(attribute) {
            Some(entry) => {
                let kind = entry.kind.clone();
                state.upsert(FilterEntry { attribute: attribute.to_string(), kind, order });
                Ok(())
            }
            None => Err(FilterError::NotFiltered(attribute.to_string())),
        },
        FilterOp::Clear => index.set_filter(attribute, None).map(|()| {
            state.remove(attribute);
        }),
    };

    match &result {
        Ok(()) => {
            state.bump_version();
            log::info!(
                target: "FILTER",
                "apply_filter attribute={} op={:?} active={} version={}",
                attribute,
                mutation.op,
                index.active_count(),
                state.version()
            );
        }
        Err(e) => log::warn!(target: "FILTER", "rejected filter on {}: {}", attribute, e),
    }
    result
}

fn set_entry(
    index: &mut DimensionalIndex,
    state: &mut FilterState,
    attribute: &str,
    kind: FilterKind,
    order: OrderPreference,
) -> Result<(), FilterError> {
    index.set_filter(attribute, Some(&kind.predicate()))?;
    state.upsert(FilterEntry { attribute: attribute.to_string(), kind, order });
    Ok(())
}

// ============================================================================
// DISTRIBUTIONS
// ============================================================================

/// Computes the conditional distribution of every categorical attribute
/// with an active filter entry, in activation order.
pub fn compute_distributions(index: &DimensionalIndex, state: &FilterState) -> Vec<Distribution> {
    state
        .entries()
        .iter()
        .filter_map(|entry| {
            let dim = index.dimension(&entry.attribute)?;
            if dim.cog_type != CogType::Categorical {
                return None;
            }
            Some(build_distribution(dim, entry))
        })
        .collect()
}

fn build_distribution(dim: &Dimension, entry: &FilterEntry) -> Distribution {
    let mut buckets: Vec<Bucket> = dim
        .conditional_counts()
        .map(|(key, count)| Bucket { key: key.clone(), count })
        .collect();
    if entry.order.by_count() {
        // stable: equal counts keep ascending value order
        buckets.sort_by(|a, b| b.count.cmp(&a.count));
    }

    let max_count = buckets.iter().map(|b| b.count).max().unwrap_or(0);

    let selected: FxHashSet<&CogValue> = entry.kind.selected_values().iter().collect();
    let mut selected_idx = Vec::new();
    let mut not_selected_idx = Vec::new();
    let mut sum_selected_count = 0u64;
    for (i, bucket) in buckets.iter().enumerate() {
        if selected.contains(&bucket.key) {
            selected_idx.push(i);
            sum_selected_count += u64::from(bucket.count);
        } else {
            not_selected_idx.push(i);
        }
    }

    let selected_count = selected_idx.len();
    let mut display_index = selected_idx;
    display_index.extend(not_selected_idx);

    Distribution {
        attribute: entry.attribute.clone(),
        buckets,
        max_count,
        order: entry.order,
        reversed_for_display: entry.order.reversed_for_display(),
        selected_count,
        sum_selected_count,
        display_index,
    }
}

/// Bins a numeric attribute's conditional aggregate into `bins` equal-width
/// bins spanning its present values.
pub fn numeric_histogram(
    index: &DimensionalIndex,
    attribute: &str,
    bins: usize,
) -> Result<NumericHistogram, FilterError> {
    let dim = index
        .dimension(attribute)
        .ok_or_else(|| FilterError::UnknownAttribute(attribute.to_string()))?;
    if dim.cog_type != CogType::Numeric {
        return Err(FilterError::WrongShape {
            attribute: attribute.to_string(),
            cog_type: dim.cog_type,
            predicate: "histogram",
        });
    }

    let mut missing_count = 0;
    let mut points = Vec::new();
    for (value, count) in dim.conditional_counts() {
        match value.as_f64() {
            Some(v) => points.push((v, count)),
            None => missing_count += count,
        }
    }

    let mut histogram = NumericHistogram {
        attribute: attribute.to_string(),
        bins: Vec::new(),
        max_count: 0,
        missing_count,
    };
    let (Some(&(min, _)), Some(&(max, _))) = (points.first(), points.last()) else {
        return Ok(histogram);
    };

    let bins = if min == max { 1 } else { bins.max(1) };
    let width = (max - min) / bins as f64;
    histogram.bins = (0..bins)
        .map(|i| HistogramBin {
            start: min + width * i as f64,
            end: if i + 1 == bins { max } else { min + width * (i + 1) as f64 },
            count: 0,
        })
        .collect();
    for (v, count) in points {
        let slot = if width > 0.0 { ((v - min) / width) as usize } else { 0 };
        histogram.bins[slot.min(bins - 1)].count += count;
    }
    histogram.max_count = histogram.bins.iter().map(|b| b.count).max().unwrap_or(0);
    Ok(histogram)
}

// ============================================================================
// PAGINATION
// ============================================================================

/// `ceil(active / page_size)`, never less than 1.
pub fn total_pages(active_count: usize, page_size: usize) -> usize {
    active_count.div_ceil(page_size.max(1)).max(1)
}

/// Extracts one page of the ranked, filtered records. Out-of-range page
/// numbers are clamped, never wrapped.
pub fn page(index: &DimensionalIndex, page_number: usize, page_size: usize) -> PageWindow {
    let page_size = page_size.max(1);
    let total_pages = total_pages(index.active_count(), page_size);
    let page_number = page_number.clamp(1, total_pages);

    let records = index
        .sorted_page((page_number - 1) * page_size, page_size)
        .into_iter()
        .cloned()
        .collect();

    PageWindow {
        records,
        page_number,
        total_pages,
        page_size,
        active_count: index.active_count(),
    }
}

/// Moves one page in `direction`; a no-op at either end.
pub fn navigate(current: usize, direction: PageDirection, total_pages: usize) -> usize {
    let current = current.clamp(1, total_pages.max(1));
    match direction {
        PageDirection::Previous if current > 1 => current - 1,
        PageDirection::Next if current < total_pages => current + 1,
        _ => current,
    }
}

/// The page that keeps the first visible panel in view after the page size
/// changes from `old_size` to `new_size`.
pub fn rebase_page(page_number: usize, old_size: usize, new_size: usize) -> usize {
    let first_rank = (page_number.max(1) - 1) * old_size.max(1);
    (first_rank + 1).div_ceil(new_size.max(1))
}
