//! FILENAME: filter-engine/src/view.rs
//! Filter View - Renderable output for the frontend.
//!
//! These are derived, never persisted, and recomputed from the index and
//! filter state whenever either changes.

use serde::{Deserialize, Serialize};
use cogs::{CogValue, Record};
use crate::definition::OrderPreference;

// ============================================================================
// DISTRIBUTIONS
// ============================================================================

/// One bar of a categorical histogram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bucket {
    pub key: CogValue,
    pub count: u32,
}

/// The conditional histogram of one filtered categorical attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Distribution {
    pub attribute: String,

    /// Count-descending when ordering by count, value-ascending otherwise.
    pub buckets: Vec<Bucket>,

    pub max_count: u32,

    pub order: OrderPreference,

    /// Whether the renderer must reverse `buckets` rows to show `order`.
    /// Reversed rows list equal counts in descending value order; use
    /// `ordered_buckets` for ascending ties.
    pub reversed_for_display: bool,

    /// Number of buckets whose key is in the filter's value set.
    pub selected_count: usize,

    /// Sum of the counts of the selected buckets.
    pub sum_selected_count: u64,

    /// Bucket positions: selected first, then not selected.
    pub display_index: Vec<usize>,
}

impl Distribution {
    /// Buckets in the order the user asked for. Equal counts always come
    /// out in ascending value order.
    pub fn ordered_buckets(&self) -> Box<dyn Iterator<Item = &Bucket> + '_> {
        match self.order {
            OrderPreference::CountAscending => {
                let mut ordered: Vec<&Bucket> = self.buckets.iter().collect();
                // stable: native ties are already value-ascending
                ordered.sort_by_key(|b| b.count);
                Box::new(ordered.into_iter())
            }
            OrderPreference::ValueDescending => Box::new(self.buckets.iter().rev()),
            OrderPreference::CountDescending | OrderPreference::ValueAscending => {
                Box::new(self.buckets.iter())
            }
        }
    }

    /// Buckets not in the filter's value set.
    pub fn not_selected_count(&self) -> usize {
        self.buckets.len() - self.selected_count
    }
}

/// One bin of a numeric histogram; `end` is inclusive for the last bin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: u32,
}

/// Equal-width conditional histogram of a numeric attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NumericHistogram {
    pub attribute: String,
    pub bins: Vec<HistogramBin>,
    pub max_count: u32,
    /// Records without a value that pass the other filters.
    pub missing_count: u32,
}

// ============================================================================
// PAGES
// ============================================================================

/// The currently visible slice of the ranked, filtered records.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageWindow {
    pub records: Vec<Record>,
    /// 1-based, already clamped to `1..=total_pages`.
    pub page_number: usize,
    pub total_pages: usize,
    pub page_size: usize,
    /// Records passing every filter.
    pub active_count: usize,
}

impl PageWindow {
    pub fn panel_keys(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.panel_key.as_str())
    }

    pub fn is_first(&self) -> bool {
        self.page_number <= 1
    }

    pub fn is_last(&self) -> bool {
        self.page_number >= self.total_pages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_distribution(order: OrderPreference) -> Distribution {
        // count-descending native order for {a: 1, b: 1, c: 2}
        let buckets = vec![
            Bucket { key: CogValue::text("c"), count: 2 },
            Bucket { key: CogValue::text("a"), count: 1 },
            Bucket { key: CogValue::text("b"), count: 1 },
        ];
        Distribution {
            attribute: "g".to_string(),
            max_count: 2,
            order,
            reversed_for_display: order.reversed_for_display(),
            selected_count: 0,
            sum_selected_count: 0,
            display_index: (0..buckets.len()).collect(),
            buckets,
        }
    }

    fn keys(dist: &Distribution) -> Vec<String> {
        dist.ordered_buckets().map(|b| b.key.to_string()).collect()
    }

    #[test]
    fn test_count_orders_break_ties_by_ascending_value() {
        assert_eq!(keys(&create_test_distribution(OrderPreference::CountDescending)), vec!["c", "a", "b"]);
        assert_eq!(keys(&create_test_distribution(OrderPreference::CountAscending)), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_page_window_ends() {
        let window = PageWindow {
            records: vec![Record::new("p1")],
            page_number: 1,
            total_pages: 1,
            page_size: 4,
            active_count: 1,
        };
        assert!(window.is_first() && window.is_last());
        assert_eq!(window.panel_keys().collect::<Vec<_>>(), vec!["p1"]);
    }
}
