//! FILENAME: filter-engine/src/definition.rs
//! Filter Definition - The serializable filter, sort and paging configuration.
//!
//! This module contains the types that DESCRIBE what the user asked for:
//! - Which attributes are filtered and on what (`FilterState`, `FilterEntry`)
//! - How a filter is changed (`FilterMutation`)
//! - How histograms are listed (`OrderPreference`)
//! - How panels are ranked (`SortKey`)
//!
//! None of these hold index state. The field names follow the display-object
//! JSON the UI collaborator already produces (`orderValue`, `value`, ...).

use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Serialize};
use cogs::CogValue;
use crate::error::FilterError;

/// Bumped on every successful filter mutation.
pub type FilterVersion = u64;

// ============================================================================
// ORDER PREFERENCE
// ============================================================================

/// Display order of a categorical distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum OrderPreference {
    #[default]
    #[serde(rename = "ct,desc", alias = "count,descending")]
    CountDescending,
    #[serde(rename = "ct,asc", alias = "count,ascending")]
    CountAscending,
    #[serde(rename = "id,asc", alias = "value,ascending")]
    ValueAscending,
    #[serde(rename = "id,desc", alias = "value,descending")]
    ValueDescending,
}

impl OrderPreference {
    pub fn by_count(self) -> bool {
        matches!(self, OrderPreference::CountDescending | OrderPreference::CountAscending)
    }

    /// The aggregate natively yields count-descending and value-ascending
    /// orders only. This flag tells the renderer whether to flip its rows.
    pub fn reversed_for_display(self) -> bool {
        !matches!(self, OrderPreference::CountAscending | OrderPreference::ValueDescending)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OrderPreference::CountDescending => "ct,desc",
            OrderPreference::CountAscending => "ct,asc",
            OrderPreference::ValueAscending => "id,asc",
            OrderPreference::ValueDescending => "id,desc",
        }
    }
}

impl fmt::Display for OrderPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderPreference {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "ct,desc" | "count,descending" => Ok(OrderPreference::CountDescending),
            "ct,asc" | "count,ascending" => Ok(OrderPreference::CountAscending),
            "id,asc" | "value,ascending" => Ok(OrderPreference::ValueAscending),
            "id,desc" | "value,descending" => Ok(OrderPreference::ValueDescending),
            other => Err(FilterError::InvalidOrder(other.to_string())),
        }
    }
}

// ============================================================================
// SORT
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    #[serde(alias = "asc")]
    Ascending,
    #[serde(alias = "desc")]
    Descending,
}

/// One level of a panel ranking. Missing values always rank last.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortKey {
    #[serde(rename = "name", alias = "attribute")]
    pub attribute: String,

    #[serde(rename = "dir", alias = "direction", default)]
    pub direction: SortOrder,
}

impl SortKey {
    pub fn ascending(attribute: impl Into<String>) -> Self {
        SortKey { attribute: attribute.into(), direction: SortOrder::Ascending }
    }

    pub fn descending(attribute: impl Into<String>) -> Self {
        SortKey { attribute: attribute.into(), direction: SortOrder::Descending }
    }
}

// ============================================================================
// PAGING
// ============================================================================

/// Page navigation. Never wraps around.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageDirection {
    /// Swiping right reveals the previous page.
    #[serde(alias = "right")]
    Previous,
    #[serde(alias = "left")]
    Next,
}

// ============================================================================
// PREDICATES
// ============================================================================

/// Inclusive numeric bounds; a missing end is open.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RangeBounds {
    #[serde(default)]
    pub from: Option<f64>,
    #[serde(default)]
    pub to: Option<f64>,
}

impl RangeBounds {
    pub fn new(from: Option<f64>, to: Option<f64>) -> Self {
        RangeBounds { from, to }
    }

    pub fn is_unbounded(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }

    /// True when `value` lies within the bounds. Missing values never do.
    pub fn contains(&self, value: f64) -> bool {
        !value.is_nan()
            && self.from.map_or(true, |from| value >= from)
            && self.to.map_or(true, |to| value <= to)
    }
}

/// What the index filters a dimension on.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterPredicate {
    /// Categorical membership. An empty set filters nothing.
    Values(Vec<CogValue>),
    /// Values matched by a pattern. An empty set matches no record.
    Matched(Vec<CogValue>),
    /// Numeric range. Unbounded on both ends filters nothing.
    Range(RangeBounds),
}

// ============================================================================
// FILTER STATE
// ============================================================================

/// The shape of one active filter, as the UI stores it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FilterKind {
    Select {
        #[serde(rename = "value", default)]
        values: Vec<CogValue>,
    },
    /// Values whose label matches `regex`; `values` holds the resolved matches.
    Regex {
        regex: String,
        #[serde(rename = "value", default)]
        values: Vec<CogValue>,
    },
    Range {
        #[serde(rename = "value", default)]
        bounds: RangeBounds,
    },
}

impl FilterKind {
    pub fn predicate(&self) -> FilterPredicate {
        match self {
            FilterKind::Select { values } => FilterPredicate::Values(values.clone()),
            FilterKind::Regex { values, .. } => FilterPredicate::Matched(values.clone()),
            FilterKind::Range { bounds } => FilterPredicate::Range(*bounds),
        }
    }

    /// The selected values of a categorical filter; empty for ranges.
    pub fn selected_values(&self) -> &[CogValue] {
        match self {
            FilterKind::Select { values } | FilterKind::Regex { values, .. } => values,
            FilterKind::Range { .. } => &[],
        }
    }
}

/// One filtered attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterEntry {
    #[serde(rename = "name")]
    pub attribute: String,

    #[serde(flatten)]
    pub kind: FilterKind,

    #[serde(rename = "orderValue", default)]
    pub order: OrderPreference,
}

impl FilterEntry {
    /// The mutation that would recreate this entry from scratch.
    pub fn to_mutation(&self) -> FilterMutation {
        let op = match &self.kind {
            FilterKind::Select { values } => FilterOp::SetValues { values: values.clone() },
            FilterKind::Regex { regex, .. } => FilterOp::SetRegex { pattern: regex.clone() },
            FilterKind::Range { bounds } => FilterOp::SetRange { from: bounds.from, to: bounds.to },
        };
        FilterMutation {
            attribute: self.attribute.clone(),
            op,
            order: Some(self.order),
        }
    }
}

/// The set of active filters, in activation order, with a version counter
/// so callers can memoize derived results.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterState {
    entries: Vec<FilterEntry>,
    #[serde(skip)]
    version: FilterVersion,
}

impl FilterState {
    pub fn new() -> Self {
        FilterState::default()
    }

    pub fn version(&self) -> FilterVersion {
        self.version
    }

    pub fn entries(&self) -> &[FilterEntry] {
        &self.entries
    }

    pub fn get(&self, attribute: &str) -> Option<&FilterEntry> {
        self.entries.iter().find(|e| e.attribute == attribute)
    }

    pub fn is_active(&self, attribute: &str) -> bool {
        self.get(attribute).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Replaces an existing entry in place (keeping its activation slot) or
    /// appends a new one.
    pub(crate) fn upsert(&mut self, entry: FilterEntry) {
        match self.entries.iter_mut().find(|e| e.attribute == entry.attribute) {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
    }

    pub(crate) fn remove(&mut self, attribute: &str) -> Option<FilterEntry> {
        let pos = self.entries.iter().position(|e| e.attribute == attribute)?;
        Some(self.entries.remove(pos))
    }

    pub(crate) fn bump_version(&mut self) {
        self.version += 1;
    }
}

// ============================================================================
// MUTATIONS
// ============================================================================

/// How a filter changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "kebab-case")]
pub enum FilterOp {
    SetValues { values: Vec<CogValue> },
    SetRange {
        #[serde(default)]
        from: Option<f64>,
        #[serde(default)]
        to: Option<f64>,
    },
    SetRegex { pattern: String },
    /// Change only the order preference of an existing filter.
    SetOrder,
    Clear,
}

/// An inbound filter change for one attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterMutation {
    pub attribute: String,

    #[serde(flatten)]
    pub op: FilterOp,

    #[serde(rename = "orderValue", default)]
    pub order: Option<OrderPreference>,
}

impl FilterMutation {
    pub fn new(attribute: impl Into<String>, op: FilterOp) -> Self {
        FilterMutation { attribute: attribute.into(), op, order: None }
    }

    pub fn set_values<V: Into<CogValue>>(
        attribute: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        let values = values.into_iter().map(Into::into).collect();
        FilterMutation::new(attribute, FilterOp::SetValues { values })
    }

    pub fn set_range(attribute: impl Into<String>, from: Option<f64>, to: Option<f64>) -> Self {
        FilterMutation::new(attribute, FilterOp::SetRange { from, to })
    }

    pub fn set_regex(attribute: impl Into<String>, pattern: impl Into<String>) -> Self {
        FilterMutation::new(attribute, FilterOp::SetRegex { pattern: pattern.into() })
    }

    pub fn set_order(attribute: impl Into<String>, order: OrderPreference) -> Self {
        FilterMutation::new(attribute, FilterOp::SetOrder).with_order(order)
    }

    pub fn clear(attribute: impl Into<String>) -> Self {
        FilterMutation::new(attribute, FilterOp::Clear)
    }

    pub fn with_order(mut self, order: OrderPreference) -> Self {
        self.order = Some(order);
        self
    }
}
