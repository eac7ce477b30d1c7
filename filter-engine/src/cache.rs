//! FILENAME: filter-engine/src/cache.rs
//! Dimensional Index - The incrementally maintained filter cache.
//!
//! The index is designed for:
//! - One build pass over the records (O(records x attributes))
//! - Filter changes that only touch records whose membership flips
//! - Conditional aggregates: every dimension counts the records that pass
//!   every filter EXCEPT its own, so a filtered attribute still shows the
//!   full distribution the other filters allow
//!
//! Architecture:
//! - Each attribute's distinct values are interned and referenced by ValueId
//! - Categorical dimensions keep one posting list per value
//! - Numeric dimensions keep their records sorted by value, so a range
//!   filter is a contiguous span of sorted positions
//! - One bit per dimension per record marks "fails this dimension's filter"
//! - A separate sort dimension holds the panel ranking

use std::cmp::Ordering;
use std::ops::Range;
use std::sync::Arc;
use regex::RegexBuilder;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use cogs::{CogCatalog, CogInfo, CogType, CogValue, DataError, Record, RecordStore};
use crate::definition::{FilterPredicate, RangeBounds, SortKey, SortOrder};
use crate::error::FilterError;

/// Position of a record in the record store.
pub type RecordId = u32;

/// A reference to an interned value within a dimension's value store.
pub type ValueId = u32;

/// Position of a dimension in catalog order; also its bit in the filter mask.
pub type DimensionId = usize;

// ============================================================================
// VALUE INTERNING
// ============================================================================

/// Unique values of one attribute, with a precomputed ascending order.
#[derive(Debug, Clone, Default)]
pub struct ValueStore {
    value_to_id: FxHashMap<CogValue, ValueId>,
    id_to_value: Vec<CogValue>,
    /// ValueIds in ascending value order.
    sorted_ids: Vec<ValueId>,
    /// Inverse of `sorted_ids`: position of each ValueId in value order.
    rank: Vec<u32>,
}

impl ValueStore {
    fn intern(&mut self, value: &CogValue) -> ValueId {
        if let Some(&id) = self.value_to_id.get(value) {
            return id;
        }
        let id = self.id_to_value.len() as ValueId;
        self.id_to_value.push(value.clone());
        self.value_to_id.insert(value.clone(), id);
        id
    }

    /// Computes the value order once all values are interned.
    fn finish(&mut self) {
        let values = &self.id_to_value;
        self.sorted_ids = (0..values.len() as ValueId).collect();
        self.sorted_ids.sort_by(|&a, &b| values[a as usize].cmp(&values[b as usize]));

        self.rank = vec![0; values.len()];
        for (pos, &id) in self.sorted_ids.iter().enumerate() {
            self.rank[id as usize] = pos as u32;
        }
    }

    pub fn get(&self, id: ValueId) -> Option<&CogValue> {
        self.id_to_value.get(id as usize)
    }

    pub fn id_of(&self, value: &CogValue) -> Option<ValueId> {
        self.value_to_id.get(value).copied()
    }

    /// All ValueIds in ascending value order.
    pub fn sorted_ids(&self) -> &[ValueId] {
        &self.sorted_ids
    }

    pub fn len(&self) -> usize {
        self.id_to_value.len()
    }

    pub fn is_empty(&self) -> bool {
        self.id_to_value.is_empty()
    }

    fn rank(&self, id: ValueId) -> u32 {
        self.rank[id as usize]
    }

    fn is_missing(&self, id: ValueId) -> bool {
        self.id_to_value[id as usize].is_missing()
    }
}

// ============================================================================
// FILTER MASK
// ============================================================================

/// Which other dimensions a record currently fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OtherFailures {
    None,
    One(DimensionId),
    Many,
}

/// One bit per (record, dimension): set when the record fails that
/// dimension's filter. A record is active when its row is all zeroes.
#[derive(Debug, Clone)]
struct FilterMask {
    words: usize,
    bits: Vec<u64>,
}

impl FilterMask {
    fn new(records: usize, dimensions: usize) -> Self {
        let words = dimensions.div_ceil(64).max(1);
        FilterMask {
            words,
            bits: vec![0; records * words],
        }
    }

    fn row(&self, record: RecordId) -> &[u64] {
        let start = record as usize * self.words;
        &self.bits[start..start + self.words]
    }

    fn set_failing(&mut self, record: RecordId, dim: DimensionId, failing: bool) {
        let word = &mut self.bits[record as usize * self.words + dim / 64];
        let bit = 1u64 << (dim % 64);
        if failing {
            *word |= bit;
        } else {
            *word &= !bit;
        }
    }

    fn is_clear(&self, record: RecordId) -> bool {
        self.row(record).iter().all(|&w| w == 0)
    }

    fn others_failing(&self, record: RecordId, dim: DimensionId) -> OtherFailures {
        let mut found = None;
        for (w, &word) in self.row(record).iter().enumerate() {
            let mut word = word;
            if w == dim / 64 {
                word &= !(1u64 << (dim % 64));
            }
            if word == 0 {
                continue;
            }
            if found.is_some() || word.count_ones() > 1 {
                return OtherFailures::Many;
            }
            found = Some(w * 64 + word.trailing_zeros() as usize);
        }
        match found {
            Some(other) => OtherFailures::One(other),
            None => OtherFailures::None,
        }
    }
}

// ============================================================================
// DIMENSION
// ============================================================================

/// A resolved predicate, expressed in the dimension's own ids and positions.
#[derive(Debug, Clone, PartialEq)]
enum ActivePredicate {
    /// Sorted, deduplicated selected ValueIds.
    Values(SmallVec<[ValueId; 8]>),
    /// Bounds plus the span of `ordered` positions they select.
    Range { bounds: RangeBounds, span: Range<usize> },
}

/// Per-attribute index with a conditional (filter-excluding-self) aggregate.
#[derive(Debug, Clone)]
pub struct Dimension {
    pub attribute: String,
    pub cog_type: CogType,

    values: ValueStore,

    /// ValueId of each record.
    record_values: Vec<ValueId>,

    /// Records holding each ValueId.
    members: Vec<Vec<RecordId>>,

    /// Numeric only: records in ascending value order, missing values last.
    ordered: Vec<RecordId>,

    /// Numeric only: number of records with a value (prefix of `ordered`).
    present: usize,

    /// Numeric only: value of each record, NaN when missing.
    numeric: Vec<f64>,

    /// Per ValueId: records passing every filter except this dimension's.
    group_counts: Vec<u32>,

    /// Sum of `group_counts`.
    conditional_total: usize,

    active: Option<ActivePredicate>,
}

impl Dimension {
    fn build(info: &CogInfo, store: &RecordStore) -> Result<Self, DataError> {
        let mut values = ValueStore::default();
        let mut record_values = Vec::with_capacity(store.len());

        for record in store.iter() {
            let value = record.get(&info.name).ok_or_else(|| DataError::MissingAttribute {
                panel_key: record.panel_key.clone(),
                attribute: info.name.clone(),
            })?;
            record_values.push(values.intern(value));
        }
        values.finish();

        let mut members = vec![Vec::new(); values.len()];
        for (record, &id) in record_values.iter().enumerate() {
            members[id as usize].push(record as RecordId);
        }
        let group_counts: Vec<u32> = members.iter().map(|m| m.len() as u32).collect();

        let mut ordered = Vec::new();
        let mut numeric = Vec::new();
        let mut present = 0;
        if info.cog_type == CogType::Numeric {
            numeric = record_values
                .iter()
                .map(|&id| values.get(id).and_then(CogValue::as_f64).unwrap_or(f64::NAN))
                .collect();
            ordered = (0..store.len() as RecordId).collect();
            ordered.sort_by(|&a, &b| compare_numeric(numeric[a as usize], numeric[b as usize]));
            present = numeric.iter().filter(|v| !v.is_nan()).count();
        }

        Ok(Dimension {
            attribute: info.name.clone(),
            cog_type: info.cog_type,
            values,
            record_values,
            members,
            ordered,
            present,
            numeric,
            group_counts,
            conditional_total: store.len(),
            active: None,
        })
    }

    pub fn values(&self) -> &ValueStore {
        &self.values
    }

    pub fn is_filtered(&self) -> bool {
        self.active.is_some()
    }

    /// Records passing every filter except this dimension's own.
    pub fn conditional_total(&self) -> usize {
        self.conditional_total
    }

    /// The conditional aggregate in ascending value order, zero counts omitted.
    pub fn conditional_counts(&self) -> impl Iterator<Item = (&CogValue, u32)> + '_ {
        self.values.sorted_ids().iter().filter_map(move |&id| {
            let count = self.group_counts[id as usize];
            if count == 0 {
                return None;
            }
            self.values.get(id).map(|value| (value, count))
        })
    }

    /// The value of `record` in this dimension.
    pub fn value_of(&self, record: RecordId) -> Option<&CogValue> {
        self.record_values
            .get(record as usize)
            .and_then(|&id| self.values.get(id))
    }

    /// Whether `record` passes this dimension's own predicate.
    pub fn passes(&self, record: RecordId) -> bool {
        match &self.active {
            None => true,
            Some(ActivePredicate::Values(ids)) => {
                ids.binary_search(&self.record_values[record as usize]).is_ok()
            }
            Some(ActivePredicate::Range { bounds, .. }) => {
                bounds.contains(self.numeric[record as usize])
            }
        }
    }

    /// Validates a predicate against this dimension and resolves it into ids
    /// and positions. Never mutates.
    fn resolve(&self, predicate: Option<&FilterPredicate>) -> Result<Option<ActivePredicate>, FilterError> {
        match predicate {
            None => Ok(None),
            Some(FilterPredicate::Values(selected)) => {
                if self.cog_type != CogType::Categorical {
                    return Err(self.wrong_shape("value-set"));
                }
                if selected.is_empty() {
                    return Ok(None);
                }
                Ok(Some(ActivePredicate::Values(self.value_ids(selected))))
            }
            Some(FilterPredicate::Matched(matched)) => {
                if self.cog_type != CogType::Categorical {
                    return Err(self.wrong_shape("regex"));
                }
                Ok(Some(ActivePredicate::Values(self.value_ids(matched))))
            }
            Some(FilterPredicate::Range(bounds)) => {
                if self.cog_type != CogType::Numeric {
                    return Err(self.wrong_shape("range"));
                }
                let invalid = bounds.from.is_some_and(f64::is_nan)
                    || bounds.to.is_some_and(f64::is_nan)
                    || matches!((bounds.from, bounds.to), (Some(from), Some(to)) if from > to);
                if invalid {
                    return Err(FilterError::InvalidRange {
                        attribute: self.attribute.clone(),
                        from: bounds.from,
                        to: bounds.to,
                    });
                }
                if bounds.is_unbounded() {
                    return Ok(None);
                }
                Ok(Some(ActivePredicate::Range {
                    bounds: *bounds,
                    span: self.span(bounds),
                }))
            }
        }
    }

    /// Sorted ids of the given values; values absent from the data are dropped.
    fn value_ids(&self, values: &[CogValue]) -> SmallVec<[ValueId; 8]> {
        let mut ids: SmallVec<[ValueId; 8]> =
            values.iter().filter_map(|v| self.values.id_of(v)).collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    fn wrong_shape(&self, predicate: &'static str) -> FilterError {
        FilterError::WrongShape {
            attribute: self.attribute.clone(),
            cog_type: self.cog_type,
            predicate,
        }
    }

    /// Positions of `ordered` selected by the bounds.
    fn span(&self, bounds: &RangeBounds) -> Range<usize> {
        let present = &self.ordered[..self.present];
        let start = bounds.from.map_or(0, |from| {
            present.partition_point(|&r| self.numeric[r as usize] < from)
        });
        let end = bounds.to.map_or(self.present, |to| {
            present.partition_point(|&r| self.numeric[r as usize] <= to)
        });
        start..end.max(start)
    }

    /// Records whose pass/fail status differs between the current predicate
    /// and `next`, paired with their new status.
    fn transition(&self, next: &Option<ActivePredicate>) -> Vec<(RecordId, bool)> {
        let mut changes = Vec::new();
        if self.active.is_none() && next.is_none() {
            return changes;
        }

        if self.cog_type == CogType::Numeric {
            let all = 0..self.ordered.len();
            let old = pass_span(&self.active).unwrap_or_else(|| all.clone());
            let new = pass_span(next).unwrap_or(all);
            for pos in span_difference(&old, &new) {
                changes.push((self.ordered[pos], new.contains(&pos)));
            }
        } else {
            let selected = |p: &Option<ActivePredicate>, id: ValueId| match p {
                Some(ActivePredicate::Values(ids)) => ids.binary_search(&id).is_ok(),
                _ => true,
            };
            for id in 0..self.values.len() as ValueId {
                let now = selected(next, id);
                if selected(&self.active, id) != now {
                    changes.extend(self.members[id as usize].iter().map(|&r| (r, now)));
                }
            }
        }
        changes
    }

    /// Adds or removes `record` from the conditional aggregate.
    fn adjust(&mut self, record: RecordId, include: bool) {
        let id = self.record_values[record as usize] as usize;
        if include {
            self.group_counts[id] += 1;
            self.conditional_total += 1;
        } else {
            self.group_counts[id] -= 1;
            self.conditional_total -= 1;
        }
    }
}

fn compare_numeric(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
    }
}

fn pass_span(predicate: &Option<ActivePredicate>) -> Option<Range<usize>> {
    match predicate {
        Some(ActivePredicate::Range { span, .. }) => Some(span.clone()),
        _ => None,
    }
}

/// Positions in exactly one of the two spans.
fn span_difference(a: &Range<usize>, b: &Range<usize>) -> impl Iterator<Item = usize> {
    let disjoint = a.end <= b.start || b.end <= a.start;
    let (first, second) = if disjoint {
        (a.clone(), b.clone())
    } else {
        (
            a.start.min(b.start)..a.start.max(b.start),
            a.end.min(b.end)..a.end.max(b.end),
        )
    };
    first.chain(second)
}

// ============================================================================
// SORT DIMENSION
// ============================================================================

/// The designated ranking of all records. Ties fall back to panel key.
#[derive(Debug, Clone, Default)]
struct SortDimension {
    spec: Vec<SortKey>,
    order: Vec<RecordId>,
}

// ============================================================================
// INDEX
// ============================================================================

/// Statistics about the index, for logging and tuning.
#[derive(Debug, Clone, Default)]
pub struct IndexStats {
    pub total_records: usize,
    pub dimensions: usize,
    pub unique_values: usize,
    /// Records whose membership changed in the last filter mutation.
    pub last_changed_records: usize,
}

/// The multi-dimensional filter index over one dataset.
#[derive(Debug, Clone)]
pub struct DimensionalIndex {
    store: Arc<RecordStore>,
    catalog: Arc<CogCatalog>,
    dimensions: Vec<Dimension>,
    by_name: FxHashMap<String, DimensionId>,
    mask: FilterMask,
    /// The "all" aggregate: records passing every filter.
    active_count: usize,
    sort: SortDimension,
    generation: u64,
    stats: IndexStats,
}

impl DimensionalIndex {
    /// Builds one dimension per catalog attribute. Nothing is returned unless
    /// the whole dataset is valid.
    pub fn build(store: Arc<RecordStore>, catalog: Arc<CogCatalog>) -> Result<Self, DataError> {
        store.validate(&catalog)?;

        let dimensions = catalog
            .iter()
            .map(|info| Dimension::build(info, &store))
            .collect::<Result<Vec<_>, _>>()?;
        let by_name = dimensions
            .iter()
            .enumerate()
            .map(|(i, d)| (d.attribute.clone(), i))
            .collect();

        let stats = IndexStats {
            total_records: store.len(),
            dimensions: dimensions.len(),
            unique_values: dimensions.iter().map(|d| d.values.len()).sum(),
            last_changed_records: 0,
        };

        let mut index = DimensionalIndex {
            mask: FilterMask::new(store.len(), dimensions.len()),
            active_count: store.len(),
            store,
            catalog,
            dimensions,
            by_name,
            sort: SortDimension::default(),
            generation: 0,
            stats,
        };
        index.sort.order = index.ranking(&[]);

        log::info!(
            target: "INDEX",
            "built index records={} dimensions={} unique_values={}",
            index.stats.total_records,
            index.stats.dimensions,
            index.stats.unique_values
        );
        Ok(index)
    }

    /// Installs, replaces or clears the predicate on one dimension. The
    /// predicate is validated before anything changes.
    pub fn set_filter(
        &mut self,
        attribute: &str,
        predicate: Option<&FilterPredicate>,
    ) -> Result<(), FilterError> {
        let dim = self.dimension_id(attribute)?;
        let next = self.dimensions[dim].resolve(predicate)?;
        if next == self.dimensions[dim].active {
            return Ok(());
        }

        let changes = self.dimensions[dim].transition(&next);
        self.dimensions[dim].active = next;
        for &(record, passes) in &changes {
            self.update_membership(dim, record, passes);
        }

        self.stats.last_changed_records = changes.len();
        self.generation += 1;
        log::debug!(
            target: "INDEX",
            "set_filter attribute={} changed={} active={}",
            attribute,
            changes.len(),
            self.active_count
        );
        Ok(())
    }

    /// Flips one record's bit for `dim` and propagates the change to every
    /// aggregate whose membership depends on it.
    fn update_membership(&mut self, dim: DimensionId, record: RecordId, passes: bool) {
        self.mask.set_failing(record, dim, !passes);

        match self.mask.others_failing(record, dim) {
            OtherFailures::None => {
                for (i, other) in self.dimensions.iter_mut().enumerate() {
                    if i != dim {
                        other.adjust(record, passes);
                    }
                }
                if passes {
                    self.active_count += 1;
                } else {
                    self.active_count -= 1;
                }
            }
            OtherFailures::One(other) => self.dimensions[other].adjust(record, passes),
            OtherFailures::Many => {}
        }
    }

    /// Replaces the panel ranking. An empty key list ranks by panel key.
    pub fn set_sort(&mut self, spec: &[SortKey]) -> Result<(), FilterError> {
        for key in spec {
            self.dimension_id(&key.attribute)?;
        }
        self.sort = SortDimension {
            spec: spec.to_vec(),
            order: self.ranking(spec),
        };
        self.generation += 1;
        log::info!(target: "INDEX", "set_sort keys={}", spec.len());
        Ok(())
    }

    fn ranking(&self, spec: &[SortKey]) -> Vec<RecordId> {
        let keys: Vec<(&Dimension, SortOrder)> = spec
            .iter()
            .filter_map(|k| {
                let dim = self.by_name.get(&k.attribute)?;
                Some((&self.dimensions[*dim], k.direction))
            })
            .collect();
        let records = self.store.records();

        let mut order: Vec<RecordId> = (0..records.len() as RecordId).collect();
        order.sort_by(|&a, &b| {
            for (dim, direction) in &keys {
                let va = dim.record_values[a as usize];
                let vb = dim.record_values[b as usize];
                let ord = match (dim.values.is_missing(va), dim.values.is_missing(vb)) {
                    (true, true) => Ordering::Equal,
                    (true, false) => Ordering::Greater,
                    (false, true) => Ordering::Less,
                    (false, false) => {
                        let ord = dim.values.rank(va).cmp(&dim.values.rank(vb));
                        match direction {
                            SortOrder::Ascending => ord,
                            SortOrder::Descending => ord.reverse(),
                        }
                    }
                };
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            records[a as usize].panel_key.cmp(&records[b as usize].panel_key)
        });
        order
    }

    /// Number of records passing every active predicate.
    pub fn active_count(&self) -> usize {
        self.active_count
    }

    pub fn record_count(&self) -> usize {
        self.store.len()
    }

    /// Whether the record passes every active predicate.
    pub fn is_active(&self, record: RecordId) -> bool {
        self.mask.is_clear(record)
    }

    /// Active records in ranking order, skipping `offset` and taking `size`.
    pub fn sorted_page(&self, offset: usize, size: usize) -> Vec<&Record> {
        self.sorted_records().skip(offset).take(size).collect()
    }

    /// Every active record in ranking order.
    pub fn sorted_records(&self) -> impl Iterator<Item = &Record> + '_ {
        let records = self.store.records();
        self.sort
            .order
            .iter()
            .filter(move |&&r| self.mask.is_clear(r))
            .map(move |&r| &records[r as usize])
    }

    /// The conditional aggregate of one attribute as (value, count) pairs in
    /// ascending value order.
    pub fn conditional_counts(&self, attribute: &str) -> Result<Vec<(CogValue, u32)>, FilterError> {
        let dim = self.dimension_id(attribute)?;
        Ok(self.dimensions[dim]
            .conditional_counts()
            .map(|(value, count)| (value.clone(), count))
            .collect())
    }

    /// Distinct values of a categorical attribute whose label matches the
    /// pattern (case-insensitive), in ascending value order.
    pub fn matching_values(&self, attribute: &str, pattern: &str) -> Result<Vec<CogValue>, FilterError> {
        let dim = &self.dimensions[self.dimension_id(attribute)?];
        if dim.cog_type != CogType::Categorical {
            return Err(dim.wrong_shape("regex"));
        }
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| FilterError::InvalidPattern {
                attribute: attribute.to_string(),
                message: e.to_string(),
            })?;

        Ok(dim
            .values
            .sorted_ids()
            .iter()
            .filter_map(|&id| dim.values.get(id))
            .filter(|value| regex.is_match(&value.to_string()))
            .cloned()
            .collect())
    }

    pub fn dimension(&self, attribute: &str) -> Option<&Dimension> {
        self.by_name.get(attribute).map(|&i| &self.dimensions[i])
    }

    pub fn dimensions(&self) -> &[Dimension] {
        &self.dimensions
    }

    fn dimension_id(&self, attribute: &str) -> Result<DimensionId, FilterError> {
        self.by_name
            .get(attribute)
            .copied()
            .ok_or_else(|| FilterError::UnknownAttribute(attribute.to_string()))
    }

    pub fn sort_spec(&self) -> &[SortKey] {
        &self.sort.spec
    }

    pub fn store(&self) -> &Arc<RecordStore> {
        &self.store
    }

    pub fn catalog(&self) -> &Arc<CogCatalog> {
        &self.catalog
    }

    /// Bumped on every predicate or sort change.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn stats(&self) -> &IndexStats {
        &self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cogs::CogInfo;

    /// 10 panels: group A x6 / B x4, score 0..9, kind alternating x/y.
    fn create_test_index() -> DimensionalIndex {
        let records: Vec<Record> = (0..10)
            .map(|i| {
                Record::new(format!("p{:02}", i))
                    .with("group", if i < 6 { "A" } else { "B" })
                    .with("score", i as f64)
                    .with("kind", if i % 2 == 0 { "x" } else { "y" })
            })
            .collect();
        let catalog = CogCatalog::new(vec![
            CogInfo::categorical("group"),
            CogInfo::numeric("score"),
            CogInfo::categorical("kind"),
        ])
        .unwrap();
        DimensionalIndex::build(Arc::new(records.into()), Arc::new(catalog)).unwrap()
    }

    fn counts(index: &DimensionalIndex, attribute: &str) -> Vec<(String, u32)> {
        index
            .conditional_counts(attribute)
            .unwrap()
            .into_iter()
            .map(|(v, c)| (v.to_string(), c))
            .collect()
    }

    fn keys(index: &DimensionalIndex) -> Vec<String> {
        index.sorted_records().map(|r| r.panel_key.clone()).collect()
    }

    #[test]
    fn test_build_counts_everything() {
        let index = create_test_index();
        assert_eq!(index.active_count(), 10);
        assert_eq!(counts(&index, "group"), vec![("A".into(), 6), ("B".into(), 4)]);
        assert_eq!(index.stats().dimensions, 3);
    }

    #[test]
    fn test_build_rejects_bad_data() {
        let catalog = Arc::new(CogCatalog::new(vec![CogInfo::categorical("group")]).unwrap());
        let empty = DimensionalIndex::build(Arc::new(RecordStore::default()), catalog.clone());
        assert_eq!(empty.unwrap_err(), DataError::Empty);

        let missing = RecordStore::new(vec![Record::new("a")]);
        assert!(matches!(
            DimensionalIndex::build(Arc::new(missing), catalog),
            Err(DataError::MissingAttribute { .. })
        ));
    }

    #[test]
    fn test_filter_excludes_own_dimension() {
        let mut index = create_test_index();
        index
            .set_filter("group", Some(&FilterPredicate::Values(vec!["A".into()])))
            .unwrap();

        assert_eq!(index.active_count(), 6);
        // group still sees both values; kind only sees group A
        assert_eq!(counts(&index, "group"), vec![("A".into(), 6), ("B".into(), 4)]);
        assert_eq!(counts(&index, "kind"), vec![("x".into(), 3), ("y".into(), 3)]);
    }

    #[test]
    fn test_range_filter_and_clear() {
        let mut index = create_test_index();
        let range = FilterPredicate::Range(RangeBounds::new(Some(2.0), Some(4.0)));
        index.set_filter("score", Some(&range)).unwrap();
        assert_eq!(index.active_count(), 3);
        assert_eq!(keys(&index), vec!["p02", "p03", "p04"]);
        assert_eq!(index.dimension("score").unwrap().conditional_total(), 10);

        let moved = FilterPredicate::Range(RangeBounds::new(Some(7.0), None));
        index.set_filter("score", Some(&moved)).unwrap();
        assert_eq!(keys(&index), vec!["p07", "p08", "p09"]);

        index.set_filter("score", None).unwrap();
        assert_eq!(index.active_count(), 10);
    }

    #[test]
    fn test_two_filters_interact() {
        let mut index = create_test_index();
        index
            .set_filter("kind", Some(&FilterPredicate::Values(vec!["x".into()])))
            .unwrap();
        index
            .set_filter("score", Some(&FilterPredicate::Range(RangeBounds::new(None, Some(5.0)))))
            .unwrap();

        // x and score<=5: p00 p02 p04
        assert_eq!(index.active_count(), 3);
        // kind excludes its own filter: score<=5 -> x:3 y:3
        assert_eq!(counts(&index, "kind"), vec![("x".into(), 3), ("y".into(), 3)]);
        // group sees both filters
        assert_eq!(counts(&index, "group"), vec![("A".into(), 3)]);
        // score excludes its own filter: kind x -> 5 records
        assert_eq!(index.dimension("score").unwrap().conditional_total(), 5);

        index.set_filter("kind", None).unwrap();
        assert_eq!(index.active_count(), 6);
        assert_eq!(counts(&index, "group"), vec![("A".into(), 6)]);
    }

    #[test]
    fn test_rejected_filter_leaves_index_untouched() {
        let mut index = create_test_index();
        index
            .set_filter("group", Some(&FilterPredicate::Values(vec!["B".into()])))
            .unwrap();
        let generation = index.generation();

        let wrong = FilterPredicate::Range(RangeBounds::new(Some(0.0), Some(1.0)));
        assert!(matches!(
            index.set_filter("group", Some(&wrong)),
            Err(FilterError::WrongShape { .. })
        ));
        let inverted = FilterPredicate::Range(RangeBounds::new(Some(5.0), Some(1.0)));
        assert!(matches!(
            index.set_filter("score", Some(&inverted)),
            Err(FilterError::InvalidRange { .. })
        ));
        assert_eq!(
            index.set_filter("nope", None),
            Err(FilterError::UnknownAttribute("nope".to_string()))
        );

        assert_eq!(index.generation(), generation);
        assert_eq!(index.active_count(), 4);
    }

    #[test]
    fn test_empty_value_set_filters_nothing() {
        let mut index = create_test_index();
        index
            .set_filter("group", Some(&FilterPredicate::Values(vec![])))
            .unwrap();
        assert_eq!(index.active_count(), 10);
        assert!(!index.dimension("group").unwrap().is_filtered());
    }

    #[test]
    fn test_empty_match_filters_everything() {
        let mut index = create_test_index();
        index
            .set_filter("group", Some(&FilterPredicate::Matched(vec![])))
            .unwrap();
        assert_eq!(index.active_count(), 0);

        let group = index.dimension("group").unwrap();
        assert!(group.is_filtered());
        assert!((0..10).all(|r| !group.passes(r)));
        assert_eq!(group.value_of(0), Some(&CogValue::text("A")));

        index
            .set_filter("group", Some(&FilterPredicate::Matched(vec!["B".into()])))
            .unwrap();
        let group = index.dimension("group").unwrap();
        let passing: Vec<RecordId> = (0..10).filter(|&r| group.passes(r)).collect();
        assert!(passing.iter().all(|&r| group.value_of(r) == Some(&CogValue::text("B"))));
        assert_eq!(passing.len(), index.active_count());
        assert!(matches!(
            index.set_filter("score", Some(&FilterPredicate::Matched(vec![]))),
            Err(FilterError::WrongShape { .. })
        ));
    }

    #[test]
    fn test_sort_descending_with_key_tiebreak() {
        let mut index = create_test_index();
        index
            .set_sort(&[SortKey::ascending("group"), SortKey::descending("score")])
            .unwrap();
        let page = index.sorted_page(0, 3);
        let page: Vec<&str> = page.iter().map(|r| r.panel_key.as_str()).collect();
        assert_eq!(page, vec!["p05", "p04", "p03"]);

        index.set_sort(&[SortKey::ascending("group")]).unwrap();
        let page = index.sorted_page(6, 10);
        let page: Vec<&str> = page.iter().map(|r| r.panel_key.as_str()).collect();
        assert_eq!(page, vec!["p06", "p07", "p08", "p09"]);

        assert!(index.set_sort(&[SortKey::ascending("nope")]).is_err());
        assert_eq!(index.sort_spec().len(), 1);
    }

    #[test]
    fn test_matching_values() {
        let index = create_test_index();
        assert_eq!(index.matching_values("kind", "^X$").unwrap(), vec![CogValue::text("x")]);
        assert!(matches!(
            index.matching_values("kind", "("),
            Err(FilterError::InvalidPattern { .. })
        ));
        assert!(matches!(
            index.matching_values("score", "1"),
            Err(FilterError::WrongShape { .. })
        ));
    }

    #[test]
    fn test_span_difference() {
        let collect = |a: Range<usize>, b: Range<usize>| {
            let mut v: Vec<usize> = span_difference(&a, &b).collect();
            v.sort();
            v
        };
        assert_eq!(collect(0..3, 5..8), vec![0, 1, 2, 5, 6, 7]);
        assert_eq!(collect(0..5, 2..8), vec![0, 1, 5, 6, 7]);
        assert_eq!(collect(2..4, 0..10), vec![0, 1, 4, 5, 6, 7, 8, 9]);
        assert_eq!(collect(3..3, 3..3), Vec::<usize>::new());
    }

    #[test]
    fn test_mask_reports_other_failures() {
        let mut mask = FilterMask::new(1, 70);
        assert_eq!(mask.others_failing(0, 3), OtherFailures::None);
        mask.set_failing(0, 3, true);
        assert_eq!(mask.others_failing(0, 3), OtherFailures::None);
        mask.set_failing(0, 65, true);
        assert_eq!(mask.others_failing(0, 3), OtherFailures::One(65));
        mask.set_failing(0, 1, true);
        assert_eq!(mask.others_failing(0, 3), OtherFailures::Many);
        assert!(!mask.is_clear(0));
    }
}
