//! FILENAME: cogs/src/record.rs
//! PURPOSE: The panels of a dataset and the store that holds them.
//! CONTEXT: Records are created once at load time and never mutated. The
//! store is handed to the index behind an `Arc` so the collaborator that
//! owns the dataset and the index read the same allocation.

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use crate::catalog::{CogCatalog, CogType};
use crate::error::DataError;
use crate::value::CogValue;

/// One panel: a unique key plus one value per cognostic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(rename = "panelKey")]
    pub panel_key: String,

    #[serde(flatten)]
    pub attributes: FxHashMap<String, CogValue>,
}

impl Record {
    pub fn new(panel_key: impl Into<String>) -> Self {
        Record {
            panel_key: panel_key.into(),
            attributes: FxHashMap::default(),
        }
    }

    /// Builder-style attribute setter.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<CogValue>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&CogValue> {
        self.attributes.get(name)
    }
}

/// The full in-memory dataset, in load order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordStore {
    records: Vec<Record>,
}

impl RecordStore {
    pub fn new(records: Vec<Record>) -> Self {
        RecordStore { records }
    }

    pub fn get(&self, index: usize) -> Option<&Record> {
        self.records.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.records.iter()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Checks the store against a catalog: non-empty, unique panel keys,
    /// every catalog attribute present on every record, and numeric
    /// attributes holding numbers (or nothing).
    pub fn validate(&self, catalog: &CogCatalog) -> Result<(), DataError> {
        if self.records.is_empty() {
            return Err(DataError::Empty);
        }

        let mut seen = FxHashSet::default();
        for record in &self.records {
            if !seen.insert(record.panel_key.as_str()) {
                return Err(DataError::DuplicatePanelKey(record.panel_key.clone()));
            }

            for info in catalog.iter() {
                let value = record.get(&info.name).ok_or_else(|| DataError::MissingAttribute {
                    panel_key: record.panel_key.clone(),
                    attribute: info.name.clone(),
                })?;

                if info.cog_type == CogType::Numeric
                    && !matches!(value, CogValue::Number(_) | CogValue::Empty)
                {
                    return Err(DataError::NotNumeric {
                        panel_key: record.panel_key.clone(),
                        attribute: info.name.clone(),
                        value: value.to_string(),
                    });
                }
            }
        }

        Ok(())
    }
}

impl From<Vec<Record>> for RecordStore {
    fn from(records: Vec<Record>) -> Self {
        RecordStore::new(records)
    }
}

impl FromIterator<Record> for RecordStore {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        RecordStore::new(iter.into_iter().collect())
    }
}
