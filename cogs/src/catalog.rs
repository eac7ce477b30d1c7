//! FILENAME: cogs/src/catalog.rs
//! PURPOSE: Static per-dataset metadata for every cognostic.
//! CONTEXT: The catalog is built once per dataset and shared read-only by the
//! index, the distribution calculator and the label resolver. Its order is
//! the attribute order of the dataset.

use std::fmt;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use crate::error::DataError;

/// How a cognostic can be filtered and summarized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CogType {
    /// Discrete labels; filtered by value set, summarized by histogram.
    #[serde(alias = "factor")]
    Categorical,
    /// Continuous values; filtered by range.
    #[serde(alias = "number", alias = "integer")]
    Numeric,
    /// Anything else (keys, hrefs, panel sources). Never filtered.
    #[serde(other)]
    Other,
}

impl fmt::Display for CogType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CogType::Categorical => write!(f, "categorical"),
            CogType::Numeric => write!(f, "numeric"),
            CogType::Other => write!(f, "other"),
        }
    }
}

/// Descriptor for one attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CogInfo {
    pub name: String,

    #[serde(rename = "type")]
    pub cog_type: CogType,

    #[serde(default, alias = "desc")]
    pub description: String,
}

impl CogInfo {
    pub fn new(name: impl Into<String>, cog_type: CogType, description: impl Into<String>) -> Self {
        CogInfo {
            name: name.into(),
            cog_type,
            description: description.into(),
        }
    }

    pub fn categorical(name: impl Into<String>) -> Self {
        CogInfo::new(name, CogType::Categorical, "")
    }

    pub fn numeric(name: impl Into<String>) -> Self {
        CogInfo::new(name, CogType::Numeric, "")
    }
}

/// The ordered set of attribute descriptors for a dataset.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<CogInfo>", into = "Vec<CogInfo>")]
pub struct CogCatalog {
    cogs: Vec<CogInfo>,
    by_name: FxHashMap<String, usize>,
}

impl CogCatalog {
    /// Builds a catalog, rejecting duplicate attribute names.
    pub fn new(cogs: Vec<CogInfo>) -> Result<Self, DataError> {
        let mut by_name = FxHashMap::default();
        for (i, info) in cogs.iter().enumerate() {
            if by_name.insert(info.name.clone(), i).is_some() {
                return Err(DataError::DuplicateAttribute(info.name.clone()));
            }
        }
        Ok(CogCatalog { cogs, by_name })
    }

    pub fn get(&self, name: &str) -> Option<&CogInfo> {
        self.by_name.get(name).map(|&i| &self.cogs[i])
    }

    /// Position of the attribute in catalog order.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CogInfo> {
        self.cogs.iter()
    }

    pub fn len(&self) -> usize {
        self.cogs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cogs.is_empty()
    }
}

impl TryFrom<Vec<CogInfo>> for CogCatalog {
    type Error = DataError;

    fn try_from(cogs: Vec<CogInfo>) -> Result<Self, Self::Error> {
        CogCatalog::new(cogs)
    }
}

impl From<CogCatalog> for Vec<CogInfo> {
    fn from(catalog: CogCatalog) -> Self {
        catalog.cogs
    }
}
