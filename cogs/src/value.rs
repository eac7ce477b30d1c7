//! FILENAME: cogs/src/value.rs
//! PURPOSE: Defines the scalar value held by one cognostic of one panel.
//! CONTEXT: `CogValue` is interned, hashed and sorted by the filter index, so
//! unlike a plain f64-carrying enum it implements `Eq`, `Hash` and `Ord`.
//! It maps one-to-one onto JSON scalars (null, number, string, bool).

use std::cmp::Ordering;
use std::fmt;
use serde::{Deserialize, Serialize};

/// Wrapper around f64 that implements Eq, Hash and Ord.
/// NaN values are treated as equal to each other and sort after all numbers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderedFloat(pub f64);

impl PartialEq for OrderedFloat {
    fn eq(&self, other: &Self) -> bool {
        if self.0.is_nan() && other.0.is_nan() {
            true
        } else {
            self.0 == other.0
        }
    }
}

impl Eq for OrderedFloat {}

impl std::hash::Hash for OrderedFloat {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        if self.0.is_nan() {
            u64::MAX.hash(state);
        } else if self.0 == 0.0 {
            // -0.0 == 0.0, so both must hash alike
            0u64.hash(state);
        } else {
            self.0.to_bits().hash(state);
        }
    }
}

impl PartialOrd for OrderedFloat {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OrderedFloat {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.0.is_nan(), other.0.is_nan()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => self.0.partial_cmp(&other.0).unwrap_or(Ordering::Equal),
        }
    }
}

impl OrderedFloat {
    pub fn as_f64(&self) -> f64 {
        self.0
    }
}

/// The value of a single cognostic for a single panel.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CogValue {
    Empty,
    Number(OrderedFloat),
    Text(String),
    Boolean(bool),
}

impl CogValue {
    pub fn text(s: impl Into<String>) -> Self {
        CogValue::Text(s.into())
    }

    pub fn number(n: f64) -> Self {
        CogValue::Number(OrderedFloat(n))
    }

    /// Returns the numeric payload, if any. NaN counts as missing.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CogValue::Number(n) if !n.0.is_nan() => Some(n.0),
            _ => None,
        }
    }

    /// True for `Empty` and for NaN numbers.
    pub fn is_missing(&self) -> bool {
        match self {
            CogValue::Empty => true,
            CogValue::Number(n) => n.0.is_nan(),
            _ => false,
        }
    }

    fn variant_rank(&self) -> u8 {
        match self {
            CogValue::Empty => 0,
            CogValue::Number(_) => 1,
            CogValue::Text(_) => 2,
            CogValue::Boolean(_) => 3,
        }
    }
}

impl PartialOrd for CogValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Empty < Number < Text < Boolean; within a variant, natural order.
impl Ord for CogValue {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (CogValue::Number(a), CogValue::Number(b)) => a.cmp(b),
            (CogValue::Text(a), CogValue::Text(b)) => a.cmp(b),
            (CogValue::Boolean(a), CogValue::Boolean(b)) => a.cmp(b),
            _ => self.variant_rank().cmp(&other.variant_rank()),
        }
    }
}

impl fmt::Display for CogValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CogValue::Empty => write!(f, "(blank)"),
            CogValue::Number(n) if n.0.is_nan() => write!(f, "(blank)"),
            CogValue::Number(n) => write!(f, "{}", n.0),
            CogValue::Text(s) => write!(f, "{}", s),
            CogValue::Boolean(b) => write!(f, "{}", b),
        }
    }
}

impl From<f64> for CogValue {
    fn from(value: f64) -> Self {
        CogValue::number(value)
    }
}

impl From<i64> for CogValue {
    fn from(value: i64) -> Self {
        CogValue::number(value as f64)
    }
}

impl From<bool> for CogValue {
    fn from(value: bool) -> Self {
        CogValue::Boolean(value)
    }
}

impl From<&str> for CogValue {
    fn from(value: &str) -> Self {
        CogValue::Text(value.to_string())
    }
}

impl From<String> for CogValue {
    fn from(value: String) -> Self {
        CogValue::Text(value)
    }
}

impl<T: Into<CogValue>> From<Option<T>> for CogValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(CogValue::Empty, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orders_across_variants() {
        let mut values = vec![
            CogValue::Boolean(false),
            CogValue::text("b"),
            CogValue::number(3.0),
            CogValue::Empty,
            CogValue::text("a"),
            CogValue::number(-1.0),
        ];
        values.sort();
        assert_eq!(
            values,
            vec![
                CogValue::Empty,
                CogValue::number(-1.0),
                CogValue::number(3.0),
                CogValue::text("a"),
                CogValue::text("b"),
                CogValue::Boolean(false),
            ]
        );
    }

    #[test]
    fn nan_is_missing_and_sorts_last_among_numbers() {
        let nan = CogValue::number(f64::NAN);
        assert!(nan.is_missing());
        assert_eq!(nan, CogValue::number(f64::NAN));
        assert!(nan > CogValue::number(f64::MAX));
        assert_eq!(nan.as_f64(), None);
    }

    #[test]
    fn signed_zero_hashes_alike() {
        use std::collections::HashSet;
        let mut set = HashSet::new();
        set.insert(CogValue::number(0.0));
        assert!(set.contains(&CogValue::number(-0.0)));
    }

    #[test]
    fn deserializes_json_scalars() {
        let values: Vec<CogValue> =
            serde_json::from_str(r#"[null, 4, 2.5, "x", true]"#).unwrap();
        assert_eq!(
            values,
            vec![
                CogValue::Empty,
                CogValue::number(4.0),
                CogValue::number(2.5),
                CogValue::text("x"),
                CogValue::Boolean(true),
            ]
        );
    }

    #[test]
    fn displays_labels() {
        assert_eq!(CogValue::number(6.0).to_string(), "6");
        assert_eq!(CogValue::number(0.25).to_string(), "0.25");
        assert_eq!(CogValue::Empty.to_string(), "(blank)");
        assert_eq!(CogValue::from(Some("A")).to_string(), "A");
    }
}
