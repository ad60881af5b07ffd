//! Flat attribute records and the storage trait they are written through.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::Result;

/// A single attribute value: a scalar, a 1-D array, or an array of `(row, col)` pairs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Scalar(f64),
    Array(Vec<f64>),
    Pairs(Vec<[f64; 2]>),
}

impl AttrValue {
    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            Self::Scalar(v) => Some(*v),
            Self::Array(v) if v.len() == 1 => Some(v[0]),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[f64]> {
        match self {
            Self::Array(v) => Some(v),
            Self::Pairs(v) if v.is_empty() => Some(&[]),
            _ => None,
        }
    }

    /// A `[row, col]` pair, stored either as a 2-element array or a single pair.
    pub fn as_pair(&self) -> Option<[f64; 2]> {
        match self {
            Self::Array(v) if v.len() == 2 => Some([v[0], v[1]]),
            Self::Pairs(v) if v.len() == 1 => Some(v[0]),
            _ => None,
        }
    }

    pub fn as_pairs(&self) -> Option<Vec<[f64; 2]>> {
        match self {
            Self::Pairs(v) => Some(v.clone()),
            Self::Array(v) if v.is_empty() => Some(Vec::new()),
            _ => None,
        }
    }
}

/// Flat attribute map for one stored event.
pub type Record = BTreeMap<String, AttrValue>;

/// Hierarchical key-value storage: window key, then record key, then attributes.
///
/// Implementations commit each `write_record`/`remove_record` as one unit; a
/// failure leaves earlier commits in place and never exposes a partial record.
pub trait AttributeStore {
    /// Create or overwrite `key` under `window`, creating the window if needed.
    fn write_record(&mut self, window: &str, key: &str, record: &Record) -> Result<()>;

    /// Every record under `window`, in unspecified order.
    fn read_records(&self, window: &str) -> Result<Vec<(String, Record)>>;

    /// Remove `key` from `window`. Returns whether a record was removed.
    fn remove_record(&mut self, window: &str, key: &str) -> Result<bool>;

    /// Record keys under `window`; empty if the window does not exist.
    fn record_keys(&self, window: &str) -> Result<Vec<String>>;

    /// Every window key in the store.
    fn windows(&self) -> Result<Vec<String>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_untagged_shapes() {
        let v: AttrValue = serde_json::from_str("1.5").unwrap();
        assert_eq!(v.as_scalar(), Some(1.5));

        let v: AttrValue = serde_json::from_str("[3.0, 4.0]").unwrap();
        assert_eq!(v.as_pair(), Some([3.0, 4.0]));

        let v: AttrValue = serde_json::from_str("[[1.0, 2.0], [3.0, 4.0]]").unwrap();
        assert_eq!(v.as_pairs(), Some(vec![[1.0, 2.0], [3.0, 4.0]]));

        let v: AttrValue = serde_json::from_str("[]").unwrap();
        assert_eq!(v.as_pairs(), Some(Vec::new()));
        assert_eq!(v.as_array(), Some(&[][..]));
    }
}
