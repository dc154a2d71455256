//! Diagnostics returned by learners after each update.
//!
//! A [`Record`] is a set of named values, e.g. the TD error of a critic or
//! whether a network was trained during the step. The driver decides what
//! to do with it; the learners never write to a global logger.
//!
//! ```rust
//! use lincon_core::record::{Record, RecordValue};
//!
//! let mut record = Record::from_scalar("td_error", 0.25);
//! record.insert("weights", RecordValue::Array1(vec![0.0, 1.0]));
//! assert_eq!(record.get_scalar("td_error").unwrap(), 0.25);
//! ```
use crate::error::LinconError;
use std::collections::{
    hash_map::{IntoIter, Iter, Keys},
    HashMap,
};

/// Values that can be stored in a [`Record`].
#[derive(Debug, Clone, PartialEq)]
pub enum RecordValue {
    /// A single value, typically a TD error or a learning gain.
    Scalar(f64),

    /// A 1-dimensional array.
    Array1(Vec<f64>),

    /// A text value.
    String(String),
}

/// A container of named [`RecordValue`]s.
#[derive(Debug, Default, Clone)]
pub struct Record(HashMap<String, RecordValue>);

impl Record {
    /// Creates an empty record.
    pub fn empty() -> Self {
        Self(HashMap::new())
    }

    /// Creates a record containing a single scalar value.
    pub fn from_scalar(name: impl Into<String>, value: f64) -> Self {
        Self(HashMap::from([(name.into(), RecordValue::Scalar(value))]))
    }

    /// Creates a record from a slice of key-value pairs.
    pub fn from_slice<K: Into<String> + Clone>(s: &[(K, RecordValue)]) -> Self {
        Self(
            s.iter()
                .map(|(k, v)| (k.clone().into(), v.clone()))
                .collect(),
        )
    }

    /// Returns an iterator over the keys in the record.
    pub fn keys(&self) -> Keys<String, RecordValue> {
        self.0.keys()
    }

    /// Inserts a key-value pair into the record.
    pub fn insert(&mut self, k: impl Into<String>, v: RecordValue) {
        self.0.insert(k.into(), v);
    }

    /// Returns an iterator over the key-value pairs in the record.
    pub fn iter(&self) -> Iter<'_, String, RecordValue> {
        self.0.iter()
    }

    /// Returns an iterator that consumes the record.
    pub fn into_iter_in_record(self) -> IntoIter<String, RecordValue> {
        self.0.into_iter()
    }

    /// Gets a reference to the value associated with the given key.
    pub fn get(&self, k: &str) -> Option<&RecordValue> {
        self.0.get(k)
    }

    /// Merges two records, consuming both.
    ///
    /// Values of `record` overwrite those of `self` with the same key.
    pub fn merge(self, record: Record) -> Self {
        Record(self.0.into_iter().chain(record.0).collect())
    }

    /// Merges another record into this one in place.
    pub fn merge_inplace(&mut self, record: Record) {
        for (k, v) in record.0.into_iter() {
            self.0.insert(k, v);
        }
    }

    /// Gets a scalar value from the record.
    pub fn get_scalar(&self, k: &str) -> Result<f64, LinconError> {
        match self.0.get(k) {
            Some(RecordValue::Scalar(v)) => Ok(*v),
            Some(_) => Err(LinconError::RecordValueTypeError("Scalar".to_string())),
            None => Err(LinconError::RecordKeyError(k.to_string())),
        }
    }

    /// Gets a 1-dimensional array from the record.
    pub fn get_array1(&self, k: &str) -> Result<Vec<f64>, LinconError> {
        match self.0.get(k) {
            Some(RecordValue::Array1(v)) => Ok(v.clone()),
            Some(_) => Err(LinconError::RecordValueTypeError("Array1".to_string())),
            None => Err(LinconError::RecordKeyError(k.to_string())),
        }
    }

    /// Gets a string value from the record.
    pub fn get_string(&self, k: &str) -> Result<String, LinconError> {
        match self.0.get(k) {
            Some(RecordValue::String(s)) => Ok(s.clone()),
            Some(_) => Err(LinconError::RecordValueTypeError("String".to_string())),
            None => Err(LinconError::RecordKeyError(k.to_string())),
        }
    }

    /// Returns `true` if the record contains no values.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_overwrites() {
        let r1 = Record::from_slice(&[
            ("td_error", RecordValue::Scalar(1.0)),
            ("name", RecordValue::String("critic".to_string())),
        ]);
        let r2 = Record::from_scalar("td_error", -2.0);
        let r = r1.merge(r2);
        assert_eq!(r.get_scalar("td_error").unwrap(), -2.0);
        assert_eq!(r.get_string("name").unwrap(), "critic");
    }

    #[test]
    fn test_typed_getters() {
        let record = Record::from_scalar("td_error", 0.5);
        assert_eq!(
            record.get_array1("td_error"),
            Err(LinconError::RecordValueTypeError("Array1".to_string()))
        );
        assert_eq!(
            record.get_scalar("missing"),
            Err(LinconError::RecordKeyError("missing".to_string()))
        );
    }
}
