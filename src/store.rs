//! Key-value persistence port for the last reading position.

use std::collections::BTreeMap;

/// A persisted scalar.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StoredValue {
    Int(i64),
    Double(f64),
}

impl StoredValue {
    /// Integer view; doubles are truncated only when they hold a whole number.
    pub fn as_int(self) -> Option<i64> {
        match self {
            StoredValue::Int(value) => Some(value),
            StoredValue::Double(value) if value.fract() == 0.0 && value.is_finite() => {
                Some(value as i64)
            }
            StoredValue::Double(_) => None,
        }
    }

    pub fn as_double(self) -> Option<f64> {
        match self {
            StoredValue::Int(value) => Some(value as f64),
            StoredValue::Double(value) => Some(value),
        }
    }
}

/// Storage hooks for reading positions.
///
/// Implementations swallow their own I/O failures: a failed write leaves the
/// previous value in place and a failed read looks like a missing key.
pub trait ProgressStore {
    fn get(&self, key: &str) -> Option<StoredValue>;

    fn set(&mut self, key: &str, value: StoredValue);
}

impl<T: ProgressStore + ?Sized> ProgressStore for &mut T {
    fn get(&self, key: &str) -> Option<StoredValue> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: StoredValue) {
        (**self).set(key, value)
    }
}

/// Key holding the last displayed spine index of a publication.
pub fn last_document_key(publication_id: &str) -> String {
    format!("{}-lastDocument", publication_id)
}

/// Key holding the last document progression of a publication.
pub fn document_progression_key(publication_id: &str) -> String {
    format!("{}-documentProgression", publication_id)
}

/// In-memory store, mostly for tests and hosts without persistence.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    values: BTreeMap<String, StoredValue>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl ProgressStore for MemoryStore {
    fn get(&self, key: &str) -> Option<StoredValue> {
        self.values.get(key).copied()
    }

    fn set(&mut self, key: &str, value: StoredValue) {
        self.values.insert(key.into(), value);
    }
}
