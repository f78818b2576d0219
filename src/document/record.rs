//! Document record
//!
//! A string-keyed, string-valued record identified by its `_id` field.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::ID_FIELD;

/// Plain field mapping supplied by callers (documents and criteria alike)
pub type Fields = BTreeMap<String, String>;

/// A stored document
///
/// `Document` is `Send + Sync`; concurrent access goes through the engine's
/// locks, and callers only ever receive clones.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    fields: Fields,
}

impl Document {
    /// Create an empty document
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field, returning the value it replaced
    ///
    /// `_id` is fixed once set: writing a different `_id` is ignored, the
    /// current value is kept, and `None` is returned since nothing was
    /// replaced.
    pub fn put(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let key = key.into();
        let value = value.into();

        if key == ID_FIELD {
            if let Some(current) = self.fields.get(ID_FIELD) {
                if *current != value {
                    return None;
                }
            }
        }

        self.fields.insert(key, value)
    }

    /// Get a field value
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// The document identifier, if present
    pub fn id(&self) -> Option<&str> {
        self.get(ID_FIELD)
    }

    /// Snapshot of all fields
    pub fn fields(&self) -> Fields {
        self.fields.clone()
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// True if every criteria field is present here with an equal value
    ///
    /// Empty criteria match every document.
    pub fn matches(&self, criteria: &Fields) -> bool {
        criteria
            .iter()
            .all(|(key, value)| self.fields.get(key) == Some(value))
    }
}

impl From<Fields> for Document {
    fn from(fields: Fields) -> Self {
        Self { fields }
    }
}

impl<K, V> FromIterator<(K, V)> for Document
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut doc = Document::new();
        for (key, value) in iter {
            doc.put(key, value);
        }
        doc
    }
}
