//! The owner's record: an ordered, duplicate-free mapping of field name to
//! value, and the policy that partitions it into a visible and hidden set.

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A single named value in a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub value: String,
}

/// An owner's record: an ordered mapping of distinct field names to values.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Record {
    fields: indexmap::IndexMap<String, String>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a field, rejecting a name already present in the record.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> Result<()> {
        let name = name.into();
        if self.fields.contains_key(&name) {
            return Err(Error::DuplicateField(name));
        }
        self.fields.insert(name, value.into());
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Fields in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn names(&self) -> IndexSet<String> {
        self.fields.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// A new record containing only the given names, in this record's order.
    /// Names not present in the record are skipped.
    pub fn filter(&self, names: &std::collections::HashSet<String>) -> Record {
        let mut out = Record::new();
        for (name, value) in self.iter() {
            if names.contains(name) {
                out.fields.insert(name.to_string(), value.to_string());
            }
        }
        out
    }
}

/// A named partition of a record's field names, plus the capabilities a
/// token issued under it grants the delegate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Policy {
    pub id: String,
    pub visible: std::collections::HashSet<String>,
    pub hidden: std::collections::HashSet<String>,
    pub actions: Vec<String>,
}

impl Policy {
    pub fn new(
        id: impl Into<String>,
        visible: impl IntoIterator<Item = String>,
        hidden: impl IntoIterator<Item = String>,
        actions: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            id: id.into(),
            visible: visible.into_iter().collect(),
            hidden: hidden.into_iter().collect(),
            actions: actions.into_iter().collect(),
        }
    }

    /// Restrict `visible`/`hidden` to names actually present in `record`,
    /// per spec §4.5 step 3 (`V = policy.visible ∩ keys(record)`).
    pub fn partition_for(&self, record: &Record) -> (std::collections::HashSet<String>, std::collections::HashSet<String>) {
        let record_names = record.names();
        let visible: std::collections::HashSet<String> = self
            .visible
            .iter()
            .filter(|n| record_names.contains(*n))
            .cloned()
            .collect();
        let hidden: std::collections::HashSet<String> = self
            .hidden
            .iter()
            .filter(|n| record_names.contains(*n))
            .cloned()
            .collect();
        (visible, hidden)
    }

    /// Verify `visible ∪ hidden == record-keys` exactly (spec §4.5 step 4,
    /// correcting source issue #4 in §9 — coverage is required, not
    /// tolerated silently).
    pub fn check_covers(&self, record: &Record) -> Result<()> {
        let (visible, hidden) = self.partition_for(record);
        let record_names = record.names();
        let covered: std::collections::HashSet<String> =
            visible.union(&hidden).cloned().collect();

        let missing: Vec<String> = record_names
            .iter()
            .filter(|n| !covered.contains(*n))
            .cloned()
            .collect();
        let unexpected: Vec<String> = covered
            .iter()
            .filter(|n| !record_names.contains(*n))
            .cloned()
            .collect();

        if missing.is_empty() && unexpected.is_empty() {
            Ok(())
        } else {
            Err(Error::PolicyRecordMismatch { missing, unexpected })
        }
    }
}
