//! Insertion-ordered map from record identifier to `AttorneyRecord`.
//!
//! Serialized as a plain JSON object whose key order is the order records
//! were first seen. Re-inserting a known identifier is a no-op.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;

use super::attorney::AttorneyRecord;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordSet {
    entries: Vec<(String, AttorneyRecord)>,
    index: HashMap<String, usize>,
}

impl RecordSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&AttorneyRecord> {
        self.index.get(id).map(|&i| &self.entries[i].1)
    }

    /// Insert unless `id` is already present. Returns whether it was inserted.
    pub fn insert_if_absent(&mut self, id: impl Into<String>, record: AttorneyRecord) -> bool {
        let id = id.into();
        if self.index.contains_key(&id) {
            return false;
        }
        self.index.insert(id.clone(), self.entries.len());
        self.entries.push((id, record));
        true
    }

    /// Union `other` into `self`, keeping existing entries. Returns the number added.
    pub fn absorb(&mut self, other: RecordSet) -> usize {
        let mut added = 0;
        for (id, record) in other.entries {
            if self.insert_if_absent(id, record) {
                added += 1;
            }
        }
        added
    }

    /// Keep only the first `n` records.
    pub fn truncate(&mut self, n: usize) {
        if n >= self.entries.len() {
            return;
        }
        for (id, _) in self.entries.drain(n..) {
            self.index.remove(&id);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttorneyRecord)> {
        self.entries.iter().map(|(id, r)| (id.as_str(), r))
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(id, _)| id.as_str())
    }
}

impl IntoIterator for RecordSet {
    type Item = (String, AttorneyRecord);
    type IntoIter = std::vec::IntoIter<(String, AttorneyRecord)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl FromIterator<(String, AttorneyRecord)> for RecordSet {
    fn from_iter<T: IntoIterator<Item = (String, AttorneyRecord)>>(iter: T) -> Self {
        let mut set = Self::new();
        for (id, record) in iter {
            set.insert_if_absent(id, record);
        }
        set
    }
}

impl Serialize for RecordSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (id, record) in &self.entries {
            map.serialize_entry(id, record)?;
        }
        map.end()
    }
}

struct RecordSetVisitor;

impl<'de> Visitor<'de> for RecordSetVisitor {
    type Value = RecordSet;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a JSON object mapping record identifiers to records")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut set = RecordSet::new();
        while let Some((id, record)) = access.next_entry::<String, AttorneyRecord>()? {
            set.insert_if_absent(id, record);
        }
        Ok(set)
    }
}

impl<'de> Deserialize<'de> for RecordSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(RecordSetVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(id: &str, name: &str) -> AttorneyRecord {
        AttorneyRecord {
            name: name.to_string(),
            ..AttorneyRecord::with_identity(id, "")
        }
    }

    #[test]
    fn first_seen_wins() {
        let mut set = RecordSet::new();
        assert!(set.insert_if_absent("x", rec("x", "first")));
        assert!(!set.insert_if_absent("x", rec("x", "second")));
        assert_eq!(set.get("x").map(|r| r.name.as_str()), Some("first"));
    }

    #[test]
    fn json_keeps_insertion_order() {
        let mut set = RecordSet::new();
        set.insert_if_absent("zeta", rec("zeta", "Z"));
        set.insert_if_absent("alpha", rec("alpha", "A"));
        let json = serde_json::to_string(&set).expect("serialize");
        assert!(json.find("\"zeta\"") < json.find("\"alpha\""));

        let back: RecordSet = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back.ids().collect::<Vec<_>>(), vec!["zeta", "alpha"]);
    }

    #[test]
    fn truncate_drops_tail_and_index() {
        let mut set: RecordSet = ["a", "b", "c"]
            .into_iter()
            .map(|id| (id.to_string(), rec(id, id)))
            .collect();
        set.truncate(2);
        assert_eq!(set.len(), 2);
        assert!(!set.contains("c"));
        assert!(set.insert_if_absent("c", rec("c", "again")));
    }

    #[test]
    fn absorb_counts_only_new() {
        let mut a: RecordSet = [("1".to_string(), rec("1", "a1"))].into_iter().collect();
        let b: RecordSet = [
            ("1".to_string(), rec("1", "b1")),
            ("2".to_string(), rec("2", "b2")),
        ]
        .into_iter()
        .collect();
        assert_eq!(a.absorb(b), 1);
        assert_eq!(a.get("1").map(|r| r.name.as_str()), Some("a1"));
    }
}
