//! One parsed row of command output.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Ordered field name to value mapping for one row of output
/// (one route, one neighbor, one interface).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(IndexMap<String, String>);

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.0.insert(field.into(), value.into());
    }

    /// Remove a field, keeping the order of the remaining ones.
    pub fn remove(&mut self, field: &str) -> Option<String> {
        self.0.shift_remove(field)
    }

    pub fn contains_field(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// Field names in column order.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Record
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remove_keeps_order() {
        let mut record: Record = [("network", "10.0.0.0"), ("mask", "24"), ("nexthop", "10.0.0.1")]
            .into_iter()
            .collect();
        assert_eq!(record.remove("mask").as_deref(), Some("24"));
        assert_eq!(record.fields().collect::<Vec<_>>(), vec!["network", "nexthop"]);
        assert_eq!(record.remove("mask"), None);
    }

    #[test]
    fn test_serializes_as_plain_object() {
        let record: Record = [("vlan_id", "10"), ("name", "users")].into_iter().collect();
        assert_eq!(
            serde_json::to_string(&record).unwrap(),
            r#"{"vlan_id":"10","name":"users"}"#
        );
    }
}
