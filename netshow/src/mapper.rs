//! Shaping parsed records into result envelopes.
//!
//! Two policies exist. Single-object results (ARP table, interfaces,
//! VLANs) carry the records as returned. Enumerated results (CDP
//! neighbors, routes) carry a count and key every record by its 1-based
//! position, zero-padded to three digits, in parser order.
//!
//! ```rust
//! use netshow::mapper::{ResultEnvelope, ResultKind};
//! use netshow::parse::Record;
//!
//! let routes: Vec<Record> = vec![[("network", "10.0.0.0")].into_iter().collect()];
//! let envelope = ResultEnvelope::enumerated(ResultKind::Routes, "R1", routes);
//! assert_eq!(
//!     envelope.to_json().unwrap(),
//!     r#"{"device":"R1","total routes":1,"routing table":{"001":{"network":"10.0.0.0"}}}"#
//! );
//! ```

use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::error::{MapperError, Result};
use crate::parse::Record;
use crate::platform::Platform;

/// What an envelope holds. Determines its JSON keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultKind {
    ArpTable,
    Interfaces,
    Vlans,
    CdpNeighbors,
    Routes,
    Raw,
}

impl ResultKind {
    fn device_key(&self) -> &'static str {
        match self {
            ResultKind::CdpNeighbors | ResultKind::Routes => "device",
            _ => "device name",
        }
    }

    fn count_key(&self) -> &'static str {
        match self {
            ResultKind::CdpNeighbors => "total neighbors",
            ResultKind::Routes => "total routes",
            _ => "total",
        }
    }

    fn payload_key(&self) -> &'static str {
        match self {
            ResultKind::ArpTable => "arp table",
            ResultKind::Interfaces => "interfaces",
            ResultKind::Vlans => "vlans",
            ResultKind::CdpNeighbors => "cdp neighbors",
            ResultKind::Routes => "routing table",
            ResultKind::Raw => "output",
        }
    }
}

/// Body of an envelope.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(untagged)]
pub enum Payload {
    /// Records as returned by the parser.
    Records(Vec<Record>),
    /// Records keyed `"001"`, `"002"`, ... in parser order.
    Enumerated(IndexMap<String, Record>),
    /// Unparsed command output.
    Text(String),
}

/// A command result tagged with the device it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultEnvelope {
    kind: ResultKind,
    device_name: String,
    total_count: Option<usize>,
    payload: Payload,
}

impl ResultEnvelope {
    /// Records carried as-is, without a count.
    pub fn single(kind: ResultKind, device_name: impl Into<String>, records: Vec<Record>) -> Self {
        Self {
            kind,
            device_name: device_name.into(),
            total_count: None,
            payload: Payload::Records(records),
        }
    }

    /// Records keyed by position, with a count. An empty input gives a
    /// count of 0 and an empty mapping.
    pub fn enumerated(
        kind: ResultKind,
        device_name: impl Into<String>,
        records: Vec<Record>,
    ) -> Self {
        Self {
            kind,
            device_name: device_name.into(),
            total_count: Some(records.len()),
            payload: Payload::Enumerated(enumerate(records)),
        }
    }

    /// Unparsed output.
    pub fn raw(device_name: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            kind: ResultKind::Raw,
            device_name: device_name.into(),
            total_count: None,
            payload: Payload::Text(output.into()),
        }
    }

    pub fn kind(&self) -> ResultKind {
        self.kind
    }

    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    pub fn total_count(&self) -> Option<usize> {
        self.total_count
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Serialize for ResultEnvelope {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let len = if self.total_count.is_some() { 3 } else { 2 };
        let mut map = serializer.serialize_map(Some(len))?;
        map.serialize_entry(self.kind.device_key(), &self.device_name)?;
        if let Some(count) = self.total_count {
            map.serialize_entry(self.kind.count_key(), &count)?;
        }
        map.serialize_entry(self.kind.payload_key(), &self.payload)?;
        map.end()
    }
}

/// Key records `"001"`, `"002"`, ... keeping their order.
///
/// Keys widen past three digits from the 1000th record on.
pub fn enumerate(records: Vec<Record>) -> IndexMap<String, Record> {
    records
        .into_iter()
        .enumerate()
        .map(|(i, record)| (format!("{:03}", i + 1), record))
        .collect()
}

/// What a [`FieldFilter`] does when a record lacks a field it removes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MissingField {
    /// Leave the record as is.
    #[default]
    Skip,
    /// Fail with [`MapperError::FieldNotFound`].
    Fail,
}

/// Removes a fixed set of fields from every record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldFilter {
    fields: Vec<String>,
    missing: MissingField,
}

impl FieldFilter {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
            missing: MissingField::default(),
        }
    }

    /// The fields dropped by the minified routing table of `platform`.
    pub fn for_minified_routes(platform: Platform) -> Self {
        Self::new(platform.minified_route_fields().iter().copied())
    }

    pub fn with_missing(mut self, policy: MissingField) -> Self {
        self.missing = policy;
        self
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn apply(&self, records: Vec<Record>) -> std::result::Result<Vec<Record>, MapperError> {
        records
            .into_iter()
            .enumerate()
            .map(|(index, mut record)| {
                for field in &self.fields {
                    if record.remove(field).is_none() && self.missing == MissingField::Fail {
                        return Err(MapperError::FieldNotFound {
                            field: field.clone(),
                            index,
                        });
                    }
                }
                Ok(record)
            })
            .collect()
    }
}
