//! Decoding of the VirusTotal v2 domain report.
//!
//! Only the `undetected_urls` section is modelled. Each entry in that section
//! is a heterogeneous array such as
//! `["http://example.com/a", "2c5e...", 0, 67, "2024-05-01 10:00:00"]`,
//! and only the leading URL string is kept.
//!
//! Entries are filtered leniently: a record whose first element is missing
//! or is not a string is dropped on its own, and the rest of the report is
//! still used.

use serde::Deserialize;
use serde_json::Value;

/// Subset of the domain report this crate consumes.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DomainReport {
    /// Raw undetected-URL records, in service order.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub undetected_urls: Vec<Value>,
}

impl DomainReport {
    /// Parse a report body.
    pub fn from_json(body: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(body)
    }

    /// URLs of every well-formed record, order and duplicates preserved.
    pub fn undetected_urls(&self) -> Vec<String> {
        self.undetected_urls
            .iter()
            .filter_map(record_url)
            .map(str::to_string)
            .collect()
    }
}

/// URL of a single undetected-URL record.
///
/// A record qualifies when it is an array whose first element is present
/// and is a JSON string. Any other shape yields `None`.
pub fn record_url(record: &Value) -> Option<&str> {
    record.as_array()?.first()?.as_str()
}

/// Decode a report body straight into its undetected URLs.
pub fn parse_undetected_urls(body: &str) -> Result<Vec<String>, serde_json::Error> {
    Ok(DomainReport::from_json(body)?.undetected_urls())
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default())
}
