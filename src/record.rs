//! Typed records kept in the snapshot store.
//!
//! A day record maps country names to country records; a country record
//! carries the counters, the display hints and the per-region counts.
//! Field names on disk follow the PascalCase layout of the store file.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Region name to case count, in the order regions were written.
pub type Regions = IndexMap<String, RegionValue>;

/// What a store file holds for one region.
///
/// Current files store a plain count. Files written by older revisions may
/// hold a whole sub-record instead; those are kept as they were read and
/// written back unchanged, but never take part in counts or deltas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RegionValue {
    Count(u64),
    Legacy(serde_json::Value),
}

impl RegionValue {
    pub fn count(&self) -> Option<u64> {
        match self {
            RegionValue::Count(count) => Some(*count),
            RegionValue::Legacy(_) => None,
        }
    }
}

impl From<u64> for RegionValue {
    fn from(count: u64) -> Self {
        RegionValue::Count(count)
    }
}

/// Country name to country record for one date.
pub type DayRecord = IndexMap<String, CountryRecord>;

/// Short notice attached to a country: the text and the icon shown next to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notice(pub String, pub String);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CountryRecord {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view_box_sz: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view_box_line_sz: Option<f64>,
    #[serde(default)]
    pub population: u64,
    #[serde(default)]
    pub area: u64,
    #[serde(default)]
    pub tested: u64,
    #[serde(default)]
    pub sick: u64,
    #[serde(default)]
    pub recovered: u64,
    #[serde(default)]
    pub dead: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub peak: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cure: Option<u8>,
    #[serde(rename = "vii", default, skip_serializing_if = "Option::is_none")]
    pub notice: Option<Notice>,
    #[serde(default)]
    pub regions: Regions,
    /// Fields this version does not know about, written back untouched.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl CountryRecord {
    pub fn new(name: impl Into<String>) -> Self {
        CountryRecord {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Regions that hold a count, in stored order.
    pub fn region_counts(&self) -> impl Iterator<Item = (&str, u64)> + '_ {
        self.regions
            .iter()
            .filter_map(|(name, value)| value.count().map(|count| (name.as_str(), count)))
    }

    /// People per square kilometre, None when the area is unknown.
    pub fn density(&self) -> Option<f64> {
        if self.area == 0 {
            None
        } else {
            Some(self.population as f64 / self.area as f64)
        }
    }
}
