//! Sources of country records.
//!
//! A source produces one country record per update cycle. Region counts
//! arrive as raw cells (text the way it comes off a page, or JSON values from
//! a hand-edited file) and are parsed according to the source's [`RegionPolicy`].

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::record::CountryRecord;

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("unexpected layout in {}: {message}", .path.display())]
    Layout { path: PathBuf, message: String },

    #[error("record from {0} has no name")]
    Unnamed(String),

    #[error("region \"{region}\" has no usable count in \"{text}\"")]
    Region { region: String, text: String },
}

/// What to do with a region cell that does not hold a count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegionPolicy {
    /// Drop the region with a warning and keep the rest of the record.
    Skip,
    /// Fail the whole source for this cycle.
    #[default]
    Abort,
}

/// One region cell as the source delivered it.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// Free text such as "1 234"; separators are dropped before parsing.
    Text(String),
    /// A JSON value, usable only as a non-negative integer.
    Json(Value),
}

impl Cell {
    pub fn count(&self) -> Option<u64> {
        match self {
            Cell::Text(text) => parse_count(text),
            Cell::Json(value) => value.as_u64(),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Text(text) => f.write_str(text),
            Cell::Json(value) => write!(f, "{value}"),
        }
    }
}

impl From<&str> for Cell {
    fn from(text: &str) -> Self {
        Cell::Text(text.to_string())
    }
}

impl From<Value> for Cell {
    fn from(value: Value) -> Self {
        match value {
            Value::String(text) => Cell::Text(text),
            other => Cell::Json(other),
        }
    }
}

/// A country record whose regions have not been parsed yet.
#[derive(Debug, Clone)]
pub struct RawRecord {
    pub record: CountryRecord,
    pub regions: Vec<(String, Cell)>,
}

pub trait Source {
    fn name(&self) -> &str;

    fn region_policy(&self) -> RegionPolicy {
        RegionPolicy::Abort
    }

    fn fetch(&self) -> Result<RawRecord, SourceError>;
}

/// Keep only the digits of `text` and parse them, so "1 234" and "1,234" both read as 1234.
pub fn parse_count(text: &str) -> Option<u64> {
    let digits: String = text.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

/// Turn a raw record into a storable one, applying `policy` to bad region cells.
pub fn normalize(
    source: &str,
    raw: RawRecord,
    policy: RegionPolicy,
) -> Result<CountryRecord, SourceError> {
    let RawRecord { mut record, regions } = raw;

    if record.name.trim().is_empty() {
        return Err(SourceError::Unnamed(source.to_string()));
    }

    for (region, cell) in regions {
        match cell.count() {
            Some(count) => {
                record.regions.insert(region, count.into());
            }
            None => match policy {
                RegionPolicy::Skip => {
                    warn!(source, region = %region, cell = %cell, "skipping unparseable region");
                }
                RegionPolicy::Abort => {
                    return Err(SourceError::Region {
                        region,
                        text: cell.to_string(),
                    })
                }
            },
        }
    }

    Ok(record)
}

/// Country record kept by hand in a JSON file.
///
/// Same layout as a record in the store, except that region values may be
/// strings as well as numbers. Numbers must be non-negative integers.
pub struct FileSource {
    path: PathBuf,
    name: String,
    policy: RegionPolicy,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>, policy: RegionPolicy) -> Self {
        let path = path.into();
        let name = path.display().to_string();
        FileSource { path, name, policy }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Source for FileSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn region_policy(&self) -> RegionPolicy {
        self.policy
    }

    fn fetch(&self) -> Result<RawRecord, SourceError> {
        let text = fs::read_to_string(&self.path).map_err(|source| SourceError::Io {
            path: self.path.clone(),
            source,
        })?;

        let mut value: Value = serde_json::from_str(&text).map_err(|source| SourceError::Parse {
            path: self.path.clone(),
            source,
        })?;

        let Some(object) = value.as_object_mut() else {
            return Err(SourceError::Layout {
                path: self.path.clone(),
                message: "top level is not an object".to_string(),
            });
        };

        let regions = match object.remove("Regions") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Object(map)) => map
                .into_iter()
                .map(|(region, cell)| (region, Cell::from(cell)))
                .collect(),
            Some(_) => {
                return Err(SourceError::Layout {
                    path: self.path.clone(),
                    message: "\"Regions\" is not an object".to_string(),
                });
            }
        };

        let record: CountryRecord = serde_json::from_value(value).map_err(|source| SourceError::Parse {
            path: self.path.clone(),
            source,
        })?;

        Ok(RawRecord { record, regions })
    }
}
