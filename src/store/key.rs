//! Composite keys addressing a day, a country within a day, or a region
//! within a country.

use chrono::NaiveDate;

use crate::record::{CountryRecord, DayRecord};

/// Format of the date component as it appears in the store file.
pub const DATE_KEY_FORMAT: &str = "%d %b %Y";

pub fn date_key(date: NaiveDate) -> String {
    date.format(DATE_KEY_FORMAT).to_string()
}

pub fn parse_date_key(key: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(key, DATE_KEY_FORMAT).ok()
}

/// Position in the store. The date is mandatory for every read and write;
/// `Key::default()` is the keyless value and is rejected by the store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Key {
    date: Option<String>,
    country: Option<String>,
    region: Option<String>,
}

impl Key {
    pub fn date(date: impl Into<String>) -> Self {
        Key {
            date: Some(date.into()),
            ..Default::default()
        }
    }

    pub fn on(date: NaiveDate) -> Self {
        Key::date(date_key(date))
    }

    pub fn country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// The date component, None when absent or empty.
    pub fn date_part(&self) -> Option<&str> {
        self.date.as_deref().filter(|d| !d.is_empty())
    }

    pub fn country_part(&self) -> Option<&str> {
        self.country.as_deref().filter(|c| !c.is_empty())
    }

    pub fn region_part(&self) -> Option<&str> {
        self.region.as_deref().filter(|r| !r.is_empty())
    }

    pub(crate) fn level(&self) -> Level {
        match (self.country_part(), self.region_part()) {
            (None, _) => Level::Day,
            (Some(_), None) => Level::Country,
            (Some(_), Some(_)) => Level::Region,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Level {
    Day,
    Country,
    Region,
}

impl Level {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Level::Day => "day",
            Level::Country => "country",
            Level::Region => "region",
        }
    }
}

/// A value stored at some key.
#[derive(Debug, Clone, PartialEq)]
pub enum Entry {
    Day(DayRecord),
    Country(CountryRecord),
    Region(u64),
}

impl Entry {
    pub(crate) fn level(&self) -> Level {
        match self {
            Entry::Day(_) => Level::Day,
            Entry::Country(_) => Level::Country,
            Entry::Region(_) => Level::Region,
        }
    }

    pub fn into_day(self) -> Option<DayRecord> {
        match self {
            Entry::Day(day) => Some(day),
            _ => None,
        }
    }

    pub fn into_country(self) -> Option<CountryRecord> {
        match self {
            Entry::Country(record) => Some(record),
            _ => None,
        }
    }

    pub fn into_region(self) -> Option<u64> {
        match self {
            Entry::Region(count) => Some(count),
            _ => None,
        }
    }
}

impl From<DayRecord> for Entry {
    fn from(day: DayRecord) -> Self {
        Entry::Day(day)
    }
}

impl From<CountryRecord> for Entry {
    fn from(record: CountryRecord) -> Self {
        Entry::Country(record)
    }
}

impl From<u64> for Entry {
    fn from(count: u64) -> Self {
        Entry::Region(count)
    }
}
