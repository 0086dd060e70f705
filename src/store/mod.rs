//! Dated snapshot store.
//!
//! Keeps every recorded day in memory as date -> country -> record and
//! persists the whole mapping to one JSON file:
//! - loaded fully on open, with a byte-for-byte `.backup` of what was read
//! - point reads and writes addressed by a composite [`Key`]
//! - written back fully on close, 4-space indented, non-ASCII kept literal
//!
//! The handle is opened once per command. `close` flushes explicitly;
//! dropping an unclosed handle flushes as well.

pub mod diff;
pub mod error;
pub mod history;
pub mod key;

use std::ffi::OsString;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::prompt::Prompt;
use crate::record::{CountryRecord, DayRecord, RegionValue};
pub use error::StoreError;
pub use key::{date_key, parse_date_key, Entry, Key};
use key::Level;

/// Database handle. Open once per command, reuse across all operations.
#[derive(Debug)]
pub struct SnapshotStore {
    path: PathBuf,
    days: IndexMap<String, DayRecord>,
    auto_save: bool,
    closed: bool,
}

impl SnapshotStore {
    /// Load the store file at `path`.
    ///
    /// On success the bytes that were read are copied to `<path>.backup`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();

        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                error!(path = %path.display(), "store file does not exist");
                return Err(StoreError::Missing { path });
            }
            Err(source) => return Err(StoreError::Io { path, source }),
        };

        let days: IndexMap<String, DayRecord> = match serde_json::from_slice(&bytes) {
            Ok(days) => days,
            Err(source) => {
                error!(path = %path.display(), "failed to load store, write-back disabled");
                return Err(StoreError::Corrupt { path, source });
            }
        };

        let backup = backup_path(&path);
        fs::write(&backup, &bytes).map_err(|source| StoreError::Io {
            path: backup.clone(),
            source,
        })?;
        debug!(backup = %backup.display(), "store backup written");

        info!(path = %path.display(), dates = days.len(), "store loaded");

        Ok(SnapshotStore {
            path,
            days,
            auto_save: true,
            closed: false,
        })
    }

    /// Start an empty store bound to `path`. Nothing is written until the
    /// first save. Refuses to take over an existing file.
    pub fn create(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();

        if path.exists() {
            return Err(StoreError::Exists { path });
        }

        info!(path = %path.display(), "created empty store");

        Ok(SnapshotStore {
            path,
            days: IndexMap::new(),
            auto_save: true,
            closed: false,
        })
    }

    /// Open `path`, asking whether to create an empty store when the file
    /// is missing. `create_default` is the answer used when nobody can be asked.
    pub fn open_or_create(
        path: impl AsRef<Path>,
        prompt: &dyn Prompt,
        create_default: bool,
    ) -> Result<Self, StoreError> {
        match Self::open(path.as_ref()) {
            Err(StoreError::Missing { path }) => {
                if prompt.approve("Create the store", create_default) {
                    Self::create(path)
                } else {
                    error!("refusing to run without a store");
                    Err(StoreError::Refused { path })
                }
            }
            other => other,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn auto_save(&self) -> bool {
        self.auto_save
    }

    /// Stop `close` and drop from writing the file back.
    pub fn disable_auto_save(&mut self) {
        self.auto_save = false;
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Write `value` at `key`, replacing whatever was there.
    pub fn update(&mut self, key: &Key, value: impl Into<Entry>) -> Result<(), StoreError> {
        let value = value.into();

        let Some(date) = key.date_part() else {
            error!("key \"date\" is mandatory");
            return Err(StoreError::InvalidKey);
        };

        let level = key.level();
        if value.level() != level {
            return Err(StoreError::ValueShape {
                expected: level.as_str(),
                found: value.level().as_str(),
            });
        }

        match (value, key.country_part(), key.region_part()) {
            (Entry::Day(day), _, _) => {
                self.days.insert(date.to_string(), day);
                debug!(date, "day updated");
            }
            (Entry::Country(record), Some(country), _) => {
                self.days
                    .entry(date.to_string())
                    .or_default()
                    .insert(country.to_string(), record);
                debug!(date, country, "country updated");
            }
            (Entry::Region(count), Some(country), Some(region)) => {
                let record = self
                    .days
                    .entry(date.to_string())
                    .or_default()
                    .entry(country.to_string())
                    .or_insert_with(|| CountryRecord::new(country));
                record.regions.insert(region.to_string(), count.into());
                debug!(date, country, region, "region updated");
            }
            (value, _, _) => {
                return Err(StoreError::ValueShape {
                    expected: level.as_str(),
                    found: value.level().as_str(),
                });
            }
        }

        Ok(())
    }

    /// Read the value at `key`, or `default` when any level is absent.
    pub fn get(&self, key: &Key, default: Option<Entry>) -> Result<Option<Entry>, StoreError> {
        let Some(date) = key.date_part() else {
            error!("key \"date\" is mandatory");
            return Err(StoreError::InvalidKey);
        };

        let Some(day) = self.days.get(date) else {
            return Ok(default);
        };

        let Some(country) = key.country_part() else {
            return Ok(Some(Entry::Day(day.clone())));
        };

        let Some(record) = day.get(country) else {
            return Ok(default);
        };

        if key.level() == Level::Country {
            return Ok(Some(Entry::Country(record.clone())));
        }

        let found = key
            .region_part()
            .and_then(|region| record.regions.get(region))
            .and_then(RegionValue::count)
            .map(Entry::Region);

        Ok(found.or(default))
    }

    pub fn day(&self, date: &str) -> Option<&DayRecord> {
        self.days.get(date)
    }

    pub fn country(&self, date: &str, country: &str) -> Option<&CountryRecord> {
        self.days.get(date)?.get(country)
    }

    pub fn region(&self, date: &str, country: &str, region: &str) -> Option<u64> {
        self.country(date, country)?.regions.get(region)?.count()
    }

    /// Every known date, in the order it was first written.
    pub fn list_dates(&self) -> Vec<&str> {
        self.days.keys().map(String::as_str).collect()
    }

    /// Write the whole store to its path. Runs whether or not auto-save is
    /// enabled; auto-save only governs `close` and drop.
    ///
    /// Goes through `<path>.tmp` and a rename so the previous file stays
    /// intact if the write is interrupted.
    pub fn save(&self) -> Result<(), StoreError> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.days.serialize(&mut serializer)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        let tmp = sibling_path(&self.path, ".tmp");
        fs::write(&tmp, &buf).map_err(|source| StoreError::Io {
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, &self.path).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })?;

        info!(path = %self.path.display(), dates = self.days.len(), "store saved");
        Ok(())
    }

    /// Flush and release the handle.
    pub fn close(mut self) -> Result<(), StoreError> {
        self.closed = true;
        if self.auto_save {
            self.save()
        } else {
            debug!(path = %self.path.display(), "auto-save disabled, store not written");
            Ok(())
        }
    }
}

impl Drop for SnapshotStore {
    fn drop(&mut self) {
        if self.closed || !self.auto_save {
            return;
        }

        warn!(path = %self.path.display(), "store dropped without close, flushing");
        if let Err(e) = self.save() {
            error!("failed to save store: {e}");
        }
    }
}

/// `<path>.backup`
pub fn backup_path(path: &Path) -> PathBuf {
    sibling_path(path, ".backup")
}

fn sibling_path(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::Unattended;
    use tempfile::TempDir;

    const DAY: &str = "01 Jan 2021";

    fn empty(dir: &TempDir) -> SnapshotStore {
        SnapshotStore::create(dir.path().join("icovid.db")).unwrap()
    }

    fn ukraine() -> CountryRecord {
        let mut record = CountryRecord::new("Ukraine");
        record.population = 43_762_985;
        record.sick = 100;
        record
    }

    #[test]
    fn country_round_trip() {
        let dir = TempDir::new().unwrap();
        let mut store = empty(&dir);
        let key = Key::date(DAY).country("Ukraine");

        store.update(&key, ukraine()).unwrap();

        assert_eq!(store.get(&key, None).unwrap(), Some(Entry::Country(ukraine())));
        store.disable_auto_save();
    }

    #[test]
    fn region_write_creates_intermediate_levels() {
        let dir = TempDir::new().unwrap();
        let mut store = empty(&dir);
        let key = Key::date(DAY).country("Ukraine").region("X");

        store.update(&key, 7u64).unwrap();

        assert_eq!(store.region(DAY, "Ukraine", "X"), Some(7));
        assert_eq!(store.country(DAY, "Ukraine").unwrap().name, "Ukraine");
        store.disable_auto_save();
    }

    #[test]
    fn day_write_replaces_the_whole_day() {
        let dir = TempDir::new().unwrap();
        let mut store = empty(&dir);
        store.update(&Key::date(DAY).country("Ukraine"), ukraine()).unwrap();

        let mut day = DayRecord::new();
        day.insert("Poland".to_string(), CountryRecord::new("Poland"));
        store.update(&Key::date(DAY), day).unwrap();

        assert!(store.country(DAY, "Ukraine").is_none());
        assert!(store.country(DAY, "Poland").is_some());
        store.disable_auto_save();
    }

    #[test]
    fn day_round_trip() {
        let dir = TempDir::new().unwrap();
        let mut store = empty(&dir);
        let key = Key::date(DAY);

        let mut day = DayRecord::new();
        day.insert("Ukraine".to_string(), ukraine());
        day.insert("Poland".to_string(), CountryRecord::new("Poland"));
        store.update(&key, day.clone()).unwrap();

        assert_eq!(store.get(&key, None).unwrap(), Some(Entry::Day(day)));
        store.disable_auto_save();
    }

    #[test]
    fn missing_date_is_rejected_and_store_unchanged() {
        let dir = TempDir::new().unwrap();
        let mut store = empty(&dir);

        let err = store.update(&Key::default().country("Ukraine"), ukraine());
        assert!(matches!(err, Err(StoreError::InvalidKey)));
        assert!(store.is_empty());

        let err = store.get(&Key::default(), Some(Entry::Region(1)));
        assert!(matches!(err, Err(StoreError::InvalidKey)));
        store.disable_auto_save();
    }

    #[test]
    fn wrong_level_value_is_rejected() {
        let dir = TempDir::new().unwrap();
        let mut store = empty(&dir);

        let err = store.update(&Key::date(DAY).country("Ukraine"), 5u64);
        assert!(matches!(
            err,
            Err(StoreError::ValueShape { expected: "country", found: "region" })
        ));
        assert!(store.is_empty());
        store.disable_auto_save();
    }

    #[test]
    fn absent_levels_return_default() {
        let dir = TempDir::new().unwrap();
        let mut store = empty(&dir);
        store.update(&Key::date(DAY).country("Ukraine"), ukraine()).unwrap();

        let fallback = Some(Entry::Region(42));
        assert_eq!(store.get(&Key::date("02 Jan 2021"), fallback.clone()).unwrap(), fallback);
        assert_eq!(store.get(&Key::date(DAY).country("Poland"), fallback.clone()).unwrap(), fallback);
        assert_eq!(
            store.get(&Key::date(DAY).country("Ukraine").region("Y"), fallback.clone()).unwrap(),
            fallback
        );
        assert_eq!(store.get(&Key::date("02 Jan 2021"), None).unwrap(), None);
        store.disable_auto_save();
    }

    #[test]
    fn zero_region_count_is_data_not_absence() {
        let dir = TempDir::new().unwrap();
        let mut store = empty(&dir);
        let key = Key::date(DAY).country("Ukraine").region("X");
        store.update(&key, 0u64).unwrap();

        assert_eq!(store.get(&key, Some(Entry::Region(9))).unwrap(), Some(Entry::Region(0)));
        store.disable_auto_save();
    }

    #[test]
    fn repeated_update_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let mut store = empty(&dir);
        let key = Key::date(DAY).country("Ukraine");

        store.update(&key, ukraine()).unwrap();
        store.update(&key, ukraine()).unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.day(DAY).unwrap().len(), 1);
        store.disable_auto_save();
    }

    #[test]
    fn rewriting_a_date_keeps_its_position() {
        let dir = TempDir::new().unwrap();
        let mut store = empty(&dir);
        for date in ["01 Jan 2021", "02 Jan 2021", "03 Jan 2021"] {
            store.update(&Key::date(date), DayRecord::new()).unwrap();
        }

        store.update(&Key::date("01 Jan 2021").country("Ukraine"), ukraine()).unwrap();

        assert_eq!(store.list_dates(), vec!["01 Jan 2021", "02 Jan 2021", "03 Jan 2021"]);
        store.disable_auto_save();
    }

    #[test]
    fn create_refuses_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("icovid.db");
        fs::write(&path, "{}").unwrap();

        assert!(matches!(SnapshotStore::create(&path), Err(StoreError::Exists { .. })));
    }

    #[test]
    fn open_or_create_follows_the_unattended_default() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("icovid.db");

        let refused = SnapshotStore::open_or_create(&path, &Unattended, false);
        assert!(matches!(refused, Err(StoreError::Refused { .. })));

        let store = SnapshotStore::open_or_create(&path, &Unattended, true).unwrap();
        assert!(store.is_empty());
        store.close().unwrap();
        assert!(path.exists());
    }

    #[test]
    fn drop_without_close_flushes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("icovid.db");

        {
            let mut store = SnapshotStore::create(&path).unwrap();
            store.update(&Key::date(DAY).country("Ukraine"), ukraine()).unwrap();
        }

        let store = SnapshotStore::open(&path).unwrap();
        assert_eq!(store.country(DAY, "Ukraine"), Some(&ukraine()));
    }

    #[test]
    fn disabled_auto_save_leaves_file_alone() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("icovid.db");

        let mut store = SnapshotStore::create(&path).unwrap();
        store.disable_auto_save();
        store.update(&Key::date(DAY), DayRecord::new()).unwrap();
        store.close().unwrap();

        assert!(!path.exists());
    }

    #[test]
    fn explicit_save_writes_with_auto_save_disabled() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("icovid.db");

        let mut store = SnapshotStore::create(&path).unwrap();
        store.disable_auto_save();
        store.update(&Key::date(DAY).country("Ukraine"), ukraine()).unwrap();
        store.save().unwrap();
        store.close().unwrap();

        let store = SnapshotStore::open(&path).unwrap();
        assert_eq!(store.country(DAY, "Ukraine"), Some(&ukraine()));
        store.close().unwrap();
    }

    #[test]
    fn backup_path_appends_suffix() {
        assert_eq!(
            backup_path(Path::new("/data/icovid.db")),
            PathBuf::from("/data/icovid.db.backup")
        );
    }
}
