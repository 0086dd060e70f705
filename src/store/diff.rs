//! Day-over-day comparison of one country.
//!
//! Compares a country record with the same country on an earlier date:
//! - counter deltas for tested, sick, recovered and dead
//! - per-region deltas, classified as grew, shrank, unchanged or gone
//!
//! Anything missing on the earlier date defaults to the later value, so the
//! first recorded day shows zero deltas instead of the whole count.

use crate::record::{CountryRecord, RegionValue};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffType {
    Grew,
    Shrank,
    Unchanged,
    Gone,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RegionDelta {
    pub name: String,
    pub old_count: u64,
    pub new_count: u64,
    pub delta: i64,
    pub diff_type: DiffType,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CounterDeltas {
    pub tested: i64,
    pub sick: i64,
    pub recovered: i64,
    pub dead: i64,
}

#[derive(Debug, Clone)]
pub struct CountryDelta {
    pub name: String,
    pub counters: CounterDeltas,
    /// Regions of the later record in their stored order, then gone regions.
    pub regions: Vec<RegionDelta>,
}

impl CountryDelta {
    pub fn region(&self, name: &str) -> Option<&RegionDelta> {
        self.regions.iter().find(|r| r.name == name)
    }
}

fn delta(new: u64, old: u64) -> i64 {
    let new = i64::try_from(new).unwrap_or(i64::MAX);
    let old = i64::try_from(old).unwrap_or(i64::MAX);
    new.saturating_sub(old)
}

/// Compare `today` with `yesterday`, treating a missing yesterday as equal to today.
pub fn compare_country(today: &CountryRecord, yesterday: Option<&CountryRecord>) -> CountryDelta {
    let yesterday = yesterday.unwrap_or(today);

    let counters = CounterDeltas {
        tested: delta(today.tested, yesterday.tested),
        sick: delta(today.sick, yesterday.sick),
        recovered: delta(today.recovered, yesterday.recovered),
        dead: delta(today.dead, yesterday.dead),
    };

    let mut regions = Vec::with_capacity(today.regions.len());

    for (name, new_count) in today.region_counts() {
        let old_count = yesterday
            .regions
            .get(name)
            .and_then(RegionValue::count)
            .unwrap_or(new_count);
        let d = delta(new_count, old_count);

        let diff_type = match d {
            d if d > 0 => DiffType::Grew,
            d if d < 0 => DiffType::Shrank,
            _ => DiffType::Unchanged,
        };

        regions.push(RegionDelta {
            name: name.to_string(),
            old_count,
            new_count,
            delta: d,
            diff_type,
        });
    }

    for (name, old_count) in yesterday.region_counts() {
        if !today.regions.contains_key(name) {
            regions.push(RegionDelta {
                name: name.to_string(),
                old_count,
                new_count: 0,
                delta: -i64::try_from(old_count).unwrap_or(i64::MAX),
                diff_type: DiffType::Gone,
            });
        }
    }

    CountryDelta {
        name: today.name.clone(),
        counters,
        regions,
    }
}
