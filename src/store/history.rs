//! Per-country time series built from the stored dates.

use serde::Serialize;

use super::SnapshotStore;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryPoint {
    pub date: String,
    pub tested: u64,
    pub sick: u64,
    pub recovered: u64,
    pub dead: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct History {
    pub country: String,
    pub points: Vec<HistoryPoint>,
}

/// Last `days` dates on which `country` was recorded, oldest first.
/// Dates where the country is absent are skipped, not zero-filled.
pub fn country_history(store: &SnapshotStore, country: &str, days: usize) -> History {
    let mut points: Vec<HistoryPoint> = store
        .list_dates()
        .into_iter()
        .filter_map(|date| {
            store.country(date, country).map(|record| HistoryPoint {
                date: date.to_string(),
                tested: record.tested,
                sick: record.sick,
                recovered: record.recovered,
                dead: record.dead,
            })
        })
        .collect();

    if points.len() > days {
        let excess = points.len() - days;
        points.drain(..excess);
    }

    History {
        country: country.to_string(),
        points,
    }
}
