//! Update cycle.
//!
//! Runs every source once, in order, and writes each record under the
//! cycle's date. A failing source is logged and recorded in the report;
//! it never stops the remaining sources and never touches the store.

pub mod source;

use serde::Serialize;
use tracing::{debug, error, info};

use crate::store::{Key, SnapshotStore};
use source::{normalize, Source};

#[derive(Debug, Clone, Serialize)]
pub struct UpdateError {
    pub source: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct UpdateReport {
    pub date: String,
    /// Country names written this cycle, in source order.
    pub updated: Vec<String>,
    pub errors: Vec<UpdateError>,
    pub source_timings: Vec<(String, u128)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u128>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peak_memory_bytes: Option<usize>,
}

impl UpdateReport {
    pub fn empty(date: &str) -> Self {
        UpdateReport {
            date: date.to_string(),
            updated: Vec::new(),
            errors: Vec::new(),
            source_timings: Vec::new(),
            duration_ms: None,
            peak_memory_bytes: None,
        }
    }

    pub fn add_error(&mut self, source: &str, message: impl Into<String>) {
        self.errors.push(UpdateError {
            source: source.to_string(),
            message: message.into(),
        });
    }
}

fn current_memory() -> Option<usize> {
    memory_stats::memory_stats().map(|stats| stats.physical_mem)
}

pub fn run(store: &mut SnapshotStore, sources: &[Box<dyn Source>], date: &str) -> UpdateReport {
    let start = std::time::Instant::now();
    let mut report = UpdateReport::empty(date);
    let mut peak_memory = current_memory();

    info!(date, sources = sources.len(), "updating data");

    for source in sources {
        let source_start = std::time::Instant::now();

        let result = source
            .fetch()
            .and_then(|raw| normalize(source.name(), raw, source.region_policy()))
            .map_err(|e| e.to_string())
            .and_then(|record| {
                let country = record.name.clone();
                store
                    .update(&Key::date(date).country(&country), record)
                    .map(|()| country)
                    .map_err(|e| e.to_string())
            });

        let elapsed = source_start.elapsed();
        report.source_timings.push((source.name().to_string(), elapsed.as_millis()));

        match result {
            Ok(country) => {
                info!(
                    source = source.name(),
                    country = %country,
                    "data updated [{:.3}s]",
                    elapsed.as_secs_f64()
                );
                report.updated.push(country);
            }
            Err(message) => {
                error!(source = source.name(), "failed to update: {message}");
                report.add_error(source.name(), message);
            }
        }

        peak_memory = match (peak_memory, current_memory()) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        };
    }

    report.duration_ms = Some(start.elapsed().as_millis());
    report.peak_memory_bytes = peak_memory;
    debug!(duration_ms = ?report.duration_ms, "update finished");

    report
}

/// Plain text digest of the cycle's errors, None when there were none.
pub fn error_summary(report: &UpdateReport) -> Option<String> {
    if report.errors.is_empty() {
        return None;
    }

    let mut text = format!(
        "{} error(s) during the update of {}\n",
        report.errors.len(),
        report.date
    );
    for error in &report.errors {
        text.push_str(&format!("\n[{}]\n  {}\n", error.source, error.message));
    }

    Some(text)
}
