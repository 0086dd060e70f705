pub mod json;
pub mod table;
pub mod zones;

use crate::store::diff::{CountryDelta, DiffType};
use crate::store::history::History;
use crate::update::UpdateReport;
use crate::util::{format_count, format_delta, truncate};

/// Summary printed after an update cycle.
pub fn render_update(report: &UpdateReport, verbose: bool) -> String {
    let mut out = format!(
        "\nupdated {} of {} sources for {}\n",
        report.updated.len(),
        report.source_timings.len(),
        report.date
    );

    if let Some(duration_ms) = report.duration_ms {
        let duration_sec = duration_ms as f64 / 1000.0;
        out.push_str(&format!("update completed in {duration_sec:.2}s\n"));
    }

    if verbose {
        if let Some(peak_bytes) = report.peak_memory_bytes {
            out.push_str(&format!("peak memory: {:.1} MB\n", peak_bytes as f64 / 1_024_f64 / 1_024_f64));
        }

        if !report.source_timings.is_empty() {
            out.push_str("\nsource timing:\n");
            for (source, timing_ms) in &report.source_timings {
                let timing_sec = *timing_ms as f64 / 1000.0;
                out.push_str(&format!("  {}: {timing_sec:.2}s\n", truncate(source, 60)));
            }
        }
    }

    if !report.errors.is_empty() {
        out.push_str("\nerrors encountered:\n");
        for error in &report.errors {
            out.push_str(&format!("  {}: {}\n", error.source, error.message));
        }
    }

    out
}

/// Region-by-region comparison between two dates.
pub fn render_diff(delta: &CountryDelta, from: &str, to: &str) -> String {
    let mut out = format!("\nComparing {}:\n  From: {from}\n  To:   {to}\n\n", delta.name);

    let c = &delta.counters;
    out.push_str(&format!(
        "  tested {}  sick {}  recovered {}  dead {}\n\n",
        format_delta(c.tested),
        format_delta(c.sick),
        format_delta(c.recovered),
        format_delta(c.dead)
    ));

    let mut grew: Vec<_> = delta.regions.iter().filter(|r| r.diff_type == DiffType::Grew).collect();
    let mut shrank: Vec<_> = delta.regions.iter().filter(|r| r.diff_type == DiffType::Shrank).collect();
    let gone: Vec<_> = delta.regions.iter().filter(|r| r.diff_type == DiffType::Gone).collect();

    if grew.is_empty() && shrank.is_empty() && gone.is_empty() {
        out.push_str("No regional changes.\n");
        return out;
    }

    grew.sort_by_key(|r| -r.delta);
    shrank.sort_by_key(|r| r.delta);

    for r in grew {
        out.push_str(&format!(
            "  [+] {} {} -> {} ({})\n",
            r.name,
            format_count(r.old_count),
            format_count(r.new_count),
            format_delta(r.delta)
        ));
    }

    for r in shrank {
        out.push_str(&format!(
            "  [-] {} {} -> {} ({})\n",
            r.name,
            format_count(r.old_count),
            format_count(r.new_count),
            format_delta(r.delta)
        ));
    }

    for r in gone {
        out.push_str(&format!("  [gone] {} (was {})\n", r.name, format_count(r.old_count)));
    }

    out
}

pub fn render_history(history: &History) -> String {
    if history.points.is_empty() {
        return format!("No history for {}.\n", history.country);
    }

    let mut out = format!("\n{}\n", history.country);
    out.push_str(&format!(
        "{:<12} {:>14} {:>12} {:>12} {:>10}\n",
        "Date", "Tested", "Sick", "Recovered", "Dead"
    ));
    out.push_str(&"-".repeat(64));
    out.push('\n');

    for p in &history.points {
        out.push_str(&format!(
            "{:<12} {:>14} {:>12} {:>12} {:>10}\n",
            p.date,
            format_count(p.tested),
            format_count(p.sick),
            format_count(p.recovered),
            format_count(p.dead)
        ));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{CountryRecord, RegionValue};
    use crate::store::diff::compare_country;
    use crate::store::history::HistoryPoint;

    #[test]
    fn update_summary_lists_errors() {
        let mut report = UpdateReport::empty("01 Jan 2021");
        report.updated.push("Україна".to_string());
        report.source_timings.push(("ukr.json".to_string(), 12));
        report.source_timings.push(("pol.json".to_string(), 8));
        report.add_error("pol.json", "failed to read pol.json");

        let text = render_update(&report, false);
        assert!(text.contains("updated 1 of 2 sources for 01 Jan 2021"));
        assert!(text.contains("pol.json: failed to read pol.json"));
        assert!(!text.contains("source timing"));
    }

    #[test]
    fn diff_without_changes() {
        let record = CountryRecord::new("Україна");
        let delta = compare_country(&record, None);
        let text = render_diff(&delta, "01 Jan 2021", "02 Jan 2021");
        assert!(text.contains("No regional changes."));
    }

    #[test]
    fn diff_lists_grown_regions_first() {
        let mut old = CountryRecord::new("Україна");
        old.regions.insert("a".to_string(), RegionValue::Count(10));
        old.regions.insert("b".to_string(), RegionValue::Count(10));
        let mut new = old.clone();
        new.regions.insert("a".to_string(), RegionValue::Count(5));
        new.regions.insert("b".to_string(), RegionValue::Count(1_500));

        let text = render_diff(&compare_country(&new, Some(&old)), "x", "y");
        let grew = text.find("[+] b 10 -> 1,500 (+1,490)").unwrap();
        let shrank = text.find("[-] a 10 -> 5 (-5)").unwrap();
        assert!(grew < shrank);
    }

    #[test]
    fn history_table_has_a_row_per_point() {
        let history = History {
            country: "Україна".to_string(),
            points: vec![
                HistoryPoint { date: "01 Jan 2021".to_string(), tested: 1, sick: 2, recovered: 3, dead: 4 },
                HistoryPoint { date: "02 Jan 2021".to_string(), tested: 5, sick: 6, recovered: 7, dead: 8 },
            ],
        };

        let text = render_history(&history);
        assert_eq!(text.lines().filter(|l| l.contains("Jan 2021")).count(), 2);
    }
}
