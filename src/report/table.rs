//! Console rendering of one stored day.
//!
//! For every country of the day:
//! - population, area and density header
//! - counters with their delta against the previous calendar day
//! - regions sorted by count, with their delta and danger zone

use chrono::{Days, NaiveDate};

use super::zones::zones_of;
use crate::record::CountryRecord;
use crate::store::diff::{compare_country, CountryDelta};
use crate::store::{date_key, SnapshotStore};
use crate::util::{format_count, format_delta, truncate};

const WIDTH: usize = 78;

pub fn render(store: &SnapshotStore, date: NaiveDate, color: bool) -> String {
    let today = date_key(date);
    let yesterday = date
        .checked_sub_days(Days::new(1))
        .map(date_key)
        .unwrap_or_default();

    let Some(day) = store.day(&today).filter(|day| !day.is_empty()) else {
        return format!("No data for {today}.\n");
    };

    let mut output = format!("\nData as of {today}\n");

    for (name, record) in day {
        let delta = compare_country(record, store.country(&yesterday, name));
        render_country(&mut output, name, record, &delta, color);
    }

    output
}

fn render_country(out: &mut String, name: &str, record: &CountryRecord, delta: &CountryDelta, color: bool) {
    out.push_str(&format!("\n[ {name} ] "));
    out.push_str(&format!(
        "population {} on {} km2",
        format_count(record.population),
        format_count(record.area)
    ));
    if let Some(density) = record.density() {
        out.push_str(&format!(" ({density:.2} per km2)"));
    }
    out.push('\n');
    out.push_str(&"-".repeat(WIDTH));
    out.push('\n');

    let c = &delta.counters;
    out.push_str(&counter_line("tested", record.tested, c.tested, "recovered", record.recovered, c.recovered));
    out.push_str(&counter_line("sick", record.sick, c.sick, "dead", record.dead, c.dead));
    out.push_str(&"-".repeat(WIDTH));
    out.push('\n');

    if record.region_counts().next().is_none() {
        out.push_str("  << no regional data >>\n");
        return;
    }

    // regions by count, largest first; ties keep stored order
    let mut rows: Vec<(&str, u64, i64)> = delta
        .regions
        .iter()
        .filter(|r| record.regions.contains_key(&r.name))
        .map(|r| (r.name.as_str(), r.new_count, r.delta))
        .collect();
    rows.sort_by_key(|&(_, count, _)| std::cmp::Reverse(count));

    let counts: Vec<i64> = rows
        .iter()
        .map(|&(_, count, _)| i64::try_from(count).unwrap_or(i64::MAX))
        .collect();
    let deltas: Vec<i64> = rows.iter().map(|&(_, _, d)| d).collect();
    let count_zones = zones_of(&counts);
    let delta_zones = zones_of(&deltas);

    let legend: Vec<String> = (0..5).map(|z| paint(&z.to_string(), z, color)).collect();
    out.push_str(&format!("  danger zones: {}\n", legend.join(" ")));

    for (i, (region, count, d)) in rows.into_iter().enumerate() {
        let label = format!("{:.<50}", format!("{} ", truncate(region, 48)));
        let count = format!("{:>10}", format_count(count));
        let d = format!("{:<8}", format_delta(d));
        out.push_str(&format!(
            "  {} {count} | {}\n",
            paint(&label, count_zones[i], color),
            paint(&d, delta_zones[i], color)
        ));
    }
}

fn counter_line(left: &str, left_value: u64, left_delta: i64, right: &str, right_value: u64, right_delta: i64) -> String {
    format!(
        "  {left:<10} {:>12} {:<9}  {right:<10} {:>12} {:<9}\n",
        format_count(left_value),
        format_delta(left_delta),
        format_count(right_value),
        format_delta(right_delta),
    )
}

#[cfg(feature = "color")]
fn paint(text: &str, zone: u8, color: bool) -> String {
    use crossterm::style::{style, Color, Stylize};

    if !color {
        return text.to_string();
    }

    let c = match zone {
        0 => Color::White,
        1 => Color::Yellow,
        2 => Color::DarkYellow,
        3 => Color::Red,
        _ => Color::DarkRed,
    };
    style(text).with(c).to_string()
}

#[cfg(not(feature = "color"))]
fn paint(text: &str, _zone: u8, _color: bool) -> String {
    text.to_string()
}
