use std::{collections::BTreeSet, fmt::Write};

use chrono::Datelike;
use epw_core::{Aggregates, ChartId, CloudBucket, chart::MONTH_LABELS};

/// Plain-text summary of the chart currently selected on the dashboard.
pub fn summary(chart: ChartId, aggregates: &Aggregates) -> String {
    let mut out = format!("  records: {}\n", aggregates.records_seen);

    match chart {
        ChartId::Heatmap => heatmap(&mut out, aggregates),
        ChartId::CloudCoverage => cloud_coverage(&mut out, aggregates),
        ChartId::Temperature => temperature(&mut out, aggregates),
    }

    out.trim_end().to_string()
}

fn heatmap(out: &mut String, aggregates: &Aggregates) {
    let grid = &aggregates.heatmap;
    let filled = grid.filled_cells();
    let total = grid.rows().len() * grid.rows().first().map_or(0, Vec::len);

    let _ = writeln!(out, "  heatmap cells filled: {filled} of {total}");

    let (lo, hi) = grid
        .rows()
        .iter()
        .flatten()
        .flatten()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &t| {
            (lo.min(t), hi.max(t))
        });
    if filled > 0 {
        let _ = writeln!(out, "  temperature range: {lo:.1} .. {hi:.1} °C");
    }
}

fn cloud_coverage(out: &mut String, aggregates: &Aggregates) {
    let hist = &aggregates.cloud_coverage;

    let _ = writeln!(out, "  month    above       in    below");
    for (idx, label) in MONTH_LABELS.iter().enumerate() {
        let month = idx as i32 + 1;
        let _ = writeln!(
            out,
            "  {label:<5} {:>8} {:>8} {:>8}",
            hist.count(month, CloudBucket::Above),
            hist.count(month, CloudBucket::In),
            hist.count(month, CloudBucket::Below),
        );
    }
}

fn temperature(out: &mut String, aggregates: &Aggregates) {
    let daily = &aggregates.daily;
    let months: BTreeSet<u32> = daily.iter().map(|d| d.date.month()).collect();

    let _ = writeln!(out, "  days: {} across {} months", daily.len(), months.len());

    let coldest = daily.iter().min_by(|a, b| a.min_temp.total_cmp(&b.min_temp));
    let warmest = daily.iter().max_by(|a, b| a.max_temp.total_cmp(&b.max_temp));

    if let (Some(cold), Some(warm)) = (coldest, warmest) {
        let _ = writeln!(
            out,
            "  coldest: {} ({:.1} °C), warmest: {} ({:.1} °C)",
            cold.date.format("%b %d"),
            cold.min_temp,
            warm.date.format("%b %d"),
            warm.max_temp,
        );
    }
}
