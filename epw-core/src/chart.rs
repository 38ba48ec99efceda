//! Chart payloads handed to a [`ChartSurface`](crate::render::ChartSurface).
//!
//! Each payload carries everything a plotting backend needs: axis categories,
//! values, series labels and colors.

use chrono::NaiveDate;
use serde::Serialize;

use crate::{
    aggregate::DAYS_IN_MONTH,
    model::{Aggregates, CloudBucket, CloudCoverageHistogram, DailyTemperature, HeatmapGrid},
};

pub const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesColor {
    /// CSS color name.
    pub name: &'static str,
    pub rgb: [u8; 3],
    pub alpha: f64,
}

impl SeriesColor {
    pub const fn opaque(name: &'static str, rgb: [u8; 3]) -> Self {
        Self {
            name,
            rgb,
            alpha: 1.0,
        }
    }
}

pub const DARK_GRAY: SeriesColor = SeriesColor::opaque("darkgray", [169, 169, 169]);
pub const LIGHT_GRAY: SeriesColor = SeriesColor::opaque("lightgray", [211, 211, 211]);
pub const LIGHT_BLUE: SeriesColor = SeriesColor::opaque("lightblue", [173, 216, 230]);
pub const RED: SeriesColor = SeriesColor::opaque("red", [255, 0, 0]);

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatmapChart {
    pub title: String,
    pub x_title: String,
    pub y_title: String,
    /// Day labels, "Jan 1" through "Dec 31".
    pub x: Vec<String>,
    /// Hour labels, "Hour 1" through "Hour 24".
    pub y: Vec<String>,
    /// One row per hour, one column per day.
    pub z: Vec<Vec<Option<f64>>>,
    /// A day label is shown every `tick_every` days.
    pub tick_every: usize,
    pub colorscale: String,
}

impl HeatmapChart {
    pub fn from_grid(grid: &HeatmapGrid) -> Self {
        let y = (1..=grid.rows().len()).map(|h| format!("Hour {h}")).collect();

        Self {
            title: "Heatmap of Temperatures".to_string(),
            x_title: "Days".to_string(),
            y_title: "Hours".to_string(),
            x: day_labels(),
            y,
            z: grid.rows().to_vec(),
            tick_every: 30,
            colorscale: "YlOrRd".to_string(),
        }
    }

    /// Column indices and labels of the x-axis ticks.
    pub fn ticks(&self) -> impl Iterator<Item = (usize, &str)> + '_ {
        self.x
            .iter()
            .enumerate()
            .step_by(self.tick_every.max(1))
            .map(|(i, label)| (i, label.as_str()))
    }

    /// Lowest and highest temperature present, `None` for an empty grid.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.z
            .iter()
            .flatten()
            .flatten()
            .fold(None, |acc, &v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}

/// "Jan 1" .. "Dec 31" for the fixed non-leap year.
fn day_labels() -> Vec<String> {
    MONTH_LABELS
        .iter()
        .zip(DAYS_IN_MONTH)
        .flat_map(|(month, days)| (1..=days).map(move |d| format!("{month} {d}")))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StackedSeries {
    pub label: String,
    pub color: SeriesColor,
    pub values: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CloudCoverageChart {
    pub categories: Vec<String>,
    /// Stacked bottom to top in this order.
    pub series: Vec<StackedSeries>,
}

impl CloudCoverageChart {
    pub fn from_histogram(histogram: &CloudCoverageHistogram) -> Self {
        let series = CloudBucket::all()
            .iter()
            .map(|bucket| {
                let (label, color) = match bucket {
                    CloudBucket::Above => ("ABOVE range", DARK_GRAY),
                    CloudBucket::In => ("IN range", LIGHT_GRAY),
                    CloudBucket::Below => ("BELOW range", LIGHT_BLUE),
                };
                StackedSeries {
                    label: label.to_string(),
                    color,
                    values: histogram.series(*bucket),
                }
            })
            .collect();

        Self {
            categories: MONTH_LABELS.iter().map(|m| m.to_string()).collect(),
            series,
        }
    }

    /// Height of each stacked bar.
    pub fn stack_heights(&self) -> Vec<u32> {
        (0..self.categories.len())
            .map(|i| {
                self.series
                    .iter()
                    .filter_map(|s| s.values.get(i))
                    .sum()
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemperatureChart {
    pub title: String,
    pub x_title: String,
    pub y_title: String,
    pub dates: Vec<NaiveDate>,
    pub min: Vec<f64>,
    pub max: Vec<f64>,
    pub avg: Vec<f64>,
    pub range_label: String,
    pub range_color: SeriesColor,
    pub avg_label: String,
    pub avg_color: SeriesColor,
    pub avg_width: u32,
}

impl TemperatureChart {
    pub fn from_daily(daily: &[DailyTemperature]) -> Self {
        Self {
            title: "Average Daily Dry Bulb Temperature with Min-Max Range".to_string(),
            x_title: "Date".to_string(),
            y_title: "Temperature (°C)".to_string(),
            dates: daily.iter().map(|d| d.date).collect(),
            min: daily.iter().map(|d| d.min_temp).collect(),
            max: daily.iter().map(|d| d.max_temp).collect(),
            avg: daily.iter().map(|d| d.avg_temp).collect(),
            range_label: "Dry Bulb Temperature Range".to_string(),
            range_color: SeriesColor { alpha: 0.3, ..RED },
            avg_label: "Average Dry Bulb Temperature".to_string(),
            avg_color: RED,
            avg_width: 2,
        }
    }

    /// Lowest minimum and highest maximum, `None` when there are no days.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        let lo = self.min.iter().copied().reduce(f64::min)?;
        let hi = self.max.iter().copied().reduce(f64::max)?;
        Some((lo, hi))
    }
}

/// All three payloads for one file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSet {
    pub heatmap: HeatmapChart,
    pub cloud_coverage: CloudCoverageChart,
    pub temperature: TemperatureChart,
}

impl ChartSet {
    pub fn from_aggregates(aggregates: &Aggregates) -> Self {
        Self {
            heatmap: HeatmapChart::from_grid(&aggregates.heatmap),
            cloud_coverage: CloudCoverageChart::from_histogram(&aggregates.cloud_coverage),
            temperature: TemperatureChart::from_daily(&aggregates.daily),
        }
    }
}
