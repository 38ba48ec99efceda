use std::collections::HashMap;

use chrono::NaiveDate;
use tracing::debug;

use crate::{
    config::Config,
    model::{
        Aggregates, CloudCoverageHistogram, CloudThresholds, DailyStat, DailyTemperature,
        HeatmapGrid, HourlyRecord,
    },
    parser::parse_records,
};

/// Month lengths of the fixed non-leap year used for day-of-year numbering.
pub const DAYS_IN_MONTH: [i32; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

/// Year assigned to finalized daily records.
pub const DEFAULT_REFERENCE_YEAR: i32 = 2020;

/// Ordinal day in the fixed non-leap year, `day + sum(DAYS_IN_MONTH[..month - 1])`.
///
/// Leap years are ignored. `day` is not range-checked against the month length;
/// `None` for months outside 1..=12 or when the sum overflows.
pub fn day_of_year(month: i32, day: i32) -> Option<i32> {
    if !(1..=12).contains(&month) {
        return None;
    }

    let preceding: i32 = DAYS_IN_MONTH[..(month - 1) as usize].iter().sum();
    day.checked_add(preceding)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AggregateSettings {
    pub cloud: CloudThresholds,
    pub reference_year: i32,
}

impl Default for AggregateSettings {
    fn default() -> Self {
        Self {
            cloud: CloudThresholds::default(),
            reference_year: DEFAULT_REFERENCE_YEAR,
        }
    }
}

/// Single-pass accumulator for the three aggregate views.
#[derive(Debug)]
pub struct Aggregator {
    settings: AggregateSettings,
    heatmap: HeatmapGrid,
    cloud_coverage: CloudCoverageHistogram,
    daily: HashMap<(i32, i32), DailyStat>,
    records_seen: usize,
}

impl Aggregator {
    pub fn new(settings: AggregateSettings) -> Self {
        Self {
            settings,
            heatmap: HeatmapGrid::new(),
            cloud_coverage: CloudCoverageHistogram::default(),
            daily: HashMap::new(),
            records_seen: 0,
        }
    }

    pub fn push(&mut self, record: &HourlyRecord) {
        self.records_seen += 1;

        if let Some(temp) = record.dry_bulb_temperature {
            let placed = day_of_year(record.month, record.day)
                .is_some_and(|doy| self.heatmap.set(record.hour, doy, temp));
            if !placed {
                debug!(
                    month = record.month,
                    day = record.day,
                    hour = record.hour,
                    "record falls outside the heatmap"
                );
            }

            self.daily
                .entry((record.month, record.day))
                .or_default()
                .push(temp);
        }

        if let Some(cloud) = record.cloud_cover {
            self.cloud_coverage
                .record(record.month, cloud, &self.settings.cloud);
        }
    }

    /// Computes daily averages, dates them in the reference year and sorts by date.
    pub fn finish(self) -> Aggregates {
        let year = self.settings.reference_year;

        let mut daily: Vec<DailyTemperature> = self
            .daily
            .into_iter()
            .filter_map(|((month, day), stat)| {
                let date = u32::try_from(month)
                    .ok()
                    .zip(u32::try_from(day).ok())
                    .and_then(|(m, d)| NaiveDate::from_ymd_opt(year, m, d));

                let Some(date) = date else {
                    debug!(month, day, year, "dropping day that is not a calendar date");
                    return None;
                };

                Some(DailyTemperature {
                    date,
                    avg_temp: stat.average()?,
                    min_temp: stat.min_temp,
                    max_temp: stat.max_temp,
                })
            })
            .collect();

        daily.sort_by_key(|d| d.date);

        debug!(
            records = self.records_seen,
            heatmap_cells = self.heatmap.filled_cells(),
            cloud_observations = self.cloud_coverage.total(),
            days = daily.len(),
            "aggregation finished"
        );

        Aggregates {
            heatmap: self.heatmap,
            cloud_coverage: self.cloud_coverage,
            daily,
            records_seen: self.records_seen,
        }
    }
}

pub fn aggregate<I>(records: I, settings: &AggregateSettings) -> Aggregates
where
    I: IntoIterator<Item = HourlyRecord>,
{
    let mut aggregator = Aggregator::new(*settings);
    for record in records {
        aggregator.push(&record);
    }
    aggregator.finish()
}

/// Parses `text` and aggregates it with the layout and settings from `config`.
pub fn process(text: &str, config: &Config) -> Aggregates {
    let records = parse_records(text, &config.layout);
    aggregate(records, &config.aggregate_settings())
}
