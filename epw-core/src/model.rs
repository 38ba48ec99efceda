use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Hours per day, rows of the heatmap.
pub const HOURS_PER_DAY: usize = 24;

/// Days in the fixed (non-leap) year, columns of the heatmap.
pub const DAYS_PER_YEAR: usize = 365;

pub const MONTHS_PER_YEAR: usize = 12;

/// One accepted data line of an EPW file.
///
/// Measurements are `None` when the column is missing, unparsable or not finite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HourlyRecord {
    pub year: i32,
    pub month: i32,
    pub day: i32,
    pub hour: i32,
    pub minute: i32,
    pub dry_bulb_temperature: Option<f64>,
    pub cloud_cover: Option<f64>,
}

/// Hour-by-day grid of dry-bulb temperatures, `HOURS_PER_DAY` rows by `DAYS_PER_YEAR` columns.
#[derive(Debug, Clone, PartialEq)]
pub struct HeatmapGrid {
    cells: Vec<Vec<Option<f64>>>,
}

impl Default for HeatmapGrid {
    fn default() -> Self {
        Self::new()
    }
}

impl HeatmapGrid {
    pub fn new() -> Self {
        Self {
            cells: vec![vec![None; DAYS_PER_YEAR]; HOURS_PER_DAY],
        }
    }

    /// Stores `value` at (`hour` - 1, `day_of_year` - 1), overwriting any previous value.
    ///
    /// Both arguments are 1-based. Returns `false` and leaves the grid untouched
    /// when either index falls outside the grid.
    pub fn set(&mut self, hour: i32, day_of_year: i32, value: f64) -> bool {
        let (Some(row), Some(col)) = (
            one_based_index(hour, HOURS_PER_DAY),
            one_based_index(day_of_year, DAYS_PER_YEAR),
        ) else {
            return false;
        };

        self.cells[row][col] = Some(value);
        true
    }

    /// Zero-based lookup.
    pub fn get(&self, hour_index: usize, day_index: usize) -> Option<f64> {
        self.cells.get(hour_index)?.get(day_index).copied().flatten()
    }

    pub fn rows(&self) -> &[Vec<Option<f64>>] {
        &self.cells
    }

    pub fn filled_cells(&self) -> usize {
        self.cells.iter().flatten().filter(|c| c.is_some()).count()
    }
}

fn one_based_index(value: i32, len: usize) -> Option<usize> {
    let idx = usize::try_from(value).ok()?.checked_sub(1)?;
    (idx < len).then_some(idx)
}

/// Cloud-cover classification thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CloudThresholds {
    /// Values strictly above this count as `Above`.
    pub above: f64,
    /// Values strictly below this count as `Below`.
    pub below: f64,
}

impl Default for CloudThresholds {
    fn default() -> Self {
        Self {
            above: 7.0,
            below: 4.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CloudBucket {
    Above,
    In,
    Below,
}

impl CloudBucket {
    pub const fn all() -> &'static [CloudBucket] {
        &[CloudBucket::Above, CloudBucket::In, CloudBucket::Below]
    }

    pub fn classify(value: f64, thresholds: &CloudThresholds) -> Self {
        if value > thresholds.above {
            CloudBucket::Above
        } else if value < thresholds.below {
            CloudBucket::Below
        } else {
            CloudBucket::In
        }
    }

    pub fn index(&self) -> usize {
        match self {
            CloudBucket::Above => 0,
            CloudBucket::In => 1,
            CloudBucket::Below => 2,
        }
    }
}

/// Per-month counts of cloud-cover observations, one column per [`CloudBucket`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CloudCoverageHistogram {
    counts: [[u32; 3]; MONTHS_PER_YEAR],
}

impl CloudCoverageHistogram {
    /// Counts one observation for `month` (1-based). Months outside 1..=12 are ignored.
    pub fn record(&mut self, month: i32, cloud_cover: f64, thresholds: &CloudThresholds) -> bool {
        let Some(row) = one_based_index(month, MONTHS_PER_YEAR) else {
            return false;
        };

        let bucket = CloudBucket::classify(cloud_cover, thresholds);
        self.counts[row][bucket.index()] += 1;
        true
    }

    /// Counts for a 1-based month, ordered `[above, in, below]`.
    pub fn month(&self, month: i32) -> Option<[u32; 3]> {
        one_based_index(month, MONTHS_PER_YEAR).map(|row| self.counts[row])
    }

    pub fn count(&self, month: i32, bucket: CloudBucket) -> u32 {
        self.month(month).map_or(0, |row| row[bucket.index()])
    }

    pub fn month_total(&self, month: i32) -> u32 {
        self.month(month).map_or(0, |row| row.iter().sum())
    }

    /// All counts of one bucket, January first.
    pub fn series(&self, bucket: CloudBucket) -> Vec<u32> {
        self.counts.iter().map(|row| row[bucket.index()]).collect()
    }

    pub fn total(&self) -> u32 {
        self.counts.iter().flatten().sum()
    }
}

/// Running temperature statistics for one calendar day.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyStat {
    pub temps: Vec<f64>,
    pub min_temp: f64,
    pub max_temp: f64,
}

impl Default for DailyStat {
    fn default() -> Self {
        Self {
            temps: Vec::new(),
            min_temp: f64::INFINITY,
            max_temp: f64::NEG_INFINITY,
        }
    }
}

impl DailyStat {
    pub fn push(&mut self, temp: f64) {
        self.temps.push(temp);
        self.min_temp = self.min_temp.min(temp);
        self.max_temp = self.max_temp.max(temp);
    }

    /// Arithmetic mean of everything pushed so far; `None` for an empty day.
    pub fn average(&self) -> Option<f64> {
        if self.temps.is_empty() {
            return None;
        }
        Some(self.temps.iter().sum::<f64>() / self.temps.len() as f64)
    }
}

/// A finalized day: date in the reference year plus average, min and max temperature.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DailyTemperature {
    pub date: NaiveDate,
    pub avg_temp: f64,
    pub min_temp: f64,
    pub max_temp: f64,
}

/// The three aggregate views derived from one file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Aggregates {
    pub heatmap: HeatmapGrid,
    pub cloud_coverage: CloudCoverageHistogram,
    /// Sorted by date, ascending.
    pub daily: Vec<DailyTemperature>,
    pub records_seen: usize,
}

impl Aggregates {
    pub fn is_empty(&self) -> bool {
        self.records_seen == 0
    }
}
