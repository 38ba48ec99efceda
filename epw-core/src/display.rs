use std::{convert::TryFrom, fmt};

/// The three charts, each with its own display container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartId {
    Heatmap,
    CloudCoverage,
    Temperature,
}

impl ChartId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChartId::Heatmap => "heatmap",
            ChartId::CloudCoverage => "cloudCoverage",
            ChartId::Temperature => "temperature",
        }
    }

    /// Name of the container the chart is drawn into.
    pub fn container(&self) -> &'static str {
        match self {
            ChartId::Heatmap => "heatmapContainer",
            ChartId::CloudCoverage => "cloudCoverageContainer",
            ChartId::Temperature => "temperatureContainer",
        }
    }

    /// Output file stem, e.g. `cloud_coverage`.
    pub fn file_stem(&self) -> &'static str {
        match self {
            ChartId::Heatmap => "heatmap",
            ChartId::CloudCoverage => "cloud_coverage",
            ChartId::Temperature => "temperature",
        }
    }

    pub const fn all() -> &'static [ChartId] {
        &[ChartId::Heatmap, ChartId::CloudCoverage, ChartId::Temperature]
    }
}

impl fmt::Display for ChartId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ChartId {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.trim_end_matches("container") {
            "heatmap" => Ok(ChartId::Heatmap),
            "cloudcoverage" | "cloud_coverage" | "cloud" => Ok(ChartId::CloudCoverage),
            "temperature" | "temp" => Ok(ChartId::Temperature),
            _ => Err(anyhow::anyhow!(
                "Unknown chart '{value}'. Supported charts: heatmap, cloudCoverage, temperature."
            )),
        }
    }
}

/// Visibility of the chart containers; exactly one is shown at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dashboard {
    visible: ChartId,
}

impl Default for Dashboard {
    fn default() -> Self {
        Self::new(ChartId::Heatmap)
    }
}

impl Dashboard {
    pub fn new(visible: ChartId) -> Self {
        Self { visible }
    }

    /// Show `chart` and hide the others.
    pub fn show(&mut self, chart: ChartId) {
        self.visible = chart;
    }

    pub fn visible(&self) -> ChartId {
        self.visible
    }

    pub fn is_visible(&self, chart: ChartId) -> bool {
        self.visible == chart
    }

    /// Every container name paired with its visibility.
    pub fn containers(&self) -> impl Iterator<Item = (&'static str, bool)> + '_ {
        ChartId::all()
            .iter()
            .map(|id| (id.container(), self.is_visible(*id)))
    }
}
