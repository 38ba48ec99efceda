use std::{
    convert::TryFrom,
    fmt::{self, Debug},
    fs,
    path::{Path, PathBuf},
};

use tracing::info;

use crate::{
    chart::{ChartSet, CloudCoverageChart, HeatmapChart, TemperatureChart},
    display::ChartId,
    error::RenderError,
    render::{json::JsonSurface, svg::SvgSurface},
};

pub mod json;
pub mod svg;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    Svg,
    Json,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Svg => "svg",
            OutputFormat::Json => "json",
        }
    }

    pub const fn all() -> &'static [OutputFormat] {
        &[OutputFormat::Svg, OutputFormat::Json]
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for OutputFormat {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "svg" => Ok(OutputFormat::Svg),
            "json" => Ok(OutputFormat::Json),
            _ => Err(anyhow::anyhow!(
                "Unknown output format '{value}'. Supported formats: svg, json."
            )),
        }
    }
}

/// Something charts can be drawn on.
///
/// Every call replaces whatever the surface previously showed for that chart.
pub trait ChartSurface: Debug {
    fn heatmap(&mut self, chart: &HeatmapChart) -> Result<(), RenderError>;

    fn cloud_coverage(&mut self, chart: &CloudCoverageChart) -> Result<(), RenderError>;

    fn temperature(&mut self, chart: &TemperatureChart) -> Result<(), RenderError>;

    /// Where the surface keeps `chart`, if it is backed by a file.
    fn location(&self, _chart: ChartId) -> Option<PathBuf> {
        None
    }
}

/// Hands each chart of `charts` to `surface`, heatmap first.
pub fn render_all(charts: &ChartSet, surface: &mut dyn ChartSurface) -> Result<(), RenderError> {
    surface.heatmap(&charts.heatmap)?;
    surface.cloud_coverage(&charts.cloud_coverage)?;
    surface.temperature(&charts.temperature)?;
    Ok(())
}

/// Construct a file-backed surface writing into `dir`.
pub fn surface_for(format: OutputFormat, dir: impl Into<PathBuf>) -> Box<dyn ChartSurface> {
    match format {
        OutputFormat::Svg => Box::new(SvgSurface::new(dir)),
        OutputFormat::Json => Box::new(JsonSurface::new(dir)),
    }
}

pub(crate) fn output_path(dir: &Path, chart: ChartId, format: OutputFormat) -> PathBuf {
    dir.join(format!("{}.{}", chart.file_stem(), format.as_str()))
}

/// Writes `contents` to the chart's file in `dir`, replacing the previous one.
pub(crate) fn write_output(
    dir: &Path,
    chart: ChartId,
    format: OutputFormat,
    contents: &str,
) -> Result<PathBuf, RenderError> {
    fs::create_dir_all(dir).map_err(|source| RenderError::Io {
        chart,
        path: dir.to_path_buf(),
        source,
    })?;

    let path = output_path(dir, chart, format);
    fs::write(&path, contents).map_err(|source| RenderError::Io {
        chart,
        path: path.clone(),
        source,
    })?;

    info!(%chart, path = %path.display(), "chart written");
    Ok(path)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::model::Aggregates;

    /// Unique scratch directory under the system temp dir.
    pub(crate) fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("epw-core-{}-{name}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[derive(Debug, Default)]
    struct RecordingSurface {
        calls: Vec<ChartId>,
        fail_on: Option<ChartId>,
    }

    impl RecordingSurface {
        fn call(&mut self, chart: ChartId) -> Result<(), RenderError> {
            if self.fail_on == Some(chart) {
                return Err(RenderError::Draw {
                    chart,
                    message: "boom".to_string(),
                });
            }
            self.calls.push(chart);
            Ok(())
        }
    }

    impl ChartSurface for RecordingSurface {
        fn heatmap(&mut self, _chart: &HeatmapChart) -> Result<(), RenderError> {
            self.call(ChartId::Heatmap)
        }

        fn cloud_coverage(&mut self, _chart: &CloudCoverageChart) -> Result<(), RenderError> {
            self.call(ChartId::CloudCoverage)
        }

        fn temperature(&mut self, _chart: &TemperatureChart) -> Result<(), RenderError> {
            self.call(ChartId::Temperature)
        }
    }

    #[test]
    fn output_format_as_str_roundtrip() {
        for format in OutputFormat::all() {
            let parsed = OutputFormat::try_from(format.as_str()).expect("roundtrip should succeed");
            assert_eq!(*format, parsed);
        }
    }

    #[test]
    fn unknown_output_format_error() {
        let err = OutputFormat::try_from("png").unwrap_err();
        assert!(err.to_string().contains("Unknown output format"));
    }

    #[test]
    fn render_all_calls_each_chart_once() {
        let charts = ChartSet::from_aggregates(&Aggregates::default());
        let mut surface = RecordingSurface::default();

        render_all(&charts, &mut surface).expect("render");
        assert_eq!(surface.calls, ChartId::all());
    }

    #[test]
    fn render_all_stops_at_first_failure() {
        let charts = ChartSet::from_aggregates(&Aggregates::default());
        let mut surface = RecordingSurface {
            fail_on: Some(ChartId::CloudCoverage),
            ..RecordingSurface::default()
        };

        let err = render_all(&charts, &mut surface).unwrap_err();
        assert_eq!(err.chart(), ChartId::CloudCoverage);
        assert_eq!(surface.calls, [ChartId::Heatmap]);
    }

    #[test]
    fn surfaces_report_file_locations() {
        let surface = surface_for(OutputFormat::Json, "out");
        assert_eq!(
            surface.location(ChartId::CloudCoverage),
            Some(PathBuf::from("out/cloud_coverage.json"))
        );

        let surface = surface_for(OutputFormat::Svg, "out");
        assert_eq!(
            surface.location(ChartId::Heatmap),
            Some(PathBuf::from("out/heatmap.svg"))
        );
    }
}
