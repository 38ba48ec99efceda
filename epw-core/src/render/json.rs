use std::path::PathBuf;

use serde::Serialize;

use crate::{
    chart::{CloudCoverageChart, HeatmapChart, TemperatureChart},
    display::ChartId,
    error::RenderError,
    render::{OutputFormat, output_path, write_output},
};

use super::ChartSurface;

/// Writes each chart payload as pretty-printed JSON, one file per chart.
#[derive(Debug, Clone)]
pub struct JsonSurface {
    dir: PathBuf,
}

impl JsonSurface {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn write<T: Serialize>(&self, chart: ChartId, payload: &T) -> Result<(), RenderError> {
        let json = to_json(chart, payload)?;
        write_output(&self.dir, chart, OutputFormat::Json, &json)?;
        Ok(())
    }
}

pub fn to_json<T: Serialize>(chart: ChartId, payload: &T) -> Result<String, RenderError> {
    serde_json::to_string_pretty(payload).map_err(|source| RenderError::Encode { chart, source })
}

impl ChartSurface for JsonSurface {
    fn heatmap(&mut self, chart: &HeatmapChart) -> Result<(), RenderError> {
        self.write(ChartId::Heatmap, chart)
    }

    fn cloud_coverage(&mut self, chart: &CloudCoverageChart) -> Result<(), RenderError> {
        self.write(ChartId::CloudCoverage, chart)
    }

    fn temperature(&mut self, chart: &TemperatureChart) -> Result<(), RenderError> {
        self.write(ChartId::Temperature, chart)
    }

    fn location(&self, chart: ChartId) -> Option<PathBuf> {
        Some(output_path(&self.dir, chart, OutputFormat::Json))
    }
}
