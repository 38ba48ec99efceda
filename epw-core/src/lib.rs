//! Core library for the `epw` CLI.
//!
//! This crate defines:
//! - EPW layout and configuration handling
//! - Parsing of hourly records and their aggregation into three views
//! - Chart payloads and the surfaces that render them
//!
//! It is used by `epw-cli`, but can also be reused by other binaries or services.

pub mod aggregate;
pub mod chart;
pub mod config;
pub mod display;
pub mod error;
pub mod layout;
pub mod model;
pub mod parser;
pub mod render;

pub use aggregate::{AggregateSettings, Aggregator, aggregate, day_of_year, process};
pub use chart::{ChartSet, CloudCoverageChart, HeatmapChart, TemperatureChart};
pub use config::Config;
pub use display::{ChartId, Dashboard};
pub use error::RenderError;
pub use layout::EpwLayout;
pub use model::{
    Aggregates, CloudBucket, CloudCoverageHistogram, CloudThresholds, DailyStat,
    DailyTemperature, HeatmapGrid, HourlyRecord,
};
pub use parser::parse_records;
pub use render::{ChartSurface, OutputFormat, render_all, surface_for};
