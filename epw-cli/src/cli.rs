use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use epw_core::{ChartId, ChartSet, Config, Dashboard, OutputFormat, render_all, surface_for};
use inquire::{CustomType, Select, Text};
use tracing::{info, instrument, warn};

use crate::report;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "epw", version, about = "EPW weather file charts")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Render the heatmap, cloud coverage and temperature charts for EPW files.
    Render {
        /// One or more EPW files; they are processed one after another.
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Output directory; each file gets its own sub-directory.
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Output format, "svg" or "json". Defaults to the configured format.
        #[arg(short, long)]
        format: Option<String>,

        /// Chart to summarize: heatmap, cloudCoverage or temperature.
        #[arg(long, default_value = "heatmap")]
        show: String,
    },

    /// Interactively configure output and aggregation defaults.
    Configure,

    /// Print the location of the config file.
    ConfigPath,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Command::Render {
                files,
                out,
                format,
                show,
            } => {
                let config = Config::load()?;
                let format = match format {
                    Some(f) => OutputFormat::try_from(f.as_str())?,
                    None => config.default_format()?,
                };
                let dashboard = dashboard_for(&show)?;
                let out = out.unwrap_or_else(|| config.output_dir());

                // One file at a time; the next read starts after the previous render.
                for file in &files {
                    render_file(file, &out, format, &config, &dashboard).await?;
                }
            }
            Command::Configure => configure()?,
            Command::ConfigPath => {
                println!("{}", Config::config_file_path()?.display());
            }
        }

        Ok(())
    }
}

#[instrument(skip_all, fields(file = %file.display(), format = %format))]
async fn render_file(
    file: &Path,
    out: &Path,
    format: OutputFormat,
    config: &Config,
    dashboard: &Dashboard,
) -> Result<()> {
    let bytes = tokio::fs::read(file)
        .await
        .with_context(|| format!("Failed to read EPW file: {}", file.display()))?;
    let text = String::from_utf8_lossy(&bytes);

    let aggregates = epw_core::process(&text, config);
    if aggregates.is_empty() {
        warn!("no data lines found; rendering empty charts");
    }

    let charts = ChartSet::from_aggregates(&aggregates);
    let dir = out.join(output_subdir(file));
    let mut surface = surface_for(format, &dir);

    render_all(&charts, surface.as_mut())
        .with_context(|| format!("Failed to render charts for {}", file.display()))?;

    info!(records = aggregates.records_seen, dir = %dir.display(), "charts rendered");

    let visible = dashboard.visible();
    println!("{}", file.display());
    println!("{}", report::summary(visible, &aggregates));
    if let Some(path) = surface.location(visible) {
        println!("  -> {}", path.display());
    }

    Ok(())
}

/// Starts from the default dashboard and switches to the chart named by `--show`.
fn dashboard_for(show: &str) -> Result<Dashboard> {
    let mut dashboard = Dashboard::default();
    dashboard.show(ChartId::try_from(show)?);
    Ok(dashboard)
}

fn output_subdir(file: &Path) -> PathBuf {
    file.file_stem()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("epw"))
}

fn configure() -> Result<()> {
    let mut config = Config::load()?;

    let format = Select::new("Default output format:", OutputFormat::all().to_vec())
        .with_starting_cursor(
            OutputFormat::all()
                .iter()
                .position(|f| Some(*f) == config.default_format().ok())
                .unwrap_or(0),
        )
        .prompt()?;
    config.set_default_format(format);

    let current_dir = config.output_dir().display().to_string();
    let dir = Text::new("Output directory:")
        .with_default(&current_dir)
        .prompt()?;
    config.output_dir = Some(PathBuf::from(dir));

    let year = CustomType::<i32>::new("Reference year for daily temperature dates:")
        .with_default(config.reference_year())
        .prompt()?;
    config.reference_year = Some(year);

    let current = config.cloud_thresholds();
    let above = CustomType::<f64>::new("Cloud cover above-range threshold (values > this):")
        .with_default(current.above)
        .prompt()?;
    let below = CustomType::<f64>::new("Cloud cover below-range threshold (values < this):")
        .with_default(current.below)
        .prompt()?;
    config.set_cloud_thresholds(above, below)?;

    config.save()?;
    println!(
        "Configuration saved to {}",
        Config::config_file_path()?.display()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn render_accepts_several_files() {
        let cli = Cli::try_parse_from(["epw", "render", "a.epw", "b.epw", "--format", "json"])
            .expect("valid args");

        match cli.command {
            Command::Render {
                files,
                format,
                show,
                out,
            } => {
                assert_eq!(files, [PathBuf::from("a.epw"), PathBuf::from("b.epw")]);
                assert_eq!(format.as_deref(), Some("json"));
                assert_eq!(show, "heatmap");
                assert!(out.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn render_requires_a_file() {
        assert!(Cli::try_parse_from(["epw", "render"]).is_err());
    }

    #[test]
    fn show_switches_the_visible_chart() {
        let dashboard = dashboard_for("cloudCoverage").expect("known chart");
        assert_eq!(dashboard.visible(), ChartId::CloudCoverage);
        assert!(!dashboard.is_visible(ChartId::Heatmap));

        assert_eq!(
            dashboard_for("heatmap").expect("known chart").visible(),
            ChartId::Heatmap
        );
        assert!(dashboard_for("pie").is_err());
    }

    #[test]
    fn output_subdir_uses_file_stem() {
        assert_eq!(
            output_subdir(Path::new("data/USA_CO_Golden.epw")),
            PathBuf::from("USA_CO_Golden")
        );
        assert_eq!(output_subdir(Path::new("")), PathBuf::from("epw"));
    }
}
