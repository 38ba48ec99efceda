use std::path::PathBuf;

use anyhow::Result;
use plotters::{coord::Shift, prelude::*};

use crate::{
    chart::{CloudCoverageChart, HeatmapChart, SeriesColor, TemperatureChart},
    display::ChartId,
    error::RenderError,
    render::{OutputFormat, output_path, write_output},
};

use super::ChartSurface;

const CANVAS: (u32, u32) = (1280, 720);
const CAPTION_SIZE: u32 = 28;
const BAR_HALF_WIDTH: f64 = 0.35;
const RANGE_HALF_WIDTH: f64 = 0.45;

/// Draws each chart with plotters and writes it as an SVG file.
#[derive(Debug, Clone)]
pub struct SvgSurface {
    dir: PathBuf,
}

impl SvgSurface {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn write(&self, chart: ChartId, svg: Result<String>) -> Result<(), RenderError> {
        let svg = svg.map_err(|e| RenderError::Draw {
            chart,
            message: format!("{e:#}"),
        })?;
        write_output(&self.dir, chart, OutputFormat::Svg, &svg)?;
        Ok(())
    }
}

impl ChartSurface for SvgSurface {
    fn heatmap(&mut self, chart: &HeatmapChart) -> Result<(), RenderError> {
        self.write(ChartId::Heatmap, heatmap_svg(chart))
    }

    fn cloud_coverage(&mut self, chart: &CloudCoverageChart) -> Result<(), RenderError> {
        self.write(ChartId::CloudCoverage, cloud_coverage_svg(chart))
    }

    fn temperature(&mut self, chart: &TemperatureChart) -> Result<(), RenderError> {
        self.write(ChartId::Temperature, temperature_svg(chart))
    }

    fn location(&self, chart: ChartId) -> Option<PathBuf> {
        Some(output_path(&self.dir, chart, OutputFormat::Svg))
    }
}

pub fn heatmap_svg(chart: &HeatmapChart) -> Result<String> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, CANVAS).into_drawing_area();
        draw_heatmap(&root, chart)?;
        root.present()?;
    }
    Ok(svg)
}

pub fn cloud_coverage_svg(chart: &CloudCoverageChart) -> Result<String> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, CANVAS).into_drawing_area();
        draw_cloud_coverage(&root, chart)?;
        root.present()?;
    }
    Ok(svg)
}

pub fn temperature_svg(chart: &TemperatureChart) -> Result<String> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, CANVAS).into_drawing_area();
        draw_temperature(&root, chart)?;
        root.present()?;
    }
    Ok(svg)
}

fn draw_heatmap<DB>(root: &DrawingArea<DB, Shift>, chart: &HeatmapChart) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)?;

    let days = chart.x.len() as i32;
    let hours = chart.y.len() as i32;
    let (lo, hi) = chart.value_range().unwrap_or((0.0, 1.0));

    let mut ctx = ChartBuilder::on(root)
        .caption(&chart.title, ("sans-serif", CAPTION_SIZE))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(80)
        .build_cartesian_2d(0..days.max(1), 0..hours.max(1))?;

    let label_at = |labels: &[String], idx: i32| {
        usize::try_from(idx)
            .ok()
            .and_then(|i| labels.get(i))
            .cloned()
            .unwrap_or_default()
    };
    let x_formatter = |d: &i32| {
        let tick = i32::try_from(chart.tick_every.max(1)).unwrap_or(30);
        if d % tick == 0 {
            label_at(chart.x.as_slice(), *d)
        } else {
            String::new()
        }
    };
    let y_formatter = |h: &i32| label_at(chart.y.as_slice(), *h);

    ctx.configure_mesh()
        .disable_mesh()
        .x_desc(chart.x_title.as_str())
        .y_desc(chart.y_title.as_str())
        .x_labels(chart.ticks().count())
        .y_labels(chart.y.len())
        .x_label_formatter(&x_formatter)
        .y_label_formatter(&y_formatter)
        .draw()?;

    let cells = chart.z.iter().enumerate().flat_map(|(h, row)| {
        row.iter()
            .enumerate()
            .filter_map(move |(d, v)| v.map(|t| (h as i32, d as i32, t)))
    });

    ctx.draw_series(cells.map(|(h, d, t)| {
        Rectangle::new(
            [(d, h), (d + 1, h + 1)],
            yl_or_rd(normalize(t, lo, hi)).filled(),
        )
    }))?;

    Ok(())
}

fn draw_cloud_coverage<DB>(root: &DrawingArea<DB, Shift>, chart: &CloudCoverageChart) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)?;

    let months = chart.categories.len().max(1);
    let top = chart.stack_heights().into_iter().max().unwrap_or(0).max(1) as f64;

    let mut ctx = ChartBuilder::on(root)
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(-0.5..(months as f64 - 0.5), 0.0..top * 1.05)?;

    let x_formatter = |x: &f64| category_at(&chart.categories, *x);

    ctx.configure_mesh()
        .disable_x_mesh()
        .x_labels(months)
        .x_label_formatter(&x_formatter)
        .y_desc("Hours")
        .draw()?;

    let mut base = vec![0u32; months];
    for series in &chart.series {
        let color = to_rgba(&series.color);
        let bars: Vec<_> = series
            .values
            .iter()
            .zip(base.iter_mut())
            .enumerate()
            .map(|(m, (value, floor))| {
                let bottom = *floor as f64;
                *floor += value;
                let x = m as f64;
                Rectangle::new(
                    [
                        (x - BAR_HALF_WIDTH, bottom),
                        (x + BAR_HALF_WIDTH, bottom + *value as f64),
                    ],
                    color.filled(),
                )
            })
            .collect();

        ctx.draw_series(bars)?
            .label(series.label.as_str())
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 15, y + 5)], color.filled()));
    }

    ctx.configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    Ok(())
}

fn draw_temperature<DB>(root: &DrawingArea<DB, Shift>, chart: &TemperatureChart) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)?;

    let n = chart.dates.len().max(1);
    let (lo, hi) = chart.value_range().unwrap_or((0.0, 1.0));
    let pad = ((hi - lo) * 0.1).max(1.0);

    let mut ctx = ChartBuilder::on(root)
        .caption(&chart.title, ("sans-serif", CAPTION_SIZE))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(-0.5..(n as f64 - 0.5), (lo - pad)..(hi + pad))?;

    let x_formatter = |x: &f64| {
        nearest_index(*x)
            .and_then(|i| chart.dates.get(i))
            .map(|d| d.format("%b %d").to_string())
            .unwrap_or_default()
    };

    ctx.configure_mesh()
        .x_desc(chart.x_title.as_str())
        .y_desc(chart.y_title.as_str())
        .x_labels(12)
        .x_label_formatter(&x_formatter)
        .light_line_style(RGBColor(211, 211, 211))
        .draw()?;

    let range_color = to_rgba(&chart.range_color);
    let ranges = chart.min.iter().zip(&chart.max).enumerate().map(|(i, (min, max))| {
        let x = i as f64;
        Rectangle::new(
            [(x - RANGE_HALF_WIDTH, *min), (x + RANGE_HALF_WIDTH, *max)],
            range_color.filled(),
        )
    });
    ctx.draw_series(ranges)?
        .label(chart.range_label.as_str())
        .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 15, y + 5)], range_color.filled()));

    let line_style = to_rgba(&chart.avg_color).stroke_width(chart.avg_width);
    ctx.draw_series(LineSeries::new(
        chart.avg.iter().enumerate().map(|(i, avg)| (i as f64, *avg)),
        line_style,
    ))?
    .label(chart.avg_label.as_str())
    .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], line_style));

    ctx.configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    Ok(())
}

fn to_rgba(color: &SeriesColor) -> RGBAColor {
    let [r, g, b] = color.rgb;
    RGBColor(r, g, b).mix(color.alpha)
}

fn nearest_index(x: f64) -> Option<usize> {
    let rounded = x.round();
    if rounded < 0.0 || (x - rounded).abs() > 1e-6 {
        return None;
    }
    Some(rounded as usize)
}

fn category_at(categories: &[String], x: f64) -> String {
    nearest_index(x)
        .and_then(|i| categories.get(i))
        .cloned()
        .unwrap_or_default()
}

fn normalize(value: f64, lo: f64, hi: f64) -> f64 {
    if hi - lo <= f64::EPSILON {
        return 0.5;
    }
    ((value - lo) / (hi - lo)).clamp(0.0, 1.0)
}

/// Yellow-orange-red sequential color scale, `t` in 0..=1.
fn yl_or_rd(t: f64) -> RGBColor {
    const STOPS: [(u8, u8, u8); 5] = [
        (255, 255, 204),
        (254, 217, 118),
        (253, 141, 60),
        (227, 26, 28),
        (128, 0, 38),
    ];

    let scaled = t.clamp(0.0, 1.0) * (STOPS.len() - 1) as f64;
    let idx = (scaled.floor() as usize).min(STOPS.len() - 2);
    let frac = scaled - idx as f64;

    let (a, b) = (STOPS[idx], STOPS[idx + 1]);
    let lerp = |x: u8, y: u8| (x as f64 + (y as f64 - x as f64) * frac).round() as u8;
    RGBColor(lerp(a.0, b.0), lerp(a.1, b.1), lerp(a.2, b.2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    use crate::{
        chart::ChartSet,
        model::{Aggregates, CloudThresholds, DailyTemperature, HeatmapGrid},
        render::{render_all, tests::scratch_dir},
    };

    #[test]
    fn color_scale_endpoints() {
        assert_eq!(yl_or_rd(0.0), RGBColor(255, 255, 204));
        assert_eq!(yl_or_rd(1.0), RGBColor(128, 0, 38));
        assert_eq!(yl_or_rd(0.5), RGBColor(253, 141, 60));
    }

    #[test]
    fn normalize_handles_flat_ranges() {
        assert_eq!(normalize(3.0, 3.0, 3.0), 0.5);
        assert_eq!(normalize(5.0, 0.0, 10.0), 0.5);
        assert_eq!(normalize(-1.0, 0.0, 10.0), 0.0);
    }

    #[test]
    fn categories_only_label_whole_positions() {
        let cats = vec!["Jan".to_string(), "Feb".to_string()];

        assert_eq!(category_at(&cats, 1.0), "Feb");
        assert_eq!(category_at(&cats, 0.5), "");
        assert_eq!(category_at(&cats, -1.0), "");
        assert_eq!(category_at(&cats, 5.0), "");
    }

    #[test]
    fn heatmap_svg_contains_title() {
        let mut grid = HeatmapGrid::new();
        grid.set(1, 1, 20.0);
        grid.set(2, 2, 25.0);

        let svg = heatmap_svg(&HeatmapChart::from_grid(&grid)).expect("draw");

        assert!(svg.contains("<svg"));
        assert!(svg.contains("Heatmap of Temperatures"));
        assert!(svg.contains("<rect"));
    }

    #[test]
    fn cloud_svg_contains_legend() {
        let mut aggregates = Aggregates::default();
        aggregates
            .cloud_coverage
            .record(6, 2.0, &CloudThresholds::default());

        let chart = CloudCoverageChart::from_histogram(&aggregates.cloud_coverage);
        let svg = cloud_coverage_svg(&chart).expect("draw");

        assert!(svg.contains("BELOW range"));
        assert!(!svg.contains("Cloud Coverage"));
    }

    #[test]
    fn temperature_svg_draws_with_and_without_days() {
        let empty = temperature_svg(&TemperatureChart::from_daily(&[])).expect("draw empty");
        assert!(empty.contains("Average Daily Dry Bulb Temperature"));

        let day = DailyTemperature {
            date: NaiveDate::from_ymd_opt(2020, 1, 1).expect("valid date"),
            avg_temp: 5.0,
            min_temp: 0.0,
            max_temp: 10.0,
        };
        let svg = temperature_svg(&TemperatureChart::from_daily(&[day])).expect("draw");
        assert!(svg.contains("Dry Bulb Temperature Range"));
    }

    #[test]
    fn surface_writes_svg_files() {
        let dir = scratch_dir("svg-surface");
        let mut surface = SvgSurface::new(&dir);

        render_all(&ChartSet::from_aggregates(&Aggregates::default()), &mut surface)
            .expect("render");

        for id in ChartId::all() {
            let path = surface.location(*id).expect("file-backed");
            let contents = std::fs::read_to_string(&path).expect("written");
            assert!(contents.contains("<svg"));
        }

        let _ = std::fs::remove_dir_all(&dir);
    }
}
