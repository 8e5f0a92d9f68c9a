//! Dashboard export: one PNG per chart (plotters bitmap) and a JSON summary.
//!
//! Charts are drawn independently. A chart that fails to draw is reported in the summary and
//! the rest are still written.

use color_eyre::Result;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::FontTransform;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use crate::chart_data::{
    month_name, BudgetScatter, CastCloud, ChartKind, Dashboard, MonthlyReleases, RankedBars,
    RatingDistribution,
};

/// File written next to the chart images
pub const SUMMARY_FILE: &str = "dashboard.json";

const NO_DATA: &str = "No data for the current selection";
const FONT: &str = "sans-serif";
const CHART_SIZE: (u32, u32) = (1000, 600);

const BAR: RGBColor = RGBColor(94, 201, 98);
const LINE: RGBColor = RGBColor(59, 82, 139);
const MUTED: RGBColor = RGBColor(120, 120, 120);
const PALETTE: [RGBColor; 8] = [
    RGBColor(68, 1, 84),
    RGBColor(59, 82, 139),
    RGBColor(33, 145, 140),
    RGBColor(94, 201, 98),
    RGBColor(253, 231, 37),
    RGBColor(230, 97, 1),
    RGBColor(178, 24, 43),
    RGBColor(118, 42, 131),
];

/// What an export wrote.
#[derive(Debug, Default)]
pub struct ExportSummary {
    pub dir: PathBuf,
    pub written: Vec<PathBuf>,
    pub failed: Vec<(ChartKind, String)>,
}

impl ExportSummary {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Path of a chart image inside `dir`
pub fn chart_path(dir: &Path, kind: ChartKind) -> PathBuf {
    dir.join(format!("{}.png", kind.file_stem()))
}

/// Write every chart and the JSON summary into `dir`, creating it if needed.
pub fn export_dashboard(dashboard: &Dashboard, dir: &Path) -> Result<ExportSummary> {
    fs::create_dir_all(dir)?;
    let mut summary = ExportSummary {
        dir: dir.to_path_buf(),
        ..Default::default()
    };

    for kind in ChartKind::ALL {
        let path = chart_path(dir, kind);
        match write_chart_png(dashboard, kind, &path) {
            Ok(()) => summary.written.push(path),
            Err(e) => {
                tracing::warn!(chart = kind.file_stem(), error = %e, "chart export failed");
                summary.failed.push((kind, e.to_string()));
            }
        }
    }

    let summary_path = dir.join(SUMMARY_FILE);
    write_summary_json(dashboard, &summary_path)?;
    summary.written.push(summary_path);

    tracing::info!(
        dir = %dir.display(),
        written = summary.written.len(),
        failed = summary.failed.len(),
        "exported dashboard"
    );
    Ok(summary)
}

/// Serialize the prepared views so the export can be checked without the images.
pub fn write_summary_json(dashboard: &Dashboard, path: &Path) -> Result<()> {
    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(writer, dashboard)?;
    Ok(())
}

/// Draw one chart. Empty views produce a titled placeholder image.
pub fn write_chart_png(dashboard: &Dashboard, kind: ChartKind, path: &Path) -> Result<()> {
    if dashboard.is_empty(kind) {
        let size = match kind {
            ChartKind::CastCloud => (
                dashboard.cast_cloud.layout.width.max(800),
                dashboard.cast_cloud.layout.height.max(400),
            ),
            _ => CHART_SIZE,
        };
        return draw_placeholder(path, size, kind.title());
    }

    match kind {
        ChartKind::TopBoxOffice => draw_ranked_hbars(
            path,
            kind.title(),
            "Box Office (Crores)",
            &dashboard.top_box_office,
            BAR,
        ),
        ChartKind::RatingDistribution => {
            draw_rating_distribution(path, kind.title(), &dashboard.rating_distribution)
        }
        ChartKind::BudgetVsBoxOffice => {
            draw_budget_scatter(path, kind.title(), &dashboard.budget_vs_box_office)
        }
        ChartKind::GenreRatings => draw_genre_ratings(path, kind.title(), &dashboard.genre_ratings),
        ChartKind::TopDirectors => draw_ranked_hbars(
            path,
            kind.title(),
            "Number of Movies",
            &dashboard.top_directors,
            LINE,
        ),
        ChartKind::CastCloud => draw_word_cloud(path, &dashboard.cast_cloud),
        ChartKind::MonthlyReleases => {
            draw_monthly_releases(path, kind.title(), &dashboard.monthly_releases)
        }
    }
}

fn upper_bound(max: f64) -> f64 {
    if max.is_finite() && max > 0.0 {
        max * 1.1
    } else {
        1.0
    }
}

fn truncate_label(label: &str, max_chars: usize) -> String {
    if label.chars().count() <= max_chars {
        label.to_string()
    } else {
        let mut s: String = label.chars().take(max_chars.saturating_sub(1)).collect();
        s.push('…');
        s
    }
}

/// Category label for a tick at `v` when categories sit on integer positions.
fn category_at(labels: &[String], v: f64) -> String {
    let idx = v.round();
    if (v - idx).abs() > 1e-6 || idx < 0.0 {
        return String::new();
    }
    labels.get(idx as usize).cloned().unwrap_or_default()
}

fn draw_placeholder(path: &Path, size: (u32, u32), title: &str) -> Result<()> {
    let root = BitMapBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE)?;
    let body = root.titled(title, (FONT, 24).into_font())?;
    let (w, h) = body.dim_in_pixel();
    let style = (FONT, 20)
        .into_font()
        .color(&MUTED)
        .pos(Pos::new(HPos::Center, VPos::Center));
    body.draw(&Text::new(NO_DATA, ((w / 2) as i32, (h / 2) as i32), style))?;
    root.present()?;
    Ok(())
}

fn draw_ranked_hbars(
    path: &Path,
    title: &str,
    x_desc: &str,
    ranked: &RankedBars,
    color: RGBColor,
) -> Result<()> {
    let n = ranked.bars.len();
    // Highest value at the top: rank i sits at y = n - 1 - i
    let labels: Vec<String> = ranked
        .bars
        .iter()
        .rev()
        .map(|b| truncate_label(&b.label, 30))
        .collect();
    let label_for = |y: &f64| category_at(&labels, *y);

    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(title, (FONT, 24).into_font())
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(240)
        .build_cartesian_2d(0.0..upper_bound(ranked.max_value()), -0.5..(n as f64 - 0.5))?;

    chart
        .configure_mesh()
        .disable_y_mesh()
        .y_labels(n.max(1))
        .y_label_formatter(&label_for)
        .x_desc(x_desc)
        .draw()?;

    chart.draw_series(ranked.bars.iter().enumerate().map(|(i, b)| {
        let y = (n - 1 - i) as f64;
        Rectangle::new([(0.0, y - 0.4), (b.value, y + 0.4)], color.filled())
    }))?;

    root.present()?;
    Ok(())
}

fn draw_rating_distribution(path: &Path, title: &str, dist: &RatingDistribution) -> Result<()> {
    let histogram = &dist.histogram;
    let (Some(&lo), Some(&hi)) = (histogram.edges.first(), histogram.edges.last()) else {
        return draw_placeholder(path, CHART_SIZE, title);
    };
    let density_max = dist.density.iter().map(|(_, y)| *y).fold(0.0, f64::max);
    let y_max = upper_bound((histogram.max_count() as f64).max(density_max));

    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(title, (FONT, 24).into_font())
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(lo..hi, 0.0..y_max)?;

    chart
        .configure_mesh()
        .x_desc("IMDb Rating")
        .y_desc("Count")
        .draw()?;

    chart.draw_series(
        histogram
            .edges
            .windows(2)
            .zip(&histogram.counts)
            .map(|(edge, &count)| {
                Rectangle::new([(edge[0], 0.0), (edge[1], count as f64)], BAR.mix(0.8).filled())
            }),
    )?;

    if !dist.density.is_empty() {
        chart.draw_series(LineSeries::new(
            dist.density.iter().copied(),
            LINE.stroke_width(2),
        ))?;
    }

    root.present()?;
    Ok(())
}

fn draw_budget_scatter(path: &Path, title: &str, scatter: &BudgetScatter) -> Result<()> {
    let (x_max, y_max) = scatter.bounds();

    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(title, (FONT, 24).into_font())
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(0.0..upper_bound(x_max), 0.0..upper_bound(y_max))?;

    chart
        .configure_mesh()
        .x_desc("Budget (Crores)")
        .y_desc("Box Office (Crores)")
        .draw()?;

    for (idx, series) in scatter.series.iter().enumerate() {
        let color = PALETTE[idx % PALETTE.len()];
        chart
            .draw_series(PointSeries::of_element(
                series.points.iter().copied(),
                4,
                color.mix(0.7),
                &|c, s, st| EmptyElement::at(c) + Circle::new((0, 0), s, st.filled()),
            ))?
            .label(series.genre.as_str())
            .legend(move |(x, y)| Circle::new((x + 10, y), 4, color.filled()));
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

fn draw_genre_ratings(path: &Path, title: &str, ratings: &RankedBars) -> Result<()> {
    let n = ratings.bars.len();
    let labels: Vec<String> = ratings
        .bars
        .iter()
        .map(|b| truncate_label(&b.label, 20))
        .collect();
    let label_for = |x: &f64| category_at(&labels, *x);

    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(title, (FONT, 24).into_font())
        .margin(20)
        .x_label_area_size(150)
        .y_label_area_size(50)
        .build_cartesian_2d(-0.5..(n as f64 - 0.5), 0.0..upper_bound(ratings.max_value()))?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(n.max(1))
        .x_label_formatter(&label_for)
        .x_label_style((FONT, 14).into_font().transform(FontTransform::Rotate90))
        .y_desc("Average IMDb Rating")
        .draw()?;

    chart.draw_series(ratings.bars.iter().enumerate().map(|(i, b)| {
        let x = i as f64;
        Rectangle::new([(x - 0.4, 0.0), (x + 0.4, b.value)], BAR.filled())
    }))?;

    root.present()?;
    Ok(())
}

fn draw_monthly_releases(path: &Path, title: &str, monthly: &MonthlyReleases) -> Result<()> {
    let label_for = |x: &f64| {
        let m = x.round();
        if (x - m).abs() > 1e-6 {
            String::new()
        } else {
            month_name(m as u32).to_string()
        }
    };

    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(title, (FONT, 24).into_font())
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(0.5..12.5, 0.0..upper_bound(monthly.max_count() as f64))?;

    chart
        .configure_mesh()
        .x_labels(12)
        .x_label_formatter(&label_for)
        .x_desc("Month")
        .y_desc("Number of Releases")
        .draw()?;

    let points = monthly.points();
    chart.draw_series(LineSeries::new(points.iter().copied(), LINE.stroke_width(2)))?;
    chart.draw_series(
        points
            .iter()
            .map(|&(x, y)| Circle::new((x, y), 4, LINE.filled())),
    )?;

    root.present()?;
    Ok(())
}

fn draw_word_cloud(path: &Path, cloud: &CastCloud) -> Result<()> {
    let layout = &cloud.layout;
    let root = BitMapBackend::new(path, (layout.width, layout.height)).into_drawing_area();
    root.fill(&WHITE)?;
    for (idx, word) in layout.words.iter().enumerate() {
        let color = PALETTE[idx % PALETTE.len()];
        let style = (FONT, word.font_size).into_font().color(&color);
        root.draw(&Text::new(
            word.word.as_str(),
            (word.x as i32, word.y as i32),
            style,
        ))?;
    }
    root.present()?;
    Ok(())
}
