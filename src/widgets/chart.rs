//! Terminal renderings of the dashboard panels.

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{
        Axis, Bar, BarChart, BarGroup, Block, Borders, Chart, Dataset, GraphType, LegendPosition,
        Paragraph, Widget, Wrap,
    },
};

use crate::chart_data::{
    month_name, BudgetScatter, CastCloud, ChartKind, Dashboard, MonthlyReleases, RankedBars,
    RatingDistribution,
};
use crate::config::Theme;

const NO_DATA: &str = "No data for the current selection";

/// Render one panel: a bordered block titled with the chart's subheading and the chart inside.
pub fn render_chart_panel(
    kind: ChartKind,
    dashboard: &Dashboard,
    theme: &Theme,
    area: Rect,
    buf: &mut Buffer,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.get("sidebar_border")))
        .title(Span::styled(
            format!(" {} ", kind.title()),
            Style::default()
                .fg(theme.get("subheading"))
                .add_modifier(Modifier::BOLD),
        ));
    let inner = block.inner(area);
    block.render(area, buf);

    if dashboard.is_empty(kind) {
        render_placeholder(inner, buf, theme);
        return;
    }

    match kind {
        ChartKind::TopBoxOffice => {
            render_ranked_bars(&dashboard.top_box_office, 1, inner, buf, theme)
        }
        ChartKind::RatingDistribution => {
            render_rating_distribution(&dashboard.rating_distribution, inner, buf, theme)
        }
        ChartKind::BudgetVsBoxOffice => {
            render_budget_scatter(&dashboard.budget_vs_box_office, inner, buf, theme)
        }
        ChartKind::GenreRatings => {
            render_genre_ratings(&dashboard.genre_ratings, inner, buf, theme)
        }
        ChartKind::TopDirectors => {
            render_ranked_bars(&dashboard.top_directors, 0, inner, buf, theme)
        }
        ChartKind::CastCloud => render_cast_cloud(&dashboard.cast_cloud, inner, buf, theme),
        ChartKind::MonthlyReleases => {
            render_monthly_releases(&dashboard.monthly_releases, inner, buf, theme)
        }
    }
}

pub fn render_placeholder(area: Rect, buf: &mut Buffer, theme: &Theme) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(1),
            Constraint::Fill(1),
        ])
        .split(area);
    Paragraph::new(NO_DATA)
        .style(Style::default().fg(theme.get("dimmed")))
        .centered()
        .render(layout[1], buf);
}

fn format_value(v: f64, decimals: usize) -> String {
    if v.abs() >= 1e6 {
        format!("{:.2e}", v)
    } else {
        format!("{:.*}", decimals, v)
    }
}

fn truncate(label: &str, max: usize) -> String {
    if label.chars().count() <= max {
        label.to_string()
    } else {
        let mut s: String = label.chars().take(max.saturating_sub(1)).collect();
        s.push('…');
        s
    }
}

/// Horizontal ranked bars, highest first. BarChart takes integer values, so values are scaled.
fn render_ranked_bars(
    ranked: &RankedBars,
    decimals: usize,
    area: Rect,
    buf: &mut Buffer,
    theme: &Theme,
) {
    const SCALE: f64 = 100.0;
    let label_width = (area.width / 3).max(8) as usize;
    let bar_style = Style::default().fg(theme.get("chart_bar"));
    let value_style = Style::default().fg(theme.get("text_primary"));

    let bars: Vec<Bar> = ranked
        .bars
        .iter()
        .map(|b| {
            Bar::default()
                .value((b.value.max(0.0) * SCALE) as u64)
                .label(Line::from(truncate(&b.label, label_width)))
                .text_value(format_value(b.value, decimals))
                .style(bar_style)
                .value_style(value_style)
        })
        .collect();

    BarChart::default()
        .direction(Direction::Horizontal)
        .bar_width(1)
        .bar_gap(0)
        .bar_style(bar_style)
        .label_style(Style::default().fg(theme.get("text_secondary")))
        .data(BarGroup::default().bars(&bars))
        .render(area, buf);
}

fn render_genre_ratings(ratings: &RankedBars, area: Rect, buf: &mut Buffer, theme: &Theme) {
    const SCALE: f64 = 100.0;
    let n = ratings.bars.len().max(1) as u16;
    let bar_width = (area.width / n).saturating_sub(1).clamp(1, 12);
    let bar_style = Style::default().fg(theme.get("chart_bar"));

    let bars: Vec<Bar> = ratings
        .bars
        .iter()
        .map(|b| {
            Bar::default()
                .value((b.value.max(0.0) * SCALE) as u64)
                .label(Line::from(truncate(&b.label, bar_width as usize)))
                .text_value(format_value(b.value, 1))
                .style(bar_style)
        })
        .collect();

    BarChart::default()
        .bar_width(bar_width)
        .bar_gap(1)
        .bar_style(bar_style)
        .value_style(
            Style::default()
                .fg(theme.get("background"))
                .bg(theme.get("chart_bar")),
        )
        .label_style(Style::default().fg(theme.get("text_secondary")))
        .data(BarGroup::default().bars(&bars))
        .render(area, buf);
}

fn axis_labels(lo: f64, hi: f64, decimals: usize, style: Style) -> Vec<Span<'static>> {
    vec![
        Span::styled(format_value(lo, decimals), style),
        Span::styled(format_value((lo + hi) / 2.0, decimals), style),
        Span::styled(format_value(hi, decimals), style),
    ]
}

fn render_rating_distribution(
    dist: &RatingDistribution,
    area: Rect,
    buf: &mut Buffer,
    theme: &Theme,
) {
    let histogram = &dist.histogram;
    let (Some(&lo), Some(&hi)) = (histogram.edges.first(), histogram.edges.last()) else {
        render_placeholder(area, buf, theme);
        return;
    };

    // Each bin drawn as a run of vertical bars across its width
    const STEPS_PER_BIN: usize = 8;
    let bars: Vec<(f64, f64)> = histogram
        .edges
        .windows(2)
        .zip(&histogram.counts)
        .flat_map(|(edge, &count)| {
            let step = (edge[1] - edge[0]) / STEPS_PER_BIN as f64;
            (0..STEPS_PER_BIN).map(move |i| (edge[0] + step * (i as f64 + 0.5), count as f64))
        })
        .collect();

    let density_max = dist.density.iter().map(|(_, y)| *y).fold(0.0, f64::max);
    let y_max = (histogram.max_count() as f64).max(density_max).max(1.0) * 1.1;
    let label_style = Style::default().fg(theme.get("text_primary"));

    let mut datasets = vec![Dataset::default()
        .name("count")
        .marker(symbols::Marker::HalfBlock)
        .graph_type(GraphType::Bar)
        .style(Style::default().fg(theme.get("chart_bar")))
        .data(&bars)];
    if !dist.density.is_empty() {
        datasets.push(
            Dataset::default()
                .name("density")
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(theme.get("chart_line")))
                .data(&dist.density),
        );
    }

    Chart::new(datasets)
        .x_axis(
            Axis::default()
                .title("IMDb Rating")
                .bounds([lo, hi])
                .style(label_style)
                .labels(axis_labels(lo, hi, 1, label_style)),
        )
        .y_axis(
            Axis::default()
                .title("Count")
                .bounds([0.0, y_max])
                .style(label_style)
                .labels(axis_labels(0.0, y_max, 0, label_style)),
        )
        .legend_position(Some(LegendPosition::TopRight))
        .render(area, buf);
}

fn render_budget_scatter(scatter: &BudgetScatter, area: Rect, buf: &mut Buffer, theme: &Theme) {
    let (x_max, y_max) = scatter.bounds();
    let (x_max, y_max) = (x_max.max(1.0) * 1.05, y_max.max(1.0) * 1.05);
    let label_style = Style::default().fg(theme.get("text_primary"));

    let datasets: Vec<Dataset> = scatter
        .series
        .iter()
        .enumerate()
        .map(|(i, s)| {
            Dataset::default()
                .name(s.genre.as_str())
                .marker(symbols::Marker::Dot)
                .graph_type(GraphType::Scatter)
                .style(Style::default().fg(theme.series_color(i)))
                .data(&s.points)
        })
        .collect();

    Chart::new(datasets)
        .x_axis(
            Axis::default()
                .title("Budget (Cr)")
                .bounds([0.0, x_max])
                .style(label_style)
                .labels(axis_labels(0.0, x_max, 0, label_style)),
        )
        .y_axis(
            Axis::default()
                .title("Box Office (Cr)")
                .bounds([0.0, y_max])
                .style(label_style)
                .labels(axis_labels(0.0, y_max, 0, label_style)),
        )
        .legend_position(Some(LegendPosition::TopLeft))
        .render(area, buf);
}

fn render_monthly_releases(monthly: &MonthlyReleases, area: Rect, buf: &mut Buffer, theme: &Theme) {
    let points = monthly.points();
    let y_max = (monthly.max_count() as f64).max(1.0) * 1.1;
    let label_style = Style::default().fg(theme.get("text_primary"));
    let line_style = Style::default().fg(theme.get("chart_line"));

    let month_labels: Vec<Span> = (1..=12)
        .map(|m| Span::styled(month_name(m), label_style))
        .collect();

    let datasets = vec![
        Dataset::default()
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(line_style)
            .data(&points),
        Dataset::default()
            .marker(symbols::Marker::Dot)
            .graph_type(GraphType::Scatter)
            .style(line_style.add_modifier(Modifier::BOLD))
            .data(&points),
    ];

    Chart::new(datasets)
        .x_axis(
            Axis::default()
                .title("Month")
                .bounds([1.0, 12.0])
                .style(label_style)
                .labels(month_labels),
        )
        .y_axis(
            Axis::default()
                .title("Releases")
                .bounds([0.0, y_max])
                .style(label_style)
                .labels(axis_labels(0.0, y_max, 0, label_style)),
        )
        .legend_position(None)
        .render(area, buf);
}

/// Words in frequency order, emphasis stepping down with weight.
fn render_cast_cloud(cloud: &CastCloud, area: Rect, buf: &mut Buffer, theme: &Theme) {
    let strong = Style::default()
        .fg(theme.get("primary"))
        .add_modifier(Modifier::BOLD);
    let medium = Style::default().fg(theme.get("secondary"));
    let light = Style::default().fg(theme.get("text_secondary"));

    let mut spans: Vec<Span> = Vec::with_capacity(cloud.words.len() * 2);
    for word in &cloud.words {
        let style = if word.weight >= 0.66 {
            strong
        } else if word.weight >= 0.33 {
            medium
        } else {
            light
        };
        spans.push(Span::styled(word.word.as_str(), style));
        spans.push(Span::raw("  "));
    }

    Paragraph::new(Line::from(spans))
        .wrap(Wrap { trim: true })
        .render(area, buf);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_keeps_short_labels() {
        assert_eq!(truncate("Drama", 8), "Drama");
        assert_eq!(truncate("Documentary", 6), "Docum…");
    }

    #[test]
    fn large_values_use_scientific_notation() {
        assert_eq!(format_value(12.345, 1), "12.3");
        assert_eq!(format_value(2_500_000.0, 0), "2.50e6");
    }

    #[test]
    fn box_office_bars_show_one_decimal() {
        use crate::chart_data::LabeledValue;

        let ranked = RankedBars {
            bars: vec![LabeledValue {
                label: "Alpha".into(),
                value: 512.5,
            }],
        };
        let area = Rect::new(0, 0, 40, 3);
        let mut buf = Buffer::empty(area);
        render_ranked_bars(&ranked, 1, area, &mut buf, &Theme::default());
        let text: String = (0..area.height)
            .flat_map(|y| (0..area.width).map(move |x| (x, y)))
            .map(|(x, y)| buf[(x, y)].symbol().to_string())
            .collect();
        assert!(text.contains("512.5"), "{text}");
    }
}
