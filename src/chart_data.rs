//! Prepare the seven dashboard views from the filtered movie table.
//!
//! Each view is computed independently and knows when it has nothing to show, so an empty
//! filter result degrades to per-panel placeholders instead of failing the pass.

use polars::prelude::*;
use serde::Serialize;

use crate::filter::{genre_label, GenreSelection};
use crate::movies::{
    float_values, string_values, LoadReport, MovieTable, BOX_OFFICE, BUDGET, CAST, DIRECTOR,
    GENRE, MONTH, RATING, TITLE,
};
use crate::statistics::{self, Histogram};
use crate::wordcloud::{self, CloudLayout, WordWeight, CLOUD_HEIGHT, CLOUD_WIDTH};

/// Entries shown in the ranked bar charts
pub const TOP_N: usize = 10;
pub const HISTOGRAM_BINS: usize = 10;

const COUNT: &str = "count";

const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

pub fn month_name(month: u32) -> &'static str {
    MONTH_NAMES
        .get((month as usize).wrapping_sub(1))
        .copied()
        .unwrap_or("?")
}

/// The dashboard panels, in display order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ChartKind {
    TopBoxOffice,
    RatingDistribution,
    BudgetVsBoxOffice,
    GenreRatings,
    TopDirectors,
    CastCloud,
    MonthlyReleases,
}

impl ChartKind {
    pub const ALL: [ChartKind; 7] = [
        ChartKind::TopBoxOffice,
        ChartKind::RatingDistribution,
        ChartKind::BudgetVsBoxOffice,
        ChartKind::GenreRatings,
        ChartKind::TopDirectors,
        ChartKind::CastCloud,
        ChartKind::MonthlyReleases,
    ];

    pub fn title(self) -> &'static str {
        match self {
            ChartKind::TopBoxOffice => "Top 10 Movies by Box Office Collection",
            ChartKind::RatingDistribution => "IMDb Rating Distribution",
            ChartKind::BudgetVsBoxOffice => "Budget vs Box Office Collection",
            ChartKind::GenreRatings => "Average IMDb Rating by Genre",
            ChartKind::TopDirectors => "Top 10 Directors by Number of Movies",
            ChartKind::CastCloud => "Most Frequent Cast Members",
            ChartKind::MonthlyReleases => "Movie Releases by Month",
        }
    }

    /// File name stem used when exporting
    pub fn file_stem(self) -> &'static str {
        match self {
            ChartKind::TopBoxOffice => "top_box_office",
            ChartKind::RatingDistribution => "rating_distribution",
            ChartKind::BudgetVsBoxOffice => "budget_vs_box_office",
            ChartKind::GenreRatings => "genre_ratings",
            ChartKind::TopDirectors => "top_directors",
            ChartKind::CastCloud => "cast_wordcloud",
            ChartKind::MonthlyReleases => "monthly_releases",
        }
    }
}

/// Tunables for the views, taken from the `[charts]` config section.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChartSettings {
    pub kde_points: usize,
    pub wordcloud_max_words: usize,
}

impl Default for ChartSettings {
    fn default() -> Self {
        Self {
            kde_points: 100,
            wordcloud_max_words: 200,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LabeledValue {
    pub label: String,
    pub value: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct RankedBars {
    pub bars: Vec<LabeledValue>,
}

impl RankedBars {
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn max_value(&self) -> f64 {
        self.bars.iter().map(|b| b.value).fold(0.0, f64::max)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct RatingDistribution {
    pub histogram: Histogram,
    /// KDE scaled to histogram counts; empty when the ratings have no spread
    pub density: Vec<(f64, f64)>,
}

impl RatingDistribution {
    pub fn is_empty(&self) -> bool {
        self.histogram.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GenreSeries {
    pub genre: String,
    /// (budget, box office)
    pub points: Vec<(f64, f64)>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct BudgetScatter {
    pub series: Vec<GenreSeries>,
}

impl BudgetScatter {
    pub fn is_empty(&self) -> bool {
        self.series.iter().all(|s| s.points.is_empty())
    }

    /// (max budget, max box office) over all points
    pub fn bounds(&self) -> (f64, f64) {
        self.series
            .iter()
            .flat_map(|s| s.points.iter())
            .fold((0.0, 0.0), |(bx, by), &(x, y)| (bx.max(x), by.max(y)))
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct CastCloud {
    pub words: Vec<WordWeight>,
    pub layout: CloudLayout,
}

impl CastCloud {
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct MonthlyReleases {
    /// Releases per calendar month, January first
    pub counts: [usize; 12],
}

impl MonthlyReleases {
    pub fn is_empty(&self) -> bool {
        self.counts.iter().all(|&c| c == 0)
    }

    pub fn max_count(&self) -> usize {
        self.counts.iter().copied().max().unwrap_or(0)
    }

    /// (month number, count) for all twelve months
    pub fn points(&self) -> Vec<(f64, f64)> {
        self.counts
            .iter()
            .enumerate()
            .map(|(i, &c)| ((i + 1) as f64, c as f64))
            .collect()
    }
}

fn sort_descending(by: &str) -> (Vec<Expr>, SortMultipleOptions) {
    (
        vec![col(by)],
        SortMultipleOptions {
            descending: vec![true],
            nulls_last: vec![true],
            maintain_order: true,
            ..Default::default()
        },
    )
}

fn labeled_values(frame: &DataFrame, label: &str, value: &str) -> PolarsResult<Vec<LabeledValue>> {
    let labels = string_values(frame, label)?;
    let values = float_values(frame, value)?;
    Ok(labels
        .into_iter()
        .zip(values)
        .map(|(label, value)| LabeledValue {
            label: genre_label(&label).to_string(),
            value: value.unwrap_or(f64::NAN),
        })
        .collect())
}

/// The ten highest-grossing titles, highest first. Ties keep table order.
pub fn top_box_office(frame: &DataFrame) -> PolarsResult<RankedBars> {
    let (by, options) = sort_descending(BOX_OFFICE);
    let top = frame
        .clone()
        .lazy()
        .select([col(TITLE), col(BOX_OFFICE)])
        .sort_by_exprs(by, options)
        .limit(TOP_N as IdxSize)
        .collect()?;
    Ok(RankedBars {
        bars: labeled_values(&top, TITLE, BOX_OFFICE)?,
    })
}

/// Histogram of ratings with a density curve scaled to the bin counts.
pub fn rating_distribution(
    frame: &DataFrame,
    kde_points: usize,
) -> PolarsResult<RatingDistribution> {
    let ratings: Vec<f64> = float_values(frame, RATING)?
        .into_iter()
        .flatten()
        .filter(|v| v.is_finite())
        .collect();
    let histogram = statistics::histogram(&ratings, HISTOGRAM_BINS);
    let scale = ratings.len() as f64 * histogram.bin_width();
    let density = statistics::gaussian_kde(&ratings, kde_points)
        .map(|curve| curve.into_iter().map(|(x, y)| (x, y * scale)).collect())
        .unwrap_or_default();
    Ok(RatingDistribution { histogram, density })
}

/// Budget against box office, one series per genre in first-appearance order.
pub fn budget_vs_box_office(frame: &DataFrame) -> PolarsResult<BudgetScatter> {
    let genres = string_values(frame, GENRE)?;
    let budgets = float_values(frame, BUDGET)?;
    let grosses = float_values(frame, BOX_OFFICE)?;

    let mut series: Vec<GenreSeries> = Vec::new();
    for ((genre, budget), gross) in genres.iter().zip(budgets).zip(grosses) {
        let (Some(x), Some(y)) = (budget, gross) else {
            continue;
        };
        let label = genre_label(genre);
        match series.iter_mut().find(|s| s.genre == label) {
            Some(s) => s.points.push((x, y)),
            None => series.push(GenreSeries {
                genre: label.to_string(),
                points: vec![(x, y)],
            }),
        }
    }
    Ok(BudgetScatter { series })
}

/// Mean rating per genre, highest first.
pub fn genre_ratings(frame: &DataFrame) -> PolarsResult<RankedBars> {
    let (by, options) = sort_descending(RATING);
    let grouped = frame
        .clone()
        .lazy()
        .group_by_stable([col(GENRE)])
        .agg([col(RATING).mean()])
        .sort_by_exprs(by, options)
        .collect()?;
    Ok(RankedBars {
        bars: labeled_values(&grouped, GENRE, RATING)?,
    })
}

/// The ten directors with the most titles. Ties keep first-appearance order.
pub fn top_directors(frame: &DataFrame) -> PolarsResult<RankedBars> {
    let (by, options) = sort_descending(COUNT);
    let counts = frame
        .clone()
        .lazy()
        .filter(col(DIRECTOR).is_not_null())
        .group_by_stable([col(DIRECTOR)])
        .agg([col(DIRECTOR).count().alias(COUNT)])
        .sort_by_exprs(by, options)
        .limit(TOP_N as IdxSize)
        .collect()?;
    Ok(RankedBars {
        bars: labeled_values(&counts, DIRECTOR, COUNT)?,
    })
}

/// Word frequencies over all non-missing cast entries, with an 800x400 layout.
pub fn cast_cloud(frame: &DataFrame, max_words: usize) -> PolarsResult<CastCloud> {
    let text = string_values(frame, CAST)?
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(", ");
    if text.trim().is_empty() {
        return Ok(CastCloud::default());
    }
    let words = wordcloud::word_frequencies(&text, max_words);
    let layout = wordcloud::layout(&words, CLOUD_WIDTH, CLOUD_HEIGHT);
    Ok(CastCloud { words, layout })
}

/// Release counts per calendar month. Rows without a month are not counted.
pub fn monthly_releases(frame: &DataFrame) -> PolarsResult<MonthlyReleases> {
    let mut counts = [0usize; 12];
    for month in frame.column(MONTH)?.i32()?.into_iter().flatten() {
        if (1..=12).contains(&month) {
            counts[(month - 1) as usize] += 1;
        }
    }
    Ok(MonthlyReleases { counts })
}

/// Everything one pass renders: the seven views plus context for the header.
#[derive(Clone, Debug, Serialize)]
pub struct Dashboard {
    pub source: String,
    pub total_rows: usize,
    pub filtered_rows: usize,
    pub selected_genres: Vec<String>,
    pub load_report: LoadReport,
    pub top_box_office: RankedBars,
    pub rating_distribution: RatingDistribution,
    pub budget_vs_box_office: BudgetScatter,
    pub genre_ratings: RankedBars,
    pub top_directors: RankedBars,
    pub cast_cloud: CastCloud,
    pub monthly_releases: MonthlyReleases,
}

impl Dashboard {
    pub fn build(
        source: &str,
        table: &MovieTable,
        filtered: &DataFrame,
        selection: &GenreSelection,
        settings: &ChartSettings,
    ) -> PolarsResult<Self> {
        Ok(Self {
            source: source.to_string(),
            total_rows: table.height(),
            filtered_rows: filtered.height(),
            selected_genres: selection.selected_labels(),
            load_report: table.report().clone(),
            top_box_office: top_box_office(filtered)?,
            rating_distribution: rating_distribution(filtered, settings.kde_points)?,
            budget_vs_box_office: budget_vs_box_office(filtered)?,
            genre_ratings: genre_ratings(filtered)?,
            top_directors: top_directors(filtered)?,
            cast_cloud: cast_cloud(filtered, settings.wordcloud_max_words)?,
            monthly_releases: monthly_releases(filtered)?,
        })
    }

    pub fn is_empty(&self, kind: ChartKind) -> bool {
        match kind {
            ChartKind::TopBoxOffice => self.top_box_office.is_empty(),
            ChartKind::RatingDistribution => self.rating_distribution.is_empty(),
            ChartKind::BudgetVsBoxOffice => self.budget_vs_box_office.is_empty(),
            ChartKind::GenreRatings => self.genre_ratings.is_empty(),
            ChartKind::TopDirectors => self.top_directors.is_empty(),
            ChartKind::CastCloud => self.cast_cloud.is_empty(),
            ChartKind::MonthlyReleases => self.monthly_releases.is_empty(),
        }
    }
}
