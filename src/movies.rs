//! Movie dataset ingestion: read the upload as a table, check the schema, and normalize it.
//!
//! Normalization runs in a fixed order: type coercion, release-date parsing, Month/Quarter
//! derivation, rating imputation, then dropping rows without Title, Budget_Cr or BoxOffice_Cr.
//! The rating mean is taken over every row present at load, before any row is dropped.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use polars::prelude::*;
use serde::Serialize;
use std::collections::HashSet;
use std::io::Cursor;

use crate::error::LoadError;
use crate::source::Upload;
use crate::statistics;

pub const TITLE: &str = "Title";
pub const GENRE: &str = "Genre";
pub const DIRECTOR: &str = "Director";
pub const CAST: &str = "Cast";
pub const BUDGET: &str = "Budget_Cr";
pub const BOX_OFFICE: &str = "BoxOffice_Cr";
pub const RATING: &str = "IMDb_Rating";
pub const RELEASE_DATE: &str = "Release_Date";
pub const MONTH: &str = "Month";
pub const QUARTER: &str = "Quarter";

/// Columns an upload must provide.
pub const REQUIRED_COLUMNS: [&str; 8] = [
    TITLE,
    GENRE,
    DIRECTOR,
    CAST,
    BUDGET,
    BOX_OFFICE,
    RATING,
    RELEASE_DATE,
];

/// Rows used to infer column types when not configured.
pub const DEFAULT_INFER_SCHEMA_LENGTH: usize = 1000;

/// Label shown for rows without a genre.
pub const MISSING_GENRE_LABEL: &str = "(none)";

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%m-%d-%Y",
    "%d.%m.%Y",
    "%d %B %Y",
    "%B %d, %Y",
    "%B %d %Y",
    "%d-%b-%Y",
    "%d-%b-%y",
    "%Y%m%d",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M",
    "%d/%m/%Y %H:%M",
];

/// Best-effort release date parse. Ambiguous slash dates are read month-first.
pub fn parse_release_date(value: &str) -> Option<NaiveDate> {
    let s = value.trim();
    if s.is_empty() {
        return None;
    }

    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Some(date);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }

    // Partial dates: "2024-03" and "2024" resolve to the first day of the period
    let is_digits = |p: &str| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit());
    match s.split_once('-') {
        Some((year, month)) if year.len() == 4 && is_digits(year) && is_digits(month) => {
            NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, 1)
        }
        None if s.len() == 4 && is_digits(s) => NaiveDate::from_ymd_opt(s.parse().ok()?, 1, 1),
        _ => None,
    }
}

/// Quarter (1-4) of a date
pub fn quarter_of(date: NaiveDate) -> u32 {
    date.month0() / 3 + 1
}

/// Read the upload as delimited text with a header row.
pub fn read_frame(
    upload: &Upload,
    delimiter: u8,
    infer_schema_length: Option<usize>,
) -> Result<DataFrame, LoadError> {
    let read_options = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(
            infer_schema_length.unwrap_or(DEFAULT_INFER_SCHEMA_LENGTH),
        ))
        .map_parse_options(|opts| opts.with_separator(delimiter));

    CsvReader::new(Cursor::new(upload.bytes.clone()))
        .with_options(read_options)
        .finish()
        .map_err(|source| LoadError::Parse {
            name: upload.name.clone(),
            source,
        })
}

/// Fail with every missing required column at once.
pub fn check_schema(frame: &DataFrame) -> Result<(), LoadError> {
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|name| frame.column(name).is_err())
        .map(|name| name.to_string())
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(LoadError::MissingColumns(missing))
    }
}

/// What normalization did to the upload.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct LoadReport {
    pub rows_read: usize,
    pub rows_dropped: usize,
    pub ratings_imputed: usize,
    /// Mean used for imputation (None when the upload has no rating at all)
    pub rating_mean: Option<f64>,
    /// Release dates present but not understood
    pub unparseable_dates: usize,
}

/// The normalized movie table held for one session pass.
#[derive(Clone, Debug)]
pub struct MovieTable {
    frame: DataFrame,
    report: LoadReport,
}

impl MovieTable {
    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn report(&self) -> &LoadReport {
        &self.report
    }

    pub fn height(&self) -> usize {
        self.frame.height()
    }

    /// Distinct genres in first-appearance order; a missing genre is its own entry.
    pub fn genres(&self) -> PolarsResult<Vec<Option<String>>> {
        let mut seen = HashSet::new();
        let mut genres = Vec::new();
        for genre in string_values(&self.frame, GENRE)? {
            if seen.insert(genre.clone()) {
                genres.push(genre);
            }
        }
        Ok(genres)
    }
}

/// Normalize a raw frame into the movie table.
pub fn normalize(raw: DataFrame) -> Result<MovieTable, LoadError> {
    check_schema(&raw)?;
    let rows_read = raw.height();

    let mut frame = raw
        .lazy()
        .select([
            col(TITLE).cast(DataType::String),
            col(GENRE).cast(DataType::String),
            col(DIRECTOR).cast(DataType::String),
            col(CAST).cast(DataType::String),
            col(BUDGET).cast(DataType::Float64),
            col(BOX_OFFICE).cast(DataType::Float64),
            col(RATING).cast(DataType::Float64),
            col(RELEASE_DATE).cast(DataType::String),
        ])
        .collect()?;

    let raw_dates = string_values(&frame, RELEASE_DATE)?;
    let dates: Vec<Option<NaiveDate>> = raw_dates
        .iter()
        .map(|v| v.as_deref().and_then(parse_release_date))
        .collect();
    let unparseable_dates = raw_dates
        .iter()
        .zip(&dates)
        .filter(|(raw, parsed)| {
            raw.as_deref().is_some_and(|s| !s.trim().is_empty()) && parsed.is_none()
        })
        .count();

    let iso_dates: Vec<Option<String>> = dates
        .iter()
        .map(|d| d.map(|d| d.format("%Y-%m-%d").to_string()))
        .collect();
    let months: Vec<Option<i32>> = dates.iter().map(|d| d.map(|d| d.month() as i32)).collect();
    let quarters: Vec<Option<i32>> = dates
        .iter()
        .map(|d| d.map(|d| quarter_of(d) as i32))
        .collect();
    frame.with_column(Series::new(RELEASE_DATE.into(), iso_dates))?;
    frame.with_column(Series::new(MONTH.into(), months))?;
    frame.with_column(Series::new(QUARTER.into(), quarters))?;

    // Imputation uses the full loaded population, before the required-field drop.
    let ratings = float_values(&frame, RATING)?;
    let ratings_imputed = ratings.iter().filter(|r| r.is_none()).count();
    let present: Vec<f64> = ratings.iter().flatten().copied().collect();
    let rating_mean = statistics::mean(&present);
    let fill_value = rating_mean.unwrap_or(f64::NAN);

    let frame = frame
        .lazy()
        .with_column(col(RATING).fill_null(lit(fill_value)))
        .filter(
            col(TITLE)
                .is_not_null()
                .and(col(BUDGET).is_not_null())
                .and(col(BOX_OFFICE).is_not_null()),
        )
        .collect()?;

    let report = LoadReport {
        rows_read,
        rows_dropped: rows_read - frame.height(),
        ratings_imputed,
        rating_mean,
        unparseable_dates,
    };
    tracing::info!(
        rows_read = report.rows_read,
        rows_dropped = report.rows_dropped,
        ratings_imputed = report.ratings_imputed,
        rating_mean = ?report.rating_mean,
        unparseable_dates = report.unparseable_dates,
        "normalized movie table"
    );

    Ok(MovieTable { frame, report })
}

/// Read an upload and normalize it in one step.
pub fn load_movies(
    upload: &Upload,
    delimiter: u8,
    infer_schema_length: Option<usize>,
) -> Result<MovieTable, LoadError> {
    normalize(read_frame(upload, delimiter, infer_schema_length)?)
}

/// Values of a String column
pub(crate) fn string_values(frame: &DataFrame, name: &str) -> PolarsResult<Vec<Option<String>>> {
    Ok(frame
        .column(name)?
        .str()?
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect())
}

/// Values of a numeric column as f64
pub(crate) fn float_values(frame: &DataFrame, name: &str) -> PolarsResult<Vec<Option<f64>>> {
    let column = frame.column(name)?.cast(&DataType::Float64)?;
    Ok(column.f64()?.into_iter().collect())
}
