use cinedash::chart_data::{top_box_office, top_directors, ChartKind, ChartSettings};
use cinedash::filter::filter_by_genres;
use cinedash::movies::{load_movies, RATING, TITLE};
use cinedash::{GenreSelection, LoadError, OpenOptions, Session, Upload};
use flate2::write::GzEncoder;
use flate2::Compression;
use polars::prelude::*;
use std::io::Write;

mod common;

use common::{directors_csv, write_dataset, MOVIES_CSV, SCENARIO_A_CSV};

fn titles(frame: &DataFrame) -> Vec<Option<String>> {
    frame
        .column(TITLE)
        .unwrap()
        .str()
        .unwrap()
        .into_iter()
        .map(|t| t.map(str::to_string))
        .collect()
}

fn ratings(frame: &DataFrame) -> Vec<Option<f64>> {
    frame
        .column(RATING)
        .unwrap()
        .f64()
        .unwrap()
        .into_iter()
        .collect()
}

fn labels(bars: &cinedash::chart_data::RankedBars) -> Vec<String> {
    bars.bars.iter().map(|b| b.label.clone()).collect()
}

#[test]
fn imputation_uses_mean_of_all_loaded_ratings() {
    let table = load_movies(&Upload::from_bytes("movies.csv", MOVIES_CSV), b',', None).unwrap();

    // Epsilon (7.5) is dropped for its missing box office but still counts toward the mean.
    let report = table.report();
    assert_eq!(report.rows_read, 6);
    assert_eq!(report.rows_dropped, 1);
    assert_eq!(report.ratings_imputed, 1);
    assert_eq!(report.unparseable_dates, 1);
    let mean = report.rating_mean.unwrap();
    assert!((mean - 6.8).abs() < 1e-9);

    let values = ratings(table.frame());
    assert!(values.iter().all(|r| r.is_some()));
    assert!((values[2].unwrap() - 6.8).abs() < 1e-9);
}

#[test]
fn rows_missing_required_fields_are_dropped() {
    let table = load_movies(&Upload::from_bytes("movies.csv", MOVIES_CSV), b',', None).unwrap();
    assert_eq!(
        titles(table.frame()),
        ["Alpha", "Beta", "Gamma", "Delta", "Zeta"]
            .iter()
            .map(|t| Some(t.to_string()))
            .collect::<Vec<_>>()
    );

    // Zeta keeps its row even though its date could not be parsed.
    let month = table.frame().column("Month").unwrap().i32().unwrap();
    assert_eq!(month.get(4), None);
    assert_eq!(month.get(0), Some(1));
}

#[test]
fn full_selection_returns_table_unchanged() {
    let table = load_movies(&Upload::from_bytes("movies.csv", MOVIES_CSV), b',', None).unwrap();
    let selection = GenreSelection::from_table(&table).unwrap();
    assert_eq!(selection.len(), 4);
    let filtered = filter_by_genres(table.frame(), &selection).unwrap();
    assert!(filtered.equals_missing(table.frame()));
}

#[test]
fn top_box_office_with_fewer_than_ten_rows() {
    let table = load_movies(&Upload::from_bytes("movies.csv", MOVIES_CSV), b',', None).unwrap();
    let top = top_box_office(table.frame()).unwrap();
    assert_eq!(top.bars.len(), 5);
    assert_eq!(labels(&top), vec!["Alpha", "Gamma", "Beta", "Delta", "Zeta"]);
    assert!(top.bars.windows(2).all(|w| w[0].value > w[1].value));
}

#[test]
fn top_box_office_ties_keep_row_order() {
    let csv = format!(
        "{}\n\
         First,Action,D,C,1,50,7,2024-01-01\n\
         Second,Drama,D,C,1,90,7,2024-01-01\n\
         Third,Action,D,C,1,50,7,2024-01-01\n",
        common::HEADER
    );
    let table = load_movies(&Upload::from_bytes("ties.csv", csv), b',', None).unwrap();
    let top = top_box_office(table.frame()).unwrap();
    assert_eq!(labels(&top), vec!["Second", "First", "Third"]);
}

#[test]
fn empty_selection_degrades_every_chart() {
    let (_dir, path) = write_dataset("movies.csv", MOVIES_CSV);
    let (mut session, _) =
        Session::open(&path, OpenOptions::default(), ChartSettings::default()).unwrap();
    session.selection.select_none();
    let dashboard = session.run().unwrap();

    assert_eq!(dashboard.filtered_rows, 0);
    assert_eq!(dashboard.total_rows, 5);
    for kind in ChartKind::ALL {
        assert!(dashboard.is_empty(kind), "{kind:?} should be empty");
    }
}

#[test]
fn scenario_imputes_before_dropping_untitled_row() {
    let upload = Upload::from_bytes("scenario.csv", SCENARIO_A_CSV);
    let (mut session, dashboard) =
        Session::start(upload, OpenOptions::default(), ChartSettings::default()).unwrap();

    assert_eq!(dashboard.total_rows, 2);
    assert_eq!(dashboard.load_report.rows_dropped, 1);
    // mean of {8.0, 6.0}: the untitled row still contributes its rating
    assert_eq!(dashboard.load_report.rating_mean, Some(7.0));
    let x = dashboard
        .top_box_office
        .bars
        .iter()
        .find(|b| b.label == "X")
        .unwrap();
    assert_eq!(x.value, 50.0);
    let action = dashboard
        .genre_ratings
        .bars
        .iter()
        .find(|b| b.label == "Action")
        .unwrap();
    assert_eq!(action.value, 7.0);

    session.selection.only(&["Drama".to_string()]);
    let drama = session.run().unwrap();
    assert_eq!(drama.filtered_rows, 1);
    assert_eq!(labels(&drama.top_box_office), vec!["Y"]);
    assert_eq!(drama.selected_genres, vec!["Drama"]);
}

#[test]
fn top_directors_ranked_by_count_then_first_seen() {
    let csv = directors_csv();
    let table = load_movies(&Upload::from_bytes("directors.csv", csv), b',', None).unwrap();
    let directors = top_directors(table.frame()).unwrap();
    assert_eq!(labels(&directors), vec!["A", "B", "C", "D", "E"]);
    let counts: Vec<f64> = directors.bars.iter().map(|b| b.value).collect();
    assert_eq!(counts, vec![5.0, 3.0, 1.0, 1.0, 1.0]);
}

#[test]
fn dashboard_views_for_sample_dataset() {
    let (_dir, path) = write_dataset("movies.csv", MOVIES_CSV);
    let (_, dashboard) =
        Session::open(&path, OpenOptions::default(), ChartSettings::default()).unwrap();

    assert_eq!(
        labels(&dashboard.genre_ratings),
        vec!["Action", "Drama", "Comedy", "(none)"]
    );
    assert_eq!(
        labels(&dashboard.top_directors),
        vec!["Ravi Kumar", "Anil Sharma", "Meera Nair"]
    );
    assert_eq!(dashboard.budget_vs_box_office.series.len(), 4);
    assert_eq!(dashboard.rating_distribution.histogram.total(), 5);
    assert!(!dashboard.rating_distribution.density.is_empty());
    assert_eq!(&dashboard.monthly_releases.counts[..4], &[1, 2, 1, 0]);
    assert_eq!(dashboard.cast_cloud.words[0].word, "Tabu");
    assert_eq!(dashboard.cast_cloud.words[0].count, 3);
    assert_eq!(dashboard.cast_cloud.layout.width, 800);
    assert_eq!(dashboard.cast_cloud.layout.height, 400);
}

#[test]
fn missing_cast_gives_empty_cloud_only() {
    let csv = format!("{}\nSolo,Action,D,,10,20,7,2024-03-01\n", common::HEADER);
    let upload = Upload::from_bytes("nocast.csv", csv);
    let (_, dashboard) =
        Session::start(upload, OpenOptions::default(), ChartSettings::default()).unwrap();
    assert!(dashboard.is_empty(ChartKind::CastCloud));
    assert!(!dashboard.is_empty(ChartKind::TopBoxOffice));
    assert!(!dashboard.is_empty(ChartKind::MonthlyReleases));
}

#[test]
fn missing_columns_are_a_schema_error() {
    let (_dir, path) = write_dataset("partial.csv", "Title,Genre,Budget_Cr\nA,Action,10\n");
    let err = Session::open(&path, OpenOptions::default(), ChartSettings::default()).unwrap_err();
    assert!(err.is_schema_error());
    let message = err.to_string();
    for column in ["Director", "Cast", "BoxOffice_Cr", "IMDb_Rating", "Release_Date"] {
        assert!(message.contains(column), "{message}");
    }
}

#[test]
fn unreadable_file_is_a_load_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = Session::open(
        &dir.path().join("missing.csv"),
        OpenOptions::default(),
        ChartSettings::default(),
    )
    .unwrap_err();
    assert!(matches!(err, LoadError::Read { .. }));
    assert!(err.is_load_error());
}

#[test]
fn gzip_and_tsv_inputs() {
    // Commas inside the quoted cast lists stay; the rest become tabs.
    let mut tsv = String::new();
    let mut quoted = false;
    for c in MOVIES_CSV.chars() {
        match c {
            '"' => {
                quoted = !quoted;
                tsv.push(c);
            }
            ',' if !quoted => tsv.push('\t'),
            _ => tsv.push(c),
        }
    }

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("movies.tsv.gz");
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(tsv.as_bytes()).unwrap();
    std::fs::write(&path, encoder.finish().unwrap()).unwrap();

    let (_, dashboard) =
        Session::open(&path, OpenOptions::default(), ChartSettings::default()).unwrap();
    assert_eq!(dashboard.total_rows, 5);
    assert_eq!(dashboard.source, "movies.tsv.gz");
}
