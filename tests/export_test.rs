use cinedash::chart_data::{ChartKind, ChartSettings};
use cinedash::chart_export::{chart_path, export_dashboard, write_summary_json, SUMMARY_FILE};
use cinedash::{OpenOptions, Session, Upload};
use serde_json::Value;

mod common;

use common::MOVIES_CSV;

fn dashboard(select_none: bool) -> cinedash::Dashboard {
    let upload = Upload::from_bytes("movies.csv", MOVIES_CSV);
    let (mut session, dashboard) =
        Session::start(upload, OpenOptions::default(), ChartSettings::default()).unwrap();
    if select_none {
        session.selection.select_none();
        return session.run().unwrap();
    }
    dashboard
}

#[test]
fn export_accounts_for_every_chart() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("charts");
    let summary = export_dashboard(&dashboard(false), &out).unwrap();

    // seven charts plus the summary; charts that fail to draw are reported, not fatal
    assert_eq!(summary.written.len() + summary.failed.len(), ChartKind::ALL.len() + 1);
    assert!(out.join(SUMMARY_FILE).exists());
    for path in &summary.written {
        assert!(path.exists(), "{} missing", path.display());
    }
    for (kind, _) in &summary.failed {
        assert!(!summary.written.contains(&chart_path(&out, *kind)));
    }
}

#[test]
fn summary_json_describes_the_pass() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(SUMMARY_FILE);
    write_summary_json(&dashboard(false), &path).unwrap();

    let json: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(json["source"], "movies.csv");
    assert_eq!(json["total_rows"], 5);
    assert_eq!(json["filtered_rows"], 5);
    assert_eq!(json["load_report"]["rows_dropped"], 1);
    assert_eq!(json["top_box_office"]["bars"][0]["label"], "Alpha");
    assert_eq!(json["monthly_releases"]["counts"].as_array().unwrap().len(), 12);
}

#[test]
fn empty_selection_still_exports() {
    let dir = tempfile::tempdir().unwrap();
    let summary = export_dashboard(&dashboard(true), dir.path()).unwrap();
    assert_eq!(summary.written.len() + summary.failed.len(), ChartKind::ALL.len() + 1);

    let json: Value =
        serde_json::from_str(&std::fs::read_to_string(dir.path().join(SUMMARY_FILE)).unwrap())
            .unwrap();
    assert_eq!(json["filtered_rows"], 0);
    assert!(json["top_box_office"]["bars"].as_array().unwrap().is_empty());
    assert!(json["cast_cloud"]["words"].as_array().unwrap().is_empty());
}

#[test]
fn chart_files_are_named_by_kind() {
    let dir = std::path::Path::new("out");
    let names: Vec<String> = ChartKind::ALL
        .iter()
        .map(|k| {
            chart_path(dir, *k)
                .file_name()
                .unwrap()
                .to_string_lossy()
                .into_owned()
        })
        .collect();
    assert!(names.iter().all(|n| n.ends_with(".png")));
    let mut unique = names.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), ChartKind::ALL.len());
}
