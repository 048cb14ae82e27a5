use std::fs;
use std::path::PathBuf;

use wc26_pickem::config::ScoringConfig;
use wc26_pickem::export::export_report;
use wc26_pickem::fake_tournament::{FakeTournamentOptions, generate_snapshot};
use wc26_pickem::report::evaluate;
use wc26_pickem::snapshot::{SnapshotFingerprint, load_snapshot, save_snapshot};

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("wc26_pickem_{name}_{}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    dir
}

#[test]
fn saved_snapshot_loads_back_with_same_fingerprint() {
    let dir = scratch_dir("snapshot");
    let path = dir.join("nested").join("snapshot.json");
    let snapshot = generate_snapshot(&FakeTournamentOptions::default());

    save_snapshot(&path, &snapshot).expect("save should succeed");
    assert!(!path.with_extension("json.tmp").exists());

    let loaded = load_snapshot(&path).expect("load should succeed");
    assert_eq!(
        SnapshotFingerprint::of(&loaded).unwrap(),
        SnapshotFingerprint::of(&snapshot).unwrap()
    );

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn missing_snapshot_file_is_an_error() {
    let dir = scratch_dir("missing");
    let err = load_snapshot(&dir.join("nope.json")).unwrap_err();
    assert!(err.to_string().contains("failed reading snapshot"));
}

#[test]
fn exports_workbook_with_row_counts() {
    let dir = scratch_dir("export");
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join("pickem.xlsx");

    let snapshot = generate_snapshot(&FakeTournamentOptions::default());
    let report = evaluate(&snapshot, &ScoringConfig::default());
    let summary = export_report(&path, &snapshot, &report).expect("export should succeed");

    assert!(path.exists());
    assert_eq!(summary.leaderboard_rows, report.leaderboard.len());
    assert_eq!(summary.standings_rows, snapshot.teams.len());
    assert_eq!(summary.bracket_rows, 31);

    let _ = fs::remove_dir_all(&dir);
}
