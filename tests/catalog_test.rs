//! Listing and reading saved artifacts from disk

use chrono::{Local, TimeZone};
use dockerfile_ai::storage::{ArtifactCatalog, ArtifactWriter};
use dockerfile_ai::{AnalysisResult, AnalyzerError};
use std::fs;
use tempfile::TempDir;

fn result(corrected: Option<&str>) -> AnalysisResult {
    AnalysisResult {
        narrative: "## Issues\n\nRuns as root.".to_string(),
        corrected_dockerfile: corrected.map(str::to_string),
    }
}

#[test]
fn test_traversal_names_are_rejected() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("secret.txt"), "top secret").unwrap();
    let catalog = ArtifactCatalog::new(dir.path().join("out"));

    for name in [
        "../secret.txt",
        "../../etc/passwd",
        "/etc/passwd",
        "analysis/../../secret.txt",
        "..",
        ".",
        "",
        "a\\b",
    ] {
        let err = catalog.get_saved(name).unwrap_err();
        assert!(
            matches!(err, AnalyzerError::InvalidName(_)),
            "{:?} gave {:?}",
            name,
            err
        );
    }
}

#[test]
fn test_unknown_name_is_not_found() {
    let dir = TempDir::new().unwrap();
    let catalog = ArtifactCatalog::new(dir.path());

    assert!(matches!(
        catalog.get_saved("Dockerfile_20240101_000000_analysis.md"),
        Err(AnalyzerError::NotFound(_))
    ));
}

#[test]
fn test_saved_files_read_back_byte_identical() {
    let dir = TempDir::new().unwrap();
    let writer = ArtifactWriter::new(dir.path());
    let catalog = ArtifactCatalog::new(dir.path());
    let dockerfile = "FROM python:3.12-slim\nRUN pip install --no-cache-dir flask\nUSER 1000";

    let saved = writer
        .save_at(
            &result(Some(dockerfile)),
            "Dockerfile",
            Local.with_ymd_and_hms(2024, 3, 5, 14, 7, 9).unwrap(),
        )
        .unwrap();

    let analysis_name = saved.analysis.file_name().unwrap().to_string_lossy().to_string();
    assert_eq!(analysis_name, "Dockerfile_20240305_140709_analysis.md");

    let fetched = catalog
        .get_saved("Dockerfile_20240305_140709_corrected.Dockerfile")
        .unwrap();
    assert_eq!(fetched.content, dockerfile);
    assert_eq!(
        catalog.get_saved(&analysis_name).unwrap().content,
        "## Issues\n\nRuns as root."
    );
}

#[test]
fn test_listing_is_newest_first_and_ignores_strays() {
    let dir = TempDir::new().unwrap();
    let writer = ArtifactWriter::new(dir.path());
    let catalog = ArtifactCatalog::new(dir.path());

    let older = writer
        .save_at(
            &result(None),
            "api.Dockerfile",
            Local.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        )
        .unwrap();
    let newer = writer
        .save_at(
            &result(None),
            "web.Dockerfile",
            Local.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap(),
        )
        .unwrap();
    let base = std::time::SystemTime::now();
    fs::File::options()
        .write(true)
        .open(&older.analysis)
        .unwrap()
        .set_modified(base - std::time::Duration::from_secs(60))
        .unwrap();
    fs::File::options()
        .write(true)
        .open(&newer.analysis)
        .unwrap()
        .set_modified(base)
        .unwrap();
    fs::write(dir.path().join("analysis").join("notes.txt"), "stray").unwrap();

    let listing = catalog.list_saved().unwrap();
    let names: Vec<&str> = listing.analyses.iter().map(|f| f.name.as_str()).collect();

    assert_eq!(
        names,
        vec![
            "web.Dockerfile_20240102_000000_analysis.md",
            "api.Dockerfile_20240101_000000_analysis.md"
        ]
    );
    assert!(listing.corrected_dockerfiles.is_empty());
}
