use std::io::Write;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn write_file(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    path
}

fn dataqa() -> Command {
    Command::cargo_bin("dataqa").unwrap()
}

fn tables(dir: &TempDir) -> (std::path::PathBuf, std::path::PathBuf) {
    let t1 = write_file(dir, "t1.csv", "COL1,COL2,COL3\n1,2,3\n4,5,6\n");
    let t2 = write_file(dir, "t2.csv", "col1,col2\n1,4\n2,5\n");
    (t1, t2)
}

fn arg(path: &Path) -> &str {
    path.to_str().unwrap()
}

#[test]
fn test_names_reports_non_standard_columns() {
    let dir = TempDir::new().unwrap();
    let (t1, _) = tables(&dir);

    dataqa()
        .args(["names", arg(&t1), "--standards", "COL1,COL3"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("2 standard, 1 non-standard"));

    dataqa()
        .args(["names", arg(&t1), "--standards", "COL1,COL2,COL3"])
        .assert()
        .success();
}

#[test]
fn test_names_from_standards_file() {
    let dir = TempDir::new().unwrap();
    let (t1, _) = tables(&dir);
    let standards = write_file(&dir, "standards.txt", "# census\nCOL1\nCOL2\n\nCOL3\n");

    dataqa()
        .args(["names", arg(&t1), "--standards-file", arg(&standards)])
        .assert()
        .success();
}

#[test]
fn test_sums() {
    let dir = TempDir::new().unwrap();
    let (t1, _) = tables(&dir);

    dataqa()
        .args(["sums", arg(&t1), "--columns", "COL1,COL3", "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"column\": \"COL3\""))
        .stdout(predicate::str::contains("\"sum\": 9"))
        .stdout(predicate::str::contains("\"column_type\": \"int\""));

    dataqa()
        .args(["sums", arg(&t1), "--columns", "COL2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("int"))
        .stdout(predicate::str::contains("7"));
}

#[test]
fn test_values_json() {
    let dir = TempDir::new().unwrap();
    let (t1, t2) = tables(&dir);

    let output = dataqa()
        .args([
            "values",
            arg(&t1),
            arg(&t2),
            "--columns1",
            "COL1",
            "--columns2",
            "col1",
            "--format",
            "json",
        ])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let rows = &json["report"]["result"]["COL1 [vs] col1"];
    assert_eq!(rows[0]["rows"], "0 [vs] 0");
    assert_eq!(rows[0]["difference"], 0);
    assert_eq!(rows[1]["rows"], "1 [vs] 1");
    assert_eq!(rows[1]["difference"], 2);
}

#[test]
fn test_values_with_rows() {
    let dir = TempDir::new().unwrap();
    let (t1, t2) = tables(&dir);

    dataqa()
        .args([
            "values", arg(&t1), arg(&t2),
            "--columns1", "COL1", "--columns2", "col1",
            "--rows1", "0", "--rows2", "1",
        ])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("0 [vs] 1"));
}

#[test]
fn test_values_identical_tables() {
    let dir = TempDir::new().unwrap();
    let (t1, _) = tables(&dir);

    dataqa()
        .args([
            "values", arg(&t1), arg(&t1),
            "--columns1", "COL1,COL2", "--columns2", "COL1,COL2",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("0 differing cells"));
}

#[test]
fn test_misaligned_columns_fail() {
    let dir = TempDir::new().unwrap();
    let (t1, t2) = tables(&dir);

    dataqa()
        .args([
            "sum-diff", arg(&t1), arg(&t2),
            "--columns1", "COL1,COL2", "--columns2", "col1",
        ])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Invalid argument"));
}

#[test]
fn test_sum_diff() {
    let dir = TempDir::new().unwrap();
    let (t1, t2) = tables(&dir);

    dataqa()
        .args([
            "sum-diff", arg(&t1), arg(&t2),
            "--columns1", "COL1,COL3", "--columns2", "col1,col2",
            "--set",
        ])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("COL3 [vs] col2"));
}

#[test]
fn test_missing_column_fails() {
    let dir = TempDir::new().unwrap();
    let (t1, _) = tables(&dir);

    dataqa()
        .args(["sums", arg(&t1), "--columns", "POP"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Column 'POP' not found"));
}

#[test]
fn test_geometry_check() {
    let dir = TempDir::new().unwrap();
    let layer = write_file(
        &dir,
        "layer.geojson",
        r#"{
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "properties": {"col": "v1"}, "geometry": null},
                {"type": "Feature", "properties": {"col": "v2"},
                 "geometry": {"type": "Point", "coordinates": [1.0, 2.0]}},
                {"type": "Feature", "properties": {"col": "v3"},
                 "geometry": {"type": "Point", "coordinates": [2.0, 1.0]}}
            ]
        }"#,
    );

    dataqa()
        .args(["geometry", arg(&layer)])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Geometry check failed"));

    dataqa()
        .args(["geometry", arg(&layer), "--threshold", "0.75"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Geometries OK"));
}

#[test]
fn test_geometry_column_absent() {
    let dir = TempDir::new().unwrap();
    let (t1, _) = tables(&dir);

    dataqa()
        .args(["geometry", arg(&t1)])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Column 'geometry' not found"));
}
