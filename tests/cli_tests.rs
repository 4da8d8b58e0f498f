//! Integration tests for the diagram-catalog CLI
//!
//! These tests run the binary end-to-end against a directory source.

mod common;

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;

use common::{diagram_tree, OIL_FOLDER, OIL_TABLE};

/// Helper to get a diagram-catalog command with no source in the environment
fn diagram_catalog() -> Command {
    let mut cmd = Command::cargo_bin("diagram-catalog").unwrap();
    cmd.env_remove("DIAGRAM_SOURCE");
    cmd
}

#[test]
fn test_help_lists_commands() {
    diagram_catalog()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("markers"))
        .stdout(predicate::str::contains("serve"));
}

#[test]
fn test_list_requires_a_source() {
    diagram_catalog()
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No diagram source"));
}

#[test]
fn test_list_discovered_folders() {
    let tmp = diagram_tree();
    diagram_catalog()
        .arg("--source")
        .arg(tmp.path())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("4 diagrams, lenient"))
        .stdout(predicate::str::contains(OIL_FOLDER))
        .stdout(predicate::str::contains("Broken"))
        .stdout(predicate::str::contains("Nowhere").not());
}

#[test]
fn test_list_strict_sorted_tsv() {
    let tmp = diagram_tree();
    let output = diagram_catalog()
        .env("DIAGRAM_SOURCE", tmp.path())
        .args(["list", "--strict", "--sort", "-f", "tsv"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines[0], "name\tfolder_key\tbase_name\tmarker_count");
    assert_eq!(
        lines[1],
        format!("{OIL_FOLDER}\t{OIL_FOLDER}\t{OIL_FOLDER}\t1")
    );
    assert_eq!(lines[2], "Fuel_Pump\tEngine/Fuel_Pump\tFuelPump\t2");
    assert_eq!(lines.len(), 3);
}

#[test]
fn test_show_joins_markers_with_rows() {
    let tmp = diagram_tree();
    let output = diagram_catalog()
        .arg("--source")
        .arg(tmp.path())
        .args(["-f", "json", "show", OIL_FOLDER])
        .output()
        .unwrap();
    assert!(output.status.success());

    let detail: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(detail["imageName"], "Oil-System");
    assert_eq!(detail["markers"][0]["row"]["description"], "Oil Pump");
    assert_eq!(detail["unmatchedRows"].as_array().unwrap().len(), 0);
}

#[test]
fn test_show_missing_folder_fails() {
    let tmp = diagram_tree();
    diagram_catalog()
        .arg("--source")
        .arg(tmp.path())
        .args(["show", "Nowhere"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No manifest found"));
}

#[test]
fn test_resolve_reports_base_name() {
    let tmp = diagram_tree();
    diagram_catalog()
        .arg("--source")
        .arg(tmp.path())
        .args(["resolve", "Engine/Fuel_Pump"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Base name: FuelPump"))
        .stdout(predicate::str::contains("FuelPump.png"));
}

#[test]
fn test_resolve_rejects_strict_flag() {
    let tmp = diagram_tree();
    diagram_catalog()
        .arg("--source")
        .arg(tmp.path())
        .args(["resolve", "Engine/Fuel_Pump", "--strict"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--strict"));
}

#[test]
fn test_markers_json() {
    let tmp = diagram_tree();
    let output = diagram_catalog()
        .arg("--source")
        .arg(tmp.path())
        .args(["-f", "json", "markers", OIL_FOLDER, "--width", "100"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let layout: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(layout["native"]["width"], 50);
    assert_eq!(layout["markers"][0]["left"], 100.0);
    assert_eq!(layout["markers"][0]["top"], 100.0);
}

#[test]
fn test_markers_rejects_zero_width() {
    let tmp = diagram_tree();
    diagram_catalog()
        .arg("--source")
        .arg(tmp.path())
        .args(["markers", OIL_FOLDER, "--width", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--width"));
}

#[test]
fn test_table_command_parses_local_file() {
    let tmp = tempfile::TempDir::new().unwrap();
    let path = tmp.path().join("parts.csv");
    fs::write(&path, OIL_TABLE).unwrap();

    diagram_catalog()
        .args(["-f", "tsv", "table"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Number\tPart No.\tDescription\tQty"))
        .stdout(predicate::str::contains("1\tP1\tOil Pump\t2"))
        .stdout(predicate::str::contains("\n2\t").not());
}

#[test]
fn test_config_file_supplies_source() {
    let tmp = diagram_tree();
    let config = tmp.path().join("catalog.toml");
    fs::write(
        &config,
        format!("source = {:?}\n\n[catalog]\nstrict = true\n", tmp.path().display().to_string()),
    )
    .unwrap();

    diagram_catalog()
        .arg("--config")
        .arg(&config)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("2 diagrams, strict"));
}

#[test]
fn test_invalid_config_is_reported() {
    let tmp = tempfile::TempDir::new().unwrap();
    let config = tmp.path().join("catalog.toml");
    fs::write(&config, "[cache]\nttl = 5\n").unwrap();

    diagram_catalog()
        .arg("--config")
        .arg(&config)
        .args(["table", "missing.csv"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load settings"));
}
