//! Tests for the `classify` binary's argument handling and exit codes.

#![cfg(feature = "cli")]

use std::fs;
use std::process::Command;

fn classify() -> Command {
    Command::new(env!("CARGO_BIN_EXE_classify"))
}

#[test]
fn test_help_exits_zero() {
    let output = classify().arg("--help").output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("--image"));
    assert!(stdout.contains("--classes"));
}

#[test]
fn test_missing_required_options_fails() {
    let output = classify().arg("--image").arg("x.jpg").output().unwrap();
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
}

#[test]
fn test_unreadable_image_prints_diagnostic() {
    let dir = tempfile::tempdir().unwrap();
    let labels = dir.path().join("labels.txt");
    fs::write(&labels, "0 cat\n").unwrap();

    let output = classify()
        .arg("-i")
        .arg(dir.path().join("missing.jpg"))
        .arg("--mt")
        .arg(dir.path().join("net.onnx"))
        .arg("--mb")
        .arg(dir.path().join("net.onnx"))
        .arg("-c")
        .arg(&labels)
        .env_remove("DNN_CLASSIFY_CONFIG")
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Can't load image for classification"));
}

/// Arguments for a run whose image is missing, so it fails before loading a model.
fn missing_image_run(dir: &std::path::Path) -> Command {
    let labels = dir.join("labels.txt");
    fs::write(&labels, "0 cat\n").unwrap();

    let mut cmd = classify();
    cmd.arg("-i")
        .arg(dir.join("missing.jpg"))
        .arg("--mt")
        .arg(dir.join("net.onnx"))
        .arg("--mb")
        .arg(dir.join("net.onnx"))
        .arg("-c")
        .arg(labels)
        .env_remove("DNN_CLASSIFY_CONFIG");
    cmd
}

#[test]
fn test_version_exits_zero() {
    let output = classify().arg("--version").output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_zero_iterations_is_configuration_error() {
    let dir = tempfile::tempdir().unwrap();
    let output = missing_image_run(dir.path())
        .arg("--iterations")
        .arg("0")
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("configuration error"));
    assert!(stderr.contains("iterations must be at least 1"));
}

#[test]
fn test_json_format_is_accepted() {
    let dir = tempfile::tempdir().unwrap();
    let output = missing_image_run(dir.path())
        .arg("--format")
        .arg("json")
        .output()
        .unwrap();

    // Parsed fine; the run itself fails on the image, not on usage.
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Can't load image for classification"));
}

#[test]
fn test_unknown_format_is_usage_error() {
    let dir = tempfile::tempdir().unwrap();
    let output = missing_image_run(dir.path())
        .arg("--format")
        .arg("yaml")
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(2));
    assert!(output.stdout.is_empty());
}
