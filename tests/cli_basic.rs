//! Integration tests for basic CLI behavior.
//!
//! Tests that the binary accepts standard flags, each subcommand responds to
//! `--help`, and the edit flow works end to end with `--layout` fixtures so
//! no pdfium library or rewriting service is needed.

#![allow(deprecated)] // cargo_bin deprecation — replacement not yet stable

use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;

/// Helper: get a Command for the `pdfedit` binary.
fn pdfedit() -> Command {
    let mut cmd = Command::cargo_bin("pdfedit").expect("binary 'pdfedit' should be built");
    cmd.env_remove("PDFEDIT_ENDPOINT");
    cmd
}

/// Per-test scratch directory with a dummy PDF and a one-page layout.
fn fixture(test: &str) -> (PathBuf, PathBuf, PathBuf) {
    let dir = std::env::temp_dir().join(format!("pdfedit-cli-{}-{test}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();

    let pdf = dir.join("doc.pdf");
    fs::write(&pdf, b"%PDF-1.7\n").unwrap();

    let layout = dir.join("layout.json");
    fs::write(
        &layout,
        r#"[
            {"view_box": [0, 0, 612, 792],
             "items": [
                {"str": "Hello", "transform": [12, 0, 0, 12, 10, 20], "width": 30, "height": 12},
                {"str": "   ", "transform": [12, 0, 0, 12, 50, 20], "width": 6, "height": 12},
                {"str": "World", "transform": [12, 0, 0, 12, 10, 40], "width": 32, "height": 12}
             ]}
        ]"#,
    )
    .unwrap();

    (dir, pdf, layout)
}

// ─── Top-level flags ─────────────────────────────────────────────────────────

#[test]
fn help_flag_shows_usage() {
    pdfedit()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage: pdfedit"))
        .stdout(predicate::str::contains("inspect"))
        .stdout(predicate::str::contains("edit"));
}

#[test]
fn version_flag_shows_semver() {
    pdfedit()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"^pdfedit \d+\.\d+\.\d+\n$").unwrap());
}

#[test]
fn no_args_shows_error_and_usage() {
    pdfedit()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage: pdfedit"));
}

// ─── Subcommand help ─────────────────────────────────────────────────────────

#[test]
fn edit_help() {
    pdfedit()
        .args(["edit", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("<FILE>"))
        .stdout(predicate::str::contains("--set"))
        .stdout(predicate::str::contains("--replace"))
        .stdout(predicate::str::contains("--dry-run"));
}

#[test]
fn inspect_help() {
    pdfedit()
        .args(["inspect", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--json"));
}

// ─── File type validation ────────────────────────────────────────────────────

#[test]
fn non_pdf_is_rejected_before_reading() {
    pdfedit()
        .args(["inspect", "/no/such/dir/notes.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Please select a valid PDF file."));
}

#[test]
fn malformed_set_is_a_usage_error() {
    pdfedit()
        .args(["edit", "doc.pdf", "--set", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected ID=TEXT"));
}

// ─── Layout-driven flows ─────────────────────────────────────────────────────

#[test]
fn inspect_lists_visible_elements() {
    let (dir, pdf, layout) = fixture("inspect");

    pdfedit()
        .args(["inspect", "--scale", "1"])
        .arg(&pdf)
        .arg("--layout")
        .arg(&layout)
        .assert()
        .success()
        .stdout(predicate::str::contains("1 pages, 2 editable elements"))
        .stdout(predicate::str::contains("\"Hello\""))
        .stdout(predicate::str::contains("\"World\""));

    fs::remove_dir_all(dir).ok();
}

#[test]
fn dry_run_prints_edits_payload() {
    let (dir, pdf, layout) = fixture("dry-run");

    let output = pdfedit()
        .args(["edit", "--scale", "1", "--dry-run", "--replace", "Hello=Hello, World"])
        .arg(&pdf)
        .arg("--layout")
        .arg(&layout)
        .output()
        .unwrap();
    assert!(output.status.success());

    let edits: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(
        edits,
        serde_json::json!([{
            "pageIndex": 0,
            "newText": "Hello, World",
            "rect": {"x": 10.0, "y": 20.0, "width": 30.0, "height": 12.0},
            "fontSize": 12.0
        }])
    );

    fs::remove_dir_all(dir).ok();
}

#[test]
fn dry_run_without_changes_is_informational() {
    let (dir, pdf, layout) = fixture("no-changes");

    pdfedit()
        .args(["edit", "--dry-run"])
        .arg(&pdf)
        .arg("--layout")
        .arg(&layout)
        .assert()
        .success()
        .stdout(predicate::str::contains("No changes were made to the text."));

    fs::remove_dir_all(dir).ok();
}

#[test]
fn unknown_element_fails() {
    let (dir, pdf, layout) = fixture("unknown");

    pdfedit()
        .args(["edit", "--dry-run", "--set", "99=x"])
        .arg(&pdf)
        .arg("--layout")
        .arg(&layout)
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown element 99"));

    fs::remove_dir_all(dir).ok();
}

#[test]
fn unreachable_service_fails_cleanly() {
    let (dir, pdf, layout) = fixture("unreachable");

    pdfedit()
        .args(["edit", "--set", "0=Bye", "--endpoint", "http://127.0.0.1:9/edit-pdf", "-o"])
        .arg(&dir)
        .arg(&pdf)
        .arg("--layout")
        .arg(&layout)
        .timeout(std::time::Duration::from_secs(30))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to save PDF"));

    assert!(!dir.join("edited-doc.pdf").exists());
    fs::remove_dir_all(dir).ok();
}

#[test]
fn inspect_json_names_owner_element() {
    let (dir, pdf, layout) = fixture("inspect-json");

    pdfedit()
        .args(["inspect", "--json"])
        .arg(&pdf)
        .arg("--layout")
        .arg(&layout)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"ownerElementId\": 0"))
        .stdout(predicate::str::contains("\"originalText\": \"Hello\""));

    fs::remove_dir_all(dir).ok();
}
