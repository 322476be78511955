//! Integration tests for basic CLI behavior.
//!
//! Tests that the binary exists, accepts standard flags, and each subcommand
//! responds to `--help` with appropriate text. Nothing here touches the network.

#![allow(deprecated)] // cargo_bin deprecation, replacement not yet stable

use assert_cmd::Command;
use predicates::prelude::*;

/// Helper: get a Command for the `reelhound` binary.
fn reelhound() -> Command {
    Command::cargo_bin("reelhound").expect("binary 'reelhound' should be built")
}

// ─── Top-level flags ─────────────────────────────────────────────────────────

#[test]
fn help_flag_shows_usage() {
    reelhound()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage: reelhound"))
        .stdout(predicate::str::contains("home"))
        .stdout(predicate::str::contains("search"))
        .stdout(predicate::str::contains("episodes"))
        .stdout(predicate::str::contains("servers"))
        .stdout(predicate::str::contains("menu"))
        .stdout(predicate::str::contains("check"))
        .stdout(predicate::str::contains("--json"));
}

#[test]
fn version_flag_shows_semver() {
    reelhound()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"^reelhound \d+\.\d+\.\d+\n$").unwrap());
}

#[test]
fn no_args_shows_error_and_usage() {
    reelhound()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage: reelhound"));
}

#[test]
fn invalid_subcommand_fails() {
    reelhound()
        .arg("this-is-not-a-real-command")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unrecognized subcommand"));
}

// ─── Subcommand help ─────────────────────────────────────────────────────────

#[test]
fn list_help() {
    reelhound()
        .args(["list", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("List the entries"))
        .stdout(predicate::str::contains("<URL>"));
}

#[test]
fn search_help() {
    reelhound()
        .args(["search", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Search the site"))
        .stdout(predicate::str::contains("<QUERY>"));
}

#[test]
fn episodes_help() {
    reelhound()
        .args(["episodes", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("seasons and episodes"))
        .stdout(predicate::str::contains("<URL>"));
}

#[test]
fn servers_help() {
    reelhound()
        .args(["servers", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("video server candidates"))
        .stdout(predicate::str::contains("<URL>"));
}

// ─── Subcommand argument validation ──────────────────────────────────────────

#[test]
fn servers_missing_url_fails() {
    reelhound()
        .arg("servers")
        .assert()
        .failure()
        .stderr(predicate::str::contains("<URL>"));
}

#[test]
fn search_missing_query_fails() {
    reelhound()
        .arg("search")
        .assert()
        .failure()
        .stderr(predicate::str::contains("<QUERY>"));
}

#[test]
fn missing_config_file_fails() {
    reelhound()
        .args(["--config", "/nonexistent/reelhound.toml", "check", "https://voe.sx/e/1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read"));
}
