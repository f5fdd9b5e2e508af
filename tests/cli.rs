//! Command-line behavior of the `sortxml` binary.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;

const UNSORTED: &str = "<r>\n  <b y=\"1\" x=\"2\"/>\n  <a/>\n</r>\n";
const SORTED: &str = "<r>\n  <a/>\n  <b x=\"2\" y=\"1\"/>\n</r>\n";

fn sortxml() -> Command {
    Command::new(assert_cmd::cargo_bin!("sortxml"))
}

fn fixture(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).expect("write fixture");
    path
}

fn stderr_of(cmd: &mut Command) -> String {
    String::from_utf8(cmd.output().expect("run sortxml").stderr).expect("utf-8 stderr")
}

#[test]
fn cli_writes_to_stdout_by_default() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let input = fixture(tmp.path(), "in.xml", UNSORTED);

    sortxml().arg(&input).assert().success().stdout(SORTED);
    assert_eq!(fs::read_to_string(&input).unwrap(), UNSORTED);
}

#[test]
fn cli_writes_output_file() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let input = fixture(tmp.path(), "in.xml", UNSORTED);
    let output = tmp.path().join("out.xml");

    sortxml().arg(&input).arg(&output).assert().success().stdout("");
    assert_eq!(fs::read_to_string(&output).unwrap(), SORTED);
    assert_eq!(fs::read_to_string(&input).unwrap(), UNSORTED);
}

#[test]
fn cli_overwrite_replaces_input() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let input = fixture(tmp.path(), "in.xml", UNSORTED);

    sortxml().arg("--overwrite").arg(&input).assert().success();
    assert_eq!(fs::read_to_string(&input).unwrap(), SORTED);
}

#[test]
fn cli_explicit_output_wins_over_overwrite() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let input = fixture(tmp.path(), "in.xml", UNSORTED);
    let output = tmp.path().join("out.xml");

    sortxml()
        .arg("--overwrite")
        .arg(&input)
        .arg(&output)
        .assert()
        .success();
    assert_eq!(fs::read_to_string(&output).unwrap(), SORTED);
    assert_eq!(fs::read_to_string(&input).unwrap(), UNSORTED);
}

#[test]
fn cli_reads_stdin() {
    sortxml()
        .arg("-")
        .write_stdin("<r><b/><a/></r>")
        .assert()
        .success()
        .stdout("<r>\n  <a/>\n  <b/>\n</r>\n");
}

#[test]
fn cli_selects_passes() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let input = fixture(tmp.path(), "in.xml", "<r><b y=\"1\" x=\"2\"/><a/></r>");

    sortxml()
        .args(["--no-sort", "--no-pretty"])
        .arg(&input)
        .assert()
        .success()
        .stdout("<r><b y=\"1\" x=\"2\"/><a/></r>\n");
    sortxml()
        .args(["--no-sort", "--sort-attributes", "--no-pretty"])
        .arg(&input)
        .assert()
        .success()
        .stdout("<r><b x=\"2\" y=\"1\"/><a/></r>\n");
    sortxml()
        .args(["--no-sort-attributes", "--no-pretty"])
        .arg(&input)
        .assert()
        .success()
        .stdout("<r><a/><b y=\"1\" x=\"2\"/></r>\n");
}

#[test]
fn cli_no_pretty_keeps_whitespace() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let input = fixture(tmp.path(), "in.xml", "<r>\n\t<b/>\n\t<a/>\n</r>");

    sortxml()
        .arg("--no-pretty")
        .arg(&input)
        .assert()
        .success()
        .stdout("<r>\n\t<a/>\n\t<b/>\n</r>\n");
}

#[test]
fn cli_primary_attribute() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let input = fixture(tmp.path(), "in.xml", "<r b=\"1\" id=\"2\" GUID=\"3\"/>");

    sortxml()
        .arg(&input)
        .assert()
        .success()
        .stdout("<r GUID=\"3\" b=\"1\" id=\"2\"/>\n");
    sortxml()
        .args(["--primary", "id"])
        .arg(&input)
        .assert()
        .success()
        .stdout("<r id=\"2\" b=\"1\" GUID=\"3\"/>\n");
}

#[test]
fn cli_collation_flags() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let input = fixture(tmp.path(), "in.xml", "<r><B/><b/><a/></r>");

    sortxml()
        .args(["--no-pretty"])
        .arg(&input)
        .assert()
        .success()
        .stdout("<r><a/><b/><B/></r>\n");
    sortxml()
        .args(["--no-pretty", "--ignore-case"])
        .arg(&input)
        .assert()
        .success()
        .stdout("<r><a/><B/><b/></r>\n");
    sortxml()
        .args(["--no-pretty", "--ordinal"])
        .arg(&input)
        .assert()
        .success()
        .stdout("<r><B/><a/><b/></r>\n");
    sortxml()
        .args(["--no-pretty", "--ordinal", "--node-collation", "linguistic"])
        .arg(&input)
        .assert()
        .success()
        .stdout("<r><a/><b/><B/></r>\n");
}

#[test]
fn cli_verbose_reports_to_stderr() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let input = fixture(tmp.path(), "in.xml", UNSORTED);

    let stderr = stderr_of(sortxml().arg("--verbose").arg(&input));
    assert!(stderr.contains("sorting nodes"), "stderr: {stderr}");
}

#[test]
fn cli_recover_accepts_mismatched_tags() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let input = fixture(tmp.path(), "in.xml", "<r><b/><a>x</b></r>");

    sortxml().arg(&input).assert().code(100);
    sortxml()
        .args(["--recover", "--no-pretty"])
        .arg(&input)
        .assert()
        .success()
        .stdout("<r><a>x</a><b/></r>\n");
}

// --- Exit codes ---

#[test]
fn cli_missing_argument_is_usage_error() {
    sortxml().assert().code(1);
}

#[test]
fn cli_unknown_collation_is_usage_error() {
    sortxml()
        .args(["--node-collation", "klingon", "in.xml"])
        .assert()
        .code(1);
}

#[test]
fn cli_missing_input_file() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let mut cmd = sortxml();
    cmd.arg(tmp.path().join("absent.xml"));
    cmd.assert().code(100);
    let stderr = stderr_of(&mut cmd);
    assert!(stderr.contains("could not load input file"), "stderr: {stderr}");
}

#[test]
fn cli_malformed_input_file() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let input = fixture(tmp.path(), "in.xml", "<r><a></r>");

    let mut cmd = sortxml();
    cmd.arg(&input);
    cmd.assert().code(100).stdout("");
    let stderr = stderr_of(&mut cmd);
    assert!(stderr.contains("mismatched end tag"), "stderr: {stderr}");
}

#[test]
fn cli_unwritable_output() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let input = fixture(tmp.path(), "in.xml", UNSORTED);

    let mut cmd = sortxml();
    cmd.arg(&input).arg(tmp.path().join("missing/dir/out.xml"));
    cmd.assert().code(101);
    let stderr = stderr_of(&mut cmd);
    assert!(stderr.contains("could not save output file"), "stderr: {stderr}");
}

#[test]
fn cli_help_includes_manual() {
    let output = sortxml().arg("--help").output().expect("run sortxml");
    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("Exit codes"), "stdout: {stdout}");
    assert!(stdout.contains("--primary"), "stdout: {stdout}");
}
