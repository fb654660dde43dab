use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use std::time::Duration;

fn cargo_bin() -> Command {
    let mut cmd = Command::cargo_bin("brainbox").unwrap();
    cmd.env_remove("BRAINBOX_MAX_STEPS")
        .env_remove("BRAINBOX_TIMEOUT_MS")
        .env_remove("BRAINBOX_LOG")
        .timeout(Duration::from_secs(5));
    cmd
}

fn program_file(content: &str) -> tempfile::NamedTempFile {
    let mut tf = tempfile::NamedTempFile::new().expect("tempfile");
    write!(tf, "{}", content).unwrap();
    tf
}

fn print_a() -> &'static str {
    "++++++++[d++++++++a-]d+.!"
}

#[test]
fn positional_path_runs_and_ends_with_newline() {
    let tf = program_file(print_a());
    cargo_bin()
        .arg(tf.path())
        .assert()
        .success()
        .stdout("A\n")
        .stderr(predicate::str::is_empty());
}

#[test]
fn run_subcommand_runs_file() {
    let tf = program_file(print_a());
    cargo_bin()
        .arg("run")
        .arg(tf.path())
        .assert()
        .success()
        .stdout("A\n");
}

#[test]
fn multi_row_program() {
    let tf = program_file("v\n+\n+\n>d+++.a.!\n");
    cargo_bin()
        .arg(tf.path())
        .assert()
        .success()
        .stdout("\u{3}\u{2}\n");
}

#[test]
fn crlf_program_file_halts() {
    // Row 1 is `!+`; wrapping down from column 2 lands on `!`.
    let tf = program_file("abv\r\n!+\r\n");
    cargo_bin()
        .args(["run", "--max-steps", "1000"])
        .arg(tf.path())
        .assert()
        .success()
        .stdout("\n")
        .stderr(predicate::str::is_empty());
}

#[test]
fn missing_path_is_a_usage_error() {
    cargo_bin()
        .assert()
        .code(2)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("A file path is required"));
}

#[test]
fn unreadable_file_never_executes() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.bb");
    cargo_bin()
        .arg(&missing)
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("There was a problem reading the file"));
}

#[test]
fn input_flag_uses_embedded_mode() {
    let tf = program_file(",.,.!");
    cargo_bin()
        .args(["run", "--input", "AB"])
        .arg(tf.path())
        .assert()
        .success()
        .stdout("AB\n");
}

#[test]
fn top_level_help() {
    cargo_bin()
        .arg("--help")
        .assert()
        .success()
        .stderr(predicate::str::contains("Usage:").and(predicate::str::contains("repl")));
}

#[test]
fn run_help() {
    cargo_bin()
        .args(["run", "--help"])
        .assert()
        .success()
        .stderr(predicate::str::contains("--max-steps"))
        .stderr(predicate::str::contains("the first Ctrl-C only takes effect once a byte"));
}
