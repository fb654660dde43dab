use assert_cmd::Command;
use predicates::prelude::*;
use std::time::Duration;

fn repl() -> Command {
    let mut cmd = Command::cargo_bin("brainbox").unwrap();
    cmd.arg("repl")
        .env_remove("BRAINBOX_REPL_MODE")
        .env_remove("BRAINBOX_MAX_STEPS")
        .timeout(Duration::from_secs(5));
    cmd
}

#[test]
fn piped_stdin_runs_bare_once() {
    repl()
        .write_stdin("+++.!")
        .assert()
        .success()
        .stdout("\u{3}\n")
        .stderr(predicate::str::is_empty());
}

#[test]
fn bare_mode_keeps_row_layout() {
    repl()
        .write_stdin("v\n+\n.\n!\n")
        .assert()
        .success()
        .stdout("\u{1}\n");
}

#[test]
fn empty_stdin_exits_clean_and_quiet() {
    repl()
        .write_stdin("")
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::is_empty());
}

#[test]
fn forced_editor_on_non_tty_errors() {
    repl()
        .arg("--editor")
        .write_stdin("+.!")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("stdin is not a TTY"));
}

#[test]
fn flags_override_env_mode() {
    repl()
        .env("BRAINBOX_REPL_MODE", "editor")
        .arg("--bare")
        .write_stdin("+++.!")
        .assert()
        .success()
        .stdout(predicate::str::contains("\u{3}"));
}

#[test]
fn invalid_env_mode_is_rejected() {
    repl()
        .env("BRAINBOX_REPL_MODE", "sideways")
        .write_stdin("!")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("invalid BRAINBOX_REPL_MODE"));
}

#[test]
fn bare_step_limit_reports_and_exits_cleanly() {
    repl()
        .env("BRAINBOX_MAX_STEPS", "50")
        .write_stdin("+[]")
        .assert()
        .success()
        .stderr(predicate::str::contains("step limit exceeded (50)"))
        .stdout(predicate::str::contains("Execution aborted").not());
}
