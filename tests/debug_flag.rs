// Verifies that --debug prints a step-by-step table instead of doing I/O.
use predicates::prelude::*;
use std::io::Write;

#[test]
fn debug_flag_prints_table() {
    let mut tf = tempfile::NamedTempFile::new().expect("tempfile");
    write!(tf, "+.!").unwrap();

    let mut cmd = assert_cmd::Command::cargo_bin("brainbox")
        .expect("failed to locate brainbox binary");

    cmd.args(["run", "--debug"])
        .arg(tf.path())
        .assert()
        .success()
        .stdout(predicates::str::contains("STEP | POS")
            .and(predicates::str::contains("Increment cell (0, 0) from 0 to 1"))
            .and(predicates::str::contains("suppressed in debug"))
            .and(predicates::str::contains("Halt"))
        );
}
