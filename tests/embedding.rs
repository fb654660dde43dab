// Exercises the embedding interface: source text plus a fixed input queue in,
// captured output string out.
use brainbox::{execute, execute_with_control, BrainboxError, CodeGrid, Embedded, Interpreter, Status, StepControl};

#[test]
fn echo_one_character() {
    assert_eq!(execute(",.!", ['A']).unwrap(), "A");
}

#[test]
fn lone_halt_produces_nothing_for_any_input() {
    assert_eq!(execute("!", "".chars()).unwrap(), "");
    assert_eq!(execute("!", "hello".chars()).unwrap(), "");
}

#[test]
fn loop_builds_a_character() {
    // 8 * 8 + 1 = 65
    let out = execute("++++++++[d++++++++a-]d+.!", "".chars()).unwrap();
    assert_eq!(out, "A");
}

#[test]
fn vertical_program() {
    assert_eq!(execute("v\n,\n.\n!", "x".chars()).unwrap(), "x");
}

#[test]
fn value_survives_memory_pointer_round_trip() {
    let out = execute(",dddsss+++aaawww.!", "K".chars()).unwrap();
    assert_eq!(out, "K");
}

#[test]
fn exhausted_input_is_a_no_op() {
    assert_eq!(execute(",.!", "".chars()).unwrap(), "\u{0}");
}

#[test]
fn input_wider_than_a_cell_is_ignored() {
    assert_eq!(execute(",.,.!", "€z".chars()).unwrap(), "\u{0}z");
}

#[test]
fn output_is_latin1() {
    let code = format!("{}.!", "+".repeat(233));
    assert_eq!(execute(&code, "".chars()).unwrap(), "é");
}

#[test]
fn counters_clamp_instead_of_wrapping() {
    let up = format!("{}.!", "+".repeat(400));
    assert_eq!(execute(&up, "".chars()).unwrap(), "\u{ff}");
    assert_eq!(execute("-.!", "".chars()).unwrap(), "\u{0}");
}

#[test]
fn tight_loop_needs_a_step_limit() {
    let result = execute_with_control("+[]!", "".chars(), StepControl::with_max_steps(500));
    assert!(matches!(result, Err(BrainboxError::StepLimitExceeded { limit: 500 })));
}

#[test]
fn zero_bracket_pair_with_empty_stack_halts() {
    assert_eq!(execute("[]!", "".chars()).unwrap(), "");
}

#[test]
fn independent_runs_share_nothing() {
    let first = execute(",+.!", "a".chars()).unwrap();
    let second = execute(",+.!", "a".chars()).unwrap();
    assert_eq!(first, "b");
    assert_eq!(first, second);
}

// One check per character class: only codes that are not characters at all
// are fatal; everything outside the instruction set is a silent no-op.

#[test]
fn unsupported_ascii_letters_are_no_ops() {
    assert_eq!(execute("bcxyzVWASD!", "".chars()).unwrap(), "");
}

#[test]
fn digits_are_no_ops() {
    assert_eq!(execute("0123456789!", "".chars()).unwrap(), "");
}

#[test]
fn other_punctuation_is_a_no_op() {
    assert_eq!(execute("#@?~*/(){}\"'`;:|&%$_=!", "".chars()).unwrap(), "");
}

#[test]
fn whitespace_and_control_characters_are_no_ops() {
    assert_eq!(execute(" \t\r\u{7}!", "".chars()).unwrap(), "");
}

#[test]
fn non_ascii_characters_are_no_ops() {
    assert_eq!(execute("éλ€😀!", "".chars()).unwrap(), "");
}

#[test]
fn surrogate_code_is_undecodable() {
    let grid = CodeGrid::from_codes([vec!['+' as u32, 0xDFFF, '!' as u32]]);
    let mut bb = Interpreter::new(&grid, Embedded::default());
    assert!(matches!(bb.run(), Err(BrainboxError::Undecodable { code: 0xDFFF, x: 1, y: 0 })));
    assert_eq!(bb.status(), Status::Faulted);
}

#[test]
fn out_of_range_code_is_undecodable() {
    let grid = CodeGrid::from_codes([vec![0x11_0000]]);
    let mut bb = Interpreter::new(&grid, Embedded::default());
    assert!(matches!(bb.run(), Err(BrainboxError::Undecodable { code: 0x11_0000, .. })));
    assert_eq!(bb.steps(), 0);
}
