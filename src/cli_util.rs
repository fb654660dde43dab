use std::io::{self, IsTerminal, Write};

use crate::config;
use crate::{BrainboxError, CodeGrid};

/// Pretty-print a [`BrainboxError`], pointing at the offending cell when there is one.
/// If `program` is `Some("brainbox")`, prefix messages with "brainbox: ...".
pub fn print_run_error(program: Option<&str>, grid: &CodeGrid, err: &BrainboxError) {
    let prefix_program = |msg: &str| {
        if let Some(p) = program {
            format!("{p}: {msg}")
        } else {
            msg.to_string()
        }
    };

    match err {
        BrainboxError::Undecodable { code, x, y } => {
            let msg = prefix_program(&format!("Decode error: code {code:#x} is not a character"));
            print_error_with_context(&msg, grid, *x, *y);
        }
        BrainboxError::Io { step, source } => {
            eprintln!("{}", header(&prefix_program(&format!("I/O error at step {step}: {source}"))));
        }
        other => {
            eprintln!("{}", header(&prefix_program(&other.to_string())));
        }
    }
    let _ = io::stderr().flush();
}

fn header(msg: &str) -> String {
    if io::stderr().is_terminal() {
        config::colors().error_header.bold().paint(msg).to_string()
    } else {
        msg.to_string()
    }
}

/// Print the row holding `(x, y)` with a caret under the column, trimmed to
/// a window around it.
pub fn print_error_with_context(prefix: &str, grid: &CodeGrid, x: usize, y: usize) {
    eprintln!("{} at row {y}, column {x}", header(prefix));

    const WINDOW_CHARS: usize = 32;

    let row: Vec<char> = grid.row_text(y).chars().collect();
    let start = x.saturating_sub(WINDOW_CHARS);
    let end = (x + WINDOW_CHARS + 1).min(row.len());
    let slice: String = row.get(start..end).unwrap_or_default().iter().collect();

    eprintln!("  {}", slice);
    eprintln!("  {}^", " ".repeat(x - start));
    let _ = io::stderr().flush();
}
