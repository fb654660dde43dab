//! An interpreter for brainbox, a two-dimensional Brainfuck derivative.
//!
//! Source text is laid out on a grid. An instruction pointer walks that grid
//! in one of four directions, wrapping at the edges, while a second,
//! unbounded grid of byte counters serves as memory.
//!
//! Features and behaviors:
//! - `>` `<` `v` `^` steer the instruction pointer; `d` `a` `s` `w` steer the
//!   memory pointer.
//! - `+` and `-` clamp at 255 and 0 instead of wrapping.
//! - `[` and `]` form loops through a stack of saved positions.
//! - `.` and `,` go through a [`Channel`], either a live terminal or an
//!   embedded queue with captured output.
//! - `!` halts. Every other character is a no-op.
//!
//! Quick start:
//!
//! ```
//! // Read one character, print it, halt.
//! let output = brainbox::execute(",.!", "A".chars()).expect("program should halt");
//! assert_eq!(output, "A");
//! ```

pub mod channel;
pub mod cli_util;
pub mod commands;
pub mod config;
pub mod error;
pub mod grid;
pub mod interpreter;
pub mod memory;
pub mod repl;
pub mod theme;

pub use channel::{Channel, ChannelError, Embedded, Terminal};
pub use error::BrainboxError;
pub use grid::CodeGrid;
pub use interpreter::{Direction, Interpreter, Status, StepControl};
pub use memory::MemoryGrid;

/// Run `code` against a fixed input sequence and return everything it printed.
///
/// Blocks until the program executes `!`; use [`execute_with_control`] for
/// programs that may never halt.
pub fn execute<I>(code: &str, input: I) -> Result<String, BrainboxError>
where
    I: IntoIterator<Item = char>,
{
    let grid = CodeGrid::build(code);
    let mut bb = Interpreter::new(&grid, Embedded::new(input));
    bb.run()?;
    Ok(bb.into_channel().into_output())
}

/// Like [`execute`], with a step limit and cancellation flag.
pub fn execute_with_control<I>(
    code: &str,
    input: I,
    step_control: StepControl,
) -> Result<String, BrainboxError>
where
    I: IntoIterator<Item = char>,
{
    let grid = CodeGrid::build(code);
    let mut bb = Interpreter::new(&grid, Embedded::new(input));
    bb.run_with_control(step_control)?;
    Ok(bb.into_channel().into_output())
}
