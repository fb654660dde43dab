//! The brainbox execution engine.
//!
//! Program text lives on a [`CodeGrid`]. An instruction pointer starts just
//! left of the origin facing right and, on every step, moves one cell,
//! wraps at the edges of the grid and executes the instruction it lands on.
//!
//! Instructions:
//! - `>` `<` `v` `^` turn the instruction pointer.
//! - `d` `a` `s` `w` move the memory pointer right, left, down, up.
//! - `+` `-` add or subtract one, clamped to `0..=255`.
//! - `[` pushes the current position when the cell is nonzero. With a zero
//!   cell nothing is pushed and the body is *not* skipped.
//! - `]` jumps back to the most recent marker (without popping it) when the
//!   cell is nonzero, and pops the marker when the cell is zero.
//! - `.` writes the cell as a character, `,` reads one character into it.
//! - `!` halts. Everything else, including spaces, is a no-op.

use std::fmt;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use crate::channel::{Channel, ChannelError};
use crate::{BrainboxError, CodeGrid, MemoryGrid};

/// One of the four compass directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Right,
    Left,
    Down,
    Up,
}

impl Direction {
    /// Unit vector as `(dx, dy)`; y grows downward.
    pub fn delta(self) -> (i64, i64) {
        match self {
            Direction::Right => (1, 0),
            Direction::Left => (-1, 0),
            Direction::Down => (0, 1),
            Direction::Up => (0, -1),
        }
    }

    fn facing(instr: char) -> Option<Self> {
        match instr {
            '>' => Some(Direction::Right),
            '<' => Some(Direction::Left),
            'v' => Some(Direction::Down),
            '^' => Some(Direction::Up),
            _ => None,
        }
    }

    fn memory(instr: char) -> Option<Self> {
        match instr {
            'd' => Some(Direction::Right),
            'a' => Some(Direction::Left),
            's' => Some(Direction::Down),
            'w' => Some(Direction::Up),
            _ => None,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Right => write!(f, ">"),
            Direction::Left => write!(f, "<"),
            Direction::Down => write!(f, "v"),
            Direction::Up => write!(f, "^"),
        }
    }
}

/// Where the interpreter is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Running,
    /// `!` was executed.
    Halted,
    /// A fatal error ended the run.
    Faulted,
}

/// Controls for cooperative cancellation and step limiting.
#[derive(Clone)]
pub struct StepControl {
    pub max_steps: Option<usize>,
    pub cancel_flag: Arc<AtomicBool>,
}

impl StepControl {
    pub fn new(max_steps: Option<usize>, cancel_flag: Arc<AtomicBool>) -> Self {
        Self { max_steps, cancel_flag }
    }

    /// A step limit with a private, never-set cancel flag.
    pub fn with_max_steps(max_steps: usize) -> Self {
        Self::new(Some(max_steps), Arc::new(AtomicBool::new(false)))
    }
}

/// Map a stored code to the instruction it denotes. `None` means the code is
/// not a character at all.
fn decode(code: u32) -> Option<char> {
    match code {
        0 => Some(' '),
        _ => char::from_u32(code),
    }
}

fn fmt_pos((x, y): (i64, i64)) -> String {
    format!("({x}, {y})")
}

/// A brainbox interpreter bound to one code grid and one I/O channel.
pub struct Interpreter<'g, C> {
    code: &'g CodeGrid,
    memory: MemoryGrid,
    channel: C,
    position: (i64, i64),
    facing: Direction,
    memory_pointer: (i64, i64),
    loop_stack: Vec<(i64, i64)>,
    status: Status,
    steps: usize,
}

impl<'g, C: Channel> Interpreter<'g, C> {
    pub fn new(code: &'g CodeGrid, channel: C) -> Self {
        tracing::debug!(max_row = code.max_row(), "interpreter ready");
        Self {
            code,
            memory: MemoryGrid::new(),
            channel,
            position: (-1, 0),
            facing: Direction::Right,
            memory_pointer: (0, 0),
            loop_stack: Vec::new(),
            status: Status::Running,
            steps: 0,
        }
    }

    pub fn position(&self) -> (i64, i64) {
        self.position
    }

    pub fn facing(&self) -> Direction {
        self.facing
    }

    pub fn memory_pointer(&self) -> (i64, i64) {
        self.memory_pointer
    }

    pub fn memory(&self) -> &MemoryGrid {
        &self.memory
    }

    /// Number of loop markers currently on the stack.
    pub fn loop_depth(&self) -> usize {
        self.loop_stack.len()
    }

    /// Instructions executed so far.
    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }

    pub fn into_channel(self) -> C {
        self.channel
    }

    fn cell(&self) -> u8 {
        let (x, y) = self.memory_pointer;
        self.memory.get(x, y)
    }

    /// Move one cell along the current facing and wrap. The column bound is
    /// taken from the row the pointer ends up on.
    fn advance(&mut self) -> (usize, usize) {
        let (dx, dy) = self.facing.delta();
        let (mut x, mut y) = (self.position.0 + dx, self.position.1 + dy);

        let max_row = self.code.max_row() as i64;
        if y > max_row {
            y = 0;
        } else if y < 0 {
            y = max_row;
        }

        let max_col = self.code.max_col(y as usize) as i64;
        if x > max_col {
            x = 0;
        } else if x < 0 {
            x = max_col;
        }

        self.position = (x, y);
        (x as usize, y as usize)
    }

    /// Execute a single instruction.
    ///
    /// Once the interpreter has halted or faulted this is a no-op that
    /// returns the terminal status.
    pub fn step(&mut self) -> Result<Status, BrainboxError> {
        if self.status != Status::Running {
            return Ok(self.status);
        }
        self.step_once(false)
    }

    fn step_once(&mut self, debug: bool) -> Result<Status, BrainboxError> {
        let (x, y) = self.advance();
        let code = self.code.get(x, y);
        let Some(instr) = decode(code) else {
            self.status = Status::Faulted;
            tracing::debug!(code, x, y, "undecodable instruction");
            return Err(BrainboxError::Undecodable { code, x, y });
        };
        tracing::trace!(step = self.steps, x, y, instr = %instr.escape_debug(), "step");

        let step = self.steps;
        let (mp_before, cell_before) = (self.memory_pointer, self.cell());
        let mut action: Option<String> = if debug { Some(String::new()) } else { None };

        let result = self.dispatch(instr, debug, &mut action);
        self.steps += 1;
        if let Err(err) = result {
            self.status = Status::Faulted;
            return Err(err);
        }

        if debug {
            println!(
                "{:<4} | {:<9} | {:<3} | {:<9} | {:<4} |  {:<4} | {}",
                step,
                fmt_pos(self.position),
                self.facing,
                fmt_pos(mp_before),
                cell_before,
                instr.escape_debug(),
                action.unwrap_or_default()
            );
        }

        if self.status == Status::Halted {
            tracing::debug!(steps = self.steps, "halted");
        }
        Ok(self.status)
    }

    fn dispatch(
        &mut self,
        instr: char,
        debug: bool,
        action: &mut Option<String>,
    ) -> Result<(), BrainboxError> {
        let (mx, my) = self.memory_pointer;
        let cell = self.memory.get(mx, my);

        if let Some(dir) = Direction::facing(instr) {
            self.facing = dir;
            if let Some(a) = action.as_mut() { *a = format!("Face {dir}"); }
            return Ok(());
        }

        if let Some(dir) = Direction::memory(instr) {
            let (dx, dy) = dir.delta();
            self.memory_pointer = (mx + dx, my + dy);
            if let Some(a) = action.as_mut() { *a = format!("Moved memory pointer to {}", fmt_pos(self.memory_pointer)); }
            return Ok(());
        }

        match instr {
            '+' => {
                self.memory.increment(mx, my);
                if let Some(a) = action.as_mut() { *a = format!("Increment cell {} from {} to {}", fmt_pos((mx, my)), cell, self.cell()); }
            }
            '-' => {
                self.memory.decrement(mx, my);
                if let Some(a) = action.as_mut() { *a = format!("Decrement cell {} from {} to {}", fmt_pos((mx, my)), cell, self.cell()); }
            }
            '[' => {
                if cell != 0 {
                    self.loop_stack.push(self.position);
                    if let Some(a) = action.as_mut() { *a = format!("Push loop marker {}", fmt_pos(self.position)); }
                } else if let Some(a) = action.as_mut() {
                    *a = "Cell is 0; continue without marker".to_string();
                }
            }
            ']' => {
                if cell != 0 {
                    match self.loop_stack.last() {
                        Some(&marker) => {
                            self.position = marker;
                            if let Some(a) = action.as_mut() { *a = format!("Cell != 0; jump back to loop marker {}", fmt_pos(marker)); }
                        }
                        None => {
                            let (dx, dy) = self.facing.delta();
                            self.position = (-dx, -dy);
                            if let Some(a) = action.as_mut() { *a = format!("Cell != 0; no marker, jump to {}", fmt_pos(self.position)); }
                        }
                    }
                } else {
                    let popped = self.loop_stack.pop();
                    if let Some(a) = action.as_mut() {
                        *a = match popped {
                            Some(marker) => format!("Cell is 0; drop loop marker {}", fmt_pos(marker)),
                            None => "Cell is 0; no marker to drop".to_string(),
                        };
                    }
                }
            }
            '.' => {
                let ch = char::from(cell);
                if debug {
                    if let Some(a) = action.as_mut() { *a = format!("Output {:?} (suppressed in debug)", ch); }
                } else {
                    self.channel.write(ch).map_err(|e| self.channel_error(e))?;
                }
            }
            ',' => {
                if debug {
                    if let Some(a) = action.as_mut() { *a = "Read -> simulated no input (cell unchanged)".to_string(); }
                } else {
                    let read = self.channel.read().map_err(|e| self.channel_error(e))?;
                    if let Some(value) = read.and_then(|c| u8::try_from(u32::from(c)).ok()) {
                        self.memory.set(mx, my, value);
                    }
                }
            }
            '!' => {
                self.status = Status::Halted;
                if let Some(a) = action.as_mut() { *a = "Halt".to_string(); }
            }
            _ => {
                if let Some(a) = action.as_mut() { *a = "No-op".to_string(); }
            }
        }
        Ok(())
    }

    fn channel_error(&self, err: ChannelError) -> BrainboxError {
        match err {
            ChannelError::Interrupted => BrainboxError::Interrupted,
            ChannelError::Io(source) => BrainboxError::Io { step: self.steps, source },
        }
    }

    /// Step until halt, a fatal error, or a control limit.
    ///
    /// Cancellation and the step limit leave the interpreter `Running`, so the
    /// caller may resume it.
    fn execute(&mut self, debug: bool, step_control: Option<&StepControl>) -> Result<(), BrainboxError> {
        if debug {
            println!("STEP | POS       | DIR | MP        | CELL | INSTR | ACTION");
            println!("-----+-----------+-----+-----------+------+-------+------------------------------------------");
        }

        while self.status == Status::Running {
            // Cooperative cancellation check
            if let Some(ctrl) = step_control {
                if ctrl.cancel_flag.load(Ordering::Relaxed) {
                    return Err(BrainboxError::Canceled);
                }
                if let Some(max) = ctrl.max_steps {
                    if self.steps >= max {
                        return Err(BrainboxError::StepLimitExceeded { limit: max });
                    }
                }
            }

            self.step_once(debug)?;
        }

        Ok(())
    }

    /// Run the program until it halts.
    pub fn run(&mut self) -> Result<(), BrainboxError> {
        self.execute(false, None)
    }

    /// Run while printing a step-by-step table to stdout instead of doing I/O:
    /// `.` is logged but not written and `,` behaves as if no input exists.
    pub fn run_debug(&mut self) -> Result<(), BrainboxError> {
        self.execute(true, None)
    }

    /// Execute with cooperative cancellation and optional step limit.
    pub fn run_with_control(&mut self, step_control: StepControl) -> Result<(), BrainboxError> {
        self.execute(false, Some(&step_control))
    }

    /// Debug-run with cooperative cancellation and optional step limit.
    pub fn run_debug_with_control(&mut self, step_control: StepControl) -> Result<(), BrainboxError> {
        self.execute(true, Some(&step_control))
    }
}
