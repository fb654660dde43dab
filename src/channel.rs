//! Character input and output for a running program.
//!
//! The interpreter only sees the [`Channel`] trait. Two adapters exist:
//! - [`Embedded`]: input comes from a pre-supplied queue and output is
//!   captured into a string. Never blocks.
//! - [`Terminal`]: attached to the process's stdin/stdout. On a live
//!   terminal each read blocks for a single key press in raw mode; when stdin
//!   is redirected it reads one raw byte instead.

use std::collections::VecDeque;
use std::io::{self, IsTerminal, Read, Write};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;

/// Errors raised by a channel while reading or writing.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    /// Ctrl-C was pressed while waiting for input.
    #[error("interrupted")]
    Interrupted,

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Single-character input and output.
pub trait Channel {
    /// Read one character. `Ok(None)` means no character is available and the
    /// caller should leave memory unchanged.
    fn read(&mut self) -> Result<Option<char>, ChannelError>;

    /// Emit one character immediately.
    fn write(&mut self, ch: char) -> Result<(), ChannelError>;
}

impl<C: Channel + ?Sized> Channel for &mut C {
    fn read(&mut self) -> Result<Option<char>, ChannelError> {
        (**self).read()
    }

    fn write(&mut self, ch: char) -> Result<(), ChannelError> {
        (**self).write(ch)
    }
}

/// Channel backed by an input queue and an output buffer.
#[derive(Debug, Clone, Default)]
pub struct Embedded {
    input: VecDeque<char>,
    output: String,
}

impl Embedded {
    pub fn new<I>(input: I) -> Self
    where
        I: IntoIterator<Item = char>,
    {
        Self {
            input: input.into_iter().collect(),
            output: String::new(),
        }
    }

    /// Everything written so far.
    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn into_output(self) -> String {
        self.output
    }

    /// Characters not yet consumed by `,`.
    pub fn remaining_input(&self) -> usize {
        self.input.len()
    }
}

impl Channel for Embedded {
    fn read(&mut self) -> Result<Option<char>, ChannelError> {
        // Characters that do not fit a memory cell are consumed but yield nothing.
        Ok(self.input.pop_front().filter(|&ch| ch as u32 <= 255))
    }

    fn write(&mut self, ch: char) -> Result<(), ChannelError> {
        self.output.push(ch);
        Ok(())
    }
}

/// What a single key press means to the `,` instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInput {
    Char(char),
    Nothing,
    Interrupt,
}

/// Translate a key press the way a raw terminal would deliver it.
pub fn map_key(key: &KeyEvent) -> KeyInput {
    match key.code {
        // Alt arrives as an escape prefix on a raw terminal.
        _ if key.modifiers.contains(KeyModifiers::ALT) => KeyInput::Nothing,
        KeyCode::Char(c) if key.modifiers.contains(KeyModifiers::CONTROL) => {
            if c.eq_ignore_ascii_case(&'c') {
                KeyInput::Interrupt
            } else if c.is_ascii_alphabetic() {
                KeyInput::Char(((c.to_ascii_lowercase() as u8) & 0x1f) as char)
            } else {
                KeyInput::Nothing
            }
        }
        KeyCode::Char(c) if c as u32 > 255 => KeyInput::Nothing,
        KeyCode::Char(c) => KeyInput::Char(c),
        KeyCode::Enter => KeyInput::Char('\n'),
        KeyCode::Tab => KeyInput::Char('\t'),
        KeyCode::Backspace => KeyInput::Char('\u{7f}'),
        // Esc, arrows and function keys all start with an escape byte.
        _ => KeyInput::Nothing,
    }
}

/// Disables raw mode again when dropped, even on early return.
struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

/// Channel attached to the process's stdin and stdout.
pub struct Terminal {
    interactive: bool,
    out: io::Stdout,
}

impl Terminal {
    /// Detect whether stdin is a live terminal.
    pub fn new() -> Self {
        Self {
            interactive: io::stdin().is_terminal(),
            out: io::stdout(),
        }
    }

    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    fn read_key(&mut self) -> Result<KeyInput, ChannelError> {
        let input = {
            let _raw = RawModeGuard::enable()?;
            loop {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        break map_key(&key);
                    }
                }
            }
        };

        if input == KeyInput::Interrupt {
            write!(self.out, "^C")?;
            self.out.flush()?;
        }
        Ok(input)
    }

    fn read_byte(&mut self) -> Result<Option<char>, ChannelError> {
        let mut buf = [0u8; 1];
        match io::stdin().lock().read(&mut buf)? {
            0 => Ok(None),
            _ => Ok(Some(char::from(buf[0]))),
        }
    }
}

impl Default for Terminal {
    fn default() -> Self {
        Self::new()
    }
}

impl Channel for Terminal {
    fn read(&mut self) -> Result<Option<char>, ChannelError> {
        if !self.interactive {
            return self.read_byte();
        }

        match self.read_key()? {
            KeyInput::Char(c) => Ok(Some(c)),
            KeyInput::Nothing => Ok(None),
            KeyInput::Interrupt => Err(ChannelError::Interrupted),
        }
    }

    fn write(&mut self, ch: char) -> Result<(), ChannelError> {
        write!(self.out, "{ch}")?;
        self.out.flush()?;
        Ok(())
    }
}
