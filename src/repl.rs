use std::env;
use std::io::{self, IsTerminal, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use nu_ansi_term::Style;
use reedline::{DefaultPrompt, DefaultPromptSegment, Highlighter, HistoryItem, Signal, StyledText};

use crate::config::Colors;
use crate::theme::InstructionClass;
use crate::{cli_util, config, Channel, CodeGrid, Embedded, Interpreter, StepControl, Terminal};

pub fn repl_loop(cancel: Arc<AtomicBool>) -> io::Result<()> {
    // Initialize interactive line editor
    let mut editor = init_line_editor()?;

    loop {
        // Prompt and read a multi-line submission via editor
        let Some(submission) = read_submission_interactive(&mut editor)? else {
            // EOF or editor closed. End the session cleanly to avoid hanging when stdin is closed
            println!();
            io::stdout().flush()?;
            return Ok(());
        };

        // Layout matters in a 2D program, so only skip blank submissions.
        if submission.trim().is_empty() {
            continue;
        }

        cancel.store(false, Ordering::Relaxed);
        execute_program(&submission, Terminal::new(), cancel.clone());
        println!();
        io::stdout().flush()?;

        // Test hook: if BRAINBOX_REPL_ONCE=1, exit after one execution
        if env::var("BRAINBOX_REPL_ONCE").ok().as_deref() == Some("1") {
            return Ok(());
        }
    }
}

fn init_line_editor() -> io::Result<reedline::Reedline> {
    use reedline::{
        default_emacs_keybindings, EditCommand, Emacs, KeyCode, KeyModifiers, Reedline, ReedlineEvent,
    };

    // Start from default emacs-like bindings and adjust:
    // - Enter -> InsertNewLine (do not submit)
    // - Ctrl+D -> AcceptLine (submit)
    // - Ctrl+Z -> AcceptLine (submit, for Windows)
    let mut keybindings = default_emacs_keybindings();
    keybindings.add_binding(KeyModifiers::NONE, KeyCode::Enter, ReedlineEvent::Edit(vec![EditCommand::InsertNewline]));
    keybindings.add_binding(KeyModifiers::CONTROL, KeyCode::Char('d'), ReedlineEvent::Submit);
    keybindings.add_binding(KeyModifiers::CONTROL, KeyCode::Char('z'), ReedlineEvent::Submit);

    // Up/down move within the current grid, not history.
    keybindings.add_binding(KeyModifiers::NONE, KeyCode::Up, ReedlineEvent::Up);
    keybindings.add_binding(KeyModifiers::NONE, KeyCode::Down, ReedlineEvent::Down);

    // Alt+Up/Alt+Down or Ctrl+Up/Ctrl+Down to navigate history items.
    keybindings.add_binding(KeyModifiers::ALT, KeyCode::Up, ReedlineEvent::PreviousHistory);
    keybindings.add_binding(KeyModifiers::CONTROL, KeyCode::Up, ReedlineEvent::PreviousHistory);
    keybindings.add_binding(KeyModifiers::ALT, KeyCode::Down, ReedlineEvent::NextHistory);
    keybindings.add_binding(KeyModifiers::CONTROL, KeyCode::Down, ReedlineEvent::NextHistory);

    let history = reedline::FileBackedHistory::new(1_000)
        .map_err(|e| io::Error::other(e.to_string()))?;

    let editor = Reedline::create()
        .with_highlighter(Box::new(BrainboxHighlighter::from_colors(config::colors())))
        .with_history(Box::new(history))
        .with_edit_mode(Box::new(Emacs::new(keybindings)));

    Ok(editor)
}

pub fn read_submission<R: io::BufRead>(stdin: &mut R) -> Option<String> {
    // Collect all lines until EOF
    let mut buffer = String::new();

    loop {
        let mut line = String::new();
        match stdin.read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => buffer.push_str(&line),
            // Read error, ignore
            Err(_) => return None,
        }
    }

    if buffer.is_empty() {
        None
    } else {
        Some(buffer)
    }
}

fn read_submission_interactive(editor: &mut reedline::Reedline) -> io::Result<Option<String>> {
    let prompt = DefaultPrompt::new(DefaultPromptSegment::Basic("bb".to_string()), DefaultPromptSegment::Empty);

    match editor.read_line(&prompt) {
        Ok(Signal::Success(buffer)) => {
            // One history item per submitted program
            if !buffer.trim().is_empty() {
                let _ = editor.history_mut().save(HistoryItem::from_command_line(buffer.clone()));
            }
            Ok(Some(buffer))
        }
        Ok(Signal::CtrlC) => Ok(None),
        Ok(Signal::CtrlD) => Ok(None),
        Err(e) => {
            eprintln!("repl: editor error: {e}");
            let _ = io::stderr().flush();
            Ok(None)
        }
    }
}

/// Run one program to completion with a fresh interpreter.
/// Errors are printed to stderr; the channel is handed back so callers can
/// collect captured output.
pub fn execute_program<C: Channel>(buffer: &str, channel: C, cancel: Arc<AtomicBool>) -> C {
    let grid = CodeGrid::from_source(buffer);
    let limits = config::resolve_limits(None, None);
    let mut bb = Interpreter::new(&grid, channel);
    if let Err(err) = bb.run_with_control(StepControl::new(limits.max_steps, cancel)) {
        cli_util::print_run_error(None, &grid, &err);
    }
    bb.into_channel()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplMode {
    Bare,
    Editor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeFlagOverride {
    None,
    Bare,
    Editor,
}

pub fn select_mode(flag: ModeFlagOverride) -> Result<ReplMode, String> {
    match flag {
        ModeFlagOverride::Bare => return Ok(ReplMode::Bare),
        ModeFlagOverride::Editor => {
            if !io::stdin().is_terminal() {
                return Err("cannot start editor: stdin is not a TTY (use --bare or BRAINBOX_REPL_MODE=bare)".to_string());
            }
            return Ok(ReplMode::Editor);
        }
        ModeFlagOverride::None => {}
    }

    if let Ok(val) = env::var("BRAINBOX_REPL_MODE") {
        let v = val.trim().to_ascii_lowercase();
        return match v.as_str() {
            "bare" => Ok(ReplMode::Bare),
            "editor" => {
                if !io::stdin().is_terminal() {
                    return Err("cannot start editor: stdin is not a TTY (use BRAINBOX_REPL_MODE=bare)".to_string());
                }
                Ok(ReplMode::Editor)
            }
            _ => Err(format!("invalid BRAINBOX_REPL_MODE value: {val}, must be 'bare' or 'editor'")),
        };
    }

    if io::stdin().is_terminal() {
        Ok(ReplMode::Editor)
    } else {
        Ok(ReplMode::Bare)
    }
}

/// Read a program from stdin until EOF and run it once. Stdin is spent on
/// the program text, so `,` sees no input.
pub fn execute_bare_once(cancel: Arc<AtomicBool>) -> io::Result<()> {
    let mut locked = io::BufReader::new(io::stdin().lock());
    if let Some(s) = read_submission(&mut locked) {
        if !s.trim().is_empty() {
            let out = execute_program(&s, Embedded::default(), cancel);
            println!("{}", out.output());
            io::stdout().flush()?;
        }
    }
    Ok(())
}

struct BrainboxHighlighter {
    colors: Colors,
}

impl BrainboxHighlighter {
    fn from_colors(colors: &Colors) -> Self {
        Self { colors: colors.clone() }
    }

    #[inline]
    fn style_for(&self, ch: char) -> Style {
        InstructionClass::of(ch).style(&self.colors)
    }
}

impl Highlighter for BrainboxHighlighter {
    fn highlight(&self, line: &str, _cursor: usize) -> StyledText {
        let mut out: StyledText = StyledText::new();
        let mut current_style: Option<Style> = None;
        let mut buffer = String::new();

        for ch in line.chars() {
            let style = self.style_for(ch);

            match current_style {
                Some(s) if s == style => buffer.push(ch),
                Some(s) => {
                    out.push((s, std::mem::take(&mut buffer)));
                    current_style = Some(style);
                    buffer.push(ch);
                }
                None => {
                    current_style = Some(style);
                    buffer.push(ch);
                }
            }
        }

        if let Some(s) = current_style {
            if !buffer.is_empty() {
                out.push((s, buffer));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn read_submission_keeps_grid_layout() {
        let input = b"v  <\n>  ^\n";
        let mut cursor = Cursor::new(&input[..]);
        let got = read_submission(&mut cursor);
        assert_eq!(got.as_deref(), Some("v  <\n>  ^\n"));
    }

    #[test]
    fn read_submission_empty_returns_none() {
        let mut cursor = Cursor::new(Vec::<u8>::new());
        assert!(read_submission(&mut cursor).is_none());
    }

    #[test]
    fn execute_program_returns_captured_output() {
        let cancel = Arc::new(AtomicBool::new(false));
        let out = execute_program(",.!", Embedded::new("q".chars()), cancel);
        assert_eq!(out.output(), "q");
    }

    #[test]
    fn execute_program_accepts_crlf_rows() {
        let cancel = Arc::new(AtomicBool::new(false));
        let out = execute_program(",.v\r\n!+\r\n", Embedded::new("r".chars()), cancel);
        assert_eq!(out.output(), "r");
    }

    #[test]
    fn highlighter_groups_runs_of_the_same_class() {
        let hl = BrainboxHighlighter::from_colors(&Colors::default());
        let styled = hl.highlight("++-x", 0);
        assert_eq!(styled.buffer.len(), 3);
        assert_eq!(styled.buffer[0].1, "++");
    }
}
