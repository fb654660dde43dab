use std::io::{self, IsTerminal, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use clap::Args;

use crate::repl::{execute_bare_once, repl_loop, select_mode, ModeFlagOverride, ReplMode};

#[derive(Args, Debug)]
#[command(disable_help_flag = true)]
pub struct ReplArgs {
    /// Force non-interactive bare mode
    #[arg(long = "bare", conflicts_with = "editor")]
    pub bare: bool,

    /// Force interactive mode (errors if stdin is not a TTY)
    #[arg(long = "editor", conflicts_with = "bare")]
    pub editor: bool,

    /// Show this help
    #[arg(short = 'h', long = "help", action = clap::ArgAction::SetTrue)]
    pub help: bool,
}

impl ReplArgs {
    pub fn mode_flag(&self) -> ModeFlagOverride {
        match (self.bare, self.editor) {
            (true, _) => ModeFlagOverride::Bare,
            (_, true) => ModeFlagOverride::Editor,
            _ => ModeFlagOverride::None,
        }
    }
}

// Public entry point for the REPL from main.rs
pub fn run(program: &str, args: ReplArgs) -> i32 {
    if args.help {
        usage_and_exit(program, 0);
    }

    // Determine mode: flags -> env -> auto-detect via is_terminal()
    let mode = match select_mode(args.mode_flag()) {
        Ok(m) => m,
        Err(msg) => {
            eprintln!("{program}: {msg}");
            let _ = io::stderr().flush();
            return 1;
        }
    };

    // Ctrl-C while a program runs cancels that program; a second press exits.
    let cancel = Arc::new(AtomicBool::new(false));
    let handler_flag = cancel.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        if handler_flag.swap(true, Ordering::Relaxed) {
            let _ = io::stdout().flush();
            let _ = io::stderr().flush();
            std::process::exit(0);
        }
    }) {
        eprintln!("{program}: failed to set ctrl+c handler: {e}");
        let _ = io::stderr().flush();
        return 1;
    }

    match mode {
        ReplMode::Editor => {
            // Print banners/prompts only if stderr is a TTY
            if io::stderr().is_terminal() {
                eprintln!("brainbox REPL (interactive editor mode)");
                eprintln!("Enter adds a row. Ctrl+d/Ctrl+z (Windows) runs the grid. Press ctrl+c to exit");
                let _ = io::stderr().flush();
            }

            if let Err(e) = repl_loop(cancel) {
                eprintln!("{program}: REPL error: {e}");
                let _ = io::stderr().flush();
                return 1;
            }

            0
        }
        ReplMode::Bare => {
            // Bare mode: read stdin until EOF, execute once, exit 0
            match execute_bare_once(cancel) {
                Ok(_) => 0,
                Err(e) => {
                    eprintln!("{program}: REPL error: {e}");
                    let _ = io::stderr().flush();
                    1
                }
            }
        }
    }
}

fn usage_and_exit(program: &str, code: i32) -> ! {
    eprintln!(
        r#"Usage:
  {0} repl   # Start a brainbox REPL (read-eval-print loop)

Options:
  --help,   -h        Show this help
  --bare              Force non-interactive bare mode
  --editor            Force interactive editor mode (errors if stdin is not a TTY)

Description:
  Starts a REPL where you can lay out a brainbox grid and run it live.

Notes:
    - Enter inserts a new row; the grid is run exactly as typed.
    - Ctrl+D runs the current grid on *nix/macOS.
    - Ctrl+Z and Enter will run the current grid on Windows.
    - Ctrl+C at the prompt exits the REPL; while a program runs it aborts that program.
    - The REPL will print a newline after each execution for readability.
    - Each execution starts with fresh memory, pointers and loop stack.
    - The REPL will exit after a single execution if the environment variable `BRAINBOX_REPL_ONCE` is set to `1`.
    - Mode selection:
        * Flags: --bare|--editor override environment and auto-detection.
        * Env: BRAINBOX_REPL_MODE=bare|editor overrides auto-detection (flags, when present, will override env).
        * Auto-detect: if stdin is a TTY, starts in interactive editor mode; otherwise, bare mode.
        * In bare mode stdin holds the program, so `,` receives no input.
        * Prompts/banners suppressed if stderr is not a TTY.
"#,
        program
    );
    let _ = io::stderr().flush();
    std::process::exit(code);
}
