use clap::Args;
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::time::Duration;
use std::{fs, thread};

use crate::cli_util::print_run_error;
use crate::config;
use crate::{BrainboxError, Channel, CodeGrid, Embedded, Interpreter, StepControl, Terminal};

/// Exit status after Ctrl-C, as shells report a SIGINT death.
pub const EXIT_INTERRUPTED: i32 = 130;

#[derive(Args, Debug, Default)]
#[command(disable_help_flag = true)]
pub struct RunArgs {
    /// Print a step-by-step table of operations instead of doing I/O
    #[arg(short = 'd', long = "debug")]
    pub debug: bool,

    /// Feed these characters to `,` and print captured output after halting
    #[arg(short = 'i', long = "input", value_name = "TEXT")]
    pub input: Option<String>,

    /// Wall-clock timeout in milliseconds (fallback BRAINBOX_TIMEOUT_MS; default unlimited)
    #[arg(long = "timeout", value_name = "MS")]
    pub timeout_ms: Option<u64>,

    /// Maximum interpreter steps before abort (fallback BRAINBOX_MAX_STEPS; default unlimited)
    #[arg(long = "max-steps", value_name = "N")]
    pub max_steps: Option<usize>,

    /// Path to the program
    #[arg(value_name = "PATH")]
    pub path: Option<String>,

    /// Show this help
    #[arg(short = 'h', long = "help", action = clap::ArgAction::SetTrue)]
    pub help: bool,
}

/// What the worker thread hands back: the run result plus any captured output.
struct Outcome {
    result: Result<(), BrainboxError>,
    captured: Option<String>,
}

fn execute<C: Channel>(grid: &CodeGrid, channel: C, debug: bool, ctrl: StepControl) -> (Result<(), BrainboxError>, C) {
    let mut bb = Interpreter::new(grid, channel);
    let result = if debug {
        bb.run_debug_with_control(ctrl)
    } else {
        bb.run_with_control(ctrl)
    };
    (result, bb.into_channel())
}

pub fn run(program: &str, args: RunArgs) -> i32 {
    if args.help {
        usage_and_exit(program, 0);
    }

    let RunArgs {
        debug,
        input,
        timeout_ms,
        max_steps,
        path,
        ..
    } = args;

    let Some(path) = path else {
        eprintln!("{program}: Error: A file path is required: $ {program} path/to/program");
        let _ = io::stderr().flush();
        return 2;
    };

    let source = match fs::read_to_string(&path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{program}: Error: There was a problem reading the file - {path}: {e}");
            let _ = io::stderr().flush();
            return 1;
        }
    };

    let limits = config::resolve_limits(max_steps, timeout_ms);
    tracing::debug!(%path, ?limits, "starting run");

    // First Ctrl-C cancels cooperatively; a second one exits at once.
    let cancel = Arc::new(AtomicBool::new(false));
    let handler_flag = cancel.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        if handler_flag.swap(true, Ordering::Relaxed) {
            let _ = io::stdout().flush();
            std::process::exit(EXIT_INTERRUPTED);
        }
    }) {
        eprintln!("{program}: failed to set ctrl+c handler: {e}");
        let _ = io::stderr().flush();
        return 1;
    }

    let grid = Arc::new(CodeGrid::from_source(&source));
    let (tx, rx) = mpsc::channel::<Outcome>();
    let worker_grid = grid.clone();
    let ctrl = StepControl::new(limits.max_steps, cancel.clone());

    thread::spawn(move || {
        let outcome = match input {
            Some(text) => {
                let (result, channel) = execute(&worker_grid, Embedded::new(text.chars()), debug, ctrl);
                Outcome { result, captured: Some(channel.into_output()) }
            }
            None => {
                let (result, _) = execute(&worker_grid, Terminal::new(), debug, ctrl);
                Outcome { result, captured: None }
            }
        };
        let _ = tx.send(outcome);
    });

    let received = match limits.timeout_ms {
        Some(ms) => rx.recv_timeout(Duration::from_millis(ms)),
        None => rx.recv().map_err(|_| mpsc::RecvTimeoutError::Disconnected),
    };

    let exit_code = match received {
        Ok(Outcome { result, captured }) => {
            if let Some(out) = captured {
                print!("{out}");
            }
            match result {
                Ok(()) => 0,
                Err(BrainboxError::Interrupted | BrainboxError::Canceled) => EXIT_INTERRUPTED,
                Err(err) => {
                    let _ = io::stdout().flush();
                    print_run_error(Some(program), &grid, &err);
                    1
                }
            }
        }
        Err(mpsc::RecvTimeoutError::Timeout) => {
            cancel.store(true, Ordering::Relaxed);
            let _ = crossterm::terminal::disable_raw_mode();
            eprintln!(
                "Execution aborted: wall-clock timeout exceeded ({} ms)",
                limits.timeout_ms.unwrap_or_default()
            );
            let _ = io::stderr().flush();
            1
        }
        Err(mpsc::RecvTimeoutError::Disconnected) => 1,
    };

    println!();
    let _ = io::stdout().flush();
    exit_code
}

fn usage_and_exit(program: &str, code: i32) -> ! {
    eprintln!(
        r#"Usage:
  {0} <PATH>
  {0} run [--debug|-d] [--input|-i TEXT] [--max-steps N] [--timeout MS] <PATH>

Options:
  --debug,  -d        Print a step-by-step table of operations instead of doing I/O
  --input,  -i TEXT   Feed TEXT to `,` instead of the terminal; output is printed after halting
  --max-steps N       Abort after N steps (fallback BRAINBOX_MAX_STEPS, then brainbox.toml)
  --timeout MS        Abort after MS milliseconds (fallback BRAINBOX_TIMEOUT_MS, then brainbox.toml)
  --help,   -h        Show this help

Notes:
- The program runs until it executes `!`.
- On a terminal, `,` waits for a single key press; Enter gives a newline, Esc gives nothing,
  and Ctrl-C aborts the run. With redirected stdin, `,` reads one byte.
- While `,` waits on redirected stdin, the first Ctrl-C only takes effect once a byte
  arrives or stdin closes; press Ctrl-C again to exit at once.

Examples:
- Run a program:
    {0} ./hello.bb
- Run with fixed input:
    {0} run --input "AB" ./echo.bb
"#,
        program
    );
    let _ = io::stderr().flush();
    std::process::exit(code);
}
