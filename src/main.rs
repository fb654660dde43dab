use std::env;
use std::io::{self, IsTerminal, Write};

use brainbox::commands::{repl, run};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

fn print_top_usage_and_exit(program: &str, code: i32) -> ! {
    eprintln!(
        r#"Usage:
  {0} <PATH>                           # Run the brainbox program at PATH
  {0} run  [OPTIONS] <PATH>            # Run with --debug, --input, --max-steps or --timeout
  {0} repl [--bare|--editor]           # Start a brainbox REPL

Run "{0} <subcommand> --help" for more info.

Logging goes to stderr; set BRAINBOX_LOG (e.g. BRAINBOX_LOG=debug) to change the level.
"#,
        program
    );
    let _ = io::stderr().flush();
    std::process::exit(code);
}

#[derive(Parser, Debug)]
#[command(
    name = "brainbox",
    disable_help_flag = true,
    disable_help_subcommand = true,
    args_conflicts_with_subcommands = true
)]
struct Cli {
    /// Show this help
    #[arg(short = 'h', long = "help", action = clap::ArgAction::SetTrue)]
    help: bool,

    /// Program to run
    #[arg(value_name = "PATH")]
    path: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    Run(run::RunArgs),
    Repl(repl::ReplArgs),
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("BRAINBOX_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .init();
}

fn main() {
    init_logging();

    // We still pull the program name for help rendering consistency
    let program = env::args().next().unwrap_or_else(|| String::from("brainbox"));

    let cli = Cli::parse();

    if cli.help {
        print_top_usage_and_exit(&program, 0);
    }

    let code = match cli.command {
        Some(Command::Run(args)) => run::run(&program, args),
        Some(Command::Repl(args)) => repl::run(&program, args),
        None => run::run(&program, run::RunArgs { path: cli.path, ..Default::default() }),
    };

    std::process::exit(code);
}
