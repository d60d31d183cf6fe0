use std::path::PathBuf;

use clap::Parser;

use ushell::jobs::signals;
use ushell::shell::{Shell, ShellOptions};

#[derive(Parser)]
#[command(name = "ushell")]
#[command(about = "An interactive POSIX-style shell with job control")]
#[command(version)]
struct Cli {
    /// Execute a single command line and exit with its status
    #[arg(short = 'c')]
    command: Option<String>,

    /// History file location (default: ~/.ushell_history)
    #[arg(long = "history-file")]
    history_file: Option<PathBuf>,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(e) = signals::install() {
        eprintln!("ushell: failed to install signal handlers: {}", e);
        std::process::exit(1);
    }

    let mut shell = Shell::new(ShellOptions {
        history_file: cli.history_file,
    });

    let status = match cli.command {
        Some(line) => shell.run_command(&line),
        None => shell.run_interactive(),
    };
    std::process::exit(status & 0xff);
}
