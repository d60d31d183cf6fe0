//! Shell State and REPL
//!
//! `Shell` owns the per-session stores (environment, history, job table)
//! and drives the loop: reap finished jobs, print the prompt, read a line,
//! expand it, then parse and execute it. No command failure ever unwinds
//! the loop; only `exit`, EOF, or a fatal editor error end the session.

use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::sync::Arc;

use log::{info, warn};
use nix::unistd::{setpgid, Pid};

use crate::editor::LineEditor;
use crate::environment::Environment;
use crate::executor;
use crate::executor::pipeline::reclaim_terminal;
use crate::expansion;
use crate::history::History;
use crate::jobs::{signals, JobTable};

#[derive(Default)]
pub struct ShellOptions {
    /// Override for the history file (default `~/.ushell_history`).
    pub history_file: Option<PathBuf>,
}

pub struct Shell {
    pub env: Arc<Environment>,
    pub history: History,
    pub jobs: Arc<JobTable>,
    pub last_status: i32,
    pub interactive: bool,
    /// Set by the `exit` built-in; the REPL honors it after the command
    /// finishes.
    pub exit_request: Option<i32>,
    history_path: Option<PathBuf>,
}

impl Shell {
    pub fn new(options: ShellOptions) -> Self {
        let interactive = io::stdin().is_terminal();
        if interactive {
            claim_terminal();
        }

        let history_path = options.history_file.or_else(default_history_path);
        let mut history = History::new();
        if let Some(path) = &history_path {
            if let Err(e) = history.load(path) {
                warn!("failed to load history from {}: {}", path.display(), e);
            }
        }

        info!("ushell session starting (interactive={})", interactive);
        Self {
            env: Arc::new(Environment::new()),
            history,
            jobs: Arc::new(JobTable::new()),
            last_status: 0,
            interactive,
            exit_request: None,
            history_path,
        }
    }

    /// A shell with no history file and no terminal, for unit tests.
    #[cfg(test)]
    pub fn new_for_tests() -> Self {
        Self {
            env: Arc::new(Environment::new()),
            history: History::new(),
            jobs: Arc::new(JobTable::new()),
            last_status: 0,
            interactive: false,
            exit_request: None,
            history_path: None,
        }
    }

    /// Expand, parse, and execute one line; records and returns its status.
    pub fn run_command(&mut self, line: &str) -> i32 {
        let expanded = expansion::expand(line, &self.env);
        let status = executor::execute_line(self, &expanded);
        self.last_status = status;
        status
    }

    /// The interactive loop. Returns the session's exit status.
    pub fn run_interactive(&mut self) -> i32 {
        let mut editor = LineEditor::new();

        loop {
            // Background state transitions are observed here, never in the
            // signal handler: consume the flag and poll every job so Done
            // entries disappear before the next prompt.
            signals::take_child_exited();
            self.jobs.update();
            self.jobs.cleanup();

            self.history.reset_cursor();

            let prompt = self.prompt();
            let line = match editor.read_line(&prompt, &mut self.history, &self.env) {
                Ok(Some(line)) => line,
                Ok(None) => break, // EOF
                Err(e) => {
                    // terminal is unusable; this is the one fatal path
                    eprintln!("ushell: terminal error: {}", e);
                    self.last_status = 1;
                    break;
                }
            };

            let line = line.trim().to_string();
            if line.is_empty() {
                // covers Ctrl-C at an empty prompt, which yields status 0
                self.last_status = 0;
                continue;
            }

            self.history.add(&line);
            self.run_command(&line);

            if let Some(code) = self.exit_request {
                self.last_status = code;
                break;
            }
        }

        self.save_history();
        info!("ushell session ending with status {}", self.last_status);
        self.last_status
    }

    /// `user:path> ` with `$HOME` abbreviated to `~`.
    pub fn prompt(&self) -> String {
        let user = self.env.get("USER").unwrap_or_else(|| "user".to_string());
        let cwd = std::env::current_dir()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|_| "?".to_string());

        let path = match self.env.get("HOME") {
            Some(home) if !home.is_empty() && cwd.starts_with(&home) => {
                format!("~{}", &cwd[home.len()..])
            }
            _ => cwd,
        };
        format!("{}:{}> ", user, path)
    }

    fn save_history(&self) {
        if let Some(path) = &self.history_path {
            if let Err(e) = self.history.save(path) {
                warn!("failed to save history to {}: {}", path.display(), e);
            }
        }
    }
}

/// Put the shell in its own process group and make that group the
/// terminal's foreground group. Failures are non-fatal; the shell then runs
/// without job control rather than not at all.
fn claim_terminal() {
    let this = Pid::from_raw(0);
    if let Err(e) = setpgid(this, this) {
        warn!("setpgid failed: {}", e);
    }
    reclaim_terminal();
}

fn default_history_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|home| PathBuf::from(home).join(".ushell_history"))
}
