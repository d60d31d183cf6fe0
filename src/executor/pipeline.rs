//! Pipeline Execution
//!
//! The process-launch machinery. For a pipeline of N commands:
//! 1. create N-1 pipes
//! 2. fork each command; the first child becomes its own process-group
//!    leader and the rest join that group. The group is set in both parent
//!    and child so the shell never consults a group that is not yet set.
//! 3. each child wires fd 0 / fd 1 from the redirection file, the adjacent
//!    pipe end, or the inherited descriptor, closes every other pipe fd,
//!    then runs a built-in / bundled tool inline (exiting with its status)
//!    or execs an external program.
//! 4. a background pipeline is registered as a job (`pgid` = first child's
//!    pid) without waiting; a foreground pipeline owns the terminal while
//!    the shell waits, and a stop re-enters the job table as Stopped.
//!
//! A single foreground command without redirections that resolves to a
//! built-in or tool runs inline in the shell, no fork.

use std::ffi::CString;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::os::fd::{AsRawFd, OwnedFd};
use std::os::unix::fs::OpenOptionsExt;

use log::{debug, warn};
use nix::errno::Errno;
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::{close, dup2, execvp, fork, getpgrp, pipe, setpgid, tcsetpgrp, ForkResult, Pid};

use crate::ast::{Command, Pipeline};
use crate::jobs::signals;
use crate::jobs::JobStatus;
use crate::shell::Shell;

use super::resolution::{resolve, Resolved};

pub const EXIT_COMMAND_NOT_FOUND: i32 = 127;
pub const EXIT_NOT_EXECUTABLE: i32 = 126;

/// Result of waiting on a foreground process group.
pub enum WaitOutcome {
    Finished(i32),
    Stopped,
}

enum PidOutcome {
    Exited(i32),
    Signaled(i32),
    Stopped,
}

/// Execute one pipeline and return the shell-level status.
pub fn execute_pipeline(shell: &mut Shell, pipeline: &Pipeline) -> i32 {
    if pipeline.commands.is_empty() {
        return 0;
    }

    // Fast path: a lone foreground built-in or tool without redirections
    // runs inline in the shell.
    if pipeline.commands.len() == 1 && !pipeline.background {
        let command = &pipeline.commands[0];
        if command.has_no_redirections() {
            match resolve(command.name()) {
                Resolved::Builtin(builtin) => return builtin(shell, &command.argv),
                Resolved::Tool(tool) => return tool.run(&command.argv),
                Resolved::External => {}
            }
        }
    }

    let count = pipeline.commands.len();
    let mut pipes: Vec<(OwnedFd, OwnedFd)> = Vec::with_capacity(count.saturating_sub(1));
    for _ in 1..count {
        match pipe() {
            Ok(ends) => pipes.push(ends),
            Err(e) => {
                eprintln!("ushell: pipe: {}", e);
                return 1;
            }
        }
    }

    // Children inherit stdio buffers; flush so nothing is printed twice.
    let _ = io::stdout().flush();
    let _ = io::stderr().flush();

    let mut pids: Vec<Pid> = Vec::with_capacity(count);
    let mut pgid: Option<Pid> = None;

    for (index, command) in pipeline.commands.iter().enumerate() {
        match unsafe { fork() } {
            Err(e) => {
                eprintln!("ushell: fork: {}", e);
                return 1;
            }
            Ok(ForkResult::Parent { child }) => {
                // Set the child's group here as well as in the child; doing
                // it on both sides closes the race where the shell consults
                // the group before the child has set it.
                let group = pgid.unwrap_or(child);
                let _ = setpgid(child, group);
                pgid.get_or_insert(child);
                pids.push(child);
            }
            Ok(ForkResult::Child) => {
                run_child(shell, command, index, count, &pipes, pgid);
            }
        }
    }

    // Parent closes every pipe fd; children hold the only remaining ends.
    drop(pipes);

    let Some(pgid) = pgid else { return 1 };
    let command_string = pipeline.display_string();

    if pipeline.background {
        let job_id = shell.jobs.add(pgid.as_raw(), &command_string, true);
        println!("[{}] {}", job_id, pgid.as_raw());
        let _ = io::stdout().flush();
        return 0;
    }

    // Foreground: hand the terminal to the pipeline's group and wait.
    signals::set_foreground(pgid.as_raw());
    if shell.interactive {
        give_terminal_to(pgid.as_raw());
    }

    let mut last_status = 0;
    let mut stopped = false;
    for (index, pid) in pids.iter().enumerate() {
        match wait_for_pid(*pid) {
            PidOutcome::Exited(code) => {
                if index + 1 == count {
                    last_status = code;
                }
            }
            PidOutcome::Signaled(signo) => {
                if index + 1 == count {
                    last_status = 128 + signo;
                }
            }
            PidOutcome::Stopped => {
                stopped = true;
                break;
            }
        }
    }

    if stopped {
        let job_id = shell.jobs.add(pgid.as_raw(), &command_string, false);
        shell.jobs.set_status(job_id, JobStatus::Stopped);
        println!("\n[{}]+  Stopped                 {}", job_id, command_string);
        last_status = 0;
    }

    signals::clear_foreground();
    if shell.interactive {
        reclaim_terminal();
    }
    debug!("pipeline {:?} -> {}", command_string, last_status);
    last_status
}

/// Child-side setup and dispatch. Never returns.
fn run_child(
    shell: &mut Shell,
    command: &Command,
    index: usize,
    count: usize,
    pipes: &[(OwnedFd, OwnedFd)],
    pgid: Option<Pid>,
) -> ! {
    // Join the pipeline's process group before anything can signal it.
    let this = Pid::from_raw(0);
    match pgid {
        None => {
            let _ = setpgid(this, this);
        }
        Some(group) => {
            let _ = setpgid(this, group);
        }
    }
    signals::reset_in_child();

    // fd 0: redirection file, upstream pipe, or inherited stdin.
    if index == 0 {
        if let Some(path) = &command.infile {
            match File::open(path) {
                Ok(file) => {
                    let _ = dup2(file.as_raw_fd(), libc::STDIN_FILENO);
                }
                Err(e) => {
                    eprintln!("ushell: {}: {}", path, e);
                    std::process::exit(1);
                }
            }
        }
    } else {
        let _ = dup2(pipes[index - 1].0.as_raw_fd(), libc::STDIN_FILENO);
    }

    // fd 1: redirection file, downstream pipe, or inherited stdout.
    if index + 1 == count {
        if let Some(path) = &command.outfile {
            let file = OpenOptions::new()
                .write(true)
                .create(true)
                .append(command.append)
                .truncate(!command.append)
                .mode(0o644)
                .open(path);
            match file {
                Ok(file) => {
                    let _ = dup2(file.as_raw_fd(), libc::STDOUT_FILENO);
                }
                Err(e) => {
                    eprintln!("ushell: {}: {}", path, e);
                    std::process::exit(1);
                }
            }
        }
    } else {
        let _ = dup2(pipes[index].1.as_raw_fd(), libc::STDOUT_FILENO);
    }

    // Close every pipe fd; only the dup2'd standard descriptors remain.
    for (read_end, write_end) in pipes {
        let _ = close(read_end.as_raw_fd());
        let _ = close(write_end.as_raw_fd());
    }

    match resolve(command.name()) {
        Resolved::Builtin(builtin) => {
            let status = builtin(shell, &command.argv);
            let _ = io::stdout().flush();
            std::process::exit(status);
        }
        Resolved::Tool(tool) => {
            let status = tool.run(&command.argv);
            let _ = io::stdout().flush();
            std::process::exit(status);
        }
        Resolved::External => exec_external(&command.argv),
    }
}

/// Replace the child with an external program; on failure report and exit
/// 127 (not found) or 126 (not executable).
fn exec_external(argv: &[String]) -> ! {
    let mut cargs = Vec::with_capacity(argv.len());
    for arg in argv {
        match CString::new(arg.as_str()) {
            Ok(carg) => cargs.push(carg),
            Err(_) => {
                eprintln!("ushell: {}: invalid argument", argv[0]);
                std::process::exit(1);
            }
        }
    }

    let err = match execvp(&cargs[0], &cargs) {
        Err(e) => e,
        Ok(infallible) => match infallible {},
    };
    match err {
        Errno::ENOENT => {
            eprintln!("ushell: command not found: {}", argv[0]);
            std::process::exit(EXIT_COMMAND_NOT_FOUND);
        }
        Errno::EACCES => {
            eprintln!("ushell: permission denied: {}", argv[0]);
            std::process::exit(EXIT_NOT_EXECUTABLE);
        }
        other => {
            eprintln!("ushell: {}: {}", argv[0], other);
            std::process::exit(EXIT_NOT_EXECUTABLE);
        }
    }
}

/// Wait for one pid, reporting stops. Retries on EINTR.
fn wait_for_pid(pid: Pid) -> PidOutcome {
    loop {
        match waitpid(pid, Some(WaitPidFlag::WUNTRACED)) {
            Ok(WaitStatus::Exited(_, code)) => return PidOutcome::Exited(code),
            Ok(WaitStatus::Signaled(_, signal, _)) => {
                return PidOutcome::Signaled(signal as i32)
            }
            Ok(WaitStatus::Stopped(..)) => return PidOutcome::Stopped,
            Ok(_) => continue,
            Err(Errno::EINTR) => continue,
            Err(e) => {
                warn!("waitpid({}) failed: {}", pid, e);
                return PidOutcome::Exited(0);
            }
        }
    }
}

/// Wait for an entire process group (used by `fg`): collects members until
/// the group is empty or one of them stops.
pub fn wait_for_group(pgid: i32) -> WaitOutcome {
    let mut last_status = 0;
    loop {
        match waitpid(Pid::from_raw(-pgid), Some(WaitPidFlag::WUNTRACED)) {
            Ok(WaitStatus::Exited(_, code)) => last_status = code,
            Ok(WaitStatus::Signaled(_, signal, _)) => last_status = 128 + signal as i32,
            Ok(WaitStatus::Stopped(..)) => return WaitOutcome::Stopped,
            Ok(_) => {}
            Err(Errno::EINTR) => {}
            Err(Errno::ECHILD) => return WaitOutcome::Finished(last_status),
            Err(e) => {
                warn!("waitpid(-{}) failed: {}", pgid, e);
                return WaitOutcome::Finished(last_status);
            }
        }
    }
}

/// Transfer the controlling terminal to a process group.
pub fn give_terminal_to(pgid: i32) {
    if let Err(e) = tcsetpgrp(io::stdin(), Pid::from_raw(pgid)) {
        warn!("tcsetpgrp({}) failed: {}", pgid, e);
    }
}

/// Return the controlling terminal to the shell's own group.
pub fn reclaim_terminal() {
    if let Err(e) = tcsetpgrp(io::stdin(), getpgrp()) {
        warn!("tcsetpgrp(shell) failed: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Command as Cmd;
    use crate::shell::Shell;

    fn cmd(parts: &[&str]) -> Cmd {
        Cmd {
            argv: parts.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    fn foreground(commands: Vec<Cmd>) -> Pipeline {
        Pipeline {
            commands,
            background: false,
        }
    }

    #[test]
    fn test_external_true_and_false_statuses() {
        let mut shell = Shell::new_for_tests();
        assert_eq!(execute_pipeline(&mut shell, &foreground(vec![cmd(&["true"])])), 0);
        assert_eq!(execute_pipeline(&mut shell, &foreground(vec![cmd(&["false"])])), 1);
    }

    #[test]
    fn test_unknown_command_exits_127() {
        let mut shell = Shell::new_for_tests();
        let status = execute_pipeline(
            &mut shell,
            &foreground(vec![cmd(&["ushell-no-such-binary"])]),
        );
        assert_eq!(status, EXIT_COMMAND_NOT_FOUND);
    }

    #[test]
    fn test_pipeline_status_is_last_commands() {
        let mut shell = Shell::new_for_tests();
        // first command fails, last succeeds: pipeline status is the last's
        let status = execute_pipeline(
            &mut shell,
            &foreground(vec![cmd(&["false"]), cmd(&["true"])]),
        );
        assert_eq!(status, 0);

        let status = execute_pipeline(
            &mut shell,
            &foreground(vec![cmd(&["true"]), cmd(&["false"])]),
        );
        assert_eq!(status, 1);
    }

    #[test]
    fn test_output_redirection_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.txt");
        let mut shell = Shell::new_for_tests();

        let command = Cmd {
            argv: vec!["/bin/echo".into(), "hello".into()],
            outfile: Some(out.display().to_string()),
            ..Default::default()
        };
        let status = execute_pipeline(&mut shell, &foreground(vec![command]));
        assert_eq!(status, 0);
        assert_eq!(std::fs::read_to_string(&out).unwrap(), "hello\n");
    }

    #[test]
    fn test_append_redirection_keeps_existing_content() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("log.txt");
        std::fs::write(&out, "first\n").unwrap();
        let mut shell = Shell::new_for_tests();

        let command = Cmd {
            argv: vec!["/bin/echo".into(), "second".into()],
            outfile: Some(out.display().to_string()),
            append: true,
            ..Default::default()
        };
        assert_eq!(execute_pipeline(&mut shell, &foreground(vec![command])), 0);
        assert_eq!(std::fs::read_to_string(&out).unwrap(), "first\nsecond\n");
    }

    #[test]
    fn test_input_redirection_feeds_stdin() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.txt");
        let out = dir.path().join("out.txt");
        std::fs::write(&input, "payload\n").unwrap();
        let mut shell = Shell::new_for_tests();

        let command = Cmd {
            argv: vec!["cat".into()],
            infile: Some(input.display().to_string()),
            outfile: Some(out.display().to_string()),
            ..Default::default()
        };
        assert_eq!(execute_pipeline(&mut shell, &foreground(vec![command])), 0);
        assert_eq!(std::fs::read_to_string(&out).unwrap(), "payload\n");
    }

    #[test]
    fn test_missing_input_file_is_child_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut shell = Shell::new_for_tests();
        let command = Cmd {
            argv: vec!["cat".into()],
            infile: Some(dir.path().join("absent").display().to_string()),
            ..Default::default()
        };
        assert_eq!(execute_pipeline(&mut shell, &foreground(vec![command])), 1);
    }

    #[test]
    fn test_background_pipeline_registers_job() {
        let mut shell = Shell::new_for_tests();
        let pipeline = Pipeline {
            commands: vec![cmd(&["true"])],
            background: true,
        };
        assert_eq!(execute_pipeline(&mut shell, &pipeline), 0);
        assert_eq!(shell.jobs.count(), 1);
        let job = shell.jobs.get_by_index(0).unwrap();
        assert!(job.background);
        assert_eq!(job.command, "true &");

        // reap it so later tests see a clean table
        shell.jobs.update();
        shell.jobs.cleanup();
    }

    #[test]
    fn test_two_stage_pipe_through_cat() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("piped.txt");
        let mut shell = Shell::new_for_tests();

        let last = Cmd {
            argv: vec!["cat".into()],
            outfile: Some(out.display().to_string()),
            ..Default::default()
        };
        let pipeline = foreground(vec![cmd(&["/bin/echo", "through"]), last]);
        assert_eq!(execute_pipeline(&mut shell, &pipeline), 0);
        assert_eq!(std::fs::read_to_string(&out).unwrap(), "through\n");
    }
}
