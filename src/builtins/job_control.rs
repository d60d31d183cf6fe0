//! jobs, fg, bg

use nix::sys::signal::{killpg, Signal};
use nix::unistd::Pid;

use crate::executor::pipeline::{give_terminal_to, reclaim_terminal, wait_for_group, WaitOutcome};
use crate::jobs::signals;
use crate::jobs::JobStatus;
use crate::shell::Shell;

/// List tracked jobs: `jobs [-l] [-p] [-r] [-s]`.
pub fn builtin_jobs(shell: &mut Shell, argv: &[String]) -> i32 {
    let mut long_format = false;
    let mut pgid_only = false;
    let mut running_only = false;
    let mut stopped_only = false;

    for arg in &argv[1..] {
        let Some(flags) = arg.strip_prefix('-') else {
            eprintln!("ushell: jobs: unexpected argument: {}", arg);
            eprintln!("Usage: jobs [-l] [-p] [-r] [-s]");
            return 1;
        };
        for flag in flags.chars() {
            match flag {
                'l' => long_format = true,
                'p' => pgid_only = true,
                'r' => running_only = true,
                's' => stopped_only = true,
                other => {
                    eprintln!("ushell: jobs: invalid option -- '{}'", other);
                    eprintln!("Usage: jobs [-l] [-p] [-r] [-s]");
                    return 1;
                }
            }
        }
    }

    shell.jobs.update();

    for (job, marker) in shell.jobs.snapshot() {
        if running_only && job.status != JobStatus::Running {
            continue;
        }
        if stopped_only && job.status != JobStatus::Stopped {
            continue;
        }

        if pgid_only {
            println!("{}", job.pgid);
        } else if long_format {
            println!(
                "[{}]{}  {:<7} {:<20} {}",
                job.job_id,
                marker,
                job.pgid,
                job.status.to_string(),
                job.command
            );
        } else {
            println!(
                "[{}]{}  {:<20} {}",
                job.job_id,
                marker,
                job.status.to_string(),
                job.command
            );
        }
    }
    0
}

/// Resume a job in the foreground and wait for it: `fg [%n|n]`.
pub fn builtin_fg(shell: &mut Shell, argv: &[String]) -> i32 {
    let job = match argv.get(1) {
        Some(spec) => {
            let Some(job_id) = parse_job_spec(spec) else {
                eprintln!("ushell: fg: invalid job id: {}", spec);
                return 1;
            };
            match shell.jobs.get(job_id) {
                Some(job) => job,
                None => {
                    eprintln!("ushell: fg: {}: no such job", job_id);
                    return 1;
                }
            }
        }
        None => match shell.jobs.most_recent() {
            Some(job) => job,
            None => {
                eprintln!("ushell: fg: no current job");
                return 1;
            }
        },
    };

    shell.jobs.update();
    let job = match shell.jobs.get(job.job_id) {
        Some(job) if job.status != JobStatus::Done => job,
        _ => {
            eprintln!("ushell: fg: job {} has terminated", job.job_id);
            shell.jobs.cleanup();
            return 1;
        }
    };

    println!("{}", job.command);

    if job.status == JobStatus::Stopped {
        if let Err(e) = killpg(Pid::from_raw(job.pgid), Signal::SIGCONT) {
            eprintln!("ushell: fg: cannot resume job {}: {}", job.job_id, e);
            return 1;
        }
    }
    shell.jobs.set_status(job.job_id, JobStatus::Running);
    shell.jobs.set_background(job.job_id, false);

    if shell.interactive {
        give_terminal_to(job.pgid);
    }
    signals::set_foreground(job.pgid);

    let status = match wait_for_group(job.pgid) {
        WaitOutcome::Finished(status) => {
            shell.jobs.remove(job.job_id);
            status
        }
        WaitOutcome::Stopped => {
            shell.jobs.set_status(job.job_id, JobStatus::Stopped);
            shell.jobs.set_background(job.job_id, true);
            println!("\n[{}]+  Stopped                 {}", job.job_id, job.command);
            0
        }
    };

    signals::clear_foreground();
    if shell.interactive {
        reclaim_terminal();
    }
    status
}

/// Resume a stopped job in the background: `bg [%n|n]`.
pub fn builtin_bg(shell: &mut Shell, argv: &[String]) -> i32 {
    let job = match argv.get(1) {
        Some(spec) => {
            let Some(job_id) = parse_job_spec(spec) else {
                eprintln!("ushell: bg: invalid job id: {}", spec);
                return 1;
            };
            match shell.jobs.get(job_id) {
                Some(job) => job,
                None => {
                    eprintln!("ushell: bg: {}: no such job", job_id);
                    return 1;
                }
            }
        }
        None => match shell.jobs.most_recent_stopped() {
            Some(job) => job,
            None => {
                eprintln!("ushell: bg: no stopped jobs");
                return 1;
            }
        },
    };

    shell.jobs.update();
    let job = match shell.jobs.get(job.job_id) {
        Some(job) if job.status != JobStatus::Done => job,
        _ => {
            eprintln!("ushell: bg: job {} has terminated", job.job_id);
            shell.jobs.cleanup();
            return 1;
        }
    };

    if job.status == JobStatus::Running {
        eprintln!("ushell: bg: job {} already in background", job.job_id);
        return 0;
    }

    if let Err(e) = killpg(Pid::from_raw(job.pgid), Signal::SIGCONT) {
        eprintln!("ushell: bg: cannot resume job {}: {}", job.job_id, e);
        return 1;
    }
    shell.jobs.set_status(job.job_id, JobStatus::Running);
    shell.jobs.set_background(job.job_id, true);
    println!("[{}]+ {} &", job.job_id, job.command);
    0
}

/// Accept `%n` or plain `n`.
fn parse_job_spec(spec: &str) -> Option<u32> {
    let digits = spec.strip_prefix('%').unwrap_or(spec);
    match digits.parse::<u32>() {
        Ok(n) if n > 0 => Some(n),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::Shell;

    fn argv(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_job_spec() {
        assert_eq!(parse_job_spec("%3"), Some(3));
        assert_eq!(parse_job_spec("7"), Some(7));
        assert_eq!(parse_job_spec("%0"), None);
        assert_eq!(parse_job_spec("abc"), None);
        assert_eq!(parse_job_spec("%"), None);
    }

    #[test]
    fn test_fg_with_no_jobs_fails() {
        let mut shell = Shell::new_for_tests();
        assert_eq!(builtin_fg(&mut shell, &argv(&["fg"])), 1);
    }

    #[test]
    fn test_bg_with_no_stopped_jobs_fails() {
        let mut shell = Shell::new_for_tests();
        assert_eq!(builtin_bg(&mut shell, &argv(&["bg"])), 1);
    }

    #[test]
    fn test_jobs_rejects_unknown_flag() {
        let mut shell = Shell::new_for_tests();
        assert_eq!(builtin_jobs(&mut shell, &argv(&["jobs", "-z"])), 1);
    }

    #[test]
    fn test_jobs_listing_with_no_jobs_is_quiet_success() {
        let mut shell = Shell::new_for_tests();
        assert_eq!(builtin_jobs(&mut shell, &argv(&["jobs"])), 0);
    }

    #[test]
    fn test_fg_unknown_job_id_fails() {
        let mut shell = Shell::new_for_tests();
        assert_eq!(builtin_fg(&mut shell, &argv(&["fg", "%9"])), 1);
    }
}
