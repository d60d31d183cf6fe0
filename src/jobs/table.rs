//! Job Table
//!
//! Tracks background and stopped pipelines:
//! - job ids are monotonic from 1 and never reused within a session
//! - a job's `pgid` is the pid of its first process (the group leader)
//! - `update()` polls every job non-blockingly and records transitions
//! - `cleanup()` drops every job that reached `Done`
//! - the most-recent and second-most-recent jobs display `+` and `-`
//!
//! The table is mutex-guarded; signal handlers never touch it directly, they
//! only raise a flag that the REPL converts into an `update()` call.

use std::fmt;
use std::sync::Mutex;

use log::debug;
use nix::errno::Errno;
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::Pid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Running,
    Stopped,
    Done,
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobStatus::Running => write!(f, "Running"),
            JobStatus::Stopped => write!(f, "Stopped"),
            JobStatus::Done => write!(f, "Done"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Job {
    pub job_id: u32,
    pub pgid: i32,
    pub command: String,
    pub status: JobStatus,
    pub background: bool,
}

#[derive(Default)]
struct TableInner {
    jobs: Vec<Job>,
    next_id: u32,
}

pub struct JobTable {
    inner: Mutex<TableInner>,
}

impl JobTable {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(TableInner {
                jobs: Vec::new(),
                next_id: 1,
            }),
        }
    }

    /// Register a job and return its id.
    pub fn add(&self, pgid: i32, command: &str, background: bool) -> u32 {
        let mut inner = self.inner.lock().unwrap();
        let job_id = inner.next_id;
        inner.next_id += 1;
        inner.jobs.push(Job {
            job_id,
            pgid,
            command: command.to_string(),
            status: JobStatus::Running,
            background,
        });
        debug!("job [{}] added: pgid={} cmd={:?}", job_id, pgid, command);
        job_id
    }

    pub fn get(&self, job_id: u32) -> Option<Job> {
        let inner = self.inner.lock().unwrap();
        inner.jobs.iter().find(|j| j.job_id == job_id).cloned()
    }

    pub fn get_by_pgid(&self, pgid: i32) -> Option<Job> {
        let inner = self.inner.lock().unwrap();
        inner.jobs.iter().find(|j| j.pgid == pgid).cloned()
    }

    pub fn get_by_index(&self, index: usize) -> Option<Job> {
        let inner = self.inner.lock().unwrap();
        inner.jobs.get(index).cloned()
    }

    /// Snapshot of all jobs paired with their display marker (`+` for the
    /// most recent, `-` for the second most recent, space otherwise).
    pub fn snapshot(&self) -> Vec<(Job, char)> {
        let inner = self.inner.lock().unwrap();
        let count = inner.jobs.len();
        inner
            .jobs
            .iter()
            .enumerate()
            .map(|(i, job)| {
                let marker = if i + 1 == count {
                    '+'
                } else if i + 2 == count {
                    '-'
                } else {
                    ' '
                };
                (job.clone(), marker)
            })
            .collect()
    }

    /// The most recently added job.
    pub fn most_recent(&self) -> Option<Job> {
        let inner = self.inner.lock().unwrap();
        inner.jobs.last().cloned()
    }

    /// The most recently added stopped job.
    pub fn most_recent_stopped(&self) -> Option<Job> {
        let inner = self.inner.lock().unwrap();
        inner
            .jobs
            .iter()
            .rev()
            .find(|j| j.status == JobStatus::Stopped)
            .cloned()
    }

    pub fn set_status(&self, job_id: u32, status: JobStatus) {
        let mut inner = self.inner.lock().unwrap();
        if let Some(job) = inner.jobs.iter_mut().find(|j| j.job_id == job_id) {
            job.status = status;
        }
    }

    pub fn set_background(&self, job_id: u32, background: bool) {
        let mut inner = self.inner.lock().unwrap();
        if let Some(job) = inner.jobs.iter_mut().find(|j| j.job_id == job_id) {
            job.background = background;
        }
    }

    pub fn remove(&self, job_id: u32) -> bool {
        let mut inner = self.inner.lock().unwrap();
        let before = inner.jobs.len();
        inner.jobs.retain(|j| j.job_id != job_id);
        inner.jobs.len() != before
    }

    pub fn count(&self) -> usize {
        self.inner.lock().unwrap().jobs.len()
    }

    /// Poll every tracked job without blocking and record status changes.
    pub fn update(&self) {
        let mut inner = self.inner.lock().unwrap();
        for job in inner.jobs.iter_mut() {
            if job.status == JobStatus::Done {
                continue;
            }
            let next = poll_group(job.pgid, job.status);
            if next != job.status {
                debug!("job [{}] {} -> {}", job.job_id, job.status, next);
                job.status = next;
            }
        }
    }

    /// Remove every job whose status is `Done`. Returns how many were
    /// dropped.
    pub fn cleanup(&self) -> usize {
        let mut inner = self.inner.lock().unwrap();
        let before = inner.jobs.len();
        inner.jobs.retain(|j| j.status != JobStatus::Done);
        before - inner.jobs.len()
    }
}

impl Default for JobTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Reap whatever the process group has to report without blocking and decide
/// the job's next status. The group is `Done` only once every member has
/// been collected (waitpid reports ECHILD).
fn poll_group(pgid: i32, current: JobStatus) -> JobStatus {
    let mut status = current;
    let flags = WaitPidFlag::WNOHANG | WaitPidFlag::WUNTRACED | WaitPidFlag::WCONTINUED;

    loop {
        match waitpid(Pid::from_raw(-pgid), Some(flags)) {
            Ok(WaitStatus::StillAlive) => return status,
            Ok(WaitStatus::Exited(..)) | Ok(WaitStatus::Signaled(..)) => {
                // keep draining; ECHILD tells us when the group is empty
                continue;
            }
            Ok(WaitStatus::Stopped(..)) => {
                status = JobStatus::Stopped;
            }
            Ok(WaitStatus::Continued(..)) => {
                status = JobStatus::Running;
            }
            Ok(_) => continue,
            Err(Errno::ECHILD) => return JobStatus::Done,
            Err(Errno::EINTR) => continue,
            Err(_) => return JobStatus::Done,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_ids_are_monotonic_and_never_reused() {
        let table = JobTable::new();
        let a = table.add(1001, "sleep 1", true);
        let b = table.add(1002, "sleep 2", true);
        assert_eq!((a, b), (1, 2));

        table.remove(b);
        let c = table.add(1003, "sleep 3", true);
        assert_eq!(c, 3);
    }

    #[test]
    fn test_lookup_by_id_pgid_and_index() {
        let table = JobTable::new();
        let id = table.add(555, "cmd", true);
        assert_eq!(table.get(id).unwrap().pgid, 555);
        assert_eq!(table.get_by_pgid(555).unwrap().job_id, id);
        assert_eq!(table.get_by_index(0).unwrap().job_id, id);
        assert!(table.get_by_index(1).is_none());
    }

    #[test]
    fn test_markers_flag_most_recent_jobs() {
        let table = JobTable::new();
        table.add(1, "a", true);
        table.add(2, "b", true);
        table.add(3, "c", true);
        let markers: Vec<char> = table.snapshot().into_iter().map(|(_, m)| m).collect();
        assert_eq!(markers, vec![' ', '-', '+']);
    }

    #[test]
    fn test_most_recent_stopped_skips_running_jobs() {
        let table = JobTable::new();
        let a = table.add(1, "a", true);
        let b = table.add(2, "b", true);
        table.set_status(a, JobStatus::Stopped);
        table.set_status(b, JobStatus::Running);
        assert_eq!(table.most_recent_stopped().unwrap().job_id, a);
    }

    #[test]
    fn test_update_marks_unknown_group_done_and_cleanup_removes_it() {
        let table = JobTable::new();
        // A pgid this process has no children in: waitpid reports ECHILD and
        // the job must transition to Done.
        let id = table.add(999_999, "ghost", true);
        table.update();
        assert_eq!(table.get(id).unwrap().status, JobStatus::Done);
        assert_eq!(table.cleanup(), 1);
        assert_eq!(table.count(), 0);
    }

    #[test]
    fn test_cleanup_keeps_live_jobs() {
        let table = JobTable::new();
        let id = table.add(123, "keep", true);
        table.set_status(id, JobStatus::Stopped);
        assert_eq!(table.cleanup(), 0);
        assert_eq!(table.count(), 1);
    }
}
