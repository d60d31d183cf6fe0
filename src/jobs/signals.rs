//! Signal Dispatcher
//!
//! Handlers installed once at shell startup:
//! - SIGCHLD sets the `child_exited` flag; reaping happens in the REPL
//! - SIGINT forwards to the foreground process group, or writes a newline
//!   so the prompt redraws cleanly when the shell itself is foreground
//! - SIGTSTP forwards to the foreground group, otherwise it is ignored
//! - SIGTTOU / SIGTTIN are ignored so background jobs touching the terminal
//!   cannot stop the shell
//!
//! Handlers restrict themselves to async-signal-safe operations: atomic
//! loads/stores, `kill`, and `write`, with errno saved and restored.

use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};

use nix::errno::Errno;
use nix::sys::signal::{sigaction, SaFlags, SigAction, SigHandler, SigSet, Signal};

/// Process-group id of the foreground pipeline; 0 means the shell itself is
/// foreground. Written only by the executor and the `fg` built-in.
static FOREGROUND_PGID: AtomicI32 = AtomicI32::new(0);

/// Set by the SIGCHLD handler; consumed by the REPL loop.
static CHILD_EXITED: AtomicBool = AtomicBool::new(false);

pub fn set_foreground(pgid: i32) {
    FOREGROUND_PGID.store(pgid, Ordering::SeqCst);
}

pub fn clear_foreground() {
    FOREGROUND_PGID.store(0, Ordering::SeqCst);
}

pub fn foreground_pgid() -> i32 {
    FOREGROUND_PGID.load(Ordering::SeqCst)
}

/// Consume the child-exited flag, returning whether it was set.
pub fn take_child_exited() -> bool {
    CHILD_EXITED.swap(false, Ordering::SeqCst)
}

extern "C" fn on_sigchld(_: libc::c_int) {
    let saved = Errno::last_raw();
    CHILD_EXITED.store(true, Ordering::SeqCst);
    Errno::set_raw(saved);
}

extern "C" fn on_sigint(_: libc::c_int) {
    let saved = Errno::last_raw();
    let pgid = FOREGROUND_PGID.load(Ordering::SeqCst);
    if pgid > 0 {
        // Signal the whole group so every process of the pipeline sees it.
        unsafe {
            libc::kill(-pgid, libc::SIGINT);
        }
    } else {
        unsafe {
            libc::write(libc::STDOUT_FILENO, b"\n".as_ptr().cast(), 1);
        }
    }
    Errno::set_raw(saved);
}

extern "C" fn on_sigtstp(_: libc::c_int) {
    let saved = Errno::last_raw();
    let pgid = FOREGROUND_PGID.load(Ordering::SeqCst);
    if pgid > 0 {
        unsafe {
            libc::kill(-pgid, libc::SIGTSTP);
        }
    }
    // shell itself is never stopped
    Errno::set_raw(saved);
}

/// Install all job-control signal handlers. Called once at startup.
pub fn install() -> nix::Result<()> {
    let flags = SaFlags::SA_RESTART;
    let mask = SigSet::empty();

    unsafe {
        sigaction(
            Signal::SIGINT,
            &SigAction::new(SigHandler::Handler(on_sigint), flags, mask),
        )?;
        sigaction(
            Signal::SIGTSTP,
            &SigAction::new(SigHandler::Handler(on_sigtstp), flags, mask),
        )?;
        sigaction(
            Signal::SIGCHLD,
            &SigAction::new(SigHandler::Handler(on_sigchld), flags, mask),
        )?;
        sigaction(
            Signal::SIGTTOU,
            &SigAction::new(SigHandler::SigIgn, flags, mask),
        )?;
        sigaction(
            Signal::SIGTTIN,
            &SigAction::new(SigHandler::SigIgn, flags, mask),
        )?;
    }
    // SIGQUIT and SIGTERM keep their default disposition (terminate).
    Ok(())
}

/// Restore default dispositions in a forked child before exec or before
/// running a built-in, so pipeline members react to signals normally.
pub fn reset_in_child() {
    let flags = SaFlags::empty();
    let mask = SigSet::empty();
    let default = SigAction::new(SigHandler::SigDfl, flags, mask);
    unsafe {
        let _ = sigaction(Signal::SIGINT, &default);
        let _ = sigaction(Signal::SIGTSTP, &default);
        let _ = sigaction(Signal::SIGCHLD, &default);
        let _ = sigaction(Signal::SIGTTOU, &default);
        let _ = sigaction(Signal::SIGTTIN, &default);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // The foreground pointer is exercised indirectly by the executor tests;
    // asserting its value here would race with pipelines running on other
    // test threads.

    #[test]
    fn test_child_exited_flag_is_consumed() {
        CHILD_EXITED.store(true, Ordering::SeqCst);
        assert!(take_child_exited());
        assert!(!take_child_exited());
    }
}
