//! Built-in Commands
//!
//! Commands implemented in-process by the shell. They share the signature
//! `(shell, argv) -> status` and communicate failure only through the
//! returned status; a built-in never aborts the REPL.
//!
//! Resolution order puts built-ins before bundled tools and external
//! programs (see `executor::resolution`).

pub mod basic;
pub mod history_cmd;
pub mod job_control;
pub mod variables;

use crate::shell::Shell;

pub type Builtin = fn(&mut Shell, &[String]) -> i32;

/// All built-in names, sorted, for completion and `help`-style listings.
pub fn names() -> &'static [&'static str] {
    &[
        "bg", "cd", "echo", "env", "exit", "export", "fg", "history", "jobs", "pwd", "set",
        "unset",
    ]
}

/// Look up a built-in by name.
pub fn find(name: &str) -> Option<Builtin> {
    let builtin: Builtin = match name {
        "cd" => basic::builtin_cd,
        "pwd" => basic::builtin_pwd,
        "echo" => basic::builtin_echo,
        "exit" => basic::builtin_exit,
        "export" => variables::builtin_export,
        "set" => variables::builtin_set,
        "unset" => variables::builtin_unset,
        "env" => variables::builtin_env,
        "history" => history_cmd::builtin_history,
        "jobs" => job_control::builtin_jobs,
        "fg" => job_control::builtin_fg,
        "bg" => job_control::builtin_bg,
        _ => return None,
    };
    Some(builtin)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_listed_name_resolves() {
        for name in names() {
            assert!(find(name).is_some(), "builtin {} missing", name);
        }
    }

    #[test]
    fn test_unknown_name_does_not_resolve() {
        assert!(find("definitely-not-a-builtin").is_none());
    }

    #[test]
    fn test_names_are_sorted_for_stable_completion() {
        let mut sorted = names().to_vec();
        sorted.sort();
        assert_eq!(names(), sorted.as_slice());
    }
}
