//! Completion Provider
//!
//! Generates candidates for the line editor's Tab handling. The editor
//! assumes the cursor sits at the end of the input:
//! - input with no space completes a command name from built-ins and
//!   bundled tools
//! - otherwise the final whitespace-delimited token is a filename prefix,
//!   completed against the current directory; each candidate is returned as
//!   a full replacement for the whole input
//! - a token beginning with `$` completes variable names against the
//!   environment store
//!
//! `.` and `..` never appear; dotfiles appear only when the prefix itself
//! begins with `.`. Candidates are sorted so the menu is stable.

use std::path::Path;

use crate::builtins;
use crate::environment::Environment;
use crate::tools;

/// Produce completion candidates for the current input text.
pub fn complete(input: &str, env: &Environment) -> Vec<String> {
    if input.is_empty() {
        return Vec::new();
    }

    if !input.contains(' ') {
        return command_candidates(input);
    }

    let token_start = input.rfind(' ').map(|p| p + 1).unwrap_or(0);
    let head = &input[..token_start];
    let token = &input[token_start..];

    if let Some(var_prefix) = token.strip_prefix('$') {
        return variable_candidates(var_prefix, env)
            .into_iter()
            .map(|name| format!("{}${}", head, name))
            .collect();
    }

    file_candidates(Path::new("."), token)
        .into_iter()
        .map(|name| format!("{}{}", head, name))
        .collect()
}

/// Built-in and bundled-tool names matching a prefix.
pub fn command_candidates(prefix: &str) -> Vec<String> {
    let mut names: Vec<String> = builtins::names()
        .iter()
        .chain(tools::registry().names().iter())
        .filter(|name| name.starts_with(prefix))
        .map(|name| name.to_string())
        .collect();
    names.sort();
    names
}

/// Directory entries of `dir` whose name begins with `prefix`.
pub fn file_candidates(dir: &Path, prefix: &str) -> Vec<String> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };

    let show_hidden = prefix.starts_with('.');
    let mut names: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| show_hidden || !name.starts_with('.'))
        .filter(|name| name.starts_with(prefix))
        .collect();
    names.sort();
    names
}

/// Shell variable names matching a prefix.
pub fn variable_candidates(prefix: &str, env: &Environment) -> Vec<String> {
    let mut names: Vec<String> = env
        .names()
        .into_iter()
        .filter(|name| name.starts_with(prefix))
        .collect();
    names.sort();
    names
}
