//! Filename Expansion
//!
//! Expands a wildcard pattern against the entries of a directory:
//! - a pattern without wildcards is passed through unchanged with no
//!   filesystem access
//! - `.` and `..` are always skipped; dotfiles are skipped unless the
//!   pattern itself begins with `.`
//! - matches are returned in byte-ascending order
//! - a pattern that matches nothing is passed through unchanged, so a
//!   literal-looking typo is not silently dropped

use std::path::Path;

use super::matcher::{is_glob_pattern, match_pattern};

/// Expand one pattern against the current directory.
pub fn expand(pattern: &str) -> Vec<String> {
    expand_in(Path::new("."), pattern)
}

/// Expand one pattern against the entries of `dir`.
pub fn expand_in(dir: &Path, pattern: &str) -> Vec<String> {
    if !is_glob_pattern(pattern) {
        return vec![pattern.to_string()];
    }

    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(_) => return vec![pattern.to_string()],
    };

    let match_hidden = pattern.starts_with('.');
    let mut matches: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| match_hidden || !name.starts_with('.'))
        .filter(|name| match_pattern(pattern, name))
        .collect();

    if matches.is_empty() {
        return vec![pattern.to_string()];
    }

    matches.sort_by(|a, b| a.as_bytes().cmp(b.as_bytes()));
    matches
}

/// Expand every argument of an argv, splicing matches in place.
pub fn expand_argv(argv: Vec<String>) -> Vec<String> {
    let mut expanded = Vec::with_capacity(argv.len());
    for arg in argv {
        expanded.extend(expand(&arg));
    }
    expanded
}
