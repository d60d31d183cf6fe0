//! myls - list directory contents
//!
//! Supports `-l` (long format), `-a` (include dotfiles), an optional path,
//! and an optional glob pattern filter. A wildcard in the final path
//! component is treated as the pattern, so `myls src/*.rs` works after the
//! shell's own glob pass falls through.

use std::fs;
use std::os::unix::fs::{MetadataExt, PermissionsExt};
use std::path::Path;

use chrono::{DateTime, Local};

use crate::glob::{is_glob_pattern, match_pattern};

use super::types::Tool;

pub struct MyLs;

impl Tool for MyLs {
    fn name(&self) -> &'static str {
        "myls"
    }

    fn run(&self, argv: &[String]) -> i32 {
        let mut show_all = false;
        let mut long_format = false;
        let mut positional: Vec<&str> = Vec::new();

        for arg in &argv[1..] {
            if let Some(flags) = arg.strip_prefix('-') {
                for flag in flags.chars() {
                    match flag {
                        'l' => long_format = true,
                        'a' => show_all = true,
                        other => {
                            eprintln!("myls: invalid option -- '{}'", other);
                            return 1;
                        }
                    }
                }
            } else {
                positional.push(arg);
            }
        }

        if positional.len() > 2 {
            eprintln!("myls: too many arguments");
            return 1;
        }

        let (path, pattern) = split_path_and_pattern(&positional);
        list_directory(Path::new(&path), show_all, long_format, pattern.as_deref())
    }
}

/// First positional is the path, second the pattern; a wildcard in the
/// path's final component is promoted to the pattern.
fn split_path_and_pattern(positional: &[&str]) -> (String, Option<String>) {
    match positional {
        [] => (".".to_string(), None),
        [path] => {
            let p = Path::new(path);
            let base = p.file_name().and_then(|n| n.to_str()).unwrap_or("");
            if is_glob_pattern(base) {
                let dir = p.parent().filter(|d| !d.as_os_str().is_empty());
                let dir = dir.map(|d| d.display().to_string()).unwrap_or_else(|| ".".into());
                (dir, Some(base.to_string()))
            } else {
                (path.to_string(), None)
            }
        }
        [path, pattern, ..] => (path.to_string(), Some(pattern.to_string())),
    }
}

fn list_directory(dir: &Path, show_all: bool, long_format: bool, pattern: Option<&str>) -> i32 {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            eprintln!("myls: cannot access '{}': {}", dir.display(), e);
            return 1;
        }
    };

    let mut names: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| show_all || !name.starts_with('.'))
        .filter(|name| pattern.map_or(true, |p| match_pattern(p, name)))
        .collect();
    names.sort();

    let mut status = 0;
    for name in names {
        if long_format {
            if print_long(&dir.join(&name), &name).is_err() {
                status = 1;
            }
        } else {
            println!("{}", name);
        }
    }
    status
}

fn print_long(path: &Path, name: &str) -> Result<(), ()> {
    let meta = fs::symlink_metadata(path).map_err(|e| {
        eprintln!("myls: cannot stat '{}': {}", path.display(), e);
    })?;

    let mtime: DateTime<Local> = meta
        .modified()
        .map(DateTime::from)
        .unwrap_or_else(|_| Local::now());

    println!(
        "{} {:3} {:5} {:5} {:8} {} {}",
        mode_string(&meta),
        meta.nlink(),
        meta.uid(),
        meta.gid(),
        meta.len(),
        mtime.format("%b %e %H:%M"),
        name
    );
    Ok(())
}

/// Render a `drwxr-xr-x` style permission string.
fn mode_string(meta: &fs::Metadata) -> String {
    let mode = meta.permissions().mode();
    let file_type = if meta.is_dir() {
        'd'
    } else if meta.file_type().is_symlink() {
        'l'
    } else {
        '-'
    };

    let mut out = String::with_capacity(10);
    out.push(file_type);
    for shift in [6, 3, 0] {
        let bits = (mode >> shift) & 0o7;
        out.push(if bits & 0o4 != 0 { 'r' } else { '-' });
        out.push(if bits & 0o2 != 0 { 'w' } else { '-' });
        out.push(if bits & 0o1 != 0 { 'x' } else { '-' });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_plain_path() {
        assert_eq!(split_path_and_pattern(&["src"]), ("src".to_string(), None));
    }

    #[test]
    fn test_split_promotes_wildcard_basename() {
        assert_eq!(
            split_path_and_pattern(&["src/*.rs"]),
            ("src".to_string(), Some("*.rs".to_string()))
        );
        assert_eq!(
            split_path_and_pattern(&["*.rs"]),
            (".".to_string(), Some("*.rs".to_string()))
        );
    }

    #[test]
    fn test_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent").display().to_string();
        assert_eq!(MyLs.run(&["myls".to_string(), missing]), 1);
    }

    #[test]
    fn test_lists_existing_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "").unwrap();
        let status = MyLs.run(&["myls".to_string(), dir.path().display().to_string()]);
        assert_eq!(status, 0);
    }
}
