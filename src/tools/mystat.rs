//! mystat - display file status

use std::fs;
use std::os::unix::fs::{MetadataExt, PermissionsExt};

use chrono::{DateTime, Local};

use super::types::Tool;

pub struct MyStat;

impl Tool for MyStat {
    fn name(&self) -> &'static str {
        "mystat"
    }

    fn run(&self, argv: &[String]) -> i32 {
        let paths = &argv[1..];
        if paths.is_empty() {
            eprintln!("mystat: missing operand");
            return 1;
        }

        let mut status = 0;
        for path in paths {
            match fs::symlink_metadata(path) {
                Ok(meta) => print_stat(path, &meta),
                Err(e) => {
                    eprintln!("mystat: cannot stat '{}': {}", path, e);
                    status = 1;
                }
            }
        }
        status
    }
}

fn print_stat(path: &str, meta: &fs::Metadata) {
    let kind = if meta.is_dir() {
        "directory"
    } else if meta.file_type().is_symlink() {
        "symbolic link"
    } else {
        "regular file"
    };

    println!("  File: {}", path);
    println!(
        "  Size: {:<10} Blocks: {:<8} {}",
        meta.len(),
        meta.blocks(),
        kind
    );
    println!(
        "Access: (0{:o})  Uid: {}  Gid: {}  Links: {}",
        meta.permissions().mode() & 0o7777,
        meta.uid(),
        meta.gid(),
        meta.nlink()
    );
    if let Ok(modified) = meta.modified() {
        let when: DateTime<Local> = modified.into();
        println!("Modify: {}", when.format("%Y-%m-%d %H:%M:%S"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stat_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("f");
        fs::write(&file, "abc").unwrap();
        let status = MyStat.run(&["mystat".to_string(), file.display().to_string()]);
        assert_eq!(status, 0);
    }

    #[test]
    fn test_stat_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent").display().to_string();
        assert_eq!(MyStat.run(&["mystat".to_string(), missing]), 1);
    }
}
