//! myrm - remove files and directories
//!
//! `-r` removes directories recursively; `-f` suppresses missing-file
//! errors.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use super::types::Tool;

pub struct MyRm;

impl Tool for MyRm {
    fn name(&self) -> &'static str {
        "myrm"
    }

    fn run(&self, argv: &[String]) -> i32 {
        let mut recursive = false;
        let mut force = false;
        let mut paths = Vec::new();

        for arg in &argv[1..] {
            if let Some(flags) = arg.strip_prefix('-') {
                for flag in flags.chars() {
                    match flag {
                        'r' => recursive = true,
                        'f' => force = true,
                        other => {
                            eprintln!("myrm: invalid option -- '{}'", other);
                            return 1;
                        }
                    }
                }
            } else {
                paths.push(arg);
            }
        }

        if paths.is_empty() {
            eprintln!("myrm: missing operand");
            return 1;
        }

        let mut status = 0;
        for path in paths {
            if let Err(e) = remove(Path::new(path), recursive) {
                if force && e.kind() == ErrorKind::NotFound {
                    continue;
                }
                eprintln!("myrm: cannot remove '{}': {}", path, e);
                status = 1;
            }
        }
        status
    }
}

fn remove(path: &Path, recursive: bool) -> std::io::Result<()> {
    let meta = fs::symlink_metadata(path)?;
    if meta.is_dir() {
        if !recursive {
            return Err(std::io::Error::new(
                ErrorKind::Other,
                "Is a directory (use -r)",
            ));
        }
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remove_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("f");
        fs::write(&file, "").unwrap();
        let status = MyRm.run(&["myrm".to_string(), file.display().to_string()]);
        assert_eq!(status, 0);
        assert!(!file.exists());
    }

    #[test]
    fn test_directory_needs_recursive_flag() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join("sub");
        fs::create_dir(&sub).unwrap();
        assert_eq!(MyRm.run(&["myrm".to_string(), sub.display().to_string()]), 1);
        assert!(sub.exists());

        let status = MyRm.run(&[
            "myrm".to_string(),
            "-r".to_string(),
            sub.display().to_string(),
        ]);
        assert_eq!(status, 0);
        assert!(!sub.exists());
    }

    #[test]
    fn test_force_ignores_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent").display().to_string();
        assert_eq!(MyRm.run(&["myrm".to_string(), missing.clone()]), 1);
        assert_eq!(
            MyRm.run(&["myrm".to_string(), "-f".to_string(), missing]),
            0
        );
    }
}
