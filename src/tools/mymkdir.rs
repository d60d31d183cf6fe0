//! mymkdir - create directories
//!
//! `-p` creates missing parents and tolerates existing directories.

use std::fs;

use super::types::Tool;

pub struct MyMkdir;

impl Tool for MyMkdir {
    fn name(&self) -> &'static str {
        "mymkdir"
    }

    fn run(&self, argv: &[String]) -> i32 {
        let mut parents = false;
        let mut paths = Vec::new();

        for arg in &argv[1..] {
            match arg.as_str() {
                "-p" => parents = true,
                _ => paths.push(arg),
            }
        }

        if paths.is_empty() {
            eprintln!("mymkdir: missing operand");
            return 1;
        }

        let mut status = 0;
        for path in paths {
            let result = if parents {
                fs::create_dir_all(path)
            } else {
                fs::create_dir(path)
            };
            if let Err(e) = result {
                eprintln!("mymkdir: cannot create directory '{}': {}", path, e);
                status = 1;
            }
        }
        status
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("new");
        let status = MyMkdir.run(&["mymkdir".to_string(), target.display().to_string()]);
        assert_eq!(status, 0);
        assert!(target.is_dir());
    }

    #[test]
    fn test_nested_requires_parents_flag() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a/b/c");
        assert_eq!(
            MyMkdir.run(&["mymkdir".to_string(), nested.display().to_string()]),
            1
        );
        assert_eq!(
            MyMkdir.run(&[
                "mymkdir".to_string(),
                "-p".to_string(),
                nested.display().to_string()
            ]),
            0
        );
        assert!(nested.is_dir());
    }

    #[test]
    fn test_existing_directory_fails_without_p() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().display().to_string();
        assert_eq!(MyMkdir.run(&["mymkdir".to_string(), path.clone()]), 1);
        assert_eq!(
            MyMkdir.run(&["mymkdir".to_string(), "-p".to_string(), path]),
            0
        );
    }
}
