//! mycp - copy files
//!
//! `mycp SRC DST` or `mycp SRC... DIR`. When the destination is a
//! directory, sources keep their file names inside it.

use std::fs;
use std::path::{Path, PathBuf};

use super::types::Tool;

pub struct MyCp;

impl Tool for MyCp {
    fn name(&self) -> &'static str {
        "mycp"
    }

    fn run(&self, argv: &[String]) -> i32 {
        let args = &argv[1..];
        if args.len() < 2 {
            eprintln!("mycp: usage: mycp SOURCE... DEST");
            return 1;
        }

        let dest = Path::new(args.last().unwrap());
        let sources = &args[..args.len() - 1];
        let dest_is_dir = dest.is_dir();

        if sources.len() > 1 && !dest_is_dir {
            eprintln!("mycp: target '{}' is not a directory", dest.display());
            return 1;
        }

        let mut status = 0;
        for source in sources {
            let source = Path::new(source);
            if source.is_dir() {
                eprintln!("mycp: '{}' is a directory (not copied)", source.display());
                status = 1;
                continue;
            }
            let target = resolve_target(source, dest, dest_is_dir);
            if let Err(e) = fs::copy(source, &target) {
                eprintln!(
                    "mycp: cannot copy '{}' to '{}': {}",
                    source.display(),
                    target.display(),
                    e
                );
                status = 1;
            }
        }
        status
    }
}

fn resolve_target(source: &Path, dest: &Path, dest_is_dir: bool) -> PathBuf {
    if dest_is_dir {
        match source.file_name() {
            Some(name) => dest.join(name),
            None => dest.to_path_buf(),
        }
    } else {
        dest.to_path_buf()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copy_into_directory_keeps_name() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("a.txt");
        let sub = dir.path().join("sub");
        fs::write(&src, "data").unwrap();
        fs::create_dir(&sub).unwrap();

        let status = MyCp.run(&[
            "mycp".to_string(),
            src.display().to_string(),
            sub.display().to_string(),
        ]);
        assert_eq!(status, 0);
        assert_eq!(fs::read_to_string(sub.join("a.txt")).unwrap(), "data");
    }

    #[test]
    fn test_copy_to_new_name() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("a");
        let dst = dir.path().join("b");
        fs::write(&src, "x").unwrap();

        let status = MyCp.run(&[
            "mycp".to_string(),
            src.display().to_string(),
            dst.display().to_string(),
        ]);
        assert_eq!(status, 0);
        assert_eq!(fs::read_to_string(&dst).unwrap(), "x");
    }

    #[test]
    fn test_missing_source_fails() {
        let dir = tempfile::tempdir().unwrap();
        let status = MyCp.run(&[
            "mycp".to_string(),
            dir.path().join("absent").display().to_string(),
            dir.path().join("out").display().to_string(),
        ]);
        assert_eq!(status, 1);
    }

    #[test]
    fn test_multiple_sources_require_directory_target() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a");
        let b = dir.path().join("b");
        fs::write(&a, "").unwrap();
        fs::write(&b, "").unwrap();
        let status = MyCp.run(&[
            "mycp".to_string(),
            a.display().to_string(),
            b.display().to_string(),
            dir.path().join("notadir").display().to_string(),
        ]);
        assert_eq!(status, 1);
    }
}
