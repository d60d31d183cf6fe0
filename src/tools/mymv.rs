//! mymv - move or rename files
//!
//! `mymv SRC DST` or `mymv SRC... DIR`. Rename first; if the rename fails
//! because the destination is on another filesystem, fall back to
//! copy-then-remove.

use std::fs;
use std::path::{Path, PathBuf};

use super::types::Tool;

pub struct MyMv;

impl Tool for MyMv {
    fn name(&self) -> &'static str {
        "mymv"
    }

    fn run(&self, argv: &[String]) -> i32 {
        let args = &argv[1..];
        if args.len() < 2 {
            eprintln!("mymv: usage: mymv SOURCE... DEST");
            return 1;
        }

        let dest = Path::new(args.last().unwrap());
        let sources = &args[..args.len() - 1];
        let dest_is_dir = dest.is_dir();

        if sources.len() > 1 && !dest_is_dir {
            eprintln!("mymv: target '{}' is not a directory", dest.display());
            return 1;
        }

        let mut status = 0;
        for source in sources {
            let source = Path::new(source);
            let target = if dest_is_dir {
                match source.file_name() {
                    Some(name) => dest.join(name),
                    None => dest.to_path_buf(),
                }
            } else {
                dest.to_path_buf()
            };
            if let Err(e) = move_path(source, &target) {
                eprintln!(
                    "mymv: cannot move '{}' to '{}': {}",
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

fn move_path(source: &Path, target: &PathBuf) -> std::io::Result<()> {
    match fs::rename(source, target) {
        Ok(()) => Ok(()),
        Err(e) if e.raw_os_error() == Some(libc::EXDEV) && source.is_file() => {
            fs::copy(source, target)?;
            fs::remove_file(source)
        }
        Err(e) => Err(e),
    }
}
