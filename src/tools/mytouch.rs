//! mytouch - create files or update their modification time

use std::fs::{File, OpenOptions};
use std::time::SystemTime;

use super::types::Tool;

pub struct MyTouch;

impl Tool for MyTouch {
    fn name(&self) -> &'static str {
        "mytouch"
    }

    fn run(&self, argv: &[String]) -> i32 {
        let paths = &argv[1..];
        if paths.is_empty() {
            eprintln!("mytouch: missing file operand");
            return 1;
        }

        let mut status = 0;
        for path in paths {
            if let Err(e) = touch(path) {
                eprintln!("mytouch: cannot touch '{}': {}", path, e);
                status = 1;
            }
        }
        status
    }
}

fn touch(path: &str) -> std::io::Result<()> {
    let file: File = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;
    file.set_modified(SystemTime::now())
}
