//! myrmdir - remove empty directories

use std::fs;

use super::types::Tool;

pub struct MyRmdir;

impl Tool for MyRmdir {
    fn name(&self) -> &'static str {
        "myrmdir"
    }

    fn run(&self, argv: &[String]) -> i32 {
        let paths = &argv[1..];
        if paths.is_empty() {
            eprintln!("myrmdir: missing operand");
            return 1;
        }

        let mut status = 0;
        for path in paths {
            if let Err(e) = fs::remove_dir(path) {
                eprintln!("myrmdir: failed to remove '{}': {}", path, e);
                status = 1;
            }
        }
        status
    }
}
