//! mycat - concatenate files to standard output
//!
//! With no arguments, copies standard input through. `-n` numbers output
//! lines. Directories and unreadable files produce a per-file diagnostic and
//! a nonzero final status without stopping the remaining files.

use std::fs;
use std::io::{self, Read, Write};

use super::types::Tool;

pub struct MyCat;

impl Tool for MyCat {
    fn name(&self) -> &'static str {
        "mycat"
    }

    fn run(&self, argv: &[String]) -> i32 {
        let mut number_lines = false;
        let mut files = Vec::new();

        for arg in &argv[1..] {
            match arg.as_str() {
                "-n" => number_lines = true,
                _ => files.push(arg),
            }
        }

        if files.is_empty() {
            let mut buf = String::new();
            if io::stdin().read_to_string(&mut buf).is_err() {
                eprintln!("mycat: error reading standard input");
                return 1;
            }
            print_contents(&buf, number_lines, &mut 1);
            return 0;
        }

        let mut status = 0;
        let mut line_no = 1usize;
        for path in files {
            match fs::metadata(path) {
                Ok(meta) if meta.is_dir() => {
                    eprintln!("mycat: '{}': Is a directory", path);
                    status = 1;
                    continue;
                }
                Err(e) => {
                    eprintln!("mycat: '{}': {}", path, e);
                    status = 1;
                    continue;
                }
                Ok(_) => {}
            }
            match fs::read_to_string(path) {
                Ok(contents) => print_contents(&contents, number_lines, &mut line_no),
                Err(e) => {
                    eprintln!("mycat: '{}': {}", path, e);
                    status = 1;
                }
            }
        }
        status
    }
}

fn print_contents(contents: &str, number_lines: bool, line_no: &mut usize) {
    let mut out = io::stdout();
    if number_lines {
        for line in contents.lines() {
            let _ = writeln!(out, "{:6}\t{}", line_no, line);
            *line_no += 1;
        }
    } else {
        let _ = write!(out, "{}", contents);
    }
    let _ = out.flush();
}
