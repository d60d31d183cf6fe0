//! Executor
//!
//! Entry point for running one already-expanded input line: parse it, then
//! hand pipelines to the fork/pipe machinery and conditionals to the
//! condition/then/else driver. Parse errors are reported here and never
//! unwind the REPL.

pub mod conditional;
pub mod pipeline;
pub mod resolution;

use crate::ast::ParsedLine;
use crate::parser;
use crate::shell::Shell;

/// Parse and execute one line, returning the shell-level status.
pub fn execute_line(shell: &mut Shell, line: &str) -> i32 {
    match parser::parse(line) {
        Ok(ParsedLine::Empty) => 0,
        Ok(ParsedLine::Pipeline(p)) => pipeline::execute_pipeline(shell, &p),
        Ok(ParsedLine::Conditional(c)) => conditional::execute_conditional(shell, &c),
        Err(e) => {
            eprintln!("ushell: parse error: {}", e);
            1
        }
    }
}
