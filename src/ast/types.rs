//! Parsed Command Types
//!
//! This module defines the value types the parser produces:
//! - `Command`: one argv with its redirections
//! - `Pipeline`: commands connected by `|` plus a background flag
//! - `Conditional`: an `if cond then block [else block] fi` line
//!
//! The types own their strings; ownership passes into the executor with the
//! parsed line and is released when execution returns.

use std::fmt;

// =============================================================================
// COMMANDS & PIPELINES
// =============================================================================

/// A single command after tokenization and glob expansion.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Command {
    /// Non-empty ordered argument list; `argv[0]` is the command name.
    pub argv: Vec<String>,
    /// Path for stdin redirection (`< path`).
    pub infile: Option<String>,
    /// Path for stdout redirection (`> path` or `>> path`).
    pub outfile: Option<String>,
    /// When true and `outfile` is set, open for append instead of truncate.
    pub append: bool,
}

impl Command {
    pub fn name(&self) -> &str {
        &self.argv[0]
    }

    /// True when the command carries no redirections.
    pub fn has_no_redirections(&self) -> bool {
        self.infile.is_none() && self.outfile.is_none()
    }
}

/// A pipeline: one or more commands with a single background flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pipeline {
    pub commands: Vec<Command>,
    /// Run the whole pipeline in the background (trailing `&`).
    pub background: bool,
}

impl Pipeline {
    /// Reconstruct a display string for the job table (`a | b &`).
    pub fn display_string(&self) -> String {
        let mut out = self
            .commands
            .iter()
            .map(|c| c.argv.join(" "))
            .collect::<Vec<_>>()
            .join(" | ");
        if self.background {
            out.push_str(" &");
        }
        out
    }
}

impl fmt::Display for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_string())
    }
}

// =============================================================================
// CONDITIONALS
// =============================================================================

/// An `if cond then block [else block] fi` line. The three parts are raw
/// sub-lines that the executor re-parses as pipelines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conditional {
    pub condition: String,
    pub then_branch: String,
    pub else_branch: Option<String>,
}

// =============================================================================
// PARSED LINE
// =============================================================================

/// The result of parsing one input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedLine {
    Pipeline(Pipeline),
    Conditional(Conditional),
    /// Whitespace-only input; nothing to execute.
    Empty,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_display_string() {
        let pipeline = Pipeline {
            commands: vec![
                Command { argv: vec!["echo".into(), "a".into()], ..Default::default() },
                Command { argv: vec!["wc".into(), "-c".into()], ..Default::default() },
            ],
            background: false,
        };
        assert_eq!(pipeline.display_string(), "echo a | wc -c");
    }

    #[test]
    fn test_background_pipeline_display_string() {
        let pipeline = Pipeline {
            commands: vec![Command {
                argv: vec!["sleep".into(), "30".into()],
                ..Default::default()
            }],
            background: true,
        };
        assert_eq!(pipeline.display_string(), "sleep 30 &");
    }
}
