// src/tools/types.rs

/// A bundled file utility linked into the shell binary.
///
/// Tools are ordinary argv-in / status-out programs: they read their
/// standard input and write their standard output directly, so they behave
/// the same whether they run inline in the shell (single-command fast path)
/// or inside a forked pipeline child.
pub trait Tool: Send + Sync {
    fn name(&self) -> &'static str;

    /// Execute with the full argv (`argv[0]` is the tool name). Returns the
    /// exit status.
    fn run(&self, argv: &[String]) -> i32;
}
