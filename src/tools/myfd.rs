//! myfd - parallel recursive filename search
//!
//! Searches a directory tree for entries whose name matches a pattern
//! (glob syntax, or plain substring when the pattern has no wildcards).
//! Traversal is parallelized with a small worker pool feeding from a shared
//! directory queue; the workers are local to the call and join before the
//! tool returns.
//!
//! Flags: `--hidden` includes dotfiles, `-e EXT` filters by extension,
//! `-t f|d` filters by entry type.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::{Condvar, Mutex};

use crate::glob::{is_glob_pattern, match_pattern};

use super::types::Tool;

const WORKERS: usize = 4;

pub struct MyFd;

struct SearchConfig {
    pattern: Option<String>,
    extension: Option<String>,
    type_filter: Option<char>,
    show_hidden: bool,
}

impl Tool for MyFd {
    fn name(&self) -> &'static str {
        "myfd"
    }

    fn run(&self, argv: &[String]) -> i32 {
        let mut config = SearchConfig {
            pattern: None,
            extension: None,
            type_filter: None,
            show_hidden: false,
        };
        let mut root: Option<String> = None;

        let mut args = argv[1..].iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--hidden" => config.show_hidden = true,
                "-e" => match args.next() {
                    Some(ext) => config.extension = Some(ext.trim_start_matches('.').to_string()),
                    None => {
                        eprintln!("myfd: -e requires an extension");
                        return 1;
                    }
                },
                "-t" => match args.next().map(String::as_str) {
                    Some("f") => config.type_filter = Some('f'),
                    Some("d") => config.type_filter = Some('d'),
                    _ => {
                        eprintln!("myfd: -t requires 'f' or 'd'");
                        return 1;
                    }
                },
                _ if config.pattern.is_none() => config.pattern = Some(arg.clone()),
                _ if root.is_none() => root = Some(arg.clone()),
                _ => {
                    eprintln!("myfd: too many arguments");
                    return 1;
                }
            }
        }

        let root = PathBuf::from(root.unwrap_or_else(|| ".".to_string()));
        if !root.is_dir() {
            eprintln!("myfd: '{}': not a directory", root.display());
            return 1;
        }

        let mut results = search(&root, &config);
        results.sort();
        for path in results {
            println!("{}", path);
        }
        0
    }
}

// =============================================================================
// Parallel traversal
// =============================================================================

struct QueueState {
    dirs: VecDeque<PathBuf>,
    active: usize,
}

/// Directory work queue shared by the worker pool. A worker counts as
/// `active` while it scans a directory, so an empty queue with no active
/// workers means the traversal is complete.
struct WorkQueue {
    state: Mutex<QueueState>,
    cond: Condvar,
}

impl WorkQueue {
    fn new(root: PathBuf) -> Self {
        let mut dirs = VecDeque::new();
        dirs.push_back(root);
        Self {
            state: Mutex::new(QueueState { dirs, active: 0 }),
            cond: Condvar::new(),
        }
    }

    fn push(&self, dir: PathBuf) {
        let mut state = self.state.lock().unwrap();
        state.dirs.push_back(dir);
        self.cond.notify_one();
    }

    /// Take the next directory, blocking while other workers may still add
    /// more. Returns `None` once the queue is drained and idle.
    fn pop(&self) -> Option<PathBuf> {
        let mut state = self.state.lock().unwrap();
        loop {
            if let Some(dir) = state.dirs.pop_front() {
                state.active += 1;
                return Some(dir);
            }
            if state.active == 0 {
                return None;
            }
            state = self.cond.wait(state).unwrap();
        }
    }

    fn finish_one(&self) {
        let mut state = self.state.lock().unwrap();
        state.active -= 1;
        if state.active == 0 && state.dirs.is_empty() {
            self.cond.notify_all();
        }
    }
}

fn search(root: &Path, config: &SearchConfig) -> Vec<String> {
    let queue = WorkQueue::new(root.to_path_buf());
    let results: Mutex<Vec<String>> = Mutex::new(Vec::new());

    std::thread::scope(|scope| {
        for _ in 0..WORKERS {
            scope.spawn(|| {
                while let Some(dir) = queue.pop() {
                    scan_directory(&dir, config, &queue, &results);
                    queue.finish_one();
                }
            });
        }
    });

    results.into_inner().unwrap()
}

fn scan_directory(
    dir: &Path,
    config: &SearchConfig,
    queue: &WorkQueue,
    results: &Mutex<Vec<String>>,
) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };

    for entry in entries.filter_map(|e| e.ok()) {
        let Ok(name) = entry.file_name().into_string() else {
            continue;
        };
        if !config.show_hidden && name.starts_with('.') {
            continue;
        }

        let path = entry.path();
        let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);

        if matches(&name, &path, is_dir, config) {
            results.lock().unwrap().push(path.display().to_string());
        }
        if is_dir {
            queue.push(path);
        }
    }
}

fn matches(name: &str, path: &Path, is_dir: bool, config: &SearchConfig) -> bool {
    match config.type_filter {
        Some('f') if is_dir => return false,
        Some('d') if !is_dir => return false,
        _ => {}
    }

    if let Some(ext) = &config.extension {
        let entry_ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        if entry_ext != ext {
            return false;
        }
    }

    match &config.pattern {
        None => true,
        Some(p) if is_glob_pattern(p) => match_pattern(p, name),
        Some(p) => name.contains(p.as_str()),
    }
}
