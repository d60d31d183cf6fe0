//! Line Editor
//!
//! Raw-mode terminal input with cursor motion, history navigation, and tab
//! completion:
//! - printable bytes insert at the cursor; Backspace deletes before it
//! - Enter submits; Ctrl-D on an empty buffer is EOF (ignored otherwise)
//! - Ctrl-C emits `^C` and returns an empty line
//! - Up/Down walk history, Left/Right move the cursor (clamped)
//! - Tab invokes completion: one candidate replaces the input, several are
//!   listed below the prompt (20 visible, then "... and N more")
//!
//! Raw mode is entered through an RAII guard so the saved terminal settings
//! are restored on every return path, including errors. After any change the
//! editor moves to the start row of the edit, clears to end of screen,
//! rewrites prompt + buffer, and repositions the cursor with row/column math
//! so wrapped lines redraw correctly. When stdin is not a terminal the
//! editor degrades to plain line-buffered reads.

use std::io::{self, BufRead, IsTerminal, Write};

use crossterm::{
    cursor::{MoveToColumn, MoveUp},
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    queue,
    terminal::{self, Clear, ClearType},
};

use crate::environment::Environment;
use crate::history::History;

use super::completion;

/// Completion candidates shown before the menu truncates.
const MENU_VISIBLE: usize = 20;

enum KeyAction {
    Continue,
    Submit(String),
    Eof,
}

/// RAII guard: enables raw mode on construction and restores the previous
/// terminal settings on drop, panics included.
struct RawModeGuard;

impl RawModeGuard {
    fn enter() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(RawModeGuard)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

pub struct LineEditor {
    buffer: Vec<char>,
    cursor: usize,
    /// In-progress line saved when history navigation begins.
    saved_line: String,
    /// prompt + buffer length at the last draw, for wrap-aware clearing.
    last_total: usize,
    /// Row (relative to the start of the edit) the cursor was left on.
    cursor_row: usize,
}

impl LineEditor {
    pub fn new() -> Self {
        Self {
            buffer: Vec::new(),
            cursor: 0,
            saved_line: String::new(),
            last_total: 0,
            cursor_row: 0,
        }
    }

    /// Read one complete input line.
    ///
    /// Returns `Ok(None)` on EOF at an empty line and `Ok(Some(""))` after
    /// Ctrl-C; otherwise the submitted buffer.
    pub fn read_line(
        &mut self,
        prompt: &str,
        history: &mut History,
        env: &Environment,
    ) -> io::Result<Option<String>> {
        if !io::stdin().is_terminal() {
            return self.read_line_fallback(prompt);
        }

        self.buffer.clear();
        self.cursor = 0;
        self.saved_line.clear();
        history.reset_cursor();

        let _guard = RawModeGuard::enter()?;

        let mut out = io::stdout();
        write!(out, "{}", prompt)?;
        out.flush()?;
        let prompt_len = prompt.chars().count();
        self.last_total = prompt_len;
        self.cursor_row = prompt_len / terminal_width();

        loop {
            let key = match event::read() {
                Ok(Event::Key(key)) => key,
                Ok(_) => continue, // resize, paste, mouse
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            if key.kind != KeyEventKind::Press && key.kind != KeyEventKind::Repeat {
                continue;
            }

            match self.handle_key(key, prompt, history, env)? {
                KeyAction::Continue => {}
                KeyAction::Submit(line) => return Ok(Some(line)),
                KeyAction::Eof => return Ok(None),
            }
        }
    }

    /// Non-terminal path: emit the prompt and read one buffered line.
    fn read_line_fallback(&mut self, prompt: &str) -> io::Result<Option<String>> {
        let mut out = io::stdout();
        write!(out, "{}", prompt)?;
        out.flush()?;

        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line)? {
            0 => Ok(None),
            _ => {
                while line.ends_with('\n') || line.ends_with('\r') {
                    line.pop();
                }
                Ok(Some(line))
            }
        }
    }

    fn handle_key(
        &mut self,
        key: KeyEvent,
        prompt: &str,
        history: &mut History,
        env: &Environment,
    ) -> io::Result<KeyAction> {
        use KeyCode::*;

        match (key.code, key.modifiers) {
            (Enter, _) => {
                // raw mode suppresses the terminal's own newline
                crlf()?;
                return Ok(KeyAction::Submit(self.buffer.iter().collect()));
            }

            (Char('d'), KeyModifiers::CONTROL) => {
                if self.buffer.is_empty() {
                    crlf()?;
                    return Ok(KeyAction::Eof);
                }
                // Ctrl-D with a non-empty buffer is ignored
            }

            (Char('c'), KeyModifiers::CONTROL) => {
                let mut out = io::stdout();
                write!(out, "^C\r\n")?;
                out.flush()?;
                return Ok(KeyAction::Submit(String::new()));
            }

            (Tab, _) => {
                if self.cursor == self.buffer.len() {
                    self.complete(prompt, env)?;
                }
            }

            (Up, _) => {
                if !history.is_navigating() {
                    self.saved_line = self.buffer.iter().collect();
                }
                if let Some(entry) = history.prev() {
                    self.replace_buffer(entry.to_string());
                    self.redraw(prompt)?;
                }
            }

            (Down, _) => {
                if history.is_navigating() {
                    let next = history.next().map(str::to_string);
                    let restored = next.unwrap_or_else(|| self.saved_line.clone());
                    self.replace_buffer(restored);
                    self.redraw(prompt)?;
                }
            }

            (Right, _) => {
                if self.cursor < self.buffer.len() {
                    self.cursor += 1;
                    self.redraw(prompt)?;
                }
            }

            (Left, _) => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                    self.redraw(prompt)?;
                }
            }

            (Backspace, _) => {
                if self.backspace() {
                    self.redraw(prompt)?;
                }
            }

            (Char(c), KeyModifiers::NONE) | (Char(c), KeyModifiers::SHIFT) => {
                self.insert_char(c);
                self.redraw(prompt)?;
            }

            _ => {}
        }

        Ok(KeyAction::Continue)
    }

    // =========================================================================
    // Buffer mutations
    // =========================================================================

    fn insert_char(&mut self, c: char) {
        self.buffer.insert(self.cursor, c);
        self.cursor += 1;
    }

    fn backspace(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        self.buffer.remove(self.cursor);
        true
    }

    fn replace_buffer(&mut self, text: String) {
        self.buffer = text.chars().collect();
        self.cursor = self.buffer.len();
    }

    // =========================================================================
    // Completion
    // =========================================================================

    fn complete(&mut self, prompt: &str, env: &Environment) -> io::Result<()> {
        let input: String = self.buffer.iter().collect();
        let candidates = completion::complete(&input, env);

        match candidates.len() {
            0 => Ok(()),
            1 => {
                self.replace_buffer(candidates.into_iter().next().unwrap());
                self.redraw(prompt)
            }
            _ => {
                self.show_menu(&candidates)?;
                self.redraw(prompt)
            }
        }
    }

    /// Print the candidate list below the prompt, capped at `MENU_VISIBLE`.
    fn show_menu(&mut self, candidates: &[String]) -> io::Result<()> {
        let mut out = io::stdout();
        write!(out, "\r\n")?;
        for candidate in candidates.iter().take(MENU_VISIBLE) {
            write!(out, "{}  ", candidate)?;
        }
        if candidates.len() > MENU_VISIBLE {
            write!(out, "\r\n... and {} more", candidates.len() - MENU_VISIBLE)?;
        }
        write!(out, "\r\n")?;
        out.flush()?;

        // the edit restarts on a fresh row
        self.last_total = 0;
        self.cursor_row = 0;
        Ok(())
    }

    // =========================================================================
    // Redraw
    // =========================================================================

    /// Move to the start row of the edit, clear to end of screen, rewrite
    /// prompt + buffer, and position the cursor by dividing
    /// `prompt_len + cursor` by the terminal width.
    fn redraw(&mut self, prompt: &str) -> io::Result<()> {
        let width = terminal_width();
        let prompt_len = prompt.chars().count();
        let new_total = prompt_len + self.buffer.len();
        let old_rows = self.last_total / width;
        let new_rows = new_total / width;

        let mut out = io::stdout();

        // Growing into a new row at the bottom of the screen needs a scroll
        // before the cursor math below holds.
        if new_rows > old_rows {
            write!(out, "\n")?;
            queue!(out, MoveUp(1))?;
        }

        if self.cursor_row > 0 {
            queue!(out, MoveUp(self.cursor_row as u16))?;
        }
        queue!(out, MoveToColumn(0), Clear(ClearType::FromCursorDown))?;

        let line: String = self.buffer.iter().collect();
        write!(out, "{}{}", prompt, line)?;

        let target = prompt_len + self.cursor;
        let target_row = target / width;
        let target_col = target % width;
        let rows_back = new_rows - target_row;
        if rows_back > 0 {
            queue!(out, MoveUp(rows_back as u16))?;
        }
        queue!(out, MoveToColumn(target_col as u16))?;
        out.flush()?;

        self.last_total = new_total;
        self.cursor_row = target_row;
        Ok(())
    }
}

impl Default for LineEditor {
    fn default() -> Self {
        Self::new()
    }
}

fn terminal_width() -> usize {
    terminal::size()
        .map(|(w, _)| w as usize)
        .unwrap_or(80)
        .max(1)
}

fn crlf() -> io::Result<()> {
    let mut out = io::stdout();
    write!(out, "\r\n")?;
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer_of(editor: &LineEditor) -> String {
        editor.buffer.iter().collect()
    }

    #[test]
    fn test_insert_advances_cursor() {
        let mut e = LineEditor::new();
        e.insert_char('h');
        e.insert_char('i');
        assert_eq!(buffer_of(&e), "hi");
        assert_eq!(e.cursor, 2);
    }

    #[test]
    fn test_insert_at_cursor_position() {
        let mut e = LineEditor::new();
        e.replace_buffer("ac".into());
        e.cursor = 1;
        e.insert_char('b');
        assert_eq!(buffer_of(&e), "abc");
        assert_eq!(e.cursor, 2);
    }

    #[test]
    fn test_backspace_deletes_before_cursor() {
        let mut e = LineEditor::new();
        e.replace_buffer("abc".into());
        e.cursor = 2;
        assert!(e.backspace());
        assert_eq!(buffer_of(&e), "ac");
        assert_eq!(e.cursor, 1);
    }

    #[test]
    fn test_backspace_at_start_is_noop() {
        let mut e = LineEditor::new();
        e.replace_buffer("abc".into());
        e.cursor = 0;
        assert!(!e.backspace());
        assert_eq!(buffer_of(&e), "abc");
    }

    #[test]
    fn test_replace_buffer_moves_cursor_to_end() {
        let mut e = LineEditor::new();
        e.replace_buffer("echo hello".into());
        assert_eq!(e.cursor, 10);
    }
}
