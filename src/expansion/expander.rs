//! Variable Expansion
//!
//! Rewrites a text line, substituting:
//! - `$NAME` and `${NAME}` with the variable's value (empty when absent)
//! - `$((expr))` with the evaluated arithmetic result
//!
//! Substitution is purely textual; the result is re-tokenized by the parser,
//! and quoting is the parser's concern, not this module's.

use crate::environment::Environment;

use super::arithmetic;

/// Expand all `$` forms in `input` against `env`.
pub fn expand(input: &str, env: &Environment) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len());
    let mut i = 0;

    while i < chars.len() {
        if chars[i] != '$' {
            out.push(chars[i]);
            i += 1;
            continue;
        }
        i += 1; // consume $

        // $((expr)) arithmetic
        if chars.get(i) == Some(&'(') && chars.get(i + 1) == Some(&'(') {
            i += 2;
            let (expr, next) = scan_arithmetic_body(&chars, i);
            out.push_str(&arithmetic::eval(&expr, env).to_string());
            i = next;
            continue;
        }

        // ${NAME} or $NAME
        let braced = chars.get(i) == Some(&'{');
        if braced {
            i += 1;
        }

        let start = i;
        if chars
            .get(i)
            .is_some_and(|c| c.is_ascii_alphabetic() || *c == '_')
        {
            i += 1;
            while chars
                .get(i)
                .is_some_and(|c| c.is_ascii_alphanumeric() || *c == '_')
            {
                i += 1;
            }
        }

        if start == i {
            // Bare $ (or ${ with no name) is literal
            out.push('$');
            if braced {
                out.push('{');
            }
            continue;
        }

        let name: String = chars[start..i].iter().collect();
        if braced && chars.get(i) == Some(&'}') {
            i += 1;
        }

        if let Some(value) = env.get(&name) {
            out.push_str(&value);
        }
        // absent names expand to the empty string
    }

    out
}

/// Collect the body of `$((...))` starting at `from` (just past the second
/// `(`). Tracks nested parentheses inside the expression; an unterminated
/// body runs to end of input. Returns the body and the index past `))`.
fn scan_arithmetic_body(chars: &[char], from: usize) -> (String, usize) {
    let mut depth = 0usize;
    let mut body = String::new();
    let mut i = from;

    while i < chars.len() {
        if chars[i] == ')' && depth == 0 && chars.get(i + 1) == Some(&')') {
            return (body, i + 2);
        }
        match chars[i] {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            _ => {}
        }
        body.push(chars[i]);
        i += 1;
    }

    (body, i)
}
