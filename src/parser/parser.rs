//! Command-Line Parser
//!
//! Two deliberately simple layers:
//!
//! - **Conditional layer**: a line whose first token is `if` is split into
//!   condition / then-block / optional else-block raw sub-lines. Nested
//!   conditionals are a parse error, as is backgrounding a conditional.
//! - **Pipeline layer**: a trailing `&` sets the background flag, the line is
//!   split on top-level `|`, each segment is scanned for `<` / `>` / `>>`
//!   redirections (later ones override earlier ones for the same stream),
//!   and the remaining text is tokenized with simple quote handling.
//!
//! After tokenization, glob expansion replaces each token with zero or more
//! expanded tokens.

use thiserror::Error;

use crate::ast::{Command, Conditional, ParsedLine, Pipeline};
use crate::glob;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("expected 'then'")]
    MissingThen,
    #[error("expected 'fi'")]
    MissingFi,
    #[error("nested conditionals are not supported")]
    NestedConditional,
    #[error("conditionals cannot run in the background")]
    BackgroundConditional,
    #[error("empty command between pipes")]
    EmptyPipelineSegment,
    #[error("missing redirection target after '{0}'")]
    MissingRedirectTarget(&'static str),
    #[error("missing command")]
    EmptyCommand,
}

/// Parse one input line into a pipeline or a conditional.
pub fn parse(line: &str) -> Result<ParsedLine, ParseError> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(ParsedLine::Empty);
    }

    if let Some(conditional) = parse_conditional(trimmed)? {
        return Ok(ParsedLine::Conditional(conditional));
    }

    Ok(ParsedLine::Pipeline(parse_pipeline(trimmed)?))
}

// =============================================================================
// CONDITIONAL LAYER
// =============================================================================

/// Recognize `if cond then block [else block] fi`. Returns `Ok(None)` when
/// the line is not a conditional at all.
fn parse_conditional(line: &str) -> Result<Option<Conditional>, ParseError> {
    let rest = match line.strip_prefix("if") {
        Some(rest) if rest.is_empty() || rest.starts_with(char::is_whitespace) => rest,
        _ => return Ok(None),
    };

    // `&` has no defined meaning on a conditional line; reject it outright.
    if strip_background(rest).1 {
        return Err(ParseError::BackgroundConditional);
    }

    let then_pos = find_keyword(rest, "then").ok_or(ParseError::MissingThen)?;
    let condition = rest[..then_pos].trim();
    let after_then = &rest[then_pos + "then".len()..];

    let fi_pos = find_keyword(after_then, "fi").ok_or(ParseError::MissingFi)?;
    let else_pos = find_keyword(after_then, "else").filter(|&p| p < fi_pos);

    let (then_branch, else_branch) = match else_pos {
        Some(else_pos) => {
            let then_branch = after_then[..else_pos].trim();
            let else_branch = after_then[else_pos + "else".len()..fi_pos].trim();
            (then_branch, (!else_branch.is_empty()).then(|| else_branch.to_string()))
        }
        None => (after_then[..fi_pos].trim(), None),
    };

    if condition.is_empty() || then_branch.is_empty() {
        return Err(ParseError::EmptyCommand);
    }

    // The core grammar has no nesting; an inner `if` anywhere is an error.
    for part in [Some(condition), Some(then_branch), else_branch.as_deref()]
        .into_iter()
        .flatten()
    {
        if part == "if" || part.starts_with("if ") || find_keyword(part, "if").is_some() {
            return Err(ParseError::NestedConditional);
        }
    }

    Ok(Some(Conditional {
        condition: condition.to_string(),
        then_branch: then_branch.to_string(),
        else_branch,
    }))
}

/// Find a keyword as a standalone word (whitespace or line boundary on both
/// sides). Returns the byte offset of its first character.
fn find_keyword(haystack: &str, keyword: &str) -> Option<usize> {
    let bytes = haystack.as_bytes();
    let klen = keyword.len();
    let mut start = 0;

    while start + klen <= bytes.len() {
        if let Some(pos) = haystack[start..].find(keyword) {
            let at = start + pos;
            let before_ok = at == 0 || bytes[at - 1].is_ascii_whitespace();
            let after_ok = at + klen == bytes.len() || bytes[at + klen].is_ascii_whitespace();
            if before_ok && after_ok {
                return Some(at);
            }
            start = at + 1;
        } else {
            return None;
        }
    }
    None
}

// =============================================================================
// PIPELINE LAYER
// =============================================================================

fn parse_pipeline(line: &str) -> Result<Pipeline, ParseError> {
    let (line, background) = strip_background(line);

    let mut commands = Vec::new();
    for segment in split_pipes(line) {
        let segment = segment.trim();
        if segment.is_empty() {
            return Err(ParseError::EmptyPipelineSegment);
        }
        commands.push(parse_command(segment)?);
    }

    Ok(Pipeline { commands, background })
}

/// Strip a trailing whitespace-separated `&` and report whether one was
/// present.
fn strip_background(line: &str) -> (&str, bool) {
    let trimmed = line.trim_end();
    if let Some(rest) = trimmed.strip_suffix('&') {
        if rest.is_empty() || rest.ends_with(char::is_whitespace) {
            return (rest.trim_end(), true);
        }
    }
    (trimmed, false)
}

/// Split on `|` outside quoted runs.
fn split_pipes(line: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;

    for c in line.chars() {
        match quote {
            Some(q) => {
                current.push(c);
                if c == q {
                    quote = None;
                }
            }
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                current.push(c);
            }
            None if c == '|' => {
                segments.push(std::mem::take(&mut current));
            }
            None => current.push(c),
        }
    }
    segments.push(current);
    segments
}

/// Parse one pipe segment: extract redirections, tokenize the rest, expand
/// globs.
fn parse_command(segment: &str) -> Result<Command, ParseError> {
    let chars: Vec<char> = segment.chars().collect();
    let mut command_text = String::new();
    let mut infile = None;
    let mut outfile = None;
    let mut append = false;
    let mut quote: Option<char> = None;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match quote {
            Some(q) => {
                command_text.push(c);
                if c == q {
                    quote = None;
                }
                i += 1;
            }
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                command_text.push(c);
                i += 1;
            }
            None if c == '<' => {
                i += 1;
                let target = scan_redirect_target(&chars, &mut i);
                if target.is_empty() {
                    return Err(ParseError::MissingRedirectTarget("<"));
                }
                // a later `<` overrides an earlier one
                infile = Some(target);
            }
            None if c == '>' => {
                let op = if chars.get(i + 1) == Some(&'>') {
                    i += 2;
                    append = true;
                    ">>"
                } else {
                    i += 1;
                    append = false;
                    ">"
                };
                let target = scan_redirect_target(&chars, &mut i);
                if target.is_empty() {
                    return Err(ParseError::MissingRedirectTarget(op));
                }
                outfile = Some(target);
            }
            None => {
                command_text.push(c);
                i += 1;
            }
        }
    }

    let tokens = tokenize(&command_text);
    if tokens.is_empty() {
        return Err(ParseError::EmptyCommand);
    }

    Ok(Command {
        argv: glob::expand_argv(tokens),
        infile,
        outfile,
        append,
    })
}

/// Read the path following a redirection operator: skip whitespace, then
/// collect up to the next whitespace or redirection character.
fn scan_redirect_target(chars: &[char], i: &mut usize) -> String {
    while *i < chars.len() && chars[*i].is_whitespace() {
        *i += 1;
    }
    let mut target = String::new();
    while *i < chars.len() {
        let c = chars[*i];
        if c.is_whitespace() || c == '<' || c == '>' {
            break;
        }
        target.push(c);
        *i += 1;
    }
    target
}

/// Split text into whitespace-separated tokens with simple quote handling:
/// a `"` or `'` starts a quoted run ending at the matching quote; the quotes
/// themselves are consumed; an unterminated run extends to end of input.
pub fn tokenize(text: &str) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c == '"' || c == '\'' {
            in_token = true;
            i += 1;
            while i < chars.len() && chars[i] != c {
                current.push(chars[i]);
                i += 1;
            }
            if i < chars.len() {
                i += 1; // closing quote
            }
        } else if c.is_whitespace() {
            if in_token {
                tokens.push(std::mem::take(&mut current));
                in_token = false;
            }
            i += 1;
        } else {
            in_token = true;
            current.push(c);
            i += 1;
        }
    }
    if in_token {
        tokens.push(current);
    }

    tokens
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse_single(line: &str) -> Command {
        match parse(line).unwrap() {
            ParsedLine::Pipeline(p) => {
                assert_eq!(p.commands.len(), 1);
                p.commands.into_iter().next().unwrap()
            }
            other => panic!("expected pipeline, got {:?}", other),
        }
    }

    #[test]
    fn test_simple_command() {
        let cmd = parse_single("echo hello world");
        assert_eq!(cmd.argv, vec!["echo", "hello", "world"]);
        assert!(cmd.has_no_redirections());
    }

    #[test]
    fn test_empty_line() {
        assert_eq!(parse("   ").unwrap(), ParsedLine::Empty);
    }

    #[test]
    fn test_double_quotes_preserve_spaces() {
        let cmd = parse_single("echo \"hello   world\"");
        assert_eq!(cmd.argv, vec!["echo", "hello   world"]);
    }

    #[test]
    fn test_single_quotes() {
        let cmd = parse_single("echo 'a b' c");
        assert_eq!(cmd.argv, vec!["echo", "a b", "c"]);
    }

    #[test]
    fn test_unterminated_quote_runs_to_end() {
        let cmd = parse_single("echo \"unterminated run");
        assert_eq!(cmd.argv, vec!["echo", "unterminated run"]);
    }

    #[test]
    fn test_quote_glued_to_word() {
        let cmd = parse_single("echo pre\"fix ed\"post");
        assert_eq!(cmd.argv, vec!["echo", "prefix edpost"]);
    }

    #[test]
    fn test_output_redirection() {
        let cmd = parse_single("echo hi > out.txt");
        assert_eq!(cmd.argv, vec!["echo", "hi"]);
        assert_eq!(cmd.outfile.as_deref(), Some("out.txt"));
        assert!(!cmd.append);
    }

    #[test]
    fn test_append_redirection() {
        let cmd = parse_single("echo hi >> log.txt");
        assert_eq!(cmd.outfile.as_deref(), Some("log.txt"));
        assert!(cmd.append);
    }

    #[test]
    fn test_input_redirection() {
        let cmd = parse_single("wc -l < data.txt");
        assert_eq!(cmd.argv, vec!["wc", "-l"]);
        assert_eq!(cmd.infile.as_deref(), Some("data.txt"));
    }

    #[test]
    fn test_redirection_without_spaces() {
        let cmd = parse_single("wc<in>out");
        assert_eq!(cmd.argv, vec!["wc"]);
        assert_eq!(cmd.infile.as_deref(), Some("in"));
        assert_eq!(cmd.outfile.as_deref(), Some("out"));
    }

    #[test]
    fn test_later_redirection_overrides_earlier() {
        let cmd = parse_single("echo x > first > second");
        assert_eq!(cmd.outfile.as_deref(), Some("second"));

        let cmd = parse_single("echo x >> first > second");
        assert_eq!(cmd.outfile.as_deref(), Some("second"));
        assert!(!cmd.append);
    }

    #[test]
    fn test_missing_redirect_target() {
        assert_eq!(
            parse("echo hi >"),
            Err(ParseError::MissingRedirectTarget(">"))
        );
        assert_eq!(
            parse("cat <"),
            Err(ParseError::MissingRedirectTarget("<"))
        );
    }

    #[test]
    fn test_quoted_operators_are_literal() {
        let cmd = parse_single("echo \">\" '|'");
        assert_eq!(cmd.argv, vec!["echo", ">", "|"]);
        assert!(cmd.has_no_redirections());
    }

    #[test]
    fn test_pipeline_split() {
        let parsed = parse("echo a | cat | wc -c").unwrap();
        let ParsedLine::Pipeline(p) = parsed else {
            panic!("expected pipeline")
        };
        assert_eq!(p.commands.len(), 3);
        assert_eq!(p.commands[0].argv, vec!["echo", "a"]);
        assert_eq!(p.commands[1].argv, vec!["cat"]);
        assert_eq!(p.commands[2].argv, vec!["wc", "-c"]);
        assert!(!p.background);
    }

    #[test]
    fn test_pipe_inside_quotes_not_split() {
        let cmd = parse_single("echo 'a | b'");
        assert_eq!(cmd.argv, vec!["echo", "a | b"]);
    }

    #[test]
    fn test_empty_pipe_segment_rejected() {
        assert_eq!(parse("a | | b"), Err(ParseError::EmptyPipelineSegment));
        assert_eq!(parse("| a"), Err(ParseError::EmptyPipelineSegment));
        assert_eq!(parse("a |"), Err(ParseError::EmptyPipelineSegment));
    }

    #[test]
    fn test_trailing_ampersand_sets_background() {
        let ParsedLine::Pipeline(p) = parse("sleep 30 &").unwrap() else {
            panic!("expected pipeline")
        };
        assert!(p.background);
        assert_eq!(p.commands[0].argv, vec!["sleep", "30"]);
    }

    #[test]
    fn test_glued_ampersand_stays_literal() {
        let ParsedLine::Pipeline(p) = parse("echo a&").unwrap() else {
            panic!("expected pipeline")
        };
        assert!(!p.background);
        assert_eq!(p.commands[0].argv, vec!["echo", "a&"]);
    }

    #[test]
    fn test_conditional_with_else() {
        let parsed = parse("if echo x then echo yes else echo no fi").unwrap();
        assert_eq!(
            parsed,
            ParsedLine::Conditional(Conditional {
                condition: "echo x".into(),
                then_branch: "echo yes".into(),
                else_branch: Some("echo no".into()),
            })
        );
    }

    #[test]
    fn test_conditional_without_else() {
        let parsed = parse("if true then echo yes fi").unwrap();
        assert_eq!(
            parsed,
            ParsedLine::Conditional(Conditional {
                condition: "true".into(),
                then_branch: "echo yes".into(),
                else_branch: None,
            })
        );
    }

    #[test]
    fn test_conditional_missing_then() {
        assert_eq!(parse("if true echo yes fi"), Err(ParseError::MissingThen));
    }

    #[test]
    fn test_conditional_missing_fi() {
        assert_eq!(parse("if true then echo yes"), Err(ParseError::MissingFi));
    }

    #[test]
    fn test_nested_conditional_rejected() {
        assert_eq!(
            parse("if true then if false then echo a fi fi"),
            Err(ParseError::NestedConditional)
        );
    }

    #[test]
    fn test_background_conditional_rejected() {
        assert_eq!(
            parse("if true then echo yes fi &"),
            Err(ParseError::BackgroundConditional)
        );
    }

    #[test]
    fn test_if_prefixed_word_is_not_a_conditional() {
        let cmd = parse_single("iffy --version");
        assert_eq!(cmd.argv, vec!["iffy", "--version"]);
    }

    #[test]
    fn test_tokenize_keeps_quoted_empty_string() {
        assert_eq!(tokenize("echo \"\""), vec!["echo", ""]);
    }

    #[test]
    fn test_find_keyword_requires_word_boundaries() {
        assert_eq!(find_keyword("elsewhere else x", "else"), Some(10));
        assert_eq!(find_keyword("nothing here", "else"), None);
    }
}
