//! history

use crate::shell::Shell;

/// List history numbered oldest-first, or clear it with `-c`.
pub fn builtin_history(shell: &mut Shell, argv: &[String]) -> i32 {
    match argv.get(1).map(String::as_str) {
        Some("-c") => {
            shell.history.clear();
            0
        }
        Some(other) => {
            eprintln!("ushell: history: unknown option: {}", other);
            eprintln!("Usage: history [-c]");
            1
        }
        None => {
            for (i, entry) in shell.history.iter().enumerate() {
                println!("{:5}  {}", i + 1, entry);
            }
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::Shell;

    fn argv(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_clear_empties_history() {
        let mut shell = Shell::new_for_tests();
        shell.history.add("echo a");
        shell.history.add("echo b");
        assert_eq!(builtin_history(&mut shell, &argv(&["history", "-c"])), 0);
        assert!(shell.history.is_empty());
    }

    #[test]
    fn test_unknown_option_fails() {
        let mut shell = Shell::new_for_tests();
        assert_eq!(builtin_history(&mut shell, &argv(&["history", "-z"])), 1);
    }

    #[test]
    fn test_plain_listing_succeeds() {
        let mut shell = Shell::new_for_tests();
        shell.history.add("pwd");
        assert_eq!(builtin_history(&mut shell, &argv(&["history"])), 0);
    }
}
