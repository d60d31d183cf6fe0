//! cd, pwd, echo, exit

use crate::shell::Shell;

/// Change directory; with no argument, go to `$HOME`.
pub fn builtin_cd(shell: &mut Shell, argv: &[String]) -> i32 {
    let target = match argv.get(1) {
        Some(path) => path.clone(),
        None => match shell.env.get("HOME") {
            Some(home) => home,
            None => {
                eprintln!("ushell: cd: HOME not set");
                return 1;
            }
        },
    };

    match std::env::set_current_dir(&target) {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("ushell: cd: {}: {}", target, e);
            1
        }
    }
}

pub fn builtin_pwd(_shell: &mut Shell, _argv: &[String]) -> i32 {
    match std::env::current_dir() {
        Ok(cwd) => {
            println!("{}", cwd.display());
            0
        }
        Err(e) => {
            eprintln!("ushell: pwd: {}", e);
            1
        }
    }
}

/// Print space-joined arguments followed by a newline.
pub fn builtin_echo(_shell: &mut Shell, argv: &[String]) -> i32 {
    println!("{}", argv[1..].join(" "));
    0
}

/// Request shell exit with the given status (default: last status).
pub fn builtin_exit(shell: &mut Shell, argv: &[String]) -> i32 {
    let status = match argv.get(1) {
        None => shell.last_status,
        Some(arg) => match arg.parse::<i32>() {
            Ok(n) => n,
            Err(_) => {
                eprintln!("ushell: exit: {}: numeric argument required", arg);
                2
            }
        },
    };
    shell.exit_request = Some(status);
    status
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::Shell;

    fn argv(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_echo_status_is_zero() {
        let mut shell = Shell::new_for_tests();
        assert_eq!(builtin_echo(&mut shell, &argv(&["echo", "hi"])), 0);
    }

    #[test]
    fn test_cd_to_missing_directory_fails() {
        let mut shell = Shell::new_for_tests();
        let status = builtin_cd(&mut shell, &argv(&["cd", "/no/such/dir/ushell"]));
        assert_eq!(status, 1);
    }

    #[test]
    fn test_exit_records_request() {
        let mut shell = Shell::new_for_tests();
        assert_eq!(builtin_exit(&mut shell, &argv(&["exit", "3"])), 3);
        assert_eq!(shell.exit_request, Some(3));
    }

    #[test]
    fn test_exit_defaults_to_last_status() {
        let mut shell = Shell::new_for_tests();
        shell.last_status = 42;
        builtin_exit(&mut shell, &argv(&["exit"]));
        assert_eq!(shell.exit_request, Some(42));
    }

    #[test]
    fn test_exit_rejects_non_numeric_argument() {
        let mut shell = Shell::new_for_tests();
        assert_eq!(builtin_exit(&mut shell, &argv(&["exit", "abc"])), 2);
        assert_eq!(shell.exit_request, Some(2));
    }
}
