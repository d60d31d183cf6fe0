//! export, set, unset, env

use lazy_static::lazy_static;
use regex_lite::Regex;

use crate::shell::Shell;

lazy_static! {
    static ref IDENTIFIER: Regex = Regex::new("^[A-Za-z_][A-Za-z0-9_]*$").unwrap();
}

/// `export NAME=value` sets and propagates to the process environment;
/// `export NAME` propagates an existing shell variable.
pub fn builtin_export(shell: &mut Shell, argv: &[String]) -> i32 {
    if argv.len() < 2 {
        eprintln!("ushell: export: usage: export NAME=value");
        return 1;
    }

    let mut status = 0;
    for arg in &argv[1..] {
        match split_assignment(arg) {
            Some((name, value)) => {
                if !shell.env.export(name, value) {
                    eprintln!("ushell: export: variable store is full");
                    status = 1;
                }
            }
            None if IDENTIFIER.is_match(arg) => match shell.env.get(arg) {
                Some(value) => {
                    shell.env.export(arg, &value);
                }
                None => {
                    shell.env.export(arg, "");
                }
            },
            None => {
                eprintln!("ushell: export: '{}': not a valid identifier", arg);
                status = 1;
            }
        }
    }
    status
}

/// `set NAME=value` assigns shell-locally; `set` alone lists every variable
/// in insertion order.
pub fn builtin_set(shell: &mut Shell, argv: &[String]) -> i32 {
    if argv.len() < 2 {
        for (name, value) in shell.env.enumerate() {
            println!("{}={}", name, value);
        }
        return 0;
    }

    let mut status = 0;
    for arg in &argv[1..] {
        match split_assignment(arg) {
            Some((name, value)) => {
                if !shell.env.set(name, value) {
                    eprintln!("ushell: set: variable store is full");
                    status = 1;
                }
            }
            None => {
                eprintln!("ushell: set: '{}': expected NAME=value", arg);
                status = 1;
            }
        }
    }
    status
}

pub fn builtin_unset(shell: &mut Shell, argv: &[String]) -> i32 {
    if argv.len() < 2 {
        eprintln!("ushell: unset: usage: unset NAME");
        return 1;
    }
    for name in &argv[1..] {
        shell.env.unset(name);
    }
    0
}

/// List the exported (process) environment.
pub fn builtin_env(_shell: &mut Shell, _argv: &[String]) -> i32 {
    for (name, value) in std::env::vars() {
        println!("{}={}", name, value);
    }
    0
}

/// Split `NAME=value` when the name part is a valid identifier.
fn split_assignment(arg: &str) -> Option<(&str, &str)> {
    let (name, value) = arg.split_once('=')?;
    if IDENTIFIER.is_match(name) {
        Some((name, value))
    } else {
        None
    }
}
