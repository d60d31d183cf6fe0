pub mod expander;
pub mod matcher;

pub use expander::{expand, expand_argv, expand_in};
pub use matcher::{glob_to_regex, is_glob_pattern, match_pattern};
