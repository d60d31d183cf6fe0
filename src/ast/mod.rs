pub mod types;

pub use types::{Command, Conditional, ParsedLine, Pipeline};
