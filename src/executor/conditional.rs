//! Conditional Execution
//!
//! Runs the condition line as a pipeline, observes its status, then runs the
//! then-block (status 0) or else-block. Blocks are raw sub-lines that go
//! back through the normal parse-and-execute path.

use crate::ast::Conditional;
use crate::shell::Shell;

pub fn execute_conditional(shell: &mut Shell, conditional: &Conditional) -> i32 {
    let condition_status = super::execute_line(shell, &conditional.condition);
    shell.last_status = condition_status;

    let block = if condition_status == 0 {
        Some(conditional.then_branch.as_str())
    } else {
        conditional.else_branch.as_deref()
    };

    match block {
        Some(line) => {
            let status = super::execute_line(shell, line);
            shell.last_status = status;
            status
        }
        // no else-block: the conditional reports the condition's status
        None => condition_status,
    }
}
