//! Built-in tool implementations for ferroact.
//!
//! Small, dependency-light tools an agent can use out of the box: echo,
//! arithmetic, reading files under the session's working directory and
//! telling the time. [`FnTool`] wraps a closure for ad-hoc tools.

pub mod calculator;
pub mod current_time;
pub mod echo;
pub mod file_read;
pub mod fn_tool;

use std::sync::Arc;

use ferroact_core::tool::Tool;

pub use calculator::CalculatorTool;
pub use current_time::CurrentTimeTool;
pub use echo::EchoTool;
pub use file_read::FileReadTool;
pub use fn_tool::FnTool;

/// Every built-in tool, in registration order.
pub fn default_tools() -> Vec<Arc<dyn Tool>> {
    vec![
        Arc::new(EchoTool),
        Arc::new(CalculatorTool),
        Arc::new(FileReadTool::new()),
        Arc::new(CurrentTimeTool),
    ]
}
