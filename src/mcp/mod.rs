//! MCP transport sessions and tool invocation
//!
//! Sessions are scoped: opened for one piece of work, closed on every
//! exit path, never pooled or reused across invocations.

mod session;

pub use session::*;
