//! Agent module - the reasoning loop that answers queries with tools.
//!
//! One session runs the think/act/observe cycle:
//! 1. The reasoning driver proposes the next step
//! 2. Tool proposals are validated against the registry and executed
//! 3. Results (or errors) go back into the transcript as observations
//! 4. Repeat until a final answer, the retry budget, or the step budget

mod prompt;
mod session;

pub use prompt::build_system_prompt;
pub use session::{AgentSession, CompletedSession, SessionLimits};
