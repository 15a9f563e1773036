pub mod definitions;
pub mod graph;

pub use definitions::{AgentDefinition, AgentKind, ToolName, HANDOFF_PROMPT_PREFIX};
pub use graph::{AgentGraph, Handoff, HandoffError};
