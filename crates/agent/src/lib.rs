//! Agent runtime for the airline support desk.
//!
//! A turn starts at the session's active agent and walks the agent graph:
//! 1. **Routing** (`routing`) - classify the message as booking, FAQ or unknown
//! 2. **Extraction** (`extraction`) - pull booking actions and fields out of free text
//! 3. **Guardrails** (`guardrails`) - reject undeclared handoffs and tool calls
//! 4. **Tool Execution** (`tools`) - run booking and FAQ tools against the store
//! 5. **Presentation** (`presentation`) - render tool outcomes as customer-facing text
//!
//! The language model is only ever a classifier. Replies are produced by
//! deterministic code so the same store state always yields the same text.

pub mod extraction;
pub mod guardrails;
pub mod llm;
pub mod presentation;
pub mod routing;
pub mod runtime;
pub mod tools;

pub use runtime::{AgentRuntime, TurnOutcome};
