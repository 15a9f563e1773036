use airdesk_core::agents::{AgentGraph, AgentKind, HandoffError, ToolName};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GuardrailIntent {
    Handoff { from: AgentKind, to: AgentKind, handoffs_taken: usize },
    ToolCall { agent: AgentKind, tool: ToolName },
}

impl GuardrailIntent {
    pub fn agent(&self) -> AgentKind {
        match self {
            Self::Handoff { from, .. } => *from,
            Self::ToolCall { agent, .. } => *agent,
        }
    }

    pub fn action_key(&self) -> String {
        match self {
            Self::Handoff { to, .. } => format!("handoff.{}", to.as_str()),
            Self::ToolCall { tool, .. } => format!("tool.{}", tool.as_str()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GuardrailDecision {
    Allow,
    /// The step breaks the agent graph contract; the turn fails.
    Deny { reason_code: &'static str, error: HandoffError },
    /// The step is legal but the turn must wrap up with the best reply so far.
    Degrade { reason_code: &'static str },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GuardrailPolicy {
    pub max_handoffs: usize,
}

impl Default for GuardrailPolicy {
    fn default() -> Self {
        Self { max_handoffs: 4 }
    }
}

impl GuardrailPolicy {
    pub fn new(max_handoffs: usize) -> Self {
        Self { max_handoffs }
    }

    pub fn evaluate(&self, graph: &AgentGraph, intent: &GuardrailIntent) -> GuardrailDecision {
        match intent {
            GuardrailIntent::Handoff { from, to, handoffs_taken } => {
                if let Err(error) = graph.handoff(*from, *to, "guardrail check") {
                    return GuardrailDecision::Deny { reason_code: "handoff_not_declared", error };
                }
                if *handoffs_taken >= self.max_handoffs {
                    GuardrailDecision::Degrade { reason_code: "handoff_limit_reached" }
                } else {
                    GuardrailDecision::Allow
                }
            }
            GuardrailIntent::ToolCall { agent, tool } => match graph.authorize_tool(*agent, *tool) {
                Ok(()) => GuardrailDecision::Allow,
                Err(error) => GuardrailDecision::Deny { reason_code: "tool_not_permitted", error },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use airdesk_core::agents::{AgentGraph, AgentKind, HandoffError, ToolName};

    use super::{GuardrailDecision, GuardrailIntent, GuardrailPolicy};

    fn graph() -> AgentGraph {
        AgentGraph::airline_support("gemini-2.0-flash")
    }

    #[test]
    fn declared_handoff_allow() {
        let decision = GuardrailPolicy::default().evaluate(
            &graph(),
            &GuardrailIntent::Handoff {
                from: AgentKind::Triage,
                to: AgentKind::Booking,
                handoffs_taken: 0,
            },
        );
        assert_eq!(decision, GuardrailDecision::Allow);
    }

    #[test]
    fn undeclared_handoff_denial() {
        let decision = GuardrailPolicy::default().evaluate(
            &graph(),
            &GuardrailIntent::Handoff {
                from: AgentKind::Faq,
                to: AgentKind::Booking,
                handoffs_taken: 0,
            },
        );

        assert_eq!(
            decision,
            GuardrailDecision::Deny {
                reason_code: "handoff_not_declared",
                error: HandoffError::EdgeNotDeclared {
                    from: AgentKind::Faq,
                    to: AgentKind::Booking,
                },
            }
        );
    }

    #[test]
    fn tool_outside_capability_set_denial() {
        let policy = GuardrailPolicy::default();
        let intent = GuardrailIntent::ToolCall { agent: AgentKind::Faq, tool: ToolName::BookSeat };

        let reason_code = match policy.evaluate(&graph(), &intent) {
            GuardrailDecision::Deny { reason_code, .. } => reason_code,
            _ => "",
        };

        assert_eq!(reason_code, "tool_not_permitted");
        assert_eq!(intent.action_key(), "tool.book_seat");
        assert_eq!(intent.agent(), AgentKind::Faq);
        assert_eq!(
            policy.evaluate(
                &graph(),
                &GuardrailIntent::ToolCall { agent: AgentKind::Faq, tool: ToolName::FaqLookup },
            ),
            GuardrailDecision::Allow
        );
    }

    #[test]
    fn handoff_limit_degrade() {
        let decision = GuardrailPolicy::new(2).evaluate(
            &graph(),
            &GuardrailIntent::Handoff {
                from: AgentKind::Booking,
                to: AgentKind::Triage,
                handoffs_taken: 2,
            },
        );

        assert_eq!(decision, GuardrailDecision::Degrade { reason_code: "handoff_limit_reached" });
    }
}
