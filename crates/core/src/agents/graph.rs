use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::agents::definitions::{
    booking_agent, faq_agent, triage_agent, AgentDefinition, AgentKind, ToolName,
};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Handoff {
    pub from: AgentKind,
    pub to: AgentKind,
    pub reason: String,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum HandoffError {
    #[error("agent {0:?} is not part of the agent graph")]
    UnknownAgent(AgentKind),
    #[error("{from:?} cannot hand off to {to:?}")]
    EdgeNotDeclared { from: AgentKind, to: AgentKind },
    #[error("{agent:?} is not permitted to call tool `{tool}`")]
    ToolNotPermitted { agent: AgentKind, tool: ToolName },
}

/// Directed graph of agents. Edges are the declared handoff sets.
#[derive(Clone, Debug)]
pub struct AgentGraph {
    initial: AgentKind,
    agents: BTreeMap<AgentKind, AgentDefinition>,
}

impl AgentGraph {
    pub fn new(initial: AgentKind, definitions: Vec<AgentDefinition>) -> Self {
        let agents =
            definitions.into_iter().map(|definition| (definition.kind, definition)).collect();
        Self { initial, agents }
    }

    /// Triage hub with Booking and FAQ spokes, all bound to `model`.
    pub fn airline_support(model: &str) -> Self {
        Self::new(
            AgentKind::Triage,
            vec![triage_agent(model), faq_agent(model), booking_agent(model)],
        )
    }

    pub fn initial_agent(&self) -> AgentKind {
        self.initial
    }

    pub fn agent(&self, kind: AgentKind) -> Result<&AgentDefinition, HandoffError> {
        self.agents.get(&kind).ok_or(HandoffError::UnknownAgent(kind))
    }

    pub fn edges(&self) -> Vec<(AgentKind, AgentKind)> {
        self.agents
            .values()
            .flat_map(|agent| agent.handoffs.iter().map(move |target| (agent.kind, *target)))
            .collect()
    }

    pub fn handoff(
        &self,
        from: AgentKind,
        to: AgentKind,
        reason: impl Into<String>,
    ) -> Result<Handoff, HandoffError> {
        let source = self.agent(from)?;
        self.agent(to)?;

        if !source.can_handoff_to(to) {
            return Err(HandoffError::EdgeNotDeclared { from, to });
        }

        Ok(Handoff { from, to, reason: reason.into() })
    }

    pub fn authorize_tool(&self, agent: AgentKind, tool: ToolName) -> Result<(), HandoffError> {
        if self.agent(agent)?.can_use(tool) {
            Ok(())
        } else {
            Err(HandoffError::ToolNotPermitted { agent, tool })
        }
    }
}
