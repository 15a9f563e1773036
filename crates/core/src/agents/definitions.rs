use std::fmt;

use serde::{Deserialize, Serialize};

/// Preamble shared by every agent that takes part in handoffs.
pub const HANDOFF_PROMPT_PREFIX: &str = "# System context\n\
You are part of a multi-agent system designed to make agent coordination and execution easy. \
Agents use two primary abstractions: **Agents** and **Handoffs**. An agent encompasses \
instructions and tools and can hand off a conversation to another agent when appropriate. \
Handoffs are achieved by calling a handoff function, generally named `transfer_to_<agent_name>`. \
Transfers between agents are handled seamlessly in the background; do not mention or draw \
attention to these transfers in your conversation with the user.\n";

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    Triage,
    Faq,
    Booking,
}

impl AgentKind {
    pub const ALL: [AgentKind; 3] = [AgentKind::Triage, AgentKind::Faq, AgentKind::Booking];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Triage => "triage",
            Self::Faq => "faq",
            Self::Booking => "booking",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Triage => "Triage Agent",
            Self::Faq => "FAQ Agent",
            Self::Booking => "Booking Agent",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "triage" => Some(Self::Triage),
            "faq" => Some(Self::Faq),
            "booking" => Some(Self::Booking),
            _ => None,
        }
    }
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolName {
    BookSeat,
    CancelSeat,
    UpdateSeatNumber,
    ShowBookedSeats,
    FaqLookup,
}

impl ToolName {
    pub const ALL: [ToolName; 5] = [
        ToolName::BookSeat,
        ToolName::CancelSeat,
        ToolName::UpdateSeatNumber,
        ToolName::ShowBookedSeats,
        ToolName::FaqLookup,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BookSeat => "book_seat",
            Self::CancelSeat => "cancel_seat",
            Self::UpdateSeatNumber => "update_seat_number",
            Self::ShowBookedSeats => "show_booked_seats",
            Self::FaqLookup => "faq_lookup_tool",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tool| tool.as_str() == value)
    }
}

impl fmt::Display for ToolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static declaration of an agent: what it is told, what it may call, and whom it may hand off to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AgentDefinition {
    pub kind: AgentKind,
    pub handoff_description: &'static str,
    pub instructions: String,
    pub model: String,
    pub tools: Vec<ToolName>,
    pub handoffs: Vec<AgentKind>,
}

impl AgentDefinition {
    pub fn name(&self) -> &'static str {
        self.kind.display_name()
    }

    pub fn can_use(&self, tool: ToolName) -> bool {
        self.tools.contains(&tool)
    }

    pub fn can_handoff_to(&self, target: AgentKind) -> bool {
        self.handoffs.contains(&target)
    }
}

pub fn triage_agent(model: &str) -> AgentDefinition {
    AgentDefinition {
        kind: AgentKind::Triage,
        handoff_description:
            "A triage agent that can delegate a customer's request to the appropriate agent.",
        instructions: format!(
            "{HANDOFF_PROMPT_PREFIX}You are a helpful triaging agent. Your task is to delegate \
             questions to other appropriate agents with the user query without responding to user."
        ),
        model: model.to_string(),
        tools: Vec::new(),
        handoffs: vec![AgentKind::Booking, AgentKind::Faq],
    }
}

pub fn faq_agent(model: &str) -> AgentDefinition {
    AgentDefinition {
        kind: AgentKind::Faq,
        handoff_description: "A helpful agent that can answer questions about the airline.",
        instructions: format!(
            "{HANDOFF_PROMPT_PREFIX}You are an FAQ agent. If you are speaking to a customer, you \
             probably were transferred to from the triage agent.\n\
             Use the following routine to support the customer.\n\
             # Routine\n\
             1. Identify the last question asked by the customer.\n\
             2. Use the faq lookup tool to answer the question. Do not rely on your own knowledge.\n\
             3. If you cannot answer the question, transfer back to the triage agent."
        ),
        model: model.to_string(),
        tools: vec![ToolName::FaqLookup],
        handoffs: vec![AgentKind::Triage],
    }
}

pub fn booking_agent(model: &str) -> AgentDefinition {
    AgentDefinition {
        kind: AgentKind::Booking,
        handoff_description: "A helpful agent that can book a seat on a flight, cancel a seat if \
             it exists, update the seat number of a booked seat and show the booked seats.",
        instructions: format!(
            "{HANDOFF_PROMPT_PREFIX}You are a seat booking agent. If you are speaking to a \
             customer, you probably were transferred to from the triage agent.\n\
             # Routine if user wants to book a seat:\n\
             1. Ask the customer for their name, airline name, desired seat number, date of the \
             flight, origin and destination of the flight.\n\
             2. Call the function to book a seat.\n\
             # Routine if user wants to cancel a seat:\n\
             1. Ask for their ticket number.\n\
             2. Call the function to cancel the seat.\n\
             # Routine if user wants to update a seat number:\n\
             1. Ask for their ticket number and the new seat number.\n\
             2. Call the function to update the seat number.\n\
             # Routine if user wants to show booked seats:\n\
             1. Call the function to show booked seats.\n\
             Only if the customer asks a question that is not related to the routine, transfer \
             back to the triage agent. Otherwise deal with it yourself."
        ),
        model: model.to_string(),
        tools: vec![
            ToolName::BookSeat,
            ToolName::CancelSeat,
            ToolName::UpdateSeatNumber,
            ToolName::ShowBookedSeats,
        ],
        handoffs: vec![AgentKind::Triage],
    }
}

#[cfg(test)]
mod tests {
    use super::{booking_agent, faq_agent, triage_agent, AgentKind, ToolName};

    #[test]
    fn triage_has_no_tools_and_delegates_to_both_specialists() {
        let triage = triage_agent("gemini-2.0-flash");
        assert!(triage.tools.is_empty());
        assert!(triage.can_handoff_to(AgentKind::Booking));
        assert!(triage.can_handoff_to(AgentKind::Faq));
        assert!(!triage.can_handoff_to(AgentKind::Triage));
    }

    #[test]
    fn specialists_only_return_to_triage() {
        for agent in [faq_agent("m"), booking_agent("m")] {
            assert_eq!(agent.handoffs, vec![AgentKind::Triage], "{}", agent.name());
        }
    }

    #[test]
    fn tool_sets_are_disjoint_between_faq_and_booking() {
        let faq = faq_agent("m");
        let booking = booking_agent("m");

        assert!(faq.can_use(ToolName::FaqLookup));
        assert!(!faq.can_use(ToolName::BookSeat));
        assert!(booking.can_use(ToolName::ShowBookedSeats));
        assert!(!booking.can_use(ToolName::FaqLookup));
    }

    #[test]
    fn names_parse_back_to_their_kind() {
        for kind in AgentKind::ALL {
            assert_eq!(AgentKind::parse(kind.as_str()), Some(kind));
        }
        for tool in ToolName::ALL {
            assert_eq!(ToolName::parse(tool.as_str()), Some(tool));
        }
    }
}
