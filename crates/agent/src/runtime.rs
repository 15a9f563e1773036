use std::sync::Arc;

use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use airdesk_core::agents::{AgentGraph, AgentKind, Handoff, HandoffError, ToolName};
use airdesk_core::domain::conversation::{
    BookingAction, BookingDraft, BookingField, ConversationTurn, Session,
};
use airdesk_core::errors::DomainError;

use crate::extraction::BookingRequestExtractor;
use crate::guardrails::{GuardrailDecision, GuardrailIntent, GuardrailPolicy};
use crate::presentation::render;
use crate::routing::{Intent, IntentClassifier, RuleClassifier};
use crate::tools::{ToolOutcome, ToolRegistry};

pub const CAPABILITY_PROMPT: &str = "I can answer questions about baggage, seating and wifi, \
or help you book, cancel or change a seat and show your booked seats. How can I help you today?";

pub const BOOKING_MENU: &str = "I can book a seat, cancel a booking, change your seat number or \
show your booked seats. What would you like to do?";

/// What the current agent wants to do next.
#[derive(Clone, Debug, PartialEq)]
enum AgentStep {
    Reply(String),
    CallTool { tool: ToolName, arguments: Value },
    /// `fallback` is what this agent would say if the turn ends before anyone else replies.
    Handoff { to: AgentKind, reason: &'static str, fallback: Option<String> },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TurnOutcome {
    pub reply: String,
    pub agent: AgentKind,
    pub handoffs: Vec<Handoff>,
    pub tool_calls: Vec<ToolName>,
}

pub struct AgentRuntime {
    graph: AgentGraph,
    tools: ToolRegistry,
    classifier: Arc<dyn IntentClassifier>,
    rules: RuleClassifier,
    extractor: BookingRequestExtractor,
    guardrails: GuardrailPolicy,
}

impl AgentRuntime {
    pub fn new(
        graph: AgentGraph,
        tools: ToolRegistry,
        classifier: Arc<dyn IntentClassifier>,
        guardrails: GuardrailPolicy,
    ) -> Self {
        Self {
            graph,
            tools,
            classifier,
            rules: RuleClassifier::new(),
            extractor: BookingRequestExtractor::new(),
            guardrails,
        }
    }

    pub fn graph(&self) -> &AgentGraph {
        &self.graph
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Runs one customer turn starting at `session.active_agent`.
    ///
    /// On success the session's active agent and booking draft reflect the end of the turn.
    /// An error means an agent attempted a step outside the graph.
    pub async fn handle_message(
        &self,
        session: &mut Session,
        history: &[ConversationTurn],
        message: &str,
    ) -> Result<TurnOutcome, DomainError> {
        let mut current = session.active_agent;
        self.graph.agent(current)?;

        let mut visited = vec![current];
        let mut handoffs: Vec<Handoff> = Vec::new();
        let mut tool_calls = Vec::new();
        let mut fallback: Option<(AgentKind, String)> = None;

        let mut step = self.decide(current, session, history, message).await;
        loop {
            match step {
                AgentStep::Reply(reply) => {
                    return Ok(self.finish(session, current, reply, handoffs, tool_calls));
                }
                AgentStep::CallTool { tool, arguments } => {
                    let intent = GuardrailIntent::ToolCall { agent: current, tool };
                    if let GuardrailDecision::Deny { reason_code, error } =
                        self.guardrails.evaluate(&self.graph, &intent)
                    {
                        return Err(denied(session, &intent, reason_code, error));
                    }

                    info!(
                        event_name = "agent.tool_call",
                        session_id = %session.id,
                        agent = current.as_str(),
                        tool = tool.as_str(),
                        "invoking tool"
                    );
                    let outcome = self.tools.execute(tool, arguments).await;
                    tool_calls.push(tool);
                    step = observe(current, tool, &outcome);
                }
                AgentStep::Handoff { to, reason, fallback: text } => {
                    if let Some(text) = text {
                        fallback = Some((current, text));
                    }

                    let intent = GuardrailIntent::Handoff {
                        from: current,
                        to,
                        handoffs_taken: handoffs.len(),
                    };
                    match self.guardrails.evaluate(&self.graph, &intent) {
                        GuardrailDecision::Allow => {}
                        GuardrailDecision::Deny { reason_code, error } => {
                            return Err(denied(session, &intent, reason_code, error));
                        }
                        GuardrailDecision::Degrade { reason_code } => {
                            warn!(
                                event_name = "agent.handoff_limit",
                                session_id = %session.id,
                                agent = current.as_str(),
                                reason_code,
                                "ending turn early"
                            );
                            let outcome =
                                self.conclude(session, current, fallback, handoffs, tool_calls);
                            return Ok(outcome);
                        }
                    }

                    if visited.contains(&to) {
                        debug!(
                            session_id = %session.id,
                            from = current.as_str(),
                            to = to.as_str(),
                            "handoff would revisit an agent this turn"
                        );
                        return Ok(self.conclude(session, current, fallback, handoffs, tool_calls));
                    }

                    let handoff = self.graph.handoff(current, to, reason)?;
                    info!(
                        event_name = "agent.handoff",
                        session_id = %session.id,
                        from = current.as_str(),
                        to = to.as_str(),
                        reason,
                        "handing off"
                    );
                    handoffs.push(handoff);
                    visited.push(to);
                    current = to;
                    step = self.decide(current, session, history, message).await;
                }
            }
        }
    }

    async fn decide(
        &self,
        agent: AgentKind,
        session: &mut Session,
        history: &[ConversationTurn],
        message: &str,
    ) -> AgentStep {
        match agent {
            AgentKind::Triage if self.resumes_draft(session, message) => AgentStep::Handoff {
                to: AgentKind::Booking,
                reason: "resume booking draft",
                fallback: None,
            },
            AgentKind::Triage => match self.classifier.classify(message, history).await {
                Intent::Booking => AgentStep::Handoff {
                    to: AgentKind::Booking,
                    reason: "booking request",
                    fallback: None,
                },
                Intent::Faq => AgentStep::Handoff {
                    to: AgentKind::Faq,
                    reason: "faq question",
                    fallback: None,
                },
                Intent::Unknown => AgentStep::Reply(CAPABILITY_PROMPT.to_string()),
            },
            AgentKind::Faq => {
                if self.rules.classify_text(message) == Intent::Booking
                    || self.resumes_draft(session, message)
                {
                    AgentStep::Handoff {
                        to: AgentKind::Triage,
                        reason: "outside faq scope",
                        fallback: None,
                    }
                } else {
                    AgentStep::CallTool {
                        tool: ToolName::FaqLookup,
                        arguments: json!({ "question": message }),
                    }
                }
            }
            AgentKind::Booking => self.booking_step(session, message),
        }
    }

    fn booking_step(&self, session: &mut Session, message: &str) -> AgentStep {
        let pending = session.draft.as_ref().map(|draft| draft.action);
        let request = self.extractor.extract(message, pending);

        // A pending draft stays on the session while the customer asks something else.
        if request.is_empty() && self.rules.classify_text(message) == Intent::Faq {
            return AgentStep::Handoff {
                to: AgentKind::Triage,
                reason: "outside booking scope",
                fallback: Some(BOOKING_MENU.to_string()),
            };
        }

        let draft = match (request.action, session.draft.take()) {
            (Some(action), Some(existing)) if existing.action == action => Some(existing),
            (Some(action), _) => Some(BookingDraft::new(action)),
            (None, existing) => existing,
        };

        let Some(mut draft) = draft else {
            return AgentStep::Handoff {
                to: AgentKind::Triage,
                reason: "outside booking scope",
                fallback: Some(BOOKING_MENU.to_string()),
            };
        };

        draft.merge(request.fields);
        if !draft.is_complete() {
            let prompt = missing_fields_prompt(&draft);
            session.draft = Some(draft);
            return AgentStep::Reply(prompt);
        }

        let (tool, arguments) = tool_call(&draft);
        AgentStep::CallTool { tool, arguments }
    }

    /// True when a draft is pending and the message carries fields for it.
    fn resumes_draft(&self, session: &Session, message: &str) -> bool {
        session.draft.as_ref().is_some_and(|draft| {
            !self.extractor.extract(message, Some(draft.action)).fields.is_empty()
        })
    }

    fn finish(
        &self,
        session: &mut Session,
        agent: AgentKind,
        reply: String,
        handoffs: Vec<Handoff>,
        tool_calls: Vec<ToolName>,
    ) -> TurnOutcome {
        session.active_agent = agent;
        session.touch();
        TurnOutcome { reply, agent, handoffs, tool_calls }
    }

    fn conclude(
        &self,
        session: &mut Session,
        current: AgentKind,
        fallback: Option<(AgentKind, String)>,
        handoffs: Vec<Handoff>,
        tool_calls: Vec<ToolName>,
    ) -> TurnOutcome {
        let (agent, reply) = fallback.unwrap_or((current, CAPABILITY_PROMPT.to_string()));
        self.finish(session, agent, reply, handoffs, tool_calls)
    }
}

fn denied(
    session: &Session,
    intent: &GuardrailIntent,
    reason_code: &'static str,
    error: HandoffError,
) -> DomainError {
    warn!(
        event_name = "agent.guardrail_denied",
        session_id = %session.id,
        agent = intent.agent().as_str(),
        reason_code,
        action = %intent.action_key(),
        "step rejected by guardrails"
    );
    error.into()
}

fn observe(agent: AgentKind, tool: ToolName, outcome: &ToolOutcome) -> AgentStep {
    let text = render(tool, outcome);
    match (agent, outcome) {
        (AgentKind::Faq, ToolOutcome::NotFound { .. }) => AgentStep::Handoff {
            to: AgentKind::Triage,
            reason: "faq has no answer",
            fallback: Some(text),
        },
        _ => AgentStep::Reply(text),
    }
}

fn tool_call(draft: &BookingDraft) -> (ToolName, Value) {
    let value = |field: BookingField| draft.field(field).unwrap_or_default().to_string();

    match draft.action {
        BookingAction::Book => (
            ToolName::BookSeat,
            json!({
                "name": value(BookingField::Name),
                "airline_name": value(BookingField::AirlineName),
                "seat_number": value(BookingField::SeatNumber),
                "date": value(BookingField::Date),
                "origin": value(BookingField::Origin),
                "destination": value(BookingField::Destination),
            }),
        ),
        BookingAction::Cancel => (
            ToolName::CancelSeat,
            json!({ "ticket_number": value(BookingField::TicketNumber) }),
        ),
        BookingAction::UpdateSeat => (
            ToolName::UpdateSeatNumber,
            json!({
                "ticket_number": value(BookingField::TicketNumber),
                "new_seat_number": value(BookingField::NewSeatNumber),
            }),
        ),
        BookingAction::ShowBookings => (ToolName::ShowBookedSeats, json!({})),
    }
}

fn missing_fields_prompt(draft: &BookingDraft) -> String {
    let labels =
        draft.missing_fields().iter().map(BookingField::prompt_label).collect::<Vec<_>>();
    let (goal, example) = match draft.action {
        BookingAction::Book => (
            "book your seat",
            "name: Jane Doe, airline: Skyways, seat: 12A, date: 2026-12-01, from: Lahore, to: Karachi",
        ),
        BookingAction::Cancel => ("cancel your booking", "ticket: <ticket number>"),
        BookingAction::UpdateSeat => {
            ("update your seat", "ticket: <ticket number>, new seat: 14C")
        }
        BookingAction::ShowBookings => ("show your bookings", ""),
    };

    format!("To {goal} I still need {}. You can reply like `{example}`.", join_labels(&labels))
}

fn join_labels(labels: &[&str]) -> String {
    match labels {
        [] => String::new(),
        [only] => (*only).to_string(),
        [init @ .., last] => format!("{} and {last}", init.join(", ")),
    }
}
