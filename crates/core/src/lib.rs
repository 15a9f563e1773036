pub mod agents;
pub mod config;
pub mod domain;
pub mod errors;
pub mod faq;

pub use agents::{AgentDefinition, AgentGraph, AgentKind, Handoff, HandoffError, ToolName};
pub use domain::booking::{Booking, NewBooking, TicketNumber};
pub use domain::conversation::{
    BookingAction, BookingDraft, BookingField, ConversationTurn, Role, Session, SessionId,
};
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use faq::FaqTopic;
