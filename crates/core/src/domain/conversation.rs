use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::agents::AgentKind;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "user" => Some(Self::User),
            "assistant" => Some(Self::Assistant),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl ConversationTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into(), created_at: Utc::now() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into(), created_at: Utc::now() }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingAction {
    Book,
    Cancel,
    UpdateSeat,
    ShowBookings,
}

impl BookingAction {
    pub fn required_fields(&self) -> &'static [BookingField] {
        use BookingField::*;

        match self {
            Self::Book => &[Name, AirlineName, SeatNumber, Date, Origin, Destination],
            Self::Cancel => &[TicketNumber],
            Self::UpdateSeat => &[TicketNumber, NewSeatNumber],
            Self::ShowBookings => &[],
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingField {
    Name,
    AirlineName,
    SeatNumber,
    Date,
    Origin,
    Destination,
    TicketNumber,
    NewSeatNumber,
}

impl BookingField {
    /// Phrase used when asking the customer for this field.
    pub fn prompt_label(&self) -> &'static str {
        match self {
            Self::Name => "your name",
            Self::AirlineName => "the airline name",
            Self::SeatNumber => "the desired seat number",
            Self::Date => "the date of the flight",
            Self::Origin => "the origin of the flight",
            Self::Destination => "the destination of the flight",
            Self::TicketNumber => "your ticket number",
            Self::NewSeatNumber => "the new seat number",
        }
    }
}

/// A booking request being assembled over one or more turns.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingDraft {
    pub action: BookingAction,
    pub fields: BTreeMap<BookingField, String>,
}

impl BookingDraft {
    pub fn new(action: BookingAction) -> Self {
        Self { action, fields: BTreeMap::new() }
    }

    /// Later values win; blank values are ignored.
    pub fn merge(&mut self, fields: BTreeMap<BookingField, String>) {
        for (field, value) in fields {
            let value = value.trim();
            if !value.is_empty() {
                self.fields.insert(field, value.to_string());
            }
        }
    }

    pub fn missing_fields(&self) -> Vec<BookingField> {
        self.action
            .required_fields()
            .iter()
            .copied()
            .filter(|field| !self.fields.contains_key(field))
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }

    pub fn field(&self, field: BookingField) -> Option<&str> {
        self.fields.get(&field).map(String::as_str)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub active_agent: AgentKind,
    pub draft: Option<BookingDraft>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    pub fn start(id: SessionId, initial_agent: AgentKind) -> Self {
        let now = Utc::now();
        Self { id, active_agent: initial_agent, draft: None, created_at: now, updated_at: now }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
