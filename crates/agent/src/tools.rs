use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, error};

use airdesk_core::agents::ToolName;
use airdesk_core::domain::booking::{Booking, NewBooking, TicketNumber};
use airdesk_core::faq::{self, FaqTopic};
use airdesk_db::BookingRepository;

/// Successful tool results, kept structured until the presentation edge.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ToolData {
    Booked { booking: Booking },
    Cancelled { ticket_number: TicketNumber },
    SeatUpdated { ticket_number: TicketNumber, seat_number: String },
    Bookings { bookings: Vec<Booking> },
    Answer { topic: FaqTopic },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ToolOutcome {
    Ok(ToolData),
    NotFound { subject: String },
    Error { reason: String },
}

impl ToolOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok(_))
    }
}

/// Name, description and JSON parameter schema advertised for a tool.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: Value,
}

#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> ToolName;
    fn description(&self) -> &'static str;
    fn parameters(&self) -> Value;
    async fn execute(&self, input: Value) -> ToolOutcome;
}

#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<ToolName, Box<dyn Tool>>,
}

impl ToolRegistry {
    /// Registry holding the four booking tools over `repository` plus the FAQ lookup.
    pub fn airline(repository: Arc<dyn BookingRepository>) -> Self {
        let mut registry = Self::default();
        registry.register(BookSeatTool::new(repository.clone()));
        registry.register(CancelSeatTool::new(repository.clone()));
        registry.register(UpdateSeatNumberTool::new(repository.clone()));
        registry.register(ShowBookedSeatsTool::new(repository));
        registry.register(FaqLookupTool);
        registry
    }

    pub fn register<T>(&mut self, tool: T)
    where
        T: Tool + 'static,
    {
        self.tools.insert(tool.name(), Box::new(tool));
    }

    pub fn specs(&self) -> Vec<ToolSpec> {
        let mut specs = self
            .tools
            .values()
            .map(|tool| ToolSpec {
                name: tool.name().as_str(),
                description: tool.description(),
                parameters: tool.parameters(),
            })
            .collect::<Vec<_>>();
        specs.sort_by_key(|spec| spec.name);
        specs
    }

    pub async fn execute(&self, tool: ToolName, input: Value) -> ToolOutcome {
        match self.tools.get(&tool) {
            Some(registered) => registered.execute(input).await,
            None => ToolOutcome::Error { reason: format!("tool `{tool}` is not registered") },
        }
    }
}

fn parse_input<T: DeserializeOwned>(tool: ToolName, input: Value) -> Result<T, ToolOutcome> {
    serde_json::from_value(input).map_err(|error| {
        debug!(tool = %tool, error = %error, "rejected malformed tool arguments");
        ToolOutcome::Error { reason: format!("invalid arguments: {error}") }
    })
}

fn string_schema(fields: &[(&str, &str)]) -> Value {
    let properties = fields
        .iter()
        .map(|(name, description)| {
            ((*name).to_string(), json!({ "type": "string", "description": description }))
        })
        .collect::<serde_json::Map<_, _>>();
    let required = fields.iter().map(|(name, _)| *name).collect::<Vec<_>>();

    json!({ "type": "object", "properties": properties, "required": required })
}

pub struct BookSeatTool {
    repository: Arc<dyn BookingRepository>,
}

impl BookSeatTool {
    pub fn new(repository: Arc<dyn BookingRepository>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl Tool for BookSeatTool {
    fn name(&self) -> ToolName {
        ToolName::BookSeat
    }

    fn description(&self) -> &'static str {
        "Book a seat on a flight and return the generated ticket number."
    }

    fn parameters(&self) -> Value {
        string_schema(&[
            ("name", "Passenger name"),
            ("airline_name", "Airline operating the flight"),
            ("seat_number", "Requested seat, e.g. 12A"),
            ("date", "Date of the flight"),
            ("origin", "Departure city"),
            ("destination", "Arrival city"),
        ])
    }

    async fn execute(&self, input: Value) -> ToolOutcome {
        let request: NewBooking = match parse_input(self.name(), input) {
            Ok(request) => request,
            Err(outcome) => return outcome,
        };
        if let Err(error) = request.validate() {
            return ToolOutcome::Error { reason: error.to_string() };
        }

        let booking = request.into_booking(TicketNumber::generate());
        match self.repository.insert(booking.clone()).await {
            Ok(()) => ToolOutcome::Ok(ToolData::Booked { booking }),
            Err(error) => {
                error!(tool = "book_seat", error = %error, "failed to store booking");
                ToolOutcome::Error { reason: error.to_string() }
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct TicketInput {
    ticket_number: String,
}

pub struct CancelSeatTool {
    repository: Arc<dyn BookingRepository>,
}

impl CancelSeatTool {
    pub fn new(repository: Arc<dyn BookingRepository>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl Tool for CancelSeatTool {
    fn name(&self) -> ToolName {
        ToolName::CancelSeat
    }

    fn description(&self) -> &'static str {
        "Cancel the booking identified by a ticket number."
    }

    fn parameters(&self) -> Value {
        string_schema(&[("ticket_number", "Ticket number returned when the seat was booked")])
    }

    async fn execute(&self, input: Value) -> ToolOutcome {
        let TicketInput { ticket_number } = match parse_input(self.name(), input) {
            Ok(input) => input,
            Err(outcome) => return outcome,
        };
        let ticket_number = TicketNumber::from(ticket_number.as_str());

        match self.repository.delete(&ticket_number).await {
            Ok(true) => ToolOutcome::Ok(ToolData::Cancelled { ticket_number }),
            Ok(false) => ToolOutcome::NotFound { subject: ticket_number.0 },
            Err(error) => {
                error!(
                    tool = "cancel_seat",
                    ticket_number = %ticket_number,
                    error = %error,
                    "failed to cancel booking"
                );
                ToolOutcome::Error { reason: error.to_string() }
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct UpdateSeatInput {
    ticket_number: String,
    new_seat_number: String,
}

pub struct UpdateSeatNumberTool {
    repository: Arc<dyn BookingRepository>,
}

impl UpdateSeatNumberTool {
    pub fn new(repository: Arc<dyn BookingRepository>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl Tool for UpdateSeatNumberTool {
    fn name(&self) -> ToolName {
        ToolName::UpdateSeatNumber
    }

    fn description(&self) -> &'static str {
        "Move an existing booking to a different seat."
    }

    fn parameters(&self) -> Value {
        string_schema(&[
            ("ticket_number", "Ticket number of the booking to change"),
            ("new_seat_number", "Seat to move the booking to"),
        ])
    }

    async fn execute(&self, input: Value) -> ToolOutcome {
        let UpdateSeatInput { ticket_number, new_seat_number } =
            match parse_input(self.name(), input) {
                Ok(input) => input,
                Err(outcome) => return outcome,
            };
        let ticket_number = TicketNumber::from(ticket_number.as_str());
        let seat_number = new_seat_number.trim().to_string();

        match self.repository.update_seat(&ticket_number, &seat_number).await {
            Ok(true) => ToolOutcome::Ok(ToolData::SeatUpdated { ticket_number, seat_number }),
            Ok(false) => ToolOutcome::NotFound { subject: ticket_number.0 },
            Err(error) => {
                error!(
                    tool = "update_seat_number",
                    ticket_number = %ticket_number,
                    error = %error,
                    "failed to update seat"
                );
                ToolOutcome::Error { reason: error.to_string() }
            }
        }
    }
}

pub struct ShowBookedSeatsTool {
    repository: Arc<dyn BookingRepository>,
}

impl ShowBookedSeatsTool {
    pub fn new(repository: Arc<dyn BookingRepository>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl Tool for ShowBookedSeatsTool {
    fn name(&self) -> ToolName {
        ToolName::ShowBookedSeats
    }

    fn description(&self) -> &'static str {
        "List every booked seat."
    }

    fn parameters(&self) -> Value {
        string_schema(&[])
    }

    async fn execute(&self, _input: Value) -> ToolOutcome {
        match self.repository.find_all().await {
            Ok(bookings) => ToolOutcome::Ok(ToolData::Bookings { bookings }),
            Err(error) => {
                error!(tool = "show_booked_seats", error = %error, "failed to list bookings");
                ToolOutcome::Error { reason: error.to_string() }
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct QuestionInput {
    question: String,
}

pub struct FaqLookupTool;

#[async_trait]
impl Tool for FaqLookupTool {
    fn name(&self) -> ToolName {
        ToolName::FaqLookup
    }

    fn description(&self) -> &'static str {
        "Lookup frequently asked questions."
    }

    fn parameters(&self) -> Value {
        string_schema(&[("question", "The customer's question")])
    }

    async fn execute(&self, input: Value) -> ToolOutcome {
        let QuestionInput { question } = match parse_input(self.name(), input) {
            Ok(input) => input,
            Err(outcome) => return outcome,
        };

        match faq::lookup(&question) {
            Some(topic) => ToolOutcome::Ok(ToolData::Answer { topic }),
            None => ToolOutcome::NotFound { subject: question },
        }
    }
}
