use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::DomainError;

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TicketNumber(pub String);

impl TicketNumber {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TicketNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TicketNumber {
    fn from(value: &str) -> Self {
        Self(value.trim().to_string())
    }
}

/// A persisted seat booking. Only `seat_number` changes after creation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub ticket_number: TicketNumber,
    pub name: String,
    pub airline_name: String,
    pub seat_number: String,
    pub date: String,
    pub origin: String,
    pub destination: String,
}

/// Fields supplied by a customer when booking. The ticket number is assigned on insert.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBooking {
    pub name: String,
    pub airline_name: String,
    pub seat_number: String,
    pub date: String,
    pub origin: String,
    pub destination: String,
}

impl NewBooking {
    pub fn validate(&self) -> Result<(), DomainError> {
        let fields = [
            ("name", &self.name),
            ("airline_name", &self.airline_name),
            ("seat_number", &self.seat_number),
            ("date", &self.date),
            ("origin", &self.origin),
            ("destination", &self.destination),
        ];

        for (field, value) in fields {
            if value.trim().is_empty() {
                return Err(DomainError::InvariantViolation(format!(
                    "booking field `{field}` must not be empty"
                )));
            }
        }

        Ok(())
    }

    pub fn into_booking(self, ticket_number: TicketNumber) -> Booking {
        Booking {
            ticket_number,
            name: self.name.trim().to_string(),
            airline_name: self.airline_name.trim().to_string(),
            seat_number: self.seat_number.trim().to_string(),
            date: self.date.trim().to_string(),
            origin: self.origin.trim().to_string(),
            destination: self.destination.trim().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{NewBooking, TicketNumber};
    use crate::errors::DomainError;

    fn new_booking() -> NewBooking {
        NewBooking {
            name: " Ayesha Khan ".to_string(),
            airline_name: "PIA".to_string(),
            seat_number: "12A".to_string(),
            date: "2026-11-02".to_string(),
            origin: "Karachi".to_string(),
            destination: "Lahore".to_string(),
        }
    }

    #[test]
    fn generated_ticket_numbers_are_unique_uuids() {
        let first = TicketNumber::generate();
        let second = TicketNumber::generate();

        assert_ne!(first, second);
        assert!(uuid::Uuid::parse_str(first.as_str()).is_ok());
    }

    #[test]
    fn into_booking_trims_fields_and_keeps_ticket() {
        let ticket = TicketNumber::generate();
        let booking = new_booking().into_booking(ticket.clone());

        assert_eq!(booking.ticket_number, ticket);
        assert_eq!(booking.name, "Ayesha Khan");
        assert_eq!(booking.seat_number, "12A");
    }

    #[test]
    fn blank_field_fails_validation() {
        let mut booking = new_booking();
        booking.destination = "   ".to_string();

        let error = booking.validate().expect_err("blank destination should fail");
        assert!(matches!(
            error,
            DomainError::InvariantViolation(ref message) if message.contains("destination")
        ));
    }
}
