//! Customer-facing wording for tool outcomes.

use airdesk_core::agents::ToolName;
use airdesk_core::domain::booking::Booking;
use airdesk_core::faq::FAQ_FALLBACK;

use crate::tools::{ToolData, ToolOutcome};

pub const NO_BOOKINGS: &str = "No seats are currently booked.";

pub fn render(tool: ToolName, outcome: &ToolOutcome) -> String {
    match outcome {
        ToolOutcome::Ok(data) => render_data(data),
        ToolOutcome::NotFound { subject } => render_not_found(tool, subject),
        ToolOutcome::Error { reason } => format!("{}: {reason}", error_prefix(tool)),
    }
}

fn render_data(data: &ToolData) -> String {
    match data {
        ToolData::Booked { booking } => format!(
            "Seat {} booked for {} on {} from {} to {} on {}. Ticket number: {}",
            booking.seat_number,
            booking.name,
            booking.airline_name,
            booking.origin,
            booking.destination,
            booking.date,
            booking.ticket_number
        ),
        ToolData::Cancelled { ticket_number } => format!(
            "Seat booking with ticket number {ticket_number} has been successfully cancelled."
        ),
        ToolData::SeatUpdated { ticket_number, seat_number } => {
            format!("Seat number for ticket {ticket_number} has been updated to {seat_number}.")
        }
        ToolData::Bookings { bookings } if bookings.is_empty() => NO_BOOKINGS.to_string(),
        ToolData::Bookings { bookings } => {
            bookings.iter().map(booking_line).collect::<Vec<_>>().join("\n")
        }
        ToolData::Answer { topic } => topic.answer().to_string(),
    }
}

fn booking_line(booking: &Booking) -> String {
    format!(
        "Ticket Number: {}, Name: {}, Airline: {}, Seat Number: {}, Date: {}, Origin: {}, Destination: {}",
        booking.ticket_number,
        booking.name,
        booking.airline_name,
        booking.seat_number,
        booking.date,
        booking.origin,
        booking.destination
    )
}

fn render_not_found(tool: ToolName, subject: &str) -> String {
    match tool {
        ToolName::FaqLookup => FAQ_FALLBACK.to_string(),
        ToolName::UpdateSeatNumber => {
            format!("No booking found with ticket number {subject} or no change made.")
        }
        ToolName::BookSeat | ToolName::CancelSeat | ToolName::ShowBookedSeats => {
            format!("No booking found with ticket number {subject}.")
        }
    }
}

fn error_prefix(tool: ToolName) -> &'static str {
    match tool {
        ToolName::BookSeat => "Error booking seat",
        ToolName::CancelSeat => "Error cancelling seat",
        ToolName::UpdateSeatNumber => "Error updating seat number",
        ToolName::ShowBookedSeats => "Error showing booked seats",
        ToolName::FaqLookup => "Error looking up question",
    }
}
