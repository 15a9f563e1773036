use std::collections::HashMap;

use tokio::sync::RwLock;

use airdesk_core::domain::booking::{Booking, TicketNumber};
use airdesk_core::domain::conversation::{ConversationTurn, Session, SessionId};

use super::{BookingRepository, ConversationRepository, RepositoryError};

/// Insertion-ordered booking store for tests and database-less runs.
#[derive(Default)]
pub struct InMemoryBookingRepository {
    bookings: RwLock<Vec<Booking>>,
}

#[async_trait::async_trait]
impl BookingRepository for InMemoryBookingRepository {
    async fn insert(&self, booking: Booking) -> Result<(), RepositoryError> {
        let mut bookings = self.bookings.write().await;
        bookings.push(booking);
        Ok(())
    }

    async fn find_all(&self) -> Result<Vec<Booking>, RepositoryError> {
        let bookings = self.bookings.read().await;
        Ok(bookings.clone())
    }

    async fn find_by_ticket(
        &self,
        ticket_number: &TicketNumber,
    ) -> Result<Option<Booking>, RepositoryError> {
        let bookings = self.bookings.read().await;
        Ok(bookings.iter().find(|booking| &booking.ticket_number == ticket_number).cloned())
    }

    async fn update_seat(
        &self,
        ticket_number: &TicketNumber,
        new_seat: &str,
    ) -> Result<bool, RepositoryError> {
        let mut bookings = self.bookings.write().await;
        match bookings.iter_mut().find(|booking| &booking.ticket_number == ticket_number) {
            Some(booking) if booking.seat_number != new_seat => {
                booking.seat_number = new_seat.to_string();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete(&self, ticket_number: &TicketNumber) -> Result<bool, RepositoryError> {
        let mut bookings = self.bookings.write().await;
        let before = bookings.len();
        bookings.retain(|booking| &booking.ticket_number != ticket_number);
        Ok(bookings.len() < before)
    }
}

#[derive(Default)]
pub struct InMemoryConversationRepository {
    sessions: RwLock<HashMap<String, (Session, Vec<ConversationTurn>)>>,
}

#[async_trait::async_trait]
impl ConversationRepository for InMemoryConversationRepository {
    async fn find_session(&self, id: &SessionId) -> Result<Option<Session>, RepositoryError> {
        let sessions = self.sessions.read().await;
        Ok(sessions.get(&id.0).map(|(session, _)| session.clone()))
    }

    async fn save_session(&self, session: Session) -> Result<(), RepositoryError> {
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(&session.id.0) {
            Some((stored, _)) => *stored = session,
            None => {
                sessions.insert(session.id.0.clone(), (session, Vec::new()));
            }
        }
        Ok(())
    }

    async fn append_turn(
        &self,
        id: &SessionId,
        turn: ConversationTurn,
    ) -> Result<(), RepositoryError> {
        let mut sessions = self.sessions.write().await;
        let (_, turns) = sessions
            .get_mut(&id.0)
            .ok_or_else(|| RepositoryError::NotFound(format!("session `{id}`")))?;
        turns.push(turn);
        Ok(())
    }

    async fn history(&self, id: &SessionId) -> Result<Vec<ConversationTurn>, RepositoryError> {
        let sessions = self.sessions.read().await;
        Ok(sessions.get(&id.0).map(|(_, turns)| turns.clone()).unwrap_or_default())
    }
}
