use async_trait::async_trait;
use thiserror::Error;

use airdesk_core::domain::booking::{Booking, TicketNumber};
use airdesk_core::domain::conversation::{ConversationTurn, Session, SessionId};

pub mod booking;
pub mod conversation;
pub mod memory;

pub use booking::SqlBookingRepository;
pub use conversation::SqlConversationRepository;
pub use memory::{InMemoryBookingRepository, InMemoryConversationRepository};

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
    #[error("record not found: {0}")]
    NotFound(String),
}

/// Durable storage for seat bookings, keyed by ticket number.
#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn insert(&self, booking: Booking) -> Result<(), RepositoryError>;

    /// Every booking, in insertion order. Each call issues a fresh query.
    async fn find_all(&self) -> Result<Vec<Booking>, RepositoryError>;

    async fn find_by_ticket(
        &self,
        ticket_number: &TicketNumber,
    ) -> Result<Option<Booking>, RepositoryError>;

    /// Returns `false` when no booking matched or the seat was already `new_seat`.
    async fn update_seat(
        &self,
        ticket_number: &TicketNumber,
        new_seat: &str,
    ) -> Result<bool, RepositoryError>;

    /// Returns `false` when no booking matched.
    async fn delete(&self, ticket_number: &TicketNumber) -> Result<bool, RepositoryError>;
}

#[async_trait]
pub trait ConversationRepository: Send + Sync {
    async fn find_session(&self, id: &SessionId) -> Result<Option<Session>, RepositoryError>;
    async fn save_session(&self, session: Session) -> Result<(), RepositoryError>;
    async fn append_turn(
        &self,
        id: &SessionId,
        turn: ConversationTurn,
    ) -> Result<(), RepositoryError>;
    async fn history(&self, id: &SessionId) -> Result<Vec<ConversationTurn>, RepositoryError>;
}
