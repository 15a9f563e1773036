pub mod connection;
pub mod migrations;
pub mod repositories;

pub use connection::{connect_in_memory, connect_with_settings, DbPool};
pub use repositories::{
    BookingRepository, ConversationRepository, InMemoryBookingRepository,
    InMemoryConversationRepository, RepositoryError, SqlBookingRepository,
    SqlConversationRepository,
};
