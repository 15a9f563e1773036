use chrono::Utc;
use sqlx::Row;
use tracing::debug;

use airdesk_core::domain::booking::{Booking, TicketNumber};

use super::{BookingRepository, RepositoryError};
use crate::DbPool;

pub struct SqlBookingRepository {
    pool: DbPool,
}

impl SqlBookingRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_booking(row: &sqlx::sqlite::SqliteRow) -> Result<Booking, RepositoryError> {
    let ticket_number: String =
        row.try_get("ticket_number").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let name: String = row.try_get("name").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let airline_name: String =
        row.try_get("airline_name").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let seat_number: String =
        row.try_get("seat_number").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let date: String = row.try_get("date").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let origin: String =
        row.try_get("origin").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let destination: String =
        row.try_get("destination").map_err(|e| RepositoryError::Decode(e.to_string()))?;

    Ok(Booking {
        ticket_number: TicketNumber(ticket_number),
        name,
        airline_name,
        seat_number,
        date,
        origin,
        destination,
    })
}

#[async_trait::async_trait]
impl BookingRepository for SqlBookingRepository {
    async fn insert(&self, booking: Booking) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO book_seat (ticket_number, name, airline_name, seat_number, date,
                                    origin, destination, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(booking.ticket_number.as_str())
        .bind(&booking.name)
        .bind(&booking.airline_name)
        .bind(&booking.seat_number)
        .bind(&booking.date)
        .bind(&booking.origin)
        .bind(&booking.destination)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        debug!(ticket_number = %booking.ticket_number, "booking inserted");
        Ok(())
    }

    async fn find_all(&self) -> Result<Vec<Booking>, RepositoryError> {
        let rows: Vec<sqlx::sqlite::SqliteRow> = sqlx::query(
            "SELECT ticket_number, name, airline_name, seat_number, date, origin, destination
             FROM book_seat ORDER BY rowid ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_booking).collect::<Result<Vec<_>, _>>()
    }

    async fn find_by_ticket(
        &self,
        ticket_number: &TicketNumber,
    ) -> Result<Option<Booking>, RepositoryError> {
        let row = sqlx::query(
            "SELECT ticket_number, name, airline_name, seat_number, date, origin, destination
             FROM book_seat WHERE ticket_number = ?",
        )
        .bind(ticket_number.as_str())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(ref r) => Ok(Some(row_to_booking(r)?)),
            None => Ok(None),
        }
    }

    async fn update_seat(
        &self,
        ticket_number: &TicketNumber,
        new_seat: &str,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            "UPDATE book_seat SET seat_number = ?
             WHERE ticket_number = ? AND seat_number <> ?",
        )
        .bind(new_seat)
        .bind(ticket_number.as_str())
        .bind(new_seat)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, ticket_number: &TicketNumber) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM book_seat WHERE ticket_number = ?")
            .bind(ticket_number.as_str())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use airdesk_core::domain::booking::{Booking, TicketNumber};

    use super::SqlBookingRepository;
    use crate::connect_in_memory;
    use crate::repositories::BookingRepository;

    fn booking(seat: &str) -> Booking {
        Booking {
            ticket_number: TicketNumber::generate(),
            name: "Hina Raza".to_string(),
            airline_name: "Airblue".to_string(),
            seat_number: seat.to_string(),
            date: "2026-11-20".to_string(),
            origin: "Islamabad".to_string(),
            destination: "Dubai".to_string(),
        }
    }

    #[tokio::test]
    async fn insert_then_find_returns_same_booking() {
        let pool = connect_in_memory().await.expect("pool");
        let repo = SqlBookingRepository::new(pool.clone());
        let booking = booking("7C");

        repo.insert(booking.clone()).await.expect("insert");

        let found = repo.find_by_ticket(&booking.ticket_number).await.expect("find");
        assert_eq!(found, Some(booking.clone()));
        assert_eq!(repo.find_all().await.expect("find all"), vec![booking]);

        pool.close().await;
    }

    #[tokio::test]
    async fn find_all_preserves_insertion_order_and_allows_duplicate_seats() {
        let pool = connect_in_memory().await.expect("pool");
        let repo = SqlBookingRepository::new(pool.clone());
        let first = booking("1A");
        let second = booking("1A");

        repo.insert(first.clone()).await.expect("insert first");
        repo.insert(second.clone()).await.expect("insert second");

        let all = repo.find_all().await.expect("find all");
        assert_eq!(all, vec![first, second]);

        pool.close().await;
    }

    #[tokio::test]
    async fn update_seat_reports_modified_only_when_value_changes() {
        let pool = connect_in_memory().await.expect("pool");
        let repo = SqlBookingRepository::new(pool.clone());
        let booking = booking("9F");
        repo.insert(booking.clone()).await.expect("insert");

        assert!(repo.update_seat(&booking.ticket_number, "10A").await.expect("update"));
        assert!(!repo.update_seat(&booking.ticket_number, "10A").await.expect("same seat"));
        assert!(!repo
            .update_seat(&TicketNumber::generate(), "10A")
            .await
            .expect("unknown ticket"));

        let found = repo.find_by_ticket(&booking.ticket_number).await.expect("find");
        assert_eq!(found.map(|booking| booking.seat_number), Some("10A".to_string()));

        pool.close().await;
    }

    #[tokio::test]
    async fn delete_reports_whether_a_booking_was_removed() {
        let pool = connect_in_memory().await.expect("pool");
        let repo = SqlBookingRepository::new(pool.clone());
        let booking = booking("3B");
        repo.insert(booking.clone()).await.expect("insert");

        assert!(repo.delete(&booking.ticket_number).await.expect("first delete"));
        assert!(!repo.delete(&booking.ticket_number).await.expect("second delete"));
        assert!(repo.find_all().await.expect("find all").is_empty());

        pool.close().await;
    }

    #[tokio::test]
    async fn closed_pool_surfaces_database_error() {
        let pool = connect_in_memory().await.expect("pool");
        let repo = SqlBookingRepository::new(pool.clone());
        pool.close().await;

        let error = repo.find_all().await.expect_err("closed pool should fail");
        assert!(matches!(error, crate::RepositoryError::Database(_)));
    }
}
