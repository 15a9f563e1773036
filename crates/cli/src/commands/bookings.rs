use anyhow::{Context, Result};

use airdesk_core::config::AppConfig;
use airdesk_core::domain::booking::Booking;
use airdesk_db::{connect_with_settings, migrations, BookingRepository, SqlBookingRepository};

use crate::commands::{block_on, load_config, CommandResult};

pub fn run() -> CommandResult {
    let config = match load_config("bookings") {
        Ok(config) => config,
        Err(failure) => return failure,
    };

    match block_on("bookings", list_bookings(&config)) {
        Ok(Ok(bookings)) => CommandResult::success("bookings", render(&bookings)),
        Ok(Err(error)) => {
            CommandResult::failure("bookings", "booking_store", format!("{error:#}"), 4)
        }
        Err(failure) => failure,
    }
}

async fn list_bookings(config: &AppConfig) -> Result<Vec<Booking>> {
    let pool = connect_with_settings(
        &config.database.url,
        config.database.max_connections,
        config.database.timeout_secs,
    )
    .await
    .with_context(|| format!("failed to connect to `{}`", config.database.url))?;
    migrations::run_pending(&pool).await.context("failed to apply migrations")?;

    let bookings = SqlBookingRepository::new(pool.clone())
        .find_all()
        .await
        .context("failed to read bookings")?;
    pool.close().await;
    Ok(bookings)
}

fn render(bookings: &[Booking]) -> String {
    if bookings.is_empty() {
        return "no bookings".to_string();
    }

    let mut lines = vec![format!("{} booking(s)", bookings.len())];
    lines.extend(bookings.iter().map(|booking| {
        format!(
            "- {}: {} on {} seat {}, {} -> {} ({})",
            booking.ticket_number,
            booking.name,
            booking.airline_name,
            booking.seat_number,
            booking.origin,
            booking.destination,
            booking.date
        )
    }));
    lines.join("\n")
}
