use async_trait::async_trait;
use chrono::{DateTime, Utc};
use seatline_core::availability::ensure_seats_available;
use seatline_core::models::{Booking, BookingStatus, BookingWithEvent};
use seatline_core::repository::BookingRepository;
use seatline_core::{CoreError, CoreResult};
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use crate::database::storage_error;
use crate::event_repo::{EventRow, EVENT_COLUMNS};

pub struct PgBookingRepository {
    pool: PgPool,
}

impl PgBookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct BookingRow {
    id: Uuid,
    event_id: Uuid,
    user_id: Uuid,
    quantity: i32,
    status: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<BookingRow> for Booking {
    type Error = CoreError;

    fn try_from(row: BookingRow) -> Result<Self, Self::Error> {
        Ok(Booking {
            id: row.id,
            event_id: row.event_id,
            user_id: row.user_id,
            quantity: row.quantity,
            status: row.status.parse()?,
            created_at: row.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct BookingEventRow {
    booking_id: Uuid,
    booking_user_id: Uuid,
    booking_quantity: i32,
    booking_status: String,
    booking_created_at: DateTime<Utc>,
    #[sqlx(flatten)]
    event: EventRow,
}

#[async_trait]
impl BookingRepository for PgBookingRepository {
    async fn reserve_seats(&self, user_id: Uuid, event_id: Uuid, quantity: i32) -> CoreResult<Booking> {
        let mut tx = self.pool.begin().await.map_err(storage_error)?;

        // Row lock serializes concurrent reservations for the same event until commit.
        let capacity: Option<i32> =
            sqlx::query_scalar("SELECT capacity FROM events WHERE id = $1 FOR UPDATE")
                .bind(event_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(storage_error)?;

        let capacity = capacity.ok_or(CoreError::NotFound("Event"))?;

        let taken: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(quantity), 0)::BIGINT FROM bookings WHERE event_id = $1",
        )
        .bind(event_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(storage_error)?;

        debug!(%event_id, capacity, taken, quantity, "Checking seat availability");

        // Dropping `tx` on the error path rolls the transaction back.
        ensure_seats_available(capacity, taken, quantity)?;

        let row = sqlx::query_as::<_, BookingRow>(
            r#"
            INSERT INTO bookings (id, event_id, user_id, quantity, status)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, event_id, user_id, quantity, status, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(event_id)
        .bind(user_id)
        .bind(quantity)
        .bind(BookingStatus::Confirmed.as_str())
        .fetch_one(&mut *tx)
        .await
        .map_err(storage_error)?;

        tx.commit().await.map_err(storage_error)?;

        row.try_into()
    }

    async fn list_for_user(&self, user_id: Uuid) -> CoreResult<Vec<BookingWithEvent>> {
        let query = format!(
            "SELECT b.id AS booking_id, b.user_id AS booking_user_id, b.quantity AS booking_quantity, \
             b.status AS booking_status, b.created_at AS booking_created_at, {} \
             FROM bookings b JOIN events e ON e.id = b.event_id \
             WHERE b.user_id = $1 \
             ORDER BY b.created_at DESC",
            EVENT_COLUMNS
        );

        let rows = sqlx::query_as::<_, BookingEventRow>(&query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(storage_error)?;

        rows.into_iter()
            .map(|row| {
                let event = seatline_core::models::Event::from(row.event);
                Ok(BookingWithEvent {
                    booking: Booking {
                        id: row.booking_id,
                        event_id: event.id,
                        user_id: row.booking_user_id,
                        quantity: row.booking_quantity,
                        status: row.booking_status.parse()?,
                        created_at: row.booking_created_at,
                    },
                    event,
                })
            })
            .collect()
    }
}
